//! Writers that package composed blocks into output formats.

pub mod docx;

pub use self::docx::DocxWriter;
