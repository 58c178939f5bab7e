//! DOCX packaging using docx-rs
//!
//! - Writer: renders the title page and [`DocumentBlock`]s into a docx
//!   document and packs it
//! - Styles: paragraph styles referenced by the writer
//! - Numbering: the bullet definition shared by all list items
//!
//! [`DocumentBlock`]: crate::compose::DocumentBlock

mod numbering;
mod styles;
mod writer;

pub use writer::DocxWriter;
