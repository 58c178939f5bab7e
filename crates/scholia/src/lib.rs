//! # Scholia
//!
//! Export and persistence core of an academic writing assistant. Edited
//! rich-text markup is parsed into a [`markup::MarkupNode`] tree, composed
//! into [`compose::DocumentBlock`]s and packed into a `.docx` file, while
//! accounts and per-user history live in a [`store::KeyValueStore`].

pub mod accounts;
pub mod compose;
pub mod config;
mod error;
pub mod export;
pub mod history;
pub mod markup;
pub mod research;
pub mod store;
pub mod writer;

pub use error::*;

pub use crate::compose::{
    compose, ComposeOptions, DocumentBlock, DocumentComposer, ExportMetadata, TextRun,
    UnknownTagPolicy,
};
pub use crate::config::{Config, ExportLabels};
pub use crate::export::{export_file_name, ExportedDocument, Exporter};
pub use crate::markup::{parse_fragment, MarkupNode, Tag};

/// The result type for scholia.
pub type Result<T, Err = Error> = std::result::Result<T, Err>;

#[cfg(test)]
mod tests;
