//! Export of a stored result to a `.docx` file.

use std::path::{Path, PathBuf};

use log::info;

use crate::compose::{compose, ComposeOptions, ExportMetadata};
use crate::markup::parse_fragment;
use crate::research::ResearchResult;
use crate::store::write_atomic;
use crate::writer::DocxWriter;
use crate::Result;

/// Characters that cannot appear in a file name on some platform.
const RESERVED: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Derives the file name of an export from the topic: runs of whitespace
/// become a single `_`.
///
/// Path separators, reserved and control characters are replaced by `_`, so
/// the name always stays inside the directory it is saved in.
pub fn export_file_name(topic: &str) -> String {
    let safe: String = topic
        .chars()
        .map(|c| {
            if RESERVED.contains(&c) || (c.is_control() && !c.is_whitespace()) {
                '_'
            } else {
                c
            }
        })
        .collect();
    let stem = safe.split_whitespace().collect::<Vec<_>>().join("_");
    if stem.trim_matches('.').is_empty() {
        "document.docx".to_owned()
    } else {
        format!("{stem}.docx")
    }
}

/// A packed document ready to be saved.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    /// Suggested file name.
    pub file_name: String,
    /// The docx bytes.
    pub bytes: Vec<u8>,
}

impl ExportedDocument {
    /// Saves the document into `dir` under its file name.
    pub fn save_in(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        write_atomic(&path, &self.bytes)?;
        info!("export: saved {}", path.display());
        Ok(path)
    }
}

/// Parses, composes and packs documents.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    options: ComposeOptions,
}

impl Exporter {
    /// Creates an exporter.
    pub fn new(options: ComposeOptions) -> Self {
        Self { options }
    }

    /// Exports a stored result.
    pub fn export(&self, result: &ResearchResult) -> Result<ExportedDocument> {
        self.export_markup(&result.content, &ExportMetadata::from_result(result))
    }

    /// Exports editor markup with the given metadata.
    pub fn export_markup(&self, markup: &str, metadata: &ExportMetadata) -> Result<ExportedDocument> {
        let root = parse_fragment(markup);
        let blocks = compose(&root, metadata, &self.options);
        let bytes = DocxWriter::new(self.options.labels.clone()).write(metadata, &blocks)?;

        let file_name = export_file_name(&metadata.title);
        info!(
            "export: {file_name} with {} blocks, {} bytes",
            blocks.len(),
            bytes.len()
        );
        Ok(ExportedDocument { file_name, bytes })
    }
}
