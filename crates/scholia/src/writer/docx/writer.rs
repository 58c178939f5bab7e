//! DOCX document writer implementation

use docx_rs::*;
use log::debug;
use std::io::Cursor;

use crate::compose::{DocumentBlock, ExportMetadata, TextRun};
use crate::config::ExportLabels;
use crate::{Error, Result};

use super::numbering::DocxNumbering;
use super::styles::DocxStyles;

/// Spacing around content paragraphs and headings, in twips.
const BLOCK_SPACING: u32 = 120;

/// Spacing before and after the sources heading, in twips.
const SOURCES_BEFORE: u32 = 400;
const SOURCES_AFTER: u32 = 200;

/// Colour of the address in a citation.
const LINK_COLOR: &str = "0000FF";

/// DOCX writer that lays out a title page followed by composed blocks
pub struct DocxWriter {
    styles: DocxStyles,
    numbering: DocxNumbering,
    labels: ExportLabels,
}

impl Default for DocxWriter {
    fn default() -> Self {
        Self::new(ExportLabels::default())
    }
}

impl DocxWriter {
    /// Create a writer using `labels` for the subtitle line
    pub fn new(labels: ExportLabels) -> Self {
        Self {
            styles: DocxStyles::new(),
            numbering: DocxNumbering::new(),
            labels,
        }
    }

    /// Upper-cased title, then the subtitle line
    fn process_title_page(&self, docx: Docx, metadata: &ExportMetadata) -> Docx {
        let title = Paragraph::new()
            .style("Title")
            .align(AlignmentType::Center)
            .line_spacing(LineSpacing::new().after(400))
            .add_run(Run::new().add_text(metadata.title.to_uppercase()));

        let subtitle = Paragraph::new()
            .style("Subtitle")
            .align(AlignmentType::Center)
            .line_spacing(LineSpacing::new().after(1000))
            .add_run(Run::new().add_text(metadata.subtitle(&self.labels).as_str()));

        docx.add_paragraph(title).add_paragraph(subtitle)
    }

    /// Map a text run to a docx run
    fn process_run(run: &TextRun) -> Run {
        let mut out = Run::new().add_text(run.text.as_str());
        if run.bold {
            out = out.bold();
        }
        if run.italic {
            out = out.italic();
        }
        if run.underline {
            out = out.underline("single");
        }
        out
    }

    fn add_runs(mut para: Paragraph, runs: &[TextRun]) -> Paragraph {
        for run in runs {
            para = para.add_run(Self::process_run(run));
        }
        para
    }

    /// Process block and add to document
    fn process_block(&mut self, docx: Docx, block: &DocumentBlock) -> Docx {
        match block {
            DocumentBlock::Heading { level, runs } => {
                let style_name = match level {
                    1 => "Heading1",
                    2 => "Heading2",
                    _ => "Heading3",
                };

                let para = Paragraph::new()
                    .style(style_name)
                    .align(AlignmentType::Center)
                    .line_spacing(LineSpacing::new().before(BLOCK_SPACING).after(BLOCK_SPACING));
                docx.add_paragraph(Self::add_runs(para, runs))
            }
            DocumentBlock::Paragraph { runs, justified } => {
                let mut para = Paragraph::new()
                    .line_spacing(LineSpacing::new().before(BLOCK_SPACING).after(BLOCK_SPACING));
                if *justified {
                    para = para.align(AlignmentType::Both);
                }
                docx.add_paragraph(Self::add_runs(para, runs))
            }
            DocumentBlock::Bullet { text } => {
                let (docx, num_id) = self.numbering.bullet_numbering(docx);
                let para = Paragraph::new()
                    .numbering(NumberingId::new(num_id), IndentLevel::new(0))
                    .line_spacing(LineSpacing::new().after(BLOCK_SPACING))
                    .add_run(Run::new().add_text(text.as_str()));
                docx.add_paragraph(para)
            }
        }
    }

    /// The trailing section: a left-aligned heading, then one citation per
    /// source with its address in link colour
    fn process_sources_block(&mut self, docx: Docx, block: &DocumentBlock) -> Docx {
        match block {
            DocumentBlock::Heading { runs, .. } => {
                let para = Paragraph::new()
                    .style("Heading2")
                    .line_spacing(LineSpacing::new().before(SOURCES_BEFORE).after(SOURCES_AFTER));
                docx.add_paragraph(Self::add_runs(para, runs))
            }
            DocumentBlock::Paragraph { runs, .. } => {
                let mut para = Paragraph::new().line_spacing(LineSpacing::new().after(BLOCK_SPACING));
                for (idx, run) in runs.iter().enumerate() {
                    let mut out = Self::process_run(run);
                    if idx > 0 && idx + 1 == runs.len() {
                        out = out.color(LINK_COLOR);
                    }
                    para = para.add_run(out);
                }
                docx.add_paragraph(para)
            }
            DocumentBlock::Bullet { .. } => self.process_block(docx, block),
        }
    }

    /// Build the docx document without packing it
    ///
    /// The last `1 + metadata.sources.len()` blocks are laid out as the
    /// sources section.
    pub fn build_document(&mut self, metadata: &ExportMetadata, blocks: &[DocumentBlock]) -> Docx {
        let mut docx = Docx::new();
        docx = self.styles.initialize_styles(docx);
        docx = self.process_title_page(docx, metadata);

        let trailing = (metadata.sources.len() + 1).min(blocks.len());
        let (content, sources) = blocks.split_at(blocks.len() - trailing);
        for block in content {
            docx = self.process_block(docx, block);
        }
        for block in sources {
            docx = self.process_sources_block(docx, block);
        }

        debug!("docx: laid out {} blocks", blocks.len());
        docx
    }

    /// Generate the packed DOCX file
    pub fn write(&mut self, metadata: &ExportMetadata, blocks: &[DocumentBlock]) -> Result<Vec<u8>> {
        let docx = self.build_document(metadata, blocks);

        let mut buffer = Vec::new();
        docx.build()
            .pack(&mut Cursor::new(&mut buffer))
            .map_err(|e| Error::package(e.to_string()))?;

        Ok(buffer)
    }
}
