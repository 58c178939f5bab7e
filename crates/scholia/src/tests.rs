use std::fmt::Write;

use super::*;
use crate::research::{EducationLevel, GroundingSource, MaterialType};

mod compose;
mod export;

fn metadata(sources: Vec<GroundingSource>) -> ExportMetadata {
    ExportMetadata {
        title: "Alterações climáticas".into(),
        material_type: MaterialType::ResearchPaper,
        level: EducationLevel::Higher,
        sources,
    }
}

fn blocks_with(markup: &str, options: &ComposeOptions) -> Vec<DocumentBlock> {
    compose(&parse_fragment(markup), &metadata(vec![]), options)
}

/// Content blocks only, without the trailing sources section.
fn content_blocks(markup: &str) -> Vec<DocumentBlock> {
    let mut blocks = blocks_with(markup, &ComposeOptions::default());
    blocks.truncate(blocks.len() - 1);
    blocks
}

/// One line per block: `kind | run | run`, with run flags as `*b*`, `_i_`
/// and `~u~`.
fn render(blocks: &[DocumentBlock]) -> String {
    let mut out = String::new();
    for block in blocks {
        out.push('\n');
        match block {
            DocumentBlock::Heading { level, runs } => {
                let _ = write!(out, "h{level}");
                render_runs(&mut out, runs);
            }
            DocumentBlock::Paragraph { runs, justified } => {
                out.push_str(if *justified { "p=" } else { "p" });
                render_runs(&mut out, runs);
            }
            DocumentBlock::Bullet { text } => {
                let _ = write!(out, "- {text:?}");
            }
        }
    }
    out.trim_start().to_owned()
}

fn render_runs(out: &mut String, runs: &[TextRun]) {
    for run in runs {
        let mut text = format!("{:?}", run.text);
        if run.bold {
            text = format!("*{text}*");
        }
        if run.italic {
            text = format!("_{text}_");
        }
        if run.underline {
            text = format!("~{text}~");
        }
        let _ = write!(out, " | {text}");
    }
}
