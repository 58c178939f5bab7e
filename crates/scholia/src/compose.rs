//! Turns a markup tree into the block list of an exported document.

use ecow::{eco_format, EcoString};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::ExportLabels;
use crate::markup::{Element, MarkupNode, Tag};
use crate::research::{EducationLevel, GroundingSource, MaterialType, ResearchResult};

/// A span of text sharing one formatting state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TextRun {
    /// The text.
    pub text: EcoString,
    /// Bold.
    pub bold: bool,
    /// Italic.
    pub italic: bool,
    /// Single underline.
    pub underline: bool,
}

impl TextRun {
    /// An unformatted run.
    pub fn plain(text: impl Into<EcoString>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// A bold run.
    pub fn bold(text: impl Into<EcoString>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            ..Default::default()
        }
    }

    /// A run formatted by a single inline element. Only the element's own
    /// tag decides the flags; emphasis nested deeper is flattened.
    fn from_inline(el: &Element) -> Self {
        let text = el.text_content();
        match el.tag {
            Tag::Bold => Self::bold(text),
            Tag::Italic => Self {
                text,
                italic: true,
                ..Default::default()
            },
            Tag::Underline => Self {
                text,
                underline: true,
                ..Default::default()
            },
            _ => Self::plain(text),
        }
    }
}

/// A top-level unit of the exported document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentBlock {
    /// A heading of level 1 to 3.
    Heading {
        /// The heading level.
        level: u8,
        /// The heading text.
        runs: Vec<TextRun>,
    },
    /// A paragraph.
    Paragraph {
        /// The paragraph text.
        runs: Vec<TextRun>,
        /// Whether the paragraph is justified on both margins.
        justified: bool,
    },
    /// A bullet item with formatting stripped.
    Bullet {
        /// The item text.
        text: EcoString,
    },
}

impl DocumentBlock {
    /// The plain text of the block.
    pub fn text(&self) -> EcoString {
        match self {
            DocumentBlock::Heading { runs, .. } | DocumentBlock::Paragraph { runs, .. } => {
                let mut text = EcoString::new();
                for run in runs {
                    text.push_str(&run.text);
                }
                text
            }
            DocumentBlock::Bullet { text } => text.clone(),
        }
    }
}

/// A citation rendered in the trailing sources section.
pub type Citation = GroundingSource;

/// Descriptive data of the exported document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportMetadata {
    /// The document title, usually the research topic.
    pub title: EcoString,
    /// The kind of material.
    pub material_type: MaterialType,
    /// The education level.
    pub level: EducationLevel,
    /// Sources listed after the content.
    pub sources: Vec<Citation>,
}

impl ExportMetadata {
    /// Metadata of a stored result.
    pub fn from_result(result: &ResearchResult) -> Self {
        Self {
            title: result.request.topic.as_str().into(),
            material_type: result.request.material_type,
            level: result.request.level,
            sources: result.sources.clone(),
        }
    }

    /// The fixed-format line shown under the title.
    pub fn subtitle(&self, labels: &ExportLabels) -> EcoString {
        eco_format!(
            "{}: {} | {}: {}",
            labels.type_label,
            self.material_type,
            labels.level_label,
            self.level
        )
    }
}

/// What happens to a top-level element outside the block vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownTagPolicy {
    /// Skip the element with everything inside it.
    #[default]
    Drop,
    /// Keep the element's text as a plain paragraph.
    KeepText,
}

/// Options of the composer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeOptions {
    /// Handling of unknown top-level elements.
    pub unknown_tags: UnknownTagPolicy,
    /// Fixed labels.
    pub labels: ExportLabels,
}

/// Converts the children of a markup root into document blocks.
pub struct DocumentComposer<'a> {
    options: &'a ComposeOptions,
}

impl<'a> DocumentComposer<'a> {
    /// Creates a composer.
    pub fn new(options: &'a ComposeOptions) -> Self {
        Self { options }
    }

    /// Composes the content blocks followed by the sources section.
    ///
    /// Title and subtitle are left to the caller.
    pub fn compose(&self, root: &MarkupNode, metadata: &ExportMetadata) -> Vec<DocumentBlock> {
        let mut blocks = Vec::new();
        for node in root.children() {
            self.process_top_level(&mut blocks, node);
        }
        self.push_sources(&mut blocks, &metadata.sources);
        blocks
    }

    fn process_top_level(&self, blocks: &mut Vec<DocumentBlock>, node: &MarkupNode) {
        let el = match node {
            MarkupNode::Element(el) => el,
            MarkupNode::Text(text) => {
                if !text.trim().is_empty() {
                    debug!("compose: dropping bare top-level text {text:?}");
                }
                return;
            }
        };

        match &el.tag {
            Tag::Paragraph => blocks.push(DocumentBlock::Paragraph {
                runs: Self::collect_runs(el),
                justified: true,
            }),
            Tag::Heading(level) => blocks.push(DocumentBlock::Heading {
                level: *level,
                runs: Self::collect_runs(el),
            }),
            Tag::UnorderedList | Tag::OrderedList => Self::collect_items(blocks, el),
            tag => self.process_unknown(blocks, tag, el),
        }
    }

    fn process_unknown(&self, blocks: &mut Vec<DocumentBlock>, tag: &Tag, el: &Element) {
        match self.options.unknown_tags {
            UnknownTagPolicy::Drop => {
                debug!("compose: dropping top-level <{}>", tag.name());
            }
            UnknownTagPolicy::KeepText => {
                let text = el.text_content();
                if !text.trim().is_empty() {
                    blocks.push(DocumentBlock::Paragraph {
                        runs: vec![TextRun::plain(text)],
                        justified: true,
                    });
                }
            }
        }
    }

    /// One run per direct child, in order.
    fn collect_runs(el: &Element) -> Vec<TextRun> {
        el.children
            .iter()
            .map(|child| match child {
                MarkupNode::Text(text) => TextRun::plain(text.clone()),
                MarkupNode::Element(inner) => TextRun::from_inline(inner),
            })
            .collect()
    }

    /// One bullet per descendant list item, in document order.
    fn collect_items(blocks: &mut Vec<DocumentBlock>, el: &Element) {
        for child in &el.children {
            if let MarkupNode::Element(inner) = child {
                if inner.tag == Tag::ListItem {
                    blocks.push(DocumentBlock::Bullet {
                        text: inner.text_content(),
                    });
                }
                Self::collect_items(blocks, inner);
            }
        }
    }

    fn push_sources(&self, blocks: &mut Vec<DocumentBlock>, sources: &[Citation]) {
        blocks.push(DocumentBlock::Heading {
            level: 2,
            runs: vec![TextRun::plain(self.options.labels.sources_heading.clone())],
        });
        for source in sources {
            blocks.push(DocumentBlock::Paragraph {
                runs: vec![
                    TextRun::bold(eco_format!("{}: ", source.title)),
                    TextRun::plain(source.uri.as_str()),
                ],
                justified: false,
            });
        }
    }
}

/// Composes `root` with the given options.
pub fn compose(
    root: &MarkupNode,
    metadata: &ExportMetadata,
    options: &ComposeOptions,
) -> Vec<DocumentBlock> {
    DocumentComposer::new(options).compose(root, metadata)
}
