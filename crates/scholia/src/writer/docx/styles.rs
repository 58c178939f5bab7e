//! Document style management for DOCX export

use docx_rs::*;

/// Document style management
#[derive(Clone, Debug, Default)]
pub struct DocxStyles {
    initialized: bool,
}

impl DocxStyles {
    /// Create a new style manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a heading style with the specified parameters
    fn create_heading_style(name: &str, display_name: &str, size: usize) -> Style {
        Style::new(name, StyleType::Paragraph)
            .name(display_name)
            .size(size)
            .bold()
    }

    /// Add the styles used by the writer, once per document
    pub fn initialize_styles(&mut self, docx: Docx) -> Docx {
        if self.initialized {
            return docx;
        }
        self.initialized = true;

        let title = Style::new("Title", StyleType::Paragraph)
            .name("Title")
            .size(48)
            .bold()
            .align(AlignmentType::Center);

        let subtitle = Style::new("Subtitle", StyleType::Paragraph)
            .name("Subtitle")
            .size(24)
            .italic()
            .align(AlignmentType::Center);

        let heading1 = Self::create_heading_style("Heading1", "Heading 1", 32);
        let heading2 = Self::create_heading_style("Heading2", "Heading 2", 28);
        let heading3 = Self::create_heading_style("Heading3", "Heading 3", 26);

        docx.add_style(title)
            .add_style(subtitle)
            .add_style(heading1)
            .add_style(heading2)
            .add_style(heading3)
    }
}
