//! Bullet numbering for DOCX export

use docx_rs::*;

/// Bullet numbering management for DOCX
///
/// Composed bullets no longer know which list they came from, so a single
/// definition is shared by every bullet of the document.
#[derive(Clone, Debug)]
pub struct DocxNumbering {
    bullet_id: Option<usize>,
    next_id: usize,
}

impl Default for DocxNumbering {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxNumbering {
    /// Create a new numbering manager
    pub fn new() -> Self {
        Self {
            bullet_id: None,
            next_id: 1,
        }
    }

    /// Create a list level with the specified parameters
    fn create_list_level(id: usize, text: &str) -> Level {
        let indent_size = 720 * (id + 1) as i32;

        Level::new(
            id,
            Start::new(1),
            NumberFormat::new("bullet"),
            LevelText::new(text),
            LevelJc::new("left"),
        )
        .indent(
            Some(indent_size),
            Some(SpecialIndentType::Hanging(360)),
            None,
            None,
        )
    }

    /// Returns the bullet numbering id, registering the definition on first
    /// use
    pub fn bullet_numbering(&mut self, docx: Docx) -> (Docx, usize) {
        if let Some(id) = self.bullet_id {
            return (docx, id);
        }

        let abstract_id = self.next_id;
        let numbering_id = self.next_id;
        self.next_id += 1;

        let mut bullets = AbstractNumbering::new(abstract_id);
        for (i, text) in ["•", "○", "▪"].into_iter().enumerate() {
            bullets = bullets.add_level(Self::create_list_level(i, text));
        }

        let docx = docx
            .add_abstract_numbering(bullets)
            .add_numbering(Numbering::new(numbering_id, abstract_id));

        self.bullet_id = Some(numbering_id);
        (docx, numbering_id)
    }
}
