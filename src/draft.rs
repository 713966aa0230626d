//! Document draft produced by the content generator.
//!
//! A draft is created fresh on every iteration; iteration N's draft has no
//! identity link to iteration N-1's, they are related only through the task
//! they were built from.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Structural contract violations in a generated draft.
///
/// The generator contract requires default name/title rather than blanks;
/// a blank here is a programming error in the generator, not a quality
/// problem, and aborts the run.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DraftError {
    #[error("draft has an empty document name")]
    EmptyName,

    #[error("draft has an empty title")]
    EmptyTitle,
}

/// A draft document: body text plus table and image payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    /// Target document name
    name: String,

    /// Document title
    title: String,

    /// Body text (markdown-flavored)
    body: String,

    /// Ordered table payloads (rows of cells)
    tables: Vec<Vec<Vec<String>>>,

    /// Ordered image references (queries, paths, or URLs)
    images: Vec<String>,

    /// Free-form metadata about how the draft was produced
    metadata: BTreeMap<String, String>,
}

impl Draft {
    /// Create a draft with no tables, images, or metadata.
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            body: body.into(),
            tables: Vec::new(),
            images: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Append a table payload.
    pub fn with_table(mut self, table: Vec<Vec<String>>) -> Self {
        self.tables.push(table);
        self
    }

    /// Append an image reference.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.images.push(image.into());
        self
    }

    /// Record a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn tables(&self) -> &[Vec<Vec<String>>] {
        &self.tables
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Check the structural contract.
    ///
    /// An empty body or empty table/image lists are quality problems (the
    /// reviewer scores them low); an empty name or title is a contract
    /// violation.
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.name.trim().is_empty() {
            return Err(DraftError::EmptyName);
        }
        if self.title.trim().is_empty() {
            return Err(DraftError::EmptyTitle);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_empty_body() {
        let draft = Draft::new("notes.docx", "Notes", "");
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_name_and_title() {
        assert!(matches!(
            Draft::new("  ", "Notes", "body").validate(),
            Err(DraftError::EmptyName)
        ));
        assert!(matches!(
            Draft::new("notes.docx", "", "body").validate(),
            Err(DraftError::EmptyTitle)
        ));
    }

    #[test]
    fn test_tables_and_images_preserve_order() {
        let draft = Draft::new("d", "t", "b")
            .with_table(vec![vec!["a".into()]])
            .with_table(vec![vec!["b".into()]])
            .with_image("first.png")
            .with_image("second.png");

        assert_eq!(draft.tables().len(), 2);
        assert_eq!(draft.images(), &["first.png", "second.png"]);
    }
}
