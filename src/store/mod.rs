//! Persistence seam for finished drafts.
//!
//! The pipeline calls [`DocumentStore::save`] only after a run passes review
//! (or when configured to persist best-effort results). The outcome is
//! informational - it never changes the pass/fail decision of the run.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::draft::Draft;

/// Result of a save attempt.
///
/// Failures are carried inside the outcome instead of an `Err`, because
/// persistence is outside the run's pass/fail contract.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SaveOutcome {
    pub success: bool,

    /// Where the draft landed, when the save succeeded
    pub location: Option<String>,

    /// What went wrong, when it did not
    pub error: Option<String>,
}

impl SaveOutcome {
    pub fn saved(location: impl Into<String>) -> Self {
        Self {
            success: true,
            location: Some(location.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            location: None,
            error: Some(error.into()),
        }
    }
}

/// Consumes finished drafts.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn save(&self, draft: &Draft) -> SaveOutcome;
}

/// Store that renders drafts to markdown files under a directory.
#[derive(Debug)]
pub struct MarkdownStore {
    dir: PathBuf,
}

impl MarkdownStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file_name(draft: &Draft) -> String {
        let stem = draft
            .name()
            .trim_end_matches(".docx")
            .replace(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'), "_");
        let stem = if stem.is_empty() { "document" } else { stem.as_str() };
        format!("{}.md", stem)
    }

    fn render(draft: &Draft) -> String {
        let mut out = String::new();

        // The body already carries the title when it was generated by the
        // template generator; only prepend one if it does not.
        if !draft.body().starts_with("# ") {
            out.push_str(&format!("# {}\n\n", draft.title()));
        }
        out.push_str(draft.body());
        out.push('\n');

        for table in draft.tables() {
            out.push('\n');
            for (i, row) in table.iter().enumerate() {
                out.push_str(&format!("| {} |\n", row.join(" | ")));
                if i == 0 {
                    out.push_str(&format!("|{}\n", " --- |".repeat(row.len())));
                }
            }
        }

        for image in draft.images() {
            out.push_str(&format!("\n![{}]({})\n", image, image));
        }

        out
    }

    fn target_path(&self, draft: &Draft) -> PathBuf {
        self.dir.join(Self::file_name(draft))
    }
}

#[async_trait]
impl DocumentStore for MarkdownStore {
    async fn save(&self, draft: &Draft) -> SaveOutcome {
        let path = self.target_path(draft);
        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            return SaveOutcome::failed(format!("creating {}: {}", self.dir.display(), e));
        }
        match tokio::fs::write(&path, Self::render(draft)).await {
            Ok(()) => SaveOutcome::saved(path.display().to_string()),
            Err(e) => SaveOutcome::failed(format!("writing {}: {}", path.display(), e)),
        }
    }
}

/// Store that keeps drafts in memory; used in tests and dry runs.
#[derive(Default)]
pub struct InMemoryStore {
    saved: std::sync::Mutex<Vec<Draft>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> Vec<Draft> {
        self.saved.lock().expect("store lock poisoned").clone()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn save(&self, draft: &Draft) -> SaveOutcome {
        let mut saved = self.saved.lock().expect("store lock poisoned");
        saved.push(draft.clone());
        SaveOutcome::saved(format!("memory://{}", draft.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::Draft;

    #[tokio::test]
    async fn test_markdown_store_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = MarkdownStore::new(dir.path());
        let draft = Draft::new("report.docx", "Report", "# Report\n\nBody text.")
            .with_table(vec![
                vec!["quarter".to_string(), "revenue".to_string()],
                vec!["Q1".to_string(), "10".to_string()],
            ])
            .with_image("chart");

        let outcome = store.save(&draft).await;

        assert!(outcome.success, "{:?}", outcome.error);
        let path = dir.path().join("report.md");
        assert_eq!(outcome.location, Some(path.display().to_string()));

        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("# Report"));
        assert!(written.contains("| quarter | revenue |"));
        assert!(written.contains("| Q1 | 10 |"));
        assert!(written.contains("![chart](chart)"));
    }

    #[tokio::test]
    async fn test_markdown_store_reports_failure() {
        // A file where the directory should be makes create_dir_all fail.
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, "not a directory").unwrap();

        let store = MarkdownStore::new(&blocker);
        let outcome = store.save(&Draft::new("x.docx", "X", "body")).await;

        assert!(!outcome.success);
        assert!(outcome.error.is_some());
    }

    #[tokio::test]
    async fn test_in_memory_store_records_drafts() {
        let store = InMemoryStore::new();
        let draft = Draft::new("a.docx", "A", "body");

        let outcome = store.save(&draft).await;

        assert!(outcome.success);
        assert_eq!(store.saved(), vec![draft]);
    }

    #[test]
    fn test_file_name_sanitizes() {
        let draft = Draft::new("weird name!.docx", "T", "b");
        assert_eq!(MarkdownStore::file_name(&draft), "weird_name_.md");
    }
}
