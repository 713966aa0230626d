//! Template-based content generator.
//!
//! Assembles a markdown draft from the structured task. Deliberately free of
//! clocks, randomness, and hidden state - the same task always yields the
//! same draft, which the retry loop and the tests rely on.

use async_trait::async_trait;

use super::{ContentGenerator, StageError};
use crate::draft::Draft;
use crate::task::StructuredTask;

const DEFAULT_NAME: &str = "untitled.docx";
const DEFAULT_TITLE: &str = "Untitled Document";

/// Generator that expands a task into sectioned markdown.
#[derive(Debug, Default)]
pub struct TemplateGenerator;

impl TemplateGenerator {
    pub fn new() -> Self {
        Self
    }

    fn section_heading(requirement: &str) -> String {
        let mut chars = requirement.trim().chars();
        match chars.next() {
            Some(first) => format!("{}{}", first.to_uppercase(), chars.as_str()),
            None => "Section".to_string(),
        }
    }

    fn elaborate(requirement: &str, task: &StructuredTask) -> String {
        let formal = task.style().tone() == Some("formal");
        let opener = if formal {
            format!("This section addresses {}.", requirement.trim())
        } else {
            format!("Here is what you need to know about {}.", requirement.trim())
        };

        match task.style().length() {
            Some("short") => opener,
            Some("long") => format!(
                "{} The topic is developed in depth below, including the relevant \
                 background, the current state, and the implications for the reader. \
                 Supporting detail is laid out point by point so that each aspect of \
                 {} can be followed without prior context.",
                opener,
                requirement.trim()
            ),
            _ => format!(
                "{} The key points are summarized below with enough supporting \
                 detail to stand on their own.",
                opener
            ),
        }
    }

    fn build_body(task: &StructuredTask, title: &str) -> String {
        let mut parts = vec![format!("# {}", title)];

        if task.content_requirements().is_empty() {
            parts.push("Content to be provided.".to_string());
        } else {
            for requirement in task.content_requirements() {
                parts.push(format!("## {}", Self::section_heading(requirement)));
                parts.push(Self::elaborate(requirement, task));
            }
        }

        if !task.revision_notes().is_empty() {
            parts.push("## Revisions".to_string());
            let notes: Vec<String> = task
                .revision_notes()
                .split(';')
                .map(str::trim)
                .filter(|note| !note.is_empty())
                .map(|note| format!("- {}", note))
                .collect();
            parts.push(notes.join("\n"));
        }

        parts.join("\n\n")
    }
}

#[async_trait]
impl ContentGenerator for TemplateGenerator {
    async fn generate(&self, task: &StructuredTask) -> Result<Draft, StageError> {
        let name = task.document_name().unwrap_or(DEFAULT_NAME);
        let title = task.title().unwrap_or(DEFAULT_TITLE);
        let body = Self::build_body(task, title);

        let mut draft = Draft::new(name, title, body)
            .with_metadata("intent", task.intent().as_str());
        for (key, value) in task.style().iter() {
            draft = draft.with_metadata(format!("style.{}", key), value);
        }

        if task.include_table() {
            if let Some(table) = task.table_data() {
                draft = draft.with_table(table.clone());
            }
        }

        if task.include_image() {
            if let Some(query) = task.image_query() {
                draft = draft.with_image(query);
            }
        }

        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Intent;

    async fn generate(task: &StructuredTask) -> Draft {
        TemplateGenerator::new().generate(task).await.unwrap()
    }

    #[tokio::test]
    async fn test_blank_task_gets_defaults() {
        let draft = generate(&StructuredTask::new(Intent::Create)).await;

        assert_eq!(draft.name(), DEFAULT_NAME);
        assert_eq!(draft.title(), DEFAULT_TITLE);
        assert!(draft.body().contains("Content to be provided."));
        assert!(draft.validate().is_ok());
    }

    #[tokio::test]
    async fn test_deterministic_for_identical_input() {
        let task = StructuredTask::new(Intent::Create)
            .with_document_name("plan.docx")
            .with_title("Launch Plan")
            .with_requirement("timeline")
            .with_style("length", "long");

        assert_eq!(generate(&task).await, generate(&task).await);
    }

    #[tokio::test]
    async fn test_requirements_become_sections() {
        let task = StructuredTask::new(Intent::Create)
            .with_title("Handbook")
            .with_requirement("onboarding process")
            .with_requirement("security policy");
        let draft = generate(&task).await;

        assert!(draft.body().contains("## Onboarding process"));
        assert!(draft.body().contains("## Security policy"));
    }

    #[tokio::test]
    async fn test_revision_notes_reach_body() {
        let mut task = StructuredTask::new(Intent::Create).with_title("Report");
        task.set_revision_notes("expand the summary; add a closing section");
        let draft = generate(&task).await;

        assert!(draft.body().contains("## Revisions"));
        assert!(draft.body().contains("- expand the summary"));
        assert!(draft.body().contains("- add a closing section"));
    }

    #[tokio::test]
    async fn test_table_payload_is_carried() {
        let rows = vec![vec!["q".to_string(), "revenue".to_string()]];
        let task = StructuredTask::new(Intent::Create)
            .with_document_name("sales.docx")
            .with_title("Sales")
            .with_table(Some(rows.clone()));
        let draft = generate(&task).await;

        assert_eq!(draft.tables(), &[rows]);
    }

    #[tokio::test]
    async fn test_requested_table_without_payload_yields_none() {
        let task = StructuredTask::new(Intent::Create)
            .with_title("Sales")
            .with_table(None);
        let draft = generate(&task).await;

        assert!(draft.tables().is_empty());
    }
}
