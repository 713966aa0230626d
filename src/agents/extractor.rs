//! Rule-based requirement extractor.
//!
//! Keyword and pattern matching over the raw request. Deliberately
//! mechanical: anything it cannot pin down becomes a blank field plus a
//! clarification question, never an error.

use async_trait::async_trait;
use regex::Regex;

use super::{Extraction, RequirementExtractor, StageError};
use crate::task::{Intent, StructuredTask};

/// Extractor driven by keyword lists and a handful of patterns.
pub struct KeywordExtractor {
    filename: Regex,
    named_document: Regex,
    quoted_title: Regex,
    unquoted_title: Regex,
    image_query: Regex,
    requirement_patterns: Vec<Regex>,
}

impl KeywordExtractor {
    pub fn new() -> Self {
        // The patterns are fixed strings; compilation cannot fail.
        Self {
            filename: Regex::new(r"[\w\-]+\.docx").unwrap(),
            named_document: Regex::new(
                r#"(?i)(?:document|file|doc)\s+(?:called|named)\s+['"]?([\w\- .]+?)['"]?(?:\s*[,.;]|\s+(?:with|titled|about|containing)|$)"#,
            )
            .unwrap(),
            quoted_title: Regex::new(r#"(?i)titled?\s*[:=]?\s*['"]([^'"]+)['"]"#).unwrap(),
            unquoted_title: Regex::new(r"(?i)title\s*[:=]\s*([^,.;\n]+)").unwrap(),
            image_query: Regex::new(
                r"(?i)(?:image|picture|photo)s?\s+(?:of|about|showing)\s+([^,.;\n]+)",
            )
            .unwrap(),
            requirement_patterns: vec![
                Regex::new(r"(?i)content\s*[:=]\s*([^.;\n]+)").unwrap(),
                Regex::new(r"(?i)introduc(?:e|ing)\s+([^,.;\n]+)").unwrap(),
                Regex::new(r"(?i)(?:covering|describing|explaining)\s+([^,.;\n]+)").unwrap(),
                Regex::new(r"(?i)\babout\s+([^,.;\n]+)").unwrap(),
            ],
        }
    }

    fn detect_intent(text: &str) -> Intent {
        let lower = text.to_lowercase();
        let has = |kws: &[&str]| kws.iter().any(|kw| lower.contains(kw));

        if has(&["create", "new document", "write", "draft", "generate"]) {
            Intent::Create
        } else if has(&["update", "append", "modify", "revise"]) {
            Intent::Update
        } else if has(&["delete", "remove"]) {
            Intent::Delete
        } else if has(&["format", "bold", "italic", "font"]) {
            Intent::Format
        } else {
            Intent::Create
        }
    }

    fn detect_style(text: &str, task: StructuredTask) -> StructuredTask {
        let lower = text.to_lowercase();
        let has = |kws: &[&str]| kws.iter().any(|kw| lower.contains(kw));

        let task = if has(&["formal", "professional", "business"]) {
            task.with_style("tone", "formal")
        } else if has(&["casual", "fun", "playful", "lighthearted"]) {
            task.with_style("tone", "casual")
        } else {
            task
        };

        if has(&["brief", "short", "concise"]) {
            task.with_style("length", "short")
        } else if has(&["detailed", "comprehensive", "thorough", "in-depth"]) {
            task.with_style("length", "long")
        } else {
            task
        }
    }

    fn parse(&self, text: &str) -> Extraction {
        let lower = text.to_lowercase();
        let mut questions = Vec::new();
        let mut task = StructuredTask::new(Self::detect_intent(text));

        // Document name: explicit .docx filename wins, then "called/named X".
        if let Some(m) = self.filename.find(text) {
            task = task.with_document_name(m.as_str());
        } else if let Some(caps) = self.named_document.captures(text) {
            task = task.with_document_name(caps[1].trim());
        } else {
            questions.push("What should the document be called?".to_string());
        }

        if let Some(caps) = self.quoted_title.captures(text) {
            task = task.with_title(caps[1].trim());
        } else if let Some(caps) = self.unquoted_title.captures(text) {
            task = task.with_title(caps[1].trim());
        }

        // Table payloads cannot be parsed out of prose; always ask.
        if ["table", "spreadsheet", "columns"]
            .iter()
            .any(|kw| lower.contains(kw))
        {
            task = task.with_table(None);
            questions.push("What data should the table contain?".to_string());
        }

        if ["image", "picture", "photo"].iter().any(|kw| lower.contains(kw)) {
            let query = self
                .image_query
                .captures(text)
                .map(|caps| caps[1].trim().to_string());
            if query.is_none() {
                questions.push("What should the image show?".to_string());
            }
            task = task.with_image(query);
        }

        for pattern in &self.requirement_patterns {
            if let Some(caps) = pattern.captures(text) {
                let requirement = caps[1].trim().to_string();
                if !requirement.is_empty()
                    && !task
                        .content_requirements()
                        .iter()
                        .any(|existing| existing == &requirement)
                {
                    task = task.with_requirement(requirement);
                }
            }
        }

        task = Self::detect_style(text, task);

        Extraction { task, questions }
    }
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RequirementExtractor for KeywordExtractor {
    async fn extract(&self, input: &str) -> Result<Extraction, StageError> {
        Ok(self.parse(input))
    }
}
