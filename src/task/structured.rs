//! The structured task record and its supporting types.
//!
//! # Invariants
//! - `intent` is always one of the closed [`Intent`] set
//! - `content_requirements` preserves insertion order (each requirement is
//!   checked independently by the reviewer)
//! - After construction, only `revision_notes` is mutated, via
//!   [`StructuredTask::set_revision_notes`]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// What the user wants done with the document.
///
/// Closed set - the extractor must map every input to one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Create a new document
    Create,
    /// Modify an existing document
    Update,
    /// Delete a document
    Delete,
    /// Apply formatting to a document
    Format,
    /// Add a table to a document
    AddTable,
    /// Insert an image into a document
    InsertImage,
    /// Search for information to include
    Search,
}

impl Intent {
    /// Stable string form, matching the serialized representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Format => "format",
            Self::AddTable => "add_table",
            Self::InsertImage => "insert_image",
            Self::Search => "search",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested style options as an ordered key/value mapping.
///
/// Keys are open-ended ("tone", "length", ...); the well-known ones get
/// typed accessors. Ordering is deterministic (BTreeMap) so serialized
/// output is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleOptions(BTreeMap<String, String>);

impl StyleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a style option, replacing any previous value for the key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Look up a style option by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Requested tone ("formal", "casual", ...), if any.
    pub fn tone(&self) -> Option<&str> {
        self.get("tone")
    }

    /// Requested length ("short", "long", ...), if any.
    pub fn length(&self) -> Option<&str> {
        self.get("length")
    }

    /// True when no style preferences were captured at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over options in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Structured task extracted from a raw user request.
///
/// Created once by the requirement extractor. The pipeline controller
/// overwrites `revision_notes` between iterations; everything else is
/// read-only after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredTask {
    /// Recognized intent
    intent: Intent,

    /// Target document name, if one was captured
    document_name: Option<String>,

    /// Requested document title, if one was captured
    title: Option<String>,

    /// Ordered content requirements - each is checked independently
    content_requirements: Vec<String>,

    /// Style preferences (tone, length, ...)
    style: StyleOptions,

    /// Whether a table was requested
    include_table: bool,

    /// Table payload, if the request carried one
    table_data: Option<Vec<Vec<String>>>,

    /// Whether an image was requested
    include_image: bool,

    /// Image search query, if one was captured
    image_query: Option<String>,

    /// Reviewer feedback folded in by the controller between iterations
    revision_notes: String,
}

impl StructuredTask {
    /// Create a task with the given intent and all optional fields blank.
    pub fn new(intent: Intent) -> Self {
        Self {
            intent,
            document_name: None,
            title: None,
            content_requirements: Vec::new(),
            style: StyleOptions::new(),
            include_table: false,
            table_data: None,
            include_image: false,
            image_query: None,
            revision_notes: String::new(),
        }
    }

    /// Set the target document name.
    pub fn with_document_name(mut self, name: impl Into<String>) -> Self {
        self.document_name = Some(name.into());
        self
    }

    /// Set the requested title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Append a content requirement, preserving order.
    pub fn with_requirement(mut self, requirement: impl Into<String>) -> Self {
        self.content_requirements.push(requirement.into());
        self
    }

    /// Set a style option.
    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.set(key, value);
        self
    }

    /// Request a table, optionally with payload data.
    pub fn with_table(mut self, data: Option<Vec<Vec<String>>>) -> Self {
        self.include_table = true;
        self.table_data = data;
        self
    }

    /// Request an image, optionally with a search query.
    pub fn with_image(mut self, query: Option<String>) -> Self {
        self.include_image = true;
        self.image_query = query;
        self
    }

    // Getters - references only, the record stays immutable from outside

    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn document_name(&self) -> Option<&str> {
        self.document_name.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn content_requirements(&self) -> &[String] {
        &self.content_requirements
    }

    pub fn style(&self) -> &StyleOptions {
        &self.style
    }

    pub fn include_table(&self) -> bool {
        self.include_table
    }

    pub fn table_data(&self) -> Option<&Vec<Vec<String>>> {
        self.table_data.as_ref()
    }

    pub fn include_image(&self) -> bool {
        self.include_image
    }

    pub fn image_query(&self) -> Option<&str> {
        self.image_query.as_deref()
    }

    pub fn revision_notes(&self) -> &str {
        &self.revision_notes
    }

    /// Overwrite the revision notes.
    ///
    /// This is the only mutation permitted after construction; the
    /// controller calls it before re-invoking the generator.
    pub fn set_revision_notes(&mut self, notes: impl Into<String>) {
        self.revision_notes = notes.into();
    }
}
