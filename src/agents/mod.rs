//! Collaborator seams for the pipeline.
//!
//! # Roles
//! - **RequirementExtractor**: raw text -> structured task + open questions
//! - **ContentGenerator**: structured task -> draft
//!
//! Both are async trait objects so LLM-backed implementations can slot in
//! behind the same contract as the built-in rule-based ones. The quality
//! reviewer is not a seam - its scoring logic is the core of this crate and
//! lives in [`crate::review`].
//!
//! # Contracts
//! - The extractor never fails on malformed or ambiguous text; ambiguity is
//!   expressed through clarification questions and blank fields.
//! - The generator is deterministic for identical input and never fails on a
//!   task with all-blank optional fields.
//! - `StageError` is reserved for transport-level faults (a backing model or
//!   service being unreachable), which abort the run.

pub mod extractor;
pub mod generator;

pub use extractor::KeywordExtractor;
pub use generator::TemplateGenerator;

use async_trait::async_trait;

use crate::draft::Draft;
use crate::task::StructuredTask;

/// Transport-level failure inside a collaborator.
///
/// Heuristic issues (bad coverage, missing tables) never surface here; they
/// are resolved into scores and feedback by the reviewer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StageError {
    #[error("model error: {0}")]
    Model(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Output of a requirement extraction pass.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// The structured task, with defaults where the input was silent
    pub task: StructuredTask,

    /// Ordered clarification questions; non-empty means the run needs user
    /// input unless auto-confirm is set
    pub questions: Vec<String>,
}

/// Maps an unstructured request to a structured task.
#[async_trait]
pub trait RequirementExtractor: Send + Sync {
    /// Extract a structured task from raw input.
    ///
    /// # Contract
    /// Never returns `Err` for malformed or ambiguous text - only for
    /// transport faults in LLM-backed implementations. Ambiguity goes into
    /// `Extraction::questions`.
    async fn extract(&self, input: &str) -> Result<Extraction, StageError>;
}

/// Produces a draft from a structured task.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate a draft for the task.
    ///
    /// # Contract
    /// - Deterministic given identical input (no hidden state)
    /// - Never fails for a task with all-blank optional fields; defaults
    ///   the name/title and emits placeholder content instead
    async fn generate(&self, task: &StructuredTask) -> Result<Draft, StageError>;
}
