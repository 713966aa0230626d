//! Targeted feedback addressed to upstream pipeline stages.
//!
//! Each review emits exactly two [`AgentFeedback`] records: one for the
//! content generator, one for the requirement extractor. The controller
//! consumes the generator-targeted record to build the next revision notes.

use serde::{Deserialize, Serialize};

use crate::task::StructuredTask;

/// Which upstream stage the feedback is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTarget {
    RequirementExtractor,
    ContentGenerator,
}

/// Severity of the feedback.
///
/// Ordinal: `Low < Medium < High`. The ordering is derived from variant
/// order, so `max()` picks the genuinely more severe label rather than the
/// lexicographically larger one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// What kind of response the feedback calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Improvement,
    Warning,
    Suggestion,
}

/// Numeric context attached to a feedback record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackContext {
    /// Overall integer score of the review that produced this feedback
    pub overall_score: u8,

    /// Weighted total before integer rounding
    pub weighted_total: f64,

    /// Requirement coverage rate in [0, 1]
    pub coverage_rate: f64,

    /// Blended alignment score in [0, 1]
    pub alignment_score: f64,

    /// Iteration the review belongs to (1-based)
    pub iteration: usize,

    /// Snapshot of the task as reviewed
    pub task: StructuredTask,
}

/// Structured critique addressed to one upstream stage.
///
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentFeedback {
    pub target: FeedbackTarget,
    pub priority: Priority,
    pub kind: FeedbackKind,
    pub message: String,

    /// Ordered specific points backing the message
    pub points: Vec<String>,

    /// Ordered concrete actions for the target to take
    pub action_items: Vec<String>,

    pub context: FeedbackContext,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_is_ordinal_not_lexicographic() {
        // Lexicographically "low" > "high"; the ordinal ranking must win.
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::Medium < Priority::High);
        assert_eq!(Priority::Low.max(Priority::High), Priority::High);
        assert_eq!(
            [Priority::Medium, Priority::Low].into_iter().max(),
            Some(Priority::Medium)
        );
    }

    #[test]
    fn test_serialized_labels() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        assert_eq!(
            serde_json::to_string(&FeedbackTarget::ContentGenerator).unwrap(),
            "\"content_generator\""
        );
        assert_eq!(
            serde_json::to_string(&FeedbackKind::Warning).unwrap(),
            "\"warning\""
        );
    }
}
