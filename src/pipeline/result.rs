//! Run-level result types: stage snapshots, feedback summary, final result.
//!
//! Snapshots are recorded summaries for audit and result assembly; they are
//! distinct from the live task/draft/review objects the loop computes with.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::draft::Draft;
use crate::review::{AgentFeedback, FeedbackTarget, ReviewResult};
use crate::store::SaveOutcome;
use crate::task::StructuredTask;

/// Unique identifier for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Terminal state of a run.
///
/// # State Machine
/// ```text
/// Structuring -> AwaitingClarification   (questions, no auto-confirm)
///             \-> Drafting -> Reviewing -> Passed
///                          ^           \-> Drafting (retry)
///                          |            \-> Exhausted (budget spent)
///                          +-----------/
/// ```
/// Only the three terminal states appear in results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Halted before generation; the caller should re-prompt the user
    AwaitingClarification,
    /// A draft cleared the pass threshold
    Passed,
    /// The iteration budget ran out; last draft returned best-effort
    Exhausted,
}

/// Recorded summary of one pipeline step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum StageSnapshot {
    Structurize {
        task: StructuredTask,
        clarification_questions: Vec<String>,
    },
    Write {
        iteration: usize,
        name: String,
        title: String,
        body_preview: String,
        body_chars: usize,
    },
    Review {
        iteration: usize,
        score: u8,
        passed: bool,
        strengths: Vec<String>,
        suggestions: Vec<String>,
    },
}

const PREVIEW_CHARS: usize = 200;

impl StageSnapshot {
    pub fn structurize(task: &StructuredTask, questions: &[String]) -> Self {
        Self::Structurize {
            task: task.clone(),
            clarification_questions: questions.to_vec(),
        }
    }

    pub fn write(iteration: usize, draft: &Draft) -> Self {
        let body_chars = draft.body().chars().count();
        let mut body_preview: String = draft.body().chars().take(PREVIEW_CHARS).collect();
        if body_chars > PREVIEW_CHARS {
            body_preview.push_str("...");
        }
        Self::Write {
            iteration,
            name: draft.name().to_string(),
            title: draft.title().to_string(),
            body_preview,
            body_chars,
        }
    }

    pub fn review(review: &ReviewResult) -> Self {
        Self::Review {
            iteration: review.iteration,
            score: review.score,
            passed: review.passed,
            strengths: review.strengths.clone(),
            suggestions: review.suggestions.clone(),
        }
    }
}

/// Aggregate view over the run's review history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSummary {
    pub total_reviews: usize,

    /// Each iteration's score, in order
    pub score_trend: Vec<u8>,

    pub average_score: f64,

    pub latest_score: Option<u8>,

    /// Feedback records addressed to the content generator
    pub generator_feedback_count: usize,

    /// Feedback records addressed to the requirement extractor
    pub extractor_feedback_count: usize,
}

impl FeedbackSummary {
    pub fn from_history(history: &[ReviewResult]) -> Self {
        let score_trend: Vec<u8> = history.iter().map(|r| r.score).collect();
        let average_score = if score_trend.is_empty() {
            0.0
        } else {
            score_trend.iter().map(|s| *s as f64).sum::<f64>() / score_trend.len() as f64
        };
        let count_target = |target: FeedbackTarget| {
            history
                .iter()
                .flat_map(|r| r.feedbacks.iter())
                .filter(|f| f.target == target)
                .count()
        };
        Self {
            total_reviews: history.len(),
            latest_score: score_trend.last().copied(),
            average_score,
            score_trend,
            generator_feedback_count: count_target(FeedbackTarget::ContentGenerator),
            extractor_feedback_count: count_target(FeedbackTarget::RequirementExtractor),
        }
    }
}

/// Final result of one pipeline run - the serialized contract for callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub run_id: RunId,

    /// True only when the final review passed
    pub success: bool,

    /// True when the run halted on clarification questions
    pub needs_clarification: bool,

    /// The open questions, when `needs_clarification`
    pub questions: Vec<String>,

    /// Generate/review cycles consumed
    pub iterations: usize,

    pub stages: Vec<StageSnapshot>,

    pub final_draft: Option<Draft>,

    pub final_review: Option<ReviewResult>,

    /// Every feedback record emitted across the run, in order
    pub agent_feedbacks: Vec<AgentFeedback>,

    pub feedback_summary: FeedbackSummary,

    pub state: RunState,

    /// Persistence outcome, when a save was attempted
    pub save: Option<SaveOutcome>,
}

impl PipelineResult {
    /// Result for a run halted on clarification questions.
    pub fn awaiting_clarification(
        run_id: RunId,
        stages: Vec<StageSnapshot>,
        questions: Vec<String>,
    ) -> Self {
        Self {
            run_id,
            success: false,
            needs_clarification: true,
            questions,
            iterations: 0,
            stages,
            final_draft: None,
            final_review: None,
            agent_feedbacks: Vec::new(),
            feedback_summary: FeedbackSummary::from_history(&[]),
            state: RunState::AwaitingClarification,
            save: None,
        }
    }

    /// Result for a run that entered the generate/review loop.
    pub fn completed(
        run_id: RunId,
        iterations: usize,
        stages: Vec<StageSnapshot>,
        final_draft: Draft,
        history: Vec<ReviewResult>,
        save: Option<SaveOutcome>,
    ) -> Self {
        let feedback_summary = FeedbackSummary::from_history(&history);
        let agent_feedbacks: Vec<AgentFeedback> = history
            .iter()
            .flat_map(|r| r.feedbacks.iter().cloned())
            .collect();
        let final_review = history.last().cloned();
        let success = final_review.as_ref().map(|r| r.passed).unwrap_or(false);
        Self {
            run_id,
            success,
            needs_clarification: false,
            questions: Vec::new(),
            iterations,
            stages,
            final_draft: Some(final_draft),
            final_review,
            agent_feedbacks,
            feedback_summary,
            state: if success {
                RunState::Passed
            } else {
                RunState::Exhausted
            },
            save,
        }
    }
}
