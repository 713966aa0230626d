//! Pipeline controller - drives extract -> generate -> review with retries.
//!
//! # Control Flow
//! 1. Extract once. Open questions without auto-confirm halt the run.
//! 2. Loop: fold previous feedback into revision notes, generate, review.
//! 3. Stop on pass or when the iteration budget is spent.
//! 4. Assemble the result; optionally persist the final draft.
//!
//! One run owns all of its state (task, drafts, review history), so
//! concurrent runs never share anything mutable. The generator is invoked
//! at most `max_iterations` times: the draw happens before the budget
//! check, never after it.

mod result;

pub use result::{FeedbackSummary, PipelineResult, RunId, RunState, StageSnapshot};

use tracing::{debug, info, warn};

use crate::agents::{ContentGenerator, RequirementExtractor, StageError};
use crate::config::PipelineConfig;
use crate::review::{FeedbackTarget, QualityReviewer, ReviewResult};
use crate::store::DocumentStore;

/// Fatal run failures.
///
/// Quality problems never surface here - they become low scores and retry
/// feedback. Only collaborator faults and broken contracts abort a run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: &'static str,
        source: StageError,
    },

    #[error("contract violation in {stage}: {reason}")]
    ContractViolation {
        stage: &'static str,
        reason: String,
    },
}

/// Drives one document-creation run end to end.
pub struct DocumentPipeline {
    config: PipelineConfig,
    extractor: Box<dyn RequirementExtractor>,
    generator: Box<dyn ContentGenerator>,
    store: Option<Box<dyn DocumentStore>>,
}

impl DocumentPipeline {
    /// Create a pipeline with the built-in rule-based collaborators.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            extractor: Box::new(crate::agents::KeywordExtractor::new()),
            generator: Box::new(crate::agents::TemplateGenerator::new()),
            store: None,
        }
    }

    /// Replace the requirement extractor.
    pub fn with_extractor(mut self, extractor: Box<dyn RequirementExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Replace the content generator.
    pub fn with_generator(mut self, generator: Box<dyn ContentGenerator>) -> Self {
        self.generator = generator;
        self
    }

    /// Attach a document store for finished drafts.
    pub fn with_store(mut self, store: Box<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline over one raw request.
    ///
    /// # Postconditions
    /// - The generator and reviewer are each called at most
    ///   `config.max_iterations` times
    /// - The result's terminal state is one of AwaitingClarification,
    ///   Passed, or Exhausted
    ///
    /// # Errors
    /// Returns `Err` only for collaborator faults or contract violations;
    /// ambiguous input, low-quality drafts, and budget exhaustion all
    /// complete normally.
    pub async fn run(&self, raw_input: &str) -> Result<PipelineResult, PipelineError> {
        let run_id = RunId::new();
        info!(%run_id, "structuring request");

        let extraction =
            self.extractor
                .extract(raw_input)
                .await
                .map_err(|source| PipelineError::Stage {
                    stage: "extract",
                    source,
                })?;
        let mut task = extraction.task;
        let mut stages = vec![StageSnapshot::structurize(&task, &extraction.questions)];

        if !extraction.questions.is_empty() && !self.config.auto_confirm {
            info!(
                %run_id,
                questions = extraction.questions.len(),
                "halting for clarification"
            );
            return Ok(PipelineResult::awaiting_clarification(
                run_id,
                stages,
                extraction.questions,
            ));
        }

        // One reviewer per run: review history never leaks across runs.
        let reviewer = QualityReviewer::new(self.config.pass_threshold);
        let mut history: Vec<ReviewResult> = Vec::new();
        let mut final_draft = None;
        let mut iteration = 0;

        loop {
            iteration += 1;

            // Fold the previous review's generator feedback into the task.
            if let Some(prev) = history.last() {
                if !prev.passed {
                    if let Some(feedback) = prev.feedback_for(FeedbackTarget::ContentGenerator) {
                        let notes = feedback.action_items.join("; ");
                        debug!(%run_id, iteration, notes = %notes, "folding revision notes");
                        task.set_revision_notes(notes);
                    }
                }
            }

            let draft =
                self.generator
                    .generate(&task)
                    .await
                    .map_err(|source| PipelineError::Stage {
                        stage: "generate",
                        source,
                    })?;
            draft
                .validate()
                .map_err(|e| PipelineError::ContractViolation {
                    stage: "generate",
                    reason: e.to_string(),
                })?;
            stages.push(StageSnapshot::write(iteration, &draft));

            let review = reviewer.review(&draft, &task, iteration, history.last());
            info!(
                %run_id,
                iteration,
                score = review.score,
                passed = review.passed,
                "reviewed draft"
            );
            stages.push(StageSnapshot::review(&review));

            let done = review.passed || iteration == self.config.max_iterations;
            history.push(review);
            final_draft = Some(draft);
            if done {
                break;
            }
        }

        // final_draft is always set: the loop body runs at least once.
        let final_draft = final_draft.ok_or_else(|| PipelineError::ContractViolation {
            stage: "generate",
            reason: "loop produced no draft".to_string(),
        })?;
        let passed = history.last().map(|r| r.passed).unwrap_or(false);

        let save = if passed || self.config.persist_best_effort {
            match &self.store {
                Some(store) => {
                    let outcome = store.save(&final_draft).await;
                    if outcome.success {
                        info!(%run_id, location = ?outcome.location, "draft persisted");
                    } else {
                        // Persistence is informational; the run still completes.
                        warn!(%run_id, error = ?outcome.error, "draft persistence failed");
                    }
                    Some(outcome)
                }
                None => None,
            }
        } else {
            None
        };

        Ok(PipelineResult::completed(
            run_id,
            iteration,
            stages,
            final_draft,
            history,
            save,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::agents::{ContentGenerator, StageError};
    use crate::draft::Draft;
    use crate::store::InMemoryStore;
    use crate::task::StructuredTask;

    /// Generator stub producing drafts too thin to pass review, while
    /// counting invocations and recording the revision notes it saw.
    struct WeakGenerator {
        calls: Arc<AtomicUsize>,
        notes_seen: Arc<Mutex<Vec<String>>>,
    }

    impl WeakGenerator {
        fn new() -> (Self, Arc<AtomicUsize>, Arc<Mutex<Vec<String>>>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let notes = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    calls: calls.clone(),
                    notes_seen: notes.clone(),
                },
                calls,
                notes,
            )
        }
    }

    #[async_trait]
    impl ContentGenerator for WeakGenerator {
        async fn generate(&self, task: &StructuredTask) -> Result<Draft, StageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.notes_seen
                .lock()
                .unwrap()
                .push(task.revision_notes().to_string());
            Ok(Draft::new("stub.docx", "Stub", "stub body"))
        }
    }

    /// Generator stub that violates the structural contract.
    struct BrokenGenerator;

    #[async_trait]
    impl ContentGenerator for BrokenGenerator {
        async fn generate(&self, _task: &StructuredTask) -> Result<Draft, StageError> {
            Ok(Draft::new("", "", ""))
        }
    }

    fn config(max_iterations: usize) -> PipelineConfig {
        PipelineConfig {
            max_iterations,
            ..PipelineConfig::default()
        }
    }

    #[tokio::test]
    async fn test_exhausted_run_makes_exactly_max_generator_calls() {
        let (generator, calls, _) = WeakGenerator::new();
        let pipeline =
            DocumentPipeline::new(config(3)).with_generator(Box::new(generator));

        let result = pipeline
            .run("create a document called report.docx")
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(!result.success);
        assert_eq!(result.iterations, 3);
        assert_eq!(result.state, RunState::Exhausted);
        assert_eq!(result.feedback_summary.score_trend.len(), 3);
        assert_eq!(result.feedback_summary.generator_feedback_count, 3);
        assert_eq!(result.feedback_summary.extractor_feedback_count, 3);
        assert!(result.final_draft.is_some());
        assert!(result.final_review.is_some());
    }

    #[tokio::test]
    async fn test_clarification_halts_before_generation() {
        let (generator, calls, _) = WeakGenerator::new();
        let pipeline =
            DocumentPipeline::new(config(3)).with_generator(Box::new(generator));

        let result = pipeline
            .run("create a document called plan.docx with a table and an image")
            .await
            .unwrap();

        assert!(result.needs_clarification);
        assert_eq!(result.questions.len(), 2);
        assert_eq!(result.state, RunState::AwaitingClarification);
        assert_eq!(result.iterations, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(result.stages.len(), 1);
        assert!(result.final_draft.is_none());
        assert!(result.final_review.is_none());
    }

    #[tokio::test]
    async fn test_auto_confirm_proceeds_past_questions() {
        let (generator, calls, _) = WeakGenerator::new();
        let pipeline = DocumentPipeline::new(PipelineConfig {
            auto_confirm: true,
            max_iterations: 1,
            ..PipelineConfig::default()
        })
        .with_generator(Box::new(generator));

        let result = pipeline
            .run("create a document called plan.docx with a table")
            .await
            .unwrap();

        assert!(!result.needs_clarification);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.iterations, 1);
    }

    #[tokio::test]
    async fn test_revision_notes_fold_between_iterations() {
        let (generator, _, notes) = WeakGenerator::new();
        let pipeline =
            DocumentPipeline::new(config(2)).with_generator(Box::new(generator));

        pipeline
            .run("create a document called report.docx")
            .await
            .unwrap();

        let seen = notes.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].is_empty(), "first iteration has no notes");
        assert!(!seen[1].is_empty(), "second iteration carries feedback");
    }

    #[tokio::test]
    async fn test_passing_run_persists_and_stops_early() {
        let store = Arc::new(InMemoryStore::new());

        struct SharedStore(Arc<InMemoryStore>);
        #[async_trait]
        impl crate::store::DocumentStore for SharedStore {
            async fn save(&self, draft: &Draft) -> crate::store::SaveOutcome {
                self.0.save(draft).await
            }
        }

        let pipeline = DocumentPipeline::new(config(3))
            .with_store(Box::new(SharedStore(store.clone())));

        let result = pipeline
            .run(
                "create report.docx titled 'Product Launch' introducing product X, \
                 covering the launch timeline, detailed and professional",
            )
            .await
            .unwrap();

        assert!(result.success, "review: {:?}", result.final_review);
        assert_eq!(result.state, RunState::Passed);
        assert_eq!(result.iterations, 1);
        let save = result.save.expect("save attempted");
        assert!(save.success);
        assert_eq!(store.saved().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_run_skips_store_unless_best_effort() {
        let store = Arc::new(InMemoryStore::new());

        struct SharedStore(Arc<InMemoryStore>);
        #[async_trait]
        impl crate::store::DocumentStore for SharedStore {
            async fn save(&self, draft: &Draft) -> crate::store::SaveOutcome {
                self.0.save(draft).await
            }
        }

        let (generator, _, _) = WeakGenerator::new();
        let pipeline = DocumentPipeline::new(config(1))
            .with_generator(Box::new(generator))
            .with_store(Box::new(SharedStore(store.clone())));

        let result = pipeline
            .run("create a document called report.docx")
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.save.is_none());
        assert!(store.saved().is_empty());

        let (generator, _, _) = WeakGenerator::new();
        let pipeline = DocumentPipeline::new(PipelineConfig {
            max_iterations: 1,
            persist_best_effort: true,
            ..PipelineConfig::default()
        })
        .with_generator(Box::new(generator))
        .with_store(Box::new(SharedStore(store.clone())));

        let result = pipeline
            .run("create a document called report.docx")
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.save.is_some());
        assert_eq!(store.saved().len(), 1);
    }

    #[tokio::test]
    async fn test_contract_violation_is_fatal() {
        let pipeline =
            DocumentPipeline::new(config(3)).with_generator(Box::new(BrokenGenerator));

        let err = pipeline
            .run("create a document called report.docx")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::ContractViolation { stage: "generate", .. }
        ));
    }

    #[tokio::test]
    async fn test_result_serializes_with_contract_fields() {
        let (generator, _, _) = WeakGenerator::new();
        let pipeline =
            DocumentPipeline::new(config(1)).with_generator(Box::new(generator));

        let result = pipeline
            .run("create a document called report.docx")
            .await
            .unwrap();

        let json = serde_json::to_value(&result).unwrap();
        for field in [
            "success",
            "iterations",
            "stages",
            "final_draft",
            "final_review",
            "agent_feedbacks",
            "feedback_summary",
        ] {
            assert!(json.get(field).is_some(), "missing field {}", field);
        }
        assert_eq!(json["state"], "exhausted");
        assert_eq!(json["stages"][0]["stage"], "structurize");
        assert_eq!(json["feedback_summary"]["total_reviews"], 1);
    }

    #[tokio::test]
    async fn test_stage_snapshots_alternate_write_review() {
        let (generator, _, _) = WeakGenerator::new();
        let pipeline =
            DocumentPipeline::new(config(2)).with_generator(Box::new(generator));

        let result = pipeline
            .run("create a document called report.docx")
            .await
            .unwrap();

        // structurize, then (write, review) per iteration
        assert_eq!(result.stages.len(), 5);
        assert!(matches!(result.stages[0], StageSnapshot::Structurize { .. }));
        assert!(matches!(
            result.stages[1],
            StageSnapshot::Write { iteration: 1, .. }
        ));
        assert!(matches!(
            result.stages[2],
            StageSnapshot::Review { iteration: 1, .. }
        ));
        assert!(matches!(
            result.stages[4],
            StageSnapshot::Review { iteration: 2, .. }
        ));
    }
}
