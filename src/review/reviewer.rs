//! The quality reviewer: scores one draft against one task.
//!
//! # Algorithm
//! 1. Reasoning pass - coverage, intent/style/instruction checks, trace
//! 2. Dimension scoring - fixed baselines adjusted by auditable rules
//! 3. Feedback synthesis - strengths/weaknesses/suggestions from thresholds
//! 4. Targeted feedback - one record each for generator and extractor
//! 5. Final score - rounded weighted total, clamped to [1, 10]
//!
//! Everything here is pure, synchronous, and deterministic: the same
//! (draft, task, iteration) always produces the same dimensions and score.
//! Heuristic problems (missing tables, short bodies, uncovered requirements)
//! become low scores and feedback, never errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::dimensions::{Dimension, DimensionScore, DimensionWeights};
use super::feedback::{AgentFeedback, FeedbackContext, FeedbackKind, FeedbackTarget, Priority};
use super::trace::{Observation, ReasoningTrace, RequirementCoverage};
use crate::draft::Draft;
use crate::task::{Intent, StructuredTask};

/// Default minimum score for a draft to be accepted.
pub const DEFAULT_PASS_THRESHOLD: u8 = 7;

/// Informal wording that clashes with a formal tone request.
const INFORMAL_MARKERS: &[&str] = &["gonna", "wanna", "lol", "awesome", "hey", "!!"];

/// Body-length bounds used when a short/long length was requested.
const SHORT_BODY_MAX_CHARS: usize = 800;
const LONG_BODY_MIN_CHARS: usize = 400;

/// Result of one review call.
///
/// Immutable once created; the controller appends it to the per-run history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewResult {
    /// Final integer score in [1, 10]
    pub score: u8,

    /// `score >= pass_threshold`
    pub passed: bool,

    pub trace: ReasoningTrace,
    pub dimensions: DimensionScore,

    /// Aggregated strengths, order-preserving deduped
    pub strengths: Vec<String>,

    /// Aggregated weaknesses, order-preserving deduped
    pub weaknesses: Vec<String>,

    /// Aggregated suggestions, order-preserving deduped
    pub suggestions: Vec<String>,

    /// Exactly two records: content generator first, extractor second
    pub feedbacks: Vec<AgentFeedback>,

    pub timestamp: DateTime<Utc>,

    /// Iteration this review belongs to (1-based)
    pub iteration: usize,
}

impl ReviewResult {
    /// The feedback addressed to the given target, if present.
    pub fn feedback_for(&self, target: FeedbackTarget) -> Option<&AgentFeedback> {
        self.feedbacks.iter().find(|f| f.target == target)
    }
}

/// Intermediate output of the reasoning pass.
struct ReasoningPass {
    trace: ReasoningTrace,
    /// Deviations attributable to style (they penalize the language dimension)
    style_deviation_count: usize,
}

/// Scores drafts against tasks with fixed, auditable rules.
///
/// Stateless: per-run review history belongs to the pipeline controller, so
/// one reviewer value can never leak state across unrelated runs.
#[derive(Debug, Clone)]
pub struct QualityReviewer {
    pass_threshold: u8,
}

impl QualityReviewer {
    /// Create a reviewer with the given pass threshold (clamped to [1, 10]).
    pub fn new(pass_threshold: u8) -> Self {
        Self {
            pass_threshold: pass_threshold.clamp(1, 10),
        }
    }

    pub fn pass_threshold(&self) -> u8 {
        self.pass_threshold
    }

    /// Review one draft against one task.
    ///
    /// # Postconditions
    /// - `result.score` is in [1, 10]
    /// - `result.feedbacks.len() == 2` (generator, then extractor)
    /// - Deterministic for identical `(draft, task, iteration, previous)`
    ///   up to the timestamp
    pub fn review(
        &self,
        draft: &Draft,
        task: &StructuredTask,
        iteration: usize,
        previous: Option<&ReviewResult>,
    ) -> ReviewResult {
        let pass = self.reasoning_pass(draft, task, previous);
        let dimensions = self.score_dimensions(draft, task, &pass);
        let (strengths, weaknesses, suggestions) = self.synthesize(&dimensions, &pass.trace);

        let weighted_total = dimensions.weighted_total();
        let score = dimensions.overall();
        let coverage_rate = pass.trace.coverage_rate();

        let context = FeedbackContext {
            overall_score: score,
            weighted_total,
            coverage_rate,
            alignment_score: pass.trace.alignment_score,
            iteration,
            task: task.clone(),
        };

        let feedbacks = vec![
            self.generator_feedback(&dimensions, &pass.trace, context.clone()),
            self.extractor_feedback(task, &pass.trace, context),
        ];

        ReviewResult {
            score,
            passed: score >= self.pass_threshold,
            trace: pass.trace,
            dimensions,
            strengths,
            weaknesses,
            suggestions,
            feedbacks,
            timestamp: Utc::now(),
            iteration,
        }
    }

    // ---- Step 1: reasoning pass ----

    fn reasoning_pass(
        &self,
        draft: &Draft,
        task: &StructuredTask,
        previous: Option<&ReviewResult>,
    ) -> ReasoningPass {
        let body = draft.body();
        let body_lower = body.to_lowercase();
        let body_chars = body.chars().count();
        let mut steps = Vec::new();
        let mut deviations = Vec::new();
        let mut observations = Vec::new();

        let task_summary = format!(
            "{} '{}' with {} requirement(s)",
            task.intent(),
            task.document_name().or(task.title()).unwrap_or("unnamed"),
            task.content_requirements().len()
        );
        let draft_summary = format!(
            "'{}' ({} chars, {} table(s), {} image(s))",
            draft.title(),
            body_chars,
            draft.tables().len(),
            draft.images().len()
        );
        steps.push(format!("Summarized task: {}", task_summary));
        steps.push(format!("Summarized draft: {}", draft_summary));

        // Requirement coverage: keyword-subset match, substring fallback.
        let requirement_coverage: Vec<RequirementCoverage> = task
            .content_requirements()
            .iter()
            .map(|req| RequirementCoverage {
                requirement: req.clone(),
                covered: requirement_covered(req, &body_lower),
            })
            .collect();
        let covered = requirement_coverage.iter().filter(|c| c.covered).count();
        steps.push(format!(
            "Checked requirement coverage: {}/{} covered",
            covered,
            requirement_coverage.len()
        ));

        // Intent alignment.
        let (intent_aligned, intent_alignment) = intent_alignment(task.intent(), draft, body_chars);
        if !intent_aligned {
            deviations.push(format!(
                "{} intent not reflected in the draft",
                task.intent()
            ));
        }
        steps.push(format!("Intent alignment: {}", intent_alignment));

        // Style consistency.
        let mut style_deviations = Vec::new();
        if task.style().tone() == Some("formal")
            && INFORMAL_MARKERS.iter().any(|m| body_lower.contains(m))
        {
            style_deviations.push("informal wording under a formal tone request".to_string());
        }
        match task.style().length() {
            Some("short") if body_chars > SHORT_BODY_MAX_CHARS => {
                style_deviations.push("body exceeds the requested short length".to_string());
            }
            Some("long") if body_chars < LONG_BODY_MIN_CHARS => {
                style_deviations.push("body falls short of the requested long length".to_string());
            }
            _ => {}
        }
        let style_consistency = if style_deviations.is_empty() {
            "consistent with the requested style".to_string()
        } else {
            style_deviations.join("; ")
        };
        steps.push(format!("Style consistency: {}", style_consistency));
        let style_deviation_count = style_deviations.len();
        deviations.extend(style_deviations);

        // Instruction alignment: title/table/image checks where they apply.
        let mut checks = Vec::new();
        if let Some(wanted) = task.title() {
            let matches = draft
                .title()
                .to_lowercase()
                .contains(&wanted.to_lowercase());
            if !matches {
                deviations.push("title does not match the requested title".to_string());
            }
            checks.push(matches);
        }
        if task.include_table() {
            let present = !draft.tables().is_empty();
            if !present {
                deviations.push("table requested but absent".to_string());
            }
            checks.push(present);
        }
        if task.include_image() {
            let present = !draft.images().is_empty();
            if !present {
                deviations.push("image requested but absent".to_string());
            }
            checks.push(present);
        }
        let instruction_score = if checks.is_empty() {
            steps.push("Instruction alignment: no checks applied".to_string());
            1.0
        } else {
            let score = checks.iter().filter(|ok| **ok).count() as f64 / checks.len() as f64;
            steps.push(format!(
                "Instruction alignment: {:.2} across {} check(s)",
                score,
                checks.len()
            ));
            score
        };

        let coverage_rate = if requirement_coverage.is_empty() {
            1.0
        } else {
            covered as f64 / requirement_coverage.len() as f64
        };
        let alignment_score = (instruction_score + coverage_rate) / 2.0;
        steps.push(format!("Blended alignment score: {:.2}", alignment_score));

        // Note how much of the previous review was addressed (trace only;
        // this never feeds into the score).
        if let Some(prev) = previous {
            let addressed = prev
                .suggestions
                .iter()
                .filter(|s| suggestion_addressed(s, &body_lower))
                .count();
            steps.push(format!(
                "Previous suggestions addressed: {}/{}",
                addressed,
                prev.suggestions.len()
            ));
        }

        // Key observations.
        if !requirement_coverage.is_empty() && covered == requirement_coverage.len() {
            observations.push(Observation::positive("all content requirements covered"));
        }
        if !requirement_coverage.is_empty() && coverage_rate < 0.5 {
            observations.push(Observation::negative(
                "fewer than half of the content requirements are covered",
            ));
        }
        if body_chars >= 500 {
            observations.push(Observation::positive("substantial body content"));
        }
        if body_chars < 50 {
            observations.push(Observation::negative("body is close to empty"));
        }
        if deviations.is_empty() {
            observations.push(Observation::positive("no deviations from the request"));
        }

        ReasoningPass {
            trace: ReasoningTrace {
                task_summary,
                draft_summary,
                requirement_coverage,
                intent_alignment,
                style_consistency,
                deviations,
                alignment_score,
                steps,
                observations,
            },
            style_deviation_count,
        }
    }

    // ---- Step 2: dimension scoring ----

    fn score_dimensions(
        &self,
        draft: &Draft,
        task: &StructuredTask,
        pass: &ReasoningPass,
    ) -> DimensionScore {
        let body = draft.body();
        let body_chars = body.chars().count();
        let coverage_rate = pass.trace.coverage_rate();

        // Content quality: body-length thresholds plus coverage.
        let mut content = 5.0;
        if body_chars >= 500 {
            content += 2.0;
        } else if body_chars >= 200 {
            content += 1.0;
        } else if body_chars < 50 {
            content -= 2.0;
        }
        content += coverage_rate * 2.0;
        let content = Dimension::new(
            content,
            format!(
                "body is {} chars with {:.0}% requirement coverage",
                body_chars,
                coverage_rate * 100.0
            ),
        );

        // Structure: headings, paragraphs, lists.
        let mut structure = 5.0;
        let h1 = body
            .lines()
            .filter(|l| l.starts_with("# "))
            .count();
        let sub_headings = body
            .lines()
            .filter(|l| l.starts_with("## ") || l.starts_with("### "))
            .count();
        if h1 > 0 {
            structure += 1.0;
        }
        if sub_headings > 0 {
            structure += 1.0;
        }
        let paragraphs = body
            .split("\n\n")
            .filter(|p| !p.trim().is_empty())
            .count();
        if paragraphs >= 3 {
            structure += 1.5;
        } else if paragraphs == 2 {
            structure += 0.5;
        }
        let has_list = body.lines().any(|l| {
            let l = l.trim_start();
            l.starts_with("- ")
                || l.starts_with("* ")
                || l
                    .split_once(". ")
                    .map(|(n, _)| n.chars().all(|c| c.is_ascii_digit()) && !n.is_empty())
                    .unwrap_or(false)
        });
        if has_list {
            structure += 1.0;
        }
        let structure = Dimension::new(
            structure,
            format!(
                "{} heading(s), {} paragraph(s), lists: {}",
                h1 + sub_headings,
                paragraphs,
                if has_list { "yes" } else { "no" }
            ),
        );

        // Language: sentence-length distribution plus style consistency.
        let mut language = 5.0;
        let sentence_words: Vec<usize> = body
            .split(['.', '!', '?'])
            .map(|s| s.split_whitespace().count())
            .filter(|words| *words > 0)
            .collect();
        if sentence_words.len() >= 2 {
            let avg = sentence_words.iter().sum::<usize>() as f64 / sentence_words.len() as f64;
            if (5.0..=40.0).contains(&avg) {
                language += 1.5;
            } else {
                language -= 1.0;
            }
            if sentence_words.iter().any(|w| *w > 60) {
                language -= 1.0;
            }
        }
        if pass.style_deviation_count == 0 {
            language += 1.5;
        } else {
            language -= (1.5 * pass.style_deviation_count as f64).min(3.0);
        }
        let language = Dimension::new(
            language,
            format!(
                "{} sentence(s), {} style deviation(s)",
                sentence_words.len(),
                pass.style_deviation_count
            ),
        );

        // Format: title, emphasis, requested tables/images.
        let mut format_score = 5.0;
        if !draft.title().trim().is_empty() {
            format_score += 1.5;
        }
        if body.contains("**") || body.contains("__") {
            format_score += 1.0;
        }
        if task.include_table() {
            if draft.tables().is_empty() {
                format_score -= 2.0;
            } else {
                format_score += 1.0;
            }
        }
        if task.include_image() {
            if draft.images().is_empty() {
                format_score -= 1.0;
            } else {
                format_score += 0.5;
            }
        }
        let format = Dimension::new(
            format_score,
            format!(
                "title: {}, tables: {}/{}, images: {}/{}",
                if draft.title().trim().is_empty() { "missing" } else { "present" },
                draft.tables().len(),
                if task.include_table() { "requested" } else { "not requested" },
                draft.images().len(),
                if task.include_image() { "requested" } else { "not requested" },
            ),
        );

        // Requirement match: a pure function of coverage.
        let uncovered = pass.trace.uncovered().len();
        let requirement_match = Dimension::new(
            1.0 + coverage_rate * 9.0,
            format!("{} requirement(s) uncovered", uncovered),
        );

        DimensionScore {
            content_quality: content,
            structure,
            language,
            format,
            requirement_match,
            weights: DimensionWeights::default(),
        }
    }

    // ---- Step 3: feedback synthesis ----

    fn synthesize(
        &self,
        dimensions: &DimensionScore,
        trace: &ReasoningTrace,
    ) -> (Vec<String>, Vec<String>, Vec<String>) {
        let mut strengths = Vec::new();
        let mut weaknesses = Vec::new();
        let mut suggestions = Vec::new();

        for (name, dim, _) in dimensions.entries() {
            if dim.score >= 7.0 {
                strengths.push(format!("{} is strong ({:.1}/10)", name, dim.score));
            } else if dim.score < 5.0 {
                weaknesses.push(format!(
                    "{} is weak ({:.1}/10): {}",
                    name, dim.score, dim.feedback
                ));
                suggestions.push(dimension_suggestion(name).to_string());
            }
        }

        for observation in &trace.observations {
            match observation.polarity {
                super::trace::Polarity::Positive => strengths.push(observation.note.clone()),
                super::trace::Polarity::Negative => weaknesses.push(observation.note.clone()),
            }
        }

        for deviation in &trace.deviations {
            suggestions.push(format!("fix: {}", deviation));
        }

        (
            dedup_preserving(strengths),
            dedup_preserving(weaknesses),
            dedup_preserving(suggestions),
        )
    }

    // ---- Step 4: targeted feedback ----

    fn generator_feedback(
        &self,
        dimensions: &DimensionScore,
        trace: &ReasoningTrace,
        context: FeedbackContext,
    ) -> AgentFeedback {
        let coverage_rate = trace.coverage_rate();
        let mut points = Vec::new();
        let mut action_items = Vec::new();

        for (name, dim, _) in dimensions.entries() {
            if dim.score < 5.0 {
                points.push(format!("{}: {}", name, dim.feedback));
            }
        }
        for deviation in &trace.deviations {
            points.push(deviation.clone());
            action_items.push(deviation_action(deviation));
        }

        let mut priority = Priority::Medium;
        if dimensions.content_quality.score < 5.0 || coverage_rate < 0.5 {
            priority = Priority::High;
        }

        let uncovered = trace.uncovered();
        if !uncovered.is_empty() {
            priority = Priority::High;
            for requirement in uncovered.iter().take(3) {
                action_items.push(format!("cover requirement: {}", requirement));
            }
        }

        let (kind, message) = if priority == Priority::High {
            (
                FeedbackKind::Improvement,
                "Draft needs substantive rework before it can pass review.".to_string(),
            )
        } else if points.is_empty() {
            (
                FeedbackKind::Suggestion,
                "Draft is in good shape; only minor polish is possible.".to_string(),
            )
        } else {
            (
                FeedbackKind::Improvement,
                "Draft is close; address the listed points.".to_string(),
            )
        };

        AgentFeedback {
            target: FeedbackTarget::ContentGenerator,
            priority,
            kind,
            message,
            points: dedup_preserving(points),
            action_items: dedup_preserving(action_items),
            context,
        }
    }

    fn extractor_feedback(
        &self,
        task: &StructuredTask,
        trace: &ReasoningTrace,
        context: FeedbackContext,
    ) -> AgentFeedback {
        let mut points = Vec::new();
        let mut action_items = Vec::new();

        if task.content_requirements().is_empty() {
            points.push("no content requirements were captured".to_string());
            action_items.push("probe the request for concrete content requirements".to_string());
        }
        if task.title().is_none() && trace.alignment_score < 0.7 {
            points.push("no title captured while alignment is low".to_string());
            action_items.push("ask the user for a document title".to_string());
        }
        if task.include_table() && task.table_data().is_none() {
            points.push("table requested but no table data captured".to_string());
            action_items.push("ask the user for the table contents".to_string());
        }
        if task.include_image() && task.image_query().is_none() {
            points.push("image requested but no image query captured".to_string());
            action_items.push("ask the user what the image should show".to_string());
        }
        if task.style().is_empty() {
            points.push("no style preferences captured".to_string());
            action_items.push("ask about tone and length preferences".to_string());
        }

        let escalated = !points.is_empty();
        let (priority, kind, message) = if escalated {
            (
                Priority::Medium,
                FeedbackKind::Warning,
                "Extraction left gaps that limit generation quality.".to_string(),
            )
        } else {
            (
                Priority::Low,
                FeedbackKind::Suggestion,
                "No extraction issues found.".to_string(),
            )
        };

        AgentFeedback {
            target: FeedbackTarget::RequirementExtractor,
            priority,
            kind,
            message,
            points,
            action_items,
            context,
        }
    }
}

impl Default for QualityReviewer {
    fn default() -> Self {
        Self::new(DEFAULT_PASS_THRESHOLD)
    }
}

/// Keyword-subset coverage check.
///
/// Covered when any requirement token longer than 2 chars appears in the
/// body (case-insensitive); requirements with no such tokens fall back to an
/// exact substring match.
fn requirement_covered(requirement: &str, body_lower: &str) -> bool {
    let tokens: Vec<String> = requirement
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() > 2)
        .map(str::to_string)
        .collect();

    if tokens.is_empty() {
        return body_lower.contains(&requirement.to_lowercase());
    }
    tokens.iter().any(|token| body_lower.contains(token))
}

/// Token-prefix match: a past suggestion counts as addressed when one of its
/// longer tokens prefixes a token of the new body.
fn suggestion_addressed(suggestion: &str, body_lower: &str) -> bool {
    let body_tokens: Vec<&str> = body_lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    suggestion
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() > 3)
        .any(|token| body_tokens.iter().any(|bt| bt.starts_with(token)))
}

fn intent_alignment(intent: Intent, draft: &Draft, body_chars: usize) -> (bool, String) {
    match intent {
        Intent::Create => {
            if body_chars > 50 {
                (true, "create intent backed by a real body".to_string())
            } else {
                (false, "create intent but the body is too short".to_string())
            }
        }
        Intent::Update => {
            if !draft.body().trim().is_empty() {
                (true, "update intent with replacement content".to_string())
            } else {
                (false, "update intent with nothing to apply".to_string())
            }
        }
        Intent::AddTable => {
            if !draft.tables().is_empty() {
                (true, "table intent with table payload".to_string())
            } else {
                (false, "table intent without a table payload".to_string())
            }
        }
        Intent::InsertImage => {
            if !draft.images().is_empty() {
                (true, "image intent with image reference".to_string())
            } else {
                (false, "image intent without an image reference".to_string())
            }
        }
        Intent::Delete | Intent::Format | Intent::Search => {
            (true, format!("{} intent needs no draft evidence", intent))
        }
    }
}

fn dimension_suggestion(name: &str) -> &'static str {
    match name {
        "content quality" => "expand the body and cover the stated requirements",
        "structure" => "add headings and split the text into paragraphs",
        "language" => "vary sentence length and match the requested style",
        "format" => "add a title, emphasis, and any requested tables or images",
        _ => "address the uncovered content requirements",
    }
}

fn deviation_action(deviation: &str) -> String {
    if deviation.contains("table") {
        "add the requested table to the draft".to_string()
    } else if deviation.contains("image") {
        "include the requested image reference".to_string()
    } else if deviation.contains("title") {
        "set the draft title to match the requested title".to_string()
    } else {
        format!("address: {}", deviation)
    }
}

fn dedup_preserving(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
