//! Reasoning trace recorded during a review pass.
//!
//! The trace is an audit artifact: it explains how the reviewer read the
//! draft before any dimension arithmetic. Computed once per review call,
//! never mutated afterwards.

use serde::{Deserialize, Serialize};

/// Coverage verdict for a single content requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementCoverage {
    /// The requirement text, as extracted
    pub requirement: String,

    /// Whether the draft body textually satisfies it
    pub covered: bool,
}

/// Polarity of a key observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Positive,
    Negative,
}

/// One tagged observation made while reading the draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub polarity: Polarity,
    pub note: String,
}

impl Observation {
    pub fn positive(note: impl Into<String>) -> Self {
        Self {
            polarity: Polarity::Positive,
            note: note.into(),
        }
    }

    pub fn negative(note: impl Into<String>) -> Self {
        Self {
            polarity: Polarity::Negative,
            note: note.into(),
        }
    }
}

/// Full reasoning record for one review call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningTrace {
    /// One-line summary of the task under review
    pub task_summary: String,

    /// One-line summary of the draft under review
    pub draft_summary: String,

    /// Ordered per-requirement coverage verdicts
    pub requirement_coverage: Vec<RequirementCoverage>,

    /// Free-text verdict on intent alignment
    pub intent_alignment: String,

    /// Free-text verdict on style consistency
    pub style_consistency: String,

    /// Ordered deviation points (instruction or style violations)
    pub deviations: Vec<String>,

    /// Blended alignment score in [0, 1]
    pub alignment_score: f64,

    /// Ordered reasoning steps, for audit and debugging
    pub steps: Vec<String>,

    /// Ordered key observations tagged positive/negative
    pub observations: Vec<Observation>,
}

impl ReasoningTrace {
    /// Fraction of requirements covered; 1.0 when there are none.
    pub fn coverage_rate(&self) -> f64 {
        if self.requirement_coverage.is_empty() {
            return 1.0;
        }
        let covered = self
            .requirement_coverage
            .iter()
            .filter(|c| c.covered)
            .count();
        covered as f64 / self.requirement_coverage.len() as f64
    }

    /// Requirements the draft failed to cover, in order.
    pub fn uncovered(&self) -> Vec<&str> {
        self.requirement_coverage
            .iter()
            .filter(|c| !c.covered)
            .map(|c| c.requirement.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace_with(coverage: Vec<RequirementCoverage>) -> ReasoningTrace {
        ReasoningTrace {
            task_summary: String::new(),
            draft_summary: String::new(),
            requirement_coverage: coverage,
            intent_alignment: String::new(),
            style_consistency: String::new(),
            deviations: Vec::new(),
            alignment_score: 1.0,
            steps: Vec::new(),
            observations: Vec::new(),
        }
    }

    #[test]
    fn test_empty_coverage_is_vacuously_full() {
        assert_eq!(trace_with(Vec::new()).coverage_rate(), 1.0);
    }

    #[test]
    fn test_coverage_rate_and_uncovered() {
        let trace = trace_with(vec![
            RequirementCoverage {
                requirement: "a".into(),
                covered: true,
            },
            RequirementCoverage {
                requirement: "b".into(),
                covered: false,
            },
        ]);
        assert!((trace.coverage_rate() - 0.5).abs() < 1e-9);
        assert_eq!(trace.uncovered(), vec!["b"]);
    }
}
