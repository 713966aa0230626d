//! Weighted dimension scores.
//!
//! Five dimensions, each nominally in [1, 10] and clamped independently
//! before weighting. The weight mapping is normalized at construction so the
//! sum-to-one invariant holds for any inputs.

use serde::{Deserialize, Serialize};

/// Lower and upper bound for every dimension and for the overall score.
pub const SCORE_MIN: f64 = 1.0;
pub const SCORE_MAX: f64 = 10.0;

/// Clamp a raw dimension value into [1, 10].
pub fn clamp_score(value: f64) -> f64 {
    value.clamp(SCORE_MIN, SCORE_MAX)
}

/// Weight mapping over the five dimensions.
///
/// # Invariants
/// - All weights are non-negative
/// - Weights sum to 1.0 (normalized in the constructor)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionWeights {
    pub content_quality: f64,
    pub structure: f64,
    pub language: f64,
    pub format: f64,
    pub requirement_match: f64,
}

impl DimensionWeights {
    /// Build a weight mapping, normalizing so the weights sum to 1.0.
    ///
    /// Non-positive totals fall back to the default mapping.
    pub fn new(
        content_quality: f64,
        structure: f64,
        language: f64,
        format: f64,
        requirement_match: f64,
    ) -> Self {
        let total = content_quality + structure + language + format + requirement_match;
        if !(total.is_finite() && total > 0.0) {
            return Self::default();
        }
        Self {
            content_quality: content_quality / total,
            structure: structure / total,
            language: language / total,
            format: format / total,
            requirement_match: requirement_match / total,
        }
    }

    /// Sum of all weights.
    ///
    /// # Postcondition
    /// Always 1.0 up to floating-point rounding.
    pub fn sum(&self) -> f64 {
        self.content_quality + self.structure + self.language + self.format + self.requirement_match
    }
}

impl Default for DimensionWeights {
    fn default() -> Self {
        Self {
            content_quality: 0.30,
            structure: 0.20,
            language: 0.20,
            format: 0.10,
            requirement_match: 0.20,
        }
    }
}

/// One scored dimension with its explanatory feedback line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    /// Score in [1, 10]
    pub score: f64,

    /// Why this dimension scored the way it did
    pub feedback: String,
}

impl Dimension {
    /// Create a dimension, clamping the score into [1, 10].
    pub fn new(score: f64, feedback: impl Into<String>) -> Self {
        Self {
            score: clamp_score(score),
            feedback: feedback.into(),
        }
    }
}

/// The full multi-dimensional evaluation of one draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub content_quality: Dimension,
    pub structure: Dimension,
    pub language: Dimension,
    pub format: Dimension,
    pub requirement_match: Dimension,
    pub weights: DimensionWeights,
}

impl DimensionScore {
    /// Iterate over (name, dimension, weight) in the fixed dimension order.
    pub fn entries(&self) -> [(&'static str, &Dimension, f64); 5] {
        [
            ("content quality", &self.content_quality, self.weights.content_quality),
            ("structure", &self.structure, self.weights.structure),
            ("language", &self.language, self.weights.language),
            ("format", &self.format, self.weights.format),
            (
                "requirement match",
                &self.requirement_match,
                self.weights.requirement_match,
            ),
        ]
    }

    /// Weighted total, rounded to two decimals.
    ///
    /// # Postcondition
    /// Result is in [1, 10] when every dimension is in [1, 10].
    pub fn weighted_total(&self) -> f64 {
        let total: f64 = self
            .entries()
            .iter()
            .map(|(_, dim, weight)| dim.score * weight)
            .sum();
        (total * 100.0).round() / 100.0
    }

    /// Overall integer score: weighted total rounded to the nearest integer
    /// and clamped into [1, 10].
    pub fn overall(&self) -> u8 {
        clamp_score(self.weighted_total().round()) as u8
    }
}
