//! Quality review - multi-dimensional scoring with targeted feedback.
//!
//! # Flow
//! 1. [`reviewer::QualityReviewer::review`] runs a reasoning pass over the
//!    draft (coverage, alignment, style) and records a [`ReasoningTrace`]
//! 2. Five weighted dimensions are scored by fixed rules
//! 3. Strengths/weaknesses/suggestions are synthesized from thresholds
//! 4. Two [`AgentFeedback`] records are addressed upstream
//!
//! The rules are explicit arithmetic on purpose: the retry loop and the
//! tests depend on the scoring being deterministic and auditable.

pub mod dimensions;
pub mod feedback;
mod reviewer;
pub mod trace;

pub use dimensions::{Dimension, DimensionScore, DimensionWeights, SCORE_MAX, SCORE_MIN};
pub use feedback::{AgentFeedback, FeedbackContext, FeedbackKind, FeedbackTarget, Priority};
pub use reviewer::{QualityReviewer, ReviewResult, DEFAULT_PASS_THRESHOLD};
pub use trace::{Observation, Polarity, ReasoningTrace, RequirementCoverage};
