//! # docforge
//!
//! Multi-agent document creation pipeline: turn an unstructured request into
//! a reviewed document draft through three cooperating roles connected by a
//! bounded revise-and-retry loop.
//!
//! ## Architecture
//!
//! ```text
//!  raw request
//!       │
//!       ▼
//!  ┌────────────────┐ questions ┌──────────────────────┐
//!  │ Requirement    ├──────────▶│ AwaitingClarification │ (terminal)
//!  │ Extractor      │           └──────────────────────┘
//!  └──────┬─────────┘
//!         │ StructuredTask
//!         ▼
//!  ┌────────────────┐  Draft  ┌────────────────┐
//!  │ Content        ├────────▶│ Quality        │
//!  │ Generator      │         │ Reviewer       │
//!  └──────▲─────────┘         └──────┬─────────┘
//!         │ revision notes           │ ReviewResult
//!         └──────────────────────────┤
//!               retry (≤ budget)     ▼
//!                          Passed / Exhausted (terminal)
//! ```
//!
//! ## Run Flow
//! 1. The extractor structures the request; open questions halt the run
//!    unless auto-confirm is set
//! 2. The generator drafts from the task; the reviewer scores the draft
//!    along five weighted dimensions and addresses feedback upstream
//! 3. The controller folds generator-targeted feedback into the task's
//!    revision notes and retries until the draft passes or the iteration
//!    budget is spent
//!
//! ## Modules
//! - `agents`: extractor/generator seams and built-in rule-based impls
//! - `task` / `draft`: the records flowing between stages
//! - `review`: multi-dimensional scoring, reasoning trace, targeted feedback
//! - `pipeline`: the controller, stage snapshots, and run results
//! - `store`: persistence seam for finished drafts
//! - `config`: run tunables (threshold, budget, auto-confirm)

pub mod agents;
pub mod config;
pub mod draft;
pub mod pipeline;
pub mod review;
pub mod store;
pub mod task;

pub use config::PipelineConfig;
pub use draft::Draft;
pub use pipeline::{DocumentPipeline, PipelineError, PipelineResult, RunState};
pub use review::{QualityReviewer, ReviewResult};
pub use task::{Intent, StructuredTask};
