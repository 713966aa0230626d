//! Structured task types - the contract between extraction and generation.
//!
//! A [`StructuredTask`] is produced once per run by the requirement
//! extractor. The only field mutated afterwards is `revision_notes`,
//! refreshed by the pipeline controller between iterations.

mod structured;

pub use structured::{Intent, StructuredTask, StyleOptions};
