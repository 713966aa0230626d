//! Pipeline configuration.
//!
//! Configuration can be set via environment variables:
//! - `PASS_THRESHOLD` - Optional. Minimum score (1-10) to accept a draft. Defaults to `7`.
//! - `MAX_ITERATIONS` - Optional. Maximum generate/review cycles per run. Defaults to `3`.
//! - `AUTO_CONFIRM` - Optional. Proceed past clarification questions. Defaults to `false`.
//! - `PERSIST_BEST_EFFORT` - Optional. Save the final draft even when the run
//!   did not pass review. Defaults to `false`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Tunables for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Minimum integer score for a draft to be accepted
    pub pass_threshold: u8,

    /// Maximum generate/review iterations per run
    pub max_iterations: usize,

    /// Proceed even when the extractor raises clarification questions
    pub auto_confirm: bool,

    /// Persist the final draft even when the run did not pass
    pub persist_best_effort: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pass_threshold: 7,
            max_iterations: 3,
            auto_confirm: false,
            persist_best_effort: false,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` for unparseable or out-of-range
    /// values.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let pass_threshold = match std::env::var("PASS_THRESHOLD") {
            Ok(raw) => raw
                .parse::<u8>()
                .map_err(|e| ConfigError::InvalidValue("PASS_THRESHOLD".to_string(), e.to_string()))?,
            Err(_) => defaults.pass_threshold,
        };
        if !(1..=10).contains(&pass_threshold) {
            return Err(ConfigError::InvalidValue(
                "PASS_THRESHOLD".to_string(),
                format!("{} is outside 1..=10", pass_threshold),
            ));
        }

        let max_iterations = match std::env::var("MAX_ITERATIONS") {
            Ok(raw) => raw
                .parse::<usize>()
                .map_err(|e| ConfigError::InvalidValue("MAX_ITERATIONS".to_string(), e.to_string()))?,
            Err(_) => defaults.max_iterations,
        };
        if max_iterations == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_ITERATIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let auto_confirm = parse_bool("AUTO_CONFIRM", defaults.auto_confirm)?;
        let persist_best_effort = parse_bool("PERSIST_BEST_EFFORT", defaults.persist_best_effort)?;

        Ok(Self {
            pass_threshold,
            max_iterations,
            auto_confirm,
            persist_best_effort,
        })
    }
}

fn parse_bool(var: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => match raw.to_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            other => Err(ConfigError::InvalidValue(
                var.to_string(),
                other.to_string(),
            )),
        },
        Err(_) => Ok(default),
    }
}
