//! Tri-state step results.

use std::fmt;
use std::path::PathBuf;

use crate::Result;

/// Result of one delivery step.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "status", content = "detail", rename_all = "snake_case"))]
pub enum Outcome {
    /// The step completed; holds the destination.
    Ok(PathBuf),
    /// The step was not configured.
    Skipped(String),
    /// The step failed; holds the error text.
    Failed(String),
}

impl Outcome {
    /// Convert a step result, logging it under `step`.
    pub fn from_result(step: &str, result: Result<PathBuf>) -> Self {
        match result {
            Ok(path) => {
                log::info!("{}: {}", step, path.display());
                Outcome::Ok(path)
            }
            Err(e) => {
                log::error!("{} failed: {}", step, e);
                Outcome::Failed(e.to_string())
            }
        }
    }

    /// A skipped step, logged under `step`.
    pub fn skipped(step: &str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        log::info!("{} skipped: {}", step, reason);
        Outcome::Skipped(reason)
    }

    /// Check if the step completed.
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }

    /// Check if the step was skipped.
    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped(_))
    }

    /// Check if the step failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ok(path) => write!(f, "ok ({})", path.display()),
            Outcome::Skipped(reason) => write!(f, "skipped ({})", reason),
            Outcome::Failed(reason) => write!(f, "failed ({})", reason),
        }
    }
}
