//! Per-run status report.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use patron_delivery::{Outcome, PruneSummary};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Fetch,
    Preload,
    Build,
    Serialize,
    Package,
    Archive,
    Deliver,
    Transfer,
    Prune,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetch => "fetch",
            Stage::Preload => "preload",
            Stage::Build => "build",
            Stage::Serialize => "serialize",
            Stage::Package => "package",
            Stage::Archive => "archive",
            Stage::Deliver => "deliver",
            Stage::Transfer => "transfer",
            Stage::Prune => "prune",
        };
        f.write_str(name)
    }
}

/// Where and why a run stopped before producing its artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Halt {
    pub stage: Stage,
    pub message: String,
}

/// What a run did, step by step.
///
/// Delivery steps hold `None` when the run halted before reaching them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Source rows that drive the artifact (persons or flat lines).
    pub fetched: usize,
    /// Documents built.
    pub built: usize,
    /// One message per record that failed to build.
    pub build_failures: Vec<String>,
    /// The packaged artifact in the working directory.
    pub artifact: Option<PathBuf>,
    pub halted: Option<Halt>,
    pub archive: Option<Outcome>,
    pub deliver: Option<Outcome>,
    pub transfer: Option<Outcome>,
    pub prune: Option<PruneSummary>,
    pub prune_error: Option<String>,
}

impl RunReport {
    /// The primary artifact was produced and archived.
    ///
    /// Delivery, transfer and retention problems degrade the report without
    /// changing this.
    pub fn succeeded(&self) -> bool {
        self.artifact.is_some() && self.archive.as_ref().is_some_and(Outcome::is_ok)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn step(
            f: &mut fmt::Formatter<'_>,
            name: &str,
            outcome: &Option<Outcome>,
        ) -> fmt::Result {
            match outcome {
                Some(outcome) => writeln!(f, "  {:<10} {}", name, outcome),
                None => writeln!(f, "  {:<10} not reached", name),
            }
        }

        writeln!(f, "Run {}", if self.succeeded() { "succeeded" } else { "failed" })?;
        writeln!(f, "  {:<10} {}", "fetched", self.fetched)?;
        writeln!(
            f,
            "  {:<10} {} ({} failed)",
            "built",
            self.built,
            self.build_failures.len()
        )?;
        match &self.artifact {
            Some(path) => writeln!(f, "  {:<10} {}", "artifact", path.display())?,
            None => writeln!(f, "  {:<10} none", "artifact")?,
        }
        if let Some(halt) = &self.halted {
            writeln!(f, "  {:<10} at {}: {}", "halted", halt.stage, halt.message)?;
        }
        step(f, "archive", &self.archive)?;
        step(f, "deliver", &self.deliver)?;
        step(f, "transfer", &self.transfer)?;
        match (&self.prune, &self.prune_error) {
            (Some(summary), _) => write!(
                f,
                "  {:<10} {} removed, {} kept, {} failed",
                "prune",
                summary.removed.len(),
                summary.kept,
                summary.failed
            ),
            (None, Some(error)) => write!(f, "  {:<10} failed ({})", "prune", error),
            (None, None) => write!(f, "  {:<10} not reached", "prune"),
        }
    }
}
