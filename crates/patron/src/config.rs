//! Run configuration.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use patron_common::Value;
use patron_delivery::{TransferTarget, DEFAULT_RETENTION_DAYS, DEFAULT_TRANSFER_TIMEOUT};

/// Timestamp layout inside document-mode artifact names.
pub const ARTIFACT_STAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Timestamp layout inside generated flat-line file names.
pub const FLAT_STAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Deployment tier, informational only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Environment {
    #[default]
    Dev,
    Preprod,
    Prod,
}

/// Everything one run needs, resolved up front by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub environment: Environment,
    /// Directory the artifact is written to and pruned.
    pub working_dir: PathBuf,
    /// Archive root; `<working_dir>/archive` when unset.
    pub archive_dir: Option<PathBuf>,
    /// Artifact name prefix.
    pub prefix: String,
    /// Extension enforced on flat-line file names.
    pub file_ext: String,
    /// Network share to copy the artifact to.
    pub network_dir: Option<PathBuf>,
    /// Remote endpoint, present only when fully specified.
    pub transfer: Option<TransferTarget>,
    pub retention_days: u64,
    pub transfer_timeout: Duration,
    /// Restrict the person fetch to these PIDMs.
    pub pidm_filter: Option<Vec<i64>>,
}

impl RunConfig {
    /// Create a configuration with defaults for everything optional.
    pub fn new(working_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            environment: Environment::default(),
            working_dir: working_dir.into(),
            archive_dir: None,
            prefix: prefix.into(),
            file_ext: ".txt".to_string(),
            network_dir: None,
            transfer: None,
            retention_days: DEFAULT_RETENTION_DAYS,
            transfer_timeout: DEFAULT_TRANSFER_TIMEOUT,
            pidm_filter: None,
        }
    }

    /// Resolved archive root.
    pub fn archive_root(&self) -> PathBuf {
        self.archive_dir
            .clone()
            .unwrap_or_else(|| self.working_dir.join("archive"))
    }

    /// Network share, if configured.
    pub fn network_dir(&self) -> Option<&Path> {
        self.network_dir.as_deref()
    }

    /// PIDM filter as bind values.
    pub fn pidm_values(&self) -> Option<Vec<Value>> {
        self.pidm_filter
            .as_ref()
            .map(|pidms| pidms.iter().copied().map(Value::Integer).collect())
    }

    /// `<prefix>-<YYYYMMDD-HHMMSS>`, shared by the zip and its entry.
    pub fn artifact_stem(&self, now: NaiveDateTime) -> String {
        format!("{}-{}", self.prefix, now.format(ARTIFACT_STAMP_FORMAT))
    }

    /// Flat-line file name: the source-provided name with the configured
    /// extension enforced, or `<prefix>_<YYYYMMDDHHMMSS><ext>`.
    ///
    /// A provided name that is not a single plain file name is ignored in
    /// favour of the generated one.
    pub fn flat_file_name(&self, provided: Option<&str>, now: NaiveDateTime) -> String {
        let ext = self.normalized_ext();
        let provided = provided.map(str::trim).filter(|name| !name.is_empty());
        let provided = match provided {
            Some(name) if !is_plain_file_name(name) => {
                log::warn!("Ignoring unusable file name from source: {:?}", name);
                None
            }
            other => other,
        };
        match provided {
            Some(name) if ext.is_empty() || name.ends_with(&ext) => name.to_string(),
            Some(name) => format!("{}{}", name, ext),
            None => format!("{}_{}{}", self.prefix, now.format(FLAT_STAMP_FORMAT), ext),
        }
    }

    fn normalized_ext(&self) -> String {
        let ext = self.file_ext.trim();
        if ext.is_empty() || ext.starts_with('.') {
            ext.to_string()
        } else {
            format!(".{}", ext)
        }
    }
}

fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(components.next(), Some(Component::Normal(_)))
        && components.next().is_none()
        && !name.contains(['/', '\\'])
        && !name.chars().any(char::is_control)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = RunConfig::new("/data/alma", "alma");
        assert_eq!(config.archive_root(), PathBuf::from("/data/alma/archive"));
        assert_eq!(config.retention_days, 7);
        assert!(config.network_dir().is_none());
        assert!(config.pidm_values().is_none());
    }

    #[test]
    fn test_artifact_stem() {
        let config = RunConfig::new("/w", "alma");
        assert_eq!(config.artifact_stem(at()), "alma-20261018-090507");
    }

    #[test]
    fn test_flat_file_name_rules() {
        let mut config = RunConfig::new("/w", "opal");
        config.file_ext = "txt".into();

        assert_eq!(config.flat_file_name(None, at()), "opal_20261018090507.txt");
        assert_eq!(config.flat_file_name(Some("  "), at()), "opal_20261018090507.txt");
        assert_eq!(config.flat_file_name(Some("OPAL_IN.txt"), at()), "OPAL_IN.txt");
        assert_eq!(config.flat_file_name(Some("OPAL_IN"), at()), "OPAL_IN.txt");
    }

    #[test]
    fn test_flat_file_name_rejects_paths() {
        let config = RunConfig::new("/w", "opal");
        let generated = "opal_20261018090507.txt";

        for name in ["../escaped", "/etc/passwd", "a/b", "a\\b", "..", ".", "x\"\n!touch y"] {
            assert_eq!(config.flat_file_name(Some(name), at()), generated, "{:?}", name);
        }
        assert_eq!(config.flat_file_name(Some("OPAL IN"), at()), "OPAL IN.txt");
    }

    #[test]
    fn test_config_only_carries_settings_the_run_reads() {
        let config = RunConfig::new("/w", "alma");
        let json = serde_json::to_value(&config).unwrap();
        assert!(json.get("transfer_timeout").is_some());
        assert!(json.get("query_timeout").is_none());
    }

    #[test]
    fn test_environment_serializes_uppercase() {
        let json = serde_json::to_string(&Environment::Preprod).unwrap();
        assert_eq!(json, "\"PREPROD\"");
    }
}
