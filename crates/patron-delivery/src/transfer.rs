//! Remote transfer.
//!
//! The transport is a black box behind [`RemoteTransport`]: connect with a
//! complete [`TransferTarget`], upload one file, close. [`SftpCommand`] drives
//! the system `sftp` client in batch mode with key authentication.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::{Error, Outcome, Result};

/// Default deadline for one upload.
pub const DEFAULT_TRANSFER_TIMEOUT: Duration = Duration::from_secs(120);

/// A fully specified remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferTarget {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub private_key: PathBuf,
    pub remote_dir: String,
}

impl TransferTarget {
    /// Build a target only when every part is present and non-blank.
    ///
    /// A partial set means "not configured"; no connection is attempted with
    /// incomplete credentials.
    pub fn from_parts(
        host: Option<String>,
        port: Option<u16>,
        username: Option<String>,
        private_key: Option<PathBuf>,
        remote_dir: Option<String>,
    ) -> Option<Self> {
        let present = |s: Option<String>| s.filter(|s| !s.trim().is_empty());

        Some(Self {
            host: present(host)?,
            port: port.filter(|&p| p != 0)?,
            username: present(username)?,
            private_key: private_key.filter(|p| !p.as_os_str().is_empty())?,
            remote_dir: present(remote_dir)?,
        })
    }

    /// Remote path for a local file name.
    pub fn remote_path(&self, file_name: &str) -> String {
        if self.remote_dir.ends_with('/') {
            format!("{}{}", self.remote_dir, file_name)
        } else {
            format!("{}/{}", self.remote_dir, file_name)
        }
    }
}

/// An open session on a remote endpoint.
pub trait RemoteSession {
    /// Upload one local file to `remote_path`.
    fn upload(&mut self, local: &Path, remote_path: &str) -> Result<()>;
}

/// Something that can open sessions to a [`TransferTarget`].
pub trait RemoteTransport {
    /// Open a session.
    fn connect(&self, target: &TransferTarget) -> Result<Box<dyn RemoteSession + '_>>;
}

/// Push the artifact to the remote endpoint, when one is configured.
pub fn transfer(
    artifact: &Path,
    target: Option<&TransferTarget>,
    transport: &dyn RemoteTransport,
) -> Outcome {
    let Some(target) = target else {
        return Outcome::skipped("transfer", "remote transfer parameters not supplied");
    };

    Outcome::from_result("transfer", push(artifact, target, transport))
}

fn push(
    artifact: &Path,
    target: &TransferTarget,
    transport: &dyn RemoteTransport,
) -> Result<PathBuf> {
    let name = artifact
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::InvalidPath(artifact.to_path_buf()))?;
    let remote = target.remote_path(name);

    let mut session = transport.connect(target)?;
    session.upload(artifact, &remote)?;
    Ok(PathBuf::from(format!("{}:{}", target.host, remote)))
}

/// Transport backed by the system `sftp` client.
#[derive(Debug, Clone)]
pub struct SftpCommand {
    program: PathBuf,
    timeout: Duration,
}

impl Default for SftpCommand {
    fn default() -> Self {
        Self {
            program: PathBuf::from("sftp"),
            timeout: DEFAULT_TRANSFER_TIMEOUT,
        }
    }
}

impl SftpCommand {
    /// Create a transport with the given upload deadline.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Use a different client executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }
}

impl RemoteTransport for SftpCommand {
    fn connect(&self, target: &TransferTarget) -> Result<Box<dyn RemoteSession + '_>> {
        if !target.private_key.is_file() {
            return Err(Error::Transport(format!(
                "private key not found: {}",
                target.private_key.display()
            )));
        }
        Ok(Box::new(SftpSession {
            command: self,
            target: target.clone(),
        }))
    }
}

struct SftpSession<'a> {
    command: &'a SftpCommand,
    target: TransferTarget,
}

impl RemoteSession for SftpSession<'_> {
    fn upload(&mut self, local: &Path, remote_path: &str) -> Result<()> {
        let local_text = local
            .to_str()
            .ok_or_else(|| Error::InvalidPath(local.to_path_buf()))?;
        let batch = format!(
            "put \"{}\" \"{}\"\nbye\n",
            batch_safe(local_text)?,
            batch_safe(remote_path)?
        );

        let timeout = self.command.timeout;
        let connect_timeout = timeout.as_secs().clamp(1, 60);

        let mut child = Command::new(&self.command.program)
            .arg("-b")
            .arg("-")
            .arg("-i")
            .arg(&self.target.private_key)
            .arg("-P")
            .arg(self.target.port.to_string())
            .arg("-o")
            .arg("BatchMode=yes")
            .arg("-o")
            .arg(format!("ConnectTimeout={}", connect_timeout))
            .arg(format!("{}@{}", self.target.username, self.target.host))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                Error::Transport(format!(
                    "cannot start {}: {}",
                    self.command.program.display(),
                    e
                ))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(batch.as_bytes())
                .map_err(|e| Error::Transport(e.to_string()))?;
        }

        wait_with_deadline(&mut child, timeout)
    }
}

/// A path quoted into one batch line must not be able to end the quote or
/// the line.
fn batch_safe(path: &str) -> Result<&str> {
    if path.chars().any(|c| c == '"' || c.is_control()) {
        return Err(Error::Transport(format!(
            "path cannot be used in an sftp batch: {:?}",
            path
        )));
    }
    Ok(path)
}

fn wait_with_deadline(child: &mut Child, timeout: Duration) -> Result<()> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) if status.success() => return Ok(()),
            Ok(Some(status)) => {
                let mut stderr = String::new();
                if let Some(mut pipe) = child.stderr.take() {
                    let _ = std::io::Read::read_to_string(&mut pipe, &mut stderr);
                }
                return Err(Error::Transport(format!(
                    "sftp exited with {}: {}",
                    status,
                    stderr.trim()
                )));
            }
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::Timeout(timeout));
            }
            Ok(None) => thread::sleep(Duration::from_millis(100)),
            Err(e) => return Err(Error::Transport(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn full_target() -> TransferTarget {
        TransferTarget {
            host: "sftp.example.edu".into(),
            port: 22,
            username: "opal".into(),
            private_key: PathBuf::from("/keys/opal"),
            remote_dir: "/inbound".into(),
        }
    }

    #[derive(Default)]
    struct RecordingTransport {
        fail_connect: bool,
        uploads: RefCell<Vec<(PathBuf, String)>>,
    }

    struct RecordingSession<'a>(&'a RecordingTransport);

    impl RemoteSession for RecordingSession<'_> {
        fn upload(&mut self, local: &Path, remote_path: &str) -> Result<()> {
            self.0
                .uploads
                .borrow_mut()
                .push((local.to_path_buf(), remote_path.to_string()));
            Ok(())
        }
    }

    impl RemoteTransport for RecordingTransport {
        fn connect(&self, _target: &TransferTarget) -> Result<Box<dyn RemoteSession + '_>> {
            if self.fail_connect {
                return Err(Error::Transport("connection refused".into()));
            }
            Ok(Box::new(RecordingSession(self)))
        }
    }

    #[test]
    fn test_partial_parameters_are_not_configured() {
        let full = TransferTarget::from_parts(
            Some("h".into()),
            Some(22),
            Some("u".into()),
            Some(PathBuf::from("/k")),
            Some("/d".into()),
        );
        assert!(full.is_some());

        let missing_key = TransferTarget::from_parts(
            Some("h".into()),
            Some(22),
            Some("u".into()),
            None,
            Some("/d".into()),
        );
        assert!(missing_key.is_none());

        let blank_host = TransferTarget::from_parts(
            Some(" ".into()),
            Some(22),
            Some("u".into()),
            Some(PathBuf::from("/k")),
            Some("/d".into()),
        );
        assert!(blank_host.is_none());

        let zero_port = TransferTarget::from_parts(
            Some("h".into()),
            Some(0),
            Some("u".into()),
            Some(PathBuf::from("/k")),
            Some("/d".into()),
        );
        assert!(zero_port.is_none());
    }

    #[test]
    fn test_transfer_skipped_without_target() {
        let transport = RecordingTransport::default();
        let outcome = transfer(Path::new("/tmp/a.txt"), None, &transport);
        assert!(outcome.is_skipped());
        assert!(transport.uploads.borrow().is_empty());
    }

    #[test]
    fn test_transfer_uploads_to_remote_dir() {
        let transport = RecordingTransport::default();
        let target = full_target();
        let outcome = transfer(Path::new("/data/opal_1.txt"), Some(&target), &transport);

        assert_eq!(
            outcome,
            Outcome::Ok(PathBuf::from("sftp.example.edu:/inbound/opal_1.txt"))
        );
        assert_eq!(
            transport.uploads.borrow().as_slice(),
            &[(PathBuf::from("/data/opal_1.txt"), "/inbound/opal_1.txt".to_string())]
        );
    }

    #[test]
    fn test_transfer_failure_is_reported() {
        let transport = RecordingTransport {
            fail_connect: true,
            ..Default::default()
        };
        let outcome = transfer(Path::new("/data/a.txt"), Some(&full_target()), &transport);
        assert!(outcome.is_failed());
    }

    #[test]
    fn test_sftp_requires_key_file() {
        let transport = SftpCommand::default();
        let mut target = full_target();
        target.private_key = PathBuf::from("/definitely/not/here");
        assert!(matches!(transport.connect(&target), Err(Error::Transport(_))));
    }

    #[test]
    fn test_batch_safe_rejects_quotes_and_control_chars() {
        assert_eq!(batch_safe("/inbound/OPAL IN.txt").unwrap(), "/inbound/OPAL IN.txt");
        assert!(batch_safe("/inbound/x\".txt").is_err());
        assert!(batch_safe("/inbound/x\n!touch /tmp/owned").is_err());
        assert!(batch_safe("/inbound/x\r.txt").is_err());
        assert!(batch_safe("/inbound/x\t.txt").is_err());
    }

    /// A stand-in client that records its batch script next to itself.
    #[cfg(unix)]
    fn capturing_client(dir: &Path) -> (SftpCommand, PathBuf, TransferTarget) {
        use std::os::unix::fs::PermissionsExt;

        let program = dir.join("fake-sftp");
        std::fs::write(&program, "#!/bin/sh\ncat > \"$(dirname \"$0\")/batch\"\n").unwrap();
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();
        let key = dir.join("id_opal");
        std::fs::write(&key, "key").unwrap();

        let mut target = full_target();
        target.private_key = key;
        let command = SftpCommand::new(Duration::from_secs(10)).with_program(&program);
        (command, dir.join("batch"), target)
    }

    #[cfg(unix)]
    #[test]
    fn test_sftp_batch_puts_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let (command, batch, target) = capturing_client(dir.path());
        let artifact = dir.path().join("opal_1.txt");
        std::fs::write(&artifact, "HEADER\n").unwrap();

        let outcome = transfer(&artifact, Some(&target), &command);
        assert_eq!(
            outcome,
            Outcome::Ok(PathBuf::from("sftp.example.edu:/inbound/opal_1.txt"))
        );
        assert_eq!(
            std::fs::read_to_string(batch).unwrap(),
            format!("put \"{}\" \"/inbound/opal_1.txt\"\nbye\n", artifact.display())
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_sftp_refuses_name_that_breaks_batch_line() {
        let dir = tempfile::tempdir().unwrap();
        let (command, batch, target) = capturing_client(dir.path());
        let artifact = dir.path().join("x\"\n!touch owned #.txt");
        std::fs::write(&artifact, "HEADER\n").unwrap();

        let outcome = transfer(&artifact, Some(&target), &command);
        assert!(outcome.is_failed(), "{:?}", outcome);
        assert!(!batch.exists());
        assert!(!dir.path().join("owned").exists());
    }

    #[test]
    fn test_remote_path_join() {
        let mut target = full_target();
        assert_eq!(target.remote_path("a.zip"), "/inbound/a.zip");
        target.remote_dir = "/inbound/".into();
        assert_eq!(target.remote_path("a.zip"), "/inbound/a.zip");
    }
}
