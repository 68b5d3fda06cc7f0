//! Source-Control Publisher
//!
//! The core never shells out directly; publishing is an injected
//! capability so everything above it can be tested without a
//! version-control tool installed. The shipped implementation drives
//! `git` and treats stage/commit/push as one unit: the first failing step
//! aborts the sequence.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::core::{CoreError, CoreResult};

#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Suppress the console window that spawning `git` from a GUI process
/// would otherwise flash on Windows.
fn configure_command(cmd: &mut tokio::process::Command) {
    #[cfg(target_os = "windows")]
    cmd.creation_flags(CREATE_NO_WINDOW);
    #[cfg(not(target_os = "windows"))]
    let _ = cmd;
}

/// Publishing capability: hand an artifact to source control.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Stage, commit, and push `path` with the given commit message.
    ///
    /// Failure of any step fails the whole publish. The artifact itself is
    /// the caller's responsibility and is left on disk either way.
    async fn publish(&self, path: &Path, message: &str) -> CoreResult<()>;
}

/// Commit message the desktop app uses for routine stat updates.
pub fn default_commit_message(now: DateTime<Utc>) -> String {
    format!("VideoStat update {}", now.format("%Y-%m-%d %H:%M"))
}

/// Publishes by invoking `git add` / `git commit` / `git push` in a
/// repository working directory.
pub struct GitPublisher {
    repo_dir: PathBuf,
}

impl GitPublisher {
    pub fn new(repo_dir: PathBuf) -> Self {
        Self { repo_dir }
    }

    async fn run_git(&self, step: &str, args: &[&str]) -> CoreResult<()> {
        let mut cmd = tokio::process::Command::new("git");
        cmd.current_dir(&self.repo_dir).args(args);
        configure_command(&mut cmd);

        let output = cmd.output().await.map_err(|e| CoreError::PublishFailed {
            step: step.to_string(),
            detail: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(CoreError::PublishFailed {
                step: step.to_string(),
                detail: if stderr.is_empty() {
                    output.status.to_string()
                } else {
                    stderr
                },
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Publisher for GitPublisher {
    async fn publish(&self, path: &Path, message: &str) -> CoreResult<()> {
        let path_arg = path.to_string_lossy();

        self.run_git("add", &["add", path_arg.as_ref()]).await?;
        self.run_git("commit", &["commit", "-m", message]).await?;
        self.run_git("push", &["push"]).await?;

        info!(path = %path.display(), "Published export to git");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn commit_message_format() {
        let now = "2024-06-01T09:30:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(default_commit_message(now), "VideoStat update 2024-06-01 09:30");
    }

    #[tokio::test]
    async fn git_publisher_fails_outside_a_repository() {
        // Either git is missing (spawn error) or `git add` exits nonzero in
        // a directory that is not a repository; both must surface as a
        // publish failure on the first step.
        let dir = TempDir::new().unwrap();
        let artifact = dir.path().join("stats.json");
        std::fs::write(&artifact, "{}").unwrap();

        let publisher = GitPublisher::new(dir.path().to_path_buf());
        let err = publisher
            .publish(&artifact, "VideoStat update test")
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::PublishFailed { step, .. } if step == "add"));
    }
}
