//! The version-control collaborator.
//!
//! Synchronization only needs a handful of repository operations, expressed
//! by [`VersionControl`]. [`Git`] implements them by running the `git` binary
//! as a subprocess (`git -C <repo> …`); tests substitute in-memory fakes.
//!
//! Calls carry no timeout: a hanging subprocess blocks the caller.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::VcsError;

/// Repository operations used by a synchronization run.
pub trait VersionControl: Send + Sync {
    /// `git checkout <revision>`.
    fn checkout(&self, repo: &Path, revision: &str) -> Result<(), VcsError>;

    /// `git pull` on the current branch.
    fn pull(&self, repo: &Path) -> Result<(), VcsError>;

    /// Stage every change, including deletions.
    fn add_all(&self, repo: &Path) -> Result<(), VcsError>;

    /// Commit all staged and tracked changes with `message`.
    fn commit_all(&self, repo: &Path, message: &str) -> Result<(), VcsError>;

    /// Push the current branch to its upstream.
    fn push(&self, repo: &Path) -> Result<(), VcsError>;

    /// Full hash of the most recent commit reachable from the checkout.
    fn head_commit(&self, repo: &Path) -> Result<String, VcsError>;

    /// Committer time of the last commit touching `rel_path`, in
    /// `YYYY-MM-DD HH:MM:SS ±HHMM` form. `None` when the path has no history.
    fn last_commit_time(&self, repo: &Path, rel_path: &Path) -> Result<Option<String>, VcsError>;

    /// Paths of every tracked file, relative to the repository root.
    fn tracked_files(&self, repo: &Path) -> Result<Vec<String>, VcsError>;
}

/// [`VersionControl`] backed by the `git` command line.
#[derive(Debug, Clone)]
pub struct Git {
    program: PathBuf,
}

impl Default for Git {
    fn default() -> Self {
        Self {
            program: PathBuf::from("git"),
        }
    }
}

impl Git {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific `git` executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command_line(&self, repo: &Path, args: &[&str]) -> String {
        format!(
            "{} -C {} {}",
            self.program.display(),
            repo.display(),
            args.join(" ")
        )
    }

    /// Run `git -C <repo> <args>` and return stdout.
    fn output(&self, repo: &Path, args: &[&str]) -> Result<String, VcsError> {
        let command = self.command_line(repo, args);
        tracing::debug!("running {command}");

        let output = Command::new(&self.program)
            .arg("-C")
            .arg(repo)
            .args(args)
            .output()
            .map_err(|source| VcsError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(VcsError::CommandFailed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| VcsError::NonUtf8Output { command })
    }

    /// Like [`Git::output`] but echoes stdout to the log, for mutating commands.
    fn run_logged(&self, repo: &Path, args: &[&str]) -> Result<(), VcsError> {
        let stdout = self.output(repo, args)?;
        let stdout = stdout.trim_end();
        if !stdout.is_empty() {
            tracing::info!("{stdout}");
        }
        Ok(())
    }
}

impl VersionControl for Git {
    fn checkout(&self, repo: &Path, revision: &str) -> Result<(), VcsError> {
        self.run_logged(repo, &["checkout", revision])
    }

    fn pull(&self, repo: &Path) -> Result<(), VcsError> {
        self.run_logged(repo, &["pull"])
    }

    fn add_all(&self, repo: &Path) -> Result<(), VcsError> {
        self.run_logged(repo, &["add", "-A"])
    }

    fn commit_all(&self, repo: &Path, message: &str) -> Result<(), VcsError> {
        self.run_logged(repo, &["commit", "-a", "-m", message])
    }

    fn push(&self, repo: &Path) -> Result<(), VcsError> {
        self.run_logged(repo, &["push"])
    }

    fn head_commit(&self, repo: &Path) -> Result<String, VcsError> {
        let args = ["log", "-n1", "--format=%H", "--", "."];
        let hash = self.output(repo, &args)?.trim().to_string();
        if hash.is_empty() {
            return Err(VcsError::UnexpectedOutput {
                command: self.command_line(repo, &args),
                output: hash,
            });
        }
        Ok(hash)
    }

    fn last_commit_time(&self, repo: &Path, rel_path: &Path) -> Result<Option<String>, VcsError> {
        let rel = rel_path.to_string_lossy();
        let stamp = self.output(repo, &["log", "-n1", "--format=%ci", "--", rel.as_ref()])?;
        let stamp = stamp.trim();
        Ok((!stamp.is_empty()).then(|| stamp.to_string()))
    }

    fn tracked_files(&self, repo: &Path) -> Result<Vec<String>, VcsError> {
        let listing = self.output(repo, &["ls-files", "-z"])?;
        Ok(listing
            .split('\0')
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_binary_is_a_spawn_error() {
        let dir = TempDir::new().unwrap();
        let git = Git::with_program("/nonexistent/stylesync-git");
        let err = git.pull(dir.path()).expect_err("spawn should fail");
        assert!(matches!(err, VcsError::Spawn { .. }), "got {err:?}");
    }

    #[test]
    fn command_line_is_readable() {
        let git = Git::new();
        let line = git.command_line(Path::new("/repo"), &["log", "-n1"]);
        assert_eq!(line, "git -C /repo log -n1");
    }
}
