//! Git-backed artifact store
//!
//! The workspace lives on a dedicated `rhizome` branch so whatever branch
//! the host repository had checked out never sees mid-beat state. Opening
//! the store initializes the repository when none exists yet.

use async_trait::async_trait;
use rhizome_application::ports::artifact_store::{ArtifactStore, StoreError};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

const BRANCH: &str = "rhizome";
const RHIZOME_DIR: &str = ".rhizome";
const COMPOST_PATH: &str = ".rhizome/compost.json";

/// Artifact store over a real git work tree.
pub struct GitWorkspace {
    root: PathBuf,
}

impl GitWorkspace {
    /// Open (or create) a workspace rooted at `root`.
    ///
    /// Ensures the directory exists, the repository is initialized, and the
    /// `rhizome` branch is checked out. On a repository without history the
    /// branch is born orphaned with an empty initial commit, so later
    /// commits always have a parent.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        if which::which("git").is_err() {
            return Err(StoreError::Unavailable(
                "git not found on PATH".to_string(),
            ));
        }

        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        let root = tokio::fs::canonicalize(&root).await?;

        let workspace = Self { root };
        workspace.ensure_branch().await?;
        tokio::fs::create_dir_all(workspace.root.join(RHIZOME_DIR)).await?;
        info!("Git workspace ready at {}", workspace.root.display());
        Ok(workspace)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Recent checkpoint history, one line per commit.
    pub async fn log(&self, n: usize) -> Result<String, StoreError> {
        self.git(&["log", &format!("-{n}"), "--oneline"]).await
    }

    async fn ensure_branch(&self) -> Result<(), StoreError> {
        if !self.root.join(".git").exists() {
            self.git(&["init"]).await?;
        }

        let branches = self.git(&["branch", "--list", BRANCH]).await?;
        if branches.trim().is_empty() {
            if self.git(&["rev-parse", "HEAD"]).await.is_ok() {
                self.git(&["branch", BRANCH]).await?;
            } else {
                // No history yet: the branch has to be born orphaned
                self.git(&["checkout", "--orphan", BRANCH]).await?;
                self.git(&["commit", "--allow-empty", "-m", "rhizome: init"])
                    .await?;
                return Ok(());
            }
        }

        let current = self.git(&["branch", "--show-current"]).await?;
        if current.trim() != BRANCH {
            self.git(&["checkout", BRANCH]).await?;
        }
        Ok(())
    }

    async fn git(&self, args: &[&str]) -> Result<String, StoreError> {
        debug!("git {}", args.join(" "));
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StoreError::CommandFailed(format!(
                "git {}: {}",
                args.join(" "),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl ArtifactStore for GitWorkspace {
    async fn read_file(&self, path: &str) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(self.root.join(path)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<(), StoreError> {
        let full = self.root.join(path);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, content).await?;
        Ok(())
    }

    async fn delete_file(&self, path: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.root.join(path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn list_files(&self) -> Result<Vec<String>, StoreError> {
        let output = self.git(&["ls-files"]).await?;
        Ok(output
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn commit(&self, message: &str) -> Result<Option<String>, StoreError> {
        self.git(&["add", "-A"]).await?;
        let status = self.git(&["status", "--porcelain"]).await?;
        if status.trim().is_empty() {
            return Ok(None);
        }
        self.git(&["commit", "-m", message]).await?;
        let head = self.git(&["rev-parse", "HEAD"]).await?;
        Ok(Some(head.trim().to_string()))
    }

    async fn diff(&self) -> Result<String, StoreError> {
        self.git(&["diff"]).await
    }

    fn compost_path(&self) -> &str {
        COMPOST_PATH
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn git_missing() -> bool {
        which::which("git").is_err()
    }

    /// Pre-seed the repo with an identity so commits work on machines
    /// without a global git config.
    async fn open_workspace(dir: &TempDir) -> GitWorkspace {
        for args in [
            &["init"][..],
            &["config", "user.name", "rhizome"],
            &["config", "user.email", "rhizome@localhost"],
        ] {
            let status = std::process::Command::new("git")
                .args(args)
                .current_dir(dir.path())
                .output()
                .unwrap();
            assert!(status.status.success(), "git {args:?} failed");
        }
        GitWorkspace::open(dir.path()).await.unwrap()
    }

    #[tokio::test]
    async fn test_open_creates_branch_and_rhizome_dir() {
        if git_missing() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let ws = open_workspace(&dir).await;

        let current = ws.git(&["branch", "--show-current"]).await.unwrap();
        assert_eq!(current.trim(), "rhizome");
        assert!(ws.root().join(".rhizome").is_dir());

        let history = ws.log(5).await.unwrap();
        assert!(history.contains("rhizome: init"));
    }

    #[tokio::test]
    async fn test_open_is_idempotent() {
        if git_missing() {
            return;
        }
        let dir = TempDir::new().unwrap();
        open_workspace(&dir).await;
        let again = GitWorkspace::open(dir.path()).await.unwrap();
        let current = again.git(&["branch", "--show-current"]).await.unwrap();
        assert_eq!(current.trim(), "rhizome");
    }

    #[tokio::test]
    async fn test_write_read_delete_round_trip() {
        if git_missing() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let ws = open_workspace(&dir).await;

        assert_eq!(ws.read_file("notes/a.md").await.unwrap(), None);
        ws.write_file("notes/a.md", "harvest").await.unwrap();
        assert_eq!(
            ws.read_file("notes/a.md").await.unwrap().as_deref(),
            Some("harvest")
        );

        ws.delete_file("notes/a.md").await.unwrap();
        assert_eq!(ws.read_file("notes/a.md").await.unwrap(), None);
        // Deleting again is fine
        ws.delete_file("notes/a.md").await.unwrap();
    }

    #[tokio::test]
    async fn test_commit_returns_id_only_when_dirty() {
        if git_missing() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let ws = open_workspace(&dir).await;

        ws.write_file("artifact.txt", "v1").await.unwrap();
        let first = ws.commit("beat 0").await.unwrap();
        assert!(first.is_some());

        // Nothing changed since
        assert_eq!(ws.commit("beat 1").await.unwrap(), None);

        ws.write_file("artifact.txt", "v2").await.unwrap();
        let third = ws.commit("beat 2").await.unwrap();
        assert!(third.is_some());
        assert_ne!(first, third);
    }

    #[tokio::test]
    async fn test_list_files_shows_committed_paths() {
        if git_missing() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let ws = open_workspace(&dir).await;

        ws.write_file("top.txt", "x").await.unwrap();
        ws.write_file("sub/inner.txt", "y").await.unwrap();
        ws.commit("seed").await.unwrap();

        let files = ws.list_files().await.unwrap();
        assert!(files.contains(&"top.txt".to_string()));
        assert!(files.contains(&"sub/inner.txt".to_string()));
    }
}
