// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Working-copy context for prompt submission.
//!
//! Produces `[Context] Branch: main | Git: 2 modified | Active: <task>`.
//! Every part is optional; git failures and timeouts just drop that part.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::engine_core::constants::{limits, timeouts};

/// Counts from `git status --porcelain`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GitStatus {
    pub modified: usize,
    pub added: usize,
    pub deleted: usize,
    /// Every non-empty status line, whatever its code
    pub total: usize,
}

impl GitStatus {
    pub fn parse_porcelain(output: &str) -> Self {
        let mut status = GitStatus::default();
        for line in output.lines().filter(|l| !l.trim().is_empty()) {
            status.total += 1;
            if line.starts_with(" M") || line.starts_with("M ") {
                status.modified += 1;
            } else if line.starts_with("A ") || line.starts_with("??") {
                status.added += 1;
            } else if line.starts_with(" D") || line.starts_with("D ") {
                status.deleted += 1;
            }
        }
        status
    }

    /// `3 modified, 1 added/untracked`, or `None` when nothing is counted.
    pub fn describe(&self) -> Option<String> {
        let mut parts = Vec::new();
        if self.modified > 0 {
            parts.push(format!("{} modified", self.modified));
        }
        if self.added > 0 {
            parts.push(format!("{} added/untracked", self.added));
        }
        if self.deleted > 0 {
            parts.push(format!("{} deleted", self.deleted));
        }
        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

/// Run git with a deadline. `None` on spawn failure, timeout or non-zero exit.
async fn run_git(args: &[&str], deadline: Duration) -> Option<String> {
    let child = Command::new("git")
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(deadline, child).await {
        Ok(Ok(output)) if output.status.success() => {
            Some(String::from_utf8_lossy(&output.stdout).into_owned())
        }
        Ok(Ok(_)) => None,
        Ok(Err(e)) => {
            debug!(error = %e, "git not available");
            None
        }
        Err(_) => {
            debug!(?args, "git timed out");
            None
        }
    }
}

pub async fn git_branch() -> Option<String> {
    run_git(&["branch", "--show-current"], timeouts::GIT_BRANCH)
        .await
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub async fn git_status() -> Option<GitStatus> {
    run_git(&["status", "--porcelain"], timeouts::GIT_STATUS)
        .await
        .map(|s| GitStatus::parse_porcelain(&s))
}

/// The line after `## Current Task`, unless it is a placeholder or heading.
pub fn active_task(content: &str) -> Option<String> {
    let mut lines = content.split('\n');
    lines.by_ref().find(|l| l.contains("## Current Task"))?;
    let task = lines.next()?.trim();

    if task.is_empty() || task == "[No active task]" || task.starts_with('#') {
        return None;
    }
    Some(task.chars().take(limits::ACTIVE_TASK_MAX).collect())
}

pub fn read_active_task(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    active_task(&content)
}

/// Assemble the context message from whatever parts are available.
pub fn context_message(
    branch: Option<&str>,
    status: Option<&GitStatus>,
    task: Option<&str>,
) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(branch) = branch {
        parts.push(format!("Branch: {}", branch));
    }
    if let Some(summary) = status.and_then(GitStatus::describe) {
        parts.push(format!("Git: {}", summary));
    }
    if let Some(task) = task {
        parts.push(format!("Active: {}", task));
    }
    (!parts.is_empty()).then(|| format!("[Context] {}", parts.join(" | ")))
}

/// Gather git state and the active task, then build the message.
pub async fn gather(active_context: &Path) -> Option<String> {
    let (branch, status) = tokio::join!(git_branch(), git_status());
    let task = read_active_task(active_context);
    context_message(branch.as_deref(), status.as_ref(), task.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_porcelain_counts() {
        let output = " M src/lib.rs\nM  src/main.rs\nA  new.rs\n?? scratch.txt\n D old.rs\nR  a -> b\n";
        let status = GitStatus::parse_porcelain(output);
        assert_eq!(
            status,
            GitStatus {
                modified: 2,
                added: 2,
                deleted: 1,
                total: 6
            }
        );
        assert_eq!(
            status.describe().as_deref(),
            Some("2 modified, 2 added/untracked, 1 deleted")
        );
    }

    #[test]
    fn test_clean_tree_has_no_summary() {
        assert_eq!(GitStatus::parse_porcelain("").describe(), None);
    }

    #[test]
    fn test_active_task_extraction() {
        let doc = "# Context\n## Current Task\nShip the parser\n## Notes\n";
        assert_eq!(active_task(doc).as_deref(), Some("Ship the parser"));

        assert_eq!(active_task("## Current Task\n[No active task]\n"), None);
        assert_eq!(active_task("## Current Task\n## Next\n"), None);
        assert_eq!(active_task("## Current Task"), None);
        assert_eq!(active_task("nothing here"), None);

        let long = format!("## Current Task\n{}\n", "t".repeat(300));
        assert_eq!(active_task(&long).unwrap().len(), 100);
    }

    #[test]
    fn test_context_message_assembly() {
        let status = GitStatus {
            modified: 1,
            ..GitStatus::default()
        };
        assert_eq!(
            context_message(Some("main"), Some(&status), Some("Fix bug")).as_deref(),
            Some("[Context] Branch: main | Git: 1 modified | Active: Fix bug")
        );
        assert_eq!(context_message(None, Some(&GitStatus::default()), None), None);
    }

    #[test]
    fn test_missing_active_context_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_active_task(&dir.path().join("absent.md")), None);
    }
}
