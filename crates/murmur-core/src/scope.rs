//! Scope detection: the project label appended to every identity.
//!
//! Order: enclosing git repository (worktrees map to the shared checkout)
//! -> start directory name -> `local`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::validate::sanitize_name;

const FALLBACK_SCOPE: &str = "local";

pub fn detect_scope(start_dir: &Path) -> String {
    let start = start_dir
        .canonicalize()
        .unwrap_or_else(|_| start_dir.to_path_buf());
    let root = match walk_up(&start, ".git") {
        Some(repo) => worktree_shared_root(&repo).unwrap_or(repo),
        None => start,
    };
    scope_label(&root)
}

fn scope_label(root: &Path) -> String {
    let label = root
        .file_name()
        .and_then(|s| s.to_str())
        .map(sanitize_name)
        .unwrap_or_default();
    if label.is_empty() {
        FALLBACK_SCOPE.to_string()
    } else {
        label
    }
}

fn walk_up(start: &Path, marker: &str) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if fs::metadata(current.join(marker)).is_ok() {
            return Some(current);
        }
        match current.parent() {
            Some(parent) if parent != current => current = parent.to_path_buf(),
            _ => return None,
        }
    }
}

/// A linked worktree has a `.git` file pointing at
/// `<main>/.git/worktrees/<name>`; map it back to `<main>`.
fn worktree_shared_root(repo_root: &Path) -> Option<PathBuf> {
    let git_path = repo_root.join(".git");
    if fs::metadata(&git_path).ok()?.is_dir() {
        return None;
    }
    let data = fs::read_to_string(&git_path).ok()?;
    let target = data
        .lines()
        .find_map(|line| line.trim().strip_prefix("gitdir:"))
        .map(str::trim)
        .filter(|p| !p.is_empty())?;
    let mut git_dir = PathBuf::from(target);
    if !git_dir.is_absolute() {
        git_dir = repo_root.join(git_dir);
    }
    let clean = git_dir.to_string_lossy().replace('\\', "/");
    let idx = clean.find("/.git/worktrees/")?;
    let root = PathBuf::from(&clean[..idx]);
    if fs::metadata(root.join(".git")).ok()?.is_dir() {
        Some(root)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn uses_repository_root_name() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let repo = tmp.path().join("My Project");
        let nested = repo.join("src").join("deep");
        fs::create_dir_all(&nested).expect("mkdir");
        fs::create_dir_all(repo.join(".git")).expect("mkdir .git");
        assert_eq!(detect_scope(&nested), "my-project");
    }

    #[test]
    fn falls_back_to_start_dir_name() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let dir = tmp.path().join("scratch_pad");
        fs::create_dir_all(&dir).expect("mkdir");
        // The tempdir itself may live inside a repository on some hosts;
        // only assert when it does not.
        if walk_up(&dir.canonicalize().expect("canon"), ".git").is_none() {
            assert_eq!(detect_scope(&dir), "scratch_pad");
        }
    }

    #[test]
    fn worktree_maps_to_main_checkout() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let main = tmp.path().join("mainrepo");
        let wt_git = main.join(".git").join("worktrees").join("feature");
        fs::create_dir_all(&wt_git).expect("mkdir");
        let worktree = tmp.path().join("feature-wt");
        fs::create_dir_all(&worktree).expect("mkdir");
        fs::write(
            worktree.join(".git"),
            format!("gitdir: {}\n", wt_git.display()),
        )
        .expect("write .git file");
        assert_eq!(detect_scope(&worktree), "mainrepo");
    }

    #[test]
    fn unnamed_root_uses_fallback() {
        assert_eq!(scope_label(Path::new("/")), FALLBACK_SCOPE);
        assert_eq!(scope_label(Path::new("/tmp/!!!")), FALLBACK_SCOPE);
    }
}
