//! Enumerates candidate files under the source root and streams them to
//! the placement loop.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::sync::mpsc;
use tokio::task;
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub mtime: SystemTime,
}

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub recursive: bool,
    pub excludes: Vec<String>,
}

/// Walks the source root on a blocking task and feeds candidates through a
/// channel, one at a time. Non-recursive scans only see the root itself, so
/// files already placed under category subtrees are never re-examined; in
/// recursive mode `prune` cuts off the destination subtree.
pub fn spawn_walker(
    root: PathBuf,
    prune: Option<PathBuf>,
    opts: ScanOptions,
) -> anyhow::Result<(mpsc::Receiver<CandidateFile>, task::JoinHandle<()>)> {
    let exclude_set = build_globset(&opts.excludes)?;
    let (tx, rx) = mpsc::channel(100);

    let handle = task::spawn_blocking(move || {
        let max_depth = if opts.recursive { usize::MAX } else { 1 };
        for entry in WalkDir::new(&root)
            .max_depth(max_depth)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| should_descend(e.path(), &root, prune.as_deref(), &exclude_set))
        {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => continue,
            };

            let path = entry.path();
            if path.is_dir() || is_hidden(path) || exclude_set.is_match(path) {
                continue;
            }

            let meta = match fs::metadata(path) {
                Ok(m) => m,
                Err(_) => continue,
            };
            if !meta.is_file() {
                continue;
            }
            let mtime = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);

            let item = CandidateFile {
                path: path.to_path_buf(),
                mtime,
            };
            if tx.blocking_send(item).is_err() {
                // Receiver dropped, stop walking.
                break;
            }
        }
    });

    Ok((rx, handle))
}

fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat)?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

fn should_descend(path: &Path, root: &Path, prune: Option<&Path>, excludes: &GlobSet) -> bool {
    if path == root {
        return true;
    }
    if let Some(pruned) = prune {
        if path.starts_with(pruned) {
            return false;
        }
    }
    if is_hidden(path) {
        return false;
    }
    !excludes.is_match(path)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(
        root: PathBuf,
        prune: Option<PathBuf>,
        opts: ScanOptions,
    ) -> Vec<PathBuf> {
        let (mut rx, handle) = spawn_walker(root, prune, opts).unwrap();
        let mut found = Vec::new();
        while let Some(item) = rx.recv().await {
            found.push(item.path);
        }
        handle.await.unwrap();
        found.sort();
        found
    }

    #[tokio::test]
    async fn non_recursive_scan_stays_at_the_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.pdf"), "x").unwrap();
        std::fs::create_dir_all(dir.path().join("documentos/2024")).unwrap();
        std::fs::write(dir.path().join("documentos/2024/b.pdf"), "x").unwrap();

        let found = collect(dir.path().to_path_buf(), None, ScanOptions::default()).await;
        assert_eq!(found, vec![dir.path().join("a.pdf")]);
    }

    #[tokio::test]
    async fn recursive_scan_descends_but_respects_prune() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.pdf"), "x").unwrap();
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/b.pdf"), "x").unwrap();
        std::fs::create_dir_all(dir.path().join("sorted")).unwrap();
        std::fs::write(dir.path().join("sorted/c.pdf"), "x").unwrap();

        let opts = ScanOptions {
            recursive: true,
            excludes: vec![],
        };
        let found = collect(
            dir.path().to_path_buf(),
            Some(dir.path().join("sorted")),
            opts,
        )
        .await;
        assert_eq!(
            found,
            vec![dir.path().join("a.pdf"), dir.path().join("nested/b.pdf")]
        );
    }

    #[tokio::test]
    async fn hidden_and_excluded_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".hidden.pdf"), "x").unwrap();
        std::fs::write(dir.path().join("keep.pdf"), "x").unwrap();
        std::fs::write(dir.path().join("skip.iso"), "x").unwrap();

        let opts = ScanOptions {
            recursive: false,
            excludes: vec!["*.iso".to_string()],
        };
        let found = collect(dir.path().to_path_buf(), None, opts).await;
        assert_eq!(found, vec![dir.path().join("keep.pdf")]);
    }
}
