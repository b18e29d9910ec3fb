//! Transactional writes into an output directory.
//!
//! Files are staged in a private temp dir first; `publish` moves them into
//! place, backing up anything it replaces and restoring on failure.
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// One publish transaction for an output directory.
#[derive(Debug)]
pub struct StagedOutput {
    txn: tempfile::TempDir,
    output_root: PathBuf,
}

impl StagedOutput {
    pub fn new(output_root: &Path) -> Result<Self> {
        let txn = tempfile::Builder::new()
            .prefix("gorb-txn-")
            .tempdir()
            .context("create staging dir")?;
        Ok(StagedOutput {
            txn,
            output_root: output_root.to_path_buf(),
        })
    }

    fn staging_root(&self) -> PathBuf {
        self.txn.path().join("staging")
    }

    /// Stage `bytes` at `rel_path`; returns true when it replaced a staged file.
    pub fn stage_bytes(&self, rel_path: &str, bytes: &[u8]) -> Result<bool> {
        validate_relative_path(rel_path)?;
        let staging_path = self.staging_root().join(rel_path);
        if let Some(parent) = staging_path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let replaced = staging_path.exists();
        fs::write(&staging_path, bytes)
            .with_context(|| format!("write {}", staging_path.display()))?;
        Ok(replaced)
    }

    pub fn stage_text(&self, rel_path: &str, text: &str) -> Result<bool> {
        self.stage_bytes(rel_path, text.as_bytes())
    }

    pub fn stage_json<T: serde::Serialize>(&self, rel_path: &str, value: &T) -> Result<bool> {
        let mut bytes = serde_json::to_vec_pretty(value).context("serialize staged JSON")?;
        bytes.push(b'\n');
        self.stage_bytes(rel_path, &bytes)
    }

    /// Staged files relative to the staging root, sorted.
    pub fn staged_files(&self) -> Result<Vec<PathBuf>> {
        let root = self.staging_root();
        collect_files_recursive(&root)?
            .into_iter()
            .map(|file| {
                file.strip_prefix(&root)
                    .map(Path::to_path_buf)
                    .context("strip staging prefix")
            })
            .collect()
    }

    /// Move every staged file into the output root.
    ///
    /// On failure, files written by this publish are removed and replaced
    /// files are restored before the error is returned.
    pub fn publish(self) -> Result<Vec<PathBuf>> {
        let staging_root = self.staging_root();
        let files = collect_files_recursive(&staging_root)?;
        let backup_root = self.txn.path().join("backup");
        let mut published = Vec::new();
        let mut backups: Vec<(PathBuf, PathBuf)> = Vec::new();
        for file in files {
            let rel = file
                .strip_prefix(&staging_root)
                .context("strip staging prefix")?;
            let dest = self.output_root.join(rel);
            if dest.exists() {
                let backup = backup_root.join(rel);
                if let Some(parent) = backup.parent() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("create {}", parent.display()))?;
                }
                fs::copy(&dest, &backup).with_context(|| format!("backup {}", dest.display()))?;
                backups.push((dest.clone(), backup));
            }

            if let Err(err) = publish_file(&file, &dest) {
                rollback_publish(&published, &backups);
                return Err(err);
            }
            published.push(dest);
        }
        tracing::info!(
            files = published.len(),
            output = %self.output_root.display(),
            "published staged output"
        );
        Ok(published)
    }
}

fn validate_relative_path(rel: &str) -> Result<()> {
    let path = Path::new(rel);
    let escapes = path
        .components()
        .any(|component| !matches!(component, Component::Normal(_)));
    if rel.is_empty() || escapes {
        return Err(anyhow!(
            "staged paths must be relative without '..' (got {rel:?})"
        ));
    }
    Ok(())
}

fn collect_files_recursive(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !root.exists() {
        return Ok(files);
    }
    for entry in fs::read_dir(root).with_context(|| format!("read {}", root.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            files.extend(collect_files_recursive(&path)?);
        } else if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn publish_file(source: &Path, dest: &Path) -> Result<()> {
    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    let file_name = dest
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("page");
    let tmp_path = parent.join(format!(".{file_name}.tmp"));
    fs::copy(source, &tmp_path).with_context(|| format!("publish {}", dest.display()))?;
    fs::rename(&tmp_path, dest).with_context(|| format!("publish {}", dest.display()))?;
    Ok(())
}

/// Best effort: later failures must not mask the original publish error.
fn rollback_publish(published: &[PathBuf], backups: &[(PathBuf, PathBuf)]) {
    for path in published {
        let _ = fs::remove_file(path);
    }
    for (dest, backup) in backups {
        if let Some(parent) = dest.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let _ = fs::copy(backup, dest);
    }
    tracing::warn!(
        removed = published.len(),
        restored = backups.len(),
        "rolled back partial publish"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_moves_staged_files_and_replaces_existing() {
        let out = tempfile::tempdir().expect("out dir");
        fs::write(out.path().join("index.html"), "old").expect("seed");

        let staged = StagedOutput::new(out.path()).expect("stage");
        assert!(!staged.stage_text("index.html", "new").expect("stage home"));
        staged
            .stage_text("feature/login.html", "login")
            .expect("stage feature");
        assert!(staged.stage_text("index.html", "newer").expect("restage"));
        assert_eq!(
            staged.staged_files().expect("list"),
            [PathBuf::from("feature/login.html"), PathBuf::from("index.html")]
        );

        let published = staged.publish().expect("publish");
        assert_eq!(published.len(), 2);
        assert_eq!(
            fs::read_to_string(out.path().join("index.html")).unwrap(),
            "newer"
        );
        assert_eq!(
            fs::read_to_string(out.path().join("feature/login.html")).unwrap(),
            "login"
        );
        assert!(!out.path().join("feature/.login.html.tmp").exists());
    }

    #[test]
    fn rejects_paths_escaping_the_output_root() {
        let out = tempfile::tempdir().expect("out dir");
        let staged = StagedOutput::new(out.path()).expect("stage");
        assert!(staged.stage_text("../evil.html", "x").is_err());
        assert!(staged.stage_text("/abs.html", "x").is_err());
        assert!(staged.stage_text("", "x").is_err());
    }

    #[test]
    fn empty_transaction_publishes_nothing() {
        let out = tempfile::tempdir().expect("out dir");
        let staged = StagedOutput::new(out.path()).expect("stage");
        assert!(staged.publish().expect("publish").is_empty());
    }
}
