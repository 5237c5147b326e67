//! On-disk SSH client configuration
//!
//! The file is read once when the store is opened and rewritten in full on
//! every `persist`. Writes go through a temporary file in the same directory
//! followed by a rename, so a crash never leaves a truncated config behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Result, SshdError};

use super::{ConfigDocument, HostBlock};

/// Loaded configuration file bound to its path.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    document: ConfigDocument,
}

impl ConfigStore {
    /// Open the config at `path`, creating the directory and an empty file
    /// when they do not exist yet.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(dir) = path.parent() {
            ensure_dir(dir)?;
        }

        if !path.exists() {
            create_private_file(&path)?;
            tracing::debug!(path = %path.display(), "created empty ssh config");
        }

        let content = fs::read_to_string(&path).map_err(|e| SshdError::storage(&path, e))?;
        let document = ConfigDocument::parse(&content);

        Ok(Self { path, document })
    }

    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    /// All block aliases in document order.
    pub fn hosts(&self) -> Vec<String> {
        self.document.hosts().into_iter().map(String::from).collect()
    }

    pub fn block(&self, alias: &str) -> Option<&HostBlock> {
        self.document.block(alias)
    }

    /// Add a block built from `options`, placed before `insert_before` when
    /// that alias exists, else at the end.
    pub fn add_block<I, K, V>(
        &mut self,
        alias: &str,
        options: I,
        insert_before: Option<&str>,
    ) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.document
            .add_block(HostBlock::new(alias, options), insert_before)
    }

    /// Remove a block. Absent aliases are ignored.
    pub fn remove_block(&mut self, alias: &str) {
        let removed = self.document.remove_block(alias);
        if removed > 1 {
            tracing::debug!(alias, removed, "removed duplicate host blocks");
        }
    }

    /// Formatted file content.
    pub fn serialize(&self) -> String {
        self.document.render()
    }

    /// Write the formatted document back to disk.
    ///
    /// A symlinked config is written through: the rename replaces the link
    /// target, the link itself stays.
    pub fn persist(&self) -> Result<()> {
        let content = self.serialize();
        let target = resolve_target(&self.path)?;
        let dir = target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut file = NamedTempFile::new_in(dir).map_err(|e| SshdError::storage(dir, e))?;
        file.write_all(content.as_bytes())
            .and_then(|_| file.as_file().sync_all())
            .map_err(|e| SshdError::storage(file.path(), e))?;

        set_private_permissions(file.path())?;

        file.persist(&target)
            .map_err(|e| SshdError::storage(&target, e.error))?;

        tracing::debug!(path = %target.display(), bytes = content.len(), "ssh config written");
        Ok(())
    }
}

/// Final file behind `path`, following symlinks when it exists.
fn resolve_target(path: &Path) -> Result<PathBuf> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::canonicalize(path).map_err(|e| SshdError::storage(path, e))
        }
        _ => Ok(path.to_path_buf()),
    }
}

/// Ensure the SSH directory exists (mode 0700 when created on Unix).
fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() || dir.exists() {
        return Ok(());
    }

    fs::create_dir_all(dir).map_err(|e| SshdError::storage(dir, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o700))
            .map_err(|e| SshdError::storage(dir, e))?;
    }

    Ok(())
}

fn create_private_file(path: &Path) -> Result<()> {
    fs::File::create(path).map_err(|e| SshdError::storage(path, e))?;
    set_private_permissions(path)
}

fn set_private_permissions(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .map_err(|e| SshdError::storage(path, e))?;
    }
    #[cfg(not(unix))]
    let _ = path;

    Ok(())
}
