//! File-system vault writer

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::store::VaultWriter;

/// Default [`VaultWriter`] backed by a directory on disk
///
/// Rejects absolute paths and parent-directory components; the full
/// forbidden-path policy belongs to the external sandbox.
pub struct FsVaultWriter {
    root: PathBuf,
}

impl FsVaultWriter {
    /// Create a writer rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The vault root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, relative_path: &str) -> Result<PathBuf> {
        let path = Path::new(relative_path);
        if path.is_absolute() {
            return Err(Error::vault_write(format!(
                "absolute path not allowed: {relative_path}"
            )));
        }
        for component in path.components() {
            match component {
                Component::Normal(_) => {}
                _ => {
                    return Err(Error::vault_write(format!(
                        "path escapes the vault root: {relative_path}"
                    )))
                }
            }
        }
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl VaultWriter for FsVaultWriter {
    async fn exists(&self, relative_path: &str) -> Result<bool> {
        Ok(self.resolve(relative_path)?.exists())
    }

    async fn write(&self, relative_path: &str, content: &str) -> Result<()> {
        let path = self.resolve(relative_path)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::vault_write(format!("{}: {e}", parent.display())))?;
        }
        std::fs::write(&path, content)
            .map_err(|e| Error::vault_write(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_and_reports_existence() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FsVaultWriter::new(dir.path());

        assert!(!vault.exists("notes/pond.md").await.unwrap());
        vault.write("notes/pond.md", "# Pond\n").await.unwrap();
        assert!(vault.exists("notes/pond.md").await.unwrap());

        let on_disk = std::fs::read_to_string(dir.path().join("notes/pond.md")).unwrap();
        assert_eq!(on_disk, "# Pond\n");
    }

    #[tokio::test]
    async fn rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FsVaultWriter::new(dir.path());

        assert!(vault.write("../outside.md", "x").await.is_err());
        assert!(vault.write("/etc/hosts", "x").await.is_err());
    }
}
