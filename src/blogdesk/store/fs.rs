use super::StorageBackend;
use crate::error::{BlogError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Default, Clone, Copy)]
pub struct FsBackend;

impl FsBackend {
    pub fn new() -> Self {
        Self
    }

    fn ensure_parent(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(BlogError::Io)?;
            }
        }
        Ok(())
    }

    fn tmp_sibling(path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!(".{}-{}.tmp", name, Uuid::new_v4().simple()))
    }
}

impl StorageBackend for FsBackend {
    fn read_text(&self, path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BlogError::Io(e)),
        }
    }

    fn write_text(&self, path: &Path, text: &str) -> Result<()> {
        self.ensure_parent(path)?;

        let tmp = Self::tmp_sibling(path);
        fs::write(&tmp, text).map_err(BlogError::Io)?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(BlogError::Io(e));
        }
        Ok(())
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        self.ensure_parent(to)?;
        fs::copy(from, to).map_err(BlogError::Io)?;
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BlogError::Io(e)),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
