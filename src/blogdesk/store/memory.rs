use super::StorageBackend;
use crate::error::{BlogError, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{Error as IoError, ErrorKind};
use std::path::{Path, PathBuf};

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability since the editor is single-threaded.
#[derive(Debug, Default)]
pub struct MemBackend {
    files: RefCell<HashMap<PathBuf, Vec<u8>>>,
    simulate_write_error: RefCell<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, as a read-only disk would.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    pub fn put(&self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) {
        self.files.borrow_mut().insert(path.into(), bytes.into());
    }

    pub fn bytes(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.borrow().get(path).cloned()
    }

    /// All stored paths under `dir`, sorted.
    pub fn paths_under(&self, dir: &Path) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self
            .files
            .borrow()
            .keys()
            .filter(|p| p.starts_with(dir))
            .cloned()
            .collect();
        paths.sort();
        paths
    }

    fn check_writable(&self) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(BlogError::Io(IoError::new(
                ErrorKind::PermissionDenied,
                "simulated write error",
            )));
        }
        Ok(())
    }
}

impl StorageBackend for MemBackend {
    fn read_text(&self, path: &Path) -> Result<Option<String>> {
        match self.files.borrow().get(path) {
            None => Ok(None),
            Some(bytes) => String::from_utf8(bytes.clone())
                .map(Some)
                .map_err(|e| BlogError::Io(IoError::new(ErrorKind::InvalidData, e))),
        }
    }

    fn write_text(&self, path: &Path, text: &str) -> Result<()> {
        self.check_writable()?;
        self.put(path, text.as_bytes().to_vec());
        Ok(())
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        self.check_writable()?;
        let bytes = self.bytes(from).ok_or_else(|| {
            BlogError::Io(IoError::new(
                ErrorKind::NotFound,
                format!("{} not found", from.display()),
            ))
        })?;
        self.put(to, bytes);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<bool> {
        self.check_writable()?;
        Ok(self.files.borrow_mut().remove(path).is_some())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use crate::model::{Category, ContentStore, Post};
    use chrono::{DateTime, TimeZone, Utc};

    /// Builds a [`ContentStore`] with predictable ids and timestamps.
    #[derive(Debug, Default)]
    pub struct StoreFixture {
        pub store: ContentStore,
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_category(mut self, id: &str, name: &str) -> Self {
            self.store.categories.push(Category {
                id: id.to_string(),
                name: name.to_string(),
            });
            self
        }

        /// Adds a post created on day `day` of January 2024, noon UTC.
        pub fn with_post(mut self, id: &str, category_id: &str, day: u32) -> Self {
            self.store.posts.push(Post {
                id: id.to_string(),
                title: format!("Title {}", id),
                category_id: category_id.to_string(),
                content_html: format!("<p>Body of {}</p>", id),
                created_at: jan(day),
                updated_at: None,
            });
            self
        }

        pub fn build(self) -> ContentStore {
            self.store
        }
    }

    pub fn jan(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap()
    }
}
