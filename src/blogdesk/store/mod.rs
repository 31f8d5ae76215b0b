//! # Storage Layer
//!
//! Raw file I/O for everything the persistence code writes: the JSON content
//! file, static post pages, the sitemap and copied images. The
//! [`StorageBackend`] trait handles the "how" (filesystem vs memory), while
//! [`crate::persist`] handles the "what" (serialization, templating, naming).
//!
//! ## Implementations
//!
//! - [`fs::FsBackend`]: production backend over the real filesystem.
//!   Text writes go to a temporary sibling first and are renamed into place.
//! - [`memory::MemBackend`]: in-memory backend for tests, with write-error
//!   simulation.
//!
//! Paths are whatever the [`crate::capability`] cache granted; the backend
//! never picks locations itself.

use crate::error::Result;
use std::path::Path;

pub mod fs;
pub mod memory;

pub trait StorageBackend {
    /// Read a whole text file. `Ok(None)` if it does not exist.
    fn read_text(&self, path: &Path) -> Result<Option<String>>;

    /// Overwrite a text file, creating parent directories as needed.
    fn write_text(&self, path: &Path, text: &str) -> Result<()>;

    /// Copy a file byte for byte, overwriting the destination.
    fn copy_file(&self, from: &Path, to: &Path) -> Result<()>;

    /// Remove a file. Returns `false` if there was nothing to remove.
    fn remove_file(&self, path: &Path) -> Result<bool>;

    fn exists(&self, path: &Path) -> bool;
}
