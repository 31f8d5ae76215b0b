//! # Capabilities
//!
//! Every file the editor touches outside of memory is reached through a
//! location the user handed over once: the content file, the images and posts
//! directories, the sitemap file and the page template. The first request for
//! a [`Purpose`] asks a [`Picker`]; the answer is kept for the rest of the
//! session and later requests reuse it without asking again.
//!
//! A dismissed picker yields [`BlogError::Cancelled`] and caches nothing, so
//! the next request asks again. Nothing here is persisted.

use crate::error::{BlogError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    ContentFile,
    ImagesDir,
    PostsDir,
    SitemapFile,
    TemplateFile,
}

impl Purpose {
    pub fn is_directory(&self) -> bool {
        matches!(self, Purpose::ImagesDir | Purpose::PostsDir)
    }
}

impl std::fmt::Display for Purpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Purpose::ContentFile => "content file",
            Purpose::ImagesDir => "images directory",
            Purpose::PostsDir => "posts directory",
            Purpose::SitemapFile => "sitemap file",
            Purpose::TemplateFile => "template file",
        };
        write!(f, "{}", label)
    }
}

/// Asks the user for a location.
pub trait Picker {
    /// `Ok(None)` means the user dismissed the prompt.
    fn pick(&mut self, purpose: Purpose) -> Result<Option<PathBuf>>;
}

pub struct CapabilityCache<P: Picker> {
    picker: P,
    granted: HashMap<Purpose, PathBuf>,
}

impl<P: Picker> CapabilityCache<P> {
    pub fn new(picker: P) -> Self {
        Self {
            picker,
            granted: HashMap::new(),
        }
    }

    /// Returns the cached grant for `purpose`, or asks the picker and caches
    /// the answer.
    pub fn request(&mut self, purpose: Purpose) -> Result<PathBuf> {
        if let Some(path) = self.granted.get(&purpose) {
            return Ok(path.clone());
        }

        match self.picker.pick(purpose)? {
            Some(path) => {
                log::debug!("granted {}: {}", purpose, path.display());
                self.granted.insert(purpose, path.clone());
                Ok(path)
            }
            None => Err(BlogError::Cancelled(purpose)),
        }
    }

    /// Like [`request`](Self::request), but a dismissed picker is `Ok(None)`.
    pub fn try_request(&mut self, purpose: Purpose) -> Result<Option<PathBuf>> {
        match self.request(purpose) {
            Ok(path) => Ok(Some(path)),
            Err(BlogError::Cancelled(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn grant(&mut self, purpose: Purpose, path: impl Into<PathBuf>) {
        self.granted.insert(purpose, path.into());
    }

    pub fn cached(&self, purpose: Purpose) -> Option<&Path> {
        self.granted.get(&purpose).map(PathBuf::as_path)
    }

    pub fn picker(&self) -> &P {
        &self.picker
    }

    pub fn picker_mut(&mut self) -> &mut P {
        &mut self.picker
    }
}

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use std::collections::VecDeque;

    /// Answers picks from a per-purpose queue and counts how often it was asked.
    #[derive(Debug, Default)]
    pub struct ScriptedPicker {
        answers: HashMap<Purpose, VecDeque<Option<PathBuf>>>,
        pub asked: HashMap<Purpose, usize>,
    }

    impl ScriptedPicker {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn answer(mut self, purpose: Purpose, path: Option<PathBuf>) -> Self {
            self.answers.entry(purpose).or_default().push_back(path);
            self
        }

        pub fn times_asked(&self, purpose: Purpose) -> usize {
            self.asked.get(&purpose).copied().unwrap_or(0)
        }
    }

    impl Picker for ScriptedPicker {
        fn pick(&mut self, purpose: Purpose) -> Result<Option<PathBuf>> {
            *self.asked.entry(purpose).or_default() += 1;
            Ok(self
                .answers
                .get_mut(&purpose)
                .and_then(VecDeque::pop_front)
                .flatten())
        }
    }
}
