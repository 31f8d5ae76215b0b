use crate::error::{BlogError, Result};
use crate::model::ContentStore;
use crate::persist::mirror::Snapshot;
use crate::store::StorageBackend;
use std::io::{Error as IoError, ErrorKind};
use std::path::Path;

/// Where the store of a new session comes from.
#[derive(Debug, Clone, Copy)]
pub enum LoadSource<'a> {
    /// The site's JSON content file.
    File(&'a Path),
    /// A generated static page with an embedded snapshot.
    Snapshot(&'a Path),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    File,
    Snapshot,
    Seed,
}

#[derive(Debug, Clone)]
pub struct Loaded {
    pub store: ContentStore,
    /// The "open this post" directive of a static page, if any.
    pub open_post_id: Option<String>,
    pub origin: LoadOrigin,
}

impl Loaded {
    fn seed() -> Self {
        Self {
            store: ContentStore::seed(),
            open_post_id: None,
            origin: LoadOrigin::Seed,
        }
    }
}

/// Loads the session store. Never fails: anything that goes wrong is logged
/// and the seed store is used instead.
pub fn load<B: StorageBackend>(backend: &B, source: LoadSource<'_>) -> Loaded {
    let attempt = match source {
        LoadSource::File(path) => read_store(backend, path).map(|store| Loaded {
            store,
            open_post_id: None,
            origin: LoadOrigin::File,
        }),
        LoadSource::Snapshot(path) => read_snapshot(backend, path).map(|snapshot| Loaded {
            store: snapshot.store,
            open_post_id: snapshot.open_post_id,
            origin: LoadOrigin::Snapshot,
        }),
    };

    match attempt {
        Ok(loaded) => {
            log::info!(
                "loaded {} categories and {} posts",
                loaded.store.categories.len(),
                loaded.store.posts.len()
            );
            loaded
        }
        Err(e) => {
            log::warn!("could not load content, starting from the default store: {}", e);
            Loaded::seed()
        }
    }
}

/// Strict read of a content file: a missing or malformed file is an error.
pub fn read_store<B: StorageBackend>(backend: &B, path: &Path) -> Result<ContentStore> {
    let text = backend.read_text(path)?.ok_or_else(|| not_found(path))?;
    let store = serde_json::from_str(&text).map_err(BlogError::Serialization)?;
    Ok(store)
}

fn read_snapshot<B: StorageBackend>(backend: &B, path: &Path) -> Result<Snapshot> {
    let html = backend.read_text(path)?.ok_or_else(|| not_found(path))?;
    Snapshot::extract(&html)
}

pub fn to_json(store: &ContentStore) -> Result<String> {
    serde_json::to_string_pretty(store).map_err(BlogError::Serialization)
}

/// Overwrites the content file with the whole store.
pub fn save<B: StorageBackend>(backend: &B, path: &Path, store: &ContentStore) -> Result<()> {
    let json = to_json(store)?;
    backend.write_text(path, &json)?;
    log::info!("saved {} posts to {}", store.posts.len(), path.display());
    Ok(())
}

fn not_found(path: &Path) -> BlogError {
    BlogError::Io(IoError::new(
        ErrorKind::NotFound,
        format!("{} not found", path.display()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::mirror;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::memory::MemBackend;

    fn sample() -> ContentStore {
        StoreFixture::new()
            .with_category("unity", "Unity")
            .with_category("etc", "Etc")
            .with_post("post_a", "unity", 1)
            .with_post("post_b", "etc", 2)
            .build()
    }

    #[test]
    fn save_then_load_round_trips() {
        let backend = MemBackend::new();
        let path = Path::new("site/posts.json");
        let store = sample();

        save(&backend, path, &store).unwrap();
        let loaded = load(&backend, LoadSource::File(path));

        assert_eq!(loaded.origin, LoadOrigin::File);
        assert_eq!(loaded.store, store);
    }

    #[test]
    fn saved_json_is_pretty_printed_camel_case() {
        let backend = MemBackend::new();
        let path = Path::new("posts.json");
        save(&backend, path, &sample()).unwrap();

        let text = backend.read_text(path).unwrap().unwrap();
        assert!(text.starts_with("{\n  \"categories\": ["));
        assert!(text.contains("\"contentHtml\""));
        assert!(text.contains("\"createdAt\""));
    }

    #[test]
    fn missing_file_falls_back_to_seed() {
        let backend = MemBackend::new();
        let loaded = load(&backend, LoadSource::File(Path::new("posts.json")));
        assert_eq!(loaded.origin, LoadOrigin::Seed);
        assert_eq!(loaded.store.categories.len(), 4);
    }

    #[test]
    fn malformed_json_falls_back_to_seed() {
        let backend = MemBackend::new();
        backend.put("posts.json", "{ not json");
        let loaded = load(&backend, LoadSource::File(Path::new("posts.json")));
        assert_eq!(loaded.origin, LoadOrigin::Seed);
    }

    #[test]
    fn posts_missing_fields_fall_back_to_seed() {
        let backend = MemBackend::new();
        backend.put("posts.json", r#"{"posts":[{"id":"x"}]}"#);
        let loaded = load(&backend, LoadSource::File(Path::new("posts.json")));
        assert_eq!(loaded.origin, LoadOrigin::Seed);
    }

    #[test]
    fn strict_read_reports_missing_file() {
        let backend = MemBackend::new();
        assert!(matches!(
            read_store(&backend, Path::new("posts.json")),
            Err(BlogError::Io(_))
        ));
    }

    #[test]
    fn loads_from_static_page_snapshot() {
        let backend = MemBackend::new();
        let store = sample();
        let page = mirror::render_page(
            "<html><head><title>Blog</title></head><body></body></html>",
            store.post("post_b").unwrap(),
            &store,
        )
        .unwrap();
        backend.put("posts/post_b.html", page);

        let loaded = load(&backend, LoadSource::Snapshot(Path::new("posts/post_b.html")));

        assert_eq!(loaded.origin, LoadOrigin::Snapshot);
        assert_eq!(loaded.store, store);
        assert_eq!(loaded.open_post_id.as_deref(), Some("post_b"));
    }

    #[test]
    fn page_without_snapshot_falls_back_to_seed() {
        let backend = MemBackend::new();
        backend.put("index.html", "<html><head></head><body></body></html>");
        let loaded = load(&backend, LoadSource::Snapshot(Path::new("index.html")));
        assert_eq!(loaded.origin, LoadOrigin::Seed);
        assert!(loaded.open_post_id.is_none());
    }

    #[test]
    fn save_surfaces_write_errors() {
        let backend = MemBackend::new();
        backend.set_simulate_write_error(true);
        assert!(save(&backend, Path::new("posts.json"), &sample()).is_err());
    }
}
