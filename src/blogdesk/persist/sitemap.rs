use crate::commands::list::list_posts;
use crate::error::{BlogError, Result};
use crate::model::{CategoryFilter, ContentStore};
use crate::store::StorageBackend;
use quick_xml::escape::escape;
use std::path::Path;
use url::Url;

const ROOT_CHANGEFREQ: &str = "weekly";
const ROOT_PRIORITY: &str = "1.0";
const POST_CHANGEFREQ: &str = "monthly";
const POST_PRIORITY: &str = "0.8";

/// Where the site is served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLocation {
    root: Url,
    posts: Url,
}

impl SiteLocation {
    /// `site_url` must be absolute; `posts_path` is relative to it. A site
    /// URL without a trailing slash still names a directory.
    pub fn parse(site_url: &str, posts_path: &str) -> Result<Self> {
        let unusable =
            |reason: String| BlogError::Config(format!("site-url {} is unusable: {}", site_url, reason));

        let mut root = Url::parse(site_url.trim()).map_err(|e| unusable(e.to_string()))?;
        if root.cannot_be_a_base() {
            return Err(unusable("not a base URL".to_string()));
        }
        root.set_query(None);
        root.set_fragment(None);
        if !root.path().ends_with('/') {
            let path = format!("{}/", root.path());
            root.set_path(&path);
        }

        let posts_path = posts_path.trim_matches('/');
        let posts = if posts_path.is_empty() {
            root.clone()
        } else {
            root.join(&format!("./{}/", posts_path))
                .map_err(|e| unusable(e.to_string()))?
        };
        Ok(Self { root, posts })
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    pub fn post_url(&self, post_id: &str) -> Result<Url> {
        self.posts
            .join(&format!("./{}.html", post_id))
            .map_err(|e| BlogError::Config(format!("no URL for post {}: {}", post_id, e)))
    }
}

/// Sitemap XML: the site root, then every post newest first with its
/// creation date as `lastmod`.
pub fn render(store: &ContentStore, location: &SiteLocation) -> Result<String> {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
"#,
    );

    xml.push_str(&format!(
        "  <url><loc>{}</loc><changefreq>{}</changefreq><priority>{}</priority></url>\n",
        escape(location.root().as_str()),
        ROOT_CHANGEFREQ,
        ROOT_PRIORITY
    ));

    for post in list_posts(store, &CategoryFilter::All) {
        let loc = location.post_url(&post.id)?;
        let lastmod = post.created_at.format("%Y-%m-%d").to_string();
        xml.push_str(&format!(
            "  <url><loc>{}</loc><lastmod>{}</lastmod><changefreq>{}</changefreq><priority>{}</priority></url>\n",
            escape(loc.as_str()),
            lastmod,
            POST_CHANGEFREQ,
            POST_PRIORITY
        ));
    }

    xml.push_str("</urlset>\n");
    Ok(xml)
}

pub fn write<B: StorageBackend>(
    backend: &B,
    path: &Path,
    store: &ContentStore,
    location: &SiteLocation,
) -> Result<()> {
    backend.write_text(path, &render(store, location)?)?;
    log::info!("wrote sitemap with {} posts to {}", store.posts.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::memory::MemBackend;
    use chrono::{TimeZone, Utc};

    fn location() -> SiteLocation {
        SiteLocation::parse("https://me.github.io/blog/", "posts").unwrap()
    }

    #[test]
    fn root_plus_one_entry_per_post() {
        let mut store = StoreFixture::new()
            .with_post("post_a", "etc", 1)
            .with_post("post_b", "etc", 2)
            .build();
        store.posts[1].created_at = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 0).unwrap();

        let xml = render(&store, &location()).unwrap();

        assert_eq!(xml.matches("<url>").count(), 3);
        assert!(xml.contains("<loc>https://me.github.io/blog/</loc>"));
        assert!(xml.contains(
            "<loc>https://me.github.io/blog/posts/post_b.html</loc><lastmod>2024-02-29</lastmod>"
        ));
        assert!(xml.contains(
            "<loc>https://me.github.io/blog/posts/post_a.html</loc><lastmod>2024-01-01</lastmod>"
        ));
    }

    #[test]
    fn lastmod_ignores_later_edits() {
        let mut store = StoreFixture::new().with_post("post_a", "etc", 3).build();
        store.posts[0].updated_at = Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());

        let xml = render(&store, &location()).unwrap();
        assert!(xml.contains("<lastmod>2024-01-03</lastmod>"));
    }

    #[test]
    fn empty_store_lists_only_root() {
        let xml = render(&ContentStore::default(), &location()).unwrap();
        assert_eq!(xml.matches("<url>").count(), 1);
        assert!(!xml.contains("<lastmod>"));
    }

    #[test]
    fn urls_are_escaped() {
        let store = StoreFixture::new().with_post("a&b", "etc", 1).build();
        let location = SiteLocation::parse("https://x.io", "/posts/").unwrap();
        let xml = render(&store, &location).unwrap();
        assert!(xml.contains("<loc>https://x.io/</loc>"));
        assert!(xml.contains("<loc>https://x.io/posts/a&amp;b.html</loc>"));
    }

    #[test]
    fn site_url_path_is_a_directory() {
        let location = SiteLocation::parse("https://me.github.io/blog?x=1", "").unwrap();
        assert_eq!(location.root().as_str(), "https://me.github.io/blog/");
        assert_eq!(
            location.post_url("post_a").unwrap().as_str(),
            "https://me.github.io/blog/post_a.html"
        );

        let nested = SiteLocation::parse("https://me.github.io/blog", "out/posts").unwrap();
        assert_eq!(
            nested.post_url("post_a").unwrap().as_str(),
            "https://me.github.io/blog/out/posts/post_a.html"
        );
    }

    #[test]
    fn relative_site_url_is_a_config_error() {
        assert!(matches!(
            SiteLocation::parse("me.github.io/blog", "posts"),
            Err(BlogError::Config(_))
        ));
        assert!(matches!(
            SiteLocation::parse("mailto:me@example.com", "posts"),
            Err(BlogError::Config(_))
        ));
    }

    #[test]
    fn write_overwrites_target() {
        let backend = MemBackend::new();
        backend.put("sitemap.xml", "old");
        let store = StoreFixture::new().with_post("post_a", "etc", 1).build();

        write(&backend, Path::new("sitemap.xml"), &store, &location()).unwrap();

        let text = backend.read_text(Path::new("sitemap.xml")).unwrap().unwrap();
        assert!(text.starts_with("<?xml"));
        assert!(text.contains("post_a.html"));
    }
}
