//! # Static Mirror
//!
//! One standalone HTML page per post, derived from the site's own template
//! document (usually its `index.html`) so a crawler or a direct link can show
//! the post without fetching the content file. For each post the template is
//! rewritten in four steps:
//!
//! 1. `<base href="../">` so relative assets resolve from the posts directory
//! 2. `<title>` replaced with the post title
//! 3. a `<script id="blog-snapshot" type="application/json">` holding the whole
//!    store plus the id of the post to open
//! 4. `<body>` marked read-only
//!
//! Pages are written as `<posts_dir>/<id>.html`. Rendering an already
//! generated page again replaces its snapshot instead of stacking a second one.

use crate::error::{BlogError, Result};
use crate::model::{ContentStore, Post};
use crate::store::StorageBackend;
use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SNAPSHOT_SCRIPT_ID: &str = "blog-snapshot";
const BASE_TAG: &str = r#"<base href="../">"#;
const READ_ONLY_CLASS: &str = "read-only";
const READ_ONLY_ATTR: &str = "data-readonly";

/// The data a static page carries so it can render without a fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub open_post_id: Option<String>,
    pub store: ContentStore,
}

impl Snapshot {
    pub fn for_post(post: &Post, store: &ContentStore) -> Self {
        Self {
            open_post_id: Some(post.id.clone()),
            store: store.clone(),
        }
    }

    /// The `<script>` element embedding this snapshot. Every `<` inside the
    /// JSON is written as `\u003c`, so post content cannot close the element.
    pub fn to_script(&self) -> Result<String> {
        let json = serde_json::to_string(self)
            .map_err(BlogError::Serialization)?
            .replace('<', "\\u003c");
        Ok(format!(
            r#"<script id="{}" type="application/json">{}</script>"#,
            SNAPSHOT_SCRIPT_ID, json
        ))
    }

    pub fn extract(html: &str) -> Result<Snapshot> {
        let (start, end) = find_snapshot(html)
            .ok_or_else(|| BlogError::Template("page has no embedded snapshot".to_string()))?;
        let element = &html[start..end];
        let json_start = element
            .find('>')
            .map(|i| i + 1)
            .ok_or_else(|| BlogError::Template("malformed snapshot script".to_string()))?;
        let json_end = element.len() - "</script>".len();
        serde_json::from_str(&element[json_start..json_end]).map_err(BlogError::Serialization)
    }
}

/// Byte range of the snapshot `<script>` element, closing tag included.
fn find_snapshot(html: &str) -> Option<(usize, usize)> {
    let lower = html.to_ascii_lowercase();
    let marker = format!(r#"id="{}""#, SNAPSHOT_SCRIPT_ID);
    let mut from = 0;
    while let Some((start, open_end)) = find_open_tag(&lower, "script", from) {
        if lower[start..open_end].contains(&marker) {
            let close = lower[open_end..].find("</script>")? + open_end;
            return Some((start, close + "</script>".len()));
        }
        from = open_end;
    }
    None
}

/// Finds `<name ...>` at or after `from` in an ASCII-lowercased document.
/// Returns the byte range of the opening tag. `<header>` does not match `head`.
fn find_open_tag(lower: &str, name: &str, from: usize) -> Option<(usize, usize)> {
    let needle = format!("<{}", name);
    let mut cursor = from;
    while let Some(offset) = lower[cursor..].find(&needle) {
        let start = cursor + offset;
        let after = start + needle.len();
        match lower[after..].chars().next() {
            Some(c) if c == '>' || c == '/' || c.is_ascii_whitespace() => {
                let end = lower[after..].find('>')? + after + 1;
                return Some((start, end));
            }
            _ => cursor = after,
        }
    }
    None
}

fn require_tag(html: &str, name: &str) -> Result<(usize, usize)> {
    find_open_tag(&html.to_ascii_lowercase(), name, 0)
        .ok_or_else(|| BlogError::Template(format!("template has no <{}> element", name)))
}

fn set_base(html: &str) -> Result<String> {
    let lower = html.to_ascii_lowercase();
    if let Some((start, end)) = find_open_tag(&lower, "base", 0) {
        return Ok(format!("{}{}{}", &html[..start], BASE_TAG, &html[end..]));
    }
    let (_, head_end) = require_tag(html, "head")?;
    Ok(format!("{}{}{}", &html[..head_end], BASE_TAG, &html[head_end..]))
}

fn set_title(html: &str, title: &str) -> Result<String> {
    let title = escape(title);
    let lower = html.to_ascii_lowercase();
    if let Some((_, open_end)) = find_open_tag(&lower, "title", 0) {
        if let Some(close) = lower[open_end..].find("</title>") {
            let close = close + open_end;
            return Ok(format!("{}{}{}", &html[..open_end], title, &html[close..]));
        }
    }
    let (_, base_end) = require_tag(html, "base")?;
    Ok(format!(
        "{}<title>{}</title>{}",
        &html[..base_end],
        title,
        &html[base_end..]
    ))
}

fn inject_snapshot(html: &str, snapshot: &Snapshot) -> Result<String> {
    let html = match find_snapshot(html) {
        Some((start, end)) => format!("{}{}", &html[..start], &html[end..]),
        None => html.to_string(),
    };
    // Right after <base>, ahead of any application script in <head>.
    let (_, base_end) = require_tag(&html, "base")?;
    Ok(format!(
        "{}{}{}",
        &html[..base_end],
        snapshot.to_script()?,
        &html[base_end..]
    ))
}

fn mark_read_only(html: &str) -> Result<String> {
    let (start, end) = require_tag(html, "body")?;
    let tag = &html[start..end];
    let lower_tag = tag.to_ascii_lowercase();
    if lower_tag.contains(READ_ONLY_ATTR) {
        return Ok(html.to_string());
    }

    // Everything but the closing '>'.
    let open = &tag[..tag.len() - 1];
    let class_value = ["class=\"", "class='"]
        .iter()
        .find_map(|needle| lower_tag.find(needle).map(|i| i + needle.len()));
    let open = match class_value {
        Some(at) => format!("{}{} {}", &open[..at], READ_ONLY_CLASS, &open[at..]),
        None => format!("{} class=\"{}\"", open, READ_ONLY_CLASS),
    };
    Ok(format!(
        "{}{} {}=\"true\">{}",
        &html[..start],
        open,
        READ_ONLY_ATTR,
        &html[end..]
    ))
}

/// Renders the standalone page for one post.
pub fn render_page(template: &str, post: &Post, store: &ContentStore) -> Result<String> {
    let html = set_base(template)?;
    let html = set_title(&html, &post.title)?;
    let html = inject_snapshot(&html, &Snapshot::for_post(post, store))?;
    mark_read_only(&html)
}

pub fn page_path(posts_dir: &Path, post_id: &str) -> PathBuf {
    posts_dir.join(format!("{}.html", post_id))
}

/// Writes one page per post. Fails before writing anything if the template
/// is missing or unusable.
pub fn generate<B: StorageBackend>(
    backend: &B,
    template_path: &Path,
    posts_dir: &Path,
    store: &ContentStore,
) -> Result<Vec<PathBuf>> {
    let template = backend.read_text(template_path)?.ok_or_else(|| {
        BlogError::Template(format!("template {} not found", template_path.display()))
    })?;

    let pages = store
        .posts
        .iter()
        .map(|post| Ok((page_path(posts_dir, &post.id), render_page(&template, post, store)?)))
        .collect::<Result<Vec<_>>>()?;

    let mut written = Vec::with_capacity(pages.len());
    for (path, html) in pages {
        backend.write_text(&path, &html)?;
        written.push(path);
    }
    log::info!("wrote {} static pages to {}", written.len(), posts_dir.display());
    Ok(written)
}

/// Deletes a post's page. `Ok(false)` when there was none.
pub fn remove_page<B: StorageBackend>(backend: &B, posts_dir: &Path, post_id: &str) -> Result<bool> {
    let path = page_path(posts_dir, post_id);
    let removed = backend.remove_file(&path)?;
    if !removed {
        log::warn!("static page {} was already gone", path.display());
    }
    Ok(removed)
}
