//! # View Models
//!
//! Pure projections of the store and the current [`ViewSelection`] into what
//! a client shows: the category sidebar, the post list and the post detail.
//! Nothing here formats for a particular terminal or markup; the CLI decides
//! how to print these.

use crate::commands::list::list_posts;
use crate::model::{CategoryFilter, ContentStore, Post, ALL_CATEGORIES};
use crate::router::ViewSelection;
use chrono::{DateTime, Local, Utc};
use quick_xml::escape::unescape;

pub const EXCERPT_CHARS: usize = 80;
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";
const COMMENT_TERM_PREFIX: &str = "post-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarEntry {
    pub id: String,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCard {
    pub id: String,
    pub title: String,
    pub category_name: String,
    pub date: String,
    pub created_at: DateTime<Utc>,
    pub excerpt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostListView {
    pub heading: String,
    pub cards: Vec<PostCard>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDetailView {
    pub id: String,
    pub title: String,
    pub category_id: String,
    pub category_name: String,
    pub date: String,
    pub updated: Option<String>,
    pub content_html: String,
    /// Discussion term handed to the comment widget.
    pub comment_term: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MainView {
    List(PostListView),
    Detail(PostDetailView),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub sidebar: Vec<SidebarEntry>,
    pub main: MainView,
}

/// The whole screen for a selection. A detail selection whose post vanished
/// shows the list instead.
pub fn page(store: &ContentStore, selection: &ViewSelection) -> Page {
    let detail = selection
        .editing_post_id
        .as_deref()
        .and_then(|id| post_detail(store, id));
    Page {
        sidebar: sidebar(store, selection),
        main: match detail {
            Some(detail) => MainView::Detail(detail),
            None => MainView::List(post_list(store, selection)),
        },
    }
}

/// "All" first, then every category in store order.
pub fn sidebar(store: &ContentStore, selection: &ViewSelection) -> Vec<SidebarEntry> {
    let current = selection.current_category.id();
    std::iter::once(SidebarEntry {
        id: ALL_CATEGORIES.to_string(),
        name: "All".to_string(),
        active: current == ALL_CATEGORIES,
    })
    .chain(store.categories.iter().map(|c| SidebarEntry {
        id: c.id.clone(),
        name: c.name.clone(),
        active: c.id == current,
    }))
    .collect()
}

pub fn post_list(store: &ContentStore, selection: &ViewSelection) -> PostListView {
    let heading = match &selection.current_category {
        CategoryFilter::All => "All posts".to_string(),
        CategoryFilter::Category(id) => format!("{} posts", store.category_name(id)),
    };
    let cards = list_posts(store, &selection.current_category)
        .into_iter()
        .map(|post| card(store, post))
        .collect();
    PostListView { heading, cards }
}

pub fn post_detail(store: &ContentStore, id: &str) -> Option<PostDetailView> {
    let post = store.post(id)?;
    Some(PostDetailView {
        id: post.id.clone(),
        title: post.title.clone(),
        category_id: post.category_id.clone(),
        category_name: store.category_name(&post.category_id).to_string(),
        date: format_date(post.created_at),
        updated: post.updated_at.map(format_date),
        content_html: post.content_html.clone(),
        comment_term: comment_term(&post.id),
    })
}

fn card(store: &ContentStore, post: &Post) -> PostCard {
    PostCard {
        id: post.id.clone(),
        title: post.title.clone(),
        category_name: store.category_name(&post.category_id).to_string(),
        date: format_date(post.created_at),
        created_at: post.created_at,
        excerpt: excerpt(&post.content_html),
    }
}

pub fn comment_term(post_id: &str) -> String {
    format!("{}{}", COMMENT_TERM_PREFIX, post_id)
}

/// Local time, `YYYY-MM-DD HH:MM`.
pub fn format_date(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format(DATE_FORMAT)
        .to_string()
}

/// Plain text of `html`, cut to [`EXCERPT_CHARS`] characters with `...`
/// appended when something was cut.
pub fn excerpt(html: &str) -> String {
    let text = strip_tags(html);
    if text.chars().count() <= EXCERPT_CHARS {
        return text;
    }
    let cut: String = text.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", cut)
}

/// Drops markup, decodes entities where it can and collapses whitespace.
pub fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    let text = match unescape(&text) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => text,
    };
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
