//! # Router
//!
//! Maps a URL fragment to a [`ViewSelection`]. The fragment is the only
//! navigational surface of the site:
//!
//! ```text
//! #post/<postId>            detail view of one post
//! #category/<categoryId>    list view filtered to one category
//! #category/all             list view of every post
//! (empty or anything else)  list view of every post
//! ```
//!
//! Routing is a pure function of the fragment and the current
//! [`ContentStore`]: every navigation re-evaluates the whole table, there is
//! no diffing against the previous route.

use crate::model::{CategoryFilter, ContentStore, ALL_CATEGORIES};

const POST_PREFIX: &str = "post/";
const CATEGORY_PREFIX: &str = "category/";

/// A parsed fragment, before it is checked against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Post(String),
    Category(String),
    Default,
}

impl Route {
    pub fn parse(fragment: &str) -> Self {
        let fragment = fragment.trim();
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);

        if let Some(id) = fragment.strip_prefix(POST_PREFIX) {
            if !id.is_empty() {
                return Route::Post(id.to_string());
            }
        }
        if let Some(id) = fragment.strip_prefix(CATEGORY_PREFIX) {
            if !id.is_empty() {
                return Route::Category(id.to_string());
            }
        }
        Route::Default
    }

    pub fn all() -> Self {
        Route::Category(ALL_CATEGORIES.to_string())
    }

    pub fn list(filter: &CategoryFilter) -> Self {
        Route::Category(filter.id().to_string())
    }

    pub fn fragment(&self) -> String {
        match self {
            Route::Post(id) => format!("#{}{}", POST_PREFIX, id),
            Route::Category(id) => format!("#{}{}", CATEGORY_PREFIX, id),
            Route::Default => format!("#{}{}", CATEGORY_PREFIX, ALL_CATEGORIES),
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.fragment())
    }
}

/// What the user is looking at. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSelection {
    pub current_category: CategoryFilter,
    /// Set when the detail view of a post is open.
    pub editing_post_id: Option<String>,
}

impl Default for ViewSelection {
    fn default() -> Self {
        Self::list(CategoryFilter::All)
    }
}

impl ViewSelection {
    pub fn list(filter: CategoryFilter) -> Self {
        Self {
            current_category: filter,
            editing_post_id: None,
        }
    }

    pub fn is_detail(&self) -> bool {
        self.editing_post_id.is_some()
    }

    /// The route that reproduces this selection.
    pub fn route(&self) -> Route {
        match &self.editing_post_id {
            Some(id) => Route::Post(id.clone()),
            None => Route::list(&self.current_category),
        }
    }
}

pub fn route(fragment: &str, store: &ContentStore) -> ViewSelection {
    resolve(&Route::parse(fragment), store)
}

pub fn resolve(route: &Route, store: &ContentStore) -> ViewSelection {
    match route {
        Route::Post(id) => match store.post(id) {
            Some(post) => ViewSelection {
                current_category: CategoryFilter::from_id(&post.category_id),
                editing_post_id: Some(post.id.clone()),
            },
            None => ViewSelection::default(),
        },
        Route::Category(id) => {
            if id == ALL_CATEGORIES || store.category(id).is_some() {
                ViewSelection::list(CategoryFilter::from_id(id))
            } else {
                ViewSelection::default()
            }
        }
        Route::Default => ViewSelection::default(),
    }
}

/// Selection at startup. A non-empty fragment wins over the "open this post"
/// directive embedded in generated static pages.
pub fn initial_selection(
    fragment: Option<&str>,
    open_post_id: Option<&str>,
    store: &ContentStore,
) -> ViewSelection {
    match (fragment.map(str::trim).filter(|f| !f.is_empty() && *f != "#"), open_post_id) {
        (Some(fragment), _) => route(fragment, store),
        (None, Some(id)) => resolve(&Route::Post(id.to_string()), store),
        (None, None) => ViewSelection::default(),
    }
}

pub fn document_title(selection: &ViewSelection, store: &ContentStore, site_title: &str) -> String {
    if let Some(post) = selection
        .editing_post_id
        .as_deref()
        .and_then(|id| store.post(id))
    {
        return format!("{} - {}", post.title, site_title);
    }
    match &selection.current_category {
        CategoryFilter::All => site_title.to_string(),
        CategoryFilter::Category(id) => format!("{} - {}", store.category_name(id), site_title),
    }
}
