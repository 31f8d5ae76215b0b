//! # Command Layer
//!
//! Pure business logic over the in-memory [`ContentStore`]. A command mutates
//! the store (or refuses to) and reports back in a [`CmdResult`]: messages for
//! the user plus a list of [`Effect`]s describing what must happen next. The
//! command itself never touches storage or the terminal; the API layer
//! applies the effects.
//!
//! Validation failures return `Err` before any mutation happens.

use crate::model::{Category, Post};
use crate::router::Route;

pub mod category;
pub mod list;
pub mod post;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// A side effect requested by a command, applied in order by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Overwrite the content file with the whole store.
    Save,
    /// Rewrite every static post page.
    RegenerateMirror,
    /// Delete `<id>.html` from the posts directory.
    RemoveStaticPage(String),
    RegenerateSitemap,
    Navigate(Route),
}

impl Effect {
    /// The effects that follow any change to a post.
    pub(crate) fn post_changed(id: &str) -> Vec<Effect> {
        vec![
            Effect::Save,
            Effect::RegenerateMirror,
            Effect::RegenerateSitemap,
            Effect::Navigate(Route::Post(id.to_string())),
        ]
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_posts: Vec<Post>,
    pub affected_categories: Vec<Category>,
    pub listed_posts: Vec<Post>,
    pub messages: Vec<CmdMessage>,
    pub effects: Vec<Effect>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_message(mut self, message: CmdMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_effects(mut self, effects: Vec<Effect>) -> Self {
        self.effects = effects;
        self
    }

    pub fn with_listed_posts(mut self, posts: Vec<Post>) -> Self {
        self.listed_posts = posts;
        self
    }

    pub fn with_affected_posts(mut self, posts: Vec<Post>) -> Self {
        self.affected_posts = posts;
        self
    }

    pub fn with_affected_categories(mut self, categories: Vec<Category>) -> Self {
        self.affected_categories = categories;
        self
    }

    /// Whether the command asked for the store to be written.
    pub fn mutated(&self) -> bool {
        self.effects.contains(&Effect::Save)
    }
}
