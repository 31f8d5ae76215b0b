//! # Rendering
//!
//! Turns view models and command results into terminal text. Layout math
//! (widths, truncation, padding) is Unicode-aware; colors come from
//! `colored`, which honours `NO_COLOR`.

use blogdesk::api::MessageLevel;
use blogdesk::commands::CmdMessage;
use blogdesk::config::{BlogConfig, KEYS};
use blogdesk::view::{MainView, Page, PostCard, PostDetailView, PostListView, SidebarEntry};
use chrono::{DateTime, Utc};
use colored::Colorize;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const LINE_WIDTH: usize = 100;
const ID_WIDTH: usize = 14;
const CATEGORY_WIDTH: usize = 12;
const TIME_WIDTH: usize = 14;

pub(super) fn print_messages(messages: &[CmdMessage]) {
    print!("{}", render_messages(messages));
}

pub(super) fn render_messages(messages: &[CmdMessage]) -> String {
    let mut out = String::new();
    for message in messages {
        let line = match message.level {
            MessageLevel::Info => message.content.dimmed(),
            MessageLevel::Success => message.content.green(),
            MessageLevel::Warning => message.content.yellow(),
            MessageLevel::Error => message.content.red(),
        };
        out.push_str(&format!("{}\n", line));
    }
    out
}

/// Title line, category bar, then the list or the detail.
pub(super) fn render_page(page: &Page, title: &str) -> String {
    let mut out = format!("{}\n{}\n\n", title.bold(), render_sidebar(&page.sidebar));
    match &page.main {
        MainView::List(list) => out.push_str(&render_list(list)),
        MainView::Detail(detail) => out.push_str(&render_detail(detail)),
    }
    out
}

fn render_sidebar(entries: &[SidebarEntry]) -> String {
    entries
        .iter()
        .map(|e| {
            if e.active {
                format!("[{}]", e.name).bold().to_string()
            } else {
                e.name.dimmed().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub(super) fn render_list(list: &PostListView) -> String {
    let mut out = format!("{}\n", list.heading.bold().underline());
    if list.cards.is_empty() {
        out.push_str("No posts found.\n");
        return out;
    }
    for card in &list.cards {
        out.push_str(&render_card(card));
    }
    out
}

fn render_card(card: &PostCard) -> String {
    let id = pad_to_width(&card.id, ID_WIDTH);
    let category = pad_to_width(
        &truncate_to_width(&card.category_name, CATEGORY_WIDTH),
        CATEGORY_WIDTH,
    );
    let time_ago = format_time_ago(card.created_at);

    let fixed = 2 + ID_WIDTH + 2 + CATEGORY_WIDTH + TIME_WIDTH;
    let available = LINE_WIDTH.saturating_sub(fixed);
    let title = truncate_to_width(&card.title, available);
    let padding = available.saturating_sub(title.width());

    let mut out = format!(
        "  {}{}{}  {}{}\n",
        id.yellow(),
        title,
        " ".repeat(padding),
        category.cyan(),
        time_ago.dimmed()
    );

    let indent = " ".repeat(2 + ID_WIDTH);
    let summary = format!("{}  {}", card.date, card.excerpt);
    let summary = truncate_to_width(&summary, LINE_WIDTH.saturating_sub(indent.width()));
    out.push_str(&format!("{}{}\n", indent, summary.dimmed()));
    out
}

pub(super) fn render_detail(detail: &PostDetailView) -> String {
    let mut out = format!("{}\n", detail.title.bold());
    let mut meta = format!("{} · {}", detail.category_name, detail.date);
    if let Some(updated) = &detail.updated {
        meta.push_str(&format!(" (edited {})", updated));
    }
    out.push_str(&format!("{}  {}\n", meta.dimmed(), detail.id.yellow()));
    out.push_str("--------------------------------\n");
    out.push_str(&detail.content_html);
    out.push_str("\n--------------------------------\n");
    out.push_str(&format!("{}\n", format!("comments: {}", detail.comment_term).dimmed()));
    out
}

pub(super) fn render_config(config: &BlogConfig) -> String {
    let width = KEYS.iter().map(|k| k.width()).max().unwrap_or(0);
    KEYS.iter()
        .map(|key| {
            format!(
                "{}  {}\n",
                pad_to_width(key, width).cyan(),
                config.get(key).unwrap_or_default()
            )
        })
        .collect()
}

fn pad_to_width(s: &str, width: usize) -> String {
    format!("{}{}", s, " ".repeat(width.saturating_sub(s.width())))
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogdesk::model::{Category, CategoryFilter, ContentStore, Post};
    use blogdesk::router::ViewSelection;
    use blogdesk::view;
    use chrono::TimeZone;

    fn plain() {
        colored::control::set_override(false);
    }

    fn post(id: &str, category_id: &str, day: u32) -> Post {
        Post {
            id: id.to_string(),
            title: format!("Title {}", id),
            category_id: category_id.to_string(),
            content_html: format!("<p>Body of {}</p>", id),
            created_at: Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    fn store() -> ContentStore {
        let category = |id: &str, name: &str| Category {
            id: id.to_string(),
            name: name.to_string(),
        };
        ContentStore::new(
            vec![category("unity", "Unity"), category("etc", "Etc")],
            vec![post("post_a", "unity", 1), post("post_b", "etc", 2)],
        )
    }

    #[test]
    fn test_render_empty_list() {
        plain();
        let list = PostListView {
            heading: "All posts".into(),
            cards: vec![],
        };
        let output = render_list(&list);
        assert!(output.contains("All posts"));
        assert!(output.contains("No posts found."));
    }

    #[test]
    fn test_render_list_page() {
        plain();
        let store = store();
        let page = view::page(&store, &ViewSelection::list(CategoryFilter::from_id("etc")));

        let output = render_page(&page, "Etc - My Blog");

        assert!(output.starts_with("Etc - My Blog\n"));
        assert!(output.contains("[Etc]"));
        assert!(output.contains("Etc posts"));
        assert!(output.contains("post_b"));
        assert!(output.contains("Body of post_b"));
        assert!(!output.contains("post_a"));
    }

    #[test]
    fn test_render_detail_page() {
        plain();
        let store = store();
        let selection = blogdesk::router::route("#post/post_a", &store);
        let output = render_page(&view::page(&store, &selection), "x");

        assert!(output.contains("Title post_a"));
        assert!(output.contains("<p>Body of post_a</p>"));
        assert!(output.contains("comments: post-post_a"));
    }

    #[test]
    fn test_long_titles_are_truncated() {
        let long = "x".repeat(200);
        let cut = truncate_to_width(&long, 20);
        assert_eq!(cut.width(), 20);
        assert!(cut.ends_with('…'));
        assert_eq!(truncate_to_width("short", 20), "short");
    }

    #[test]
    fn test_render_messages_one_per_line() {
        plain();
        let output = render_messages(&[CmdMessage::success("Saved"), CmdMessage::warning("Careful")]);
        assert_eq!(output, "Saved\nCareful\n");
    }

    #[test]
    fn test_render_config_lists_every_key() {
        plain();
        let output = render_config(&BlogConfig::default());
        for key in KEYS {
            assert!(output.contains(key));
        }
        assert!(output.contains("My Blog"));
    }
}
