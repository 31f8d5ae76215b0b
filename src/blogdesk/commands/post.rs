use crate::commands::{CmdMessage, CmdResult, Effect};
use crate::error::{BlogError, Result};
use crate::model::{CategoryFilter, ContentStore, Post, PostFields, ALL_CATEGORIES};
use crate::router::Route;
use chrono::{DateTime, Utc};

/// Trims the fields and checks the category exists. `kept` is the category
/// the post already has, accepted even if it has since disappeared.
fn validate(store: &ContentStore, fields: &PostFields, kept: Option<&str>) -> Result<PostFields> {
    let fields = fields.normalized().ok_or_else(|| {
        BlogError::Validation("Please fill in the title, category and content".to_string())
    })?;

    let category_id = fields.category_id.as_str();
    let known = category_id != ALL_CATEGORIES
        && (store.category(category_id).is_some() || kept == Some(category_id));
    if !known {
        return Err(BlogError::Validation(format!(
            "No category with id {}",
            category_id
        )));
    }
    Ok(fields)
}

pub fn add(store: &mut ContentStore, fields: &PostFields) -> Result<CmdResult> {
    add_at(store, fields, Utc::now())
}

pub fn add_at(
    store: &mut ContentStore,
    fields: &PostFields,
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    let fields = validate(store, fields, None)?;
    let post = Post {
        id: store.fresh_post_id(),
        title: fields.title,
        category_id: fields.category_id,
        content_html: fields.content_html,
        created_at: now,
        updated_at: None,
    };
    store.posts.push(post.clone());

    Ok(CmdResult::default()
        .with_message(CmdMessage::success(format!(
            "Post created ({}): {}",
            post.id, post.title
        )))
        .with_effects(Effect::post_changed(&post.id))
        .with_affected_posts(vec![post]))
}

pub fn update(store: &mut ContentStore, id: &str, fields: &PostFields) -> Result<CmdResult> {
    update_at(store, id, fields, Utc::now())
}

/// Edits keep `created_at` and stamp `updated_at`.
pub fn update_at(
    store: &mut ContentStore,
    id: &str,
    fields: &PostFields,
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    let kept = store.post(id).map(|p| p.category_id.clone());
    let fields = validate(store, fields, kept.as_deref())?;
    let post = store
        .post_mut(id)
        .ok_or_else(|| BlogError::PostNotFound(id.to_string()))?;

    post.title = fields.title;
    post.category_id = fields.category_id;
    post.content_html = fields.content_html;
    post.updated_at = Some(now);
    let post = post.clone();

    Ok(CmdResult::default()
        .with_message(CmdMessage::success(format!(
            "Post updated ({}): {}",
            post.id, post.title
        )))
        .with_effects(Effect::post_changed(&post.id))
        .with_affected_posts(vec![post]))
}

/// Appends an HTML fragment to a post's content, as an editor insertion would.
pub fn append_html(store: &mut ContentStore, id: &str, html: &str) -> Result<CmdResult> {
    let post = store
        .post(id)
        .ok_or_else(|| BlogError::PostNotFound(id.to_string()))?;
    let fields = PostFields::new(
        post.title.clone(),
        post.category_id.clone(),
        format!("{}\n{}", post.content_html, html),
    );
    update(store, id, &fields)
}

pub fn delete(store: &mut ContentStore, current: &CategoryFilter, id: &str) -> Result<CmdResult> {
    let index = store
        .posts
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(|| BlogError::PostNotFound(id.to_string()))?;
    let post = store.posts.remove(index);

    Ok(CmdResult::default()
        .with_message(CmdMessage::success(format!(
            "Post deleted ({}): {}",
            post.id, post.title
        )))
        .with_effects(vec![
            Effect::Save,
            Effect::RemoveStaticPage(post.id.clone()),
            Effect::RegenerateMirror,
            Effect::RegenerateSitemap,
            Effect::Navigate(Route::list(current)),
        ])
        .with_affected_posts(vec![post]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::{jan, StoreFixture};

    fn store() -> ContentStore {
        StoreFixture::new()
            .with_category("etc", "Etc")
            .with_post("post_a", "etc", 1)
            .build()
    }

    #[test]
    fn add_appends_and_navigates_to_new_post() {
        let mut store = store();
        let result = add(&mut store, &PostFields::new("Hello", "etc", "<p>hi</p>")).unwrap();

        let post = &result.affected_posts[0];
        assert!(post.id.starts_with("post_"));
        assert_eq!(store.posts.len(), 2);
        assert_eq!(
            result.effects.last(),
            Some(&Effect::Navigate(Route::Post(post.id.clone())))
        );
        assert!(result.mutated());
    }

    #[test]
    fn add_rejects_empty_fields_without_mutation() {
        let mut store = store();
        let before = store.clone();
        let err = add(&mut store, &PostFields::new("Hello", "etc", "   ")).unwrap_err();
        assert!(matches!(err, BlogError::Validation(_)));
        assert_eq!(store, before);
    }

    #[test]
    fn add_rejects_unknown_or_reserved_category() {
        let mut store = store();
        let before = store.clone();

        for category in ["nope", "all"] {
            let err = add(&mut store, &PostFields::new("T", category, "<p>x</p>")).unwrap_err();
            assert!(matches!(err, BlogError::Validation(msg) if msg.contains(category)));
        }
        assert_eq!(store, before);
    }

    #[test]
    fn update_cannot_move_post_to_unknown_category() {
        let mut store = store();
        let before = store.clone();
        assert!(matches!(
            update(&mut store, "post_a", &PostFields::new("T", "gone", "<p>x</p>")),
            Err(BlogError::Validation(_))
        ));
        assert_eq!(store, before);
    }

    #[test]
    fn dangling_category_is_kept_on_edit() {
        let mut store = StoreFixture::new().with_post("post_a", "gone", 1).build();
        append_html(&mut store, "post_a", "<p>more</p>").unwrap();
        assert_eq!(store.post("post_a").unwrap().category_id, "gone");
    }

    #[test]
    fn update_preserves_created_at() {
        let mut store = store();
        update_at(
            &mut store,
            "post_a",
            &PostFields::new("New", "etc", "<p>new</p>"),
            jan(20),
        )
        .unwrap();

        let post = store.post("post_a").unwrap();
        assert_eq!(post.title, "New");
        assert_eq!(post.created_at, jan(1));
        assert_eq!(post.updated_at, Some(jan(20)));
    }

    #[test]
    fn update_unknown_post_fails() {
        let mut store = store();
        let err = update(&mut store, "nope", &PostFields::new("T", "etc", "x")).unwrap_err();
        assert!(matches!(err, BlogError::PostNotFound(id) if id == "nope"));
    }

    #[test]
    fn update_rejects_empty_fields_without_mutation() {
        let mut store = store();
        let before = store.clone();
        assert!(update(&mut store, "post_a", &PostFields::new("", "etc", "x")).is_err());
        assert_eq!(store, before);
    }

    #[test]
    fn delete_removes_page_and_returns_to_list() {
        let mut store = store();
        let current = CategoryFilter::Category("etc".into());
        let result = delete(&mut store, &current, "post_a").unwrap();

        assert!(store.posts.is_empty());
        assert!(result
            .effects
            .contains(&Effect::RemoveStaticPage("post_a".into())));
        assert!(result.effects.contains(&Effect::RegenerateMirror));
        assert_eq!(
            result.effects.last(),
            Some(&Effect::Navigate(Route::Category("etc".into())))
        );
    }

    #[test]
    fn delete_unknown_post_fails() {
        let mut store = store();
        assert!(delete(&mut store, &CategoryFilter::All, "nope").is_err());
        assert_eq!(store.posts.len(), 1);
    }

    #[test]
    fn append_html_extends_content() {
        let mut store = store();
        append_html(&mut store, "post_a", "<img src=\"images/1_a.png\">").unwrap();
        let post = store.post("post_a").unwrap();
        assert!(post.content_html.starts_with("<p>Body of post_a</p>"));
        assert!(post.content_html.ends_with("<img src=\"images/1_a.png\">"));
    }
}
