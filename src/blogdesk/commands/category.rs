use crate::commands::{CmdMessage, CmdResult, Effect};
use crate::error::{BlogError, Result};
use crate::model::{Category, CategoryFilter, ContentStore};
use crate::router::Route;

fn normalized_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BlogError::Validation(
            "Please enter a category name".to_string(),
        ));
    }
    Ok(name.to_string())
}

pub fn add(store: &mut ContentStore, name: &str) -> Result<CmdResult> {
    let name = normalized_name(name)?;
    let category = Category {
        id: store.fresh_category_id(),
        name,
    };
    store.categories.push(category.clone());

    Ok(CmdResult::default()
        .with_message(CmdMessage::success(format!(
            "Category added ({}): {}",
            category.id, category.name
        )))
        .with_affected_categories(vec![category])
        .with_effects(vec![Effect::Save, Effect::RegenerateMirror]))
}

pub fn rename(store: &mut ContentStore, id: &str, name: &str) -> Result<CmdResult> {
    let name = normalized_name(name)?;
    let Some(category) = store.categories.iter_mut().find(|c| c.id == id) else {
        return Ok(CmdResult::default()
            .with_message(CmdMessage::warning(format!("No category with id {}", id))));
    };

    category.name = name;
    let category = category.clone();

    Ok(CmdResult::default()
        .with_message(CmdMessage::success(format!(
            "Category renamed ({}): {}",
            category.id, category.name
        )))
        .with_affected_categories(vec![category])
        .with_effects(vec![Effect::Save, Effect::RegenerateMirror]))
}

/// Deletes a category. When posts still reference it, `cascade` is the
/// user's answer to "delete its posts too?": `false` aborts the whole delete.
pub fn delete(
    store: &mut ContentStore,
    current: &CategoryFilter,
    id: &str,
    cascade: bool,
) -> Result<CmdResult> {
    let Some(index) = store.categories.iter().position(|c| c.id == id) else {
        return Ok(CmdResult::default()
            .with_message(CmdMessage::warning(format!("No category with id {}", id))));
    };

    if store.has_posts_in(id) && !cascade {
        return Ok(CmdResult::default().with_message(CmdMessage::info(
            "Category still has posts; delete cancelled.",
        )));
    }

    let (removed_posts, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut store.posts)
        .into_iter()
        .partition(|p| p.category_id == id);
    store.posts = kept;
    let category = store.categories.remove(index);

    let mut effects = vec![Effect::Save, Effect::RegenerateMirror];
    effects.extend(
        removed_posts
            .iter()
            .map(|p| Effect::RemoveStaticPage(p.id.clone())),
    );
    effects.push(Effect::RegenerateSitemap);
    if current.id() == id {
        effects.push(Effect::Navigate(Route::all()));
    }

    let mut result = CmdResult::default()
        .with_message(CmdMessage::success(format!(
            "Category deleted ({}): {}",
            category.id, category.name
        )))
        .with_effects(effects);
    if !removed_posts.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "{} post(s) deleted with it",
            removed_posts.len()
        )));
    }
    Ok(result
        .with_affected_posts(removed_posts)
        .with_affected_categories(vec![category]))
}
