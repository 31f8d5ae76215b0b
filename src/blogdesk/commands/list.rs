use crate::commands::CmdResult;
use crate::model::{CategoryFilter, ContentStore, Post};

/// Posts matching `filter`, newest first. Equal timestamps keep insertion
/// order (`sort_by` is stable).
pub fn list_posts<'a>(store: &'a ContentStore, filter: &CategoryFilter) -> Vec<&'a Post> {
    let mut posts: Vec<&Post> = store.posts.iter().filter(|p| filter.matches(p)).collect();
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    posts
}

pub fn run(store: &ContentStore, filter: &CategoryFilter) -> CmdResult {
    let listed = list_posts(store, filter).into_iter().cloned().collect();
    CmdResult::default().with_listed_posts(listed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::post;
    use crate::model::PostFields;
    use crate::store::memory::fixtures::{jan, StoreFixture};

    fn ids(posts: &[&Post]) -> Vec<String> {
        posts.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn newest_first() {
        let store = StoreFixture::new()
            .with_post("old", "etc", 1)
            .with_post("new", "etc", 9)
            .with_post("mid", "etc", 5)
            .build();
        assert_eq!(
            ids(&list_posts(&store, &CategoryFilter::All)),
            vec!["new", "mid", "old"]
        );
    }

    #[test]
    fn ties_keep_insertion_order() {
        let store = StoreFixture::new()
            .with_post("first", "etc", 3)
            .with_post("second", "etc", 3)
            .with_post("newer", "etc", 4)
            .with_post("third", "etc", 3)
            .build();
        assert_eq!(
            ids(&list_posts(&store, &CategoryFilter::All)),
            vec!["newer", "first", "second", "third"]
        );
    }

    #[test]
    fn filters_by_category() {
        let store = StoreFixture::new()
            .with_post("a", "unity", 1)
            .with_post("b", "etc", 2)
            .with_post("c", "unity", 3)
            .build();
        assert_eq!(
            ids(&list_posts(&store, &CategoryFilter::Category("unity".into()))),
            vec!["c", "a"]
        );
    }

    #[test]
    fn survivors_after_add_edit_delete_sequence() {
        let mut store = StoreFixture::new().with_category("etc", "Etc").build();
        let fields = |t: &str| PostFields::new(t, "etc", "<p>x</p>");

        let a = post::add_at(&mut store, &fields("a"), jan(1)).unwrap().affected_posts[0]
            .id
            .clone();
        let b = post::add_at(&mut store, &fields("b"), jan(2)).unwrap().affected_posts[0]
            .id
            .clone();
        let c = post::add_at(&mut store, &fields("c"), jan(3)).unwrap().affected_posts[0]
            .id
            .clone();
        let d = post::add_at(&mut store, &fields("d"), jan(2)).unwrap().affected_posts[0]
            .id
            .clone();

        post::update_at(&mut store, &a, &fields("a2"), jan(30)).unwrap();
        post::delete(&mut store, &CategoryFilter::All, &c).unwrap();

        // Editing does not move a post: ordering is by creation time.
        assert_eq!(
            ids(&list_posts(&store, &CategoryFilter::All)),
            vec![b, d, a]
        );
    }

    #[test]
    fn run_returns_owned_posts() {
        let store = StoreFixture::new().with_post("a", "etc", 1).build();
        let result = run(&store, &CategoryFilter::All);
        assert_eq!(result.listed_posts.len(), 1);
        assert!(result.effects.is_empty());
    }
}
