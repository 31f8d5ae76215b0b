use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Label shown for posts whose category no longer exists.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Reserved category id meaning "every post".
pub const ALL_CATEGORIES: &str = "all";

const ID_SUFFIX_LEN: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub category_id: String,
    pub content_html: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    // Absent until the first edit; files from older editors never carry it.
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Reads the timestamps content files carry in the wild: RFC 3339, a local
/// date-time without offset, a bare date (midnight UTC) or epoch
/// milliseconds. Writing always uses RFC 3339.
pub mod timestamp {
    use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    const LOCAL_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(i64),
        Text(String),
    }

    pub fn parse(text: &str) -> Option<DateTime<Utc>> {
        let text = text.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
            return Some(parsed.with_timezone(&Utc));
        }
        for format in LOCAL_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
                return Local
                    .from_local_datetime(&naive)
                    .earliest()
                    .map(|local| local.with_timezone(&Utc));
            }
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Utc.from_utc_datetime(&naive))
    }

    fn from_raw<E: Error>(raw: Raw) -> Result<DateTime<Utc>, E> {
        match raw {
            Raw::Millis(millis) => DateTime::from_timestamp_millis(millis)
                .ok_or_else(|| E::custom(format!("timestamp out of range: {}", millis))),
            Raw::Text(text) => {
                parse(&text).ok_or_else(|| E::custom(format!("invalid timestamp: {}", text)))
            }
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        from_raw(Raw::deserialize(deserializer)?)
    }

    pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<Raw>::deserialize(deserializer)?
            .map(from_raw)
            .transpose()
    }
}

/// The editable fields of a post, as submitted from the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFields {
    pub title: String,
    pub category_id: String,
    pub content_html: String,
}

impl PostFields {
    pub fn new(
        title: impl Into<String>,
        category_id: impl Into<String>,
        content_html: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            category_id: category_id.into(),
            content_html: content_html.into(),
        }
    }

    /// Returns the trimmed fields, or `None` if any of them is empty.
    pub fn normalized(&self) -> Option<PostFields> {
        let title = self.title.trim();
        let category_id = self.category_id.trim();
        let content_html = self.content_html.trim();
        if title.is_empty() || category_id.is_empty() || content_html.is_empty() {
            return None;
        }
        Some(PostFields::new(title, category_id, content_html))
    }
}

/// Which posts a list view shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    All,
    Category(String),
}

impl CategoryFilter {
    pub fn from_id(id: &str) -> Self {
        if id == ALL_CATEGORIES {
            CategoryFilter::All
        } else {
            CategoryFilter::Category(id.to_string())
        }
    }

    pub fn id(&self) -> &str {
        match self {
            CategoryFilter::All => ALL_CATEGORIES,
            CategoryFilter::Category(id) => id,
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Category(id) => &post.category_id == id,
        }
    }
}

impl std::fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// The whole blog: what gets written to the content file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentStore {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub posts: Vec<Post>,
}

impl ContentStore {
    pub fn new(categories: Vec<Category>, posts: Vec<Post>) -> Self {
        Self { categories, posts }
    }

    /// The store a fresh site starts from when nothing could be loaded.
    pub fn seed() -> Self {
        let categories = [
            ("unity", "Unity"),
            ("unreal", "Unreal"),
            ("backend", "Backend"),
            ("etc", "Etc"),
        ]
        .into_iter()
        .map(|(id, name)| Category {
            id: id.to_string(),
            name: name.to_string(),
        })
        .collect();

        let mut store = Self {
            categories,
            posts: Vec::new(),
        };
        let id = store.fresh_post_id();
        store.posts.push(Post {
            id,
            title: "Starting the blog".to_string(),
            category_id: "etc".to_string(),
            content_html: "<p>No posts.json was connected, or it could not be loaded.</p>\
                <p>Run <b>blogdesk connect</b> with the posts.json of your site repository, then save.</p>"
                .to_string(),
            created_at: Utc::now(),
            updated_at: None,
        });
        store
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn post(&self, id: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    pub fn post_mut(&mut self, id: &str) -> Option<&mut Post> {
        self.posts.iter_mut().find(|p| p.id == id)
    }

    /// Display name for a category id, falling back to [`UNKNOWN_CATEGORY`].
    pub fn category_name(&self, id: &str) -> &str {
        self.category(id)
            .map(|c| c.name.as_str())
            .unwrap_or(UNKNOWN_CATEGORY)
    }

    pub fn has_posts_in(&self, category_id: &str) -> bool {
        self.posts.iter().any(|p| p.category_id == category_id)
    }

    pub fn fresh_category_id(&self) -> String {
        loop {
            let id = generate_id("cat");
            if self.category(&id).is_none() && id != ALL_CATEGORIES {
                return id;
            }
        }
    }

    pub fn fresh_post_id(&self) -> String {
        loop {
            let id = generate_id("post");
            if self.post(&id).is_none() {
                return id;
            }
        }
    }
}

/// `<prefix>_<7 random hex chars>`. Random, not guaranteed unique; callers
/// check against the store.
pub fn generate_id(prefix: &str) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}_{}", prefix, &random[..ID_SUFFIX_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn generated_ids_carry_prefix() {
        let id = generate_id("post");
        assert!(id.starts_with("post_"));
        assert_eq!(id.len(), "post_".len() + ID_SUFFIX_LEN);
    }

    #[test]
    fn unknown_category_has_sentinel_name() {
        let store = ContentStore::default();
        assert_eq!(store.category_name("nope"), UNKNOWN_CATEGORY);
    }

    #[test]
    fn normalized_rejects_blank_fields() {
        assert!(PostFields::new("  ", "etc", "<p>x</p>").normalized().is_none());
        assert!(PostFields::new("T", "", "<p>x</p>").normalized().is_none());
        assert!(PostFields::new("T", "etc", " \n ").normalized().is_none());

        let ok = PostFields::new(" T ", "etc", " <p>x</p> ")
            .normalized()
            .unwrap();
        assert_eq!(ok.title, "T");
        assert_eq!(ok.content_html, "<p>x</p>");
    }

    #[test]
    fn deserializes_legacy_json_without_updated_at() {
        let json = r#"{
            "categories": [{ "id": "etc", "name": "Etc" }],
            "posts": [{
                "id": "post_abc1234",
                "title": "Hello",
                "categoryId": "etc",
                "contentHtml": "<p>hi</p>",
                "createdAt": "2024-03-05T10:20:30.000Z"
            }]
        }"#;
        let store: ContentStore = serde_json::from_str(json).unwrap();
        assert_eq!(store.posts[0].category_id, "etc");
        assert!(store.posts[0].updated_at.is_none());

        let out = serde_json::to_string(&store).unwrap();
        assert!(!out.contains("updatedAt"));
        assert!(out.contains("\"categoryId\":\"etc\""));
    }

    #[test]
    fn missing_collections_default_to_empty() {
        let store: ContentStore = serde_json::from_str("{}").unwrap();
        assert!(store.categories.is_empty());
        assert!(store.posts.is_empty());
    }

    #[test]
    fn seed_has_welcome_post_in_existing_category() {
        let store = ContentStore::seed();
        assert_eq!(store.categories.len(), 4);
        assert_eq!(store.posts.len(), 1);
        assert!(store.category(&store.posts[0].category_id).is_some());
    }

    #[test]
    fn category_filter_round_trips_all() {
        assert_eq!(CategoryFilter::from_id("all"), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::from_id("etc"),
            CategoryFilter::Category("etc".into())
        );
        assert_eq!(CategoryFilter::All.id(), "all");
    }

    fn post_json(created_at: &str) -> String {
        format!(
            r#"{{"id":"post_a","title":"T","categoryId":"etc","contentHtml":"<p>x</p>","createdAt":{}}}"#,
            created_at
        )
    }

    #[test]
    fn date_only_created_at_is_midnight_utc() {
        let post: Post = serde_json::from_str(&post_json(r#""2024-03-05""#)).unwrap();
        assert_eq!(post.created_at, Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap());

        let out = serde_json::to_string(&post).unwrap();
        assert!(out.contains(r#""createdAt":"2024-03-05T00:00:00Z""#));
    }

    #[test]
    fn created_at_accepts_iso_strings_and_millis() {
        let iso: Post = serde_json::from_str(&post_json(r#""2024-03-05T10:30:00.000Z""#)).unwrap();
        assert_eq!(iso.created_at, Utc.with_ymd_and_hms(2024, 3, 5, 10, 30, 0).unwrap());

        let millis: Post = serde_json::from_str(&post_json("1709634600000")).unwrap();
        assert_eq!(millis.created_at, iso.created_at);

        assert!(timestamp::parse("2024-03-05T10:30").is_some());
        assert!(serde_json::from_str::<Post>(&post_json(r#""last tuesday""#)).is_err());
    }

    #[test]
    fn lenient_updated_at() {
        let json = post_json(r#""2024-03-05","updatedAt":"2024-03-06""#);
        let post: Post = serde_json::from_str(&json).unwrap();
        assert_eq!(
            post.updated_at,
            Some(Utc.with_ymd_and_hms(2024, 3, 6, 0, 0, 0).unwrap())
        );

        let json = post_json(r#""2024-03-05","updatedAt":null"#);
        let post: Post = serde_json::from_str(&json).unwrap();
        assert_eq!(post.updated_at, None);
    }
}
