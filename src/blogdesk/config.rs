use crate::error::{BlogError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "blogdesk.json";

const DEFAULT_SITE_TITLE: &str = "My Blog";
const DEFAULT_POSTS_PATH: &str = "posts";
const DEFAULT_IMAGES_PATH: &str = "images";

/// Site configuration, stored as `blogdesk.json` in the site root.
///
/// The `*_file`/`*_dir` entries are optional: when present they are granted
/// up front, otherwise the user is asked the first time they are needed.
/// Relative paths resolve against the site root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlogConfig {
    #[serde(default = "default_site_title")]
    pub site_title: String,

    /// Public base URL, used for sitemap entries.
    #[serde(default)]
    pub site_url: String,

    /// Where the static pages live relative to `site_url`.
    #[serde(default = "default_posts_path")]
    pub posts_path: String,

    /// Prefix of image references inserted into posts.
    #[serde(default = "default_images_path")]
    pub images_path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posts_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sitemap_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_file: Option<PathBuf>,

    /// Force read-only mode even on a local origin.
    #[serde(default)]
    pub read_only: bool,

    /// Regenerate static pages and the sitemap after every save.
    #[serde(default = "default_true")]
    pub auto_mirror: bool,
}

fn default_site_title() -> String {
    DEFAULT_SITE_TITLE.to_string()
}

fn default_posts_path() -> String {
    DEFAULT_POSTS_PATH.to_string()
}

fn default_images_path() -> String {
    DEFAULT_IMAGES_PATH.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            site_title: default_site_title(),
            site_url: String::new(),
            posts_path: default_posts_path(),
            images_path: default_images_path(),
            content_file: None,
            posts_dir: None,
            images_dir: None,
            sitemap_file: None,
            template_file: None,
            read_only: false,
            auto_mirror: true,
        }
    }
}

/// Every key accepted by [`BlogConfig::get`] and [`BlogConfig::set`].
pub const KEYS: &[&str] = &[
    "site-title",
    "site-url",
    "posts-path",
    "images-path",
    "content-file",
    "posts-dir",
    "images-dir",
    "sitemap-file",
    "template-file",
    "read-only",
    "auto-mirror",
];

impl BlogConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(BlogError::Io)?;
        let config: BlogConfig =
            serde_json::from_str(&content).map_err(BlogError::Serialization)?;
        Ok(config)
    }

    /// Site-local config if there is one, else the user-wide one, else defaults.
    pub fn load_with_fallback<P: AsRef<Path>>(site_root: P) -> Result<Self> {
        let site_root = site_root.as_ref();
        if site_root.join(CONFIG_FILENAME).exists() {
            return Self::load(site_root);
        }
        match user_config_dir() {
            Some(dir) => Self::load(dir),
            None => Ok(Self::default()),
        }
    }

    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(BlogError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(BlogError::Serialization)?;
        fs::write(config_path, content).map_err(BlogError::Io)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let path = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        };
        let value = match key {
            "site-title" => self.site_title.clone(),
            "site-url" => self.site_url.clone(),
            "posts-path" => self.posts_path.clone(),
            "images-path" => self.images_path.clone(),
            "content-file" => path(&self.content_file),
            "posts-dir" => path(&self.posts_dir),
            "images-dir" => path(&self.images_dir),
            "sitemap-file" => path(&self.sitemap_file),
            "template-file" => path(&self.template_file),
            "read-only" => self.read_only.to_string(),
            "auto-mirror" => self.auto_mirror.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Sets a key from its string form. An empty value clears a path.
    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        let value = value.trim();
        let path = |v: &str| (!v.is_empty()).then(|| PathBuf::from(v));
        match key {
            "site-title" => self.site_title = value.to_string(),
            "site-url" => self.site_url = value.trim_end_matches('/').to_string(),
            "posts-path" => self.posts_path = value.trim_matches('/').to_string(),
            "images-path" => self.images_path = value.trim_matches('/').to_string(),
            "content-file" => self.content_file = path(value),
            "posts-dir" => self.posts_dir = path(value),
            "images-dir" => self.images_dir = path(value),
            "sitemap-file" => self.sitemap_file = path(value),
            "template-file" => self.template_file = path(value),
            "read-only" => self.read_only = parse_bool(key, value)?,
            "auto-mirror" => self.auto_mirror = parse_bool(key, value)?,
            _ => return Err(format!("Unknown config key: {}", key)),
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> std::result::Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(format!("{} expects true or false, got '{}'", key, value)),
    }
}

/// The per-user config directory, when the platform has one.
pub fn user_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "blogdesk", "blogdesk").map(|dirs| dirs.config_dir().to_path_buf())
}
