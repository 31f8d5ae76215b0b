//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single
//! entry point for every blogdesk operation, whatever the client.
//!
//! ## Role and Responsibilities
//!
//! [`BlogApi`] owns the session ([`AppState`]): the content store, the current
//! view selection, the capability cache, the edit/read-only mode and the
//! config. For each call it:
//! - **Gates** mutations behind the edit mode
//! - **Dispatches** to the command function
//! - **Applies** the returned [`Effect`]s in order: save, static pages,
//!   sitemap, navigation
//!
//! ## Effect failures
//!
//! A failed save is returned as the call's error; the in-memory store keeps
//! the mutation. Static page and sitemap updates that run automatically
//! after a save never fail the call: errors become warning messages, and a
//! dismissed location prompt silently skips the step. The explicit
//! [`BlogApi::generate_static_mirror`] and [`BlogApi::generate_sitemap`]
//! report the same problems as errors.
//!
//! ## Generic Over Backend and Picker
//!
//! `BlogApi<B: StorageBackend, P: Picker>`:
//! - Production: `BlogApi<FsBackend, PromptPicker>` (the CLI's stdin picker)
//! - Testing: `BlogApi<MemBackend, ScriptedPicker>`

use crate::capability::{CapabilityCache, Picker, Purpose};
use crate::commands::{self, CmdMessage, CmdResult, Effect};
use crate::config::BlogConfig;
use crate::error::{BlogError, Result};
use crate::model::{CategoryFilter, ContentStore, PostFields};
use crate::persist::content::{self, LoadOrigin, LoadSource};
use crate::persist::sitemap::SiteLocation;
use crate::persist::{images, mirror, sitemap};
use crate::router::{self, Route, ViewSelection};
use crate::store::StorageBackend;
use crate::view;
use chrono::Utc;
use std::path::{Path, PathBuf};
use url::{Host, Url};

pub use crate::commands::MessageLevel;

/// Default name of the content file in the site root.
pub const DEFAULT_CONTENT_FILE: &str = "posts.json";
/// The site's own page, used as the static page template.
pub const DEFAULT_TEMPLATE_FILE: &str = "index.html";

/// Whether the session may edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Edit,
    ReadOnly,
}

impl Mode {
    /// Local origins (`localhost`, loopback addresses, `file:`) edit;
    /// anything else, including an origin that is not a URL, is the
    /// published site and is read-only.
    pub fn detect(origin: &str) -> Mode {
        let Ok(url) = Url::parse(origin.trim()) else {
            return Mode::ReadOnly;
        };
        if url.scheme() == "file" {
            return Mode::Edit;
        }
        match url.host() {
            Some(Host::Domain(domain)) if domain.eq_ignore_ascii_case("localhost") => Mode::Edit,
            Some(Host::Ipv4(ip)) if ip.is_loopback() => Mode::Edit,
            Some(Host::Ipv6(ip)) if ip.is_loopback() => Mode::Edit,
            _ => Mode::ReadOnly,
        }
    }

    /// Detected mode, unless the config forces read-only.
    pub fn resolve(origin: &str, config: &BlogConfig) -> Mode {
        if config.read_only {
            Mode::ReadOnly
        } else {
            Mode::detect(origin)
        }
    }
}

/// How the session starts.
#[derive(Debug, Clone, Default)]
pub struct Startup {
    /// A generated static page to load the embedded snapshot from.
    pub page: Option<PathBuf>,
    /// The URL fragment the session opens on.
    pub fragment: Option<String>,
}

pub struct AppState<P: Picker> {
    pub content: ContentStore,
    pub view: ViewSelection,
    pub caps: CapabilityCache<P>,
    pub mode: Mode,
    pub config: BlogConfig,
    pub root: PathBuf,
    /// A content file that exists but failed to load. Saves to it are
    /// refused until it is connected again.
    pub unloaded_file: Option<PathBuf>,
}

/// The main API facade for blogdesk operations.
pub struct BlogApi<B: StorageBackend, P: Picker> {
    backend: B,
    state: AppState<P>,
}

impl<B: StorageBackend, P: Picker> BlogApi<B, P> {
    /// Starts a session: pre-grants the locations named in the config, loads
    /// the store and resolves the initial view. Loading never fails; see
    /// [`content::load`].
    pub fn open(
        backend: B,
        picker: P,
        config: BlogConfig,
        root: impl Into<PathBuf>,
        mode: Mode,
        startup: &Startup,
    ) -> Self {
        let root = root.into();
        let mut caps = CapabilityCache::new(picker);
        grant_configured(&mut caps, &config, &root);
        let template = root.join(DEFAULT_TEMPLATE_FILE);
        if caps.cached(Purpose::TemplateFile).is_none() && backend.exists(&template) {
            caps.grant(Purpose::TemplateFile, template);
        }

        let default_content = root.join(DEFAULT_CONTENT_FILE);
        let source = match (&startup.page, caps.cached(Purpose::ContentFile)) {
            (Some(page), _) => LoadSource::Snapshot(page),
            (None, Some(path)) => LoadSource::File(path),
            (None, None) => LoadSource::File(&default_content),
        };
        let loaded = content::load(&backend, source);
        let unloaded_file = (loaded.origin == LoadOrigin::Seed)
            .then(|| {
                caps.cached(Purpose::ContentFile)
                    .map(Path::to_path_buf)
                    .unwrap_or(default_content)
            })
            .filter(|path| backend.exists(path));
        if let Some(path) = &unloaded_file {
            log::warn!("{} will not be saved over until reconnected", path.display());
        }
        let view = router::initial_selection(
            startup.fragment.as_deref(),
            loaded.open_post_id.as_deref(),
            &loaded.store,
        );
        log::debug!("session opened in {:?} mode at {}", mode, view.route());

        Self {
            backend,
            state: AppState {
                content: loaded.store,
                view,
                caps,
                mode,
                config,
                root,
                unloaded_file,
            },
        }
    }

    pub fn state(&self) -> &AppState<P> {
        &self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn store(&self) -> &ContentStore {
        &self.state.content
    }

    pub fn selection(&self) -> &ViewSelection {
        &self.state.view
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn config(&self) -> &BlogConfig {
        &self.state.config
    }

    /// Swaps in a changed config mid-session. Newly configured locations
    /// replace earlier grants; the store is not reloaded.
    pub fn reconfigure(&mut self, config: BlogConfig) {
        grant_configured(&mut self.state.caps, &config, &self.state.root);
        if config.read_only {
            self.state.mode = Mode::ReadOnly;
        }
        self.state.config = config;
    }

    // --- Content Store ---

    pub fn add_category(&mut self, name: &str) -> Result<CmdResult> {
        self.ensure_editable()?;
        let result = commands::category::add(&mut self.state.content, name)?;
        self.apply(result)
    }

    pub fn rename_category(&mut self, id: &str, name: &str) -> Result<CmdResult> {
        self.ensure_editable()?;
        let result = commands::category::rename(&mut self.state.content, id, name)?;
        self.apply(result)
    }

    /// `cascade` answers "delete its posts too?"; see
    /// [`commands::category::delete`].
    pub fn delete_category(&mut self, id: &str, cascade: bool) -> Result<CmdResult> {
        self.ensure_editable()?;
        let current = self.state.view.current_category.clone();
        let result = commands::category::delete(&mut self.state.content, &current, id, cascade)?;
        self.apply(result)
    }

    pub fn add_post(&mut self, fields: &PostFields) -> Result<CmdResult> {
        self.ensure_editable()?;
        let result = commands::post::add(&mut self.state.content, fields)?;
        self.apply(result)
    }

    pub fn update_post(&mut self, id: &str, fields: &PostFields) -> Result<CmdResult> {
        self.ensure_editable()?;
        let result = commands::post::update(&mut self.state.content, id, fields)?;
        self.apply(result)
    }

    pub fn delete_post(&mut self, id: &str) -> Result<CmdResult> {
        self.ensure_editable()?;
        let current = self.state.view.current_category.clone();
        let result = commands::post::delete(&mut self.state.content, &current, id)?;
        self.apply(result)
    }

    /// Posts of `category` (an id or `all`), or of the current selection.
    pub fn list_posts(&self, category: Option<&str>) -> CmdResult {
        let filter = category
            .map(CategoryFilter::from_id)
            .unwrap_or_else(|| self.state.view.current_category.clone());
        commands::list::run(&self.state.content, &filter)
    }

    /// Category a new post starts in: the one being browsed, else the first.
    pub fn suggested_category(&self) -> Option<String> {
        match &self.state.view.current_category {
            CategoryFilter::Category(id) if self.state.content.category(id).is_some() => {
                Some(id.clone())
            }
            _ => self.state.content.categories.first().map(|c| c.id.clone()),
        }
    }

    // --- Router and view ---

    pub fn navigate(&mut self, fragment: &str) -> &ViewSelection {
        self.state.view = router::route(fragment, &self.state.content);
        &self.state.view
    }

    pub fn page(&self) -> view::Page {
        view::page(&self.state.content, &self.state.view)
    }

    pub fn document_title(&self) -> String {
        router::document_title(
            &self.state.view,
            &self.state.content,
            &self.state.config.site_title,
        )
    }

    // --- Persistence ---

    /// Points the session at a content file and loads it, replacing the
    /// store. With `path == None` the picker is asked. A dismissed picker or
    /// an unreadable file leaves the session as it was.
    pub fn connect_file(&mut self, path: Option<PathBuf>) -> Result<CmdResult> {
        self.ensure_editable()?;
        let path = match path {
            Some(path) => resolve_path(&self.state.root, &path),
            None => self
                .state
                .caps
                .picker_mut()
                .pick(Purpose::ContentFile)?
                .ok_or(BlogError::Cancelled(Purpose::ContentFile))?,
        };

        let store = content::read_store(&self.backend, &path)?;
        self.state.caps.grant(Purpose::ContentFile, path.clone());
        self.state.unloaded_file = None;
        self.state.content = store;
        self.state.view = ViewSelection::default();

        Ok(CmdResult::default().with_message(CmdMessage::success(format!(
            "Connected {}: {} categories, {} posts",
            path.display(),
            self.state.content.categories.len(),
            self.state.content.posts.len()
        ))))
    }

    pub fn connected_file(&self) -> Option<&Path> {
        self.state.caps.cached(Purpose::ContentFile)
    }

    /// Writes the whole store to the connected content file.
    pub fn save(&mut self) -> Result<CmdResult> {
        self.ensure_editable()?;
        let path = self.write_content()?;
        Ok(CmdResult::default()
            .with_message(CmdMessage::success(format!("Saved {}", path.display()))))
    }

    pub fn generate_static_mirror(&mut self) -> Result<CmdResult> {
        self.ensure_editable()?;
        let written = self.write_mirror(true)?.unwrap_or_default();
        Ok(CmdResult::default().with_message(CmdMessage::success(format!(
            "Wrote {} static page(s)",
            written
        ))))
    }

    pub fn generate_sitemap(&mut self) -> Result<CmdResult> {
        self.ensure_editable()?;
        let path = self.write_sitemap(true)?;
        let mut result = CmdResult::default();
        if let Some(path) = path {
            result.add_message(CmdMessage::success(format!(
                "Wrote sitemap {}",
                path.display()
            )));
        }
        Ok(result)
    }

    /// Copies `source` into the images directory and, with `post_id`, appends
    /// the `<img>` to that post. Without an images directory, `fallback_url`
    /// is referenced instead.
    pub fn insert_image(
        &mut self,
        source: Option<&Path>,
        post_id: Option<&str>,
        fallback_url: Option<&str>,
    ) -> Result<CmdResult> {
        self.ensure_editable()?;
        if let Some(id) = post_id {
            if self.state.content.post(id).is_none() {
                return Err(BlogError::PostNotFound(id.to_string()));
            }
        }

        let images_dir = match source {
            Some(_) => self.state.caps.try_request(Purpose::ImagesDir)?,
            None => None,
        };
        let (reference, html) = match (source, images_dir, fallback_url) {
            (Some(source), Some(dir), _) => {
                let image = images::insert_image(
                    &self.backend,
                    source,
                    &dir,
                    &self.state.config.images_path,
                    Utc::now().timestamp_millis(),
                )?;
                (image.relative_path, image.html)
            }
            (_, _, Some(url)) if !url.trim().is_empty() => {
                (url.trim().to_string(), images::image_html(url.trim()))
            }
            (Some(_), None, _) => return Err(BlogError::Cancelled(Purpose::ImagesDir)),
            (None, _, _) => {
                return Err(BlogError::Validation(
                    "Give an image file or an image URL".to_string(),
                ))
            }
        };

        let mut result = match post_id {
            Some(id) => {
                let result = commands::post::append_html(&mut self.state.content, id, &html)?;
                self.apply(result)?
            }
            None => CmdResult::default(),
        };
        result.add_message(CmdMessage::success(format!("Image inserted: {}", reference)));
        result.add_message(CmdMessage::info(html));
        Ok(result)
    }

    // --- Effects ---

    fn ensure_editable(&self) -> Result<()> {
        match self.state.mode {
            Mode::Edit => Ok(()),
            Mode::ReadOnly => Err(BlogError::ReadOnly),
        }
    }

    /// Runs the effects of `result` in order. After a failed save the
    /// remaining file effects are dropped, navigation still happens, and the
    /// save error is returned.
    fn apply(&mut self, mut result: CmdResult) -> Result<CmdResult> {
        let mut save_error = None;
        let auto = self.state.config.auto_mirror;

        for effect in result.effects.clone() {
            match effect {
                Effect::Save => {
                    if let Err(e) = self.write_content() {
                        save_error = Some(e);
                    }
                }
                Effect::Navigate(route) => self.navigate_to(&route),
                _ if save_error.is_some() || !auto => {}
                Effect::RegenerateMirror => {
                    if let Err(e) = self.write_mirror(false) {
                        log::warn!("static pages not updated: {}", e);
                        result.add_message(CmdMessage::warning(format!(
                            "Static pages not updated: {}",
                            e
                        )));
                    }
                }
                Effect::RemoveStaticPage(id) => {
                    if let Err(e) = self.remove_page(&id) {
                        log::warn!("static page of {} not removed: {}", id, e);
                        result.add_message(CmdMessage::warning(format!(
                            "Static page of {} not removed: {}",
                            id, e
                        )));
                    }
                }
                Effect::RegenerateSitemap => {
                    if let Err(e) = self.write_sitemap(false) {
                        log::warn!("sitemap not updated: {}", e);
                        result.add_message(CmdMessage::warning(format!(
                            "Sitemap not updated: {}",
                            e
                        )));
                    }
                }
            }
        }

        match save_error {
            Some(e) => Err(e),
            None => Ok(result),
        }
    }

    fn navigate_to(&mut self, route: &Route) {
        self.state.view = router::resolve(route, &self.state.content);
    }

    /// Explicit steps fail on a dismissed prompt; automatic ones get `None`.
    fn locate(&mut self, purpose: Purpose, explicit: bool) -> Result<Option<PathBuf>> {
        if explicit {
            self.state.caps.request(purpose).map(Some)
        } else {
            let path = self.state.caps.try_request(purpose)?;
            if path.is_none() {
                log::debug!("no {} granted, skipping", purpose);
            }
            Ok(path)
        }
    }

    fn write_content(&mut self) -> Result<PathBuf> {
        let path = self
            .state
            .caps
            .cached(Purpose::ContentFile)
            .map(Path::to_path_buf)
            .ok_or(BlogError::NotConnected)?;
        if self.state.unloaded_file.as_deref() == Some(path.as_path()) {
            return Err(BlogError::ContentNotLoaded(path));
        }
        content::save(&self.backend, &path, &self.state.content)?;
        Ok(path)
    }

    fn write_mirror(&mut self, explicit: bool) -> Result<Option<usize>> {
        let Some(posts_dir) = self.locate(Purpose::PostsDir, explicit)? else {
            return Ok(None);
        };
        let Some(template) = self.locate(Purpose::TemplateFile, explicit)? else {
            return Ok(None);
        };
        let written = mirror::generate(&self.backend, &template, &posts_dir, &self.state.content)?;
        Ok(Some(written.len()))
    }

    fn remove_page(&mut self, post_id: &str) -> Result<()> {
        if let Some(posts_dir) = self.locate(Purpose::PostsDir, false)? {
            mirror::remove_page(&self.backend, &posts_dir, post_id)?;
        }
        Ok(())
    }

    fn write_sitemap(&mut self, explicit: bool) -> Result<Option<PathBuf>> {
        let config = &self.state.config;
        if config.site_url.trim().is_empty() {
            if explicit {
                return Err(BlogError::Config(
                    "site-url is not set; run `blogdesk config site-url <url>`".to_string(),
                ));
            }
            log::debug!("site-url not set, skipping sitemap");
            return Ok(None);
        }
        let location = SiteLocation::parse(&config.site_url, &config.posts_path)?;

        let Some(path) = self.locate(Purpose::SitemapFile, explicit)? else {
            return Ok(None);
        };
        sitemap::write(&self.backend, &path, &self.state.content, &location)?;
        Ok(Some(path))
    }
}

fn grant_configured<P: Picker>(caps: &mut CapabilityCache<P>, config: &BlogConfig, root: &Path) {
    let configured = [
        (Purpose::ContentFile, &config.content_file),
        (Purpose::PostsDir, &config.posts_dir),
        (Purpose::ImagesDir, &config.images_dir),
        (Purpose::SitemapFile, &config.sitemap_file),
        (Purpose::TemplateFile, &config.template_file),
    ];
    for (purpose, path) in configured {
        if let Some(path) = path {
            caps.grant(purpose, resolve_path(root, path));
        }
    }
}

fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
