//! # CLI Layer
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Asks the user things (locations, confirmations, `$EDITOR`)
//! - Handles argument parsing
//! - Formats output for human consumption
//!
//! ## Structure
//!
//! - `run()`: Main entry (called by `main.rs`)
//! - `init_context()`: Builds `AppContext` with the API and configuration
//! - `dispatch()`: One command against an existing context (shared with the shell)
//! - `handle_*()`: Per-command handlers that call the API and print results

use super::prompt::{confirm, PromptPicker};
use super::render::{print_messages, render_config, render_list, render_page};
use super::setup::{CategoryCommands, Cli, Commands, PostCommands, PostInput};
use super::shell;
use blogdesk::api::{BlogApi, Mode, Startup};
use blogdesk::commands::CmdMessage;
use blogdesk::config::{BlogConfig, CONFIG_FILENAME};
use blogdesk::editor::{edit_content, EditorContent};
use blogdesk::error::{BlogError, Result};
use blogdesk::model::{CategoryFilter, ContentStore, PostFields, ALL_CATEGORIES};
use blogdesk::router::Route;
use blogdesk::store::fs::FsBackend;
use blogdesk::view;
use clap::Parser;
use std::path::{Path, PathBuf};

pub(super) struct AppContext {
    pub api: BlogApi<FsBackend, PromptPicker>,
    pub root: PathBuf,
    pub interactive: bool,
    pub in_shell: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut ctx = init_context(&cli);
    dispatch(&mut ctx, cli.command)
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

fn init_context(cli: &Cli) -> AppContext {
    let root = cli.root.clone().unwrap_or_else(|| {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    });

    let config = BlogConfig::load_with_fallback(&root).unwrap_or_else(|e| {
        log::warn!("ignoring unreadable {}: {}", CONFIG_FILENAME, e);
        BlogConfig::default()
    });
    let mode = Mode::resolve(&cli.origin, &config);
    if mode == Mode::ReadOnly {
        log::info!("opening read-only (origin {})", cli.origin);
    }

    let picker = PromptPicker::from_env();
    let startup = Startup {
        page: cli.page.clone(),
        fragment: None,
    };
    let api = BlogApi::open(FsBackend::new(), picker, config, root.clone(), mode, &startup);

    AppContext {
        api,
        root,
        interactive: picker.is_interactive(),
        in_shell: false,
    }
}

pub(super) fn dispatch(ctx: &mut AppContext, command: Option<Commands>) -> Result<()> {
    match command {
        None => handle_open(ctx, ""),
        Some(Commands::List { category }) => handle_list(ctx, category),
        Some(Commands::Open { fragment }) => handle_open(ctx, &fragment),
        Some(Commands::Show { post }) => handle_show(ctx, &post),
        Some(Commands::Category(cmd)) => match cmd {
            CategoryCommands::Add { name } => {
                let result = ctx.api.add_category(&name.join(" "))?;
                print_messages(&result.messages);
                Ok(())
            }
            CategoryCommands::Rename { id, name } => {
                let result = ctx.api.rename_category(&id, &name.join(" "))?;
                print_messages(&result.messages);
                Ok(())
            }
            CategoryCommands::Delete { id, yes } => handle_delete_category(ctx, &id, yes),
        },
        Some(Commands::Post(cmd)) => match cmd {
            PostCommands::Add(input) => handle_add_post(ctx, input),
            PostCommands::Edit { id, input } => handle_edit_post(ctx, &id, input),
            PostCommands::Delete { id, yes } => handle_delete_post(ctx, &id, yes),
        },
        Some(Commands::Connect { path }) => handle_connect(ctx, path),
        Some(Commands::Save) => {
            let result = ctx.api.save()?;
            print_messages(&result.messages);
            Ok(())
        }
        Some(Commands::Mirror) => {
            let result = ctx.api.generate_static_mirror()?;
            print_messages(&result.messages);
            Ok(())
        }
        Some(Commands::Sitemap) => {
            let result = ctx.api.generate_sitemap()?;
            print_messages(&result.messages);
            Ok(())
        }
        Some(Commands::Image { file, post, url }) => {
            let result =
                ctx.api
                    .insert_image(file.as_deref(), post.as_deref(), url.as_deref())?;
            print_messages(&result.messages);
            Ok(())
        }
        Some(Commands::Config { key, value }) => handle_config(ctx, key, value),
        Some(Commands::Shell) => {
            if ctx.in_shell {
                print_messages(&[CmdMessage::info("Already in a shell")]);
                return Ok(());
            }
            shell::run(ctx)
        }
    }
}

fn handle_open(ctx: &mut AppContext, fragment: &str) -> Result<()> {
    if !fragment.trim().is_empty() {
        ctx.api.navigate(fragment);
    }
    let mut title = ctx.api.document_title();
    if ctx.api.mode() == Mode::ReadOnly {
        title.push_str(" (read-only)");
    }
    print!("{}", render_page(&ctx.api.page(), &title));
    Ok(())
}

fn handle_show(ctx: &mut AppContext, post_id: &str) -> Result<()> {
    let selection = ctx.api.navigate(&Route::Post(post_id.to_string()).fragment());
    if selection.editing_post_id.as_deref() != Some(post_id) {
        return Err(BlogError::PostNotFound(post_id.to_string()));
    }
    handle_open(ctx, "")
}

fn handle_list(ctx: &mut AppContext, category: Option<String>) -> Result<()> {
    if let Some(category) = category {
        let id = resolve_category(ctx.api.store(), &category)?;
        ctx.api
            .navigate(&Route::list(&CategoryFilter::from_id(&id)).fragment());
    } else if ctx.api.selection().is_detail() {
        let current = ctx.api.selection().current_category.clone();
        ctx.api.navigate(&Route::list(&current).fragment());
    }
    let list = view::post_list(ctx.api.store(), ctx.api.selection());
    print!("{}", render_list(&list));
    Ok(())
}

fn handle_delete_category(ctx: &mut AppContext, id: &str, yes: bool) -> Result<()> {
    let store = ctx.api.store();
    let post_count = store.posts.iter().filter(|p| p.category_id == id).count();
    let cascade = if post_count == 0 || yes {
        true
    } else {
        confirm(
            &format!(
                "Category {} has {} post(s). Delete them too?",
                store.category_name(id),
                post_count
            ),
            ctx.interactive,
        )?
    };

    let result = ctx.api.delete_category(id, cascade)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_delete_post(ctx: &mut AppContext, id: &str, yes: bool) -> Result<()> {
    let title = ctx
        .api
        .store()
        .post(id)
        .map(|p| p.title.clone())
        .ok_or_else(|| BlogError::PostNotFound(id.to_string()))?;

    if !yes && !confirm(&format!("Delete post \"{}\"?", title), ctx.interactive)? {
        print_messages(&[CmdMessage::info("Post kept; delete cancelled.")]);
        return Ok(());
    }

    let result = ctx.api.delete_post(id)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_add_post(ctx: &mut AppContext, input: PostInput) -> Result<()> {
    let category_id = match &input.category {
        Some(category) => resolve_post_category(ctx.api.store(), category)?,
        None => ctx.api.suggested_category().unwrap_or_default(),
    };
    let initial = PostFields::new(
        input.title.clone().unwrap_or_default(),
        category_id,
        read_content(&input)?.unwrap_or_default(),
    );

    let needs_editor = initial.title.trim().is_empty() || initial.content_html.trim().is_empty();
    let fields = if needs_editor && !input.no_editor {
        edit_fields(initial)?
    } else {
        initial
    };

    let result = ctx.api.add_post(&fields)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_edit_post(ctx: &mut AppContext, id: &str, input: PostInput) -> Result<()> {
    let post = ctx
        .api
        .store()
        .post(id)
        .cloned()
        .ok_or_else(|| BlogError::PostNotFound(id.to_string()))?;

    let category_id = match &input.category {
        Some(category) => resolve_post_category(ctx.api.store(), category)?,
        None => post.category_id.clone(),
    };
    let content = read_content(&input)?;
    let overrides_text = input.title.is_some() || content.is_some();

    let current = PostFields::new(
        input.title.clone().unwrap_or(post.title),
        category_id,
        content.unwrap_or(post.content_html),
    );
    let fields = if !overrides_text && !input.no_editor {
        edit_fields(current)?
    } else {
        current
    };

    let result = ctx.api.update_post(id, &fields)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_connect(ctx: &mut AppContext, path: Option<PathBuf>) -> Result<()> {
    let result = ctx.api.connect_file(path)?;
    print_messages(&result.messages);

    // Later sessions start connected.
    if let Some(connected) = ctx.api.connected_file().map(Path::to_path_buf) {
        let mut config = ctx.api.config().clone();
        config.content_file = Some(connected);
        config.save(&ctx.root)?;
        ctx.api.reconfigure(config);
        print_messages(&[CmdMessage::info(format!(
            "content-file recorded in {}",
            CONFIG_FILENAME
        ))]);
    }
    Ok(())
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let Some(key) = key else {
        print!("{}", render_config(ctx.api.config()));
        return Ok(());
    };

    let Some(value) = value else {
        match ctx.api.config().get(&key) {
            Some(val) => println!("{}", val),
            None => print_messages(&[CmdMessage::error(format!("Unknown config key: {}", key))]),
        }
        return Ok(());
    };

    let mut config = ctx.api.config().clone();
    if let Err(e) = config.set(&key, &value) {
        return Err(BlogError::Config(e));
    }
    config.save(&ctx.root)?;
    let display_val = config.get(&key).unwrap_or(value);
    ctx.api.reconfigure(config);
    print_messages(&[CmdMessage::success(format!("{} set to {}", key, display_val))]);
    Ok(())
}

/// Opens `$EDITOR` on the title and content; the category is kept.
fn edit_fields(fields: PostFields) -> Result<PostFields> {
    let edited = edit_content(&EditorContent::new(fields.title, fields.content_html))?;
    Ok(PostFields::new(
        edited.title,
        fields.category_id,
        edited.content_html,
    ))
}

fn read_content(input: &PostInput) -> Result<Option<String>> {
    match (&input.content, &input.content_file) {
        (Some(content), _) => Ok(Some(content.clone())),
        (None, Some(path)) => std::fs::read_to_string(path).map(Some).map_err(BlogError::Io),
        (None, None) => Ok(None),
    }
}

/// Accepts a category id, `all`, or a category name (any case).
fn resolve_category(store: &ContentStore, arg: &str) -> Result<String> {
    let arg = arg.trim();
    if arg == ALL_CATEGORIES || store.category(arg).is_some() {
        return Ok(arg.to_string());
    }
    store
        .categories
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(arg))
        .map(|c| c.id.clone())
        .ok_or_else(|| BlogError::Validation(format!("No category named {}", arg)))
}

/// Like [`resolve_category`], but `all` is a filter, not a place for a post.
fn resolve_post_category(store: &ContentStore, arg: &str) -> Result<String> {
    let id = resolve_category(store, arg)?;
    if id == ALL_CATEGORIES {
        return Err(BlogError::Validation(
            "A post needs a real category, not `all`".to_string(),
        ));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogdesk::model::Category;

    fn store() -> ContentStore {
        ContentStore::new(
            vec![
                Category {
                    id: "cat_1".into(),
                    name: "Game Dev".into(),
                },
                Category {
                    id: "etc".into(),
                    name: "Etc".into(),
                },
            ],
            vec![],
        )
    }

    #[test]
    fn resolves_category_by_id_or_name() {
        let store = store();
        assert_eq!(resolve_category(&store, "etc").unwrap(), "etc");
        assert_eq!(resolve_category(&store, "game dev").unwrap(), "cat_1");
        assert_eq!(resolve_category(&store, "all").unwrap(), "all");
        assert!(matches!(
            resolve_category(&store, "nope"),
            Err(BlogError::Validation(_))
        ));
    }

    #[test]
    fn post_category_cannot_be_all() {
        let store = store();
        assert_eq!(resolve_post_category(&store, "Etc").unwrap(), "etc");
        assert!(matches!(
            resolve_post_category(&store, "all"),
            Err(BlogError::Validation(_))
        ));
        assert!(resolve_post_category(&store, "nope").is_err());
    }

    #[test]
    fn inline_content_wins_over_missing_file() {
        let input = PostInput {
            content: Some("<p>x</p>".into()),
            ..PostInput::default()
        };
        assert_eq!(read_content(&input).unwrap().as_deref(), Some("<p>x</p>"));

        let input = PostInput {
            content_file: Some("/definitely/not/here.html".into()),
            ..PostInput::default()
        };
        assert!(matches!(read_content(&input), Err(BlogError::Io(_))));
    }
}
