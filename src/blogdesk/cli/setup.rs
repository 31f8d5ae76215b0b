use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Origin assumed when none is given: a local file, so editing is allowed.
pub const LOCAL_ORIGIN: &str = "file://";

#[derive(Parser, Debug)]
#[command(name = "blogdesk", bin_name = "blogdesk", version)]
#[command(
    about = "Edit a single-file JSON blog and keep its static pages and sitemap in sync",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Site root (defaults to the current directory)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub root: Option<PathBuf>,

    /// Origin the site is served from; non-local origins are read-only
    #[arg(long, global = true, default_value = LOCAL_ORIGIN, help_heading = "Options")]
    pub origin: String,

    /// Start from a generated static page instead of the content file
    #[arg(long, global = true, help_heading = "Options")]
    pub page: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List posts, newest first
    #[command(alias = "ls", display_order = 1)]
    List {
        /// Category id or name (`all` for every post)
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Print the page for a fragment (`#post/<id>`, `#category/<id>`)
    #[command(display_order = 2)]
    Open {
        #[arg(default_value = "")]
        fragment: String,
    },

    /// Print one post
    #[command(alias = "v", display_order = 3)]
    Show { post: String },

    /// Manage categories
    #[command(subcommand, display_order = 4)]
    Category(CategoryCommands),

    /// Manage posts
    #[command(subcommand, display_order = 5)]
    Post(PostCommands),

    /// Connect the content file and load it
    #[command(display_order = 10)]
    Connect {
        /// Path to posts.json (asked for when omitted)
        path: Option<PathBuf>,
    },

    /// Write the store to the connected content file
    #[command(display_order = 11)]
    Save,

    /// Regenerate every static post page
    #[command(display_order = 12)]
    Mirror,

    /// Regenerate sitemap.xml
    #[command(display_order = 13)]
    Sitemap,

    /// Copy an image into the site and print its <img> tag
    #[command(display_order = 14)]
    Image {
        /// Image file to copy
        file: Option<PathBuf>,

        /// Append the image to this post
        #[arg(long)]
        post: Option<String>,

        /// Reference this URL when no images directory is available
        #[arg(long)]
        url: Option<String>,
    },

    /// Show or set configuration
    #[command(display_order = 20)]
    Config {
        key: Option<String>,
        value: Option<String>,
    },

    /// Interactive session: locations and the current page persist
    #[command(display_order = 21)]
    Shell,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CategoryCommands {
    /// Add a category
    Add {
        /// Name words (joined with spaces)
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },

    /// Rename a category
    Rename {
        id: String,
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },

    /// Delete a category
    #[command(alias = "rm")]
    Delete {
        id: String,

        /// Delete its posts without asking
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct PostInput {
    #[arg(short, long)]
    pub title: Option<String>,

    /// Category id or name
    #[arg(short, long)]
    pub category: Option<String>,

    /// HTML content
    #[arg(long, conflicts_with = "content_file")]
    pub content: Option<String>,

    /// Read the HTML content from a file
    #[arg(long)]
    pub content_file: Option<PathBuf>,

    /// Never open the editor
    #[arg(long)]
    pub no_editor: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum PostCommands {
    /// Write a new post
    #[command(alias = "n")]
    Add(PostInput),

    /// Edit a post
    #[command(alias = "e")]
    Edit {
        id: String,
        #[command(flatten)]
        input: PostInput,
    },

    /// Delete a post
    #[command(alias = "rm")]
    Delete {
        id: String,

        /// Delete without asking
        #[arg(short, long)]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("blogdesk").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn naked_invocation_has_no_command() {
        let cli = parse(&[]);
        assert!(cli.command.is_none());
        assert_eq!(cli.origin, LOCAL_ORIGIN);
    }

    #[test]
    fn globals_after_subcommand() {
        let cli = parse(&["list", "--root", "/site", "-v", "--category", "etc"]);
        assert_eq!(cli.root, Some(PathBuf::from("/site")));
        assert!(cli.verbose);
        assert_eq!(
            cli.command,
            Some(Commands::List {
                category: Some("etc".into())
            })
        );
    }

    #[test]
    fn category_name_words_are_collected() {
        let cli = parse(&["category", "add", "Game", "Dev"]);
        assert_eq!(
            cli.command,
            Some(Commands::Category(CategoryCommands::Add {
                name: vec!["Game".into(), "Dev".into()]
            }))
        );
    }

    #[test]
    fn post_edit_takes_flattened_input() {
        let cli = parse(&["post", "edit", "post_a", "--title", "New", "--no-editor"]);
        let Some(Commands::Post(PostCommands::Edit { id, input })) = cli.command else {
            panic!("expected post edit");
        };
        assert_eq!(id, "post_a");
        assert_eq!(input.title.as_deref(), Some("New"));
        assert!(input.no_editor);
    }

    #[test]
    fn post_delete_asks_unless_yes() {
        assert_eq!(
            parse(&["post", "rm", "post_a"]).command,
            Some(Commands::Post(PostCommands::Delete {
                id: "post_a".into(),
                yes: false
            }))
        );
        assert_eq!(
            parse(&["post", "delete", "post_a", "-y"]).command,
            Some(Commands::Post(PostCommands::Delete {
                id: "post_a".into(),
                yes: true
            }))
        );
    }

    #[test]
    fn content_and_content_file_conflict() {
        let result = Cli::try_parse_from([
            "blogdesk",
            "post",
            "add",
            "--content",
            "<p>x</p>",
            "--content-file",
            "x.html",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn open_defaults_to_empty_fragment() {
        let cli = parse(&["open"]);
        assert_eq!(
            cli.command,
            Some(Commands::Open {
                fragment: String::new()
            })
        );
    }
}
