//! # CLI Behavior
//!
//! This is **one possible UI client** for blogdesk, not the application
//! itself. The CLI is the only place that knows about terminal I/O, exit
//! codes and output formatting.
//!
//! For the overall architecture, see the crate-level documentation of the
//! `blogdesk` library.
//!
//! ## Sessions
//!
//! Every invocation is a session: the content store is loaded, the command
//! runs, and the session ends. Locations granted through a prompt only last
//! for that session; `blogdesk connect <file>` and `blogdesk config` record
//! them in `blogdesk.json` so later sessions start connected.
//! `blogdesk shell` keeps one session open across many commands.
//!
//! ### Naked Execution (`blogdesk`)
//!
//! Running `blogdesk` with no arguments prints the current page, the same as
//! `blogdesk open`.
//!
//! ### Editing Posts
//!
//! `post add` / `post edit` take `--title`, `--category` and `--content` (or
//! `--content-file`). Whatever is missing is filled in through `$EDITOR`,
//! using a `title\n\nhtml` buffer. New posts start in the category being
//! browsed.
//!
//! ## Module Structure
//!
//! - `commands`: Per-command handlers that call the API and print results
//! - `render`: Output formatting (page, lists, messages)
//! - `setup`: Argument parsing via clap
//! - `prompt`: Location picker and yes/no questions on stdin
//! - `shell`: The interactive session loop

mod commands;
mod prompt;
mod render;
pub mod setup;
mod shell;

pub use commands::run;
