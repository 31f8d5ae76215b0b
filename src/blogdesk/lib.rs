//! # Blogdesk Architecture
//!
//! Blogdesk edits a static blog whose whole content lives in one JSON file
//! (categories and posts), and keeps a generated per-post HTML mirror and a
//! sitemap in step with it. It is a library with a CLI client, not a CLI with
//! some library code.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, prompts, formats output                │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Owns the session: store, view selection, capabilities    │
//! │  - Gates edits by mode, applies command effects             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs) + Router (router.rs)         │
//! │  - Pure mutations of the ContentStore returning effects     │
//! │  - Fragment → ViewSelection                                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Persistence (persist/) over Storage (store/)               │
//! │  - JSON content file, static pages, sitemap, images         │
//! │  - FsBackend (production), MemBackend (testing)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes Rust values and returns
//! `Result<CmdResult>`. It never writes to stdout/stderr, never exits the
//! process and never asks the user anything directly: locations come through
//! the [`capability::Picker`] trait, which the CLI implements with a prompt.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Category and post mutations, listing
//! - [`router`]: URL fragments to view selections, document titles
//! - [`view`]: Sidebar, list and detail view models
//! - [`persist`]: Content file, static mirror, sitemap, image insertion
//! - [`store`]: Storage abstraction and implementations
//! - [`capability`]: Session cache of user-granted locations
//! - [`model`]: Core data types (`Category`, `Post`, `ContentStore`)
//! - [`config`]: Configuration management
//! - [`editor`]: External editor integration
//! - [`error`]: Error types
//! - `cli`: Argument parsing, prompts and printing for the binary (not part of the lib API)

pub mod api;
pub mod capability;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod model;
pub mod persist;
pub mod router;
pub mod store;
pub mod view;
