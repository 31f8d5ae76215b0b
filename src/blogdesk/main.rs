//! # Blogdesk CLI
//!
//! The binary is intentionally thin: the CLI lives in `cli/`, while this file
//! only invokes `cli::run()` and handles process termination.
//!
//! ```text
//! main.rs ──► cli::run()
//!               ├─ setup.rs     clap argument parsing
//!               ├─ commands.rs  context wiring + per-command handlers
//!               ├─ prompt.rs    stdin picker and confirmations
//!               ├─ shell.rs     interactive session
//!               └─ render.rs    colored terminal output
//! ```

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
