//! The interactive session: one store, one capability cache and one current
//! page across many commands. Lines are parsed with the same clap definition
//! as the command line.

use super::commands::{dispatch, AppContext};
use super::prompt::ask;
use super::setup::Cli;
use blogdesk::error::Result;
use clap::Parser;
use colored::Colorize;

pub(super) fn run(ctx: &mut AppContext) -> Result<()> {
    ctx.in_shell = true;
    println!("{}", "Type a command (`help` for the list), `exit` to leave.".dimmed());

    loop {
        let fragment = ctx.api.selection().route().fragment();
        let Some(line) = ask(&format!("blogdesk {}> ", fragment))? else {
            println!();
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }

        let args = match split_args(line) {
            Ok(args) => args,
            Err(e) => {
                eprintln!("{}", e.red());
                continue;
            }
        };
        let cli = match Cli::try_parse_from(std::iter::once("blogdesk".to_string()).chain(args)) {
            Ok(cli) => cli,
            Err(e) => {
                // Help and version land here too.
                let _ = e.print();
                continue;
            }
        };
        if cli.root.is_some() || cli.page.is_some() {
            log::warn!("--root and --page only apply when starting a session");
        }

        if let Err(e) = dispatch(ctx, cli.command) {
            eprintln!("{}", format!("Error: {}", e).red());
        }
    }

    ctx.in_shell = false;
    Ok(())
}

/// Splits a line into words. Single and double quotes group words; a
/// backslash escapes the next character outside single quotes.
fn split_args(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('\''), c) => current.push(c),
            (_, '\\') => {
                let escaped = chars
                    .next()
                    .ok_or_else(|| "Trailing backslash".to_string())?;
                current.push(escaped);
                in_word = true;
            }
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    args.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(format!("Unclosed {} quote", q));
    }
    if in_word {
        args.push(current);
    }
    Ok(args)
}
