use blogdesk::capability::{Picker, Purpose};
use blogdesk::error::{BlogError, Result};
use colored::Colorize;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

/// Asks for locations on the terminal. When stdin is not a terminal every
/// prompt counts as dismissed, so scripted runs never block.
#[derive(Debug, Clone, Copy)]
pub struct PromptPicker {
    interactive: bool,
}

impl PromptPicker {
    pub fn from_env() -> Self {
        Self {
            interactive: io::stdin().is_terminal(),
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }
}

impl Picker for PromptPicker {
    fn pick(&mut self, purpose: Purpose) -> Result<Option<PathBuf>> {
        if !self.interactive {
            return Ok(None);
        }
        let kind = if purpose.is_directory() { "directory" } else { "file" };
        let answer = ask(&format!(
            "Path to the {} ({}, empty to cancel): ",
            purpose, kind
        ))?;
        Ok(answer.filter(|a| !a.is_empty()).map(PathBuf::from))
    }
}

/// Prints `question` and reads one line. `None` on end of input.
pub fn ask(question: &str) -> Result<Option<String>> {
    print!("{}", question.cyan());
    io::stdout().flush().map_err(BlogError::Io)?;
    read_answer(&mut io::stdin().lock()).map_err(BlogError::Io)
}

/// Yes/no question; anything but an explicit yes is a no.
pub fn confirm(question: &str, interactive: bool) -> Result<bool> {
    if !interactive {
        return Ok(false);
    }
    let answer = ask(&format!("{} [y/N] ", question))?;
    Ok(is_yes(answer.as_deref().unwrap_or("")))
}

fn read_answer<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_trimmed_line() {
        let mut input = Cursor::new("  posts.json \nrest");
        assert_eq!(read_answer(&mut input).unwrap().as_deref(), Some("posts.json"));
    }

    #[test]
    fn end_of_input_is_none() {
        let mut input = Cursor::new("");
        assert_eq!(read_answer(&mut input).unwrap(), None);
    }

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
        assert!(!is_yes("yep"));
    }

    #[test]
    fn non_interactive_picker_dismisses() {
        let mut picker = PromptPicker { interactive: false };
        assert_eq!(picker.pick(Purpose::PostsDir).unwrap(), None);
        assert!(!confirm("Delete?", false).unwrap());
    }
}
