use crate::error::{BlogError, Result};
use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;

/// A post as laid out in the editor buffer.
/// Format: title\n\ncontent_html
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorContent {
    pub title: String,
    pub content_html: String,
}

impl EditorContent {
    pub fn new(title: impl Into<String>, content_html: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content_html: content_html.into(),
        }
    }

    pub fn to_buffer(&self) -> String {
        if self.content_html.is_empty() {
            format!("{}\n\n", self.title)
        } else {
            format!("{}\n\n{}", self.title, self.content_html)
        }
    }

    /// First non-blank line is the title, everything after it is the body.
    pub fn from_buffer(buffer: &str) -> Self {
        let buffer = buffer.trim_start();
        let (title, body) = match buffer.split_once('\n') {
            Some((title, body)) => (title, body),
            None => (buffer, ""),
        };
        Self {
            title: title.trim().to_string(),
            content_html: body.trim().to_string(),
        }
    }
}

/// Gets the editor command from environment.
/// Checks $EDITOR, then $VISUAL, then falls back to common editors.
pub fn get_editor() -> Result<String> {
    for var in ["EDITOR", "VISUAL"] {
        if let Ok(editor) = env::var(var) {
            if !editor.trim().is_empty() {
                return Ok(editor);
            }
        }
    }

    for fallback in &["vim", "vi", "nano"] {
        if Command::new("which")
            .arg(fallback)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
        {
            return Ok((*fallback).to_string());
        }
    }

    Err(BlogError::Api(
        "No editor found. Set $EDITOR environment variable.".to_string(),
    ))
}

/// Opens a file in the user's editor and waits for it to close.
/// Returns the contents of the file after editing.
pub fn open_in_editor<P: AsRef<Path>>(file_path: P) -> Result<String> {
    let editor = get_editor()?;
    let path = file_path.as_ref();

    // $EDITOR may carry arguments, e.g. "code --wait".
    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or("vi");

    let status = Command::new(program)
        .args(parts)
        .arg(path)
        .status()
        .map_err(|e| BlogError::Api(format!("Failed to launch editor '{}': {}", editor, e)))?;

    if !status.success() {
        return Err(BlogError::Api(format!(
            "Editor '{}' exited with non-zero status",
            editor
        )));
    }

    fs::read_to_string(path).map_err(BlogError::Io)
}

/// Opens an editor on a temporary `.html` buffer and returns what was saved.
pub fn edit_content(initial: &EditorContent) -> Result<EditorContent> {
    let temp_file = env::temp_dir().join(format!("blogdesk_edit_{}.html", std::process::id()));

    fs::write(&temp_file, initial.to_buffer()).map_err(BlogError::Io)?;
    let result = open_in_editor(&temp_file);
    let _ = fs::remove_file(&temp_file);

    Ok(EditorContent::from_buffer(&result?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_buffer_with_content() {
        let ec = EditorContent::new("My Title", "<p>Some content.</p>");
        assert_eq!(ec.to_buffer(), "My Title\n\n<p>Some content.</p>");
    }

    #[test]
    fn test_to_buffer_empty_content() {
        let ec = EditorContent::new("My Title", "");
        assert_eq!(ec.to_buffer(), "My Title\n\n");
    }

    #[test]
    fn test_from_buffer_normal() {
        let ec = EditorContent::from_buffer("My Title\n\n<p>One</p>\n<p>Two</p>\n");
        assert_eq!(ec.title, "My Title");
        assert_eq!(ec.content_html, "<p>One</p>\n<p>Two</p>");
    }

    #[test]
    fn test_from_buffer_title_only() {
        let ec = EditorContent::from_buffer("My Title");
        assert_eq!(ec.title, "My Title");
        assert_eq!(ec.content_html, "");
    }

    #[test]
    fn test_from_buffer_empty() {
        let ec = EditorContent::from_buffer("");
        assert_eq!(ec, EditorContent::new("", ""));
    }

    #[test]
    fn test_from_buffer_skips_leading_blank_lines() {
        let ec = EditorContent::from_buffer("\n\n  Title  \n<p>x</p>");
        assert_eq!(ec.title, "Title");
        assert_eq!(ec.content_html, "<p>x</p>");
    }

    #[test]
    fn test_roundtrip() {
        let original = EditorContent::new("Test Title", "<p>Test</p>\n<p>lines</p>");
        assert_eq!(EditorContent::from_buffer(&original.to_buffer()), original);
    }
}
