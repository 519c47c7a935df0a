//! Core domain types shared by the transformer and the build driver.

/// One numbered source file of the book, with its raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// File name relative to the project root (e.g. `01_installation.md`).
    pub file_name: String,
    /// Full file content, line endings normalized to `\n`.
    pub content: String,
}

impl Chapter {
    pub fn new(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

/// Whether `name` is a chapter file name: an ASCII digit first, `.md` last.
pub fn is_chapter_file(name: &str) -> bool {
    name.ends_with(".md") && name.as_bytes().first().is_some_and(u8::is_ascii_digit)
}
