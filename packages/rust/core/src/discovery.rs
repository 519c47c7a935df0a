//! Chapter discovery: which files in the project root make up the book.
//!
//! A chapter is any entry whose name starts with an ASCII digit and ends in
//! `.md`. The numeric prefix (`01_`, `02_`, ...) makes plain lexicographic
//! order the reading order.

use std::path::Path;

use tracing::debug;

use primerbook_shared::{Chapter, PrimerBookError, Result};

pub use primerbook_shared::is_chapter_file;

/// List chapter file names in `root`, sorted ascending.
///
/// Only names are inspected; an entry that matches but is not a readable
/// file fails later, when it is read.
pub fn discover_chapters(root: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(root).map_err(|e| PrimerBookError::io(root, e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PrimerBookError::io(root, e))?;
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                debug!(name = ?raw, "skipping non-UTF-8 entry");
                continue;
            }
        };

        if is_chapter_file(&name) {
            names.push(name);
        }
    }

    names.sort();
    debug!(count = names.len(), root = %root.display(), "discovered chapters");
    Ok(names)
}

/// Read one chapter's full text.
///
/// `\r\n` and lone `\r` become `\n`, so CRLF-authored chapters render the
/// same as LF ones.
pub fn read_chapter(root: &Path, file_name: &str) -> Result<Chapter> {
    let path = root.join(file_name);
    let content = std::fs::read_to_string(&path).map_err(|e| PrimerBookError::io(&path, e))?;
    Ok(Chapter::new(file_name, normalize_newlines(content)))
}

fn normalize_newlines(text: String) -> String {
    if !text.contains('\r') {
        return text;
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "primerbook-discovery-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn chapter_file_names() {
        assert!(is_chapter_file("01_installation.md"));
        assert!(is_chapter_file("9.md"));
        assert!(!is_chapter_file("x.md"));
        assert!(!is_chapter_file("README.md"));
        assert!(!is_chapter_file("01_installation.txt"));
        assert!(!is_chapter_file("01_installation.md.bak"));
        assert!(!is_chapter_file(""));
        assert!(!is_chapter_file("\u{0661}_arabic_indic.md"));
    }

    #[test]
    fn discover_filters_and_sorts() {
        let tmp = temp_dir();
        for name in ["3_c.md", "1_a.md", "x.md", "2_b.md", "README.md", "4_d.txt"] {
            std::fs::write(tmp.join(name), name).unwrap();
        }

        let names = discover_chapters(&tmp).unwrap();
        assert_eq!(names, vec!["1_a.md", "2_b.md", "3_c.md"]);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn discover_sorts_lexicographically_not_numerically() {
        let tmp = temp_dir();
        for name in ["10_ten.md", "2_two.md", "01_one.md"] {
            std::fs::write(tmp.join(name), "").unwrap();
        }

        let names = discover_chapters(&tmp).unwrap();
        assert_eq!(names, vec!["01_one.md", "10_ten.md", "2_two.md"]);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn discover_missing_root_is_io_error() {
        let tmp = temp_dir().join("does-not-exist");
        let err = discover_chapters(&tmp).unwrap_err();
        assert!(matches!(err, PrimerBookError::Io { .. }));
    }

    #[test]
    fn read_chapter_returns_raw_content() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("1_a.md"), "# A\n\n$x$\n").unwrap();

        let chapter = read_chapter(&tmp, "1_a.md").unwrap();
        assert_eq!(chapter, Chapter::new("1_a.md", "# A\n\n$x$\n"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn read_chapter_normalizes_line_endings() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("1_a.md"), "# A\r\n\r\nold mac\rline\n").unwrap();

        let chapter = read_chapter(&tmp, "1_a.md").unwrap();
        assert_eq!(chapter.content, "# A\n\nold mac\nline\n");

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
