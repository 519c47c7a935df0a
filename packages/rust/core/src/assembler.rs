//! Output assembler.
//!
//! Renders the aggregate README and writes it plus the per-chapter book
//! pages to disk. Every write replaces the whole file.

use std::path::{Path, PathBuf};

use tracing::debug;

use primerbook_shared::{Chapter, PrimerBookError, Result};

/// Append one chapter's README section: disclaimer, source marker, raw
/// content, blank line.
pub fn push_readme_section(readme: &mut String, chapter: &Chapter, disclaimer: &str) {
    readme.push_str(disclaimer);
    readme.push_str(&format!("<!-- {} -->\n", chapter.file_name));
    readme.push_str(&chapter.content);
    readme.push_str("\n\n");
}

/// Render the full README for `chapters`, in the given order.
pub fn render_readme(chapters: &[Chapter], disclaimer: &str) -> String {
    let mut readme = String::new();
    for chapter in chapters {
        push_readme_section(&mut readme, chapter, disclaimer);
    }
    readme
}

/// Write the aggregate README, replacing any previous one.
pub fn write_readme(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PrimerBookError::io(parent, e))?;
    }

    write_atomic(path, content)?;
    debug!(path = %path.display(), size = content.len(), "wrote README");
    Ok(())
}

/// Write one converted page into `book_dir`, creating the directory if needed.
/// Returns the page path.
pub fn write_book_page(book_dir: &Path, file_name: &str, content: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(book_dir).map_err(|e| PrimerBookError::io(book_dir, e))?;

    let path = book_dir.join(file_name);
    write_atomic(&path, content)?;
    debug!(path = %path.display(), size = content.len(), "wrote book page");
    Ok(path)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Write to a hidden sibling temp file, then rename over `path`.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| PrimerBookError::validation(format!("{} has no file name", path.display())))?;
    let temp = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    if let Err(e) = std::fs::write(&temp, content) {
        let _ = std::fs::remove_file(&temp);
        return Err(PrimerBookError::io(&temp, e));
    }
    std::fs::rename(&temp, path).map_err(|e| {
        let _ = std::fs::remove_file(&temp);
        PrimerBookError::io(path, e)
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "primerbook-assembler-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn readme_sections_in_order() {
        let chapters = vec![
            Chapter::new("1_a.md", "# A"),
            Chapter::new("2_b.md", "# B\n"),
        ];

        let readme = render_readme(&chapters, "<!-- gen -->\n");
        assert_eq!(
            readme,
            "<!-- gen -->\n<!-- 1_a.md -->\n# A\n\n<!-- gen -->\n<!-- 2_b.md -->\n# B\n\n\n"
        );
    }

    #[test]
    fn readme_of_nothing_is_empty() {
        assert_eq!(render_readme(&[], "<!-- gen -->\n"), "");
    }

    #[test]
    fn readme_keeps_raw_syntax() {
        let chapters = vec![Chapter::new("1_a.md", "$x$ (#2-b) :warning:")];
        let readme = render_readme(&chapters, "");
        assert!(readme.contains("$x$ (#2-b) :warning:"));
    }

    #[test]
    fn write_book_page_creates_dir_and_overwrites() {
        let tmp = temp_dir();
        let book_dir = tmp.join(".mdbook");

        let path = write_book_page(&book_dir, "1_a.md", "first").unwrap();
        assert_eq!(path, book_dir.join("1_a.md"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first");

        write_book_page(&book_dir, "1_a.md", "second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn writes_leave_no_temp_files() {
        let tmp = temp_dir();
        let book_dir = tmp.join(".mdbook");

        write_readme(&tmp.join("README.md"), "readme").unwrap();
        write_book_page(&book_dir, "1_a.md", "page").unwrap();

        for dir in [&tmp, &book_dir] {
            for entry in std::fs::read_dir(dir).unwrap() {
                let name = entry.unwrap().file_name().to_string_lossy().to_string();
                assert!(!name.ends_with(".tmp"), "temp file left behind: {name}");
            }
        }

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn failed_write_removes_temp_file() {
        let tmp = temp_dir();
        let book_dir = tmp.join(".mdbook");
        std::fs::create_dir_all(&book_dir).unwrap();
        // Writes through this link hit ENOSPC after a successful open.
        let temp = book_dir.join(".1_a.md.tmp");
        std::os::unix::fs::symlink("/dev/full", &temp).unwrap();

        let err = write_book_page(&book_dir, "1_a.md", "page").unwrap_err();
        assert!(matches!(err, PrimerBookError::Io { .. }));
        assert!(std::fs::symlink_metadata(&temp).is_err(), "temp file left behind");
        assert!(!book_dir.join("1_a.md").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn book_dir_blocked_by_file_is_io_error() {
        let tmp = temp_dir();
        let blocker = tmp.join(".mdbook");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = write_book_page(&blocker, "1_a.md", "page").unwrap_err();
        assert!(matches!(err, PrimerBookError::Io { .. }));

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
