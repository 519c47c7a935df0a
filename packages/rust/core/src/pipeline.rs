//! End-to-end build: discover chapters → README + one mdBook page each.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, info, instrument};

use primerbook_markdown::{ConvertOptions, transform_with};
use primerbook_shared::{BuildConfig, PrimerBookError, Result};

use crate::assembler;
use crate::discovery;

/// Per-chapter outcome of a build.
#[derive(Debug, Clone)]
pub struct ChapterReport {
    /// Source file name.
    pub file_name: String,
    /// Path of the written book page.
    pub book_path: PathBuf,
    /// Size of the source file in bytes.
    pub source_bytes: usize,
    /// Size of the converted page in bytes.
    pub book_bytes: usize,
}

/// Result of a build.
#[derive(Debug)]
pub struct BuildReport {
    /// Path of the aggregate README.
    pub readme_path: PathBuf,
    /// Directory holding the book pages.
    pub book_dir: PathBuf,
    /// Chapters in processing order.
    pub chapters: Vec<ChapterReport>,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting build status.
pub trait ProgressReporter {
    /// Called after a chapter's book page has been written.
    fn chapter_written(&self, file_name: &str, current: usize, total: usize);
    /// Called when the build completes.
    fn done(&self, report: &BuildReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn chapter_written(&self, _file_name: &str, _current: usize, _total: usize) {}
    fn done(&self, _report: &BuildReport) {}
}

/// Run the full build.
///
/// 1. Discover numbered chapters in the project root
/// 2. For each chapter, in order: read it, append it to the README, write its
///    converted page into the book directory
/// 3. Write the README
///
/// Any I/O error aborts the run. Outputs are replaced wholesale, so running
/// again after a failure or on unchanged sources is safe.
#[instrument(skip_all, fields(root = %config.root.display()))]
pub fn build(config: &BuildConfig, progress: &dyn ProgressReporter) -> Result<BuildReport> {
    let start = Instant::now();
    let opts = ConvertOptions::from(&config.book);

    let names = discovery::discover_chapters(&config.root)?;
    info!(chapters = names.len(), "building book");

    let mut readme = String::new();
    let mut chapters = Vec::with_capacity(names.len());

    for (i, name) in names.iter().enumerate() {
        let chapter = discovery::read_chapter(&config.root, name)?;
        assembler::push_readme_section(&mut readme, &chapter, &config.book.disclaimer);

        let page = transform_with(&chapter.content, &config.book.footer, &opts);
        let book_path = assembler::write_book_page(&config.book_dir, name, &page)?;

        chapters.push(ChapterReport {
            file_name: chapter.file_name,
            book_path,
            source_bytes: chapter.content.len(),
            book_bytes: page.len(),
        });
        progress.chapter_written(name, i + 1, names.len());
    }

    assembler::write_readme(&config.readme_path, &readme)?;

    let report = BuildReport {
        readme_path: config.readme_path.clone(),
        book_dir: config.book_dir.clone(),
        chapters,
        elapsed: start.elapsed(),
    };

    info!(
        chapters = report.chapters.len(),
        readme = %report.readme_path.display(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "build complete"
    );
    progress.done(&report);

    Ok(report)
}

// ---------------------------------------------------------------------------
// Up-to-date check
// ---------------------------------------------------------------------------

/// Why an output does not match what a build would write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    /// The output file does not exist.
    Missing,
    /// The output file exists with different content.
    Outdated,
}

impl std::fmt::Display for StaleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => f.pad("missing"),
            Self::Outdated => f.pad("outdated"),
        }
    }
}

/// An output that `build` would create or change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleOutput {
    pub path: PathBuf,
    pub reason: StaleReason,
}

/// Render every output in memory and compare it with what is on disk.
///
/// Writes nothing. Returns the stale outputs, book pages first in chapter
/// order, then the README; empty means the last build is current.
#[instrument(skip_all, fields(root = %config.root.display()))]
pub fn check(config: &BuildConfig) -> Result<Vec<StaleOutput>> {
    let opts = ConvertOptions::from(&config.book);
    let names = discovery::discover_chapters(&config.root)?;

    let mut chapters = Vec::with_capacity(names.len());
    let mut stale = Vec::new();

    for name in &names {
        let chapter = discovery::read_chapter(&config.root, name)?;

        let page = transform_with(&chapter.content, &config.book.footer, &opts);
        let path = config.book_dir.join(name);
        if let Some(reason) = compare(&path, &page)? {
            stale.push(StaleOutput { path, reason });
        }
        chapters.push(chapter);
    }

    let readme = assembler::render_readme(&chapters, &config.book.disclaimer);
    if let Some(reason) = compare(&config.readme_path, &readme)? {
        stale.push(StaleOutput {
            path: config.readme_path.clone(),
            reason,
        });
    }

    info!(checked = names.len() + 1, stale = stale.len(), "check complete");
    Ok(stale)
}

fn compare(path: &std::path::Path, expected: &str) -> Result<Option<StaleReason>> {
    match std::fs::read(path) {
        Ok(actual) if actual == expected.as_bytes() => Ok(None),
        Ok(_) => {
            debug!(path = %path.display(), "output differs");
            Ok(Some(StaleReason::Outdated))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "output missing");
            Ok(Some(StaleReason::Missing))
        }
        Err(e) => Err(PrimerBookError::io(path, e)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
