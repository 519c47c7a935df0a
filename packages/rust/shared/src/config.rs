//! Project configuration for primerbook.
//!
//! The optional config file lives at `<project root>/primerbook.toml`.
//! Every key has a default; a missing file means the stock CP-SAT Primer build.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PrimerBookError, Result};
use crate::types::is_chapter_file;

/// Default configuration file name, looked up in the project root.
const CONFIG_FILE_NAME: &str = "primerbook.toml";

/// Comment line prepended to every generated file.
pub const DEFAULT_DISCLAIMER: &str =
    "<!-- This file was generated by `primerbook`. Do not edit it manually. -->\n";

/// Attribution and license block appended to every book page.
pub const DEFAULT_FOOTER: &str = concat!(
    "\n---\n",
    "*The CP-SAT Primer is authored by [Dr. Dominik Krupke](https://github.com/d-krupke) ",
    "at [TU Braunschweig, Algorithms Group](https://www.ibr.cs.tu-bs.de/alg/index.html). ",
    "It is licensed under the [CC-BY-4.0 license](https://creativecommons.org/licenses/by/4.0/).*\n",
    "\n",
    "*The primer is written for educational purposes and does not claim to be complete or correct. ",
    "If you find this primer helpful, please star the [GitHub repository](https://github.com/d-krupke/cpsat-primer/). ",
    "As an academic, I also enjoy hearing about how you use CP-SAT to solve real-world problems.*\n",
    "    ",
);

/// URL prefix of the repository's "blob" (HTML) file view.
pub const DEFAULT_BLOB_PREFIX: &str = "https://github.com/d-krupke/cpsat-primer/blob/main/";

/// URL prefix serving the same files as raw content.
pub const DEFAULT_RAW_PREFIX: &str = "https://raw.githubusercontent.com/d-krupke/cpsat-primer/main/";

// ---------------------------------------------------------------------------
// Config structs (matching primerbook.toml schema)
// ---------------------------------------------------------------------------

/// Top-level project config, deserialized from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Output locations.
    #[serde(default)]
    pub output: OutputConfig,

    /// Text inserted into and rewritten in the book pages.
    #[serde(default)]
    pub book: BookConfig,
}

/// `[output]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Aggregate README file, relative to the project root.
    #[serde(default = "default_readme")]
    pub readme: String,

    /// Directory receiving one transformed page per chapter.
    #[serde(default = "default_book_dir")]
    pub book_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            readme: default_readme(),
            book_dir: default_book_dir(),
        }
    }
}

fn default_readme() -> String {
    "README.md".into()
}
fn default_book_dir() -> String {
    ".mdbook".into()
}

/// `[book]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookConfig {
    /// Generated-file marker, written before each chapter.
    #[serde(default = "default_disclaimer")]
    pub disclaimer: String,

    /// Appended to every book page after all rewrites.
    #[serde(default = "default_footer")]
    pub footer: String,

    /// Image links starting with this prefix are rewritten...
    #[serde(default = "default_blob_prefix")]
    pub blob_prefix: String,

    /// ...to start with this one instead.
    #[serde(default = "default_raw_prefix")]
    pub raw_prefix: String,

    /// Link target extensions treated as images, one rewrite pass each.
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            disclaimer: default_disclaimer(),
            footer: default_footer(),
            blob_prefix: default_blob_prefix(),
            raw_prefix: default_raw_prefix(),
            image_extensions: default_image_extensions(),
        }
    }
}

fn default_disclaimer() -> String {
    DEFAULT_DISCLAIMER.into()
}
fn default_footer() -> String {
    DEFAULT_FOOTER.into()
}
fn default_blob_prefix() -> String {
    DEFAULT_BLOB_PREFIX.into()
}
fn default_raw_prefix() -> String {
    DEFAULT_RAW_PREFIX.into()
}
fn default_image_extensions() -> Vec<String> {
    vec!["png".into(), "gif".into(), "jpg".into()]
}

// ---------------------------------------------------------------------------
// Build config (runtime, resolved against the project root)
// ---------------------------------------------------------------------------

/// Runtime build configuration: the project root plus resolved output paths.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory scanned for numbered chapter files.
    pub root: PathBuf,
    /// Absolute or root-relative path of the aggregate README.
    pub readme_path: PathBuf,
    /// Directory receiving the transformed pages.
    pub book_dir: PathBuf,
    /// Transformer settings.
    pub book: BookConfig,
}

impl BuildConfig {
    /// Resolve `config` against `root`, rejecting settings that cannot work.
    pub fn new(root: impl Into<PathBuf>, config: &AppConfig) -> Result<Self> {
        validate(config)?;

        let root = root.into();
        let readme_path = root.join(&config.output.readme);
        let book_dir = root.join(&config.output.book_dir);

        // A chapter-named README would be read back as a chapter next run.
        if readme_path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(is_chapter_file)
        {
            return Err(PrimerBookError::validation(format!(
                "output.readme {:?} would be picked up as a chapter",
                config.output.readme
            )));
        }
        // Pages share their chapter's file name, so the root would be overwritten.
        if same_dir(&root, &book_dir) {
            return Err(PrimerBookError::validation(format!(
                "output.book_dir {:?} resolves to the project root",
                config.output.book_dir
            )));
        }

        Ok(Self {
            readme_path,
            book_dir,
            book: config.book.clone(),
            root,
        })
    }
}

/// Lexical comparison first; canonical paths when both exist, to catch symlinks.
fn same_dir(a: &Path, b: &Path) -> bool {
    if lexical_normalize(a) == lexical_normalize(b) {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Drop `.` components and fold `name/..` pairs without touching the filesystem.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir if out.file_name().is_some() => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn validate(config: &AppConfig) -> Result<()> {
    if config.output.readme.trim().is_empty() {
        return Err(PrimerBookError::validation("output.readme must not be empty"));
    }
    if config.output.book_dir.trim().is_empty() {
        return Err(PrimerBookError::validation("output.book_dir must not be empty"));
    }
    // An empty needle would make the prefix rewrite splice the raw prefix
    // between every character of a matched link.
    if config.book.blob_prefix.is_empty() {
        return Err(PrimerBookError::validation("book.blob_prefix must not be empty"));
    }
    if let Some(ext) = config
        .book
        .image_extensions
        .iter()
        .find(|ext| ext.is_empty() || ext.starts_with('.'))
    {
        return Err(PrimerBookError::validation(format!(
            "book.image_extensions entry {ext:?} must be a bare extension like \"png\""
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Path of the config file for a project root.
pub fn config_file_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Load the project config. Returns defaults if the file does not exist.
pub fn load_config(root: &Path) -> Result<AppConfig> {
    let path = config_file_path(root);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the project config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PrimerBookError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        PrimerBookError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Write a default config file into `root`.
/// Returns the path to the created file. Refuses to overwrite an existing one.
pub fn init_config(root: &Path) -> Result<PathBuf> {
    let path = config_file_path(root);
    if path.exists() {
        return Err(PrimerBookError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PrimerBookError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PrimerBookError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
