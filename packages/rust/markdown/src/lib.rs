//! Chapter-to-mdBook conversion.
//!
//! The README renders on GitHub, the book renders with mdBook and MathJax.
//! [`transform`] bridges the two dialects with a fixed sequence of regex
//! rewrites, framed by a generated-file marker and a footer.

mod rules;

use tracing::{instrument, trace};

use primerbook_shared::BookConfig;
use primerbook_shared::config::{DEFAULT_BLOB_PREFIX, DEFAULT_DISCLAIMER, DEFAULT_RAW_PREFIX};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Options for the chapter conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Line prepended before any rewriting happens.
    pub disclaimer: String,
    /// Image link prefix to replace.
    pub blob_prefix: String,
    /// Replacement for `blob_prefix`.
    pub raw_prefix: String,
    /// Extensions (without dot) whose link targets are rewritten, in order.
    pub image_extensions: Vec<String>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            disclaimer: DEFAULT_DISCLAIMER.to_string(),
            blob_prefix: DEFAULT_BLOB_PREFIX.to_string(),
            raw_prefix: DEFAULT_RAW_PREFIX.to_string(),
            image_extensions: vec!["png".into(), "gif".into(), "jpg".into()],
        }
    }
}

impl From<&BookConfig> for ConvertOptions {
    fn from(config: &BookConfig) -> Self {
        Self {
            disclaimer: config.disclaimer.clone(),
            blob_prefix: config.blob_prefix.clone(),
            raw_prefix: config.raw_prefix.clone(),
            image_extensions: config.image_extensions.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Converter
// ---------------------------------------------------------------------------

/// Convert a chapter into an mdBook page using the default options.
pub fn transform(content: &str, footer: &str) -> String {
    transform_with(content, footer, &ConvertOptions::default())
}

/// Convert a chapter into an mdBook page.
///
/// Steps, in order:
/// 1. Prepend the disclaimer
/// 2. `$...$` to `\\( ... \\)`
/// 3. ```` ```math ... ``` ```` to `\\[ ... \\]`
/// 4. `:warning:` to the warning glyph
/// 5. `(#some-anchor)` to `(./some_anchor.md)`
/// 6. Blob-prefixed image links to the raw prefix, one pass per extension
/// 7. Append the footer
///
/// The disclaimer goes through the rewrites, the footer does not. Never
/// fails; input without any special syntax only gains disclaimer and footer.
#[instrument(level = "trace", skip_all, fields(len = content.len()))]
pub fn transform_with(content: &str, footer: &str, opts: &ConvertOptions) -> String {
    let framed = format!("{}{content}", opts.disclaimer);
    let mut page = rules::run_pipeline(&framed, opts);
    page.push_str(footer);

    trace!(final_len = page.len(), "conversion complete");
    page
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use primerbook_shared::config::DEFAULT_FOOTER;

    use super::*;

    #[test]
    fn plain_text_gains_disclaimer_and_footer_only() {
        let content = "# Plain\n\nNothing special in here.\n";
        let result = transform(content, DEFAULT_FOOTER);
        assert_eq!(result, format!("{DEFAULT_DISCLAIMER}{content}{DEFAULT_FOOTER}"));
    }

    #[test]
    fn empty_chapter() {
        assert_eq!(transform("", "END"), format!("{DEFAULT_DISCLAIMER}END"));
    }

    #[test]
    fn applying_twice_duplicates_frame() {
        let once = transform("body", "FOOTER");
        let twice = transform(&once, "FOOTER");

        assert_eq!(twice.matches(DEFAULT_DISCLAIMER).count(), 2);
        assert_eq!(twice.matches("FOOTER").count(), 2);
        assert_eq!(twice, format!("{DEFAULT_DISCLAIMER}{DEFAULT_DISCLAIMER}bodyFOOTERFOOTER"));
    }

    #[test]
    fn inline_math() {
        let result = transform("Cost is $x+y$ units", "");
        assert!(result.contains(r"Cost is \\( x+y \\) units"));
    }

    #[test]
    fn two_inline_spans_stay_separate() {
        let result = transform("$a$ and $b$", "");
        assert!(result.contains(r"\\( a \\)"));
        assert!(result.contains(r"\\( b \\)"));
        assert!(result.contains(r"\\) and \\("));
    }

    #[test]
    fn display_math_block() {
        let result = transform("```math\nx=1\n```", "");
        assert!(result.contains("\\\\[ \nx=1\n \\\\]"));
    }

    #[test]
    fn anchor_link() {
        let result = transform("See (#01-installation) for setup", "");
        assert!(result.contains("(./01_installation.md)"));
    }

    #[test]
    fn image_link_blob_to_raw() {
        let result = transform(
            "![fig](https://github.com/d-krupke/cpsat-primer/blob/main/img/a.png)",
            "",
        );
        assert!(result.contains(
            "![fig](https://raw.githubusercontent.com/d-krupke/cpsat-primer/main/img/a.png)"
        ));
    }

    #[test]
    fn image_link_foreign_host_untouched() {
        let link = "![fig](https://example.org/img/a.png)";
        let result = transform(link, "");
        assert!(result.contains(link));
    }

    #[test]
    fn jpg_and_gif_links_rewritten() {
        let content = "![a](https://github.com/d-krupke/cpsat-primer/blob/main/a.jpg)\n\
                       ![b](https://github.com/d-krupke/cpsat-primer/blob/main/b.gif)";
        let result = transform(content, "");
        assert!(!result.contains("/blob/main/"));
        assert_eq!(result.matches("raw.githubusercontent.com").count(), 2);
    }

    #[test]
    fn footer_is_not_rewritten() {
        let footer = "\n$x$ :warning: (#not-an-anchor)";
        let result = transform("body", footer);
        assert!(result.ends_with(footer));
    }

    #[test]
    fn custom_options_from_config() {
        let config = BookConfig {
            disclaimer: "<!-- generated -->\n".into(),
            footer: String::new(),
            blob_prefix: "https://github.com/acme/book/blob/main/".into(),
            raw_prefix: "https://raw.githubusercontent.com/acme/book/main/".into(),
            image_extensions: vec!["svg".into()],
        };
        let opts = ConvertOptions::from(&config);

        let result = transform_with(
            "![d](https://github.com/acme/book/blob/main/d.svg) \
             ![p](https://github.com/acme/book/blob/main/p.png)",
            "",
            &opts,
        );

        assert!(result.starts_with("<!-- generated -->\n"));
        assert!(result.contains("(https://raw.githubusercontent.com/acme/book/main/d.svg)"));
        assert!(result.contains("(https://github.com/acme/book/blob/main/p.png)"));
    }

    #[test]
    fn default_options_match_default_config() {
        assert_eq!(
            ConvertOptions::from(&BookConfig::default()),
            ConvertOptions::default()
        );
    }
}
