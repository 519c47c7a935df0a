//! Rewrite passes turning GitHub-flavored chapters into mdBook pages.
//!
//! Each pass is a function `&str -> String` applied in sequence. Order
//! matters: later passes see the output of earlier ones.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::ConvertOptions;

/// Run every rewrite pass on a chapter, without disclaimer or footer.
pub(crate) fn run_pipeline(md: &str, opts: &ConvertOptions) -> String {
    let mut result = inline_math(md);

    result = display_math(&result);
    result = warning_emoji(&result);
    result = anchor_links(&result);
    for ext in &opts.image_extensions {
        result = raw_image_links(&result, ext, &opts.blob_prefix, &opts.raw_prefix);
    }

    result
}

// ---------------------------------------------------------------------------
// Pass 1: Inline math
// ---------------------------------------------------------------------------

/// `$...$` becomes `\\( ... \\)`, the escaped MathJax inline delimiters.
///
/// Shortest match on a single line, so `$a$ and $b$` yields two spans.
fn inline_math(md: &str) -> String {
    static INLINE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\$(.*?)\$").expect("valid regex"));

    INLINE_RE.replace_all(md, r"\\( ${1} \\)").into_owned()
}

// ---------------------------------------------------------------------------
// Pass 2: Display math
// ---------------------------------------------------------------------------

/// ```` ```math ... ``` ```` fences become `\\[ ... \\]`, spanning lines.
fn display_math(md: &str) -> String {
    static FENCE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)```math(.*?)```").expect("valid regex"));

    FENCE_RE.replace_all(md, r"\\[ ${1} \\]").into_owned()
}

// ---------------------------------------------------------------------------
// Pass 3: Warning shortcode
// ---------------------------------------------------------------------------

/// mdBook has no emoji shortcodes; substitute the glyph.
fn warning_emoji(md: &str) -> String {
    md.replace(":warning:", "\u{26a0}\u{fe0f}")
}

// ---------------------------------------------------------------------------
// Pass 4: Anchor links
// ---------------------------------------------------------------------------

/// `(#01-installation)` becomes `(./01_installation.md)`.
///
/// In the single-page README every chapter is an anchor; in the book each
/// chapter is its own file named like the anchor with `_` for `-`.
fn anchor_links(md: &str) -> String {
    static ANCHOR_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\(#(.*?)\)").expect("valid regex"));

    ANCHOR_RE
        .replace_all(md, |caps: &Captures| {
            format!("(./{}.md)", caps[1].replace('-', "_"))
        })
        .into_owned()
}

// ---------------------------------------------------------------------------
// Pass 5: Image links
// ---------------------------------------------------------------------------

/// Point `(<blob_prefix>....<ext>)` link targets at the raw file host.
///
/// Only the prefix inside a matched `(....ext)` span is touched; links to
/// other hosts pass through unchanged.
fn raw_image_links(md: &str, ext: &str, blob_prefix: &str, raw_prefix: &str) -> String {
    let pattern = format!(r"\((.*?\.{})\)", regex::escape(ext));
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            // Only reachable through the regex size limit.
            tracing::warn!(ext, error = %e, "skipping image link rewrite");
            return md.to_string();
        }
    };

    re.replace_all(md, |caps: &Captures| caps[0].replace(blob_prefix, raw_prefix))
        .into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
