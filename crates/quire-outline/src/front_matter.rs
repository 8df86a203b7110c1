//! YAML front matter at the top of markdown documents.
//!
//! Front matter is a YAML block delimited by `---` lines at the very start
//! of the file:
//!
//! ```text
//! ---
//! title: Guide
//! gather_headings_level: 2
//! ---
//! # Guide
//! ```
//!
//! The opening delimiter may be left out, in which case everything up to the
//! first `---` line is front matter as long as it is a YAML mapping:
//!
//! ```text
//! GatherHeadingsLevel: 2
//! ---
//! # Guide
//! ```

use serde::Deserialize;

/// Document-level settings read from front matter.
///
/// Unknown keys are ignored so documents can carry settings for other tools.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct FrontMatter {
    /// Document title.
    #[serde(default)]
    pub title: Option<String>,

    /// Deepest heading level gathered into the outline.
    ///
    /// Kept as a raw integer so out-of-range values reach the threshold
    /// resolver and are reported with the valid range.
    #[serde(default, alias = "GatherHeadingsLevel")]
    pub gather_headings_level: Option<i64>,
}

impl FrontMatter {
    /// Parse front matter from its YAML block (without delimiters).
    ///
    /// Empty content returns a default instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or is not a mapping.
    pub fn from_yaml(content: &str) -> Result<Self, FrontMatterError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(trimmed)
            .map_err(|e| FrontMatterError::Parse(format!("Invalid YAML: {e}")))
    }
}

/// Error type for front matter parsing.
#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    /// YAML parsing error.
    #[error("{0}")]
    Parse(String),
}

/// Split a document into its front matter block and body.
///
/// Recognises a block fenced by `---` lines, or a bare YAML mapping closed by
/// a single `---` line. Returns `(None, source)` otherwise, including when
/// the fenced block is never closed.
#[must_use]
pub fn split_front_matter(source: &str) -> (Option<&str>, &str) {
    let source_without_bom = source.strip_prefix('\u{feff}').unwrap_or(source);

    if let Some(rest) = source_without_bom
        .strip_prefix("---\n")
        .or_else(|| source_without_bom.strip_prefix("---\r\n"))
    {
        return match split_at_delimiter(rest) {
            Some((yaml, body)) => (Some(yaml), body),
            None => (None, source),
        };
    }

    match split_at_delimiter(source_without_bom) {
        Some((yaml, body)) if is_bare_front_matter(yaml) => (Some(yaml), body),
        _ => (None, source),
    }
}

/// Split at the first line consisting of `---`.
fn split_at_delimiter(text: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            return Some((&text[..offset], &text[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Whether text before a lone `---` is settings rather than a setext heading.
///
/// The first line must carry content other than a `#` heading, and the whole
/// block must parse as a YAML mapping.
fn is_bare_front_matter(yaml: &str) -> bool {
    let first_line = yaml.lines().next().unwrap_or_default().trim();
    if first_line.is_empty() || first_line.starts_with('#') {
        return false;
    }
    serde_yaml::from_str::<serde_yaml::Mapping>(yaml).is_ok()
}
