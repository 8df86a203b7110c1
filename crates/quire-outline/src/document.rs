//! Markdown documents with front matter.

use crate::front_matter::{FrontMatter, FrontMatterError, split_front_matter};
use crate::headings::{HeadingContent, extract_headings};
use crate::outline::{OutlineTree, build_outline};
use crate::threshold::{Threshold, ThresholdError, resolve_threshold};

/// A markdown source split into front matter and body.
#[derive(Clone, Debug)]
pub struct MarkdownDocument<'a> {
    /// Parsed front matter (default when absent).
    pub front_matter: FrontMatter,
    /// Markdown after the front matter block.
    pub body: &'a str,
}

impl<'a> MarkdownDocument<'a> {
    /// Parse a markdown source.
    ///
    /// # Errors
    ///
    /// Returns an error if the front matter block is not valid YAML.
    pub fn parse(source: &'a str) -> Result<Self, FrontMatterError> {
        let (yaml, body) = split_front_matter(source);
        let front_matter = match yaml {
            Some(yaml) => FrontMatter::from_yaml(yaml)?,
            None => FrontMatter::default(),
        };
        Ok(Self { front_matter, body })
    }

    /// Effective threshold given the process-wide default.
    ///
    /// # Errors
    ///
    /// Returns an error if the selected level is outside `1..=6`.
    pub fn threshold(&self, global_default: Option<i64>) -> Result<Threshold, ThresholdError> {
        resolve_threshold(self.front_matter.gather_headings_level, global_default)
    }

    /// Build the outline of the body.
    #[must_use]
    pub fn outline(&self, threshold: Threshold) -> OutlineTree<HeadingContent> {
        outline_markdown(self.body, threshold)
    }
}

/// Extract and nest the headings of a markdown body.
#[must_use]
pub fn outline_markdown(markdown: &str, threshold: Threshold) -> OutlineTree<HeadingContent> {
    build_outline(extract_headings(markdown), threshold)
}
