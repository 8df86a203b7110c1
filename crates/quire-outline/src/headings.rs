//! Markdown heading extraction.

use std::collections::{HashMap, HashSet};

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::Serialize;

use crate::outline::HeadingElement;

/// Heading payload produced from markdown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HeadingContent {
    /// Anchor ID, unique within the document.
    pub id: String,
    /// Plain heading text.
    pub text: String,
    /// Heading HTML with inline formatting.
    pub html: String,
}

/// Extract headings from markdown in document order.
///
/// Explicit `{#id}` attributes are used as anchors; other headings get a
/// slug of their text, suffixed with `-1`, `-2`, ... when repeated.
#[must_use]
pub fn extract_headings(markdown: &str) -> Vec<HeadingElement<HeadingContent>> {
    let options = Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TABLES;
    let mut collector = HeadingCollector::default();
    for event in Parser::new_ext(markdown, options) {
        collector.push(event);
    }
    collector.headings
}

#[derive(Default)]
struct HeadingCollector {
    current: Option<OpenHeading>,
    headings: Vec<HeadingElement<HeadingContent>>,
    /// Every id emitted so far, explicit or generated.
    used_ids: HashSet<String>,
    /// Next suffix to try per slug.
    next_suffix: HashMap<String, usize>,
}

struct OpenHeading {
    level: u8,
    explicit_id: Option<String>,
    text: String,
    html: String,
}

impl HeadingCollector {
    fn push(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                self.current = Some(OpenHeading {
                    level: heading_level_to_num(level),
                    explicit_id: id.map(|id| id.to_string()),
                    text: String::new(),
                    html: String::new(),
                });
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(open) = self.current.take() {
                    self.complete(open);
                }
            }
            event => {
                if let Some(open) = self.current.as_mut() {
                    open.push_inline(event);
                }
            }
        }
    }

    fn complete(&mut self, open: OpenHeading) {
        let text = open.text.trim().to_owned();
        let id = match open.explicit_id {
            Some(id) => id,
            None => self.unique_id(&text),
        };
        self.used_ids.insert(id.clone());
        self.headings.push(HeadingElement::new(
            open.level,
            HeadingContent {
                id,
                text,
                html: open.html.trim().to_owned(),
            },
        ));
    }

    /// Slug of `text`, suffixed until it differs from every id emitted so far.
    fn unique_id(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            "heading".clone_into(&mut base);
        }
        let suffix = self.next_suffix.entry(base.clone()).or_default();
        loop {
            let candidate = match *suffix {
                0 => base.clone(),
                n => format!("{base}-{n}"),
            };
            *suffix += 1;
            if !self.used_ids.contains(&candidate) {
                return candidate;
            }
        }
    }
}

impl OpenHeading {
    fn push_inline(&mut self, event: Event<'_>) {
        match event {
            Event::Text(text) => {
                self.text.push_str(&text);
                self.html.push_str(&escape_html(&text));
            }
            Event::Code(code) => {
                self.text.push_str(&code);
                self.html.push_str("<code>");
                self.html.push_str(&escape_html(&code));
                self.html.push_str("</code>");
            }
            Event::SoftBreak | Event::HardBreak => {
                self.text.push(' ');
                self.html.push(' ');
            }
            Event::InlineHtml(html) => self.html.push_str(&html),
            Event::Start(Tag::Emphasis) => self.html.push_str("<em>"),
            Event::End(TagEnd::Emphasis) => self.html.push_str("</em>"),
            Event::Start(Tag::Strong) => self.html.push_str("<strong>"),
            Event::End(TagEnd::Strong) => self.html.push_str("</strong>"),
            Event::Start(Tag::Strikethrough) => self.html.push_str("<del>"),
            Event::End(TagEnd::Strikethrough) => self.html.push_str("</del>"),
            // Links and images keep their text only; anchors in a table of
            // contents point at the heading itself.
            _ => {}
        }
    }
}

/// Convert heading level enum to number (1-6).
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Anchor slug for heading text.
///
/// Non-ASCII letters and digits are kept and lowercased with Unicode rules,
/// so `Ünïcode` becomes `ünïcode` rather than being dropped. Runs of
/// whitespace, `-` and `_` become one dash; other characters are removed.
/// The result may be empty.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true;

    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            result.extend(c.to_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

/// Escape text for use inside heading HTML and attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        let entity = match c {
            '&' => "&amp;",
            '<' => "&lt;",
            '>' => "&gt;",
            '"' => "&quot;",
            '\'' => "&#x27;",
            _ => {
                escaped.push(c);
                continue;
            }
        };
        escaped.push_str(entity);
    }
    escaped
}
