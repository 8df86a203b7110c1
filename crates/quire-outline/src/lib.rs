//! Heading outline extraction for Quire documents.
//!
//! Turns the ordered headings of a document into a nested [`OutlineTree`]
//! limited to a maximum heading level ([`Threshold`]), and exposes a
//! per-level flattened view of that tree through [`OutlineTree::flatten`].
//!
//! # Architecture
//!
//! ```text
//! markdown ──► MarkdownDocument::parse ──► FrontMatter (gather_headings_level)
//!                     │                           │
//!                     ▼                           ▼
//!             extract_headings            resolve_threshold(document, global)
//!                     │                           │
//!                     └────────► build_outline ◄──┘
//!                                     │
//!                                     ▼
//!                         OutlineTree ──► flatten()
//! ```
//!
//! The tree builder is generic over the heading content, so callers that
//! already have their own heading representation can skip the markdown
//! layer entirely.
//!
//! # Example
//!
//! ```
//! use quire_outline::{HeadingElement, Threshold, build_outline};
//!
//! let headings = vec![
//!     HeadingElement::new(1, "Intro"),
//!     HeadingElement::new(2, "Install"),
//!     HeadingElement::new(3, "From source"),
//!     HeadingElement::new(1, "Usage"),
//! ];
//! let tree = build_outline(headings, Threshold::new(2).unwrap());
//!
//! let flat: Vec<_> = tree.flatten().map(|node| node.content).collect();
//! assert_eq!(flat, ["Intro", "Usage", "Install"]);
//! ```

mod document;
mod flatten;
mod front_matter;
mod headings;
mod outline;
mod threshold;

pub use document::{MarkdownDocument, outline_markdown};
pub use flatten::Flatten;
pub use front_matter::{FrontMatter, FrontMatterError, split_front_matter};
pub use headings::{HeadingContent, escape_html, extract_headings, slugify};
pub use outline::{HeadingElement, OutlineNode, OutlineTree, build_outline};
pub use threshold::{MAX_LEVEL, MIN_LEVEL, Threshold, ThresholdError, resolve_threshold};
