//! Markdown parsing for folio sites.
//!
//! This crate parses markdown pages with YAML frontmatter into an owned
//! document tree, substitutes `{@variable@}` placeholders from a
//! [`VariableTable`], and renders the result to HTML.

pub mod codeblock;
pub mod frontmatter;
pub mod parser;
pub mod tree;
pub mod variables;

pub use codeblock::CodeInfo;
pub use frontmatter::Frontmatter;
pub use parser::{parse_mdx, MarkdownOptions, ParseError, ParsedDoc};
pub use tree::{slugify, Document, Node, TocEntry};
pub use variables::{SubstitutionReport, VariableTable};
