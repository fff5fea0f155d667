//! Markdown document parser.

use pulldown_cmark::{Options, Parser};

use crate::frontmatter::{extract_frontmatter, Frontmatter, FrontmatterError};
use crate::tree::Document;

/// Markdown parsing options taken from the site config.
#[derive(Debug, Clone, Default)]
pub struct MarkdownOptions {
    /// Parse `$inline$` and `$$display$$` math
    pub math: bool,

    /// Language applied to code blocks that don't declare one
    pub default_code_language: Option<String>,
}

/// A parsed markdown document.
#[derive(Debug, Clone)]
pub struct ParsedDoc<'a> {
    /// Parsed frontmatter (if present)
    pub frontmatter: Option<Frontmatter>,

    /// Markdown content (without frontmatter)
    pub content: &'a str,

    /// Document tree
    pub tree: Document<'a>,
}

impl ParsedDoc<'_> {
    /// Page title: frontmatter title, else the first level-1 heading.
    pub fn title(&self) -> Option<String> {
        self.frontmatter
            .as_ref()
            .and_then(|f| f.title.clone())
            .or_else(|| self.tree.first_heading())
    }

    /// Whether the page is marked as a draft.
    pub fn is_draft(&self) -> bool {
        self.frontmatter.as_ref().is_some_and(|f| f.draft)
    }
}

/// Errors that can occur when parsing a document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),
}

/// Parse a markdown document into frontmatter and a document tree.
pub fn parse_mdx<'a>(source: &'a str, options: &MarkdownOptions) -> Result<ParsedDoc<'a>, ParseError> {
    let (frontmatter, content) = extract_frontmatter(source)?;

    let mut flags = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES;
    if options.math {
        flags |= Options::ENABLE_MATH;
    }

    let events = Parser::new_ext(content, flags).into_offset_iter();
    let mut tree = Document::from_source(content, events);

    if let Some(language) = &options.default_code_language {
        tree.set_default_code_language(language);
    }

    Ok(ParsedDoc {
        frontmatter,
        content,
        tree,
    })
}
