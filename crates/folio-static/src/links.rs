//! Internal link resolution and broken link detection.

use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};

use crate::navigation::is_external;

/// Outcome of resolving a link that may point at a markdown source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkdownLink {
    /// Not a link to a `.md`/`.mdx` file
    NotMarkdown,
    /// Rewritten to the target page URL
    Resolved(String),
    /// Points at a markdown file that isn't part of the site
    Missing,
}

/// Resolve `./other.md#anchor` style links against the docs tree.
///
/// `pages` maps source paths (relative to the docs dir) to page URLs.
pub fn resolve_markdown_link(
    link: &str,
    source: &Path,
    pages: &HashMap<PathBuf, String>,
) -> MarkdownLink {
    if is_external(link) {
        return MarkdownLink::NotMarkdown;
    }

    let (path, fragment) = match link.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (link, None),
    };

    if !(path.ends_with(".md") || path.ends_with(".mdx")) {
        return MarkdownLink::NotMarkdown;
    }

    let target = match path.strip_prefix('/') {
        Some(absolute) => normalize(Path::new(absolute)),
        None => normalize(&source.parent().unwrap_or(Path::new("")).join(path)),
    };

    match pages.get(&target) {
        Some(url) => MarkdownLink::Resolved(match fragment {
            Some(fragment) => format!("{url}#{fragment}"),
            None => url.clone(),
        }),
        None => MarkdownLink::Missing,
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    out
}

/// Every URL path a build produced: pages and copied files.
#[derive(Debug, Default, Clone)]
pub struct LinkIndex {
    paths: HashSet<String>,
}

impl LinkIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a URL path such as `/docs/intro/` or `/img/logo.svg`.
    pub fn insert(&mut self, url: impl Into<String>) {
        self.paths.insert(url.into());
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Whether an internal link from `page_url` has no target.
    ///
    /// External links, pure anchors and non-http schemes are never broken.
    pub fn is_broken(&self, page_url: &str, link: &str) -> bool {
        if link.is_empty()
            || link.starts_with('#')
            || is_external(link)
            || link.starts_with("tel:")
            || link.starts_with("javascript:")
            || link.starts_with("data:")
        {
            return false;
        }

        let path = link
            .split(['#', '?'])
            .next()
            .unwrap_or_default();
        if path.is_empty() {
            return false;
        }

        let resolved = resolve_url(page_url, path);
        let trimmed = resolved.trim_end_matches('/');

        let candidates = [
            resolved.clone(),
            format!("{trimmed}/"),
            trimmed.to_string(),
            format!("{trimmed}/index.html"),
        ];

        !candidates.iter().any(|c| self.paths.contains(c))
    }
}

/// Resolve `link` relative to the directory of `page_url`.
fn resolve_url(page_url: &str, link: &str) -> String {
    let joined = if link.starts_with('/') {
        link.to_string()
    } else {
        let dir = match page_url.rfind('/') {
            Some(idx) => &page_url[..=idx],
            None => "/",
        };
        format!("{dir}{link}")
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut url = format!("/{}", segments.join("/"));
    if joined.ends_with('/') && url != "/" {
        url.push('/');
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages() -> HashMap<PathBuf, String> {
        HashMap::from([
            (PathBuf::from("index.md"), "/".to_string()),
            (
                PathBuf::from("guides/ingestion.md"),
                "/guides/ingestion/".to_string(),
            ),
            (
                PathBuf::from("reference/sql/select.mdx"),
                "/reference/sql/select/".to_string(),
            ),
        ])
    }

    #[test]
    fn resolves_relative_markdown_links() {
        let source = Path::new("guides/ingestion.md");

        assert_eq!(
            resolve_markdown_link("../reference/sql/select.mdx#syntax", source, &pages()),
            MarkdownLink::Resolved("/reference/sql/select/#syntax".to_string())
        );
        assert_eq!(
            resolve_markdown_link("./ingestion.md", source, &pages()),
            MarkdownLink::Resolved("/guides/ingestion/".to_string())
        );
        assert_eq!(
            resolve_markdown_link("/index.md", source, &pages()),
            MarkdownLink::Resolved("/".to_string())
        );
    }

    #[test]
    fn reports_missing_markdown_targets() {
        assert_eq!(
            resolve_markdown_link("./nope.md", Path::new("index.md"), &pages()),
            MarkdownLink::Missing
        );
    }

    #[test]
    fn ignores_non_markdown_links() {
        let source = Path::new("index.md");

        assert_eq!(
            resolve_markdown_link("/docs/", source, &pages()),
            MarkdownLink::NotMarkdown
        );
        assert_eq!(
            resolve_markdown_link("https://example.com/README.md", source, &pages()),
            MarkdownLink::NotMarkdown
        );
    }

    #[test]
    fn detects_broken_links() {
        let mut index = LinkIndex::new();
        index.insert("/");
        index.insert("/guides/ingestion/");
        index.insert("/img/logo.svg");

        assert!(!index.is_broken("/", "/guides/ingestion/"));
        assert!(!index.is_broken("/", "/guides/ingestion"));
        assert!(!index.is_broken("/", "/guides/ingestion/#ilp"));
        assert!(!index.is_broken("/", "/img/logo.svg"));
        assert!(!index.is_broken("/guides/ingestion/", "../../img/logo.svg"));
        assert!(!index.is_broken("/guides/ingestion/", "#top"));
        assert!(!index.is_broken("/", "https://questdb.io/nowhere"));
        assert!(!index.is_broken("/", "mailto:hello@questdb.io"));

        assert!(index.is_broken("/", "/guides/missing/"));
        assert!(index.is_broken("/guides/ingestion/", "sibling/"));
    }

    #[test]
    fn resolves_relative_urls() {
        assert_eq!(resolve_url("/a/b/", "c/"), "/a/b/c/");
        assert_eq!(resolve_url("/a/b/", "../c"), "/a/c");
        assert_eq!(resolve_url("/a/b/", "./"), "/a/b/");
        assert_eq!(resolve_url("/", "/x/y/"), "/x/y/");
    }
}
