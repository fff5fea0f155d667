//! Owned document tree folded from markdown events.
//!
//! `pulldown-cmark` produces a flat event stream. Rewriting passes want to
//! work on whole text runs and whole links, so the stream is folded into a
//! tree of [`Node`]s whose string fields are owned and mutable, and unfolded
//! again for HTML rendering.

use std::collections::HashMap;
use std::ops::Range;

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, LinkType, Tag, TagEnd};

use crate::codeblock::CodeInfo;
use crate::variables::is_placeholder;

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<'a> {
    /// A run of text. Adjacent text events are merged into one node.
    Text(String),

    /// A fenced or indented code block.
    Code {
        kind: CodeBlockKind<'a>,
        value: String,
    },

    /// An inline link.
    Link {
        link_type: LinkType,
        url: String,
        title: Option<String>,
        id: CowStr<'a>,
        children: Vec<Node<'a>>,
    },

    /// Any other container (paragraph, heading, list, emphasis, image...).
    Element { tag: Tag<'a>, children: Vec<Node<'a>> },

    /// A leaf event carried through untouched (inline code, html, breaks...).
    Leaf(Event<'a>),
}

impl Node<'_> {
    /// Concatenated text content of this node and its descendants.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(value) | Node::Code { value, .. } => out.push_str(value),
            Node::Link { children, .. } | Node::Element { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
            Node::Leaf(Event::Code(code)) => out.push_str(code),
            Node::Leaf(Event::SoftBreak | Event::HardBreak) => out.push(' '),
            Node::Leaf(_) => {}
        }
    }
}

/// A table of contents entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    /// Heading text
    pub title: String,
    /// Anchor ID
    pub id: String,
    /// Heading level (1-6)
    pub level: u8,
}

/// A parsed markdown document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document<'a> {
    pub children: Vec<Node<'a>>,
}

impl<'a> Document<'a> {
    /// Fold a markdown event stream into a tree.
    pub fn from_events<I>(events: I) -> Self
    where
        I: IntoIterator<Item = Event<'a>>,
    {
        let mut root: Vec<Node<'a>> = Vec::new();
        let mut stack: Vec<(Tag<'a>, Vec<Node<'a>>)> = Vec::new();

        for event in events {
            match event {
                Event::Start(tag) => stack.push((tag, Vec::new())),
                Event::End(_) => {
                    let Some((tag, children)) = stack.pop() else {
                        continue;
                    };
                    let node = close_node(tag, children);
                    push_node(current(&mut stack, &mut root), node);
                }
                Event::Text(text) => {
                    push_node(current(&mut stack, &mut root), Node::Text(text.to_string()));
                }
                other => push_node(current(&mut stack, &mut root), Node::Leaf(other)),
            }
        }

        // Unbalanced input: close whatever is still open
        while let Some((tag, children)) = stack.pop() {
            let node = close_node(tag, children);
            push_node(current(&mut stack, &mut root), node);
        }

        Self { children: root }
    }

    /// Fold an offset event stream over `source`.
    ///
    /// With heading attributes enabled, `pulldown-cmark` reads a trailing
    /// `{@name@}` as an attribute block. Such a block goes back into the
    /// heading text, so `# Install {@product@}` keeps its placeholder while
    /// `# Install {#setup}` still sets the id.
    pub fn from_source<I>(source: &'a str, events: I) -> Self
    where
        I: IntoIterator<Item = (Event<'a>, Range<usize>)>,
    {
        let mut out = Vec::new();
        let mut trailing: Option<CowStr<'a>> = None;

        for (event, range) in events {
            match event {
                Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                }) if id.is_none() && classes.is_empty() && is_placeholder_block(&attrs) => {
                    trailing = Some(heading_block(&source[range], &attrs[0].0));
                    out.push(Event::Start(Tag::Heading {
                        level,
                        id,
                        classes,
                        attrs: Vec::new(),
                    }));
                }
                Event::End(TagEnd::Heading(level)) => {
                    if let Some(text) = trailing.take() {
                        out.push(Event::Text(text));
                    }
                    out.push(Event::End(TagEnd::Heading(level)));
                }
                event => out.push(event),
            }
        }

        Self::from_events(out)
    }

    /// Unfold the tree back into a markdown event stream.
    pub fn to_events(&self) -> Vec<Event<'_>> {
        let mut events = Vec::new();
        push_events(&self.children, &mut events);
        events
    }

    /// Render the tree to HTML.
    pub fn render_html(&self) -> String {
        let mut html_output = String::new();
        html::push_html(&mut html_output, self.to_events().into_iter());
        html_output
    }

    /// Concatenated text of the whole document, one line per top-level block.
    pub fn plain_text(&self) -> String {
        self.children
            .iter()
            .map(Node::plain_text)
            .filter(|text| !text.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Estimated reading time in minutes at 200 words per minute.
    pub fn reading_time(&self) -> usize {
        let words = self.plain_text().split_whitespace().count();
        words.div_ceil(200).max(1)
    }

    /// Text of the first level-1 heading, if any.
    pub fn first_heading(&self) -> Option<String> {
        fn find(nodes: &[Node<'_>]) -> Option<String> {
            nodes.iter().find_map(|node| match node {
                Node::Element {
                    tag: Tag::Heading { level, .. },
                    children,
                } if *level as u8 == 1 => {
                    Some(children.iter().map(Node::plain_text).collect::<String>())
                }
                Node::Element { children, .. } => find(children),
                Node::Text(_) | Node::Code { .. } | Node::Link { .. } | Node::Leaf(_) => None,
            })
        }
        find(&self.children)
    }

    /// Give every heading an anchor id and return the table of contents.
    ///
    /// Explicit ids (`# Title {#custom}`) are kept. Generated ids are
    /// de-duplicated with `-1`, `-2`... suffixes.
    pub fn assign_heading_ids(&mut self) -> Vec<TocEntry> {
        let mut toc = Vec::new();
        let mut seen = HashMap::new();
        assign_ids(&mut self.children, &mut seen, &mut toc);
        toc
    }

    /// All link URLs in document order.
    pub fn links(&self) -> Vec<String> {
        fn collect(nodes: &[Node<'_>], out: &mut Vec<String>) {
            for node in nodes {
                match node {
                    Node::Link { url, children, .. } => {
                        out.push(url.clone());
                        collect(children, out);
                    }
                    Node::Element { children, .. } => collect(children, out),
                    Node::Text(_) | Node::Code { .. } | Node::Leaf(_) => {}
                }
            }
        }

        let mut out = Vec::new();
        collect(&self.children, &mut out);
        out
    }

    /// Rewrite link URLs. Returning `None` keeps the URL.
    pub fn rewrite_links<F>(&mut self, mut rewrite: F)
    where
        F: FnMut(&str) -> Option<String>,
    {
        fn walk<F: FnMut(&str) -> Option<String>>(nodes: &mut [Node<'_>], rewrite: &mut F) {
            for node in nodes {
                match node {
                    Node::Link { url, children, .. } => {
                        if let Some(new_url) = rewrite(url) {
                            *url = new_url;
                        }
                        walk(children, rewrite);
                    }
                    Node::Element { children, .. } => walk(children, rewrite),
                    Node::Text(_) | Node::Code { .. } | Node::Leaf(_) => {}
                }
            }
        }

        walk(&mut self.children, &mut rewrite);
    }

    /// Tag code blocks that have no language with `language`.
    pub fn set_default_code_language(&mut self, language: &str) {
        fn walk(nodes: &mut [Node<'_>], language: &str) {
            for node in nodes {
                match node {
                    Node::Code { kind, .. } => {
                        let info = match kind {
                            CodeBlockKind::Fenced(info) => info.to_string(),
                            CodeBlockKind::Indented => String::new(),
                        };
                        if CodeInfo::from_info(&info).language.is_none() {
                            let tagged = format!("{language} {info}").trim_end().to_string();
                            *kind = CodeBlockKind::Fenced(CowStr::from(tagged));
                        }
                    }
                    Node::Link { children, .. } | Node::Element { children, .. } => {
                        walk(children, language)
                    }
                    Node::Text(_) | Node::Leaf(_) => {}
                }
            }
        }

        walk(&mut self.children, language);
    }
}

fn current<'s, 'a>(
    stack: &'s mut [(Tag<'a>, Vec<Node<'a>>)],
    root: &'s mut Vec<Node<'a>>,
) -> &'s mut Vec<Node<'a>> {
    match stack.last_mut() {
        Some((_, children)) => children,
        None => root,
    }
}

fn push_node<'a>(children: &mut Vec<Node<'a>>, node: Node<'a>) {
    if let Node::Text(text) = &node {
        if let Some(Node::Text(prev)) = children.last_mut() {
            prev.push_str(text);
            return;
        }
    }
    children.push(node);
}

/// A heading attribute block that is really a single `{@name@}`.
fn is_placeholder_block(attrs: &[(CowStr<'_>, Option<CowStr<'_>>)]) -> bool {
    matches!(attrs, [(key, None)] if is_placeholder(&format!("{{{key}}}")))
}

/// The `{@name@}` block of a heading's source, with the blanks before it.
fn heading_block<'a>(heading: &'a str, key: &str) -> CowStr<'a> {
    let block = format!("{{{key}}}");
    let Some(start) = heading.rfind(&block) else {
        return CowStr::from(format!(" {block}"));
    };

    let before = heading[..start].trim_end_matches([' ', '\t']);
    let lead = if before.trim_start_matches('#').trim().is_empty() {
        start
    } else {
        before.len()
    };
    CowStr::Borrowed(&heading[lead..start + block.len()])
}

fn close_node<'a>(tag: Tag<'a>, children: Vec<Node<'a>>) -> Node<'a> {
    match tag {
        Tag::CodeBlock(kind) => Node::Code {
            kind,
            value: children.iter().map(Node::plain_text).collect(),
        },
        Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        } => Node::Link {
            link_type,
            url: dest_url.to_string(),
            // pulldown-cmark reports `[a](/b "")` and `[a](/b)` alike
            title: (!title.is_empty()).then(|| title.to_string()),
            id,
            children,
        },
        tag => Node::Element { tag, children },
    }
}

fn push_events<'a: 'b, 'b>(nodes: &'b [Node<'a>], out: &mut Vec<Event<'b>>) {
    for node in nodes {
        match node {
            Node::Text(value) => out.push(Event::Text(value.as_str().into())),
            Node::Code { kind, value } => {
                let info = match kind {
                    CodeBlockKind::Fenced(info) => CodeInfo::from_info(info),
                    CodeBlockKind::Indented => CodeInfo::default(),
                };
                if let Some(title) = info.title {
                    out.push(Event::Html("<div class=\"code-block-title\">".into()));
                    out.push(Event::Text(CowStr::from(title)));
                    out.push(Event::Html("</div>\n".into()));
                }
                if info.show_line_numbers {
                    out.push(Event::Html("<div class=\"line-numbers\">\n".into()));
                }
                out.push(Event::Start(Tag::CodeBlock(kind.clone())));
                out.push(Event::Text(value.as_str().into()));
                out.push(Event::End(TagEnd::CodeBlock));
                if info.show_line_numbers {
                    out.push(Event::Html("</div>\n".into()));
                }
            }
            Node::Link {
                link_type,
                url,
                title,
                id,
                children,
            } => {
                out.push(Event::Start(Tag::Link {
                    link_type: *link_type,
                    dest_url: url.as_str().into(),
                    title: title.as_deref().unwrap_or("").into(),
                    id: id.clone(),
                }));
                push_events(children, out);
                out.push(Event::End(TagEnd::Link));
            }
            Node::Element { tag, children } => {
                out.push(Event::Start(tag.clone()));
                push_events(children, out);
                out.push(Event::End(tag.to_end()));
            }
            Node::Leaf(event) => out.push(event.clone()),
        }
    }
}

fn assign_ids(nodes: &mut [Node<'_>], seen: &mut HashMap<String, usize>, toc: &mut Vec<TocEntry>) {
    for node in nodes {
        match node {
            Node::Element {
                tag: Tag::Heading { level, id, .. },
                children,
            } => {
                let title: String = children.iter().map(Node::plain_text).collect();
                let slug = match id {
                    Some(explicit) => {
                        let explicit = explicit.to_string();
                        *seen.entry(explicit.clone()).or_insert(0) += 1;
                        explicit
                    }
                    None => unique_slug(slugify(&title), seen),
                };
                *id = Some(CowStr::from(slug.clone()));
                toc.push(TocEntry {
                    title: title.trim().to_string(),
                    id: slug,
                    level: *level as u8,
                });
            }
            Node::Element { children, .. } | Node::Link { children, .. } => {
                assign_ids(children, seen, toc)
            }
            Node::Text(_) | Node::Code { .. } | Node::Leaf(_) => {}
        }
    }
}

fn unique_slug(base: String, seen: &mut HashMap<String, usize>) -> String {
    let base = if base.is_empty() {
        "section".to_string()
    } else {
        base
    };
    let count = seen.entry(base.clone()).or_insert(0);
    let slug = if *count == 0 {
        base
    } else {
        format!("{base}-{count}")
    };
    *count += 1;
    slug
}

/// Convert a heading to a URL-safe slug.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|c| *c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
