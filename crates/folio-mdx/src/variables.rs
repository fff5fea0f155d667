//! `{@name@}` template variable substitution.
//!
//! Placeholders are resolved against a [`VariableTable`] built from the
//! site's custom fields. Text nodes, code blocks, link URLs and link titles
//! are rewritten; everything else in the tree is left alone.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::LazyLock;

use pulldown_cmark::Tag;
use regex::{Captures, Regex};

use crate::tree::{Document, Node};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{@([A-Za-z0-9_-]*)@\}").expect("Invalid placeholder regex")
});

/// Whether `text` is exactly one placeholder, `{@@}` included.
pub(crate) fn is_placeholder(text: &str) -> bool {
    PLACEHOLDER
        .find(text)
        .is_some_and(|found| found.range() == (0..text.len()))
}

/// Read-only mapping from variable name to replacement value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableTable {
    values: HashMap<String, String>,
}

/// What a substitution pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionReport {
    /// Number of placeholders replaced by a table value
    pub replaced: usize,

    /// Names that were referenced but not found in the table
    pub missing: BTreeSet<String>,
}

impl SubstitutionReport {
    /// Fold another report into this one.
    pub fn merge(&mut self, other: SubstitutionReport) {
        self.replaced += other.replaced;
        self.missing.extend(other.missing);
    }
}

impl VariableTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a variable.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Look up a variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the table has no variables.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Substitute placeholders in a single string.
    ///
    /// `{@@}` and names missing from the table are left as written; missing
    /// names are recorded in `report`. Replacement values are not rescanned.
    pub fn substitute<'t>(&self, text: &'t str, report: &mut SubstitutionReport) -> Cow<'t, str> {
        PLACEHOLDER.replace_all(text, |caps: &Captures<'_>| {
            let full = &caps[0];
            let name = &caps[1];

            if name.is_empty() {
                return full.to_string();
            }

            match self.get(name) {
                Some(value) => {
                    report.replaced += 1;
                    value.to_string()
                }
                None => {
                    report.missing.insert(name.to_string());
                    full.to_string()
                }
            }
        })
    }

    /// Substitute placeholders in an owned string, in place.
    pub fn substitute_in_place(&self, text: &mut String, report: &mut SubstitutionReport) {
        let rewritten = match self.substitute(text, report) {
            Cow::Borrowed(_) => return,
            Cow::Owned(rewritten) => rewritten,
        };
        *text = rewritten;
    }

    /// Substitute placeholders throughout a document tree.
    ///
    /// Only string fields change; the shape of the tree is preserved.
    pub fn apply(&self, doc: &mut Document<'_>) -> SubstitutionReport {
        let mut report = SubstitutionReport::default();
        self.apply_nodes(&mut doc.children, &mut report);
        report
    }

    fn apply_nodes(&self, nodes: &mut [Node<'_>], report: &mut SubstitutionReport) {
        for node in nodes {
            match node {
                Node::Text(value) | Node::Code { value, .. } => {
                    self.substitute_in_place(value, report);
                }
                Node::Link {
                    url,
                    title,
                    children,
                    ..
                } => {
                    self.substitute_in_place(url, report);
                    if let Some(title) = title {
                        self.substitute_in_place(title, report);
                    }
                    self.apply_nodes(children, report);
                }
                // Image alt text is an attribute of the image, not body text
                Node::Element {
                    tag: Tag::Image { .. },
                    ..
                } => {}
                Node::Element { children, .. } => self.apply_nodes(children, report),
                Node::Leaf(_) => {}
            }
        }
    }
}

impl From<BTreeMap<String, String>> for VariableTable {
    fn from(values: BTreeMap<String, String>) -> Self {
        values.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VariableTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use pulldown_cmark::Parser;

    fn table() -> VariableTable {
        [
            ("domain", "example.com"),
            ("questdbVersion", "7.3.10"),
            ("slack-url", "https://slack.example.com"),
            ("pg_port", "8812"),
        ]
        .into_iter()
        .collect()
    }

    fn sub(text: &str) -> String {
        table()
            .substitute(text, &mut SubstitutionReport::default())
            .into_owned()
    }

    fn links(doc: &Document<'_>) -> Vec<(String, Option<String>)> {
        fn walk(nodes: &[Node<'_>], out: &mut Vec<(String, Option<String>)>) {
            for node in nodes {
                match node {
                    Node::Link {
                        url,
                        title,
                        children,
                        ..
                    } => {
                        out.push((url.clone(), title.clone()));
                        walk(children, out);
                    }
                    Node::Element { children, .. } => walk(children, out),
                    _ => {}
                }
            }
        }
        let mut out = Vec::new();
        walk(&doc.children, &mut out);
        out
    }

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let text = "Plain text with { braces } and @ signs and {@ incomplete";
        let mut report = SubstitutionReport::default();

        let out = table().substitute(text, &mut report);

        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out, text);
        assert_eq!(report, SubstitutionReport::default());
    }

    #[test]
    fn replaces_known_names_exactly() {
        assert_eq!(
            sub("Download v{@questdbVersion@} today."),
            "Download v7.3.10 today."
        );
        assert_eq!(sub("{@slack-url@}"), "https://slack.example.com");
        assert_eq!(sub("port {@pg_port@}/{@pg_port@}"), "port 8812/8812");
    }

    #[test]
    fn empty_placeholder_resolves_to_itself() {
        assert_eq!(sub("literal {@@} stays"), "literal {@@} stays");
    }

    #[test]
    fn missing_names_are_kept_and_reported() {
        let mut report = SubstitutionReport::default();

        let out = table().substitute("{@nope@} at {@domain@}", &mut report);

        assert_eq!(out, "{@nope@} at example.com");
        assert_eq!(report.replaced, 1);
        assert_eq!(report.missing, BTreeSet::from(["nope".to_string()]));
    }

    #[test]
    fn names_outside_character_class_do_not_match() {
        assert_eq!(sub("{@do.main@} {@do main@}"), "{@do.main@} {@do main@}");
    }

    #[test]
    fn substitution_is_idempotent() {
        let once = sub("Visit {@domain@} on port {@pg_port@} {@@}");
        assert_eq!(sub(&once), once);
    }

    #[test]
    fn values_are_not_rescanned() {
        let table: VariableTable = [("a", "{@b@}"), ("b", "x")].into_iter().collect();
        let mut report = SubstitutionReport::default();

        assert_eq!(table.substitute("{@a@}", &mut report), "{@b@}");
    }

    #[test]
    fn rewrites_text_code_and_links_in_tree() {
        let source = "Docs at {@domain@}.\n\n```shell\ncurl {@domain@}:{@pg_port@}\n```\n\n[site]({@domain@}/path \"On {@domain@}\") and [plain](https://{@domain@})\n";
        let mut doc = Document::from_events(Parser::new(source));

        let report = table().apply(&mut doc);

        assert_eq!(report.replaced, 6);
        assert!(report.missing.is_empty());

        assert_eq!(
            links(&doc),
            vec![
                (
                    "example.com/path".to_string(),
                    Some("On example.com".to_string())
                ),
                ("https://example.com".to_string(), None),
            ]
        );

        let html = doc.render_html();
        assert!(html.contains("<p>Docs at example.com.</p>"));
        assert!(html.contains("curl example.com:8812"));
    }

    #[test]
    fn leaves_inline_code_html_and_image_alt_untouched() {
        let source = "`{@domain@}`\n\n<div>{@domain@}</div>\n\n![{@domain@}](/img.png)\n";
        let mut doc = Document::from_events(Parser::new(source));

        let report = table().apply(&mut doc);

        assert_eq!(report.replaced, 0);
        let html = doc.render_html();
        assert!(html.contains("<code>{@domain@}</code>"));
        assert!(html.contains("<div>{@domain@}</div>"));
        assert!(html.contains("alt=\"{@domain@}\""));
    }

    #[test]
    fn substitutes_resolved_reference_links() {
        let source = "See [the guide][guide].\n\n[guide]: https://{@domain@}/guide \"{@domain@} guide\"\n";
        let mut doc = Document::from_events(Parser::new(source));

        let report = table().apply(&mut doc);

        assert_eq!(report.replaced, 2);
        assert_eq!(
            links(&doc),
            vec![(
                "https://example.com/guide".to_string(),
                Some("example.com guide".to_string())
            )]
        );
    }

    #[test]
    fn preserves_tree_shape() {
        let source = "# {@domain@}\n\n- [x]({@domain@})\n- {@@}\n";
        let mut doc = Document::from_events(Parser::new(source));
        let before = doc.clone();

        table().apply(&mut doc);

        assert_eq!(doc.children.len(), before.children.len());
        assert_eq!(doc.first_heading().as_deref(), Some("example.com"));
        assert_ne!(doc, before);
    }
}
