//! Sidebar, navbar and footer navigation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;

use folio_mdx::{SubstitutionReport, VariableTable};

use crate::builder::BuildError;
use crate::config::{FooterConfig, Logo, NavbarConfig, NavbarItemConfig, Position};

/// A sidebar navigation item.
#[derive(Debug, Clone, Serialize)]
pub struct NavItem {
    /// Display title
    pub title: String,
    /// URL path
    pub path: String,
    /// Child items
    pub children: Vec<NavItem>,
    /// Whether this is the active page
    pub active: bool,
}

/// A page as seen by the sidebar builder.
#[derive(Debug, Clone)]
pub struct SidebarPage {
    pub title: String,
    pub url: String,
    /// Source path relative to the docs directory
    pub relative_path: PathBuf,
}

/// Build the sidebar from pages, grouping nested directories into sections.
pub fn build_sidebar(pages: &[SidebarPage], base_url: &str) -> Vec<NavItem> {
    let mut nav = Vec::new();
    let mut dirs: BTreeMap<PathBuf, Vec<NavItem>> = BTreeMap::new();

    for page in pages {
        let item = NavItem {
            title: page.title.clone(),
            path: page.url.clone(),
            children: Vec::new(),
            active: false,
        };

        let parent = page.relative_path.parent().unwrap_or(Path::new(""));
        dirs.entry(parent.to_path_buf()).or_default().push(item);
    }

    if let Some(root_items) = dirs.remove(&PathBuf::new()) {
        nav.extend(root_items);
    }

    for (dir, items) in dirs {
        let dir_name = dir
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("Section");

        nav.push(NavItem {
            title: capitalize(&dir_name.replace(['-', '_'], " ")),
            path: format!("{}{}/", base_url, dir.display()),
            children: items,
            active: false,
        });
    }

    nav
}

/// Copy of `nav` with the item for `url` (and its section) marked active.
pub fn mark_active(nav: &[NavItem], url: &str) -> Vec<NavItem> {
    nav.iter()
        .map(|item| {
            let children = mark_active(&item.children, url);
            let active = item.path == url || children.iter().any(|c| c.active);
            NavItem {
                title: item.title.clone(),
                path: item.path.clone(),
                children,
                active,
            }
        })
        .collect()
}

/// A navbar entry resolved for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct NavbarItem {
    pub label: String,
    pub url: Option<String>,
    pub external: bool,
    pub class_name: Option<String>,
    pub aria_label: Option<String>,
    pub active: bool,
    pub items: Vec<NavbarItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Navbar {
    pub title: Option<String>,
    pub logo: Option<Logo>,
    pub left: Vec<NavbarItem>,
    pub right: Vec<NavbarItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FooterLink {
    pub label: String,
    pub url: String,
    pub external: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FooterColumn {
    pub title: String,
    pub items: Vec<FooterLink>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Footer {
    pub columns: Vec<FooterColumn>,
    pub copyright: Option<String>,
}

/// Navbar entry with placeholders resolved and its active pattern compiled.
#[derive(Debug, Clone)]
struct ResolvedItem {
    label: String,
    url: Option<String>,
    external: bool,
    position: Position,
    class_name: Option<String>,
    aria_label: Option<String>,
    active_pattern: Option<Regex>,
    items: Vec<ResolvedItem>,
}

/// Navbar and footer resolved once per build, then specialised per page.
#[derive(Debug, Clone)]
pub struct SiteNavigation {
    base_url: String,
    title: Option<String>,
    logo: Option<Logo>,
    items: Vec<ResolvedItem>,
    footer: Footer,
}

impl SiteNavigation {
    /// Resolve navbar and footer config against the variable table.
    pub fn new(
        navbar: &NavbarConfig,
        footer: &FooterConfig,
        base_url: &str,
        variables: &VariableTable,
        report: &mut SubstitutionReport,
    ) -> Result<Self, BuildError> {
        let items = navbar
            .items
            .iter()
            .map(|item| resolve_item(item, base_url, variables, report))
            .collect::<Result<Vec<_>, _>>()?;

        let columns = footer
            .links
            .iter()
            .map(|column| FooterColumn {
                title: variables.substitute(&column.title, report).into_owned(),
                items: column
                    .items
                    .iter()
                    .filter_map(|link| {
                        let (url, external) = resolve_target(
                            link.to.as_deref(),
                            link.href.as_deref(),
                            base_url,
                            variables,
                            report,
                        )?;
                        Some(FooterLink {
                            label: variables.substitute(&link.label, report).into_owned(),
                            url,
                            external,
                        })
                    })
                    .collect(),
            })
            .collect();

        Ok(Self {
            base_url: base_url.to_string(),
            title: navbar.title.clone(),
            logo: navbar.logo.clone(),
            items,
            footer: Footer {
                columns,
                copyright: footer
                    .copyright
                    .as_ref()
                    .map(|c| variables.substitute(c, report).into_owned()),
            },
        })
    }

    /// Navbar with active state computed for the page at `page_url`.
    pub fn navbar(&self, page_url: &str) -> Navbar {
        let (left, right): (Vec<_>, Vec<_>) = self
            .items
            .iter()
            .partition(|item| item.position == Position::Left);

        Navbar {
            title: self.title.clone(),
            logo: self.logo.clone(),
            left: left
                .into_iter()
                .map(|item| self.render_item(item, page_url))
                .collect(),
            right: right
                .into_iter()
                .map(|item| self.render_item(item, page_url))
                .collect(),
        }
    }

    pub fn footer(&self) -> &Footer {
        &self.footer
    }

    fn render_item(&self, item: &ResolvedItem, page_url: &str) -> NavbarItem {
        let items: Vec<NavbarItem> = item
            .items
            .iter()
            .map(|child| self.render_item(child, page_url))
            .collect();

        let own_active = match (&item.active_pattern, &item.url) {
            (Some(pattern), _) => pattern.is_match(page_url),
            (None, Some(url)) if !item.external => {
                url != &self.base_url && page_url.starts_with(url.as_str())
            }
            _ => false,
        };

        NavbarItem {
            label: item.label.clone(),
            url: item.url.clone(),
            external: item.external,
            class_name: item.class_name.clone(),
            aria_label: item.aria_label.clone(),
            active: own_active || items.iter().any(|child| child.active),
            items,
        }
    }
}

fn resolve_item(
    item: &NavbarItemConfig,
    base_url: &str,
    variables: &VariableTable,
    report: &mut SubstitutionReport,
) -> Result<ResolvedItem, BuildError> {
    let target = resolve_target(
        item.to.as_deref(),
        item.href.as_deref(),
        base_url,
        variables,
        report,
    );

    let active_pattern = item
        .active_base_regex
        .as_deref()
        .map(Regex::new)
        .transpose()
        .map_err(|e| {
            BuildError::ConfigError(format!(
                "Invalid active_base_regex on navbar item '{}': {}",
                item.label, e
            ))
        })?;

    let items = item
        .items
        .iter()
        .map(|child| resolve_item(child, base_url, variables, report))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ResolvedItem {
        label: variables.substitute(&item.label, report).into_owned(),
        external: target.as_ref().is_some_and(|(_, external)| *external),
        url: target.map(|(url, _)| url),
        position: item.position,
        class_name: item.class_name.clone(),
        aria_label: item.aria_label.clone(),
        active_pattern,
        items,
    })
}

/// Resolve a `to`/`href` pair into a URL and whether it leaves the site.
fn resolve_target(
    to: Option<&str>,
    href: Option<&str>,
    base_url: &str,
    variables: &VariableTable,
    report: &mut SubstitutionReport,
) -> Option<(String, bool)> {
    if let Some(href) = href {
        return Some((variables.substitute(href, report).into_owned(), true));
    }

    let to = variables.substitute(to?, report);
    if is_external(&to) {
        return Some((to.into_owned(), true));
    }

    Some((join_base(base_url, &to), false))
}

/// Whether a URL points outside the site.
pub fn is_external(url: &str) -> bool {
    url.contains("://") || url.starts_with("mailto:") || url.starts_with("//")
}

/// Prefix an internal path with the base URL.
pub fn join_base(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Capitalize first letter of a string.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
