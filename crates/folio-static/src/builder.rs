//! Static site builder.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use folio_mdx::{parse_mdx, Frontmatter, MarkdownOptions, SubstitutionReport, VariableTable};

use crate::assets::AssetPipeline;
use crate::config::{AnnouncementBar, ReportLevel, SiteConfig};
use crate::links::{resolve_markdown_link, LinkIndex, MarkdownLink};
use crate::navigation::{build_sidebar, is_external, join_base, mark_active, NavItem, SidebarPage, SiteNavigation};
use crate::sitemap::{render_robots, render_sitemap};
use crate::templates::{Attribute, Context, HeadElement, SiteContext, TemplateEngine, TocEntry};

/// Configuration for building a static site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Source docs directory
    pub docs_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Files copied verbatim to the output root
    pub static_dir: Option<PathBuf>,

    /// Minify CSS output
    pub minify: bool,

    /// Render pages marked `draft: true`
    pub include_drafts: bool,

    /// Extra script added to every page (the dev server's reload client)
    pub dev_script: Option<String>,

    /// Site configuration
    pub site: SiteConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("docs"),
            output_dir: PathBuf::from("dist"),
            static_dir: None,
            minify: true,
            include_drafts: false,
            dev_script: None,
            site: SiteConfig::default(),
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages generated
    pub pages: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,

    /// Problems reported at the `warn` level
    pub warnings: Vec<String>,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read docs directory: {0}")]
    ReadError(String),

    #[error("Failed to parse MDX: {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),

    #[error("Found unknown variables:\n{}", .0.join("\n"))]
    MissingVariables(Vec<String>),

    #[error("Found broken links:\n{}", .0.join("\n"))]
    BrokenLinks(Vec<String>),

    #[error("Found broken markdown links:\n{}", .0.join("\n"))]
    BrokenMarkdownLinks(Vec<String>),
}

/// A page to be built.
#[derive(Debug)]
struct PageInfo {
    /// Source file path
    source_path: PathBuf,

    /// Relative path from docs dir
    relative_path: PathBuf,

    /// Output path
    output_path: PathBuf,

    /// URL path, including the base URL
    url: String,

    title: String,

    frontmatter: Frontmatter,

    /// Raw file contents
    source: String,
}

/// Values shared by every page of one build.
struct SharedContext {
    sidebar: Vec<NavItem>,
    navigation: SiteNavigation,
    announcement: Option<AnnouncementBar>,
    site: SiteContext,
    styles: Vec<String>,
    head_tags: Vec<HeadElement>,
    /// Source path relative to the docs dir -> page URL
    source_urls: HashMap<PathBuf, String>,
}

/// What a rendered page reports back to the build.
#[derive(Debug)]
struct PageOutput {
    source: String,
    url: String,
    links: Vec<String>,
    broken_markdown_links: Vec<String>,
    substitutions: SubstitutionReport,
    search: SearchEntry,
}

#[derive(Debug, Serialize)]
struct SearchEntry {
    title: String,
    description: String,
    url: String,
    content: String,
}

/// Static site builder.
pub struct StaticBuilder {
    config: BuildConfig,
    variables: VariableTable,
    markdown: MarkdownOptions,
    templates: TemplateEngine,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(mut config: BuildConfig) -> Self {
        let base_url = &mut config.site.site.base_url;
        if !base_url.starts_with('/') {
            base_url.insert(0, '/');
        }
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        let variables = VariableTable::from(config.site.custom_fields.clone());
        tracing::debug!("Loaded {} custom fields", variables.len());

        let markdown = MarkdownOptions {
            math: config.site.markdown.math,
            default_code_language: config.site.theme.prism.default_language.clone(),
        };

        Self {
            config,
            variables,
            markdown,
            templates: TemplateEngine::new(),
        }
    }

    fn base_url(&self) -> &str {
        &self.config.site.site.base_url
    }

    /// Build the static site.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();
        let site = &self.config.site;
        let mut warnings = Vec::new();

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        // Placeholders in navbar, footer and announcement bar
        let mut config_report = SubstitutionReport::default();
        let navigation = SiteNavigation::new(
            &site.navbar,
            &site.footer,
            self.base_url(),
            &self.variables,
            &mut config_report,
        )?;
        let announcement = site.theme.announcement_bar.clone().map(|mut bar| {
            self.variables
                .substitute_in_place(&mut bar.content, &mut config_report);
            bar
        });

        let pages = self.discover_pages()?;

        let sidebar_pages: Vec<SidebarPage> = pages
            .iter()
            .filter(|page| page.frontmatter.nav)
            .map(|page| SidebarPage {
                title: page.title.clone(),
                url: page.url.clone(),
                relative_path: page.relative_path.clone(),
            })
            .collect();

        let shared = SharedContext {
            sidebar: build_sidebar(&sidebar_pages, self.base_url()),
            navigation,
            announcement,
            site: self.site_context(),
            styles: self.style_urls(),
            head_tags: self.head_tags(),
            source_urls: pages
                .iter()
                .map(|page| (page.relative_path.clone(), page.url.clone()))
                .collect(),
        };

        let mut index = LinkIndex::new();
        self.copy_static(&mut index)?;

        // Render pages in parallel
        let results: Vec<Result<PageOutput, BuildError>> = pages
            .par_iter()
            .map(|page| self.build_page(page, &shared))
            .collect();
        let outputs = results.into_iter().collect::<Result<Vec<_>, _>>()?;

        let mut missing = config_report
            .missing
            .iter()
            .map(|name| format!("site config: {{@{}@}}", name))
            .collect::<Vec<_>>();
        let mut replaced = config_report.replaced;
        for output in &outputs {
            replaced += output.substitutions.replaced;
            missing.extend(
                output
                    .substitutions
                    .missing
                    .iter()
                    .map(|name| format!("{}: {{@{}@}}", output.source, name)),
            );
        }
        tracing::debug!("Replaced {} placeholders", replaced);
        enforce(
            site.site.on_missing_variables,
            missing,
            &mut warnings,
            BuildError::MissingVariables,
        )?;

        let broken_markdown = outputs
            .iter()
            .flat_map(|output| {
                output
                    .broken_markdown_links
                    .iter()
                    .map(|link| format!("{}: {}", output.source, link))
            })
            .collect();
        enforce(
            site.site.on_broken_markdown_links,
            broken_markdown,
            &mut warnings,
            BuildError::BrokenMarkdownLinks,
        )?;

        for output in &outputs {
            index.insert(output.url.clone());
        }
        for asset in self.generate_assets()? {
            index.insert(asset);
        }

        self.generate_search_index(&outputs)?;
        self.generate_sitemap(&outputs)?;
        index.insert(format!("{}search-index.json", self.base_url()));
        index.insert(format!("{}sitemap.xml", self.base_url()));
        index.insert(format!("{}robots.txt", self.base_url()));

        if site.pwa.enabled {
            self.generate_manifest()?;
            index.insert(format!("{}manifest.webmanifest", self.base_url()));
        }

        let broken = outputs
            .iter()
            .flat_map(|output| {
                output
                    .links
                    .iter()
                    .filter(|link| index.is_broken(&output.url, link))
                    .map(|link| format!("{} links to {}", output.source, link))
            })
            .collect();
        enforce(
            site.site.on_broken_links,
            broken,
            &mut warnings,
            BuildError::BrokenLinks,
        )?;

        let duration = start.elapsed();

        Ok(BuildResult {
            pages: outputs.len(),
            duration_ms: duration.as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
            warnings,
        })
    }

    /// Discover all MDX pages in the docs directory.
    fn discover_pages(&self) -> Result<Vec<PageInfo>, BuildError> {
        let mut pages = Vec::new();

        if !self.config.docs_dir.exists() {
            return Err(BuildError::ReadError(format!(
                "Docs directory not found: {}",
                self.config.docs_dir.display()
            )));
        }

        for entry in WalkDir::new(&self.config.docs_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if ext != "mdx" && ext != "md" {
                continue;
            }

            let source = fs::read_to_string(path)
                .map_err(|e| BuildError::ReadError(format!("{}: {}", path.display(), e)))?;

            let relative_path = path
                .strip_prefix(&self.config.docs_dir)
                .unwrap_or(path)
                .to_path_buf();

            let (draft, title, frontmatter) = {
                let mut doc =
                    parse_mdx(&source, &self.markdown).map_err(|e| BuildError::ParseError {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    })?;

                // Headings used as titles show substituted text
                self.variables.apply(&mut doc.tree);
                (doc.is_draft(), doc.title(), doc.frontmatter.unwrap_or_default())
            };

            if draft && !self.config.include_drafts {
                tracing::debug!("Skipping draft {}", path.display());
                continue;
            }

            let title = title.unwrap_or_else(|| {
                relative_path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("Untitled")
                    .to_string()
            });

            let output_path = self.calculate_output_path(&relative_path, &frontmatter);
            let url = self.path_to_url(&output_path);

            pages.push(PageInfo {
                source_path: path.to_path_buf(),
                relative_path,
                output_path,
                url,
                title,
                frontmatter,
                source,
            });
        }

        // Sort by order from frontmatter, then by path
        pages.sort_by(|a, b| {
            let order_a = a.frontmatter.order.unwrap_or(999);
            let order_b = b.frontmatter.order.unwrap_or(999);
            order_a
                .cmp(&order_b)
                .then_with(|| a.relative_path.cmp(&b.relative_path))
        });

        Ok(pages)
    }

    /// Calculate output path for a page.
    fn calculate_output_path(&self, relative: &Path, frontmatter: &Frontmatter) -> PathBuf {
        if let Some(slug) = &frontmatter.slug {
            let slug = slug.trim_matches('/');
            if slug.is_empty() {
                return self.config.output_dir.join("index.html");
            }
            return self.config.output_dir.join(slug).join("index.html");
        }

        let stem = relative
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("index");
        let parent = relative.parent().unwrap_or(Path::new(""));

        if stem == "index" {
            // docs/index.mdx -> dist/index.html
            self.config.output_dir.join(parent).join("index.html")
        } else {
            // docs/button.mdx -> dist/button/index.html
            self.config
                .output_dir
                .join(parent)
                .join(stem)
                .join("index.html")
        }
    }

    /// Convert output path to URL.
    fn path_to_url(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.config.output_dir).unwrap_or(path);

        let url = relative
            .parent()
            .map(url_path)
            .unwrap_or_default();

        if url.is_empty() {
            self.base_url().to_string()
        } else {
            format!("{}{}/", self.base_url(), url)
        }
    }

    /// Build a single page.
    fn build_page(&self, page: &PageInfo, shared: &SharedContext) -> Result<PageOutput, BuildError> {
        let source = page
            .relative_path
            .to_string_lossy()
            .to_string();

        let mut doc = parse_mdx(&page.source, &self.markdown).map_err(|e| BuildError::ParseError {
            path: page.source_path.display().to_string(),
            message: e.to_string(),
        })?;

        let substitutions = self.variables.apply(&mut doc.tree);

        let mut broken_markdown_links = Vec::new();
        doc.tree.rewrite_links(|link| {
            match resolve_markdown_link(link, &page.relative_path, &shared.source_urls) {
                MarkdownLink::Resolved(url) => Some(url),
                MarkdownLink::Missing => {
                    broken_markdown_links.push(link.to_string());
                    None
                }
                MarkdownLink::NotMarkdown => None,
            }
        });

        let toc: Vec<TocEntry> = doc
            .tree
            .assign_heading_ids()
            .iter()
            .filter(|entry| (2..=3).contains(&entry.level))
            .map(TocEntry::from)
            .collect();

        let content_html = doc.tree.render_html();

        let reading_time = self
            .config
            .site
            .markdown
            .show_reading_time
            .then(|| doc.tree.reading_time());

        let context = Context {
            title: page.title.clone(),
            description: page.frontmatter.description.clone(),
            site: shared.site.clone(),
            canonical_url: format!(
                "{}{}",
                self.config.site.site.url.trim_end_matches('/'),
                page.url
            ),
            content: content_html,
            sidebar: mark_active(&shared.sidebar, &page.url),
            navbar: shared.navigation.navbar(&page.url),
            footer: shared.navigation.footer().clone(),
            toc,
            base_url: self.base_url().to_string(),
            styles: shared.styles.clone(),
            head_tags: shared.head_tags.clone(),
            color_mode: self.config.site.theme.color_mode.clone(),
            announcement: shared.announcement.clone(),
            analytics: self.config.site.analytics.clone(),
            reading_time,
            dev_script: self.config.dev_script.clone(),
        };

        let html = self
            .templates
            .render_page("doc.html", &context)
            .map_err(|e: minijinja::Error| BuildError::TemplateError(e.to_string()))?;

        if let Some(parent) = page.output_path.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
        }

        fs::write(&page.output_path, html).map_err(|e| BuildError::WriteError(e.to_string()))?;

        let content = doc
            .tree
            .plain_text()
            .lines()
            .take(10)
            .collect::<Vec<_>>()
            .join(" ");

        Ok(PageOutput {
            source,
            url: page.url.clone(),
            links: doc.tree.links(),
            broken_markdown_links,
            substitutions,
            search: SearchEntry {
                title: page.title.clone(),
                description: page.frontmatter.description.clone().unwrap_or_default(),
                url: page.url.clone(),
                content,
            },
        })
    }

    fn site_context(&self) -> SiteContext {
        let meta = &self.config.site.site;
        let origin = meta.url.trim_end_matches('/');

        SiteContext {
            title: meta.title.clone(),
            tagline: meta.tagline.clone(),
            url: meta.url.clone(),
            favicon: meta
                .favicon
                .as_deref()
                .map(|favicon| self.site_path(favicon)),
            image: meta.image.as_deref().map(|image| {
                if is_external(image) {
                    image.to_string()
                } else {
                    format!("{}{}", origin, join_base(self.base_url(), image))
                }
            }),
        }
    }

    fn site_path(&self, path: &str) -> String {
        if is_external(path) {
            path.to_string()
        } else {
            join_base(self.base_url(), path)
        }
    }

    /// URLs of the configured custom stylesheets.
    fn style_urls(&self) -> Vec<String> {
        self.config
            .site
            .theme
            .custom_css
            .iter()
            .map(|s| format!("{}assets/{}", self.base_url(), file_name(s)))
            .collect()
    }

    /// PWA head tags, plus a manifest link when none is configured.
    fn head_tags(&self) -> Vec<HeadElement> {
        let pwa = &self.config.site.pwa;
        if !pwa.enabled {
            return Vec::new();
        }

        let mut tags: Vec<HeadElement> = pwa
            .head
            .iter()
            .map(|tag| {
                let mut element = HeadElement::from(tag);
                for attribute in &mut element.attributes {
                    if attribute.name == "href" {
                        attribute.value = self.site_path(&attribute.value);
                    }
                }
                element
            })
            .collect();

        let has_manifest = pwa
            .head
            .iter()
            .any(|tag| tag.attributes.get("rel").is_some_and(|rel| rel == "manifest"));
        if !has_manifest {
            tags.push(HeadElement {
                tag_name: "link".to_string(),
                attributes: vec![
                    Attribute {
                        name: "rel".to_string(),
                        value: "manifest".to_string(),
                    },
                    Attribute {
                        name: "href".to_string(),
                        value: format!("{}manifest.webmanifest", self.base_url()),
                    },
                ],
            });
        }

        tags
    }

    /// Copy the static directory to the output root.
    fn copy_static(&self, index: &mut LinkIndex) -> Result<(), BuildError> {
        let Some(static_dir) = &self.config.static_dir else {
            return Ok(());
        };
        if !static_dir.exists() {
            tracing::debug!("Static directory not found: {}", static_dir.display());
            return Ok(());
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry.path().strip_prefix(static_dir).unwrap_or(entry.path());
            let target = self.config.output_dir.join(relative);

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
            }
            fs::copy(entry.path(), &target).map_err(|e| {
                BuildError::WriteError(format!("{}: {}", entry.path().display(), e))
            })?;

            index.insert(format!("{}{}", self.base_url(), url_path(relative)));
            copied += 1;
        }

        tracing::info!("Copied {} static files from {}", copied, static_dir.display());
        Ok(())
    }

    /// Generate static assets, returning their URLs.
    fn generate_assets(&self) -> Result<Vec<String>, BuildError> {
        let assets_dir = self.config.output_dir.join("assets");
        fs::create_dir_all(&assets_dir).map_err(|e| BuildError::WriteError(e.to_string()))?;

        let mut urls = Vec::new();

        let css = self.maybe_minify(AssetPipeline::generate_css());
        fs::write(assets_dir.join("main.css"), css)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;
        urls.push(format!("{}assets/main.css", self.base_url()));

        let js = AssetPipeline::generate_js();
        fs::write(assets_dir.join("main.js"), js)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;
        urls.push(format!("{}assets/main.js", self.base_url()));

        // Copy configured stylesheets
        for style_path in &self.config.site.theme.custom_css {
            let source_path = PathBuf::from(style_path);
            if !source_path.exists() {
                tracing::warn!("Stylesheet not found: {}", style_path);
                continue;
            }

            let filename = file_name(style_path);
            let content = fs::read_to_string(&source_path)
                .map_err(|e| BuildError::ReadError(format!("Failed to read stylesheet: {}", e)))?;
            fs::write(assets_dir.join(filename), self.maybe_minify(content))
                .map_err(|e| BuildError::WriteError(e.to_string()))?;
            urls.push(format!("{}assets/{}", self.base_url(), filename));
            tracing::info!("Copied stylesheet from {}", style_path);
        }

        Ok(urls)
    }

    fn maybe_minify(&self, css: String) -> String {
        if !self.config.minify {
            return css;
        }
        match AssetPipeline::minify_css(&css) {
            Ok(minified) => minified,
            Err(e) => {
                tracing::warn!("Failed to minify CSS: {}", e);
                css
            }
        }
    }

    /// Generate search index.
    fn generate_search_index(&self, outputs: &[PageOutput]) -> Result<(), BuildError> {
        let index: Vec<&SearchEntry> = outputs.iter().map(|output| &output.search).collect();

        let json = serde_json::to_string_pretty(&index)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        fs::write(self.config.output_dir.join("search-index.json"), json)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Generate sitemap and robots.txt.
    fn generate_sitemap(&self, outputs: &[PageOutput]) -> Result<(), BuildError> {
        let site = &self.config.site;
        let urls: Vec<String> = outputs.iter().map(|output| output.url.clone()).collect();

        let sitemap = render_sitemap(&site.site.url, &urls, &site.sitemap);
        fs::write(self.config.output_dir.join("sitemap.xml"), sitemap)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let robots = render_robots(&site.site.url, self.base_url());
        fs::write(self.config.output_dir.join("robots.txt"), robots)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        Ok(())
    }

    fn generate_manifest(&self) -> Result<(), BuildError> {
        let manifest = AssetPipeline::generate_manifest(&self.config.site.pwa, &self.config.site.site)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        fs::write(self.config.output_dir.join("manifest.webmanifest"), manifest)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        Ok(())
    }
}

/// Apply a report level to a list of problems.
fn enforce(
    level: ReportLevel,
    problems: Vec<String>,
    warnings: &mut Vec<String>,
    error: fn(Vec<String>) -> BuildError,
) -> Result<(), BuildError> {
    if problems.is_empty() {
        return Ok(());
    }

    match level {
        ReportLevel::Ignore => Ok(()),
        ReportLevel::Warn => {
            for problem in &problems {
                tracing::warn!("{}", problem);
            }
            warnings.extend(problems);
            Ok(())
        }
        ReportLevel::Throw => Err(error(problems)),
    }
}

/// Relative filesystem path as a `/`-separated URL path.
fn url_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn file_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("style.css")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::{tempdir, TempDir};

    use crate::config::PwaConfig;

    struct Fixture {
        _temp: TempDir,
        docs: PathBuf,
        static_dir: PathBuf,
        out: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = tempdir().unwrap();
            let docs = temp.path().join("docs");
            let static_dir = temp.path().join("static");
            let out = temp.path().join("dist");
            fs::create_dir_all(&docs).unwrap();
            fs::create_dir_all(&static_dir).unwrap();
            Self {
                _temp: temp,
                docs,
                static_dir,
                out,
            }
        }

        fn write_doc(&self, path: &str, content: &str) {
            let path = self.docs.join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        fn config(&self, site: SiteConfig) -> BuildConfig {
            BuildConfig {
                docs_dir: self.docs.clone(),
                output_dir: self.out.clone(),
                static_dir: Some(self.static_dir.clone()),
                minify: false,
                site,
                ..Default::default()
            }
        }

        fn read(&self, path: &str) -> String {
            fs::read_to_string(self.out.join(path)).unwrap()
        }
    }

    fn site_with_fields(fields: &[(&str, &str)]) -> SiteConfig {
        SiteConfig {
            custom_fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn builds_simple_site() {
        let fixture = Fixture::new();
        fixture.write_doc("index.mdx", "---\ntitle: Home\n---\n# Welcome\n");

        let builder = StaticBuilder::new(fixture.config(SiteConfig::default()));
        let result = builder.build().await.unwrap();

        assert_eq!(result.pages, 1);
        assert!(result.warnings.is_empty());
        assert!(fixture.out.join("index.html").exists());
        assert!(fixture.out.join("assets/main.css").exists());
        assert!(fixture.out.join("sitemap.xml").exists());
        assert!(fixture.out.join("robots.txt").exists());
    }

    #[tokio::test]
    async fn substitutes_variables_in_pages() {
        let fixture = Fixture::new();
        fixture.write_doc(
            "index.md",
            "# Home\n\nCurrent release is {@version@}.\n\n```shell\ndocker pull questdb/questdb:{@version@}\n```\n\n[Download]({@downloadUrl@})\n",
        );

        let site = site_with_fields(&[("version", "7.3.1"), ("downloadUrl", "https://questdb.io/get")]);
        StaticBuilder::new(fixture.config(site)).build().await.unwrap();

        let html = fixture.read("index.html");
        assert!(html.contains("Current release is 7.3.1."));
        assert!(html.contains("questdb:7.3.1"));
        assert!(html.contains(r#"href="https://questdb.io/get""#));
        assert!(!html.contains("{@"));
    }

    #[tokio::test]
    async fn warns_about_missing_variables() {
        let fixture = Fixture::new();
        fixture.write_doc("index.md", "# Home\n\nSee {@nope@}.\n");

        let result = StaticBuilder::new(fixture.config(SiteConfig::default()))
            .build()
            .await
            .unwrap();

        assert_eq!(result.warnings, vec!["index.md: {@nope@}".to_string()]);
        assert!(fixture.read("index.html").contains("See {@nope@}."));
    }

    #[tokio::test]
    async fn throws_on_missing_variables_when_configured() {
        let fixture = Fixture::new();
        fixture.write_doc("index.md", "# Home\n\nSee {@nope@}.\n");

        let mut site = SiteConfig::default();
        site.site.on_missing_variables = ReportLevel::Throw;

        let err = StaticBuilder::new(fixture.config(site))
            .build()
            .await
            .unwrap_err();

        assert!(matches!(err, BuildError::MissingVariables(ref names) if names.len() == 1));
    }

    #[tokio::test]
    async fn resolves_markdown_file_links() {
        let fixture = Fixture::new();
        fixture.write_doc("index.md", "# Home\n\n[Ingest](guides/ingestion.md#ilp)\n");
        fixture.write_doc("guides/ingestion.md", "# Ingestion\n\n[Back](../index.md)\n");

        let result = StaticBuilder::new(fixture.config(SiteConfig::default()))
            .build()
            .await
            .unwrap();

        assert_eq!(result.pages, 2);
        assert!(result.warnings.is_empty());
        assert!(fixture.read("index.html").contains(r#"href="/guides/ingestion/#ilp""#));
        assert!(fixture.out.join("guides/ingestion/index.html").exists());
    }

    #[tokio::test]
    async fn fails_on_broken_links() {
        let fixture = Fixture::new();
        fixture.write_doc("index.md", "# Home\n\n[Gone](/missing/)\n");

        let err = StaticBuilder::new(fixture.config(SiteConfig::default()))
            .build()
            .await
            .unwrap_err();

        match err {
            BuildError::BrokenLinks(links) => {
                assert_eq!(links, vec!["index.md links to /missing/".to_string()])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn links_to_static_files_are_not_broken() {
        let fixture = Fixture::new();
        fs::create_dir_all(fixture.static_dir.join("img")).unwrap();
        fs::write(fixture.static_dir.join("img/logo.svg"), "<svg/>").unwrap();
        fixture.write_doc("index.md", "# Home\n\n[Logo](/img/logo.svg)\n");

        StaticBuilder::new(fixture.config(SiteConfig::default()))
            .build()
            .await
            .unwrap();

        assert!(fixture.out.join("img/logo.svg").exists());
    }

    #[tokio::test]
    async fn skips_drafts_unless_included() {
        let fixture = Fixture::new();
        fixture.write_doc("index.md", "# Home\n");
        fixture.write_doc("wip.md", "---\ndraft: true\n---\n# Work in progress\n");

        let result = StaticBuilder::new(fixture.config(SiteConfig::default()))
            .build()
            .await
            .unwrap();
        assert_eq!(result.pages, 1);
        assert!(!fixture.out.join("wip/index.html").exists());

        let mut config = fixture.config(SiteConfig::default());
        config.include_drafts = true;
        let result = StaticBuilder::new(config).build().await.unwrap();
        assert_eq!(result.pages, 2);
        assert!(fixture.out.join("wip/index.html").exists());
    }

    #[tokio::test]
    async fn generates_search_index() {
        let fixture = Fixture::new();
        fixture.write_doc("index.mdx", "---\ntitle: Test\n---\n# Searchable {@product@}");

        let site = site_with_fields(&[("product", "QuestDB")]);
        StaticBuilder::new(fixture.config(site)).build().await.unwrap();

        let index = fixture.read("search-index.json");
        assert!(index.contains("Test"));
        assert!(index.contains("Searchable QuestDB"));

        let page = fixture.read("index.html");
        assert!(page.contains("Searchable QuestDB</h1>"));
        assert!(!page.contains("@product@"));
    }

    #[tokio::test]
    async fn writes_manifest_and_sitemap() {
        let fixture = Fixture::new();
        fixture.write_doc("index.md", "# Home\n");
        fixture.write_doc("concepts/storage.md", "# Storage\n");

        let mut site = SiteConfig::default();
        site.site.url = "https://questdb.io".to_string();
        site.pwa = PwaConfig {
            enabled: true,
            ..Default::default()
        };

        StaticBuilder::new(fixture.config(site)).build().await.unwrap();

        let sitemap = fixture.read("sitemap.xml");
        assert!(sitemap.contains("<loc>https://questdb.io/concepts/storage/</loc>"));
        assert!(fixture.read("manifest.webmanifest").contains("\"display\": \"standalone\""));
        assert!(fixture.read("index.html").contains(r#"rel="manifest""#));
    }

    #[tokio::test]
    async fn uses_first_heading_as_title() {
        let fixture = Fixture::new();
        fixture.write_doc("index.md", "# {@product@} docs\n");

        let site = site_with_fields(&[("product", "QuestDB")]);
        StaticBuilder::new(fixture.config(site)).build().await.unwrap();

        assert!(fixture.read("index.html").contains("<title>QuestDB docs | Documentation</title>"));
    }

    #[test]
    fn calculates_output_paths() {
        let builder = StaticBuilder::new(BuildConfig::default());
        let fm = Frontmatter::default();

        assert_eq!(
            builder.calculate_output_path(Path::new("index.md"), &fm),
            PathBuf::from("dist/index.html")
        );
        assert_eq!(
            builder.calculate_output_path(Path::new("guides/intro.mdx"), &fm),
            PathBuf::from("dist/guides/intro/index.html")
        );

        let slugged = Frontmatter {
            slug: Some("/custom/path".to_string()),
            ..Default::default()
        };
        assert_eq!(
            builder.calculate_output_path(Path::new("x.md"), &slugged),
            PathBuf::from("dist/custom/path/index.html")
        );
        assert_eq!(
            builder.path_to_url(Path::new("dist/custom/path/index.html")),
            "/custom/path/"
        );
    }
}
