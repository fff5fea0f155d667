//! Site configuration.
//!
//! Deserialised from the site sections of `docs.toml`. Every section has
//! defaults, so an empty file yields a working site.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How a build reacts to a recoverable content problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportLevel {
    Ignore,
    #[default]
    Warn,
    Throw,
}

/// All site sections of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub site: SiteMeta,

    /// Values for `{@name@}` placeholders
    #[serde(default)]
    pub custom_fields: BTreeMap<String, String>,

    #[serde(default)]
    pub navbar: NavbarConfig,

    #[serde(default)]
    pub footer: FooterConfig,

    #[serde(default)]
    pub theme: ThemeConfig,

    #[serde(default)]
    pub analytics: AnalyticsConfig,

    #[serde(default)]
    pub pwa: PwaConfig,

    #[serde(default)]
    pub sitemap: SitemapConfig,

    #[serde(default)]
    pub markdown: MarkdownConfig,
}

/// Site metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteMeta {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default)]
    pub tagline: Option<String>,

    /// Production origin, e.g. `https://questdb.io`
    #[serde(default)]
    pub url: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub favicon: Option<String>,

    /// Default social card image
    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub organization_name: Option<String>,

    #[serde(default)]
    pub project_name: Option<String>,

    #[serde(default = "default_throw")]
    pub on_broken_links: ReportLevel,

    #[serde(default)]
    pub on_broken_markdown_links: ReportLevel,

    #[serde(default)]
    pub on_missing_variables: ReportLevel,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            title: default_title(),
            tagline: None,
            url: String::new(),
            base_url: default_base_url(),
            favicon: None,
            image: None,
            organization_name: None,
            project_name: None,
            on_broken_links: default_throw(),
            on_broken_markdown_links: ReportLevel::Warn,
            on_missing_variables: ReportLevel::Warn,
        }
    }
}

/// Top navigation bar.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NavbarConfig {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub logo: Option<Logo>,

    #[serde(default)]
    pub items: Vec<NavbarItemConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Logo {
    #[serde(default)]
    pub alt: String,
    pub src: String,
}

/// Navbar entry: a link or, with `items`, a dropdown.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NavbarItemConfig {
    pub label: String,

    /// Internal path, prefixed with the base URL
    #[serde(default)]
    pub to: Option<String>,

    /// External URL, used as-is
    #[serde(default)]
    pub href: Option<String>,

    #[serde(default)]
    pub position: Position,

    #[serde(default)]
    pub class_name: Option<String>,

    #[serde(default)]
    pub aria_label: Option<String>,

    /// Marks the item active when it matches the page URL
    #[serde(default)]
    pub active_base_regex: Option<String>,

    #[serde(default)]
    pub items: Vec<NavbarItemConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Left,
    Right,
}

/// Footer link columns.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FooterConfig {
    #[serde(default)]
    pub links: Vec<FooterColumnConfig>,

    #[serde(default)]
    pub copyright: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FooterColumnConfig {
    pub title: String,

    #[serde(default)]
    pub items: Vec<FooterLinkConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FooterLinkConfig {
    pub label: String,

    #[serde(default)]
    pub to: Option<String>,

    #[serde(default)]
    pub href: Option<String>,
}

/// Look and feel.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThemeConfig {
    /// Stylesheets copied into `assets/` and linked from every page
    #[serde(default)]
    pub custom_css: Vec<String>,

    #[serde(default)]
    pub color_mode: ColorModeConfig,

    #[serde(default)]
    pub announcement_bar: Option<AnnouncementBar>,

    #[serde(default)]
    pub prism: PrismConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ColorModeConfig {
    #[serde(default)]
    pub default_mode: ColorMode,

    #[serde(default)]
    pub disable_switch: bool,

    #[serde(default)]
    pub respect_prefers_color_scheme: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnnouncementBar {
    /// Used as the storage key when the bar is dismissed
    pub id: String,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub background_color: Option<String>,

    #[serde(default)]
    pub text_color: Option<String>,

    #[serde(default = "default_true")]
    pub is_closeable: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrismConfig {
    #[serde(default)]
    pub default_language: Option<String>,
}

/// Analytics snippets added to every page.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnalyticsConfig {
    #[serde(default)]
    pub gtag: Option<GtagConfig>,

    #[serde(default)]
    pub posthog: Option<PosthogConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GtagConfig {
    pub tracking_id: String,

    #[serde(default)]
    pub anonymize_ip: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PosthogConfig {
    /// Snippet is only emitted when a key is set
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_posthog_host")]
    pub api_host: String,
}

impl Default for PosthogConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_host: default_posthog_host(),
        }
    }
}

/// Progressive web app manifest and head tags.
#[derive(Debug, Clone, Deserialize)]
pub struct PwaConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub short_name: Option<String>,

    #[serde(default = "default_theme_color")]
    pub theme_color: String,

    #[serde(default = "default_background_color")]
    pub background_color: String,

    #[serde(default = "default_display")]
    pub display: String,

    #[serde(default)]
    pub icons: Vec<PwaIcon>,

    #[serde(default)]
    pub head: Vec<HeadTag>,
}

impl Default for PwaConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            name: None,
            short_name: None,
            theme_color: default_theme_color(),
            background_color: default_background_color(),
            display: default_display(),
            icons: Vec::new(),
            head: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PwaIcon {
    pub src: String,
    pub sizes: String,
    #[serde(default = "default_icon_type", rename = "type")]
    pub mime_type: String,
}

/// An element injected into `<head>`, e.g. `<link rel="manifest" ...>`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HeadTag {
    pub tag_name: String,

    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
}

/// sitemap.xml settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SitemapConfig {
    #[serde(default = "default_changefreq")]
    pub changefreq: String,

    #[serde(default = "default_priority")]
    pub priority: f32,

    #[serde(default = "default_true")]
    pub trailing_slash: bool,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            changefreq: default_changefreq(),
            priority: default_priority(),
            trailing_slash: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkdownConfig {
    #[serde(default = "default_true")]
    pub math: bool,

    /// Show an estimated reading time above each page
    #[serde(default)]
    pub show_reading_time: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            math: true,
            show_reading_time: false,
        }
    }
}

fn default_title() -> String {
    "Documentation".to_string()
}
fn default_base_url() -> String {
    "/".to_string()
}
fn default_throw() -> ReportLevel {
    ReportLevel::Throw
}
fn default_true() -> bool {
    true
}
fn default_posthog_host() -> String {
    "https://app.posthog.com".to_string()
}
fn default_theme_color() -> String {
    "#21222c".to_string()
}
fn default_background_color() -> String {
    "#21222c".to_string()
}
fn default_display() -> String {
    "standalone".to_string()
}
fn default_icon_type() -> String {
    "image/png".to_string()
}
fn default_changefreq() -> String {
    "daily".to_string()
}
fn default_priority() -> f32 {
    0.7
}
