//! Template engine for rendering documentation pages.

use minijinja::Environment;
use serde::Serialize;

use crate::config::{AnalyticsConfig, AnnouncementBar, ColorModeConfig, HeadTag};
use crate::navigation::{Footer, NavItem, Navbar};

/// A table of contents entry.
#[derive(Debug, Clone, Serialize)]
pub struct TocEntry {
    /// Heading text
    pub title: String,
    /// Anchor ID
    pub id: String,
    /// Heading level (1-6)
    pub level: u8,
}

impl From<&folio_mdx::TocEntry> for TocEntry {
    fn from(entry: &folio_mdx::TocEntry) -> Self {
        Self {
            title: entry.title.clone(),
            id: entry.id.clone(),
            level: entry.level,
        }
    }
}

/// Site-wide values shown on every page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteContext {
    pub title: String,
    pub tagline: Option<String>,
    pub url: String,
    pub favicon: Option<String>,
    pub image: Option<String>,
}

/// An element rendered into `<head>`.
#[derive(Debug, Clone, Serialize)]
pub struct HeadElement {
    pub tag_name: String,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl From<&HeadTag> for HeadElement {
    fn from(tag: &HeadTag) -> Self {
        Self {
            tag_name: tag.tag_name.clone(),
            attributes: tag
                .attributes
                .iter()
                .map(|(name, value)| Attribute {
                    name: name.clone(),
                    value: value.clone(),
                })
                .collect(),
        }
    }
}

/// Context for rendering a page template.
#[derive(Debug, Clone, Serialize)]
pub struct Context {
    /// Page title
    pub title: String,
    /// Page description
    pub description: Option<String>,
    /// Site metadata
    pub site: SiteContext,
    /// Absolute URL of this page
    pub canonical_url: String,
    /// Rendered content HTML
    pub content: String,
    /// Sidebar navigation
    pub sidebar: Vec<NavItem>,
    /// Top navigation bar
    pub navbar: Navbar,
    /// Footer link columns
    pub footer: Footer,
    /// Table of contents (levels 2 and 3)
    pub toc: Vec<TocEntry>,
    /// Base URL
    pub base_url: String,
    /// Paths to CSS stylesheets to include
    pub styles: Vec<String>,
    /// Extra `<head>` elements
    pub head_tags: Vec<HeadElement>,
    pub color_mode: ColorModeConfig,
    pub announcement: Option<AnnouncementBar>,
    pub analytics: AnalyticsConfig,
    /// Minutes, when reading time is shown
    pub reading_time: Option<usize>,
    /// Script injected by the dev server
    pub dev_script: Option<String>,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with default templates.
    pub fn new() -> Self {
        let mut env = Environment::new();

        for (name, source) in [
            ("base.html", BASE_TEMPLATE),
            ("doc.html", DOC_TEMPLATE),
            ("nav.html", NAV_TEMPLATE),
            ("navbar.html", NAVBAR_TEMPLATE),
            ("footer.html", FOOTER_TEMPLATE),
        ] {
            env.add_template(name, source)
                .expect("Failed to add built-in template");
        }

        Self { env }
    }

    /// Render a page using the specified template.
    pub fn render_page(&self, template: &str, context: &Context) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template)?;
        tmpl.render(context)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en" data-theme="{{ color_mode.default_mode }}">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{% if title and title != site.title %}{{ title }} | {% endif %}{{ site.title }}</title>
  {% if description %}<meta name="description" content="{{ description }}">
  <meta property="og:description" content="{{ description }}">
  {% endif %}<meta property="og:title" content="{{ title }}">
  {% if site.url %}<link rel="canonical" href="{{ canonical_url }}">
  <meta property="og:url" content="{{ canonical_url }}">
  {% endif %}{% if site.image %}<meta property="og:image" content="{{ site.image }}">
  <meta name="twitter:card" content="summary_large_image">
  {% endif %}{% if site.favicon %}<link rel="icon" href="{{ site.favicon }}">
  {% endif %}{% for tag in head_tags %}<{{ tag.tag_name }}{% for attr in tag.attributes %} {{ attr.name }}="{{ attr.value }}"{% endfor %}>{% if tag.tag_name not in ["link", "meta"] %}</{{ tag.tag_name }}>{% endif %}
  {% endfor %}<script>
    (function() {
      var mode = {{ color_mode.default_mode | tojson }};
      {% if color_mode.respect_prefers_color_scheme %}if (window.matchMedia('(prefers-color-scheme: dark)').matches) { mode = 'dark'; } else { mode = 'light'; }
      {% endif %}{% if not color_mode.disable_switch %}try { mode = localStorage.getItem('theme') || mode; } catch (e) {}
      {% endif %}document.documentElement.setAttribute('data-theme', mode);
    })();
  </script>
  {% for style in styles %}<link rel="stylesheet" href="{{ style }}">
  {% endfor %}<link rel="stylesheet" href="{{ base_url }}assets/main.css">
  {% if analytics.gtag %}<script async src="https://www.googletagmanager.com/gtag/js?id={{ analytics.gtag.tracking_id }}"></script>
  <script>
    window.dataLayer = window.dataLayer || [];
    function gtag() { dataLayer.push(arguments); }
    gtag('js', new Date());
    gtag('config', {{ analytics.gtag.tracking_id | tojson }}, { anonymize_ip: {{ analytics.gtag.anonymize_ip | tojson }} });
  </script>
  {% endif %}{% if analytics.posthog and analytics.posthog.api_key %}<script src="{{ analytics.posthog.api_host }}/static/array.js" async></script>
  <script>
    window.posthog = window.posthog || [];
    window.addEventListener('load', function() {
      if (window.posthog.init) { window.posthog.init({{ analytics.posthog.api_key | tojson }}, { api_host: {{ analytics.posthog.api_host | tojson }} }); }
    });
  </script>
  {% endif %}
</head>
<body>
  {% if announcement %}<div class="announcement" data-id="{{ announcement.id }}"{% if announcement.background_color or announcement.text_color %} style="{% if announcement.background_color %}background: {{ announcement.background_color }};{% endif %}{% if announcement.text_color %}color: {{ announcement.text_color }};{% endif %}"{% endif %}>
    <div class="announcement-content">{{ announcement.content | safe }}</div>
    {% if announcement.is_closeable %}<button class="announcement-close" type="button" aria-label="Close">&times;</button>{% endif %}
  </div>
  {% endif %}{% include "navbar.html" %}
  <div class="layout">
    <nav class="sidebar">
      {% include "nav.html" %}
    </nav>
    <main class="main">
      {% block content %}{% endblock %}
    </main>
  </div>
  {% include "footer.html" %}
  <script src="{{ base_url }}assets/main.js"></script>
  {% if dev_script %}<script src="{{ dev_script }}"></script>
  {% endif %}
</body>
</html>"##;

const DOC_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="doc">
  {% if reading_time %}<div class="reading-time">{{ reading_time }} min read</div>{% endif %}
  <div class="content">
    {{ content | safe }}
  </div>
</article>

{% if toc %}
<aside class="toc">
  <h2>On this page</h2>
  <ul>
  {% for entry in toc %}
    <li class="toc-level-{{ entry.level }}">
      <a href="#{{ entry.id }}">{{ entry.title }}</a>
    </li>
  {% endfor %}
  </ul>
</aside>
{% endif %}
{% endblock %}"##;

const NAV_TEMPLATE: &str = r##"<ul class="nav-list">
{% for item in sidebar %}
  <li class="nav-item{% if item.active %} active{% endif %}">
    <a href="{{ item.path }}">{{ item.title }}</a>
    {% if item.children %}
    <ul class="nav-children">
      {% for child in item.children %}
      <li class="nav-item{% if child.active %} active{% endif %}">
        <a href="{{ child.path }}">{{ child.title }}</a>
      </li>
      {% endfor %}
    </ul>
    {% endif %}
  </li>
{% endfor %}
</ul>"##;

const NAVBAR_TEMPLATE: &str = r##"{% macro navbar_link(item) -%}
<a class="navbar-link{% if item.active %} active{% endif %}{% if item.class_name %} {{ item.class_name }}{% endif %}"{% if item.url %} href="{{ item.url }}"{% endif %}{% if item.external %} target="_blank" rel="noopener noreferrer"{% endif %}{% if item.aria_label %} aria-label="{{ item.aria_label }}"{% endif %}>{{ item.label }}</a>
{%- endmacro %}
<header class="navbar">
  <button class="menu-btn" type="button" aria-label="Toggle navigation">&#9776;</button>
  <a href="{{ base_url }}" class="navbar-brand">
    {% if navbar.logo %}<img src="{{ navbar.logo.src }}" alt="{{ navbar.logo.alt }}" class="navbar-logo">{% endif %}
    <span class="navbar-title">{% if navbar.title %}{{ navbar.title }}{% else %}{{ site.title }}{% endif %}</span>
  </a>
  {% for side in ["left", "right"] %}
  <div class="navbar-items navbar-{{ side }}">
    {% for item in navbar[side] %}
    {% if item.items %}
    <div class="navbar-dropdown{% if item.active %} active{% endif %}">
      {{ navbar_link(item) }}
      <ul class="dropdown-menu">
        {% for child in item.items %}<li>{{ navbar_link(child) }}</li>
        {% endfor %}
      </ul>
    </div>
    {% else %}{{ navbar_link(item) }}{% endif %}
    {% endfor %}
    {% if side == "right" and not color_mode.disable_switch %}<button class="color-mode-toggle" type="button" aria-label="Switch between dark and light mode">&#9680;</button>{% endif %}
  </div>
  {% endfor %}
</header>"##;

const FOOTER_TEMPLATE: &str = r##"{% if footer.columns or footer.copyright %}<footer class="footer">
  <div class="footer-links">
  {% for column in footer.columns %}
    <div class="footer-column">
      <h3>{{ column.title }}</h3>
      <ul>
      {% for link in column.items %}
        <li><a href="{{ link.url }}"{% if link.external %} target="_blank" rel="noopener noreferrer"{% endif %}>{{ link.label }}</a></li>
      {% endfor %}
      </ul>
    </div>
  {% endfor %}
  </div>
  {% if footer.copyright %}<div class="footer-copyright">{{ footer.copyright }}</div>{% endif %}
</footer>{% endif %}"##;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::config::{ColorMode, GtagConfig};
    use crate::navigation::{FooterColumn, FooterLink, NavbarItem};

    fn context() -> Context {
        Context {
            title: "Ingestion".to_string(),
            description: None,
            site: SiteContext {
                title: "My Docs".to_string(),
                ..Default::default()
            },
            canonical_url: "/ingestion/".to_string(),
            content: "<p>Hello world</p>".to_string(),
            sidebar: vec![],
            navbar: Navbar {
                title: None,
                logo: None,
                left: vec![],
                right: vec![],
            },
            footer: Footer {
                columns: vec![],
                copyright: None,
            },
            toc: vec![],
            base_url: "/".to_string(),
            styles: vec![],
            head_tags: vec![],
            color_mode: ColorModeConfig::default(),
            announcement: None,
            analytics: AnalyticsConfig::default(),
            reading_time: None,
            dev_script: None,
        }
    }

    #[test]
    fn renders_basic_page() {
        let engine = TemplateEngine::new();

        let html = engine.render_page("doc.html", &context()).unwrap();

        assert!(html.contains("<title>Ingestion | My Docs</title>"));
        assert!(html.contains("<p>Hello world</p>"));
        assert!(html.contains("data-theme=\"light\""));
        assert!(!html.contains("googletagmanager"));
    }

    #[test]
    fn renders_sidebar() {
        let engine = TemplateEngine::new();
        let mut ctx = context();
        ctx.sidebar = vec![
            NavItem {
                title: "Home".to_string(),
                path: "/".to_string(),
                children: vec![],
                active: true,
            },
            NavItem {
                title: "Reference".to_string(),
                path: "/reference/".to_string(),
                children: vec![NavItem {
                    title: "Functions".to_string(),
                    path: "/reference/functions/".to_string(),
                    children: vec![],
                    active: false,
                }],
                active: false,
            },
        ];

        let html = engine.render_page("doc.html", &ctx).unwrap();

        assert!(html.contains("<li class=\"nav-item active\">"));
        assert!(html.contains("Functions"));
    }

    #[test]
    fn renders_navbar_and_footer() {
        let engine = TemplateEngine::new();
        let mut ctx = context();
        ctx.navbar.right = vec![NavbarItem {
            label: "Star us".to_string(),
            url: Some("https://github.com/questdb/questdb".to_string()),
            external: true,
            class_name: Some("header-github-link".to_string()),
            aria_label: Some("GitHub repository".to_string()),
            active: false,
            items: vec![],
        }];
        ctx.footer = Footer {
            columns: vec![FooterColumn {
                title: "Social".to_string(),
                items: vec![FooterLink {
                    label: "Slack".to_string(),
                    url: "https://slack.questdb.io".to_string(),
                    external: true,
                }],
            }],
            copyright: Some("Copyright QuestDB".to_string()),
        };

        let html = engine.render_page("doc.html", &ctx).unwrap();

        assert!(html.contains("header-github-link"));
        assert!(html.contains("aria-label=\"GitHub repository\""));
        assert!(html.contains("<h3>Social</h3>"));
        assert!(html.contains("slack.questdb.io"));
        assert!(html.contains("Copyright QuestDB"));
    }

    #[test]
    fn renders_head_tags_and_analytics() {
        let engine = TemplateEngine::new();
        let mut ctx = context();
        ctx.head_tags = vec![HeadElement::from(&HeadTag {
            tag_name: "link".to_string(),
            attributes: BTreeMap::from([
                ("rel".to_string(), "manifest".to_string()),
                ("href".to_string(), "/manifest.webmanifest".to_string()),
            ]),
        })];
        ctx.analytics.gtag = Some(GtagConfig {
            tracking_id: "GTM-TEST".to_string(),
            anonymize_ip: true,
        });
        ctx.color_mode.default_mode = ColorMode::Dark;

        let html = engine.render_page("doc.html", &ctx).unwrap();

        assert!(html.contains("<link href=\""));
        assert!(html.contains("manifest.webmanifest\" rel=\"manifest\">"));
        assert!(html.contains("gtag/js?id=GTM-TEST"));
        assert!(html.contains("anonymize_ip: true"));
        assert!(html.contains("data-theme=\"dark\""));
    }

    #[test]
    fn renders_toc_and_reading_time() {
        let engine = TemplateEngine::new();
        let mut ctx = context();
        ctx.toc = vec![
            TocEntry {
                title: "ILP".to_string(),
                id: "ilp".to_string(),
                level: 2,
            },
        ];
        ctx.reading_time = Some(3);

        let html = engine.render_page("doc.html", &ctx).unwrap();

        assert!(html.contains("href=\"#ilp\""));
        assert!(html.contains("On this page"));
        assert!(html.contains("3 min read"));
    }

    #[test]
    fn escapes_text_but_not_content() {
        let engine = TemplateEngine::new();
        let mut ctx = context();
        ctx.title = "<script>".to_string();
        ctx.dev_script = Some("/__hmr.js".to_string());

        let html = engine.render_page("doc.html", &ctx).unwrap();

        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("__hmr.js\"></script>"));
    }
}
