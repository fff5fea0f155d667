//! Asset pipeline for CSS, JavaScript and the web app manifest.

use crate::config::{PwaConfig, SiteMeta};

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Generate the main CSS file.
    pub fn generate_css() -> String {
        DEFAULT_CSS.to_string()
    }

    /// Generate the main JavaScript file.
    pub fn generate_js() -> String {
        DEFAULT_JS.to_string()
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }

    /// Generate `manifest.webmanifest` for installable sites.
    pub fn generate_manifest(pwa: &PwaConfig, site: &SiteMeta) -> Result<String, serde_json::Error> {
        let name = pwa.name.clone().unwrap_or_else(|| site.title.clone());
        let short_name = pwa.short_name.clone().unwrap_or_else(|| name.clone());

        let manifest = serde_json::json!({
            "name": name,
            "short_name": short_name,
            "description": site.tagline,
            "start_url": site.base_url,
            "scope": site.base_url,
            "display": pwa.display,
            "theme_color": pwa.theme_color,
            "background_color": pwa.background_color,
            "icons": pwa.icons,
        });

        serde_json::to_string_pretty(&manifest)
    }
}

const DEFAULT_CSS: &str = r#"/* folio default theme */

:root {
  --sidebar-width: 280px;
  --toc-width: 200px;
  --content-max-width: 800px;
  --navbar-height: 60px;
  --background: #ffffff;
  --foreground: #1c1e21;
  --muted: #f5f6f7;
  --muted-foreground: #606770;
  --border: #dadde1;
  --primary: #d14671;
  --primary-foreground: #ffffff;
  --card: #f6f8fa;
  --radius: 0.375rem;
}

[data-theme="dark"] {
  --background: #21222c;
  --foreground: #f8f8f2;
  --muted: #262833;
  --muted-foreground: #bbbbbb;
  --border: #3a3d4c;
  --primary: #d14671;
  --primary-foreground: #ffffff;
  --card: #191a21;
}

* {
  box-sizing: border-box;
  margin: 0;
  padding: 0;
}

body {
  font-family: var(--font-sans, system-ui, -apple-system, sans-serif);
  background: var(--background);
  color: var(--foreground);
  line-height: 1.6;
}

/* Announcement bar */
.announcement {
  display: flex;
  align-items: center;
  justify-content: center;
  gap: 1rem;
  padding: 0.5rem 1rem;
  background: var(--primary);
  color: var(--primary-foreground);
  font-size: 0.875rem;
}

.announcement.hidden {
  display: none;
}

.announcement-close {
  background: none;
  border: none;
  color: inherit;
  font-size: 1.25rem;
  cursor: pointer;
}

/* Navbar */
.navbar {
  display: flex;
  align-items: center;
  gap: 1.5rem;
  height: var(--navbar-height);
  padding: 0 1.5rem;
  border-bottom: 1px solid var(--border);
  background: var(--background);
  position: sticky;
  top: 0;
  z-index: 40;
}

.navbar-brand {
  display: flex;
  align-items: center;
  gap: 0.5rem;
  font-weight: 700;
  color: var(--foreground);
  text-decoration: none;
}

.navbar-logo {
  height: 32px;
}

.navbar-items {
  display: flex;
  align-items: center;
  gap: 1rem;
}

.navbar-right {
  margin-left: auto;
}

.navbar-link {
  color: var(--foreground);
  text-decoration: none;
  font-weight: 500;
}

.navbar-link.active,
.navbar-link:hover {
  color: var(--primary);
}

.navbar-dropdown {
  position: relative;
}

.dropdown-menu {
  display: none;
  position: absolute;
  top: 100%;
  left: 0;
  min-width: 12rem;
  list-style: none;
  padding: 0.5rem;
  background: var(--background);
  border: 1px solid var(--border);
  border-radius: var(--radius);
}

.navbar-dropdown:hover .dropdown-menu {
  display: block;
}

.dropdown-menu .navbar-link {
  display: block;
  padding: 0.25rem 0.5rem;
}

.color-mode-toggle {
  background: none;
  border: none;
  color: var(--foreground);
  font-size: 1.25rem;
  cursor: pointer;
}

.layout {
  display: grid;
  grid-template-columns: var(--sidebar-width) 1fr;
  min-height: calc(100vh - var(--navbar-height));
}

/* Sidebar */
.sidebar {
  background: var(--muted);
  border-right: 1px solid var(--border);
  padding: 1.5rem;
  position: sticky;
  top: var(--navbar-height);
  height: calc(100vh - var(--navbar-height));
  overflow-y: auto;
}

.nav-list {
  list-style: none;
}

.nav-item {
  margin-bottom: 0.25rem;
}

.nav-item a {
  display: block;
  padding: 0.5rem 0.75rem;
  color: var(--muted-foreground);
  text-decoration: none;
  border-radius: var(--radius);
  transition: background 0.15s, color 0.15s;
}

.nav-item a:hover {
  background: var(--border);
  color: var(--foreground);
}

.nav-item.active > a {
  background: var(--primary);
  color: var(--primary-foreground);
}

.nav-children {
  list-style: none;
  margin-left: 1rem;
  margin-top: 0.25rem;
}

/* Main content */
.main {
  display: grid;
  grid-template-columns: 1fr var(--toc-width);
  gap: 2rem;
  padding: 2rem;
  max-width: calc(var(--content-max-width) + var(--toc-width) + 4rem);
}

.doc {
  max-width: var(--content-max-width);
}

.reading-time {
  font-size: 0.875rem;
  color: var(--muted-foreground);
  margin-bottom: 1rem;
}

.content h1 {
  font-size: 2.5rem;
  font-weight: 700;
  margin-bottom: 1.5rem;
}

.content h2 {
  font-size: 1.5rem;
  font-weight: 600;
  margin: 2rem 0 1rem;
  padding-bottom: 0.5rem;
  border-bottom: 1px solid var(--border);
}

.content h3 {
  font-size: 1.25rem;
  font-weight: 600;
  margin: 1.5rem 0 0.75rem;
}

.content p,
.content ul,
.content ol,
.content table {
  margin-bottom: 1rem;
}

.content ul,
.content ol {
  padding-left: 1.5rem;
}

.content a {
  color: var(--primary);
  text-decoration: underline;
  text-underline-offset: 4px;
}

.content table {
  border-collapse: collapse;
}

.content th,
.content td {
  border: 1px solid var(--border);
  padding: 0.5rem 0.75rem;
}

/* Code blocks */
.code-block-title {
  font-family: var(--font-mono, ui-monospace, monospace);
  font-size: 0.8rem;
  padding: 0.5rem 1rem;
  background: var(--muted);
  border: 1px solid var(--border);
  border-bottom: none;
  border-radius: var(--radius) var(--radius) 0 0;
}

.code-block-title + pre,
.code-block-title + .line-numbers > pre {
  border-top-left-radius: 0;
  border-top-right-radius: 0;
}

.content pre {
  background: var(--card);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 1rem;
  overflow-x: auto;
  font-family: var(--font-mono, ui-monospace, monospace);
  font-size: 0.875rem;
  margin-bottom: 1rem;
  position: relative;
}

.content code {
  font-family: var(--font-mono, ui-monospace, monospace);
  font-size: 0.875em;
  background: var(--muted);
  padding: 0.125rem 0.375rem;
  border-radius: 0.25rem;
}

.content pre code {
  background: none;
  padding: 0;
}

.line-numbers code {
  counter-reset: line;
}

.line-numbers .line::before {
  counter-increment: line;
  content: counter(line);
  display: inline-block;
  width: 2em;
  margin-right: 1em;
  text-align: right;
  opacity: 0.5;
  user-select: none;
}

.copy-btn {
  position: absolute;
  top: 0.5rem;
  right: 0.5rem;
  padding: 0.25rem 0.75rem;
  font-size: 0.75rem;
  font-weight: 500;
  background: var(--muted);
  color: var(--foreground);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  cursor: pointer;
}

/* Table of contents */
.toc {
  position: sticky;
  top: calc(var(--navbar-height) + 2rem);
  align-self: start;
}

.toc h2 {
  font-size: 0.75rem;
  font-weight: 600;
  text-transform: uppercase;
  letter-spacing: 0.05em;
  color: var(--muted-foreground);
  margin-bottom: 0.75rem;
}

.toc ul {
  list-style: none;
}

.toc a {
  font-size: 0.875rem;
  color: var(--muted-foreground);
  text-decoration: none;
}

.toc a:hover {
  color: var(--foreground);
}

.toc-level-3 {
  padding-left: 1rem;
}

/* Footer */
.footer {
  padding: 3rem 2rem;
  background: var(--card);
  border-top: 1px solid var(--border);
}

.footer-links {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
  gap: 2rem;
}

.footer-column h3 {
  font-size: 0.875rem;
  text-transform: uppercase;
  margin-bottom: 0.75rem;
}

.footer-column ul {
  list-style: none;
}

.footer-column a {
  color: var(--muted-foreground);
  text-decoration: none;
  line-height: 2;
}

.footer-copyright {
  margin-top: 2rem;
  text-align: center;
  font-size: 0.875rem;
  color: var(--muted-foreground);
}

.menu-btn {
  display: none;
  background: none;
  border: none;
  color: var(--foreground);
  font-size: 1.25rem;
  cursor: pointer;
}

/* Responsive */
@media (max-width: 1024px) {
  .layout {
    grid-template-columns: 1fr;
  }

  .sidebar {
    position: fixed;
    left: -100%;
    z-index: 50;
    transition: left 0.3s;
    width: var(--sidebar-width);
  }

  .sidebar.open {
    left: 0;
  }

  .main {
    grid-template-columns: 1fr;
  }

  .toc,
  .navbar-left {
    display: none;
  }

  .menu-btn {
    display: block;
  }
}
"#;

const DEFAULT_JS: &str = r#"// folio runtime
(function() {
  'use strict';

  // Mobile menu toggle
  const menuBtn = document.querySelector('.menu-btn');
  const sidebar = document.querySelector('.sidebar');

  if (menuBtn && sidebar) {
    menuBtn.addEventListener('click', () => {
      sidebar.classList.toggle('open');
    });
  }

  // Color mode switch
  const toggle = document.querySelector('.color-mode-toggle');
  if (toggle) {
    toggle.addEventListener('click', () => {
      const root = document.documentElement;
      const next = root.getAttribute('data-theme') === 'dark' ? 'light' : 'dark';
      root.setAttribute('data-theme', next);
      try { localStorage.setItem('theme', next); } catch (e) {}
    });
  }

  // Announcement bar dismissal, remembered per bar id
  const bar = document.querySelector('.announcement');
  if (bar) {
    const key = 'announcement-dismiss-' + bar.dataset.id;
    try {
      if (localStorage.getItem(key) === 'true') { bar.classList.add('hidden'); }
    } catch (e) {}

    const close = bar.querySelector('.announcement-close');
    if (close) {
      close.addEventListener('click', () => {
        bar.classList.add('hidden');
        try { localStorage.setItem(key, 'true'); } catch (e) {}
      });
    }
  }

  // Line numbers for `showLineNumbers` blocks
  document.querySelectorAll('.content .line-numbers pre code').forEach(code => {
    const lines = code.textContent.replace(/\n$/, '').split('\n');
    code.textContent = '';
    lines.forEach(line => {
      const span = document.createElement('span');
      span.className = 'line';
      span.textContent = line + '\n';
      code.appendChild(span);
    });
  });

  // Copy code button for pre blocks
  document.querySelectorAll('.content pre').forEach(pre => {
    if (pre.querySelector('.copy-btn')) return;

    const btn = document.createElement('button');
    btn.className = 'copy-btn';
    btn.textContent = 'Copy';
    btn.setAttribute('type', 'button');

    btn.addEventListener('click', async () => {
      const code = pre.querySelector('code');
      const text = code ? code.textContent : pre.textContent;

      try {
        await navigator.clipboard.writeText(text || '');
        btn.textContent = 'Copied!';
      } catch (err) {
        btn.textContent = 'Error';
      }
      setTimeout(() => { btn.textContent = 'Copy'; }, 2000);
    });

    pre.appendChild(btn);
  });
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PwaIcon;

    #[test]
    fn generates_css() {
        let css = AssetPipeline::generate_css();
        assert!(css.contains(":root"));
        assert!(css.contains("[data-theme=\"dark\"]"));
        assert!(css.contains(".navbar"));
        assert!(css.contains(".footer"));
    }

    #[test]
    fn generates_js() {
        let js = AssetPipeline::generate_js();
        assert!(js.contains("clipboard"));
        assert!(js.contains("data-theme"));
        assert!(js.contains("announcement-dismiss-"));
        assert!(js.contains(".line-numbers pre code"));
    }

    #[test]
    fn minifies_css() {
        let css = r#"
.button {
    background-color: blue;
    padding: 10px;
}
        "#;

        let minified = AssetPipeline::minify_css(css).unwrap();

        assert!(!minified.contains('\n'));
        assert!(minified.contains(".button"));
    }

    #[test]
    fn minifies_default_theme() {
        assert!(AssetPipeline::minify_css(&AssetPipeline::generate_css()).is_ok());
    }

    #[test]
    fn generates_manifest() {
        let site = SiteMeta {
            title: "QuestDB".to_string(),
            tagline: Some("Time series database".to_string()),
            ..Default::default()
        };
        let pwa = PwaConfig {
            enabled: true,
            theme_color: "#d14671".to_string(),
            icons: vec![PwaIcon {
                src: "/img/icon-192.png".to_string(),
                sizes: "192x192".to_string(),
                mime_type: "image/png".to_string(),
            }],
            ..Default::default()
        };

        let manifest = AssetPipeline::generate_manifest(&pwa, &site).unwrap();
        let value: serde_json::Value = serde_json::from_str(&manifest).unwrap();

        assert_eq!(value["name"], "QuestDB");
        assert_eq!(value["short_name"], "QuestDB");
        assert_eq!(value["start_url"], "/");
        assert_eq!(value["theme_color"], "#d14671");
        assert_eq!(value["icons"][0]["type"], "image/png");
        assert_eq!(value["icons"][0]["sizes"], "192x192");
    }
}
