//! sitemap.xml and robots.txt generation.

use crate::config::SitemapConfig;

/// Render a sitemap for page URL paths.
///
/// `site_url` is the production origin; paths already include the base URL.
pub fn render_sitemap(site_url: &str, paths: &[String], config: &SitemapConfig) -> String {
    let origin = site_url.trim_end_matches('/');

    let urls: Vec<String> = paths
        .iter()
        .map(|path| {
            let path = apply_trailing_slash(path, config.trailing_slash);
            format!(
                "  <url>\n    <loc>{}{}</loc>\n    <changefreq>{}</changefreq>\n    <priority>{:.1}</priority>\n  </url>",
                origin,
                escape_xml(&path),
                config.changefreq,
                config.priority
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{}
</urlset>"#,
        urls.join("\n")
    )
}

/// Render robots.txt pointing at the sitemap.
pub fn render_robots(site_url: &str, base_url: &str) -> String {
    format!(
        "User-agent: *\nAllow: /\nSitemap: {}{}sitemap.xml\n",
        site_url.trim_end_matches('/'),
        base_url
    )
}

fn apply_trailing_slash(path: &str, trailing_slash: bool) -> String {
    let trimmed = path.trim_end_matches('/');
    if trailing_slash || trimmed.is_empty() {
        format!("{trimmed}/")
    } else {
        trimmed.to_string()
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_entries_with_frequency_and_priority() {
        let paths = vec!["/".to_string(), "/docs/intro/".to_string()];

        let xml = render_sitemap("https://questdb.io/", &paths, &SitemapConfig::default());

        assert!(xml.contains("<loc>https://questdb.io/</loc>"));
        assert!(xml.contains("<loc>https://questdb.io/docs/intro/</loc>"));
        assert!(xml.contains("<changefreq>daily</changefreq>"));
        assert!(xml.contains("<priority>0.7</priority>"));
    }

    #[test]
    fn drops_trailing_slash_when_disabled() {
        let config = SitemapConfig {
            trailing_slash: false,
            ..Default::default()
        };

        let xml = render_sitemap("https://example.com", &["/docs/intro/".to_string()], &config);

        assert!(xml.contains("<loc>https://example.com/docs/intro</loc>"));
    }

    #[test]
    fn renders_robots() {
        assert_eq!(
            render_robots("https://example.com", "/"),
            "User-agent: *\nAllow: /\nSitemap: https://example.com/sitemap.xml\n"
        );
    }
}
