//! docs.toml loading.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use folio_static::config::PosthogConfig;
use folio_static::{BuildConfig, SiteConfig};

/// Configuration file structure (docs.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub docs: DocsConfig,

    #[serde(default)]
    pub build: BuildSettings,

    /// `[site]`, `[custom_fields]`, `[navbar]` and the other site sections
    #[serde(flatten)]
    pub site: SiteConfig,
}

#[derive(Debug, Deserialize)]
pub struct DocsConfig {
    #[serde(default = "default_docs_dir")]
    pub dir: String,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            dir: default_docs_dir(),
            output: default_output(),
            static_dir: default_static_dir(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BuildSettings {
    #[serde(default = "default_minify")]
    pub minify: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            minify: default_minify(),
        }
    }
}

fn default_docs_dir() -> String {
    "docs".to_string()
}
fn default_output() -> String {
    "dist".to_string()
}
fn default_static_dir() -> String {
    "static".to_string()
}
fn default_minify() -> bool {
    true
}

impl ConfigFile {
    /// Load configuration from `path` if it exists.
    /// Returns an error if the config file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let config = Self::parse(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            tracing::info!("Loaded config from {}", path.display());
            config
        } else {
            tracing::debug!("{} not found, using defaults", path.display());
            Self::default()
        };

        config.apply_env(std::env::var("POSTHOG_API_KEY").ok());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Fill the PostHog key from the environment when the file leaves it unset.
    fn apply_env(&mut self, posthog_api_key: Option<String>) {
        let Some(key) = posthog_api_key.filter(|key| !key.is_empty()) else {
            return;
        };

        let posthog = self
            .site
            .analytics
            .posthog
            .get_or_insert_with(PosthogConfig::default);
        if posthog.api_key.is_none() {
            posthog.api_key = Some(key);
        }
    }

    /// Builder settings, with command-line overrides.
    pub fn build_config(&self, output: Option<PathBuf>, minify: Option<bool>) -> BuildConfig {
        BuildConfig {
            docs_dir: PathBuf::from(&self.docs.dir),
            output_dir: output.unwrap_or_else(|| PathBuf::from(&self.docs.output)),
            static_dir: Some(PathBuf::from(&self.docs.static_dir)),
            minify: minify.unwrap_or(self.build.minify),
            include_drafts: false,
            dev_script: None,
            site: self.site.clone(),
        }
    }
}
