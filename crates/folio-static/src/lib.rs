//! Static site generator for folio documentation.
//!
//! Builds a documentation site from markdown files, resolving `{@name@}`
//! placeholders from the site's custom fields.

pub mod assets;
pub mod builder;
pub mod config;
pub mod links;
pub mod navigation;
pub mod sitemap;
pub mod templates;

pub use builder::{BuildConfig, BuildError, BuildResult, StaticBuilder};
pub use config::{ReportLevel, SiteConfig};
