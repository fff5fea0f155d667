//! Initialize documentation in a project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(yes: bool) -> Result<()> {
    tracing::info!("Initializing folio...");

    if scaffold(Path::new("."), yes)? {
        tracing::info!("Initialization complete!");
        tracing::info!("Run 'folio dev' to start the development server.");
    }

    Ok(())
}

/// Write the starter files under `root`. Returns false when nothing was done.
fn scaffold(root: &Path, yes: bool) -> Result<bool> {
    let docs_dir = root.join("docs");

    if docs_dir.exists() {
        if !yes {
            tracing::warn!("docs/ directory already exists. Use --yes to overwrite.");
            return Ok(false);
        }
    } else {
        fs::create_dir_all(&docs_dir).context("Failed to create docs directory")?;
    }

    let files = [
        (root.join("docs.toml"), DEFAULT_CONFIG),
        (docs_dir.join("index.mdx"), DEFAULT_INDEX),
        (docs_dir.join("getting-started.mdx"), DEFAULT_GETTING_STARTED),
    ];

    for (path, content) in files {
        if !path.exists() || yes {
            fs::write(&path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Created {}", path.display());
        }
    }

    let static_dir = root.join("static").join("img");
    if !static_dir.exists() {
        fs::create_dir_all(&static_dir).context("Failed to create static directory")?;
        tracing::info!("Created {}", static_dir.display());
    }

    Ok(true)
}

const DEFAULT_CONFIG: &str = r##"# Folio Configuration

[docs]
# Source directory for documentation
dir = "docs"

# Output directory for built site
output = "dist"

# Copied as-is to the output root
static_dir = "static"

[build]
minify = true

[site]
title = "My Documentation"
tagline = "Docs for my project"
url = "https://example.com"
base_url = "/"
on_broken_links = "throw"
on_broken_markdown_links = "warn"
on_missing_variables = "warn"

# Values for {@name@} placeholders in pages, navbar, footer and announcement bar
[custom_fields]
version = "1.0.0"
githubUrl = "https://github.com/example/project"

[navbar]
title = "My Documentation"

[[navbar.items]]
label = "Docs"
to = "/"

[[navbar.items]]
label = "GitHub"
href = "{@githubUrl@}"
position = "right"

[footer]
copyright = "Copyright © My Project. Version {@version@}."

[[footer.links]]
title = "Community"

[[footer.links.items]]
label = "GitHub"
href = "{@githubUrl@}"

[theme.color_mode]
default_mode = "light"
respect_prefers_color_scheme = true

[sitemap]
changefreq = "daily"
priority = 0.7
"##;

const DEFAULT_INDEX: &str = r#"---
title: Welcome
order: 1
---

# Welcome to Your Documentation

This is your documentation site for version {@version@}, powered by **folio**.

## Getting Started

Check out the [Getting Started](./getting-started.mdx) guide to learn how to use this tool.

The source lives on [GitHub]({@githubUrl@}).
"#;

const DEFAULT_GETTING_STARTED: &str = r#"---
title: Getting Started
order: 2
---

# Getting Started

This guide will help you set up folio for your project.

## Installation

```bash
cargo install folio
```

## Project Structure

```
your-project/
├── docs/                 # Documentation source
│   └── index.mdx         # Home page
├── static/               # Images and other files
└── docs.toml             # Configuration
```

## Variables

Values under `[custom_fields]` in `docs.toml` can be used anywhere in a page
with `{@name@}`. This page was written for version {@version@}:

```bash title="Download"
curl -LO {@githubUrl@}/releases/download/{@version@}/project.tar.gz
```

Unknown names are left as written and reported during the build.

## Development

Start the dev server:

```bash
folio dev
```

## Building

Build for production:

```bash
folio build
```
"#;
