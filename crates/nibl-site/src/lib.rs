//! Static site generation for nibl.
//!
//! Walks the content directory, renders each markdown or HTML document
//! through the active theme and copies allow-listed static assets:
//!
//! ```text
//! content/story/one.md ──► front matter ──► markdown ──► sanitize ──► layout.html ──► public/story/one.html
//! static/css/site.css  ─────────────────────────────────────────────────────────────► public/css/site.css
//! ```
//!
//! # Example
//!
//! ```ignore
//! use nibl_config::ProjectLayout;
//! use nibl_site::{BuildOptions, SitePaths, Templates, build_site};
//!
//! let layout = ProjectLayout::new(".");
//! let site = layout.load_site_config()?;
//! let templates = Templates::load(&layout.template_dir, &site.template)?;
//! let pages = build_site(&SitePaths::from(&layout), &site, &templates, BuildOptions::default())?;
//! ```

use std::path::PathBuf;

pub mod assets;
mod builder;
pub mod front_matter;
pub mod markdown;
mod page;
pub mod sanitize;
mod templates;

pub use builder::{BuildOptions, CONTENT_EXTENSIONS, SitePaths, build_site, clean_output, is_content};
pub use front_matter::FrontMatter;
pub use page::{ALWAYS_EMIT, Page, base_href, slug};
pub use templates::{LAYOUT, PageContext, THEME_FILES, TemplateError, Templates};

/// Error building the site. File-level variants name the offending file.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Content directory not found: {}", .0.display())]
    MissingContentDir(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid UTF-8", path.display())]
    InvalidUtf8 { path: PathBuf },

    #[error("Invalid front matter in {}: {source}", path.display())]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to render {}: {source}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: minijinja::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to clean {}: {source}", path.display())]
    Clean {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    Template(#[from] TemplateError),
}
