//! Theme templates.
//!
//! A theme lives at `templates/<name>/` and consists of three files:
//! `layout.html` renders a whole page and typically includes the
//! `header.html` and `footer.html` partials.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use minijinja::{Environment, Value};
use nibl_config::SiteConfig;
use serde::Serialize;

/// Template rendered once per page.
pub const LAYOUT: &str = "layout.html";
/// Files every theme must provide.
pub const THEME_FILES: [&str; 3] = [LAYOUT, "header.html", "footer.html"];

/// Error loading a theme.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// A theme file could not be read.
    #[error("Failed to read template {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A theme file has a syntax error.
    #[error("Failed to parse template {name}: {source}")]
    Syntax {
        name: &'static str,
        #[source]
        source: minijinja::Error,
    },
}

/// Values exposed to `layout.html`.
#[derive(Debug, Serialize)]
pub struct PageContext<'a> {
    /// Rendered page body, inserted without escaping.
    pub content: Value,
    pub title: &'a str,
    pub base_href: String,
    pub author: &'a str,
    pub description: &'a str,
    pub site: &'a SiteConfig,
    pub show_edit_ml: bool,
    pub story_title: &'a str,
    pub params: &'a BTreeMap<String, serde_yaml::Value>,
}

/// A loaded theme, ready to render pages.
#[derive(Debug)]
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Load the theme `theme` from `template_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] if a theme file is missing or malformed.
    pub fn load(template_dir: &Path, theme: &str) -> Result<Self, TemplateError> {
        let theme_dir = template_dir.join(theme);
        let mut sources = Vec::with_capacity(THEME_FILES.len());
        for name in THEME_FILES {
            let path = theme_dir.join(name);
            let source = std::fs::read_to_string(&path)
                .map_err(|source| TemplateError::Read { path, source })?;
            sources.push((name, source));
        }
        Self::from_sources(sources)
    }

    /// Build a theme from in-memory sources.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Syntax`] if a source does not parse.
    pub fn from_sources(
        sources: impl IntoIterator<Item = (&'static str, String)>,
    ) -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        for (name, source) in sources {
            env.add_template_owned(name, source)
                .map_err(|source| TemplateError::Syntax { name, source })?;
        }
        Ok(Self { env })
    }

    /// Render a page through the layout template.
    ///
    /// # Errors
    ///
    /// Returns the template engine error on a missing layout or a failed
    /// expression.
    pub fn render(&self, context: &PageContext<'_>) -> Result<String, minijinja::Error> {
        self.env.get_template(LAYOUT)?.render(context)
    }
}
