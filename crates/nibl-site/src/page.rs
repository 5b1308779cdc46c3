//! A single content document on its way to the output tree.

use std::path::{Component, Path, PathBuf};

use minijinja::Value;
use nibl_config::SiteConfig;

use crate::front_matter::{self, FrontMatter};
use crate::templates::PageContext;
use crate::{BuildError, markdown, sanitize};

/// Pages emitted even when marked as drafts.
pub const ALWAYS_EMIT: [&str; 3] = ["index", "about", "menu"];

/// A parsed and rendered content document.
#[derive(Debug)]
pub struct Page {
    /// Path relative to the content directory.
    pub source: PathBuf,
    pub front_matter: FrontMatter,
    /// Rendered (and possibly sanitized) body.
    pub html: String,
}

impl Page {
    /// Read, parse and render the document at `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - Absolute path of the document
    /// * `source` - Same path relative to the content directory
    /// * `unsafe_html` - Skip sanitization of the rendered body
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] naming `path` when the file cannot be read,
    /// is not UTF-8 or has malformed front matter.
    pub fn load(path: &Path, source: &Path, unsafe_html: bool) -> Result<Self, BuildError> {
        let bytes = std::fs::read(path).map_err(|source| BuildError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|_| BuildError::InvalidUtf8 {
            path: path.to_path_buf(),
        })?;
        Self::parse(&text, source, unsafe_html).map_err(|source| BuildError::FrontMatter {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse and render document text.
    ///
    /// # Errors
    ///
    /// Returns the YAML error for malformed front matter.
    pub fn parse(
        text: &str,
        source: &Path,
        unsafe_html: bool,
    ) -> Result<Self, serde_yaml::Error> {
        let (front_matter, body) = front_matter::parse(text)?;
        let rendered = markdown::render(body);
        let html = if unsafe_html {
            rendered
        } else {
            sanitize::clean(&rendered)
        };
        Ok(Self {
            source: source.to_path_buf(),
            front_matter,
            html,
        })
    }

    /// Source path without extension, `/`-separated.
    #[must_use]
    pub fn slug(&self) -> String {
        slug(&self.source)
    }

    /// Whether this page produces output.
    #[must_use]
    pub fn is_published(&self) -> bool {
        !self.front_matter.draft || ALWAYS_EMIT.contains(&self.slug().as_str())
    }

    /// Output path relative to the output directory.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.source.with_extension("html")
    }

    /// Template values for this page.
    ///
    /// Story author wins over the site author; an empty description falls
    /// back to the site's.
    #[must_use]
    pub fn context<'a>(&'a self, site: &'a SiteConfig) -> PageContext<'a> {
        let meta = &self.front_matter;
        let author = if meta.story_author.is_empty() {
            &site.author
        } else {
            &meta.story_author
        };
        let description = if meta.description.is_empty() {
            &site.description
        } else {
            &meta.description
        };
        PageContext {
            content: Value::from_safe_string(self.html.clone()),
            title: &meta.title,
            base_href: base_href(&self.source),
            author,
            description,
            site,
            show_edit_ml: meta.show_edit_ml,
            story_title: &meta.story_title,
            params: &meta.params,
        }
    }
}

/// Strip the extension and join components with `/`.
#[must_use]
pub fn slug(relative: &Path) -> String {
    let stem = relative.with_extension("");
    let parts: Vec<_> = stem
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    parts.join("/")
}

/// Relative prefix from a page back to the site root.
///
/// One `../` per directory between the content root and the page.
#[must_use]
pub fn base_href(relative: &Path) -> String {
    let depth = relative
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count()
        .saturating_sub(1);
    "../".repeat(depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page(text: &str, source: &str) -> Page {
        Page::parse(text, Path::new(source), false).unwrap()
    }

    #[test]
    fn test_base_href() {
        assert_eq!(base_href(Path::new("index.md")), "");
        assert_eq!(base_href(Path::new("a/b.md")), "../");
        assert_eq!(base_href(Path::new("a/b/c.md")), "../../");
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug(Path::new("index.md")), "index");
        assert_eq!(slug(Path::new("story/intro/hall.md")), "story/intro/hall");
        assert_eq!(slug(Path::new("about.html")), "about");
    }

    #[test]
    fn test_output_path_swaps_extension() {
        assert_eq!(
            page("x", "a/b.md").output_path(),
            PathBuf::from("a/b.html")
        );
        assert_eq!(
            page("x", "raw.html").output_path(),
            PathBuf::from("raw.html")
        );
    }

    #[test]
    fn test_drafts_hidden() {
        assert!(!page("---\ndraft: true\n---\n", "notes.md").is_published());
        assert!(!page("---\ndraft: true\n---\n", "sub/index.md").is_published());
        assert!(page("---\ndraft: false\n---\n", "notes.md").is_published());
    }

    #[test]
    fn test_drafts_always_emitted() {
        for name in ["index.md", "about.md", "menu.html"] {
            assert!(page("---\ndraft: true\n---\n", name).is_published(), "{name}");
        }
    }

    #[test]
    fn test_render_is_sanitized_by_default() {
        let safe = page("Hi<script>x()</script>", "a.md");
        let raw = Page::parse("Hi<script>x()</script>", Path::new("a.md"), true).unwrap();

        assert!(!safe.html.contains("<script>"));
        assert!(raw.html.contains("<script>x()</script>"));
    }

    #[test]
    fn test_context_fallbacks() {
        let site = SiteConfig {
            author: "Site Author".to_owned(),
            description: "Site description".to_owned(),
            ..SiteConfig::default()
        };
        let plain = page("---\ntitle: T\nauthor: Page Author\n---\nx", "a/b.md");
        let story = page("---\nstory_author: Story Author\ndescription: Mine\n---\nx", "b.md");

        let ctx = plain.context(&site);
        assert_eq!(ctx.author, "Site Author");
        assert_eq!(ctx.description, "Site description");
        assert_eq!(ctx.base_href, "../");
        assert_eq!(ctx.title, "T");

        let ctx = story.context(&site);
        assert_eq!(ctx.author, "Story Author");
        assert_eq!(ctx.description, "Mine");
        assert_eq!(ctx.base_href, "");
    }
}
