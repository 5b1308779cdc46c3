//! Full site build: content pages plus static assets.

use std::path::{Path, PathBuf};

use nibl_config::{ProjectLayout, SiteConfig};
use walkdir::WalkDir;

use crate::page::Page;
use crate::templates::Templates;
use crate::{BuildError, assets};

/// Extensions treated as content documents.
pub const CONTENT_EXTENSIONS: [&str; 2] = ["md", "html"];

/// Input and output directories for a build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SitePaths {
    pub content_dir: PathBuf,
    pub static_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl From<&ProjectLayout> for SitePaths {
    fn from(layout: &ProjectLayout) -> Self {
        Self {
            content_dir: layout.content_dir.clone(),
            static_dir: layout.static_dir.clone(),
            output_dir: layout.output_dir.clone(),
        }
    }
}

/// Build switches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Empty the output directory before writing.
    pub clean_destination: bool,
    /// Skip HTML sanitization.
    pub unsafe_html: bool,
    /// Log every generated page.
    pub debug: bool,
}

/// Whether `path` is a content document.
#[must_use]
pub fn is_content(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| CONTENT_EXTENSIONS.contains(&ext))
}

/// Build the site into `paths.output_dir`.
///
/// Documents are processed in file name order. Drafts are skipped unless
/// they are always-emitted pages. Static assets are copied last.
///
/// # Arguments
///
/// * `paths` - Content, static and output directories
/// * `site` - Site configuration exposed to templates
/// * `templates` - Loaded theme
/// * `options` - Build switches
///
/// # Returns
///
/// The number of pages written.
///
/// # Errors
///
/// Returns [`BuildError`] on the first failing file. Pages written before
/// the failure stay on disk.
pub fn build_site(
    paths: &SitePaths,
    site: &SiteConfig,
    templates: &Templates,
    options: BuildOptions,
) -> Result<usize, BuildError> {
    std::fs::create_dir_all(&paths.output_dir).map_err(|source| BuildError::Write {
        path: paths.output_dir.clone(),
        source,
    })?;
    if options.clean_destination {
        clean_output(&paths.output_dir)?;
    }
    if !paths.content_dir.is_dir() {
        return Err(BuildError::MissingContentDir(paths.content_dir.clone()));
    }

    let mut pages = 0;
    for entry in WalkDir::new(&paths.content_dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_content(entry.path()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(&paths.content_dir) else {
            continue;
        };

        let page = Page::load(entry.path(), relative, options.unsafe_html)?;
        if !page.is_published() {
            tracing::debug!(page = %relative.display(), "Skipping draft");
            continue;
        }

        let target = write_page(&page, site, templates, &paths.output_dir)?;
        if options.debug {
            tracing::info!(page = %target.display(), "Generated");
        }
        pages += 1;
    }

    let copied = assets::copy_static_assets(&paths.static_dir, &paths.output_dir)?;
    tracing::debug!(pages, assets = copied, "Site built");
    Ok(pages)
}

/// Render `page` through the theme and write it below `output_dir`.
fn write_page(
    page: &Page,
    site: &SiteConfig,
    templates: &Templates,
    output_dir: &Path,
) -> Result<PathBuf, BuildError> {
    let html = templates
        .render(&page.context(site))
        .map_err(|source| BuildError::Render {
            path: page.source.clone(),
            source,
        })?;

    let target = output_dir.join(page.output_path());
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|source| BuildError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(&target, html).map_err(|source| BuildError::Write {
        path: target.clone(),
        source,
    })?;
    Ok(target)
}

/// Remove every entry inside `output_dir`, keeping the directory itself.
///
/// # Errors
///
/// Returns [`BuildError::Clean`] if an entry cannot be removed.
pub fn clean_output(output_dir: &Path) -> Result<(), BuildError> {
    let clean_err = |source| BuildError::Clean {
        path: output_dir.to_path_buf(),
        source,
    };
    for entry in std::fs::read_dir(output_dir).map_err(clean_err)? {
        let entry = entry.map_err(clean_err)?;
        let path = entry.path();
        let removed = if entry.file_type().map_err(clean_err)?.is_dir() {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        removed.map_err(|source| BuildError::Clean { path, source })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::LAYOUT;
    use pretty_assertions::assert_eq;

    struct Fixture {
        _temp_dir: tempfile::TempDir,
        paths: SitePaths,
    }

    impl Fixture {
        fn new() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let layout = ProjectLayout::new(temp_dir.path());
            std::fs::create_dir_all(&layout.content_dir).unwrap();
            Self {
                paths: SitePaths::from(&layout),
                _temp_dir: temp_dir,
            }
        }

        fn content(&self, relative: &str, text: &str) {
            let path = self.paths.content_dir.join(relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, text).unwrap();
        }

        fn output(&self, relative: &str) -> PathBuf {
            self.paths.output_dir.join(relative)
        }

        fn build(&self, options: BuildOptions) -> Result<usize, BuildError> {
            let site = SiteConfig {
                title: "Garden".to_owned(),
                author: "Ada".to_owned(),
                ..SiteConfig::default()
            };
            build_site(&self.paths, &site, &templates(), options)
        }
    }

    fn templates() -> Templates {
        Templates::from_sources([
            (
                LAYOUT,
                r#"<base href="{{ base_href }}"><h1>{{ title }}</h1>{{ content }}<i>{{ author }}</i>"#
                    .to_owned(),
            ),
            ("header.html", String::new()),
            ("footer.html", String::new()),
        ])
        .unwrap()
    }

    fn clean() -> BuildOptions {
        BuildOptions {
            clean_destination: true,
            ..BuildOptions::default()
        }
    }

    #[test]
    fn test_build_writes_pages() {
        let fixture = Fixture::new();
        fixture.content("index.md", "---\ntitle: Home\n---\nSee [one](story/one.md).");
        fixture.content("story/one.md", "# One\n");

        let pages = fixture.build(clean()).unwrap();

        assert_eq!(pages, 2);
        let index = std::fs::read_to_string(fixture.output("index.html")).unwrap();
        assert!(index.starts_with(r#"<base href=""><h1>Home</h1>"#));
        assert!(index.contains(r#"href="story/one.html""#));
        assert!(index.ends_with("<i>Ada</i>"));

        let one = std::fs::read_to_string(fixture.output("story/one.html")).unwrap();
        assert!(one.starts_with(r#"<base href="../">"#));
    }

    #[test]
    fn test_build_skips_drafts_and_other_files() {
        let fixture = Fixture::new();
        fixture.content("index.md", "---\ndraft: true\n---\nhome");
        fixture.content("wip.md", "---\ndraft: true\n---\nlater");
        fixture.content("notes.txt", "not content");

        let pages = fixture.build(clean()).unwrap();

        assert_eq!(pages, 1);
        assert!(fixture.output("index.html").exists());
        assert!(!fixture.output("wip.html").exists());
        assert!(!fixture.output("notes.txt").exists());
    }

    #[test]
    fn test_clean_removes_stale_output() {
        let fixture = Fixture::new();
        fixture.content("index.md", "home");
        std::fs::create_dir_all(fixture.output("old")).unwrap();
        std::fs::write(fixture.output("old/stale.html"), "x").unwrap();
        std::fs::write(fixture.output("stale.html"), "x").unwrap();

        fixture.build(clean()).unwrap();

        assert!(fixture.paths.output_dir.is_dir());
        assert!(!fixture.output("old").exists());
        assert!(!fixture.output("stale.html").exists());
        assert!(fixture.output("index.html").exists());
    }

    #[test]
    fn test_without_clean_keeps_stale_output() {
        let fixture = Fixture::new();
        fixture.content("index.md", "home");
        std::fs::create_dir_all(&fixture.paths.output_dir).unwrap();
        std::fs::write(fixture.output("stale.html"), "x").unwrap();

        fixture.build(BuildOptions::default()).unwrap();

        assert!(fixture.output("stale.html").exists());
    }

    #[test]
    fn test_copies_static_assets() {
        let fixture = Fixture::new();
        fixture.content("index.md", "home");
        std::fs::create_dir_all(&fixture.paths.static_dir).unwrap();
        std::fs::write(fixture.paths.static_dir.join("site.css"), "body{}").unwrap();
        std::fs::write(fixture.paths.static_dir.join("notes.md"), "skip").unwrap();

        fixture.build(clean()).unwrap();

        assert!(fixture.output("site.css").exists());
        assert!(!fixture.output("notes.md").exists());
    }

    #[test]
    fn test_missing_content_dir() {
        let fixture = Fixture::new();
        std::fs::remove_dir_all(&fixture.paths.content_dir).unwrap();

        let err = fixture.build(clean()).unwrap_err();

        assert!(matches!(err, BuildError::MissingContentDir(_)));
    }

    #[test]
    fn test_invalid_utf8_names_file() {
        let fixture = Fixture::new();
        std::fs::write(fixture.paths.content_dir.join("bad.md"), [0xff, 0xfe, 0x00]).unwrap();

        let err = fixture.build(clean()).unwrap_err();

        assert!(matches!(err, BuildError::InvalidUtf8 { .. }));
        assert!(err.to_string().contains("bad.md"));
    }

    #[test]
    fn test_bad_front_matter_names_file() {
        let fixture = Fixture::new();
        fixture.content("broken.md", "---\ntitle: [oops\n---\n");

        let err = fixture.build(clean()).unwrap_err();

        assert!(matches!(err, BuildError::FrontMatter { .. }));
        assert!(err.to_string().contains("broken.md"));
    }

    #[test]
    fn test_is_content() {
        assert!(is_content(Path::new("a.md")));
        assert!(is_content(Path::new("a/b.html")));
        assert!(!is_content(Path::new("a.markdown")));
        assert!(!is_content(Path::new("a")));
    }
}
