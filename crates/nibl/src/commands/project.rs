//! Full build pipeline shared by every command.

use std::path::Path;

use nibl_config::ProjectLayout;
use nibl_site::{BuildOptions, SitePaths, Templates, build_site};
use nibl_story::{GraphJson, Verbatim, compile_story};

use crate::error::CliError;

/// A nibl project rooted at a directory, plus global build switches.
#[derive(Clone, Debug)]
pub(crate) struct Project {
    pub layout: ProjectLayout,
    pub unsafe_html: bool,
    pub debug: bool,
}

impl Project {
    pub(crate) fn new(root: &Path, unsafe_html: bool, debug: bool) -> Self {
        Self {
            layout: ProjectLayout::new(root),
            unsafe_html,
            debug,
        }
    }

    /// Materialize the story, if any, then build the site.
    ///
    /// Configuration and templates are read fresh on every call.
    pub(crate) fn full_build(&self, clean_destination: bool) -> Result<usize, CliError> {
        let story = &self.layout.story_file;
        if story.is_file() {
            let nodes = self.compile_story(story, &self.layout.content_dir)?;
            tracing::debug!(nodes, "Story materialized");
        } else {
            tracing::debug!(path = %story.display(), "No story file, skipping story stage");
        }
        self.build_site(clean_destination)
    }

    /// Write one content file per story node below `out_dir`.
    pub(crate) fn compile_story(&self, source: &Path, out_dir: &Path) -> Result<usize, CliError> {
        Ok(compile_story(&GraphJson, &Verbatim, source, out_dir)?)
    }

    /// Build the site from the current content tree.
    pub(crate) fn build_site(&self, clean_destination: bool) -> Result<usize, CliError> {
        let site = self.layout.load_site_config()?;
        let templates = Templates::load(&self.layout.template_dir, &site.template)?;
        let options = BuildOptions {
            clean_destination,
            unsafe_html: self.unsafe_html,
            debug: self.debug,
        };
        Ok(build_site(
            &SitePaths::from(&self.layout),
            &site,
            &templates,
            options,
        )?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Minimal project with a `plain` theme and one page.
    pub(crate) fn fixture() -> tempfile::TempDir {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        std::fs::write(
            root.join("site.yaml"),
            "title: Garden\nauthor: Ada\ntemplate: plain\n",
        )
        .unwrap();
        let theme = root.join("templates/plain");
        std::fs::create_dir_all(&theme).unwrap();
        std::fs::write(
            theme.join("layout.html"),
            "{% include \"header.html\" %}<body>{{ content }}</body>{% include \"footer.html\" %}",
        )
        .unwrap();
        std::fs::write(theme.join("header.html"), "<title>{{ title }}</title>").unwrap();
        std::fs::write(theme.join("footer.html"), "<!-- {{ author }} -->").unwrap();
        std::fs::create_dir_all(root.join("content")).unwrap();
        std::fs::write(root.join("content/index.md"), "---\ntitle: Home\n---\nWelcome").unwrap();
        temp_dir
    }

    #[test]
    fn test_full_build_without_story() {
        let temp_dir = fixture();
        let project = Project::new(temp_dir.path(), false, false);

        let pages = project.full_build(true).unwrap();

        assert_eq!(pages, 1);
        let index = std::fs::read_to_string(temp_dir.path().join("public/index.html")).unwrap();
        assert_eq!(
            index,
            "<title>Home</title><body><p>Welcome</p>\n</body><!-- Ada -->"
        );
    }

    #[test]
    fn test_full_build_materializes_story() {
        let temp_dir = fixture();
        std::fs::write(
            temp_dir.path().join("story.json"),
            r#"{"metadata": {"author": "Bo"}, "graph": {"nodes": {"a": {"knot_name": "gate", "content": "Hello"}}}}"#,
        )
        .unwrap();
        let project = Project::new(temp_dir.path(), false, false);

        let pages = project.full_build(true).unwrap();

        assert_eq!(pages, 2);
        assert!(temp_dir.path().join("content/gate.md").exists());
        let gate = std::fs::read_to_string(temp_dir.path().join("public/gate.html")).unwrap();
        assert!(gate.ends_with("<!-- Bo -->"));
    }

    #[test]
    fn test_config_change_picked_up_on_next_build() {
        let temp_dir = fixture();
        let project = Project::new(temp_dir.path(), false, false);
        project.full_build(true).unwrap();

        std::fs::write(
            temp_dir.path().join("site.yaml"),
            "author: Cy\ntemplate: plain\n",
        )
        .unwrap();
        project.full_build(false).unwrap();

        let index = std::fs::read_to_string(temp_dir.path().join("public/index.html")).unwrap();
        assert!(index.ends_with("<!-- Cy -->"));
    }

    #[test]
    fn test_missing_theme_is_error() {
        let temp_dir = fixture();
        std::fs::write(temp_dir.path().join("site.yaml"), "template: gone\n").unwrap();
        let project = Project::new(temp_dir.path(), false, false);

        let err = project.full_build(true).unwrap_err();

        assert!(matches!(err, CliError::Template(_)));
    }

    #[test]
    fn test_missing_config_is_error() {
        let temp_dir = fixture();
        std::fs::remove_file(temp_dir.path().join("site.yaml")).unwrap();
        let project = Project::new(temp_dir.path(), false, false);

        let err = project.full_build(true).unwrap_err();

        assert!(matches!(err, CliError::Config(_)));
    }
}
