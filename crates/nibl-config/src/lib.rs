//! Configuration management for nibl.
//!
//! A nibl project is a directory with a fixed shape:
//!
//! ```text
//! my-site/
//! ├── site.yaml      # Site configuration
//! ├── story.json     # Compiled narrative graph (optional)
//! ├── content/       # Markdown and HTML documents
//! ├── templates/     # One directory per theme (layout/header/footer)
//! ├── static/        # Style sheets, scripts, images
//! └── public/        # Generated output
//! ```
//!
//! [`ProjectLayout`] resolves these locations against a root directory and
//! [`SiteConfig`] holds the parsed `site.yaml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Content directory name.
pub const CONTENT_DIR: &str = "content";
/// Templates directory name.
pub const TEMPLATE_DIR: &str = "templates";
/// Static assets directory name.
pub const STATIC_DIR: &str = "static";
/// Output directory name.
pub const OUTPUT_DIR: &str = "public";
/// Site configuration filename.
pub const CONFIG_FILENAME: &str = "site.yaml";
/// Default compiled narrative filename.
pub const STORY_FILENAME: &str = "story.json";

/// Locations of every project input and output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectLayout {
    /// Project root.
    pub root: PathBuf,
    /// Source documents.
    pub content_dir: PathBuf,
    /// Theme templates.
    pub template_dir: PathBuf,
    /// Static assets copied verbatim.
    pub static_dir: PathBuf,
    /// Generated site.
    pub output_dir: PathBuf,
    /// `site.yaml`.
    pub config_file: PathBuf,
    /// Compiled narrative graph.
    pub story_file: PathBuf,
}

impl ProjectLayout {
    /// Resolve the standard layout against `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            content_dir: root.join(CONTENT_DIR),
            template_dir: root.join(TEMPLATE_DIR),
            static_dir: root.join(STATIC_DIR),
            output_dir: root.join(OUTPUT_DIR),
            config_file: root.join(CONFIG_FILENAME),
            story_file: root.join(STORY_FILENAME),
            root,
        }
    }

    /// Directory trees watched by the dev server.
    #[must_use]
    pub fn watched_trees(&self) -> Vec<PathBuf> {
        vec![
            self.content_dir.clone(),
            self.template_dir.clone(),
            self.static_dir.clone(),
        ]
    }

    /// Individual files watched by the dev server.
    #[must_use]
    pub fn watched_files(&self) -> Vec<PathBuf> {
        vec![self.config_file.clone(), self.story_file.clone()]
    }

    /// Load `site.yaml` from this layout.
    ///
    /// # Errors
    ///
    /// See [`SiteConfig::load`].
    pub fn load_site_config(&self) -> Result<SiteConfig, ConfigError> {
        SiteConfig::load(&self.config_file)
    }
}

/// Site-wide configuration from `site.yaml`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site title.
    pub title: String,
    /// Default author for every page.
    pub author: String,
    /// Public base URL.
    #[serde(rename = "baseurl")]
    pub base_url: String,
    /// Default page description.
    pub description: String,
    /// Theme directory name under `templates/`.
    pub template: String,
}

impl SiteConfig {
    /// Load site configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the file does not exist,
    /// [`ConfigError::Io`] if it cannot be read and [`ConfigError::Parse`]
    /// if it is not valid YAML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse site configuration from YAML content.
    ///
    /// Empty content yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns the YAML error if the content is malformed.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// YAML parsing error.
    #[error("Could not parse config file {}: {source}", path.display())]
    Parse {
        /// Offending file.
        path: PathBuf,
        /// Underlying parser error.
        #[source]
        source: serde_yaml::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_layout_resolves_against_root() {
        let layout = ProjectLayout::new("/site");

        assert_eq!(layout.content_dir, PathBuf::from("/site/content"));
        assert_eq!(layout.template_dir, PathBuf::from("/site/templates"));
        assert_eq!(layout.static_dir, PathBuf::from("/site/static"));
        assert_eq!(layout.output_dir, PathBuf::from("/site/public"));
        assert_eq!(layout.config_file, PathBuf::from("/site/site.yaml"));
        assert_eq!(layout.story_file, PathBuf::from("/site/story.json"));
    }

    #[test]
    fn test_watched_roots() {
        let layout = ProjectLayout::new("/site");

        assert_eq!(layout.watched_trees().len(), 3);
        assert_eq!(
            layout.watched_files(),
            vec![
                PathBuf::from("/site/site.yaml"),
                PathBuf::from("/site/story.json")
            ]
        );
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
title: "Night Garden"
author: Ada
baseurl: https://example.org/
description: A quiet site
template: default
"#;
        let config = SiteConfig::from_yaml(yaml).unwrap();

        assert_eq!(
            config,
            SiteConfig {
                title: "Night Garden".to_owned(),
                author: "Ada".to_owned(),
                base_url: "https://example.org/".to_owned(),
                description: "A quiet site".to_owned(),
                template: "default".to_owned(),
            }
        );
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let config = SiteConfig::from_yaml("title: Only Title").unwrap();

        assert_eq!(config.title, "Only Title");
        assert!(config.author.is_empty());
        assert!(config.template.is_empty());
    }

    #[test]
    fn test_empty_content_is_default() {
        assert_eq!(SiteConfig::from_yaml("  \n").unwrap(), SiteConfig::default());
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = SiteConfig::load(&temp_dir.path().join("site.yaml"));

        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_invalid_yaml_names_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("site.yaml");
        std::fs::write(&path, "title: [unclosed").unwrap();

        let err = SiteConfig::load(&path).unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("site.yaml"));
    }

    #[test]
    fn test_load_from_layout() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("site.yaml"), "author: Bo\n").unwrap();

        let layout = ProjectLayout::new(temp_dir.path());
        let config = layout.load_site_config().unwrap();

        assert_eq!(config.author, "Bo");
    }
}
