//! `nibl story` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use nibl_config::{CONTENT_DIR, STORY_FILENAME};

use super::project::Project;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the story command.
#[derive(Args)]
pub(crate) struct StoryArgs {
    /// Compiled story graph to materialize.
    #[arg(short, long, default_value = STORY_FILENAME)]
    input: PathBuf,

    /// Directory for the generated content files
    /// (default: `content/`, or `content/<name>/` for a non-default input).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only write content files, skip the site build.
    #[arg(long)]
    content_only: bool,
}

impl StoryArgs {
    /// Execute the story command.
    ///
    /// # Errors
    ///
    /// Returns an error if the story cannot be materialized or the site
    /// build fails.
    pub(crate) fn execute(self, project: &Project) -> Result<(), CliError> {
        let output = Output::new();
        let source = project.layout.root.join(&self.input);
        let out_dir = project
            .layout
            .root
            .join(self.output.unwrap_or_else(|| default_output(&self.input)));

        let nodes = project.compile_story(&source, &out_dir)?;
        output.success(&format!(
            "Wrote {nodes} story pages into {}",
            out_dir.display()
        ));

        if self.content_only {
            return Ok(());
        }
        let pages = project.build_site(true)?;
        output.success(&format!(
            "Built {pages} pages into {}",
            project.layout.output_dir.display()
        ));
        Ok(())
    }
}

/// `content/` for the default story file, `content/<stem>/` otherwise.
fn default_output(input: &Path) -> PathBuf {
    let is_default = input.file_name().is_some_and(|name| name == STORY_FILENAME);
    match input.file_stem() {
        Some(stem) if !is_default => Path::new(CONTENT_DIR).join(stem),
        _ => PathBuf::from(CONTENT_DIR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::project::tests::fixture;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_output() {
        assert_eq!(default_output(Path::new("story.json")), PathBuf::from("content"));
        assert_eq!(
            default_output(Path::new("drafts/heist.json")),
            PathBuf::from("content/heist")
        );
    }

    #[test]
    fn test_execute_content_only() {
        let temp_dir = fixture();
        std::fs::write(
            temp_dir.path().join("heist.json"),
            r#"{"graph": {"nodes": {"a": {"knot_name": "vault", "content": "Locked."}}}}"#,
        )
        .unwrap();
        let project = Project::new(temp_dir.path(), false, false);
        let args = StoryArgs {
            input: PathBuf::from("heist.json"),
            output: None,
            content_only: true,
        };

        args.execute(&project).unwrap();

        assert!(temp_dir.path().join("content/heist/vault.md").exists());
        assert!(!temp_dir.path().join("public").exists());
    }

    #[test]
    fn test_execute_builds_site() {
        let temp_dir = fixture();
        std::fs::write(
            temp_dir.path().join("story.json"),
            r#"{"graph": {"nodes": {"a": {"knot_name": "gate"}}}}"#,
        )
        .unwrap();
        let project = Project::new(temp_dir.path(), false, false);
        let args = StoryArgs {
            input: PathBuf::from(STORY_FILENAME),
            output: None,
            content_only: false,
        };

        args.execute(&project).unwrap();

        assert!(temp_dir.path().join("public/gate.html").exists());
        assert!(temp_dir.path().join("public/index.html").exists());
    }

    #[test]
    fn test_missing_input() {
        let temp_dir = fixture();
        let project = Project::new(temp_dir.path(), false, false);
        let args = StoryArgs {
            input: PathBuf::from("nope.json"),
            output: None,
            content_only: true,
        };

        let err = args.execute(&project).unwrap_err();

        assert!(matches!(err, CliError::Story(nibl_story::StoryError::NotFound(_))));
    }
}
