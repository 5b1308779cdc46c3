//! `nibl serve` command implementation.

use nibl_server::{BoxError, ServerConfig, Timing, WatchRoots, run_server};

use super::project::Project;
use crate::error::CliError;
use crate::output::Output;

/// Execute the serve command.
///
/// # Errors
///
/// Returns an error if the initial build fails or the server cannot start.
pub(crate) async fn execute(project: Project, host: String, port: u16) -> Result<(), CliError> {
    let output = Output::new();
    output.info(&format!("Starting server on http://{host}:{port}/"));
    output.info(&format!("Watching {}", project.layout.root.display()));

    let config = ServerConfig {
        host,
        port,
        output_dir: project.layout.output_dir.clone(),
        watch: WatchRoots {
            trees: project.layout.watched_trees(),
            files: project.layout.watched_files(),
        },
        timing: Timing::default(),
    };

    let initial = project.clone();
    run_server(
        config,
        move || initial.full_build(true).map_err(BoxError::from),
        move || project.full_build(false).map_err(BoxError::from),
    )
    .await?;

    Ok(())
}
