//! `nibl gen` command implementation.

use super::project::Project;
use crate::error::CliError;
use crate::output::Output;

/// Execute the gen command: one clean build.
///
/// # Errors
///
/// Returns an error if any build stage fails.
pub(crate) fn execute(project: &Project) -> Result<(), CliError> {
    let output = Output::new();
    let pages = project.full_build(true)?;
    output.success(&format!(
        "Built {pages} pages into {}",
        project.layout.output_dir.display()
    ));
    Ok(())
}
