//! CLI error types.

use nibl_config::ConfigError;
use nibl_server::ServerError;
use nibl_site::{BuildError, TemplateError};
use nibl_story::StoryError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Template(#[from] TemplateError),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0}")]
    Story(#[from] StoryError),

    #[error("{0}")]
    Server(#[from] ServerError),
}
