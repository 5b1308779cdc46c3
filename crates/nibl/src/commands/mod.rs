//! CLI command implementations.

pub(crate) mod generate;
pub(crate) mod project;
pub(crate) mod serve;
pub(crate) mod story;

pub(crate) use project::Project;
pub(crate) use story::StoryArgs;
