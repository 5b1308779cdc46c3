//! Compiled narrative graph and the seams to external tools.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::StoryError;

/// A compiled story: top-level metadata plus every node keyed by id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryGraph {
    /// Story-wide values such as `title` and `author`.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub nodes: BTreeMap<String, StoryNode>,
}

/// One passage of the story.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryNode {
    /// Knot this node was generated from.
    pub knot_name: String,
    /// `/`-separated scene path, empty for top-level knots.
    pub scene: String,
    /// Raw passage text.
    pub content: String,
    /// State flags active when reaching this node.
    pub state: BTreeMap<String, bool>,
    /// Outgoing choices.
    pub edges: Vec<Choice>,
    /// Per-knot front matter carried by the compiler, such as `title`.
    pub meta: BTreeMap<String, String>,
}

/// A labelled link to another node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    /// Target node id.
    pub target: String,
}

/// Compiles narrative source into a [`StoryGraph`].
pub trait StoryCompiler {
    /// # Errors
    ///
    /// Returns [`StoryError::Compile`] when the source is not a valid story.
    fn compile(&self, source: &str) -> Result<StoryGraph, StoryError>;
}

/// Turns a passage with edit markup into clean markdown.
pub trait MarkupCleaner {
    /// # Errors
    ///
    /// Returns [`StoryError::Markup`] when the markup is malformed.
    fn clean(&self, text: &str) -> Result<String, StoryError>;
}

/// Reads the compiled JSON interchange format:
///
/// ```json
/// {"metadata": {"title": "..."}, "graph": {"nodes": {"id": {...}}}}
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct GraphJson;

#[derive(Deserialize)]
struct Interchange {
    #[serde(default)]
    metadata: BTreeMap<String, String>,
    #[serde(default)]
    graph: InterchangeGraph,
}

#[derive(Default, Deserialize)]
struct InterchangeGraph {
    #[serde(default)]
    nodes: BTreeMap<String, StoryNode>,
}

impl StoryCompiler for GraphJson {
    fn compile(&self, source: &str) -> Result<StoryGraph, StoryError> {
        let doc: Interchange =
            serde_json::from_str(source).map_err(|e| StoryError::Compile(e.to_string()))?;
        Ok(StoryGraph {
            metadata: doc.metadata,
            nodes: doc.graph.nodes,
        })
    }
}

/// Leaves passage text untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct Verbatim;

impl MarkupCleaner for Verbatim {
    fn clean(&self, text: &str) -> Result<String, StoryError> {
        Ok(text.to_owned())
    }
}
