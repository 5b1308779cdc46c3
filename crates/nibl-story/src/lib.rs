//! Narrative graph materialization.
//!
//! Turns a compiled branching story into one markdown content file per
//! node, each with front matter, a title heading, the passage and a list of
//! choices linking to the target nodes' files:
//!
//! ```text
//! ---
//! title: The Hall
//! story_title: The Garden
//! draft: false
//! ---
//! ## The Hall
//!
//! Dust everywhere.
//!
//! * [Go back](../gate.md)
//! ```
//!
//! Compiling narrative source and cleaning edit markup are delegated to
//! [`StoryCompiler`] and [`MarkupCleaner`] implementations.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

mod graph;
mod knot;
mod paths;

pub use graph::{Choice, GraphJson, MarkupCleaner, StoryCompiler, StoryGraph, StoryNode, Verbatim};
pub use knot::{KnotMeta, knot_front_matter, leading_meta, title_and_body};
pub use paths::{node_path, relative_link, slug_segment};

/// Story materialization error.
#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    #[error("Story source not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Story compile error: {0}")]
    Compile(String),

    #[error("Edit markup error in knot {knot}: {message}")]
    Markup { knot: String, message: String },

    #[error("Node {node} links to unknown node {target}")]
    UnknownTarget { node: String, target: String },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize front matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),
}

/// Compile `source_path` and write one markdown file per node below `out_dir`.
///
/// # Arguments
///
/// * `compiler` - Produces the graph from the source text
/// * `cleaner` - Strips edit markup from each passage
/// * `source_path` - Narrative source or compiled graph
/// * `out_dir` - Root for the generated files
///
/// # Returns
///
/// The number of files written.
///
/// # Errors
///
/// Returns [`StoryError::NotFound`] if `source_path` is missing, and the
/// compiler, cleaner or I/O error otherwise.
pub fn compile_story(
    compiler: &impl StoryCompiler,
    cleaner: &impl MarkupCleaner,
    source_path: &Path,
    out_dir: &Path,
) -> Result<usize, StoryError> {
    if !source_path.is_file() {
        return Err(StoryError::NotFound(source_path.to_path_buf()));
    }
    let source = std::fs::read_to_string(source_path).map_err(|source| StoryError::Read {
        path: source_path.to_path_buf(),
        source,
    })?;

    let knot_meta = knot_front_matter(&source);
    let graph = compiler.compile(&source)?;
    let paths = paths::node_paths(&graph.nodes);

    let mut written = 0;
    for (id, node) in &graph.nodes {
        let path = &paths[id.as_str()];
        let (inline, content) = leading_meta(&node.content);
        let mut meta = knot_meta.get(&node.knot_name).cloned().unwrap_or_default();
        meta.extend(inline);
        meta.extend(node.meta.iter().map(|(k, v)| (k.to_lowercase(), v.clone())));

        let (title, body) = title_and_body(&node.knot_name, content, &meta);
        let body = cleaner.clean(&body)?;

        let mut choices = Vec::with_capacity(node.edges.len());
        for edge in &node.edges {
            let target = paths
                .get(edge.target.as_str())
                .ok_or_else(|| StoryError::UnknownTarget {
                    node: id.clone(),
                    target: edge.target.clone(),
                })?;
            choices.push((edge.text.as_str(), relative_link(path, target)));
        }

        let page = render_page(&graph, &title, &meta, &body, &choices)?;
        let target = out_dir.join(path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoryError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&target, page).map_err(|source| StoryError::Write {
            path: target.clone(),
            source,
        })?;
        tracing::debug!(node = %id, path = %target.display(), "Wrote story page");
        written += 1;
    }

    Ok(written)
}

/// Assemble one node's markdown file.
fn render_page(
    graph: &StoryGraph,
    title: &str,
    meta: &KnotMeta,
    body: &str,
    choices: &[(&str, String)],
) -> Result<String, StoryError> {
    let mut out = String::from("---\n");
    out.push_str(&serde_yaml::to_string(&front_matter(graph, title, meta))?);
    out.push_str("---\n");

    let _ = write!(out, "## {title}\n\n{body}\n\n");
    for (text, link) in choices {
        let _ = writeln!(out, "* [{text}]({link})");
    }
    Ok(out)
}

/// Front matter keys in output order.
fn front_matter(graph: &StoryGraph, title: &str, meta: &KnotMeta) -> serde_yaml::Mapping {
    let mut map = serde_yaml::Mapping::new();
    map.insert("title".into(), title.into());
    if let Some(story_title) = graph.metadata.get("title") {
        map.insert("story_title".into(), story_title.as_str().into());
    }
    if let Some(story_author) = graph.metadata.get("author") {
        map.insert("story_author".into(), story_author.as_str().into());
    }
    for (key, value) in meta {
        if key != "title" {
            map.insert(key.as_str().into(), value.as_str().into());
        }
    }
    map.insert("draft".into(), false.into());
    map
}
