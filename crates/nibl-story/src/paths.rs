//! File locations for materialized story nodes.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::StoryNode;

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\- ]+").expect("invalid segment regex"));
static DASH_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").expect("invalid dash regex"));

/// Make a single path segment safe: lowercase, word characters, dashes.
#[must_use]
pub fn slug_segment(text: &str) -> String {
    let lower = text.to_lowercase();
    let kept = DISALLOWED.replace_all(&lower, "");
    let dashed = kept.replace(' ', "-");
    DASH_RUNS.replace_all(&dashed, "-").into_owned()
}

/// Path of a node's markdown file, relative to the output directory.
///
/// `<scene segments>/<knot>[-<active flags, sorted>].md`
#[must_use]
pub fn node_path(node: &StoryNode) -> PathBuf {
    let mut path = PathBuf::new();
    for segment in node.scene.split('/').filter(|s| !s.is_empty()) {
        path.push(slug_segment(segment));
    }

    let mut parts = vec![slug_segment(&node.knot_name)];
    let mut flags: Vec<String> = node
        .state
        .iter()
        .filter(|(_, active)| **active)
        .map(|(flag, _)| slug_segment(flag))
        .collect();
    flags.sort();
    parts.extend(flags);

    path.push(format!("{}.md", parts.join("-")));
    path
}

/// Paths for every node id.
#[must_use]
pub fn node_paths(nodes: &BTreeMap<String, StoryNode>) -> BTreeMap<&str, PathBuf> {
    nodes
        .iter()
        .map(|(id, node)| (id.as_str(), node_path(node)))
        .collect()
}

/// `/`-separated link from the file `from` to the file `to`.
///
/// Both paths are relative to the same root.
#[must_use]
pub fn relative_link(from: &Path, to: &Path) -> String {
    let from_dir: Vec<_> = from
        .parent()
        .map(|p| p.components().filter(|c| matches!(c, Component::Normal(_))).collect())
        .unwrap_or_default();
    let target: Vec<_> = to
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect();

    let shared = from_dir
        .iter()
        .zip(&target)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = vec!["..".to_owned(); from_dir.len() - shared];
    parts.extend(
        target[shared..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    parts.join("/")
}
