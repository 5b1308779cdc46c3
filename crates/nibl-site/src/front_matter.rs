//! Front matter extraction.
//!
//! A document may start with a YAML block fenced by two `---` lines:
//!
//! ```text
//! ---
//! title: Chapter One
//! draft: true
//! mood: rainy
//! ---
//! Body text...
//! ```
//!
//! Known keys map onto [`FrontMatter`] fields; every other key lands in
//! [`FrontMatter::params`] untouched so templates can read it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Page metadata from a document's front matter block.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    /// Page title.
    pub title: String,
    /// Per-page author.
    pub author: String,
    /// Suppresses output unless the page is always emitted.
    pub draft: bool,
    /// Page description.
    pub description: String,
    /// Whether edit markup should be visible in the rendered page.
    #[serde(rename = "showEditML")]
    pub show_edit_ml: bool,
    /// Story-level title forwarded from the narrative compiler.
    pub story_title: String,
    /// Story-level author; overrides the site author.
    pub story_author: String,
    /// Every other key, passed to templates verbatim.
    #[serde(flatten)]
    pub params: BTreeMap<String, serde_yaml::Value>,
}

/// Split a document into its raw front matter block and body.
///
/// The block is only recognized when the very first line is `---` and a
/// later line is exactly `---` again. Otherwise the whole document is body.
#[must_use]
pub fn split(source: &str) -> (Option<&str>, &str) {
    let Some(rest) = after_opening_delimiter(source) else {
        return (None, source);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }

    (None, source)
}

/// Return the text following an opening `---` line, if there is one.
fn after_opening_delimiter(source: &str) -> Option<&str> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let (first, rest) = source.split_once('\n')?;
    (first.trim_end() == "---").then_some(rest)
}

/// Parse a document into front matter and body.
///
/// Documents without a block get default front matter.
///
/// # Errors
///
/// Returns the YAML error if the block is present but malformed.
pub fn parse(source: &str) -> Result<(FrontMatter, &str), serde_yaml::Error> {
    match split(source) {
        (Some(block), body) if block.trim().is_empty() => Ok((FrontMatter::default(), body)),
        (Some(block), body) => Ok((serde_yaml::from_str(block)?, body)),
        (None, body) => Ok((FrontMatter::default(), body)),
    }
}
