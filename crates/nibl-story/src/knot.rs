//! Per-knot metadata and title extraction.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;

static KNOT_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^===\s*([\w-]+)\s*===$").expect("invalid knot header regex"));

/// Key/value pairs attached to a knot.
pub type KnotMeta = BTreeMap<String, String>;

/// Collect `// key: value` comments following each `=== knot ===` header.
///
/// Keys are lower-cased; values are trimmed. Comments before the first
/// header and comments without a colon are ignored.
#[must_use]
pub fn knot_front_matter(source: &str) -> HashMap<String, KnotMeta> {
    let mut knots: HashMap<String, KnotMeta> = HashMap::new();
    let mut current: Option<String> = None;

    for line in source.lines() {
        let line = line.trim();
        if let Some(caps) = KNOT_HEADER.captures(line) {
            let name = caps[1].to_owned();
            knots.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }

        let (Some(knot), Some((key, value))) = (&current, meta_comment(line)) else {
            continue;
        };
        knots.entry(knot.clone()).or_default().insert(key, value);
    }

    knots
}

/// Split leading `//` comment lines off a passage.
///
/// Comments of the form `// key: value` become metadata, other comments
/// are dropped. Everything from the first non-comment line on is returned
/// as the body.
#[must_use]
pub fn leading_meta(content: &str) -> (KnotMeta, &str) {
    let mut meta = KnotMeta::new();
    let mut rest = content;

    while !rest.is_empty() {
        let (line, tail) = rest.split_once('\n').unwrap_or((rest, ""));
        let trimmed = line.trim();
        if !trimmed.starts_with("//") {
            break;
        }
        if let Some((key, value)) = meta_comment(trimmed) {
            meta.insert(key, value);
        }
        rest = tail;
    }

    (meta, rest)
}

/// Parse a trimmed `// key: value` line. Keys are lower-cased.
fn meta_comment(line: &str) -> Option<(String, String)> {
    let (key, value) = line.strip_prefix("//")?.trim().split_once(':')?;
    Some((key.trim().to_lowercase(), value.trim().to_owned()))
}

/// Pick a page title and strip level-one headings from the passage.
///
/// The title is the knot's `title` metadata, else the first `# ` heading,
/// else the knot name with underscores as spaces in title case. Every
/// level-one heading line is removed from the returned body.
#[must_use]
pub fn title_and_body(knot_name: &str, content: &str, meta: &KnotMeta) -> (String, String) {
    let mut heading: Option<String> = None;
    let mut body = Vec::new();

    for line in content.lines() {
        match line.trim().strip_prefix("# ") {
            Some(text) => {
                heading.get_or_insert_with(|| text.trim().to_owned());
            }
            None => body.push(line),
        }
    }

    let title = meta
        .get("title")
        .filter(|t| !t.is_empty())
        .cloned()
        .or(heading)
        .unwrap_or_else(|| title_case(&knot_name.replace('_', " ")));

    (title, body.join("\n").trim().to_owned())
}

/// Upper-case the first letter of every word.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if at_word_start && c.is_alphabetic() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !c.is_alphanumeric();
    }
    out
}
