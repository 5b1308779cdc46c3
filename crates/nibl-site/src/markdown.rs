//! Markdown to HTML conversion.
//!
//! Thin layer over `pulldown-cmark` with two additions:
//! - links to `*.md` documents are rewritten to `*.html` so cross references
//!   keep working in the generated site
//! - headings without an explicit `{#id}` get a unique slug id

use std::collections::{HashMap, HashSet};

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};

/// Source extension rewritten by the link hook.
const SOURCE_EXT: &str = ".md";
/// Extension links are rewritten to.
const PAGE_EXT: &str = ".html";

/// Parser options: GFM extensions, footnotes and heading attributes.
fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_GFM
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Render markdown to HTML.
///
/// Raw HTML in the input is passed through; sanitization is a separate step.
#[must_use]
pub fn render(markdown: &str) -> String {
    let mut events: Vec<Event<'_>> = Parser::new_ext(markdown, options())
        .map(rewrite_link)
        .collect();
    assign_heading_ids(&mut events);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

/// Apply the link hook to a link start event.
fn rewrite_link(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: rewrite_destination(dest_url),
            title,
            id,
        }),
        other => other,
    }
}

/// Swap a trailing `.md` in a link destination for `.html`.
///
/// Only the suffix is considered: `notes.md#part` and `https://x/readme.md?raw`
/// are left alone.
#[must_use]
pub fn rewrite_destination(dest: CowStr<'_>) -> CowStr<'_> {
    if let Some(stem) = dest.strip_suffix(SOURCE_EXT) {
        return CowStr::from(format!("{stem}{PAGE_EXT}"));
    }
    dest
}

/// Give every heading without an id a unique slug.
fn assign_heading_ids(events: &mut [Event<'_>]) {
    let mut ids = HeadingIds::default();

    // Explicit ids are reserved first so generated ones never collide.
    for event in events.iter() {
        if let Event::Start(Tag::Heading { id: Some(id), .. }) = event {
            ids.reserve(id);
        }
    }

    for index in 0..events.len() {
        if !matches!(events[index], Event::Start(Tag::Heading { id: None, .. })) {
            continue;
        }
        let text = heading_text(&events[index + 1..]);
        let slug = ids.unique(&text);
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[index] {
            *id = Some(CowStr::from(slug));
        }
    }
}

/// Collect the plain text of a heading up to its end tag.
fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }
    text
}

/// Tracks ids already used within one document.
#[derive(Default)]
struct HeadingIds {
    taken: HashSet<String>,
    /// Next suffix to try per base slug.
    next: HashMap<String, usize>,
}

impl HeadingIds {
    fn reserve(&mut self, id: &str) {
        self.taken.insert(id.to_owned());
    }

    fn unique(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base.push_str("heading");
        }
        let mut n = self.next.get(&base).copied().unwrap_or(0);
        let id = loop {
            let candidate = match n {
                0 => base.clone(),
                n => format!("{base}-{n}"),
            };
            n += 1;
            if self.taken.insert(candidate.clone()) {
                break candidate;
            }
        };
        self.next.insert(base, n);
        id
    }
}

/// Convert text to URL-safe slug.
///
/// Converts to lowercase, replaces whitespace/dashes/underscores with single dashes,
/// and removes other non-alphanumeric characters.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true;

    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            result.extend(c.to_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}
