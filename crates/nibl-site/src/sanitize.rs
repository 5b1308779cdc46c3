//! HTML sanitization for user-generated content.
//!
//! Used on rendered pages unless the build runs in unsafe mode. The policy
//! is ammonia's default allow-list plus heading anchors and code block
//! language classes, which the markdown renderer emits.

use std::sync::LazyLock;

static POLICY: LazyLock<ammonia::Builder<'static>> = LazyLock::new(|| {
    let mut builder = ammonia::Builder::default();
    builder
        .add_generic_attributes(&["id"])
        .add_tag_attributes("code", &["class"]);
    builder
});

/// Strip scripts, event handlers and other unsafe markup from `html`.
#[must_use]
pub fn clean(html: &str) -> String {
    POLICY.clean(html).to_string()
}
