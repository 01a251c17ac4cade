//! Single-pass placeholder splicing for deferred render results.

use std::collections::HashMap;

/// Prefix of every deferred placeholder.
pub(crate) const PLACEHOLDER_PREFIX: &str = "<!--inkset-deferred-";
const PLACEHOLDER_SUFFIX: &str = "-->";

/// Placeholder for deferred result `index` of render pass `pass`.
pub(crate) fn placeholder(pass: u64, index: usize) -> String {
    format!("{PLACEHOLDER_PREFIX}{pass}-{index}{PLACEHOLDER_SUFFIX}")
}

/// Collects placeholder replacements and applies them in one scan.
///
/// Replacement text is never rescanned, so a result that happens to contain
/// another placeholder cannot trigger a second substitution.
#[derive(Debug, Default)]
pub(crate) struct Replacements {
    items: HashMap<String, String>,
}

impl Replacements {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            items: HashMap::with_capacity(capacity),
        }
    }

    /// Register the HTML that replaces `placeholder`.
    pub(crate) fn add(&mut self, placeholder: impl Into<String>, html: impl Into<String>) {
        self.items.insert(placeholder.into(), html.into());
    }

    /// Apply all replacements. Unknown placeholders are kept as-is.
    pub(crate) fn apply(self, html: &mut String) {
        if self.items.is_empty() {
            return;
        }

        let mut out = String::with_capacity(html.len());
        let mut rest = html.as_str();
        while let Some(start) = rest.find(PLACEHOLDER_PREFIX) {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];
            let Some(end) = tail.find(PLACEHOLDER_SUFFIX) else {
                rest = tail;
                break;
            };
            let key = &tail[..end + PLACEHOLDER_SUFFIX.len()];
            out.push_str(self.items.get(key).map_or(key, String::as_str));
            rest = &tail[key.len()..];
        }
        out.push_str(rest);
        *html = out;
    }
}
