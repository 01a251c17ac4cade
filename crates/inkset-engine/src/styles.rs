//! Stylesheet assembly.
//!
//! The stylesheet is the base styles followed by each plugin's fragment,
//! in plugin order, with every rule scoped under the wrapper class.

use inkset_config::Theme;

const BASE_LIGHT: &str = "
:root { --ink-fg: #1f2328; --ink-muted: #59636e; --ink-accent: #0969da; --ink-code-bg: #f6f8fa; --ink-border: #d1d9e0; }
";

const BASE_DARK: &str = "
:root { --ink-fg: #f0f6fc; --ink-muted: #9198a1; --ink-accent: #4493f8; --ink-code-bg: #151b23; --ink-border: #3d444d; }
";

const BASE_COMMON: &str = "
.ink-syntax { color: var(--ink-muted); }
.ink-error { color: #d1242f; text-decoration: underline wavy; }
";

/// Base styles for a theme.
#[must_use]
pub fn base_styles(theme: Theme) -> String {
    let palette = match theme {
        Theme::Light => BASE_LIGHT,
        Theme::Dark => BASE_DARK,
    };
    format!("{}\n{}", palette.trim(), BASE_COMMON.trim())
}

/// Prefix every selector in `css` with `.class`.
///
/// `:root` becomes the scope itself. Rules inside `@media` and `@supports`
/// are scoped recursively; other at-rules are copied unchanged.
///
/// ```
/// use inkset_engine::styles::scope_css;
///
/// assert_eq!(
///     scope_css("h1, h2 { margin: 0 }", "doc"),
///     ".doc h1, .doc h2 { margin: 0 }\n"
/// );
/// ```
#[must_use]
pub fn scope_css(css: &str, class: &str) -> String {
    let mut out = String::new();
    let mut rest = css;

    while let Some(open) = rest.find('{') {
        let selector = rest[..open].trim();
        let Some(close) = matching_brace(rest, open) else {
            break;
        };
        let body = rest[open + 1..close].trim();
        rest = &rest[close + 1..];

        if selector.starts_with("@media") || selector.starts_with("@supports") {
            out.push_str(&format!("{selector} {{\n{}}}\n", scope_css(body, class)));
        } else if selector.starts_with('@') {
            out.push_str(&format!("{selector} {{ {body} }}\n"));
        } else {
            let scoped = selector
                .split(',')
                .map(|s| scope_selector(s.trim(), class))
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!("{scoped} {{ {body} }}\n"));
        }
    }

    out
}

fn scope_selector(selector: &str, class: &str) -> String {
    match selector {
        ":root" | "&" => format!(".{class}"),
        _ => match selector.strip_prefix('&') {
            Some(rest) => format!(".{class}{rest}"),
            None => format!(".{class} {selector}"),
        },
    }
}

fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in text.bytes().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
