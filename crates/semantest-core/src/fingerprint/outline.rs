//! Normalized DOM outline construction.
//!
//! The outline is a plain-text rendering of the page's element structure:
//! one line per element, indented by nesting depth, carrying only signals
//! that survive re-renders. Text content never appears, and ids/classes
//! that look machine-generated (hashed CSS modules, framework prefixes,
//! React ids) are dropped, so two visits to the same page layout produce
//! the same outline even when content and build artifacts differ.

use semantest_types::context::DomNode;

/// Attributes that identify an element's purpose rather than its styling.
/// Emitted in this fixed order so attribute iteration order in the source
/// snapshot cannot change the outline.
const STABLE_ATTRIBUTES: &[&str] = &["role", "name", "type"];

/// Class/id prefixes stamped by CSS-in-JS and framework tooling.
const GENERATED_PREFIXES: &[&str] = &["css-", "sc-", "jsx-", "svelte-", "emotion-", "ng-"];

/// Render the normalized outline for the tree rooted at `root`.
pub fn build_outline(root: &DomNode) -> String {
    let mut out = String::new();
    visit(root, 0, &mut out);
    out
}

fn visit(node: &DomNode, depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str(&node.tag.to_lowercase());

    if let Some(id) = &node.id {
        if !is_generated_token(id) {
            out.push('#');
            out.push_str(id);
        }
    }

    let mut classes: Vec<&str> = node
        .classes
        .iter()
        .map(String::as_str)
        .filter(|c| !is_generated_token(c))
        .collect();
    classes.sort_unstable();
    classes.dedup();
    for class in classes {
        out.push('.');
        out.push_str(class);
    }

    for attr in STABLE_ATTRIBUTES {
        if let Some(value) = node.attributes.get(*attr) {
            out.push('[');
            out.push_str(attr);
            out.push('=');
            out.push_str(value);
            out.push(']');
        }
    }

    out.push('\n');
    for child in &node.children {
        visit(child, depth + 1, out);
    }
}

/// Heuristic for tokens that change between builds or page loads.
///
/// Flags framework prefixes, React useId colons, long hex blobs, and
/// digit-heavy strings. Ordinary semantic names ("sidebar", "send-button")
/// pass through.
pub fn is_generated_token(token: &str) -> bool {
    if token.is_empty() {
        return true;
    }
    let lower = token.to_lowercase();
    if GENERATED_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return true;
    }
    if lower.contains(':') {
        return true;
    }
    let len = lower.chars().count();
    let digits = lower.chars().filter(char::is_ascii_digit).count();
    if len >= 4 && digits * 3 >= len {
        return true;
    }
    if len >= 8 && lower.chars().all(|c| c.is_ascii_hexdigit()) {
        return true;
    }
    false
}
