//! Context capture pipeline.

use chrono::Utc;
use semantest_types::context::{ExecutionContext, PageSnapshot};
use url::Url;

use crate::fingerprint::hasher::StructureHasher;
use crate::fingerprint::outline::build_outline;

/// Turns page snapshots into comparable execution contexts.
///
/// Capture never fails: an unparseable URL degrades to empty hostname and
/// pathname, and a missing DOM root hashes the empty outline. A degraded
/// context simply matches fewer patterns.
pub struct ContextFingerprinter<H: StructureHasher> {
    hasher: H,
}

impl<H: StructureHasher> ContextFingerprinter<H> {
    pub fn new(hasher: H) -> Self {
        Self { hasher }
    }

    /// Capture the execution context for a snapshot.
    pub fn capture(&self, snapshot: &PageSnapshot) -> ExecutionContext {
        let (hostname, pathname) = split_url(&snapshot.url);
        let outline = match &snapshot.root {
            Some(root) => build_outline(root),
            None => String::new(),
        };
        ExecutionContext {
            url: snapshot.url.clone(),
            hostname,
            pathname,
            title: snapshot.title.clone(),
            captured_at: Utc::now(),
            page_structure_hash: self.hasher.hash_structure(&outline),
        }
    }
}

fn split_url(raw: &str) -> (String, String) {
    match Url::parse(raw) {
        Ok(parsed) => (
            parsed.host_str().unwrap_or_default().to_string(),
            parsed.path().to_string(),
        ),
        Err(_) => (String::new(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use semantest_types::context::DomNode;

    use std::collections::BTreeMap;

    /// Passes the outline through unchanged so assertions can see it.
    struct IdentityHasher;

    impl StructureHasher for IdentityHasher {
        fn hash_structure(&self, outline: &str) -> String {
            outline.to_string()
        }
    }

    fn node(tag: &str) -> DomNode {
        DomNode {
            tag: tag.to_string(),
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    fn snapshot(url: &str, root: Option<DomNode>) -> PageSnapshot {
        PageSnapshot {
            url: url.to_string(),
            title: "Example".to_string(),
            root,
        }
    }

    #[test]
    fn capture_splits_url_into_hostname_and_pathname() {
        let fp = ContextFingerprinter::new(IdentityHasher);
        let ctx = fp.capture(&snapshot("https://chatgpt.com/c/abc123?x=1", None));
        assert_eq!(ctx.hostname, "chatgpt.com");
        assert_eq!(ctx.pathname, "/c/abc123");
        assert_eq!(ctx.url, "https://chatgpt.com/c/abc123?x=1");
    }

    #[test]
    fn capture_degrades_on_unparseable_url() {
        let fp = ContextFingerprinter::new(IdentityHasher);
        let ctx = fp.capture(&snapshot("not a url", None));
        assert_eq!(ctx.hostname, "");
        assert_eq!(ctx.pathname, "");
        assert_eq!(ctx.page_structure_hash, "");
    }

    #[test]
    fn same_layout_with_different_generated_classes_hashes_identically() {
        let fp = ContextFingerprinter::new(IdentityHasher);

        let mut first = node("body");
        let mut first_form = node("form");
        first_form.classes = vec!["css-abc123".to_string(), "composer".to_string()];
        first.children.push(first_form);

        let mut second = node("body");
        let mut second_form = node("form");
        second_form.classes = vec!["css-zzz999".to_string(), "composer".to_string()];
        second.children.push(second_form);

        let a = fp.capture(&snapshot("https://chatgpt.com/", Some(first)));
        let b = fp.capture(&snapshot("https://chatgpt.com/", Some(second)));
        assert_eq!(a.page_structure_hash, b.page_structure_hash);
    }

    #[test]
    fn different_structure_hashes_differently() {
        let fp = ContextFingerprinter::new(IdentityHasher);

        let mut with_form = node("body");
        with_form.children.push(node("form"));
        let without_form = node("body");

        let a = fp.capture(&snapshot("https://chatgpt.com/", Some(with_form)));
        let b = fp.capture(&snapshot("https://chatgpt.com/", Some(without_form)));
        assert_ne!(a.page_structure_hash, b.page_structure_hash);
    }
}
