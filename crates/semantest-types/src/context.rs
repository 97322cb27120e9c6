//! Page execution context: the captured "shape" of the page a request runs on.
//!
//! An [`ExecutionContext`] is derived from a [`PageSnapshot`] the browser
//! extension ships alongside each automation command. It is immutable once
//! captured: created fresh for every request, embedded into a pattern at
//! learning time, never persisted standalone.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A lightweight DOM outline node as serialized by the extension content
/// script. Carries only structural information -- tag, stable attributes,
/// children -- never text content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomNode {
    /// Lowercase tag name (e.g. "div", "textarea").
    pub tag: String,
    /// The element's `id` attribute, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Class list as written in the document.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    /// Remaining attributes (role, name, type, ...). Sorted map so the
    /// serialized form is stable.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// Child elements in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DomNode>,
}

/// Raw page state delivered with an automation command.
///
/// The fingerprinter turns this into an [`ExecutionContext`]; nothing else
/// in the engine reads it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Full page URL as reported by the extension.
    pub url: String,
    /// Document title.
    #[serde(default)]
    pub title: String,
    /// DOM outline rooted at `<body>`. Absent when the extension could not
    /// walk the document (e.g. a detached frame); the fingerprint degrades
    /// but capture still succeeds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<DomNode>,
}

/// The captured shape of a page at a single point in time.
///
/// Two contexts describe "the same page" at increasing levels of confidence:
/// same hostname, same hostname + pathname, same structure hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Full URL the snapshot was taken from.
    pub url: String,
    /// Hostname component ("chatgpt.com"). Empty when the URL is unparsable.
    pub hostname: String,
    /// Path component ("/g/projects"). Empty when the URL is unparsable.
    pub pathname: String,
    /// Document title at capture time.
    pub title: String,
    /// When this context was captured.
    pub captured_at: DateTime<Utc>,
    /// Structural digest of the DOM outline: tag names, stable attributes,
    /// and nesting depth. Text content and generated class names do not
    /// contribute, so a re-rendered page with different copy hashes the same.
    pub page_structure_hash: String,
}

impl ExecutionContext {
    /// Same site as `other`.
    pub fn same_hostname(&self, other: &ExecutionContext) -> bool {
        self.hostname == other.hostname
    }

    /// Same site and same path as `other`.
    pub fn same_page(&self, other: &ExecutionContext) -> bool {
        self.same_hostname(other) && self.pathname == other.pathname
    }

    /// Structurally identical to `other` (digest match).
    pub fn same_structure(&self, other: &ExecutionContext) -> bool {
        self.page_structure_hash == other.page_structure_hash
    }
}
