//! Project key resolution from the page location.
//!
//! Every portfolio page is named after its project: `trashscan.html` shows the
//! `trashscan` gallery. The key is the final path segment with its extension
//! removed. Resolution never fails; anything unexpected yields an empty key,
//! which the pipeline treats as "no gallery".

use serde::Serialize;
use std::fmt;

/// Identifier for a portfolio project, derived from the page path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProjectKey(String);

impl ProjectKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ProjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve the project key for a page path or URL path.
///
/// - `"/portfolio/trashscan.html"` → `"trashscan"`
/// - `"glutaga.htm"` → `"glutaga"`
/// - `"/portfolio/"` → `""` (directory index, no gallery)
/// - `"/portfolio/nexus.html?tab=2#shots"` → `"nexus"`
/// - `"C:\\site\\sari.html"` → `"sari"`
pub fn resolve_project_key(path: &str) -> ProjectKey {
    let path = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let segment = path.rsplit(['/', '\\']).next().unwrap_or_default();
    let stem = match segment.rfind('.') {
        // A leading dot is a hidden file, not an extension
        Some(dot) if dot > 0 => &segment[..dot],
        _ => segment,
    };
    ProjectKey(stem.trim().to_string())
}
