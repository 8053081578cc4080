//! Candidate image URL generation.
//!
//! A configured project maps straight to its listed filenames. An unconfigured
//! project falls back to brute-force enumeration of common screenshot names;
//! most of those URLs do not exist and are discarded by the prober. The
//! fallback is a degraded mode and is reported as such so the operator knows
//! to add a `[projects]` entry.
//!
//! ## Fallback Order
//!
//! ```text
//! <dir>/1.png  <dir>/1.jpg ... <dir>/20.webp          plain numbers
//! <dir>/01.png <dir>/01.jpg ... <dir>/20.webp         zero-padded numbers
//! <dir>/screenshot1.png ... <dir>/image10.webp        named patterns
//! <base>/<key>.png  <base>/<key>.jpg                  last-resort singles
//! ```
//!
//! where `<dir>` is `<base>/<key>-imgs`.

use crate::config::{FallbackConfig, GalleryConfig};
use crate::project::ProjectKey;
use serde::Serialize;
use std::collections::HashSet;

/// A URL hypothesized to point at an existing image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: String,
    /// Position in generation order.
    pub position: usize,
}

/// How the candidate list was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateMode {
    Configured,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct CandidateSet {
    pub mode: CandidateMode,
    pub candidates: Vec<Candidate>,
}

impl CandidateSet {
    fn from_urls(mode: CandidateMode, urls: impl IntoIterator<Item = String>) -> Self {
        let mut seen = HashSet::new();
        let candidates = urls
            .into_iter()
            .filter(|url| seen.insert(url.clone()))
            .enumerate()
            .map(|(position, url)| Candidate { url, position })
            .collect();
        Self { mode, candidates }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn is_degraded(&self) -> bool {
        self.mode == CandidateMode::Fallback
    }
}

/// Join a base location and a relative part with exactly one `/`.
fn join_url(base: &str, part: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        part.to_string()
    } else {
        format!("{base}/{part}")
    }
}

/// Directory holding a project's images: `<base>/<key>-imgs`.
pub fn image_dir(base: &str, key: &ProjectKey) -> String {
    join_url(base, &format!("{key}-imgs"))
}

/// Build the ordered candidate list for a project.
pub fn generate_candidates(key: &ProjectKey, config: &GalleryConfig) -> CandidateSet {
    let dir = image_dir(&config.portfolio_base, key);

    if let Some(files) = config.projects.get(key.as_str()) {
        return CandidateSet::from_urls(
            CandidateMode::Configured,
            files.iter().map(|f| join_url(&dir, f.trim_start_matches('/'))),
        );
    }

    tracing::warn!(
        project = %key,
        "no gallery configuration for \"{key}\", using fallback detection; add a [projects] entry"
    );
    CandidateSet::from_urls(
        CandidateMode::Fallback,
        fallback_urls(&dir, &config.portfolio_base, key, &config.fallback),
    )
}

fn fallback_urls(
    dir: &str,
    base: &str,
    key: &ProjectKey,
    policy: &FallbackConfig,
) -> Vec<String> {
    let mut urls = Vec::new();
    let exts = &policy.extensions;

    for n in 1..=policy.max_number {
        for ext in exts {
            urls.push(join_url(dir, &format!("{n}.{ext}")));
        }
    }
    for n in 1..=policy.max_number {
        for ext in exts {
            urls.push(join_url(dir, &format!("{n:02}.{ext}")));
        }
    }
    for name in &policy.named_prefixes {
        for n in 1..=policy.named_max {
            for ext in exts {
                urls.push(join_url(dir, &format!("{name}{n}.{ext}")));
            }
        }
    }
    for ext in &policy.root_extensions {
        urls.push(join_url(base, &format!("{key}.{ext}")));
    }
    urls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::resolve_project_key;

    fn urls(set: &CandidateSet) -> Vec<&str> {
        set.candidates.iter().map(|c| c.url.as_str()).collect()
    }

    #[test]
    fn configured_project_uses_listed_order() {
        let mut config = GalleryConfig::default();
        config.projects.insert(
            "nexus".into(),
            vec!["3.jpg".into(), "1.jpg".into(), "2.jpg".into()],
        );
        let set = generate_candidates(&resolve_project_key("nexus.html"), &config);

        assert_eq!(set.mode, CandidateMode::Configured);
        assert_eq!(
            urls(&set),
            vec![
                "../assets/img/portfolio/nexus-imgs/3.jpg",
                "../assets/img/portfolio/nexus-imgs/1.jpg",
                "../assets/img/portfolio/nexus-imgs/2.jpg",
            ]
        );
        let positions: Vec<usize> = set.candidates.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn configured_duplicates_emitted_once() {
        let mut config = GalleryConfig::default();
        config
            .projects
            .insert("x".into(), vec!["1.jpg".into(), "2.jpg".into(), "1.jpg".into()]);
        let set = generate_candidates(&resolve_project_key("x"), &config);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn configured_empty_list_yields_no_candidates() {
        let mut config = GalleryConfig::default();
        config.projects.insert("x".into(), Vec::new());
        let set = generate_candidates(&resolve_project_key("x.html"), &config);
        assert!(set.is_empty());
        assert!(!set.is_degraded());
    }

    #[test]
    fn fallback_size_and_mode() {
        let config = GalleryConfig::default();
        let set = generate_candidates(&resolve_project_key("unknown.html"), &config);

        assert!(set.is_degraded());
        // 20*5 plain + 20*5 padded (01..09 differ, 10..20 collide with plain) + 3*10*5 named + 2 singles
        let padded_unique = 9 * 5;
        assert_eq!(set.len(), 100 + padded_unique + 150 + 2);
    }

    #[test]
    fn fallback_precedence() {
        let config = GalleryConfig::default();
        let set = generate_candidates(&resolve_project_key("p.html"), &config);
        let all = urls(&set);

        assert_eq!(all[0], "../assets/img/portfolio/p-imgs/1.png");
        assert_eq!(all[1], "../assets/img/portfolio/p-imgs/1.jpg");
        assert_eq!(all[99], "../assets/img/portfolio/p-imgs/20.webp");
        assert_eq!(all[100], "../assets/img/portfolio/p-imgs/01.png");
        let named = all
            .iter()
            .position(|u| u.ends_with("/screenshot1.png"))
            .unwrap();
        assert!(named > all.iter().position(|u| u.ends_with("/09.webp")).unwrap());
        assert_eq!(all[all.len() - 2], "../assets/img/portfolio/p.png");
        assert_eq!(all[all.len() - 1], "../assets/img/portfolio/p.jpg");
    }

    #[test]
    fn fallback_policy_is_tunable() {
        let mut config = GalleryConfig::default();
        config.fallback = FallbackConfig {
            max_number: 2,
            extensions: vec!["png".into()],
            named_prefixes: vec![],
            named_max: 0,
            root_extensions: vec![],
        };
        let set = generate_candidates(&resolve_project_key("p"), &config);
        assert_eq!(
            urls(&set),
            vec![
                "../assets/img/portfolio/p-imgs/1.png",
                "../assets/img/portfolio/p-imgs/2.png",
                "../assets/img/portfolio/p-imgs/01.png",
                "../assets/img/portfolio/p-imgs/02.png",
            ]
        );
    }

    #[test]
    fn base_trailing_slash_and_empty_base() {
        assert_eq!(join_url("/img/", "a.png"), "/img/a.png");
        assert_eq!(join_url("", "a.png"), "a.png");
    }
}
