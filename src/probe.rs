//! Existence probing for candidate image URLs.
//!
//! Each candidate is tested by actually loading it as an image. A failed load
//! is a normal `false`, never an error; errors are reserved for conditions
//! that make probing itself impossible (an unparsable page URL, an HTTP
//! client or worker pool that cannot be built).
//!
//! ## Checkers
//!
//! | Checker | Source | "Exists" means |
//! |---------|--------|----------------|
//! | [`FsChecker`] | local site checkout | file present and its header decodes as an image |
//! | [`HttpChecker`] | deployed site | `2xx` to `HEAD` (or `GET` when `HEAD` is refused) with an `image/*` (or absent) content type |
//!
//! ## Concurrency
//!
//! Probes run on a dedicated [rayon](https://docs.rs/rayon) pool bounded by
//! `probe.max_concurrency`. Results are collected in input order, so the
//! output is a stable filter of the candidates no matter which probe finishes
//! first. Every candidate is probed exactly once; there is no retry.

use crate::candidates::Candidate;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
    #[error("Probe pool error: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// A candidate confirmed to load as an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifiedImage {
    pub url: String,
}

impl VerifiedImage {
    pub fn filename(&self) -> &str {
        crate::sequence::filename(&self.url)
    }
}

impl AsRef<str> for VerifiedImage {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

/// Capability to check whether a URL resolves to a loadable image.
///
/// `Sync` so a single checker can be shared across the probe pool.
pub trait ExistenceChecker: Sync {
    /// `Ok(false)` for anything that does not load; `Err` only when the
    /// check cannot be performed at all.
    fn exists(&self, url: &str) -> Result<bool, ProbeError>;
}

/// Probe every candidate and keep the ones that load, in input order.
///
/// An empty candidate list issues no probes and builds no pool.
pub fn probe(
    candidates: &[Candidate],
    checker: &dyn ExistenceChecker,
    threads: usize,
) -> Result<Vec<VerifiedImage>, ProbeError> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .thread_name(|i| format!("probe-{i}"))
        .build()?;

    let results: Vec<Option<VerifiedImage>> = pool.install(|| {
        candidates
            .par_iter()
            .map(|candidate| -> Result<Option<VerifiedImage>, ProbeError> {
                let found = checker.exists(&candidate.url)?;
                tracing::trace!(url = %candidate.url, position = candidate.position, found, "probed");
                Ok(found.then(|| VerifiedImage {
                    url: candidate.url.clone(),
                }))
            })
            .collect::<Result<_, ProbeError>>()
    })?;

    Ok(results.into_iter().flatten().collect())
}

// ============================================================================
// Filesystem checker
// ============================================================================

/// Checks candidates against a local copy of the site.
///
/// Relative URLs resolve against the page's directory, root-relative URLs
/// (`/assets/...`) against the site root. Remote URLs never exist locally.
#[derive(Debug, Clone)]
pub struct FsChecker {
    page_dir: PathBuf,
    site_root: PathBuf,
}

impl FsChecker {
    pub fn new(page_dir: impl Into<PathBuf>, site_root: impl Into<PathBuf>) -> Self {
        Self {
            page_dir: page_dir.into(),
            site_root: site_root.into(),
        }
    }

    /// Map a candidate URL to a local path, or `None` if it is not local.
    pub fn resolve(&self, url: &str) -> Option<PathBuf> {
        let url = url.split(['?', '#']).next().unwrap_or_default();
        if url.is_empty() || url.contains("://") || url.starts_with("//") {
            return None;
        }
        match url.strip_prefix('/') {
            Some(rooted) => Some(self.site_root.join(rooted)),
            None => Some(self.page_dir.join(url)),
        }
    }
}

fn is_loadable_image(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    image::ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map(|reader| reader.into_dimensions().is_ok())
        .unwrap_or(false)
}

impl ExistenceChecker for FsChecker {
    fn exists(&self, url: &str) -> Result<bool, ProbeError> {
        Ok(self.resolve(url).is_some_and(|path| is_loadable_image(&path)))
    }
}

// ============================================================================
// HTTP checker
// ============================================================================

/// Checks candidates against a deployed site over HTTP.
///
/// Candidate URLs are resolved against the page URL the same way a browser
/// resolves `<img src>`. Each request is bounded by the configured timeout;
/// a timeout or connection failure counts as "not found".
#[derive(Debug, Clone)]
pub struct HttpChecker {
    client: reqwest::blocking::Client,
    page_url: reqwest::Url,
}

impl HttpChecker {
    pub fn new(page_url: &str, timeout: Duration) -> Result<Self, ProbeError> {
        let page_url = reqwest::Url::parse(page_url).map_err(|e| ProbeError::InvalidUrl {
            url: page_url.to_string(),
            reason: e.to_string(),
        })?;
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { client, page_url })
    }

    pub fn page_url(&self) -> &reqwest::Url {
        &self.page_url
    }

    /// `HEAD` first; servers that refuse it get a `GET`.
    fn fetch(&self, target: reqwest::Url) -> reqwest::Result<reqwest::blocking::Response> {
        let response = self.client.head(target.clone()).send()?;
        match response.status() {
            reqwest::StatusCode::METHOD_NOT_ALLOWED | reqwest::StatusCode::NOT_IMPLEMENTED => {
                tracing::trace!(url = %target, "HEAD refused, retrying with GET");
                self.client.get(target).send()
            }
            _ => Ok(response),
        }
    }
}

impl ExistenceChecker for HttpChecker {
    fn exists(&self, url: &str) -> Result<bool, ProbeError> {
        let target = self
            .page_url
            .join(url)
            .map_err(|e| ProbeError::InvalidUrl {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        match self.fetch(target) {
            Ok(response) => {
                let is_image = response
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .is_none_or(|ct| ct.trim_start().starts_with("image/"));
                Ok(response.status().is_success() && is_image)
            }
            Err(e) => {
                if e.is_timeout() {
                    tracing::debug!(url, "probe timed out");
                }
                Ok(false)
            }
        }
    }
}
