//! Shared test utilities for the project-gallery test suite.
//!
//! Provides a recording [`MockChecker`], candidate builders, real image
//! writers, and a fixture site copied into a temp directory.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let checker = MockChecker::with_existing(&["../img/p-imgs/1.jpg"]);
//! let found = probe(&candidates(&["../img/p-imgs/1.jpg"]), &checker, 2).unwrap();
//! assert_eq!(found.len(), 1);
//! assert_eq!(checker.calls(), vec!["../img/p-imgs/1.jpg"]);
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

use crate::candidates::Candidate;
use crate::probe::{ExistenceChecker, ProbeError};

/// Minimal portfolio page with a carousel and both widget libraries.
pub const PAGE_WITH_CAROUSEL: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Project</title>
</head>
<body>
  <section id="screenshots">
    <div class="screenshot-carousel init-swiper swiper">
      <div class="swiper-wrapper">
        <div class="swiper-slide"><p class="text-center p-5">Loading gallery...</p></div>
      </div>
      <div class="swiper-pagination"></div>
    </div>
  </section>
  <script src="../assets/vendor/swiper/swiper-bundle.min.js"></script>
  <script src="../assets/vendor/glightbox/js/glightbox.min.js"></script>
</body>
</html>
"#;

// =========================================================================
// Mock existence checker
// =========================================================================

type DelayFn = Box<dyn Fn(&str) -> Duration + Send + Sync>;

/// Existence checker backed by a fixed URL set that records every call.
/// Mutex-backed so one checker can be shared across the probe pool.
#[derive(Default)]
pub struct MockChecker {
    existing: HashSet<String>,
    failing: HashSet<String>,
    delay: Option<DelayFn>,
    calls: Mutex<Vec<String>>,
}

impl MockChecker {
    /// A checker for which nothing exists.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_existing<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            existing: urls.into_iter().map(|u| u.as_ref().to_string()).collect(),
            ..Self::default()
        }
    }

    /// Make the check for `url` return an error instead of an answer.
    pub fn failing_on(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    /// Sleep before answering, per URL.
    pub fn with_delay(mut self, delay: impl Fn(&str) -> Duration + Send + Sync + 'static) -> Self {
        self.delay = Some(Box::new(delay));
        self
    }

    /// URLs checked so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ExistenceChecker for MockChecker {
    fn exists(&self, url: &str) -> Result<bool, ProbeError> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(delay) = &self.delay {
            std::thread::sleep(delay(url));
        }
        if self.failing.contains(url) {
            return Err(ProbeError::InvalidUrl {
                url: url.to_string(),
                reason: "mock failure".to_string(),
            });
        }
        Ok(self.existing.contains(url))
    }
}

/// Candidates in the given order.
pub fn candidates(urls: &[&str]) -> Vec<Candidate> {
    urls.iter()
        .enumerate()
        .map(|(position, url)| Candidate {
            url: url.to_string(),
            position,
        })
        .collect()
}

// =========================================================================
// Fixture setup
// =========================================================================

/// Write a tiny real image; the format follows the file extension.
pub fn write_image(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    image::RgbImage::from_pixel(4, 3, image::Rgb([200, 80, 40]))
        .save(path)
        .unwrap();
}

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// The fixture holds pages only; call [`write_image`] for the assets a test
/// needs so each test states exactly which images exist.
pub fn setup_site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}
