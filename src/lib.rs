//! # Project Gallery
//!
//! Populates the screenshot carousel on static portfolio pages. For each page
//! it works out which project the page is about, finds the screenshots that
//! actually exist for that project, orders them, and writes them into the
//! page's carousel as slides with lightbox links.
//!
//! # Architecture: One-Shot Pipeline
//!
//! Every page goes through the same linear pipeline, once, with no feedback
//! loops and nothing persisted between runs:
//!
//! ```text
//! 1. Resolve    page path   →  project key        (trashscan.html → trashscan)
//! 2. Generate   project     →  candidate URLs     (configured list, or fallback names)
//! 3. Probe      candidates  →  verified images    (concurrent, order preserved)
//! 4. Sequence   images      →  display order      (first number in the filename)
//! 5. Render     images      →  slide markup       (Maud)
//! 6. Refresh    widgets     →  re-init script     (Swiper update, GLightbox rebind)
//! ```
//!
//! Stages 1, 2, 4 and 5 are pure functions. Probing goes through the
//! [`probe::ExistenceChecker`] capability so it can run against a local site
//! checkout, a deployed site over HTTP, or a mock in tests.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`project`] | Derive the project key from a page path |
//! | [`candidates`] | Candidate image URLs from config or the fallback naming scheme |
//! | [`probe`] | Concurrent existence probing; filesystem and HTTP checkers |
//! | [`sequence`] | Numeric filename ordering |
//! | [`render`] | Slide and placeholder markup using Maud |
//! | [`page`] | Locate and replace the carousel container in a page |
//! | [`widgets`] | Carousel/lightbox capabilities and the scripted re-init block |
//! | [`gallery`] | Pipeline orchestration and the `Idle → Loading → …` state machine |
//! | [`site`] | Page files on disk: walk, run, inject script, write |
//! | [`config`] | `gallery.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## Probe, Don't Trust
//!
//! A configured filename list is a hint, not the truth. Every candidate is
//! loaded as an image before it becomes a slide, so a stale list costs a
//! missing slide instead of a broken image. When a project has no list at
//! all, a brute-force naming scheme is probed instead; that is slow, so it is
//! logged as a warning.
//!
//! ## Failure Stays Inside the Container
//!
//! Nothing the pipeline does can break the rest of the page. A run ends with
//! real slides, the "no images" placeholder, or the error placeholder in the
//! container, and the caller gets a [`gallery::GalleryReport`] instead of an
//! error.
//!
//! ## Idempotent Writes
//!
//! The container contents are replaced wholesale and the widget script is a
//! single marked block that is swapped on each run, so running over an
//! already-processed page produces the same file.

pub mod candidates;
pub mod config;
pub mod gallery;
pub mod logging;
pub mod output;
pub mod page;
pub mod probe;
pub mod project;
pub mod render;
pub mod sequence;
pub mod site;
pub mod widgets;

#[cfg(test)]
pub(crate) mod test_helpers;
