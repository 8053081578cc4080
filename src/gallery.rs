//! The gallery pipeline.
//!
//! ```text
//! page path ─▶ project key ─▶ candidates ─▶ probe ─▶ sequence ─▶ render ─▶ widgets
//! ```
//!
//! One run per page, no feedback loops. The run moves through
//!
//! ```text
//! Idle ──▶ Loading ──▶ Rendered | Empty | Error
//! ```
//!
//! and stays `Idle` when it is skipped (no container on the page, or a page
//! without a project). Every failure is contained here: the container always
//! ends up holding real slides, the empty placeholder, or the error
//! placeholder, and nothing propagates to the caller.

use crate::candidates::{CandidateMode, generate_candidates};
use crate::config::{self, GalleryConfig};
use crate::page::GalleryMount;
use crate::probe::{ExistenceChecker, ProbeError, VerifiedImage, probe};
use crate::project::{ProjectKey, resolve_project_key};
use crate::render::{render_empty, render_error, render_slides, slides};
use crate::sequence::sequence;
use crate::widgets::WidgetBridge;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Probe failed: {0}")]
    Probe(#[from] ProbeError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum GalleryState {
    Idle,
    Loading,
    Rendered { slides: usize },
    Empty,
    Error { message: String },
}

impl GalleryState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GalleryState::Loading)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoContainer,
    NoProject,
}

/// What a pipeline run did.
#[derive(Debug, Clone, Serialize)]
pub struct GalleryReport {
    pub project: ProjectKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<CandidateMode>,
    pub candidates: usize,
    pub images: Vec<VerifiedImage>,
    pub state: GalleryState,
    pub carousel_refreshed: bool,
    pub lightbox_refreshed: bool,
}

impl GalleryReport {
    fn new(project: ProjectKey) -> Self {
        Self {
            project,
            skipped: None,
            mode: None,
            candidates: 0,
            images: Vec::new(),
            state: GalleryState::Idle,
            carousel_refreshed: false,
            lightbox_refreshed: false,
        }
    }

    fn skip(mut self, reason: SkipReason) -> Self {
        self.skipped = Some(reason);
        self
    }

    fn transition(&mut self, next: GalleryState) {
        tracing::debug!(project = %self.project, from = ?self.state, to = ?next, "gallery state");
        self.state = next;
    }
}

/// Pipeline bound to one immutable configuration and one existence checker.
pub struct Gallery<'a> {
    config: &'a GalleryConfig,
    checker: &'a dyn ExistenceChecker,
}

impl<'a> Gallery<'a> {
    pub fn new(config: &'a GalleryConfig, checker: &'a dyn ExistenceChecker) -> Self {
        Self { config, checker }
    }

    /// Verified images for a project, in display order.
    pub fn discover(
        &self,
        project: &ProjectKey,
    ) -> Result<(CandidateMode, usize, Vec<VerifiedImage>), GalleryError> {
        let set = generate_candidates(project, self.config);
        let threads = config::effective_threads(&self.config.probe);
        let mut images = probe(&set.candidates, self.checker, threads)?;
        sequence(&mut images);
        Ok((set.mode, set.len(), images))
    }

    /// Run the full pipeline for the page at `page_path`.
    pub fn load(
        &self,
        page_path: &str,
        mount: &mut dyn GalleryMount,
        widgets: &mut WidgetBridge<'_>,
    ) -> GalleryReport {
        let project = resolve_project_key(page_path);
        let mut report = GalleryReport::new(project.clone());

        if !mount.has_container() {
            tracing::warn!(page = page_path, "gallery container not found, skipping");
            return report.skip(SkipReason::NoContainer);
        }
        if self.config.is_skipped(project.as_str()) {
            tracing::info!(page = page_path, "no project for this page, skipping gallery");
            return report.skip(SkipReason::NoProject);
        }

        report.transition(GalleryState::Loading);

        match self.discover(&project) {
            Ok((mode, candidates, images)) => {
                report.mode = Some(mode);
                report.candidates = candidates;

                if images.is_empty() {
                    tracing::warn!(project = %project, "no valid images found");
                    mount.mount(render_empty(&self.config.markup));
                    report.transition(GalleryState::Empty);
                    return report;
                }

                mount.mount(render_slides(
                    &slides(&images, &project),
                    &self.config.markup,
                ));
                let (carousel, lightbox) = widgets.refresh(&self.config.markup.group_selector());
                report.carousel_refreshed = carousel;
                report.lightbox_refreshed = lightbox;
                report.transition(GalleryState::Rendered {
                    slides: images.len(),
                });
                tracing::info!(project = %project, slides = images.len(), "gallery loaded");
                report.images = images;
            }
            Err(e) => {
                tracing::error!(project = %project, error = %e, "error loading gallery");
                mount.mount(render_error(&self.config.markup));
                report.transition(GalleryState::Error {
                    message: e.to_string(),
                });
            }
        }
        report
    }
}
