//! Page-file driver.
//!
//! Takes portfolio pages on disk through the gallery pipeline:
//!
//! 1. Read the page and detect which widget libraries it loads.
//! 2. Pick a checker: the local site tree, or the deployed site over HTTP.
//! 3. Run [`Gallery::load`] with scripted widgets attached.
//! 4. Install (or replace, or remove) the widget re-initialisation script.
//!
//! Running a page through twice yields the same file: the container is
//! replaced wholesale and the script block is owned and swapped, never
//! appended.

use crate::config::GalleryConfig;
use crate::gallery::{Gallery, GalleryReport};
use crate::page::HtmlPage;
use crate::probe::{ExistenceChecker, FsChecker, HttpChecker, ProbeError};
use crate::widgets::{Carousel, Lightbox, ScriptedGLightbox, ScriptedSwiper, WidgetBridge, reinit_script};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum PageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Probe setup error: {0}")]
    Probe(#[from] ProbeError),
}

/// Where candidate images are looked up.
#[derive(Debug, Clone)]
pub enum ProbeSource {
    /// The local site tree. Root-relative URLs resolve against `site_root`,
    /// or the page input root when unset.
    Filesystem { site_root: Option<PathBuf> },
    /// The deployed site; `base_url` is the URL of the directory that
    /// corresponds to the page input root.
    Http { base_url: String },
}

/// A page found on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInput {
    pub path: PathBuf,
    /// Directory the page was found under (its parent for single files).
    pub root: PathBuf,
    /// Path relative to `root`.
    pub relative: PathBuf,
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
}

/// Expand files and directories into the pages to process, sorted per root.
pub fn collect_pages(paths: &[PathBuf]) -> Result<Vec<PageInput>, PageError> {
    let mut pages = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry?;
                if entry.file_type().is_file() && is_html(entry.path()) {
                    let relative = entry
                        .path()
                        .strip_prefix(path)
                        .unwrap_or(entry.path())
                        .to_path_buf();
                    found.push(PageInput {
                        path: entry.path().to_path_buf(),
                        root: path.clone(),
                        relative,
                    });
                }
            }
            pages.extend(found);
        } else {
            let root = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            let relative = path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| path.clone());
            pages.push(PageInput {
                path: path.clone(),
                root,
                relative,
            });
        }
    }
    Ok(pages)
}

/// Outcome of running one page.
#[derive(Debug, Clone)]
pub struct PageResult {
    pub input: PageInput,
    pub report: GalleryReport,
    pub html: String,
    pub changed: bool,
}

/// Run the pipeline over an HTML document already in memory.
///
/// Returns the report and the resulting document.
pub fn render_html(
    page_path: &str,
    html: &str,
    config: &GalleryConfig,
    checker: &dyn ExistenceChecker,
) -> (GalleryReport, String) {
    let mut page = HtmlPage::new(html, &config.markup);
    let (has_carousel, has_lightbox) = page.detect_widgets(&config.widgets);
    let mut swiper = has_carousel.then(|| ScriptedSwiper::new(&config.markup, &config.widgets));
    let mut glightbox = has_lightbox.then(|| ScriptedGLightbox::new(&config.widgets));

    let report = {
        let mut bridge = WidgetBridge::new(
            swiper.as_mut().map(|s| s as &mut dyn Carousel),
            glightbox.as_mut().map(|g| g as &mut dyn Lightbox),
        );
        Gallery::new(config, checker).load(page_path, &mut page, &mut bridge)
    };

    if report.skipped.is_none() {
        page.set_script(reinit_script(swiper.as_ref(), glightbox.as_ref()));
    }
    (report, page.into_string())
}

/// URL of a page under `base_url`.
fn page_url(base_url: &str, relative: &Path) -> String {
    let base = base_url.trim_end_matches('/');
    let rel: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!("{base}/{}", rel.join("/"))
}

fn checker_for(
    input: &PageInput,
    source: &ProbeSource,
    config: &GalleryConfig,
) -> Result<Box<dyn ExistenceChecker>, PageError> {
    Ok(match source {
        ProbeSource::Filesystem { site_root } => {
            let page_dir = input
                .path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            let root = site_root.clone().unwrap_or_else(|| input.root.clone());
            Box::new(FsChecker::new(page_dir, root))
        }
        ProbeSource::Http { base_url } => Box::new(HttpChecker::new(
            &page_url(base_url, &input.relative),
            config.probe.timeout(),
        )?),
    })
}

/// Read a page from disk and run it through the pipeline.
pub fn render_page(
    input: &PageInput,
    config: &GalleryConfig,
    source: &ProbeSource,
) -> Result<PageResult, PageError> {
    let before = fs::read_to_string(&input.path)?;
    let checker = checker_for(input, source, config)?;
    let page_path = input.relative.to_string_lossy();
    let (report, html) = render_html(&page_path, &before, config, checker.as_ref());
    Ok(PageResult {
        input: input.clone(),
        changed: html != before,
        report,
        html,
    })
}

/// Write a rendered page in place, or under `out_dir` at its relative path.
///
/// Unchanged pages are not rewritten in place. Returns the written path.
pub fn write_page(result: &PageResult, out_dir: Option<&Path>) -> Result<Option<PathBuf>, PageError> {
    let target = match out_dir {
        Some(dir) => dir.join(&result.input.relative),
        None if !result.changed => return Ok(None),
        None => result.input.path.clone(),
    };
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, &result.html)?;
    Ok(Some(target))
}
