//! CLI output formatting.
//!
//! Output is **project-centric**: each page is shown by its project key, the
//! verified images follow as indexed filename lines, and the outcome closes
//! the block. Paths only appear as secondary context.
//!
//! # Output Format
//!
//! ## Render / Check
//!
//! ```text
//! trashscan (configured, 12 candidates)
//!     001 6.jpg
//!     002 7.jpg
//!     → rendered 2 slides
//!     → portfolio/trashscan.html
//! glutaga (fallback, 297 candidates)
//!     → no images found
//! boilerplate
//!     → skipped: no project
//!
//! Rendered 1 page, 1 empty, 0 errors, 1 skipped
//! ```
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure.

use crate::candidates::CandidateMode;
use crate::gallery::{GalleryReport, GalleryState, SkipReason};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Header line: project key, plus candidate source when the run got that far.
///
/// ```text
/// trashscan (configured, 12 candidates)
/// boilerplate
/// ```
fn report_header(report: &GalleryReport) -> String {
    let project = if report.project.is_empty() {
        "(no project)"
    } else {
        report.project.as_str()
    };
    match report.mode {
        Some(mode) => {
            let mode = match mode {
                CandidateMode::Configured => "configured",
                CandidateMode::Fallback => "fallback",
            };
            format!(
                "{} ({}, {})",
                project,
                mode,
                plural(report.candidates, "candidate", "candidates")
            )
        }
        None => project.to_string(),
    }
}

fn outcome_line(report: &GalleryReport) -> String {
    let outcome = match (report.skipped, &report.state) {
        (Some(SkipReason::NoContainer), _) => "skipped: no gallery container".to_string(),
        (Some(SkipReason::NoProject), _) => "skipped: no project".to_string(),
        (None, GalleryState::Rendered { slides }) => {
            format!("rendered {}", plural(*slides, "slide", "slides"))
        }
        (None, GalleryState::Empty) => "no images found".to_string(),
        (None, GalleryState::Error { message }) => format!("error: {message}"),
        (None, state) => format!("{state:?}").to_lowercase(),
    };
    format!("{}→ {}", indent(1), outcome)
}

/// Format one page report.
pub fn format_report(report: &GalleryReport) -> Vec<String> {
    let mut lines = vec![report_header(report)];
    for (i, image) in report.images.iter().enumerate() {
        lines.push(format!(
            "{}{} {}",
            indent(1),
            format_index(i + 1),
            image.filename()
        ));
    }
    lines.push(outcome_line(report));
    lines
}

/// Format the line naming where a page was written.
pub fn format_written(path: &Path) -> String {
    format!("{}→ {}", indent(1), path.display())
}

/// Format a page that could not be processed at all.
///
/// ```text
/// portfolio/bad.html
///     → failed: IO error: stream did not contain valid UTF-8
/// ```
pub fn format_page_error(path: &Path, error: &dyn std::error::Error) -> Vec<String> {
    vec![
        path.display().to_string(),
        format!("{}→ failed: {}", indent(1), error),
    ]
}

/// Format the closing tally over all pages.
///
/// `failed_pages` counts pages that never produced a report; they are
/// tallied as errors.
pub fn format_summary(reports: &[&GalleryReport], failed_pages: usize) -> String {
    let mut rendered = 0;
    let mut empty = 0;
    let mut errors = failed_pages;
    let mut skipped = 0;
    for report in reports {
        if report.skipped.is_some() {
            skipped += 1;
            continue;
        }
        match report.state {
            GalleryState::Rendered { .. } => rendered += 1,
            GalleryState::Empty => empty += 1,
            GalleryState::Error { .. } => errors += 1,
            GalleryState::Idle | GalleryState::Loading => {}
        }
    }
    format!(
        "Rendered {}, {} empty, {}, {} skipped",
        plural(rendered, "page", "pages"),
        empty,
        plural(errors, "error", "errors"),
        skipped
    )
}

pub fn print_report(report: &GalleryReport, written: Option<&Path>) {
    for line in format_report(report) {
        println!("{}", line);
    }
    if let Some(path) = written {
        println!("{}", format_written(path));
    }
}

pub fn print_page_error(path: &Path, error: &dyn std::error::Error) {
    for line in format_page_error(path, error) {
        println!("{}", line);
    }
}

pub fn print_summary(reports: &[&GalleryReport], failed_pages: usize) {
    println!();
    println!("{}", format_summary(reports, failed_pages));
}
