//! Gallery configuration module.
//!
//! Handles loading, validating, and merging `gallery.toml`. Stock defaults are
//! overridden key-by-key by the user file, so a config only needs the values
//! it wants to change. The one required integration point for new content is
//! the `[projects]` table: adding a project means adding one entry.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! portfolio_base = "../assets/img/portfolio"
//! skip_projects = ["boilerplate"]
//!
//! [projects]
//! trashscan = ["6.jpg", "7.jpg", "8.jpg"]
//!
//! [fallback]
//! max_number = 20
//! extensions = ["png", "jpg", "jpeg", "gif", "webp"]
//! named_prefixes = ["screenshot", "img", "image"]
//! named_max = 10
//! root_extensions = ["png", "jpg"]
//!
//! [probe]
//! timeout_ms = 5000
//! max_concurrency = 16      # probes in flight, 1..=64
//!
//! [markup]
//! section_class = "screenshot-carousel"
//! wrapper_class = "swiper-wrapper"
//! slide_class = "swiper-slide"
//! image_class = "img-fluid"
//! lightbox_class = "glightbox"
//! gallery_group = "gallery1"
//! carousel_init_class = "init-swiper"
//!
//! [widgets]
//! carousel_script = "swiper"
//! lightbox_script = "glightbox"
//! carousel_delay_ms = 100
//! lightbox_delay_ms = 200
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration loaded from `gallery.toml`.
///
/// Immutable once loaded; the pipeline borrows it for the whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Directory (relative to the page, or absolute) holding `<key>-imgs/` folders.
    pub portfolio_base: String,
    /// Project keys that never get a gallery (template pages).
    pub skip_projects: Vec<String>,
    /// Project key → ordered image filenames inside `<key>-imgs/`.
    pub projects: BTreeMap<String, Vec<String>>,
    /// Brute-force enumeration used for unconfigured projects.
    pub fallback: FallbackConfig,
    /// Existence probing settings.
    pub probe: ProbeConfig,
    /// Class names and grouping used to find the container and build slides.
    pub markup: MarkupConfig,
    /// Carousel/lightbox detection and re-initialisation settings.
    pub widgets: WidgetsConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            portfolio_base: "../assets/img/portfolio".to_string(),
            skip_projects: vec!["boilerplate".to_string()],
            projects: BTreeMap::new(),
            fallback: FallbackConfig::default(),
            probe: ProbeConfig::default(),
            markup: MarkupConfig::default(),
            widgets: WidgetsConfig::default(),
        }
    }
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probe.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "probe.timeout_ms must be greater than 0".into(),
            ));
        }
        if self
            .probe
            .max_concurrency
            .is_some_and(|n| !(1..=MAX_PROBE_CONCURRENCY).contains(&n))
        {
            return Err(ConfigError::Validation(format!(
                "probe.max_concurrency must be between 1 and {MAX_PROBE_CONCURRENCY}"
            )));
        }
        if self.fallback.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "fallback.extensions must not be empty".into(),
            ));
        }
        for (name, value) in self.markup.classes() {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "markup.{name} must not be empty"
                )));
            }
        }
        for (project, files) in &self.projects {
            if files.iter().any(|f| f.trim().is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "projects.{project} contains an empty filename"
                )));
            }
        }
        Ok(())
    }

    /// Whether the key names a page that must never get a gallery.
    pub fn is_skipped(&self, key: &str) -> bool {
        key.is_empty() || self.skip_projects.iter().any(|p| p == key)
    }
}

/// Fallback enumeration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FallbackConfig {
    /// Highest number tried for `<n>.<ext>` and `<nn>.<ext>`.
    pub max_number: u32,
    /// Extensions tried for every numbered and named candidate.
    pub extensions: Vec<String>,
    /// Name stems tried as `<name><n>.<ext>`.
    pub named_prefixes: Vec<String>,
    /// Highest number tried for named candidates.
    pub named_max: u32,
    /// Extensions for the last-resort `<base>/<key>.<ext>` single images.
    pub root_extensions: Vec<String>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            max_number: 20,
            extensions: ["png", "jpg", "jpeg", "gif", "webp"]
                .map(String::from)
                .to_vec(),
            named_prefixes: ["screenshot", "img", "image"].map(String::from).to_vec(),
            named_max: 10,
            root_extensions: ["png", "jpg"].map(String::from).to_vec(),
        }
    }
}

/// Existence probing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// Per-probe timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of probes in flight.
    /// When absent, [`DEFAULT_PROBE_CONCURRENCY`]. Probes wait on I/O, so
    /// this is independent of the core count; at most [`MAX_PROBE_CONCURRENCY`].
    pub max_concurrency: Option<usize>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            max_concurrency: None,
        }
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Probes in flight when `probe.max_concurrency` is not set.
pub const DEFAULT_PROBE_CONCURRENCY: usize = 16;

/// Upper bound for `probe.max_concurrency`.
pub const MAX_PROBE_CONCURRENCY: usize = 64;

/// Resolve the effective probe pool size from config.
///
/// - `None` → [`DEFAULT_PROBE_CONCURRENCY`]
/// - `Some(n)` → `n`, kept within `1..=MAX_PROBE_CONCURRENCY`
pub fn effective_threads(config: &ProbeConfig) -> usize {
    config
        .max_concurrency
        .unwrap_or(DEFAULT_PROBE_CONCURRENCY)
        .clamp(1, MAX_PROBE_CONCURRENCY)
}

/// Class names the host page uses for the carousel and lightbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkupConfig {
    /// Class of the carousel section that holds the container.
    pub section_class: String,
    /// Class of the container element slides are mounted into.
    pub wrapper_class: String,
    /// Class of each slide element.
    pub slide_class: String,
    /// Class of each `<img>`.
    pub image_class: String,
    /// Class the lightbox library binds to on each link.
    pub lightbox_class: String,
    /// `data-gallery` value shared by every slide link.
    pub gallery_group: String,
    /// Extra class on the section when the carousel auto-initialises.
    pub carousel_init_class: String,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            section_class: "screenshot-carousel".to_string(),
            wrapper_class: "swiper-wrapper".to_string(),
            slide_class: "swiper-slide".to_string(),
            image_class: "img-fluid".to_string(),
            lightbox_class: "glightbox".to_string(),
            gallery_group: "gallery1".to_string(),
            carousel_init_class: "init-swiper".to_string(),
        }
    }
}

impl MarkupConfig {
    fn classes(&self) -> [(&'static str, &str); 7] {
        [
            ("section_class", &self.section_class),
            ("wrapper_class", &self.wrapper_class),
            ("slide_class", &self.slide_class),
            ("image_class", &self.image_class),
            ("lightbox_class", &self.lightbox_class),
            ("gallery_group", &self.gallery_group),
            ("carousel_init_class", &self.carousel_init_class),
        ]
    }

    /// CSS selector matching every link of this gallery's lightbox set.
    pub fn group_selector(&self) -> String {
        format!(
            ".{}[data-gallery=\"{}\"]",
            self.lightbox_class, self.gallery_group
        )
    }

    /// CSS selector of the auto-initialised carousel section.
    pub fn carousel_selector(&self) -> String {
        format!(".{}.{}", self.section_class, self.carousel_init_class)
    }
}

/// Widget detection and re-initialisation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WidgetsConfig {
    /// Substring of a `<script src>` that signals the carousel library.
    pub carousel_script: String,
    /// Substring of a `<script src>` that signals the lightbox library.
    pub lightbox_script: String,
    /// Settle delay before the carousel update call.
    pub carousel_delay_ms: u64,
    /// Settle delay before the lightbox re-initialisation.
    pub lightbox_delay_ms: u64,
}

impl Default for WidgetsConfig {
    fn default() -> Self {
        Self {
            carousel_script: "swiper".to_string(),
            lightbox_script: "glightbox".to_string(),
            carousel_delay_ms: 100,
            lightbox_delay_ms: 200,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(GalleryConfig::default())?)
}

/// Lay a user `gallery.toml` over the stock defaults.
///
/// Sections (`[fallback]`, `[probe]`, `[markup]`, `[widgets]`) merge key by
/// key, so `[probe] timeout_ms = 2000` keeps the stock `max_concurrency`.
/// `[projects]` merges per project. Lists such as `skip_projects` or
/// `fallback.extensions` are replaced whole, never concatenated.
pub fn merge_toml(stock: toml::Value, user: toml::Value) -> toml::Value {
    match (stock, user) {
        (toml::Value::Table(mut merged), toml::Value::Table(user)) => {
            for (key, value) in user {
                let value = match merged.remove(&key) {
                    Some(stock) => merge_toml(stock, value),
                    None => value,
                };
                merged.insert(key, value);
            }
            toml::Value::Table(merged)
        }
        (_, user) => user,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<GalleryConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `gallery.toml` from `path`, falling back to stock defaults when absent.
pub fn load_config(path: &Path) -> Result<GalleryConfig, ConfigError> {
    resolve_config(load_raw_config(path)?)
}

/// Returns a fully-commented stock `gallery.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Project Gallery Configuration
# =============================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Where project image folders live, relative to the page (or absolute).
# Images are looked up in <portfolio_base>/<project>-imgs/.
portfolio_base = "../assets/img/portfolio"

# Pages whose project key is listed here never get a gallery.
skip_projects = ["boilerplate"]

# ---------------------------------------------------------------------------
# Projects
# ---------------------------------------------------------------------------
# Project key (page filename without extension) -> ordered image filenames.
# Unlisted projects fall back to brute-force filename detection.
[projects]
# trashscan = ["6.jpg", "7.jpg", "8.jpg"]

# ---------------------------------------------------------------------------
# Fallback detection for unconfigured projects
# ---------------------------------------------------------------------------
[fallback]
# Try 1..max_number and 01..max_number with every extension.
max_number = 20
extensions = ["png", "jpg", "jpeg", "gif", "webp"]

# Then <prefix>1..<prefix><named_max> with every extension.
named_prefixes = ["screenshot", "img", "image"]
named_max = 10

# Finally <portfolio_base>/<project>.<ext> for each of these.
root_extensions = ["png", "jpg"]

# ---------------------------------------------------------------------------
# Probing
# ---------------------------------------------------------------------------
[probe]
# Per-image timeout in milliseconds.
timeout_ms = 5000

# Maximum probes in flight, 1 to 64. Probes mostly wait on the network, so
# this does not depend on the number of CPU cores.
# max_concurrency = 16

# ---------------------------------------------------------------------------
# Markup
# ---------------------------------------------------------------------------
[markup]
section_class = "screenshot-carousel"
wrapper_class = "swiper-wrapper"
slide_class = "swiper-slide"
image_class = "img-fluid"
lightbox_class = "glightbox"
gallery_group = "gallery1"
carousel_init_class = "init-swiper"

# ---------------------------------------------------------------------------
# Widgets
# ---------------------------------------------------------------------------
[widgets]
# Substrings of <script src> used to detect the libraries on a page.
carousel_script = "swiper"
lightbox_script = "glightbox"

# Settle delays before re-initialisation, in milliseconds.
carousel_delay_ms = 100
lightbox_delay_ms = 200
"##
}
