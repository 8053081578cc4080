//! Carousel and lightbox re-initialisation.
//!
//! Both widgets are optional collaborators. The bridge holds nullable handles
//! to a [`Carousel`] and a [`Lightbox`] capability and calls whichever is
//! present after the slides are mounted; a missing widget is simply skipped.
//!
//! For static pages the capabilities are scripted: [`ScriptedSwiper`] and
//! [`ScriptedGLightbox`] record the JavaScript the browser should run once the
//! page loads, and [`reinit_script`] bundles those statements into a single
//! marked `<script>` block. Each statement is wrapped in a short `setTimeout`
//! so the carousel sees the final DOM; nothing depends on the delay for
//! correctness since the slides are already in the served HTML.

use crate::config::{MarkupConfig, WidgetsConfig};
use crate::page::SCRIPT_MARKER;
use maud::{Markup, PreEscaped, html};

/// A carousel that can re-scan its slides.
pub trait Carousel {
    fn update(&mut self);
}

/// A lightbox that can be (re)bound to a set of links.
pub trait Lightbox {
    fn reinitialize(&mut self, selector: &str);
}

/// Notifies whichever widgets are present that the gallery content changed.
#[derive(Default)]
pub struct WidgetBridge<'a> {
    carousel: Option<&'a mut dyn Carousel>,
    lightbox: Option<&'a mut dyn Lightbox>,
}

impl<'a> WidgetBridge<'a> {
    pub fn new(
        carousel: Option<&'a mut dyn Carousel>,
        lightbox: Option<&'a mut dyn Lightbox>,
    ) -> Self {
        Self { carousel, lightbox }
    }

    /// A bridge with no widgets attached.
    pub fn none() -> Self {
        Self::default()
    }

    /// Refresh both widgets. Returns `(carousel_refreshed, lightbox_refreshed)`.
    pub fn refresh(&mut self, group_selector: &str) -> (bool, bool) {
        let carousel = match self.carousel.as_deref_mut() {
            Some(carousel) => {
                carousel.update();
                true
            }
            None => false,
        };
        let lightbox = match self.lightbox.as_deref_mut() {
            Some(lightbox) => {
                lightbox.reinitialize(group_selector);
                true
            }
            None => false,
        };
        tracing::debug!(carousel, lightbox, "widgets refreshed");
        (carousel, lightbox)
    }
}

/// Encode a string as a JavaScript string literal.
fn js_string(value: &str) -> String {
    // JSON strings are valid JS; escape `</` so the literal cannot close the script
    serde_json::to_string(value)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace("</", "<\\/")
}

/// Swiper carousel driven from an inline script.
#[derive(Debug, Clone)]
pub struct ScriptedSwiper {
    selector: String,
    delay_ms: u64,
    statement: Option<String>,
}

impl ScriptedSwiper {
    pub fn new(markup: &MarkupConfig, widgets: &WidgetsConfig) -> Self {
        Self {
            selector: markup.carousel_selector(),
            delay_ms: widgets.carousel_delay_ms,
            statement: None,
        }
    }

    pub fn statement(&self) -> Option<&str> {
        self.statement.as_deref()
    }
}

impl Carousel for ScriptedSwiper {
    fn update(&mut self) {
        self.statement = Some(format!(
            "setTimeout(function () {{ var el = document.querySelector({}); \
             if (el && el.swiper) {{ el.swiper.update(); }} }}, {});",
            js_string(&self.selector),
            self.delay_ms
        ));
    }
}

/// GLightbox driven from an inline script.
#[derive(Debug, Clone)]
pub struct ScriptedGLightbox {
    delay_ms: u64,
    statement: Option<String>,
}

impl ScriptedGLightbox {
    pub fn new(widgets: &WidgetsConfig) -> Self {
        Self {
            delay_ms: widgets.lightbox_delay_ms,
            statement: None,
        }
    }

    pub fn statement(&self) -> Option<&str> {
        self.statement.as_deref()
    }
}

impl Lightbox for ScriptedGLightbox {
    fn reinitialize(&mut self, selector: &str) {
        self.statement = Some(format!(
            "setTimeout(function () {{ if (typeof GLightbox !== 'undefined') \
             {{ GLightbox({{ selector: {} }}); }} }}, {});",
            js_string(selector),
            self.delay_ms
        ));
    }
}

/// Bundle recorded widget statements into one marked script block.
///
/// Returns `None` when no widget recorded anything.
pub fn reinit_script(
    carousel: Option<&ScriptedSwiper>,
    lightbox: Option<&ScriptedGLightbox>,
) -> Option<Markup> {
    let statements: Vec<&str> = [
        carousel.and_then(ScriptedSwiper::statement),
        lightbox.and_then(ScriptedGLightbox::statement),
    ]
    .into_iter()
    .flatten()
    .collect();

    if statements.is_empty() {
        return None;
    }
    let body = statements.join("\n");
    Some(html! {
        script data-project-gallery { (PreEscaped(body)) }
    })
}
