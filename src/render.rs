//! Slide markup.
//!
//! Uses [maud](https://maud.lambda.xyz/) so every URL and alt text is escaped
//! on interpolation. Each slide is a link/image pair; the link carries the
//! lightbox class and a shared `data-gallery` group so the lightbox treats the
//! whole carousel as one navigable set:
//!
//! ```html
//! <div class="swiper-slide">
//!   <a href="../assets/img/portfolio/nexus-imgs/1.jpg" class="glightbox" data-gallery="gallery1">
//!     <img src="../assets/img/portfolio/nexus-imgs/1.jpg" alt="nexus - Screenshot 1" class="img-fluid">
//!   </a>
//! </div>
//! ```
//!
//! When nothing can be shown, a single placeholder slide takes the place of
//! the gallery so the container is never left empty or stuck loading.

use crate::config::MarkupConfig;
use crate::probe::VerifiedImage;
use crate::project::ProjectKey;
use maud::{Markup, html};

pub const EMPTY_MESSAGE: &str = "No images found for this project.";
pub const ERROR_MESSAGE: &str = "Error loading gallery.";

/// One rendered gallery entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide<'a> {
    pub url: &'a str,
    /// 1-based display position.
    pub index: usize,
    pub alt: String,
}

/// Alt text for the slide at 1-based `index`.
pub fn alt_text(project: &ProjectKey, index: usize) -> String {
    format!("{project} - Screenshot {index}")
}

/// Pair each image with its display index and alt text, in the given order.
pub fn slides<'a>(images: &'a [VerifiedImage], project: &ProjectKey) -> Vec<Slide<'a>> {
    images
        .iter()
        .enumerate()
        .map(|(i, image)| Slide {
            url: &image.url,
            index: i + 1,
            alt: alt_text(project, i + 1),
        })
        .collect()
}

fn render_slide(slide: &Slide<'_>, markup: &MarkupConfig) -> Markup {
    html! {
        div class=(markup.slide_class) {
            a href=(slide.url) class=(markup.lightbox_class) data-gallery=(markup.gallery_group) {
                img src=(slide.url) alt=(slide.alt) class=(markup.image_class);
            }
        }
    }
}

/// Render all slides, one block per image.
pub fn render_slides(slides: &[Slide<'_>], markup: &MarkupConfig) -> Markup {
    html! {
        @for slide in slides {
            (render_slide(slide, markup))
        }
    }
}

/// Informational slide shown when no image was found.
pub fn render_empty(markup: &MarkupConfig) -> Markup {
    html! {
        div class=(markup.slide_class) {
            p.text-center.p-5 { (EMPTY_MESSAGE) }
        }
    }
}

/// Error slide shown when the pipeline failed.
pub fn render_error(markup: &MarkupConfig) -> Markup {
    html! {
        div class=(markup.slide_class) {
            p.text-center.p-5.text-danger { (ERROR_MESSAGE) }
        }
    }
}
