//! Host page handling: finding the mount point and writing slides into it.
//!
//! A portfolio page carries its carousel as
//!
//! ```html
//! <div class="screenshot-carousel init-swiper swiper">
//!   <div class="swiper-wrapper">
//!     ... slides ...
//!   </div>
//! </div>
//! ```
//!
//! The container is the first element with the wrapper class that follows an
//! element with the section class. Only the container's inner HTML is ever
//! replaced; the rest of the document is left byte-for-byte intact.
//!
//! The scanner here is deliberately small: it walks tags, skips comments and
//! raw-text elements (`script`, `style`), reads `class` attributes, and
//! balances same-name tags to find the container's closing tag.

use crate::config::{MarkupConfig, WidgetsConfig};
use maud::Markup;
use std::ops::Range;

/// Attribute marking the re-initialisation script this tool owns.
pub const SCRIPT_MARKER: &str = "data-project-gallery";

/// Something slides can be mounted into.
pub trait GalleryMount {
    /// Whether the gallery container exists on this page.
    fn has_container(&self) -> bool;

    /// Replace the container's contents. A no-op when there is no container.
    fn mount(&mut self, content: Markup);
}

/// A parsed view of one tag.
#[derive(Debug, Clone)]
struct Tag<'a> {
    /// Byte range of the whole tag, `<` through `>`.
    span: Range<usize>,
    name: &'a str,
    closing: bool,
    self_closing: bool,
    attrs: &'a str,
}

impl Tag<'_> {
    fn attr(&self, name: &str) -> Option<&str> {
        attribute(self.attrs, name)
    }

    fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|v| v.split_ascii_whitespace().any(|c| c == class))
    }
}

/// Value of attribute `name` in a tag's attribute text.
fn attribute<'a>(attrs: &'a str, name: &str) -> Option<&'a str> {
    let bytes = attrs.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
            i += 1;
        }
        let start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'=' && bytes[i] != b'/' {
            i += 1;
        }
        let key = &attrs[start..i];
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let mut value = "";
        if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                let quote = bytes[i];
                let vstart = i + 1;
                let vend = attrs[vstart..]
                    .bytes()
                    .position(|b| b == quote)
                    .map_or(attrs.len(), |p| vstart + p);
                value = &attrs[vstart..vend];
                i = (vend + 1).min(attrs.len());
            } else {
                let vstart = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                value = &attrs[vstart..i];
            }
        }
        if !key.is_empty() && key.eq_ignore_ascii_case(name) {
            return Some(value);
        }
        if key.is_empty() && i == start {
            i += 1;
        }
    }
    None
}

/// Find the next tag at or after `from`, skipping comments, doctypes and
/// the bodies of raw-text elements.
fn next_tag(html: &str, mut from: usize) -> Option<Tag<'_>> {
    loop {
        let start = from + html.get(from..)?.find('<')?;
        let rest = &html[start..];

        if rest.starts_with("<!--") {
            from = start + rest.find("-->").map_or(rest.len(), |p| p + 3);
            continue;
        }
        if rest.starts_with("<!") || rest.starts_with("<?") {
            from = start + rest.find('>').map_or(rest.len(), |p| p + 1);
            continue;
        }

        let closing = rest.starts_with("</");
        let name_start = if closing { 2 } else { 1 };
        let name_len = rest[name_start..]
            .find(|c: char| !c.is_ascii_alphanumeric() && c != '-')
            .unwrap_or(rest.len() - name_start);
        if name_len == 0 {
            // A stray '<' in text
            from = start + 1;
            continue;
        }
        let name = &rest[name_start..name_start + name_len];
        let end = start + tag_end(rest)?;
        let inner = &html[start + name_start + name_len..end - 1];
        let self_closing = inner.trim_end().ends_with('/');
        return Some(Tag {
            span: start..end,
            name,
            closing,
            self_closing,
            attrs: inner,
        });
    }
}

/// Length of a tag starting at `rest[0] == '<'`, honouring quoted attribute values.
fn tag_end(rest: &str) -> Option<usize> {
    let mut quote = None;
    for (i, b) in rest.bytes().enumerate().skip(1) {
        match (quote, b) {
            (Some(q), _) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(b),
            (None, b'>') => return Some(i + 1),
            _ => {}
        }
    }
    None
}

/// Iterate over every tag in the document, jumping over raw-text bodies.
fn tags(html: &str) -> impl Iterator<Item = Tag<'_>> {
    let mut pos = 0;
    std::iter::from_fn(move || {
        let tag = next_tag(html, pos)?;
        pos = tag.span.end;
        if !tag.closing && is_raw_text(tag.name) {
            let close = format!("</{}", tag.name.to_ascii_lowercase());
            pos = html[pos..]
                .to_ascii_lowercase()
                .find(&close)
                .map_or(html.len(), |p| pos + p);
        }
        Some(tag)
    })
}

fn is_raw_text(name: &str) -> bool {
    name.eq_ignore_ascii_case("script") || name.eq_ignore_ascii_case("style")
}

/// An HTML page held in memory.
#[derive(Debug, Clone)]
pub struct HtmlPage {
    html: String,
    markup: MarkupConfig,
}

impl HtmlPage {
    pub fn new(html: impl Into<String>, markup: &MarkupConfig) -> Self {
        Self {
            html: html.into(),
            markup: markup.clone(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn into_string(self) -> String {
        self.html
    }

    /// Byte range of the container's inner HTML, if the page has one.
    ///
    /// Only a wrapper nested inside an open section element counts; the
    /// section is balanced like the wrapper so a wrapper after its close is
    /// someone else's widget.
    pub fn container(&self) -> Option<Range<usize>> {
        // (element name, nesting depth of same-name tags)
        let mut section: Option<(&str, usize)> = None;
        let mut open: Option<Tag<'_>> = None;
        let mut depth = 0usize;

        for tag in tags(&self.html) {
            if let Some(wrapper) = &open {
                if !tag.name.eq_ignore_ascii_case(wrapper.name) {
                    continue;
                }
                if tag.closing {
                    if depth == 0 {
                        return Some(wrapper.span.end..tag.span.start);
                    }
                    depth -= 1;
                } else if !tag.self_closing {
                    depth += 1;
                }
                continue;
            }

            let Some((name, level)) = section else {
                if !tag.closing
                    && !tag.self_closing
                    && tag.has_class(&self.markup.section_class)
                {
                    section = Some((tag.name, 0));
                }
                continue;
            };

            if tag.name.eq_ignore_ascii_case(name) {
                if tag.closing {
                    section = match level {
                        0 => None,
                        _ => Some((name, level - 1)),
                    };
                    continue;
                }
                if !tag.self_closing {
                    section = Some((name, level + 1));
                }
            }
            if !tag.closing && tag.has_class(&self.markup.wrapper_class) {
                if tag.self_closing {
                    return Some(tag.span.end..tag.span.end);
                }
                open = Some(tag);
            }
        }
        None
    }

    /// Inner HTML of the container.
    pub fn container_html(&self) -> Option<&str> {
        self.container().map(|r| &self.html[r])
    }

    /// Whether a `<script src>` containing `needle` (case-insensitive) is loaded.
    pub fn has_script(&self, needle: &str) -> bool {
        let needle = needle.to_ascii_lowercase();
        tags(&self.html).any(|tag| {
            !tag.closing
                && tag.name.eq_ignore_ascii_case("script")
                && tag
                    .attr("src")
                    .is_some_and(|src| src.to_ascii_lowercase().contains(&needle))
        })
    }

    /// Which widget libraries this page loads: `(carousel, lightbox)`.
    pub fn detect_widgets(&self, widgets: &WidgetsConfig) -> (bool, bool) {
        (
            self.has_script(&widgets.carousel_script),
            self.has_script(&widgets.lightbox_script),
        )
    }

    /// Byte range of a previously injected re-initialisation script.
    fn marked_script(&self) -> Option<Range<usize>> {
        let open = tags(&self.html).find(|tag| {
            !tag.closing && tag.name.eq_ignore_ascii_case("script") && tag.attr(SCRIPT_MARKER).is_some()
        })?;
        let close_start = self.html[open.span.end..]
            .to_ascii_lowercase()
            .find("</script")
            .map(|p| open.span.end + p)?;
        let close_end = self.html[close_start..]
            .find('>')
            .map_or(self.html.len(), |p| close_start + p + 1);
        Some(open.span.start..close_end)
    }

    /// Install (or replace) this tool's re-initialisation script.
    ///
    /// `None` removes a previously injected script. New scripts go right before
    /// `</body>`, or at the end of the document when there is no body.
    pub fn set_script(&mut self, script: Option<Markup>) {
        if let Some(existing) = self.marked_script() {
            let replacement = script.map(Markup::into_string).unwrap_or_default();
            self.html.replace_range(existing, &replacement);
            return;
        }
        let Some(script) = script else {
            return;
        };
        let at = tags(&self.html)
            .filter(|t| t.closing && t.name.eq_ignore_ascii_case("body"))
            .last()
            .map_or(self.html.len(), |t| t.span.start);
        self.html.insert_str(at, &script.into_string());
    }
}

impl GalleryMount for HtmlPage {
    fn has_container(&self) -> bool {
        self.container().is_some()
    }

    fn mount(&mut self, content: Markup) {
        if let Some(range) = self.container() {
            self.html.replace_range(range, &content.into_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maud::{PreEscaped, html};

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <script src="assets/vendor/swiper/swiper-bundle.min.js"></script>
  <script src="assets/vendor/glightbox/js/glightbox.min.js"></script>
</head>
<body>
  <!-- <div class="swiper-wrapper">commented out</div> -->
  <section id="gallery">
    <div class="screenshot-carousel init-swiper swiper">
      <script type="application/json" class="swiper-config">{"html": "<div>"}</script>
      <div class="swiper-wrapper">
        <div class="swiper-slide"><p>old</p></div>
      </div>
      <div class="swiper-pagination"></div>
    </div>
  </section>
</body>
</html>
"#;

    fn page(html: &str) -> HtmlPage {
        HtmlPage::new(html, &MarkupConfig::default())
    }

    #[test]
    fn finds_container_inside_section() {
        let p = page(PAGE);
        let inner = p.container_html().unwrap();
        assert!(inner.contains("<p>old</p>"));
        assert!(!inner.contains("swiper-pagination"));
    }

    #[test]
    fn wrapper_outside_section_is_ignored() {
        let p = page(r#"<div class="swiper-wrapper">x</div><div class="other"></div>"#);
        assert!(!p.has_container());
    }

    #[test]
    fn wrapper_after_closed_section_is_ignored() {
        let html = r#"<div class="screenshot-carousel"><p>no wrapper here</p></div><div class="testimonials swiper"><div class="swiper-wrapper">REVIEWS</div></div>"#;
        let mut p = page(html);
        assert_eq!(p.container(), None);
        p.mount(html! { "slides" });
        assert_eq!(p.as_str(), html);
    }

    #[test]
    fn wrapper_in_nested_div_of_section_is_found() {
        let p = page(
            r#"<div class="screenshot-carousel"><div class="inner"><div></div></div><div><div class="swiper-wrapper">x</div></div></div><div class="swiper-wrapper">y</div>"#,
        );
        assert_eq!(p.container_html(), Some("x"));
    }

    #[test]
    fn second_section_after_empty_one_is_used() {
        let p = page(
            r#"<section class="screenshot-carousel"></section><div class="swiper-wrapper">no</div><div class="screenshot-carousel"><div class="swiper-wrapper">yes</div></div>"#,
        );
        assert_eq!(p.container_html(), Some("yes"));
    }

    #[test]
    fn missing_container_mount_is_noop() {
        let html = "<html><body><p>no gallery</p></body></html>";
        let mut p = page(html);
        p.mount(html! { "slides" });
        assert_eq!(p.as_str(), html);
    }

    #[test]
    fn mount_replaces_only_container_contents() {
        let mut p = page(PAGE);
        p.mount(html! { div.swiper-slide { "new" } });
        let out = p.as_str();
        assert!(out.contains(r#"<div class="swiper-wrapper"><div class="swiper-slide">new</div></div>"#));
        assert!(!out.contains("old"));
        assert!(out.contains("swiper-pagination"));
        assert!(out.contains("commented out"));
    }

    #[test]
    fn nested_divs_are_balanced() {
        let mut p = page(
            r#"<div class="screenshot-carousel"><div class="swiper-wrapper"><div><div>a</div></div></div><div id="after"></div></div>"#,
        );
        assert_eq!(p.container_html(), Some("<div><div>a</div></div>"));
        p.mount(html! { "b" });
        assert_eq!(
            p.as_str(),
            r#"<div class="screenshot-carousel"><div class="swiper-wrapper">b</div><div id="after"></div></div>"#
        );
    }

    #[test]
    fn class_matching_is_token_based() {
        let p = page(r#"<div class="screenshot-carousel"><div class="swiper-wrapper-x">a</div></div>"#);
        assert!(!p.has_container());
    }

    #[test]
    fn single_quoted_and_unquoted_attributes() {
        assert_eq!(attribute(" class='a b' id=x", "class"), Some("a b"));
        assert_eq!(attribute(" class='a b' id=x", "id"), Some("x"));
        assert_eq!(attribute(" data-project-gallery", "data-project-gallery"), Some(""));
        assert_eq!(attribute(" href=\"a>b\"", "href"), Some("a>b"));
        assert_eq!(attribute(" src=\"x\"", "class"), None);
    }

    #[test]
    fn detects_widget_scripts() {
        let p = page(PAGE);
        assert_eq!(p.detect_widgets(&WidgetsConfig::default()), (true, true));
        let bare = page("<html><body></body></html>");
        assert_eq!(bare.detect_widgets(&WidgetsConfig::default()), (false, false));
    }

    #[test]
    fn script_inserted_before_body_close_and_replaced() {
        let mut p = page("<html><body><p>x</p></body></html>");
        let script = |body: &str| {
            html! { script data-project-gallery { (PreEscaped(body.to_string())) } }
        };

        p.set_script(Some(script("one();")));
        assert_eq!(
            p.as_str(),
            "<html><body><p>x</p><script data-project-gallery>one();</script></body></html>"
        );

        p.set_script(Some(script("two();")));
        assert_eq!(
            p.as_str(),
            "<html><body><p>x</p><script data-project-gallery>two();</script></body></html>"
        );

        p.set_script(None);
        assert_eq!(p.as_str(), "<html><body><p>x</p></body></html>");
    }

    #[test]
    fn script_appended_without_body() {
        let mut p = page("<p>fragment</p>");
        p.set_script(Some(html! { script data-project-gallery { "x();" } }));
        assert!(p.as_str().ends_with("<script data-project-gallery>x();</script>"));
    }
}
