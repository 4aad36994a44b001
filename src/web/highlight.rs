//! Highlighting matched text on the host page.
//!
//! A single marker span wraps the children of the element being shown.
//! Before anything new is wrapped every existing marker is unwrapped, so the
//! host DOM carries at most one marker at a time.

use anyhow::{Context, Result};
use pivot_core::text_match::locate_host_targets;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition};

use super::js_error;

pub const MARKER_ID: &str = "pivot-highlight-span";
const MARKER_STYLE: &str = "background-color: #DDF84D; color: #000000;";
const SKIPPED_TAGS: [&str; 6] = ["SCRIPT", "STYLE", "NOSCRIPT", "TEMPLATE", "SVG", "IFRAME"];

#[derive(Default)]
pub struct HostHighlighter {
    targets: Vec<Element>,
}

impl HostHighlighter {
    pub fn clear(&mut self, document: &Document) {
        self.targets.clear();
        unwrap_markers(document);
    }

    /// Find every host element showing `text` and highlight the first one.
    /// Returns `(count, position)` or `None` when the text is not on the page.
    pub fn highlight_text(
        &mut self,
        document: &Document,
        host: &Element,
        text: &str,
    ) -> Result<Option<(usize, usize)>> {
        unwrap_markers(document);
        self.targets = find_targets(document, host, text);
        if self.targets.is_empty() {
            debug!("Section text not found on the host page");
            return Ok(None);
        }
        self.wrap(document, 0)?;
        Ok(Some((self.targets.len(), 0)))
    }

    /// Highlight the element the visitor clicked, recording any other places
    /// the same text appears so they can be cycled through.
    pub fn highlight_clicked(
        &mut self,
        document: &Document,
        host: &Element,
        clicked: &Element,
        text: &str,
    ) -> Result<(usize, usize)> {
        unwrap_markers(document);
        let mut targets = find_targets(document, host, text);
        let position = targets.iter().position(|target| {
            target == clicked || target.contains(Some(clicked)) || clicked.contains(Some(target))
        });
        let position = match position {
            Some(position) => {
                targets[position] = clicked.clone();
                position
            }
            None => {
                targets.insert(0, clicked.clone());
                0
            }
        };
        self.targets = targets;
        self.wrap(document, position)?;
        Ok((self.targets.len(), position))
    }

    pub fn focus(&mut self, document: &Document, position: usize) -> Result<()> {
        unwrap_markers(document);
        self.wrap(document, position)
    }

    fn wrap(&self, document: &Document, position: usize) -> Result<()> {
        let target = self
            .targets
            .get(position)
            .with_context(|| format!("No highlight target at position {position}"))?;
        let marker = document.create_element("span").map_err(js_error)?;
        marker.set_id(MARKER_ID);
        marker
            .set_attribute("style", MARKER_STYLE)
            .map_err(js_error)?;
        while let Some(child) = target.first_child() {
            marker.append_child(&child).map_err(js_error)?;
        }
        target.append_child(&marker).map_err(js_error)?;

        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Center);
        target.scroll_into_view_with_scroll_into_view_options(&options);
        Ok(())
    }
}

/// Put every marker's children back where the marker stood. A marker is
/// only removed once it is empty.
fn unwrap_markers(document: &Document) {
    while let Some(marker) = document.get_element_by_id(MARKER_ID) {
        marker.set_id("");
        if let Some(parent) = marker.parent_node() {
            while let Some(child) = marker.first_child() {
                if parent.insert_before(&child, Some(&marker)).is_err() {
                    break;
                }
            }
        }
        if marker.has_child_nodes() {
            warn!("Highlight marker could not be unwrapped; leaving its content in place");
            let _ = marker.remove_attribute("style");
        } else {
            marker.remove();
        }
    }
}

fn find_targets(document: &Document, host: &Element, text: &str) -> Vec<Element> {
    let candidates = candidates(document, host);
    let texts: Vec<String> = candidates
        .iter()
        .map(|element| element.text_content().unwrap_or_default())
        .collect();
    let found = locate_host_targets(&texts, text, |outer, inner| {
        candidates[outer].contains(Some(&candidates[inner]))
    });
    debug!(candidates = candidates.len(), found = found.len(), "Located host targets");
    found
        .into_iter()
        .map(|idx| candidates[idx].clone())
        .collect()
}

/// Host page elements in document order, minus the widget and non-content
/// elements.
fn candidates(document: &Document, host: &Element) -> Vec<Element> {
    let Some(body) = document.body() else {
        return Vec::new();
    };
    let Ok(list) = body.query_selector_all("*") else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|idx| list.item(idx))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .filter(|element| {
            let tag = element.tag_name().to_ascii_uppercase();
            !SKIPPED_TAGS.contains(&tag.as_str())
                && element != host
                && !host.contains(Some(element))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    struct Fixture {
        document: Document,
        page: Element,
        host: Element,
    }

    impl Fixture {
        fn new(html: &str) -> Self {
            let document = web_sys::window()
                .and_then(|window| window.document())
                .expect("document");
            let body = document.body().expect("body");
            let page = document.create_element("div").expect("page");
            page.set_inner_html(html);
            body.append_child(&page).expect("append page");
            let host = document.create_element("div").expect("host");
            body.append_child(&host).expect("append host");
            Self {
                document,
                page,
                host,
            }
        }

        fn marker_count(&self) -> u32 {
            self.document
                .query_selector_all(&format!("#{MARKER_ID}"))
                .expect("selector")
                .length()
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            self.page.remove();
            self.host.remove();
        }
    }

    #[wasm_bindgen_test]
    fn repeated_highlights_keep_a_single_marker() {
        let html = "<p>Opening hours</p><div><p>Opening hours</p></div><p>Closed <b>Sundays</b></p>";
        let fixture = Fixture::new(html);
        let mut highlighter = HostHighlighter::default();

        for _ in 0..5 {
            let found = highlighter
                .highlight_text(&fixture.document, &fixture.host, "Opening hours")
                .expect("highlight");
            assert_eq!(found, Some((2, 0)));
            assert_eq!(fixture.marker_count(), 1);
        }
        for position in [1, 0, 1, 1, 0] {
            highlighter.focus(&fixture.document, position).expect("focus");
            assert_eq!(fixture.marker_count(), 1);
        }

        let clicked = fixture.page.query_selector("p").expect("selector").expect("paragraph");
        let found = highlighter
            .highlight_clicked(&fixture.document, &fixture.host, &clicked, "Opening hours")
            .expect("highlight clicked");
        assert_eq!(found, (2, 0));
        assert_eq!(fixture.marker_count(), 1);

        highlighter.clear(&fixture.document);
        assert_eq!(fixture.marker_count(), 0);
        assert_eq!(fixture.page.inner_html(), html);
    }

    #[wasm_bindgen_test]
    fn clear_restores_nested_host_markup() {
        let html = r##"<p>Visit <a href="#shop">our shop</a> today</p>"##;
        let fixture = Fixture::new(html);
        let mut highlighter = HostHighlighter::default();

        let found = highlighter
            .highlight_text(&fixture.document, &fixture.host, "Visit our shop today")
            .expect("highlight");
        assert_eq!(found, Some((1, 0)));
        let marker = fixture.document.get_element_by_id(MARKER_ID).expect("marker");
        assert_eq!(marker.text_content().as_deref(), Some("Visit our shop today"));

        highlighter.clear(&fixture.document);
        assert_eq!(fixture.marker_count(), 0);
        assert_eq!(fixture.page.inner_html(), html);
    }

    #[wasm_bindgen_test]
    fn stray_markers_are_unwrapped_without_losing_content() {
        let fixture = Fixture::new(&format!(
            r#"<p><span id="{MARKER_ID}">first</span></p><p><span id="{MARKER_ID}">second</span></p>"#
        ));
        let mut highlighter = HostHighlighter::default();

        highlighter.clear(&fixture.document);
        assert_eq!(fixture.marker_count(), 0);
        assert_eq!(fixture.page.inner_html(), "<p>first</p><p>second</p>");
    }

    #[wasm_bindgen_test]
    fn missing_text_leaves_the_page_untouched() {
        let html = "<p>Contact us</p>";
        let fixture = Fixture::new(html);
        let mut highlighter = HostHighlighter::default();

        let found = highlighter
            .highlight_text(&fixture.document, &fixture.host, "Not on this page at all")
            .expect("highlight");
        assert_eq!(found, None);
        assert_eq!(fixture.marker_count(), 0);
        assert_eq!(fixture.page.inner_html(), html);
    }
}
