//! DOM read primitives and synthetic interaction.
//!
//! Every read resolves to an absent or default value when the target element
//! is not present. Invalid selectors are treated the same way, since markup
//! drift on the hosted services is expected.

use std::collections::{HashMap, HashSet};

use parking_lot::{Mutex, RwLock};
use scraper::{ElementRef, Html, Selector};
use tracing::trace;

use crate::DomResult;

/// A live broadcaster page.
pub trait ContentPage: Send + Sync {
    /// Parses the page as currently rendered.
    fn document(&self) -> DomResult<Document>;

    /// Dispatches a bubbling, cancelable click on the first element matching
    /// `selector`.
    ///
    /// Returns true when the element exists and the click was not suppressed
    /// by page script.
    fn dispatch_click(&self, selector: &str) -> bool;
}

/// A parsed snapshot of a page.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parse an HTML document.
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
        }
    }

    /// Returns true if the selector matches an element.
    pub fn has_element(&self, selector: &str) -> bool {
        self.select_first(selector).is_some()
    }

    /// Returns the attribute value, or `None` if the element or attribute is
    /// missing or empty.
    pub fn attribute(&self, selector: &str, name: &str) -> Option<String> {
        self.select_first(selector)
            .and_then(|element| element.value().attr(name))
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    /// Returns the trimmed text of the element's first child, if that child
    /// is a text node.
    pub fn text(&self, selector: &str) -> Option<String> {
        let element = self.select_first(selector)?;
        let first = element.first_child()?;
        let text = first.value().as_text()?;
        let trimmed = text.trim();

        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Returns the `src` attribute of the element.
    pub fn image_source(&self, selector: &str) -> Option<String> {
        self.attribute(selector, "src")
    }

    /// Returns the inline `style` attribute as a property map.
    pub fn style_attributes(&self, selector: &str) -> Option<HashMap<String, String>> {
        let style = self.attribute(selector, "style")?;
        Some(parse_style(&style))
    }

    /// Returns the declared width of the element in pixels, or 0 when the
    /// element is missing or declares no width.
    ///
    /// A snapshot has no layout, so the width comes from an inline `width`
    /// style in px or a numeric `width` attribute.
    pub fn client_width(&self, selector: &str) -> f64 {
        self.declared_dimension(selector, "width")
    }

    /// Returns the declared height of the element in pixels, or 0.
    pub fn client_height(&self, selector: &str) -> f64 {
        self.declared_dimension(selector, "height")
    }

    fn declared_dimension(&self, selector: &str, property: &str) -> f64 {
        let from_style = self
            .style_attributes(selector)
            .and_then(|style| style.get(property).and_then(|value| pixels(value)));

        from_style
            .or_else(|| {
                self.attribute(selector, property)
                    .and_then(|value| number(Some(value)))
            })
            .unwrap_or(0.0)
    }

    fn select_first(&self, selector: &str) -> Option<ElementRef<'_>> {
        match Selector::parse(selector) {
            Ok(parsed) => self.html.select(&parsed).next(),
            Err(e) => {
                trace!(selector, "Invalid selector: {:?}", e);
                None
            }
        }
    }
}

/// Parses a numeric string, ignoring surrounding whitespace. Non-finite
/// values are treated as missing.
pub fn number(value: Option<String>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Parses a CSS pixel length such as `"120px"`.
pub fn pixels(value: &str) -> Option<f64> {
    let value = value.trim();
    let digits = value.strip_suffix("px")?;
    number(Some(digits.to_string()))
}

fn parse_style(style: &str) -> HashMap<String, String> {
    style
        .split(';')
        .filter_map(|declaration| {
            let (key, value) = declaration.split_once(':')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// An in-memory page backed by an HTML string.
///
/// Used by the headless content surface and by tests. Clicks are recorded in
/// dispatch order; selectors registered with [`HtmlPage::suppress_clicks`]
/// behave as if page script cancelled the event.
#[derive(Default)]
pub struct HtmlPage {
    html: RwLock<String>,
    suppressed: RwLock<HashSet<String>>,
    clicks: Mutex<Vec<String>>,
}

impl HtmlPage {
    /// Create a page with the given markup.
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: RwLock::new(html.into()),
            ..Default::default()
        }
    }

    /// Replace the page markup.
    pub fn set_html(&self, html: impl Into<String>) {
        *self.html.write() = html.into();
    }

    /// Make clicks on `selector` get cancelled by the page.
    pub fn suppress_clicks(&self, selector: &str) {
        self.suppressed.write().insert(selector.to_string());
    }

    /// Selectors clicked so far, in order.
    pub fn clicks(&self) -> Vec<String> {
        self.clicks.lock().clone()
    }
}

impl ContentPage for HtmlPage {
    fn document(&self) -> DomResult<Document> {
        Ok(Document::parse(&self.html.read()))
    }

    fn dispatch_click(&self, selector: &str) -> bool {
        if !Document::parse(&self.html.read()).has_element(selector) {
            return false;
        }

        self.clicks.lock().push(selector.to_string());
        !self.suppressed.read().contains(selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
            <div id="player" style="width: 240px; height:40px;" data-state="">
                <p class="title">  Song Title  </p>
                <p class="nested"><span>Inner</span> trailing</p>
                <img id="art" src="https://example.com/art.jpg">
                <canvas id="bar" width="480"></canvas>
            </div>
        </body></html>
    "#;

    #[test]
    fn test_missing_elements_resolve_to_defaults() {
        let doc = Document::parse("<html><body></body></html>");
        assert!(!doc.has_element("#player"));
        assert_eq!(doc.attribute("#player", "data-state"), None);
        assert_eq!(doc.text("p.title"), None);
        assert_eq!(doc.image_source("#art"), None);
        assert_eq!(doc.style_attributes("#player"), None);
        assert_eq!(doc.client_width("#player"), 0.0);
        assert_eq!(doc.client_height("#player"), 0.0);
    }

    #[test]
    fn test_invalid_selector_is_absent() {
        let doc = Document::parse(PAGE);
        assert!(!doc.has_element("div[[["));
        assert_eq!(doc.text(">>"), None);
    }

    #[test]
    fn test_text_reads_first_text_node() {
        let doc = Document::parse(PAGE);
        assert_eq!(doc.text("p.title").as_deref(), Some("Song Title"));
        // First child is an element, not text.
        assert_eq!(doc.text("p.nested"), None);
    }

    #[test]
    fn test_empty_attribute_is_absent() {
        let doc = Document::parse(PAGE);
        assert_eq!(doc.attribute("#player", "data-state"), None);
        assert_eq!(
            doc.image_source("#art").as_deref(),
            Some("https://example.com/art.jpg")
        );
    }

    #[test]
    fn test_style_and_dimensions() {
        let doc = Document::parse(PAGE);
        let style = doc.style_attributes("#player").unwrap();
        assert_eq!(style.get("width").map(String::as_str), Some("240px"));
        assert_eq!(style.get("height").map(String::as_str), Some("40px"));
        assert_eq!(doc.client_width("#player"), 240.0);
        assert_eq!(doc.client_height("#player"), 40.0);
        assert_eq!(doc.client_width("#bar"), 480.0);
    }

    #[test]
    fn test_pixels() {
        assert_eq!(pixels("12.5px"), Some(12.5));
        assert_eq!(pixels("50%"), None);
        assert_eq!(number(Some("NaN".into())), None);
    }

    #[test]
    fn test_click_dispatch() {
        let page = HtmlPage::new(PAGE);
        page.suppress_clicks("#art");

        assert!(page.dispatch_click("p.title"));
        assert!(!page.dispatch_click("#art"));
        assert!(!page.dispatch_click("#missing"));

        assert_eq!(page.clicks(), vec!["p.title".to_string(), "#art".to_string()]);
    }
}
