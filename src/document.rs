//! Lenient HTML documents with class and tag lookups.
//!
//! Thin wrapper over `scraper::Html`. Parsing never fails, and a lookup that
//! matches nothing yields an empty `Vec`. Class names may hold several
//! space-separated tokens (`"usa-accordion usa-accordion--bordered"`); an
//! element matches when it carries every token.

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

/// A parsed HTML page.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(content: &str) -> Self {
        Self {
            html: Html::parse_document(content),
        }
    }

    pub fn find_all_by_class(&self, class: &str) -> Vec<Node<'_>> {
        match class_selector(class) {
            Some(selector) => self.html.select(&selector).map(Node).collect(),
            None => Vec::new(),
        }
    }

    pub fn find_all_by_tag(&self, tag: &str) -> Vec<Node<'_>> {
        match tag_selector(tag) {
            Some(selector) => self.html.select(&selector).map(Node).collect(),
            None => Vec::new(),
        }
    }
}

/// An element inside a [`Document`].
#[derive(Debug, Clone, Copy)]
pub struct Node<'a>(ElementRef<'a>);

impl<'a> Node<'a> {
    /// Concatenated text of all descendant text nodes, in document order.
    pub fn text(&self) -> String {
        self.0.text().collect()
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.0.value().attr(name)
    }

    /// First descendant element with the given tag.
    pub fn first_child_by_tag(&self, tag: &str) -> Option<Node<'a>> {
        let selector = tag_selector(tag)?;
        self.0.select(&selector).next().map(Node)
    }

    /// First descendant element with the given class.
    pub fn first_by_class(&self, class: &str) -> Option<Node<'a>> {
        let selector = class_selector(class)?;
        self.0.select(&selector).next().map(Node)
    }

    pub fn find_all_by_class(&self, class: &str) -> Vec<Node<'a>> {
        match class_selector(class) {
            Some(selector) => self.0.select(&selector).map(Node).collect(),
            None => Vec::new(),
        }
    }

    pub fn find_all_by_tag(&self, tag: &str) -> Vec<Node<'a>> {
        match tag_selector(tag) {
            Some(selector) => self.0.select(&selector).map(Node).collect(),
            None => Vec::new(),
        }
    }
}

fn class_selector(class: &str) -> Option<Selector> {
    let tokens: Vec<&str> = class.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }
    let css = format!(".{}", tokens.join("."));
    match Selector::parse(&css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!(%css, error = %e, "Invalid class selector");
            None
        }
    }
}

fn tag_selector(tag: &str) -> Option<Selector> {
    match Selector::parse(tag.trim()) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!(%tag, error = %e, "Invalid tag selector");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="accordion indicator-plus mb-3">
            <h3 class="card-title">First <b>question</b></h3>
            <div class="card-body"><p>One</p><p>Two</p></div>
          </div>
          <div class="accordion">
            <h3 class="card-title">Second</h3>
          </div>
          <a class="item" href="/faq/general"><span class="full-title">General</span></a>
        </body></html>
    "#;

    #[test]
    fn test_find_all_by_class_requires_every_token() {
        let doc = Document::parse(PAGE);
        assert_eq!(doc.find_all_by_class("accordion").len(), 2);
        assert_eq!(doc.find_all_by_class("accordion indicator-plus mb-3").len(), 1);
        assert_eq!(doc.find_all_by_class("mb-3 accordion").len(), 1);
    }

    #[test]
    fn test_no_match_is_empty() {
        let doc = Document::parse(PAGE);
        assert!(doc.find_all_by_class("does-not-exist").is_empty());
        assert!(doc.find_all_by_class("   ").is_empty());
        assert!(doc.find_all_by_tag("table").is_empty());
    }

    #[test]
    fn test_text_concatenates_descendants() {
        let doc = Document::parse(PAGE);
        let titles = doc.find_all_by_class("card-title");
        assert_eq!(titles[0].text(), "First question");
        let body = doc.find_all_by_class("card-body");
        assert_eq!(body[0].text(), "OneTwo");
    }

    #[test]
    fn test_attribute_and_nested_lookup() {
        let doc = Document::parse(PAGE);
        let item = doc.find_all_by_class("item")[0];
        assert_eq!(item.attribute("href"), Some("/faq/general"));
        assert_eq!(item.attribute("title"), None);
        assert_eq!(item.first_by_class("full-title").unwrap().text(), "General");
    }

    #[test]
    fn test_first_child_by_tag() {
        let doc = Document::parse(PAGE);
        let body = doc.find_all_by_class("card-body")[0];
        assert_eq!(body.first_child_by_tag("p").unwrap().text(), "One");
        assert!(body.first_child_by_tag("ul").is_none());
    }

    #[test]
    fn test_scoped_lookup_stays_inside_node() {
        let doc = Document::parse(PAGE);
        let blocks = doc.find_all_by_class("accordion");
        assert_eq!(blocks[0].find_all_by_class("card-title").len(), 1);
        assert_eq!(blocks[1].find_all_by_class("card-body").len(), 0);
        assert_eq!(blocks[0].find_all_by_tag("p").len(), 2);
    }

    #[test]
    fn test_malformed_html_is_tolerated() {
        let doc = Document::parse("<div class='x'><p>unclosed <b>bold</div><<>>");
        let x = doc.find_all_by_class("x");
        assert_eq!(x.len(), 1);
        assert!(x[0].text().contains("unclosed"));
    }
}
