//! HTML parsing and data extraction
//!
//! [`Page`] is the narrow parse capability the crawler needs: outbound links,
//! single text fields, and a plain-text snapshot.
//!
//! `scraper::Html` is not `Send`, so a `Page` must be built and dropped
//! between two `.await` points. Workers parse synchronously and keep only the
//! owned results.

pub mod selectors;

use scraper::{Html, Selector};

use crate::utils::normalize_whitespace;

/// A parsed HTML document
pub struct Page {
    document: Html,
}

impl Page {
    /// Parse an HTML document; malformed markup is repaired, never rejected
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// Every `href` of every `<a>` element, in document order
    pub fn find_links(&self) -> Vec<String> {
        self.document
            .select(&selectors::LINKS)
            .filter_map(|element| element.value().attr("href"))
            .map(|href| href.trim().to_string())
            .filter(|href| !href.is_empty())
            .collect()
    }

    /// Text of the first element matched by any of the selectors, tried in order
    pub fn find_field(&self, selectors: &[Selector]) -> Option<String> {
        selectors.iter().find_map(|selector| {
            self.document
                .select(selector)
                .map(|element| normalize_whitespace(&element.text().collect::<String>()))
                .find(|text| !text.is_empty())
        })
    }

    /// Visible body text with whitespace collapsed
    pub fn text_snapshot(&self) -> Option<String> {
        let body = self.document.select(&selectors::BODY).next()?;

        let mut parts: Vec<&str> = Vec::new();
        for node in body.descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };

            let in_noise = node
                .parent()
                .and_then(|parent| parent.value().as_element().map(|e| e.name()))
                .is_some_and(|name| selectors::NOISE_ELEMENTS.contains(&name));

            if !in_noise {
                parts.push(&**text);
            }
        }

        let snapshot = normalize_whitespace(&parts.join(" "));
        if snapshot.is_empty() {
            None
        } else {
            Some(snapshot)
        }
    }
}
