//! Small helpers over `scraper` shared by the HTML adapters

use crate::AdapterError;
use scraper::{ElementRef, Selector};

/// Parses a CSS selector, logging the ones that do not parse
pub(crate) fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(_) => {
            tracing::error!(css, "Invalid selector");
            None
        }
    }
}

/// Selector for the top-level listing blocks of a page
pub(crate) fn listing_selector(adapter: &str, css: &str) -> Result<Selector, AdapterError> {
    selector(css).ok_or_else(|| AdapterError::Payload {
        adapter: adapter.to_string(),
        message: format!("invalid selector {css:?}"),
    })
}

/// Visible text of an element with whitespace collapsed
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the first descendant matching `css`, or empty
pub(crate) fn child_text(element: ElementRef<'_>, css: &str) -> String {
    selector(css)
        .and_then(|s| element.select(&s).next().map(text_of))
        .unwrap_or_default()
}

/// Texts of every descendant matching `css`, skipping empty ones
pub(crate) fn child_texts(element: ElementRef<'_>, css: &str) -> Vec<String> {
    let Some(selector) = selector(css) else {
        return Vec::new();
    };
    element
        .select(&selector)
        .map(text_of)
        .filter(|t| !t.is_empty())
        .collect()
}

/// An attribute of an element, or empty
pub(crate) fn attr(element: ElementRef<'_>, name: &str) -> String {
    element.value().attr(name).unwrap_or_default().to_string()
}
