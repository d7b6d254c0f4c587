pub mod extract;

use scraper::{ElementRef, Selector};

/// Visible text of an element with runs of whitespace collapsed and trimmed.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the first descendant matching `sel`, if any and non-empty.
pub fn first_text(el: ElementRef<'_>, sel: &Selector) -> Option<String> {
    el.select(sel)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
}
