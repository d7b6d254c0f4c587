use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::models::Testimonial;
use crate::parser::element_text;

static TESTIMONIAL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".testimonial, blockquote").unwrap());

pub fn extract(html: &str, limit: usize) -> Vec<Testimonial> {
    let doc = Html::parse_document(html);
    doc.select(&TESTIMONIAL)
        .take(limit)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .map(|text| Testimonial { text })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_testimonials_and_blockquotes() {
        let html = r#"
            <div class="testimonial"><p class="text">  We love the
              web scraping services! </p></div>
            <blockquote>Fast and reliable.</blockquote>
            <div class="testimonial">   </div>
        "#;
        let t = extract(html, 5);
        assert_eq!(t.len(), 2);
        assert_eq!(t[0].text, "We love the web scraping services!");
        assert_eq!(t[1].text, "Fast and reliable.");
    }

    #[test]
    fn respects_limit() {
        let html = "<blockquote>a</blockquote>".repeat(8);
        assert_eq!(extract(&html, 5).len(), 5);
    }
}
