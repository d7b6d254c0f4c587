use std::sync::LazyLock;

use rand::Rng;
use scraper::{ElementRef, Html, Selector};

use crate::analysis::parse_review_date;
use crate::models::Review;
use crate::parser::{element_text, first_text};

static REVIEW: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".review").unwrap());
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".review-title, h3").unwrap());
static CONTENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".review-content, p").unwrap());
static DATE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".review-date, time").unwrap());

pub const PLACEHOLDER_TITLE: &str = "Customer Review";
pub const PLACEHOLDER_TEXT: &str = "No content";

/// Parse review cards. Missing title/content fall back to placeholders;
/// a card without a date gets one synthesized inside `year`.
pub fn extract(html: &str, year: i32, rng: &mut impl Rng) -> Vec<Review> {
    let doc = Html::parse_document(html);
    doc.select(&REVIEW)
        .map(|card| Review {
            title: first_text(card, &TITLE).unwrap_or_else(|| PLACEHOLDER_TITLE.to_string()),
            text: first_text(card, &CONTENT).unwrap_or_else(|| PLACEHOLDER_TEXT.to_string()),
            date: match explicit_date(card) {
                Some(date) => date,
                None => synthetic_date(year, &mut *rng),
            },
        })
        .collect()
}

/// Date carried by the card: `datetime` attribute first, then element text.
/// Parseable values are normalized to `YYYY-MM-DD`; anything else is kept raw.
fn explicit_date(card: ElementRef<'_>) -> Option<String> {
    let el = card.select(&DATE).next()?;
    let raw = el
        .value()
        .attr("datetime")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| Some(element_text(el)).filter(|s| !s.is_empty()))?;

    Some(match parse_review_date(&raw) {
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => raw,
    })
}

/// Uniform month 1-12, day 1-28, so every month is valid.
pub fn synthetic_date(year: i32, rng: &mut impl Rng) -> String {
    let month: u32 = rng.random_range(1..=12);
    let day: u32 = rng.random_range(1..=28);
    format!("{year}-{month:02}-{day:02}")
}
