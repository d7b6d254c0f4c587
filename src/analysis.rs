use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::{Datelike, Month, NaiveDate, NaiveTime};
use regex::Regex;
use tracing::debug;

use crate::models::Review;
use crate::sentiment::{ClassificationMode, Label, Sentiment, SentimentClassifier, SentimentEngine};

/// `YYYY-MM-DD` or `YYYY/MM/DD`, optionally followed by `HH:MM[:SS[.f]]`
/// and a `Z` or `±HH[:]MM` offset. Nothing else may follow.
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(\d{4})[-/](\d{1,2})[-/](\d{1,2})(?:[T ](\d{2}):(\d{2})(?::(\d{2})(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?)?\s*$",
    )
    .unwrap()
});

/// Parse an ISO-style review date. Anything else, including impossible
/// calendar dates and out-of-range times, yields `None`.
pub fn parse_review_date(raw: &str) -> Option<NaiveDate> {
    let caps = DATE_RE.captures(raw)?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    if let (Some(h), Some(m)) = (caps.get(4), caps.get(5)) {
        let sec = caps.get(6).map_or(Some(0), |s| s.as_str().parse().ok())?;
        NaiveTime::from_hms_opt(h.as_str().parse().ok()?, m.as_str().parse().ok()?, sec)?;
    }
    Some(date)
}

/// Full or three-letter month name, any case.
pub fn parse_month(name: &str) -> Option<Month> {
    name.trim().parse::<Month>().ok()
}

fn month_of(date: NaiveDate) -> Month {
    // month() is always 1..=12
    Month::try_from(date.month() as u8).unwrap_or(Month::January)
}

/// Calendar order, never alphabetical. Unknown names and repeats are dropped.
/// Entry point for callers holding month names; `YearView::months` orders
/// through it too.
pub fn order_months<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names
        .iter()
        .filter_map(|n| parse_month(n.as_ref()))
        .map(|m| m.number_from_month())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .filter_map(|n| Month::try_from(n as u8).ok())
        .map(|m| m.name().to_string())
        .collect()
}

/// A scope that may hold nothing. `Empty` is a normal outcome, shown to the
/// user as a notice rather than an empty table.
#[derive(Debug)]
pub enum Scoped<T> {
    Found(T),
    Empty(EmptyScope),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyScope {
    pub year: i32,
    pub month: Option<Month>,
    /// Reviews dropped because their date could not be parsed.
    pub unparseable: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct DatedReview<'a> {
    pub review: &'a Review,
    pub date: NaiveDate,
}

/// Reviews whose parsed date falls inside one calendar year.
#[derive(Debug)]
pub struct YearView<'a> {
    pub year: i32,
    pub reviews: Vec<DatedReview<'a>>,
    pub unparseable: usize,
}

impl<'a> YearView<'a> {
    pub fn build(reviews: &'a [Review], year: i32) -> Scoped<YearView<'a>> {
        let mut unparseable = 0;
        let mut in_year = Vec::new();

        for review in reviews {
            match parse_review_date(&review.date) {
                Some(date) if date.year() == year => in_year.push(DatedReview { review, date }),
                Some(_) => {}
                None => {
                    debug!("Unparseable review date {:?} ({})", review.date, review.title);
                    unparseable += 1;
                }
            }
        }

        if in_year.is_empty() {
            return Scoped::Empty(EmptyScope {
                year,
                month: None,
                unparseable,
            });
        }
        Scoped::Found(YearView {
            year,
            reviews: in_year,
            unparseable,
        })
    }

    /// Distinct months present, January first.
    pub fn months(&self) -> Vec<Month> {
        let names: Vec<&str> = self.reviews.iter().map(|r| month_of(r.date).name()).collect();
        order_months(&names)
            .iter()
            .filter_map(|n| parse_month(n))
            .collect()
    }

    pub fn in_month(&self, month: Month) -> Vec<DatedReview<'a>> {
        self.reviews
            .iter()
            .filter(|r| month_of(r.date) == month)
            .copied()
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct ClassifiedReview<'a> {
    pub review: &'a Review,
    pub date: NaiveDate,
    pub sentiment: Sentiment,
    /// Which classifier answered for this item; differs from the run's
    /// mode when the model failed on this text.
    pub classified_by: ClassificationMode,
}

#[derive(Debug)]
pub struct MonthReport<'a> {
    pub year: i32,
    pub month: Month,
    pub mode: ClassificationMode,
    pub reviews: Vec<ClassifiedReview<'a>>,
}

impl MonthReport<'_> {
    pub fn count(&self, label: Label) -> usize {
        self.reviews.iter().filter(|r| r.sentiment.label == label).count()
    }

    pub fn positive(&self) -> usize {
        self.count(Label::Positive)
    }

    pub fn negative(&self) -> usize {
        self.count(Label::Negative)
    }
}

pub fn classify_month<'a, M: SentimentClassifier>(
    view: &YearView<'a>,
    month: Month,
    engine: &SentimentEngine<M>,
) -> Scoped<MonthReport<'a>> {
    classify_month_with(view, month, engine, || {})
}

/// Classify every review of `month` in order, calling `tick` after each.
pub fn classify_month_with<'a, M: SentimentClassifier>(
    view: &YearView<'a>,
    month: Month,
    engine: &SentimentEngine<M>,
    mut tick: impl FnMut(),
) -> Scoped<MonthReport<'a>> {
    let selected = view.in_month(month);
    if selected.is_empty() {
        return Scoped::Empty(EmptyScope {
            year: view.year,
            month: Some(month),
            unparseable: view.unparseable,
        });
    }

    let reviews = selected
        .into_iter()
        .map(|r| {
            let (sentiment, classified_by) = engine.classify_with_source(&r.review.text);
            tick();
            ClassifiedReview {
                review: r.review,
                date: r.date,
                sentiment,
                classified_by,
            }
        })
        .collect();

    Scoped::Found(MonthReport {
        year: view.year,
        month,
        mode: engine.mode(),
        reviews,
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use crate::sentiment::tests::{heuristic_engine, model_engine};

    fn review(title: &str, date: &str) -> Review {
        Review {
            title: title.into(),
            text: format!("{title} text"),
            date: date.into(),
        }
    }

    fn found<T>(s: Scoped<T>) -> T {
        match s {
            Scoped::Found(t) => t,
            Scoped::Empty(e) => panic!("unexpected empty scope: {:?}", e),
        }
    }

    #[test]
    fn orders_months_by_calendar() {
        assert_eq!(
            order_months(&["March", "January", "August"]),
            vec!["January", "March", "August"]
        );
    }

    #[test]
    fn order_months_dedups_and_drops_unknown() {
        assert_eq!(
            order_months(&["december", "Feb", "Smarch", "December"]),
            vec!["February", "December"]
        );
    }

    #[test]
    fn parses_iso_dates() {
        assert_eq!(parse_review_date("2023-01-15"), NaiveDate::from_ymd_opt(2023, 1, 15));
        assert_eq!(parse_review_date("2023/3/9"), NaiveDate::from_ymd_opt(2023, 3, 9));
        assert_eq!(
            parse_review_date("2022-11-05T10:00:00Z"),
            NaiveDate::from_ymd_opt(2022, 11, 5)
        );
        assert_eq!(parse_review_date(" 2023-02-01 "), NaiveDate::from_ymd_opt(2023, 2, 1));
        assert_eq!(
            parse_review_date("2023-07-04 18:30"),
            NaiveDate::from_ymd_opt(2023, 7, 4)
        );
        assert_eq!(
            parse_review_date("2023-07-04T18:30:15.250+02:00"),
            NaiveDate::from_ymd_opt(2023, 7, 4)
        );
    }

    #[test]
    fn bad_dates_are_none() {
        for raw in [
            "",
            "yesterday",
            "2023-13-01",
            "2023-02-30",
            "15/01/2023",
            "2023-01-15abc",
            "2023-01-15 garbage",
            "2023-01-15T",
            "2023-01-15 not-a-time 99:99",
            "2023-01-15 99:99",
            "2023-01-15T10:00:00 trailing",
        ] {
            assert_eq!(parse_review_date(raw), None, "{raw}");
        }
    }

    #[test]
    fn filters_year_then_month() {
        let reviews = vec![
            review("first", "2023-01-15"),
            review("second", "2022-12-01"),
            review("third", "2023-01-20"),
        ];
        let view = found(YearView::build(&reviews, 2023));
        let january = view.in_month(Month::January);
        let titles: Vec<&str> = january.iter().map(|r| r.review.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "third"]);
    }

    #[test]
    fn unparseable_dates_are_excluded_and_counted() {
        let reviews = vec![review("ok", "2023-05-01"), review("bad", "not a date")];
        let view = found(YearView::build(&reviews, 2023));
        assert_eq!(view.reviews.len(), 1);
        assert_eq!(view.unparseable, 1);
    }

    #[test]
    fn trailing_garbage_keeps_review_out_of_views() {
        let reviews = vec![review("ok", "2023-01-10"), review("junk", "2023-01-15 garbage")];
        let view = found(YearView::build(&reviews, 2023));
        assert_eq!(view.unparseable, 1);
        let january = view.in_month(Month::January);
        assert_eq!(january.len(), 1);
        assert_eq!(january[0].review.title, "ok");
    }

    #[test]
    fn empty_year_is_explicit() {
        let reviews = vec![review("old", "2019-05-01"), review("bad", "??")];
        match YearView::build(&reviews, 2023) {
            Scoped::Empty(e) => {
                assert_eq!(e.year, 2023);
                assert_eq!(e.month, None);
                assert_eq!(e.unparseable, 1);
            }
            Scoped::Found(_) => panic!("2023 should be empty"),
        }
    }

    #[test]
    fn months_are_chronological() {
        let reviews = seed::reviews(2023);
        let view = found(YearView::build(&reviews, 2023));
        assert_eq!(
            view.months(),
            vec![Month::January, Month::May, Month::August, Month::November]
        );
    }

    #[test]
    fn month_without_reviews_is_explicit() {
        let reviews = seed::reviews(2023);
        let view = found(YearView::build(&reviews, 2023));
        let engine = heuristic_engine();
        match classify_month(&view, Month::March, &engine) {
            Scoped::Empty(e) => assert_eq!(e.month, Some(Month::March)),
            Scoped::Found(_) => panic!("March has no seed reviews"),
        }
    }

    #[test]
    fn classifies_and_annotates_month() {
        let reviews = seed::reviews(2023);
        let view = found(YearView::build(&reviews, 2023));
        let engine = heuristic_engine();
        let mut ticks = 0;
        let report = found(classify_month_with(&view, Month::January, &engine, || ticks += 1));

        assert_eq!(ticks, 2);
        assert_eq!(report.mode, ClassificationMode::Heuristic);
        assert_eq!(report.reviews.len(), 2);
        assert_eq!(report.reviews[0].sentiment.label, Label::Positive);
        assert_eq!(report.reviews[1].sentiment.label, Label::Negative);
        assert_eq!((report.positive(), report.negative()), (1, 1));
        assert!(report
            .reviews
            .iter()
            .all(|r| (0.0..=1.0).contains(&r.sentiment.confidence)));
        // Source records are untouched.
        assert_eq!(reviews, seed::reviews(2023));
    }

    #[test]
    fn model_mode_is_reported_with_item_fallback() {
        let reviews = vec![
            Review {
                title: "a".into(),
                text: "fine".into(),
                date: "2023-06-01".into(),
            },
            Review {
                title: "b".into(),
                text: "boom, excellent".into(),
                date: "2023-06-02".into(),
            },
        ];
        let view = found(YearView::build(&reviews, 2023));
        let engine = model_engine();
        let report = found(classify_month(&view, Month::June, &engine));
        assert_eq!(report.mode, ClassificationMode::Model);
        assert_eq!(report.reviews[0].classified_by, ClassificationMode::Model);
        assert_eq!(report.reviews[1].classified_by, ClassificationMode::Heuristic);
        assert_eq!(report.reviews[1].sentiment.label, Label::Positive);
    }
}
