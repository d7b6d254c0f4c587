use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use review_insights::analysis::{self, EmptyScope, MonthReport, Scoped, YearView};
use review_insights::extractor::Extractor;
use review_insights::models::{Category, Dataset};
use review_insights::sentiment::SentimentEngine;
use review_insights::settings::Settings;
use review_insights::{seed, store};

#[derive(Parser)]
#[command(name = "review_insights", about = "Scrape product reviews and classify their sentiment")]
struct Cli {
    /// Persisted dataset (overrides REVIEWS_DATA_PATH)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch products, testimonials and reviews, seed empty ones, save
    Scrape {
        /// Year for synthesized and seed review dates (overrides REVIEWS_YEAR)
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// List saved products
    Products,
    /// List saved testimonials
    Testimonials,
    /// Months with reviews in a year, in calendar order
    Months {
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// Review sentiment for one month
    Reviews {
        #[arg(short, long)]
        year: Option<i32>,
        /// Month name, e.g. "January" or "jan" (default: list months)
        #[arg(short, long)]
        month: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    if let Some(path) = cli.data {
        settings.data_path = path;
    }

    match cli.command {
        Commands::Scrape { year } => {
            if let Some(year) = year {
                settings.year = year;
            }
            scrape(&settings)?
        }
        Commands::Products => {
            let Some(data) = load(&settings)? else { return Ok(()) };
            print_products(&data);
        }
        Commands::Testimonials => {
            let Some(data) = load(&settings)? else { return Ok(()) };
            for (i, t) in data.testimonials.iter().enumerate() {
                println!("{:>3} | {}", i + 1, t.text);
            }
            println!("\n{} testimonials", data.testimonials.len());
        }
        Commands::Months { year } => {
            let Some(data) = load(&settings)? else { return Ok(()) };
            let year = year.unwrap_or(settings.year);
            match YearView::build(&data.reviews, year) {
                Scoped::Found(view) => print_months(&view),
                Scoped::Empty(e) => print_empty(&e),
            }
        }
        Commands::Reviews { year, month } => {
            let Some(data) = load(&settings)? else { return Ok(()) };
            let year = year.unwrap_or(settings.year);
            reviews(&settings, &data, year, month.as_deref())?;
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }
    Ok(())
}

fn scrape(settings: &Settings) -> Result<()> {
    let extractor = Extractor::new(settings)?;
    let mut rng = rand::rng();

    println!("Scraping {} ...", settings.base_url);
    let report = extractor.run(&mut rng);
    for (category, reason) in report.failures() {
        println!("  {:<13} failed: {}", category, reason);
    }

    let mut data = report.into_dataset();
    let seeded = seed::fill_missing(&mut data, settings.year);
    store::write(&settings.data_path, &data)
        .with_context(|| format!("Failed to save {}", settings.data_path.display()))?;

    for category in Category::ALL {
        let note = if seeded.contains(&category) { " (seed data)" } else { "" };
        println!("  {:<13} {:>4}{}", category, data.count(category), note);
    }
    println!("Saved to {}", settings.data_path.display());
    Ok(())
}

/// `None` when nothing has been scraped yet; the guidance is printed here.
fn load(settings: &Settings) -> Result<Option<Dataset>> {
    let data = store::load(&settings.data_path)?;
    if data.is_none() {
        println!(
            "No data at {}. Run `review_insights scrape` first.",
            settings.data_path.display()
        );
    }
    Ok(data)
}

fn reviews(settings: &Settings, data: &Dataset, year: i32, month: Option<&str>) -> Result<()> {
    let view = match YearView::build(&data.reviews, year) {
        Scoped::Found(view) => view,
        Scoped::Empty(e) => {
            print_empty(&e);
            return Ok(());
        }
    };

    let Some(name) = month else {
        print_months(&view);
        return Ok(());
    };
    let month = analysis::parse_month(name)
        .with_context(|| format!("Unknown month {:?}", name))?;

    let engine = SentimentEngine::from_settings(settings);
    let pb = ProgressBar::new(view.in_month(month).len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Analyzing [{bar:30.cyan/blue}] {pos}/{len}")?
            .progress_chars("#>-"),
    );
    let report = analysis::classify_month_with(&view, month, &engine, || pb.inc(1));
    pb.finish_and_clear();

    match report {
        Scoped::Found(report) => print_report(&report),
        Scoped::Empty(e) => print_empty(&e),
    }
    Ok(())
}

fn print_products(data: &Dataset) {
    println!("{:>3} | {:<40} | {:>10}", "#", "Product", "Price");
    println!("{}", "-".repeat(60));
    for (i, p) in data.products.iter().enumerate() {
        println!("{:>3} | {:<40} | {:>10}", i + 1, truncate(&p.name, 40), p.price);
    }
    println!("\n{} products", data.products.len());
}

fn print_months(view: &YearView) {
    println!("Months with reviews in {}:", view.year);
    for m in view.months() {
        println!("  {:<10} {:>4}", m.name(), view.in_month(m).len());
    }
    if view.unparseable > 0 {
        println!("({} reviews skipped: unreadable date)", view.unparseable);
    }
}

fn print_report(report: &MonthReport) {
    println!(
        "Reviews for {} {}  [mode: {}]\n",
        report.month.name(),
        report.year,
        report.mode
    );
    println!(
        "{:<10} | {:<24} | {:<40} | {:<8} | {:>5}",
        "Date", "Title", "Text", "Label", "Conf"
    );
    println!("{}", "-".repeat(100));
    for r in &report.reviews {
        let marker = if r.classified_by != report.mode { "*" } else { "" };
        println!(
            "{:<10} | {:<24} | {:<40} | {:<8} | {:>5.2}{}",
            r.date,
            truncate(&r.review.title, 24),
            truncate(&r.review.text, 40),
            r.sentiment.label,
            r.sentiment.confidence,
            marker
        );
    }
    println!(
        "\nPOSITIVE: {}  NEGATIVE: {}",
        report.positive(),
        report.negative()
    );
    if report.reviews.iter().any(|r| r.classified_by != report.mode) {
        println!("* classified by the keyword heuristic after a model error");
    }
}

fn print_empty(e: &EmptyScope) {
    match e.month {
        Some(m) => println!("No reviews for {} {}.", m.name(), e.year),
        None => println!("No reviews found for {}. Try scraping more pages.", e.year),
    }
    if e.unparseable > 0 {
        println!("({} reviews skipped: unreadable date)", e.unparseable);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrape_accepts_year_override() {
        let cli = Cli::try_parse_from(["review_insights", "scrape", "--year", "2021"]).unwrap();
        assert!(matches!(cli.command, Commands::Scrape { year: Some(2021) }));

        let cli = Cli::try_parse_from(["review_insights", "scrape"]).unwrap();
        assert!(matches!(cli.command, Commands::Scrape { year: None }));
    }

    #[test]
    fn data_path_is_global() {
        let cli =
            Cli::try_parse_from(["review_insights", "months", "-y", "2022", "--data", "x.json"])
                .unwrap();
        assert_eq!(cli.data, Some(PathBuf::from("x.json")));
        assert!(matches!(cli.command, Commands::Months { year: Some(2022) }));
    }
}
