use std::time::Instant;

use anyhow::{Context, Result};
use rand::Rng;
use reqwest::blocking::Client;
use tracing::{info, warn};

use crate::models::{Category, Dataset, Product, Review, Testimonial};
use crate::parser::extract::{products, reviews, testimonials};
use crate::settings::Settings;

const USER_AGENT: &str = concat!("review_insights/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Result of one category: records (possibly none) or the reason it failed.
#[derive(Debug)]
pub enum Outcome<T> {
    Extracted(Vec<T>),
    Failed { reason: String },
}

impl<T> Outcome<T> {
    pub fn into_records(self) -> Vec<T> {
        match self {
            Outcome::Extracted(records) => records,
            Outcome::Failed { .. } => Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

/// Three independent outcomes, combined only after every category ran.
#[derive(Debug)]
pub struct ExtractionReport {
    pub products: Outcome<Product>,
    pub testimonials: Outcome<Testimonial>,
    pub reviews: Outcome<Review>,
}

impl ExtractionReport {
    pub fn failures(&self) -> Vec<(Category, &str)> {
        let mut out = Vec::new();
        if let Outcome::Failed { reason } = &self.products {
            out.push((Category::Products, reason.as_str()));
        }
        if let Outcome::Failed { reason } = &self.testimonials {
            out.push((Category::Testimonials, reason.as_str()));
        }
        if let Outcome::Failed { reason } = &self.reviews {
            out.push((Category::Reviews, reason.as_str()));
        }
        out
    }

    pub fn into_dataset(self) -> Dataset {
        Dataset {
            products: self.products.into_records(),
            testimonials: self.testimonials.into_records(),
            reviews: self.reviews.into_records(),
        }
    }
}

pub struct Extractor {
    client: Client,
    base_url: String,
    year: i32,
    max_products: usize,
    max_testimonials: usize,
}

impl Extractor {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout())
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            year: settings.year,
            max_products: settings.max_products,
            max_testimonials: settings.max_testimonials,
        })
    }

    /// Fetch and parse every category once, sequentially. A failing
    /// category never stops the others.
    pub fn run(&self, rng: &mut impl Rng) -> ExtractionReport {
        let products = self.attempt(Category::Products, |html| {
            products::extract(html, self.max_products)
        });
        let testimonials = self.attempt(Category::Testimonials, |html| {
            testimonials::extract(html, self.max_testimonials)
        });
        let reviews = self.attempt(Category::Reviews, |html| {
            reviews::extract(html, self.year, rng)
        });

        ExtractionReport {
            products,
            testimonials,
            reviews,
        }
    }

    fn attempt<T>(&self, category: Category, parse: impl FnOnce(&str) -> Vec<T>) -> Outcome<T> {
        let start = Instant::now();
        match self.fetch(category) {
            Ok(html) => {
                let records = parse(&html);
                info!(
                    "Extracted {} {} in {}ms",
                    records.len(),
                    category,
                    start.elapsed().as_millis()
                );
                Outcome::Extracted(records)
            }
            Err(e) => {
                warn!("Extraction of {} failed: {}", category, e);
                Outcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Single attempt, bounded by the client timeout. Non-2xx is a failure.
    pub fn fetch(&self, category: Category) -> Result<String, FetchError> {
        let url = format!("{}{}", self.base_url, category.path());
        self.client
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|source| FetchError::Http {
                url: url.clone(),
                source,
            })
    }
}
