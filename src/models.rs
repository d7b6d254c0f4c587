use std::fmt;

use serde::{Deserialize, Serialize};

// ── Records ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testimonial {
    pub text: String,
}

/// A scraped review. `date` is kept as the raw ISO-style string so a
/// malformed value survives a round trip and is only rejected at analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub title: String,
    pub text: String,
    pub date: String,
}

// ── Dataset ──

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub testimonials: Vec<Testimonial>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Dataset {
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Products => self.products.len(),
            Category::Testimonials => self.testimonials.len(),
            Category::Reviews => self.reviews.len(),
        }
    }
}

/// One of the three independently extracted content types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Products,
    Testimonials,
    Reviews,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Products, Category::Testimonials, Category::Reviews];

    /// Path segment on the source site.
    pub fn path(self) -> &'static str {
        match self {
            Category::Products => "/products",
            Category::Testimonials => "/testimonials",
            Category::Reviews => "/reviews",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Products => "products",
            Category::Testimonials => "testimonials",
            Category::Reviews => "reviews",
        };
        f.pad(name)
    }
}
