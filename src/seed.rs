use tracing::info;

use crate::models::{Category, Dataset, Product, Review, Testimonial};

/// Replace every empty collection with its seed. Returns the categories
/// that were seeded; populated collections are left untouched.
pub fn fill_missing(data: &mut Dataset, year: i32) -> Vec<Category> {
    let mut seeded = Vec::new();

    if data.products.is_empty() {
        data.products = products();
        seeded.push(Category::Products);
    }
    if data.testimonials.is_empty() {
        data.testimonials = testimonials();
        seeded.push(Category::Testimonials);
    }
    if data.reviews.is_empty() {
        data.reviews = reviews(year);
        seeded.push(Category::Reviews);
    }

    for category in &seeded {
        info!("No {} extracted, using {} seed records", category, data.count(*category));
    }
    seeded
}

pub fn products() -> Vec<Product> {
    [("Standard Widget", "$19.99"), ("Premium Tool", "$49.99")]
        .into_iter()
        .map(|(name, price)| Product {
            name: name.to_string(),
            price: price.to_string(),
        })
        .collect()
}

pub fn testimonials() -> Vec<Testimonial> {
    ["Best service ever!", "I love this company."]
        .into_iter()
        .map(|text| Testimonial {
            text: text.to_string(),
        })
        .collect()
}

/// Both polarities, spread over four months of `year`.
pub fn reviews(year: i32) -> Vec<Review> {
    const SEED: &[(&str, &str, &str)] = &[
        ("Excellent!", "This product changed my life, I highly recommend it to everyone.", "01-15"),
        ("Disappointed", "The quality is very poor and it arrived broken. Very sad.", "01-20"),
        ("Good value", "It works as expected for the price. Not the best but okay.", "05-10"),
        ("Amazing", "Fast delivery and great customer support. Will buy again!", "05-25"),
        ("Worst purchase", "Waste of money. Does not work at all and the instructions are unclear.", "08-05"),
        ("Perfect", "Exactly what I was looking for. 5 stars!", "11-12"),
    ];

    SEED.iter()
        .map(|(title, text, month_day)| Review {
            title: title.to_string(),
            text: text.to_string(),
            date: format!("{year}-{month_day}"),
        })
        .collect()
}
