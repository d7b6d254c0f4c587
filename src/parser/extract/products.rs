use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::debug;

use crate::models::Product;
use crate::parser::first_text;

static PRODUCT: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".product").unwrap());
static NAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".product-title, h3").unwrap());
static PRICE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".product-price, span").unwrap());

/// Parse the products listing, keeping at most `limit` entries.
/// Cards without a name or a price are skipped.
pub fn extract(html: &str, limit: usize) -> Vec<Product> {
    let doc = Html::parse_document(html);
    doc.select(&PRODUCT)
        .take(limit)
        .filter_map(|card| {
            let name = first_text(card, &NAME);
            let price = first_text(card, &PRICE);
            match (name, price) {
                (Some(name), Some(price)) => Some(Product { name, price }),
                (name, _) => {
                    debug!("Skipping product card without name/price: {:?}", name);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="product">
            <h3 class="product-title"><a href="/product/1"> Box of Chocolate Candy </a></h3>
            <div class="product-price">24.99</div>
          </div>
          <div class="product">
            <h3>Dark Red Energy Potion</h3>
            <span>4.99</span>
          </div>
          <div class="product"><p>no title here</p></div>
        </body></html>
    "#;

    #[test]
    fn parses_cards_and_trims() {
        let p = extract(PAGE, 10);
        assert_eq!(p.len(), 2);
        assert_eq!(p[0].name, "Box of Chocolate Candy");
        assert_eq!(p[0].price, "24.99");
        assert_eq!(p[1].name, "Dark Red Energy Potion");
        assert_eq!(p[1].price, "4.99");
    }

    #[test]
    fn respects_limit() {
        assert_eq!(extract(PAGE, 1).len(), 1);
    }

    #[test]
    fn no_cards_is_empty() {
        assert!(extract("<html><body><p>maintenance</p></body></html>", 10).is_empty());
    }
}
