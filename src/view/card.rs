use mobilemart_products::Product;
use std::fmt;

const MAX_RATING: u8 = 5;

/// One product tile, formatted for display
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCard {
    pub id: u64,
    pub title: String,
    pub image: String,
    /// `★` per rating point, padded with `☆` to five
    pub stars: String,
    /// e.g. `(10)`
    pub review_count: String,
    pub old_price: String,
    pub discount: String,
    pub final_price: String,
}

impl ProductCard {
    pub fn new(product: &Product) -> Self {
        let draft = &product.draft;
        let filled = draft.rating.min(MAX_RATING) as usize;

        Self {
            id: product.id,
            title: draft.name.clone(),
            image: draft.image.clone(),
            stars: format!(
                "{}{}",
                "★".repeat(filled),
                "☆".repeat(MAX_RATING as usize - filled)
            ),
            review_count: format!("({})", draft.reviews),
            old_price: format_price(draft.old_price),
            discount: draft.discount.clone(),
            final_price: format_price(draft.price),
        }
    }
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self::new(product)
    }
}

impl fmt::Display for ProductCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{} {}", self.stars, self.review_count)?;
        writeln!(f, "{} {}", self.old_price, self.discount)?;
        write!(f, "{}", self.final_price)
    }
}

// Whole amounts print without decimals, like the catalog shows them.
fn format_price(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("${:.0}", amount)
    } else {
        format!("${:.2}", amount)
    }
}
