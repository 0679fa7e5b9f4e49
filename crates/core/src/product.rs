#![forbid(unsafe_code)]

use crate::ids::{CategoryId, ProductId, deserialize_optional_category_id};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const LOW_STOCK_THRESHOLD: u64 = 10;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SizeVariant {
    pub size: String,
    #[serde(default)]
    pub sku: String,
    pub price: Decimal,
    #[serde(default)]
    pub currency: String,
    /// Percentage off `price`, 0..=100.
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub stock: u64,
}

impl SizeVariant {
    /// `None` when the discounted price does not fit a `Decimal`.
    pub fn effective_price(&self) -> Option<Decimal> {
        let factor = Decimal::ONE.checked_sub(self.discount.checked_div(Decimal::ONE_HUNDRED)?)?;
        self.price.checked_mul(factor)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(rename = "product_name")]
    pub name: String,
    #[serde(rename = "product_description", default)]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_optional_category_id")]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub main_image: Option<String>,
    #[serde(default)]
    pub sizes: Vec<SizeVariant>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
    pub currency: String,
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{:.2} {}", self.min, self.currency)
        } else {
            write!(f, "{:.2} - {:.2} {}", self.min, self.max, self.currency)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    InStock,
}

impl StockStatus {
    pub fn from_stock(stock: u64) -> Self {
        match stock {
            0 => Self::OutOfStock,
            n if n < LOW_STOCK_THRESHOLD => Self::LowStock,
            _ => Self::InStock,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::OutOfStock => "Out of Stock",
            Self::LowStock => "Low Stock",
            Self::InStock => "In Stock",
        }
    }
}

impl Product {
    /// Cheapest and dearest size after discount. Sizes whose price cannot be
    /// computed are skipped. The currency of the last priced size wins; mixed
    /// currencies are not reconciled.
    pub fn price_range(&self) -> Option<PriceRange> {
        let mut range: Option<PriceRange> = None;
        for size in &self.sizes {
            let Some(price) = size.effective_price() else {
                tracing::warn!(product = %self.id, sku = %size.sku, "size price overflows, skipped");
                continue;
            };
            match range.as_mut() {
                None => {
                    range = Some(PriceRange {
                        min: price,
                        max: price,
                        currency: size.currency.clone(),
                    });
                }
                Some(range) => {
                    range.min = range.min.min(price);
                    range.max = range.max.max(price);
                    range.currency.clone_from(&size.currency);
                }
            }
        }
        range
    }

    pub fn total_stock(&self) -> u64 {
        self.sizes
            .iter()
            .fold(0u64, |total, size| total.saturating_add(size.stock))
    }

    pub fn stock_status(&self) -> StockStatus {
        StockStatus::from_stock(self.total_stock())
    }
}

/// Name substring (case-insensitive) and optional exact category match.
pub fn filter_products<'a>(
    products: &'a [Product],
    term: &str,
    category: Option<&CategoryId>,
) -> Vec<&'a Product> {
    let needle = term.trim().to_lowercase();
    products
        .iter()
        .filter(|product| needle.is_empty() || product.name.to_lowercase().contains(&needle))
        .filter(|product| category.is_none_or(|wanted| product.category_id.as_ref() == Some(wanted)))
        .collect()
}
