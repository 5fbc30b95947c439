use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::{Category, Product};

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct ProductFilter {
    pub category_slug: Option<String>,
    #[serde(rename = "minPrice", default, deserialize_with = "blank_as_none")]
    pub min_price: Option<f64>,
    #[serde(rename = "maxPrice", default, deserialize_with = "blank_as_none")]
    pub max_price: Option<f64>,
}

/// `?minPrice=` means no bound rather than a malformed number.
fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid price bound '{value}'"))),
    }
}

impl ProductFilter {
    pub fn price_bounds(&self) -> (Option<Decimal>, Option<Decimal>) {
        let to_decimal = |v: f64| Decimal::try_from(v).ok();
        (
            self.min_price.and_then(to_decimal),
            self.max_price.and_then(to_decimal),
        )
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductCatalog {
    pub products: Vec<Product>,
    pub filter_product_count: usize,
    pub total_products: u64,
    #[serde(with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub min_price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub max_price: Option<Decimal>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<Category>)]
    pub items: Vec<Category>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::Uri};

    fn parse(uri: &str) -> Result<ProductFilter, String> {
        let uri: Uri = uri.parse().unwrap();
        Query::<ProductFilter>::try_from_uri(&uri)
            .map(|Query(f)| f)
            .map_err(|e| e.body_text())
    }

    #[test]
    fn blank_price_bounds_are_absent() {
        let filter = parse("/products?minPrice=&maxPrice=100&category_slug=lamps").unwrap();
        assert_eq!(filter.min_price, None);
        assert_eq!(filter.max_price, Some(100.0));
        assert_eq!(filter.category_slug.as_deref(), Some("lamps"));
        assert_eq!(filter.price_bounds(), (None, Some(Decimal::from(100))));

        let filter = parse("/products").unwrap();
        assert_eq!(filter.price_bounds(), (None, None));
    }

    #[test]
    fn malformed_price_bound_is_rejected() {
        let err = parse("/products?minPrice=cheap").unwrap_err();
        assert!(err.contains("invalid price bound 'cheap'"));
    }
}
