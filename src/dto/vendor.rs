use rust_decimal::Decimal;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    pricing,
    uploads::MultipartForm,
};

/// Product fields a vendor submits; every field is optional on update.
#[derive(Debug, Default, Clone, ToSchema)]
pub struct ProductInput {
    pub category_name: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub discount_price: Option<Decimal>,
    pub stock: Option<i32>,
}

impl ProductInput {
    pub fn from_form(form: &MultipartForm) -> AppResult<Self> {
        Ok(Self {
            category_name: form.text("category_name"),
            name: form.text("name"),
            description: form.text("description"),
            price: parse_money(form.text("price"), "price")?,
            discount_price: parse_money(form.text("discount_price"), "discount_price")?,
            stock: form
                .text("stock")
                .map(|raw| {
                    raw.parse::<i32>()
                        .ok()
                        .filter(|s| *s >= 0)
                        .ok_or_else(|| AppError::bad_request("stock must be a non-negative integer"))
                })
                .transpose()?,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.category_name.is_some()
            && self.name.is_some()
            && self.description.is_some()
            && self.price.is_some()
            && self.discount_price.is_some()
            && self.stock.is_some()
    }
}

fn parse_money(raw: Option<String>, field: &str) -> AppResult<Option<Decimal>> {
    raw.map(|value| {
        value
            .parse::<Decimal>()
            .ok()
            .filter(|d| *d >= Decimal::ZERO)
            .map(|d| d.round_dp(pricing::PRICE_SCALE))
            .and_then(pricing::within_range)
            .ok_or_else(|| {
                AppError::bad_request(format!(
                    "{field} must be a non-negative number no greater than {}",
                    pricing::MAX_AMOUNT
                ))
            })
    })
    .transpose()
}
