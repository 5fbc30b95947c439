use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{DeriveActiveEnum, EnumIter, sea_query::StringLen};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "vendor")]
    Vendor,
    #[sea_orm(string_value = "user")]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Vendor => "vendor",
            Role::User => "user",
        }
    }

    /// Roles a visitor may pick for themselves at registration.
    pub fn parse_self_service(raw: &str) -> Option<Role> {
        match raw {
            "user" => Some(Role::User),
            "vendor" => Some(Role::Vendor),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vendor account approval, stored as 0/1/2 and exchanged as the same integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "i16", db_type = "SmallInteger")]
#[serde(into = "i16", try_from = "i16")]
pub enum ApprovalStatus {
    #[sea_orm(num_value = 0)]
    Pending,
    #[sea_orm(num_value = 1)]
    Approved,
    #[sea_orm(num_value = 2)]
    Rejected,
}

impl ApprovalStatus {
    /// Only a pending account can be decided, and only once.
    pub fn transition(self, next: ApprovalStatus) -> Result<ApprovalStatus, String> {
        match (self, next) {
            (ApprovalStatus::Pending, ApprovalStatus::Approved)
            | (ApprovalStatus::Pending, ApprovalStatus::Rejected) => Ok(next),
            (_, ApprovalStatus::Pending) => Err("Status can not be reset to pending".to_string()),
            (current, _) => Err(format!(
                "Vendor account is already {}",
                current.label().to_lowercase()
            )),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "Pending",
            ApprovalStatus::Approved => "Approved",
            ApprovalStatus::Rejected => "Rejected",
        }
    }
}

impl From<ApprovalStatus> for i16 {
    fn from(value: ApprovalStatus) -> Self {
        match value {
            ApprovalStatus::Pending => 0,
            ApprovalStatus::Approved => 1,
            ApprovalStatus::Rejected => 2,
        }
    }
}

impl TryFrom<i16> for ApprovalStatus {
    type Error = String;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ApprovalStatus::Pending),
            1 => Ok(ApprovalStatus::Approved),
            2 => Ok(ApprovalStatus::Rejected),
            other => Err(format!("invalid approval status {other}")),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl ProductStatus {
    pub fn transition(self, next: ProductStatus) -> Result<ProductStatus, String> {
        match (self, next) {
            (ProductStatus::Pending, ProductStatus::Approved)
            | (ProductStatus::Pending, ProductStatus::Rejected) => Ok(next),
            (_, ProductStatus::Pending) => {
                Err("Products return to pending only when the vendor edits them".to_string())
            }
            (ProductStatus::Approved, _) => Err("Product is already approved".to_string()),
            (ProductStatus::Rejected, _) => Err("Product is already rejected".to_string()),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum OrderStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Shipped")]
    Shipped,
    #[sea_orm(string_value = "Delivered")]
    Delivered,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct User {
    pub id: i32,
    pub user_name: String,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    pub shop_name: Option<String>,
    pub shop_logo: Option<String>,
    pub profile_avatar: Option<String>,
    pub address: Option<String>,
    pub business_license: Option<String>,
    pub payment_method: Option<String>,
    pub payment_details: Option<String>,
    pub bank_name: Option<String>,
    #[schema(value_type = i16)]
    pub is_approved: ApprovalStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub category_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryRef {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Product {
    pub id: i32,
    pub vendor_id: i32,
    pub category_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub product_image: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_price: Decimal,
    pub stock: i32,
    pub status: ProductStatus,
    pub rating: f64,
    pub is_popular: bool,
    pub is_feature: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gallery_images: Option<Vec<ProductImage>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductImage {
    pub id: i32,
    pub url: String,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Order {
    pub id: i32,
    pub user_id: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub admin_commission: Decimal,
    pub payment_method: String,
    pub shipping_address: String,
    pub order_status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub vendor_id: i32,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub vendor_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub admin_commission: Decimal,
    pub created_at: DateTime<Utc>,
}
