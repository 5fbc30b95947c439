use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::{ProductStatus, User};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorStatusRequest {
    pub vendor_id: i32,
    /// 1 approves, 2 rejects.
    pub status: i16,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VendorStatusResponse {
    pub user: User,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductStatusRequest {
    pub product_id: i32,
    pub status: ProductStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PopularityRequest {
    pub product_id: i32,
    pub is_popular: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRequest {
    pub product_id: i32,
    pub is_feature: bool,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct VendorListQuery {
    /// Approval filter: 0 pending, 1 approved, 2 rejected.
    pub status: Option<i16>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct UserList {
    #[schema(value_type = Vec<User>)]
    pub items: Vec<User>,
}
