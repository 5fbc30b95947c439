use axum::{
    Json, Router,
    extract::{Multipart, State},
    routing::{delete, get, post, put},
};

use crate::{
    dto::{catalog::ProductList, orders::OrderItemList, vendor::ProductInput},
    error::AppResult,
    extract::PathParam,
    middleware::auth::AuthUser,
    models::Product,
    response::ApiResponse,
    services::vendor_service::{self, PRODUCT_FILES},
    state::AppState,
    uploads::{AssetBase, MultipartForm},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add-product", post(add_product))
        .route("/update-product/{product_id}", put(update_product))
        .route("/vendor-products", get(vendor_products))
        .route("/single-product-detail/{product_id}", get(single_product))
        .route("/delete-products/{product_id}", delete(delete_product))
        .route("/vendor-orders", get(vendor_orders))
}

#[utoipa::path(
    post,
    path = "/api/vendor/add-product",
    request_body(content = ProductInput, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Product submitted for review", body = ApiResponse<Product>),
        (status = 400, description = "Missing fields, images or unknown category"),
        (status = 403, description = "Not an approved vendor")
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn add_product(
    State(state): State<AppState>,
    user: AuthUser,
    assets: AssetBase,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<Product>>> {
    let form = MultipartForm::read(multipart, PRODUCT_FILES).await?;
    let resp = vendor_service::add_product(&state, &user, &assets, form).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/vendor/update-product/{product_id}",
    params(("product_id" = i32, Path, description = "Product id")),
    request_body(content = ProductInput, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<Product>),
        (status = 404, description = "Not one of the vendor's products")
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    assets: AssetBase,
    PathParam(product_id): PathParam<i32>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<Product>>> {
    let form = MultipartForm::read(multipart, PRODUCT_FILES).await?;
    let resp = vendor_service::update_product(&state, &user, &assets, product_id, form).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/vendor/vendor-products",
    responses((status = 200, description = "Own products", body = ApiResponse<ProductList>)),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn vendor_products(
    State(state): State<AppState>,
    user: AuthUser,
    assets: AssetBase,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = vendor_service::vendor_products(&state, &user, &assets).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/vendor/single-product-detail/{product_id}",
    params(("product_id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Own product", body = ApiResponse<Product>),
        (status = 404, description = "Not one of the vendor's products")
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn single_product(
    State(state): State<AppState>,
    user: AuthUser,
    assets: AssetBase,
    PathParam(product_id): PathParam<i32>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = vendor_service::single_product(&state, &user, &assets, product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/vendor/delete-products/{product_id}",
    params(("product_id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product and gallery deleted"),
        (status = 404, description = "Not one of the vendor's products"),
        (status = 409, description = "Product has orders")
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(product_id): PathParam<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = vendor_service::delete_product(&state, &user, product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/vendor/vendor-orders",
    responses((status = 200, description = "Line items sold by this vendor", body = ApiResponse<OrderItemList>)),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn vendor_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderItemList>>> {
    let resp = vendor_service::vendor_orders(&state, &user).await?;
    Ok(Json(resp))
}
