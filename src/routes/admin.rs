use axum::{
    Json, Router,
    extract::{Multipart, State},
    response::Response,
    routing::{delete, get, patch, post, put},
};

use crate::{
    dto::{
        admin::{
            FeatureRequest, PopularityRequest, ProductStatusRequest, UserList, VendorListQuery,
            VendorStatusRequest, VendorStatusResponse,
        },
        auth::{AuthResponse, LoginRequest, ProfileUpdate},
        catalog::{CategoryList, ProductList},
        orders::{OrderList, OrderWithItems, UpdateOrderStatusRequest},
    },
    error::AppResult,
    extract::{JsonBody, PathParam, QueryParams},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Category, Product, User},
    response::ApiResponse,
    routes::{params::OrderListQuery, with_session_cookie},
    services::{admin_service, auth_service, category_service},
    state::AppState,
    uploads::{AssetBase, FileField, MultipartForm},
};

const AVATAR_FILE: &[FileField] = &[FileField::image("profileAvatar", 1)];
const CATEGORY_FILE: &[FileField] = &[FileField::image("category_image", 1)];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin-login", post(admin_login))
        .route("/profile", get(admin_profile))
        .route("/update-profile", post(update_admin_profile))
        .route("/vendor-status", post(update_vendor_status))
        .route("/product-status", post(update_product_status))
        .route("/update-popularity", post(update_popularity))
        .route("/update-featured", post(update_featured))
        .route("/create-category", post(create_category))
        .route("/all-categories", get(all_categories))
        .route("/update-category/{id}", put(update_category))
        .route("/delete-category/{id}", delete(delete_category))
        .route("/all-users", get(all_users))
        .route("/all-vendors", get(all_vendors))
        .route("/single-vendor-products/{vendor_id}", get(single_vendor_products))
        .route("/orders", get(list_all_orders))
        .route("/orders/{id}/status", patch(update_order_status))
}

#[utoipa::path(
    post,
    path = "/api/admin/admin-login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Admin logged in", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Not an admin or wrong password")
    ),
    tag = "Admin"
)]
pub async fn admin_login(
    State(state): State<AppState>,
    assets: AssetBase,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> AppResult<Response> {
    let resp = auth_service::admin_login(&state, &assets, payload).await?;
    let token = resp.data.as_ref().and_then(|d| d.token.clone());
    with_session_cookie(&state, token.as_deref(), resp)
}

#[utoipa::path(
    get,
    path = "/api/admin/profile",
    responses((status = 200, description = "Admin profile", body = ApiResponse<User>)),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn admin_profile(
    State(state): State<AppState>,
    user: AuthUser,
    assets: AssetBase,
) -> AppResult<Json<ApiResponse<User>>> {
    ensure_admin(&user)?;
    let resp = auth_service::get_profile(&state, &user, &assets).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/update-profile",
    request_body(content = ProfileUpdate, content_type = "multipart/form-data"),
    responses((status = 200, description = "Admin profile updated", body = ApiResponse<User>)),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_admin_profile(
    State(state): State<AppState>,
    user: AuthUser,
    assets: AssetBase,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<User>>> {
    ensure_admin(&user)?;
    let form = MultipartForm::read(multipart, AVATAR_FILE).await?;
    let resp = auth_service::update_profile(&state, &user, &assets, form).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/vendor-status",
    request_body = VendorStatusRequest,
    responses(
        (status = 200, description = "Vendor approved or rejected", body = ApiResponse<VendorStatusResponse>),
        (status = 400, description = "Invalid status or vendor already decided"),
        (status = 404, description = "Vendor not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_vendor_status(
    State(state): State<AppState>,
    user: AuthUser,
    assets: AssetBase,
    JsonBody(payload): JsonBody<VendorStatusRequest>,
) -> AppResult<Json<ApiResponse<VendorStatusResponse>>> {
    let resp = admin_service::update_vendor_status(&state, &user, &assets, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/product-status",
    request_body = ProductStatusRequest,
    responses(
        (status = 200, description = "Product approved or rejected", body = ApiResponse<Product>),
        (status = 400, description = "Transition not allowed")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_product_status(
    State(state): State<AppState>,
    user: AuthUser,
    assets: AssetBase,
    JsonBody(payload): JsonBody<ProductStatusRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = admin_service::update_product_status(&state, &user, &assets, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/update-popularity",
    request_body = PopularityRequest,
    responses((status = 200, description = "Popularity flag set", body = ApiResponse<Product>)),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_popularity(
    State(state): State<AppState>,
    user: AuthUser,
    assets: AssetBase,
    JsonBody(payload): JsonBody<PopularityRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = admin_service::update_popularity(&state, &user, &assets, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/update-featured",
    request_body = FeatureRequest,
    responses((status = 200, description = "Feature flag set", body = ApiResponse<Product>)),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_featured(
    State(state): State<AppState>,
    user: AuthUser,
    assets: AssetBase,
    JsonBody(payload): JsonBody<FeatureRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = admin_service::update_featured(&state, &user, &assets, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/create-category",
    request_body(content = String, content_type = "multipart/form-data", description = "Fields: name, category_image"),
    responses(
        (status = 200, description = "Category created", body = ApiResponse<Category>),
        (status = 409, description = "Category already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    assets: AssetBase,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<Category>>> {
    ensure_admin(&user)?;
    let form = MultipartForm::read(multipart, CATEGORY_FILE).await?;
    let resp = category_service::create_category(&state, &user, &assets, form).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/all-categories",
    responses((status = 200, description = "Categories", body = ApiResponse<CategoryList>)),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn all_categories(
    State(state): State<AppState>,
    user: AuthUser,
    assets: AssetBase,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    ensure_admin(&user)?;
    let resp = category_service::list_categories(&state, &assets).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/update-category/{id}",
    params(("id" = i32, Path, description = "Category id")),
    request_body(content = String, content_type = "multipart/form-data", description = "Fields: name, category_image"),
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<Category>),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Slug taken by another category")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_category(
    State(state): State<AppState>,
    user: AuthUser,
    assets: AssetBase,
    PathParam(id): PathParam<i32>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<Category>>> {
    ensure_admin(&user)?;
    let form = MultipartForm::read(multipart, CATEGORY_FILE).await?;
    let resp = category_service::update_category(&state, &user, &assets, id, form).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/delete-category/{id}",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(id): PathParam<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_admin(&user)?;
    let resp = category_service::delete_category(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/all-users",
    responses((status = 200, description = "Customer accounts", body = ApiResponse<UserList>)),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn all_users(
    State(state): State<AppState>,
    user: AuthUser,
    assets: AssetBase,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = admin_service::all_users(&state, &user, &assets).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/all-vendors",
    params(VendorListQuery),
    responses((status = 200, description = "Vendor accounts", body = ApiResponse<UserList>)),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn all_vendors(
    State(state): State<AppState>,
    user: AuthUser,
    assets: AssetBase,
    QueryParams(query): QueryParams<VendorListQuery>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = admin_service::all_vendors(&state, &user, &assets, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/single-vendor-products/{vendor_id}",
    params(("vendor_id" = i32, Path, description = "Vendor id")),
    responses(
        (status = 200, description = "All products of the vendor", body = ApiResponse<ProductList>),
        (status = 404, description = "Vendor not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn single_vendor_products(
    State(state): State<AppState>,
    user: AuthUser,
    assets: AssetBase,
    PathParam(vendor_id): PathParam<i32>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = admin_service::single_vendor_products(&state, &user, &assets, vendor_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "All orders", body = ApiResponse<OrderList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
    QueryParams(query): QueryParams<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = admin_service::list_all_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/orders/{id}/status",
    params(("id" = i32, Path, description = "Order id")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order status updated", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(id): PathParam<i32>,
    JsonBody(payload): JsonBody<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = admin_service::update_order_status(&state, &user, id, payload.status).await?;
    Ok(Json(resp))
}
