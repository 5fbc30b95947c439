use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    dto::{
        auth::{AuthResponse, LoginRequest, ProfileUpdate, RegisterRequest},
        catalog::{CategoryList, ProductCatalog, ProductFilter, ProductList},
        orders::{CheckoutRequest, CheckoutResponse, OrderList, OrderWithItems},
    },
    error::AppResult,
    extract::{JsonBody, PathParam, QueryParams},
    middleware::auth::AuthUser,
    models::{Product, User},
    response::{ApiResponse, Meta},
    routes::{params::Pagination, with_session_cookie},
    services::{auth_service, catalog_service, category_service, order_service},
    session::expired_cookie,
    state::AppState,
    uploads::{AssetBase, FileField, MultipartForm},
};

const REGISTER_FILES: &[FileField] = &[FileField::document("business_license")];
const PROFILE_FILES: &[FileField] = &[
    FileField::image("profileAvatar", 1),
    FileField::image("shop_logo", 1),
];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/profile", get(profile))
        .route("/update-profile", post(update_profile))
        .route("/all-categories", get(all_categories))
        .route("/products", get(products))
        .route("/product-detail/{product_id}", get(product_detail))
        .route("/popular-products", get(popular_products))
        .route("/featured-products", get(featured_products))
        .route("/checkout", post(checkout))
        .route("/orders", get(my_orders))
        .route("/orders/{id}", get(my_order))
}

#[utoipa::path(
    post,
    path = "/api/v1/user/register",
    request_body(content = RegisterRequest, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Account created", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "User already exists")
    ),
    tag = "Account"
)]
pub async fn register(
    State(state): State<AppState>,
    assets: AssetBase,
    multipart: Multipart,
) -> AppResult<Response> {
    let form = MultipartForm::read(multipart, REGISTER_FILES).await?;
    let resp = auth_service::register(&state, &assets, form).await?;
    let token = resp.data.as_ref().and_then(|d| d.token.clone());
    let mut response = with_session_cookie(&state, token.as_deref(), resp)?;
    *response.status_mut() = StatusCode::CREATED;
    Ok(response)
}

#[utoipa::path(
    post,
    path = "/api/v1/user/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, token also set as cookie", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid email or password"),
        (status = 403, description = "Vendor not approved")
    ),
    tag = "Account"
)]
pub async fn login(
    State(state): State<AppState>,
    assets: AssetBase,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> AppResult<Response> {
    let resp = auth_service::login(&state, &assets, payload).await?;
    let token = resp.data.as_ref().and_then(|d| d.token.clone());
    with_session_cookie(&state, token.as_deref(), resp)
}

#[utoipa::path(
    post,
    path = "/api/v1/user/logout",
    responses((status = 200, description = "Session cookie cleared")),
    tag = "Account"
)]
pub async fn logout() -> Response {
    let body = ApiResponse::success(
        "Logged out successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    );
    ([(header::SET_COOKIE, expired_cookie())], Json(body)).into_response()
}

#[utoipa::path(
    get,
    path = "/api/v1/user/profile",
    responses(
        (status = 200, description = "Own profile", body = ApiResponse<User>),
        (status = 400, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
    assets: AssetBase,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = auth_service::get_profile(&state, &user, &assets).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/user/update-profile",
    request_body(content = ProfileUpdate, content_type = "multipart/form-data"),
    responses((status = 200, description = "Profile updated", body = ApiResponse<User>)),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    assets: AssetBase,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<User>>> {
    let form = MultipartForm::read(multipart, PROFILE_FILES).await?;
    let resp = auth_service::update_profile(&state, &user, &assets, form).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/user/all-categories",
    responses((status = 200, description = "Categories, newest first", body = ApiResponse<CategoryList>)),
    tag = "Catalog"
)]
pub async fn all_categories(
    State(state): State<AppState>,
    assets: AssetBase,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = category_service::list_categories(&state, &assets).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/user/products",
    params(ProductFilter),
    responses((status = 200, description = "Approved products matching the filter", body = ApiResponse<ProductCatalog>)),
    tag = "Catalog"
)]
pub async fn products(
    State(state): State<AppState>,
    assets: AssetBase,
    QueryParams(filter): QueryParams<ProductFilter>,
) -> AppResult<Json<ApiResponse<ProductCatalog>>> {
    let resp = catalog_service::list_products(&state, &assets, filter).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/user/product-detail/{product_id}",
    params(("product_id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product with gallery", body = ApiResponse<Product>),
        (status = 404, description = "Product not found")
    ),
    tag = "Catalog"
)]
pub async fn product_detail(
    State(state): State<AppState>,
    assets: AssetBase,
    PathParam(product_id): PathParam<i32>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = catalog_service::product_detail(&state, &assets, product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/user/popular-products",
    responses((status = 200, description = "Popular products", body = ApiResponse<ProductList>)),
    tag = "Catalog"
)]
pub async fn popular_products(
    State(state): State<AppState>,
    assets: AssetBase,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = catalog_service::popular_products(&state, &assets).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/user/featured-products",
    responses((status = 200, description = "Featured products", body = ApiResponse<ProductList>)),
    tag = "Catalog"
)]
pub async fn featured_products(
    State(state): State<AppState>,
    assets: AssetBase,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = catalog_service::featured_products(&state, &assets).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/user/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Order placed", body = ApiResponse<CheckoutResponse>),
        (status = 400, description = "Invalid cart or missing fields"),
        (status = 401, description = "Invalid credentials"),
        (status = 404, description = "User not found")
    ),
    tag = "Orders"
)]
pub async fn checkout(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CheckoutRequest>,
) -> AppResult<Response> {
    let resp = order_service::checkout(&state, payload).await?;
    let token = resp.data.as_ref().and_then(|d| d.token.clone());
    with_session_cookie(&state, token.as_deref(), resp)
}

#[utoipa::path(
    get,
    path = "/api/v1/user/orders",
    params(Pagination),
    responses((status = 200, description = "Own orders", body = ApiResponse<OrderList>)),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn my_orders(
    State(state): State<AppState>,
    user: AuthUser,
    QueryParams(pagination): QueryParams<Pagination>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_my_orders(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/user/orders/{id}",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Own order with items", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn my_order(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(id): PathParam<i32>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::get_my_order(&state, &user, id).await?;
    Ok(Json(resp))
}
