use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, sea_query::Expr,
};

use crate::{
    audit,
    dto::{
        admin::{
            FeatureRequest, PopularityRequest, ProductStatusRequest, UserList, VendorListQuery,
            VendorStatusRequest, VendorStatusResponse,
        },
        catalog::ProductList,
        orders::{OrderList, OrderWithItems},
    },
    entity::{
        categories::Entity as Categories,
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        products::{ActiveModel as ProductActive, Column as ProductCol, Entity as Products, Model as ProductModel},
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    mailer::{self, vendor_decision_mail},
    middleware::auth::{AuthUser, ensure_admin},
    models::{ApprovalStatus, OrderStatus, Product, Role},
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    services::{
        auth_service::user_from_entity,
        catalog_service::{load_galleries, product_from_entity},
        order_service::{items_of, order_from_entity},
    },
    state::AppState,
    uploads::AssetBase,
};

/// A decision the admin may take on a pending vendor.
pub fn requested_decision(raw: i16) -> AppResult<ApprovalStatus> {
    match ApprovalStatus::try_from(raw) {
        Ok(status @ (ApprovalStatus::Approved | ApprovalStatus::Rejected)) => Ok(status),
        _ => Err(AppError::bad_request(
            "Invalid status value. Use 1 (approved) or 2 (rejected)",
        )),
    }
}

pub async fn update_vendor_status(
    state: &AppState,
    user: &AuthUser,
    assets: &AssetBase,
    payload: VendorStatusRequest,
) -> AppResult<ApiResponse<VendorStatusResponse>> {
    ensure_admin(user)?;
    let next = requested_decision(payload.status)?;

    let vendor = Users::find_by_id(payload.vendor_id)
        .filter(UserCol::Role.eq(Role::Vendor))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Vendor not found"))?;
    vendor
        .is_approved
        .transition(next)
        .map_err(AppError::BadRequest)?;

    // Guarded on the current state so two admins can not both decide.
    let result = Users::update_many()
        .col_expr(UserCol::IsApproved, Expr::value(i16::from(next)))
        .col_expr(UserCol::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
        .filter(UserCol::Id.eq(vendor.id))
        .filter(UserCol::IsApproved.eq(ApprovalStatus::Pending))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::bad_request("Vendor account was already decided"));
    }

    let vendor = Users::find_by_id(vendor.id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Vendor not found"))?;

    tracing::info!(vendor_id = vendor.id, status = next.label(), "vendor decided");
    if let Some(mail) = vendor_decision_mail(&vendor, next) {
        mailer::deliver(state.mailer.as_ref(), mail).await;
    }
    audit::record(
        state,
        Some(user.user_id),
        "vendor_status_update",
        "users",
        serde_json::json!({ "vendor_id": vendor.id, "status": next }),
    )
    .await;

    let message = format!("Vendor {} successfully", next.label().to_lowercase());
    Ok(ApiResponse::success(
        message,
        VendorStatusResponse {
            user: user_from_entity(vendor, assets),
        },
        Some(Meta::empty()),
    ))
}

async fn find_product(state: &AppState, id: i32) -> AppResult<ProductModel> {
    Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))
}

pub async fn update_product_status(
    state: &AppState,
    user: &AuthUser,
    assets: &AssetBase,
    payload: ProductStatusRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let product = find_product(state, payload.product_id).await?;
    let next = product
        .status
        .transition(payload.status)
        .map_err(AppError::BadRequest)?;

    let mut active: ProductActive = product.into();
    active.status = Set(next);
    active.updated_at = Set(Utc::now().into());
    let product = active.update(&state.orm).await?;

    audit::record(
        state,
        Some(user.user_id),
        "product_status_update",
        "products",
        serde_json::json!({ "product_id": product.id, "status": next }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product status updated",
        product_from_entity(product, None, None, assets),
        Some(Meta::empty()),
    ))
}

pub async fn update_popularity(
    state: &AppState,
    user: &AuthUser,
    assets: &AssetBase,
    payload: PopularityRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let product = find_product(state, payload.product_id).await?;

    let mut active: ProductActive = product.into();
    active.is_popular = Set(payload.is_popular);
    active.updated_at = Set(Utc::now().into());
    let product = active.update(&state.orm).await?;

    audit::record(
        state,
        Some(user.user_id),
        "product_popularity_update",
        "products",
        serde_json::json!({ "product_id": product.id, "is_popular": product.is_popular }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product popularity updated",
        product_from_entity(product, None, None, assets),
        Some(Meta::empty()),
    ))
}

pub async fn update_featured(
    state: &AppState,
    user: &AuthUser,
    assets: &AssetBase,
    payload: FeatureRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let product = find_product(state, payload.product_id).await?;

    let mut active: ProductActive = product.into();
    active.is_feature = Set(payload.is_feature);
    active.updated_at = Set(Utc::now().into());
    let product = active.update(&state.orm).await?;

    audit::record(
        state,
        Some(user.user_id),
        "product_feature_update",
        "products",
        serde_json::json!({ "product_id": product.id, "is_feature": product.is_feature }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product feature flag updated",
        product_from_entity(product, None, None, assets),
        Some(Meta::empty()),
    ))
}

pub async fn all_users(
    state: &AppState,
    user: &AuthUser,
    assets: &AssetBase,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let items = Users::find()
        .filter(UserCol::Role.eq(Role::User))
        .order_by_desc(UserCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|u| user_from_entity(u, assets))
        .collect();
    Ok(ApiResponse::success("Users", UserList { items }, Some(Meta::empty())))
}

pub async fn all_vendors(
    state: &AppState,
    user: &AuthUser,
    assets: &AssetBase,
    query: VendorListQuery,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let mut condition = Condition::all().add(UserCol::Role.eq(Role::Vendor));
    if let Some(raw) = query.status {
        let status = ApprovalStatus::try_from(raw).map_err(AppError::BadRequest)?;
        condition = condition.add(UserCol::IsApproved.eq(status));
    }

    let items = Users::find()
        .filter(condition)
        .order_by_desc(UserCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|u| user_from_entity(u, assets))
        .collect();
    Ok(ApiResponse::success(
        "Vendors",
        UserList { items },
        Some(Meta::empty()),
    ))
}

/// Every product of one vendor, whatever its review status.
pub async fn single_vendor_products(
    state: &AppState,
    user: &AuthUser,
    assets: &AssetBase,
    vendor_id: i32,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(user)?;
    Users::find_by_id(vendor_id)
        .filter(UserCol::Role.eq(Role::Vendor))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Vendor not found"))?;

    let rows = Products::find()
        .find_also_related(Categories)
        .filter(ProductCol::VendorId.eq(vendor_id))
        .order_by_desc(ProductCol::CreatedAt)
        .all(&state.orm)
        .await?;
    let ids: Vec<i32> = rows.iter().map(|(p, _)| p.id).collect();
    let mut galleries = load_galleries(&state.orm, &ids).await?;

    let items = rows
        .into_iter()
        .map(|(product, category)| {
            let gallery = galleries.remove(&product.id).unwrap_or_default();
            product_from_entity(product, category, Some(gallery), assets)
        })
        .collect();
    Ok(ApiResponse::success(
        "Vendor products",
        ProductList { items },
        Some(Meta::empty()),
    ))
}

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::OrderStatus.eq(status));
    }

    let finder = Orders::find()
        .filter(condition)
        .order_by_desc(OrderCol::CreatedAt)
        .order_by_desc(OrderCol::Id);

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Orders", OrderList { items: orders }, Some(meta)))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    status: OrderStatus,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_admin(user)?;
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;

    let previous = order.order_status;
    let mut active: OrderActive = order.into();
    active.order_status = Set(status);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    audit::record(
        state,
        Some(user.user_id),
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "from": previous, "to": status }),
    )
    .await;

    let items = items_of(state, order.id).await?;
    Ok(ApiResponse::success(
        "Order status updated",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admins_may_only_approve_or_reject() {
        assert_eq!(requested_decision(1).unwrap(), ApprovalStatus::Approved);
        assert_eq!(requested_decision(2).unwrap(), ApprovalStatus::Rejected);
        assert!(requested_decision(0).is_err());
        assert!(requested_decision(3).is_err());
        assert!(requested_decision(-1).is_err());
    }
}
