use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;
use validator::ValidateEmail;

use crate::{
    audit,
    dto::orders::{CheckoutRequest, CheckoutResponse, OrderList, OrderWithItems},
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProductCol, Entity as Products},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{ApprovalStatus, Order, OrderItem, OrderStatus, ProductStatus, Role},
    pricing::{LineInput, split_order},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::auth_service::{ensure_sign_in_allowed, hash_password, verify_password},
    session::issue_token,
    state::AppState,
};

/// Who is paying for a checkout.
#[derive(Debug, PartialEq, Eq)]
enum Buyer {
    Existing(i32),
    Credentials { email: String, password: String },
}

fn buyer_from(payload: &CheckoutRequest) -> AppResult<Buyer> {
    if let Some(id) = payload.user_id {
        return Ok(Buyer::Existing(id));
    }
    match (&payload.email, &payload.password) {
        (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
            Ok(Buyer::Credentials {
                email: email.trim().to_string(),
                password: password.clone(),
            })
        }
        _ => Err(AppError::bad_request(
            "Provide a user id or an email and password",
        )),
    }
}

fn required(value: &Option<String>, message: &str) -> AppResult<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::bad_request(message))
}

/// Resolve the buyer inside the checkout transaction, creating an account for
/// an unknown email. Returns the user and whether a session token is due.
async fn resolve_buyer(txn: &DatabaseTransaction, buyer: Buyer) -> AppResult<(UserModel, bool)> {
    match buyer {
        Buyer::Existing(id) => {
            let user = Users::find_by_id(id)
                .one(txn)
                .await?
                .ok_or_else(|| AppError::not_found("User not found"))?;
            Ok((user, false))
        }
        Buyer::Credentials { email, password } => {
            let existing = Users::find()
                .filter(UserCol::Email.eq(email.as_str()))
                .one(txn)
                .await?;
            if let Some(user) = existing {
                if !verify_password(&password, &user.password_hash)? {
                    return Err(AppError::unauthorized("Invalid credentials"));
                }
                ensure_sign_in_allowed(user.role, user.is_approved)?;
                return Ok((user, true));
            }

            if !email.validate_email() {
                return Err(AppError::bad_request("Please provide a valid email!"));
            }
            if password.chars().count() < 6 {
                return Err(AppError::bad_request(
                    "Password must contain at least 6 characters!",
                ));
            }

            let user_name = free_user_name(txn, &email).await?;
            let user = UserActive {
                id: NotSet,
                user_name: Set(user_name),
                email: Set(email),
                password_hash: Set(hash_password(&password)?),
                role: Set(Role::User),
                phone: Set(None),
                shop_name: Set(None),
                shop_logo: Set(None),
                profile_avatar: Set(None),
                address: Set(None),
                business_license: Set(None),
                payment_method: Set(None),
                payment_details: Set(None),
                bank_name: Set(None),
                is_approved: Set(ApprovalStatus::Approved),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(txn)
            .await?;
            tracing::info!(user_id = user.id, "account created at checkout");
            Ok((user, true))
        }
    }
}

/// The part of the email before `@`, suffixed when that name is already taken.
async fn free_user_name(txn: &DatabaseTransaction, email: &str) -> AppResult<String> {
    let base = email.split('@').next().unwrap_or(email).to_string();
    let taken = Users::find()
        .filter(UserCol::UserName.eq(base.as_str()))
        .one(txn)
        .await?
        .is_some();
    if !taken {
        return Ok(base);
    }
    let suffix = Uuid::new_v4().simple().to_string();
    Ok(format!("{base}-{}", &suffix[..8]))
}

/// Every line must point at an approved product sold by the stated vendor.
async fn check_products(txn: &DatabaseTransaction, lines: &[LineInput]) -> AppResult<()> {
    let ids: Vec<i32> = lines.iter().map(|l| l.product_id).collect();
    let products: HashMap<i32, (i32, ProductStatus)> = Products::find()
        .filter(ProductCol::Id.is_in(ids))
        .all(txn)
        .await?
        .into_iter()
        .map(|p| (p.id, (p.vendor_id, p.status)))
        .collect();

    for line in lines {
        match products.get(&line.product_id) {
            None => {
                return Err(AppError::bad_request(format!(
                    "Product {} not found",
                    line.product_id
                )));
            }
            Some((vendor_id, _)) if *vendor_id != line.vendor_id => {
                return Err(AppError::bad_request(format!(
                    "Product {} is not sold by vendor {}",
                    line.product_id, line.vendor_id
                )));
            }
            Some((_, status)) if *status != ProductStatus::Approved => {
                return Err(AppError::bad_request(format!(
                    "Product {} is not available",
                    line.product_id
                )));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Create the order and all of its lines in one transaction.
pub async fn checkout(
    state: &AppState,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    let lines: Vec<LineInput> = payload
        .cart
        .iter()
        .map(|line| LineInput {
            product_id: line.product_id,
            vendor_id: line.vendor_id,
            price: line.price,
            quantity: line.quantity,
        })
        .collect();
    let split = split_order(&lines).map_err(|e| AppError::bad_request(e.to_string()))?;

    let shipping_address = required(&payload.shipping_address, "Shipping address is required")?;
    let payment_method = required(&payload.payment_method, "Payment method is required")?;
    let buyer = buyer_from(&payload)?;

    let txn = state.orm.begin().await?;

    let (buyer, wants_token) = resolve_buyer(&txn, buyer).await?;
    check_products(&txn, &lines).await?;

    let order = OrderActive {
        id: NotSet,
        user_id: Set(buyer.id),
        total_amount: Set(split.total_amount),
        admin_commission: Set(split.admin_commission),
        payment_method: Set(payment_method),
        shipping_address: Set(shipping_address),
        order_status: Set(OrderStatus::Pending),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::with_capacity(split.lines.len());
    for line in &split.lines {
        let item = OrderItemActive {
            id: NotSet,
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            vendor_id: Set(line.vendor_id),
            quantity: Set(line.quantity),
            price: Set(line.price),
            vendor_amount: Set(line.vendor_amount),
            admin_commission: Set(line.admin_commission),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(order_item_from_entity(item));
    }

    txn.commit().await?;

    tracing::info!(
        order_id = order.id,
        user_id = buyer.id,
        lines = items.len(),
        total = %order.total_amount,
        "order placed"
    );
    audit::record(
        state,
        Some(buyer.id),
        "checkout",
        "orders",
        serde_json::json!({
            "order_id": order.id,
            "total_amount": order.total_amount.to_string(),
            "admin_commission": order.admin_commission.to_string(),
        }),
    )
    .await;

    let token = if wants_token {
        Some(issue_token(&state.config, buyer.id, buyer.role)?)
    } else {
        None
    };

    Ok(ApiResponse::success(
        "Order placed successfully",
        CheckoutResponse {
            token,
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_my_orders(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Orders::find()
        .filter(OrderCol::UserId.eq(user.user_id))
        .order_by_desc(OrderCol::CreatedAt)
        .order_by_desc(OrderCol::Id);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_my_order(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;

    let items = items_of(state, order.id).await?;
    Ok(ApiResponse::success(
        "Order",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn items_of(state: &AppState, order_id: i32) -> AppResult<Vec<OrderItem>> {
    Ok(OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .order_by_asc(OrderItemCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect())
}

pub fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        total_amount: model.total_amount,
        admin_commission: model.admin_commission,
        payment_method: model.payment_method,
        shipping_address: model.shipping_address,
        order_status: model.order_status,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        vendor_id: model.vendor_id,
        quantity: model.quantity,
        price: model.price,
        vendor_amount: model.vendor_amount,
        admin_commission: model.admin_commission,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::orders::CartLine;

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            user_id: None,
            email: None,
            password: None,
            cart: vec![CartLine {
                product_id: 1,
                price: rust_decimal::Decimal::from(100),
                quantity: 2,
                vendor_id: 5,
            }],
            shipping_address: Some("1 Main St".into()),
            payment_method: Some("Bank".into()),
        }
    }

    #[test]
    fn user_id_takes_precedence_over_credentials() {
        let mut req = request();
        req.user_id = Some(4);
        req.email = Some("a@example.com".into());
        req.password = Some("secret".into());
        assert_eq!(buyer_from(&req).unwrap(), Buyer::Existing(4));
    }

    #[test]
    fn credentials_need_both_parts() {
        let mut req = request();
        req.email = Some(" a@example.com ".into());
        assert!(buyer_from(&req).is_err());

        req.password = Some("secret".into());
        assert_eq!(
            buyer_from(&req).unwrap(),
            Buyer::Credentials {
                email: "a@example.com".into(),
                password: "secret".into()
            }
        );
    }

    #[test]
    fn blank_shipping_fields_are_missing() {
        assert_eq!(
            required(&Some("  ".into()), "Shipping address is required")
                .unwrap_err()
                .to_string(),
            "Shipping address is required"
        );
        assert_eq!(required(&Some(" x ".into()), "m").unwrap(), "x");
        assert!(required(&None, "m").is_err());
    }

    #[test]
    fn checkout_payload_accepts_id_alias_and_float_prices() {
        let req: CheckoutRequest = serde_json::from_value(serde_json::json!({
            "user_id": 3,
            "cart": [{ "id": 8, "price": 19.99, "quantity": 1, "vendor_id": 2 }],
            "shipping_address": "1 Main St",
            "payment_method": "Cash"
        }))
        .unwrap();
        assert_eq!(req.cart[0].product_id, 8);
        assert_eq!(req.cart[0].price, rust_decimal::Decimal::new(1999, 2));
    }
}
