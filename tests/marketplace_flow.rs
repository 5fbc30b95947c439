mod common;

use axum_marketplace_api::{
    dto::{
        admin::{ProductStatusRequest, VendorStatusRequest},
        auth::LoginRequest,
        catalog::ProductFilter,
        orders::{CartLine, CheckoutRequest},
    },
    entity::users::{Column as UserCol, Entity as Users},
    error::AppError,
    middleware::auth::AuthUser,
    models::{ApprovalStatus, OrderStatus, Product, ProductStatus, Role},
    routes::params::Pagination,
    services::{admin_service, auth_service, catalog_service, category_service, order_service, vendor_service},
    state::AppState,
    uploads::MultipartForm,
};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use common::{PASSWORD, as_auth, assets, create_admin, db_state, pdf, png, unique};

macro_rules! require_db {
    () => {
        match common::database_url() {
            Some(url) => db_state(&url).await?,
            None => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(());
            }
        }
    };
}

fn vendor_form(name: &str) -> MultipartForm {
    MultipartForm::default()
        .with_text("user_name", name)
        .with_text("email", &format!("{name}@example.com"))
        .with_text("phone", "555-0100")
        .with_text("password", PASSWORD)
        .with_text("confirm_password", PASSWORD)
        .with_text("role", "vendor")
        .with_text("shop_name", "Lamp Corner")
        .with_text("address", "12 Market Road")
        .with_text("payment_method", "Bank")
        .with_text("payment_details", "IBAN 0000")
        .with_text("bank_name", "First Bank")
}

fn login_as(email: &str) -> LoginRequest {
    LoginRequest {
        email: Some(email.to_string()),
        password: Some(PASSWORD.to_string()),
    }
}

async fn register_vendor(state: &AppState) -> anyhow::Result<(i32, String)> {
    let name = unique("vendor");
    let form = vendor_form(&name).with_file("business_license", pdf("license.pdf"));
    let resp = auth_service::register(state, &assets(), form).await?;
    let data = resp.data.expect("registration data");
    assert!(data.token.is_none());
    assert_eq!(data.user.is_approved, ApprovalStatus::Pending);
    Ok((data.user.id, data.user.email))
}

fn approved_vendor(id: i32) -> AuthUser {
    AuthUser {
        user_id: id,
        role: Role::Vendor,
        approval: ApprovalStatus::Approved,
    }
}

async fn approve_vendor(state: &AppState, admin: &AuthUser, vendor_id: i32) -> anyhow::Result<()> {
    admin_service::update_vendor_status(
        state,
        admin,
        &assets(),
        VendorStatusRequest {
            vendor_id,
            status: 1,
        },
    )
    .await?;
    Ok(())
}

/// Category named after `prefix`; returns its name and slug.
async fn create_category(state: &AppState, admin: &AuthUser, prefix: &str) -> anyhow::Result<(String, String)> {
    let name = unique(prefix);
    let category = category_service::create_category(
        state,
        admin,
        &assets(),
        MultipartForm::default().with_text("name", &name),
    )
    .await?
    .data
    .expect("category");
    Ok((category.name, category.slug))
}

async fn approved_product(
    state: &AppState,
    admin: &AuthUser,
    vendor_id: i32,
    category_name: &str,
    price: &str,
) -> anyhow::Result<Product> {
    let form = MultipartForm::default()
        .with_text("category_name", category_name)
        .with_text("name", &unique("item"))
        .with_text("description", "Test item")
        .with_text("price", price)
        .with_text("discount_price", price)
        .with_text("stock", "3")
        .with_file("product_image", png("item.png"))
        .with_file("gallery_images", png("front.png"));
    let product = vendor_service::add_product(state, &approved_vendor(vendor_id), &assets(), form)
        .await?
        .data
        .expect("product");
    admin_service::update_product_status(
        state,
        admin,
        &assets(),
        ProductStatusRequest {
            product_id: product.id,
            status: ProductStatus::Approved,
        },
    )
    .await?;
    Ok(product)
}

fn checkout_request(
    user_id: Option<i32>,
    email: &str,
    password: &str,
    product: &Product,
) -> CheckoutRequest {
    CheckoutRequest {
        user_id,
        email: Some(email.to_string()),
        password: Some(password.to_string()),
        cart: vec![CartLine {
            product_id: product.id,
            price: product.price,
            quantity: 1,
            vendor_id: product.vendor_id,
        }],
        shipping_address: Some("1 Main St".to_string()),
        payment_method: Some("cod".to_string()),
    }
}

#[tokio::test]
async fn vendor_onboarding_to_checkout() -> anyhow::Result<()> {
    let state = require_db!();
    let assets = assets();
    let admin = as_auth(&create_admin(&state).await?);

    let (vendor_id, vendor_email) = register_vendor(&state).await?;

    let err = auth_service::login(&state, &assets, login_as(&vendor_email))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    assert_eq!(err.to_string(), "Your account is pending approval by admin.");

    let decided = admin_service::update_vendor_status(
        &state,
        &admin,
        &assets,
        VendorStatusRequest {
            vendor_id,
            status: 1,
        },
    )
    .await?;
    assert_eq!(decided.message, "Vendor approved successfully");

    let login = auth_service::login(&state, &assets, login_as(&vendor_email)).await?;
    assert_eq!(login.message, "vendor logged in successfully!");
    assert!(login.data.and_then(|d| d.token).is_some());

    let category_name = unique("Lamps");
    category_service::create_category(
        &state,
        &admin,
        &assets,
        MultipartForm::default().with_text("name", &category_name),
    )
    .await?;

    let vendor = approved_vendor(vendor_id);
    let product_form = MultipartForm::default()
        .with_text("category_name", &category_name)
        .with_text("name", "Desk lamp")
        .with_text("description", "Warm light")
        .with_text("price", "100")
        .with_text("discount_price", "90")
        .with_text("stock", "7")
        .with_file("product_image", png("lamp.png"))
        .with_file("gallery_images", png("side.png"))
        .with_file("gallery_images", png("top.png"));
    let product = vendor_service::add_product(&state, &vendor, &assets, product_form)
        .await?
        .data
        .expect("product");
    assert_eq!(product.status, ProductStatus::Pending);
    assert_eq!(product.gallery_images.as_ref().map(Vec::len), Some(2));

    let hidden = catalog_service::product_detail(&state, &assets, product.id).await;
    assert!(matches!(hidden, Err(AppError::NotFound(_))));

    admin_service::update_product_status(
        &state,
        &admin,
        &assets,
        ProductStatusRequest {
            product_id: product.id,
            status: ProductStatus::Approved,
        },
    )
    .await?;

    let detail = catalog_service::product_detail(&state, &assets, product.id)
        .await?
        .data
        .expect("detail");
    assert!(
        detail
            .product_image
            .as_deref()
            .is_some_and(|url| url.starts_with("http://assets.test/assets/"))
    );

    let catalog = catalog_service::list_products(&state, &assets, ProductFilter::default())
        .await?
        .data
        .expect("catalog");
    assert!(catalog.products.iter().any(|p| p.id == product.id));
    assert!(catalog.total_products >= 1);

    let buyer_email = format!("{}@example.com", unique("buyer"));
    let placed = order_service::checkout(
        &state,
        CheckoutRequest {
            user_id: None,
            email: Some(buyer_email.clone()),
            password: Some(PASSWORD.to_string()),
            cart: vec![CartLine {
                product_id: product.id,
                price: Decimal::new(100, 0),
                quantity: 2,
                vendor_id,
            }],
            shipping_address: Some("1 Main St".to_string()),
            payment_method: Some("cod".to_string()),
        },
    )
    .await?
    .data
    .expect("checkout");
    assert!(placed.token.is_some());
    assert_eq!(placed.order.total_amount, Decimal::new(200, 0));
    assert_eq!(placed.order.admin_commission, Decimal::new(10, 0));
    assert_eq!(placed.items.len(), 1);
    assert_eq!(placed.items[0].vendor_amount, Decimal::new(190, 0));

    let buyer = Users::find()
        .filter(UserCol::Email.eq(buyer_email.as_str()))
        .one(&state.orm)
        .await?
        .expect("buyer account created at checkout");
    assert_eq!(buyer.role, Role::User);

    let mine = order_service::list_my_orders(&state, &as_auth(&buyer), Pagination::default())
        .await?
        .data
        .expect("orders");
    assert_eq!(mine.items.len(), 1);

    let sold = vendor_service::vendor_orders(&state, &vendor)
        .await?
        .data
        .expect("vendor orders");
    assert!(sold.items.iter().any(|i| i.order_id == placed.order.id));

    let shipped = admin_service::update_order_status(
        &state,
        &admin,
        placed.order.id,
        OrderStatus::Shipped,
    )
    .await?
    .data
    .expect("order");
    assert_eq!(shipped.order.order_status, OrderStatus::Shipped);

    let again = admin_service::update_vendor_status(
        &state,
        &admin,
        &assets,
        VendorStatusRequest {
            vendor_id,
            status: 2,
        },
    )
    .await;
    assert!(matches!(again, Err(AppError::BadRequest(_))));

    Ok(())
}

#[tokio::test]
async fn rejected_vendor_can_not_log_in() -> anyhow::Result<()> {
    let state = require_db!();
    let assets = assets();
    let admin = as_auth(&create_admin(&state).await?);

    let (vendor_id, vendor_email) = register_vendor(&state).await?;
    admin_service::update_vendor_status(
        &state,
        &admin,
        &assets,
        VendorStatusRequest {
            vendor_id,
            status: 2,
        },
    )
    .await?;

    let err = auth_service::login(&state, &assets, login_as(&vendor_email))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Your account was rejected by admin.");
    Ok(())
}

#[tokio::test]
async fn vendor_without_license_is_not_created() -> anyhow::Result<()> {
    let state = require_db!();
    let name = unique("vendor");

    let err = auth_service::register(&state, &assets(), vendor_form(&name))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Vendor must provide shop_name, business_license, and address!"
    );

    let stored = Users::find()
        .filter(UserCol::UserName.eq(name.as_str()))
        .one(&state.orm)
        .await?;
    assert!(stored.is_none());
    Ok(())
}

#[tokio::test]
async fn failed_checkout_creates_no_account() -> anyhow::Result<()> {
    let state = require_db!();
    let buyer_email = format!("{}@example.com", unique("buyer"));

    let err = order_service::checkout(
        &state,
        CheckoutRequest {
            user_id: None,
            email: Some(buyer_email.clone()),
            password: Some(PASSWORD.to_string()),
            cart: vec![CartLine {
                product_id: i32::MAX,
                price: Decimal::new(50, 0),
                quantity: 1,
                vendor_id: i32::MAX,
            }],
            shipping_address: Some("1 Main St".to_string()),
            payment_method: Some("cod".to_string()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let stored = Users::find()
        .filter(UserCol::Email.eq(buyer_email.as_str()))
        .one(&state.orm)
        .await?;
    assert!(stored.is_none());
    Ok(())
}

#[tokio::test]
async fn undecided_vendor_gets_no_session_at_checkout() -> anyhow::Result<()> {
    let state = require_db!();
    let admin = as_auth(&create_admin(&state).await?);

    let (seller_id, _) = register_vendor(&state).await?;
    approve_vendor(&state, &admin, seller_id).await?;
    let (category_name, _) = create_category(&state, &admin, "Mugs").await?;
    let product = approved_product(&state, &admin, seller_id, &category_name, "12").await?;

    let (_, pending_email) = register_vendor(&state).await?;
    let err = order_service::checkout(&state, checkout_request(None, &pending_email, PASSWORD, &product))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    assert_eq!(err.to_string(), "Your account is pending approval by admin.");

    let (rejected_id, rejected_email) = register_vendor(&state).await?;
    admin_service::update_vendor_status(
        &state,
        &admin,
        &assets(),
        VendorStatusRequest {
            vendor_id: rejected_id,
            status: 2,
        },
    )
    .await?;
    let err = order_service::checkout(&state, checkout_request(None, &rejected_email, PASSWORD, &product))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Your account was rejected by admin.");
    Ok(())
}

#[tokio::test]
async fn checkout_resolves_existing_buyers() -> anyhow::Result<()> {
    let state = require_db!();
    let admin = as_auth(&create_admin(&state).await?);

    let (seller_id, _) = register_vendor(&state).await?;
    approve_vendor(&state, &admin, seller_id).await?;
    let (category_name, _) = create_category(&state, &admin, "Cups").await?;
    let product = approved_product(&state, &admin, seller_id, &category_name, "8.50").await?;

    let email = format!("{}@example.com", unique("buyer"));
    let first = order_service::checkout(&state, checkout_request(None, &email, PASSWORD, &product))
        .await?
        .data
        .expect("first order");
    let buyer_id = first.order.user_id;

    let wrong = order_service::checkout(&state, checkout_request(None, &email, "not-the-password", &product))
        .await
        .unwrap_err();
    assert!(matches!(wrong, AppError::Unauthorized(_)));

    let unknown = order_service::checkout(&state, checkout_request(Some(i32::MAX), &email, PASSWORD, &product))
        .await
        .unwrap_err();
    assert!(matches!(unknown, AppError::NotFound(_)));

    let again = order_service::checkout(&state, checkout_request(None, &email, PASSWORD, &product))
        .await?
        .data
        .expect("second order");
    assert_eq!(again.order.user_id, buyer_id);
    assert!(again.token.is_some());

    let by_id = order_service::checkout(&state, checkout_request(Some(buyer_id), &email, PASSWORD, &product))
        .await?
        .data
        .expect("order by id");
    assert_eq!(by_id.order.user_id, buyer_id);
    assert!(by_id.token.is_none());

    let accounts = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .count(&state.orm)
        .await?;
    assert_eq!(accounts, 1);
    Ok(())
}

#[tokio::test]
async fn catalog_filter_combines_category_and_price() -> anyhow::Result<()> {
    let state = require_db!();
    let admin = as_auth(&create_admin(&state).await?);

    let (seller_id, _) = register_vendor(&state).await?;
    approve_vendor(&state, &admin, seller_id).await?;
    let (shelf, shelf_slug) = create_category(&state, &admin, "Shelves").await?;
    let (other, _) = create_category(&state, &admin, "Rugs").await?;

    let cheap = approved_product(&state, &admin, seller_id, &shelf, "10").await?;
    let mid = approved_product(&state, &admin, seller_id, &shelf, "50").await?;
    let elsewhere = approved_product(&state, &admin, seller_id, &other, "50").await?;

    let filtered = catalog_service::list_products(
        &state,
        &assets(),
        ProductFilter {
            category_slug: Some(shelf_slug.clone()),
            min_price: Some(20.0),
            max_price: Some(100.0),
        },
    )
    .await?
    .data
    .expect("catalog");

    let ids: Vec<i32> = filtered.products.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![mid.id]);
    assert_eq!(filtered.filter_product_count, 1);
    assert!(!ids.contains(&cheap.id));
    assert!(!ids.contains(&elsewhere.id));
    assert!(
        filtered
            .products
            .iter()
            .all(|p| p.category.as_ref().is_some_and(|c| c.slug == shelf_slug))
    );

    // Price-slider stats cover the whole approved catalog, not the filtered page.
    assert!(filtered.total_products >= 3);
    assert!(filtered.min_price.is_some_and(|min| min <= Decimal::from(10)));
    assert!(filtered.max_price.is_some_and(|max| max >= Decimal::from(50)));
    Ok(())
}
