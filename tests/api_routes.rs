mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use axum_marketplace_api::routes::create_app;
use serde_json::Value;
use tower::ServiceExt;

// None of these requests reach the database; the pool behind the state never connects.
fn app() -> anyhow::Result<Router> {
    Ok(create_app(common::lazy_state()?))
}

async fn json_body(response: axum::response::Response) -> anyhow::Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn json_request(method: &str, uri: &str, body: &str) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))?)
}

#[tokio::test]
async fn health_answers_with_request_id() -> anyhow::Result<()> {
    let response = app()?
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let body = json_body(response).await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn unknown_path_uses_failure_envelope() -> anyhow::Result<()> {
    let response = app()?
        .oneshot(Request::builder().uri("/api/v1/nope").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["path"], "/api/v1/nope");
    Ok(())
}

#[tokio::test]
async fn profile_without_token_is_rejected() -> anyhow::Result<()> {
    let response = app()?
        .oneshot(
            Request::builder()
                .uri("/api/v1/user/profile")
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await?;
    assert_eq!(body["message"], "User is not authenticated!");
    Ok(())
}

#[tokio::test]
async fn forged_tokens_are_unauthorized() -> anyhow::Result<()> {
    let bearer = app()?
        .oneshot(
            Request::builder()
                .uri("/api/v1/user/orders")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(bearer.status(), StatusCode::UNAUTHORIZED);

    let cookie = app()?
        .oneshot(
            Request::builder()
                .uri("/api/vendor/vendor-products")
                .header(header::COOKIE, "theme=dark; token=garbage")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(cookie.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(cookie).await?;
    assert_eq!(body["message"], "Invalid or expired token");
    Ok(())
}

#[tokio::test]
async fn logout_expires_the_cookie() -> anyhow::Result<()> {
    let response = app()?
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/user/logout")
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Max-Age=0"));
    Ok(())
}

#[tokio::test]
async fn checkout_rejects_empty_cart() -> anyhow::Result<()> {
    let response = app()?
        .oneshot(json_request(
            "POST",
            "/api/v1/user/checkout",
            r#"{"email":"shopper@example.com","password":"secret123","cart":[],"shipping_address":"1 Main St","payment_method":"cod"}"#,
        )?)
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await?;
    assert_eq!(body["message"], "Cart is empty");
    Ok(())
}

#[tokio::test]
async fn login_requires_both_fields() -> anyhow::Result<()> {
    let response = app()?
        .oneshot(json_request("POST", "/api/v1/user/login", "{}")?)
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await?;
    assert_eq!(body["message"], "Please enter both email and password");
    Ok(())
}

#[tokio::test]
async fn oversized_checkout_amounts_are_rejected() -> anyhow::Result<()> {
    let response = app()?
        .oneshot(json_request(
            "POST",
            "/api/v1/user/checkout",
            r#"{"email":"shopper@example.com","password":"secret123","cart":[{"product_id":1,"price":1e20,"quantity":2000000000,"vendor_id":1}],"shipping_address":"1 Main St","payment_method":"cod"}"#,
        )?)
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await?;
    assert_eq!(body["message"], "Order amount is too large");
    Ok(())
}

#[tokio::test]
async fn malformed_input_keeps_the_envelope() -> anyhow::Result<()> {
    let response = app()?
        .oneshot(json_request(
            "POST",
            "/api/v1/user/checkout",
            r#"{"cart":"nope"}"#,
        )?)
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await?;
    assert_eq!(body["success"], false);
    assert!(body["data"]["error"].is_string());

    let response = app()?
        .oneshot(
            Request::builder()
                .uri("/api/v1/user/product-detail/not-a-number")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await?;
    assert_eq!(body["success"], false);
    Ok(())
}
