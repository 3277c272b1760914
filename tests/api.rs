//! End-to-end API tests: the full router with auth middleware over an
//! in-memory database.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use mostrador::auth::{JwtConfig, JwtService};
use mostrador::core::{Config, ServerState};

async fn test_app() -> Router {
    // A single in-memory connection: more would each get their own database
    let pool: SqlitePool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    let config = Config {
        work_dir: String::new(),
        http_port: 0,
        jwt: JwtConfig {
            secret: "integration-test-secret-of-enough-length!".into(),
            expiration_minutes: 60,
            issuer: "mostrador".into(),
            audience: "mostrador-clients".into(),
        },
        environment: "test".into(),
    };
    let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
    let state = ServerState::new(config, pool, jwt_service);

    mostrador::api::build_app(state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = builder
        .body(match body {
            Some(v) => Body::from(v.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Register a user and return a valid token
async fn login_token(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "email": "ana@tienda.es",
            "fullName": "Ana García",
            "password": "s3creto!",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

async fn seed_product(app: &Router, token: &str, name: &str, price: &str, stock: i64) -> i64 {
    let (status, category) = send(
        app,
        Method::POST,
        "/api/categories",
        Some(token),
        Some(json!({ "name": format!("cat-{name}") })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, product) = send(
        app,
        Method::POST,
        "/api/products",
        Some(token),
        Some(json!({
            "name": name,
            "price": price,
            "stock": stock,
            "categoryId": category["id"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    product["id"].as_i64().unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::GET, "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn register_login_me_flow() {
    let app = test_app().await;

    let (status, registered) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "email": "ana@tienda.es",
            "fullName": "Ana García",
            "password": "s3creto!",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(registered["email"], "ana@tienda.es");
    assert_eq!(registered["fullName"], "Ana García");

    // Re-registering the same email (any casing) conflicts
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "email": "ANA@tienda.es",
            "fullName": "Ana García",
            "password": "s3creto!",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "E0004");

    let (status, logged_in) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "ana@tienda.es", "password": "s3creto!" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = logged_in["token"].as_str().unwrap();

    let (status, me) = send(&app, Method::GET, "/api/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "ana@tienda.es");

    // Wrong password gets the unified message, not a 404
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "ana@tienda.es", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn protected_routes_reject_missing_or_bad_tokens() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/products", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E3001");

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/products",
        Some("not-a-real-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E3002");
}

#[tokio::test]
async fn category_reads_are_public_but_writes_require_auth() {
    let app = test_app().await;
    let token = login_token(&app).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/categories",
        None,
        Some(json!({ "name": "Bebidas" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/categories",
        Some(&token),
        Some(json!({ "name": "Bebidas" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Anonymous reads work
    let (status, list) = send(&app, Method::GET, "/api/categories", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let uri = format!("/api/categories/{}", created["id"]);
    let (status, one) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one["name"], "Bebidas");

    // Duplicate name (case-insensitive) is a conflict
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/categories",
        Some(&token),
        Some(json!({ "name": "bebidas" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "A category with that name already exists");
}

#[tokio::test]
async fn category_with_products_cannot_be_deleted() {
    let app = test_app().await;
    let token = login_token(&app).await;

    let (_, category) = send(
        &app,
        Method::POST,
        "/api/categories",
        Some(&token),
        Some(json!({ "name": "Bebidas" })),
    )
    .await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(&token),
        Some(json!({
            "name": "Cola",
            "price": "1.50",
            "stock": 10,
            "categoryId": category["id"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/categories/{}", category["id"]);
    let (status, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Category has products and cannot be deleted");
}

#[tokio::test]
async fn sale_decrements_stock_and_snapshots_prices() {
    let app = test_app().await;
    let token = login_token(&app).await;
    let cafe = seed_product(&app, &token, "Café", "1.10", 5).await;

    let (status, sale) = send(
        &app,
        Method::POST,
        "/api/sales",
        Some(&token),
        Some(json!({
            "customerName": "Ana",
            "items": [{ "productId": cafe, "quantity": 2 }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sale["total"], "2.20");
    assert_eq!(sale["items"][0]["productName"], "Café");
    assert_eq!(sale["items"][0]["unitPrice"], "1.10");

    // Stock went down
    let uri = format!("/api/products/{cafe}");
    let (_, product) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(product["stock"], 3);

    // The sale reads back by id
    let uri = format!("/api/sales/{}", sale["id"]);
    let (status, loaded) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loaded["total"], "2.20");

    // Sold products cannot be deleted
    let uri = format!("/api/products/{cafe}");
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn oversold_and_empty_orders_are_client_errors() {
    let app = test_app().await;
    let token = login_token(&app).await;
    let tarta = seed_product(&app, &token, "Tarta", "3.95", 2).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/sales",
        Some(&token),
        Some(json!({ "items": [{ "productId": tarta, "quantity": 3 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0005");
    assert_eq!(body["message"], "Not enough stock for product Tarta");

    // Nothing was decremented
    let uri = format!("/api/products/{tarta}");
    let (_, product) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(product["stock"], 2);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/sales",
        Some(&token),
        Some(json!({ "items": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");
    assert_eq!(body["message"], "Sale must contain at least one item");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/sales",
        Some(&token),
        Some(json!({ "items": [{ "productId": 999, "quantity": 1 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn report_covers_todays_sales() {
    let app = test_app().await;
    let token = login_token(&app).await;
    let cafe = seed_product(&app, &token, "Café", "1.10", 10).await;

    for _ in 0..2 {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/sales",
            Some(&token),
            Some(json!({ "items": [{ "productId": cafe, "quantity": 1 }] })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let today = chrono::Utc::now().date_naive();
    let uri = format!("/api/sales/report?from={today}&to={today}");
    let (status, report) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["totalSales"], 2);
    assert_eq!(report["totalAmount"], "2.20");
    assert_eq!(report["sales"].as_array().unwrap().len(), 2);

    // Inverted range is rejected
    let uri = format!("/api/sales/report?from={today}&to=2000-01-01");
    let (status, body) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "'to' must be greater than or equal to 'from'");
}

#[tokio::test]
async fn report_edge_inputs_get_uniform_json_errors_or_results() {
    let app = test_app().await;
    let token = login_token(&app).await;

    // Unparseable dates still produce the {code, message} body shape
    let uri = "/api/sales/report?from=notadate&to=2025-01-01";
    let (status, body) = send(&app, Method::GET, uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");
    assert!(body["message"].is_string());

    // A missing parameter too
    let uri = "/api/sales/report?from=2025-01-01";
    let (status, body) = send(&app, Method::GET, uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");

    // The calendar's maximum date is an answerable range, not a crash
    let uri = "/api/sales/report?from=2025-01-01&to=%2B262142-12-31";
    let (status, report) = send(&app, Method::GET, uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["totalSales"], 0);
}

#[tokio::test]
async fn missing_resources_are_not_found() {
    let app = test_app().await;
    let token = login_token(&app).await;

    for uri in ["/api/sales/999", "/api/products/999", "/api/categories/999"] {
        let (status, body) = send(&app, Method::GET, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["code"], "E0003", "{uri}");
    }
}
