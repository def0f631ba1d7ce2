use axum::body::{to_bytes, Body};
use axum::http::Request;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{header as header_eq, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

const TOKEN: &str = "jwt-test-token";

fn test_app(server: &MockServer) -> Router {
    let upstream = UpstreamClient::new(&server.uri(), 2, "katalog-test/0.1").expect("client");
    build_app(AppState::new(
        upstream,
        TokenStore::default(),
        CategorySet::builtin(),
    ))
}

/// Five records: two in known categories and three in unknown ones.
fn catalog_fixture() -> Value {
    json!([
        {
            "sif_product": 7,
            "naziv": "X27",
            "categoryName": "Monitori",
            "imgsrc": "x27.jpg",
            "price": "100.0",
            "description": "<b>brzina</b> test"
        },
        { "sif_product": 8, "naziv": "Laptop Pro", "categoryName": "Laptopovi", "price": 1500 },
        { "sif_product": "9", "naziv": "HP Toner", "categoryName": "Toneri i potro\u{161}ni materijal", "price": 40 },
        { "sif_product": 10, "naziv": "Gaming miš", "categoryName": "Periferija", "price": 25.5 },
        { "sif_product": 11, "naziv": "USB kabl", "categoryName": "Kablovi", "description": "Dugačak kabl" }
    ])
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": TOKEN })))
        .mount(server)
        .await;
}

async fn mount_products(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/products"))
        .and(header_eq("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json parse")
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn top_level_keys(json: &Value) -> Vec<&str> {
    let mut keys: Vec<&str> = json
        .as_object()
        .expect("json object")
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort_unstable();
    keys
}

async fn logged_in_app(server: &MockServer) -> Router {
    mount_login(server).await;
    let app = test_app(server);
    let (status, _) = send(
        &app,
        post_json("/login", &json!({ "username": "zadatak", "password": "zadatak" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login precondition failed");
    app
}

// -------------------------------------------------------------------------
// Error bodies and plumbing
// -------------------------------------------------------------------------

#[test]
fn api_error_codes_map_to_statuses() {
    let cases = [
        ("not_found", StatusCode::NOT_FOUND),
        ("missing_token", StatusCode::UNAUTHORIZED),
        ("login_rejected", StatusCode::UNAUTHORIZED),
        ("missing_credentials", StatusCode::BAD_REQUEST),
        ("bad_request", StatusCode::BAD_REQUEST),
        ("upstream_error", StatusCode::BAD_GATEWAY),
        ("something_else", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (code, expected) in cases {
        let response = ApiError::new(code, "msg").into_response();
        assert_eq!(response.status(), expected, "code {code}");
    }
}

#[test]
fn map_upstream_error_distinguishes_rejection_from_failure() {
    let rejected = map_upstream_error("req", "Login error", &UpstreamError::LoginRejected);
    assert_eq!(rejected.code, "login_rejected");
    assert_eq!(rejected.error, "Login failed: Token not received.");

    let failed = map_upstream_error(
        "req",
        "Error fetching products",
        &UpstreamError::UnexpectedStatus {
            status: 500,
            url: "http://upstream/products".into(),
        },
    );
    assert_eq!(failed.code, "upstream_error");
    assert!(failed.error.starts_with("Error fetching products: "));
    assert!(failed.error.contains("500"));
}

#[tokio::test]
async fn health_reports_unauthenticated_before_login() {
    let server = MockServer::start().await;
    let app = test_app(&server);

    let (status, json) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "status": "ok", "authenticated": false }));
}

#[tokio::test]
async fn request_id_header_is_propagated() {
    let server = MockServer::start().await;
    let app = test_app(&server);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(REQUEST_ID_HEADER, "req-abc")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(
        response.headers().get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok()),
        Some("req-abc")
    );
}

#[tokio::test]
async fn request_id_is_generated_when_absent() {
    let server = MockServer::start().await;
    let app = test_app(&server);

    let response = app.oneshot(get("/health")).await.expect("response");

    let id = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .expect("generated request id");
    assert!(uuid::Uuid::parse_str(id).is_ok(), "not a uuid: {id}");
}

// -------------------------------------------------------------------------
// POST /login
// -------------------------------------------------------------------------

#[tokio::test]
async fn login_stores_and_echoes_token() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    let app = test_app(&server);

    let (status, json) = send(
        &app,
        post_json("/login", &json!({ "username": "zadatak", "password": "zadatak" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({ "message": "Login successful!", "token": TOKEN })
    );

    let (_, health) = send(&app, get("/health")).await;
    assert_eq!(health["authenticated"], true);
}

#[tokio::test]
async fn login_requires_both_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": TOKEN })))
        .expect(0)
        .mount(&server)
        .await;
    let app = test_app(&server);

    for body in [
        json!({ "username": "zadatak" }),
        json!({ "password": "zadatak" }),
        json!({ "username": "", "password": "zadatak" }),
        json!({ "username": "zadatak", "password": "   " }),
        json!({}),
    ] {
        let (status, json) = send(&app, post_json("/login", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
        assert_eq!(json, json!({ "error": "Username and password are required." }));
    }
}

#[tokio::test]
async fn login_rejects_malformed_json() {
    let server = MockServer::start().await;
    let app = test_app(&server);

    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("request");
    let (status, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn login_without_upstream_token_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "detail": "nope" })))
        .mount(&server)
        .await;
    let app = test_app(&server);

    let (status, json) = send(
        &app,
        post_json("/login", &json!({ "username": "zadatak", "password": "wrong" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json, json!({ "error": "Login failed: Token not received." }));

    let (_, health) = send(&app, get("/health")).await;
    assert_eq!(health["authenticated"], false);
}

#[tokio::test]
async fn login_upstream_failure_is_bad_gateway_and_keeps_previous_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": TOKEN })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_products(&server, json!([])).await;
    let app = test_app(&server);
    let credentials = json!({ "username": "zadatak", "password": "zadatak" });

    let (first, _) = send(&app, post_json("/login", &credentials)).await;
    assert_eq!(first, StatusCode::OK);

    let (second, json) = send(&app, post_json("/login", &credentials)).await;
    assert_eq!(second, StatusCode::BAD_GATEWAY);
    assert!(json["error"].as_str().is_some_and(|m| m.starts_with("Login error: ")));

    // The products mock only accepts the first token.
    let (status, _) = send(&app, get("/products")).await;
    assert_eq!(status, StatusCode::OK);
}

// -------------------------------------------------------------------------
// GET /products
// -------------------------------------------------------------------------

#[tokio::test]
async fn products_before_login_is_missing_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog_fixture()))
        .expect(0)
        .mount(&server)
        .await;
    let app = test_app(&server);

    let (status, json) = send(&app, get("/products")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        json,
        json!({ "error": "Authorization token is missing. Please log in." })
    );
}

#[tokio::test]
async fn products_are_normalized() {
    let server = MockServer::start().await;
    mount_products(&server, catalog_fixture()).await;
    let app = logged_in_app(&server).await;

    let (status, json) = send(&app, get("/products")).await;

    assert_eq!(status, StatusCode::OK);
    let products = json["products"].as_array().expect("products array");
    assert_eq!(products.len(), 5);
    assert_eq!(
        products[0],
        json!({
            "id": 7,
            "name": "X27",
            "category": "Monitori",
            "image": "x27.jpg",
            "originalPrice": 100.0,
            "price": 110.0,
            "description": "performanse test"
        })
    );
    assert_eq!(json["total_products"], 5);
    assert_eq!(json["page"], 1);
    assert_eq!(json["limit"], 20);
    assert_eq!(json["total_pages"], 1);
}

#[tokio::test]
async fn product_responses_are_not_wrapped() {
    let server = MockServer::start().await;
    mount_products(&server, catalog_fixture()).await;
    let app = logged_in_app(&server).await;

    let (_, list) = send(&app, get("/products")).await;
    assert_eq!(
        top_level_keys(&list),
        ["limit", "page", "products", "total_pages", "total_products"]
    );
    assert!(list["total_products"].is_u64());

    let (_, single) = send(&app, get("/products/8")).await;
    assert_eq!(
        top_level_keys(&single),
        ["category", "description", "id", "image", "name", "originalPrice", "price"]
    );

    let (_, missing) = send(&app, get("/products/404")).await;
    assert_eq!(top_level_keys(&missing), ["error"]);
    assert!(missing["error"].is_string());
}

#[tokio::test]
async fn products_catch_all_category_paginates() {
    let server = MockServer::start().await;
    mount_products(&server, catalog_fixture()).await;
    let app = logged_in_app(&server).await;

    let (status, json) = send(&app, get("/products?category=ostalo&page=1&limit=2")).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = json["products"]
        .as_array()
        .expect("products array")
        .iter()
        .filter_map(|p| p["name"].as_str())
        .collect();
    assert_eq!(names, ["Laptop Pro", "Gaming miš"]);
    assert_eq!(json["total_products"], 3);
    assert_eq!(json["total_pages"], 2);
}

#[tokio::test]
async fn products_category_and_search_ignore_case() {
    let server = MockServer::start().await;
    mount_products(&server, catalog_fixture()).await;
    let app = logged_in_app(&server).await;

    let (_, by_category) = send(&app, get("/products?category=monitori")).await;
    assert_eq!(by_category["total_products"], 1);
    assert_eq!(by_category["products"][0]["id"], 7);

    let (_, by_search) = send(&app, get("/products?search=KABL")).await;
    assert_eq!(by_search["total_products"], 1);
    assert_eq!(by_search["products"][0]["name"], "USB kabl");
}

#[tokio::test]
async fn products_page_beyond_last_is_empty() {
    let server = MockServer::start().await;
    mount_products(&server, catalog_fixture()).await;
    let app = logged_in_app(&server).await;

    let (status, json) = send(&app, get("/products?page=9&limit=2")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["products"], json!([]));
    assert_eq!(json["total_products"], 5);
}

#[tokio::test]
async fn products_non_positive_pagination_is_clamped() {
    let server = MockServer::start().await;
    mount_products(&server, catalog_fixture()).await;
    let app = logged_in_app(&server).await;

    let (status, json) = send(&app, get("/products?page=0&limit=-4")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["page"], 1);
    assert_eq!(json["limit"], 1);
    assert_eq!(json["products"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn products_non_numeric_pagination_is_bad_request() {
    let server = MockServer::start().await;
    let app = test_app(&server);

    let (status, json) = send(&app, get("/products?page=two")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn products_upstream_failure_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let app = logged_in_app(&server).await;

    let (status, json) = send(&app, get("/products")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(json["error"]
        .as_str()
        .is_some_and(|m| m.starts_with("Error fetching products: ")));
}

// -------------------------------------------------------------------------
// GET /products/{id}
// -------------------------------------------------------------------------

#[tokio::test]
async fn product_by_id_matches_numeric_and_string_ids() {
    let server = MockServer::start().await;
    mount_products(&server, catalog_fixture()).await;
    let app = logged_in_app(&server).await;

    let (status, json) = send(&app, get("/products/7")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["price"], 110.0);

    let (status, json) = send(&app, get("/products/9")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], "9");
    assert_eq!(json["category"], "Toneri i potrošni materijal");
}

#[tokio::test]
async fn product_by_id_unknown_is_not_found() {
    let server = MockServer::start().await;
    mount_products(&server, catalog_fixture()).await;
    let app = logged_in_app(&server).await;

    let (status, json) = send(&app, get("/products/07")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json, json!({ "error": "Product not found." }));
}

#[tokio::test]
async fn product_by_id_requires_token() {
    let server = MockServer::start().await;
    let app = test_app(&server);

    let (status, json) = send(&app, get("/products/7")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        json,
        json!({ "error": "Authorization token is missing. Please log in." })
    );
}
