//! Integration tests for the API server.

use std::sync::Arc;
use std::sync::OnceLock;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use chrono::{Offset, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use notifications::InMemoryNotifier;
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_sessions::MemoryStore;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

const PASSWORD: &str = "1234";

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

async fn setup() -> (axum::Router, InMemoryNotifier) {
    let notifier = InMemoryNotifier::new();
    let state = api::create_default_state(
        api::Backends::in_memory(Arc::new(notifier.clone())),
        Utc.fix(),
        PASSWORD,
    )
    .await
    .unwrap();
    let session_layer = api::session::create_session_layer(MemoryStore::default(), false);
    let app = api::create_app(state, get_metrics_handle(), session_layer);
    (app, notifier)
}

async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

/// Sends a body verbatim with the given content type.
async fn send_raw(
    app: &axum::Router,
    uri: &str,
    cookie: Option<&str>,
    content_type: &str,
    body: &str,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    app.clone().oneshot(request).await.unwrap()
}

/// Session backend whose every call fails.
#[derive(Debug, Clone)]
struct UnavailableSessionStore;

impl UnavailableSessionStore {
    fn error() -> session_store::Error {
        session_store::Error::Backend("session backend unavailable".to_string())
    }
}

#[async_trait]
impl SessionStore for UnavailableSessionStore {
    async fn save(&self, _record: &Record) -> session_store::Result<()> {
        Err(Self::error())
    }

    async fn load(&self, _session_id: &Id) -> session_store::Result<Option<Record>> {
        Err(Self::error())
    }

    async fn delete(&self, _session_id: &Id) -> session_store::Result<()> {
        Err(Self::error())
    }
}

/// Logs in and returns the `name=value` session cookie.
async fn login(app: &axum::Router, username: &str) -> String {
    let response = send(
        app,
        "POST",
        "/login",
        None,
        Some(json!({ "username": username, "password": PASSWORD })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login sets a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    cookie
}

async fn place(app: &axum::Router, cookie: &str, cart: Value) -> Response<Body> {
    send(app, "POST", "/order", Some(cookie), Some(json!({ "cart": cart }))).await
}

async fn orders(app: &axum::Router, cookie: &str) -> Value {
    let response = send(app, "GET", "/orders", Some(cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup().await;

    let response = send(&app, "GET", "/health", None, None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = setup().await;

    let response = send(&app, "GET", "/metrics", None, None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_login_reports_role() {
    let (app, _) = setup().await;

    let response = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "username": "leader", "password": PASSWORD })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["role"], "leader");
}

#[tokio::test]
async fn test_login_with_bad_password() {
    let (app, _) = setup().await;

    let response = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "username": "member1", "password": "wrong" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_me_returns_session_identity() {
    let (app, _) = setup().await;
    let cookie = login(&app, "member2").await;

    let response = send(&app, "GET", "/me", Some(&cookie), None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["username"], "member2");
    assert_eq!(json["role"], "member");

    let anonymous = send(&app, "GET", "/me", None, None).await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_orders_require_session() {
    let (app, _) = setup().await;

    let response = send(&app, "GET", "/orders", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert!(json["error"].is_string());

    let response = send(
        &app,
        "POST",
        "/order",
        None,
        Some(json!({ "cart": [{ "name": "Ammo", "quantity": 1 }] })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_order_scenario() {
    let (app, notifier) = setup().await;
    let member1 = login(&app, "member1").await;

    let response = place(
        &app,
        &member1,
        json!([
            { "name": "Ammo", "quantity": 2 },
            { "name": "Vest", "quantity": "1" }
        ]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let placed = body_json(response).await;
    assert_eq!(placed["success"], true);
    assert_eq!(placed["total"], 25000);

    let own = orders(&app, &member1).await;
    assert_eq!(own.as_array().unwrap().len(), 1);
    assert_eq!(own[0]["user"], "member1");
    assert_eq!(own[0]["items"], json!(["Ammo x2 ($10000)", "Vest x1 ($15000)"]));
    assert_eq!(own[0]["total"], 25000);
    assert_eq!(own[0]["id"], placed["submission_id"]);

    let leader = login(&app, "leader").await;
    let all = orders(&app, &leader).await;
    assert_eq!(all, own);

    let member2 = login(&app, "member2").await;
    let other = orders(&app, &member2).await;
    assert_eq!(other, json!([]));

    assert_eq!(notifier.sent_count(), 1);
}

#[tokio::test]
async fn test_orders_listed_newest_first() {
    let (app, _) = setup().await;
    let member1 = login(&app, "member1").await;
    let member2 = login(&app, "member2").await;

    place(&app, &member1, json!([{ "name": "Ammo", "quantity": 1 }])).await;
    place(&app, &member2, json!([{ "name": "Pistol", "quantity": 1 }])).await;
    place(&app, &member1, json!([{ "name": "Vest", "quantity": 2 }])).await;

    let leader = login(&app, "leader").await;
    let all = orders(&app, &leader).await;

    let users: Vec<&str> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["user"].as_str().unwrap())
        .collect();
    assert_eq!(users, vec!["member1", "member2", "member1"]);
    assert_eq!(all[0]["items"], json!(["Vest x2 ($30000)"]));
}

#[tokio::test]
async fn test_client_price_is_ignored() {
    let (app, _) = setup().await;
    let member1 = login(&app, "member1").await;

    let response = place(
        &app,
        &member1,
        json!([{ "name": "Pistol", "quantity": 1, "price": 1 }]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 40000);
}

#[tokio::test]
async fn test_rejected_carts_store_nothing() {
    let (app, _) = setup().await;
    let member1 = login(&app, "member1").await;

    let empty = place(&app, &member1, json!([])).await;
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let bad_quantity = place(
        &app,
        &member1,
        json!([
            { "name": "Ammo", "quantity": 1 },
            { "name": "Vest", "quantity": "abc" }
        ]),
    )
    .await;
    assert_eq!(bad_quantity.status(), StatusCode::BAD_REQUEST);

    let zero = place(&app, &member1, json!([{ "name": "Ammo", "quantity": 0 }])).await;
    assert_eq!(zero.status(), StatusCode::BAD_REQUEST);

    let unknown = place(
        &app,
        &member1,
        json!([
            { "name": "Ammo", "quantity": 1 },
            { "name": "Helmet", "quantity": 1 }
        ]),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    assert_eq!(orders(&app, &member1).await, json!([]));
}

#[tokio::test]
async fn test_export_is_leader_only() {
    let (app, _) = setup().await;

    let anonymous = send(&app, "GET", "/export", None, None).await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let member1 = login(&app, "member1").await;
    let member = send(&app, "GET", "/export", Some(&member1), None).await;
    assert_eq!(member.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_role_cannot_be_claimed_at_login() {
    let (app, _) = setup().await;

    let response = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "username": "member1", "password": PASSWORD, "role": "leader" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let export = send(&app, "GET", "/export", Some(&cookie), None).await;
    assert_eq!(export.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_leader_export_download() {
    let (app, _) = setup().await;
    let member1 = login(&app, "member1").await;
    place(
        &app,
        &member1,
        json!([{ "name": "Ammo", "quantity": 2 }, { "name": "Vest", "quantity": 1 }]),
    )
    .await;

    let leader = login(&app, "leader").await;
    let response = send(&app, "GET", "/export", Some(&leader), None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        reporting::XLSX_CONTENT_TYPE
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=orders.xlsx"
    );
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(body.starts_with(b"PK"));
}

#[tokio::test]
async fn test_logout_ends_session() {
    let (app, _) = setup().await;
    let member1 = login(&app, "member1").await;

    let response = send(&app, "GET", "/logout", Some(&member1), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);

    let after = send(&app, "GET", "/orders", Some(&member1), None).await;
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_catalog_listing_and_admin_insert() {
    let (app, _) = setup().await;

    let response = send(&app, "GET", "/items", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let items = body_json(response).await;
    assert_eq!(
        items,
        json!([
            { "name": "Ammo", "price": 5000 },
            { "name": "Pistol", "price": 40000 },
            { "name": "Vest", "price": 15000 }
        ])
    );

    let new_item = json!({ "name": "Helmet", "price": 8000 });

    let anonymous = send(&app, "POST", "/items", None, Some(new_item.clone())).await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let member1 = login(&app, "member1").await;
    let member = send(&app, "POST", "/items", Some(&member1), Some(new_item.clone())).await;
    assert_eq!(member.status(), StatusCode::FORBIDDEN);

    let leader = login(&app, "leader").await;
    let created = send(&app, "POST", "/items", Some(&leader), Some(new_item.clone())).await;
    assert_eq!(created.status(), StatusCode::CREATED);
    assert_eq!(body_json(created).await, new_item);

    let duplicate = send(&app, "POST", "/items", Some(&leader), Some(new_item)).await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let ordered = place(&app, &member1, json!([{ "name": "Helmet", "quantity": 2 }])).await;
    assert_eq!(ordered.status(), StatusCode::OK);
    assert_eq!(body_json(ordered).await["total"], 16000);
}

#[tokio::test]
async fn test_session_checked_before_body() {
    let (app, notifier) = setup().await;

    let response = send_raw(&app, "/order", None, "text/plain", "not json").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send_raw(&app, "/order", None, "application/json", "{").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send_raw(&app, "/items", None, "text/plain", "not json").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let member1 = login(&app, "member1").await;
    let response = send_raw(&app, "/items", Some(&member1), "text/plain", "not json").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    assert_eq!(notifier.sent_count(), 0);
}

#[tokio::test]
async fn test_malformed_order_bodies_are_bad_requests() {
    let (app, notifier) = setup().await;
    let member1 = login(&app, "member1").await;

    let bodies = [
        json!({ "cart": [{ "name": 5, "quantity": 1 }] }),
        json!({ "cart": [{ "quantity": 1 }] }),
        json!({ "cart": "Ammo" }),
        json!({ "cart": null }),
        json!({}),
    ];
    for body in bodies {
        let response = send(&app, "POST", "/order", Some(&member1), Some(body.clone())).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        let json = body_json(response).await;
        assert!(json["error"].is_string(), "body: {body}");
    }

    let response = send_raw(&app, "/order", Some(&member1), "text/plain", "not json").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send_raw(&app, "/order", Some(&member1), "application/json", "{").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(orders(&app, &member1).await, json!([]));
    assert_eq!(notifier.sent_count(), 0);
}

#[tokio::test]
async fn test_malformed_item_bodies_are_bad_requests() {
    let (app, _) = setup().await;
    let leader = login(&app, "leader").await;

    let response = send(
        &app,
        "POST",
        "/items",
        Some(&leader),
        Some(json!({ "name": "Helmet", "price": "cheap" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send_raw(&app, "/items", Some(&leader), "text/plain", "Helmet").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let items = body_json(send(&app, "GET", "/items", None, None).await).await;
    assert_eq!(items.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_huge_prices_cannot_break_the_export() {
    let (app, _) = setup().await;
    let leader = login(&app, "leader").await;

    let response = send(
        &app,
        "POST",
        "/items",
        Some(&leader),
        Some(json!({ "name": "Tank", "price": i64::MAX / 2 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let max_exact = (1i64 << 53) - 1;
    let response = send(
        &app,
        "POST",
        "/items",
        Some(&leader),
        Some(json!({ "name": "Tank", "price": max_exact })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let member1 = login(&app, "member1").await;
    let ordered = place(&app, &member1, json!([{ "name": "Tank", "quantity": 1 }])).await;
    assert_eq!(ordered.status(), StatusCode::OK);
    let too_much = place(&app, &member1, json!([{ "name": "Tank", "quantity": 2 }])).await;
    assert_eq!(too_much.status(), StatusCode::BAD_REQUEST);

    let export = send(&app, "GET", "/export", Some(&leader), None).await;
    assert_eq!(export.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_session_backend_failure_is_internal_error() {
    let state = api::create_default_state(
        api::Backends::in_memory(Arc::new(InMemoryNotifier::new())),
        Utc.fix(),
        PASSWORD,
    )
    .await
    .unwrap();
    let session_layer = api::session::create_session_layer(UnavailableSessionStore, false);
    let app = api::create_app(state, get_metrics_handle(), session_layer);
    let cookie = format!("{}={}", api::session::SESSION_COOKIE_NAME, Id::default());

    for uri in ["/orders", "/me", "/export"] {
        let response = send(&app, "GET", uri, Some(&cookie), None).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "uri: {uri}");
        let json = body_json(response).await;
        assert_eq!(json["error"], "Internal server error");
    }

    let response = send(
        &app,
        "POST",
        "/order",
        Some(&cookie),
        Some(json!({ "cart": [{ "name": "Ammo", "quantity": 1 }] })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let anonymous = send(&app, "GET", "/orders", None, None).await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
}
