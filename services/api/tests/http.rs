//! End-to-end tests of the HTTP surface against in-memory stores.

use api_lib::adapters::{InMemoryCounterStore, InMemorySessionStore, InMemoryUserStore, StaticCredentialVerifier};
use api_lib::config::Config;
use api_lib::web::{build_router, AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use kpi_counter_core::domain::{AuthSession, CounterField, CounterPatch, Counters};
use kpi_counter_core::ports::{
    CounterStore, CredentialVerifier, PortError, PortResult, SessionStore,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let state = AppState::in_memory(Config::default()).unwrap();
    build_router(Arc::new(state))
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, set_cookie, body)
}

fn post_json(uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn post_empty(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Logs in as the default admin and returns the `name=value` cookie pair.
async fn login(app: &Router) -> String {
    let (status, set_cookie, body) = send(
        app,
        post_json(
            "/api/auth/login",
            json!({"username": "admin", "password": "massana"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "message": "Login successful"}));

    let set_cookie = set_cookie.expect("login sets a cookie");
    set_cookie.split(';').next().unwrap().to_string()
}

//=========================================================================================
// Auth
//=========================================================================================

#[tokio::test]
async fn login_sets_an_http_only_session_cookie() {
    let app = app();
    let (_, set_cookie, _) = send(
        &app,
        post_json(
            "/api/auth/login",
            json!({"username": "admin", "password": "massana"}),
            None,
        ),
    )
    .await;

    let set_cookie = set_cookie.unwrap();
    assert!(set_cookie.starts_with("kpi_session="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Max-Age=86400"));
}

#[tokio::test]
async fn login_with_wrong_credentials_is_401() {
    let app = app();
    for (user, pass) in [("admin", "wrong"), ("root", "massana")] {
        let (status, set_cookie, body) = send(
            &app,
            post_json(
                "/api/auth/login",
                json!({"username": user, "password": pass}),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(set_cookie.is_none());
        assert_eq!(body, json!({"success": false, "message": "Invalid credentials"}));
    }
}

#[tokio::test]
async fn login_with_bad_shape_is_400() {
    let app = app();
    let bodies = [
        json!({"username": "", "password": "massana"}),
        json!({"username": "admin"}),
        json!({"username": 1, "password": "massana"}),
    ];
    for body in bodies {
        let (status, _, resp) = send(&app, post_json("/api/auth/login", body, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp["success"], json!(false));
    }

    let (status, _, _) = send(&app, post_empty("/api/auth/login", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn me_reflects_the_session() {
    let app = app();
    let (status, _, body) = send(&app, get("/api/auth/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"success": false, "authenticated": false}));

    let cookie = login(&app).await;
    let (status, _, body) = send(&app, get("/api/auth/me", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "authenticated": true}));
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = app();
    let cookie = login(&app).await;

    let (status, set_cookie, body) = send(&app, post_empty("/api/auth/logout", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "message": "Logout successful"}));
    assert!(set_cookie.unwrap().contains("Max-Age=0"));

    let (status, _, body) = send(&app, get("/api/auth/me", Some(&cookie))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"success": false, "authenticated": false}));

    let (status, _, body) = send(&app, get("/api/kpi", Some(&cookie))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn logout_without_a_session_still_succeeds() {
    let app = app();
    let (status, _, body) = send(&app, post_empty("/api/auth/logout", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
}

#[tokio::test]
async fn forged_cookies_are_ignored() {
    let app = app();
    let cookie = login(&app).await;
    let forged = format!("{}00", cookie);

    let (status, _, _) = send(&app, get("/api/kpi", Some(&forged))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _, _) = send(&app, get("/api/kpi", Some("kpi_session=made-up"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logging_in_again_replaces_the_old_session() {
    let app = app();
    let first = login(&app).await;

    let (status, set_cookie, _) = send(
        &app,
        post_json(
            "/api/auth/login",
            json!({"username": "admin", "password": "massana"}),
            Some(&first),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let second = set_cookie.unwrap().split(';').next().unwrap().to_string();
    assert_ne!(first, second);

    let (status, _, _) = send(&app, get("/api/auth/me", Some(&first))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _, _) = send(&app, get("/api/auth/me", Some(&second))).await;
    assert_eq!(status, StatusCode::OK);
}

//=========================================================================================
// Dashboard
//=========================================================================================

#[tokio::test]
async fn kpi_requires_a_session() {
    let app = app();
    let (status, _, body) = send(&app, get("/api/kpi", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"success": false, "message": "Unauthorized"}));
}

#[tokio::test]
async fn three_new_calls_show_up_on_the_dashboard() {
    let app = app();
    for expected in 1..=3 {
        let (status, _, body) = send(&app, post_empty("/new-call", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "totalCalls": expected}));
    }

    let cookie = login(&app).await;
    let (status, _, body) = send(&app, get("/api/kpi", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "data": {
                "totalCalls": 3,
                "dealCalls": 0,
                "noDealCalls": 0,
                "positiveSentimentCalls": 0,
                "negativeSentimentCalls": 0
            }
        })
    );
}

//=========================================================================================
// Ingestion
//=========================================================================================

#[tokio::test]
async fn deals_count_each_outcome_separately() {
    let app = app();
    let (status, _, body) = send(&app, post_json("/deals", json!({"deal": "Deal"}), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "dealCalls": 1, "noDealCalls": 0}));

    let (_, _, body) = send(&app, post_json("/deals", json!({"deal": "No Deal"}), None)).await;
    assert_eq!(body, json!({"success": true, "dealCalls": 1, "noDealCalls": 1}));
}

#[tokio::test]
async fn invalid_deals_change_nothing() {
    let app = app();
    for body in [json!({"deal": "Maybe"}), json!({"deal": "deal"}), json!({}), json!({"deal": 1})] {
        let (status, _, resp) = send(&app, post_json("/deals", body, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp, json!({"success": false, "message": "Invalid request data"}));
    }

    let (status, _, _) = send(&app, post_empty("/deals", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let cookie = login(&app).await;
    let (_, _, body) = send(&app, get("/api/kpi", Some(&cookie))).await;
    assert_eq!(body["data"]["dealCalls"], json!(0));
    assert_eq!(body["data"]["noDealCalls"], json!(0));
}

#[tokio::test]
async fn sentiment_increments_only_its_counter() {
    let app = app();
    let (status, _, body) = send(
        &app,
        post_json("/sentiment", json!({"sentiment": "Positive"}), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "positiveSentimentCalls": 1, "negativeSentimentCalls": 0})
    );

    let (status, _, _) = send(
        &app,
        post_json("/sentiment", json!({"sentiment": "Neutral"}), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let cookie = login(&app).await;
    let (_, _, body) = send(&app, get("/api/kpi", Some(&cookie))).await;
    assert_eq!(
        body["data"],
        json!({
            "totalCalls": 0,
            "dealCalls": 0,
            "noDealCalls": 0,
            "positiveSentimentCalls": 1,
            "negativeSentimentCalls": 0
        })
    );
}

#[tokio::test]
async fn ingestion_ignores_any_session() {
    let app = app();
    let (status, _, _) = send(&app, post_empty("/new-call", Some("kpi_session=junk"))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_ingestion_loses_no_events() {
    let app = app();
    let mut handles = Vec::new();
    for i in 0..100 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let req = if i % 2 == 0 {
                post_json("/deals", json!({"deal": "Deal"}), None)
            } else {
                post_empty("/new-call", None)
            };
            let resp = app.oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let cookie = login(&app).await;
    let (_, _, body) = send(&app, get("/api/kpi", Some(&cookie))).await;
    assert_eq!(body["data"]["totalCalls"], json!(50));
    assert_eq!(body["data"]["dealCalls"], json!(50));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = app();
    let (status, _, body) = send(&app, get("/api-docs/openapi.json", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/deals"].is_object());
}

//=========================================================================================
// Store failures
//=========================================================================================

/// A counter store whose backend is down.
struct UnavailableCounters;

#[async_trait]
impl CounterStore for UnavailableCounters {
    async fn read(&self) -> PortResult<Counters> {
        Err(PortError::Unexpected("counter backend down".into()))
    }

    async fn increment(&self, _: CounterField) -> PortResult<Counters> {
        Err(PortError::Unexpected("counter backend down".into()))
    }

    async fn update(&self, _: CounterPatch) -> PortResult<Counters> {
        Err(PortError::Unexpected("counter backend down".into()))
    }
}

/// A session store that works until a session has to be deleted.
#[derive(Default)]
struct UndeletableSessions {
    inner: InMemorySessionStore,
}

#[async_trait]
impl SessionStore for UndeletableSessions {
    async fn create(&self, session: &AuthSession) -> PortResult<()> {
        self.inner.create(session).await
    }

    async fn is_authenticated(&self, session_id: &str) -> PortResult<bool> {
        self.inner.is_authenticated(session_id).await
    }

    async fn destroy(&self, _: &str) -> PortResult<()> {
        Err(PortError::Unexpected("session backend down".into()))
    }
}

fn app_with(counters: Arc<dyn CounterStore>, sessions: Arc<dyn SessionStore>) -> Router {
    let config = Config::default();
    let verifier: Arc<dyn CredentialVerifier> = Arc::new(StaticCredentialVerifier::new(
        config.admin_username.clone(),
        config.admin_password.clone(),
    ));
    let state = AppState::new(
        config,
        counters,
        sessions,
        Arc::new(InMemoryUserStore::new()),
        verifier,
    )
    .unwrap();
    build_router(Arc::new(state))
}

fn assert_internal(status: StatusCode, body: &Value, message: &str) {
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, &json!({"success": false, "message": message}));
}

#[tokio::test]
async fn counter_store_failures_are_500s_without_data() {
    let app = app_with(
        Arc::new(UnavailableCounters),
        Arc::new(InMemorySessionStore::new()),
    );

    let (status, _, body) = send(&app, post_empty("/new-call", None)).await;
    assert_internal(status, &body, "Failed to increment total calls");

    let (status, _, body) = send(&app, post_json("/deals", json!({"deal": "Deal"}), None)).await;
    assert_internal(status, &body, "Failed to record deal outcome");

    let (status, _, body) = send(
        &app,
        post_json("/sentiment", json!({"sentiment": "Negative"}), None),
    )
    .await;
    assert_internal(status, &body, "Failed to record sentiment");

    let cookie = login(&app).await;
    let (status, _, body) = send(&app, get("/api/kpi", Some(&cookie))).await;
    assert_internal(status, &body, "Failed to fetch KPI data");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn bad_payloads_are_rejected_before_the_store_is_touched() {
    let app = app_with(
        Arc::new(UnavailableCounters),
        Arc::new(InMemorySessionStore::new()),
    );
    let (status, _, _) = send(&app, post_json("/deals", json!({"deal": "Maybe"}), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_is_500_when_the_session_cannot_be_deleted() {
    let app = app_with(
        Arc::new(InMemoryCounterStore::new()),
        Arc::new(UndeletableSessions::default()),
    );
    let cookie = login(&app).await;

    let (status, set_cookie, body) =
        send(&app, post_empty("/api/auth/logout", Some(&cookie))).await;
    assert_internal(status, &body, "Logout failed");
    assert!(set_cookie.is_none());

    let (status, _, _) = send(&app, get("/api/auth/me", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
}
