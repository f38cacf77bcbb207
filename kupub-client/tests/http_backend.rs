// kupub-client/tests/http_backend.rs
// REST client against an in-process mock backend

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use kupub_client::cart::CartAction;
use kupub_client::storage::MemoryStore;
use kupub_client::{ClientConfig, ClientError, ErrorCode, KupubClient};
use serde_json::{Value, json};
use shared::client::LoginRequest;
use shared::models::PricingSettings;

struct Backend {
    /// Access token the backend currently accepts
    valid_access: Mutex<String>,
    refresh_calls: AtomicUsize,
    refresh_works: bool,
    login_auth_headers: Mutex<Vec<Option<String>>>,
    order_bodies: Mutex<Vec<Value>>,
}

impl Backend {
    fn new(refresh_works: bool) -> Arc<Self> {
        Arc::new(Self {
            valid_access: Mutex::new("access-2".into()),
            refresh_calls: AtomicUsize::new(0),
            refresh_works,
            login_auth_headers: Mutex::default(),
            order_bodies: Mutex::default(),
        })
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {}", self.valid_access.lock().unwrap());
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == expected)
    }
}

fn data(value: Value) -> Response {
    Json(json!({ "data": value })).into_response()
}

fn failure(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({ "error": { "code": code, "message": message } }))).into_response()
}

async fn login(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    backend.login_auth_headers.lock().unwrap().push(
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );
    // Deliberately stale: the backend only accepts access-2
    data(json!({
        "accessToken": "access-1",
        "refreshToken": "refresh-1",
        "username": "manager",
        "departmentId": 1,
        "departmentSlug": "cs",
        "role": "DEPT_ADMIN"
    }))
}

async fn refresh(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    backend.refresh_calls.fetch_add(1, Ordering::SeqCst);
    if backend.refresh_works && body["refreshToken"] == "refresh-1" {
        data(json!({ "accessToken": backend.valid_access.lock().unwrap().clone() }))
    } else {
        failure(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "만료된 토큰입니다.")
    }
}

async fn tables(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    if !backend.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    data(json!([{
        "id": 1, "departmentId": 1, "code": "A1", "name": "Table 1", "capacity": 4,
        "posX": 0, "posY": 0, "width": 100, "height": 100, "active": true
    }]))
}

async fn sessions(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    if !backend.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    failure(StatusCode::CONFLICT, "BUSINESS_ERROR", "이미 사용 중인 테이블입니다.")
}

async fn create_order(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    let include_fee = body["includeTableFee"].as_bool().unwrap_or(false);
    backend.order_bodies.lock().unwrap().push(body.clone());
    let table_fee = if include_fee { 2000 } else { 0 };
    data(json!({
        "id": 77,
        "departmentId": 1,
        "sessionId": body["sessionId"],
        "subtotal": 10000,
        "tableFee": table_fee,
        "discount": 0,
        "totalPrice": 10000 + table_fee,
        "status": "PENDING",
        "paymentStatus": "PENDING",
        "items": [],
        "createdAt": "2024-05-01T19:00:00"
    }))
}

async fn empty_order() -> Response {
    StatusCode::OK.into_response()
}

async fn serve(backend: Arc<Backend>) -> String {
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/cs/admin/tables", get(tables))
        .route("/api/cs/admin/sessions", get(sessions))
        .route("/api/cs/orders", post(create_order))
        .route("/api/cs/orders/5", get(empty_order))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base_url: &str) -> KupubClient {
    KupubClient::builder()
        .config(ClientConfig::new(base_url))
        .storage(Arc::new(MemoryStore::new()))
        .build()
        .unwrap()
}

fn credentials() -> LoginRequest {
    LoginRequest {
        username: "manager".into(),
        password: "secret".into(),
        department_slug: Some("cs".into()),
    }
}

#[tokio::test]
async fn test_expired_token_refreshes_once_and_retries() {
    let backend = Backend::new(true);
    let client = client(&serve(backend.clone()).await);

    let user = client.auth_api().login(&credentials()).await.unwrap();
    assert_eq!(user.username, "manager");
    assert_eq!(client.auth().access_token().as_deref(), Some("access-1"));

    let tables = client.admin("cs").list_tables().await.unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(client.auth().access_token().as_deref(), Some("access-2"));

    // Fresh token: no further refresh
    client.admin("cs").list_tables().await.unwrap();
    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_refresh_clears_auth() {
    let backend = Backend::new(false);
    let client = client(&serve(backend.clone()).await);
    client.auth_api().login(&credentials()).await.unwrap();

    let err = client.admin("cs").list_tables().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));
    assert!(!client.auth().is_authenticated());
    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_auth_paths_never_carry_a_token() {
    let backend = Backend::new(true);
    let client = client(&serve(backend.clone()).await);

    client.auth_api().login(&credentials()).await.unwrap();
    client.auth_api().login(&credentials()).await.unwrap();

    let headers = backend.login_auth_headers.lock().unwrap().clone();
    assert_eq!(headers, [None, None]);
}

#[tokio::test]
async fn test_error_envelope_message_is_verbatim() {
    let backend = Backend::new(true);
    let client = client(&serve(backend).await);
    client.auth_api().login(&credentials()).await.unwrap();

    let err = client.admin("cs").list_sessions(false).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::BusinessError);
    assert_eq!(err.user_message(), "이미 사용 중인 테이블입니다.");
}

#[tokio::test]
async fn test_empty_body_is_empty_response() {
    let client = client(&serve(Backend::new(true)).await);
    let err = client.public("cs").get_order(5).await.unwrap_err();
    assert!(matches!(err, ClientError::EmptyResponse));
    assert_eq!(err.user_message(), "서버 응답이 없습니다.");
}

#[tokio::test]
async fn test_order_submission_sets_fees_flag() {
    let backend = Backend::new(true);
    let client = client(&serve(backend.clone()).await);
    let pricing = PricingSettings {
        table_fee: 2000,
        discounts: vec![],
    };

    let cart = client.cart("cs");
    cart.dispatch(CartAction::SetSession(9)).unwrap();
    cart.dispatch(CartAction::AddItem {
        menu_id: 3,
        name: "Fried chicken".into(),
        price: 10000,
        image_url: None,
    })
    .unwrap();
    assert_eq!(cart.summary(&pricing).total, 12000);

    let order = cart.submit(&client.public("cs"), &pricing).await.unwrap();
    assert_eq!(order.id, 77);
    assert_eq!(order.table_fee, 2000);

    let body = backend.order_bodies.lock().unwrap()[0].clone();
    assert_eq!(body["sessionId"], 9);
    assert_eq!(body["includeTableFee"], true);
    assert_eq!(body["items"][0]["menuId"], 3);

    assert!(cart.cart().is_empty());
    assert_eq!(cart.session_id(), Some(9));
    assert!(cart.fees_paid());

    // Second order of the session leaves the fee out
    cart.dispatch(CartAction::AddItem {
        menu_id: 3,
        name: "Fried chicken".into(),
        price: 10000,
        image_url: None,
    })
    .unwrap();
    assert_eq!(cart.summary(&pricing).total, 10000);
    let second = cart.submit(&client.public("cs"), &pricing).await.unwrap();
    assert_eq!(second.table_fee, 0);
    assert_eq!(backend.order_bodies.lock().unwrap()[1]["includeTableFee"], false);
}

#[tokio::test]
async fn test_empty_cart_is_rejected_locally() {
    let backend = Backend::new(true);
    let client = client(&serve(backend.clone()).await);
    let cart = client.cart("cs");
    cart.dispatch(CartAction::SetSession(9)).unwrap();

    let err = cart
        .submit(&client.public("cs"), &PricingSettings::default())
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "장바구니가 비어 있습니다.");
    assert!(backend.order_bodies.lock().unwrap().is_empty());
}
