//! End-to-end HTTP tests against an in-memory SQLite store and the sandbox
//! payment gateway.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use booking_hex::{
    BookingService,
    inbound::{HttpServer, JwtService},
};
use booking_repo::SqliteRepo;
use http_body_util::BodyExt;
use razorpay_gateway::{SandboxGateway, signature::sign_payment};
use serde_json::{Value, json};
use tower::ServiceExt;

const JWT_SECRET: &str = "integration_secret";
const KEY_SECRET: &str = "sandbox_secret";
const ADMIN_EMAIL: &str = "admin@clinic.test";

async fn app_with_limit(requests_per_minute: u32) -> Router {
    let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
    let gateway = SandboxGateway::new("rzp_test_sandbox", KEY_SECRET);
    let service = BookingService::new(repo, gateway);
    HttpServer::new(service, JwtService::new(JWT_SECRET), ADMIN_EMAIL)
        .with_rate_limit(requests_per_minute)
        .router()
}

async fn app() -> Router {
    app_with_limit(1000).await
}

fn user_token(user_id: &str) -> String {
    JwtService::new(JWT_SECRET)
        .issue_user_token(user_id)
        .unwrap()
}

fn admin_token() -> String {
    JwtService::new(JWT_SECRET)
        .issue_admin_token(ADMIN_EMAIL)
        .unwrap()
}

fn post(uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/json")
        .header("token", token)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str, header: Option<(&str, &str)>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some((name, value)) = header {
        builder = builder.header(name, value);
    }
    builder.body(Body::empty()).unwrap()
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn book(app: &Router, token: &str, doc: &str, date: &str, time: &str) -> Value {
    let (_, body) = call(
        app,
        post(
            "/api/user/book-appointment",
            token,
            json!({"docId": doc, "slotDate": date, "slotTime": time}),
        ),
    )
    .await;
    body
}

async fn appointments(app: &Router, token: &str) -> Vec<Value> {
    let (_, body) = call(app, get("/api/user/appointments", Some(("token", token)))).await;
    body["appointments"].as_array().cloned().unwrap_or_default()
}

#[tokio::test]
async fn test_health_needs_no_token() {
    let app = app().await;

    let (status, body) = call(&app, get("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_full_payment_flow() {
    let app = app().await;
    let token = user_token("user_1");

    let booked = book(&app, &token, "doc_7", "20_10_2026", "10:30 AM").await;
    assert_eq!(booked["success"], true);

    let (status, created) = call(
        &app,
        post("/api/payment/create-order", &token, json!({"amount": 500})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["success"], true);
    assert_eq!(created["key"], "rzp_test_sandbox");
    assert_eq!(created["order"]["amount"], 50000);
    assert_eq!(created["order"]["currency"], "INR");
    let order_id = created["order"]["id"].as_str().unwrap().to_string();

    let payment_id = "pay_integration1";
    let signature = sign_payment(&order_id, payment_id, KEY_SECRET);
    let (_, verified) = call(
        &app,
        post(
            "/api/payment/verify",
            &token,
            json!({
                "razorpay_order_id": order_id,
                "razorpay_payment_id": payment_id,
                "razorpay_signature": signature,
                "userId": "user_1",
                "doctorId": "doc_7",
                "amount": 500
            }),
        ),
    )
    .await;
    assert_eq!(verified["success"], true);
    assert_eq!(verified["message"], "Payment verified successfully");

    let listed = appointments(&app, &token).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["payment"], true);
    assert_eq!(listed[0]["docId"], "doc_7");

    let (_, ledger) = call(
        &app,
        get("/api/admin/payments", Some(("atoken", admin_token().as_str()))),
    )
    .await;
    assert_eq!(ledger["success"], true);
    let payments = ledger["payments"].as_array().unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0]["orderId"], order_id.as_str());
    assert_eq!(payments[0]["status"], "SUCCESS");
    assert_eq!(payments[0]["appointmentMatched"], true);
}

#[tokio::test]
async fn test_create_order_without_amount() {
    let app = app().await;

    let (status, body) = call(
        &app,
        post("/api/payment/create-order", &user_token("user_1"), json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Amount is required");
}

#[tokio::test]
async fn test_malformed_bodies_keep_the_envelope() {
    let app = app().await;
    let token = user_token("user_1");

    for raw in [r#"{"amount":"abc"}"#, r#"{"amount":true}"#, r#"{"amount":"#] {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/payment/create-order")
            .header("Content-Type", "application/json")
            .header("token", token.as_str())
            .body(Body::from(raw))
            .unwrap();

        let (status, body) = call(&app, request).await;
        assert_eq!(status, StatusCode::OK, "{raw}");
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid request body");
    }

    let no_content_type = Request::builder()
        .method(Method::POST)
        .uri("/api/payment/create-order")
        .header("token", token.as_str())
        .body(Body::from(r#"{"amount":500}"#))
        .unwrap();
    let (status, body) = call(&app, no_content_type).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Amount is required");
}

#[tokio::test]
async fn test_verify_rejects_missing_and_forged_signatures() {
    let app = app().await;
    let token = user_token("user_1");
    book(&app, &token, "doc_7", "20_10_2026", "11:00 AM").await;

    let (_, missing) = call(
        &app,
        post(
            "/api/payment/verify",
            &token,
            json!({"razorpay_order_id": "order_1", "razorpay_payment_id": "pay_1"}),
        ),
    )
    .await;
    assert_eq!(missing["success"], false);
    assert_eq!(missing["message"], "Missing payment details");

    let mut forged = sign_payment("order_1", "pay_1", KEY_SECRET);
    forged.replace_range(0..1, if forged.starts_with('0') { "1" } else { "0" });
    let (_, rejected) = call(
        &app,
        post(
            "/api/payment/verify",
            &token,
            json!({
                "razorpay_order_id": "order_1",
                "razorpay_payment_id": "pay_1",
                "razorpay_signature": forged,
                "doctorId": "doc_7"
            }),
        ),
    )
    .await;
    assert_eq!(rejected["success"], false);
    assert_eq!(rejected["message"], "Payment verification failed");

    let listed = appointments(&app, &token).await;
    assert_eq!(listed[0]["payment"], false);
}

#[tokio::test]
async fn test_verify_defaults_user_to_caller() {
    let app = app().await;
    let token = user_token("user_9");
    book(&app, &token, "doc_3", "21_10_2026", "02:00 PM").await;

    let signature = sign_payment("order_X", "pay_X", KEY_SECRET);
    let (_, verified) = call(
        &app,
        post(
            "/api/payment/verify",
            &token,
            json!({
                "razorpay_order_id": "order_X",
                "razorpay_payment_id": "pay_X",
                "razorpay_signature": signature,
                "doctorId": "doc_3"
            }),
        ),
    )
    .await;

    assert_eq!(verified["success"], true);
    assert_eq!(appointments(&app, &token).await[0]["payment"], true);
}

#[tokio::test]
async fn test_auth_failures_are_uniform() {
    let app = app().await;
    let foreign = JwtService::new("other_secret")
        .issue_user_token("user_1")
        .unwrap();
    let not_admin = JwtService::new(JWT_SECRET)
        .issue_admin_token("intruder@clinic.test")
        .unwrap();

    let requests = [
        get("/api/user/appointments", None),
        get("/api/user/appointments", Some(("token", "garbage"))),
        get("/api/user/appointments", Some(("token", foreign.as_str()))),
        get("/api/admin/payments", None),
        get("/api/admin/payments", Some(("atoken", not_admin.as_str()))),
        get("/api/admin/payments", Some(("atoken", user_token("user_1").as_str()))),
    ];

    for request in requests {
        let (status, body) = call(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Not Authorized, Login Again");
    }
}

#[tokio::test]
async fn test_bearer_header_is_accepted() {
    let app = app().await;

    let (_, body) = call(
        &app,
        get(
            "/api/user/appointments",
            Some(("Authorization", format!("Bearer {}", user_token("user_1")).as_str())),
        ),
    )
    .await;

    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_cancel_frees_the_slot() {
    let app = app().await;
    let owner = user_token("user_1");
    let other = user_token("user_2");

    book(&app, &owner, "doc_1", "22_10_2026", "04:00 PM").await;
    let taken = book(&app, &other, "doc_1", "22_10_2026", "04:00 PM").await;
    assert_eq!(taken["success"], false);
    assert_eq!(taken["message"], "Slot not available");

    let id = appointments(&app, &owner).await[0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (_, refused) = call(
        &app,
        post(
            "/api/user/cancel-appointment",
            &other,
            json!({"appointmentId": id}),
        ),
    )
    .await;
    assert_eq!(refused["message"], "Unauthorized action");

    let (_, cancelled) = call(
        &app,
        post(
            "/api/user/cancel-appointment",
            &owner,
            json!({"appointmentId": id}),
        ),
    )
    .await;
    assert_eq!(cancelled["success"], true);

    let rebooked = book(&app, &other, "doc_1", "22_10_2026", "04:00 PM").await;
    assert_eq!(rebooked["success"], true);
}

#[tokio::test]
async fn test_mark_paid_by_owner() {
    let app = app().await;
    let token = user_token("user_1");
    book(&app, &token, "doc_1", "23_10_2026", "05:30 PM").await;
    let id = appointments(&app, &token).await[0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (_, body) = call(
        &app,
        post("/api/user/mark-paid", &token, json!({"appointmentId": id})),
    )
    .await;

    assert_eq!(body["success"], true);
    assert_eq!(appointments(&app, &token).await[0]["payment"], true);
}

#[tokio::test]
async fn test_slots_are_public_and_weekly() {
    let app = app().await;

    let (status, body) = call(&app, get("/api/doctor/doc_1/slots", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["slots"].as_array().unwrap().len(), 7);
    assert_eq!(body["slots"][1].as_array().unwrap().len(), 22);
}

#[tokio::test]
async fn test_rate_limit_returns_429() {
    let app = app_with_limit(2).await;
    let token = user_token("user_1");

    for _ in 0..2 {
        let (status, _) = call(&app, get("/api/user/appointments", Some(("token", token.as_str())))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = call(&app, get("/api/user/appointments", Some(("token", token.as_str())))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["retry_after_seconds"], 60);

    for _ in 0..5 {
        let (status, _) = call(&app, get("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
    }
}
