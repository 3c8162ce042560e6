use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use chrono::Utc;
use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase};
use tower::ServiceExt;
use uuid::Uuid;

use zerogate_auth_types::cookie::{FLASH_COOKIE, PENDING_COOKIE, SESSION_COOKIE};
use zerogate_auth_types::flash::{Flash, FlashLevel};
use zerogate_auth_types::token::validate_session_token;
use zerogate_portal::config::PortalConfig;
use zerogate_portal::domain::repository::PendingLoginStore;
use zerogate_portal::domain::types::{OTP_DEVICE_NAME, PENDING_ID_LEN, PendingLogin};
use zerogate_portal::infra::cache::{InMemoryPendingLoginStore, PendingLogins};
use zerogate_portal::infra::password::hash_password;
use zerogate_portal::infra::totp::TotpService;
use zerogate_portal::router::build_router;
use zerogate_portal::state::AppState;
use zerogate_portal_schema::{bookings, totp_devices, users};
use zerogate_testing::auth::MockSession;
use zerogate_testing::cookies::{is_cleared, set_cookie_value};

use crate::helpers::{TEST_PASSWORD, TEST_SESSION_SECRET, current_code};

const HOST: &str = "localhost";
const FORM: &str = "application/x-www-form-urlencoded";

fn test_config() -> PortalConfig {
    PortalConfig {
        database_url: "postgres://unused".to_owned(),
        redis_url: "redis://127.0.0.1:1".to_owned(),
        session_secret: TEST_SESSION_SECRET.to_owned(),
        portal_port: 0,
        allowed_hosts: vec![HOST.to_owned()],
        cookie_domain: None,
        cookie_secure: false,
        totp_issuer: "FYP_WebApp".to_owned(),
        totp_skew: 1,
        pending_login_ttl_secs: 300,
        session_ttl_secs: 3600,
    }
}

/// Router over a mock database and a process-local pending-login store.
fn app(db: DatabaseConnection) -> Router {
    app_with_pending(db, InMemoryPendingLoginStore::new())
}

fn app_with_pending(db: DatabaseConnection, pending: InMemoryPendingLoginStore) -> Router {
    let state = AppState::with_pending_store(db, PendingLogins::InMemory(pending), test_config());
    build_router(state)
}

fn alice_model() -> users::Model {
    users::Model {
        id: Uuid::new_v4(),
        username: "alice".to_owned(),
        email: "alice@example.com".to_owned(),
        password_hash: hash_password(TEST_PASSWORD).unwrap(),
        created_at: Utc::now(),
    }
}

fn device_model(user_id: Uuid, key: &str) -> totp_devices::Model {
    totp_devices::Model {
        id: Uuid::new_v4(),
        user_id,
        name: OTP_DEVICE_NAME.to_owned(),
        key: key.to_owned(),
        created_at: Utc::now(),
    }
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn alice() -> MockSession {
    MockSession::new(Uuid::new_v4(), "alice")
}

fn get(uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::HOST, HOST)
}

fn post(uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::HOST, HOST)
        .header(header::CONTENT_TYPE, FORM)
}

fn location(resp: &Response<Body>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn flash(resp: &Response<Body>) -> Option<Flash> {
    set_cookie_value(resp.headers(), FLASH_COOKIE).and_then(|v| Flash::decode(&v))
}

async fn body_text(resp: Response<Body>) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn booking_body(phone: &str) -> String {
    format!(
        "name=Alice&email=alice%40example.com&date=2026-11-02&phone={phone}&time=14%3A30&message="
    )
}

// ── Health / hosts ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_answer_health_checks_for_any_host() {
    let req = Request::builder()
        .uri("/healthz")
        .header(header::HOST, "10.0.0.7:8000")
        .body(Body::empty())
        .unwrap();
    let resp = app(empty_db()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn should_reject_pages_for_unknown_host() {
    let req = Request::builder()
        .uri("/login")
        .header(header::HOST, "evil.example.com")
        .body(Body::empty())
        .unwrap();
    let resp = app(empty_db()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ── Landing page ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_redirect_anonymous_visitor_to_login() {
    let resp = app(empty_db())
        .oneshot(get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn should_reject_forged_session_cookie() {
    let cookie = alice().cookie("some-other-secret");
    let resp = app(empty_db())
        .oneshot(get("/").header(header::COOKIE, cookie).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn should_render_booking_form_for_session_user() {
    let (name, value) = alice().header(TEST_SESSION_SECRET);
    let resp = app(empty_db())
        .oneshot(get("/").header(name, value).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("alice"));
    assert!(body.contains("action=\"/submit-booking\""));
}

#[tokio::test]
async fn should_redirect_logged_in_user_away_from_login() {
    let (name, value) = alice().header(TEST_SESSION_SECRET);
    let resp = app(empty_db())
        .oneshot(get("/login").header(name, value).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
}

// ── Booking ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_redirect_booking_get_to_index() {
    let resp = app(empty_db())
        .oneshot(get("/submit-booking").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn should_require_session_to_submit_booking() {
    let resp = app(empty_db())
        .oneshot(
            post("/submit-booking")
                .body(Body::from(booking_body("07123456789")))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn should_accept_booking_with_eleven_digit_phone() {
    let session = alice();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[bookings::Model {
            id: Uuid::new_v4(),
            user_id: session.user_id,
            name: "Alice".to_owned(),
            email: "alice@example.com".to_owned(),
            date: chrono::NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            phone: "07123456789".to_owned(),
            time: chrono::NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
            message: None,
            created_at: Utc::now(),
        }]])
        .into_connection();

    let resp = app(db)
        .oneshot(
            post("/submit-booking")
                .header(header::COOKIE, session.cookie(TEST_SESSION_SECRET))
                .body(Body::from(booking_body("07123456789")))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    let flash = flash(&resp).unwrap();
    assert_eq!(flash.level, FlashLevel::Success);
    assert_eq!(flash.text, "Booking submitted successfully!");
}

#[tokio::test]
async fn should_rerender_booking_form_for_short_phone() {
    let resp = app(empty_db())
        .oneshot(
            post("/submit-booking")
                .header(header::COOKIE, alice().cookie(TEST_SESSION_SECRET))
                .body(Body::from(booking_body("0712345")))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("Phone number must be 11 digits."));
    assert!(body.contains("value=\"0712345\""));
}

#[tokio::test]
async fn should_report_booking_storage_failure() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Custom("connection reset".to_owned())])
        .into_connection();

    let resp = app(db)
        .oneshot(
            post("/submit-booking")
                .header(header::COOKIE, alice().cookie(TEST_SESSION_SECRET))
                .body(Body::from(booking_body("07123456789")))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("An error occurred while submitting your booking. Please try again."));
    assert!(!body.contains("connection reset"));
}

// ── Second factor ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_enroll_device_and_show_qr_code() {
    let user = alice_model();
    let pending_id = "p".repeat(PENDING_ID_LEN);
    let pending = InMemoryPendingLoginStore::new();
    pending
        .put(&pending_id, &PendingLogin::new(user.id, 300), 300)
        .await
        .unwrap();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[user.clone()]])
        .append_query_results([Vec::<totp_devices::Model>::new()])
        .append_query_results([[device_model(user.id, &TotpService::generate_secret())]])
        .into_connection();

    let resp = app_with_pending(db, pending)
        .oneshot(
            get("/otp")
                .header(header::COOKIE, format!("{PENDING_COOKIE}={pending_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("src=\"data:image/png;base64,"));
    assert!(body.contains("action=\"/otp/verify\""));
}

#[tokio::test]
async fn should_open_session_and_drop_pending_login_on_valid_code() {
    let user = alice_model();
    let secret = TotpService::generate_secret();
    let pending_id = "q".repeat(PENDING_ID_LEN);
    let pending = InMemoryPendingLoginStore::new();
    pending
        .put(&pending_id, &PendingLogin::new(user.id, 300), 300)
        .await
        .unwrap();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[user.clone()]])
        .append_query_results([[device_model(user.id, &secret)]])
        .into_connection();

    let resp = app_with_pending(db, pending.clone())
        .oneshot(
            post("/otp/verify")
                .header(header::COOKIE, format!("{PENDING_COOKIE}={pending_id}"))
                .body(Body::from(format!("otp={}", current_code(&secret))))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    assert!(is_cleared(resp.headers(), PENDING_COOKIE));
    let token = set_cookie_value(resp.headers(), SESSION_COOKIE).unwrap();
    let session = validate_session_token(&token, TEST_SESSION_SECRET).unwrap();
    assert_eq!(session.user_id, user.id);
    assert_eq!(session.username, "alice");
    assert_eq!(flash(&resp).unwrap().text, "Login successful!");
    assert!(pending.get(&pending_id).await.unwrap().is_none());
}

#[tokio::test]
async fn should_send_otp_verification_without_pending_cookie_to_login() {
    let resp = app(empty_db())
        .oneshot(post("/otp/verify").body(Body::from("otp=123456")).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
    assert!(is_cleared(resp.headers(), PENDING_COOKIE));
    let flash = flash(&resp).unwrap();
    assert_eq!(flash.level, FlashLevel::Error);
    assert_eq!(flash.text, "Please log in first.");
}

#[tokio::test]
async fn should_send_otp_pages_without_pending_cookie_to_login() {
    for uri in ["/otp", "/otp/verify"] {
        let resp = app(empty_db())
            .oneshot(get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&resp), "/login", "{uri}");
    }
}

#[tokio::test]
async fn should_not_treat_session_cookie_as_pending_login() {
    let resp = app(empty_db())
        .oneshot(
            get("/otp")
                .header(header::COOKIE, alice().cookie(TEST_SESSION_SECRET))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
}

// ── Logout ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_say_goodbye_and_clear_session_on_logout() {
    let resp = app(empty_db())
        .oneshot(
            get("/logout")
                .header(header::COOKIE, alice().cookie(TEST_SESSION_SECRET))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
    assert!(is_cleared(resp.headers(), SESSION_COOKIE));
    assert!(is_cleared(resp.headers(), PENDING_COOKIE));
    let flash = flash(&resp).unwrap();
    assert_eq!(flash.text, "Goodbye, alice! You've been logged out.");
}

#[tokio::test]
async fn should_log_out_anonymous_visitor_without_message() {
    let resp = app(empty_db())
        .oneshot(get("/logout").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
    assert!(set_cookie_value(resp.headers(), FLASH_COOKIE).is_none());
}

// ── Signup / login forms ─────────────────────────────────────────────────────

#[tokio::test]
async fn should_rerender_signup_for_email_with_colon() {
    let resp = app(empty_db())
        .oneshot(
            post("/signup")
                .body(Body::from(
                    "username=bob&email=a%3Ab%40example.com&password=Secur3%21pass",
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Enter a valid email address."));
}

#[tokio::test]
async fn should_set_only_pending_cookie_after_password_step() {
    let user = alice_model();
    let pending = InMemoryPendingLoginStore::new();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[user.clone()]])
        .into_connection();

    let resp = app_with_pending(db, pending.clone())
        .oneshot(
            post("/login")
                .body(Body::from("email=alice%40example.com&password=Secur3%21pass"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/otp");
    assert!(is_cleared(resp.headers(), SESSION_COOKIE));
    assert_eq!(set_cookie_value(resp.headers(), SESSION_COOKIE).as_deref(), Some(""));
    let pending_id = set_cookie_value(resp.headers(), PENDING_COOKIE).unwrap();
    assert_eq!(pending_id.len(), PENDING_ID_LEN);
    let marker = pending.get(&pending_id).await.unwrap().unwrap();
    assert_eq!(marker.user_id, user.id);
}

#[tokio::test]
async fn should_rerender_signup_when_fields_missing() {
    let resp = app(empty_db())
        .oneshot(
            post("/signup")
                .body(Body::from("username=bob&email=&password="))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("All fields are required."));
    assert!(body.contains("value=\"bob\""));
}

#[tokio::test]
async fn should_reject_signup_with_registered_email() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[users::Model {
            id: Uuid::new_v4(),
            username: "alice".to_owned(),
            email: "alice@example.com".to_owned(),
            password_hash: "$argon2id$unused".to_owned(),
            created_at: Utc::now(),
        }]])
        .into_connection();

    let resp = app(db)
        .oneshot(
            post("/signup")
                .body(Body::from(
                    "username=newname&email=alice%40example.com&password=Secur3%21pass",
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Email is already taken."));
}

#[tokio::test]
async fn should_rerender_login_for_unknown_account_without_pending_cookie() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<users::Model>::new(), Vec::new()])
        .into_connection();

    let resp = app(db)
        .oneshot(
            post("/login")
                .body(Body::from("identifier=nobody&password=Secur3%21pass"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(set_cookie_value(resp.headers(), PENDING_COOKIE).is_none());
    assert!(set_cookie_value(resp.headers(), SESSION_COOKIE).is_none());
    let body = body_text(resp).await;
    assert!(body.contains("Incorrect email or password. Please try again."));
}
