//! Session gate against a real HTTP server (wiremock).

use std::path::Path;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sessiongate_core::api::AuthBackend;
use sessiongate_core::auth::{FileStore, Session, TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use sessiongate_core::gate::{
    GateDecision, SessionGate, SERVER_UNREACHABLE_MESSAGE, SIGNUP_FAILED_MESSAGE, SIGNUP_SUCCESS_MESSAGE,
};
use sessiongate_core::{Config, Credentials, NoticeKind, View, ViewModel};

fn config_for(base: &str) -> Config {
    Config {
        base_url: format!("{}/api/accounts", base),
        request_timeout_secs: 5,
        ..Config::default()
    }
}

fn gate_for(config: &Config, dir: &Path) -> SessionGate {
    let backend = AuthBackend::from_config(config).expect("backend");
    SessionGate::new(backend, Session::new(Box::new(FileStore::new(dir))))
}

fn seed_tokens(dir: &Path, access: &str, refresh: &str) {
    let mut store = FileStore::new(dir);
    store.set(ACCESS_TOKEN_KEY, access).unwrap();
    store.set(REFRESH_TOKEN_KEY, refresh).unwrap();
}

fn stored(dir: &Path, key: &str) -> Option<String> {
    FileStore::new(dir).get(key).unwrap()
}

/// Address nothing is listening on.
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn no_token_redirects_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/accounts/dashboard/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server.uri());
    let mut gate = gate_for(&config, dir.path());
    let mut view = ViewModel::new(&config);
    view.show_dashboard();

    let decision = gate.check_session(&mut view).await.unwrap();

    assert_eq!(decision, GateDecision::RedirectToLogin);
    assert_eq!(view.view, View::Login);
    assert!(view.welcome.is_none());
}

#[tokio::test]
async fn successful_login_persists_tokens_and_opens_dashboard() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/accounts/login/"))
        .and(body_json(json!({"username": "ayan", "password": "123456"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "A", "refresh": "R"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/accounts/dashboard/"))
        .and(header("authorization", "Bearer A"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Welcome ayan"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server.uri());
    let mut gate = gate_for(&config, dir.path());
    let mut view = ViewModel::new(&config);

    gate.login(&mut view, Credentials::new("ayan", "123456"))
        .await
        .unwrap();

    assert_eq!(stored(dir.path(), ACCESS_TOKEN_KEY).as_deref(), Some("A"));
    assert_eq!(stored(dir.path(), REFRESH_TOKEN_KEY).as_deref(), Some("R"));
    assert_eq!(view.view, View::Dashboard);
    assert_eq!(view.welcome.as_deref(), Some("Welcome ayan"));
    assert!(!view.pending);
}

#[tokio::test]
async fn rejected_login_shows_server_error_and_stores_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/accounts/login/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "bad credentials"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server.uri());
    let mut gate = gate_for(&config, dir.path());
    let mut view = ViewModel::new(&config);

    gate.login(&mut view, Credentials::new("ayan", "wrong"))
        .await
        .unwrap();

    let notice = view.notice().expect("error notice");
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.text, "bad credentials");
    assert_eq!(view.view, View::Login);
    assert_eq!(stored(dir.path(), ACCESS_TOKEN_KEY), None);
    assert_eq!(stored(dir.path(), REFRESH_TOKEN_KEY), None);
}

#[tokio::test]
async fn rejected_login_without_error_field_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/accounts/login/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server.uri());
    let mut gate = gate_for(&config, dir.path());
    let mut view = ViewModel::new(&config);

    gate.login(&mut view, Credentials::new("ayan", "pw"))
        .await
        .unwrap();

    assert_eq!(view.notice().unwrap().text, "Login failed");
}

#[tokio::test]
async fn login_success_without_tokens_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/accounts/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Login successful"})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server.uri());
    let mut gate = gate_for(&config, dir.path());
    let mut view = ViewModel::new(&config);

    gate.login(&mut view, Credentials::new("ayan", "pw"))
        .await
        .unwrap();

    assert_eq!(view.notice().unwrap().kind, NoticeKind::Error);
    assert_eq!(view.view, View::Login);
    assert_eq!(stored(dir.path(), ACCESS_TOKEN_KEY), None);
}

#[tokio::test]
async fn login_with_empty_access_token_stores_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/accounts/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "", "refresh": "R"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/accounts/dashboard/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server.uri());
    let mut gate = gate_for(&config, dir.path());
    let mut view = ViewModel::new(&config);

    gate.login(&mut view, Credentials::new("ayan", "pw"))
        .await
        .unwrap();

    let notice = view.notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.text, "Login failed");
    assert_eq!(view.view, View::Login);
    assert_eq!(stored(dir.path(), ACCESS_TOKEN_KEY), None);
    assert_eq!(stored(dir.path(), REFRESH_TOKEN_KEY), None);
}

#[tokio::test]
async fn unauthorized_dashboard_clears_tokens_and_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/accounts/dashboard/"))
        .and(header("authorization", "Bearer expired"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token is invalid or expired"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    seed_tokens(dir.path(), "expired", "R");
    let config = config_for(&server.uri());
    let mut gate = gate_for(&config, dir.path());
    let mut view = ViewModel::new(&config);

    let decision = gate.check_session(&mut view).await.unwrap();

    assert_eq!(decision, GateDecision::RedirectToLogin);
    assert_eq!(view.view, View::Login);
    assert_eq!(stored(dir.path(), ACCESS_TOKEN_KEY), None);
    assert_eq!(stored(dir.path(), REFRESH_TOKEN_KEY), None);
    assert!(view.notice().is_none());
}

#[tokio::test]
async fn valid_token_loads_dashboard_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/accounts/dashboard/"))
        .and(header("authorization", "Bearer A"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Hello, ayan"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    seed_tokens(dir.path(), "A", "R");
    let config = config_for(&server.uri());
    let mut gate = gate_for(&config, dir.path());
    let mut view = ViewModel::new(&config);

    let decision = gate.check_session(&mut view).await.unwrap();

    assert_eq!(decision, GateDecision::Proceed);
    assert_eq!(view.view, View::Dashboard);
    assert_eq!(view.welcome.as_deref(), Some("Hello, ayan"));
    assert_eq!(stored(dir.path(), ACCESS_TOKEN_KEY).as_deref(), Some("A"));
}

#[tokio::test]
async fn dashboard_server_error_keeps_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/accounts/dashboard/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    seed_tokens(dir.path(), "A", "R");
    let config = config_for(&server.uri());
    let mut gate = gate_for(&config, dir.path());
    let mut view = ViewModel::new(&config);

    let decision = gate.check_session(&mut view).await.unwrap();

    assert_eq!(decision, GateDecision::Proceed);
    assert_eq!(view.view, View::Dashboard);
    assert!(view.welcome.is_none());
    assert_eq!(stored(dir.path(), ACCESS_TOKEN_KEY).as_deref(), Some("A"));
}

#[tokio::test]
async fn unreachable_server_shows_fixed_message_and_keeps_tokens() {
    let dir = tempfile::tempdir().unwrap();
    seed_tokens(dir.path(), "prev-A", "prev-R");
    let config = config_for(&closed_port_url());
    let mut gate = gate_for(&config, dir.path());
    let mut view = ViewModel::new(&config);

    gate.login(&mut view, Credentials::new("ayan", "123456"))
        .await
        .unwrap();

    assert_eq!(view.notice().unwrap().text, SERVER_UNREACHABLE_MESSAGE);
    assert_eq!(stored(dir.path(), ACCESS_TOKEN_KEY).as_deref(), Some("prev-A"));
    assert_eq!(stored(dir.path(), REFRESH_TOKEN_KEY).as_deref(), Some("prev-R"));
    assert!(!view.pending);
}

#[tokio::test]
async fn logout_clears_tokens_whatever_was_stored() {
    let config = config_for(&closed_port_url());

    // Both present
    let dir = tempfile::tempdir().unwrap();
    seed_tokens(dir.path(), "A", "R");
    let mut gate = gate_for(&config, dir.path());
    let mut view = ViewModel::new(&config);
    view.show_dashboard();
    view.welcome = Some("Welcome".to_string());
    gate.logout(&mut view).unwrap();
    assert_eq!(stored(dir.path(), ACCESS_TOKEN_KEY), None);
    assert_eq!(stored(dir.path(), REFRESH_TOKEN_KEY), None);
    assert_eq!(view.view, View::Login);
    assert!(view.welcome.is_none());

    // Only the refresh token
    let dir = tempfile::tempdir().unwrap();
    FileStore::new(dir.path()).set(REFRESH_TOKEN_KEY, "R").unwrap();
    let mut gate = gate_for(&config, dir.path());
    gate.logout(&mut view).unwrap();
    assert_eq!(stored(dir.path(), REFRESH_TOKEN_KEY), None);

    // Nothing stored
    let dir = tempfile::tempdir().unwrap();
    let mut gate = gate_for(&config, dir.path());
    gate.logout(&mut view).unwrap();
    assert_eq!(stored(dir.path(), ACCESS_TOKEN_KEY), None);
    assert_eq!(view.view, View::Login);
}

#[tokio::test]
async fn signup_success_switches_to_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/accounts/signup/"))
        .and(body_json(json!({"username": "ayan", "password": "123456"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "User created successfully"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server.uri());
    let mut gate = gate_for(&config, dir.path());
    let mut view = ViewModel::new(&config);
    view.show_signup();

    gate.signup(&mut view, Credentials::new("ayan", "123456")).await;

    assert_eq!(view.view, View::Login);
    let notice = view.notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::Success);
    assert_eq!(notice.text, "User created successfully");
    assert_eq!(view.login_form.username, "ayan");
    assert_eq!(stored(dir.path(), ACCESS_TOKEN_KEY), None);
}

#[tokio::test]
async fn signup_success_without_message_uses_default_confirmation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/accounts/signup/"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server.uri());
    let mut gate = gate_for(&config, dir.path());
    let mut view = ViewModel::new(&config);
    view.show_signup();

    gate.signup(&mut view, Credentials::new("ayan", "123456")).await;

    assert_eq!(view.notice().unwrap().text, SIGNUP_SUCCESS_MESSAGE);
}

#[tokio::test]
async fn signup_failure_shows_server_error_and_stays_on_signup() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/accounts/signup/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "User already exists"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server.uri());
    let mut gate = gate_for(&config, dir.path());
    let mut view = ViewModel::new(&config);
    view.show_signup();

    gate.signup(&mut view, Credentials::new("ayan", "123456")).await;

    assert_eq!(view.view, View::Signup);
    let notice = view.notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.text, "User already exists");
}

#[tokio::test]
async fn logout_discards_corrupt_token_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/accounts/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "A", "refresh": "R"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/accounts/dashboard/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Welcome, ayan!"})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let token_file = FileStore::new(dir.path()).path().to_path_buf();
    std::fs::write(&token_file, r#"{"access_token": "A""#).unwrap();

    let config = config_for(&server.uri());
    let mut gate = gate_for(&config, dir.path());
    let mut view = ViewModel::new(&config);

    gate.logout(&mut view).unwrap();
    assert!(!token_file.exists());
    assert_eq!(view.view, View::Login);

    // Logging in again works
    gate.login(&mut view, Credentials::new("ayan", "pw"))
        .await
        .unwrap();
    assert_eq!(view.view, View::Dashboard);
    assert_eq!(stored(dir.path(), ACCESS_TOKEN_KEY).as_deref(), Some("A"));
}

#[tokio::test]
async fn signup_rejected_without_error_field_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/accounts/signup/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server.uri());
    let mut gate = gate_for(&config, dir.path());
    let mut view = ViewModel::new(&config);
    view.show_signup();

    gate.signup(&mut view, Credentials::new("ayan", "123456")).await;

    assert_eq!(view.view, View::Signup);
    let notice = view.notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.text, SIGNUP_FAILED_MESSAGE);
}

#[tokio::test]
async fn signup_unreachable_server_shows_fixed_message() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&closed_port_url());
    let mut gate = gate_for(&config, dir.path());
    let mut view = ViewModel::new(&config);
    view.show_signup();

    gate.signup(&mut view, Credentials::new("ayan", "123456")).await;

    assert_eq!(view.view, View::Signup);
    let notice = view.notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.text, SERVER_UNREACHABLE_MESSAGE);
    assert!(!view.pending);
}
