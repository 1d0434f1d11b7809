#![allow(clippy::unwrap_used)]
// Integration tests for `MawaqitClient` using wiremock.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{basic_auth, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mawaqit_api::{Credentials, Error, MawaqitClient, Token, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

const API_ROOT: &str = "/api/2.0";
const MOSQUE_UUID: &str = "0b1f9f3e-5a1d-4c55-9c36-3a7f2a4b6c01";

fn api_path(suffix: &str) -> String {
    format!("{API_ROOT}/{suffix}")
}

fn login() -> Credentials {
    Credentials::Login {
        username: "imam@example.org".into(),
        password: SecretString::from("s3cret".to_string()),
    }
}

async fn setup(credentials: Option<Credentials>) -> (MockServer, MawaqitClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}{API_ROOT}", server.uri())).unwrap();
    let client = MawaqitClient::new(base_url, credentials, TransportConfig::default());
    (server, client)
}

fn prayer_times_body() -> serde_json::Value {
    json!({
        "timezone": "Europe/Paris",
        "jumua": "13:30",
        "jumua2": null,
        "calendar": [
            { "1": ["06:48", "08:40", "12:56", "14:50", "17:07", "18:50"] }
        ],
        "iqamaCalendar": [
            { "1": ["+15", "+10", "+10", "+5", "+10"] }
        ]
    })
}

async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path(api_path("me")))
        .and(basic_auth("imam@example.org", "s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "apiAccessToken": token })))
        .mount(server)
        .await;
}

// ── Token issuance ──────────────────────────────────────────────────

#[tokio::test]
async fn test_issue_token_success() {
    let (server, client) = setup(None).await;
    mount_login(&server, "tok-1").await;

    let token = client
        .issue_token("imam@example.org", &SecretString::from("s3cret".to_string()))
        .await
        .unwrap();
    assert_eq!(token.expose(), "tok-1");
}

#[tokio::test]
async fn test_issue_token_wrong_password() {
    let (server, client) = setup(None).await;

    Mock::given(method("GET"))
        .and(path(api_path("me")))
        .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
        .expect(1)
        .mount(&server)
        .await;

    let result = client
        .issue_token("imam@example.org", &SecretString::from("wrong".to_string()))
        .await;

    assert!(
        matches!(result, Err(Error::BadCredentials { .. })),
        "expected BadCredentials, got: {result:?}"
    );
}

#[tokio::test]
async fn test_resolve_token_without_credentials() {
    let (_server, client) = setup(None).await;
    let result = client.resolve_token().await;
    assert!(matches!(result, Err(Error::BadCredentials { .. })));
}

#[tokio::test]
async fn test_configured_token_skips_login() {
    let (server, client) = setup(Some(Credentials::Token(Token::new("preissued")))).await;

    Mock::given(method("GET"))
        .and(path(api_path("me")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(api_path(&format!("mosque/{MOSQUE_UUID}/prayer-times"))))
        .and(header("Api-Access-Token", "preissued"))
        .respond_with(ResponseTemplate::new(200).set_body_json(prayer_times_body()))
        .expect(1)
        .mount(&server)
        .await;

    let times = client.fetch_calendar(MOSQUE_UUID, None).await.unwrap();
    assert_eq!(times.timezone.as_deref(), Some("Europe/Paris"));
}

#[tokio::test]
async fn test_issued_token_is_reused() {
    let (server, client) = setup(Some(login())).await;

    Mock::given(method("GET"))
        .and(path(api_path("me")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "apiAccessToken": "tok-1" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(api_path(&format!("mosque/{MOSQUE_UUID}/prayer-times"))))
        .and(header("Api-Access-Token", "tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(prayer_times_body()))
        .expect(2)
        .mount(&server)
        .await;

    client.fetch_calendar(MOSQUE_UUID, None).await.unwrap();
    client.fetch_calendar(MOSQUE_UUID, None).await.unwrap();
}

#[tokio::test]
async fn test_expired_issued_token_is_refreshed_once() {
    let (server, client) = setup(Some(login())).await;

    Mock::given(method("GET"))
        .and(path(api_path("me")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "apiAccessToken": "old" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("me")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "apiAccessToken": "new" })))
        .mount(&server)
        .await;

    let calendar_path = api_path(&format!("mosque/{MOSQUE_UUID}/prayer-times"));
    // "old" works once, then expires.
    Mock::given(method("GET"))
        .and(path(calendar_path.clone()))
        .and(header("Api-Access-Token", "old"))
        .respond_with(ResponseTemplate::new(200).set_body_json(prayer_times_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(calendar_path.clone()))
        .and(header("Api-Access-Token", "old"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(calendar_path))
        .and(header("Api-Access-Token", "new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(prayer_times_body()))
        .expect(1)
        .mount(&server)
        .await;

    client.fetch_calendar(MOSQUE_UUID, None).await.unwrap();
    client.fetch_calendar(MOSQUE_UUID, None).await.unwrap();
}

#[tokio::test]
async fn test_rejected_configured_token_is_bad_credentials() {
    let (server, client) = setup(Some(Credentials::Token(Token::new("revoked")))).await;

    Mock::given(method("GET"))
        .and(path(api_path(&format!("mosque/{MOSQUE_UUID}/prayer-times"))))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.fetch_calendar(MOSQUE_UUID, None).await;
    assert!(matches!(result, Err(Error::BadCredentials { .. })));
}

// ── Mosque search ───────────────────────────────────────────────────

#[tokio::test]
async fn test_lookup_preserves_service_order() {
    let (server, client) = setup(None).await;

    Mock::given(method("GET"))
        .and(path(api_path("mosque/search")))
        .and(query_param("lat", "48.8566"))
        .and(query_param("lon", "2.3522"))
        .and(header("Api-Access-Token", "explicit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "uuid": "far", "name": "Far Mosque", "proximity": 9000.0 },
            { "uuid": "near", "name": "Near Mosque", "slug": "near-mosque", "proximity": 120.0 }
        ])))
        .mount(&server)
        .await;

    let token = Token::new("explicit");
    let mosques = client
        .lookup_mosques_nearby(48.8566, 2.3522, None, Some(&token))
        .await
        .unwrap();

    let uuids: Vec<_> = mosques.iter().map(|m| m.uuid.as_str()).collect();
    assert_eq!(uuids, ["far", "near"]);
    assert_eq!(mosques[1].slug.as_deref(), Some("near-mosque"));
}

#[tokio::test]
async fn test_lookup_passes_hint() {
    let (server, client) = setup(None).await;

    Mock::given(method("GET"))
        .and(path(api_path("mosque/search")))
        .and(query_param("word", "grande-mosquee"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "uuid": "gm", "name": "Grande Mosquee", "slug": "grande-mosquee" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let token = Token::new("explicit");
    let mosques = client
        .lookup_mosques_nearby(48.8566, 2.3522, Some(" grande-mosquee "), Some(&token))
        .await
        .unwrap();
    assert_eq!(mosques.len(), 1);
}

// ── Calendar ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_calendar_parses_body() {
    let (server, client) = setup(Some(login())).await;
    mount_login(&server, "tok-1").await;

    Mock::given(method("GET"))
        .and(path(api_path(&format!("mosque/{MOSQUE_UUID}/prayer-times"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(prayer_times_body()))
        .mount(&server)
        .await;

    let times = client.fetch_calendar(MOSQUE_UUID, None).await.unwrap();
    assert_eq!(times.jumua.as_deref(), Some("13:30"));
    assert_eq!(times.jumua2, None);
    assert_eq!(times.day_times(0, 1).unwrap()[2], "12:56");
    assert_eq!(times.day_iqama(0, 1).unwrap()[0], "+15");
}

// ── Error mapping ───────────────────────────────────────────────────

#[tokio::test]
async fn test_server_error_is_transient() {
    let (server, client) = setup(None).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let result = client
        .fetch_calendar(MOSQUE_UUID, Some(&Token::new("t")))
        .await;
    let err = result.unwrap_err();
    assert!(
        matches!(err, Error::Server { status: 503, .. }),
        "expected Server error, got: {err:?}"
    );
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_unknown_mosque_is_rejected() {
    let (server, client) = setup(None).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Mosque not found"))
        .mount(&server)
        .await;

    let result = client
        .fetch_calendar("missing", Some(&Token::new("t")))
        .await;
    let err = result.unwrap_err();
    assert!(err.is_not_found(), "expected 404 rejection, got: {err:?}");
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_malformed_body() {
    let (server, client) = setup(None).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "times": ["05:00"] })))
        .mount(&server)
        .await;

    let result = client
        .fetch_calendar(MOSQUE_UUID, Some(&Token::new("t")))
        .await;
    match result {
        Err(Error::MalformedResponse { ref message, ref body }) => {
            assert!(message.contains("calendar"), "unexpected message: {message}");
            assert!(body.contains("times"));
        }
        other => panic!("expected MalformedResponse, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_timeout_maps_to_timeout_error() {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}{API_ROOT}", server.uri())).unwrap();
    let client = MawaqitClient::new(
        base_url,
        None,
        TransportConfig::default().with_timeout(Duration::from_millis(200)),
    );

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(prayer_times_body())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let result = client
        .fetch_calendar(MOSQUE_UUID, Some(&Token::new("t")))
        .await;
    let err = result.unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }), "expected Timeout, got: {err:?}");
    assert!(err.is_transient());
}
