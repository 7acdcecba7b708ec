//! Integration tests for the API pipeline
//!
//! Runs `ApiClient` with a real `TokenManager`/`IdentityClient` pair against
//! a mock identity provider and a mock API gateway on the same server.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use tracing_subscriber::fmt::MakeWriter;
use zsdk_common::auth::{IdentityClient, TokenManager};
use zsdk_domain::{CacheSettings, Credentials, HttpSettings, LoggingConfig, SdkConfig, SdkError};
use zsdk_infra::ApiClient;

const TOKEN_PATH: &str = "/oauth2/v1/token";
const USERS_PATH: &str = "/zia/api/v1/users";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct User {
    id: u32,
    name: String,
}

fn credentials(server: &MockServer) -> Credentials {
    Credentials::new("client-123", "s3cr3t", "acme")
        .with_token_url(format!("{}{TOKEN_PATH}", server.uri()))
}

async fn mount_token_endpoint(server: &MockServer, expected_calls: u64) {
    let issued = Arc::new(AtomicUsize::new(0));
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(move |_req: &wiremock::Request| -> ResponseTemplate {
            let n = issued.fetch_add(1, Ordering::SeqCst) + 1;
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token_type": "Bearer",
                "access_token": format!("token-{n}"),
                "expires_in": 3600
            }))
        })
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn client(server: &MockServer) -> ApiClient {
    let identity = IdentityClient::new(credentials(server));
    ApiClient::builder()
        .base_url(server.uri())
        .auth(Arc::new(TokenManager::new(identity)))
        .http_settings(HttpSettings {
            base_backoff: Duration::from_millis(5),
            ..HttpSettings::default()
        })
        .build()
        .expect("api client")
}

fn users(ids: &[u32]) -> Vec<User> {
    ids.iter().map(|&id| User { id, name: format!("user-{id}") }).collect()
}

/// Validates a cached GET never reaches the network or the identity
/// provider.
///
/// # Test Steps
/// 1. Mount a users endpoint expecting exactly one call
/// 2. GET the same page three times
/// 3. Verify identical bodies and a single token exchange
#[tokio::test]
async fn test_cached_get_skips_network() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(USERS_PATH))
        .and(query_param("page", "1"))
        .and(header("Authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(users(&[1, 2])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    for _ in 0..3 {
        let page: Vec<User> = client.get_json(USERS_PATH, &[("page", "1")]).await.unwrap();
        assert_eq!(page, users(&[1, 2]));
    }
}

/// Validates a POST to a collection invalidates every cached page of it.
///
/// # Test Steps
/// 1. Cache two pages of `/users` and one page of `/groups`
/// 2. POST a new user
/// 3. Verify both `/users` pages are fetched again and `/groups` is not
#[tokio::test]
async fn test_post_invalidates_collection_pages() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;
    for page in ["1", "2"] {
        Mock::given(method("GET"))
            .and(path(USERS_PATH))
            .and(query_param("page", page))
            .respond_with(ResponseTemplate::new(200).set_body_json(users(&[1])))
            .expect(2)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/zia/api/v1/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<User>::new()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(USERS_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(User { id: 3, name: "user-3".into() }),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    for _ in 0..2 {
        let _: Vec<User> = client.get_json(USERS_PATH, &[("page", "1")]).await.unwrap();
        let _: Vec<User> = client.get_json(USERS_PATH, &[("page", "2")]).await.unwrap();
        let _: Vec<User> = client.get_json("/zia/api/v1/groups", &[]).await.unwrap();
    }

    let created: User =
        client.post_json(USERS_PATH, &User { id: 3, name: "user-3".into() }).await.unwrap();
    assert_eq!(created.id, 3);

    let _: Vec<User> = client.get_json(USERS_PATH, &[("page", "1")]).await.unwrap();
    let _: Vec<User> = client.get_json(USERS_PATH, &[("page", "2")]).await.unwrap();
    let _: Vec<User> = client.get_json("/zia/api/v1/groups", &[]).await.unwrap();
}

/// Validates a 401 triggers exactly one re-authentication and one retry.
///
/// # Test Steps
/// 1. Reject the first token, accept the second
/// 2. GET once
/// 3. Verify two token exchanges and a successful result
#[tokio::test]
async fn test_unauthorized_reauthenticates_once() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 2).await;
    Mock::given(method("GET"))
        .and(path(USERS_PATH))
        .and(header("Authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(USERS_PATH))
        .and(header("Authorization", "Bearer token-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(users(&[7])))
        .expect(1)
        .mount(&server)
        .await;

    let page: Vec<User> = client(&server).get_json(USERS_PATH, &[]).await.unwrap();
    assert_eq!(page, users(&[7]));
}

/// Validates a persistent 401 surfaces as an auth error after one retry.
#[tokio::test]
async fn test_persistent_unauthorized_is_auth_error() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 2).await;
    Mock::given(method("GET"))
        .and(path(USERS_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("revoked"))
        .expect(2)
        .mount(&server)
        .await;

    let err = client(&server).get_json::<Value>(USERS_PATH, &[]).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(err.to_string().contains("revoked"));
}

/// Validates a 429 carrying `Retry-After: 0` is retried.
#[tokio::test]
async fn test_rate_limited_request_is_retried() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;
    let attempts = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&attempts);
    Mock::given(method("GET"))
        .and(path(USERS_PATH))
        .respond_with(move |_req: &wiremock::Request| -> ResponseTemplate {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                ResponseTemplate::new(429).insert_header("Retry-After", "0")
            } else {
                ResponseTemplate::new(200).set_body_json(users(&[1]))
            }
        })
        .expect(2)
        .mount(&server)
        .await;

    let page: Vec<User> = client(&server).get_json(USERS_PATH, &[]).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

/// Validates cancellation aborts an in-flight call.
///
/// # Test Steps
/// 1. Mount an endpoint that answers after two seconds
/// 2. Cancel the client's token 50ms into the call
/// 3. Verify `SdkError::Cancelled` well before the response would arrive
#[tokio::test]
async fn test_cancellation_aborts_in_flight_call() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(USERS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(users(&[1]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = client(&server);
    let token = client.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let started = std::time::Instant::now();
    let err = client.get_json::<Value>(USERS_PATH, &[]).await.unwrap_err();

    assert_eq!(err, SdkError::Cancelled);
    assert!(started.elapsed() < Duration::from_secs(1));
}

/// Validates pagination collects every page through the cache-aware
/// pipeline.
#[tokio::test]
async fn test_get_all_pages_collects_every_page() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(USERS_PATH))
        .and(query_param("page", "1"))
        .and(query_param("search", "eng team"))
        .respond_with(ResponseTemplate::new(200).set_body_json(users(&[1, 2])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(USERS_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<User>::new()))
        .expect(1)
        .mount(&server)
        .await;

    let all: Vec<User> = client(&server)
        .get_all_pages(USERS_PATH, &[("search", "eng team")], Some(2))
        .await
        .unwrap();
    assert_eq!(all, users(&[1, 2]));
}

/// Validates a client built from configuration authenticates with the
/// configured credentials and honours the disabled cache.
#[tokio::test]
async fn test_from_config_with_disabled_cache() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(USERS_PATH))
        .and(header("user-agent", "zsdk-tests/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(users(&[5])))
        .expect(2)
        .mount(&server)
        .await;

    let mut config = SdkConfig::new(credentials(&server));
    config.cache = CacheSettings::disabled();
    config.http.base_url = Some(server.uri());
    config.http.user_agent = Some("zsdk-tests/1.0".into());

    let client = ApiClient::from_config(config).unwrap();
    for _ in 0..2 {
        let page: Vec<User> = client.get_json(USERS_PATH, &[]).await.unwrap();
        assert_eq!(page, users(&[5]));
    }
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Validates verbose logging covers the token exchange with secrets masked.
///
/// # Test Steps
/// 1. Build a client from configuration with verbose logging
/// 2. GET once, which first exchanges credentials for a token
/// 3. Verify the token POST and its response were logged and redacted
#[tokio::test]
async fn test_verbose_logging_covers_token_exchange() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(USERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(users(&[1])))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = SdkConfig::new(credentials(&server));
    config.http.base_url = Some(server.uri());
    config.logging = LoggingConfig::new(true, true);

    let out = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(out.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let client = ApiClient::from_config(config).unwrap();
    let _: Vec<User> = client.get_json(USERS_PATH, &[]).await.unwrap();

    let output = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains(TOKEN_PATH), "token request not logged: {output}");
    assert!(output.contains("grant_type=client_credentials"));
    assert!(output.contains("client_secret=***"));
    assert!(!output.contains("s3cr3t"));
    assert!(!output.contains("token-1"));
}
