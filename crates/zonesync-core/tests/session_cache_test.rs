// Integration tests for `SessionCache` against a wiremock controller.
#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use zonesync_api::transport::TransportConfig;
use zonesync_api::{ControllerClient, Credential, CredentialKind};
use zonesync_core::{CoreError, SessionCache};

// ── Helpers ─────────────────────────────────────────────────────────

const BASE: &str = "/wsg/api/public/v11_1";

fn p(suffix: &str) -> String {
    format!("{BASE}/{suffix}")
}

fn client(server: &MockServer) -> ControllerClient {
    ControllerClient::new(
        Url::parse(&format!("{}{BASE}", server.uri())).unwrap(),
        "admin",
        SecretString::from("s3cret".to_owned()),
        &TransportConfig::default(),
    )
    .unwrap()
}

/// Hands out `JSESSIONID=s1`, `JSESSIONID=s2`, ... one per login.
struct NumberedSessions(AtomicUsize);

impl Respond for NumberedSessions {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let n = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        ResponseTemplate::new(200)
            .insert_header("Set-Cookie", format!("JSESSIONID=s{n}; Path=/wsg; HttpOnly").as_str())
            .set_body_json(json!({ "controllerVersion": "6.1.2" }))
    }
}

async fn mount_login(server: &MockServer, expected: u64, delay: Duration) {
    Mock::given(method("POST"))
        .and(path(p("session")))
        .respond_with(NumberedSessionsDelayed {
            inner: NumberedSessions(AtomicUsize::new(0)),
            delay,
        })
        .expect(expected)
        .mount(server)
        .await;
}

struct NumberedSessionsDelayed {
    inner: NumberedSessions,
    delay: Duration,
}

impl Respond for NumberedSessionsDelayed {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        self.inner.respond(request).set_delay(self.delay)
    }
}

fn cache(server: &MockServer, ttl: Duration) -> Arc<SessionCache> {
    Arc::new(SessionCache::new(client(server), CredentialKind::Cookie, ttl))
}

// ── Single-flight refresh ───────────────────────────────────────────

#[tokio::test]
async fn test_concurrent_callers_share_one_login() {
    let server = MockServer::start().await;
    mount_login(&server, 1, Duration::from_millis(200)).await;
    let cache = cache(&server, Duration::from_secs(300));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.get_valid().await.unwrap() })
        })
        .collect();

    let mut sessions = Vec::new();
    for h in handles {
        sessions.push(h.await.unwrap());
    }

    for s in &sessions {
        assert!(Arc::ptr_eq(s, &sessions[0]));
        assert_eq!(s.credential().expose(), "JSESSIONID=s1");
    }
}

#[tokio::test]
async fn test_fresh_credential_is_reused() {
    let server = MockServer::start().await;
    mount_login(&server, 1, Duration::ZERO).await;
    let cache = cache(&server, Duration::from_secs(300));

    let a = cache.get_valid().await.unwrap();
    let b = cache.get_valid().await.unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(cache.peek().is_some());
}

#[tokio::test]
async fn test_expired_credential_triggers_exactly_one_new_login() {
    let server = MockServer::start().await;
    mount_login(&server, 2, Duration::ZERO).await;
    let cache = cache(&server, Duration::from_millis(100));

    let first = cache.get_valid().await.unwrap();
    assert_eq!(first.credential().expose(), "JSESSIONID=s1");

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(cache.peek().is_none());

    let second = cache.get_valid().await.unwrap();
    let third = cache.get_valid().await.unwrap();
    assert_eq!(second.credential().expose(), "JSESSIONID=s2");
    assert!(Arc::ptr_eq(&second, &third));
}

// ── Invalidation ────────────────────────────────────────────────────

#[tokio::test]
async fn test_invalidate_forces_login() {
    let server = MockServer::start().await;
    mount_login(&server, 2, Duration::ZERO).await;
    let cache = cache(&server, Duration::from_secs(300));

    cache.get_valid().await.unwrap();
    cache.invalidate();
    assert!(cache.peek().is_none());
    let renewed = cache.get_valid().await.unwrap();
    assert_eq!(renewed.credential().expose(), "JSESSIONID=s2");
}

#[tokio::test]
async fn test_stale_holder_cannot_evict_new_credential() {
    let server = MockServer::start().await;
    mount_login(&server, 2, Duration::ZERO).await;
    let cache = cache(&server, Duration::from_secs(300));

    let stale = cache.get_valid().await.unwrap();
    cache.invalidate();
    let fresh = cache.get_valid().await.unwrap();

    assert!(!cache.invalidate_if_current(&stale));
    assert!(Arc::ptr_eq(&cache.peek().unwrap(), &fresh));

    assert!(cache.invalidate_if_current(&fresh));
    assert!(cache.peek().is_none());
}

// ── Failure handling ────────────────────────────────────────────────

#[tokio::test]
async fn test_failed_login_propagates_and_leaves_cache_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(p("session")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Login failed", "errorCode": 202
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_login(&server, 1, Duration::ZERO).await;
    let cache = cache(&server, Duration::from_secs(300));

    let err = cache.get_valid().await.unwrap_err();
    assert!(matches!(err, CoreError::SessionUnavailable { .. }), "got {err:?}");
    assert!(err.is_authorization());
    assert!(err.upstream_body().unwrap().contains("Login failed"));
    assert!(cache.peek().is_none());

    // The next call tries again.
    let ok = cache.get_valid().await.unwrap();
    assert_eq!(ok.credential().expose(), "JSESSIONID=s1");
}

#[tokio::test]
async fn test_authorization_failure_evicts_session() {
    let server = MockServer::start().await;
    mount_login(&server, 2, Duration::ZERO).await;
    Mock::given(method("GET"))
        .and(path(p("rkszones")))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "No active session", "errorCode": 201
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(p("rkszones")))
        .and(header("cookie", "JSESSIONID=s2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalCount": 0, "hasMore": false, "firstIndex": 0, "list": []
        })))
        .mount(&server)
        .await;

    let cache = cache(&server, Duration::from_secs(300));
    let api = client(&server);

    let err = cache
        .authenticated(|c| {
            let api = api.clone();
            async move { api.list_zones(&c).await }
        })
        .await
        .unwrap_err();
    assert!(err.is_authorization());
    assert!(cache.peek().is_none());

    let zones = cache
        .authenticated(|c| {
            let api = api.clone();
            async move { api.list_zones(&c).await }
        })
        .await
        .unwrap();
    assert_eq!(zones.total_count, 0);
}

#[tokio::test]
async fn test_other_failures_keep_session() {
    let server = MockServer::start().await;
    mount_login(&server, 1, Duration::ZERO).await;
    Mock::given(method("GET"))
        .and(path(p("rkszones")))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let cache = cache(&server, Duration::from_secs(300));
    let api = client(&server);
    let err = cache
        .authenticated(|c| async move { api.list_zones(&c).await })
        .await
        .unwrap_err();
    assert!(!err.is_authorization());
    assert!(cache.peek().is_some());
}

// ── Close ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_close_logs_out_cookie_session() {
    let server = MockServer::start().await;
    mount_login(&server, 1, Duration::ZERO).await;
    Mock::given(method("DELETE"))
        .and(path(p("session")))
        .and(header("cookie", "JSESSIONID=s1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let cache = cache(&server, Duration::from_secs(300));
    cache.get_valid().await.unwrap();
    cache.close().await;
    assert!(cache.peek().is_none());

    // Nothing cached: no second logout.
    cache.close().await;
}

#[tokio::test]
async fn test_ticket_cache_creates_and_deletes_tickets() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(p("serviceTicket")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "controllerVersion": "6.1.2", "serviceTicket": "ST-42-cas"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(p("serviceTicket")))
        .and(query_param("serviceTicket", "ST-42-cas"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let cache = SessionCache::new(client(&server), CredentialKind::Ticket, Duration::from_secs(300));
    let session = cache.get_valid().await.unwrap();
    assert!(matches!(session.credential(), Credential::Ticket(_)));
    assert_eq!(cache.kind(), CredentialKind::Ticket);
    cache.close().await;
}
