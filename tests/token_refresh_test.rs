use anyhow::Result;
use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;
use timeclock::domain::photo::PhotoEvidence;
use timeclock::domain::ports::TokenStore;
use timeclock::domain::requests::{ClockEvent, GeoPoint, LoginRequest};
use timeclock::{ApiClient, ClientError, ClientSettings, MemoryTokenStore};

fn client_for(server: &MockServer, store: Arc<MemoryTokenStore>) -> Arc<ApiClient> {
    let settings = ClientSettings::with_base_url(server.base_url());
    Arc::new(ApiClient::new(&settings, store).unwrap())
}

fn profile_json() -> serde_json::Value {
    json!({
        "id": 1,
        "email": "ana@example.com",
        "name": "Ana",
        "role": "employee"
    })
}

/// 多個請求同時收到 401 時只應觸發一次 refresh
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_unauthorized_requests_share_one_refresh() -> Result<()> {
    let server = MockServer::start_async().await;

    let expired = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/auth/profile")
                .header("Authorization", "Bearer old-access");
            then.status(401).json_body(json!({"message": "Token expired"}));
        })
        .await;
    let fresh = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/auth/profile")
                .header("Authorization", "Bearer new-access");
            then.status(200).json_body(profile_json());
        })
        .await;
    let refresh = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/auth/refresh")
                .json_body(json!({"refresh_token": "refresh-1"}));
            then.status(200).json_body(json!({
                "access_token": "new-access",
                "refresh_token": "refresh-2"
            }));
        })
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens("old-access", "refresh-1"));
    let client = client_for(&server, store.clone());

    let mut handles = Vec::new();
    for _ in 0..6 {
        let client = client.clone();
        handles.push(tokio::spawn(async move { client.profile().await }));
    }
    for handle in handles {
        let user = handle.await??;
        assert_eq!(user.email, "ana@example.com");
    }

    refresh.assert_hits_async(1).await;
    assert_eq!(client.refresh_count(), 1);
    assert!(expired.hits_async().await >= 1);
    assert_eq!(fresh.hits_async().await, 6);

    let tokens = store.tokens().await?.unwrap();
    assert_eq!(tokens.access_token, "new-access");
    assert_eq!(tokens.refresh_token, "refresh-2");
    Ok(())
}

#[tokio::test]
async fn test_refresh_keeps_refresh_token_when_server_omits_it() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/auth/profile")
                .header("Authorization", "Bearer old-access");
            then.status(401);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/auth/profile")
                .header("Authorization", "Bearer new-access");
            then.status(200).json_body(profile_json());
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/refresh");
            then.status(200)
                .json_body(json!({"access_token": "new-access"}));
        })
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens("old-access", "refresh-1"));
    let client = client_for(&server, store.clone());

    client.profile().await?;

    let tokens = store.tokens().await?.unwrap();
    assert_eq!(tokens.access_token, "new-access");
    assert_eq!(tokens.refresh_token, "refresh-1");
    Ok(())
}

#[tokio::test]
async fn test_failed_refresh_clears_tokens_and_surfaces_original_error() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/timelogs/active");
            then.status(401).json_body(json!({"message": "Token expired"}));
        })
        .await;
    let refresh = server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/refresh");
            then.status(401)
                .json_body(json!({"message": "Refresh token revoked"}));
        })
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens("old-access", "refresh-1"));
    let client = client_for(&server, store.clone());

    let err = client.active_time_log().await.unwrap_err();
    match &err {
        ClientError::Unauthorized { message } => assert_eq!(message, "Token expired"),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.requires_login());

    refresh.assert_hits_async(1).await;
    assert!(store.tokens().await?.is_none());
    assert!(store.get("access_token").await?.is_none());
    assert!(store.get("refresh_token").await?.is_none());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_after_failed_refresh_do_not_retry_refresh() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/users");
            then.status(401).json_body(json!({"error": "Unauthorized"}));
        })
        .await;
    let refresh = server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/refresh");
            then.status(500).json_body(json!({"message": "boom"}));
        })
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens("old-access", "refresh-1"));
    let client = client_for(&server, store.clone());

    let mut handles = Vec::new();
    for _ in 0..4 {
        let client = client.clone();
        handles.push(tokio::spawn(async move { client.users().await }));
    }
    for handle in handles {
        let err = handle.await?.unwrap_err();
        assert!(err.requires_login(), "unexpected error: {:?}", err);
    }

    refresh.assert_hits_async(1).await;
    assert!(store.tokens().await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_retry_happens_only_once() -> Result<()> {
    let server = MockServer::start_async().await;

    let profile = server
        .mock_async(|when, then| {
            when.method(GET).path("/auth/profile");
            then.status(401).json_body(json!({"message": "Still expired"}));
        })
        .await;
    let refresh = server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/refresh");
            then.status(200).json_body(json!({
                "access_token": "new-access",
                "refresh_token": "refresh-2"
            }));
        })
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens("old-access", "refresh-1"));
    let client = client_for(&server, store);

    let err = client.profile().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized { .. }));
    refresh.assert_hits_async(1).await;
    profile.assert_hits_async(2).await;
    Ok(())
}

#[tokio::test]
async fn test_login_failure_does_not_refresh() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/auth/login")
                .json_body(json!({"email": "ana@example.com", "password": "wrong-pass"}));
            then.status(401)
                .json_body(json!({"message": "Invalid credentials"}));
        })
        .await;
    let refresh = server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/refresh");
            then.status(200);
        })
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens("old-access", "refresh-1"));
    let client = client_for(&server, store.clone());

    let err = client
        .login(&LoginRequest {
            email: "ana@example.com".to_string(),
            password: "wrong-pass".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.user_friendly_message(), "Invalid credentials");
    match err {
        ClientError::Unauthorized { message } => assert_eq!(message, "Invalid credentials"),
        other => panic!("unexpected error: {:?}", other),
    }
    refresh.assert_hits_async(0).await;
    // Existing session is left alone by a failed login.
    assert!(store.tokens().await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_without_stored_tokens_401_is_surfaced_directly() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/company");
            then.status(401);
        })
        .await;
    let refresh = server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/refresh");
            then.status(200);
        })
        .await;

    let client = client_for(&server, Arc::new(MemoryTokenStore::new()));

    let err = client.company().await.unwrap_err();
    match err {
        ClientError::Unauthorized { message } => assert_eq!(message, "Unauthorized"),
        other => panic!("unexpected error: {:?}", other),
    }
    refresh.assert_hits_async(0).await;
    assert!(!client.is_authenticated().await?);
    Ok(())
}

#[tokio::test]
async fn test_explicit_refresh_session() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/auth/refresh")
                .json_body(json!({"refresh_token": "refresh-1"}));
            then.status(200).json_body(json!({
                "access_token": "a2",
                "refresh_token": "r2"
            }));
        })
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens("a1", "refresh-1"));
    let client = client_for(&server, store.clone());

    let tokens = client.refresh_session().await?;
    assert_eq!(tokens.access_token, "a2");
    assert_eq!(store.get("refresh_token").await?.as_deref(), Some("r2"));
    Ok(())
}

#[tokio::test]
async fn test_multipart_check_in_is_rebuilt_for_retry() -> Result<()> {
    let server = MockServer::start_async().await;

    let rejected = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/timelogs/check-in")
                .header("Authorization", "Bearer old-access");
            then.status(401).json_body(json!({"message": "Token expired"}));
        })
        .await;
    let refresh = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/auth/refresh")
                .json_body(json!({"refresh_token": "refresh-1"}));
            then.status(200).json_body(json!({
                "access_token": "new-access",
                "refresh_token": "refresh-2"
            }));
        })
        .await;
    let retried = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/timelogs/check-in")
                .header("Authorization", "Bearer new-access")
                .body_contains("name=\"photo\"")
                .body_contains("jpeg-evidence-bytes")
                .body_contains("name=\"latitude\"");
            then.status(201).json_body(json!({
                "id": 77,
                "user_id": 1,
                "check_in": "2026-10-19T08:00:00Z",
                "check_in_photo_url": "/uploads/77-in.jpg"
            }));
        })
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens("old-access", "refresh-1"));
    let client = client_for(&server, store.clone());

    let log = client
        .check_in(ClockEvent {
            photo: Some(PhotoEvidence::from_bytes(
                "in.jpg",
                b"jpeg-evidence-bytes".to_vec(),
            )?),
            location: Some(GeoPoint {
                latitude: -33.45,
                longitude: -70.66,
            }),
            notes: None,
        })
        .await?;

    assert_eq!(log.id, 77);
    assert!(log.is_active());
    rejected.assert_hits_async(1).await;
    refresh.assert_hits_async(1).await;
    retried.assert_hits_async(1).await;
    assert_eq!(
        store.get("access_token").await?.as_deref(),
        Some("new-access")
    );
    Ok(())
}
