//! Integration tests for command dispatch against a mocked playback API.
//!
//! Each test feeds real command text through the interpreter and executes
//! the resulting intent against a wiremock server standing in for the
//! remote service.

use chrono::{Duration, Utc};
use cadenza_core::{
    auth::{AuthClient, AuthConfig, AuthError},
    credential::Credential,
    dispatch::{Dispatcher, NO_DEVICE_GUIDANCE},
    interpret::parse,
    manager::CredentialManager,
    remote::{HttpRemote, RemoteApi},
    store::MemoryStore,
};
use wiremock::{
    matchers::{body_partial_json, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn fresh_credential() -> Credential {
    Credential::new("valid-access-token", Utc::now() + Duration::hours(1))
        .with_refresh_token("refresh-token")
}

fn dispatcher_for(server: &MockServer) -> Dispatcher<MemoryStore, HttpRemote> {
    let store = MemoryStore::with_credential(&fresh_credential());
    let auth = AuthClient::new(AuthConfig::new(
        "test-client-id",
        None,
        "http://localhost:8888/callback",
    ));
    let manager = CredentialManager::new(store, auth);
    let remote = HttpRemote::with_base_url(server.uri());
    Dispatcher::new(manager, remote)
}

#[tokio::test]
async fn set_volume_command_calls_remote_once() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/me/player/volume"))
        .and(query_param("volume_percent", "45"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dispatcher = dispatcher_for(&mock_server);
    let outcome = dispatcher
        .dispatch(parse("Claude, set volume to 45%"))
        .await
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.message, "Volume set to 45%");
}

#[tokio::test]
async fn empty_track_search_reports_no_results() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "bohemian rhapsody"))
        .and(query_param("type", "track"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "tracks": { "items": [] }
        })))
        .mount(&mock_server)
        .await;

    let dispatcher = dispatcher_for(&mock_server);
    let outcome = dispatcher
        .dispatch(parse("play bohemian rhapsody"))
        .await
        .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.message, "No tracks found for \"bohemian rhapsody\"");
}

#[tokio::test]
async fn found_track_is_played_and_reported() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "tracks": {
                "items": [{
                    "name": "Bohemian Rhapsody",
                    "uri": "spotify:track:4u7EnebtmKWzUH433cf5Qv",
                    "duration_ms": 354320,
                    "artists": [{ "name": "Queen" }],
                    "album": { "name": "A Night at the Opera" }
                }]
            }
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/me/player/play"))
        .and(body_partial_json(serde_json::json!({
            "uris": ["spotify:track:4u7EnebtmKWzUH433cf5Qv"]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dispatcher = dispatcher_for(&mock_server);
    let outcome = dispatcher
        .dispatch(parse("play bohemian rhapsody"))
        .await
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.message, "Playing \"Bohemian Rhapsody\" by Queen");
}

#[tokio::test]
async fn playlist_query_plays_the_found_context() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("type", "playlist"))
        .and(query_param("q", "road trip"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "playlists": {
                "items": [{
                    "name": "Road Trip Classics",
                    "uri": "spotify:playlist:37i9dQZF1DX9wC1KY45plY"
                }]
            }
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/me/player/play"))
        .and(body_partial_json(serde_json::json!({
            "context_uri": "spotify:playlist:37i9dQZF1DX9wC1KY45plY"
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dispatcher = dispatcher_for(&mock_server);
    let outcome = dispatcher
        .dispatch(parse("play playlist Road Trip"))
        .await
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.message, "Playing playlist \"Road Trip Classics\"");
}

#[tokio::test]
async fn volume_up_steps_from_current_level() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/player"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "device": { "id": "abc", "name": "Kitchen", "volume_percent": 60 },
            "is_playing": true,
            "progress_ms": 1000,
            "item": null
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/me/player/volume"))
        .and(query_param("volume_percent", "70"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dispatcher = dispatcher_for(&mock_server);
    let outcome = dispatcher.dispatch(parse("volume up")).await.unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.message, "Volume increased to 70%");
}

#[tokio::test]
async fn volume_up_saturates_at_one_hundred() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/player"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "device": { "name": "Kitchen", "volume_percent": 95 },
            "is_playing": true
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/me/player/volume"))
        .and(query_param("volume_percent", "100"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dispatcher = dispatcher_for(&mock_server);
    let outcome = dispatcher.dispatch(parse("volume up")).await.unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.message, "Volume increased to 100%");
}

#[tokio::test]
async fn volume_down_floors_at_zero() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/player"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "device": { "name": "Kitchen", "volume_percent": 5 },
            "is_playing": true
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/me/player/volume"))
        .and(query_param("volume_percent", "0"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dispatcher = dispatcher_for(&mock_server);
    let outcome = dispatcher.dispatch(parse("volume down")).await.unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.message, "Volume decreased to 0%");
}

#[tokio::test]
async fn status_reports_current_track_with_details() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/player"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "device": { "id": "abc", "name": "Kitchen", "volume_percent": 40 },
            "is_playing": true,
            "progress_ms": 61000,
            "item": {
                "name": "Clair de Lune",
                "uri": "spotify:track:abc123",
                "duration_ms": 300000,
                "artists": [{ "name": "Claude Debussy" }],
                "album": { "name": "Suite Bergamasque" }
            }
        })))
        .mount(&mock_server)
        .await;

    let dispatcher = dispatcher_for(&mock_server);
    let outcome = dispatcher.dispatch(parse("status")).await.unwrap();

    assert!(outcome.success);
    assert_eq!(
        outcome.message,
        "Currently playing \"Clair de Lune\" by Claude Debussy"
    );

    let details = outcome.details.unwrap();
    assert_eq!(details.track, "Clair de Lune");
    assert_eq!(details.artists, "Claude Debussy");
    assert_eq!(details.album, "Suite Bergamasque");
    assert!(details.is_playing);
    assert_eq!(details.volume, Some(40));
    assert_eq!(details.device.as_deref(), Some("Kitchen"));
}

#[tokio::test]
async fn status_with_nothing_active_is_a_success() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/player"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let dispatcher = dispatcher_for(&mock_server);
    let outcome = dispatcher.dispatch(parse("status")).await.unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.message, "Not currently playing anything");
}

#[tokio::test]
async fn status_without_active_device_is_guidance_not_failure() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/player"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": {
                "status": 404,
                "message": "Player command failed: No active device found",
                "reason": "NO_ACTIVE_DEVICE"
            }
        })))
        .mount(&mock_server)
        .await;

    let dispatcher = dispatcher_for(&mock_server);
    let outcome = dispatcher.dispatch(parse("status")).await.unwrap();

    assert!(outcome.success, "no active device is policy, not failure");
    assert_eq!(outcome.message, NO_DEVICE_GUIDANCE);
}

#[tokio::test]
async fn play_without_device_reports_guidance_as_failure() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/me/player/play"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": {
                "status": 404,
                "message": "Player command failed: No active device found",
                "reason": "NO_ACTIVE_DEVICE"
            }
        })))
        .mount(&mock_server)
        .await;

    let dispatcher = dispatcher_for(&mock_server);
    let outcome = dispatcher.dispatch(parse("play")).await.unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.message, NO_DEVICE_GUIDANCE);
}

#[tokio::test]
async fn premium_rejection_gets_a_distinct_message() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/me/player/next"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": {
                "status": 403,
                "message": "Player command failed: Premium required",
                "reason": "PREMIUM_REQUIRED"
            }
        })))
        .mount(&mock_server)
        .await;

    let dispatcher = dispatcher_for(&mock_server);
    let outcome = dispatcher.dispatch(parse("next")).await.unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.message, "This action requires a premium subscription");
}

#[tokio::test]
async fn seek_positions_the_current_track() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/me/player/seek"))
        .and(query_param("position_ms", "45000"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dispatcher = dispatcher_for(&mock_server);
    let credential = dispatcher.manager().ensure_fresh().await.unwrap();

    dispatcher
        .remote()
        .seek(&credential.access_token, 45000)
        .await
        .unwrap();
}

#[tokio::test]
async fn unknown_command_echoes_original_text() {
    let mock_server = MockServer::start().await;
    let dispatcher = dispatcher_for(&mock_server);

    let outcome = dispatcher
        .dispatch(parse("Make me a sandwich"))
        .await
        .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.message, "I did not understand that command");
    assert_eq!(outcome.original_command.as_deref(), Some("Make me a sandwich"));
}

#[tokio::test]
async fn unauthenticated_dispatch_short_circuits_before_remote_calls() {
    let mock_server = MockServer::start().await;
    // No mocks mounted: any remote call would fail the test server-side.
    let store = MemoryStore::new();
    let auth = AuthClient::new(AuthConfig::new(
        "test-client-id",
        None,
        "http://localhost:8888/callback",
    ));
    let dispatcher = Dispatcher::new(
        CredentialManager::new(store, auth),
        HttpRemote::with_base_url(mock_server.uri()),
    );

    let result = dispatcher.dispatch(parse("pause")).await;

    assert!(matches!(result, Err(AuthError::NotAuthenticated)));
}
