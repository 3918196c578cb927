//! Integration tests for the shared-session message flow
//!
//! Wires the real dispatcher, registry, broadcaster, and search relay
//! against mock backend and directory servers and walks through the
//! scenarios a mixed room of listeners produces.

use serde_json::json;
use tokio::sync::mpsc;

use jukewire_mopidy_client::MopidyClient;
use jukewire_relay::services::{AuthorityResolver, DirectoryClient};
use jukewire_relay::websocket::{
    ClientMessage, CommandDispatcher, ConnectionRegistry, Disposition, SearchRelay, ServerMessage,
    StateBroadcaster,
};
use jukewire_test_utils::{MockDirectoryServer, MockMopidyServer, MopidyTrackFixture};

struct Session {
    dispatcher: CommandDispatcher,
    registry: ConnectionRegistry,
}

async fn session(mopidy: &MockMopidyServer, directory: &MockDirectoryServer) -> Session {
    let backend = MopidyClient::new(&mopidy.url()).unwrap();
    let registry = ConnectionRegistry::new();
    let resolver = AuthorityResolver::new(DirectoryClient::new(&directory.url()).unwrap());
    let state = StateBroadcaster::new(backend.clone(), registry.clone());
    let search = SearchRelay::new(backend.clone(), registry.clone());

    Session {
        dispatcher: CommandDispatcher::new(backend, registry.clone(), resolver, state, search),
        registry,
    }
}

fn expect_track(msg: ServerMessage) -> jukewire_relay::websocket::TrackPayload {
    match msg {
        ServerMessage::Track(payload) => payload,
        other => panic!("expected track message, got {:?}", other),
    }
}

#[tokio::test]
async fn test_refresh_reaches_only_the_asking_listener() {
    let mopidy = MockMopidyServer::start().await;
    mopidy
        .mock_current_track(Some(MopidyTrackFixture::new(
            "local:track:1",
            "Voyager",
        )))
        .await;
    mopidy.mock_track_images("local:track:1", "/art/v.jpg").await;
    let directory = MockDirectoryServer::start().await;

    let s = session(&mopidy, &directory).await;
    let (tx1, mut rx1) = mpsc::unbounded_channel();
    let (tx2, mut rx2) = mpsc::unbounded_channel();
    let asker = s.registry.register(tx1, None);
    s.registry.register(tx2, None);

    let disposition = s.dispatcher.dispatch(asker, ClientMessage::Refresh).await;
    assert_eq!(disposition, Disposition::Continue);

    let payload = expect_track(rx1.try_recv().unwrap());
    assert_eq!(payload.title.as_deref(), Some("Voyager"));
    assert_eq!(payload.art.as_deref(), Some("/art/v.jpg"));

    assert!(rx2.try_recv().is_err());
}

#[tokio::test]
async fn test_admin_next_skips_once_without_reply() {
    let mopidy = MockMopidyServer::start().await;
    mopidy
        .mock_rpc_expect("core.playback.next", json!(null), 1)
        .await;
    let directory = MockDirectoryServer::start().await;
    directory.mock_identity("tok-dj", "dj", true).await;

    let s = session(&mopidy, &directory).await;
    let (tx_admin, mut rx_admin) = mpsc::unbounded_channel();
    let (tx_anon, mut rx_anon) = mpsc::unbounded_channel();
    let admin = s.registry.register(tx_admin, Some("tok-dj".into()));
    s.registry.register(tx_anon, None);

    let disposition = s
        .dispatcher
        .dispatch(admin, ClientMessage::Admin { action: "next".into() })
        .await;
    assert_eq!(disposition, Disposition::Continue);

    // The skip itself is the only effect: nobody receives a message
    assert!(rx_admin.try_recv().is_err());
    assert!(rx_anon.try_recv().is_err());

    mopidy.verify().await;
}

#[tokio::test]
async fn test_unknown_token_request_is_rejected() {
    let mopidy = MockMopidyServer::start().await;
    mopidy
        .mock_rpc_expect("core.tracklist.add", json!([]), 0)
        .await;
    let directory = MockDirectoryServer::start().await;
    directory.mock_unknown("tok-stale").await;

    let s = session(&mopidy, &directory).await;
    let (tx, _rx) = mpsc::unbounded_channel();
    let id = s.registry.register(tx, Some("tok-stale".into()));

    let disposition = s
        .dispatcher
        .dispatch(
            id,
            ClientMessage::Request {
                uri: "local:track:3".into(),
            },
        )
        .await;

    assert_eq!(disposition, Disposition::Disconnect);
    mopidy.verify().await;
}

#[tokio::test]
async fn test_malformed_directory_response_fails_closed() {
    let mopidy = MockMopidyServer::start().await;
    let directory = MockDirectoryServer::start().await;
    directory.mock_malformed_response().await;

    let s = session(&mopidy, &directory).await;
    let (tx, _rx) = mpsc::unbounded_channel();
    let id = s.registry.register(tx, Some("tok-any".into()));

    let disposition = s
        .dispatcher
        .dispatch(
            id,
            ClientMessage::Admin {
                action: "play".into(),
            },
        )
        .await;

    assert_eq!(disposition, Disposition::Disconnect);
}

#[tokio::test]
async fn test_search_failure_leaves_session_usable() {
    let mopidy = MockMopidyServer::start().await;
    mopidy.mock_server_error().await;
    let directory = MockDirectoryServer::start().await;

    let s = session(&mopidy, &directory).await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let id = s.registry.register(tx, None);

    let disposition = s
        .dispatcher
        .dispatch(
            id,
            ClientMessage::Search {
                query: Some("anything".into()),
            },
        )
        .await;

    assert_eq!(disposition, Disposition::Continue);
    assert!(s.registry.is_registered(id));
    assert!(rx.try_recv().is_err());
}
