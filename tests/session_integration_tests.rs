//! Integration tests for the discovery session lifecycle.
//!
//! These verify the session's channel contract and cancellation behavior:
//! search results are delivered as events, a confirmed path wins exactly
//! once, and shutdown stops both background tasks within one poll interval.

use camino::Utf8PathBuf;
use paimon_setup::services::ProcessWatcher;
use paimon_setup::{DiscoveryEvent, DiscoverySession, EVENT_CHANNEL_CAPACITY, SetupConfig};
use std::fs;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::time::timeout;

fn shared_config() -> Arc<RwLock<SetupConfig>> {
    Arc::new(RwLock::new(SetupConfig::default()))
}

#[tokio::test]
async fn test_search_results_arrive_as_an_event() {
    let config = shared_config();
    let (events_tx, mut events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let session = DiscoverySession::start(config, events_tx);

    let event = timeout(Duration::from_secs(5), events_rx.recv())
        .await
        .expect("search should finish quickly")
        .expect("channel should stay open");

    assert!(matches!(event, DiscoveryEvent::SearchCompleted { .. }));

    session.shutdown();
    session.join().await;
}

#[tokio::test]
async fn test_browse_confirmation_completes_the_session() {
    let temp_dir = TempDir::new().unwrap();
    let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    let exe = dir.join("GenshinImpact.exe");
    fs::write(&exe, b"").unwrap();
    fs::create_dir(dir.join("GenshinImpact_Data")).unwrap();

    let config = shared_config();
    let (events_tx, mut events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let session = DiscoverySession::start(config.clone(), events_tx);

    session.confirm_browse(&exe).unwrap();

    assert!(session.is_closed());
    assert_eq!(config.read().unwrap().game_path, exe.as_str());

    let mut saw_closed = false;
    while let Ok(Some(event)) = timeout(Duration::from_secs(2), events_rx.recv()).await {
        if event == DiscoveryEvent::Closed {
            saw_closed = true;
            break;
        }
    }
    assert!(saw_closed);

    session.join().await;
}

#[tokio::test]
async fn test_candidate_confirmation_beats_later_completions() {
    let config = shared_config();
    let (events_tx, _events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let session = DiscoverySession::start(config.clone(), events_tx);

    session.confirm_candidate(r"C:\G\GenshinImpact.exe");
    session.confirm_candidate(r"C:\Other\YuanShen.exe");

    assert_eq!(config.read().unwrap().game_path, r"C:\G\GenshinImpact.exe");

    session.join().await;
}

#[tokio::test]
async fn test_shutdown_mid_delay_stops_within_one_tick() {
    let config = shared_config();
    let (events_tx, _events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let session = DiscoverySession::start_with_watcher(
        config.clone(),
        events_tx,
        ProcessWatcher::with_interval(Duration::from_secs(1)),
    );

    // Let the watcher settle into its inter-tick delay, then cancel.
    tokio::time::sleep(Duration::from_millis(100)).await;
    session.shutdown();

    timeout(Duration::from_secs(1), session.join())
        .await
        .expect("watcher should stop before the next tick");

    assert_eq!(config.read().unwrap().game_path, "");
}
