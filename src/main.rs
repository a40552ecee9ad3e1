//! paimon-setup - headless entry point for the discovery core.
//!
//! Runs one discovery session without the wizard UI: searches the known
//! install sources, watches for a running game process, and records the
//! first confirmed path into `Paimon Config.yaml`. The real wizard drives
//! the same [`DiscoverySession`] API from its form.

use anyhow::Result;
use paimon_setup::{
    APP_NAME, ConfigManager, DiscoveryEvent, DiscoverySession, EVENT_CHANNEL_CAPACITY, VERSION,
};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    let config_manager = ConfigManager::new("Paimon Data")?;
    let loaded = config_manager.load()?;

    // Setup logging with both file and console output
    let _guard = paimon_setup::logging::setup_logging("logs", loaded.debug_mode, true)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    if loaded.has_game_path() {
        tracing::info!("Currently configured game path: {}", loaded.game_path);
    }

    let config = Arc::new(RwLock::new(loaded));
    let (events_tx, mut events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let session = DiscoverySession::start(config.clone(), events_tx);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted; shutting down discovery session");
                session.shutdown();
                break;
            }
            event = events_rx.recv() => {
                match event {
                    Some(DiscoveryEvent::SearchCompleted { candidates }) => {
                        if candidates.is_empty() {
                            tracing::warn!(
                                "No install candidates found; waiting for a running game process"
                            );
                        }
                        for (index, candidate) in candidates.iter().enumerate() {
                            tracing::info!(
                                "Candidate {}: {} ({:?})",
                                index + 1,
                                candidate.path,
                                candidate.source
                            );
                        }
                        // Headless mode accepts the top-ranked candidate; the
                        // wizard would present the list for selection instead.
                        if let Some(first) = candidates.first() {
                            session.confirm_candidate(&first.path);
                        }
                    }
                    Some(DiscoveryEvent::GameDetected { path }) => {
                        tracing::info!("Game found: {}", path);
                    }
                    Some(DiscoveryEvent::DetectionFailed { message }) => {
                        tracing::error!("{}", message);
                    }
                    Some(DiscoveryEvent::Closed) | None => break,
                }
            }
        }
    }

    session.join().await;

    let final_config = config.read().unwrap().clone();
    if final_config.has_game_path() {
        tracing::info!("Resolved game path: {}", final_config.game_path);
    } else {
        tracing::warn!("Discovery ended without a resolved game path");
    }
    config_manager.save(&final_config)?;

    tracing::info!("Shutdown complete");
    Ok(())
}
