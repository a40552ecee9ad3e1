//! Discovery session: the composition root over the path resolver and the
//! process watcher.
//!
//! A session owns the shared cancellation channel, delivers results to the
//! embedding surface over a bounded event channel, and guarantees the
//! configured game path is written by exactly one winner.

use crate::models::{InstallCandidate, SetupConfig};
use crate::services::{
    PathResolver, ProcessWatcher, SelectionError, WatchOutcome, validate_manual_selection,
};
use camino::Utf8Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Bounded to keep a stalled consumer from buffering unboundedly; a session
/// only ever produces a handful of events.
pub const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Messages delivered to the embedding surface.
///
/// The consumer owns presentation: candidate ranking display, the found /
/// not-found coloring, and the success and error dialogs.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryEvent {
    /// The path search finished. An empty list means nothing was found.
    SearchCompleted { candidates: Vec<InstallCandidate> },
    /// The watcher found and terminated a running game process.
    GameDetected { path: String },
    /// The watcher hit its terminal failure; the session closes with no
    /// path recorded.
    DetectionFailed { message: String },
    /// The session is over; completions after this are no-ops.
    Closed,
}

struct SessionShared {
    config: Arc<RwLock<SetupConfig>>,
    events: mpsc::Sender<DiscoveryEvent>,
    cancel_tx: watch::Sender<bool>,
    closed: AtomicBool,
}

impl SessionShared {
    fn emit(&self, event: DiscoveryEvent) {
        if let Err(e) = self.events.try_send(event) {
            tracing::warn!("Dropping discovery event: {}", e);
        }
    }

    /// First completion wins: records the path, cancels the sibling task,
    /// and emits `Closed`. Later completions are no-ops.
    fn complete_with_path(&self, path: String) {
        if self.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!("Session already closed; ignoring path {}", path);
            return;
        }

        self.config.write().unwrap().game_path = path.clone();
        tracing::info!("Game path recorded: {}", path);

        let _ = self.cancel_tx.send(true);
        self.emit(DiscoveryEvent::Closed);
    }

    fn close_without_path(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        let _ = self.cancel_tx.send(true);
        self.emit(DiscoveryEvent::Closed);
    }
}

/// One discovery pass: a path search and a process watch racing for the
/// first valid game path.
pub struct DiscoverySession {
    shared: Arc<SessionShared>,
    resolver_task: JoinHandle<()>,
    watcher_task: JoinHandle<()>,
}

impl DiscoverySession {
    /// Start the resolver and watcher tasks against a fresh cancellation
    /// channel. Events flow into `events` until the session closes.
    pub fn start(
        config: Arc<RwLock<SetupConfig>>,
        events: mpsc::Sender<DiscoveryEvent>,
    ) -> Self {
        Self::start_with_watcher(config, events, ProcessWatcher::new())
    }

    /// Like [`start`](Self::start) with an injected watcher. Tests shorten
    /// the poll interval this way.
    pub fn start_with_watcher(
        config: Arc<RwLock<SetupConfig>>,
        events: mpsc::Sender<DiscoveryEvent>,
        watcher: ProcessWatcher,
    ) -> Self {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let shared = Arc::new(SessionShared {
            config,
            events,
            cancel_tx,
            closed: AtomicBool::new(false),
        });

        let resolver_shared = shared.clone();
        let resolver_cancel = cancel_rx.clone();
        let resolver_task = tokio::spawn(async move {
            // Registry and filesystem probing is synchronous and bounded;
            // run it off the async workers.
            let candidates = tokio::task::spawn_blocking(|| PathResolver::new().resolve())
                .await
                .unwrap_or_else(|e| {
                    tracing::error!("Path search task failed: {}", e);
                    Vec::new()
                });

            // The result list must not reach the surface after cancellation.
            if *resolver_cancel.borrow() {
                tracing::debug!("Search finished after cancellation; dropping results");
                return;
            }

            resolver_shared.emit(DiscoveryEvent::SearchCompleted { candidates });
        });

        let watcher_shared = shared.clone();
        let watcher_task = tokio::spawn(async move {
            match watcher.run(cancel_rx).await {
                WatchOutcome::Detected { path } => {
                    watcher_shared.emit(DiscoveryEvent::GameDetected { path: path.clone() });
                    watcher_shared.complete_with_path(path);
                }
                WatchOutcome::PathUnresolvable => {
                    watcher_shared.emit(DiscoveryEvent::DetectionFailed {
                        message: "Failed to find the game process path. Please use Browse instead."
                            .to_string(),
                    });
                    watcher_shared.close_without_path();
                }
                WatchOutcome::Cancelled => {}
            }
        });

        Self {
            shared,
            resolver_task,
            watcher_task,
        }
    }

    /// Confirm one of the search candidates as the game path.
    pub fn confirm_candidate(&self, path: &str) {
        self.shared.complete_with_path(path.to_string());
    }

    /// Validate a manually browsed executable and, when it passes, complete
    /// the session with it. Rejections leave the session running.
    pub fn confirm_browse(&self, path: &Utf8Path) -> Result<(), SelectionError> {
        let accepted = validate_manual_selection(path)?;
        self.shared.complete_with_path(accepted.into_string());
        Ok(())
    }

    /// End the session without recording a path.
    pub fn shutdown(&self) {
        self.shared.close_without_path();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }

    /// Wait for both background tasks to finish.
    pub async fn join(self) {
        let _ = self.resolver_task.await;
        let _ = self.watcher_task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    fn new_session() -> (
        DiscoverySession,
        mpsc::Receiver<DiscoveryEvent>,
        Arc<RwLock<SetupConfig>>,
    ) {
        let config = Arc::new(RwLock::new(SetupConfig::default()));
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let session = DiscoverySession::start(config.clone(), events_tx);
        (session, events_rx, config)
    }

    #[tokio::test]
    async fn test_confirm_candidate_records_path_and_closes() {
        let (session, mut events_rx, config) = new_session();

        session.confirm_candidate(r"C:\G\GenshinImpact.exe");

        assert!(session.is_closed());
        assert_eq!(
            config.read().unwrap().game_path,
            r"C:\G\GenshinImpact.exe"
        );

        // SearchCompleted may arrive first depending on timing; the Closed
        // event must show up either way.
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
    async fn test_second_completion_is_a_no_op() {
        let (session, _events_rx, config) = new_session();

        session.confirm_candidate(r"C:\First\YuanShen.exe");
        session.confirm_candidate(r"C:\Second\GenshinImpact.exe");

        assert_eq!(config.read().unwrap().game_path, r"C:\First\YuanShen.exe");

        session.join().await;
    }

    #[tokio::test]
    async fn test_shutdown_cancels_both_tasks_promptly() {
        let (session, _events_rx, config) = new_session();

        session.shutdown();

        timeout(Duration::from_secs(2), session.join())
            .await
            .expect("tasks should stop within one poll interval");

        assert_eq!(config.read().unwrap().game_path, "");
    }

    #[tokio::test]
    async fn test_rejected_browse_keeps_session_open() {
        let (session, _events_rx, config) = new_session();

        let result = session.confirm_browse(Utf8Path::new(r"C:\G\Launcher.exe"));
        assert!(matches!(result, Err(SelectionError::NotGameExecutable(_))));
        assert!(!session.is_closed());
        assert_eq!(config.read().unwrap().game_path, "");

        session.shutdown();
        session.join().await;
    }
}
