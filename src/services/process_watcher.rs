//! Background watcher for an already-running game process.
//!
//! One tick per second: scan top-level windows for the engine's window
//! class, validate the owning process's executable path, and terminate the
//! process so the wizard can record the corrected path. The loop ends on
//! cancellation, on a validated detection, or on the one terminal failure
//! (an engine window whose process path cannot be resolved).

use crate::GAME_EXECUTABLES;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;

#[cfg(windows)]
use crate::ENGINE_WINDOW_CLASS;

/// Delay between window scans.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Terminal result of a watch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    /// A running game process was found, validated, and terminated.
    Detected { path: String },
    /// An engine window was found but its process path could not be
    /// resolved. Surfaced to the user once; the loop does not continue.
    PathUnresolvable,
    /// The shared cancellation signal fired.
    Cancelled,
}

enum TickResult {
    NoMatch,
    Found { path: String },
    Unresolvable,
}

/// Cancellable polling loop over the desktop's top-level windows.
pub struct ProcessWatcher {
    poll_interval: Duration,
}

impl ProcessWatcher {
    pub fn new() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Watcher with a custom tick interval. Tests use short intervals.
    pub fn with_interval(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// Poll until cancelled or until a terminal tick result.
    ///
    /// The inter-tick delay is raced against the cancellation channel, so
    /// shutdown takes effect mid-sleep rather than after a full interval.
    pub async fn run(&self, mut cancel_rx: watch::Receiver<bool>) -> WatchOutcome {
        tracing::info!(
            "Process watcher started (interval {:?})",
            self.poll_interval
        );

        loop {
            if *cancel_rx.borrow() {
                tracing::info!("Process watcher cancelled");
                return WatchOutcome::Cancelled;
            }

            tokio::select! {
                changed = cancel_rx.changed() => {
                    // A dropped sender means the session is gone; stop too.
                    if changed.is_err() || *cancel_rx.borrow() {
                        tracing::info!("Process watcher cancelled during delay");
                        return WatchOutcome::Cancelled;
                    }
                }
                _ = sleep(self.poll_interval) => {}
            }

            match poll_tick() {
                TickResult::NoMatch => continue,
                TickResult::Found { path } => {
                    tracing::info!("Game process detected and terminated: {}", path);
                    return WatchOutcome::Detected { path };
                }
                TickResult::Unresolvable => {
                    tracing::error!("Engine window found but process path is unresolvable");
                    return WatchOutcome::PathUnresolvable;
                }
            }
        }
    }
}

impl Default for ProcessWatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// True when `path` contains one of the known game executable names.
pub fn is_known_game_exe(path: &str) -> bool {
    GAME_EXECUTABLES.iter().any(|exe| path.contains(exe))
}

#[cfg(windows)]
fn poll_tick() -> TickResult {
    let Some(window) = crate::win32::find_engine_window(ENGINE_WINDOW_CLASS, &GAME_EXECUTABLES)
    else {
        return TickResult::NoMatch;
    };

    let pid = window.pid;
    let path = window.image_path.clone();

    // Termination is best-effort; the process may already be exiting.
    if let Err(e) = window.terminate() {
        tracing::warn!("Terminating process {} failed: {}", pid, e);
    } else {
        tracing::info!("Terminated process {}", pid);
    }

    match path {
        Some(path) => TickResult::Found { path },
        None => TickResult::Unresolvable,
    }
}

#[cfg(not(windows))]
fn poll_tick() -> TickResult {
    // Window-class scanning is a Win32 facility; elsewhere the watcher
    // simply never matches.
    TickResult::NoMatch
}
