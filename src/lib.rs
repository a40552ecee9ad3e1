// paimon-setup - Installation discovery core for the Genshin Impact setup wizard
//
// This is the library crate containing the discovery services and session
// plumbing. The binary crate (main.rs) provides a headless entry point; the
// wizard UI is an external consumer of the same API.

pub mod config;
pub mod logging;
pub mod models;
pub mod services;
pub mod session;

#[cfg(windows)]
pub mod win32;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use models::{CandidateSource, InstallCandidate, SetupConfig};
pub use services::{PathResolver, ProcessWatcher, SelectionError, WatchOutcome};
pub use session::{DiscoveryEvent, DiscoverySession, EVENT_CHANNEL_CAPACITY};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// Executable names the game ships under (global and CN releases).
pub const GAME_EXECUTABLES: [&str; 2] = ["GenshinImpact.exe", "YuanShen.exe"];

/// Window class registered by the game's engine runtime.
pub const ENGINE_WINDOW_CLASS: &str = "UnityWndClass";
