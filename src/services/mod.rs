//! Discovery services.
//!
//! - [`path_resolver`]: synchronous three-source installation-path search
//! - [`process_watcher`]: cancellable polling loop that detects and
//!   terminates a game process running under the wrong entry point
//! - [`browse`]: validation for manually picked executables

pub mod browse;
pub mod path_resolver;
pub mod process_watcher;

pub use browse::{SelectionError, validate_manual_selection};
pub use path_resolver::PathResolver;
pub use process_watcher::{ProcessWatcher, WatchOutcome};
