//! Data models for the setup wizard's discovery core.
//!
//! - [`SetupConfig`]: the shared configuration object; the discovery core
//!   writes the resolved game path into it, the embedder persists it
//! - [`InstallCandidate`]: one plausible game executable path, tagged with
//!   the probe that produced it

pub mod candidate;
pub mod config;

pub use candidate::{CandidateSource, InstallCandidate};
pub use config::SetupConfig;
