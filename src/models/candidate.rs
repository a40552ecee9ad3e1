/// A filesystem path believed to point at the game's main executable.
///
/// Candidates are produced by [`crate::services::PathResolver`] in probe
/// order and handed to the selection surface as-is. Only the path the user
/// (or the watcher) finally settles on is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallCandidate {
    /// Full path to the executable, with backslash separators.
    pub path: String,
    /// Which probe produced this candidate.
    pub source: CandidateSource,
}

/// Origin of an [`InstallCandidate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    /// Derived from a launcher install dir's `config.ini`.
    LauncherConfig,
    /// Read from the HoYoPlay per-user install-tracking key.
    Installer,
}

impl InstallCandidate {
    pub fn new(path: impl Into<String>, source: CandidateSource) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }
}
