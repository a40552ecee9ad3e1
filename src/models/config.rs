use serde::{Deserialize, Serialize};

/// Setup configuration persisted as `Paimon Config.yaml`.
///
/// The discovery core only ever writes `game_path`; everything else in the
/// wizard's configuration belongs to the embedding application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupConfig {
    #[serde(rename = "Game Path", default)]
    pub game_path: String,

    #[serde(rename = "Debug Mode", default)]
    pub debug_mode: bool,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            game_path: String::new(),
            debug_mode: false,
        }
    }
}

impl SetupConfig {
    /// True once a game path has been resolved and recorded.
    pub fn has_game_path(&self) -> bool {
        !self.game_path.is_empty()
    }
}
