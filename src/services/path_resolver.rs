//! Best-effort search for an installed game executable.
//!
//! Three independent sources are probed in a fixed order: the OS uninstall
//! registry branch, the launcher's `config.ini` inside each registered
//! install dir, and the HoYoPlay per-user install-tracking key. Every
//! source degrades to "no candidate" on any failure; the caller never sees
//! an error from `resolve()`.

use crate::models::{CandidateSource, InstallCandidate};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use std::fs;

/// Display names under which the game registers its uninstall entry
/// (global release and CN release).
pub const UNINSTALL_DISPLAY_NAMES: [&str; 2] = ["Genshin Impact", "原神"];

/// Executable name appended to the HoYoPlay install dir.
pub const CANONICAL_EXECUTABLE: &str = "GenshinImpact.exe";

/// Launcher config file probed inside each uninstall-registered dir.
const LAUNCHER_CONFIG_FILE: &str = "config.ini";

#[cfg(windows)]
const UNINSTALL_KEY: &str = r"SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall";

#[cfg(windows)]
const HOYOPLAY_KEY: &str = r"Software\Cognosphere\HYP\1_1\hk4e_global";

/// Synchronous installation-path search.
///
/// `resolve()` is safe to call repeatedly; for unchanged registry and
/// filesystem state it returns the same ordered list each time.
pub struct PathResolver;

impl PathResolver {
    pub fn new() -> Self {
        Self
    }

    /// Probe all sources and return the merged candidate list, in probe
    /// order, with duplicate paths dropped.
    pub fn resolve(&self) -> Vec<InstallCandidate> {
        let launcher_dirs = launcher_install_dirs();
        tracing::debug!(
            "Uninstall probe found {} launcher install dir(s)",
            launcher_dirs.len()
        );

        let candidates = assemble_candidates(&launcher_dirs, installer_candidate());
        tracing::info!("Path search finished with {} candidate(s)", candidates.len());
        candidates
    }
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn assemble_candidates(
    launcher_dirs: &[Utf8PathBuf],
    installer: Option<InstallCandidate>,
) -> Vec<InstallCandidate> {
    let mut candidates: Vec<InstallCandidate> = Vec::new();

    for dir in launcher_dirs {
        if let Some(candidate) = candidate_from_launcher_dir(dir) {
            push_unique(&mut candidates, candidate);
        }
    }

    if let Some(candidate) = installer {
        push_unique(&mut candidates, candidate);
    }

    candidates
}

/// Duplicate paths across sources collapse to their first occurrence,
/// keeping probe order intact.
fn push_unique(candidates: &mut Vec<InstallCandidate>, candidate: InstallCandidate) {
    if candidates.iter().any(|c| c.path == candidate.path) {
        tracing::debug!("Dropping duplicate candidate {}", candidate.path);
        return;
    }
    candidates.push(candidate);
}

/// Derive a candidate from the launcher `config.ini` inside `dir`.
///
/// Returns `None` when the file is missing or unreadable, or when either
/// required key is absent.
pub fn candidate_from_launcher_dir(dir: &Utf8Path) -> Option<InstallCandidate> {
    let config_path = dir.join(LAUNCHER_CONFIG_FILE);
    let contents = match fs::read_to_string(&config_path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::debug!("Launcher config {} not readable: {}", config_path, e);
            return None;
        }
    };

    let entries = parse_flat_ini(&contents);
    let path = game_path_from_ini(&entries)?;
    Some(InstallCandidate::new(path, CandidateSource::LauncherConfig))
}

/// Parse a flat `key=value` file. Lines split at the first `=`; lines with
/// an empty key or value contribute nothing and later lines still parse.
pub fn parse_flat_ini(contents: &str) -> IndexMap<String, String> {
    let mut entries = IndexMap::new();

    for line in contents.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key.is_empty() || value.is_empty() {
            continue;
        }
        entries.insert(key.to_string(), value.to_string());
    }

    entries
}

/// Join `game_install_path` and `game_start_name` into a full executable
/// path. Both keys are required.
pub fn game_path_from_ini(entries: &IndexMap<String, String>) -> Option<String> {
    let install_path = entries.get("game_install_path")?;
    let start_name = entries.get("game_start_name")?;
    Some(normalize_separators(&format!(
        r"{}\{}",
        install_path, start_name
    )))
}

/// The launcher records install paths with forward slashes; registry values
/// use backslashes. Normalize to backslashes so candidates compare equal.
pub fn normalize_separators(path: &str) -> String {
    path.replace('/', "\\")
}

/// Enumerate the uninstall registry branch for install dirs registered
/// under the game's display names. Keys close when their handles drop.
#[cfg(windows)]
fn launcher_install_dirs() -> Vec<Utf8PathBuf> {
    use winreg::RegKey;
    use winreg::enums::HKEY_LOCAL_MACHINE;

    let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
    let uninstall = match hklm.open_subkey(UNINSTALL_KEY) {
        Ok(key) => key,
        Err(e) => {
            tracing::debug!("Uninstall branch not readable: {}", e);
            return Vec::new();
        }
    };

    let mut dirs = Vec::new();
    for name in uninstall.enum_keys().flatten() {
        if !UNINSTALL_DISPLAY_NAMES.contains(&name.as_str()) {
            continue;
        }
        let Ok(subkey) = uninstall.open_subkey(&name) else {
            continue;
        };
        let Ok(install_path) = subkey.get_value::<String, _>("InstallPath") else {
            tracing::debug!("Uninstall entry {} has no InstallPath value", name);
            continue;
        };
        if Utf8Path::new(&install_path).is_dir() {
            dirs.push(Utf8PathBuf::from(install_path));
        }
    }

    dirs
}

#[cfg(not(windows))]
fn launcher_install_dirs() -> Vec<Utf8PathBuf> {
    Vec::new()
}

/// Read the HoYoPlay install-tracking key. A missing key or an empty value
/// yields no candidate rather than a path with no directory component.
#[cfg(windows)]
fn installer_candidate() -> Option<InstallCandidate> {
    use winreg::RegKey;
    use winreg::enums::HKEY_CURRENT_USER;

    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let key = hkcu.open_subkey(HOYOPLAY_KEY).ok()?;
    let install_dir: String = key.get_value("GameInstallPath").ok()?;
    if install_dir.is_empty() {
        return None;
    }

    Some(InstallCandidate::new(
        normalize_separators(&format!(r"{}\{}", install_dir, CANONICAL_EXECUTABLE)),
        CandidateSource::Installer,
    ))
}

#[cfg(not(windows))]
fn installer_candidate() -> Option<InstallCandidate> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn launcher_dir_with_config(contents: &str) -> (TempDir, Utf8PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let mut file = fs::File::create(dir.join("config.ini")).unwrap();
        write!(file, "{}", contents).unwrap();
        (temp_dir, dir)
    }

    #[test]
    fn test_parse_skips_lines_without_separator() {
        let entries = parse_flat_ini("no separator here\ngame_install_path=C:/G\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries["game_install_path"], "C:/G");
    }

    #[test]
    fn test_parse_splits_at_first_equals() {
        let entries = parse_flat_ini("key=a=b\n");
        assert_eq!(entries["key"], "a=b");
    }

    #[test]
    fn test_parse_skips_empty_key_or_value() {
        let entries = parse_flat_ini("=value\nkey=\nok=1\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries["ok"], "1");
    }

    #[test]
    fn test_game_path_joins_and_normalizes() {
        let mut entries = IndexMap::new();
        entries.insert("game_install_path".to_string(), "C:/G".to_string());
        entries.insert("game_start_name".to_string(), "GenshinImpact.exe".to_string());

        assert_eq!(
            game_path_from_ini(&entries),
            Some(r"C:\G\GenshinImpact.exe".to_string())
        );
    }

    #[test]
    fn test_game_path_requires_both_keys() {
        let mut entries = IndexMap::new();
        entries.insert("game_install_path".to_string(), "C:/G".to_string());
        assert_eq!(game_path_from_ini(&entries), None);

        let mut entries = IndexMap::new();
        entries.insert("game_start_name".to_string(), "YuanShen.exe".to_string());
        assert_eq!(game_path_from_ini(&entries), None);
    }

    #[test]
    fn test_candidate_from_launcher_dir() {
        let (_guard, dir) = launcher_dir_with_config(
            "game_install_path=C:\\G\ngame_start_name=GenshinImpact.exe\n",
        );

        let candidate = candidate_from_launcher_dir(&dir).unwrap();
        assert_eq!(candidate.path, r"C:\G\GenshinImpact.exe");
        assert_eq!(candidate.source, CandidateSource::LauncherConfig);
    }

    #[test]
    fn test_malformed_line_does_not_abort_parsing() {
        let (_guard, dir) = launcher_dir_with_config(
            "garbage line\ngame_install_path=C:/G\ngame_start_name=YuanShen.exe\n",
        );

        let candidate = candidate_from_launcher_dir(&dir).unwrap();
        assert_eq!(candidate.path, r"C:\G\YuanShen.exe");
    }

    #[test]
    fn test_missing_config_yields_no_candidate() {
        let temp_dir = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();

        assert_eq!(candidate_from_launcher_dir(&dir), None);
    }

    #[test]
    fn test_installer_candidate_survives_empty_launcher_probe() {
        let installer = InstallCandidate::new(
            r"C:\HoYoPlay\GenshinImpact.exe",
            CandidateSource::Installer,
        );

        let candidates = assemble_candidates(&[], Some(installer.clone()));
        assert_eq!(candidates, vec![installer]);
    }

    #[test]
    fn test_duplicate_paths_collapse_to_first() {
        let (_guard, dir) = launcher_dir_with_config(
            "game_install_path=C:/G\ngame_start_name=GenshinImpact.exe\n",
        );

        let installer = InstallCandidate::new(
            r"C:\G\GenshinImpact.exe",
            CandidateSource::Installer,
        );

        let candidates =
            assemble_candidates(&[dir.clone(), dir.clone()], Some(installer));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].source, CandidateSource::LauncherConfig);
    }
}
