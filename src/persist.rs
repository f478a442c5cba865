use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const PREFS_DIR: &str = "ddragon_terminal";
const PREFS_FILE: &str = "prefs.json";
const PREFS_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PrefsFile {
    version: u32,
    theme: Theme,
}

pub fn load_theme() -> Theme {
    prefs_path()
        .map(|path| load_theme_from(&path))
        .unwrap_or_default()
}

pub fn save_theme(theme: Theme) -> Result<()> {
    let Some(path) = prefs_path() else {
        return Ok(());
    };
    save_theme_to(&path, theme)
}

/// Missing, unreadable or outdated files give the default theme.
pub fn load_theme_from(path: &Path) -> Theme {
    let Ok(raw) = fs::read_to_string(path) else {
        return Theme::default();
    };
    match serde_json::from_str::<PrefsFile>(&raw) {
        Ok(prefs) if prefs.version == PREFS_VERSION => prefs.theme,
        _ => Theme::default(),
    }
}

pub fn save_theme_to(path: &Path, theme: Theme) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).context("create prefs dir")?;
    }
    let json = serde_json::to_string(&PrefsFile {
        version: PREFS_VERSION,
        theme,
    })
    .context("serialize prefs")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).context("write prefs")?;
    fs::rename(&tmp, path).context("swap prefs")?;
    Ok(())
}

fn prefs_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CONFIG_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(PREFS_DIR).join(PREFS_FILE));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(PREFS_DIR)
            .join(PREFS_FILE),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join(PREFS_FILE);
        assert_eq!(load_theme_from(&path), Theme::Dark);

        save_theme_to(&path, Theme::Light).expect("save should succeed");
        assert_eq!(load_theme_from(&path), Theme::Light);
        let raw = fs::read_to_string(&path).expect("prefs readable");
        assert!(raw.contains("\"light\""));
    }

    #[test]
    fn corrupt_or_old_files_fall_back_to_dark() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(PREFS_FILE);
        fs::write(&path, "{not json").expect("write");
        assert_eq!(load_theme_from(&path), Theme::Dark);
        fs::write(&path, r#"{"version":0,"theme":"light"}"#).expect("write");
        assert_eq!(load_theme_from(&path), Theme::Dark);
    }

    #[test]
    fn toggle_flips() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }
}
