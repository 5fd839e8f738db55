use crate::model::Rules;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Settings {
    pub(crate) seed: u64,
    pub(crate) tick_ms: u64,
    pub(crate) sleep_timeout_secs: f32,
    pub(crate) hunger_decay_per_min: f32,
    pub(crate) happiness_decay_per_min: f32,
    pub(crate) sudden_hunger_per_sec: f32,
    pub(crate) debounce_ms: i64,
    /// Feed feedback animation; the plain build of the original ran without it.
    pub(crate) enable_pellet: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let rules = Rules::default();
        Self {
            seed: 0xC0FFEE_u64,
            tick_ms: 100,
            sleep_timeout_secs: rules.sleep_timeout_secs,
            hunger_decay_per_min: rules.hunger_decay_per_min,
            happiness_decay_per_min: rules.happiness_decay_per_min,
            sudden_hunger_per_sec: rules.sudden_hunger_per_sec,
            debounce_ms: 200,
            enable_pellet: true,
        }
    }
}

impl Settings {
    pub(crate) fn rules(&self) -> Rules {
        Rules {
            hunger_decay_per_min: self.hunger_decay_per_min,
            happiness_decay_per_min: self.happiness_decay_per_min,
            sleep_timeout_secs: self.sleep_timeout_secs,
            sudden_hunger_per_sec: self.sudden_hunger_per_sec,
            ..Rules::default()
        }
    }
}

pub(crate) struct Paths {
    pub(crate) settings_path: PathBuf,
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "bunnygotchi", "Bunnygotchi")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir).ok();
    Ok(Paths {
        settings_path: dir.join("settings.json"),
    })
}

pub(crate) fn load_settings(path: &Path) -> Settings {
    if let Ok(s) = fs::read_to_string(path) {
        if let Ok(v) = serde_json::from_str::<Settings>(&s) {
            return v;
        }
    }
    Settings::default()
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data)?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // Best-effort atomic replace on same filesystem.
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to)?;
    Ok(())
}
