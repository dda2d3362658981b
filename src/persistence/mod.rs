//! Profile/inventory persistence
//!
//! The sim treats the saved profile as an opaque structured blob: it reads
//! the equipment gates before a match and writes money/xp/stat deltas back
//! after each roll. Storage failures never block play - load degrades to a
//! default profile with a warning.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::WEIGHT_MAX;
use crate::economy::{Reward, RollOutcome};
use crate::sim::state::{BallMaterial, Loadout};

/// Lifetime bowling statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifetimeStats {
    pub games: u32,
    pub strikes: u32,
    pub spares: u32,
    pub gutters: u32,
    pub pins_felled: u64,
    pub best_score: u16,
}

/// Daily challenge progress. `day_key` is an opaque calendar key supplied by
/// the caller; the core never reads a clock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub day_key: String,
    pub pins_today: u32,
    pub strikes_today: u32,
}

/// The persisted player profile: wallet, inventory, stats, achievements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub money: u64,
    pub xp: u64,
    pub owned_items: Vec<String>,
    pub equipped: Loadout,
    pub stats: LifetimeStats,
    pub daily: DailyProgress,
    pub achievements: Vec<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            money: 0,
            xp: 0,
            owned_items: Vec::new(),
            equipped: Loadout::default(),
            stats: LifetimeStats::default(),
            daily: DailyProgress::default(),
            achievements: Vec::new(),
        }
    }
}

impl Profile {
    pub fn owns(&self, item: &str) -> bool {
        self.owned_items.iter().any(|i| i == item)
    }

    /// Ball materials this inventory unlocks. Plastic is always available.
    pub fn unlocked_materials(&self) -> Vec<BallMaterial> {
        let mut materials = vec![BallMaterial::Plastic];
        if self.owns("urethane_ball") {
            materials.push(BallMaterial::Urethane);
        }
        if self.owns("resin_ball") {
            materials.push(BallMaterial::Resin);
        }
        materials
    }

    /// Weight cap; the heavy core item raises it to the hard limit
    pub fn max_weight(&self) -> f32 {
        if self.owns("heavy_core") { WEIGHT_MAX } else { 1.8 }
    }

    /// Flat impulse multiplier from equipped charms
    pub fn impact_bonus(&self) -> f32 {
        if self.owns("steel_charm") { 1.15 } else { 1.0 }
    }

    /// Gate a requested loadout to what this inventory unlocks. Locked
    /// materials fall back to plastic; everything else clamps silently.
    pub fn gate_loadout(&self, requested: Loadout) -> Loadout {
        let material = if self.unlocked_materials().contains(&requested.material) {
            requested.material
        } else {
            BallMaterial::Plastic
        };
        Loadout {
            material,
            impact_bonus: self.impact_bonus(),
            ..requested
        }
        .clamped(self.max_weight())
    }

    /// Fold one roll's outcome and reward into the profile
    pub fn record_roll(&mut self, outcome: &RollOutcome, reward: Reward) {
        self.money += reward.money as u64;
        self.xp += reward.xp as u64;
        self.stats.pins_felled += outcome.pins as u64;
        self.daily.pins_today += outcome.pins as u32;
        if outcome.strike {
            self.stats.strikes += 1;
            self.daily.strikes_today += 1;
        }
        if outcome.spare {
            self.stats.spares += 1;
        }
        if outcome.pins == 0 {
            self.stats.gutters += 1;
        }
    }

    /// Record a finished game
    pub fn record_game(&mut self, score: u16) {
        self.stats.games += 1;
        self.stats.best_score = self.stats.best_score.max(score);
    }

    /// Reset daily counters when the calendar key rolls over
    pub fn roll_daily(&mut self, day_key: &str) {
        if self.daily.day_key != day_key {
            self.daily = DailyProgress {
                day_key: day_key.to_string(),
                ..DailyProgress::default()
            };
        }
    }
}

/// Persistence collaborator boundary
pub trait ProfileStore {
    fn load(&self) -> Profile;
    fn save(&mut self, profile: &Profile);
}

/// JSON file on disk
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ProfileStore for JsonFileStore {
    fn load(&self) -> Profile {
        match fs::read_to_string(&self.path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(profile) => {
                    log::info!("loaded profile from {}", self.path.display());
                    profile
                }
                Err(err) => {
                    log::warn!("corrupt profile ({err}), starting fresh");
                    Profile::default()
                }
            },
            Err(_) => {
                log::info!("no profile at {}, starting fresh", self.path.display());
                Profile::default()
            }
        }
    }

    fn save(&mut self, profile: &Profile) {
        match serde_json::to_string_pretty(profile) {
            Ok(json) => {
                if let Err(err) = fs::write(&self.path, json) {
                    log::warn!("failed to save profile: {err}");
                }
            }
            Err(err) => log::warn!("failed to serialize profile: {err}"),
        }
    }
}

/// In-memory store for tests and headless runs
#[derive(Default)]
pub struct MemoryStore {
    slot: Option<Profile>,
}

impl ProfileStore for MemoryStore {
    fn load(&self) -> Profile {
        self.slot.clone().unwrap_or_default()
    }

    fn save(&mut self, profile: &Profile) {
        self.slot = Some(profile.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locked_material_falls_back_to_plastic() {
        let profile = Profile::default();
        let requested = Loadout {
            material: BallMaterial::Resin,
            ..Loadout::default()
        };
        assert_eq!(profile.gate_loadout(requested).material, BallMaterial::Plastic);

        let mut unlocked = Profile::default();
        unlocked.owned_items.push("resin_ball".to_string());
        assert_eq!(unlocked.gate_loadout(requested).material, BallMaterial::Resin);
    }

    #[test]
    fn test_weight_gated_by_heavy_core() {
        let mut profile = Profile::default();
        let requested = Loadout {
            weight: WEIGHT_MAX,
            ..Loadout::default()
        };
        assert_eq!(profile.gate_loadout(requested).weight, 1.8);

        profile.owned_items.push("heavy_core".to_string());
        assert_eq!(profile.gate_loadout(requested).weight, WEIGHT_MAX);
    }

    #[test]
    fn test_record_roll_accumulates() {
        let mut profile = Profile::default();
        let outcome = RollOutcome {
            player: "p".to_string(),
            frame: 3,
            pins: 10,
            strike: true,
            spare: false,
            split: false,
            consecutive_strikes: 1,
        };
        profile.record_roll(&outcome, Reward { xp: 45, money: 25 });
        assert_eq!(profile.xp, 45);
        assert_eq!(profile.money, 25);
        assert_eq!(profile.stats.strikes, 1);
        assert_eq!(profile.stats.pins_felled, 10);
    }

    #[test]
    fn test_daily_rollover_resets_counters() {
        let mut profile = Profile::default();
        profile.roll_daily("2026-08-06");
        profile.daily.pins_today = 40;
        profile.roll_daily("2026-08-06");
        assert_eq!(profile.daily.pins_today, 40);
        profile.roll_daily("2026-08-07");
        assert_eq!(profile.daily.pins_today, 0);
    }

    #[test]
    fn test_json_store_roundtrip() {
        let path = std::env::temp_dir().join("tenpin_alley_test_profile.json");
        let mut store = JsonFileStore::new(&path);

        let mut profile = Profile::default();
        profile.money = 420;
        profile.owned_items.push("urethane_ball".to_string());
        profile.record_game(227);
        store.save(&profile);

        let loaded = store.load();
        assert_eq!(loaded, profile);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_loads_default() {
        let store = JsonFileStore::new("/nonexistent/dir/profile.json");
        assert_eq!(store.load(), Profile::default());
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::default();
        assert_eq!(store.load(), Profile::default());
        let mut profile = Profile::default();
        profile.xp = 9000;
        store.save(&profile);
        assert_eq!(store.load().xp, 9000);
    }
}
