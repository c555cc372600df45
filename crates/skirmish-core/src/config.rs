//! Engine tuning constants.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Tuning knobs shared by every fight.
///
/// Missing fields deserialize to their defaults, so a host config file only
/// needs to name what it changes:
///
/// ```
/// use skirmish_core::config::EngineConfig;
///
/// let config: EngineConfig = serde_json::from_str(r#"{ "crit_multiplier": 3.0 }"#).unwrap();
/// assert_eq!(config.crit_multiplier, 3.0);
/// assert_eq!(config.defence_scale, EngineConfig::default().defence_scale);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Damage multiplier on a critical hit.
    pub crit_multiplier: f64,
    /// `d` in `1 - defence / (defence + d)`; higher means defence matters less.
    pub defence_scale: f64,
    /// Dodge chance factor against ranged attacks.
    pub ranged_dodge_factor: f64,
    /// Chance in percent that a flee attempt succeeds.
    pub flee_chance: f64,
    /// Fraction of damage removed while defending.
    pub defend_reduction: f64,
    /// Multiplier for area attacks against group defenders.
    pub area_multiplier: f64,
    /// Multiplier for burn against chill and chill against burn.
    pub elemental_multiplier: f64,
    /// Fraction of defence removed while acid is active.
    pub acid_shred: f64,
    /// Extra miss chance in percent for a blinded attacker whose entry carries
    /// no magnitude.
    pub blind_miss_chance: f64,
    /// Stamina regained by both sides at round end.
    pub stamina_regen: i32,
    /// Extra stamina regained when defending.
    pub defend_stamina: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            crit_multiplier: 2.0,
            defence_scale: 50.0,
            ranged_dodge_factor: 0.5,
            flee_chance: 50.0,
            defend_reduction: 0.5,
            area_multiplier: 1.5,
            elemental_multiplier: 1.5,
            acid_shred: 0.25,
            blind_miss_chance: 25.0,
            stamina_regen: 1,
            defend_stamina: 2,
        }
    }
}

impl EngineConfig {
    /// Returns a copy with every field forced into its usable range.
    #[must_use]
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        self.crit_multiplier = at_least("crit_multiplier", self.crit_multiplier, 1.0);
        if !(self.defence_scale.is_finite() && self.defence_scale > 0.0) {
            warn!(value = self.defence_scale, "defence_scale must be positive, using default");
            self.defence_scale = defaults.defence_scale;
        }
        self.ranged_dodge_factor = within("ranged_dodge_factor", self.ranged_dodge_factor, 0.0, 1.0);
        self.flee_chance = within("flee_chance", self.flee_chance, 0.0, 100.0);
        self.defend_reduction = within("defend_reduction", self.defend_reduction, 0.0, 1.0);
        self.area_multiplier = at_least("area_multiplier", self.area_multiplier, 0.0);
        self.elemental_multiplier = at_least("elemental_multiplier", self.elemental_multiplier, 0.0);
        self.acid_shred = within("acid_shred", self.acid_shred, 0.0, 1.0);
        self.blind_miss_chance = within("blind_miss_chance", self.blind_miss_chance, 0.0, 100.0);
        if self.stamina_regen < 0 {
            warn!(value = self.stamina_regen, "stamina_regen below zero, clamping");
            self.stamina_regen = 0;
        }
        if self.defend_stamina < 0 {
            warn!(value = self.defend_stamina, "defend_stamina below zero, clamping");
            self.defend_stamina = 0;
        }
        self
    }
}

fn within(field: &str, value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        warn!(field, "NaN config value, using lower bound");
        return lo;
    }
    let clamped = value.clamp(lo, hi);
    if (clamped - value).abs() > f64::EPSILON {
        warn!(field, value, clamped, "config value out of range");
    }
    clamped
}

fn at_least(field: &str, value: f64, lo: f64) -> f64 {
    within(field, value, lo, f64::MAX)
}
