//! The attack pipeline.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::combatant::{Combatant, PropertyTags};
use crate::config::EngineConfig;
use crate::rng::RandomSource;
use crate::status::{keys, StatusValue};

use super::modifier::{AttackModifier, ModifierContext, BUILTIN_MODIFIERS};

/// Float noise tolerated before rounding up.
const ROUNDING_TOLERANCE: f64 = 1e-9;

// =============================================================================
// Types
// =============================================================================

/// Outcome of one attack; exactly one holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackOutcome {
    /// The attack connected.
    Hit,
    /// The defender dodged.
    Dodge,
    /// The attacker missed.
    Miss,
}

/// Result of a resolved attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackInfo {
    /// Hit, dodge or miss.
    pub outcome: AttackOutcome,
    /// Final damage; always 0 unless `outcome` is `Hit`.
    pub damage: u32,
    /// Critical hit; only ever set on hits.
    pub crit: bool,
    /// Message fragments contributed by modifiers and hooks.
    pub notes: Vec<String>,
}

impl AttackInfo {
    fn avoided(outcome: AttackOutcome) -> Self {
        Self {
            outcome,
            damage: 0,
            crit: false,
            notes: Vec::new(),
        }
    }

    /// True when the attack connected.
    #[must_use]
    pub fn is_hit(&self) -> bool {
        self.outcome == AttackOutcome::Hit
    }
}

fn one() -> f64 {
    1.0
}

/// Describes one attack.
///
/// Unset damage bounds fall back to the attacker's own range; an unset
/// offence falls back to the attacker's derived offence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackProfile {
    /// Name used in messages ("bite", "fireball").
    pub label: String,
    /// Lower damage bound override.
    #[serde(default)]
    pub min_damage: Option<u32>,
    /// Upper damage bound override.
    #[serde(default)]
    pub max_damage: Option<u32>,
    /// Tags of the blow itself.
    #[serde(default)]
    pub tags: PropertyTags,
    /// Flat multiplier applied before mitigation.
    #[serde(default = "one")]
    pub multiplier: f64,
    /// Offence override.
    #[serde(default)]
    pub offence: Option<i32>,
}

impl AttackProfile {
    /// Profile using the attacker's own range and offence.
    #[must_use]
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            min_damage: None,
            max_damage: None,
            tags: PropertyTags::ATTACK,
            multiplier: 1.0,
            offence: None,
        }
    }

    /// Sets the damage range.
    #[must_use]
    pub fn with_range(mut self, min: u32, max: u32) -> Self {
        self.min_damage = Some(min);
        self.max_damage = Some(max);
        self
    }

    /// Adds tags.
    #[must_use]
    pub fn with_tags(mut self, tags: PropertyTags) -> Self {
        self.tags |= tags;
        self
    }

    /// Sets the multiplier.
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Sets the offence override.
    #[must_use]
    pub fn with_offence(mut self, offence: i32) -> Self {
        self.offence = Some(offence);
        self
    }
}

/// Damage in flight between pipeline steps.
#[derive(Debug, Clone, PartialEq)]
pub struct AttackDraft {
    /// Unrounded damage.
    pub damage: f64,
    /// Critical hit so far.
    pub crit: bool,
    /// Fraction of damage removed by defence, in `[0, 1)`.
    pub mitigation: f64,
    /// Message fragments.
    pub notes: Vec<String>,
}

// =============================================================================
// Pipeline
// =============================================================================

/// Resolves one attack without touching either combatant.
///
/// Rolls are drawn in this order, and a roll is skipped when its chance is
/// zero: dodge, miss, damage, crit. The attacker's composed modifiers run
/// after the built-in ones.
#[must_use]
pub fn resolve_attack(
    attacker: &Combatant,
    defender: &Combatant,
    profile: &AttackProfile,
    config: &EngineConfig,
    rng: &mut dyn RandomSource,
) -> AttackInfo {
    let tags = attacker.tags() | profile.tags;
    let a = attacker.stats();
    let d = defender.stats();

    // Dodge
    let mut dodge = clamp_percent("dodge", d.dodge);
    if tags.skips_dodge() || defender.status().has(&keys::STUNNED) {
        dodge = 0.0;
    } else if tags.contains(PropertyTags::RANGED) {
        dodge *= config.ranged_dodge_factor;
    }
    if dodge > 0.0 && rng.percent(dodge) {
        return AttackInfo::avoided(AttackOutcome::Dodge);
    }

    // Miss
    if !tags.skips_miss() {
        let blind = match attacker.status().entry(&keys::BLINDED) {
            None => 0.0,
            Some(entry) => match entry.value() {
                StatusValue::Flag(_) => config.blind_miss_chance,
                value => value.as_f64(),
            },
        };
        let miss = clamp_percent("miss", clamp_percent("miss", a.miss) + blind);
        if miss > 0.0 && rng.percent(miss) {
            return AttackInfo::avoided(AttackOutcome::Miss);
        }
    }

    // Damage
    let mut lo = profile.min_damage.unwrap_or(a.min_damage);
    let mut hi = profile.max_damage.unwrap_or(a.max_damage);
    if lo > hi {
        warn!(attacker = %attacker.name(), lo, hi, "damage range inverted, swapping");
        std::mem::swap(&mut lo, &mut hi);
    }
    let base = f64::from(rng.range_inclusive(lo, hi));

    let offence = profile.offence.unwrap_or_else(|| a.offence());
    let mut scale = 1.0 + f64::from(offence) / 100.0;
    if scale < 0.0 {
        warn!(attacker = %attacker.name(), offence, "offence below -100, clamping");
        scale = 0.0;
    }
    let mut multiplier = profile.multiplier;
    if !(multiplier.is_finite() && multiplier >= 0.0) {
        warn!(label = %profile.label, multiplier, "invalid profile multiplier, clamping to 0");
        multiplier = 0.0;
    }
    let raw = base * scale * multiplier;

    let mut defence = f64::from(d.defence);
    if defence < 0.0 {
        warn!(defender = %defender.name(), defence, "negative defence, clamping");
        defence = 0.0;
    }
    if defender.status().has(&keys::ACID) {
        defence *= 1.0 - config.acid_shred;
    }
    let mitigation = if defence > 0.0 {
        defence / (defence + config.defence_scale.max(f64::EPSILON))
    } else {
        0.0
    };

    let mut draft = AttackDraft {
        damage: raw * (1.0 - mitigation),
        crit: false,
        mitigation,
        notes: Vec::new(),
    };

    // Crit
    if !tags.contains(PropertyTags::CANNOT_CRIT) {
        let crit = clamp_percent("crit", a.crit);
        if crit > 0.0 && rng.percent(crit) {
            draft.crit = true;
            draft.damage *= config.crit_multiplier;
        }
    }

    // Modifiers
    let ctx = ModifierContext::new(attacker, defender, tags, config);
    for modifier in BUILTIN_MODIFIERS {
        draft = modifier.modify(draft, &ctx);
    }
    for modifier in attacker.behaviors().modifiers() {
        draft = modifier.modify(draft, &ctx);
    }

    finalize(draft)
}

fn finalize(draft: AttackDraft) -> AttackInfo {
    let damage = if draft.damage.is_nan() {
        warn!("damage computed as NaN, using 0");
        0
    } else {
        saturating_u32((draft.damage - ROUNDING_TOLERANCE).ceil())
    };
    AttackInfo {
        outcome: AttackOutcome::Hit,
        damage,
        crit: draft.crit,
        notes: draft.notes,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn saturating_u32(value: f64) -> u32 {
    value.clamp(0.0, f64::from(u32::MAX)) as u32
}

fn clamp_percent(what: &str, value: f64) -> f64 {
    if value.is_nan() {
        warn!(what, "NaN percentage, using 0");
        return 0.0;
    }
    let clamped = value.clamp(0.0, 100.0);
    if (clamped - value).abs() > f64::EPSILON {
        warn!(what, value, clamped, "percentage outside 0..=100, clamping");
    }
    clamped
}

// =============================================================================
// Tests
// =============================================================================
