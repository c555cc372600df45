//! Extension points around damage and fight end.

use crate::behavior::Reward;
use crate::combatant::{Combatant, PropertyTags};
use crate::config::EngineConfig;
use crate::resolver::AttackInfo;
use crate::status::keys;

// =============================================================================
// Post-attack hooks
// =============================================================================

/// Adjusts a resolved attack after the resolver and before hp changes.
///
/// Hooks see both combatants in full, including status, because they run in
/// the orchestrator. They must keep the outcome invariants: only hits carry
/// damage.
pub trait PostAttackHook: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Returns the adjusted attack.
    fn apply(&self, info: AttackInfo, attacker: &Combatant, defender: &Combatant, config: &EngineConfig) -> AttackInfo;
}

/// Cuts damage against a defending target, rounding up.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefendHook;

impl PostAttackHook for DefendHook {
    fn name(&self) -> &str {
        "defend"
    }

    fn apply(&self, mut info: AttackInfo, _attacker: &Combatant, defender: &Combatant, config: &EngineConfig) -> AttackInfo {
        if info.is_hit() && info.damage > 0 && defender.status().has(&keys::DEFENDING) {
            info.damage = reduce(info.damage, config.defend_reduction);
            info.notes.push(format!("{} braces against the blow.", defender.title_name()));
        }
        info
    }
}

/// Profession rule: defenders carrying any of `tags` take `percent` less
/// damage.
#[derive(Debug, Clone)]
pub struct DamageReductionHook {
    tags: PropertyTags,
    percent: f64,
    note: Option<String>,
}

impl DamageReductionHook {
    /// Creates the hook. `percent` is clamped into `0..=100`.
    #[must_use]
    pub fn new(tags: PropertyTags, percent: f64) -> Self {
        Self {
            tags,
            percent: if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 100.0) },
            note: None,
        }
    }

    /// Adds a note to reduced attacks.
    #[must_use]
    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }
}

impl PostAttackHook for DamageReductionHook {
    fn name(&self) -> &str {
        "damage_reduction"
    }

    fn apply(&self, mut info: AttackInfo, _attacker: &Combatant, defender: &Combatant, _config: &EngineConfig) -> AttackInfo {
        if info.is_hit() && info.damage > 0 && defender.tags().intersects(self.tags) {
            info.damage = reduce(info.damage, self.percent / 100.0);
            if let Some(note) = &self.note {
                info.notes.push(note.clone());
            }
        }
        info
    }
}

/// `ceil(damage * (1 - fraction))`.
fn reduce(damage: u32, fraction: f64) -> u32 {
    let kept = f64::from(damage) * (1.0 - fraction.clamp(0.0, 1.0));
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let kept = (kept - 1e-9).ceil().max(0.0) as u32;
    kept.min(damage)
}

// =============================================================================
// Fight hooks
// =============================================================================

/// Callbacks fired exactly once when a fight ends.
///
/// All methods default to doing nothing.
pub trait FightHooks: Send {
    /// The player won. `rewards` come from the opponent's behaviors.
    fn on_success(&mut self, _player: &Combatant, _opponent: &Combatant, _rewards: &[Reward]) {}

    /// The player lost.
    fn on_failure(&mut self, _player: &Combatant, _opponent: &Combatant) {}

    /// The player fled.
    fn on_run(&mut self, _player: &Combatant, _opponent: &Combatant) {}
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl FightHooks for NoopHooks {}
