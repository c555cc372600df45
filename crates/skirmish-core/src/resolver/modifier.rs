//! Attack modifiers.
//!
//! A modifier takes the evolving [`AttackDraft`] and returns it, possibly
//! changed. The built-in ones run first, in the order of
//! [`BUILTIN_MODIFIERS`]; modifiers supplied by the attacker's behaviors run
//! after them in composition order.

use crate::behavior::OpponentView;
use crate::combatant::{Combatant, PropertyTags};
use crate::config::EngineConfig;
use crate::status::{keys, StatusStore};

use super::attack::AttackDraft;

/// What a modifier can see about the attack.
pub struct ModifierContext<'a> {
    attacker: &'a Combatant,
    defender: &'a Combatant,
    tags: PropertyTags,
    config: &'a EngineConfig,
}

impl<'a> ModifierContext<'a> {
    pub(crate) fn new(
        attacker: &'a Combatant,
        defender: &'a Combatant,
        tags: PropertyTags,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            attacker,
            defender,
            tags,
            config,
        }
    }

    /// The attacking combatant.
    #[must_use]
    pub fn attacker(&self) -> &'a Combatant {
        self.attacker
    }

    /// The defender, without its status.
    #[must_use]
    pub fn defender(&self) -> OpponentView<'a> {
        OpponentView::new(self.defender)
    }

    /// Attacker tags united with the profile's tags.
    #[must_use]
    pub fn tags(&self) -> PropertyTags {
        self.tags
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &'a EngineConfig {
        self.config
    }

    fn defender_status(&self) -> &'a StatusStore {
        self.defender.status()
    }
}

/// A step in the damage pipeline.
pub trait AttackModifier: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Returns the draft after this modifier.
    fn modify(&self, draft: AttackDraft, ctx: &ModifierContext<'_>) -> AttackDraft;
}

/// Built-in modifiers in pipeline order.
pub const BUILTIN_MODIFIERS: &[&dyn AttackModifier] = &[
    &AreaOfEffect,
    &Elemental,
    &GuaranteedCrit,
    &Piercing,
    &DamageDealtMultiplier,
    &DamageTakenMultiplier,
];

/// Area attacks hit group defenders harder.
#[derive(Debug, Clone, Copy, Default)]
pub struct AreaOfEffect;

impl AttackModifier for AreaOfEffect {
    fn name(&self) -> &str {
        "area_of_effect"
    }

    fn modify(&self, mut draft: AttackDraft, ctx: &ModifierContext<'_>) -> AttackDraft {
        if ctx.tags().contains(PropertyTags::AOE) && ctx.defender().tags().contains(PropertyTags::GROUP) {
            draft.damage *= ctx.config().area_multiplier;
            draft.notes.push("The blow sweeps through the whole group.".to_string());
        }
        draft
    }
}

/// Burn against chill, and chill against burn.
#[derive(Debug, Clone, Copy, Default)]
pub struct Elemental;

impl AttackModifier for Elemental {
    fn name(&self) -> &str {
        "elemental"
    }

    fn modify(&self, mut draft: AttackDraft, ctx: &ModifierContext<'_>) -> AttackDraft {
        let attack = ctx.tags();
        let defence = ctx.defender().tags();
        let clash = (attack.contains(PropertyTags::BURN) && defence.contains(PropertyTags::CHILL))
            || (attack.contains(PropertyTags::CHILL) && defence.contains(PropertyTags::BURN));
        if clash {
            draft.damage *= ctx.config().elemental_multiplier;
            draft.notes.push("The elements clash!".to_string());
        }
        draft
    }
}

/// Forces a critical hit unless the attack cannot crit.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuaranteedCrit;

impl AttackModifier for GuaranteedCrit {
    fn name(&self) -> &str {
        "guaranteed_crit"
    }

    fn modify(&self, mut draft: AttackDraft, ctx: &ModifierContext<'_>) -> AttackDraft {
        let tags = ctx.tags();
        if tags.contains(PropertyTags::GUARANTEED_CRIT) && !tags.contains(PropertyTags::CANNOT_CRIT) && !draft.crit {
            draft.crit = true;
            draft.damage *= ctx.config().crit_multiplier;
        }
        draft
    }
}

/// Undoes defence mitigation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Piercing;

impl AttackModifier for Piercing {
    fn name(&self) -> &str {
        "piercing"
    }

    fn modify(&self, mut draft: AttackDraft, ctx: &ModifierContext<'_>) -> AttackDraft {
        if ctx.tags().contains(PropertyTags::PIERCING) && draft.mitigation > 0.0 && draft.mitigation < 1.0 {
            draft.damage /= 1.0 - draft.mitigation;
            draft.mitigation = 0.0;
        }
        draft
    }
}

/// Attacker's `damage_multiplier` status.
#[derive(Debug, Clone, Copy, Default)]
pub struct DamageDealtMultiplier;

impl AttackModifier for DamageDealtMultiplier {
    fn name(&self) -> &str {
        "damage_multiplier"
    }

    fn modify(&self, mut draft: AttackDraft, ctx: &ModifierContext<'_>) -> AttackDraft {
        let factor = ctx.attacker().status().get_f64(&keys::DAMAGE_MULTIPLIER, 1.0);
        if factor.is_finite() && factor >= 0.0 {
            draft.damage *= factor;
        }
        draft
    }
}

/// Defender's `damage_taken_multiplier` status.
#[derive(Debug, Clone, Copy, Default)]
pub struct DamageTakenMultiplier;

impl AttackModifier for DamageTakenMultiplier {
    fn name(&self) -> &str {
        "damage_taken_multiplier"
    }

    fn modify(&self, mut draft: AttackDraft, ctx: &ModifierContext<'_>) -> AttackDraft {
        let factor = ctx.defender_status().get_f64(&keys::DAMAGE_TAKEN_MULTIPLIER, 1.0);
        if factor.is_finite() && factor >= 0.0 {
            draft.damage *= factor;
        }
        draft
    }
}
