//! Attack resolution.
//!
//! The resolver turns an attacker, a defender and an [`AttackProfile`] into an
//! [`AttackInfo`]. It is pure: it reads both combatants and draws from the
//! random source, but never changes hp or status. Applying the result is the
//! fight orchestrator's job.
//!
//! # Pipeline
//!
//! 1. Dodge roll against the defender (skipped for guaranteed-hit or
//!    undodgeable attacks and stunned defenders, scaled for ranged attacks).
//! 2. Miss roll for the attacker (own miss chance plus blindness).
//! 3. Base damage in `[min, max]`, scaled by offence and the profile
//!    multiplier, mitigated by defence, then the crit roll.
//! 4. Modifiers: [`BUILTIN_MODIFIERS`] then the attacker's behavior modifiers.
//! 5. Rounded up once, never below zero.
//!
//! The order is fixed. Percentage multipliers do not commute once rounding is
//! involved, so results are defined by this order alone.
//!
//! # Example
//!
//! ```
//! use skirmish_core::combatant::{Combatant, Stats};
//! use skirmish_core::config::EngineConfig;
//! use skirmish_core::resolver::{resolve_attack, AttackOutcome, AttackProfile};
//! use skirmish_core::rng::FixedRng;
//!
//! let knight = Combatant::player("Knight", 1, Stats { force: 20, min_damage: 8, max_damage: 12, ..Stats::default() });
//! let orc = Combatant::enemy("orc", "orc", 1, Stats { defence: 5, ..Stats::default() });
//!
//! let info = resolve_attack(&knight, &orc, &AttackProfile::new("sword"), &EngineConfig::default(), &mut FixedRng::new(0.5));
//! assert_eq!(info.outcome, AttackOutcome::Hit);
//! assert_eq!(info.damage, 11);
//! ```

mod attack;
mod modifier;

pub use attack::{resolve_attack, AttackDraft, AttackInfo, AttackOutcome, AttackProfile};
pub use modifier::{
    AreaOfEffect, AttackModifier, DamageDealtMultiplier, DamageTakenMultiplier, Elemental, GuaranteedCrit,
    ModifierContext, Piercing, BUILTIN_MODIFIERS,
};
