//! # Skirmish Core
//!
//! Turn-based combat resolution for Skirmish.
//!
//! This crate resolves one-on-one fights between a player and an enemy:
//! attack rolls, status effects with explicit lifetimes, weighted enemy
//! action selection, composable enemy behaviors and multi-phase bosses.
//!
//! ## Architecture
//!
//! - **Status**: typed, namespaced, lifetime-tagged entries per combatant
//! - **Resolver**: dodge, miss, damage, crit, then ordered modifiers
//! - **Behaviors**: modules that contribute actions, weights, modifiers and
//!   rewards, composed with collision checks
//! - **Fight**: the round state machine that applies action effects
//!
//! Everything random goes through [`rng::RandomSource`], so a fight driven by
//! a [`rng::SeededRng`] replays exactly.
//!
//! ## Usage
//!
//! ```
//! use skirmish_core::behaviors::{compose_specs, BehaviorSpec, BashParams};
//! use skirmish_core::combatant::{Combatant, Stats};
//! use skirmish_core::config::EngineConfig;
//! use skirmish_core::fight::{Fight, PlayerAction, RoundResolution};
//! use skirmish_core::resolver::AttackProfile;
//! use skirmish_core::rng::SeededRng;
//! use skirmish_core::selector::ActionTable;
//!
//! let behaviors = compose_specs(&[BehaviorSpec::Bash(BashParams {
//!     id: None,
//!     action: "shield_bash".into(),
//!     profile: AttackProfile::new("shield bash"),
//!     chance: 30.0,
//!     rounds: 1,
//! })])?;
//! let guard = Combatant::enemy("guard", "guard", 2, Stats { max_hp: 30, hp: 30, min_damage: 2, max_damage: 5, ..Stats::default() })
//!     .with_behaviors(behaviors, ActionTable::new().with("attack", 3).with("shield_bash", 1))?;
//! let hero = Combatant::player("Hero", 2, Stats { max_hp: 40, hp: 40, min_damage: 3, max_damage: 6, ..Stats::default() });
//!
//! let mut fight = Fight::new(hero, guard, EngineConfig::default(), Box::new(SeededRng::new(7)));
//! while !fight.is_over() {
//!     if let RoundResolution::Resolved(round) = fight.resolve_round(PlayerAction::Attack)? {
//!         assert!(!round.messages.is_empty());
//!     }
//! }
//! # Ok::<(), skirmish_core::error::EngineError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod behavior;
pub mod behaviors;
pub mod combatant;
pub mod config;
pub mod effect;
pub mod error;
pub mod fight;
pub mod resolver;
pub mod rng;
pub mod selector;
pub mod status;
pub mod template;

pub use behavior::{ActionName, Behavior, BehaviorDeclaration, BehaviorId, BehaviorSet, Reward};
pub use combatant::{Combatant, CombatantRecord, Stats};
pub use config::EngineConfig;
pub use error::{CompositionError, EngineError};
pub use fight::{Fight, FightHooks, FightOutcome, PlayerAction, RoundResolution, RoundResult, Unavailable};
pub use rng::{RandomSource, SeededRng};
pub use status::{Lifetime, StatusKey, StatusStore, StatusValue};
pub use template::{ContentLookup, EnemyTemplate};

#[cfg(test)]
mod tests;
