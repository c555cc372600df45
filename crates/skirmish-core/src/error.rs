//! Error types for the combat engine.
//!
//! Everything in here is a *programmer* or *content-authoring* error: an enemy
//! template that names an action nobody implements, two behavior modules that
//! claim the same status key, a fight driven past its end. These are returned
//! as `Err` and must never be swallowed.
//!
//! Player-facing unavailability ("not enough stamina", "on cooldown") is not an
//! error and lives in [`crate::fight::Unavailable`].

use thiserror::Error;

use crate::behavior::{ActionName, BehaviorId};
use crate::fight::FightOutcome;
use crate::status::StatusKey;

/// Fatal engine error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// An action name was selected or requested that no composed behavior
    /// (and no built-in action) implements.
    #[error("unknown action `{action}` for {combatant}")]
    UnknownAction {
        /// The offending action name.
        action: ActionName,
        /// Display name of the combatant that tried to use it.
        combatant: String,
    },

    /// Behavior composition failed.
    #[error(transparent)]
    Composition(#[from] CompositionError),

    /// A behavior module was built with a parameter outside its valid range.
    #[error("behavior `{behavior}` has invalid parameter `{param}`: {reason}")]
    InvalidParameter {
        /// The behavior being constructed.
        behavior: BehaviorId,
        /// Parameter name.
        param: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A template or section definition is structurally unusable.
    #[error("invalid template `{kind}`: {reason}")]
    InvalidTemplate {
        /// Content kind of the template.
        kind: String,
        /// What is wrong with it.
        reason: String,
    },

    /// `resolve_round` was called after the fight reached a terminal state.
    #[error("fight is already over ({0})")]
    FightOver(FightOutcome),
}

/// Error raised while composing behavior modules onto one combatant.
///
/// Composition is checked once, at construction time, so that a broken enemy
/// definition fails before its first fight instead of silently overwriting
/// another module's state mid-fight.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    /// The same behavior id was composed twice.
    #[error("behavior `{0}` is composed more than once")]
    DuplicateBehavior(BehaviorId),

    /// Two behaviors declared ownership of the same status key.
    #[error("status key `{key}` is owned by both `{first}` and `{second}`")]
    DuplicateStatusKey {
        /// The contested key.
        key: StatusKey,
        /// Behavior composed first.
        first: BehaviorId,
        /// Behavior composed second.
        second: BehaviorId,
    },

    /// Two behaviors implement the same action name.
    #[error("action `{action}` is implemented by both `{first}` and `{second}`")]
    DuplicateAction {
        /// The contested action.
        action: ActionName,
        /// Behavior composed first.
        first: BehaviorId,
        /// Behavior composed second.
        second: BehaviorId,
    },

    /// A behavior tried to own a key in the engine's reserved namespace, or in
    /// another behavior's private namespace.
    #[error("behavior `{behavior}` cannot own foreign status key `{key}`")]
    ForeignStatusKey {
        /// The offending behavior.
        behavior: BehaviorId,
        /// The key it declared.
        key: StatusKey,
    },

    /// The base action table names an action that is neither built in nor
    /// implemented by any composed behavior.
    #[error("action table entry `{0}` has no implementation")]
    UnimplementedAction(ActionName),
}
