//! Built-in behavior modules.
//!
//! - [`Strike`]: a named attack
//! - [`Venom`]: an attack that poisons on hit
//! - [`Bash`]: an attack with a chance to stun
//! - [`ChargedBlow`]: a wind-up followed by a heavy release
//! - [`Enrage`]: a one-time damage buff at low hp
//! - [`Windwall`]: a barrier that hurts the opponent every round
//! - [`Executioner`]: bonus damage against weakened opponents (modifier only)
//! - [`Renown`]: regional reputation on defeat (reward only)
//!
//! Content describes modules as [`BehaviorSpec`] values, internally tagged by
//! `type`:
//!
//! ```
//! use skirmish_core::behaviors::BehaviorSpec;
//!
//! let spec: BehaviorSpec = serde_json::from_str(r#"{
//!     "type": "bash",
//!     "action": "shield_bash",
//!     "profile": { "label": "shield bash" },
//!     "chance": 25.0,
//!     "rounds": 1
//! }"#).unwrap();
//! let module = spec.build().unwrap();
//! assert_eq!(module.declaration().id.as_str(), "shield_bash");
//! ```

mod bash;
mod charged;
mod enrage;
mod executioner;
mod renown;
mod strike;
mod venom;
mod windwall;

pub use bash::{Bash, BashParams};
pub use charged::{ChargedBlow, ChargedBlowParams};
pub use enrage::{Enrage, EnrageParams};
pub use executioner::{Executioner, ExecutionerParams};
pub use renown::{Renown, RenownParams};
pub use strike::{Strike, StrikeParams};
pub use venom::{Venom, VenomParams};
pub use windwall::{Windwall, WindwallParams};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::behavior::{ActionName, Behavior, BehaviorId, BehaviorSet, OpponentView};
use crate::combatant::Combatant;
use crate::error::EngineError;

/// Serializable description of a built-in module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BehaviorSpec {
    /// See [`Strike`].
    Strike(StrikeParams),
    /// See [`Venom`].
    Venom(VenomParams),
    /// See [`Bash`].
    Bash(BashParams),
    /// See [`ChargedBlow`].
    ChargedBlow(ChargedBlowParams),
    /// See [`Enrage`].
    Enrage(EnrageParams),
    /// See [`Windwall`].
    Windwall(WindwallParams),
    /// See [`Executioner`].
    Executioner(ExecutionerParams),
    /// See [`Renown`].
    Renown(RenownParams),
}

impl BehaviorSpec {
    /// Builds the module.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] when a parameter is out of
    /// range.
    pub fn build(&self) -> Result<Arc<dyn Behavior>, EngineError> {
        Ok(match self {
            Self::Strike(p) => Arc::new(Strike::new(p.clone())?),
            Self::Venom(p) => Arc::new(Venom::new(p.clone())?),
            Self::Bash(p) => Arc::new(Bash::new(p.clone())?),
            Self::ChargedBlow(p) => Arc::new(ChargedBlow::new(p.clone())?),
            Self::Enrage(p) => Arc::new(Enrage::new(p.clone())?),
            Self::Windwall(p) => Arc::new(Windwall::new(p.clone())?),
            Self::Executioner(p) => Arc::new(Executioner::new(p.clone())?),
            Self::Renown(p) => Arc::new(Renown::new(p.clone())?),
        })
    }
}

/// Builds and composes a list of specs in order.
///
/// # Errors
///
/// Fails on the first invalid module or on any composition collision.
pub fn compose_specs(specs: &[BehaviorSpec]) -> Result<BehaviorSet, EngineError> {
    let modules = specs.iter().map(BehaviorSpec::build).collect::<Result<Vec<_>, _>>()?;
    Ok(BehaviorSet::compose(modules)?)
}

// ===== Shared helpers =====

/// Module id: the explicit one, else the fallback.
fn module_id(id: Option<&str>, fallback: &str) -> BehaviorId {
    BehaviorId::new(id.unwrap_or(fallback))
}

fn invalid(id: &BehaviorId, param: &'static str, reason: impl Into<String>) -> EngineError {
    EngineError::InvalidParameter {
        behavior: id.clone(),
        param,
        reason: reason.into(),
    }
}

/// Rejects empty names and names that shadow a built-in action.
fn check_action(id: &BehaviorId, param: &'static str, action: &str) -> Result<(), EngineError> {
    if action.trim().is_empty() {
        return Err(invalid(id, param, "action name is empty"));
    }
    if ActionName::new(action).is_builtin() {
        return Err(invalid(id, param, format!("`{action}` is a built-in action")));
    }
    Ok(())
}

fn check_positive(id: &BehaviorId, param: &'static str, value: u32) -> Result<(), EngineError> {
    if value == 0 {
        return Err(invalid(id, param, "must be at least 1"));
    }
    Ok(())
}

fn check_percent(id: &BehaviorId, param: &'static str, value: f64) -> Result<(), EngineError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(invalid(id, param, format!("{value} is not a percentage")));
    }
    Ok(())
}

fn check_multiplier(id: &BehaviorId, param: &'static str, value: f64) -> Result<(), EngineError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(invalid(id, param, format!("{value} is not a positive multiplier")));
    }
    Ok(())
}

/// Fills `{actor}` and `{opponent}` in a message template.
fn render(template: &str, actor: &Combatant, opponent: OpponentView<'_>) -> String {
    template
        .replace("{actor}", &actor.title_name())
        .replace("{opponent}", &opponent.name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompositionError;

    #[test]
    fn every_variant_parses() {
        let json = r#"[
            { "type": "strike", "action": "claw", "profile": { "label": "claw" } },
            { "type": "venom", "action": "bite", "profile": { "label": "bite" }, "damage": 2, "rounds": 3 },
            { "type": "bash", "action": "bash", "profile": { "label": "bash" }, "chance": 50.0, "rounds": 1 },
            { "type": "charged_blow", "windup": "rear_up", "release": "crush", "profile": { "label": "crush" } },
            { "type": "enrage", "action": "roar", "threshold": 30.0, "multiplier": 1.5 },
            { "type": "windwall", "action": "gust", "damage": 3, "rounds": 2 },
            { "type": "executioner", "threshold": 25.0, "multiplier": 2.0 },
            { "type": "renown", "region": "Marsh", "amount": 5 }
        ]"#;
        let specs: Vec<BehaviorSpec> = serde_json::from_str(json).unwrap();
        let set = compose_specs(&specs).unwrap();
        assert_eq!(set.len(), 8);
        assert!(set.implements(&ActionName::new("crush")));
    }

    #[test]
    fn missing_parameter_fails_to_parse() {
        let json = r#"{ "type": "venom", "action": "bite", "profile": { "label": "bite" }, "rounds": 3 }"#;
        assert!(serde_json::from_str::<BehaviorSpec>(json).is_err());
    }

    #[test]
    fn invalid_parameter_is_fatal() {
        let json = r#"{ "type": "bash", "action": "bash", "profile": { "label": "bash" }, "chance": 150.0, "rounds": 1 }"#;
        let spec: BehaviorSpec = serde_json::from_str(json).unwrap();
        let err = spec.build().err().unwrap();
        assert!(matches!(err, EngineError::InvalidParameter { param: "chance", .. }));
    }

    #[test]
    fn builtin_action_names_are_reserved() {
        let spec = BehaviorSpec::Strike(StrikeParams::new("attack", crate::resolver::AttackProfile::new("x")));
        assert!(spec.build().is_err());
    }

    #[test]
    fn two_strikes_need_distinct_actions() {
        let a = BehaviorSpec::Strike(StrikeParams::new("claw", crate::resolver::AttackProfile::new("claw")));
        let err = compose_specs(&[a.clone(), a]).unwrap_err();
        assert_eq!(
            err,
            EngineError::Composition(CompositionError::DuplicateBehavior(BehaviorId::new("claw")))
        );
    }
}
