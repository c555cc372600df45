//! Low-hp damage buff.

use serde::{Deserialize, Serialize};

use crate::behavior::{ActionContext, ActionName, Behavior, BehaviorDeclaration, OpponentView};
use crate::combatant::Combatant;
use crate::error::EngineError;
use crate::status::{keys, Lifetime, StatusKey};

use super::{check_action, check_multiplier, check_percent, module_id, render};

/// Parameters of [`Enrage`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrageParams {
    /// Module id; defaults to the action name.
    #[serde(default)]
    pub id: Option<String>,
    /// Action name.
    pub action: String,
    /// Hp percentage at or below which the action becomes available.
    pub threshold: f64,
    /// Damage multiplier for the rest of the fight.
    pub multiplier: f64,
    /// Weight once available; `None` keeps the table weight.
    #[serde(default)]
    pub weight: Option<u32>,
    /// Line with `{actor}`/`{opponent}` placeholders.
    #[serde(default)]
    pub message: Option<String>,
}

/// Once per fight, below an hp threshold, raises the actor's damage.
#[derive(Debug, Clone)]
pub struct Enrage {
    declaration: BehaviorDeclaration,
    params: EnrageParams,
    enraged: StatusKey,
}

impl Enrage {
    /// Creates the module.
    ///
    /// # Errors
    ///
    /// Fails on an invalid action name, threshold or multiplier.
    pub fn new(params: EnrageParams) -> Result<Self, EngineError> {
        let id = module_id(params.id.as_deref(), &params.action);
        check_action(&id, "action", &params.action)?;
        check_percent(&id, "threshold", params.threshold)?;
        check_multiplier(&id, "multiplier", params.multiplier)?;
        let declaration = BehaviorDeclaration::new(id).action(&params.action);
        let enraged = declaration.key("enraged");
        Ok(Self {
            declaration: declaration.owns(enraged.clone()),
            params,
            enraged,
        })
    }
}

impl Behavior for Enrage {
    fn declaration(&self) -> &BehaviorDeclaration {
        &self.declaration
    }

    fn weight(&self, _action: &ActionName, actor: &Combatant, _opponent: OpponentView<'_>) -> Option<u32> {
        if actor.status().has(&self.enraged) || actor.hp_percent() > self.params.threshold {
            return Some(0);
        }
        self.params.weight
    }

    fn perform(&self, _action: &ActionName, ctx: &mut ActionContext<'_>) -> Result<(), EngineError> {
        let line = self.params.message.as_deref().map_or_else(
            || format!("{} flies into a rage!", ctx.actor().title_name()),
            |t| render(t, ctx.actor(), ctx.opponent()),
        );
        ctx.say(line);
        let status = ctx.status_mut();
        status.set(self.enraged.clone(), true, Lifetime::Encounter);
        status.set(keys::DAMAGE_MULTIPLIER, self.params.multiplier, Lifetime::Encounter);
        Ok(())
    }
}
