//! Stunning attack.

use serde::{Deserialize, Serialize};

use crate::behavior::{ActionContext, ActionName, Behavior, BehaviorDeclaration};
use crate::error::EngineError;
use crate::resolver::AttackProfile;
use crate::status::{keys, Lifetime};

use super::{check_action, check_percent, check_positive, module_id};

/// Parameters of [`Bash`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BashParams {
    /// Module id; defaults to the action name.
    #[serde(default)]
    pub id: Option<String>,
    /// Action name.
    pub action: String,
    /// The carrying attack.
    pub profile: AttackProfile,
    /// Stun chance on hit, percent.
    pub chance: f64,
    /// Stun duration in the target's turns.
    pub rounds: u32,
}

/// An attack with a chance to stun on hit.
#[derive(Debug, Clone)]
pub struct Bash {
    declaration: BehaviorDeclaration,
    params: BashParams,
}

impl Bash {
    /// Creates the module.
    ///
    /// # Errors
    ///
    /// Fails on an invalid action name, a chance outside `0..=100` or a zero
    /// duration.
    pub fn new(params: BashParams) -> Result<Self, EngineError> {
        let id = module_id(params.id.as_deref(), &params.action);
        check_action(&id, "action", &params.action)?;
        check_percent(&id, "chance", params.chance)?;
        check_positive(&id, "rounds", params.rounds)?;
        Ok(Self {
            declaration: BehaviorDeclaration::new(id).action(&params.action),
            params,
        })
    }
}

impl Behavior for Bash {
    fn declaration(&self) -> &BehaviorDeclaration {
        &self.declaration
    }

    fn perform(&self, _action: &ActionName, ctx: &mut ActionContext<'_>) -> Result<(), EngineError> {
        let info = ctx.strike(&self.params.profile);
        if info.is_hit() && ctx.rng().percent(self.params.chance) {
            ctx.afflict(keys::STUNNED, true, Lifetime::Rounds(self.params.rounds));
            let line = format!("{} reels from the blow!", ctx.opponent().name());
            ctx.say(line);
        }
        Ok(())
    }
}
