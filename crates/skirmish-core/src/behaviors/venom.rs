//! Poisoning attack.

use serde::{Deserialize, Serialize};

use crate::behavior::{ActionContext, ActionName, Behavior, BehaviorDeclaration, OpponentView};
use crate::combatant::Combatant;
use crate::error::EngineError;
use crate::resolver::AttackProfile;
use crate::status::{keys, Lifetime, StatusKey};

use super::{check_action, check_positive, module_id};

/// Parameters of [`Venom`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenomParams {
    /// Module id; defaults to the action name.
    #[serde(default)]
    pub id: Option<String>,
    /// Action name.
    pub action: String,
    /// The carrying attack.
    pub profile: AttackProfile,
    /// Poison damage per round.
    pub damage: u32,
    /// Poison duration in rounds.
    pub rounds: u32,
}

/// An attack that poisons the opponent on hit.
///
/// While a dose it applied is still running the module suppresses its own
/// action, tracked through a private `envenomed` key on the actor.
#[derive(Debug, Clone)]
pub struct Venom {
    declaration: BehaviorDeclaration,
    params: VenomParams,
    envenomed: StatusKey,
}

impl Venom {
    /// Creates the module.
    ///
    /// # Errors
    ///
    /// Fails on an invalid action name or a zero damage/duration.
    pub fn new(params: VenomParams) -> Result<Self, EngineError> {
        let id = module_id(params.id.as_deref(), &params.action);
        check_action(&id, "action", &params.action)?;
        check_positive(&id, "damage", params.damage)?;
        check_positive(&id, "rounds", params.rounds)?;
        let declaration = BehaviorDeclaration::new(id).action(&params.action);
        let envenomed = declaration.key("envenomed");
        Ok(Self {
            declaration: declaration.owns(envenomed.clone()),
            params,
            envenomed,
        })
    }
}

impl Behavior for Venom {
    fn declaration(&self) -> &BehaviorDeclaration {
        &self.declaration
    }

    fn weight(&self, _action: &ActionName, actor: &Combatant, _opponent: OpponentView<'_>) -> Option<u32> {
        actor.status().has(&self.envenomed).then_some(0)
    }

    fn perform(&self, _action: &ActionName, ctx: &mut ActionContext<'_>) -> Result<(), EngineError> {
        let info = ctx.strike(&self.params.profile);
        if info.is_hit() {
            let rounds = Lifetime::Rounds(self.params.rounds);
            ctx.afflict(keys::POISONED, self.params.damage, rounds);
            ctx.status_mut().set(self.envenomed.clone(), true, rounds);
            let line = format!("{} is poisoned!", ctx.opponent().name());
            ctx.say(capitalize(&line));
        }
        Ok(())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars
        .next()
        .map_or_else(String::new, |c| c.to_uppercase().chain(chars).collect())
}
