//! Two-step attack: wind up, then release.

use serde::{Deserialize, Serialize};

use crate::behavior::{ActionContext, ActionName, Behavior, BehaviorDeclaration, OpponentView};
use crate::combatant::Combatant;
use crate::error::EngineError;
use crate::resolver::AttackProfile;
use crate::status::{keys, Lifetime, StatusKey};

use super::{check_action, check_multiplier, check_positive, invalid, module_id, render};

fn default_release_weight() -> u32 {
    1
}

fn default_multiplier() -> f64 {
    2.0
}

/// Parameters of [`ChargedBlow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargedBlowParams {
    /// Module id; defaults to the release action name.
    #[serde(default)]
    pub id: Option<String>,
    /// Wind-up action; this is the one the action table should list.
    pub windup: String,
    /// Release action; only selectable while charged.
    pub release: String,
    /// Weight of the release while charged (ignored when telegraphed).
    #[serde(default = "default_release_weight")]
    pub release_weight: u32,
    /// The released attack.
    pub profile: AttackProfile,
    /// Multiplier applied on top of the profile's own.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// When set, the wind-up forces the release on the next turn.
    #[serde(default)]
    pub telegraph: bool,
    /// Wind-up line with `{actor}`/`{opponent}` placeholders.
    #[serde(default)]
    pub windup_message: Option<String>,
}

/// Winds up on one turn and releases a heavy blow on a later one.
///
/// The charge lives in a private `charged` key. Without a telegraph the
/// release competes with the rest of the table once charged; with one, the
/// wind-up sets the engine's forced action so the release comes next turn.
#[derive(Debug, Clone)]
pub struct ChargedBlow {
    declaration: BehaviorDeclaration,
    params: ChargedBlowParams,
    windup: ActionName,
    release: ActionName,
    charged: StatusKey,
}

impl ChargedBlow {
    /// Creates the module.
    ///
    /// # Errors
    ///
    /// Fails on invalid or identical action names, a zero release weight or
    /// a non-positive multiplier.
    pub fn new(params: ChargedBlowParams) -> Result<Self, EngineError> {
        let id = module_id(params.id.as_deref(), &params.release);
        check_action(&id, "windup", &params.windup)?;
        check_action(&id, "release", &params.release)?;
        if params.windup == params.release {
            return Err(invalid(&id, "release", "must differ from the wind-up"));
        }
        check_positive(&id, "release_weight", params.release_weight)?;
        check_multiplier(&id, "multiplier", params.multiplier)?;

        let declaration = BehaviorDeclaration::new(id)
            .action(&params.windup)
            .action(&params.release);
        let charged = declaration.key("charged");
        Ok(Self {
            declaration: declaration.owns(charged.clone()),
            windup: ActionName::new(&params.windup),
            release: ActionName::new(&params.release),
            params,
            charged,
        })
    }
}

impl Behavior for ChargedBlow {
    fn declaration(&self) -> &BehaviorDeclaration {
        &self.declaration
    }

    fn weight(&self, action: &ActionName, actor: &Combatant, _opponent: OpponentView<'_>) -> Option<u32> {
        let charged = actor.status().has(&self.charged);
        if *action == self.release {
            Some(if charged { self.params.release_weight } else { 0 })
        } else {
            charged.then_some(0)
        }
    }

    fn perform(&self, action: &ActionName, ctx: &mut ActionContext<'_>) -> Result<(), EngineError> {
        if *action == self.windup {
            let line = self.params.windup_message.as_deref().map_or_else(
                || format!("{} gathers its strength.", ctx.actor().title_name()),
                |t| render(t, ctx.actor(), ctx.opponent()),
            );
            ctx.say(line);
            ctx.status_mut().set(self.charged.clone(), true, Lifetime::Encounter);
            if self.params.telegraph {
                ctx.status_mut()
                    .set(keys::FORCED_ACTION, self.release.as_str(), Lifetime::Rounds(1));
            }
            return Ok(());
        }
        if *action == self.release {
            ctx.status_mut().clear(&self.charged);
            let profile = self
                .params
                .profile
                .clone()
                .with_multiplier(self.params.profile.multiplier * self.params.multiplier);
            ctx.strike(&profile);
            return Ok(());
        }
        Err(EngineError::UnknownAction {
            action: action.clone(),
            combatant: ctx.actor().display_name(),
        })
    }
}
