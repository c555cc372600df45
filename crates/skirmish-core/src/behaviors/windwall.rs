//! Barrier that hurts the opponent each round.

use serde::{Deserialize, Serialize};

use crate::behavior::{ActionContext, ActionName, Behavior, BehaviorDeclaration, OpponentView};
use crate::combatant::Combatant;
use crate::error::EngineError;
use crate::status::{keys, Lifetime};

use super::{check_action, check_positive, module_id};

/// Parameters of [`Windwall`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindwallParams {
    /// Module id; defaults to the action name.
    #[serde(default)]
    pub id: Option<String>,
    /// Action name.
    pub action: String,
    /// Damage dealt to the opponent at each round end.
    pub damage: u32,
    /// Duration in rounds.
    pub rounds: u32,
}

/// Raises a wind wall on the actor. The round-end tick turns the engine
/// `windwall` entry into damage against the opponent.
#[derive(Debug, Clone)]
pub struct Windwall {
    declaration: BehaviorDeclaration,
    params: WindwallParams,
}

impl Windwall {
    /// Creates the module.
    ///
    /// # Errors
    ///
    /// Fails on an invalid action name or a zero damage/duration.
    pub fn new(params: WindwallParams) -> Result<Self, EngineError> {
        let id = module_id(params.id.as_deref(), &params.action);
        check_action(&id, "action", &params.action)?;
        check_positive(&id, "damage", params.damage)?;
        check_positive(&id, "rounds", params.rounds)?;
        Ok(Self {
            declaration: BehaviorDeclaration::new(id).action(&params.action),
            params,
        })
    }
}

impl Behavior for Windwall {
    fn declaration(&self) -> &BehaviorDeclaration {
        &self.declaration
    }

    fn weight(&self, _action: &ActionName, actor: &Combatant, _opponent: OpponentView<'_>) -> Option<u32> {
        actor.status().has(&keys::WINDWALL).then_some(0)
    }

    fn perform(&self, _action: &ActionName, ctx: &mut ActionContext<'_>) -> Result<(), EngineError> {
        let line = format!("A howling wall of wind rises around {}.", ctx.actor().display_name());
        ctx.say(line);
        ctx.status_mut()
            .set(keys::WINDWALL, self.params.damage, Lifetime::Rounds(self.params.rounds));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::rng::FixedRng;
    use crate::selector::ActionTable;
    use crate::tests::helpers::{dummy, enemy_with_table};

    #[test]
    fn raises_wall_and_suppresses_itself() {
        let module = Windwall::new(WindwallParams {
            id: None,
            action: "gust".into(),
            damage: 3,
            rounds: 2,
        })
        .unwrap();
        let gust = ActionName::new("gust");
        let hero = dummy();
        let mut djinn = enemy_with_table(ActionTable::new());

        let config = EngineConfig::default();
        let mut rng = FixedRng::new(0.0);
        let mut ctx = ActionContext::new(&mut djinn, &hero, &mut rng, &config);
        module.perform(&gust, &mut ctx).unwrap();
        drop(ctx);

        assert_eq!(djinn.status().get_i64(&keys::WINDWALL, 0), 3);
        assert_eq!(djinn.status().remaining(&keys::WINDWALL), Some(2));
        assert_eq!(module.weight(&gust, &djinn, OpponentView::new(&hero)), Some(0));
    }
}
