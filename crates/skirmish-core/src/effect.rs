//! Explicit action outputs.
//!
//! An action never reaches into the other combatant. Everything it does to the
//! opponent (damage, afflictions, cures) is recorded as an [`Effect`] in its
//! [`ActionContext`], and the fight orchestrator applies the list in order
//! after the action returns. The actor's own state is mutable directly.

use crate::behavior::OpponentView;
use crate::combatant::Combatant;
use crate::config::EngineConfig;
use crate::resolver::{resolve_attack, AttackInfo, AttackProfile};
use crate::rng::RandomSource;
use crate::status::{Lifetime, StatusKey, StatusStore, StatusValue};

/// Which side an effect lands on, relative to the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// The acting combatant.
    Actor,
    /// The other side.
    Opponent,
}

/// A state change proposed by an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// A resolved attack. Damage is applied after post-attack hooks run.
    Damage {
        /// Who is hit.
        target: Target,
        /// Attack name for messages.
        label: String,
        /// Resolver output.
        info: AttackInfo,
    },
    /// Restores hp.
    Heal {
        /// Who is healed.
        target: Target,
        /// Hp restored before the max-hp cap.
        amount: u32,
    },
    /// Sets a status entry.
    ApplyStatus {
        /// Whose store.
        target: Target,
        /// Entry key.
        key: StatusKey,
        /// Entry value.
        value: StatusValue,
        /// Entry lifetime.
        lifetime: Lifetime,
    },
    /// Removes a status entry.
    ClearStatus {
        /// Whose store.
        target: Target,
        /// Entry key.
        key: StatusKey,
    },
    /// A line for the round log.
    Message(String),
}

/// Everything an action may touch while it runs.
pub struct ActionContext<'a> {
    actor: &'a mut Combatant,
    opponent: &'a Combatant,
    rng: &'a mut dyn RandomSource,
    config: &'a EngineConfig,
    effects: Vec<Effect>,
}

impl<'a> ActionContext<'a> {
    /// Creates a context for one action.
    pub fn new(
        actor: &'a mut Combatant,
        opponent: &'a Combatant,
        rng: &'a mut dyn RandomSource,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            actor,
            opponent,
            rng,
            config,
            effects: Vec::new(),
        }
    }

    /// The acting combatant.
    #[must_use]
    pub fn actor(&self) -> &Combatant {
        self.actor
    }

    /// Mutable access to the actor.
    pub fn actor_mut(&mut self) -> &mut Combatant {
        self.actor
    }

    /// The actor's own status store.
    pub fn status_mut(&mut self) -> &mut StatusStore {
        self.actor.status_mut()
    }

    /// The opponent, without its status.
    #[must_use]
    pub fn opponent(&self) -> OpponentView<'_> {
        OpponentView::new(self.opponent)
    }

    /// The random source.
    pub fn rng(&mut self) -> &mut dyn RandomSource {
        &mut *self.rng
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        self.config
    }

    /// Resolves an attack on the opponent and records the damage effect.
    pub fn strike(&mut self, profile: &AttackProfile) -> AttackInfo {
        let info = resolve_attack(self.actor, self.opponent, profile, self.config, &mut *self.rng);
        self.effects.push(Effect::Damage {
            target: Target::Opponent,
            label: profile.label.clone(),
            info: info.clone(),
        });
        info
    }

    /// Records a status entry for the opponent.
    pub fn afflict(&mut self, key: StatusKey, value: impl Into<StatusValue>, lifetime: Lifetime) {
        self.effects.push(Effect::ApplyStatus {
            target: Target::Opponent,
            key,
            value: value.into(),
            lifetime,
        });
    }

    /// Records a line for the round log.
    pub fn say(&mut self, message: impl Into<String>) {
        self.effects.push(Effect::Message(message.into()));
    }

    /// Records an arbitrary effect.
    pub fn emit(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    /// Effects recorded so far.
    #[must_use]
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Consumes the context, returning the recorded effects.
    #[must_use]
    pub fn into_effects(self) -> Vec<Effect> {
        self.effects
    }
}
