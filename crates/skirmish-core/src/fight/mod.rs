//! Round orchestration and fight lifecycle.
//!
//! A [`Fight`] owns both combatants for the length of one encounter and
//! advances it one round per accepted [`PlayerAction`].
//!
//! # Architecture
//!
//! ```text
//! resolve_round(action)
//!   ├─ availability check ──────────────► Rejected(reason)
//!   ├─ Resolving: actors in initiative order
//!   │    actor ─► ActionContext ─► Vec<Effect>
//!   │    Damage effects ─► PostAttackHooks ─► hp
//!   │    section check after each action
//!   ├─ RoundEnd: tick both stores, DOTs, stamina,
//!   │    death check, section swap, death check
//!   └─ FightEnd (once): end_fight on both sides, one FightHooks call
//! ```
//!
//! # Example
//!
//! ```
//! use skirmish_core::combatant::{Combatant, Stats};
//! use skirmish_core::config::EngineConfig;
//! use skirmish_core::fight::{Fight, FightOutcome, PlayerAction, RoundResolution};
//! use skirmish_core::rng::FixedRng;
//!
//! let hero = Combatant::player("Hero", 1, Stats { max_hp: 20, hp: 20, min_damage: 5, max_damage: 5, ..Stats::default() });
//! let rat = Combatant::enemy("rat", "rat", 1, Stats { max_hp: 5, hp: 5, ..Stats::default() });
//!
//! let mut fight = Fight::new(hero, rat, EngineConfig::default(), Box::new(FixedRng::new(0.5)));
//! let RoundResolution::Resolved(result) = fight.resolve_round(PlayerAction::Attack).unwrap() else {
//!     panic!("attack is always available here");
//! };
//! assert_eq!(result.outcome, Some(FightOutcome::Success));
//! assert!(fight.is_over());
//! ```

mod hooks;
mod lifecycle;
mod player;

pub use hooks::{DamageReductionHook, DefendHook, FightHooks, NoopHooks, PostAttackHook};
pub use lifecycle::{FightOutcome, Initiative, RoundPhase, RoundResolution, RoundResult};
pub use player::{Ability, Affliction, Item, PlayerAction, Unavailable};

use tracing::{debug, info, info_span};

use crate::behavior::{ActionContext, ActionName, Reward, BASIC_ATTACK, DEFEND};
use crate::combatant::Combatant;
use crate::config::EngineConfig;
use crate::effect::{Effect, Target};
use crate::error::EngineError;
use crate::resolver::{AttackInfo, AttackOutcome, AttackProfile};
use crate::rng::RandomSource;
use crate::selector::{select_action, Selection};
use crate::status::{keys, Lifetime, TickedEntry};

/// One side of the fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Player,
    Opponent,
}

impl Side {
    fn other(self) -> Self {
        match self {
            Self::Player => Self::Opponent,
            Self::Opponent => Self::Player,
        }
    }

    fn resolve(self, target: Target) -> Self {
        match target {
            Target::Actor => self,
            Target::Opponent => self.other(),
        }
    }
}

/// What a single turn did to the flow of the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnEnd {
    Acted,
    Skipped,
    Fled,
}

/// A single encounter between a player and one opponent.
pub struct Fight {
    player: Combatant,
    opponent: Combatant,
    config: EngineConfig,
    rng: Box<dyn RandomSource>,
    post_attack: Vec<Box<dyn PostAttackHook>>,
    hooks: Box<dyn FightHooks>,
    initiative: Initiative,
    round: u32,
    phase: RoundPhase,
    outcome: Option<FightOutcome>,
}

impl Fight {
    /// Starts a fight. The config is validated; [`DefendHook`] is installed
    /// as the only post-attack hook. Fight-timed status set on either side
    /// from here on skips this fight's cleanup.
    #[must_use]
    pub fn new(
        mut player: Combatant,
        mut opponent: Combatant,
        config: EngineConfig,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        player.status_mut().begin_fight();
        opponent.status_mut().begin_fight();
        debug!(player = %player.name(), opponent = %opponent.name(), "fight started");
        Self {
            player,
            opponent,
            config: config.validated(),
            rng,
            post_attack: vec![Box::new(DefendHook)],
            hooks: Box::new(NoopHooks),
            initiative: Initiative::default(),
            round: 0,
            phase: RoundPhase::AwaitingPlayerAction,
            outcome: None,
        }
    }

    /// Installs fight-end callbacks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Box<dyn FightHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Appends a post-attack hook; hooks run in insertion order.
    #[must_use]
    pub fn with_post_attack_hook(mut self, hook: Box<dyn PostAttackHook>) -> Self {
        self.post_attack.push(hook);
        self
    }

    /// Sets the initial turn order.
    #[must_use]
    pub fn with_initiative(mut self, initiative: Initiative) -> Self {
        self.initiative = initiative;
        self
    }

    /// Changes the turn order from the next round on.
    pub fn set_initiative(&mut self, initiative: Initiative) {
        self.initiative = initiative;
    }

    // ===== Accessors =====

    /// The player.
    #[must_use]
    pub fn player(&self) -> &Combatant {
        &self.player
    }

    /// The opponent.
    #[must_use]
    pub fn opponent(&self) -> &Combatant {
        &self.opponent
    }

    /// Rounds resolved so far.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Terminal outcome, once reached.
    #[must_use]
    pub fn outcome(&self) -> Option<FightOutcome> {
        self.outcome
    }

    /// True once the fight has ended.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Engine configuration in effect.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Hands both combatants back to the host.
    #[must_use]
    pub fn into_combatants(self) -> (Combatant, Combatant) {
        (self.player, self.opponent)
    }

    // ===== Rounds =====

    /// Checks whether the player may take `action` right now.
    ///
    /// # Errors
    ///
    /// Returns the reason the action is unavailable.
    pub fn is_action_available(&self, action: &PlayerAction) -> Result<(), Unavailable> {
        if self.is_over() {
            return Err(Unavailable::FightOver);
        }
        player::check(action, &self.player, &self.opponent)
    }

    /// Runs one round with the player's `action`.
    ///
    /// An unavailable action is answered with [`RoundResolution::Rejected`]
    /// and leaves the fight untouched.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::FightOver`] after the fight has ended and
    /// [`EngineError::UnknownAction`] when the opponent is made to perform
    /// an action it has no implementation for. Such an error is a content
    /// bug and is not rolled back: the round counter has already moved and
    /// the player's action has already been applied, so the fight is left
    /// mid-round and should be discarded.
    pub fn resolve_round(&mut self, action: PlayerAction) -> Result<RoundResolution, EngineError> {
        if let Some(outcome) = self.outcome {
            return Err(EngineError::FightOver(outcome));
        }
        if let Err(reason) = player::check(&action, &self.player, &self.opponent) {
            debug!(%reason, "player action rejected");
            return Ok(RoundResolution::Rejected(reason));
        }

        self.round += 1;
        let span = info_span!("round", round = self.round);
        let _enter = span.enter();
        let mut log = Vec::new();
        let mut item_used = false;

        let mut outcome = self.resolve_actions(&action, &mut log, &mut item_used)?;
        if outcome.is_none() {
            outcome = self.end_round(&mut log);
        }

        let rewards = match outcome {
            Some(outcome) => self.finish(outcome),
            None => {
                self.enter(RoundPhase::AwaitingPlayerAction);
                Vec::new()
            }
        };

        Ok(RoundResolution::Resolved(RoundResult {
            round: self.round,
            messages: log,
            player: self.player.snapshot(),
            opponent: self.opponent.snapshot(),
            outcome,
            rewards,
            item_used,
        }))
    }

    fn enter(&mut self, phase: RoundPhase) {
        if self.phase != phase {
            debug!(from = ?self.phase, to = ?phase, "phase");
            self.phase = phase;
        }
    }

    /// Both actors in initiative order. Returns an outcome when the fight
    /// ended mid-round.
    fn resolve_actions(
        &mut self,
        action: &PlayerAction,
        log: &mut Vec<String>,
        item_used: &mut bool,
    ) -> Result<Option<FightOutcome>, EngineError> {
        self.enter(RoundPhase::Resolving);
        let order = match self.initiative {
            Initiative::PlayerFirst => [Side::Player, Side::Opponent],
            Initiative::OpponentFirst => [Side::Opponent, Side::Player],
        };
        let mut opponent_turn_lost = false;

        for side in order {
            match side {
                Side::Player => {
                    match self.player_turn(action, log) {
                        TurnEnd::Fled => return Ok(Some(FightOutcome::Run)),
                        TurnEnd::Acted => *item_used = matches!(action, PlayerAction::UseItem(_)),
                        TurnEnd::Skipped => {}
                    }
                }
                Side::Opponent => {
                    if opponent_turn_lost {
                        continue;
                    }
                    self.opponent_turn(log)?;
                }
            }

            if self.settle_sections(log) && side == Side::Player {
                opponent_turn_lost = true;
            }
            if let Some(outcome) = self.decided() {
                return Ok(Some(outcome));
            }
        }
        Ok(None)
    }

    fn player_turn(&mut self, action: &PlayerAction, log: &mut Vec<String>) -> TurnEnd {
        let status = self.player.status_mut();
        status.clear_turn_entries();
        status.mark_turn_taken();

        if self.player.status().has(&keys::STUNNED) {
            log.push(format!("{} is stunned and cannot act.", self.player.title_name()));
            return TurnEnd::Skipped;
        }

        if *action == PlayerAction::Flee {
            let chance = self.config.flee_chance;
            if self.rng.percent(chance) {
                log.push(format!("{} flees the fight.", self.player.title_name()));
                return TurnEnd::Fled;
            }
            log.push(format!("{} tries to flee but cannot get away.", self.player.title_name()));
            return TurnEnd::Acted;
        }

        let mut ctx = ActionContext::new(&mut self.player, &self.opponent, &mut *self.rng, &self.config);
        player::perform(action, &mut ctx);
        let effects = ctx.into_effects();
        self.apply_effects(Side::Player, effects, log);
        TurnEnd::Acted
    }

    fn opponent_turn(&mut self, log: &mut Vec<String>) -> Result<(), EngineError> {
        let status = self.opponent.status_mut();
        status.clear_turn_entries();
        status.mark_turn_taken();

        let action = match select_action(&self.opponent, &self.player, &mut *self.rng)? {
            Selection::Stunned => {
                log.push(format!("{} is stunned and cannot act.", self.opponent.title_name()));
                return Ok(());
            }
            Selection::Action { action, forced } => {
                if forced {
                    self.opponent.status_mut().clear(&keys::FORCED_ACTION);
                }
                action
            }
        };

        let effects = self.perform_enemy(&action)?;
        self.apply_effects(Side::Opponent, effects, log);
        Ok(())
    }

    fn perform_enemy(&mut self, action: &ActionName) -> Result<Vec<Effect>, EngineError> {
        let owner = self.opponent.behaviors().owner_of(action).cloned();
        let mut ctx = ActionContext::new(&mut self.opponent, &self.player, &mut *self.rng, &self.config);
        match (action.as_str(), owner) {
            (_, Some(module)) => module.perform(action, &mut ctx)?,
            (BASIC_ATTACK, None) => {
                ctx.strike(&AttackProfile::new(BASIC_ATTACK));
            }
            (DEFEND, None) => {
                let line = format!("{} raises a guard.", ctx.actor().title_name());
                ctx.status_mut().set(keys::DEFENDING, true, Lifetime::Turn);
                ctx.say(line);
            }
            (_, None) => {
                return Err(EngineError::UnknownAction {
                    action: action.clone(),
                    combatant: ctx.actor().display_name(),
                })
            }
        }
        Ok(ctx.into_effects())
    }

    // ===== Effects =====

    fn side(&self, side: Side) -> &Combatant {
        match side {
            Side::Player => &self.player,
            Side::Opponent => &self.opponent,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut Combatant {
        match side {
            Side::Player => &mut self.player,
            Side::Opponent => &mut self.opponent,
        }
    }

    fn apply_effects(&mut self, actor: Side, effects: Vec<Effect>, log: &mut Vec<String>) {
        for effect in effects {
            match effect {
                Effect::Message(line) => log.push(line),
                Effect::Damage { target, label, info } => {
                    self.apply_damage(actor, actor.resolve(target), &label, info, log);
                }
                Effect::Heal { target, amount } => {
                    let who = self.side_mut(actor.resolve(target));
                    let healed = who.stats_mut().heal(amount);
                    if healed > 0 {
                        log.push(format!("{} recovers {healed} hp.", who.title_name()));
                    }
                }
                Effect::ApplyStatus {
                    target,
                    key,
                    value,
                    lifetime,
                } => {
                    self.side_mut(actor.resolve(target)).status_mut().set(key, value, lifetime);
                }
                Effect::ClearStatus { target, key } => {
                    self.side_mut(actor.resolve(target)).status_mut().clear(&key);
                }
            }
        }
    }

    fn apply_damage(&mut self, attacker: Side, defender: Side, label: &str, info: AttackInfo, log: &mut Vec<String>) {
        self.enter(RoundPhase::PostAttackHooks);
        let info = {
            let (a, d) = (self.side(attacker), self.side(defender));
            self.post_attack
                .iter()
                .fold(info, |info, hook| hook.apply(info, a, d, &self.config))
        };
        log.push(describe_attack(self.side(attacker), self.side(defender), label, &info));
        log.extend(info.notes.iter().cloned());
        self.side_mut(defender).stats_mut().take_damage(info.damage);
        self.enter(RoundPhase::Resolving);
    }

    /// Runs the opponent's section machine. True when a section changed.
    fn settle_sections(&mut self, log: &mut Vec<String>) -> bool {
        if self.opponent.stats().hp > 0 {
            return false;
        }
        match self.opponent.check_section(&mut *self.rng) {
            Some(change) => {
                log.push(format!(
                    "{}'s {} is broken! It fights on with its {}.",
                    self.opponent.title_name(),
                    change.from,
                    change.to
                ));
                true
            }
            None => false,
        }
    }

    /// The player loses ties.
    fn decided(&self) -> Option<FightOutcome> {
        if self.player.is_dead() {
            Some(FightOutcome::Failure)
        } else if self.opponent.is_dead() {
            Some(FightOutcome::Success)
        } else {
            None
        }
    }

    // ===== Round end =====

    fn end_round(&mut self, log: &mut Vec<String>) -> Option<FightOutcome> {
        self.enter(RoundPhase::RoundEnd);
        let player_ticks = self.player.status_mut().tick_round();
        let opponent_ticks = self.opponent.status_mut().tick_round();
        self.apply_ticks(Side::Player, &player_ticks, log);
        self.apply_ticks(Side::Opponent, &opponent_ticks, log);

        let regen = self.config.stamina_regen;
        self.player.stats_mut().regen_stamina(regen);
        self.opponent.stats_mut().regen_stamina(regen);

        if let Some(outcome) = self.decided() {
            return Some(outcome);
        }
        self.settle_sections(log);
        self.decided()
    }

    fn apply_ticks(&mut self, owner: Side, ticks: &[TickedEntry], log: &mut Vec<String>) {
        for tick in ticks {
            let amount = u32::try_from(tick.value.as_i64().max(0)).unwrap_or(u32::MAX);
            if amount == 0 {
                continue;
            }
            let (victim, line) = if tick.key == keys::WINDWALL {
                let victim = owner.other();
                let line = format!("The wind wall batters {} for {amount} damage.", self.side(victim).display_name());
                (victim, line)
            } else if let Some(kind) = dot_kind(&tick.key) {
                let line = format!("{} suffers {amount} {kind} damage.", self.side(owner).title_name());
                (owner, line)
            } else {
                continue;
            };
            self.side_mut(victim).stats_mut().take_damage(amount);
            log.push(line);
        }
    }

    // ===== Fight end =====

    fn finish(&mut self, outcome: FightOutcome) -> Vec<Reward> {
        self.enter(RoundPhase::FightEnd);
        self.outcome = Some(outcome);
        let rewards = if outcome == FightOutcome::Success {
            self.opponent.behaviors().rewards(outcome)
        } else {
            Vec::new()
        };

        self.player.end_fight();
        self.opponent.end_fight();
        match outcome {
            FightOutcome::Success => self.hooks.on_success(&self.player, &self.opponent, &rewards),
            FightOutcome::Failure => self.hooks.on_failure(&self.player, &self.opponent),
            FightOutcome::Run => self.hooks.on_run(&self.player, &self.opponent),
        }
        info!(
            %outcome,
            rounds = self.round,
            player = %self.player.name(),
            opponent = %self.opponent.name(),
            rewards = rewards.len(),
            "fight ended"
        );
        rewards
    }
}

impl std::fmt::Debug for Fight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fight")
            .field("player", &self.player.name())
            .field("opponent", &self.opponent.name())
            .field("round", &self.round)
            .field("phase", &self.phase)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

fn dot_kind(key: &crate::status::StatusKey) -> Option<&'static str> {
    if *key == keys::POISONED {
        Some("poison")
    } else if *key == keys::BURNING {
        Some("burn")
    } else if *key == keys::ACID {
        Some("acid")
    } else {
        None
    }
}

fn describe_attack(attacker: &Combatant, defender: &Combatant, label: &str, info: &AttackInfo) -> String {
    let who = attacker.title_name();
    let whom = defender.display_name();
    match info.outcome {
        AttackOutcome::Dodge => format!("{} dodges {who}'s {label}.", defender.title_name()),
        AttackOutcome::Miss => format!("{who}'s {label} misses {whom}."),
        AttackOutcome::Hit => {
            let crit = if info.crit { "A critical hit! " } else { "" };
            if label == BASIC_ATTACK {
                format!("{crit}{who} attacks {whom} for {} damage.", info.damage)
            } else {
                format!("{crit}{who} uses {label} on {whom} for {} damage.", info.damage)
            }
        }
    }
}
