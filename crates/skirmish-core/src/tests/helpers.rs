//! Fixtures shared by unit and crate-level tests.

use std::sync::{Arc, Mutex};

use crate::behavior::{BehaviorSet, Reward};
use crate::combatant::{Combatant, Stats};
use crate::config::EngineConfig;
use crate::fight::{Fight, FightHooks, FightOutcome, PlayerAction, RoundResolution, RoundResult};
use crate::rng::{FixedRng, SeededRng};
use crate::selector::ActionTable;

// =============================================================================
// Combatants
// =============================================================================

/// Level 1 player "Hero": 30 hp, 3-5 damage, no avoidance, no crits.
pub fn dummy() -> Combatant {
    Combatant::player(
        "Hero",
        1,
        Stats {
            max_hp: 30,
            hp: 30,
            max_mp: 10,
            mp: 10,
            max_stamina: 10,
            stamina: 10,
            force: 0,
            technique: 0,
            defence: 0,
            crit: 0.0,
            dodge: 0.0,
            miss: 0.0,
            min_damage: 3,
            max_damage: 5,
            ammo: None,
        },
    )
}

/// Level 1 goblin with 20 hp, 2-4 damage and the given table. The table may
/// only name built-in actions.
pub fn enemy_with_table(table: ActionTable) -> Combatant {
    Combatant::enemy(
        "goblin",
        "goblin",
        1,
        Stats {
            max_hp: 20,
            hp: 20,
            force: 0,
            technique: 0,
            defence: 0,
            crit: 0.0,
            dodge: 0.0,
            miss: 0.0,
            min_damage: 2,
            max_damage: 4,
            ..Stats::default()
        },
    )
    .with_behaviors(BehaviorSet::new(), table)
    .expect("built-in actions always validate")
}

/// A goblin that only attacks.
pub fn goblin() -> Combatant {
    enemy_with_table(ActionTable::new().with("attack", 1))
}

/// Player with a fixed damage roll.
pub fn hero_hitting_for(damage: u32) -> Combatant {
    let mut hero = dummy();
    hero.stats_mut().min_damage = damage;
    hero.stats_mut().max_damage = damage;
    hero
}

// =============================================================================
// Fights
// =============================================================================

/// Routes engine logs to the test harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Fight whose every roll returns `value`.
pub fn fixed_fight(player: Combatant, opponent: Combatant, value: f64) -> Fight {
    Fight::new(player, opponent, EngineConfig::default(), Box::new(FixedRng::new(value)))
}

/// Fight driven by a seeded generator.
pub fn seeded_fight(player: Combatant, opponent: Combatant, seed: u64) -> Fight {
    Fight::new(player, opponent, EngineConfig::default(), Box::new(SeededRng::new(seed)))
}

/// Resolves `action` and unwraps the accepted round.
pub fn play(fight: &mut Fight, action: PlayerAction) -> RoundResult {
    match fight.resolve_round(action).expect("round should resolve") {
        RoundResolution::Resolved(result) => result,
        RoundResolution::Rejected(reason) => panic!("action rejected: {reason}"),
    }
}

/// Plays `action` until the fight ends or `limit` rounds pass.
pub fn play_out(fight: &mut Fight, action: &PlayerAction, limit: u32) -> Vec<RoundResult> {
    let mut rounds = Vec::new();
    while !fight.is_over() && fight.round() < limit {
        rounds.push(play(fight, action.clone()));
    }
    rounds
}

// =============================================================================
// Hooks
// =============================================================================

/// One recorded fight-end callback.
#[derive(Debug, Clone, PartialEq)]
pub struct HookCall {
    pub outcome: FightOutcome,
    pub rewards: Vec<Reward>,
}

/// Fight hooks that record every call into a shared log.
#[derive(Debug, Clone, Default)]
pub struct RecordingHooks {
    pub calls: Arc<Mutex<Vec<HookCall>>>,
}

impl RecordingHooks {
    pub fn calls(&self) -> Vec<HookCall> {
        self.calls.lock().expect("hook log poisoned").clone()
    }

    fn record(&self, outcome: FightOutcome, rewards: &[Reward]) {
        self.calls.lock().expect("hook log poisoned").push(HookCall {
            outcome,
            rewards: rewards.to_vec(),
        });
    }
}

impl FightHooks for RecordingHooks {
    fn on_success(&mut self, _player: &Combatant, _opponent: &Combatant, rewards: &[Reward]) {
        self.record(FightOutcome::Success, rewards);
    }

    fn on_failure(&mut self, _player: &Combatant, _opponent: &Combatant) {
        self.record(FightOutcome::Failure, &[]);
    }

    fn on_run(&mut self, _player: &Combatant, _opponent: &Combatant) {
        self.record(FightOutcome::Run, &[]);
    }
}
