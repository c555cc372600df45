//! End-to-end fights through the round orchestrator.

use std::sync::Arc;

use crate::behavior::{ActionContext, ActionName, Behavior, BehaviorDeclaration, BehaviorSet, OpponentView, Reward};
use crate::behaviors::{compose_specs, BehaviorSpec, ChargedBlowParams, RenownParams, VenomParams};
use crate::combatant::{Combatant, Determiner, HpPolicy, PropertyTags, Section, SectionOrder, Sections, Stats};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::fight::{Ability, Affliction, Fight, FightOutcome, Initiative, Item, PlayerAction, RoundPhase, RoundResult, Unavailable};
use crate::resolver::AttackProfile;
use crate::rng::FixedRng;
use crate::selector::ActionTable;
use crate::status::{keys, Lifetime, StatusKey, StatusValue};
use crate::template::EnemyTemplate;

use super::helpers::{
    dummy, enemy_with_table, fixed_fight, goblin, hero_hitting_for, init_tracing, play, play_out, HookCall,
    RecordingHooks,
};

// =============================================================================
// Fixtures
// =============================================================================

/// Stuns the opponent once per fight, then never again.
struct Ambusher {
    declaration: BehaviorDeclaration,
    used: StatusKey,
}

impl Ambusher {
    fn new() -> Self {
        let declaration = BehaviorDeclaration::new("ambusher".into()).action("sucker_punch");
        let used = declaration.key("used");
        Self {
            declaration: declaration.owns(used.clone()),
            used,
        }
    }
}

impl Behavior for Ambusher {
    fn declaration(&self) -> &BehaviorDeclaration {
        &self.declaration
    }

    fn weight(&self, _action: &ActionName, actor: &Combatant, _opponent: OpponentView<'_>) -> Option<u32> {
        actor.status().has(&self.used).then_some(0)
    }

    fn perform(&self, _action: &ActionName, ctx: &mut ActionContext<'_>) -> Result<(), EngineError> {
        ctx.status_mut().set(self.used.clone(), true, Lifetime::Encounter);
        ctx.afflict(keys::STUNNED, true, Lifetime::Rounds(1));
        ctx.say("A fist comes out of nowhere.");
        Ok(())
    }
}

fn ambusher() -> Combatant {
    let set = BehaviorSet::compose(vec![Arc::new(Ambusher::new())]).unwrap();
    enemy_with_table(ActionTable::new())
        .with_behaviors(set, ActionTable::new().with("sucker_punch", 1).with("attack", 1))
        .unwrap()
}

fn hydra(first: HpPolicy) -> Combatant {
    let sections = Sections::new(
        "hydra",
        vec![
            Section::new("left head", 10, ActionTable::new().with("attack", 1), first),
            Section::new("right head", 10, ActionTable::new().with("defend", 1), HpPolicy::Full),
        ],
        SectionOrder::Fixed,
    )
    .unwrap();
    Combatant::enemy("hydra", "hydra", 5, Stats::default())
        .with_determiner(Determiner::The)
        .with_tags(PropertyTags::BOSS | PropertyTags::NO_ESCAPE)
        .with_sections(sections)
        .unwrap()
}

fn count(rounds: &[RoundResult], line: &str) -> usize {
    rounds
        .iter()
        .flat_map(|r| r.messages.iter())
        .filter(|m| m.as_str() == line)
        .count()
}

// =============================================================================
// Multi-phase bosses
// =============================================================================

#[test]
fn boss_switches_section_then_dies() {
    init_tracing();
    let mut fight = fixed_fight(hero_hitting_for(10), hydra(HpPolicy::Full), 0.5);

    let first = play(&mut fight, PlayerAction::Attack);
    assert_eq!(first.outcome, None);
    assert_eq!(
        first.messages,
        [
            "Hero attacks the hydra for 10 damage.",
            "The hydra's left head is broken! It fights on with its right head.",
        ]
    );
    assert_eq!(first.opponent.hp, 10);
    assert_eq!(first.opponent.section.as_deref(), Some("right head"));
    assert_eq!(first.player.hp, 30, "the switch consumes the boss's turn");

    let second = play(&mut fight, PlayerAction::Attack);
    assert_eq!(second.outcome, Some(FightOutcome::Success));
    let (_, boss) = fight.into_combatants();
    assert_eq!(boss.status().get_i64(&StatusKey::section_hp("left head"), -1), 0);
    assert!(boss.sections().unwrap().all_defeated());
}

#[test]
fn boss_cannot_be_fled() {
    let fight = fixed_fight(dummy(), hydra(HpPolicy::Full), 0.5);
    assert_eq!(fight.is_action_available(&PlayerAction::Flee), Err(Unavailable::CannotFlee));
}

#[test]
fn restore_policy_carries_section_hp_between_fights() {
    let template: EnemyTemplate = serde_json::from_str(
        r#"{
            "kind": "hydra",
            "determiner": "The",
            "stats": { "base": { "max_hp": 1 } },
            "sections": {
                "sections": [
                    { "name": "left head", "max_hp": 20, "actions": [{ "action": "attack", "weight": 1 }], "policy": "Restore" },
                    { "name": "right head", "max_hp": 20, "actions": [{ "action": "attack", "weight": 1 }] }
                ]
            }
        }"#,
    )
    .unwrap();

    let config = EngineConfig {
        flee_chance: 100.0,
        ..EngineConfig::default()
    };
    let mut fight = Fight::new(hero_hitting_for(5), template.build(5).unwrap(), config, Box::new(FixedRng::new(0.5)));
    play(&mut fight, PlayerAction::Attack);
    let fled = play(&mut fight, PlayerAction::Flee);
    assert_eq!(fled.outcome, Some(FightOutcome::Run));

    let (_, wounded) = fight.into_combatants();
    let record = wounded.to_record();
    let mut again = template.build(5).unwrap();
    assert_eq!(again.stats().hp, 20);
    again.restore_status(record.status);
    assert_eq!(again.stats().hp, 15);
}

// =============================================================================
// Status timing
// =============================================================================

#[test]
fn stun_costs_exactly_one_turn_when_applied_after_acting() {
    let mut fight = fixed_fight(dummy(), ambusher(), 0.0);
    let rounds = play_out(&mut fight, &PlayerAction::Attack, 4);
    assert_eq!(rounds.len(), 4);
    assert_eq!(count(&rounds, "Hero is stunned and cannot act."), 1);
    assert!(rounds[1].messages.contains(&"Hero is stunned and cannot act.".to_string()));
}

#[test]
fn stun_costs_exactly_one_turn_when_applied_first() {
    let mut fight = fixed_fight(dummy(), ambusher(), 0.0).with_initiative(Initiative::OpponentFirst);
    let rounds = play_out(&mut fight, &PlayerAction::Attack, 4);
    assert_eq!(count(&rounds, "Hero is stunned and cannot act."), 1);
    assert_eq!(rounds[0].messages[0], "A fist comes out of nowhere.");
    assert_eq!(rounds[0].messages[1], "Hero is stunned and cannot act.");
}

#[test]
fn late_poison_counts_the_victims_turns() {
    let behaviors = compose_specs(&[BehaviorSpec::Venom(VenomParams {
        id: None,
        action: "bite".into(),
        profile: AttackProfile::new("bite"),
        damage: 1,
        rounds: 2,
    })])
    .unwrap();
    let spider = enemy_with_table(ActionTable::new())
        .with_behaviors(behaviors, ActionTable::new().with("bite", 1))
        .unwrap();
    let mut fight = fixed_fight(dummy(), spider, 0.5);
    let rounds = play_out(&mut fight, &PlayerAction::Attack, 3);

    let tick = "Hero suffers 1 poison damage.".to_string();
    assert!(rounds[0].messages.contains(&"Hero is poisoned!".to_string()));
    assert!(!rounds[0].messages.contains(&tick));
    assert!(rounds[1].messages.contains(&tick));
    assert!(rounds[2].messages.contains(&tick));
    assert!(!fight.player().status().has(&keys::POISONED));
}

#[test]
fn telegraphed_blow_lands_next_turn() {
    let behaviors = compose_specs(&[BehaviorSpec::ChargedBlow(ChargedBlowParams {
        id: None,
        windup: "wind_up".into(),
        release: "smash".into(),
        release_weight: 1,
        profile: AttackProfile::new("smash").with_range(5, 5),
        multiplier: 2.0,
        telegraph: true,
        windup_message: None,
    })])
    .unwrap();
    let ogre = enemy_with_table(ActionTable::new())
        .with_behaviors(behaviors, ActionTable::new().with("wind_up", 1))
        .unwrap();
    let mut fight = fixed_fight(dummy(), ogre, 0.5);

    let first = play(&mut fight, PlayerAction::Attack);
    assert!(first.messages.contains(&"A goblin gathers its strength.".to_string()));
    assert_eq!(first.player.hp, 30);

    let second = play(&mut fight, PlayerAction::Attack);
    assert!(second.messages.contains(&"A goblin uses smash on Hero for 10 damage.".to_string()));
    assert_eq!(second.player.hp, 20);
    assert!(!fight.opponent().status().has(&keys::FORCED_ACTION));
}

#[test]
fn spell_cooldown_and_burn() {
    let firebolt = Ability {
        cost: 2,
        profile: Some(AttackProfile::new("firebolt").with_range(2, 2)),
        afflictions: vec![Affliction {
            key: keys::BURNING,
            value: StatusValue::Int(1),
            lifetime: Lifetime::Rounds(2),
        }],
        cooldown: Some(Lifetime::Rounds(2)),
        ..Ability::new("Firebolt")
    };
    let cast = PlayerAction::Cast(firebolt);
    let mut fight = fixed_fight(dummy(), goblin(), 0.5);

    let first = play(&mut fight, cast.clone());
    assert_eq!(first.messages[0], "Hero casts Firebolt.");
    assert_eq!(first.messages[1], "Hero uses firebolt on a goblin for 2 damage.");
    assert_eq!(first.opponent.hp, 17);
    assert_eq!(first.player.mp, 8);
    assert_eq!(
        fight.is_action_available(&cast),
        Err(Unavailable::OnCooldown {
            name: "Firebolt".into(),
            remaining: Some(2)
        })
    );

    play(&mut fight, PlayerAction::Attack);
    assert!(matches!(
        fight.is_action_available(&cast),
        Err(Unavailable::OnCooldown { remaining: Some(1), .. })
    ));
    play(&mut fight, PlayerAction::Attack);
    assert_eq!(fight.is_action_available(&cast), Ok(()));
}

#[test]
fn fight_cooldown_used_mid_fight_blocks_the_next_fight() {
    let cleave = PlayerAction::Skill(Ability {
        profile: Some(AttackProfile::new("cleave").with_range(30, 30)),
        cooldown: Some(Lifetime::Fights(1)),
        ..Ability::new("Cleave")
    });
    let mut fight = fixed_fight(dummy(), goblin(), 0.5);
    let won = play(&mut fight, cleave.clone());
    assert_eq!(won.outcome, Some(FightOutcome::Success));
    let (hero, _) = fight.into_combatants();
    assert_eq!(hero.status().remaining(&StatusKey::cooldown("Cleave")), Some(1));

    let run_away = EngineConfig {
        flee_chance: 100.0,
        ..EngineConfig::default()
    };
    let mut next = Fight::new(hero, goblin(), run_away, Box::new(FixedRng::new(0.5)));
    assert!(matches!(
        next.is_action_available(&cleave),
        Err(Unavailable::OnCooldown { .. })
    ));
    assert_eq!(play(&mut next, PlayerAction::Flee).outcome, Some(FightOutcome::Run));

    let (hero, _) = next.into_combatants();
    let third = fixed_fight(hero, goblin(), 0.5);
    assert_eq!(third.is_action_available(&cleave), Ok(()));
}

#[test]
fn item_heals_and_reports_use() {
    let potion = Item {
        name: "healing draught".into(),
        charges: 2,
        heal: 15,
        restore_mp: 0,
        cures: vec![keys::POISONED],
        profile: None,
    };
    let mut hero = dummy();
    hero.stats_mut().hp = 10;
    hero.status_mut().set(keys::POISONED, 3, Lifetime::Rounds(5));
    let mut fight = fixed_fight(hero, goblin(), 0.5);

    let result = play(&mut fight, PlayerAction::UseItem(potion.clone()));
    assert!(result.item_used);
    assert_eq!(result.messages[0], "Hero uses healing draught.");
    assert_eq!(result.messages[1], "Hero recovers 15 hp.");
    assert_eq!(result.player.hp, 22);
    assert!(!fight.player().status().has(&keys::POISONED));

    let mut stunned = dummy();
    stunned.status_mut().set(keys::STUNNED, true, Lifetime::Rounds(1));
    let mut fight = fixed_fight(stunned, goblin(), 0.5);
    assert!(!play(&mut fight, PlayerAction::UseItem(potion)).item_used);
}

// =============================================================================
// Fight end
// =============================================================================

#[test]
fn success_fires_one_hook_with_rewards() {
    let behaviors = compose_specs(&[BehaviorSpec::Renown(RenownParams {
        id: None,
        region: "Fenmoor".into(),
        amount: 2,
        loot_mark: None,
    })])
    .unwrap();
    let bandit = enemy_with_table(ActionTable::new())
        .with_behaviors(behaviors, ActionTable::new().with("attack", 1))
        .unwrap();
    let hooks = RecordingHooks::default();
    let mut fight = fixed_fight(hero_hitting_for(50), bandit, 0.5).with_hooks(Box::new(hooks.clone()));

    let result = play(&mut fight, PlayerAction::Attack);
    let renown = vec![Reward::Renown {
        region: "Fenmoor".into(),
        amount: 2,
    }];
    assert_eq!(result.rewards, renown);
    assert_eq!(fight.phase(), RoundPhase::FightEnd);

    assert!(fight.resolve_round(PlayerAction::Attack).is_err());
    assert!(fight.resolve_round(PlayerAction::Defend).is_err());
    assert_eq!(
        hooks.calls(),
        [HookCall {
            outcome: FightOutcome::Success,
            rewards: renown
        }]
    );
}

#[test]
fn simultaneous_death_is_a_loss() {
    let mut hero = dummy();
    hero.stats_mut().hp = 1;
    hero.status_mut().set(keys::POISONED, 5, Lifetime::Rounds(2));
    let mut turtle = enemy_with_table(ActionTable::new().with("defend", 1));
    turtle.stats_mut().hp = 1;
    turtle.status_mut().set(keys::BURNING, 5, Lifetime::Rounds(2));

    let hooks = RecordingHooks::default();
    let mut fight = fixed_fight(hero, turtle, 0.5).with_hooks(Box::new(hooks.clone()));
    let result = play(&mut fight, PlayerAction::Defend);
    assert_eq!(result.outcome, Some(FightOutcome::Failure));
    assert_eq!(hooks.calls().len(), 1);
    assert_eq!(hooks.calls()[0].outcome, FightOutcome::Failure);
    assert!(result.rewards.is_empty());
}

#[test]
fn player_death_mid_round_stops_the_round() {
    let mut hero = dummy();
    hero.stats_mut().hp = 2;
    let mut fight = fixed_fight(hero, goblin(), 0.5).with_initiative(Initiative::OpponentFirst);
    let result = play(&mut fight, PlayerAction::Attack);
    assert_eq!(result.outcome, Some(FightOutcome::Failure));
    assert_eq!(result.messages, ["A goblin attacks Hero for 3 damage."]);
    assert_eq!(result.opponent.hp, 20);
}

#[test]
fn long_fight_reaches_an_end() {
    init_tracing();
    let mut fight = fixed_fight(dummy(), goblin(), 0.5);
    let rounds = play_out(&mut fight, &PlayerAction::Attack, 100);
    assert_eq!(rounds.last().and_then(|r| r.outcome), Some(FightOutcome::Success));
    assert!(rounds[..rounds.len() - 1].iter().all(|r| r.outcome.is_none()));
}
