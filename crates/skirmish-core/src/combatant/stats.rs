//! Core combat stats and level scaling.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Combat stats of one combatant.
///
/// Resource pools (`hp`, `mp`, `stamina`) are signed so overkill damage is
/// visible; everything else comes straight from content and may hold bad
/// values, which the resolver clamps when it reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    /// Maximum hit points.
    pub max_hp: i32,
    /// Current hit points.
    pub hp: i32,
    /// Maximum mana.
    pub max_mp: i32,
    /// Current mana.
    pub mp: i32,
    /// Maximum stamina.
    pub max_stamina: i32,
    /// Current stamina.
    pub stamina: i32,
    /// Raw strength.
    pub force: i32,
    /// Skill; counts half towards offence.
    pub technique: i32,
    /// Damage mitigation.
    pub defence: i32,
    /// Critical hit chance, percent.
    pub crit: f64,
    /// Dodge chance, percent.
    pub dodge: f64,
    /// Own inaccuracy, percent.
    pub miss: f64,
    /// Lower bound of the base damage roll.
    pub min_damage: u32,
    /// Upper bound of the base damage roll.
    pub max_damage: u32,
    /// Ammunition, `None` for combatants that do not use any.
    pub ammo: Option<u32>,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            max_hp: 1,
            hp: 1,
            max_mp: 0,
            mp: 0,
            max_stamina: 0,
            stamina: 0,
            force: 0,
            technique: 0,
            defence: 0,
            crit: 0.0,
            dodge: 0.0,
            miss: 0.0,
            min_damage: 1,
            max_damage: 1,
            ammo: None,
        }
    }
}

impl Stats {
    /// Derived offence: `force + technique / 2`, saturating at the `i32`
    /// bounds.
    #[must_use]
    pub fn offence(&self) -> i32 {
        self.force.saturating_add(self.technique / 2)
    }

    /// True while hp is above zero.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Subtracts damage from hp. Hp may go negative.
    pub fn take_damage(&mut self, amount: u32) {
        let amount = i32::try_from(amount).unwrap_or(i32::MAX);
        self.hp = self.hp.saturating_sub(amount);
    }

    /// Restores hp up to the maximum and returns the amount actually healed.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.hp;
        let amount = i32::try_from(amount).unwrap_or(i32::MAX);
        self.hp = self.hp.saturating_add(amount).min(self.max_hp).max(before);
        u32::try_from(self.hp - before).unwrap_or(0)
    }

    /// Spends stamina if enough is available. A negative cost is treated
    /// as free.
    pub fn spend_stamina(&mut self, cost: i32) -> bool {
        let cost = clamp_cost(cost, "stamina");
        if self.stamina < cost {
            return false;
        }
        self.stamina -= cost;
        true
    }

    /// Spends mana if enough is available. A negative cost is treated as
    /// free.
    pub fn spend_mp(&mut self, cost: i32) -> bool {
        let cost = clamp_cost(cost, "mp");
        if self.mp < cost {
            return false;
        }
        self.mp -= cost;
        true
    }

    /// Regains stamina up to the maximum.
    pub fn regen_stamina(&mut self, amount: i32) {
        self.stamina = self.stamina.saturating_add(amount).min(self.max_stamina);
    }

    /// Restores every pool to its maximum.
    pub fn refill(&mut self) {
        self.hp = self.max_hp;
        self.mp = self.max_mp;
        self.stamina = self.max_stamina;
    }
}

/// Per-level stat growth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatGrowth {
    /// Added to `max_hp` per level.
    pub max_hp: i32,
    /// Added to `max_mp` per level.
    pub max_mp: i32,
    /// Added to `max_stamina` per level.
    pub max_stamina: i32,
    /// Added to `force` per level.
    pub force: i32,
    /// Added to `technique` per level.
    pub technique: i32,
    /// Added to `defence` per level.
    pub defence: i32,
    /// Added to both damage bounds per level.
    pub damage: u32,
}

/// Base stats plus per-level growth.
///
/// ```
/// use skirmish_core::combatant::{StatGrowth, StatTemplate, Stats};
///
/// let template = StatTemplate {
///     base: Stats { max_hp: 20, force: 5, ..Stats::default() },
///     per_level: StatGrowth { max_hp: 4, force: 1, ..StatGrowth::default() },
/// };
/// let stats = template.at_level(3);
/// assert_eq!(stats.max_hp, 28);
/// assert_eq!(stats.hp, 28);
/// assert_eq!(stats.force, 7);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatTemplate {
    /// Stats at level 1.
    pub base: Stats,
    /// Growth for every level above 1.
    #[serde(default)]
    pub per_level: StatGrowth,
}

impl StatTemplate {
    /// Builds full stats for `level`. Level 0 is treated as level 1. Pools
    /// start full.
    #[must_use]
    pub fn at_level(&self, level: u32) -> Stats {
        let steps = level.saturating_sub(1);
        let n = i32::try_from(steps).unwrap_or(i32::MAX);
        let g = &self.per_level;
        let mut stats = self.base.clone();
        stats.max_hp = stats.max_hp.saturating_add(g.max_hp.saturating_mul(n));
        stats.max_mp = stats.max_mp.saturating_add(g.max_mp.saturating_mul(n));
        stats.max_stamina = stats.max_stamina.saturating_add(g.max_stamina.saturating_mul(n));
        stats.force = stats.force.saturating_add(g.force.saturating_mul(n));
        stats.technique = stats.technique.saturating_add(g.technique.saturating_mul(n));
        stats.defence = stats.defence.saturating_add(g.defence.saturating_mul(n));
        stats.min_damage = stats.min_damage.saturating_add(g.damage.saturating_mul(steps));
        stats.max_damage = stats.max_damage.saturating_add(g.damage.saturating_mul(steps));
        stats.refill();
        stats
    }
}

fn clamp_cost(cost: i32, pool: &str) -> i32 {
    if cost < 0 {
        warn!(cost, pool, "negative cost clamped to 0");
        return 0;
    }
    cost
}

/// Read-only summary of a combatant after a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatSnapshot {
    /// Display name with determiner.
    pub name: String,
    /// Current hit points.
    pub hp: i32,
    /// Maximum hit points.
    pub max_hp: i32,
    /// Current mana.
    pub mp: i32,
    /// Current stamina.
    pub stamina: i32,
    /// Active section of a multi-phase enemy.
    pub section: Option<String>,
}
