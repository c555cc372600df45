//! Player actions and their availability rules.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::behavior::{ActionContext, Target};
use crate::combatant::{Combatant, PropertyTags};
use crate::effect::Effect;
use crate::resolver::AttackProfile;
use crate::status::{keys, Lifetime, StatusKey, StatusValue};

/// A status entry an ability or item puts on the opponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Affliction {
    /// Entry key.
    pub key: StatusKey,
    /// Entry value.
    pub value: StatusValue,
    /// Entry lifetime.
    pub lifetime: Lifetime,
}

/// A spell or skill from the host's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    /// Name; also names the cooldown key.
    pub name: String,
    /// Mana for spells, stamina for skills.
    #[serde(default)]
    pub cost: i32,
    /// Attack made on use.
    #[serde(default)]
    pub profile: Option<AttackProfile>,
    /// Hp restored to the player.
    #[serde(default)]
    pub heal: u32,
    /// Entries put on the opponent (on hit when there is an attack).
    #[serde(default)]
    pub afflictions: Vec<Affliction>,
    /// Cooldown started on use.
    #[serde(default)]
    pub cooldown: Option<Lifetime>,
}

impl Ability {
    /// A free ability that does nothing yet.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cost: 0,
            profile: None,
            heal: 0,
            afflictions: Vec::new(),
            cooldown: None,
        }
    }
}

/// A consumable from the host's inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Name.
    pub name: String,
    /// Uses left; the host decrements its own inventory when the round
    /// reports the item consumed.
    pub charges: u32,
    /// Hp restored.
    #[serde(default)]
    pub heal: u32,
    /// Mana restored.
    #[serde(default)]
    pub restore_mp: i32,
    /// Player status keys removed.
    #[serde(default)]
    pub cures: Vec<StatusKey>,
    /// Thrown attack.
    #[serde(default)]
    pub profile: Option<AttackProfile>,
}

/// What the player chose to do this round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Basic attack with the player's own damage range.
    Attack,
    /// Raise guard until the next round.
    Defend,
    /// Cast a spell (mana).
    Cast(Ability),
    /// Use an item.
    UseItem(Item),
    /// Use a skill (stamina).
    Skill(Ability),
    /// Try to escape.
    Flee,
}

/// Why a player action was rejected. Not an error: the round simply does not
/// advance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unavailable {
    /// Skill costs more stamina than the player has.
    NotEnoughStamina {
        /// Stamina needed.
        needed: i32,
        /// Stamina available.
        available: i32,
    },
    /// Spell costs more mana than the player has.
    NotEnoughMana {
        /// Mana needed.
        needed: i32,
        /// Mana available.
        available: i32,
    },
    /// The attack needs ammunition and there is none.
    NoAmmo,
    /// The ability is cooling down; `None` means until cleared.
    OnCooldown {
        /// Ability name.
        name: String,
        /// Rounds or fights left.
        remaining: Option<u32>,
    },
    /// Silenced players cannot cast.
    Silenced,
    /// Snared players cannot flee.
    Snared,
    /// The opponent does not allow escape.
    CannotFlee,
    /// The item has no charges left.
    ItemDepleted,
    /// The fight has already ended.
    FightOver,
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotEnoughStamina { needed, available } => {
                write!(f, "You need {needed} stamina but have only {available}.")
            }
            Self::NotEnoughMana { needed, available } => {
                write!(f, "You need {needed} mana but have only {available}.")
            }
            Self::NoAmmo => write!(f, "You are out of ammunition."),
            Self::OnCooldown { name, remaining: Some(n) } => {
                write!(f, "{name} is not ready yet ({n} left).")
            }
            Self::OnCooldown { name, remaining: None } => write!(f, "{name} is not ready yet."),
            Self::Silenced => write!(f, "You cannot cast while silenced."),
            Self::Snared => write!(f, "You are snared and cannot flee."),
            Self::CannotFlee => write!(f, "There is no escape from this fight."),
            Self::ItemDepleted => write!(f, "That item is used up."),
            Self::FightOver => write!(f, "The fight is already over."),
        }
    }
}

// =============================================================================
// Availability
// =============================================================================

/// Checks `action` for `player` against `opponent`. The caller handles the
/// fight-over case.
pub(crate) fn check(action: &PlayerAction, player: &Combatant, opponent: &Combatant) -> Result<(), Unavailable> {
    let stats = player.stats();
    match action {
        PlayerAction::Attack => {
            if stats.ammo == Some(0) {
                return Err(Unavailable::NoAmmo);
            }
        }
        PlayerAction::Defend => {}
        PlayerAction::Cast(spell) => {
            if player.status().has(&keys::SILENCED) {
                return Err(Unavailable::Silenced);
            }
            check_cooldown(spell, player)?;
            if stats.mp < spell.cost {
                return Err(Unavailable::NotEnoughMana {
                    needed: spell.cost,
                    available: stats.mp,
                });
            }
        }
        PlayerAction::Skill(skill) => {
            check_cooldown(skill, player)?;
            if stats.stamina < skill.cost {
                return Err(Unavailable::NotEnoughStamina {
                    needed: skill.cost,
                    available: stats.stamina,
                });
            }
            let ranged = skill
                .profile
                .as_ref()
                .is_some_and(|p| (p.tags | player.tags()).contains(PropertyTags::RANGED));
            if ranged && stats.ammo == Some(0) {
                return Err(Unavailable::NoAmmo);
            }
        }
        PlayerAction::UseItem(item) => {
            if item.charges == 0 {
                return Err(Unavailable::ItemDepleted);
            }
        }
        PlayerAction::Flee => {
            if opponent.tags().contains(PropertyTags::NO_ESCAPE) {
                return Err(Unavailable::CannotFlee);
            }
            if player.status().has(&keys::SNARED) {
                return Err(Unavailable::Snared);
            }
        }
    }
    Ok(())
}

fn check_cooldown(ability: &Ability, player: &Combatant) -> Result<(), Unavailable> {
    let key = StatusKey::cooldown(&ability.name);
    if player.status().has(&key) {
        return Err(Unavailable::OnCooldown {
            name: ability.name.clone(),
            remaining: player.status().remaining(&key),
        });
    }
    Ok(())
}

// =============================================================================
// Execution
// =============================================================================

/// Carries out an accepted, non-flee action. Costs are paid here.
pub(crate) fn perform(action: &PlayerAction, ctx: &mut ActionContext<'_>) {
    match action {
        PlayerAction::Attack => {
            spend_ammo(ctx);
            ctx.strike(&AttackProfile::new("attack"));
        }
        PlayerAction::Defend => {
            let name = ctx.actor().title_name();
            ctx.status_mut().set(keys::DEFENDING, true, Lifetime::Turn);
            let bonus = ctx.config().defend_stamina;
            ctx.actor_mut().stats_mut().regen_stamina(bonus);
            ctx.say(format!("{name} raises a guard."));
        }
        PlayerAction::Cast(spell) => {
            ctx.actor_mut().stats_mut().spend_mp(spell.cost);
            use_ability(spell, "casts", ctx);
        }
        PlayerAction::Skill(skill) => {
            ctx.actor_mut().stats_mut().spend_stamina(skill.cost);
            if skill.profile.is_some() && skill_is_ranged(skill, ctx.actor()) {
                spend_ammo(ctx);
            }
            use_ability(skill, "uses", ctx);
        }
        PlayerAction::UseItem(item) => use_item(item, ctx),
        PlayerAction::Flee => {}
    }
}

fn skill_is_ranged(skill: &Ability, player: &Combatant) -> bool {
    skill
        .profile
        .as_ref()
        .is_some_and(|p| (p.tags | player.tags()).contains(PropertyTags::RANGED))
}

fn spend_ammo(ctx: &mut ActionContext<'_>) {
    if let Some(ammo) = ctx.actor_mut().stats_mut().ammo.as_mut() {
        *ammo = ammo.saturating_sub(1);
    }
}

fn use_ability(ability: &Ability, verb: &str, ctx: &mut ActionContext<'_>) {
    let line = format!("{} {verb} {}.", ctx.actor().title_name(), ability.name);
    ctx.say(line);
    if let Some(cooldown) = ability.cooldown {
        ctx.status_mut().set(StatusKey::cooldown(&ability.name), true, cooldown);
    }
    let landed = match &ability.profile {
        Some(profile) => ctx.strike(profile).is_hit(),
        None => true,
    };
    if ability.heal > 0 {
        ctx.emit(Effect::Heal {
            target: Target::Actor,
            amount: ability.heal,
        });
    }
    if landed {
        for affliction in &ability.afflictions {
            ctx.afflict(affliction.key.clone(), affliction.value.clone(), affliction.lifetime);
        }
    }
}

fn use_item(item: &Item, ctx: &mut ActionContext<'_>) {
    let line = format!("{} uses {}.", ctx.actor().title_name(), item.name);
    ctx.say(line);
    if item.restore_mp > 0 {
        let stats = ctx.actor_mut().stats_mut();
        stats.mp = stats.mp.saturating_add(item.restore_mp).min(stats.max_mp);
    }
    for key in &item.cures {
        ctx.emit(Effect::ClearStatus {
            target: Target::Actor,
            key: key.clone(),
        });
    }
    if item.heal > 0 {
        ctx.emit(Effect::Heal {
            target: Target::Actor,
            amount: item.heal,
        });
    }
    if let Some(profile) = &item.profile {
        ctx.strike(profile);
    }
}
