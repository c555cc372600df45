//! Round phases, outcomes and round results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::behavior::Reward;
use crate::combatant::StatSnapshot;

use super::player::Unavailable;

/// Where a fight is within its round cycle.
///
/// ```text
/// AwaitingPlayerAction -> Resolving -> PostAttackHooks -> RoundEnd
///          ^                                                 |
///          +-------------------------------------------------+--> FightEnd
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Waiting for the host to submit a player action.
    AwaitingPlayerAction,
    /// Actions are being carried out.
    Resolving,
    /// A damage effect is passing through the post-attack hooks.
    PostAttackHooks,
    /// Status ticks and damage over time.
    RoundEnd,
    /// Terminal; no further rounds are accepted.
    FightEnd,
}

impl RoundPhase {
    /// True for [`RoundPhase::FightEnd`].
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == Self::FightEnd
    }
}

/// How a fight ended, from the player's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FightOutcome {
    /// The opponent was defeated.
    Success,
    /// The player was defeated.
    Failure,
    /// The player fled.
    Run,
}

impl fmt::Display for FightOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Run => "run",
        };
        f.write_str(s)
    }
}

/// Which side acts first each round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Initiative {
    /// Player, then opponent.
    #[default]
    PlayerFirst,
    /// Opponent, then player (ambushes).
    OpponentFirst,
}

/// Everything that happened in one accepted round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    /// 1-based round number.
    pub round: u32,
    /// Narration in the order it happened.
    pub messages: Vec<String>,
    /// Player state after the round.
    pub player: StatSnapshot,
    /// Opponent state after the round.
    pub opponent: StatSnapshot,
    /// Set when this round ended the fight.
    pub outcome: Option<FightOutcome>,
    /// Behavior rewards, non-empty only on success.
    pub rewards: Vec<Reward>,
    /// True when the player used an item; the host spends one charge.
    pub item_used: bool,
}

impl RoundResult {
    /// True when the fight ended this round.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Answer to a submitted player action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoundResolution {
    /// The action was not available; nothing changed.
    Rejected(Unavailable),
    /// The round ran.
    Resolved(RoundResult),
}

impl RoundResolution {
    /// The round result, if the action was accepted.
    #[must_use]
    pub fn resolved(&self) -> Option<&RoundResult> {
        match self {
            Self::Resolved(result) => Some(result),
            Self::Rejected(_) => None,
        }
    }
}
