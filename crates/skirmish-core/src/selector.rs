//! Enemy action selection.
//!
//! Selection runs in a fixed order:
//!
//! 1. a stunned actor always gets [`Selection::Stunned`]
//! 2. an engine `forced_action` entry names the action outright
//! 3. otherwise the weighted table is built (active table, then every
//!    module's weight contribution for its own actions) and sampled with one
//!    draw from the injected [`RandomSource`]
//!
//! A table whose total weight is zero falls back to the basic attack, so
//! selection never comes back empty.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::behavior::{ActionName, OpponentView};
use crate::combatant::Combatant;
use crate::error::EngineError;
use crate::rng::RandomSource;
use crate::status::keys;

// =============================================================================
// Action table
// =============================================================================

/// One weighted entry of an action table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEntry {
    /// Action name.
    pub action: ActionName,
    /// Relative weight; content should keep this above zero.
    pub weight: u32,
}

/// Ordered list of weighted actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionTable {
    entries: Vec<ActionEntry>,
}

impl ActionTable {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, action: &str, weight: u32) -> Self {
        self.set(ActionName::new(action), weight);
        self
    }

    /// Sets the weight of `action`, appending it when absent. Weight 0 removes
    /// the action.
    pub fn set(&mut self, action: ActionName, weight: u32) {
        let existing = self.entries.iter().position(|e| e.action == action);
        match (existing, weight) {
            (Some(i), 0) => {
                self.entries.remove(i);
            }
            (Some(i), w) => self.entries[i].weight = w,
            (None, 0) => {}
            (None, w) => self.entries.push(ActionEntry { action, weight: w }),
        }
    }

    /// Weight of `action`, if present.
    #[must_use]
    pub fn weight_of(&self, action: &ActionName) -> Option<u32> {
        self.entries.iter().find(|e| &e.action == action).map(|e| e.weight)
    }

    /// Sum of all weights.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.weight)).sum()
    }

    /// Entries in order.
    pub fn iter(&self) -> impl Iterator<Item = &ActionEntry> {
        self.entries.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Picks an entry for a draw in `[0, total)`.
    fn pick(&self, draw: u64) -> Option<&ActionName> {
        let mut cumulative = 0u64;
        for entry in &self.entries {
            cumulative += u64::from(entry.weight);
            if draw < cumulative {
                return Some(&entry.action);
            }
        }
        None
    }
}

impl FromIterator<(ActionName, u32)> for ActionTable {
    fn from_iter<I: IntoIterator<Item = (ActionName, u32)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (action, weight) in iter {
            table.set(action, weight);
        }
        table
    }
}

// =============================================================================
// Selection
// =============================================================================

/// Result of action selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The actor is stunned and loses its turn.
    Stunned,
    /// The actor takes `action`.
    Action {
        /// Chosen action.
        action: ActionName,
        /// True when it came from a forced-action entry.
        forced: bool,
    },
}

/// Builds the effective weighted table for this selection event.
#[must_use]
pub fn effective_table(actor: &Combatant, opponent: &Combatant) -> ActionTable {
    let mut table = actor.action_table().clone();
    let view = OpponentView::new(opponent);
    for module in actor.behaviors().iter() {
        for action in &module.declaration().actions {
            if let Some(weight) = module.weight(action, actor, view) {
                table.set(action.clone(), weight);
            }
        }
    }
    table
}

/// Chooses the actor's next action.
///
/// # Errors
///
/// Returns [`EngineError::UnknownAction`] when a forced action names
/// something the actor cannot perform.
pub fn select_action(
    actor: &Combatant,
    opponent: &Combatant,
    rng: &mut dyn RandomSource,
) -> Result<Selection, EngineError> {
    if actor.status().has(&keys::STUNNED) {
        debug!(actor = %actor.name(), "stunned, turn skipped");
        return Ok(Selection::Stunned);
    }

    if let Some(entry) = actor.status().entry(&keys::FORCED_ACTION) {
        let action = ActionName::new(entry.value().as_text().unwrap_or_default());
        if !actor.behaviors().implements(&action) {
            return Err(EngineError::UnknownAction {
                action,
                combatant: actor.display_name(),
            });
        }
        debug!(actor = %actor.name(), %action, "forced action");
        return Ok(Selection::Action { action, forced: true });
    }

    let table = effective_table(actor, opponent);
    let total = table.total();
    if total == 0 {
        debug!(actor = %actor.name(), "empty action table, falling back to basic attack");
        return Ok(Selection::Action {
            action: ActionName::basic_attack(),
            forced: false,
        });
    }

    let bound = u32::try_from(total).unwrap_or_else(|_| {
        warn!(actor = %actor.name(), total, "action weights overflow, truncating");
        u32::MAX
    });
    let draw = u64::from(rng.below(bound));
    let action = table.pick(draw).cloned().unwrap_or_else(ActionName::basic_attack);
    debug!(actor = %actor.name(), %action, draw, total, "action selected");
    Ok(Selection::Action { action, forced: false })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{FixedRng, SeededRng};
    use crate::status::Lifetime;
    use crate::tests::helpers::{dummy, enemy_with_table};

    mod table_tests {
        use super::*;

        #[test]
        fn set_appends_updates_and_removes() {
            let mut table = ActionTable::new().with("a", 1).with("b", 2);
            table.set(ActionName::new("a"), 5);
            table.set(ActionName::new("c"), 1);
            table.set(ActionName::new("b"), 0);
            let names: Vec<_> = table.iter().map(|e| e.action.as_str()).collect();
            assert_eq!(names, ["a", "c"]);
            assert_eq!(table.total(), 6);
        }

        #[test]
        fn pick_is_cumulative() {
            let table = ActionTable::new().with("a", 1).with("b", 3);
            assert_eq!(table.pick(0).unwrap().as_str(), "a");
            assert_eq!(table.pick(1).unwrap().as_str(), "b");
            assert_eq!(table.pick(3).unwrap().as_str(), "b");
            assert!(table.pick(4).is_none());
        }

        #[test]
        fn deserializes_from_list() {
            let table: ActionTable =
                serde_json::from_str(r#"[{"action":"attack","weight":2},{"action":"defend","weight":1}]"#).unwrap();
            assert_eq!(table.weight_of(&ActionName::new("defend")), Some(1));
        }
    }

    mod select_tests {
        use super::*;

        #[test]
        fn stunned_actor_is_skipped() {
            let mut goblin = enemy_with_table(ActionTable::new().with("attack", 1));
            goblin.status_mut().set(keys::STUNNED, true, Lifetime::Rounds(1));
            let sel = select_action(&goblin, &dummy(), &mut FixedRng::new(0.0)).unwrap();
            assert_eq!(sel, Selection::Stunned);
        }

        #[test]
        fn forced_action_wins_over_table() {
            let mut goblin = enemy_with_table(ActionTable::new().with("attack", 1));
            goblin.status_mut().set(keys::FORCED_ACTION, "defend", Lifetime::Rounds(1));
            let sel = select_action(&goblin, &dummy(), &mut FixedRng::new(0.0)).unwrap();
            assert_eq!(
                sel,
                Selection::Action {
                    action: ActionName::new("defend"),
                    forced: true
                }
            );
        }

        #[test]
        fn unknown_forced_action_is_fatal() {
            let mut goblin = enemy_with_table(ActionTable::new().with("attack", 1));
            goblin.status_mut().set(keys::FORCED_ACTION, "fly", Lifetime::Rounds(1));
            let err = select_action(&goblin, &dummy(), &mut FixedRng::new(0.0)).unwrap_err();
            assert!(matches!(err, EngineError::UnknownAction { .. }));
        }

        #[test]
        fn empty_table_falls_back_to_basic_attack() {
            let goblin = enemy_with_table(ActionTable::new());
            let sel = select_action(&goblin, &dummy(), &mut SeededRng::new(1)).unwrap();
            assert_eq!(
                sel,
                Selection::Action {
                    action: ActionName::basic_attack(),
                    forced: false
                }
            );
        }

        #[test]
        fn fixed_draw_is_deterministic() {
            let goblin = enemy_with_table(ActionTable::new().with("attack", 1).with("defend", 3));
            // 0.1 * 4 = 0.4 -> draw 0 -> attack
            let low = select_action(&goblin, &dummy(), &mut FixedRng::new(0.1)).unwrap();
            // 0.5 * 4 = 2 -> defend
            let high = select_action(&goblin, &dummy(), &mut FixedRng::new(0.5)).unwrap();
            assert!(matches!(low, Selection::Action { ref action, .. } if action.as_str() == "attack"));
            assert!(matches!(high, Selection::Action { ref action, .. } if action.as_str() == "defend"));
        }
    }
}
