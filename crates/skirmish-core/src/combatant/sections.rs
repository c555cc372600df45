//! Multi-phase enemies.
//!
//! A sectioned enemy fights through an ordered list of [`Section`]s, each with
//! its own hp pool and action table. When the active section drops to zero hp
//! while undefeated sections remain, the enemy switches to the next one
//! instead of dying.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combatant::Stats;
use crate::error::EngineError;
use crate::rng::RandomSource;
use crate::selector::ActionTable;
use crate::status::{Lifetime, StatusKey, StatusStore};

/// How a section's hp is set when it becomes active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HpPolicy {
    /// Always start at full hp.
    #[default]
    Full,
    /// Resume from the section's hp snapshot, if one exists.
    Restore,
}

/// Order in which sections are entered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionOrder {
    /// Declaration order.
    #[default]
    Fixed,
    /// Uniformly among the undefeated sections.
    Random,
}

/// One hp pool and action set of a multi-phase enemy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    max_hp: i32,
    table: ActionTable,
    policy: HpPolicy,
    defeated: bool,
}

impl Section {
    /// Creates an undefeated section.
    #[must_use]
    pub fn new(name: &str, max_hp: i32, table: ActionTable, policy: HpPolicy) -> Self {
        Self {
            name: name.to_string(),
            max_hp,
            table,
            policy,
            defeated: false,
        }
    }

    /// Section name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Section hp pool.
    #[must_use]
    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    /// Section action table.
    #[must_use]
    pub fn table(&self) -> &ActionTable {
        &self.table
    }

    /// True once the section has dropped to zero hp.
    #[must_use]
    pub fn is_defeated(&self) -> bool {
        self.defeated
    }

    fn key(&self) -> StatusKey {
        StatusKey::section_hp(&self.name)
    }
}

/// A section switch that happened during a death check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionChange {
    /// Section that was defeated.
    pub from: String,
    /// Section that is now active.
    pub to: String,
}

/// The section state machine of one enemy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sections {
    sections: Vec<Section>,
    current: usize,
    order: SectionOrder,
}

impl Sections {
    /// Creates the state machine with the first section active.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidTemplate`] when `sections` is empty, a
    /// section has no positive hp pool, or two sections share a name.
    pub fn new(kind: &str, sections: Vec<Section>, order: SectionOrder) -> Result<Self, EngineError> {
        let invalid = |reason: String| EngineError::InvalidTemplate {
            kind: kind.to_string(),
            reason,
        };
        if sections.is_empty() {
            return Err(invalid("a sectioned enemy needs at least one section".into()));
        }
        for (i, section) in sections.iter().enumerate() {
            if section.max_hp <= 0 {
                return Err(invalid(format!("section `{}` has no hp", section.name)));
            }
            if sections[..i].iter().any(|s| s.name == section.name) {
                return Err(invalid(format!("section `{}` is declared twice", section.name)));
            }
        }
        Ok(Self {
            sections,
            current: 0,
            order,
        })
    }

    /// The active section.
    #[must_use]
    pub fn current(&self) -> &Section {
        &self.sections[self.current]
    }

    /// All sections in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// True when some section other than the active one is still undefeated.
    #[must_use]
    pub fn has_reserve(&self) -> bool {
        self.sections
            .iter()
            .enumerate()
            .any(|(i, s)| i != self.current && !s.defeated)
    }

    /// True once every section has been defeated at least once.
    #[must_use]
    pub fn all_defeated(&self) -> bool {
        self.sections.iter().all(|s| s.defeated)
    }

    /// Sets hp for the active section at fight start, honoring its policy.
    pub fn enter_current(&self, stats: &mut Stats, status: &StatusStore) {
        apply_policy(self.current(), stats, status);
    }

    /// Records the active section's hp under its permanent snapshot key.
    pub fn snapshot_current(&self, stats: &Stats, status: &mut StatusStore) {
        let section = self.current();
        status.set(section.key(), stats.hp.max(0), Lifetime::Permanent);
    }

    /// Handles a possible live-to-dead crossing of the active section.
    ///
    /// Does nothing unless hp is at or below zero and the active section has
    /// not been defeated yet, so calling it twice in a tick is harmless. When
    /// it fires, the section is snapshotted and marked defeated; if reserves
    /// remain, the next one becomes active and its change is returned.
    pub fn advance(
        &mut self,
        stats: &mut Stats,
        status: &mut StatusStore,
        rng: &mut dyn RandomSource,
    ) -> Option<SectionChange> {
        if stats.hp > 0 || self.sections[self.current].defeated {
            return None;
        }
        self.snapshot_current(stats, status);
        self.sections[self.current].defeated = true;

        let candidates: Vec<usize> = (0..self.sections.len())
            .filter(|&i| !self.sections[i].defeated)
            .collect();
        let next = match self.order {
            SectionOrder::Fixed => candidates
                .iter()
                .copied()
                .find(|&i| i > self.current)
                .or_else(|| candidates.first().copied()),
            SectionOrder::Random => {
                let n = u32::try_from(candidates.len()).unwrap_or(u32::MAX);
                candidates.get(rng.below(n) as usize).copied()
            }
        }?;

        let from = self.sections[self.current].name.clone();
        self.current = next;
        apply_policy(&self.sections[next], stats, status);
        let to = self.sections[next].name.clone();
        debug!(%from, %to, hp = stats.hp, "section transition");
        Some(SectionChange { from, to })
    }
}

fn apply_policy(section: &Section, stats: &mut Stats, status: &StatusStore) {
    stats.max_hp = section.max_hp;
    stats.hp = match section.policy {
        HpPolicy::Full => section.max_hp,
        HpPolicy::Restore => {
            let saved = status.get_i64(&section.key(), i64::from(section.max_hp));
            match i32::try_from(saved) {
                Ok(hp) if hp > 0 => hp.min(section.max_hp),
                _ => section.max_hp,
            }
        }
    };
}
