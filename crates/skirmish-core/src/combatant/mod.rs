//! Combatants: the shared state shape of both sides of a fight.
//!
//! A [`Combatant`] bundles identity, [`Stats`], a [`StatusStore`],
//! [`PropertyTags`], the composed [`BehaviorSet`], the base [`ActionTable`],
//! and, for multi-phase enemies, its [`Sections`].
//!
//! Players and enemies share the type. Players simply carry no behaviors and
//! no table; they act through [`PlayerAction`](crate::fight::PlayerAction)s.

mod sections;
mod stats;
mod tags;

pub use sections::{HpPolicy, Section, SectionChange, SectionOrder, Sections};
pub use stats::{StatGrowth, StatSnapshot, StatTemplate, Stats};
pub use tags::PropertyTags;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::behavior::BehaviorSet;
use crate::error::EngineError;
use crate::rng::RandomSource;
use crate::selector::ActionTable;
use crate::status::{PersistedStatus, StatusStore};

/// Which side a combatant plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatantKind {
    /// Player character.
    Player,
    /// Enemy.
    Enemy,
}

/// Article used in front of the combatant's name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Determiner {
    /// "a goblin" / "an ogre".
    #[default]
    A,
    /// "the Lich King".
    The,
    /// "Grimbold".
    None,
}

/// One side of a fight.
#[derive(Debug, Clone)]
pub struct Combatant {
    kind: CombatantKind,
    kind_name: String,
    name: String,
    determiner: Determiner,
    level: u32,
    stats: Stats,
    status: StatusStore,
    tags: PropertyTags,
    behaviors: BehaviorSet,
    table: ActionTable,
    sections: Option<Sections>,
}

impl Combatant {
    /// Creates a player character.
    #[must_use]
    pub fn player(name: &str, level: u32, stats: Stats) -> Self {
        Self {
            kind: CombatantKind::Player,
            kind_name: "player".to_string(),
            name: name.to_string(),
            determiner: Determiner::None,
            level,
            stats,
            status: StatusStore::new(),
            tags: PropertyTags::empty(),
            behaviors: BehaviorSet::new(),
            table: ActionTable::new(),
            sections: None,
        }
    }

    /// Creates an enemy of content kind `kind` with no behaviors and an empty
    /// table (it will only ever basic-attack).
    #[must_use]
    pub fn enemy(kind: &str, name: &str, level: u32, stats: Stats) -> Self {
        Self {
            kind: CombatantKind::Enemy,
            kind_name: kind.to_string(),
            name: name.to_string(),
            determiner: Determiner::A,
            level,
            stats,
            status: StatusStore::new(),
            tags: PropertyTags::empty(),
            behaviors: BehaviorSet::new(),
            table: ActionTable::new(),
            sections: None,
        }
    }

    /// Sets the determiner.
    #[must_use]
    pub fn with_determiner(mut self, determiner: Determiner) -> Self {
        self.determiner = determiner;
        self
    }

    /// Sets the property tags.
    #[must_use]
    pub fn with_tags(mut self, tags: PropertyTags) -> Self {
        self.tags = tags;
        self
    }

    /// Installs composed behaviors and the base action table.
    ///
    /// # Errors
    ///
    /// Fails when the table (or any section table already installed) names
    /// an action nobody implements.
    pub fn with_behaviors(mut self, behaviors: BehaviorSet, table: ActionTable) -> Result<Self, EngineError> {
        behaviors.validate_table(&table)?;
        if let Some(sections) = &self.sections {
            for section in sections.iter() {
                behaviors.validate_table(section.table())?;
            }
        }
        self.behaviors = behaviors;
        self.table = table;
        Ok(self)
    }

    /// Turns the combatant into a multi-phase enemy. The first section
    /// becomes active and sets hp.
    ///
    /// # Errors
    ///
    /// Fails when a section table names an action nobody implements.
    pub fn with_sections(mut self, sections: Sections) -> Result<Self, EngineError> {
        for section in sections.iter() {
            self.behaviors.validate_table(section.table())?;
        }
        sections.enter_current(&mut self.stats, &self.status);
        self.sections = Some(sections);
        Ok(self)
    }

    // ===== Identity =====

    /// Player or enemy.
    #[must_use]
    pub fn kind(&self) -> CombatantKind {
        self.kind
    }

    /// Content kind ("goblin", "player").
    #[must_use]
    pub fn kind_name(&self) -> &str {
        &self.kind_name
    }

    /// Bare name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Level.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Name with its article, lower case: "a goblin", "an ogre", "the Lich".
    #[must_use]
    pub fn display_name(&self) -> String {
        match self.determiner {
            Determiner::A => {
                let article = if self
                    .name
                    .chars()
                    .next()
                    .is_some_and(|c| "aeiouAEIOU".contains(c))
                {
                    "an"
                } else {
                    "a"
                };
                format!("{article} {}", self.name)
            }
            Determiner::The => format!("the {}", self.name),
            Determiner::None => self.name.clone(),
        }
    }

    /// [`display_name`](Self::display_name) capitalized for sentence starts.
    #[must_use]
    pub fn title_name(&self) -> String {
        let name = self.display_name();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => name,
        }
    }

    // ===== State =====

    /// Stats.
    #[must_use]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Mutable stats.
    pub fn stats_mut(&mut self) -> &mut Stats {
        &mut self.stats
    }

    /// Status store.
    #[must_use]
    pub fn status(&self) -> &StatusStore {
        &self.status
    }

    /// Mutable status store.
    pub fn status_mut(&mut self) -> &mut StatusStore {
        &mut self.status
    }

    /// Property tags.
    #[must_use]
    pub fn tags(&self) -> PropertyTags {
        self.tags
    }

    /// Composed behaviors.
    #[must_use]
    pub fn behaviors(&self) -> &BehaviorSet {
        &self.behaviors
    }

    /// Active action table: the current section's when sectioned, otherwise
    /// the base table.
    #[must_use]
    pub fn action_table(&self) -> &ActionTable {
        self.sections
            .as_ref()
            .map_or(&self.table, |s| s.current().table())
    }

    /// Section state, for multi-phase enemies.
    #[must_use]
    pub fn sections(&self) -> Option<&Sections> {
        self.sections.as_ref()
    }

    /// Hp as a percentage of maximum.
    #[must_use]
    pub fn hp_percent(&self) -> f64 {
        if self.stats.max_hp <= 0 {
            return 0.0;
        }
        f64::from(self.stats.hp) * 100.0 / f64::from(self.stats.max_hp)
    }

    /// Dead when hp is at or below zero and no undefeated section remains in
    /// reserve.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.stats.hp <= 0 && !self.sections.as_ref().is_some_and(Sections::has_reserve)
    }

    /// Runs the section state machine after damage. Returns the switch when
    /// one happened.
    pub fn check_section(&mut self, rng: &mut dyn RandomSource) -> Option<SectionChange> {
        let sections = self.sections.as_mut()?;
        sections.advance(&mut self.stats, &mut self.status, rng)
    }

    /// Fight cleanup for this side: snapshots a live section, then drops
    /// transient status and counts fight-timed entries down.
    pub fn end_fight(&mut self) {
        if let Some(sections) = &self.sections {
            if self.stats.hp > 0 {
                sections.snapshot_current(&self.stats, &mut self.status);
            }
        }
        self.status.end_fight();
    }

    /// Summary for round results.
    #[must_use]
    pub fn snapshot(&self) -> StatSnapshot {
        StatSnapshot {
            name: self.display_name(),
            hp: self.stats.hp,
            max_hp: self.stats.max_hp,
            mp: self.stats.mp,
            stamina: self.stats.stamina,
            section: self.sections.as_ref().map(|s| s.current().name().to_string()),
        }
    }

    // ===== Persistence =====

    /// Persistable state: identity, stats and long-lived status.
    #[must_use]
    pub fn to_record(&self) -> CombatantRecord {
        CombatantRecord {
            kind: self.kind,
            kind_name: self.kind_name.clone(),
            name: self.name.clone(),
            level: self.level,
            stats: self.stats.clone(),
            status: self.status.persistent_entries(),
        }
    }

    /// Rebuilds a player from a record.
    #[must_use]
    pub fn player_from_record(record: CombatantRecord) -> Self {
        let mut player = Self::player(&record.name, record.level, record.stats);
        player.status.restore(record.status);
        player
    }

    /// Restores long-lived status onto a freshly built combatant. Sections
    /// with the restore policy pick up their saved hp.
    pub fn restore_status(&mut self, persisted: Vec<PersistedStatus>) {
        self.status.restore(persisted);
        if let Some(sections) = &self.sections {
            sections.enter_current(&mut self.stats, &self.status);
        }
    }
}

impl fmt::Display for Combatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// State handed to and from the persistence layer between fights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantRecord {
    /// Player or enemy.
    pub kind: CombatantKind,
    /// Content kind.
    pub kind_name: String,
    /// Bare name.
    pub name: String,
    /// Level.
    pub level: u32,
    /// Stats at the end of the fight.
    pub stats: Stats,
    /// Fight-timed and permanent status entries.
    pub status: Vec<PersistedStatus>,
}
