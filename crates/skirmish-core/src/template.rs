//! Enemy templates and the content lookup seam.
//!
//! Content lives outside the engine. A host hands the engine a
//! [`ContentLookup`]; each [`EnemyTemplate`] it returns is a serde-friendly
//! description that [`EnemyTemplate::build`] turns into a ready
//! [`Combatant`] at a given level.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::behaviors::{compose_specs, BehaviorSpec};
use crate::combatant::{Combatant, Determiner, HpPolicy, PropertyTags, Section, SectionOrder, Sections, StatTemplate};
use crate::error::EngineError;
use crate::selector::ActionTable;

/// Source of enemy templates.
pub trait ContentLookup {
    /// The template for `kind`, if the content knows it.
    fn template(&self, kind: &str) -> Option<&EnemyTemplate>;

    /// Every known kind, sorted.
    fn kinds(&self) -> Vec<&str>;
}

/// One section of a multi-phase template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionTemplate {
    /// Section name, unique within the enemy.
    pub name: String,
    /// Hp pool.
    pub max_hp: i32,
    /// Action table while the section is active.
    pub actions: ActionTable,
    /// Hp on entry.
    #[serde(default)]
    pub policy: HpPolicy,
}

/// Section list of a multi-phase template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionsTemplate {
    /// Entry order.
    #[serde(default)]
    pub order: SectionOrder,
    /// Sections, first one active at spawn.
    pub sections: Vec<SectionTemplate>,
}

/// Serializable description of an enemy kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    /// Content kind, the lookup key.
    pub kind: String,
    /// Display name; defaults to the kind.
    #[serde(default)]
    pub name: Option<String>,
    /// Article in front of the name.
    #[serde(default)]
    pub determiner: Determiner,
    /// Stats and per-level growth.
    pub stats: StatTemplate,
    /// Property tags.
    #[serde(default)]
    pub tags: PropertyTags,
    /// Behavior modules in composition order.
    #[serde(default)]
    pub behaviors: Vec<BehaviorSpec>,
    /// Base action table.
    #[serde(default)]
    pub actions: ActionTable,
    /// Multi-phase definition.
    #[serde(default)]
    pub sections: Option<SectionsTemplate>,
}

impl EnemyTemplate {
    /// Builds a combatant at `level`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidTemplate`] for zero weights or bad
    /// sections, [`EngineError::InvalidParameter`] for bad module
    /// parameters and [`EngineError::Composition`] for collisions or
    /// unimplemented table entries.
    pub fn build(&self, level: u32) -> Result<Combatant, EngineError> {
        self.check_weights("actions", &self.actions)?;
        let behaviors = compose_specs(&self.behaviors)?;

        let name = self.name.as_deref().unwrap_or(&self.kind);
        let mut enemy = Combatant::enemy(&self.kind, name, level, self.stats.at_level(level))
            .with_determiner(self.determiner)
            .with_tags(self.tags)
            .with_behaviors(behaviors, self.actions.clone())?;

        if let Some(def) = &self.sections {
            let mut sections = Vec::with_capacity(def.sections.len());
            for s in &def.sections {
                self.check_weights(&s.name, &s.actions)?;
                sections.push(Section::new(&s.name, s.max_hp, s.actions.clone(), s.policy));
            }
            enemy = enemy.with_sections(Sections::new(&self.kind, sections, def.order)?)?;
        }

        debug!(kind = %self.kind, level, modules = enemy.behaviors().len(), "enemy built");
        Ok(enemy)
    }

    fn check_weights(&self, table: &str, actions: &ActionTable) -> Result<(), EngineError> {
        match actions.iter().find(|entry| entry.weight == 0) {
            Some(entry) => Err(EngineError::InvalidTemplate {
                kind: self.kind.clone(),
                reason: format!("`{}` has zero weight in {table}", entry.action),
            }),
            None => Ok(()),
        }
    }
}
