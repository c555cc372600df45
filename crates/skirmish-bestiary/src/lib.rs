//! # Skirmish Bestiary
//!
//! JSON-backed enemy content for `skirmish-core`.
//!
//! A [`Bestiary`] is a set of [`EnemyTemplate`]s keyed by kind. The crate
//! ships a default pack (`data/bestiary.json`); hosts can load their own
//! from a string or a file. Every template is built once at load time so
//! broken content fails early instead of mid-fight.
//!
//! ## Usage
//!
//! ```
//! use skirmish_bestiary::Bestiary;
//! use skirmish_core::ContentLookup;
//!
//! let bestiary = Bestiary::builtin()?;
//! assert!(bestiary.kinds().contains(&"mire_hydra"));
//!
//! let hydra = bestiary.spawn("mire_hydra", 4)?;
//! assert_eq!(hydra.title_name(), "The Mire Hydra");
//! # Ok::<(), skirmish_bestiary::ContentError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;

pub use error::ContentError;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use skirmish_core::{Combatant, ContentLookup, EnemyTemplate};
use tracing::{debug, info};

const BUILTIN: &str = include_str!("../data/bestiary.json");

/// On-disk shape of a content pack.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BestiaryFile {
    /// Enemy templates.
    pub enemies: Vec<EnemyTemplate>,
}

/// Enemy templates keyed by kind.
#[derive(Debug, Clone, Default)]
pub struct Bestiary {
    templates: BTreeMap<String, EnemyTemplate>,
}

impl Bestiary {
    /// The content pack bundled with the crate.
    ///
    /// # Errors
    ///
    /// Fails only if the bundled pack is broken.
    pub fn builtin() -> Result<Self, ContentError> {
        Self::from_json(BUILTIN)
    }

    /// Parses and checks a JSON pack.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Json`] for malformed JSON or missing
    /// parameters, [`ContentError::DuplicateKind`] for a repeated kind and
    /// [`ContentError::Build`] when a template does not build.
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        let file: BestiaryFile = serde_json::from_str(json)?;
        Self::from_templates(file.enemies)
    }

    /// Reads a JSON pack from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Io`] when the file cannot be read, then as
    /// [`from_json`](Self::from_json).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = json.len(), "bestiary file read");
        Self::from_json(&json)
    }

    /// Collects templates, checking each one builds at level 1.
    ///
    /// # Errors
    ///
    /// As [`from_json`](Self::from_json), minus the JSON step.
    pub fn from_templates(templates: impl IntoIterator<Item = EnemyTemplate>) -> Result<Self, ContentError> {
        let mut map = BTreeMap::new();
        for template in templates {
            template.build(1).map_err(|source| ContentError::Build {
                kind: template.kind.clone(),
                source,
            })?;
            if map.contains_key(&template.kind) {
                return Err(ContentError::DuplicateKind(template.kind));
            }
            map.insert(template.kind.clone(), template);
        }
        info!(kinds = map.len(), "bestiary loaded");
        Ok(Self { templates: map })
    }

    /// Builds an enemy of `kind` at `level`.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::UnknownKind`] or [`ContentError::Build`].
    pub fn spawn(&self, kind: &str, level: u32) -> Result<Combatant, ContentError> {
        let template = self
            .templates
            .get(kind)
            .ok_or_else(|| ContentError::UnknownKind(kind.to_string()))?;
        template.build(level).map_err(|source| ContentError::Build {
            kind: kind.to_string(),
            source,
        })
    }

    /// Number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// True when the bestiary holds no templates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl ContentLookup for Bestiary {
    fn template(&self, kind: &str) -> Option<&EnemyTemplate> {
        self.templates.get(kind)
    }

    fn kinds(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::combatant::PropertyTags;
    use skirmish_core::config::EngineConfig;
    use skirmish_core::error::{CompositionError, EngineError};
    use skirmish_core::fight::{Fight, FightOutcome, PlayerAction, RoundResolution};
    use skirmish_core::rng::SeededRng;
    use skirmish_core::{Reward, Stats};

    mod load_tests {
        use super::*;

        #[test]
        fn builtin_pack_loads() {
            let bestiary = Bestiary::builtin().unwrap();
            assert_eq!(bestiary.len(), 8);
            assert_eq!(
                bestiary.kinds(),
                ["bandit", "bog_troll", "cave_spider", "djinn", "headsman", "mire_hydra", "ogre", "rat"]
            );
            for kind in bestiary.kinds() {
                for level in [1, 5, 20] {
                    assert!(bestiary.spawn(kind, level).is_ok(), "{kind} at {level}");
                }
            }
        }

        #[test]
        fn duplicate_kind_rejected() {
            let json = r#"{ "enemies": [
                { "kind": "rat", "stats": { "base": { "max_hp": 5 } } },
                { "kind": "rat", "stats": { "base": { "max_hp": 6 } } }
            ] }"#;
            assert!(matches!(Bestiary::from_json(json), Err(ContentError::DuplicateKind(k)) if k == "rat"));
        }

        #[test]
        fn missing_parameter_is_a_json_error() {
            let json = r#"{ "enemies": [
                { "kind": "wasp", "stats": { "base": {} },
                  "behaviors": [{ "type": "venom", "action": "sting", "damage": 1, "rounds": 2 }] }
            ] }"#;
            assert!(matches!(Bestiary::from_json(json), Err(ContentError::Json(_))));
        }

        #[test]
        fn unimplemented_table_entry_fails_to_build() {
            let json = r#"{ "enemies": [
                { "kind": "wasp", "stats": { "base": {} }, "actions": [{ "action": "sting", "weight": 1 }] }
            ] }"#;
            let err = Bestiary::from_json(json).unwrap_err();
            assert!(matches!(
                err,
                ContentError::Build {
                    source: EngineError::Composition(CompositionError::UnimplementedAction(_)),
                    ..
                }
            ));
        }

        #[test]
        fn missing_file_is_io() {
            let err = Bestiary::from_path("/nonexistent/bestiary.json").unwrap_err();
            assert!(matches!(err, ContentError::Io { .. }));
        }

        #[test]
        fn unknown_kind() {
            let bestiary = Bestiary::builtin().unwrap();
            assert!(matches!(bestiary.spawn("dragon", 1), Err(ContentError::UnknownKind(_))));
            assert!(bestiary.template("dragon").is_none());
        }
    }

    mod spawn_tests {
        use super::*;

        #[test]
        fn hydra_is_a_sectioned_boss() {
            let bestiary = Bestiary::builtin().unwrap();
            let hydra = bestiary.spawn("mire_hydra", 1).unwrap();
            assert!(hydra.tags().contains(PropertyTags::BOSS | PropertyTags::NO_ESCAPE));
            assert_eq!(hydra.stats().hp, 60);
            assert_eq!(hydra.snapshot().section.as_deref(), Some("venom head"));
            assert_eq!(hydra.sections().unwrap().iter().count(), 2);
        }

        #[test]
        fn bandit_pays_renown() {
            let bestiary = Bestiary::builtin().unwrap();
            let bandit = bestiary.spawn("bandit", 1).unwrap();
            let hero = Combatant::player(
                "Hero",
                10,
                Stats {
                    max_hp: 500,
                    hp: 500,
                    force: 50,
                    min_damage: 20,
                    max_damage: 30,
                    ..Stats::default()
                },
            );
            let mut fight = Fight::new(hero, bandit, EngineConfig::default(), Box::new(SeededRng::new(11)));
            let mut last = None;
            while !fight.is_over() {
                if let RoundResolution::Resolved(result) = fight.resolve_round(PlayerAction::Attack).unwrap() {
                    last = Some(result);
                }
            }
            let last = last.unwrap();
            assert_eq!(last.outcome, Some(FightOutcome::Success));
            assert!(last.rewards.contains(&Reward::Renown {
                region: "Fenmoor".into(),
                amount: 2
            }));
            assert!(last.rewards.contains(&Reward::LootMark("bandit_token".into())));
        }
    }
}
