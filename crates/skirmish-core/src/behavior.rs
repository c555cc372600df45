//! Behavior module framework.
//!
//! Enemies are not subclasses. An enemy is a [`Combatant`] plus an ordered list
//! of behavior modules, each a small parameterized object implementing
//! [`Behavior`]. A module contributes:
//!
//! - actions it implements (`declaration().actions`)
//! - weight adjustments for those actions ([`Behavior::weight`])
//! - an attack modifier applied to every attack its owner makes
//! - rewards granted when its owner is defeated
//! - the status keys it owns (`declaration().owns`)
//!
//! # Composition
//!
//! [`BehaviorSet::compose`] checks every collision up front. Two modules with
//! the same id, two modules claiming the same status key or the same action
//! name, or a module claiming an engine key are all rejected with a
//! [`CompositionError`] before the enemy ever fights.
//!
//! Private keys carry their owner's id in the key itself
//! ([`StatusKey::behavior`]), so two modules that both use a local name like
//! `"charged"` never see each other's state.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use skirmish_core::behavior::{
//!     ActionContext, ActionName, Behavior, BehaviorDeclaration, BehaviorId, BehaviorSet,
//! };
//! use skirmish_core::error::EngineError;
//! use skirmish_core::resolver::AttackProfile;
//!
//! struct Bite {
//!     declaration: BehaviorDeclaration,
//!     profile: AttackProfile,
//! }
//!
//! impl Behavior for Bite {
//!     fn declaration(&self) -> &BehaviorDeclaration {
//!         &self.declaration
//!     }
//!
//!     fn perform(&self, _action: &ActionName, ctx: &mut ActionContext<'_>) -> Result<(), EngineError> {
//!         ctx.strike(&self.profile);
//!         Ok(())
//!     }
//! }
//!
//! let bite = Arc::new(Bite {
//!     declaration: BehaviorDeclaration::new(BehaviorId::new("bite")).action("bite"),
//!     profile: AttackProfile::new("bite"),
//! });
//!
//! let set = BehaviorSet::compose(vec![bite]).unwrap();
//! assert!(set.implements(&ActionName::new("bite")));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::combatant::{Combatant, PropertyTags, Stats};
use crate::error::{CompositionError, EngineError};
use crate::fight::FightOutcome;
use crate::resolver::AttackModifier;
use crate::selector::ActionTable;
use crate::status::{Namespace, StatusKey};

pub use crate::effect::{ActionContext, Effect, Target};

/// Action every combatant can take without a module: a plain attack with its
/// own damage range.
pub const BASIC_ATTACK: &str = "attack";

/// Built-in action that raises the actor's guard for the round.
pub const DEFEND: &str = "defend";

// =============================================================================
// Identifiers
// =============================================================================

/// Unique identifier of a behavior module within one combatant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BehaviorId(String);

impl BehaviorId {
    /// Creates a new `BehaviorId`.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BehaviorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BehaviorId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for BehaviorId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Name of an action an enemy can select.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionName(String);

impl ActionName {
    /// Creates a new `ActionName`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    /// The built-in basic attack.
    #[must_use]
    pub fn basic_attack() -> Self {
        Self::new(BASIC_ATTACK)
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for actions the engine implements without a module.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        self.0 == BASIC_ATTACK || self.0 == DEFEND
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ActionName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ActionName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// =============================================================================
// Declaration
// =============================================================================

/// What a behavior module contributes and owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BehaviorDeclaration {
    /// Unique id within the composed set; also the namespace of private keys.
    pub id: BehaviorId,
    /// Actions this module implements.
    pub actions: Vec<ActionName>,
    /// Status keys this module owns.
    pub owns: Vec<StatusKey>,
}

impl BehaviorDeclaration {
    /// Declaration with no actions and no keys.
    #[must_use]
    pub fn new(id: BehaviorId) -> Self {
        Self {
            id,
            actions: Vec::new(),
            owns: Vec::new(),
        }
    }

    /// Adds an implemented action.
    #[must_use]
    pub fn action(mut self, name: &str) -> Self {
        self.actions.push(ActionName::new(name));
        self
    }

    /// Adds an owned private key and returns the builder.
    #[must_use]
    pub fn owns(mut self, key: StatusKey) -> Self {
        self.owns.push(key);
        self
    }

    /// Private key in this module's namespace.
    #[must_use]
    pub fn key(&self, name: &'static str) -> StatusKey {
        StatusKey::behavior(self.id.clone(), name)
    }
}

// =============================================================================
// Opponent view
// =============================================================================

/// What a behavior may know about the other side: stats, tags and name.
///
/// The opponent's status store is deliberately unreachable from here.
#[derive(Clone, Copy)]
pub struct OpponentView<'a> {
    inner: &'a Combatant,
}

impl<'a> OpponentView<'a> {
    /// Wraps a combatant.
    #[must_use]
    pub fn new(inner: &'a Combatant) -> Self {
        Self { inner }
    }

    /// The opponent's stats.
    #[must_use]
    pub fn stats(&self) -> &'a Stats {
        self.inner.stats()
    }

    /// The opponent's property tags.
    #[must_use]
    pub fn tags(&self) -> PropertyTags {
        self.inner.tags()
    }

    /// The opponent's display name.
    #[must_use]
    pub fn name(&self) -> String {
        self.inner.display_name()
    }

    /// Hp as a percentage of maximum, 0 when max hp is not positive.
    #[must_use]
    pub fn hp_percent(&self) -> f64 {
        self.inner.hp_percent()
    }
}

impl fmt::Debug for OpponentView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpponentView")
            .field("name", &self.inner.name())
            .field("hp", &self.inner.stats().hp)
            .finish()
    }
}

// =============================================================================
// Rewards
// =============================================================================

/// Something granted to the player when a module's owner is defeated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reward {
    /// Regional reputation change.
    Renown {
        /// Region name.
        region: String,
        /// Reputation delta.
        amount: i32,
    },
    /// A named loot mark the host turns into items.
    LootMark(String),
}

// =============================================================================
// Behavior trait
// =============================================================================

/// A composable enemy behavior.
///
/// Only [`declaration`](Self::declaration) is required. A module with no
/// actions is still useful for its modifier or its rewards.
pub trait Behavior: Send + Sync {
    /// Returns the module's declaration.
    fn declaration(&self) -> &BehaviorDeclaration;

    /// Weight contribution for one of this module's own actions.
    ///
    /// `None` keeps the table weight, `Some(0)` suppresses the action,
    /// `Some(w)` sets it (adding the action if the table lacks it).
    fn weight(&self, _action: &ActionName, _actor: &Combatant, _opponent: OpponentView<'_>) -> Option<u32> {
        None
    }

    /// Carries out one of this module's actions.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownAction`] when asked to perform an action
    /// the module does not implement.
    fn perform(&self, action: &ActionName, ctx: &mut ActionContext<'_>) -> Result<(), EngineError> {
        Err(EngineError::UnknownAction {
            action: action.clone(),
            combatant: ctx.actor().display_name(),
        })
    }

    /// Modifier applied to every attack the owner makes.
    fn modifier(&self) -> Option<&dyn AttackModifier> {
        None
    }

    /// Rewards granted on the given outcome.
    fn rewards(&self, _outcome: FightOutcome) -> Vec<Reward> {
        Vec::new()
    }
}

// =============================================================================
// Composition
// =============================================================================

/// Ordered, collision-checked set of behavior modules.
#[derive(Clone, Default)]
pub struct BehaviorSet {
    modules: Vec<Arc<dyn Behavior>>,
    action_owner: BTreeMap<ActionName, usize>,
}

impl BehaviorSet {
    /// Empty set, used by players and plain enemies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Composes modules in order.
    ///
    /// # Errors
    ///
    /// Returns a [`CompositionError`] on duplicate ids, duplicate owned keys,
    /// duplicate actions, or keys outside the module's own or the shared
    /// namespace.
    pub fn compose(modules: Vec<Arc<dyn Behavior>>) -> Result<Self, CompositionError> {
        let mut ids: BTreeMap<BehaviorId, usize> = BTreeMap::new();
        let mut key_owner: BTreeMap<StatusKey, BehaviorId> = BTreeMap::new();
        let mut action_owner: BTreeMap<ActionName, usize> = BTreeMap::new();

        for (index, module) in modules.iter().enumerate() {
            let decl = module.declaration();
            if ids.insert(decl.id.clone(), index).is_some() {
                return Err(CompositionError::DuplicateBehavior(decl.id.clone()));
            }

            for key in &decl.owns {
                let allowed = match key.namespace() {
                    Namespace::Behavior(owner) => owner == &decl.id,
                    Namespace::Shared => true,
                    Namespace::Engine => false,
                };
                if !allowed {
                    return Err(CompositionError::ForeignStatusKey {
                        behavior: decl.id.clone(),
                        key: key.clone(),
                    });
                }
                if let Some(first) = key_owner.get(key) {
                    return Err(CompositionError::DuplicateStatusKey {
                        key: key.clone(),
                        first: first.clone(),
                        second: decl.id.clone(),
                    });
                }
                key_owner.insert(key.clone(), decl.id.clone());
            }

            for action in &decl.actions {
                if let Some(&first) = action_owner.get(action) {
                    return Err(CompositionError::DuplicateAction {
                        action: action.clone(),
                        first: modules[first].declaration().id.clone(),
                        second: decl.id.clone(),
                    });
                }
                action_owner.insert(action.clone(), index);
            }
        }

        Ok(Self {
            modules,
            action_owner,
        })
    }

    /// Checks that every action in `table` is built in or implemented here.
    ///
    /// # Errors
    ///
    /// Returns [`CompositionError::UnimplementedAction`] for the first action
    /// nobody implements.
    pub fn validate_table(&self, table: &ActionTable) -> Result<(), CompositionError> {
        for entry in table.iter() {
            if !self.implements(&entry.action) {
                return Err(CompositionError::UnimplementedAction(entry.action.clone()));
            }
        }
        Ok(())
    }

    /// True when the action is built in or owned by a module.
    #[must_use]
    pub fn implements(&self, action: &ActionName) -> bool {
        action.is_builtin() || self.action_owner.contains_key(action)
    }

    /// The module implementing `action`.
    #[must_use]
    pub fn owner_of(&self, action: &ActionName) -> Option<&Arc<dyn Behavior>> {
        self.action_owner.get(action).map(|&i| &self.modules[i])
    }

    /// Modules in composition order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Behavior>> {
        self.modules.iter()
    }

    /// Attack modifiers in composition order.
    pub fn modifiers(&self) -> impl Iterator<Item = &dyn AttackModifier> {
        self.modules.iter().filter_map(|m| m.modifier())
    }

    /// Rewards from every module for the given outcome.
    #[must_use]
    pub fn rewards(&self, outcome: FightOutcome) -> Vec<Reward> {
        self.modules.iter().flat_map(|m| m.rewards(outcome)).collect()
    }

    /// Number of modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// True when no module is composed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl fmt::Debug for BehaviorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.modules.iter().map(|m| m.declaration().id.as_str()))
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        declaration: BehaviorDeclaration,
    }

    impl Probe {
        fn new(id: &str) -> Self {
            Self {
                declaration: BehaviorDeclaration::new(BehaviorId::new(id)),
            }
        }

        fn with_action(mut self, name: &str) -> Self {
            self.declaration = self.declaration.action(name);
            self
        }

        fn with_key(mut self, key: StatusKey) -> Self {
            self.declaration = self.declaration.owns(key);
            self
        }
    }

    impl Behavior for Probe {
        fn declaration(&self) -> &BehaviorDeclaration {
            &self.declaration
        }
    }

    fn arc(p: Probe) -> Arc<dyn Behavior> {
        Arc::new(p)
    }

    mod compose_tests {
        use super::*;

        #[test]
        fn distinct_modules_compose() {
            let a = Probe::new("a").with_action("slam");
            let a_key = a.declaration.key("charged");
            let b = Probe::new("b").with_action("spit");
            let b_key = b.declaration.key("charged");
            let set = BehaviorSet::compose(vec![arc(a.with_key(a_key)), arc(b.with_key(b_key))]).unwrap();
            assert_eq!(set.len(), 2);
            assert!(set.implements(&ActionName::new("slam")));
            assert!(set.implements(&ActionName::basic_attack()));
            assert!(!set.implements(&ActionName::new("fly")));
        }

        #[test]
        fn duplicate_id_rejected() {
            let err = BehaviorSet::compose(vec![arc(Probe::new("a")), arc(Probe::new("a"))]).unwrap_err();
            assert_eq!(err, CompositionError::DuplicateBehavior(BehaviorId::new("a")));
        }

        #[test]
        fn duplicate_shared_key_rejected() {
            let key = StatusKey::shared("rage");
            let err = BehaviorSet::compose(vec![
                arc(Probe::new("a").with_key(key.clone())),
                arc(Probe::new("b").with_key(key.clone())),
            ])
            .unwrap_err();
            assert_eq!(
                err,
                CompositionError::DuplicateStatusKey {
                    key,
                    first: BehaviorId::new("a"),
                    second: BehaviorId::new("b"),
                }
            );
        }

        #[test]
        fn duplicate_action_rejected() {
            let err = BehaviorSet::compose(vec![
                arc(Probe::new("a").with_action("slam")),
                arc(Probe::new("b").with_action("slam")),
            ])
            .unwrap_err();
            assert!(matches!(err, CompositionError::DuplicateAction { .. }));
        }

        #[test]
        fn engine_and_foreign_keys_rejected() {
            let err = BehaviorSet::compose(vec![arc(Probe::new("a").with_key(crate::status::keys::STUNNED))])
                .unwrap_err();
            assert!(matches!(err, CompositionError::ForeignStatusKey { .. }));

            let stolen = StatusKey::behavior(BehaviorId::new("b"), "x");
            let err = BehaviorSet::compose(vec![arc(Probe::new("a").with_key(stolen))]).unwrap_err();
            assert!(matches!(err, CompositionError::ForeignStatusKey { .. }));
        }

        #[test]
        fn table_validation() {
            let set = BehaviorSet::compose(vec![arc(Probe::new("a").with_action("slam"))]).unwrap();
            let ok = ActionTable::new().with("slam", 3).with(BASIC_ATTACK, 1);
            assert!(set.validate_table(&ok).is_ok());

            let bad = ActionTable::new().with("fly", 1);
            assert_eq!(
                set.validate_table(&bad),
                Err(CompositionError::UnimplementedAction(ActionName::new("fly")))
            );
        }

        #[test]
        fn owner_lookup_and_debug() {
            let set = BehaviorSet::compose(vec![
                arc(Probe::new("a").with_action("slam")),
                arc(Probe::new("b").with_action("spit")),
            ])
            .unwrap();
            let owner = set.owner_of(&ActionName::new("spit")).unwrap();
            assert_eq!(owner.declaration().id, BehaviorId::new("b"));
            assert_eq!(format!("{set:?}"), r#"["a", "b"]"#);
        }
    }

    mod default_trait_tests {
        use super::*;

        #[test]
        fn default_rewards_and_modifier_are_empty() {
            let probe = Probe::new("a");
            assert!(probe.rewards(FightOutcome::Success).is_empty());
            assert!(probe.modifier().is_none());
        }
    }
}
