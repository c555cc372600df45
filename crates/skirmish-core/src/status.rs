//! Per-combatant status store.
//!
//! Every combatant owns exactly one [`StatusStore`]. An entry maps a
//! [`StatusKey`] to a typed [`StatusValue`] plus an expiry category:
//!
//! | Lifetime | Expires |
//! |---|---|
//! | [`Lifetime::Turn`] | at the start of the next round |
//! | [`Lifetime::Rounds`] | after participating in N round-end ticks |
//! | [`Lifetime::Encounter`] | at fight cleanup |
//! | [`Lifetime::Fights`] | after N completed fights |
//! | [`Lifetime::Permanent`] | only when explicitly cleared |
//!
//! # Round durations
//!
//! "Set for N rounds" means the entry takes part in exactly N round-end ticks
//! and is gone after the N-th. The tick happens once both sides have acted, so
//! an entry applied to a combatant that has *already acted* this round would
//! lose a turn to the current tick. Such entries are stored *pending* and skip
//! the current tick. The result is that a duration always counts the owner's
//! own turns, whichever side of the round the effect landed on.
//!
//! # Fight durations
//!
//! The same rule applies one level up. "Set for N fights" means the entry
//! outlives N fight cleanups after the one it was set in. A fight-timed entry
//! set while a fight is running is stored pending and skips that fight's
//! cleanup, so a one-fight cooldown used mid-fight still blocks the next fight.
//!
//! # Isolation
//!
//! The store has no way to reach another combatant's store. Cross-combatant
//! effects travel as [`Effect`](crate::effect::Effect) values that the fight
//! orchestrator applies.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::behavior::BehaviorId;

// =============================================================================
// Keys
// =============================================================================

/// Namespace a status key lives in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Namespace {
    /// Protocol keys interpreted by the engine itself (see [`keys`]).
    Engine,
    /// Keys deliberately shared between behavior modules.
    Shared,
    /// Keys private to one composed behavior module.
    Behavior(BehaviorId),
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Engine => write!(f, "engine"),
            Self::Shared => write!(f, "shared"),
            Self::Behavior(id) => write!(f, "{id}"),
        }
    }
}

/// Fully qualified status key.
///
/// Two behaviors that both use the local name `"charged"` get two distinct
/// keys because each key carries its owner's namespace.
///
/// ```
/// use skirmish_core::behavior::BehaviorId;
/// use skirmish_core::status::StatusKey;
///
/// let a = StatusKey::behavior(BehaviorId::new("ogre_smash"), "charged");
/// let b = StatusKey::behavior(BehaviorId::new("troll_smash"), "charged");
/// assert_ne!(a, b);
/// assert_eq!(a.to_string(), "ogre_smash:charged");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StatusKey {
    namespace: Namespace,
    name: Cow<'static, str>,
}

impl StatusKey {
    /// Creates an engine protocol key at compile time.
    #[must_use]
    pub const fn engine(name: &'static str) -> Self {
        Self {
            namespace: Namespace::Engine,
            name: Cow::Borrowed(name),
        }
    }

    /// Creates a key shared between modules.
    #[must_use]
    pub fn shared(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            namespace: Namespace::Shared,
            name: name.into(),
        }
    }

    /// Creates a key private to `owner`.
    #[must_use]
    pub fn behavior(owner: BehaviorId, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            namespace: Namespace::Behavior(owner),
            name: name.into(),
        }
    }

    /// Engine key tracking the cooldown of a player skill or spell.
    #[must_use]
    pub fn cooldown(ability: &str) -> Self {
        Self {
            namespace: Namespace::Engine,
            name: Cow::Owned(format!("cooldown:{ability}")),
        }
    }

    /// Engine key holding the hp snapshot of a boss section.
    #[must_use]
    pub fn section_hp(section: &str) -> Self {
        Self {
            namespace: Namespace::Engine,
            name: Cow::Owned(format!("section_hp:{section}")),
        }
    }

    /// Returns the namespace.
    #[must_use]
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Returns the local name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for StatusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// Engine protocol keys.
///
/// Behaviors may write these (usually on the opponent, through an
/// [`Effect`](crate::effect::Effect)) but never own them.
pub mod keys {
    use super::StatusKey;

    /// Skips the owner's next action.
    pub const STUNNED: StatusKey = StatusKey::engine("stunned");
    /// `Text` value naming the action the owner must take next.
    pub const FORCED_ACTION: StatusKey = StatusKey::engine("forced_action");
    /// Owner is defending this round.
    pub const DEFENDING: StatusKey = StatusKey::engine("defending");
    /// Poison, `Int` damage per tick.
    pub const POISONED: StatusKey = StatusKey::engine("poisoned");
    /// Burn, `Int` damage per tick.
    pub const BURNING: StatusKey = StatusKey::engine("burning");
    /// Acid, `Int` damage per tick; also shreds defence while active.
    pub const ACID: StatusKey = StatusKey::engine("acid");
    /// Wind wall around the owner, `Int` damage dealt to the opponent per tick.
    pub const WINDWALL: StatusKey = StatusKey::engine("windwall");
    /// `Int` extra miss chance in percent.
    pub const BLINDED: StatusKey = StatusKey::engine("blinded");
    /// Owner cannot cast spells.
    pub const SILENCED: StatusKey = StatusKey::engine("silenced");
    /// Owner cannot flee.
    pub const SNARED: StatusKey = StatusKey::engine("snared");
    /// `Float` multiplier on damage the owner deals.
    pub const DAMAGE_MULTIPLIER: StatusKey = StatusKey::engine("damage_multiplier");
    /// `Float` multiplier on damage the owner takes.
    pub const DAMAGE_TAKEN_MULTIPLIER: StatusKey = StatusKey::engine("damage_taken_multiplier");
}

// =============================================================================
// Values and lifetimes
// =============================================================================

/// Typed value of a status entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatusValue {
    /// Presence flag.
    Flag(bool),
    /// Integer magnitude (damage per tick, stacks, percent).
    Int(i64),
    /// Fractional magnitude (multipliers).
    Float(f64),
    /// Text (action names).
    Text(String),
}

impl StatusValue {
    /// Interprets the value as an integer. Floats truncate, flags map to 0/1,
    /// text parses or falls back to 0.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        match self {
            Self::Flag(b) => i64::from(*b),
            Self::Int(n) => *n,
            #[allow(clippy::cast_possible_truncation)]
            Self::Float(x) => *x as i64,
            Self::Text(s) => s.parse().unwrap_or(0),
        }
    }

    /// Interprets the value as a float.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Flag(b) => f64::from(u8::from(*b)),
            #[allow(clippy::cast_precision_loss)]
            Self::Int(n) => *n as f64,
            Self::Float(x) => *x,
            Self::Text(s) => s.parse().unwrap_or(0.0),
        }
    }

    /// Truthiness: non-zero numbers, `true`, non-empty text.
    #[must_use]
    pub fn as_bool(&self) -> bool {
        match self {
            Self::Flag(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Float(x) => *x != 0.0,
            Self::Text(s) => !s.is_empty(),
        }
    }

    /// Returns the text payload, if any.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for StatusValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl From<i64> for StatusValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for StatusValue {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<u32> for StatusValue {
    fn from(n: u32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for StatusValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for StatusValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for StatusValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Requested lifetime when setting an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lifetime {
    /// Active for the current round only.
    Turn,
    /// Active for N round-end ticks of the owner.
    Rounds(u32),
    /// Active until the fight ends.
    Encounter,
    /// Active for N completed fights.
    Fights(u32),
    /// Active until explicitly cleared.
    Permanent,
}

impl Lifetime {
    /// Returns true for the categories that survive fight cleanup.
    #[must_use]
    pub const fn outlives_fight(self) -> bool {
        matches!(self, Self::Fights(_) | Self::Permanent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expiry {
    Turn,
    Rounds { remaining: u32, pending: bool },
    Encounter,
    Fights { remaining: u32, pending: bool },
    Permanent,
}

impl Expiry {
    fn lifetime(self) -> Lifetime {
        match self {
            Self::Turn => Lifetime::Turn,
            Self::Rounds { remaining, .. } => Lifetime::Rounds(remaining),
            Self::Encounter => Lifetime::Encounter,
            Self::Fights { remaining, .. } => Lifetime::Fights(remaining),
            Self::Permanent => Lifetime::Permanent,
        }
    }
}

/// A stored status entry.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusEntry {
    value: StatusValue,
    expiry: Expiry,
}

impl StatusEntry {
    /// The entry's value.
    #[must_use]
    pub fn value(&self) -> &StatusValue {
        &self.value
    }

    /// The entry's lifetime, with the current remaining count for timed
    /// categories.
    #[must_use]
    pub fn lifetime(&self) -> Lifetime {
        self.expiry.lifetime()
    }

    /// True for a timed entry that will skip the current round tick or the
    /// current fight cleanup.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(
            self.expiry,
            Expiry::Rounds { pending: true, .. } | Expiry::Fights { pending: true, .. }
        )
    }
}

/// A round-timed entry that took part in a round-end tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickedEntry {
    /// The entry key.
    pub key: StatusKey,
    /// The entry value at tick time.
    pub value: StatusValue,
    /// Remaining ticks after this one; 0 means the entry was removed.
    pub remaining: u32,
}

/// Serializable form of an entry that outlives a fight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedStatus {
    /// Entry key.
    pub key: StatusKey,
    /// Entry value.
    pub value: StatusValue,
    /// Either `Fights(n)` or `Permanent`.
    pub lifetime: Lifetime,
}

// =============================================================================
// Store
// =============================================================================

/// Status entries of one combatant.
///
/// Entries are kept in a `BTreeMap` so iteration (and therefore the order in
/// which damage-over-time effects are reported) is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusStore {
    entries: BTreeMap<StatusKey, StatusEntry>,
    turn_taken: bool,
    in_fight: bool,
}

impl StatusStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value` with the given lifetime, replacing any existing
    /// entry. `Rounds(0)` and `Fights(0)` clear the key.
    pub fn set(&mut self, key: StatusKey, value: impl Into<StatusValue>, lifetime: Lifetime) {
        let expiry = match lifetime {
            Lifetime::Turn => Expiry::Turn,
            Lifetime::Rounds(0) | Lifetime::Fights(0) => {
                self.entries.remove(&key);
                return;
            }
            Lifetime::Rounds(n) => Expiry::Rounds {
                remaining: n,
                pending: self.turn_taken,
            },
            Lifetime::Encounter => Expiry::Encounter,
            Lifetime::Fights(n) => Expiry::Fights {
                remaining: n,
                pending: self.in_fight,
            },
            Lifetime::Permanent => Expiry::Permanent,
        };
        let value = value.into();
        debug!(%key, ?value, ?lifetime, "status set");
        self.entries.insert(key, StatusEntry { value, expiry });
    }

    /// Returns the value of `key`, or `default` when absent.
    #[must_use]
    pub fn get(&self, key: &StatusKey, default: impl Into<StatusValue>) -> StatusValue {
        self.entries
            .get(key)
            .map_or_else(|| default.into(), |entry| entry.value.clone())
    }

    /// Integer shorthand for [`get`](Self::get).
    #[must_use]
    pub fn get_i64(&self, key: &StatusKey, default: i64) -> i64 {
        self.entries.get(key).map_or(default, |e| e.value.as_i64())
    }

    /// Float shorthand for [`get`](Self::get).
    #[must_use]
    pub fn get_f64(&self, key: &StatusKey, default: f64) -> f64 {
        self.entries.get(key).map_or(default, |e| e.value.as_f64())
    }

    /// Returns the raw entry.
    #[must_use]
    pub fn entry(&self, key: &StatusKey) -> Option<&StatusEntry> {
        self.entries.get(key)
    }

    /// True when `key` is present. Round-timed entries are removed as soon as
    /// their counter reaches zero, so presence means active.
    #[must_use]
    pub fn has(&self, key: &StatusKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes `key`, returning the old entry.
    pub fn clear(&mut self, key: &StatusKey) -> Option<StatusEntry> {
        self.entries.remove(key)
    }

    /// Adds `by` to `key` and returns the new value.
    ///
    /// - absent: inserts `default + by` for the rest of the encounter
    /// - round/fight-timed: raises the counter (never below 0; 0 removes)
    /// - otherwise: adds to the numeric value, keeping the lifetime
    pub fn increment(&mut self, key: StatusKey, by: i64, default: i64) -> i64 {
        let Some(entry) = self.entries.get_mut(&key) else {
            let value = default.saturating_add(by);
            self.set(key, value, Lifetime::Encounter);
            return value;
        };
        match &mut entry.expiry {
            Expiry::Rounds { remaining, .. } | Expiry::Fights { remaining, .. } => {
                let next = i64::from(*remaining).saturating_add(by).max(0);
                if next == 0 {
                    self.entries.remove(&key);
                    return 0;
                }
                *remaining = u32::try_from(next).unwrap_or(u32::MAX);
                next
            }
            Expiry::Turn | Expiry::Encounter | Expiry::Permanent => {
                let next = entry.value.as_i64().saturating_add(by);
                entry.value = StatusValue::Int(next);
                next
            }
        }
    }

    /// Lowers a round-timed counter by one, removing the entry at zero.
    ///
    /// Returns the remaining count, or `None` when the key is absent or not
    /// round-timed (both no-ops).
    pub fn decrement(&mut self, key: &StatusKey) -> Option<u32> {
        let entry = self.entries.get_mut(key)?;
        let Expiry::Rounds { remaining, .. } = &mut entry.expiry else {
            return None;
        };
        *remaining = remaining.saturating_sub(1);
        let left = *remaining;
        if left == 0 {
            self.entries.remove(key);
        }
        Some(left)
    }

    /// Remaining count of a round- or fight-timed entry.
    #[must_use]
    pub fn remaining(&self, key: &StatusKey) -> Option<u32> {
        match self.entries.get(key)?.expiry {
            Expiry::Rounds { remaining, .. } | Expiry::Fights { remaining, .. } => Some(remaining),
            _ => None,
        }
    }

    /// Records that a fight has started. Fight-timed entries set from now
    /// until [`end_fight`](Self::end_fight) are stored pending.
    pub fn begin_fight(&mut self) {
        self.in_fight = true;
    }

    /// True between [`begin_fight`](Self::begin_fight) and
    /// [`end_fight`](Self::end_fight).
    #[must_use]
    pub fn in_fight(&self) -> bool {
        self.in_fight
    }

    /// Records that the owner has acted this round. Round-timed entries set
    /// from now until the round-end tick are stored pending.
    pub fn mark_turn_taken(&mut self) {
        self.turn_taken = true;
    }

    /// True once the owner has acted this round.
    #[must_use]
    pub fn has_taken_turn(&self) -> bool {
        self.turn_taken
    }

    /// Drops every single-turn entry. Called at the start of each round.
    pub fn clear_turn_entries(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.expiry != Expiry::Turn);
        before - self.entries.len()
    }

    /// Round-end tick: every non-pending round-timed entry loses one round.
    ///
    /// Returns the entries that took part in the tick (including those that
    /// just expired) in key order. Pending entries are promoted instead of
    /// decremented, and the owner's turn marker is reset.
    pub fn tick_round(&mut self) -> Vec<TickedEntry> {
        let mut ticked = Vec::new();
        for (key, entry) in &mut self.entries {
            if let Expiry::Rounds { remaining, pending } = &mut entry.expiry {
                if *pending {
                    *pending = false;
                    continue;
                }
                *remaining = remaining.saturating_sub(1);
                ticked.push(TickedEntry {
                    key: key.clone(),
                    value: entry.value.clone(),
                    remaining: *remaining,
                });
            }
        }
        self.entries
            .retain(|_, e| !matches!(e.expiry, Expiry::Rounds { remaining: 0, .. }));
        self.turn_taken = false;
        ticked
    }

    /// Fight cleanup: drops every transient entry and counts non-pending
    /// fight-timed entries down by one. Pending ones are promoted instead.
    /// Permanent entries are untouched.
    pub fn end_fight(&mut self) {
        self.entries.retain(|_, entry| match &mut entry.expiry {
            Expiry::Turn | Expiry::Rounds { .. } | Expiry::Encounter => false,
            Expiry::Fights { pending, .. } if *pending => {
                *pending = false;
                true
            }
            Expiry::Fights { remaining, .. } => {
                *remaining = remaining.saturating_sub(1);
                *remaining > 0
            }
            Expiry::Permanent => true,
        });
        self.turn_taken = false;
        self.in_fight = false;
    }

    /// Entries that outlive a fight, for the persistence bridge.
    ///
    /// A pending fight-timed entry is written with one extra fight so that,
    /// restored outside a fight, it still outlives the fight it was set in.
    #[must_use]
    pub fn persistent_entries(&self) -> Vec<PersistedStatus> {
        self.entries
            .iter()
            .filter(|(_, e)| e.lifetime().outlives_fight())
            .map(|(key, e)| PersistedStatus {
                key: key.clone(),
                value: e.value.clone(),
                lifetime: match e.expiry {
                    Expiry::Fights { remaining, pending: true } => {
                        Lifetime::Fights(remaining.saturating_add(1))
                    }
                    _ => e.lifetime(),
                },
            })
            .collect()
    }

    /// Restores entries produced by [`persistent_entries`](Self::persistent_entries).
    pub fn restore(&mut self, persisted: impl IntoIterator<Item = PersistedStatus>) {
        for p in persisted {
            self.set(p.key, p.value, p.lifetime);
        }
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&StatusKey, &StatusEntry)> {
        self.entries.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
