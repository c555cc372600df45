//! Property tags carried by combatants and actions.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Properties that gate combat interactions.
    ///
    /// A combatant carries tags describing itself (`GROUP`, `CHILL`, `BOSS`);
    /// an attack carries tags describing the blow (`RANGED`, `AOE`, `PIERCING`).
    /// The resolver looks at the union of the attacker's and the profile's
    /// tags for offensive properties and at the defender's tags for
    /// defensive ones.
    ///
    /// In JSON the set is written as a `|`-separated list of names:
    ///
    /// ```
    /// use skirmish_core::combatant::PropertyTags;
    ///
    /// let tags: PropertyTags = serde_json::from_str("\"RANGED | BURN\"").unwrap();
    /// assert!(tags.contains(PropertyTags::RANGED));
    /// ```
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct PropertyTags: u32 {
        const ATTACK          = 1 << 0;
        const RANGED          = 1 << 1;
        const AOE             = 1 << 2;
        const BURN            = 1 << 3;
        const CHILL           = 1 << 4;
        const POISON          = 1 << 5;
        const GROUP           = 1 << 6;
        const UNDODGEABLE     = 1 << 7;
        const CANNOT_MISS     = 1 << 8;
        const CANNOT_CRIT     = 1 << 9;
        const GUARANTEED_CRIT = 1 << 10;
        const GUARANTEED_HIT  = 1 << 11;
        const PIERCING        = 1 << 12;
        const NO_ESCAPE       = 1 << 13;
        const BOSS            = 1 << 14;
    }
}

impl PropertyTags {
    /// True when the dodge roll is skipped entirely.
    #[must_use]
    pub fn skips_dodge(self) -> bool {
        self.intersects(Self::GUARANTEED_HIT | Self::UNDODGEABLE)
    }

    /// True when the miss roll is skipped entirely.
    #[must_use]
    pub fn skips_miss(self) -> bool {
        self.intersects(Self::GUARANTEED_HIT | Self::CANNOT_MISS)
    }
}
