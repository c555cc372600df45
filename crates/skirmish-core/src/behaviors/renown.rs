//! Regional reputation on defeat.

use serde::{Deserialize, Serialize};

use crate::behavior::{Behavior, BehaviorDeclaration, Reward};
use crate::error::EngineError;
use crate::fight::FightOutcome;

use super::{invalid, module_id};

/// Parameters of [`Renown`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenownParams {
    /// Module id; defaults to `renown`.
    #[serde(default)]
    pub id: Option<String>,
    /// Region whose reputation changes.
    pub region: String,
    /// Reputation delta.
    pub amount: i32,
    /// Optional loot mark granted alongside.
    #[serde(default)]
    pub loot_mark: Option<String>,
}

/// Reward-only module granting regional renown when its owner is beaten.
#[derive(Debug, Clone)]
pub struct Renown {
    declaration: BehaviorDeclaration,
    params: RenownParams,
}

impl Renown {
    /// Creates the module.
    ///
    /// # Errors
    ///
    /// Fails when the region is empty.
    pub fn new(params: RenownParams) -> Result<Self, EngineError> {
        let id = module_id(params.id.as_deref(), "renown");
        if params.region.trim().is_empty() {
            return Err(invalid(&id, "region", "region name is empty"));
        }
        Ok(Self {
            declaration: BehaviorDeclaration::new(id),
            params,
        })
    }
}

impl Behavior for Renown {
    fn declaration(&self) -> &BehaviorDeclaration {
        &self.declaration
    }

    fn rewards(&self, outcome: FightOutcome) -> Vec<Reward> {
        if outcome != FightOutcome::Success {
            return Vec::new();
        }
        let mut rewards = vec![Reward::Renown {
            region: self.params.region.clone(),
            amount: self.params.amount,
        }];
        if let Some(mark) = &self.params.loot_mark {
            rewards.push(Reward::LootMark(mark.clone()));
        }
        rewards
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewards_only_on_success() {
        let module = Renown::new(RenownParams {
            id: None,
            region: "Fenmoor".into(),
            amount: 3,
            loot_mark: Some("bog_iron".into()),
        })
        .unwrap();
        assert_eq!(
            module.rewards(FightOutcome::Success),
            vec![
                Reward::Renown {
                    region: "Fenmoor".into(),
                    amount: 3
                },
                Reward::LootMark("bog_iron".into()),
            ]
        );
        assert!(module.rewards(FightOutcome::Run).is_empty());
        assert!(module.rewards(FightOutcome::Failure).is_empty());
    }

    #[test]
    fn empty_region_rejected() {
        let err = Renown::new(RenownParams {
            id: None,
            region: " ".into(),
            amount: 1,
            loot_mark: None,
        })
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter { param: "region", .. }));
    }
}
