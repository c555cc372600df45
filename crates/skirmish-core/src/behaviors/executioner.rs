//! Bonus damage against weakened opponents.

use serde::{Deserialize, Serialize};

use crate::behavior::{Behavior, BehaviorDeclaration};
use crate::error::EngineError;
use crate::resolver::{AttackDraft, AttackModifier, ModifierContext};

use super::{check_multiplier, check_percent, module_id};

/// Parameters of [`Executioner`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionerParams {
    /// Module id; defaults to `executioner`.
    #[serde(default)]
    pub id: Option<String>,
    /// Defender hp percentage at or below which the bonus applies.
    pub threshold: f64,
    /// Damage multiplier.
    pub multiplier: f64,
}

/// Modifier-only module: multiplies damage against a defender at low hp.
#[derive(Debug, Clone)]
pub struct Executioner {
    declaration: BehaviorDeclaration,
    params: ExecutionerParams,
}

impl Executioner {
    /// Creates the module.
    ///
    /// # Errors
    ///
    /// Fails on an invalid threshold or multiplier.
    pub fn new(params: ExecutionerParams) -> Result<Self, EngineError> {
        let id = module_id(params.id.as_deref(), "executioner");
        check_percent(&id, "threshold", params.threshold)?;
        check_multiplier(&id, "multiplier", params.multiplier)?;
        Ok(Self {
            declaration: BehaviorDeclaration::new(id),
            params,
        })
    }
}

impl Behavior for Executioner {
    fn declaration(&self) -> &BehaviorDeclaration {
        &self.declaration
    }

    fn modifier(&self) -> Option<&dyn AttackModifier> {
        Some(self)
    }
}

impl AttackModifier for Executioner {
    fn name(&self) -> &str {
        self.declaration.id.as_str()
    }

    fn modify(&self, mut draft: AttackDraft, ctx: &ModifierContext<'_>) -> AttackDraft {
        if ctx.defender().hp_percent() <= self.params.threshold {
            draft.damage *= self.params.multiplier;
            draft.notes.push("A merciless blow!".to_string());
        }
        draft
    }
}
