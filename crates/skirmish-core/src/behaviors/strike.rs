//! Named attack.

use serde::{Deserialize, Serialize};

use crate::behavior::{ActionContext, ActionName, Behavior, BehaviorDeclaration};
use crate::error::EngineError;
use crate::resolver::AttackProfile;

use super::{check_action, module_id, render};

/// Parameters of [`Strike`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrikeParams {
    /// Module id; defaults to the action name.
    #[serde(default)]
    pub id: Option<String>,
    /// Action name.
    pub action: String,
    /// The attack.
    pub profile: AttackProfile,
    /// Line logged before the attack, with `{actor}`/`{opponent}` placeholders.
    #[serde(default)]
    pub message: Option<String>,
}

impl StrikeParams {
    /// Parameters with no message and the default id.
    #[must_use]
    pub fn new(action: &str, profile: AttackProfile) -> Self {
        Self {
            id: None,
            action: action.to_string(),
            profile,
            message: None,
        }
    }
}

/// One named attack with its own profile.
///
/// ```
/// use skirmish_core::behavior::Behavior;
/// use skirmish_core::behaviors::{Strike, StrikeParams};
/// use skirmish_core::resolver::AttackProfile;
///
/// let claw = Strike::new(StrikeParams::new("claw", AttackProfile::new("claw").with_range(2, 5))).unwrap();
/// assert_eq!(claw.declaration().actions[0].as_str(), "claw");
/// ```
#[derive(Debug, Clone)]
pub struct Strike {
    declaration: BehaviorDeclaration,
    params: StrikeParams,
}

impl Strike {
    /// Creates the module.
    ///
    /// # Errors
    ///
    /// Fails when the action name is empty or built in.
    pub fn new(params: StrikeParams) -> Result<Self, EngineError> {
        let id = module_id(params.id.as_deref(), &params.action);
        check_action(&id, "action", &params.action)?;
        Ok(Self {
            declaration: BehaviorDeclaration::new(id).action(&params.action),
            params,
        })
    }
}

impl Behavior for Strike {
    fn declaration(&self) -> &BehaviorDeclaration {
        &self.declaration
    }

    fn perform(&self, _action: &ActionName, ctx: &mut ActionContext<'_>) -> Result<(), EngineError> {
        if let Some(template) = &self.params.message {
            let line = render(template, ctx.actor(), ctx.opponent());
            ctx.say(line);
        }
        ctx.strike(&self.params.profile);
        Ok(())
    }
}
