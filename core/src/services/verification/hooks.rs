//! Runs the optional validation hook before dispatch

use std::sync::Arc;

use tracing;

use crate::domain::entities::ContactTarget;
use crate::errors::{DomainError, DomainResult};

use super::traits::ValidationHook;

/// Wraps an optional [`ValidationHook`]; no hook means every contact is approved
#[derive(Clone, Default)]
pub struct HookRunner {
    hook: Option<Arc<dyn ValidationHook>>,
}

impl HookRunner {
    pub fn new(hook: Option<Arc<dyn ValidationHook>>) -> Self {
        Self { hook }
    }

    pub fn is_configured(&self) -> bool {
        self.hook.is_some()
    }

    /// Approve `target` or return why it may not be contacted
    pub async fn approve(&self, target: &ContactTarget) -> DomainResult<()> {
        let Some(hook) = &self.hook else {
            return Ok(());
        };

        match hook.validate(target).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                tracing::info!(
                    contact = %target.masked(),
                    event = "validation_rejected",
                    "Validation hook declined the contact"
                );
                Err(DomainError::ValidationRejected)
            }
            Err(source) => {
                tracing::warn!(
                    contact = %target.masked(),
                    error = %source,
                    event = "validation_failed",
                    "Validation hook returned an error"
                );
                Err(DomainError::ValidationFailed { source })
            }
        }
    }
}

impl std::fmt::Debug for HookRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRunner")
            .field("configured", &self.is_configured())
            .finish()
    }
}
