use std::sync::Arc;

use async_trait::async_trait;
use idv_core::{Screen, StepContext, StepExecutor, StepOutcome};
use idv_domain::StepKind;

use super::require_image;
use crate::interaction::UserInteraction;

/// Signature presentado solo (no precedido por terms).
pub struct SignatureExecutor {
    interaction: Arc<dyn UserInteraction>,
}

impl SignatureExecutor {
    pub fn new(interaction: Arc<dyn UserInteraction>) -> Self {
        Self { interaction }
    }
}

#[async_trait]
impl StepExecutor for SignatureExecutor {
    fn screen(&self) -> Screen {
        Screen::Signature
    }

    async fn execute(&self, ctx: &StepContext<'_>) -> StepOutcome {
        let image = match require_image(self.interaction.capture_signature().await, "signature") {
            Ok(img) => img,
            Err(e) => return StepOutcome::failed(StepKind::Signature, e),
        };
        let result = ctx.backend.submit_signature(ctx.auth, &image).await;
        if result.is_ok() {
            ctx.observer.on_signature_submitted();
        }
        StepOutcome::from_submission(StepKind::Signature, result)
    }
}
