use std::sync::Arc;

use async_trait::async_trait;
use idv_core::{Screen, StepContext, StepExecutor, StepOutcome};
use idv_domain::StepKind;

use super::require_image;
use crate::interaction::UserInteraction;

pub struct SelfieExecutor {
    interaction: Arc<dyn UserInteraction>,
}

impl SelfieExecutor {
    pub fn new(interaction: Arc<dyn UserInteraction>) -> Self {
        Self { interaction }
    }
}

#[async_trait]
impl StepExecutor for SelfieExecutor {
    fn screen(&self) -> Screen {
        Screen::Selfie
    }

    async fn execute(&self, ctx: &StepContext<'_>) -> StepOutcome {
        let image = match require_image(self.interaction.capture_selfie().await, "selfie") {
            Ok(img) => img,
            Err(e) => return StepOutcome::failed(StepKind::Selfie, e),
        };
        StepOutcome::from_submission(StepKind::Selfie, ctx.backend.submit_selfie(ctx.auth, &image).await)
    }
}
