use std::sync::Arc;

use async_trait::async_trait;
use idv_core::{Screen, StepContext, StepExecutor, StepOutcome};
use idv_domain::{FlowError, StepKind, UserInfo};

use crate::interaction::UserInteraction;

pub struct UserInfoExecutor {
    interaction: Arc<dyn UserInteraction>,
}

impl UserInfoExecutor {
    pub fn new(interaction: Arc<dyn UserInteraction>) -> Self {
        Self { interaction }
    }

    async fn collect(&self) -> Result<UserInfo, FlowError> {
        let form = self.interaction
                       .user_info()
                       .await
                       .ok_or_else(|| FlowError::InvalidInput("personal details are required".to_string()))?;
        Ok(UserInfo::parse(&form.first_name, &form.last_name, &form.date_of_birth)?)
    }
}

#[async_trait]
impl StepExecutor for UserInfoExecutor {
    fn screen(&self) -> Screen {
        Screen::UserInfo
    }

    async fn execute(&self, ctx: &StepContext<'_>) -> StepOutcome {
        let info = match self.collect().await {
            Ok(info) => info,
            Err(e) => return StepOutcome::failed(StepKind::UserInfo, e),
        };
        let result = ctx.backend.submit_user_info(ctx.auth, &info).await;
        if result.is_ok() {
            ctx.observer.on_user_info_submitted(&info);
        }
        StepOutcome::from_submission(StepKind::UserInfo, result)
    }
}
