//! Verificación por código de un solo uso (email o sms).
//!
//! El executor recuerda a qué dirección envió el último código: un
//! reintento sólo vuelve a verificar, salvo que el usuario cambie la
//! dirección, en cuyo caso se envía un código nuevo.
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use idv_core::{Screen, StepContext, StepExecutor, StepOutcome};
use idv_domain::{FlowError, StepKind};
use idv_policies::Submission;
use log::debug;

use crate::interaction::UserInteraction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpChannel {
    Email,
    Sms,
}

impl OtpChannel {
    pub fn step(&self) -> StepKind {
        match self {
            OtpChannel::Email => StepKind::Email,
            OtpChannel::Sms => StepKind::Sms,
        }
    }

    fn address_label(&self) -> &'static str {
        match self {
            OtpChannel::Email => "email address",
            OtpChannel::Sms => "phone number",
        }
    }
}

pub struct OtpExecutor {
    channel: OtpChannel,
    interaction: Arc<dyn UserInteraction>,
    sent_to: Mutex<Option<String>>,
}

impl OtpExecutor {
    pub fn new(channel: OtpChannel, interaction: Arc<dyn UserInteraction>) -> Self {
        Self { channel,
               interaction,
               sent_to: Mutex::new(None) }
    }

    pub fn sent_to(&self) -> Option<String> {
        self.sent_to.lock().ok().and_then(|s| s.clone())
    }

    async fn address(&self) -> Result<String, FlowError> {
        let raw = match self.channel {
            OtpChannel::Email => self.interaction.email_address().await,
            OtpChannel::Sms => self.interaction.phone_number().await,
        };
        raw.map(|a| a.trim().to_string())
           .filter(|a| !a.is_empty())
           .ok_or_else(|| FlowError::InvalidInput(format!("{} is required", self.channel.address_label())))
    }

    async fn send(&self, ctx: &StepContext<'_>, address: &str) -> Result<Submission, FlowError> {
        match self.channel {
            OtpChannel::Email => ctx.backend.send_email_code(ctx.auth, address).await,
            OtpChannel::Sms => ctx.backend.send_phone_code(ctx.auth, address).await,
        }
    }

    async fn verify(&self, ctx: &StepContext<'_>, address: &str, code: &str) -> Result<Submission, FlowError> {
        match self.channel {
            OtpChannel::Email => ctx.backend.verify_email_code(ctx.auth, address, code).await,
            OtpChannel::Sms => ctx.backend.verify_phone_code(ctx.auth, address, code).await,
        }
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<Submission, FlowError> {
        let address = self.address().await?;
        if self.sent_to().as_deref() != Some(address.as_str()) {
            self.send(ctx, &address).await?;
            debug!("{} code sent", self.channel.step());
            if let Ok(mut sent) = self.sent_to.lock() {
                *sent = Some(address.clone());
            }
        }
        let code = self.interaction
                       .otp_code(&self.channel.step(), &address)
                       .await
                       .map(|c| c.trim().to_string())
                       .filter(|c| !c.is_empty())
                       .ok_or_else(|| FlowError::InvalidInput("verification code is required".to_string()))?;
        self.verify(ctx, &address, &code).await
    }
}

#[async_trait]
impl StepExecutor for OtpExecutor {
    fn screen(&self) -> Screen {
        match self.channel {
            OtpChannel::Email => Screen::Email,
            OtpChannel::Sms => Screen::Sms,
        }
    }

    async fn execute(&self, ctx: &StepContext<'_>) -> StepOutcome {
        StepOutcome::from_submission(self.channel.step(), self.run(ctx).await)
    }
}
