use std::sync::Arc;

use idv_core::{ExecutorFactory, Screen, StepExecutor};

use crate::interaction::UserInteraction;
use crate::steps::{OtpChannel, OtpExecutor, SelfieExecutor, SignatureExecutor, TermsExecutor, UserInfoExecutor};

/// Fábrica por defecto: un executor nuevo por pantalla presentada, todos
/// compartiendo la misma `UserInteraction`.
#[derive(Clone)]
pub struct DefaultExecutors {
    interaction: Arc<dyn UserInteraction>,
}

impl DefaultExecutors {
    pub fn new(interaction: Arc<dyn UserInteraction>) -> Self {
        Self { interaction }
    }
}

impl ExecutorFactory for DefaultExecutors {
    fn executor_for(&self, screen: Screen) -> Box<dyn StepExecutor> {
        let ui = Arc::clone(&self.interaction);
        match screen {
            Screen::Selfie => Box::new(SelfieExecutor::new(ui)),
            Screen::Email => Box::new(OtpExecutor::new(OtpChannel::Email, ui)),
            Screen::Sms => Box::new(OtpExecutor::new(OtpChannel::Sms, ui)),
            Screen::Terms => Box::new(TermsExecutor::new(ui)),
            Screen::TermsAndSignature => Box::new(TermsExecutor::with_signature(ui)),
            Screen::Signature => Box::new(SignatureExecutor::new(ui)),
            Screen::UserInfo => Box::new(UserInfoExecutor::new(ui)),
        }
    }
}
