//! Terms, solo o combinado con signature.
//!
//! Los checkboxes se piden al backend en cada intento, se ordenan por
//! `display_order` y todos los `required` deben estar aceptados antes de
//! enviar. En la variante combinada la firma se captura antes de enviar
//! nada, y se envía después de los terms; un reintento reenvía ambos y el
//! backend responde "already accepted" para lo que ya registró.
use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use idv_core::{Screen, StepContext, StepExecutor, StepOutcome};
use idv_domain::{sort_for_display, FlowError, StepKind, TermsCheckbox};
use idv_policies::Submission;

use super::require_image;
use crate::interaction::UserInteraction;

pub struct TermsExecutor {
    interaction: Arc<dyn UserInteraction>,
    with_signature: bool,
}

impl TermsExecutor {
    pub fn new(interaction: Arc<dyn UserInteraction>) -> Self {
        Self { interaction,
               with_signature: false }
    }

    pub fn with_signature(interaction: Arc<dyn UserInteraction>) -> Self {
        Self { interaction,
               with_signature: true }
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<Submission, FlowError> {
        let checkboxes = sort_for_display(ctx.backend.fetch_terms_checkboxes().await?);
        ctx.observer.on_terms_checkboxes_fetched(&checkboxes);
        let accepted = self.interaction.accept_terms(&checkboxes).await;
        validate_acceptance(&checkboxes, &accepted)?;
        let signature = if self.with_signature {
            Some(require_image(self.interaction.capture_signature().await, "signature")?)
        } else {
            None
        };

        let terms = ctx.backend.submit_terms(ctx.auth, &accepted).await?;
        ctx.observer.on_terms_accepted(&accepted);
        let Some(image) = signature else {
            return Ok(terms);
        };
        let signed = ctx.backend.submit_signature(ctx.auth, &image).await?;
        ctx.observer.on_signature_submitted();
        ctx.observer.on_terms_and_signature_submitted();
        Ok(Submission { progress: signed.progress.or(terms.progress),
                        ..signed })
    }
}

/// Todos los requeridos aceptados y ningún id desconocido.
pub fn validate_acceptance(checkboxes: &[TermsCheckbox], accepted: &[String]) -> Result<(), FlowError> {
    let known: BTreeSet<&str> = checkboxes.iter().map(|c| c.id.as_str()).collect();
    if let Some(unknown) = accepted.iter().find(|id| !known.contains(id.as_str())) {
        return Err(FlowError::InvalidInput(format!("unknown terms checkbox '{unknown}'")));
    }
    let missing = checkboxes.iter().any(|c| c.required && !accepted.iter().any(|a| a == &c.id));
    if missing {
        return Err(FlowError::InvalidInput("Please accept all required terms".to_string()));
    }
    Ok(())
}

#[async_trait]
impl StepExecutor for TermsExecutor {
    fn screen(&self) -> Screen {
        if self.with_signature {
            Screen::TermsAndSignature
        } else {
            Screen::Terms
        }
    }

    async fn execute(&self, ctx: &StepContext<'_>) -> StepOutcome {
        StepOutcome::from_submission(StepKind::Terms, self.run(ctx).await)
    }
}
