use idv_domain::{FlowError, SessionProgress, StepKind};
use idv_policies::Submission;

/// Resultado de un intento de step.
///
/// Invariante: hay `error` si y sólo si el intento falló. Los constructores
/// son la única forma de crearlo.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    step: StepKind,
    error: Option<FlowError>,
    server_session: Option<SessionProgress>,
}

impl StepOutcome {
    pub fn succeeded(step: StepKind, server_session: Option<SessionProgress>) -> Self {
        Self { step,
               error: None,
               server_session }
    }

    pub fn failed(step: StepKind, error: FlowError) -> Self {
        Self { step,
               error: Some(error),
               server_session: None }
    }

    pub fn from_submission(step: StepKind, result: Result<Submission, FlowError>) -> Self {
        match result {
            Ok(sub) => Self::succeeded(step, sub.progress),
            Err(e) => Self::failed(step, e),
        }
    }

    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    pub fn step(&self) -> &StepKind {
        &self.step
    }

    pub fn error(&self) -> Option<&FlowError> {
        self.error.as_ref()
    }

    pub fn server_session(&self) -> Option<&SessionProgress> {
        self.server_session.as_ref()
    }
}
