//! Taxonomía de errores del flujo de verificación.
//!
//! - `MissingCredential`: sin API key / customer id. Fatal, el flujo no arranca.
//! - `TransportFailure`: fallo de red/HTTP. Local al step, el usuario reintenta.
//! - `ServerRejected`: resultado normalizado no exitoso con el mensaje del
//!   servidor. Local al step (o fatal si ocurre al iniciar la sesión).
//! - `DecodeFailure`: payload imposible de interpretar cuando no queda nada
//!   que rescatar (p.ej. respuesta de start-session sin token legible).
//! - `InvalidInput`: validación local de formularios antes de enviar.
//! - `Storage`: fallo del `SessionStore`.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{DomainError, StepKind};

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowError {
    #[error("missing credential: {0}")]
    MissingCredential(String),
    #[error("transport failure: {0}")]
    TransportFailure(String),
    #[error("server rejected request: {message}")]
    ServerRejected { status: Option<u16>, message: String },
    #[error("malformed server payload: {0}")]
    DecodeFailure(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("storage failure: {0}")]
    Storage(String),
}

impl FlowError {
    pub fn rejected(status: Option<u16>, message: impl Into<String>) -> Self {
        FlowError::ServerRejected { status,
                                    message: message.into() }
    }

    /// Texto reportado por el servidor (o por la validación local) si existe
    /// y no está vacío.
    pub fn server_message(&self) -> Option<&str> {
        let msg = match self {
            FlowError::ServerRejected { message, .. } => message.as_str(),
            FlowError::InvalidInput(message) => message.as_str(),
            _ => return None,
        };
        if msg.trim().is_empty() {
            None
        } else {
            Some(msg)
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            FlowError::ServerRejected { status, .. } => *status,
            _ => None,
        }
    }

    /// Mensaje visible para el usuario: el texto del servidor cuando existe,
    /// si no "<Step> verification failed".
    pub fn user_message(&self, step: &StepKind) -> String {
        match self.server_message() {
            Some(msg) => msg.to_string(),
            None => format!("{} verification failed", step.display_name()),
        }
    }

    /// Sólo la falta de credenciales impide arrancar el flujo en cualquier caso.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FlowError::MissingCredential(_))
    }
}

impl From<DomainError> for FlowError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::ValidationError(msg) => FlowError::InvalidInput(msg),
            DomainError::SerializationError(msg) => FlowError::DecodeFailure(msg),
        }
    }
}
