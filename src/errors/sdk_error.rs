use idv_core::StoreError;
use idv_domain::FlowError;
use idv_persistence::PersistenceError;
use thiserror::Error;

/// Errores de la fachada. Las operaciones del coordinador nunca los
/// devuelven; sólo `configure` y la construcción/limpieza del SDK.
#[derive(Debug, Error)]
pub enum SdkError {
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error("session store: {0}")]
    Store(#[from] StoreError),
    #[error("persistence: {0}")]
    Persistence(#[from] PersistenceError),
}

impl SdkError {
    /// Texto para el usuario final.
    pub fn user_message(&self) -> String {
        match self {
            SdkError::Flow(FlowError::MissingCredential(_)) => "Verification is not configured".to_string(),
            SdkError::Flow(e) => e.server_message()
                                  .map(str::to_string)
                                  .unwrap_or_else(|| "Verification service unavailable".to_string()),
            SdkError::Store(_) | SdkError::Persistence(_) => "Local storage unavailable".to_string(),
        }
    }
}
