//! Errores del contrato de almacenamiento.

use idv_domain::FlowError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
    #[error("corrupt value under '{key}': {reason}")]
    Corrupt { key: &'static str, reason: String },
}

impl From<StoreError> for FlowError {
    fn from(e: StoreError) -> Self {
        FlowError::Storage(e.to_string())
    }
}
