//! Errores de persistencia en archivo y su traducción al contrato del core.

use idv_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store file is not valid JSON: {0}")]
    Corrupt(String),
    #[error("store lock poisoned")]
    Poisoned,
}

impl From<serde_json::Error> for PersistenceError {
    fn from(e: serde_json::Error) -> Self {
        PersistenceError::Corrupt(e.to_string())
    }
}

impl From<PersistenceError> for StoreError {
    fn from(e: PersistenceError) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}
