//! Ubicación del store desde variables de entorno.
//! Usa `IDV_STORE_PATH`, con `./.idflow/session.json` por defecto.

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

pub const DEFAULT_STORE_PATH: &str = "./.idflow/session.json";

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        let path = env::var("IDV_STORE_PATH").ok()
                                             .filter(|v| !v.trim().is_empty())
                                             .unwrap_or_else(|| DEFAULT_STORE_PATH.to_string());
        Self { path: PathBuf::from(path) }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::at(DEFAULT_STORE_PATH)
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
