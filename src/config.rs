//! Configuración del SDK.
//! Carga variables de entorno (.env) una sola vez y expone `SdkConfig`.
//! Nada aquí entra en pánico: una API key ausente se reporta más tarde como
//! `FlowError::MissingCredential` al intentar configurar.
use std::env;

use idv_core::ResumeStrategy;
use log::warn;
use once_cell::sync::Lazy;

pub const DEFAULT_BASE_URL: &str = "https://api.idflow.dev/v1";

static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenvy::dotenv();
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkConfig {
    /// `IDV_API_KEY`.
    pub api_key: Option<String>,
    /// `IDV_BASE_URL`. Sólo informativo para backends HTTP del host.
    pub base_url: String,
    /// `IDV_APP_VERSION`, reportado en el registro del dispositivo.
    pub app_version: String,
    /// `IDV_RESUME_STRATEGY`: `first_step` (defecto) o `server_remaining`.
    pub resume_strategy: ResumeStrategy,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self { api_key: None,
               base_url: DEFAULT_BASE_URL.to_string(),
               app_version: env!("CARGO_PKG_VERSION").to_string(),
               resume_strategy: ResumeStrategy::default() }
    }
}

impl SdkConfig {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables arbitraria.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();
        let resume_strategy = match get("IDV_RESUME_STRATEGY") {
            None => defaults.resume_strategy,
            Some(raw) => raw.parse::<ResumeStrategy>().unwrap_or_else(|_| {
                                        warn!("unknown IDV_RESUME_STRATEGY '{raw}', using {}", defaults.resume_strategy);
                                        defaults.resume_strategy
                                    }),
        };
        Self { api_key: get("IDV_API_KEY"),
               base_url: get("IDV_BASE_URL").unwrap_or(defaults.base_url),
               app_version: get("IDV_APP_VERSION").unwrap_or(defaults.app_version),
               resume_strategy }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn missing_values_fall_back_to_defaults() {
        let cfg = SdkConfig::from_lookup(lookup(&[("IDV_API_KEY", "   ")]));
        assert_eq!(cfg, SdkConfig::default());
    }

    #[test]
    fn reads_all_variables() {
        let cfg = SdkConfig::from_lookup(lookup(&[("IDV_API_KEY", "k-1"),
                                                  ("IDV_BASE_URL", "http://localhost:9000"),
                                                  ("IDV_APP_VERSION", "2.1.0"),
                                                  ("IDV_RESUME_STRATEGY", "server_remaining")]));
        assert_eq!(cfg.api_key.as_deref(), Some("k-1"));
        assert_eq!(cfg.base_url, "http://localhost:9000");
        assert_eq!(cfg.app_version, "2.1.0");
        assert_eq!(cfg.resume_strategy, ResumeStrategy::ServerRemaining);
    }

    #[test]
    fn unknown_strategy_keeps_default() {
        let cfg = SdkConfig::from_lookup(lookup(&[("IDV_RESUME_STRATEGY", "resume_anywhere")]));
        assert_eq!(cfg.resume_strategy, ResumeStrategy::FirstStep);
    }
}
