//! idflow
//!
//! Fachada del flujo de verificación de identidad:
//! - `IdentityVerification`: configuración, registro del dispositivo y
//!   construcción de coordinadores.
//! - `SdkConfig`: variables de entorno (`.env`).
//! - `SdkError`: errores de la fachada.
//!
//! Los crates del workspace se re-exportan para que el host dependa sólo
//! de este.

pub mod config;
pub mod errors;
pub mod sdk;

pub use config::SdkConfig;
pub use errors::SdkError;
pub use sdk::IdentityVerification;

pub use idv_adapters as adapters;
pub use idv_core as flow;
pub use idv_domain as domain;
pub use idv_persistence as persistence;
pub use idv_policies as policies;
