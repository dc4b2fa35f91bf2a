//! Executors concretos, uno por `Screen`.
//!
//! Todos siguen el mismo patrón: pedir al usuario lo necesario, validar
//! localmente (un fallo local no llama al backend), enviar y convertir la
//! respuesta normalizada en un `StepOutcome`.

pub mod otp;
pub mod selfie;
pub mod signature;
pub mod terms;
pub mod user_info;

pub use otp::{OtpChannel, OtpExecutor};
pub use selfie::SelfieExecutor;
pub use signature::SignatureExecutor;
pub use terms::TermsExecutor;
pub use user_info::UserInfoExecutor;

use idv_domain::{CapturedImage, FlowError};

pub(crate) fn require_image(image: Option<CapturedImage>, what: &str) -> Result<CapturedImage, FlowError> {
    match image {
        Some(img) if !img.is_empty() => Ok(img),
        _ => Err(FlowError::InvalidInput(format!("{what} image is required"))),
    }
}
