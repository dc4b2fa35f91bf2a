//! Interacción con el usuario final, provista por el host.
//!
//! Cada método corresponde a una acción de UI; `None` significa que el
//! usuario no completó la acción y el executor lo reporta como
//! `FlowError::InvalidInput` sin llamar al backend.
use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use idv_domain::{CapturedImage, ImageFormat, StepKind, TermsCheckbox};

/// Valores crudos del formulario de datos personales, antes de validar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfoForm {
    pub first_name: String,
    pub last_name: String,
    /// `yyyy-MM-dd`.
    pub date_of_birth: String,
}

#[async_trait]
pub trait UserInteraction: Send + Sync {
    async fn capture_selfie(&self) -> Option<CapturedImage>;
    async fn capture_signature(&self) -> Option<CapturedImage>;
    async fn email_address(&self) -> Option<String>;
    async fn phone_number(&self) -> Option<String>;
    /// Código OTP recibido en `address` para `step` (email o sms).
    async fn otp_code(&self, step: &StepKind, address: &str) -> Option<String>;
    /// Ids de los checkboxes aceptados, dados en orden de presentación.
    async fn accept_terms(&self, checkboxes: &[TermsCheckbox]) -> Vec<String>;
    async fn user_info(&self) -> Option<UserInfoForm>;
}

#[derive(Default)]
struct Answers {
    selfie: Option<CapturedImage>,
    signature: Option<CapturedImage>,
    email: Option<String>,
    phone: Option<String>,
    codes: VecDeque<String>,
    accept_all: bool,
    accepted: Option<Vec<String>>,
    user_info: Option<UserInfoForm>,
}

/// Interacción en memoria con respuestas fijas (demo de CLI y tests).
///
/// Los códigos OTP se consumen en orden; el último se repite.
#[derive(Default)]
pub struct ScriptedInteraction {
    answers: Mutex<Answers>,
}

impl ScriptedInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respuestas válidas para todas las pantallas.
    pub fn cooperative() -> Self {
        Self::new().selfie(CapturedImage::new(vec![0xFF, 0xD8, 0xFF], ImageFormat::Jpeg))
                   .signature(CapturedImage::new(vec![0x89, 0x50, 0x4E, 0x47], ImageFormat::Png))
                   .email("user@example.com")
                   .phone("+15550100")
                   .codes(&["123456"])
                   .accept_all_terms()
                   .user_info("Ada", "Lovelace", "1815-12-10")
    }

    fn edit(self, f: impl FnOnce(&mut Answers)) -> Self {
        if let Ok(mut answers) = self.answers.lock() {
            f(&mut *answers);
        }
        self
    }

    pub fn selfie(self, image: CapturedImage) -> Self {
        self.edit(|a| a.selfie = Some(image))
    }

    pub fn signature(self, image: CapturedImage) -> Self {
        self.edit(|a| a.signature = Some(image))
    }

    pub fn email(self, email: &str) -> Self {
        self.edit(|a| a.email = Some(email.to_string()))
    }

    pub fn phone(self, phone: &str) -> Self {
        self.edit(|a| a.phone = Some(phone.to_string()))
    }

    pub fn codes(self, codes: &[&str]) -> Self {
        self.edit(|a| a.codes = codes.iter().map(|c| c.to_string()).collect())
    }

    pub fn accept_all_terms(self) -> Self {
        self.edit(|a| {
                a.accept_all = true;
                a.accepted = None;
            })
    }

    pub fn accept_terms_ids(self, ids: &[&str]) -> Self {
        self.edit(|a| {
                a.accept_all = false;
                a.accepted = Some(ids.iter().map(|c| c.to_string()).collect());
            })
    }

    pub fn user_info(self, first_name: &str, last_name: &str, date_of_birth: &str) -> Self {
        self.edit(|a| {
                a.user_info = Some(UserInfoForm { first_name: first_name.to_string(),
                                                  last_name: last_name.to_string(),
                                                  date_of_birth: date_of_birth.to_string() })
            })
    }

    /// Cambia la dirección de email entre intentos.
    pub fn set_email(&self, email: &str) {
        if let Ok(mut answers) = self.answers.lock() {
            answers.email = Some(email.to_string());
        }
    }

    fn read<T>(&self, f: impl FnOnce(&mut Answers) -> T) -> Option<T> {
        self.answers.lock().ok().map(|mut a| f(&mut *a))
    }
}

#[async_trait]
impl UserInteraction for ScriptedInteraction {
    async fn capture_selfie(&self) -> Option<CapturedImage> {
        self.read(|a| a.selfie.clone()).flatten()
    }

    async fn capture_signature(&self) -> Option<CapturedImage> {
        self.read(|a| a.signature.clone()).flatten()
    }

    async fn email_address(&self) -> Option<String> {
        self.read(|a| a.email.clone()).flatten()
    }

    async fn phone_number(&self) -> Option<String> {
        self.read(|a| a.phone.clone()).flatten()
    }

    async fn otp_code(&self, _step: &StepKind, _address: &str) -> Option<String> {
        self.read(|a| {
                if a.codes.len() > 1 {
                    a.codes.pop_front()
                } else {
                    a.codes.front().cloned()
                }
            })
            .flatten()
    }

    async fn accept_terms(&self, checkboxes: &[TermsCheckbox]) -> Vec<String> {
        self.read(|a| {
                if a.accept_all {
                    checkboxes.iter().map(|c| c.id.clone()).collect()
                } else {
                    a.accepted.clone().unwrap_or_default()
                }
            })
            .unwrap_or_default()
    }

    async fn user_info(&self) -> Option<UserInfoForm> {
        self.read(|a| a.user_info.clone()).flatten()
    }
}
