//! Regla de resolución de steps.
//!
//! Dada la lista de steps requeridos y una posición, decide qué pantalla
//! mostrar o por qué no mostrar ninguna. La fusión terms+signature es una
//! proyección de presentación: la lista almacenada no se modifica.
use idv_domain::StepKind;

use crate::SkipSet;

/// Pantalla que el host debe presentar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Selfie,
    Email,
    Sms,
    Terms,
    /// Terms seguido de signature, presentados juntos.
    TermsAndSignature,
    Signature,
    UserInfo,
}

impl Screen {
    /// Posiciones de la lista que consume la pantalla al completarse.
    pub fn span(&self) -> usize {
        match self {
            Screen::TermsAndSignature => 2,
            _ => 1,
        }
    }

    /// Step "principal" que se reporta en step-start.
    pub fn primary_step(&self) -> StepKind {
        match self {
            Screen::Selfie => StepKind::Selfie,
            Screen::Email => StepKind::Email,
            Screen::Sms => StepKind::Sms,
            Screen::Terms | Screen::TermsAndSignature => StepKind::Terms,
            Screen::Signature => StepKind::Signature,
            Screen::UserInfo => StepKind::UserInfo,
        }
    }

    fn standalone(step: &StepKind) -> Option<Screen> {
        match step {
            StepKind::Selfie => Some(Screen::Selfie),
            StepKind::Email => Some(Screen::Email),
            StepKind::Sms => Some(Screen::Sms),
            StepKind::Terms => Some(Screen::Terms),
            StepKind::Signature => Some(Screen::Signature),
            StepKind::UserInfo => Some(Screen::UserInfo),
            StepKind::Unknown(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// La posición está fuera de la lista: el flujo terminó.
    Completed,
    Present(Screen),
    /// Signature inmediatamente después de terms: ya lo cubrió la pantalla
    /// combinada. Nunca se presenta sola.
    AlreadySatisfied,
    /// Cubierto por datos predefinidos del host.
    Predefined,
    /// Valor del wire desconocido.
    UnknownKind(String),
}

pub fn resolve_step(steps: &[StepKind], index: usize, skips: &SkipSet) -> Resolution {
    let Some(step) = steps.get(index) else {
        return Resolution::Completed;
    };
    match step {
        StepKind::Unknown(raw) => Resolution::UnknownKind(raw.clone()),
        StepKind::Signature if index > 0 && steps[index - 1] == StepKind::Terms => Resolution::AlreadySatisfied,
        s if skips.contains(s) => Resolution::Predefined,
        StepKind::Terms if steps.get(index + 1) == Some(&StepKind::Signature) => Resolution::Present(Screen::TermsAndSignature),
        s => match Screen::standalone(s) {
            Some(screen) => Resolution::Present(screen),
            None => Resolution::UnknownKind(s.as_str().to_string()),
        },
    }
}
