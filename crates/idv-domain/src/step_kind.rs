//! Identificadores de step con mapeo estable a los strings del wire.
//!
//! El backend envía la lista de steps como strings (`"selfie"`, `"terms"`,
//! ...). Internamente se usa un enum cerrado; los valores no reconocidos se
//! conservan en `Unknown` para poder registrarlos en vez de descartarlos sin
//! rastro.
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StepKind {
    Selfie,
    Email,
    Sms,
    Terms,
    Signature,
    UserInfo,
    /// Valor del wire que este cliente no sabe presentar.
    Unknown(String),
}

impl StepKind {
    pub const KNOWN: [StepKind; 6] = [StepKind::Selfie,
                                      StepKind::Email,
                                      StepKind::Sms,
                                      StepKind::Terms,
                                      StepKind::Signature,
                                      StepKind::UserInfo];

    /// Parsea el string del wire. Nunca falla: lo desconocido queda en `Unknown`.
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim() {
            "selfie" => StepKind::Selfie,
            "email" => StepKind::Email,
            "sms" | "phone" => StepKind::Sms,
            "terms" => StepKind::Terms,
            "signature" => StepKind::Signature,
            "userInfo" | "user_info" => StepKind::UserInfo,
            other => StepKind::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StepKind::Selfie => "selfie",
            StepKind::Email => "email",
            StepKind::Sms => "sms",
            StepKind::Terms => "terms",
            StepKind::Signature => "signature",
            StepKind::UserInfo => "userInfo",
            StepKind::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, StepKind::Unknown(_))
    }

    /// Nombre legible usado en los mensajes genéricos de error.
    pub fn display_name(&self) -> &str {
        match self {
            StepKind::Selfie => "Selfie",
            StepKind::Email => "Email",
            StepKind::Sms => "Phone",
            StepKind::Terms => "Terms",
            StepKind::Signature => "Signature",
            StepKind::UserInfo => "User info",
            StepKind::Unknown(raw) => raw,
        }
    }

    /// Parsea una lista del wire manteniendo el orden y descartando
    /// duplicados (se conserva la primera aparición).
    pub fn parse_list<S: AsRef<str>>(raw: &[S]) -> Vec<StepKind> {
        let mut out: Vec<StepKind> = Vec::with_capacity(raw.len());
        for r in raw {
            let kind = StepKind::from_wire(r.as_ref());
            if !out.contains(&kind) {
                out.push(kind);
            }
        }
        out
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for StepKind {
    fn from(raw: &str) -> Self {
        StepKind::from_wire(raw)
    }
}

impl Serialize for StepKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StepKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(StepKind::from_wire(&raw))
    }
}
