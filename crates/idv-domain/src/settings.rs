use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::StepKind;

/// Configuración de verificación devuelta por el backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationSettings {
    #[serde(default)]
    pub required_steps: Vec<StepKind>,
    #[serde(default)]
    pub optional_steps: Vec<StepKind>,
    /// Flags opacos para la UI (colores, textos, toggles).
    #[serde(default)]
    pub flags: BTreeMap<String, serde_json::Value>,
}

impl VerificationSettings {
    pub fn flag_enabled(&self, name: &str) -> bool {
        self.flags.get(name).and_then(|v| v.as_bool()).unwrap_or(false)
    }
}
