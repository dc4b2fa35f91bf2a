//! Sesión de verificación: identidad asignada por el servidor, token bearer y
//! la lista ordenada de steps requeridos.
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DomainError, StepKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaco, asignado por el servidor. Puede faltar en respuestas antiguas.
    pub session_id: Option<String>,
    /// Credencial bearer requerida en cada envío de step. Nunca vacía.
    pub session_token: String,
    /// Orden de presentación. Elementos únicos.
    pub required_steps: Vec<StepKind>,
    pub optional_steps: BTreeSet<StepKind>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(session_id: Option<String>,
               session_token: &str,
               required_steps: Vec<StepKind>,
               optional_steps: BTreeSet<StepKind>,
               expires_at: Option<DateTime<Utc>>)
               -> Result<Self, DomainError> {
        let token = session_token.trim();
        if token.is_empty() {
            return Err(DomainError::ValidationError("session token must not be empty".to_string()));
        }
        let mut unique: Vec<StepKind> = Vec::with_capacity(required_steps.len());
        for step in required_steps {
            if !unique.contains(&step) {
                unique.push(step);
            }
        }
        Ok(Session { session_id: session_id.filter(|s| !s.trim().is_empty()),
                     session_token: token.to_string(),
                     required_steps: unique,
                     optional_steps,
                     expires_at })
    }

    pub fn step_count(&self) -> usize {
        self.required_steps.len()
    }
}

/// Fragmento de progreso que el backend devuelve junto con algunos envíos.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProgress {
    #[serde(default)]
    pub steps_completed: Vec<StepKind>,
    #[serde(default)]
    pub steps_remaining: Vec<StepKind>,
}

impl SessionProgress {
    pub fn is_done(&self) -> bool {
        self.steps_remaining.is_empty()
    }
}

/// Credenciales que acompañan cada envío de step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionAuth {
    pub customer_id: String,
    pub session_token: String,
}
