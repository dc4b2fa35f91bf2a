//! Estrategia de re-entrada a una sesión existente.
//!
//! `FirstStep` (por defecto) reinicia la presentación desde el primer
//! elemento de la lista almacenada, aunque el servidor ya haya registrado
//! algunos steps. `ServerRemaining` arranca en el primer step que el
//! servidor todavía reporta como pendiente.
use std::fmt;
use std::str::FromStr;

use idv_domain::{SessionProgress, StepKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeStrategy {
    #[default]
    FirstStep,
    ServerRemaining,
}

impl FromStr for ResumeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first_step" | "first" => Ok(ResumeStrategy::FirstStep),
            "server_remaining" | "remaining" => Ok(ResumeStrategy::ServerRemaining),
            other => Err(format!("unknown resume strategy '{other}'")),
        }
    }
}

impl fmt::Display for ResumeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResumeStrategy::FirstStep => f.write_str("first_step"),
            ResumeStrategy::ServerRemaining => f.write_str("server_remaining"),
        }
    }
}

/// Posición inicial al reanudar. Sin progreso conocido siempre es 0.
///
/// Con `ServerRemaining`, si el primer pendiente es un `signature` que sigue
/// a `terms`, se retrocede a `terms` para que la pantalla combinada lo cubra.
pub fn resume_index(strategy: ResumeStrategy, steps: &[StepKind], progress: Option<&SessionProgress>) -> usize {
    let progress = match (strategy, progress) {
        (ResumeStrategy::ServerRemaining, Some(p)) => p,
        _ => return 0,
    };
    let Some(first) = steps.iter().position(|s| progress.steps_remaining.contains(s)) else {
        return steps.len();
    };
    if first > 0 && steps[first] == StepKind::Signature && steps[first - 1] == StepKind::Terms {
        return first - 1;
    }
    first
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(done: &[&str], remaining: &[&str]) -> SessionProgress {
        SessionProgress { steps_completed: StepKind::parse_list(done),
                          steps_remaining: StepKind::parse_list(remaining) }
    }

    #[test]
    fn first_step_ignores_progress() {
        let steps = StepKind::parse_list(&["selfie", "email"]);
        let p = progress(&["selfie"], &["email"]);
        assert_eq!(resume_index(ResumeStrategy::FirstStep, &steps, Some(&p)), 0);
    }

    #[test]
    fn server_remaining_starts_at_first_pending() {
        let steps = StepKind::parse_list(&["selfie", "email", "sms"]);
        let p = progress(&["selfie"], &["email", "sms"]);
        assert_eq!(resume_index(ResumeStrategy::ServerRemaining, &steps, Some(&p)), 1);
        assert_eq!(resume_index(ResumeStrategy::ServerRemaining, &steps, None), 0);
        let all_done = progress(&["selfie", "email", "sms"], &[]);
        assert_eq!(resume_index(ResumeStrategy::ServerRemaining, &steps, Some(&all_done)), 3);
    }

    #[test]
    fn pending_signature_backs_up_onto_terms() {
        let steps = StepKind::parse_list(&["selfie", "terms", "signature"]);
        let p = progress(&["selfie", "terms"], &["signature"]);
        assert_eq!(resume_index(ResumeStrategy::ServerRemaining, &steps, Some(&p)), 1);
    }

    #[test]
    fn parses_from_config_strings() {
        assert_eq!("server_remaining".parse::<ResumeStrategy>(), Ok(ResumeStrategy::ServerRemaining));
        assert_eq!(" FIRST_STEP ".parse::<ResumeStrategy>(), Ok(ResumeStrategy::FirstStep));
        assert!("sometimes".parse::<ResumeStrategy>().is_err());
        assert_eq!(ResumeStrategy::default().to_string(), "first_step");
    }
}
