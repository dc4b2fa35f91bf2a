use std::fmt;

/// Estados del coordinador. `Completed` y `Cancelled` son terminales.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    NotStarted,
    /// Resolviendo la sesión (nueva o reanudada).
    Starting,
    /// Pantalla activa en la posición indicada, esperando acción del usuario.
    Presenting(usize),
    Completed,
    Cancelled,
}

impl FlowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FlowState::Completed | FlowState::Cancelled)
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowState::NotStarted => write!(f, "not-started"),
            FlowState::Starting => write!(f, "starting"),
            FlowState::Presenting(i) => write!(f, "presenting({i})"),
            FlowState::Completed => write!(f, "completed"),
            FlowState::Cancelled => write!(f, "cancelled"),
        }
    }
}
