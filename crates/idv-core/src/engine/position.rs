//! Cursor sobre la lista de steps requeridos.
//!
//! `0 <= current_step_index <= total` siempre; el índice nunca retrocede y
//! vale `total` exactamente cuando el flujo terminó.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowPosition {
    current_step_index: usize,
    total: usize,
}

impl FlowPosition {
    pub fn new(total: usize) -> Self {
        Self::at(total, 0)
    }

    /// Posición inicial arbitraria (reanudación). Se acota a `total`.
    pub fn at(total: usize, index: usize) -> Self {
        Self { current_step_index: index.min(total),
               total }
    }

    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_complete(&self) -> bool {
        self.current_step_index >= self.total
    }

    /// Avanza `by` posiciones sin superar `total`. Devuelve el nuevo índice.
    pub fn advance(&mut self, by: usize) -> usize {
        self.current_step_index = self.current_step_index.saturating_add(by).min(self.total);
        self.current_step_index
    }

    pub fn finish(&mut self) {
        self.current_step_index = self.total;
    }
}
