//! Reconstrucción del estado de un flujo a partir de su journal.

mod types;

pub use types::{build_flow_plan, FlowInstance, FlowPlan, FlowRepository, InMemoryFlowRepository, StepSlot};
