//! Tipos de repositorio: estado reconstruido (`FlowInstance`) y plan
//! (`FlowPlan`).
//!
//! El repositorio aplica un replay lineal: consume eventos en orden y
//! actualiza los slots del plan. La posición resultante debe coincidir con
//! `current_step_index` del coordinador que emitió el journal.
use chrono::{DateTime, Utc};
use idv_domain::StepKind;
use serde_json::json;
use uuid::Uuid;

use crate::constants::JOURNAL_VERSION;
use crate::event::{FlowEvent, FlowEventKind};
use crate::hashing::hash_value;
use crate::step::StepStatus;

/// Lista inmutable de steps que un coordinador presenta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowPlan {
    pub steps: Vec<StepKind>,
    pub plan_hash: String,
}

impl FlowPlan {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

pub fn build_flow_plan(steps: &[StepKind]) -> FlowPlan {
    let plan_hash = hash_value(&json!({
                                   "journal_version": JOURNAL_VERSION,
                                   "steps": steps,
                               }));
    FlowPlan { steps: steps.to_vec(),
               plan_hash }
}

pub struct FlowInstance {
    pub id: Uuid,
    pub slots: Vec<StepSlot>,
    pub cursor: usize,
    pub completed: bool,
    pub cancelled: bool,
}

/// Estado de una posición en la instancia.
pub struct StepSlot {
    pub step: StepKind,
    pub status: StepStatus,
    pub attempts: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Trait para reconstruir (`replay`) el estado de un flujo a partir de eventos.
pub trait FlowRepository {
    fn load(&self, flow_id: Uuid, events: &[FlowEvent], plan: &FlowPlan) -> FlowInstance;
}

#[derive(Debug, Default)]
pub struct InMemoryFlowRepository;

impl InMemoryFlowRepository {
    pub fn new() -> Self {
        Self
    }
}

impl FlowRepository for InMemoryFlowRepository {
    fn load(&self, flow_id: Uuid, events: &[FlowEvent], plan: &FlowPlan) -> FlowInstance {
        let mut slots: Vec<StepSlot> = plan.steps
                                           .iter()
                                           .map(|s| StepSlot { step: s.clone(),
                                                               status: StepStatus::Pending,
                                                               attempts: 0,
                                                               started_at: None,
                                                               finished_at: None })
                                           .collect();
        let mut cursor = 0usize;
        let mut completed = false;
        let mut cancelled = false;
        for ev in events {
            match &ev.kind {
                FlowEventKind::FlowInitialized { start_index, .. } => cursor = (*start_index).min(slots.len()),
                FlowEventKind::StepStarted { step_index, .. } => {
                    if let Some(slot) = slots.get_mut(*step_index) {
                        slot.status = StepStatus::Presented;
                        slot.started_at = Some(ev.ts);
                    }
                }
                FlowEventKind::StepFailed { step_index, .. } => {
                    if let Some(slot) = slots.get_mut(*step_index) {
                        slot.status = StepStatus::AwaitingRetry;
                        slot.attempts += 1;
                    }
                }
                FlowEventKind::StepFinished { step_index, merged, .. } => {
                    if let Some(slot) = slots.get_mut(*step_index) {
                        slot.status = StepStatus::Finished;
                        if !merged {
                            slot.attempts += 1;
                        }
                        slot.finished_at = Some(ev.ts);
                    }
                    cursor = cursor.max(step_index + 1);
                }
                FlowEventKind::StepSkipped { step_index, .. } => {
                    if let Some(slot) = slots.get_mut(*step_index) {
                        slot.status = StepStatus::Skipped;
                        slot.finished_at = Some(ev.ts);
                    }
                    cursor = cursor.max(step_index + 1);
                }
                FlowEventKind::FlowCompleted { .. } => {
                    completed = true;
                    cursor = slots.len();
                }
                FlowEventKind::FlowCancelled { .. } => cancelled = true,
                FlowEventKind::SessionStarted { .. } | FlowEventKind::SessionResumed { .. } => {}
            }
        }
        FlowInstance { id: flow_id,
                       slots,
                       cursor: cursor.min(plan.len()),
                       completed,
                       cancelled }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventStore, InMemoryEventStore, SkipReason};
    use idv_domain::FlowError;

    #[test]
    fn plan_hash_depends_on_order() {
        let a = build_flow_plan(&[StepKind::Selfie, StepKind::Email]);
        let b = build_flow_plan(&[StepKind::Email, StepKind::Selfie]);
        assert_ne!(a.plan_hash, b.plan_hash);
        assert_eq!(a.plan_hash, build_flow_plan(&[StepKind::Selfie, StepKind::Email]).plan_hash);
    }

    #[test]
    fn replay_tracks_cursor_and_attempts() {
        let plan = build_flow_plan(&[StepKind::Selfie, StepKind::Terms, StepKind::Signature]);
        let flow = Uuid::new_v4();
        let mut store = InMemoryEventStore::default();
        store.append_kind(flow, FlowEventKind::FlowInitialized { plan_hash: plan.plan_hash.clone(),
                                                                 step_count: 3,
                                                                 start_index: 0 });
        store.append_kind(flow, FlowEventKind::StepStarted { step_index: 0, step: StepKind::Selfie });
        store.append_kind(flow, FlowEventKind::StepFailed { step_index: 0,
                                                            step: StepKind::Selfie,
                                                            error: FlowError::TransportFailure("x".into()) });
        let inst = InMemoryFlowRepository::new().load(flow, &store.list(flow), &plan);
        assert_eq!(inst.cursor, 0);
        assert_eq!(inst.slots[0].status, StepStatus::AwaitingRetry);

        store.append_kind(flow, FlowEventKind::StepFinished { step_index: 0, step: StepKind::Selfie, merged: false });
        store.append_kind(flow, FlowEventKind::StepStarted { step_index: 1, step: StepKind::Terms });
        store.append_kind(flow, FlowEventKind::StepFinished { step_index: 1, step: StepKind::Terms, merged: false });
        store.append_kind(flow, FlowEventKind::StepFinished { step_index: 2, step: StepKind::Signature, merged: true });
        store.append_kind(flow, FlowEventKind::FlowCompleted { session_id: None });
        let inst = InMemoryFlowRepository::new().load(flow, &store.list(flow), &plan);
        assert_eq!(inst.cursor, 3);
        assert!(inst.completed);
        assert_eq!(inst.slots[0].attempts, 2);
        assert_eq!(inst.slots[2].attempts, 0);
        assert!(inst.slots.iter().all(|s| s.status.is_done()));
    }

    #[test]
    fn skipped_positions_advance_cursor() {
        let plan = build_flow_plan(&[StepKind::Email, StepKind::Sms]);
        let flow = Uuid::new_v4();
        let mut store = InMemoryEventStore::default();
        store.append_kind(flow, FlowEventKind::FlowInitialized { plan_hash: plan.plan_hash.clone(),
                                                                 step_count: 2,
                                                                 start_index: 0 });
        store.append_kind(flow, FlowEventKind::StepSkipped { step_index: 0,
                                                             step: StepKind::Email,
                                                             reason: SkipReason::Predefined });
        let inst = InMemoryFlowRepository::new().load(flow, &store.list(flow), &plan);
        assert_eq!(inst.cursor, 1);
        assert_eq!(inst.slots[0].status, StepStatus::Skipped);
        assert!(!inst.completed && !inst.cancelled);
    }
}
