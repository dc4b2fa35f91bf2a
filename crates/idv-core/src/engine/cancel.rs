//! Cancelación cooperativa.
//!
//! El handle sólo registra la solicitud; el coordinador la aplica en su
//! próximo punto de control (antes de cada operación y al volver de cada
//! llamada en vuelo), descartando el resultado si llegó tarde.
use std::sync::Arc;

use idv_domain::FlowError;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq)]
pub struct CancelRequest {
    pub error: Option<FlowError>,
}

#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<Option<CancelRequest>>>,
}

impl CancelHandle {
    pub(crate) fn channel() -> (Self, watch::Receiver<Option<CancelRequest>>) {
        let (tx, rx) = watch::channel(None);
        (Self { tx: Arc::new(tx) }, rx)
    }

    /// Solicita la cancelación. Sólo la primera solicitud cuenta; devuelve
    /// `false` si ya había una pendiente.
    pub fn cancel(&self, error: Option<FlowError>) -> bool {
        self.tx.send_if_modified(|slot| {
                   if slot.is_some() {
                       return false;
                   }
                   *slot = Some(CancelRequest { error });
                   true
               })
    }

    pub fn is_cancelled(&self) -> bool {
        self.tx.borrow().is_some()
    }
}
