//! A latch that holds nullable calls until a test releases them.

use std::rc::Rc;
use tokio::sync::watch;

/// Held calls wait until [`Gate::open`] is called.
#[derive(Clone)]
pub struct Gate {
    tx: Rc<watch::Sender<bool>>,
}

impl Gate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Rc::new(tx) }
    }

    /// Release every call waiting on this gate, now and later.
    pub fn open(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_open(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the gate is open.
    pub async fn passed(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|open| *open).await;
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait on an optional gate.
pub(crate) async fn pass(gate: &Option<Gate>) {
    if let Some(gate) = gate {
        gate.passed().await;
    }
}
