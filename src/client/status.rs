use std::sync::Arc;
use tokio::sync::watch;

/// Progress of one client flow. `Pending` is the busy flag the UI uses to
/// disable re-submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FlowStatus {
    #[default]
    Idle,
    Pending,
    Error(String),
}

impl FlowStatus {
    pub fn is_busy(&self) -> bool {
        matches!(self, FlowStatus::Pending)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FlowStatus::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Holds the current status of a flow and lets views observe changes while a
/// call is suspended. Clones share the same status.
#[derive(Debug, Clone)]
pub struct StatusCell {
    sender: Arc<watch::Sender<FlowStatus>>,
}

impl Default for StatusCell {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusCell {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(FlowStatus::Idle);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn get(&self) -> FlowStatus {
        self.sender.borrow().clone()
    }

    pub fn set(&self, status: FlowStatus) {
        self.sender.send_replace(status);
    }

    pub fn subscribe(&self) -> watch::Receiver<FlowStatus> {
        self.sender.subscribe()
    }

    /// Mark the flow `Pending` until the returned guard is dropped. A guard
    /// dropped while still pending (the call was abandoned) resets to `Idle`.
    pub fn begin(&self) -> PendingGuard {
        self.set(FlowStatus::Pending);
        PendingGuard { cell: self.clone() }
    }
}

pub struct PendingGuard {
    cell: StatusCell,
}

impl PendingGuard {
    pub fn finish(self, status: FlowStatus) {
        self.cell.set(status);
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.cell.sender.send_if_modified(|status| {
            if status.is_busy() {
                *status = FlowStatus::Idle;
                true
            } else {
                false
            }
        });
    }
}
