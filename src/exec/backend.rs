// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The session manager talks to an `ExecutorBackend` instead of spawning
//! processes itself. This makes it easy to swap in a fake executor in tests
//! while keeping the production supervisor in [`supervisor`](super::supervisor).
//!
//! - `RealExecutorBackend` is the default implementation used by `quickcmd`.
//!   It starts one supervisor task per request.
//! - Tests can provide their own `ExecutorBackend` that, for example, emits a
//!   scripted sequence of lines and a canned terminal result.

use tokio::sync::mpsc;

use crate::exec::supervisor::{spawn_supervisor, CancelHandle};
use crate::exec::{ExecOptions, ExecutionEvent, ExecutionRequest};

/// Trait abstracting how a resolved command is executed.
///
/// Implementations must send exactly one `ExecutionEvent::Finished` into
/// `events`, after every `Line` event, and must honour cancellation through
/// the returned handle.
pub trait ExecutorBackend: Send + Sync {
    fn start(
        &self,
        request: ExecutionRequest,
        events: mpsc::Sender<ExecutionEvent>,
    ) -> CancelHandle;
}

/// Real executor backend used in production.
#[derive(Debug, Clone, Default)]
pub struct RealExecutorBackend {
    options: ExecOptions,
}

impl RealExecutorBackend {
    pub fn new(options: ExecOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExecOptions {
        &self.options
    }
}

impl ExecutorBackend for RealExecutorBackend {
    fn start(
        &self,
        request: ExecutionRequest,
        events: mpsc::Sender<ExecutionEvent>,
    ) -> CancelHandle {
        spawn_supervisor(request, self.options.clone(), events)
    }
}
