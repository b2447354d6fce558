// src/session/manager.rs

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::catalog::CommandDef;
use crate::errors::Result;
use crate::exec::{CancelHandle, ExecutorBackend, ExecutionRequest};
use crate::session::relay::{spawn_relay, RelayHandle, UiPort};
use crate::session::{Session, SessionId, SlotTable};
use crate::template::{self, effective_values, VariableValues};

/// Session-level behaviour.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Capacity of each session's event channel.
    pub event_buffer: usize,
    /// Starting a command in a slot cancels the slot's previous session if
    /// it is still running.
    pub cancel_superseded: bool,
    /// Refuse to run a template that still has unresolved placeholders.
    pub strict_variables: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            event_buffer: 256,
            cancel_superseded: false,
            strict_variables: false,
        }
    }
}

/// Bridges command requests to executor invocations, one per request.
///
/// Sessions are never queued or serialized against each other: every call
/// starts a new invocation immediately. The manager keeps a cancel handle
/// per live session and the slot bindings used to ignore stale output.
pub struct SessionManager<E: ExecutorBackend> {
    executor: E,
    options: SessionOptions,
    next_id: AtomicU64,
    live: Mutex<HashMap<SessionId, CancelHandle>>,
    slots: Arc<SlotTable>,
}

impl<E: ExecutorBackend> SessionManager<E> {
    pub fn new(executor: E, options: SessionOptions) -> Self {
        Self {
            executor,
            options,
            next_id: AtomicU64::new(1),
            live: Mutex::new(HashMap::new()),
            slots: Arc::new(SlotTable::default()),
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Resolve `def` against `values` (falling back to declared defaults)
    /// and start it.
    ///
    /// Fails only when `strict_variables` is set and a placeholder has no
    /// value; process-level failures arrive as the session's terminal event.
    pub fn run(&self, def: &CommandDef, values: &VariableValues) -> Result<Session> {
        let request = self.resolve_request(def, values)?;
        Ok(self.launch(request, None))
    }

    /// Like [`run`](Self::run), but binds the session to `slot`, superseding
    /// whatever session the slot showed before.
    pub fn run_in_slot(
        &self,
        slot: &str,
        def: &CommandDef,
        values: &VariableValues,
    ) -> Result<Session> {
        let request = self.resolve_request(def, values)?;
        Ok(self.launch(request, Some(slot)))
    }

    /// Start an already-resolved command string.
    pub fn run_request(&self, request: ExecutionRequest) -> Session {
        self.launch(request, None)
    }

    /// UI entry point: start `def` in `slot` and push its events to `port`.
    ///
    /// Events of a session that has since been superseded in the same slot
    /// are dropped by the relay.
    pub fn request_run(
        &self,
        slot: &str,
        def: &CommandDef,
        values: &VariableValues,
        port: Arc<dyn UiPort>,
    ) -> Result<RelayHandle> {
        let session = self.run_in_slot(slot, def, values)?;
        Ok(spawn_relay(
            session,
            Some((slot.to_string(), Arc::clone(&self.slots))),
            port,
        ))
    }

    /// Like [`request_run`](Self::request_run) for a command string that
    /// needs no template resolution.
    pub fn request_run_raw(
        &self,
        slot: &str,
        request: ExecutionRequest,
        port: Arc<dyn UiPort>,
    ) -> RelayHandle {
        let session = self.launch(request, Some(slot));
        spawn_relay(
            session,
            Some((slot.to_string(), Arc::clone(&self.slots))),
            port,
        )
    }

    /// UI entry point for cancellation; same as [`cancel`](Self::cancel).
    pub fn request_cancel(&self, id: SessionId) -> bool {
        self.cancel(id)
    }

    /// Cancel a session. Unknown or already finished sessions are a no-op
    /// and return `false`.
    pub fn cancel(&self, id: SessionId) -> bool {
        let handle = {
            let live = self.live.lock().unwrap_or_else(PoisonError::into_inner);
            live.get(&id).cloned()
        };

        match handle {
            Some(h) => {
                let delivered = h.cancel();
                debug!(session = %id, delivered, "cancel requested");
                delivered
            }
            None => {
                debug!(session = %id, "cancel requested for unknown or finished session");
                false
            }
        }
    }

    pub fn is_current(&self, slot: &str, id: SessionId) -> bool {
        self.slots.is_current(slot, id)
    }

    /// Sessions that have not yet produced their terminal result, ascending.
    pub fn active_sessions(&self) -> Vec<SessionId> {
        let mut live = self.live.lock().unwrap_or_else(PoisonError::into_inner);
        live.retain(|_, h| !h.is_finished());
        let mut ids: Vec<_> = live.keys().copied().collect();
        ids.sort();
        ids
    }

    fn resolve_request(&self, def: &CommandDef, values: &VariableValues) -> Result<ExecutionRequest> {
        let values = effective_values(def, values);

        let command = if self.options.strict_variables {
            template::resolve_strict(&def.template, &values)?
        } else {
            let missing = template::unresolved(&def.template, &values);
            if !missing.is_empty() {
                warn!(
                    name = %def.name,
                    ?missing,
                    "running with unresolved placeholders left as-is"
                );
            }
            template::resolve(&def.template, &values)
        };

        Ok(ExecutionRequest::new(def.name.clone(), command))
    }

    fn launch(&self, request: ExecutionRequest, slot: Option<&str>) -> Session {
        let id = SessionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (tx, rx) = mpsc::channel(self.options.event_buffer.max(1));

        info!(session = %id, name = %request.name, cmd = %request.command, "starting session");
        let cancel = self.executor.start(request.clone(), tx);

        let superseded = {
            let mut live = self.live.lock().unwrap_or_else(PoisonError::into_inner);
            live.retain(|_, h| !h.is_finished());
            live.insert(id, cancel.clone());

            slot.and_then(|slot| self.slots.bind(slot, id))
                .and_then(|prev| live.get(&prev).cloned().map(|h| (prev, h)))
        };

        if let Some((prev, handle)) = superseded {
            debug!(session = %id, superseded = %prev, "slot rebound to newer session");
            if self.options.cancel_superseded && handle.cancel() {
                info!(session = %prev, "cancelled superseded session");
            }
        }

        Session::new(id, request, rx, cancel)
    }
}
