// src/session/mod.rs

//! Execution sessions: one per command invocation.
//!
//! This module ties together:
//! - template resolution of a `CommandDef` into an `ExecutionRequest`
//! - one executor invocation per request, via an `ExecutorBackend`
//! - "slots": UI positions bound to their most recent session, so output of
//!   a superseded session can be ignored
//! - the event relay that pushes a session's events to a [`UiPort`]
//!
//! The manager lives in [`manager`]; the relay in [`relay`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc;

use crate::exec::{CancelHandle, ExecutionEvent, ExecutionRequest};

pub mod manager;
pub mod relay;

pub use manager::{SessionManager, SessionOptions};
pub use relay::{RelayHandle, UiPort};

/// Identifier of one invocation; unique per manager, increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A running (or finished) invocation and its ordered event stream.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    request: ExecutionRequest,
    events: mpsc::Receiver<ExecutionEvent>,
    cancel: CancelHandle,
}

impl Session {
    pub(crate) fn new(
        id: SessionId,
        request: ExecutionRequest,
        events: mpsc::Receiver<ExecutionEvent>,
        cancel: CancelHandle,
    ) -> Self {
        Self {
            id,
            request,
            events,
            cancel,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.request.name
    }

    /// The resolved command string.
    pub fn command(&self) -> &str {
        &self.request.command
    }

    pub fn request(&self) -> &ExecutionRequest {
        &self.request
    }

    /// Next event, or `None` once the terminal event has been consumed.
    pub async fn next_event(&mut self) -> Option<ExecutionEvent> {
        self.events.recv().await
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// See [`CancelHandle::cancel`].
    pub fn cancel(&self) -> bool {
        self.cancel.cancel()
    }
}

/// Which session currently owns each UI slot.
#[derive(Debug, Default)]
pub struct SlotTable {
    slots: Mutex<HashMap<String, SessionId>>,
}

impl SlotTable {
    /// Bind `slot` to `id`, returning the session it replaces.
    pub fn bind(&self, slot: &str, id: SessionId) -> Option<SessionId> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.insert(slot.to_string(), id)
    }

    pub fn is_current(&self, slot: &str, id: SessionId) -> bool {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(slot) == Some(&id)
    }

    pub fn current(&self, slot: &str) -> Option<SessionId> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(slot).copied()
    }
}
