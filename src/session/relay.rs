// src/session/relay.rs

//! Push-style delivery of a session's events to the presentation layer.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::exec::{ExecutionEvent, ExecutionRequest, ExecutionResult, OutputLine};
use crate::session::{Session, SessionId, SlotTable};

/// Outbound half of the UI contract.
///
/// Per session, `on_start` is called first, then `on_line` in the order
/// lines were read from each stream (stdout and stderr are not merged into
/// one global order), then `on_result` exactly once.
pub trait UiPort: Send + Sync {
    fn on_start(&self, _session: SessionId, _request: &ExecutionRequest) {}
    fn on_line(&self, session: SessionId, line: &OutputLine);
    fn on_result(&self, session: SessionId, result: &ExecutionResult);
}

/// Tracks a running relay task.
#[derive(Debug)]
pub struct RelayHandle {
    session: SessionId,
    task: JoinHandle<Option<ExecutionResult>>,
}

impl RelayHandle {
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Wait for the session's terminal result.
    ///
    /// The result is returned even when the session was superseded and the
    /// port never saw it.
    pub async fn wait(self) -> Option<ExecutionResult> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => {
                warn!(session = %self.session, error = %e, "relay task failed");
                None
            }
        }
    }
}

/// Forward every event of `session` to `port`.
///
/// With a slot binding, events are delivered only while the session is
/// still the slot's current one; stale events are read and discarded so the
/// producer never stalls.
pub fn spawn_relay(
    mut session: Session,
    slot: Option<(String, Arc<SlotTable>)>,
    port: Arc<dyn UiPort>,
) -> RelayHandle {
    let id = session.id();

    let task = tokio::spawn(async move {
        let is_current = |slot: &Option<(String, Arc<SlotTable>)>| match slot {
            Some((name, table)) => table.is_current(name, id),
            None => true,
        };

        if is_current(&slot) {
            port.on_start(id, session.request());
        }

        while let Some(event) = session.next_event().await {
            let deliver = is_current(&slot);
            match event {
                ExecutionEvent::Line(line) => {
                    if deliver {
                        port.on_line(id, &line);
                    }
                }
                ExecutionEvent::Finished(result) => {
                    if deliver {
                        port.on_result(id, &result);
                    } else {
                        debug!(session = %id, status = %result.status, "dropping result of superseded session");
                    }
                    return Some(result);
                }
            }
        }

        warn!(session = %id, "event stream closed without a terminal result");
        None
    });

    RelayHandle { session: id, task }
}
