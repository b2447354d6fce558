// src/exec/supervisor.rs

//! Lifecycle of one command invocation.
//!
//! ```text
//! Spawning -> Running -> { Completed | TimedOut | Cancelled | SpawnFailed }
//! ```
//!
//! Every path ends in exactly one `ExecutionEvent::Finished`, sent after the
//! last `Line` event. Both output pipes are drained concurrently inside the
//! supervisor task; when the timeout or a cancellation wins, the draining
//! futures are dropped *before* the child is killed and the terminal event
//! is sent, so no line can trail the terminal event.

use std::future::pending;
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::process::{Child, ChildStderr, ChildStdout};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

use crate::exec::drain::drain;
use crate::exec::process_tree;
use crate::exec::{
    ExecOptions, ExecutionEvent, ExecutionRequest, ExecutionResult, OutputLine, StreamSource,
};
use crate::types::TextEncoding;

/// Caller-side view of a running invocation: its events plus a way to stop
/// it.
#[derive(Debug)]
pub struct SupervisorHandle {
    pub events: mpsc::Receiver<ExecutionEvent>,
    pub cancel: CancelHandle,
}

impl SupervisorHandle {
    pub async fn next_event(&mut self) -> Option<ExecutionEvent> {
        self.events.recv().await
    }

    pub fn cancel(&self) -> bool {
        self.cancel.cancel()
    }
}

/// Start `request` under the supervisor.
///
/// Must be called from within a Tokio runtime. No event can be observed
/// before this returns, since the receiver is only reachable through the
/// returned handle.
pub fn start(request: ExecutionRequest, options: &ExecOptions) -> SupervisorHandle {
    let (tx, rx) = mpsc::channel(options.event_buffer.max(1));
    let cancel = spawn_supervisor(request, options.clone(), tx);
    SupervisorHandle { events: rx, cancel }
}

/// Spawn the supervisor task, sending events into `events`.
pub fn spawn_supervisor(
    request: ExecutionRequest,
    options: ExecOptions,
    events: mpsc::Sender<ExecutionEvent>,
) -> CancelHandle {
    let (cancel, mut signal) = CancelHandle::pair();

    tokio::spawn(async move {
        let result = supervise(&request, &options, &events, &mut signal).await;

        info!(
            name = %request.name,
            status = %result.status,
            exit_code = ?result.exit_code,
            "command finished"
        );

        // Later cancels become no-ops from here on.
        signal.finish();

        if events.send(ExecutionEvent::Finished(result)).await.is_err() {
            debug!(name = %request.name, "event receiver dropped before terminal result");
        }
    });

    cancel
}

enum Outcome {
    Exited(std::io::Result<(ExitStatus, usize)>),
    TimedOut,
    Cancelled,
}

async fn supervise(
    request: &ExecutionRequest,
    options: &ExecOptions,
    events: &mpsc::Sender<ExecutionEvent>,
    cancel: &mut CancelSignal,
) -> ExecutionResult {
    info!(name = %request.name, cmd = %request.command, "starting command");

    let mut cmd = options.shell.command_for(&request.command);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    process_tree::isolate(&mut cmd);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            error!(
                name = %request.name,
                shell = %options.shell.program,
                error = %e,
                "failed to spawn command"
            );
            if !cancel.settle() {
                return ExecutionResult::cancelled();
            }
            return ExecutionResult::error(format!(
                "failed to start '{}': {e}",
                options.shell.program
            ));
        }
    };

    let pid = child.id();
    let deadline = Instant::now().checked_add(options.timeout);
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    // The losing branches are dropped before the handlers run, which stops
    // both drains and releases the borrow on `child`.
    let mut outcome = tokio::select! {
        res = run_to_exit(&mut child, stdout, stderr, options.encoding, events) => Outcome::Exited(res),
        _ = expire(deadline) => Outcome::TimedOut,
        _ = cancel.cancelled() => Outcome::Cancelled,
    };

    // A cancel accepted while another branch was winning still decides the
    // result, so an accepted cancel always ends in `Cancelled`.
    if !matches!(outcome, Outcome::Cancelled) && !cancel.settle() {
        debug!(name = %request.name, "cancel raced completion; reporting cancelled");
        outcome = Outcome::Cancelled;
    }

    match outcome {
        Outcome::Exited(Ok((status, lines))) => {
            debug!(name = %request.name, %status, lines, "command exited");

            match status.code() {
                Some(code) => {
                    if code == 0 && lines == 0 {
                        let notice =
                            OutputLine::new(StreamSource::Notice, options.no_output_notice.clone());
                        let _ = events.send(ExecutionEvent::Line(notice)).await;
                    }
                    ExecutionResult::exited(code)
                }
                None => {
                    warn!(name = %request.name, %status, "shell terminated by a signal");
                    ExecutionResult::signalled()
                }
            }
        }
        Outcome::Exited(Err(e)) => {
            error!(name = %request.name, error = %e, "waiting for command failed");
            process_tree::kill_tree(&mut child, pid, &request.name).await;
            ExecutionResult::error(format!("waiting for command failed: {e}"))
        }
        Outcome::TimedOut => {
            warn!(
                name = %request.name,
                timeout = ?options.timeout,
                "command timed out; killing process tree"
            );
            process_tree::kill_tree(&mut child, pid, &request.name).await;
            ExecutionResult::timeout(options.timeout)
        }
        Outcome::Cancelled => {
            info!(name = %request.name, "cancellation requested; killing process tree");
            process_tree::kill_tree(&mut child, pid, &request.name).await;
            ExecutionResult::cancelled()
        }
    }
}

/// Resolves at `deadline`; never, if the timeout was too large to represent.
async fn expire(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}

/// Drain stdout and stderr concurrently while waiting for the exit status.
async fn run_to_exit(
    child: &mut Child,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
    encoding: TextEncoding,
    events: &mpsc::Sender<ExecutionEvent>,
) -> std::io::Result<(ExitStatus, usize)> {
    let (out_lines, err_lines, status) = tokio::join!(
        drain(stdout, StreamSource::Stdout, encoding, events),
        drain(stderr, StreamSource::Stderr, encoding, events),
        child.wait(),
    );
    Ok((status?, out_lines + err_lines))
}

/// Idempotent cancellation trigger for one invocation.
///
/// Cloneable; every clone controls the same invocation. Cancelling more
/// than once, or after the invocation finished, does nothing.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    state: Arc<CancelState>,
}

#[derive(Debug)]
struct CancelState {
    tx: Mutex<Option<oneshot::Sender<()>>>,
    phase: AtomicU8,
}

const RUNNING: u8 = 0;
const CANCELLED: u8 = 1;
const FINISHED: u8 = 2;

impl CancelHandle {
    /// A connected handle / signal pair. Backends keep the signal and give
    /// the handle to callers.
    pub fn pair() -> (CancelHandle, CancelSignal) {
        let (tx, rx) = oneshot::channel();
        let state = Arc::new(CancelState {
            tx: Mutex::new(Some(tx)),
            phase: AtomicU8::new(RUNNING),
        });
        (
            CancelHandle {
                state: Arc::clone(&state),
            },
            CancelSignal { rx, state },
        )
    }

    /// Request termination.
    ///
    /// Returns `true` only for the call that moved a still-running
    /// invocation into the cancelled state. Such an invocation always
    /// reports `Cancelled`, even if its command was exiting at the time.
    pub fn cancel(&self) -> bool {
        if self
            .state
            .phase
            .compare_exchange(RUNNING, CANCELLED, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }
        let sender = self
            .state
            .tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(tx) = sender {
            let _ = tx.send(());
        }
        true
    }

    /// True once the invocation has produced (or is about to send) its
    /// terminal result.
    pub fn is_finished(&self) -> bool {
        self.state.phase.load(Ordering::SeqCst) == FINISHED
    }
}

/// Supervisor-side half of a [`CancelHandle`].
#[derive(Debug)]
pub struct CancelSignal {
    rx: oneshot::Receiver<()>,
    state: Arc<CancelState>,
}

impl CancelSignal {
    /// Resolves when cancellation is requested; never resolves otherwise.
    pub async fn cancelled(&mut self) {
        if (&mut self.rx).await.is_err() {
            pending::<()>().await;
        }
    }

    /// Close the window for cancels once the outcome is known.
    ///
    /// Returns `false` if a cancel was accepted first; the caller must then
    /// report `Cancelled`.
    pub fn settle(&self) -> bool {
        match self.state.phase.compare_exchange(
            RUNNING,
            FINISHED,
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            Ok(_) => true,
            Err(phase) => phase == FINISHED,
        }
    }

    /// Mark the invocation finished, turning further cancels into no-ops.
    pub fn finish(&self) {
        self.state.phase.store(FINISHED, Ordering::SeqCst);
        self.state
            .tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_delivered_once() {
        let (handle, mut signal) = CancelHandle::pair();
        let other = handle.clone();

        assert!(handle.cancel());
        assert!(!other.cancel());
        assert_eq!(signal.rx.try_recv(), Ok(()));
    }

    #[test]
    fn cancel_after_finish_is_a_no_op() {
        let (handle, signal) = CancelHandle::pair();
        signal.finish();

        assert!(handle.is_finished());
        assert!(!handle.cancel());
    }

    #[test]
    fn cancel_loses_once_outcome_is_settled() {
        let (handle, signal) = CancelHandle::pair();

        assert!(signal.settle());
        assert!(handle.is_finished());
        assert!(!handle.cancel());
        assert!(signal.settle());
    }

    #[test]
    fn accepted_cancel_wins_over_a_late_exit() {
        let (handle, signal) = CancelHandle::pair();

        assert!(handle.cancel());
        assert!(!signal.settle());
        assert!(!handle.is_finished());

        signal.finish();
        assert!(handle.is_finished());
        assert!(!handle.cancel());
    }

    #[tokio::test]
    async fn spawn_failure_reports_error_without_lines() {
        let options = ExecOptions {
            shell: crate::exec::ShellSpec::new("/definitely/not/a/shell", ["-c"]),
            ..ExecOptions::default()
        };

        let mut handle = start(ExecutionRequest::new("broken", "echo hi"), &options);
        match handle.next_event().await {
            Some(ExecutionEvent::Finished(result)) => {
                assert_eq!(result.status, crate::exec::ExecutionStatus::Error);
                assert!(result.message.unwrap().contains("/definitely/not/a/shell"));
            }
            other => panic!("expected terminal error, got {other:?}"),
        }
        assert_eq!(handle.next_event().await, None);
        assert!(handle.cancel.is_finished());
    }
}
