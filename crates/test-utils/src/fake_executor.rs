use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, Notify};
use quickcmd::exec::{
    CancelHandle, CancelSignal, ExecutionEvent, ExecutionRequest, ExecutionResult,
    ExecutorBackend, OutputLine, StreamSource,
};

/// One step of a scripted invocation.
#[derive(Debug, Clone)]
pub enum Step {
    Line(OutputLine),
    /// Block until the `Notify` fires (or the invocation is cancelled).
    Wait(Arc<Notify>),
    Finish(ExecutionResult),
    HangUntilCancelled,
}

impl Step {
    pub fn stdout(text: &str) -> Self {
        Step::Line(OutputLine::new(StreamSource::Stdout, text))
    }

    pub fn stderr(text: &str) -> Self {
        Step::Line(OutputLine::new(StreamSource::Stderr, text))
    }
}

/// A fake executor that:
/// - records every request it was asked to start
/// - plays back a scripted sequence of events per command string
/// - falls back to "exit 0, no output" for unscripted commands.
///
/// Cancellation goes through the same `CancelHandle` / `CancelSignal` pair
/// as the real supervisor, so cancel semantics match production.
#[derive(Clone, Default)]
pub struct ScriptedExecutor {
    scripts: Arc<Mutex<HashMap<String, Vec<Step>>>>,
    started: Arc<Mutex<Vec<ExecutionRequest>>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, command: &str, steps: Vec<Step>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(command.to_string(), steps);
        self
    }

    pub fn started(&self) -> Vec<ExecutionRequest> {
        self.started.lock().unwrap().clone()
    }

    pub fn started_commands(&self) -> Vec<String> {
        self.started().into_iter().map(|r| r.command).collect()
    }
}

impl ExecutorBackend for ScriptedExecutor {
    fn start(
        &self,
        request: ExecutionRequest,
        events: mpsc::Sender<ExecutionEvent>,
    ) -> CancelHandle {
        let steps = self
            .scripts
            .lock()
            .unwrap()
            .get(&request.command)
            .cloned()
            .unwrap_or_default();
        self.started.lock().unwrap().push(request);

        let (handle, signal) = CancelHandle::pair();
        tokio::spawn(play(steps, events, signal));
        handle
    }
}

async fn play(steps: Vec<Step>, events: mpsc::Sender<ExecutionEvent>, mut signal: CancelSignal) {
    for step in steps {
        match step {
            Step::Line(line) => {
                // Receiver gone: keep going so the terminal bookkeeping still runs.
                let _ = events.send(ExecutionEvent::Line(line)).await;
            }
            Step::Wait(gate) => {
                tokio::select! {
                    _ = gate.notified() => {}
                    _ = signal.cancelled() => {
                        return finish(&signal, &events, ExecutionResult::cancelled()).await;
                    }
                }
            }
            Step::Finish(result) => return finish(&signal, &events, result).await,
            Step::HangUntilCancelled => {
                signal.cancelled().await;
                return finish(&signal, &events, ExecutionResult::cancelled()).await;
            }
        }
    }

    finish(&signal, &events, ExecutionResult::exited(0)).await
}

async fn finish(
    signal: &CancelSignal,
    events: &mpsc::Sender<ExecutionEvent>,
    result: ExecutionResult,
) {
    // Same rule as the real supervisor: an accepted cancel decides the result.
    let result = if signal.settle() {
        result
    } else {
        ExecutionResult::cancelled()
    };
    signal.finish();
    let _ = events.send(ExecutionEvent::Finished(result)).await;
}
