pub mod builders;
pub mod fake_executor;

use std::sync::{Arc, Mutex, Once};

use quickcmd::exec::{ExecutionResult, OutputLine};
use quickcmd::session::{SessionId, UiPort};
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// What a [`RecordingPort`] was told, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum UiCall {
    Start(SessionId),
    Line(SessionId, OutputLine),
    Result(SessionId, ExecutionResult),
}

/// `UiPort` that records every call for later assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingPort {
    calls: Arc<Mutex<Vec<UiCall>>>,
}

impl RecordingPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<UiCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Line texts delivered for `session`.
    pub fn lines_for(&self, session: SessionId) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                UiCall::Line(id, line) if id == session => Some(line.text),
                _ => None,
            })
            .collect()
    }

    pub fn result_for(&self, session: SessionId) -> Option<ExecutionResult> {
        self.calls().into_iter().find_map(|c| match c {
            UiCall::Result(id, result) if id == session => Some(result),
            _ => None,
        })
    }
}

impl UiPort for RecordingPort {
    fn on_start(&self, session: SessionId, _request: &quickcmd::exec::ExecutionRequest) {
        self.calls.lock().unwrap().push(UiCall::Start(session));
    }

    fn on_line(&self, session: SessionId, line: &OutputLine) {
        self.calls
            .lock()
            .unwrap()
            .push(UiCall::Line(session, line.clone()));
    }

    fn on_result(&self, session: SessionId, result: &ExecutionResult) {
        self.calls
            .lock()
            .unwrap()
            .push(UiCall::Result(session, result.clone()));
    }
}
