// tests/supervisor_process.rs
//
// Runs real shell commands, so these are unix-only.
#![cfg(unix)]

use std::time::{Duration, Instant};

use quickcmd::exec::{
    start, ExecOptions, ExecutionEvent, ExecutionRequest, ExecutionResult, ExecutionStatus,
    OutputLine, ShellSpec, StreamSource, SupervisorHandle,
};
use quickcmd_test_utils::{init_tracing, with_timeout};

fn options(timeout: Duration) -> ExecOptions {
    ExecOptions {
        timeout,
        shell: ShellSpec::new("sh", ["-c"]),
        ..ExecOptions::default()
    }
}

/// Collect every event until the stream closes.
async fn collect(mut handle: SupervisorHandle) -> (Vec<OutputLine>, ExecutionResult) {
    let mut lines = Vec::new();
    let mut result = None;

    while let Some(event) = handle.next_event().await {
        match event {
            ExecutionEvent::Line(line) => {
                assert!(result.is_none(), "line {line:?} arrived after the terminal event");
                lines.push(line);
            }
            ExecutionEvent::Finished(r) => {
                assert!(result.is_none(), "second terminal event {r:?}");
                result = Some(r);
            }
        }
    }

    (lines, result.expect("stream closed without a terminal event"))
}

/// Whether `pid` is still a live (non-zombie) process. Orphaned pipeline
/// stages are reparented, so a killed one can linger as a zombie for a bit.
fn is_running(pid: &str) -> bool {
    let stat = std::path::Path::new("/proc").join(pid).join("stat");
    if let Ok(stat) = std::fs::read_to_string(&stat) {
        let state = stat.rsplit(')').next().unwrap_or("").trim_start();
        return !state.starts_with('Z') && !state.starts_with('X');
    }
    if cfg!(target_os = "linux") {
        return false;
    }
    std::process::Command::new("kill")
        .args(["-0", pid])
        .status()
        .unwrap()
        .success()
}

/// Wait up to two seconds for `pid` to go away.
async fn gone(pid: &str) -> bool {
    for _ in 0..40 {
        if !is_running(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

/// A two-stage pipeline whose first stage records its pid, then blocks.
fn sleeping_pipeline(pid_file: &std::path::Path) -> String {
    format!(
        "sh -c 'echo $$ > \"{}\"; echo ready; exec sleep 30' | cat",
        pid_file.display()
    )
}

fn texts(lines: &[OutputLine], source: StreamSource) -> Vec<String> {
    lines
        .iter()
        .filter(|l| l.source == source)
        .map(|l| l.text.clone())
        .collect()
}

#[tokio::test]
async fn echo_reports_line_and_success() {
    init_tracing();
    let handle = start(
        ExecutionRequest::new("hello", "echo hello"),
        &options(Duration::from_secs(10)),
    );

    let (lines, result) = with_timeout(collect(handle)).await;

    assert_eq!(lines, vec![OutputLine::new(StreamSource::Stdout, "hello")]);
    assert_eq!(result, ExecutionResult::exited(0));
}

#[tokio::test]
async fn non_zero_exit_is_failure_with_code() {
    init_tracing();
    let handle = start(
        ExecutionRequest::new("fail", "echo oops >&2; exit 3"),
        &options(Duration::from_secs(10)),
    );

    let (lines, result) = with_timeout(collect(handle)).await;

    assert_eq!(texts(&lines, StreamSource::Stderr), vec!["oops"]);
    assert_eq!(result.status, ExecutionStatus::Failure);
    assert_eq!(result.exit_code, Some(3));
}

#[tokio::test]
async fn silent_success_emits_exactly_one_notice() {
    init_tracing();
    let handle = start(
        ExecutionRequest::new("quiet", "true"),
        &options(Duration::from_secs(10)),
    );

    let (lines, result) = with_timeout(collect(handle)).await;

    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].source, StreamSource::Notice);
    assert_eq!(lines[0].text, quickcmd::exec::DEFAULT_NO_OUTPUT_NOTICE);
    assert!(result.is_success());
}

#[tokio::test]
async fn silent_failure_has_no_notice() {
    init_tracing();
    let handle = start(
        ExecutionRequest::new("quiet-fail", "exit 1"),
        &options(Duration::from_secs(10)),
    );

    let (lines, result) = with_timeout(collect(handle)).await;

    assert!(lines.is_empty());
    assert_eq!(result.exit_code, Some(1));
}

#[tokio::test]
async fn crlf_and_missing_final_newline_are_handled() {
    init_tracing();
    let handle = start(
        ExecutionRequest::new("crlf", r"printf 'a\r\nb'"),
        &options(Duration::from_secs(10)),
    );

    let (lines, _) = with_timeout(collect(handle)).await;

    assert_eq!(texts(&lines, StreamSource::Stdout), vec!["a", "b"]);
}

#[tokio::test]
async fn timeout_kills_the_process_and_ends_the_stream() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("pid");
    let command = format!(
        "echo started; echo $$ > '{}'; exec sleep 30",
        pid_file.display()
    );

    let started = Instant::now();
    let handle = start(
        ExecutionRequest::new("sleepy", command),
        &options(Duration::from_millis(500)),
    );
    let (lines, result) = with_timeout(collect(handle)).await;

    assert_eq!(result.status, ExecutionStatus::Timeout);
    assert_eq!(result.exit_code, None);
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(texts(&lines, StreamSource::Stdout), vec!["started"]);

    let pid = std::fs::read_to_string(&pid_file).unwrap();
    assert!(gone(pid.trim()).await, "process {} survived the timeout", pid.trim());
}

#[tokio::test]
async fn timeout_kills_every_pipeline_stage() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("pid");

    let handle = start(
        ExecutionRequest::new("pipeline", sleeping_pipeline(&pid_file)),
        &options(Duration::from_millis(500)),
    );
    let (lines, result) = with_timeout(collect(handle)).await;

    assert_eq!(result.status, ExecutionStatus::Timeout);
    assert_eq!(texts(&lines, StreamSource::Stdout), vec!["ready"]);

    let pid = std::fs::read_to_string(&pid_file).unwrap();
    assert!(gone(pid.trim()).await, "pipeline stage {} survived the timeout", pid.trim());
}

#[tokio::test]
async fn cancel_kills_every_pipeline_stage() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("pid");

    let mut handle = start(
        ExecutionRequest::new("pipeline", sleeping_pipeline(&pid_file)),
        &options(Duration::from_secs(60)),
    );

    // The pid is written before "ready" goes through `cat`.
    let first = with_timeout(handle.next_event()).await;
    assert_eq!(
        first,
        Some(ExecutionEvent::Line(OutputLine::new(StreamSource::Stdout, "ready")))
    );
    assert!(handle.cancel());

    let (_, result) = with_timeout(collect(handle)).await;
    assert_eq!(result.status, ExecutionStatus::Cancelled);

    let pid = std::fs::read_to_string(&pid_file).unwrap();
    assert!(gone(pid.trim()).await, "pipeline stage {} survived the cancel", pid.trim());
}

#[tokio::test]
async fn signal_death_is_failure_without_code() {
    init_tracing();
    let handle = start(
        ExecutionRequest::new("killed", "kill -9 $$"),
        &options(Duration::from_secs(10)),
    );

    let (lines, result) = with_timeout(collect(handle)).await;

    assert!(lines.is_empty());
    assert_eq!(result.status, ExecutionStatus::Failure);
    assert_eq!(result.exit_code, None);
    assert_eq!(result.message, None);
}

#[tokio::test]
async fn unrepresentable_deadline_never_fires() {
    init_tracing();
    let handle = start(
        ExecutionRequest::new("hello", "echo hi"),
        &options(Duration::MAX),
    );

    let (lines, result) = with_timeout(collect(handle)).await;

    assert_eq!(texts(&lines, StreamSource::Stdout), vec!["hi"]);
    assert_eq!(result, ExecutionResult::exited(0));
}

#[tokio::test]
async fn large_interleaved_output_does_not_deadlock() {
    init_tracing();
    // Far more than a pipe buffer on each stream.
    let command = "i=0; while [ $i -lt 5000 ]; do \
                   echo \"out $i\"; echo \"err $i\" >&2; i=$((i+1)); done";
    let handle = start(
        ExecutionRequest::new("chatty", command),
        &options(Duration::from_secs(20)),
    );

    let (lines, result) = tokio::time::timeout(Duration::from_secs(20), collect(handle))
        .await
        .expect("supervisor deadlocked");

    assert!(result.is_success());
    let out = texts(&lines, StreamSource::Stdout);
    let err = texts(&lines, StreamSource::Stderr);
    assert_eq!(out.len(), 5000);
    assert_eq!(err.len(), 5000);
    // Per-stream order is preserved.
    assert_eq!(out[0], "out 0");
    assert_eq!(out[4999], "out 4999");
    assert_eq!(err[4999], "err 4999");
}

#[tokio::test]
async fn cancel_stops_a_running_command_once() {
    init_tracing();
    let mut handle = start(
        ExecutionRequest::new("forever", "echo ready; sleep 30"),
        &options(Duration::from_secs(60)),
    );

    // Wait until the shell is actually running.
    let first = with_timeout(handle.next_event()).await;
    assert_eq!(
        first,
        Some(ExecutionEvent::Line(OutputLine::new(StreamSource::Stdout, "ready")))
    );

    let canceller = handle.cancel.clone();
    assert!(canceller.cancel());
    assert!(!canceller.cancel());

    let (lines, result) = with_timeout(collect(handle)).await;
    assert!(lines.is_empty());
    assert_eq!(result.status, ExecutionStatus::Cancelled);
    assert!(canceller.is_finished());
}

#[tokio::test]
async fn cancel_after_completion_is_a_no_op() {
    init_tracing();
    let handle = start(
        ExecutionRequest::new("quick", "echo done"),
        &options(Duration::from_secs(10)),
    );
    let canceller = handle.cancel.clone();

    let (_, result) = with_timeout(collect(handle)).await;
    assert!(result.is_success());
    assert!(!canceller.cancel());
}

#[tokio::test]
async fn sessions_run_concurrently() {
    init_tracing();
    let opts = options(Duration::from_secs(10));

    let started = Instant::now();
    let a = start(ExecutionRequest::new("a", "sleep 1; echo a"), &opts);
    let b = start(ExecutionRequest::new("b", "sleep 1; echo b"), &opts);

    let ((a_lines, a_result), (b_lines, b_result)) =
        with_timeout(async { tokio::join!(collect(a), collect(b)) }).await;

    assert!(a_result.is_success() && b_result.is_success());
    assert_eq!(texts(&a_lines, StreamSource::Stdout), vec!["a"]);
    assert_eq!(texts(&b_lines, StreamSource::Stdout), vec!["b"]);
    assert!(started.elapsed() < Duration::from_millis(1900));
}
