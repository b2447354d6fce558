// src/exec/process_tree.rs

//! Termination of everything a shell invocation started.
//!
//! Commands are pipelines, so killing the shell's pid alone would orphan the
//! other stages. On unix the shell leads a fresh process group and the whole
//! group is killed. On Windows `taskkill /T` walks the process tree.

use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// Prepare `cmd` so its whole tree can be killed later.
pub fn isolate(cmd: &mut Command) {
    #[cfg(unix)]
    cmd.process_group(0);
    #[cfg(not(unix))]
    let _ = cmd;
}

/// Kill the tree rooted at the shell, then kill and reap the shell itself.
///
/// `pid` is the shell's pid as recorded at spawn time. The shell may have
/// been reaped already while pipeline stages or background jobs still hold
/// the process group.
pub async fn kill_tree(child: &mut Child, pid: Option<u32>, name: &str) {
    if let Some(pid) = pid {
        kill_descendants(pid, name).await;
    }
    if let Err(e) = child.kill().await {
        warn!(name = %name, error = %e, "failed to kill shell process");
    }
}

#[cfg(unix)]
async fn kill_descendants(pid: u32, name: &str) {
    let Ok(pgid) = libc::pid_t::try_from(pid) else {
        warn!(name = %name, pid, "pid out of range; cannot kill process group");
        return;
    };

    // SAFETY: kill(2) takes plain integers and touches no memory of ours.
    let rc = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if rc != 0 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::ESRCH) {
            debug!(name = %name, pgid, "process group already gone");
        } else {
            warn!(name = %name, pgid, error = %err, "failed to kill process group");
        }
    }
}

#[cfg(windows)]
async fn kill_descendants(pid: u32, name: &str) {
    use std::process::Stdio;

    let status = Command::new("taskkill")
        .args(["/T", "/F", "/PID", &pid.to_string()])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match status {
        Ok(s) if s.success() => {}
        Ok(s) => debug!(name = %name, pid, status = %s, "taskkill reported failure"),
        Err(e) => warn!(name = %name, pid, error = %e, "failed to run taskkill"),
    }
}

#[cfg(not(any(unix, windows)))]
async fn kill_descendants(_pid: u32, _name: &str) {}
