use std::process::ExitStatus;

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::extract::ExtractedCommand;

/// Shell convention for "could not run the command at all".
const SPAWN_FAILURE_EXIT_CODE: i32 = 127;

/// Outcome of running a confirmed command. Output is streamed straight to
/// the terminal, so only the status is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_code: i32,
    /// Signal that terminated the command, if any.
    pub signal: Option<i32>,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self {
                exit_code: code,
                signal: None,
            };
        }

        let signal = terminating_signal(&status);
        Self {
            exit_code: signal.map_or(1, |sig| 128 + sig),
            signal,
        }
    }
}

#[cfg(unix)]
fn terminating_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn terminating_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

#[cfg(unix)]
fn forward_interrupt(child: &mut Child) {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    if !matches!(child.try_wait(), Ok(None)) {
        return;
    }
    let Some(pid) = child.id().and_then(|id| i32::try_from(id).ok()) else {
        return;
    };
    // A terminal Ctrl-C may already have reached the child as well.
    match kill(Pid::from_raw(pid), Signal::SIGINT) {
        Ok(()) | Err(nix::errno::Errno::ESRCH) => {}
        Err(err) => warn!(pid, error = %err, "failed to forward interrupt"),
    }
}

// Console Ctrl-C is delivered to every process attached to the console.
#[cfg(not(unix))]
fn forward_interrupt(_child: &mut Child) {}

fn shell_command(shell: &str, command: &str) -> Command {
    let mut cmd = Command::new(shell);
    let is_cmd_exe = shell.eq_ignore_ascii_case("cmd") || shell.eq_ignore_ascii_case("cmd.exe");
    cmd.arg(if is_cmd_exe { "/C" } else { "-c" }).arg(command);
    cmd
}

/// Runs the command once through `shell`, inheriting stdio, environment and
/// working directory.
///
/// An interrupt delivered to this process while the child runs is passed on
/// to the child, then the child is waited for so its status is still
/// reported.
pub async fn run(command: &ExtractedCommand, shell: &str) -> ExecutionResult {
    debug!(shell = %shell, command = %command, "spawning command");
    let mut child = match shell_command(shell, command.as_str()).spawn() {
        Ok(child) => child,
        Err(err) => {
            warn!(shell = %shell, error = %err, "failed to spawn shell");
            eprintln!("lal: failed to start shell '{shell}': {err}");
            return ExecutionResult {
                exit_code: SPAWN_FAILURE_EXIT_CODE,
                signal: None,
            };
        }
    };

    let waited = tokio::select! {
        status = child.wait() => status,
        interrupted = tokio::signal::ctrl_c() => {
            if interrupted.is_ok() {
                info!("interrupt received; forwarding to command");
                forward_interrupt(&mut child);
            }
            child.wait().await
        }
    };

    match waited {
        Ok(status) => {
            let result = ExecutionResult::from_status(status);
            info!(
                exit_code = result.exit_code,
                signal = ?result.signal,
                "command finished"
            );
            result
        }
        Err(err) => {
            warn!(error = %err, "failed to wait for command");
            eprintln!("lal: failed to wait for command: {err}");
            ExecutionResult {
                exit_code: 1,
                signal: None,
            }
        }
    }
}
