//! Child-process execution with streamed output.
//!
//! Runs an assembled [`CommandLine`], merges stdout and stderr into a single
//! line stream, and hands completed lines to the caller through an event
//! channel as they arrive. After the streams close, the exit status is
//! reported on the same channel. Launch failures become events too; nothing
//! in here panics or bubbles an error into the caller's control flow.
//!
//! Concurrency: invocations are independent. Every [`spawn`] carries its own
//! channel and child process, and the runner imposes no serialization; a
//! front-end that wants one-run-at-a-time simply awaits the previous run.
//! There is no cancellation: dropping the receiver discards further events
//! but the child still runs to completion.

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::command::CommandLine;

// =============================================================================
// Events
// =============================================================================

/// Events delivered to the output sink during one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// The run is starting; carries the pretty-printed command for the log.
    Started { command: String },

    /// One completed output line, stdout and stderr merged in arrival order.
    Line(String),

    /// The process could not be launched. Terminal: no `Exited` follows.
    SpawnFailed(String),

    /// The process terminated. `None` when killed by a signal.
    Exited { code: Option<i32> },
}

/// Sender half of the run event channel.
pub type RunEventSender = mpsc::UnboundedSender<RunEvent>;

/// Receiver half of the run event channel.
pub type RunEventReceiver = mpsc::UnboundedReceiver<RunEvent>;

/// Creates the channel connecting a run to its output sink.
pub fn event_channel() -> (RunEventSender, RunEventReceiver) {
    mpsc::unbounded_channel()
}

// =============================================================================
// Execution
// =============================================================================

/// Launches `command` on a background task, streaming events to `sender`.
///
/// The returned handle resolves once the exit status (or spawn failure) has
/// been reported; callers that only care about events may drop it.
pub fn spawn(command: CommandLine, sender: RunEventSender) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(command = %command, "Starting run");
        let _ = sender.send(RunEvent::Started {
            command: command.to_string(),
        });

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                error!(program = %command.program, error = %e, "Failed to launch");
                let _ = sender.send(RunEvent::SpawnFailed(format!(
                    "Failed to launch {}: {}",
                    command.program, e
                )));
                return;
            }
        };

        // Pump both pipes concurrently into the one sink; lines land in the
        // order they complete. Reading them in sequence would stall stderr
        // behind stdout and can deadlock once the pipe buffer fills.
        let stdout_pump = child
            .stdout
            .take()
            .map(|out| tokio::spawn(pump_lines(out, sender.clone())));
        let stderr_pump = child
            .stderr
            .take()
            .map(|err| tokio::spawn(pump_lines(err, sender.clone())));

        if let Some(pump) = stdout_pump {
            let _ = pump.await;
        }
        if let Some(pump) = stderr_pump {
            let _ = pump.await;
        }

        let code = match child.wait().await {
            Ok(status) => status.code(),
            Err(e) => {
                error!(error = %e, "Failed to collect exit status");
                None
            }
        };

        debug!(?code, "Run finished");
        let _ = sender.send(RunEvent::Exited { code });
    })
}

/// Forwards completed lines from one pipe into the event channel.
///
/// Lines are read as raw bytes and decoded lossily: the tool prints
/// arbitrary filenames, so invalid UTF-8 degrades to replacement
/// characters instead of cutting off the rest of the stream.
async fn pump_lines<R>(pipe: R, sender: RunEventSender)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\r', '\n']);
                if sender.send(RunEvent::Line(line.to_string())).is_err() {
                    // Receiver dropped; stop forwarding. The child still
                    // finishes on its own.
                    break;
                }
            }
            Err(e) => {
                let _ = sender.send(RunEvent::Line(format!("output read error: {}", e)));
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandLine {
        CommandLine {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
        }
    }

    async fn collect_events(command: CommandLine) -> Vec<RunEvent> {
        let (tx, mut rx) = event_channel();
        let handle = spawn(command, tx);
        handle.await.unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn delivers_lines_in_order_then_exit_code() {
        let events = collect_events(sh("printf 'one\\ntwo\\nthree\\n'")).await;

        assert!(matches!(events[0], RunEvent::Started { .. }));
        let lines: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                RunEvent::Line(l) => Some(l.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(lines, vec!["one", "two", "three"]);
        assert_eq!(events.last(), Some(&RunEvent::Exited { code: Some(0) }));
    }

    #[tokio::test]
    async fn invalid_utf8_degrades_instead_of_truncating_the_stream() {
        let events = collect_events(sh("printf 'ok\\n\\377\\376 bad\\nafter\\n'")).await;

        let lines: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                RunEvent::Line(l) => Some(l.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "ok");
        assert!(lines[1].contains('\u{FFFD}'));
        assert_eq!(lines[2], "after");
        assert_eq!(events.last(), Some(&RunEvent::Exited { code: Some(0) }));
    }

    #[tokio::test]
    async fn reports_nonzero_exit_code() {
        let events = collect_events(sh("exit 42")).await;
        assert_eq!(events.last(), Some(&RunEvent::Exited { code: Some(42) }));
    }

    #[tokio::test]
    async fn merges_stderr_into_the_stream() {
        let events = collect_events(sh("echo out; echo err >&2")).await;

        let lines: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                RunEvent::Line(l) => Some(l.as_str()),
                _ => None,
            })
            .collect();
        assert!(lines.contains(&"out"));
        assert!(lines.contains(&"err"));
        assert_eq!(events.last(), Some(&RunEvent::Exited { code: Some(0) }));
    }

    #[tokio::test]
    async fn spawn_failure_is_an_event_not_a_panic() {
        let command = CommandLine {
            program: "/definitely/not/a/real/binary".to_string(),
            args: vec![],
        };
        let events = collect_events(command).await;

        assert!(matches!(events[0], RunEvent::Started { .. }));
        assert!(matches!(events[1], RunEvent::SpawnFailed(_)));
        assert!(!events.iter().any(|e| matches!(e, RunEvent::Exited { .. })));
    }

    #[tokio::test]
    async fn concurrent_runs_do_not_interfere() {
        let (tx_a, mut rx_a) = event_channel();
        let (tx_b, mut rx_b) = event_channel();
        let a = spawn(sh("echo alpha"), tx_a);
        let b = spawn(sh("echo beta"), tx_b);
        let _ = tokio::join!(a, b);

        let mut saw_alpha = false;
        while let Ok(event) = rx_a.try_recv() {
            if event == RunEvent::Line("alpha".to_string()) {
                saw_alpha = true;
            }
        }
        let mut saw_beta = false;
        while let Ok(event) = rx_b.try_recv() {
            if event == RunEvent::Line("beta".to_string()) {
                saw_beta = true;
            }
        }
        assert!(saw_alpha && saw_beta);
    }
}
