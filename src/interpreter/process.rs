//! Execution of external commands for `run_command`.

use std::{
    io::Read,
    path::Path,
    process::{Child, Command, ExitStatus, Stdio},
    thread::{self, JoinHandle},
    time::Duration,
};

use tracing::{debug, warn};

use crate::{
    analyzer::cancel::CancellationToken,
    errors::errors::{Error, ErrorImpl},
    Location,
};

use super::value::RunResult;

/// Runs a command to completion and reports its exit status and output.
pub trait ProcessRunner {
    /// `capture: false` discards the output instead of collecting it.
    fn run(
        &self,
        argv: &[String],
        cwd: &Path,
        env: &[(String, String)],
        capture: bool,
        cancel: &CancellationToken,
    ) -> Result<RunResult, Error>;
}

/// Spawns real processes with `std::process::Command`.
///
/// The child is polled until it exits. If the cancellation token fires first
/// the child is killed and reaped before `Cancelled` is returned.
#[derive(Debug, Clone)]
pub struct SystemProcessRunner {
    pub poll_interval: Duration,
}

impl Default for SystemProcessRunner {
    fn default() -> Self {
        SystemProcessRunner {
            poll_interval: Duration::from_millis(10),
        }
    }
}

impl ProcessRunner for SystemProcessRunner {
    fn run(
        &self,
        argv: &[String],
        cwd: &Path,
        env: &[(String, String)],
        capture: bool,
        cancel: &CancellationToken,
    ) -> Result<RunResult, Error> {
        let command_line = argv.join(" ");
        let Some((program, args)) = argv.split_first() else {
            return Err(spawn_failed(&command_line, "empty command"));
        };

        let output = || {
            if capture {
                Stdio::piped()
            } else {
                Stdio::null()
            }
        };
        let mut child = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .envs(env.iter().map(|(key, value)| (key, value)))
            .stdin(Stdio::null())
            .stdout(output())
            .stderr(output())
            .spawn()
            .map_err(|error| spawn_failed(&command_line, &error.to_string()))?;
        debug!("spawned `{}` (pid {})", command_line, child.id());

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);
        let status = self.wait(&mut child, &command_line, cancel);

        let stdout = collect(stdout);
        let stderr = collect(stderr);
        let status = status?;

        Ok(RunResult {
            returncode: status.code().map(i64::from).unwrap_or(-1),
            stdout,
            stderr,
        })
    }
}

impl SystemProcessRunner {
    fn wait(
        &self,
        child: &mut Child,
        command_line: &str,
        cancel: &CancellationToken,
    ) -> Result<ExitStatus, Error> {
        loop {
            if cancel.is_cancelled() {
                warn!("killing `{}` after cancellation", command_line);
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::new(ErrorImpl::Cancelled, Location::null()));
            }
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => thread::sleep(self.poll_interval),
                Err(error) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(spawn_failed(command_line, &error.to_string()));
                }
            }
        }
    }
}

/// Reads a pipe to the end on its own thread so a full pipe never blocks
/// the child.
fn drain(mut pipe: impl Read + Send + 'static) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut bytes = vec![];
        let _ = pipe.read_to_end(&mut bytes);
        String::from_utf8_lossy(&bytes).into_owned()
    })
}

fn collect(reader: Option<JoinHandle<String>>) -> String {
    reader
        .map(|handle| handle.join().unwrap_or_default())
        .unwrap_or_default()
}

fn spawn_failed(command: &str, message: &str) -> Error {
    Error::new(
        ErrorImpl::SpawnFailed {
            command: command.to_string(),
            message: message.to_string(),
        },
        Location::null(),
    )
}
