//! External command runner backed by `std::process`.

use std::{
    collections::HashMap,
    io::Read,
    path::Path,
    process::{Child, Command, ExitStatus, Stdio},
    sync::{Mutex, MutexGuard, PoisonError},
    thread,
    time::Duration,
};

use railgen_core::{
    application::{ApplicationError, ports::CommandRunner},
    error::RailgenResult,
};
use tracing::{debug, instrument, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Runs commands to completion while keeping each child reachable, so a
/// rollback started from another thread can halt them.
#[derive(Debug, Default)]
pub struct SystemCommandRunner {
    running: Mutex<HashMap<u32, Child>>,
}

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of children currently tracked.
    pub fn running_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u32, Child>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Poll until the child exits or is taken by `halt_all`.
    fn wait_for(&self, pid: u32) -> Option<std::io::Result<ExitStatus>> {
        loop {
            {
                let mut running = self.lock();
                let child = running.get_mut(&pid)?;
                match child.try_wait() {
                    Ok(Some(status)) => {
                        running.remove(&pid);
                        return Some(Ok(status));
                    }
                    Ok(None) => {}
                    Err(e) => {
                        running.remove(&pid);
                        return Some(Err(e));
                    }
                }
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl CommandRunner for SystemCommandRunner {
    #[instrument(skip(self, args))]
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> RailgenResult<()> {
        let command = std::iter::once(program)
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        let failed = |reason: String| ApplicationError::CommandFailed {
            command: command.clone(),
            reason,
        };

        let mut child = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| failed(e.to_string()))?;

        // Drain stderr on its own thread so a chatty child cannot fill the pipe.
        let stderr = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buf = String::new();
                let _ = pipe.read_to_string(&mut buf);
                buf
            })
        });

        let pid = child.id();
        self.lock().insert(pid, child);
        debug!(pid, %command, "Spawned");

        let status = self.wait_for(pid);
        let stderr = stderr
            .and_then(|h| h.join().ok())
            .unwrap_or_default();

        match status {
            None => Err(failed("halted before completion".into()).into()),
            Some(Err(e)) => Err(failed(e.to_string()).into()),
            Some(Ok(status)) if status.success() => Ok(()),
            Some(Ok(status)) => {
                let detail = stderr.trim();
                let reason = if detail.is_empty() {
                    format!("exited with {status}")
                } else {
                    format!("exited with {status}: {detail}")
                };
                Err(failed(reason).into())
            }
        }
    }

    fn halt_all(&self) -> RailgenResult<usize> {
        let children: Vec<(u32, Child)> = self.lock().drain().collect();
        let mut halted = 0;
        for (pid, mut child) in children {
            match child.kill() {
                Ok(()) => {
                    let _ = child.wait();
                    halted += 1;
                    debug!(pid, "Halted child process");
                }
                // Already exited between the last poll and now.
                Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => {
                    let _ = child.wait();
                }
                Err(e) => {
                    warn!(pid, error = %e, "Could not halt child process");
                    return Err(ApplicationError::CommandFailed {
                        command: format!("kill {pid}"),
                        reason: e.to_string(),
                    }
                    .into());
                }
            }
        }
        Ok(halted)
    }
}
