use std::process::{Command, Stdio};

use anyhow::{Context, Result};

use crate::angle::{Angle, Request};
use crate::cli;
use crate::config::{Config, EXIT_POLL_INTERVAL};
use crate::instance::{self, InstanceRecord, ProcessControl, Supersession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    /// Nothing was started; any previous worker has been stopped.
    Stopped,
    /// A worker for the angle is running with this pid.
    Spawned { angle: Angle, pid: u32 },
}

/// Stops the previous worker, then starts a new one unless `request` is a
/// stop.
///
/// The previous worker's exit is confirmed before the new worker exists, so
/// the two never hold the line at once.
pub fn launch<P, S>(config: &Config, request: Request, processes: &mut P, spawn: S) -> Result<Launch>
where
    P: ProcessControl,
    S: FnOnce(&Config, Angle) -> Result<u32>,
{
    let record = InstanceRecord::new(&config.pid_file);
    match instance::supersede(&record, processes, EXIT_POLL_INTERVAL) {
        Supersession::Superseded(pid) => log::info!("Superseded worker {}", pid),
        Supersession::Denied(pid) => log::warn!("Worker {} may still be driving the line", pid),
        Supersession::FirstRun | Supersession::Stale(_) => {}
    }

    match request {
        Request::Stop => {
            log::debug!("Negative angle, not starting a worker");
            Ok(Launch::Stopped)
        }
        Request::Hold(angle) => {
            let pid = spawn(config, angle)?;
            // Recorded here as well as by the worker itself, so the next
            // invocation finds it even if the worker has not got that far.
            if let Err(e) = record.write(pid) {
                log::warn!("{}", e);
            }
            log::info!("Worker {} started for {}", pid, angle);
            Ok(Launch::Spawned { angle, pid })
        }
    }
}

/// Starts this executable again as a detached worker.
pub fn spawn_worker(config: &Config, angle: Angle) -> Result<u32> {
    let exe = std::env::current_exe().context("Could not locate own executable")?;
    let child = Command::new(&exe)
        .args(cli::worker_args(config, angle))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .spawn()
        .with_context(|| format!("Could not start worker {}", exe.display()))?;
    Ok(child.id())
}
