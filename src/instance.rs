//! Single-instance handover.
//!
//! The running worker keeps its pid in an instance record. A new invocation
//! interrupts that pid and waits for it to exit before a new worker is
//! started, which is what keeps two workers from ever driving the line at the
//! same time. Two invocations started concurrently can still race.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ServoError;

pub type Pid = libc::pid_t;

/// File holding the pid of the active worker as one ASCII line.
#[derive(Debug, Clone)]
pub struct InstanceRecord {
    path: PathBuf,
}

impl InstanceRecord {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        InstanceRecord { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pid of the previous worker. A missing or unparsable record means there
    /// is none.
    pub fn read(&self) -> Option<Pid> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => parse_pid(&contents),
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    log::debug!("Ignoring unreadable instance record {}: {}", self.path.display(), e);
                }
                None
            }
        }
    }

    pub fn write(&self, pid: u32) -> Result<(), ServoError> {
        std::fs::write(&self.path, format!("{}\n", pid)).map_err(|source| {
            ServoError::InstanceRecord {
                path: self.path.clone(),
                source,
            }
        })
    }
}

// Leading whitespace, optional sign, then decimal digits up to the first
// non-digit.
fn parse_pid(contents: &str) -> Option<Pid> {
    let trimmed = contents.trim_start();
    let sign_len = usize::from(trimmed.starts_with(['-', '+']));
    let digits_len = trimmed[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return None;
    }
    trimmed[..sign_len + digits_len].parse().ok()
}

pub trait ProcessControl {
    /// Sends the interrupt signal to `pid`.
    fn interrupt(&mut self, pid: Pid) -> io::Result<()>;
    fn has_exited(&mut self, pid: Pid) -> io::Result<bool>;
}

/// Process control through the kernel.
#[derive(Debug, Default)]
pub struct OsProcesses;

impl ProcessControl for OsProcesses {
    fn interrupt(&mut self, pid: Pid) -> io::Result<()> {
        if unsafe { libc::kill(pid, libc::SIGINT) } == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    fn has_exited(&mut self, pid: Pid) -> io::Result<bool> {
        // Reap it if it happens to be our child; anything else is probed.
        if unsafe { libc::waitpid(pid, std::ptr::null_mut(), libc::WNOHANG) } == pid {
            return Ok(true);
        }
        if unsafe { libc::kill(pid, 0) } == 0 {
            // A zombie nobody reaps still answers kill(0).
            return Ok(is_zombie(pid));
        }
        let err = io::Error::last_os_error();
        match err.raw_os_error() {
            Some(libc::ESRCH) => Ok(true),
            Some(libc::EPERM) => Ok(false),
            _ => Err(err),
        }
    }
}

/// Whether `/proc/<pid>/stat` reports the process as a zombie.
fn is_zombie(pid: Pid) -> bool {
    std::fs::read_to_string(format!("/proc/{}/stat", pid))
        .ok()
        .and_then(|stat| parse_stat_state(&stat))
        == Some('Z')
}

// The state follows the parenthesised command name, which may itself
// contain spaces or parentheses.
fn parse_stat_state(stat: &str) -> Option<char> {
    let (_, rest) = stat.rsplit_once(')')?;
    rest.trim_start().chars().next()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Supersession {
    /// No previous worker on record.
    FirstRun,
    /// The recorded worker is already gone, or the pid could never be ours.
    Stale(Pid),
    /// The recorded worker was interrupted and has exited.
    Superseded(Pid),
    /// The recorded process exists but may not be signalled.
    Denied(Pid),
}

/// Interrupts the worker named by `record` and blocks until it is gone.
///
/// The wait has no timeout.
pub fn supersede<P: ProcessControl>(
    record: &InstanceRecord,
    processes: &mut P,
    poll: Duration,
) -> Supersession {
    let Some(pid) = record.read() else {
        log::debug!("No previous instance in {}", record.path().display());
        return Supersession::FirstRun;
    };

    // kill(0) and kill(-n) address process groups.
    if pid <= 0 || pid == std::process::id() as Pid {
        log::warn!("Ignoring instance record pid {}", pid);
        return Supersession::Stale(pid);
    }

    if let Err(e) = processes.interrupt(pid) {
        return match e.raw_os_error() {
            Some(libc::ESRCH) => {
                log::debug!("Previous instance {} already exited", pid);
                Supersession::Stale(pid)
            }
            _ => {
                log::warn!("Could not interrupt previous instance {}: {}", pid, e);
                Supersession::Denied(pid)
            }
        };
    }

    log::info!("Waiting for previous instance {} to exit", pid);
    loop {
        match processes.has_exited(pid) {
            Ok(true) => break,
            Ok(false) => std::thread::sleep(poll),
            Err(e) => {
                log::warn!("Lost track of previous instance {}: {}", pid, e);
                break;
            }
        }
    }
    log::info!("Previous instance {} exited", pid);
    Supersession::Superseded(pid)
}
