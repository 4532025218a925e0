use std::path::PathBuf;

use thiserror::Error;

/// Failures the launcher and worker report to the user.
///
/// Usage errors come straight from argument parsing. A stale instance record
/// and a negative angle are not errors and have no variant here.
#[derive(Debug, Error)]
pub enum ServoError {
    #[error("Failed to obtain GPIO context for pin {pin}: {source}")]
    HardwareAcquisition {
        pin: u8,
        #[source]
        source: rppal::gpio::Error,
    },

    #[error("Instance record {path}: {source}")]
    InstanceRecord {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not install handler for signal {signal}: {source}")]
    Signal {
        signal: i32,
        #[source]
        source: std::io::Error,
    },
}
