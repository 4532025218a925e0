use std::path::PathBuf;
use std::time::Duration;

// ** PULSE CALIBRATION ** //
// Calibrated against the BX1 servo on a ~20ms refresh cycle. All values are
// in microseconds and must not be adjusted without measuring on hardware.

/// Pulse interval at 0 degrees.
pub const ANGLE_ZERO: u32 = 630;
/// Subtracted from the high phase to account for the GPIO write latency.
pub const PROPAGATION_MARGIN: u32 = 410;
/// Total cycle the low phase is derived from.
pub const FREQUENCY_CONST: u32 = 19710;
/// Pulse interval added per degree.
pub const US_PER_DEGREE: u32 = 10;

// ** DEFAULTS ** //

pub const DEFAULT_PIN: u8 = 12;
pub const DEFAULT_PID_FILE: &str = "/tmp/servo_pid";

/// How often a superseded worker is probed while waiting for it to exit.
pub const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Runtime settings shared by the launcher and the worker it spawns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub pin: u8,
    pub pid_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pin: DEFAULT_PIN,
            pid_file: PathBuf::from(DEFAULT_PID_FILE),
        }
    }
}
