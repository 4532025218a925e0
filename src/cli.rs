use std::ffi::OsString;
use std::path::PathBuf;

use clap::{CommandFactory, Parser};

use crate::angle::{Angle, Request};
use crate::config::{Config, DEFAULT_PID_FILE, DEFAULT_PIN};

/// Hold a servo at an angle with software PWM.
///
/// A new invocation replaces the running one. A negative angle stops the
/// running servo without starting a new one.
#[derive(Debug, Parser)]
#[command(name = "bx1-servo", version)]
pub struct Args {
    /// Target angle in degrees (decimal, 0x hex or 0 octal); wraps at 180
    #[arg(allow_negative_numbers = true)]
    pub angle: String,

    /// GPIO line the servo signal is wired to
    #[arg(long, env = "SERVO_GPIO_PIN", default_value_t = DEFAULT_PIN)]
    pub pin: u8,

    /// Where the pid of the running worker is kept
    #[arg(long, env = "SERVO_PID_FILE", default_value = DEFAULT_PID_FILE)]
    pub pid_file: PathBuf,

    /// Run the pulse train in this process
    #[arg(long, hide = true)]
    pub worker: bool,
}

impl Args {
    pub fn config(&self) -> Config {
        Config {
            pin: self.pin,
            pid_file: self.pid_file.clone(),
        }
    }

    pub fn request(&self) -> Request {
        Request::parse(&self.angle)
    }

    pub fn usage() -> String {
        Self::command().render_usage().to_string()
    }
}

/// Arguments that start the detached worker for `angle`.
pub fn worker_args(config: &Config, angle: Angle) -> Vec<OsString> {
    vec![
        "--worker".into(),
        "--pin".into(),
        config.pin.to_string().into(),
        "--pid-file".into(),
        config.pid_file.clone().into_os_string(),
        angle.degrees().to_string().into(),
    ]
}
