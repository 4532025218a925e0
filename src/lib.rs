pub mod angle;
pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod gpio;
pub mod instance;
pub mod launcher;
pub mod servo;
pub mod worker;

#[cfg(test)]
pub(crate) mod mock;

pub use crate::angle::{Angle, Request};
pub use crate::config::Config;
pub use crate::error::ServoError;

use std::time::Duration;

use embedded_hal::delay::DelayNs;

/// A GPIO line the servo pulse train can be written to.
///
/// Besides driving the line high and low, the owner must be able to stop
/// driving it altogether, leaving the pin as an input.
pub trait ServoLine: embedded_hal::digital::OutputPin {
    fn set_input(&mut self) -> Result<(), Self::Error>;
}

/// Blocking delay backed by the OS scheduler.
///
/// Sleeps are best effort: overruns are not compensated, so each PWM cycle
/// can come out slightly longer than requested.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    #[inline]
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();
}
