use anyhow::Result;
use embedded_hal::delay::DelayNs;

use crate::angle::Angle;
use crate::config::Config;
use crate::error::ServoError;
use crate::event::Termination;
use crate::gpio::GpioLine;
use crate::instance::InstanceRecord;
use crate::servo::{PulseInterval, Servo, ServoI};
use crate::{ServoLine, StdDelay};

/// Body of the detached worker process: claim the instance record, take the
/// line and pulse until SIGINT or SIGTERM arrives.
pub fn run(config: &Config, angle: Angle) -> Result<u64> {
    let termination = Termination::new();
    termination.install_signal_handlers()?;
    run_with(config, angle, GpioLine::acquire, &mut StdDelay, &termination)
}

/// [`run`] with the line acquisition, delay and termination supplied by the
/// caller. Nothing is written to a line before `acquire` has succeeded.
pub fn run_with<L, A, D>(
    config: &Config,
    angle: Angle,
    acquire: A,
    delay: &mut D,
    termination: &Termination,
) -> Result<u64>
where
    L: ServoLine,
    A: FnOnce(u8) -> Result<L, ServoError>,
    D: DelayNs,
{
    let record = InstanceRecord::new(&config.pid_file);
    let pid = std::process::id();
    match record.write(pid) {
        Ok(()) => log::debug!("Worker {} recorded in {}", pid, record.path().display()),
        Err(e) => log::warn!("{}", e),
    }

    let interval = PulseInterval::for_angle(angle);
    log::info!(
        "Rotating servo to {} (pulse {}/{} ns)",
        angle,
        interval.high_ns,
        interval.low_ns
    );

    let line = acquire(config.pin)?;
    drive(line, angle, delay, termination)
}

/// Pulses `line` for `angle` until termination, then returns it to input.
///
/// The line is returned to input on the error path as well.
pub fn drive<L: ServoLine, D: DelayNs>(
    line: L,
    angle: Angle,
    delay: &mut D,
    termination: &Termination,
) -> Result<u64> {
    let mut servo = Servo::new(line, angle);
    let cycles = servo.hold(delay, termination)?;
    servo.release()?;
    log::info!("Servo released after {} cycles", cycles);
    Ok(cycles)
}
