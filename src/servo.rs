use crate::angle::Angle;
use crate::config::{ANGLE_ZERO, FREQUENCY_CONST, PROPAGATION_MARGIN, US_PER_DEGREE};
use crate::event::Termination;
use crate::ServoLine;
use anyhow::Result;
use embedded_hal::delay::DelayNs;

/// High and low phase of one PWM cycle, in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseInterval {
    pub high_ns: u32,
    pub low_ns: u32,
}

impl PulseInterval {
    /// Pulse interval in microseconds before the propagation margin is taken off.
    pub fn pulse_us(angle: Angle) -> u32 {
        u32::from(angle.degrees()) * US_PER_DEGREE + ANGLE_ZERO
    }

    pub fn for_angle(angle: Angle) -> Self {
        let interval = Self::pulse_us(angle);
        PulseInterval {
            high_ns: (interval - PROPAGATION_MARGIN) * 1000,
            low_ns: (FREQUENCY_CONST - interval) * 1000,
        }
    }
}

pub trait ServoI {
    /// Emits the pulse train until `termination` is requested and returns the
    /// number of completed cycles.
    fn hold<D: DelayNs>(&mut self, delay: &mut D, termination: &Termination) -> Result<u64>;
    fn release(&mut self) -> Result<()>;
}

/// Owns the servo line for as long as the pulse train runs. The line is put
/// back to input on release, or on drop if release was never reached.
pub struct Servo<L: ServoLine> {
    line: L,
    interval: PulseInterval,
    released: bool,
}

impl<L: ServoLine> Servo<L> {
    pub fn new(line: L, angle: Angle) -> Self {
        Servo {
            line,
            interval: PulseInterval::for_angle(angle),
            released: false,
        }
    }
}

impl<L: ServoLine> ServoI for Servo<L> {
    fn hold<D: DelayNs>(&mut self, delay: &mut D, termination: &Termination) -> Result<u64> {
        let mut cycles = 0u64;
        while !termination.is_requested() {
            if let Err(e) = self.line.set_high() {
                anyhow::bail!("Error driving servo line high: {:?}", e);
            }
            delay.delay_ns(self.interval.high_ns);
            if termination.is_requested() {
                break;
            }
            if let Err(e) = self.line.set_low() {
                anyhow::bail!("Error driving servo line low: {:?}", e);
            }
            delay.delay_ns(self.interval.low_ns);
            cycles += 1;
        }
        log::debug!("Servo::hold stopped after {} cycles", cycles);
        Ok(cycles)
    }

    fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        if let Err(e) = self.line.set_input() {
            anyhow::bail!("Error returning servo line to input: {:?}", e);
        }
        self.released = true;
        Ok(())
    }
}

impl<L: ServoLine> Drop for Servo<L> {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = self.line.set_input() {
                log::error!("Servo line left driving on drop: {:?}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{LineEvent, MockDelay, MockLine};

    fn angle(degrees: i32) -> Angle {
        Angle::from_degrees(degrees).unwrap()
    }

    #[test]
    fn interval_at_90_degrees() {
        assert_eq!(PulseInterval::pulse_us(angle(90)), 1530);
        let interval = PulseInterval::for_angle(angle(90));
        assert_eq!(interval.high_ns, 1_120_000);
        assert_eq!(interval.low_ns, 18_180_000);
    }

    #[test]
    fn interval_at_0_degrees() {
        assert_eq!(PulseInterval::pulse_us(angle(0)), 630);
        let interval = PulseInterval::for_angle(angle(0));
        assert_eq!(interval.high_ns, 220_000);
        assert_eq!(interval.low_ns, 19_080_000);
    }

    #[test]
    fn period_is_constant() {
        for degrees in 0..180 {
            let interval = PulseInterval::for_angle(angle(degrees));
            assert_eq!(interval.high_ns + interval.low_ns, 19_300_000);
        }
    }

    #[test]
    fn wrapped_angles_share_intervals() {
        for degrees in 180..720 {
            assert_eq!(
                PulseInterval::for_angle(angle(degrees)),
                PulseInterval::for_angle(angle(degrees % 180))
            );
        }
    }

    #[test]
    fn hold_alternates_until_terminated() {
        let (line, events) = MockLine::new();
        let termination = Termination::new();
        let mut delay = MockDelay::stop_after(6, termination.clone());
        let mut servo = Servo::new(line, angle(90));

        let cycles = servo.hold(&mut delay, &termination).unwrap();
        servo.release().unwrap();

        assert_eq!(cycles, 3);
        assert_eq!(
            delay.delays(),
            &[1_120_000, 18_180_000, 1_120_000, 18_180_000, 1_120_000, 18_180_000]
        );
        assert_eq!(
            events.kinds(),
            vec![
                LineEvent::High,
                LineEvent::Low,
                LineEvent::High,
                LineEvent::Low,
                LineEvent::High,
                LineEvent::Low,
                LineEvent::Input,
            ]
        );
    }

    #[test]
    fn termination_during_high_phase_skips_low_write() {
        let (line, events) = MockLine::new();
        let termination = Termination::new();
        let mut delay = MockDelay::stop_after(1, termination.clone());
        let mut servo = Servo::new(line, angle(0));

        assert_eq!(servo.hold(&mut delay, &termination).unwrap(), 0);
        drop(servo);

        assert_eq!(events.kinds(), vec![LineEvent::High, LineEvent::Input]);
    }

    #[test]
    fn already_terminated_emits_nothing() {
        let (line, events) = MockLine::new();
        let termination = Termination::new();
        termination.request();
        let mut servo = Servo::new(line, angle(45));

        assert_eq!(servo.hold(&mut MockDelay::default(), &termination).unwrap(), 0);
        servo.release().unwrap();

        assert_eq!(events.kinds(), vec![LineEvent::Input]);
    }

    #[test]
    fn release_is_idempotent() {
        let (line, events) = MockLine::new();
        let mut servo = Servo::new(line, angle(10));
        servo.release().unwrap();
        servo.release().unwrap();
        drop(servo);
        assert_eq!(events.kinds(), vec![LineEvent::Input]);
    }

    #[test]
    fn write_failure_still_releases_line() {
        let (line, events) = MockLine::failing_after(2);
        let termination = Termination::new();
        let mut servo = Servo::new(line, angle(120));

        assert!(servo.hold(&mut MockDelay::default(), &termination).is_err());
        drop(servo);

        assert_eq!(
            events.kinds(),
            vec![LineEvent::High, LineEvent::Low, LineEvent::Input]
        );
    }
}
