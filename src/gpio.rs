use std::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use rppal::gpio::{Gpio, IoPin, Mode};

use crate::error::ServoError;
use crate::ServoLine;

/// Exclusive handle on one board GPIO line, configured as output.
///
/// Dropping the handle releases the GPIO context. The pin keeps whatever
/// mode it was last given, so callers return it to input first.
pub struct GpioLine {
    pin: IoPin,
}

impl GpioLine {
    pub fn acquire(number: u8) -> Result<Self, ServoError> {
        let acquisition = |source| ServoError::HardwareAcquisition {
            pin: number,
            source,
        };
        let gpio = Gpio::new().map_err(acquisition)?;
        let mut pin = gpio.get(number).map_err(acquisition)?.into_io(Mode::Output);
        pin.set_reset_on_drop(false);
        log::info!("GPIO {} acquired as output", number);
        Ok(GpioLine { pin })
    }
}

impl ErrorType for GpioLine {
    type Error = Infallible;
}

impl OutputPin for GpioLine {
    #[inline]
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.pin.set_low();
        Ok(())
    }

    #[inline]
    fn set_high(&mut self) -> Result<(), Infallible> {
        self.pin.set_high();
        Ok(())
    }
}

impl ServoLine for GpioLine {
    fn set_input(&mut self) -> Result<(), Infallible> {
        self.pin.set_mode(Mode::Input);
        log::info!("GPIO {} returned to input", self.pin.pin());
        Ok(())
    }
}
