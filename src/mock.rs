// Test doubles for the servo line and the PWM delay.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, ErrorKind, ErrorType, OutputPin};

use crate::event::Termination;
use crate::ServoLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEvent {
    High,
    Low,
    Input,
}

/// Shared view of everything written to a [`MockLine`].
#[derive(Debug, Clone, Default)]
pub struct LineLog(Arc<Mutex<Vec<(Instant, LineEvent)>>>);

impl LineLog {
    fn push(&self, event: LineEvent) {
        self.0.lock().unwrap().push((Instant::now(), event));
    }

    pub fn kinds(&self) -> Vec<LineEvent> {
        self.0.lock().unwrap().iter().map(|(_, e)| *e).collect()
    }

    pub fn last(&self, kind: LineEvent) -> Option<Instant> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(_, e)| *e == kind)
            .map(|(at, _)| *at)
    }
}

#[derive(Debug)]
pub struct MockError;

impl digital::Error for MockError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

pub struct MockLine {
    log: LineLog,
    writes_left: Option<usize>,
}

impl MockLine {
    pub fn new() -> (Self, LineLog) {
        let log = LineLog::default();
        (
            MockLine {
                log: log.clone(),
                writes_left: None,
            },
            log,
        )
    }

    /// Level writes fail once `writes` of them have succeeded.
    pub fn failing_after(writes: usize) -> (Self, LineLog) {
        let (mut line, log) = Self::new();
        line.writes_left = Some(writes);
        (line, log)
    }

    fn write(&mut self, event: LineEvent) -> Result<(), MockError> {
        if let Some(left) = self.writes_left.as_mut() {
            if *left == 0 {
                return Err(MockError);
            }
            *left -= 1;
        }
        self.log.push(event);
        Ok(())
    }
}

impl ErrorType for MockLine {
    type Error = MockError;
}

impl OutputPin for MockLine {
    fn set_low(&mut self) -> Result<(), MockError> {
        self.write(LineEvent::Low)
    }

    fn set_high(&mut self) -> Result<(), MockError> {
        self.write(LineEvent::High)
    }
}

impl ServoLine for MockLine {
    fn set_input(&mut self) -> Result<(), MockError> {
        self.log.push(LineEvent::Input);
        Ok(())
    }
}

/// Records requested delays without sleeping, optionally requesting
/// termination after a number of them.
#[derive(Default)]
pub struct MockDelay {
    delays: Vec<u32>,
    stop: Option<(usize, Termination)>,
}

impl MockDelay {
    pub fn stop_after(delays: usize, termination: Termination) -> Self {
        MockDelay {
            delays: Vec::new(),
            stop: Some((delays, termination)),
        }
    }

    pub fn delays(&self) -> &[u32] {
        &self.delays
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delays.push(ns);
        if let Some((after, termination)) = &self.stop {
            if self.delays.len() >= *after {
                termination.request();
            }
        }
    }
}
