use std::fmt;

/// Servo position in whole degrees, always within `0..180`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Angle(u16);

impl Angle {
    pub const RANGE: u16 = 180;

    /// Wraps degrees into `0..180`. Negative input has no angle.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        if degrees < 0 {
            None
        } else {
            Some(Angle((degrees % i32::from(Self::RANGE)) as u16))
        }
    }

    pub fn degrees(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// What an invocation asks of the servo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Hold the pulse train for this angle until superseded.
    Hold(Angle),
    /// Negative angle: supersede any running worker and start nothing.
    Stop,
}

impl Request {
    pub fn parse(input: &str) -> Self {
        Self::from_degrees(parse_c_int(input))
    }

    pub fn from_degrees(degrees: i32) -> Self {
        match Angle::from_degrees(degrees) {
            Some(angle) => Request::Hold(angle),
            None => Request::Stop,
        }
    }
}

/// Parses an integer the way `(int)strtol(input, NULL, 0)` does.
///
/// Leading whitespace and an optional sign are accepted, `0x` selects base
/// 16 and a leading `0` base 8. Parsing stops at the first character that is
/// not a digit of the base; no digits at all gives 0. The result saturates to
/// the 64-bit `long` range and is then truncated to 32 bits.
pub fn parse_c_int(input: &str) -> i32 {
    let mut rest = input.trim_start_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r'));

    let negative = match rest.as_bytes().first() {
        Some(b'-') => {
            rest = &rest[1..];
            true
        }
        Some(b'+') => {
            rest = &rest[1..];
            false
        }
        _ => false,
    };

    let radix = {
        let bytes = rest.as_bytes();
        let hex_prefix = bytes.len() > 2
            && bytes[0] == b'0'
            && matches!(bytes[1], b'x' | b'X')
            && bytes[2].is_ascii_hexdigit();
        if hex_prefix {
            rest = &rest[2..];
            16
        } else if bytes.first() == Some(&b'0') {
            8
        } else {
            10
        }
    };

    const LIMIT: i128 = i64::MAX as i128 + 1;
    let magnitude = rest
        .chars()
        .map_while(|c| c.to_digit(radix))
        .fold(0i128, |acc, digit| {
            (acc * i128::from(radix) + i128::from(digit)).min(LIMIT)
        });

    let value = if negative { -magnitude } else { magnitude };
    let long = value.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64;
    long as i32
}
