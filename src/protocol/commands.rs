//! # Erika Device Commands
//!
//! Byte-level command builders for the Erika 3004 typewriter interface.
//!
//! ## Protocol Overview
//!
//! The typewriter speaks a single-byte protocol over a 1200 baud serial
//! line. There is no framing and no acknowledgement: every byte is either a
//! key code (see [`charset`](super::charset)) or one of the control bytes
//! below, some of which take one argument byte.
//!
//! | Hex     | Command                                   |
//! |---------|-------------------------------------------|
//! | `73`    | right half-step                           |
//! | `74`    | left half-step                            |
//! | `75`    | down half-step                            |
//! | `76`    | up half-step                              |
//! | `77`    | line break                                |
//! | `81`    | microstep down                            |
//! | `82`    | microstep up                              |
//! | `8B/8C` | correction mode off / on                  |
//! | `8D/8E` | reverse print off / on                    |
//! | `91/92` | keyboard echo off / on                    |
//! | `A5 n`  | horizontal microsteps, `n` two's complement |
//! | `AA n`  | alarm, `n` = duration / 20ms              |
//!
//! ## Step Granularity
//!
//! The motors are driven in half-steps: a whole character cell (or line)
//! takes two consecutive half-step bytes. Microsteps are a finer unit used
//! for pixel graphics and are not aligned with character cells.

use crate::error::{ErikaError, Result};

// ============================================================================
// CONTROL BYTES
// ============================================================================

/// Right half-step
pub const RIGHT_HALF_STEP: u8 = 0x73;

/// Left half-step
pub const LEFT_HALF_STEP: u8 = 0x74;

/// Down half-step (paper moves up)
pub const DOWN_HALF_STEP: u8 = 0x75;

/// Up half-step (paper moves down)
pub const UP_HALF_STEP: u8 = 0x76;

/// Line break: carriage return plus one line feed
pub const LINE_BREAK: u8 = 0x77;

/// Vertical microstep down
pub const MICROSTEP_DOWN: u8 = 0x81;

/// Vertical microstep up
pub const MICROSTEP_UP: u8 = 0x82;

pub const CORRECTION_MODE_OFF: u8 = 0x8B;
pub const CORRECTION_MODE_ON: u8 = 0x8C;

pub const REVERSE_PRINT_OFF: u8 = 0x8D;
pub const REVERSE_PRINT_ON: u8 = 0x8E;

pub const ECHO_OFF: u8 = 0x91;
pub const ECHO_ON: u8 = 0x92;

/// Horizontal microstep prefix, followed by a signed step count
pub const HORIZONTAL_MICROSTEPS: u8 = 0xA5;

/// Alarm prefix, followed by the encoded duration
pub const ALARM: u8 = 0xAA;

/// Largest rightward move a single `A5` command can carry
pub const MAX_MICROSTEPS_RIGHT: u32 = 127;

/// Largest leftward move a single `A5` command can carry
pub const MAX_MICROSTEPS_LEFT: u32 = 128;

/// Duration represented by one unit of the alarm argument (seconds)
pub const ALARM_QUANTUM_SECONDS: f32 = 0.02;

/// Longest alarm the single argument byte can express (seconds)
pub const MAX_ALARM_SECONDS: f32 = 5.1;

// ============================================================================
// DIRECTION
// ============================================================================

/// Cursor movement direction.
///
/// Each direction has a fixed half-step byte; the table never changes at
/// run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// The half-step control byte for this direction.
    #[inline]
    pub const fn half_step_code(self) -> u8 {
        match self {
            Direction::Up => UP_HALF_STEP,
            Direction::Down => DOWN_HALF_STEP,
            Direction::Left => LEFT_HALF_STEP,
            Direction::Right => RIGHT_HALF_STEP,
        }
    }

    /// The direction pointing the other way.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Unit offset `(dx, dy)` in page coordinates, y growing downwards.
    #[inline]
    pub const fn delta(self) -> (i64, i64) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

// ============================================================================
// MOVEMENT COMMANDS
// ============================================================================

/// # Whole-Step Move
///
/// Moves the cursor `steps` character cells (or lines) in `direction`.
///
/// ## Protocol Details
///
/// Each whole step is two half-step bytes:
///
/// ```
/// use erika::protocol::commands::{self, Direction};
///
/// assert_eq!(commands::full_steps(Direction::Right, 1), vec![0x73, 0x73]);
/// assert_eq!(commands::full_steps(Direction::Up, 2), vec![0x76; 4]);
/// ```
pub fn full_steps(direction: Direction, steps: usize) -> Vec<u8> {
    vec![direction.half_step_code(); steps * 2]
}

/// # Line Break (77)
///
/// Returns the carriage to column 0 and advances one line.
#[inline]
pub fn line_break() -> Vec<u8> {
    vec![LINE_BREAK]
}

/// # Single Microstep
///
/// Vertical microsteps have dedicated bytes (`81` down, `82` up).
/// Horizontal ones are expressed through the `A5` command with a count of
/// +1 or -1.
///
/// ```
/// use erika::protocol::commands::{self, Direction};
///
/// assert_eq!(commands::microstep(Direction::Down), vec![0x81]);
/// assert_eq!(commands::microstep(Direction::Left), vec![0xA5, 0xFF]);
/// ```
pub fn microstep(direction: Direction) -> Vec<u8> {
    match direction {
        Direction::Down => vec![MICROSTEP_DOWN],
        Direction::Up => vec![MICROSTEP_UP],
        Direction::Right => vec![HORIZONTAL_MICROSTEPS, 0x01],
        Direction::Left => vec![HORIZONTAL_MICROSTEPS, 0xFF],
    }
}

/// # Horizontal Microsteps (A5 n)
///
/// Moves the carriage `steps` microsteps, positive to the right.
///
/// ## Chunking
///
/// The argument is one signed byte, so its range is asymmetric: a single
/// command moves at most 127 steps right or 128 steps left. Larger moves
/// are split into several commands, each as large as allowed.
///
/// ```
/// use erika::protocol::commands;
///
/// assert_eq!(commands::horizontal_microsteps(-3), vec![0xA5, 0xFD]);
/// assert_eq!(
///     commands::horizontal_microsteps(130),
///     vec![0xA5, 0x7F, 0xA5, 0x03]
/// );
/// assert!(commands::horizontal_microsteps(0).is_empty());
/// ```
pub fn horizontal_microsteps(steps: i64) -> Vec<u8> {
    let mut data = Vec::new();
    let limit = if steps >= 0 {
        MAX_MICROSTEPS_RIGHT
    } else {
        MAX_MICROSTEPS_LEFT
    };
    let mut remaining = steps.unsigned_abs();

    while remaining > 0 {
        let chunk = remaining.min(u64::from(limit));
        remaining -= chunk;
        // chunk <= 128, so the signed value is always within -128..=127
        let signed = if steps >= 0 {
            chunk as i16
        } else {
            -(chunk as i16)
        };
        data.push(HORIZONTAL_MICROSTEPS);
        data.push(encode_twos_complement(signed));
    }

    data
}

// ============================================================================
// MODE COMMANDS
// ============================================================================

/// # Keyboard Echo (91 / 92)
///
/// With echo on, keys typed on the machine are printed as well as reported
/// over the serial line.
#[inline]
pub fn echo(enabled: bool) -> Vec<u8> {
    vec![if enabled { ECHO_ON } else { ECHO_OFF }]
}

/// # Correction Mode (8B / 8C)
///
/// While on, printed characters are struck through the correction ribbon,
/// lifting previously printed ink off the page.
#[inline]
pub fn correction_mode(enabled: bool) -> Vec<u8> {
    vec![if enabled {
        CORRECTION_MODE_ON
    } else {
        CORRECTION_MODE_OFF
    }]
}

/// # Reverse Print (8D / 8E)
#[inline]
pub fn reverse_print(enabled: bool) -> Vec<u8> {
    vec![if enabled {
        REVERSE_PRINT_ON
    } else {
        REVERSE_PRINT_OFF
    }]
}

/// # Alarm (AA n)
///
/// Sounds the built-in beeper for `seconds`.
///
/// ## Encoding
///
/// `n = round(seconds / 0.02)`, so the longest alarm is 5.1 seconds (`n = 255`).
///
/// ```
/// use erika::protocol::commands;
///
/// assert_eq!(commands::alarm(1.0).unwrap(), vec![0xAA, 50]);
/// assert_eq!(commands::alarm(5.1).unwrap(), vec![0xAA, 0xFF]);
/// assert!(commands::alarm(5.2).is_err());
/// ```
///
/// ## Errors
///
/// Returns [`ErikaError::Range`] for negative, non-finite or too long durations.
pub fn alarm(seconds: f32) -> Result<Vec<u8>> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(ErikaError::Range(format!(
            "Alarm duration {} is not a positive number",
            seconds
        )));
    }
    if seconds > MAX_ALARM_SECONDS {
        return Err(ErikaError::Range(format!(
            "Alarm duration {}s exceeds the maximum of {}s",
            seconds, MAX_ALARM_SECONDS
        )));
    }
    let units = (seconds / ALARM_QUANTUM_SECONDS).round().min(255.0) as u8;
    Ok(vec![ALARM, units])
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Encode `number` as an 8-bit two's complement byte.
///
/// Non-negative values encode as themselves; negative values as
/// `(0xFF ^ |n|) + 1`.
///
/// ```
/// use erika::protocol::commands::twos_complement;
///
/// assert_eq!(twos_complement(-1).unwrap(), 0xFF);
/// assert_eq!(twos_complement(-128).unwrap(), 0x80);
/// assert!(twos_complement(128).is_err());
/// ```
///
/// ## Errors
///
/// Returns [`ErikaError::Range`] outside `-128..=127`.
pub fn twos_complement(number: i32) -> Result<u8> {
    if number < -128 {
        return Err(ErikaError::Range(format!(
            "Number {} out of range (low)",
            number
        )));
    }
    if number > 127 {
        return Err(ErikaError::Range(format!(
            "Number {} out of range (high)",
            number
        )));
    }

    Ok(encode_twos_complement(number as i16))
}

/// Encoding step of [`twos_complement`]; `number` must already be in
/// `-128..=127`.
fn encode_twos_complement(number: i16) -> u8 {
    if number < 0 {
        let magnitude = number.unsigned_abs();
        ((0xFF ^ magnitude) + 1) as u8
    } else {
        number as u8
    }
}

/// Two's complement of `number` as an uppercase hex pair, e.g. `"D6"` for -42.
///
/// ## Errors
///
/// Same as [`twos_complement`].
pub fn twos_complement_hex(number: i32) -> Result<String> {
    Ok(format!("{:02X}", twos_complement(number)?))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twos_complement_positive() {
        assert_eq!(twos_complement(0).unwrap(), 0);
        assert_eq!(twos_complement(1).unwrap(), 1);
        assert_eq!(twos_complement(23).unwrap(), 0x17);
        assert_eq!(twos_complement(42).unwrap(), 0x2A);
        assert_eq!(twos_complement(127).unwrap(), 127);
    }

    #[test]
    fn test_twos_complement_negative() {
        assert_eq!(twos_complement(-1).unwrap(), 255);
        assert_eq!(twos_complement(-23).unwrap(), 233);
        assert_eq!(twos_complement(-42).unwrap(), 214);
        assert_eq!(twos_complement(-127).unwrap(), 129);
        assert_eq!(twos_complement(-128).unwrap(), 128);
    }

    #[test]
    fn test_twos_complement_out_of_range() {
        let high = twos_complement(128).unwrap_err();
        assert!(matches!(high, ErikaError::Range(_)));
        assert!(high.to_string().contains("high"));

        let low = twos_complement(-129).unwrap_err();
        assert!(matches!(low, ErikaError::Range(_)));
        assert!(low.to_string().contains("low"));
    }

    #[test]
    fn test_twos_complement_matches_native_cast() {
        for n in -128..=127 {
            assert_eq!(twos_complement(n).unwrap(), n as i8 as u8, "n = {}", n);
        }
    }

    #[test]
    fn test_twos_complement_hex() {
        assert_eq!(twos_complement_hex(0).unwrap(), "00");
        assert_eq!(twos_complement_hex(42).unwrap(), "2A");
        assert_eq!(twos_complement_hex(127).unwrap(), "7F");
        assert_eq!(twos_complement_hex(-1).unwrap(), "FF");
        assert_eq!(twos_complement_hex(-23).unwrap(), "E9");
        assert_eq!(twos_complement_hex(-42).unwrap(), "D6");
        assert_eq!(twos_complement_hex(-128).unwrap(), "80");
    }

    #[test]
    fn test_full_steps_double_pulse() {
        assert_eq!(full_steps(Direction::Right, 1), vec![0x73, 0x73]);
        assert_eq!(full_steps(Direction::Left, 1), vec![0x74, 0x74]);
        assert_eq!(full_steps(Direction::Down, 1), vec![0x75, 0x75]);
        assert_eq!(full_steps(Direction::Up, 3), vec![0x76; 6]);
        assert!(full_steps(Direction::Up, 0).is_empty());
    }

    #[test]
    fn test_microstep_codes() {
        assert_eq!(microstep(Direction::Down), vec![0x81]);
        assert_eq!(microstep(Direction::Up), vec![0x82]);
        assert_eq!(microstep(Direction::Right), vec![0xA5, 0x01]);
        assert_eq!(microstep(Direction::Left), vec![0xA5, 0xFF]);
    }

    #[test]
    fn test_horizontal_microsteps_right_chunks_at_127() {
        assert_eq!(horizontal_microsteps(127), vec![0xA5, 0x7F]);
        assert_eq!(horizontal_microsteps(128), vec![0xA5, 0x7F, 0xA5, 0x01]);
        assert_eq!(
            horizontal_microsteps(300),
            vec![0xA5, 0x7F, 0xA5, 0x7F, 0xA5, 0x2E]
        );
    }

    #[test]
    fn test_horizontal_microsteps_left_chunks_at_128() {
        assert_eq!(horizontal_microsteps(-1), vec![0xA5, 0xFF]);
        assert_eq!(horizontal_microsteps(-128), vec![0xA5, 0x80]);
        assert_eq!(horizontal_microsteps(-129), vec![0xA5, 0x80, 0xA5, 0xFF]);
        assert_eq!(
            horizontal_microsteps(-300),
            vec![0xA5, 0x80, 0xA5, 0x80, 0xA5, 0xD4]
        );
    }

    #[test]
    fn test_horizontal_microsteps_zero_is_noop() {
        assert!(horizontal_microsteps(0).is_empty());
    }

    #[test]
    fn test_horizontal_microsteps_chunks_are_twos_complement() {
        for steps in [-300i64, -129, -128, -5, 1, 99, 127, 128, 255] {
            let limit = if steps < 0 { 128 } else { 127 };
            let mut expected = Vec::new();
            let mut remaining = steps.abs();
            while remaining > 0 {
                let chunk = remaining.min(limit);
                remaining -= chunk;
                let signed = if steps < 0 { -chunk } else { chunk };
                expected.push(HORIZONTAL_MICROSTEPS);
                expected.push(twos_complement(signed as i32).unwrap());
            }
            assert_eq!(horizontal_microsteps(steps), expected, "steps = {}", steps);
        }
    }

    #[test]
    fn test_alarm_encoding() {
        assert_eq!(alarm(0.0).unwrap(), vec![0xAA, 0x00]);
        assert_eq!(alarm(0.02).unwrap(), vec![0xAA, 0x01]);
        assert_eq!(alarm(0.5).unwrap(), vec![0xAA, 25]);
        assert_eq!(alarm(5.1).unwrap(), vec![0xAA, 0xFF]);
    }

    #[test]
    fn test_alarm_out_of_range() {
        assert!(matches!(alarm(5.11), Err(ErikaError::Range(_))));
        assert!(matches!(alarm(-0.1), Err(ErikaError::Range(_))));
        assert!(matches!(alarm(f32::NAN), Err(ErikaError::Range(_))));
    }

    #[test]
    fn test_mode_toggles() {
        assert_eq!(echo(false), vec![0x91]);
        assert_eq!(echo(true), vec![0x92]);
        assert_eq!(correction_mode(false), vec![0x8B]);
        assert_eq!(correction_mode(true), vec![0x8C]);
        assert_eq!(reverse_print(false), vec![0x8D]);
        assert_eq!(reverse_print(true), vec![0x8E]);
        assert_eq!(line_break(), vec![0x77]);
    }

    #[test]
    fn test_direction_opposite_and_delta() {
        for dir in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            let (dx, dy) = dir.delta();
            let (ox, oy) = dir.opposite().delta();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
    }
}
