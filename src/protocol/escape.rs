//! # ANSI Escape Sequence Decoder
//!
//! Splits a text buffer into printable characters and CSI sequences
//! (`ESC [ <params> <final>`), and dispatches each to an
//! [`EscapeSequenceHandler`].
//!
//! Only the fixed command set below is understood. Any other escape marker
//! makes the *whole* buffer fail with [`ErikaError::Protocol`] before a single
//! call is dispatched: silently skipping an unknown sequence would leave the
//! tracked cursor out of sync with the paper.
//!
//! | Final | Command                    | Default |
//! |-------|----------------------------|---------|
//! | `A`   | cursor up                  | 1       |
//! | `B`   | cursor down                | 1       |
//! | `C`   | cursor forward             | 1       |
//! | `D`   | cursor back                | 1       |
//! | `E`   | cursor next line           | 1       |
//! | `F`   | cursor previous line       | 1       |
//! | `G`   | cursor horizontal absolute | 1       |
//! | `H`   | cursor position            | 1;1     |
//! | `f`   | horizontal vertical position | 1;1   |
//! | `J`   | erase in display           | 0       |
//! | `K`   | erase in line              | 0       |
//! | `S`   | scroll up                  | 1       |
//! | `T`   | scroll down                | 1       |
//! | `m`   | select graphic rendition   | 0       |
//! | `i`   | AUX port (`4` off, `5` on) | none    |
//! | `n`   | device status report       | 6       |
//! | `s`   | save cursor position       |         |
//! | `u`   | restore cursor position    |         |
//!
//! Decoding allocates nothing: parameters live in a fixed-size [`Params`].

use std::fmt;
use std::str::Chars;

use crate::error::{ErikaError, Result};

/// Escape character
pub const ESC: char = '\x1B';

/// Maximum number of parameters in one sequence
pub const MAX_PARAMS: usize = 16;

/// AUX port parameter: port off
pub const AUX_PORT_OFF: u16 = 4;

/// AUX port parameter: port on
pub const AUX_PORT_ON: u16 = 5;

// ============================================================================
// COMMANDS
// ============================================================================

/// Supported CSI commands, keyed by final byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsiCommand {
    CursorUp,
    CursorDown,
    CursorForward,
    CursorBack,
    CursorNextLine,
    CursorPreviousLine,
    CursorHorizontalAbsolute,
    CursorPosition,
    HorizontalVerticalPosition,
    EraseInDisplay,
    EraseInLine,
    ScrollUp,
    ScrollDown,
    SelectGraphicRendition,
    AuxPort,
    DeviceStatusReport,
    SaveCursorPosition,
    RestoreCursorPosition,
}

impl CsiCommand {
    /// Look up a command by its final byte.
    pub fn from_final_byte(byte: char) -> Option<Self> {
        let command = match byte {
            'A' => CsiCommand::CursorUp,
            'B' => CsiCommand::CursorDown,
            'C' => CsiCommand::CursorForward,
            'D' => CsiCommand::CursorBack,
            'E' => CsiCommand::CursorNextLine,
            'F' => CsiCommand::CursorPreviousLine,
            'G' => CsiCommand::CursorHorizontalAbsolute,
            'H' => CsiCommand::CursorPosition,
            'f' => CsiCommand::HorizontalVerticalPosition,
            'J' => CsiCommand::EraseInDisplay,
            'K' => CsiCommand::EraseInLine,
            'S' => CsiCommand::ScrollUp,
            'T' => CsiCommand::ScrollDown,
            'm' => CsiCommand::SelectGraphicRendition,
            'i' => CsiCommand::AuxPort,
            'n' => CsiCommand::DeviceStatusReport,
            's' => CsiCommand::SaveCursorPosition,
            'u' => CsiCommand::RestoreCursorPosition,
            _ => return None,
        };
        Some(command)
    }

    pub fn final_byte(self) -> char {
        match self {
            CsiCommand::CursorUp => 'A',
            CsiCommand::CursorDown => 'B',
            CsiCommand::CursorForward => 'C',
            CsiCommand::CursorBack => 'D',
            CsiCommand::CursorNextLine => 'E',
            CsiCommand::CursorPreviousLine => 'F',
            CsiCommand::CursorHorizontalAbsolute => 'G',
            CsiCommand::CursorPosition => 'H',
            CsiCommand::HorizontalVerticalPosition => 'f',
            CsiCommand::EraseInDisplay => 'J',
            CsiCommand::EraseInLine => 'K',
            CsiCommand::ScrollUp => 'S',
            CsiCommand::ScrollDown => 'T',
            CsiCommand::SelectGraphicRendition => 'm',
            CsiCommand::AuxPort => 'i',
            CsiCommand::DeviceStatusReport => 'n',
            CsiCommand::SaveCursorPosition => 's',
            CsiCommand::RestoreCursorPosition => 'u',
        }
    }

    /// Value used for an absent parameter.
    pub fn default_param(self) -> u16 {
        match self {
            CsiCommand::EraseInDisplay
            | CsiCommand::EraseInLine
            | CsiCommand::SelectGraphicRendition
            | CsiCommand::AuxPort
            | CsiCommand::SaveCursorPosition
            | CsiCommand::RestoreCursorPosition => 0,
            CsiCommand::DeviceStatusReport => 6,
            _ => 1,
        }
    }
}

// ============================================================================
// PARAMETERS
// ============================================================================

/// `;`-separated parameter list. Empty entries are kept as `None` so that
/// the command's own default can be applied.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Params {
    values: [Option<u16>; MAX_PARAMS],
    len: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self::new()
    }
}

impl Params {
    pub fn new() -> Self {
        Params {
            values: [None; MAX_PARAMS],
            len: 0,
        }
    }

    fn push(&mut self, value: Option<u16>) -> Result<()> {
        if self.len == MAX_PARAMS {
            return Err(ErikaError::Protocol(format!(
                "More than {} parameters in escape sequence",
                MAX_PARAMS
            )));
        }
        self.values[self.len] = value;
        self.len += 1;
        Ok(())
    }

    /// Number of parameter slots, including empty ones.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The parameter at `index`, `None` if absent or empty.
    pub fn get(&self, index: usize) -> Option<u16> {
        if index < self.len {
            self.values[index]
        } else {
            None
        }
    }

    pub fn get_or(&self, index: usize, default: u16) -> u16 {
        self.get(index).unwrap_or(default)
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<u16>> + '_ {
        self.values[..self.len].iter().copied()
    }
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

// ============================================================================
// PARSED SEQUENCE
// ============================================================================

/// One decoded CSI sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedEscapeSequence {
    pub command: CsiCommand,
    pub params: Params,
}

impl ParsedEscapeSequence {
    /// Parameter `index` with the command's default applied.
    pub fn param(&self, index: usize) -> u16 {
        self.params.get_or(index, self.command.default_param())
    }

    /// Check command-specific parameter constraints.
    fn validate(&self) -> Result<()> {
        if self.command == CsiCommand::AuxPort {
            if self.params.len() != 1 {
                return Err(ErikaError::Protocol(format!(
                    "AUX port takes exactly one parameter, got {:?}",
                    self.params
                )));
            }
            let value = self.param(0);
            if value != AUX_PORT_ON && value != AUX_PORT_OFF {
                return Err(ErikaError::Protocol(format!(
                    "Unsupported AUX port parameter {}",
                    value
                )));
            }
        }
        Ok(())
    }

    /// Invoke the matching handler operation.
    pub fn dispatch<H: EscapeSequenceHandler + ?Sized>(&self, handler: &mut H) -> Result<()> {
        match self.command {
            CsiCommand::CursorUp => handler.cursor_up(self.param(0)),
            CsiCommand::CursorDown => handler.cursor_down(self.param(0)),
            CsiCommand::CursorForward => handler.cursor_forward(self.param(0)),
            CsiCommand::CursorBack => handler.cursor_back(self.param(0)),
            CsiCommand::CursorNextLine => handler.cursor_next_line(self.param(0)),
            CsiCommand::CursorPreviousLine => handler.cursor_previous_line(self.param(0)),
            CsiCommand::CursorHorizontalAbsolute => {
                handler.cursor_horizontal_absolute(self.param(0))
            }
            CsiCommand::CursorPosition | CsiCommand::HorizontalVerticalPosition => {
                handler.cursor_position(self.param(0), self.param(1))
            }
            CsiCommand::EraseInDisplay => handler.erase_in_display(self.param(0)),
            CsiCommand::EraseInLine => handler.erase_in_line(self.param(0)),
            CsiCommand::ScrollUp => handler.scroll_up(self.param(0)),
            CsiCommand::ScrollDown => handler.scroll_down(self.param(0)),
            CsiCommand::SelectGraphicRendition => {
                let mut codes = [0u16; MAX_PARAMS];
                let count = self.params.len().max(1);
                for (slot, value) in codes.iter_mut().zip(self.params.iter()) {
                    *slot = value.unwrap_or(0);
                }
                handler.select_graphic_rendition(&codes[..count])
            }
            CsiCommand::AuxPort => handler.aux_port(self.param(0) == AUX_PORT_ON),
            CsiCommand::DeviceStatusReport => handler.device_status_report(),
            CsiCommand::SaveCursorPosition => handler.save_cursor_position(),
            CsiCommand::RestoreCursorPosition => handler.restore_cursor_position(),
        }
    }
}

impl fmt::Display for ParsedEscapeSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ESC[")?;
        for (i, value) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ";")?;
            }
            if let Some(value) = value {
                write!(f, "{}", value)?;
            }
        }
        write!(f, "{}", self.command.final_byte())
    }
}

// ============================================================================
// HANDLER
// ============================================================================

/// Receiver of decoded text.
///
/// Cursor arguments follow ANSI conventions: counts for relative moves,
/// 1-based rows and columns for absolute ones. Commands without a
/// mechanical meaning have default implementations that log and ignore.
pub trait EscapeSequenceHandler {
    fn print_character(&mut self, ch: char) -> Result<()>;
    fn cursor_up(&mut self, n: u16) -> Result<()>;
    fn cursor_down(&mut self, n: u16) -> Result<()>;
    fn cursor_forward(&mut self, n: u16) -> Result<()>;
    fn cursor_back(&mut self, n: u16) -> Result<()>;
    fn cursor_next_line(&mut self, n: u16) -> Result<()>;
    fn cursor_previous_line(&mut self, n: u16) -> Result<()>;
    fn cursor_horizontal_absolute(&mut self, column: u16) -> Result<()>;
    fn cursor_position(&mut self, row: u16, column: u16) -> Result<()>;
    fn save_cursor_position(&mut self) -> Result<()>;
    fn restore_cursor_position(&mut self) -> Result<()>;

    fn erase_in_display(&mut self, mode: u16) -> Result<()> {
        tracing::debug!("ignoring erase in display ({})", mode);
        Ok(())
    }

    fn erase_in_line(&mut self, mode: u16) -> Result<()> {
        tracing::debug!("ignoring erase in line ({})", mode);
        Ok(())
    }

    fn scroll_up(&mut self, n: u16) -> Result<()> {
        tracing::debug!("ignoring scroll up ({})", n);
        Ok(())
    }

    fn scroll_down(&mut self, n: u16) -> Result<()> {
        tracing::debug!("ignoring scroll down ({})", n);
        Ok(())
    }

    fn select_graphic_rendition(&mut self, codes: &[u16]) -> Result<()> {
        tracing::debug!("ignoring graphic rendition {:?}", codes);
        Ok(())
    }

    fn aux_port(&mut self, on: bool) -> Result<()> {
        tracing::debug!("ignoring AUX port {}", if on { "on" } else { "off" });
        Ok(())
    }

    fn device_status_report(&mut self) -> Result<()> {
        tracing::debug!("ignoring device status report");
        Ok(())
    }
}

// ============================================================================
// TOKENIZER
// ============================================================================

/// One element of decoded text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Char(char),
    Sequence(ParsedEscapeSequence),
}

/// Iterator over the [`Token`]s of a text buffer.
///
/// Yields an error for the first malformed or unsupported sequence and
/// stops afterwards.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    chars: Chars<'a>,
    failed: bool,
}

/// Tokenize `text` without dispatching anything.
pub fn tokens(text: &str) -> Tokens<'_> {
    Tokens {
        chars: text.chars(),
        failed: false,
    }
}

impl Tokens<'_> {
    fn parse_sequence(&mut self) -> Result<ParsedEscapeSequence> {
        match self.chars.next() {
            Some('[') => {}
            Some(other) => {
                return Err(ErikaError::Protocol(format!(
                    "Unsupported escape sequence ESC {:?}",
                    other
                )));
            }
            None => {
                return Err(ErikaError::Protocol(
                    "Unterminated escape sequence at end of input".to_string(),
                ));
            }
        }

        let mut params = Params::new();
        let mut current: Option<u16> = None;
        let mut seen_any = false;

        loop {
            let ch = self.chars.next().ok_or_else(|| {
                ErikaError::Protocol("Unterminated escape sequence at end of input".to_string())
            })?;
            match ch {
                '0'..='9' => {
                    let digit = u16::from(ch as u8 - b'0');
                    let value = current
                        .unwrap_or(0)
                        .checked_mul(10)
                        .and_then(|v| v.checked_add(digit))
                        .ok_or_else(|| {
                            ErikaError::Protocol("Escape sequence parameter too large".to_string())
                        })?;
                    current = Some(value);
                    seen_any = true;
                }
                ';' => {
                    params.push(current.take())?;
                    seen_any = true;
                }
                '\x40'..='\x7E' => {
                    if seen_any {
                        params.push(current.take())?;
                    }
                    let command = CsiCommand::from_final_byte(ch).ok_or_else(|| {
                        ErikaError::Protocol(format!("Unsupported escape sequence ESC[...{}", ch))
                    })?;
                    let sequence = ParsedEscapeSequence { command, params };
                    sequence.validate()?;
                    return Ok(sequence);
                }
                other => {
                    return Err(ErikaError::Protocol(format!(
                        "Unexpected {:?} inside escape sequence",
                        other
                    )));
                }
            }
        }
    }
}

impl Iterator for Tokens<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let ch = self.chars.next()?;
        if ch != ESC {
            return Some(Ok(Token::Char(ch)));
        }
        match self.parse_sequence() {
            Ok(sequence) => Some(Ok(Token::Sequence(sequence))),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Check that every escape marker in `text` starts a supported sequence.
///
/// ## Errors
///
/// Returns [`ErikaError::Protocol`] for the first unsupported sequence.
pub fn validate(text: &str) -> Result<()> {
    for token in tokens(text) {
        token?;
    }
    Ok(())
}

/// Validate `text`, then dispatch each character and sequence to `handler`.
///
/// Nothing is dispatched if validation fails.
///
/// ## Errors
///
/// Returns [`ErikaError::Protocol`] for unsupported input, or whatever the
/// handler returns.
pub fn decode<H: EscapeSequenceHandler + ?Sized>(text: &str, handler: &mut H) -> Result<()> {
    validate(text)?;
    for token in tokens(text) {
        match token? {
            Token::Char(ch) => handler.print_character(ch)?,
            Token::Sequence(sequence) => {
                tracing::debug!("escape sequence {}", sequence);
                sequence.dispatch(handler)?;
            }
        }
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every call as a readable string.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl EscapeSequenceHandler for Recorder {
        fn print_character(&mut self, ch: char) -> Result<()> {
            self.calls.push(format!("char {}", ch));
            Ok(())
        }
        fn cursor_up(&mut self, n: u16) -> Result<()> {
            self.calls.push(format!("up {}", n));
            Ok(())
        }
        fn cursor_down(&mut self, n: u16) -> Result<()> {
            self.calls.push(format!("down {}", n));
            Ok(())
        }
        fn cursor_forward(&mut self, n: u16) -> Result<()> {
            self.calls.push(format!("forward {}", n));
            Ok(())
        }
        fn cursor_back(&mut self, n: u16) -> Result<()> {
            self.calls.push(format!("back {}", n));
            Ok(())
        }
        fn cursor_next_line(&mut self, n: u16) -> Result<()> {
            self.calls.push(format!("next line {}", n));
            Ok(())
        }
        fn cursor_previous_line(&mut self, n: u16) -> Result<()> {
            self.calls.push(format!("previous line {}", n));
            Ok(())
        }
        fn cursor_horizontal_absolute(&mut self, column: u16) -> Result<()> {
            self.calls.push(format!("column {}", column));
            Ok(())
        }
        fn cursor_position(&mut self, row: u16, column: u16) -> Result<()> {
            self.calls.push(format!("position {} {}", row, column));
            Ok(())
        }
        fn save_cursor_position(&mut self) -> Result<()> {
            self.calls.push("save".to_string());
            Ok(())
        }
        fn restore_cursor_position(&mut self) -> Result<()> {
            self.calls.push("restore".to_string());
            Ok(())
        }
        fn erase_in_display(&mut self, mode: u16) -> Result<()> {
            self.calls.push(format!("erase display {}", mode));
            Ok(())
        }
        fn erase_in_line(&mut self, mode: u16) -> Result<()> {
            self.calls.push(format!("erase line {}", mode));
            Ok(())
        }
        fn select_graphic_rendition(&mut self, codes: &[u16]) -> Result<()> {
            self.calls.push(format!("sgr {:?}", codes));
            Ok(())
        }
        fn aux_port(&mut self, on: bool) -> Result<()> {
            self.calls.push(format!("aux {}", on));
            Ok(())
        }
    }

    fn decode_calls(text: &str) -> Result<Vec<String>> {
        let mut recorder = Recorder::default();
        decode(text, &mut recorder)?;
        Ok(recorder.calls)
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(decode_calls("Hi").unwrap(), vec!["char H", "char i"]);
    }

    #[test]
    fn test_sgr_then_text_then_move() {
        let calls = decode_calls("\x1B[31;1;4mHello\x1B[0m\x1B[10A").unwrap();
        assert_eq!(calls[0], "sgr [31, 1, 4]");
        assert_eq!(calls[1..6].join(","), "char H,char e,char l,char l,char o");
        assert_eq!(calls[6], "sgr [0]");
        assert_eq!(calls[7], "up 10");
    }

    #[test]
    fn test_default_params() {
        let calls = decode_calls("\x1B[A\x1B[B\x1B[C\x1B[D\x1B[E\x1B[F\x1B[G").unwrap();
        assert_eq!(
            calls,
            vec![
                "up 1",
                "down 1",
                "forward 1",
                "back 1",
                "next line 1",
                "previous line 1",
                "column 1"
            ]
        );
        assert_eq!(decode_calls("\x1B[J\x1B[K").unwrap(), vec!["erase display 0", "erase line 0"]);
        assert_eq!(decode_calls("\x1B[m").unwrap(), vec!["sgr [0]"]);
    }

    #[test]
    fn test_cursor_position_partial_params() {
        assert_eq!(decode_calls("\x1B[H").unwrap(), vec!["position 1 1"]);
        assert_eq!(decode_calls("\x1B[5H").unwrap(), vec!["position 5 1"]);
        assert_eq!(decode_calls("\x1B[;7H").unwrap(), vec!["position 1 7"]);
        assert_eq!(decode_calls("\x1B[3;4f").unwrap(), vec!["position 3 4"]);
    }

    #[test]
    fn test_save_restore() {
        assert_eq!(decode_calls("\x1B[s\x1B[u").unwrap(), vec!["save", "restore"]);
    }

    #[test]
    fn test_aux_port() {
        assert_eq!(decode_calls("\x1B[5i\x1B[4i").unwrap(), vec!["aux true", "aux false"]);
        assert!(matches!(decode_calls("\x1B[6i"), Err(ErikaError::Protocol(_))));
        assert!(matches!(decode_calls("\x1B[i"), Err(ErikaError::Protocol(_))));
        assert!(matches!(decode_calls("\x1B[4;5i"), Err(ErikaError::Protocol(_))));
    }

    #[test]
    fn test_unsupported_sequence_fails_before_dispatch() {
        let mut recorder = Recorder::default();
        let err = decode("abc\x1B[10Adef\x1B[?25h", &mut recorder).unwrap_err();
        assert!(matches!(err, ErikaError::Protocol(_)));
        assert!(recorder.calls.is_empty());
    }

    #[test]
    fn test_unknown_final_byte_fails() {
        assert!(matches!(decode_calls("\x1B[2X"), Err(ErikaError::Protocol(_))));
    }

    #[test]
    fn test_bare_escape_fails() {
        assert!(validate("abc\x1B").is_err());
        assert!(validate("\x1Bc").is_err());
        assert!(validate("\x1B[12").is_err());
    }

    #[test]
    fn test_parameter_overflow_fails() {
        assert!(validate("\x1B[99999A").is_err());
    }

    #[test]
    fn test_tokens_and_display() {
        let collected: Vec<Token> = tokens("a\x1B[2;B").map(|t| t.unwrap()).collect();
        assert_eq!(collected.len(), 2);
        assert_eq!(collected[0], Token::Char('a'));
        match collected[1] {
            Token::Sequence(seq) => {
                assert_eq!(seq.command, CsiCommand::CursorDown);
                assert_eq!(seq.params.len(), 2);
                assert_eq!(seq.param(0), 2);
                assert_eq!(seq.param(1), 1);
                assert_eq!(seq.to_string(), "ESC[2;B");
            }
            Token::Char(_) => panic!("expected a sequence"),
        }
    }

    #[test]
    fn test_final_byte_round_trip() {
        for byte in "ABCDEFGHJKSTfmins u".chars().filter(|c| *c != ' ') {
            let command = CsiCommand::from_final_byte(byte).unwrap();
            assert_eq!(command.final_byte(), byte);
        }
    }
}
