//! # Device Mocks
//!
//! In-memory stand-ins for the typewriter that record printing and
//! movement on a 2D canvas, so rendering code can be checked without paper.
//!
//! ```text
//!     x
//!     ===>
//!  y ||
//!    ||
//!    \/
//! ```
//!
//! The cursor may wander off the canvas (strategies sometimes park it below
//! the last line); only printing there is an error.

use std::collections::VecDeque;

use super::Device;
use crate::error::{ErikaError, Result};
use crate::protocol::commands::{self, Direction};

/// What to do when a cell that already holds ink is printed again.
///
/// There is deliberately no `Default`: each mock is told explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverprintPolicy {
    /// Fail with [`ErikaError::Overprint`]
    Strict,
    /// Log a warning and print anyway
    Lenient,
}

impl OverprintPolicy {
    /// Apply the policy to an overprint at `(x, y)`.
    pub(crate) fn check(self, x: usize, y: usize) -> Result<()> {
        match self {
            OverprintPolicy::Strict => Err(ErikaError::Overprint { x, y }),
            OverprintPolicy::Lenient => {
                tracing::warn!("overprinting ({}, {})", x, y);
                Ok(())
            }
        }
    }
}

/// Shared cursor bookkeeping for both mocks.
#[derive(Debug, Clone, Copy, Default)]
struct Cursor {
    x: i64,
    y: i64,
}

impl Cursor {
    fn step(&mut self, direction: Direction, steps: i64) {
        let (dx, dy) = direction.delta();
        self.x += dx * steps;
        self.y += dy * steps;
    }

    fn cell(&self, width: usize, height: usize) -> Result<(usize, usize)> {
        let out = || ErikaError::OutOfPage {
            x: self.x,
            y: self.y,
        };
        let x = usize::try_from(self.x).map_err(|_| out())?;
        let y = usize::try_from(self.y).map_err(|_| out())?;
        if x >= width || y >= height {
            return Err(out());
        }
        Ok((x, y))
    }
}

/// Frame canvas rows with `#` for debugging output.
fn framed(width: usize, rows: impl Iterator<Item = String>) -> String {
    let border = format!(" {}\n", "#".repeat(width));
    let mut out = border.clone();
    for row in rows {
        out.push('#');
        out.push_str(&row);
        out.push_str("#\n");
    }
    out.push_str(&border);
    out
}

// ============================================================================
// CHARACTER MOCK
// ============================================================================

/// Character-cell canvas. Whole-step moves and text printing only.
#[derive(Debug, Clone)]
pub struct CharacterMock {
    width: usize,
    height: usize,
    canvas: Vec<Vec<char>>,
    cursor: Cursor,
    policy: OverprintPolicy,
    correction_mode: bool,
    keyboard_echo: bool,
    input: VecDeque<char>,
}

impl CharacterMock {
    pub fn new(width: usize, height: usize, policy: OverprintPolicy) -> Self {
        Self {
            width,
            height,
            canvas: vec![vec![' '; width]; height],
            cursor: Cursor::default(),
            policy,
            correction_mode: false,
            keyboard_echo: false,
            input: VecDeque::new(),
        }
    }

    /// Queue keys to be returned by [`Device::read`].
    pub fn with_input(mut self, keys: &str) -> Self {
        self.input.extend(keys.chars());
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Cursor position in cells.
    pub fn position(&self) -> (i64, i64) {
        (self.cursor.x, self.cursor.y)
    }

    pub fn keyboard_echo(&self) -> bool {
        self.keyboard_echo
    }

    /// Character at `(x, y)`, `' '` for blank cells.
    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        self.canvas.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Canvas rows as strings.
    pub fn canvas_lines(&self) -> Vec<String> {
        self.canvas.iter().map(|row| row.iter().collect()).collect()
    }

    /// The canvas framed with `#`, for eyeballing results.
    pub fn render_canvas(&self) -> String {
        framed(self.width, self.canvas_lines().into_iter())
    }

    fn strike(&mut self, ch: char) -> Result<()> {
        if ch == ' ' {
            self.cursor.x += 1;
            return Ok(());
        }
        let (x, y) = self.cursor.cell(self.width, self.height)?;
        let cell = &mut self.canvas[y][x];
        if self.correction_mode {
            *cell = ' ';
        } else {
            if *cell != ' ' {
                self.policy.check(x, y)?;
            }
            *cell = ch;
        }
        self.cursor.x += 1;
        Ok(())
    }
}

impl Device for CharacterMock {
    fn print_text(&mut self, text: &str) -> Result<()> {
        for ch in text.chars() {
            if ch == '\n' {
                self.crlf()?;
            } else {
                self.strike(ch)?;
            }
        }
        Ok(())
    }

    fn move_cursor(&mut self, direction: Direction, steps: usize) -> Result<()> {
        self.cursor.step(direction, steps as i64);
        Ok(())
    }

    fn crlf(&mut self) -> Result<()> {
        self.cursor.x = 0;
        self.cursor.y += 1;
        Ok(())
    }

    fn microstep(&mut self, _direction: Direction) -> Result<()> {
        Err(microsteps_unsupported())
    }

    fn move_horizontal_microsteps(&mut self, _steps: i64) -> Result<()> {
        Err(microsteps_unsupported())
    }

    fn print_pixel(&mut self) -> Result<()> {
        Err(microsteps_unsupported())
    }

    fn alarm(&mut self, seconds: f32) -> Result<()> {
        commands::alarm(seconds).map(|_| ())
    }

    fn set_keyboard_echo(&mut self, enabled: bool) -> Result<()> {
        self.keyboard_echo = enabled;
        Ok(())
    }

    fn set_correction_mode(&mut self, enabled: bool) -> Result<()> {
        self.correction_mode = enabled;
        Ok(())
    }

    fn set_reverse_print(&mut self, _enabled: bool) -> Result<()> {
        Ok(())
    }

    fn read(&mut self) -> Result<String> {
        self.input
            .pop_front()
            .map(|ch| ch.to_string())
            .ok_or_else(|| ErikaError::Transport("No more keys queued".to_string()))
    }
}

fn microsteps_unsupported() -> ErikaError {
    ErikaError::Protocol("Character mock does not support microsteps".to_string())
}

// ============================================================================
// MICROSTEP MOCK
// ============================================================================

/// Pixel canvas addressed in microsteps.
///
/// Whole-step moves cover `char_width` microsteps horizontally and one
/// line vertically; printed text is recorded as dots.
#[derive(Debug, Clone)]
pub struct MicrostepMock {
    width: usize,
    height: usize,
    canvas: Vec<Vec<bool>>,
    cursor: Cursor,
    policy: OverprintPolicy,
    char_width: i64,
}

impl MicrostepMock {
    pub fn new(width: usize, height: usize, policy: OverprintPolicy) -> Self {
        Self {
            width,
            height,
            canvas: vec![vec![false; width]; height],
            cursor: Cursor::default(),
            policy,
            char_width: 1,
        }
    }

    /// Set how many microsteps a whole horizontal step covers.
    pub fn with_char_width(mut self, microsteps: u32) -> Self {
        self.char_width = i64::from(microsteps.max(1));
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn position(&self) -> (i64, i64) {
        (self.cursor.x, self.cursor.y)
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.canvas
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(false)
    }

    /// Canvas rows with `X` for dots and `' '` for blank paper.
    pub fn canvas_lines(&self) -> Vec<String> {
        self.canvas
            .iter()
            .map(|row| row.iter().map(|&set| if set { 'X' } else { ' ' }).collect())
            .collect()
    }

    pub fn render_canvas(&self) -> String {
        framed(self.width, self.canvas_lines().into_iter())
    }
}

impl Device for MicrostepMock {
    fn print_text(&mut self, text: &str) -> Result<()> {
        for ch in text.chars() {
            match ch {
                '\n' => self.crlf()?,
                ' ' => self.cursor.x += 1,
                _ => self.print_pixel()?,
            }
        }
        Ok(())
    }

    fn move_cursor(&mut self, direction: Direction, steps: usize) -> Result<()> {
        let scale = match direction {
            Direction::Left | Direction::Right => self.char_width,
            Direction::Up | Direction::Down => 1,
        };
        self.cursor.step(direction, steps as i64 * scale);
        Ok(())
    }

    fn crlf(&mut self) -> Result<()> {
        self.cursor.x = 0;
        self.cursor.y += 1;
        Ok(())
    }

    fn microstep(&mut self, direction: Direction) -> Result<()> {
        self.cursor.step(direction, 1);
        Ok(())
    }

    fn move_horizontal_microsteps(&mut self, steps: i64) -> Result<()> {
        self.cursor.x += steps;
        Ok(())
    }

    fn print_pixel(&mut self) -> Result<()> {
        let (x, y) = self.cursor.cell(self.width, self.height)?;
        if self.canvas[y][x] {
            self.policy.check(x, y)?;
        }
        self.canvas[y][x] = true;
        self.cursor.x += 1;
        Ok(())
    }

    fn alarm(&mut self, seconds: f32) -> Result<()> {
        commands::alarm(seconds).map(|_| ())
    }

    fn set_keyboard_echo(&mut self, _enabled: bool) -> Result<()> {
        Ok(())
    }

    fn set_correction_mode(&mut self, _enabled: bool) -> Result<()> {
        Ok(())
    }

    fn set_reverse_print(&mut self, _enabled: bool) -> Result<()> {
        Ok(())
    }

    fn read(&mut self) -> Result<String> {
        Err(ErikaError::Protocol(
            "Microstep mock has no keyboard".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_and_read_back_characters() {
        let mut mock = CharacterMock::new(5, 3, OverprintPolicy::Strict);
        mock.print_text("Hello").unwrap();
        mock.move_down().unwrap();
        mock.move_down().unwrap();
        mock.move_left().unwrap();
        mock.move_left().unwrap();
        mock.move_left().unwrap();
        mock.print_text("!").unwrap();
        mock.move_up().unwrap();
        mock.move_left().unwrap();
        mock.move_left().unwrap();
        mock.move_left().unwrap();
        mock.print_text("World").unwrap();
        assert_eq!(mock.canvas_lines(), vec!["Hello", "World", "  !  "]);
    }

    #[test]
    fn test_write_and_read_back_microsteps() {
        let mut mock = MicrostepMock::new(5, 3, OverprintPolicy::Strict);
        mock.print_pixel().unwrap();
        mock.move_right_microsteps(1).unwrap();
        mock.print_pixel().unwrap();
        mock.move_right_microsteps(1).unwrap();
        mock.print_pixel().unwrap();
        mock.move_left_microsteps(1).unwrap();

        mock.move_down_microstep().unwrap();
        mock.move_left_microsteps(3).unwrap();
        mock.print_pixel().unwrap();
        mock.move_right_microsteps(1).unwrap();
        mock.print_pixel().unwrap();
        mock.move_left_microsteps(1).unwrap();

        mock.move_down_microstep().unwrap();
        mock.move_right_microsteps(1).unwrap();
        mock.print_pixel().unwrap();
        mock.move_left_microsteps(3).unwrap();
        mock.print_pixel().unwrap();
        mock.move_left_microsteps(3).unwrap();
        mock.print_pixel().unwrap();
        mock.move_left_microsteps(1).unwrap();

        mock.move_up_microstep().unwrap();
        mock.move_right_microsteps(2).unwrap();
        mock.print_pixel().unwrap();
        mock.move_left_microsteps(1).unwrap();

        assert_eq!(mock.canvas_lines(), vec!["X X X", " XXX ", "X X X"]);
    }

    #[test]
    fn test_strict_overprint_fails() {
        let mut mock = CharacterMock::new(3, 1, OverprintPolicy::Strict);
        mock.print_text("a").unwrap();
        mock.move_left().unwrap();
        let err = mock.print_text("b").unwrap_err();
        assert!(matches!(err, ErikaError::Overprint { x: 0, y: 0 }));
        assert_eq!(mock.canvas_lines(), vec!["a  "]);
    }

    #[test]
    fn test_lenient_overprint_replaces() {
        let mut mock = CharacterMock::new(3, 1, OverprintPolicy::Lenient);
        mock.print_text("a").unwrap();
        mock.move_left().unwrap();
        mock.print_text("b").unwrap();
        assert_eq!(mock.canvas_lines(), vec!["b  "]);
    }

    #[test]
    fn test_space_never_overprints() {
        let mut mock = CharacterMock::new(3, 1, OverprintPolicy::Strict);
        mock.print_text("abc").unwrap();
        mock.move_cursor(Direction::Left, 3).unwrap();
        mock.print_text("   ").unwrap();
        assert_eq!(mock.canvas_lines(), vec!["abc"]);
    }

    #[test]
    fn test_correction_mode_erases() {
        let mut mock = CharacterMock::new(3, 1, OverprintPolicy::Strict);
        mock.print_text("abc").unwrap();
        mock.move_left().unwrap();
        mock.set_correction_mode(true).unwrap();
        mock.print_text("c").unwrap();
        mock.set_correction_mode(false).unwrap();
        assert_eq!(mock.canvas_lines(), vec!["ab "]);
    }

    #[test]
    fn test_print_off_page_fails() {
        let mut mock = CharacterMock::new(2, 1, OverprintPolicy::Strict);
        mock.print_text("ab").unwrap();
        assert!(matches!(
            mock.print_text("c"),
            Err(ErikaError::OutOfPage { x: 2, y: 0 })
        ));
        mock.move_cursor(Direction::Down, 5).unwrap();
        assert_eq!(mock.position(), (2, 5));
    }

    #[test]
    fn test_newline_in_text_is_crlf() {
        let mut mock = CharacterMock::new(2, 2, OverprintPolicy::Strict);
        mock.print_text("ab\ncd").unwrap();
        assert_eq!(mock.canvas_lines(), vec!["ab", "cd"]);
    }

    #[test]
    fn test_character_mock_rejects_microsteps() {
        let mut mock = CharacterMock::new(2, 2, OverprintPolicy::Strict);
        assert!(matches!(mock.print_pixel(), Err(ErikaError::Protocol(_))));
        assert!(matches!(mock.move_down_microstep(), Err(ErikaError::Protocol(_))));
        assert!(matches!(mock.move_up_microstep(), Err(ErikaError::Protocol(_))));
        assert_eq!(mock.position(), (0, 0));
    }

    #[test]
    fn test_microstep_mock_has_no_keyboard() {
        let mut mock = MicrostepMock::new(1, 1, OverprintPolicy::Strict);
        assert!(matches!(mock.read(), Err(ErikaError::Protocol(_))));
    }

    #[test]
    fn test_alarm_range_checked() {
        let mut mock = CharacterMock::new(1, 1, OverprintPolicy::Strict);
        assert!(mock.alarm(1.0).is_ok());
        assert!(matches!(mock.alarm(10.0), Err(ErikaError::Range(_))));
    }

    #[test]
    fn test_read_and_echo() {
        let mut mock = CharacterMock::new(1, 1, OverprintPolicy::Strict).with_input("ok");
        mock.set_keyboard_echo(true).unwrap();
        assert!(mock.keyboard_echo());
        assert_eq!(mock.read().unwrap(), "o");
        assert_eq!(mock.read().unwrap(), "k");
        assert!(mock.read().is_err());
    }

    #[test]
    fn test_microstep_pixel_overprint() {
        let mut mock = MicrostepMock::new(2, 1, OverprintPolicy::Strict);
        mock.print_pixel().unwrap();
        mock.move_left_microsteps(1).unwrap();
        assert!(matches!(mock.print_pixel(), Err(ErikaError::Overprint { x: 0, y: 0 })));
    }

    #[test]
    fn test_microstep_whole_steps_scale() {
        let mut mock = MicrostepMock::new(30, 3, OverprintPolicy::Strict).with_char_width(10);
        mock.move_right().unwrap();
        mock.move_down().unwrap();
        assert_eq!(mock.position(), (10, 1));
    }

    #[test]
    fn test_render_canvas_frame() {
        let mut mock = CharacterMock::new(2, 1, OverprintPolicy::Strict);
        mock.print_text("hi").unwrap();
        assert_eq!(mock.render_canvas(), " ##\n#hi#\n ##\n");
    }
}
