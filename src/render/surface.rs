//! # Output Surfaces
//!
//! A surface is a device paired with the content being rendered. It owns
//! the only record of where the cursor is, because the typewriter cannot
//! report its position, and it refuses (or tolerates, per
//! [`OverprintPolicy`]) printing a cell twice.
//!
//! ## Granularity
//!
//! | Surface          | One cell is        | `newline`                        |
//! |------------------|--------------------|----------------------------------|
//! | [`TextSurface`]  | a character        | device line break                |
//! | [`ImageSurface`] | one microstep      | back to column 0, microstep down |
//!
//! Strategies are written against [`OutputSurface`] and never see which
//! one they drive.

use super::printed::PrintedMap;
use super::source::{ImageSource, LineSource};
use crate::device::{Device, OverprintPolicy};
use crate::error::{ErikaError, Result};
use crate::protocol::Direction;

/// Position-tracking movement and printing interface used by strategies.
pub trait OutputSurface {
    /// Content width in cells.
    fn width(&self) -> usize;

    /// Content height in cells.
    fn height(&self) -> usize;

    /// Tracked cursor position in cells.
    fn position(&self) -> (i64, i64);

    /// Move `steps` cells in `direction`.
    fn step(&mut self, direction: Direction, steps: usize) -> Result<()>;

    /// Go to the start of the next row.
    fn newline(&mut self) -> Result<()>;

    /// Print the content cell `(x, y)`. The cursor is moved there first if
    /// it is elsewhere, and ends one cell to the right.
    fn print_at(&mut self, x: usize, y: usize) -> Result<()>;

    /// Print the whole row `y` starting from column 0. The cursor ends
    /// after the last column.
    fn print_line_at(&mut self, y: usize) -> Result<()>;

    fn move_left(&mut self) -> Result<()> {
        self.step(Direction::Left, 1)
    }

    fn move_right(&mut self) -> Result<()> {
        self.step(Direction::Right, 1)
    }

    fn move_up(&mut self) -> Result<()> {
        self.step(Direction::Up, 1)
    }

    fn move_down(&mut self) -> Result<()> {
        self.step(Direction::Down, 1)
    }

    /// Move to `(x, y)`, horizontal leg first.
    fn move_to(&mut self, x: usize, y: usize) -> Result<()> {
        let (cx, cy) = self.position();
        let dx = x as i64 - cx;
        let dy = y as i64 - cy;
        if dx != 0 {
            let direction = if dx < 0 { Direction::Left } else { Direction::Right };
            self.step(direction, dx.unsigned_abs() as usize)?;
        }
        if dy != 0 {
            let direction = if dy < 0 { Direction::Up } else { Direction::Down };
            self.step(direction, dy.unsigned_abs() as usize)?;
        }
        Ok(())
    }
}

/// Cursor and visited cells shared by both surfaces.
#[derive(Debug)]
struct Tracker {
    x: i64,
    y: i64,
    printed: PrintedMap,
    policy: OverprintPolicy,
}

impl Tracker {
    fn new(width: usize, height: usize, policy: OverprintPolicy) -> Self {
        Self {
            x: 0,
            y: 0,
            printed: PrintedMap::new(width, height),
            policy,
        }
    }

    fn step(&mut self, direction: Direction, steps: usize) {
        let (dx, dy) = direction.delta();
        self.x += dx * steps as i64;
        self.y += dy * steps as i64;
    }

    /// Record a print of `(x, y)`, applying the overprint policy.
    fn claim(&mut self, x: usize, y: usize) -> Result<()> {
        if x >= self.printed.width() || y >= self.printed.height() {
            return Err(ErikaError::OutOfPage {
                x: x as i64,
                y: y as i64,
            });
        }
        if !self.printed.insert(x, y) {
            self.policy.check(x, y)?;
        }
        Ok(())
    }

    fn is_at(&self, x: usize, y: usize) -> bool {
        self.x == x as i64 && self.y == y as i64
    }
}

// ============================================================================
// TEXT
// ============================================================================

/// Character-cell surface: one cell is one typed character.
#[derive(Debug)]
pub struct TextSurface<'a, D: Device + ?Sized> {
    device: &'a mut D,
    source: &'a LineSource,
    tracker: Tracker,
}

impl<'a, D: Device + ?Sized> TextSurface<'a, D> {
    pub fn new(device: &'a mut D, source: &'a LineSource, policy: OverprintPolicy) -> Self {
        let tracker = Tracker::new(source.width(), source.height(), policy);
        Self {
            device,
            source,
            tracker,
        }
    }

    /// Cells printed so far.
    pub fn printed(&self) -> &PrintedMap {
        &self.tracker.printed
    }
}

impl<D: Device + ?Sized> OutputSurface for TextSurface<'_, D> {
    fn width(&self) -> usize {
        self.source.width()
    }

    fn height(&self) -> usize {
        self.source.height()
    }

    fn position(&self) -> (i64, i64) {
        (self.tracker.x, self.tracker.y)
    }

    fn step(&mut self, direction: Direction, steps: usize) -> Result<()> {
        if steps == 0 {
            return Ok(());
        }
        self.device.move_cursor(direction, steps)?;
        self.tracker.step(direction, steps);
        Ok(())
    }

    fn newline(&mut self) -> Result<()> {
        self.device.crlf()?;
        self.tracker.x = 0;
        self.tracker.y += 1;
        Ok(())
    }

    fn print_at(&mut self, x: usize, y: usize) -> Result<()> {
        if !self.tracker.is_at(x, y) {
            self.move_to(x, y)?;
        }
        self.tracker.claim(x, y)?;
        let mut buffer = [0u8; 4];
        let ch = self.source.char_at(x, y);
        self.device.print_text(ch.encode_utf8(&mut buffer))?;
        self.tracker.x += 1;
        Ok(())
    }

    fn print_line_at(&mut self, y: usize) -> Result<()> {
        if !self.tracker.is_at(0, y) {
            self.move_to(0, y)?;
        }
        for x in 0..self.source.width() {
            self.tracker.claim(x, y)?;
        }
        self.device.print_text(&self.source.line(y))?;
        self.tracker.x = self.source.width() as i64;
        Ok(())
    }
}

// ============================================================================
// IMAGE
// ============================================================================

/// Microstep surface: one cell is one pixel, one microstep wide and high.
///
/// Unset pixels are stepped over so the physical carriage always stays in
/// step with the logical coordinates.
pub struct ImageSurface<'a, D: Device + ?Sized, I: ImageSource + ?Sized> {
    device: &'a mut D,
    image: &'a I,
    tracker: Tracker,
}

impl<'a, D: Device + ?Sized, I: ImageSource + ?Sized> ImageSurface<'a, D, I> {
    pub fn new(device: &'a mut D, image: &'a I, policy: OverprintPolicy) -> Self {
        let tracker = Tracker::new(image.width(), image.height(), policy);
        Self {
            device,
            image,
            tracker,
        }
    }

    pub fn printed(&self) -> &PrintedMap {
        &self.tracker.printed
    }
}

impl<D: Device + ?Sized, I: ImageSource + ?Sized> OutputSurface for ImageSurface<'_, D, I> {
    fn width(&self) -> usize {
        self.image.width()
    }

    fn height(&self) -> usize {
        self.image.height()
    }

    fn position(&self) -> (i64, i64) {
        (self.tracker.x, self.tracker.y)
    }

    fn step(&mut self, direction: Direction, steps: usize) -> Result<()> {
        if steps == 0 {
            return Ok(());
        }
        match direction {
            Direction::Left => self.device.move_horizontal_microsteps(-(steps as i64))?,
            Direction::Right => self.device.move_horizontal_microsteps(steps as i64)?,
            Direction::Up | Direction::Down => {
                for _ in 0..steps {
                    self.device.microstep(direction)?;
                }
            }
        }
        self.tracker.step(direction, steps);
        Ok(())
    }

    fn newline(&mut self) -> Result<()> {
        if self.tracker.x != 0 {
            self.device.move_horizontal_microsteps(-self.tracker.x)?;
        }
        self.device.microstep(Direction::Down)?;
        self.tracker.x = 0;
        self.tracker.y += 1;
        Ok(())
    }

    fn print_at(&mut self, x: usize, y: usize) -> Result<()> {
        if !self.tracker.is_at(x, y) {
            self.move_to(x, y)?;
        }
        self.tracker.claim(x, y)?;
        if self.image.is_pixel_set(x, y) {
            self.device.print_pixel()?;
        } else {
            self.device.move_horizontal_microsteps(1)?;
        }
        self.tracker.x += 1;
        Ok(())
    }

    fn print_line_at(&mut self, y: usize) -> Result<()> {
        for x in 0..self.image.width() {
            self.print_at(x, y)?;
        }
        Ok(())
    }
}
