//! Even rows first, then odd rows.
//!
//! The typewriter only feeds paper forward in whole lines, so the even
//! pass leaves a blank line under every row it prints. The carriage then
//! rolls back up to row 1 and the odd pass fills those gaps:
//!
//! ```text
//! pass 1     pass 2
//! row 0      row 0
//!   .        row 1
//! row 2      row 2
//!   .        row 3
//! ```

use super::RenderingStrategy;
use super::surface::OutputSurface;
use crate::error::Result;
use crate::protocol::Direction;

#[derive(Debug, Clone, Copy, Default)]
pub struct Interlaced;

impl RenderingStrategy for Interlaced {
    fn name(&self) -> &'static str {
        "Interlaced"
    }

    fn render(&mut self, surface: &mut dyn OutputSurface) -> Result<()> {
        let height = surface.height();
        if height == 0 {
            return Ok(());
        }
        let mut advanced = 0usize;

        for y in (0..height).step_by(2) {
            surface.print_line_at(y)?;
            surface.newline()?;
            surface.newline()?;
            advanced += 2;
        }
        // the extra line break is not part of the way back up
        surface.newline()?;
        surface.step(Direction::Up, advanced)?;

        for y in (1..height).step_by(2) {
            surface.print_line_at(y)?;
            surface.newline()?;
            surface.newline()?;
        }
        Ok(())
    }
}
