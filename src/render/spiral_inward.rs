//! Clockwise rings from the border towards the middle.
//!
//! ```text
//! 1 → → → 2
//! ↑ 5 → 6 ↓
//! ↑ 8 ← 7 ↓
//! 4 ← ← ← 3
//! ```

use super::RenderingStrategy;
use super::surface::OutputSurface;
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default)]
pub struct PerpendicularSpiralInward;

impl RenderingStrategy for PerpendicularSpiralInward {
    fn name(&self) -> &'static str {
        "PerpendicularSpiralInward"
    }

    fn render(&mut self, surface: &mut dyn OutputSurface) -> Result<()> {
        let (width, height) = (surface.width(), surface.height());
        if width == 0 || height == 0 {
            return Ok(());
        }
        surface.move_to(0, 0)?;
        ring(surface, 0, 0, width - 1, height - 1)
    }
}

/// Print the border of the rectangle spanning `(left, top)` to
/// `(right, bottom)` inclusive, then recurse into its interior.
///
/// The cursor is expected at `(left, top)`.
fn ring(
    surface: &mut dyn OutputSurface,
    left: usize,
    top: usize,
    right: usize,
    bottom: usize,
) -> Result<()> {
    for x in left..=right {
        surface.print_at(x, top)?;
    }
    for y in top + 1..=bottom {
        surface.print_at(right, y)?;
    }
    // a single row has no separate bottom edge
    if bottom > top {
        for x in (left..right).rev() {
            surface.print_at(x, bottom)?;
        }
    }
    // a single column has no separate left edge
    if right > left {
        for y in (top + 1..bottom).rev() {
            surface.print_at(left, y)?;
        }
    }

    if right < left + 2 || bottom < top + 2 {
        return Ok(());
    }
    surface.move_to(left + 1, top + 1)?;
    ring(surface, left + 1, top + 1, right - 1, bottom - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{CharacterMock, OverprintPolicy};
    use crate::render::source::LineSource;
    use crate::render::surface::TextSurface;
    use pretty_assertions::assert_eq;

    fn spiral(lines: &[&str]) -> (Vec<String>, usize) {
        let source = LineSource::new(lines.iter());
        let mut mock = CharacterMock::new(source.width(), source.height(), OverprintPolicy::Strict);
        let mut surface = TextSurface::new(&mut mock, &source, OverprintPolicy::Strict);
        PerpendicularSpiralInward.render(&mut surface).unwrap();
        let count = surface.printed().count();
        (mock.canvas_lines(), count)
    }

    #[test]
    fn test_single_cell() {
        assert_eq!(spiral(&["x"]), (vec!["x".to_string()], 1));
    }

    #[test]
    fn test_single_row_and_column() {
        assert_eq!(spiral(&["abcde"]).0, vec!["abcde"]);
        assert_eq!(spiral(&["a", "b", "c"]).0, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_inner_column_left_over() {
        let lines = ["abc", "def", "ghi", "jkl", "mno"];
        assert_eq!(spiral(&lines), (lines.map(String::from).to_vec(), 15));
    }

    #[test]
    fn test_square() {
        let lines = ["abcd", "efgh", "ijkl", "mnop"];
        assert_eq!(spiral(&lines).0, lines.to_vec());
    }
}
