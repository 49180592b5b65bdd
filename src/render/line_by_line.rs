//! Row after row, top to bottom.

use super::RenderingStrategy;
use super::surface::OutputSurface;
use crate::error::Result;

/// Print each row whole, then break the line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineByLine;

impl RenderingStrategy for LineByLine {
    fn name(&self) -> &'static str {
        "LineByLine"
    }

    fn render(&mut self, surface: &mut dyn OutputSurface) -> Result<()> {
        for y in 0..surface.height() {
            surface.print_line_at(y)?;
            surface.newline()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{CharacterMock, OverprintPolicy};
    use crate::render::source::LineSource;
    use crate::render::surface::TextSurface;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prints_rows_in_order() {
        let source = LineSource::new(["abc", "de", "f"]);
        let mut mock = CharacterMock::new(3, 3, OverprintPolicy::Strict);
        let mut surface = TextSurface::new(&mut mock, &source, OverprintPolicy::Strict);
        LineByLine.render(&mut surface).unwrap();
        assert_eq!(surface.position(), (0, 3));
        assert_eq!(mock.canvas_lines(), vec!["abc", "de ", "f  "]);
    }
}
