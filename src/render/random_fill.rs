//! Cells in random order.
//!
//! Plain rejection sampling: draw a coordinate, skip it if it was already
//! printed. Slow for the last few cells of a big grid, which does not
//! matter next to the speed of the typewriter.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::RenderingStrategy;
use super::printed::PrintedMap;
use super::surface::OutputSurface;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct RandomDotFill {
    rng: StdRng,
}

impl RandomDotFill {
    /// Seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible visiting order.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomDotFill {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderingStrategy for RandomDotFill {
    fn name(&self) -> &'static str {
        "RandomDotFill"
    }

    fn render(&mut self, surface: &mut dyn OutputSurface) -> Result<()> {
        let (width, height) = (surface.width(), surface.height());
        if width == 0 || height == 0 {
            return Ok(());
        }
        let mut printed = PrintedMap::new(width, height);
        while !printed.is_complete() {
            let x = self.rng.random_range(0..width);
            let y = self.rng.random_range(0..height);
            if printed.insert(x, y) {
                surface.move_to(x, y)?;
                surface.print_at(x, y)?;
            }
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

    fn fill(seed: u64) -> Vec<String> {
        let source = LineSource::new(["abcd", "efgh", "ijkl"]);
        let mut mock = CharacterMock::new(4, 3, OverprintPolicy::Strict);
        let mut surface = TextSurface::new(&mut mock, &source, OverprintPolicy::Strict);
        RandomDotFill::with_seed(seed).render(&mut surface).unwrap();
        mock.canvas_lines()
    }

    #[test]
    fn test_covers_grid_for_any_seed() {
        for seed in [0, 1, 42, 1234] {
            assert_eq!(fill(seed), vec!["abcd", "efgh", "ijkl"]);
        }
    }

    #[test]
    fn test_empty_grid() {
        let source = LineSource::default();
        let mut mock = CharacterMock::new(0, 0, OverprintPolicy::Strict);
        let mut surface = TextSurface::new(&mut mock, &source, OverprintPolicy::Strict);
        RandomDotFill::with_seed(7).render(&mut surface).unwrap();
        assert_eq!(surface.position(), (0, 0));
    }
}
