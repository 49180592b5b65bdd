//! # Archimedean Spiral
//!
//! Starts in the middle of the content and winds outwards along
//! `r = a + b·t`, sampled at `t = i·step`:
//!
//! ```text
//! x = cx + (a + b·t)·cos(t)
//! y = cy + (a + b·t)·sin(t)
//! ```
//!
//! Each sample is floored to a cell. Samples off the content or on a cell
//! already printed are skipped.
//!
//! ## When to stop
//!
//! The spiral is done once it has left the content in all four diagonal
//! directions. Every revolution the angle passes through a window around
//! 45°, 135°, 225° and 315°; the first time a sample inside a window is off
//! the content, that direction counts as exited. On wide or tall content
//! the diagonals exit before the far ends of the long axis are reached, so
//! those cells are only picked up by the optional fill phase.
//!
//! ## Fill phase
//!
//! With `render_remaining` set, unprinted cells are then printed one by
//! one, always the one closest to the center (scan order on ties).

use std::f64::consts::{FRAC_PI_4, FRAC_PI_8, PI, TAU};

use super::RenderingStrategy;
use super::printed::PrintedMap;
use super::surface::OutputSurface;
use crate::error::{ErikaError, Result};

/// Angle between two samples.
pub const DEFAULT_STEP: f64 = PI / 64.0;

/// Radial distance between turns, in cells, is `TAU * b`.
pub const DEFAULT_B: f64 = 0.25;

pub const DEFAULT_A: f64 = 1.0;

/// Window centers: the four diagonals.
const DIAGONALS: [f64; 4] = [FRAC_PI_4, 3.0 * FRAC_PI_4, 5.0 * FRAC_PI_4, 7.0 * FRAC_PI_4];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchimedeanSpiralOutward {
    a: f64,
    b: f64,
    step: f64,
    render_remaining: bool,
}

impl Default for ArchimedeanSpiralOutward {
    fn default() -> Self {
        Self {
            a: DEFAULT_A,
            b: DEFAULT_B,
            step: DEFAULT_STEP,
            render_remaining: true,
        }
    }
}

impl ArchimedeanSpiralOutward {
    /// ## Errors
    ///
    /// Returns [`ErikaError::Range`] unless `a` is finite and `b` and
    /// `step` are finite and positive. Anything else would never leave
    /// the content.
    pub fn new(a: f64, b: f64, step: f64, render_remaining: bool) -> Result<Self> {
        if !a.is_finite() {
            return Err(ErikaError::Range(format!(
                "Spiral parameter a = {} is not finite",
                a
            )));
        }
        if !(b.is_finite() && b > 0.0) {
            return Err(ErikaError::Range(format!(
                "Spiral parameter b = {} must be positive",
                b
            )));
        }
        if !(step.is_finite() && step > 0.0) {
            return Err(ErikaError::Range(format!(
                "Spiral step = {} must be positive",
                step
            )));
        }
        Ok(Self {
            a,
            b,
            step,
            render_remaining,
        })
    }

    /// Turn the fill phase on or off.
    pub fn render_remaining(mut self, enabled: bool) -> Self {
        self.render_remaining = enabled;
        self
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Half-width of each diagonal window. Never narrower than half a
    /// step, so every revolution lands at least one sample inside.
    fn tolerance(&self) -> f64 {
        FRAC_PI_8.max(self.step / 2.0)
    }

    /// Cells visited by the spiral phase, in order, each at most once.
    pub fn path(&self, width: usize, height: usize) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        if width == 0 || height == 0 {
            return cells;
        }
        let (cx, cy) = center(width, height);
        let tolerance = self.tolerance();
        let mut visited = PrintedMap::new(width, height);
        let mut exited = [false; 4];

        let mut i: u64 = 0;
        while !exited.iter().all(|&e| e) {
            let t = i as f64 * self.step;
            i += 1;
            let r = self.a + self.b * t;
            let x = (cx + r * t.cos()).floor();
            let y = (cy + r * t.sin()).floor();
            let inside = x >= 0.0 && y >= 0.0 && x < width as f64 && y < height as f64;

            if inside {
                let (x, y) = (x as usize, y as usize);
                if visited.insert(x, y) {
                    cells.push((x, y));
                }
                continue;
            }

            let angle = t.rem_euclid(TAU);
            for (diagonal, exit) in DIAGONALS.iter().zip(exited.iter_mut()) {
                if angular_distance(angle, *diagonal) <= tolerance {
                    *exit = true;
                }
            }
        }
        tracing::debug!(
            "spiral covered {} of {} cells in {} samples",
            cells.len(),
            width * height,
            i
        );
        cells
    }
}

/// Distance between two angles going the short way round.
fn angular_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(TAU);
    d.min(TAU - d)
}

fn center(width: usize, height: usize) -> (f64, f64) {
    (width as f64 / 2.0, height as f64 / 2.0)
}

/// Closest unprinted cell to the center, measured from cell centers.
fn nearest_unprinted(printed: &PrintedMap) -> Option<(usize, usize)> {
    let (cx, cy) = center(printed.width(), printed.height());
    let mut best: Option<((usize, usize), f64)> = None;
    for (x, y) in printed.unprinted() {
        let dx = x as f64 + 0.5 - cx;
        let dy = y as f64 + 0.5 - cy;
        let distance = dx.hypot(dy);
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some(((x, y), distance));
        }
    }
    best.map(|(cell, _)| cell)
}

impl RenderingStrategy for ArchimedeanSpiralOutward {
    fn name(&self) -> &'static str {
        "ArchimedeanSpiralOutward"
    }

    fn render(&mut self, surface: &mut dyn OutputSurface) -> Result<()> {
        let (width, height) = (surface.width(), surface.height());
        let mut printed = PrintedMap::new(width, height);

        for (x, y) in self.path(width, height) {
            surface.print_at(x, y)?;
            printed.insert(x, y);
        }

        if self.render_remaining {
            while let Some((x, y)) = nearest_unprinted(&printed) {
                surface.print_at(x, y)?;
                printed.insert(x, y);
            }
        }

        surface.move_to(0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{CharacterMock, OverprintPolicy};
    use crate::render::source::LineSource;
    use crate::render::surface::TextSurface;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(ArchimedeanSpiralOutward::new(1.0, 0.0, 0.1, true).is_err());
        assert!(ArchimedeanSpiralOutward::new(1.0, -1.0, 0.1, true).is_err());
        assert!(ArchimedeanSpiralOutward::new(1.0, 1.0, 0.0, true).is_err());
        assert!(ArchimedeanSpiralOutward::new(f64::NAN, 1.0, 0.1, true).is_err());
        assert!(ArchimedeanSpiralOutward::new(0.5, 1.0, 0.1, false).is_ok());
    }

    #[test]
    fn test_path_starts_near_center_and_is_unique() {
        let spiral = ArchimedeanSpiralOutward::default();
        let path = spiral.path(20, 10);
        // t = 0: (10 + 1, 5)
        assert_eq!(path[0], (11, 5));
        let unique: HashSet<_> = path.iter().copied().collect();
        assert_eq!(unique.len(), path.len());
        assert!(path.iter().all(|&(x, y)| x < 20 && y < 10));
    }

    #[test]
    fn test_path_terminates_on_tiny_content() {
        let spiral = ArchimedeanSpiralOutward::default();
        assert!(spiral.path(1, 1).is_empty());
        assert!(spiral.path(0, 5).is_empty());
    }

    #[test]
    fn test_large_step_still_terminates() {
        let spiral = ArchimedeanSpiralOutward::new(1.0, 1.0, 2.0, false).unwrap();
        assert!(spiral.tolerance() >= 1.0);
        let _ = spiral.path(8, 8);
    }

    #[test]
    fn test_angular_distance_wraps() {
        let d = angular_distance(0.1, 7.0 * FRAC_PI_4);
        assert!((d - (FRAC_PI_4 + 0.1)).abs() < 1e-9);
        assert!((angular_distance(FRAC_PI_4, FRAC_PI_4)).abs() < 1e-12);
    }

    #[test]
    fn test_nearest_unprinted_prefers_center_then_scan_order() {
        let mut printed = PrintedMap::new(2, 2);
        // all four cells are equally far from (1, 1)
        assert_eq!(nearest_unprinted(&printed), Some((0, 0)));
        printed.insert(0, 0);
        assert_eq!(nearest_unprinted(&printed), Some((1, 0)));

        let printed = PrintedMap::new(3, 3);
        assert_eq!(nearest_unprinted(&printed), Some((1, 1)));
    }

    #[test]
    fn test_fill_completes_content_and_returns_home() {
        let source = LineSource::new(["abcde", "fghij", "klmno"]);
        let mut mock = CharacterMock::new(5, 3, OverprintPolicy::Strict);
        let mut surface = TextSurface::new(&mut mock, &source, OverprintPolicy::Strict);
        ArchimedeanSpiralOutward::default()
            .render(&mut surface)
            .unwrap();
        assert_eq!(surface.position(), (0, 0));
        assert_eq!(mock.canvas_lines(), vec!["abcde", "fghij", "klmno"]);
    }
}
