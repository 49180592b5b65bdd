//! # Rendering Module
//!
//! Puts text or images on paper in a chosen order. Every strategy visits
//! each cell of the content exactly once; they differ only in the path the
//! carriage takes, which on a typewriter is the whole show.
//!
//! ## Modules
//!
//! - [`source`]: text and image content
//! - [`surface`]: cursor-tracking facade over a [`Device`]
//! - [`printed`]: visited-cell bookkeeping
//! - the five strategies, listed in [`STRATEGIES`]
//!
//! ## Usage Example
//!
//! ```
//! use erika::device::{CharacterMock, OverprintPolicy};
//! use erika::render::{self, Content, source::LineSource};
//!
//! let content = Content::Text(LineSource::new(["ab", "cd"]));
//! let mut mock = CharacterMock::new(2, 2, OverprintPolicy::Strict);
//! let mut strategy = render::by_name("Interlaced").unwrap();
//!
//! render::render(&mut mock, &content, strategy.as_mut(), OverprintPolicy::Strict)?;
//! assert_eq!(mock.canvas_lines(), vec!["ab", "cd"]);
//! # Ok::<(), erika::error::ErikaError>(())
//! ```

pub mod archimedean;
pub mod interlaced;
pub mod line_by_line;
pub mod printed;
pub mod random_fill;
pub mod source;
pub mod spiral_inward;
pub mod surface;

pub use archimedean::ArchimedeanSpiralOutward;
pub use interlaced::Interlaced;
pub use line_by_line::LineByLine;
pub use random_fill::RandomDotFill;
pub use source::{Bitmap, ImageSource, LineSource, ThresholdImage};
pub use spiral_inward::PerpendicularSpiralInward;
pub use surface::{ImageSurface, OutputSurface, TextSurface};

use crate::device::{Device, OverprintPolicy};
use crate::error::Result;

/// All available strategies, in display order.
pub const STRATEGIES: &[&str] = &[
    "LineByLine",
    "Interlaced",
    "PerpendicularSpiralInward",
    "RandomDotFill",
    "ArchimedeanSpiralOutward",
];

/// Order in which the cells of a surface are printed.
pub trait RenderingStrategy {
    /// Strategy name (e.g., "LineByLine").
    fn name(&self) -> &'static str;

    /// Print every cell of `surface` once.
    fn render(&mut self, surface: &mut dyn OutputSurface) -> Result<()>;
}

/// Get a strategy by name, with default parameters. Case-insensitive.
pub fn by_name(name: &str) -> Option<Box<dyn RenderingStrategy>> {
    match name.to_lowercase().as_str() {
        "linebyline" => Some(Box::new(LineByLine)),
        "interlaced" => Some(Box::new(Interlaced)),
        "perpendicularspiralinward" => Some(Box::new(PerpendicularSpiralInward)),
        "randomdotfill" => Some(Box::new(RandomDotFill::new())),
        "archimedeanspiraloutward" => Some(Box::new(ArchimedeanSpiralOutward::default())),
        _ => None,
    }
}

/// List all available strategy names.
pub fn list_strategies() -> &'static [&'static str] {
    STRATEGIES
}

/// What to render.
pub enum Content {
    /// Text, one typed character per cell
    Text(LineSource),
    /// Image, one microstep dot per pixel
    Image(Box<dyn ImageSource>),
}

impl Content {
    pub fn width(&self) -> usize {
        match self {
            Content::Text(lines) => lines.width(),
            Content::Image(image) => image.width(),
        }
    }

    pub fn height(&self) -> usize {
        match self {
            Content::Text(lines) => lines.height(),
            Content::Image(image) => image.height(),
        }
    }
}

impl std::fmt::Debug for Content {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Content::Text(_) => "Text",
            Content::Image(_) => "Image",
        };
        write!(f, "Content::{}({}x{})", kind, self.width(), self.height())
    }
}

/// Render `content` on `device` with `strategy`.
///
/// Text goes through a [`TextSurface`], images through an
/// [`ImageSurface`].
///
/// ## Errors
///
/// The first device error, or an overprint under
/// [`OverprintPolicy::Strict`], aborts the pass. Whatever was printed
/// before stays on the paper.
pub fn render<D: Device + ?Sized>(
    device: &mut D,
    content: &Content,
    strategy: &mut dyn RenderingStrategy,
    policy: OverprintPolicy,
) -> Result<()> {
    tracing::info!(
        "rendering {}x{} with {}",
        content.width(),
        content.height(),
        strategy.name()
    );
    match content {
        Content::Text(lines) => {
            let mut surface = TextSurface::new(device, lines, policy);
            strategy.render(&mut surface)
        }
        Content::Image(image) => {
            let mut surface = ImageSurface::new(device, image.as_ref(), policy);
            strategy.render(&mut surface)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name_covers_listing() {
        for name in list_strategies() {
            let strategy = by_name(name).unwrap();
            assert_eq!(strategy.name(), *name);
        }
    }

    #[test]
    fn test_by_name_ignores_case() {
        assert_eq!(by_name("linebyline").unwrap().name(), "LineByLine");
        assert_eq!(by_name("RANDOMDOTFILL").unwrap().name(), "RandomDotFill");
        assert!(by_name("Zigzag").is_none());
    }
}
