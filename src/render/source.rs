//! # Content Sources
//!
//! What gets rendered: either lines of text (ASCII art), addressed in
//! character cells, or a bitmap image, addressed in pixels.
//!
//! Ragged text is treated as a rectangle: short lines are padded with
//! spaces up to the longest line.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use image::{DynamicImage, ImageReader};

use crate::error::{ErikaError, Result};

/// Default grayscale threshold: values at or below it count as ink.
pub const DEFAULT_THRESHOLD: u8 = 128;

// ============================================================================
// TEXT
// ============================================================================

/// Rectangular block of text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineSource {
    lines: Vec<Vec<char>>,
    width: usize,
}

impl LineSource {
    /// Build from lines; a trailing `\n` or `\r\n` on each line is dropped.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines: Vec<Vec<char>> = lines
            .into_iter()
            .map(|line| {
                let line = line.as_ref();
                let line = line.strip_suffix('\n').unwrap_or(line);
                let line = line.strip_suffix('\r').unwrap_or(line);
                line.chars().collect()
            })
            .collect();
        let width = lines.iter().map(Vec::len).max().unwrap_or(0);
        Self { lines, width }
    }

    /// Split a string into lines.
    pub fn parse(text: &str) -> Self {
        Self::new(text.lines())
    }

    /// Read all lines from `reader`.
    ///
    /// ## Errors
    ///
    /// Returns [`ErikaError::Io`] on read failure or invalid UTF-8.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let lines = reader.lines().collect::<std::io::Result<Vec<_>>>()?;
        Ok(Self::new(lines))
    }

    /// Read all lines from a file.
    ///
    /// ## Errors
    ///
    /// Returns [`ErikaError::Io`] if the file cannot be read.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(BufReader::new(File::open(path.as_ref())?))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.lines.len()
    }

    /// Character at `(x, y)`; padding cells are spaces.
    pub fn char_at(&self, x: usize, y: usize) -> char {
        self.lines
            .get(y)
            .and_then(|line| line.get(x))
            .copied()
            .unwrap_or(' ')
    }

    /// Row `y`, padded to the full width.
    pub fn line(&self, y: usize) -> String {
        (0..self.width).map(|x| self.char_at(x, y)).collect()
    }
}

// ============================================================================
// IMAGES
// ============================================================================

/// A bitmap whose pixels are either set (ink) or not.
pub trait ImageSource {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn is_pixel_set(&self, x: usize, y: usize) -> bool;
}

/// Image loaded with the `image` crate and thresholded on gray level.
///
/// A pixel is set when its gray value is `<= threshold`, i.e. dark pixels
/// get ink. Color pixels use the plain mean of R, G and B.
#[derive(Debug, Clone)]
pub struct ThresholdImage {
    width: usize,
    height: usize,
    gray: Vec<u8>,
    threshold: u8,
    grayscale: bool,
}

impl ThresholdImage {
    /// Open an image file. The format is detected from the content, not
    /// the file name.
    ///
    /// ## Errors
    ///
    /// Returns [`ErikaError::Io`] if the file cannot be opened and
    /// [`ErikaError::Image`] if it is not a decodable image.
    pub fn open<P: AsRef<Path>>(path: P, threshold: u8) -> Result<Self> {
        let path = path.as_ref();
        let image = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| {
                ErikaError::Image(format!(
                    "Failed to open {} - maybe not an image? ({})",
                    path.display(),
                    e
                ))
            })?;
        Ok(Self::from_image(&image, threshold))
    }

    pub fn from_image(image: &DynamicImage, threshold: u8) -> Self {
        let grayscale = matches!(
            image,
            DynamicImage::ImageLuma8(_)
                | DynamicImage::ImageLumaA8(_)
                | DynamicImage::ImageLuma16(_)
                | DynamicImage::ImageLumaA16(_)
        );
        let gray = if grayscale {
            image.to_luma8().into_raw()
        } else {
            image
                .to_rgb8()
                .pixels()
                .map(|p| ((u16::from(p[0]) + u16::from(p[1]) + u16::from(p[2])) / 3) as u8)
                .collect()
        };
        Self {
            width: image.width() as usize,
            height: image.height() as usize,
            gray,
            threshold,
            grayscale,
        }
    }

    pub fn is_grayscale(&self) -> bool {
        self.grayscale
    }

    pub fn is_rgb(&self) -> bool {
        !self.grayscale
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Gray value at `(x, y)`, 0 = black.
    pub fn gray_at(&self, x: usize, y: usize) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.gray[y * self.width + x])
        } else {
            None
        }
    }
}

impl ImageSource for ThresholdImage {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn is_pixel_set(&self, x: usize, y: usize) -> bool {
        self.gray_at(x, y).is_some_and(|gray| gray <= self.threshold)
    }
}

/// In-memory bitmap, mostly for tests and generated content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    pixels: Vec<bool>,
}

impl Bitmap {
    /// Parse rows where `X` (or `#`) marks a set pixel.
    pub fn parse(rows: &[&str]) -> Self {
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
        let mut pixels = vec![false; width * rows.len()];
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                pixels[y * width + x] = ch == 'X' || ch == '#';
            }
        }
        Self {
            width,
            height: rows.len(),
            pixels,
        }
    }
}

impl ImageSource for Bitmap {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn is_pixel_set(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.pixels[y * self.width + x]
    }
}
