use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

use crate::error::{RefineError, Result};

/// Per-pixel foreground probability in `[0, 1]`, as produced by the
/// classifier. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityGrid {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl ProbabilityGrid {
    /// Build a grid from row-major values. Values are clamped to `[0, 1]`;
    /// NaN becomes 0.
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(RefineError::classifier(format!(
                "probability buffer has {} values, {}x{} needs {}",
                data.len(),
                width,
                height,
                expected
            )));
        }
        let data = data.into_iter().map(clamp_unit).collect();
        Ok(Self { width, height, data })
    }

    pub fn zeros(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize],
        }
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> f32) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(clamp_unit(f(x, y)));
            }
        }
        Self { width, height, data }
    }

    /// Interpret an 8-bit alpha approximation as probabilities (`value / 255`).
    pub fn from_alpha(alpha: &GrayImage) -> Self {
        let (width, height) = alpha.dimensions();
        let data = alpha.as_raw().iter().map(|&a| a as f32 / 255.0).collect();
        Self { width, height, data }
    }

    /// Place `self` at `(x, y)` inside a zero grid of the given size.
    /// Parts falling outside the target are dropped.
    pub fn embed(&self, width: u32, height: u32, x: u32, y: u32) -> Self {
        let mut out = Self::zeros(width, height);
        for sy in 0..self.height {
            let ty = y + sy;
            if ty >= height {
                break;
            }
            for sx in 0..self.width {
                let tx = x + sx;
                if tx >= width {
                    break;
                }
                out.data[(ty * width + tx) as usize] = self.get(sx, sy);
            }
        }
        out
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[(y * self.width + x) as usize]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Boolean foreground mask. Stored as a `GrayImage` holding 0 or 255 so it
/// can be handed to `imageproc` without conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMask {
    pixels: GrayImage,
}

pub const ON: u8 = 255;
pub const OFF: u8 = 0;

impl BinaryMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: GrayImage::new(width, height),
        }
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let pixels = GrayImage::from_fn(width, height, |x, y| Luma([if f(x, y) { ON } else { OFF }]));
        Self { pixels }
    }

    /// Any nonzero pixel counts as foreground.
    pub fn from_gray(gray: &GrayImage) -> Self {
        let mut pixels = gray.clone();
        for p in pixels.pixels_mut() {
            p[0] = if p[0] > 0 { ON } else { OFF };
        }
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.pixels.get_pixel(x, y)[0] > 0
    }

    pub fn set(&mut self, x: u32, y: u32, on: bool) {
        self.pixels.put_pixel(x, y, Luma([if on { ON } else { OFF }]));
    }

    pub fn count(&self) -> usize {
        self.pixels.as_raw().iter().filter(|&&v| v > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.as_raw().iter().all(|&v| v == 0)
    }

    /// Pixelwise AND with another mask of the same size.
    pub fn intersect(&mut self, other: &BinaryMask) {
        for (a, b) in self.pixels.pixels_mut().zip(other.pixels.pixels()) {
            if b[0] == 0 {
                a[0] = OFF;
            }
        }
    }

    /// True if every foreground pixel of `other` is foreground here.
    pub fn contains(&self, other: &BinaryMask) -> bool {
        self.pixels
            .as_raw()
            .iter()
            .zip(other.pixels.as_raw())
            .all(|(&a, &b)| b == 0 || a > 0)
    }

    /// Tight bounding box of the foreground, if any.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (x, y, p) in self.pixels.enumerate_pixels() {
            if p[0] == 0 {
                continue;
            }
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((min_x, min_y, max_x, max_y)) => {
                    (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
                }
            });
        }
        bounds.map(|(min_x, min_y, max_x, max_y)| BoundingBox {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        })
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.pixels
    }

    pub fn into_gray(self) -> GrayImage {
        self.pixels
    }
}

/// Axis-aligned box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A connected set of foreground pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub label: u32,
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    pub pixel_count: u32,
}

impl Region {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    pub fn area(&self) -> u32 {
        self.pixel_count
    }

    pub fn touches_border(&self, width: u32, height: u32) -> bool {
        self.min_x == 0 || self.min_y == 0 || self.max_x + 1 >= width || self.max_y + 1 >= height
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox {
            x: self.min_x,
            y: self.min_y,
            width: self.width(),
            height: self.height(),
        }
    }
}

/// Geometric fitting strategy, fixed per run by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Loose cutout that follows the classifier, small holes closed.
    #[default]
    Natural,
    /// Minimum-area rotated rectangle, for books, cards and boxes.
    RotatedRect,
    /// Convex hull "shrink-wrap", for spreads and fanned items.
    ConvexHull,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Strategy::Natural => "natural",
            Strategy::RotatedRect => "rotated_rect",
            Strategy::ConvexHull => "convex_hull",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Strategy {
    type Err = RefineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "natural" => Ok(Strategy::Natural),
            "rotated_rect" | "rect" => Ok(Strategy::RotatedRect),
            "convex_hull" | "hull" | "shrink_wrap" => Ok(Strategy::ConvexHull),
            other => Err(RefineError::invalid_config(format!("unknown strategy '{other}'"))),
        }
    }
}

/// Raster edge selected for edge recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderEdge {
    Top,
    Bottom,
    Left,
    Right,
}

/// The pipeline's output: the binary silhouette and the 8-bit alpha that
/// the compositor multiplies into the image. Without soft edges the alpha
/// is the binary mask scaled to 0/255.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalMask {
    pub binary: BinaryMask,
    pub alpha: GrayImage,
}

impl FinalMask {
    pub fn from_binary(binary: BinaryMask) -> Self {
        let alpha = binary.as_gray().clone();
        Self { binary, alpha }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.binary.dimensions()
    }

    pub fn is_empty(&self) -> bool {
        self.binary.is_empty()
    }

    /// Bounding box of nonzero alpha, for auto-cropping.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BinaryMask::from_gray(&self.alpha).bounding_box()
    }
}
