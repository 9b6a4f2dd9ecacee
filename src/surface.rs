//! The draw-instruction seam between composition and the artifact writer.
//!
//! The compositor emits calls against [`Surface`]; the PDF page is the
//! production implementation, and [`RecordingSurface`] captures calls for
//! tests and custom backends. Everything here speaks draw space (origin
//! bottom-left): the coordinate adapter has already run by the time an op
//! reaches a surface.

use crate::font::FontChoice;
use crate::image_loader::ChartImage;

/// An RGB color with components in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
}

/// Placement parameters for one line of text. `y` is the baseline.
#[derive(Debug, Clone, Copy)]
pub struct TextOp {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub font: FontChoice,
    pub color: Color,
}

/// Placement parameters for one image. `(x, y)` is the bottom-left corner;
/// the image scales to exactly `width` x `height`.
#[derive(Debug, Clone, Copy)]
pub struct ImageOp {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Where draw instructions land.
pub trait Surface {
    fn height(&self) -> f64;
    fn draw_text(&mut self, text: &str, op: TextOp);
    fn draw_image(&mut self, image: &ChartImage, op: ImageOp);
}

/// One recorded draw call. Images record their pixel dimensions rather than
/// the decoded planes.
#[derive(Debug, Clone)]
pub enum DrawOp {
    Text {
        text: String,
        op: TextOp,
    },
    Image {
        width_px: u32,
        height_px: u32,
        op: ImageOp,
    },
}

/// A surface that records calls instead of rendering them.
pub struct RecordingSurface {
    height: f64,
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(height: f64) -> Self {
        Self {
            height,
            ops: Vec::new(),
        }
    }

    /// The recorded text strings, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                DrawOp::Image { .. } => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn height(&self) -> f64 {
        self.height
    }

    fn draw_text(&mut self, text: &str, op: TextOp) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            op,
        });
    }

    fn draw_image(&mut self, image: &ChartImage, op: ImageOp) {
        self.ops.push(DrawOp::Image {
            width_px: image.width_px,
            height_px: image.height_px,
            op,
        });
    }
}
