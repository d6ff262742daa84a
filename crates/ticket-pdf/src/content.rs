//! Page model
//!
//! A [`Page`] is an ordered list of drawing operations. Coordinates are in
//! points with the origin at the top-left corner of the page and y growing
//! downwards; the document writer flips them into PDF space.

use crate::{Align, StandardFont};
use image::GrayImage;
use std::sync::Arc;

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Gray level (0.0 black - 1.0 white)
    pub fn gray(level: f32) -> Self {
        Self::rgb(level, level, level)
    }

    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// A point in top-left page coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A rectangle in top-left page coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether `other` lies entirely inside this rectangle
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Line style for rectangles and rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: f64,
    pub color: Color,
    /// Dash pattern as (on, off) lengths; `None` draws a solid line
    pub dash: Option<(f64, f64)>,
}

impl Stroke {
    pub fn solid(width: f64) -> Self {
        Self {
            width,
            color: Color::black(),
            dash: None,
        }
    }

    pub fn dashed(width: f64, on: f64, off: f64) -> Self {
        Self {
            width,
            color: Color::black(),
            dash: Some((on, off)),
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// A single run of text
#[derive(Debug, Clone, PartialEq)]
pub struct TextOp {
    pub text: String,
    /// Anchor x; interpreted according to `align`
    pub x: f64,
    /// Baseline, measured from the top of the page
    pub y: f64,
    pub font: StandardFont,
    pub size: f64,
    pub align: Align,
    pub color: Color,
}

impl TextOp {
    pub fn new(text: impl Into<String>, x: f64, y: f64, font: StandardFont, size: f64) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            font,
            size,
            align: Align::Left,
            color: Color::black(),
        }
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Rendered width in points
    pub fn width(&self) -> f64 {
        self.font.text_width_points(&self.text, self.size)
    }

    /// Left edge after alignment
    pub fn left(&self) -> f64 {
        self.x + self.align.offset(self.width())
    }
}

/// Drawing operation on a page
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text(TextOp),
    Rect {
        rect: Rect,
        stroke: Option<Stroke>,
        fill: Option<Color>,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Image {
        rect: Rect,
        image: Arc<GrayImage>,
    },
}

/// One page of drawing operations, in paint order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    ops: Vec<DrawOp>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    pub fn push_text(&mut self, text: TextOp) {
        self.ops.push(DrawOp::Text(text));
    }

    pub fn push_rect(&mut self, rect: Rect, stroke: Option<Stroke>, fill: Option<Color>) {
        self.ops.push(DrawOp::Rect { rect, stroke, fill });
    }

    pub fn push_line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.ops.push(DrawOp::Line { from, to, stroke });
    }

    pub fn push_image(&mut self, rect: Rect, image: Arc<GrayImage>) {
        self.ops.push(DrawOp::Image { rect, image });
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Text runs on this page, in paint order
    pub fn texts(&self) -> impl Iterator<Item = &TextOp> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(text) => Some(text),
            _ => None,
        })
    }

    /// First text run whose content equals `needle`
    pub fn find_text(&self, needle: &str) -> Option<&TextOp> {
        self.texts().find(|t| t.text == needle)
    }

    /// Whether any text run contains `needle`
    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t.text.contains(needle))
    }

    pub fn images(&self) -> impl Iterator<Item = (&Rect, &Arc<GrayImage>)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Image { rect, image } => Some((rect, image)),
            _ => None,
        })
    }
}
