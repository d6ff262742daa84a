//! Ticket PDF - page model and PDF serialization
//!
//! This crate provides:
//! - A page model: ordered drawing operations in top-left coordinates
//! - Metrics for the standard Helvetica fonts (no font files required)
//! - Content-stream generation for text, rectangles, lines and images
//! - Writing pages into a new PDF document
//!
//! # Example
//!
//! ```
//! use ticket_pdf::{Align, Page, PageSize, PdfDocument, StandardFont, TextOp};
//!
//! let mut page = Page::new();
//! page.push_text(TextOp::new("Hello", 72.0, 72.0, StandardFont::Helvetica, 12.0));
//!
//! let mut doc = PdfDocument::new(PageSize::A4);
//! doc.add_page(&page)?;
//! let bytes = doc.to_bytes()?;
//! assert!(bytes.starts_with(b"%PDF"));
//! # Ok::<(), ticket_pdf::PdfError>(())
//! ```

mod content;
mod document;
mod font;
mod graphics;
mod image;
mod text;

pub use content::{Color, DrawOp, Page, Point, Rect, Stroke, TextOp};
pub use document::{PageSize, PdfDocument};
pub use font::{encode_win_ansi, StandardFont};
pub use graphics::{line_operators, rect_operators};
pub use image::{generate_image_operators, ImageXObject};
pub use text::{generate_text_operators, hex_string, TextRenderContext};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("Invalid page size: {0} x {1}")]
    InvalidPageSize(f64, f64),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text alignment relative to the anchor x coordinate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    /// Offset to add to the anchor so text of `width` lands aligned
    pub fn offset(self, width: f64) -> f64 {
        match self {
            Align::Left => 0.0,
            Align::Center => -width / 2.0,
            Align::Right => -width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_default() {
        assert_eq!(Align::default(), Align::Left);
    }

    #[test]
    fn test_align_offset() {
        assert_eq!(Align::Left.offset(100.0), 0.0);
        assert_eq!(Align::Center.offset(100.0), -50.0);
        assert_eq!(Align::Right.offset(100.0), -100.0);
    }
}
