//! Verification code rendering
//!
//! Encoding is the one asynchronous, fallible step of a composition. The
//! [`CodeEncoder`] trait lets a deployment swap in another symbology; the
//! default [`QrEncoder`] renders QR codes on a blocking worker thread.

use async_trait::async_trait;
use image::{GrayImage, Luma};
use qrcode::{EcLevel, QrCode};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Pixels per QR module
const MODULE_PIXELS: u32 = 4;

/// Rendered verification code
#[derive(Debug, Clone, PartialEq)]
pub struct CodeImage {
    pub image: Arc<GrayImage>,
    /// Modules per side, excluding the quiet zone
    pub modules: usize,
}

/// Why a verification code could not be produced
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodingFailure {
    #[error("payload could not be encoded: {0}")]
    Encode(String),

    #[error("encoding timed out after {0:?}")]
    TimedOut(Duration),

    #[error("encoding task failed: {0}")]
    Task(String),
}

/// Turns a payload string into a scannable image
#[async_trait]
pub trait CodeEncoder: Send + Sync {
    async fn encode(&self, payload: &str) -> Result<CodeImage, EncodingFailure>;
}

/// QR encoder at error-correction level M and a fixed module density
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrEncoder {
    ec_level: EcLevel,
    module_pixels: u32,
}

impl Default for QrEncoder {
    fn default() -> Self {
        Self {
            ec_level: EcLevel::M,
            module_pixels: MODULE_PIXELS,
        }
    }
}

impl QrEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render synchronously
    pub fn render(&self, payload: &str) -> Result<CodeImage, EncodingFailure> {
        let code = QrCode::with_error_correction_level(payload.as_bytes(), self.ec_level)
            .map_err(|e| EncodingFailure::Encode(e.to_string()))?;

        let image = code
            .render::<Luma<u8>>()
            .module_dimensions(self.module_pixels, self.module_pixels)
            .quiet_zone(true)
            .build();

        Ok(CodeImage {
            image: Arc::new(image),
            modules: code.width(),
        })
    }
}

#[async_trait]
impl CodeEncoder for QrEncoder {
    async fn encode(&self, payload: &str) -> Result<CodeImage, EncodingFailure> {
        let encoder = *self;
        let payload = payload.to_string();
        tokio::task::spawn_blocking(move || encoder.render(&payload))
            .await
            .map_err(|e| EncodingFailure::Task(e.to_string()))?
    }
}

/// Run an encoder, giving up after `timeout`
pub async fn encode_with_timeout(
    encoder: &dyn CodeEncoder,
    payload: &str,
    timeout: Duration,
) -> Result<CodeImage, EncodingFailure> {
    match tokio::time::timeout(timeout, encoder.encode(payload)).await {
        Ok(result) => result,
        Err(_) => Err(EncodingFailure::TimedOut(timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stalled;

    #[async_trait]
    impl CodeEncoder for Stalled {
        async fn encode(&self, _payload: &str) -> Result<CodeImage, EncodingFailure> {
            std::future::pending().await
        }
    }

    #[test]
    fn test_render_qr() {
        let code = QrEncoder::new().render("HT1|S1|Asha|R1|Exam").unwrap();

        // Versions grow by 4 modules from 21; the quiet zone adds 4 per side
        assert_eq!((code.modules - 21) % 4, 0);
        assert_eq!(code.image.width(), (code.modules as u32 + 8) * MODULE_PIXELS);
        assert_eq!(code.image.width(), code.image.height());
        // Top-left corner is quiet zone, the finder pattern starts inside it
        assert_eq!(code.image.get_pixel(0, 0)[0], 255);
        let inside = 4 * MODULE_PIXELS;
        assert_eq!(code.image.get_pixel(inside, inside)[0], 0);
    }

    #[test]
    fn test_render_is_deterministic() {
        let encoder = QrEncoder::new();
        let a = encoder.render("HT1|S1|Asha|R1|Exam").unwrap();
        let b = encoder.render("HT1|S1|Asha|R1|Exam").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_payload_too_long() {
        let payload = "X".repeat(8000);
        let err = QrEncoder::new().render(&payload).unwrap_err();
        assert!(matches!(err, EncodingFailure::Encode(_)));
    }

    #[tokio::test]
    async fn test_async_encode() {
        let code = QrEncoder::new().encode("HT1|a|b|c|d").await.unwrap();
        assert!(code.modules >= 21);
    }

    #[tokio::test]
    async fn test_timeout() {
        let err = encode_with_timeout(&Stalled, "HT1|a|b|c|d", Duration::from_millis(20))
            .await
            .unwrap_err();
        assert_eq!(err, EncodingFailure::TimedOut(Duration::from_millis(20)));
    }
}
