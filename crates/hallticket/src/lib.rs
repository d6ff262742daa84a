//! Hall Ticket - composition engine for exam hall tickets
//!
//! This crate provides:
//! - Record preparation from loosely shaped JSON input
//! - The verification payload and its QR rendering
//! - A layout cursor and section renderer for bordered, paginated pages
//! - The per-record document composer
//! - Batch emission of many records into one ordered artifact
//!
//! # Example
//!
//! ```no_run
//! use hallticket::{BatchEmitter, DocumentComposer, RawRecord, TicketConfig};
//! use chrono::NaiveDate;
//!
//! # async fn run() -> hallticket::Result<()> {
//! let generated_at = NaiveDate::from_ymd_opt(2025, 3, 1)
//!     .and_then(|d| d.and_hms_opt(9, 0, 0))
//!     .expect("valid timestamp");
//! let composer = DocumentComposer::new(TicketConfig::default(), generated_at)?;
//! let records: Vec<RawRecord> = serde_json::from_str(
//!     r#"[{"id": "S-1", "name": "Asha Rao", "examName": "Diploma Final"}]"#,
//! )?;
//!
//! let artifact = BatchEmitter::new(composer).emit(records).await;
//! artifact.save_pdf("tickets.pdf")?;
//! # Ok(())
//! # }
//! ```

mod batch;
mod canvas;
mod composer;
mod config;
mod cursor;
mod encoder;
mod payload;
mod record;
mod section;
mod signature;

pub use batch::{Artifact, BatchEmitter, BatchSummary, RecordFailure, RecordSpan, RecordWarning};
pub use composer::{
    CodeStatus, ComposeStage, ComposedTicket, DocumentComposer, TicketWarning, WarningKind,
};
pub use config::{BoxSize, PageConfig, SignatureConfig, TicketConfig, Typography};
pub use cursor::{ColumnBand, LayoutCursor, PageGeometry, Placement};
pub use encoder::{encode_with_timeout, CodeEncoder, CodeImage, EncodingFailure, QrEncoder};
pub use payload::{PayloadError, VerificationPayload, DEFAULT_EXAM_CHARS, PAYLOAD_VERSION};
pub use record::{
    DisplayValues, ExamInfo, Identity, Personal, RawRecord, StudentRecord, ValidationError, Venue,
};
pub use section::{
    Aside, Banner, BannerLayout, BannerLine, CellLayout, Column, Field, RowLayout, Section,
    SectionLayout, SectionRenderer, NOT_AVAILABLE,
};
pub use signature::SignatureLayout;

use thiserror::Error;

/// Errors that can occur while composing or emitting tickets
#[derive(Debug, Error)]
pub enum TicketError {
    #[error("Invalid record: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] ticket_pdf::PdfError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ticket operations
pub type Result<T> = std::result::Result<T, TicketError>;
