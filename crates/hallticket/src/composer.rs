//! Per-record document composition
//!
//! A record is composed by walking a fixed sequence of stages. Each stage
//! builds its block, measures it, reserves space on the cursor, draws it
//! and advances. The only suspension point is the verification code
//! encoding inside [`ComposeStage::CandidateAndPhoto`].

use crate::canvas::Canvas;
use crate::config::TicketConfig;
use crate::cursor::{LayoutCursor, Placement};
use crate::encoder::{encode_with_timeout, CodeEncoder, CodeImage, EncodingFailure, QrEncoder};
use crate::payload::VerificationPayload;
use crate::record::{RawRecord, StudentRecord, ValidationError};
use crate::section::{Aside, Banner, BannerLine, Field, Section, SectionRenderer};
use crate::signature::SignatureLayout;
use crate::Result;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use ticket_pdf::{Align, Page, PageSize, Rect, StandardFont, Stroke, TextOp};
use ticket_text::{DATE_DISPLAY_FORMAT, TIME_DISPLAY_FORMAT};

/// Vertical space after each block
const SECTION_GAP: f64 = 10.0;
/// Space kept on continuation pages for the "continued" line
const CONTINUATION_HEADER: f64 = 16.0;
/// Space between the photo box and the code below it
const ASIDE_GAP: f64 = 8.0;
const INSTRUCTION_LABEL_RATIO: f64 = 0.15;
const PHOTO_LABEL: &str = "Affix photograph";
const CODE_PLACEHOLDER: &str = "Code unavailable";
const FOOTER_NOTE: &str = "This hall ticket is computer generated and is valid only with a photo ID.";

/// Composition stages, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ComposeStage {
    Header,
    CandidateAndPhoto,
    TestDetails,
    Venue,
    Instructions,
    SignatureBlock,
    Footer,
    Done,
}

impl ComposeStage {
    pub fn next(self) -> Self {
        match self {
            ComposeStage::Header => ComposeStage::CandidateAndPhoto,
            ComposeStage::CandidateAndPhoto => ComposeStage::TestDetails,
            ComposeStage::TestDetails => ComposeStage::Venue,
            ComposeStage::Venue => ComposeStage::Instructions,
            ComposeStage::Instructions => ComposeStage::SignatureBlock,
            ComposeStage::SignatureBlock => ComposeStage::Footer,
            ComposeStage::Footer | ComposeStage::Done => ComposeStage::Done,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ComposeStage::Header => "header",
            ComposeStage::CandidateAndPhoto => "candidateAndPhoto",
            ComposeStage::TestDetails => "testDetails",
            ComposeStage::Venue => "venue",
            ComposeStage::Instructions => "instructions",
            ComposeStage::SignatureBlock => "signatureBlock",
            ComposeStage::Footer => "footer",
            ComposeStage::Done => "done",
        }
    }
}

impl fmt::Display for ComposeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WarningKind {
    /// A block taller than one page was placed anyway
    LayoutOverflow,
    /// The verification code was replaced by a placeholder
    CodeUnavailable,
}

/// Non-fatal problem found while composing a record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketWarning {
    pub kind: WarningKind,
    pub stage: ComposeStage,
    pub detail: String,
}

/// Outcome of the verification code step
#[derive(Debug, Clone, PartialEq)]
pub enum CodeStatus {
    Rendered { modules: usize },
    Unavailable(EncodingFailure),
}

/// Pages and diagnostics for one record
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedTicket {
    pub record_id: String,
    pub pages: Vec<Page>,
    /// Encoded verification payload
    pub payload: String,
    /// Height drawn by each stage, in stage order
    pub section_heights: Vec<(ComposeStage, f64)>,
    pub code: CodeStatus,
    pub warnings: Vec<TicketWarning>,
}

impl ComposedTicket {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn section_height(&self, stage: ComposeStage) -> Option<f64> {
        self.section_heights
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, h)| *h)
    }
}

/// Composes hall tickets for single records
///
/// Cloning is cheap; the configuration and encoder are shared.
#[derive(Clone)]
pub struct DocumentComposer {
    config: Arc<TicketConfig>,
    encoder: Arc<dyn CodeEncoder>,
    page_size: PageSize,
    generated_at: NaiveDateTime,
}

impl DocumentComposer {
    /// Create a composer with the QR encoder
    ///
    /// `generated_at` is the only timestamp printed on tickets, so the same
    /// inputs always produce the same pages.
    pub fn new(config: TicketConfig, generated_at: NaiveDateTime) -> Result<Self> {
        config.validate()?;
        let page_size = config.page_size()?;
        Ok(Self {
            config: Arc::new(config),
            encoder: Arc::new(QrEncoder::new()),
            page_size,
            generated_at,
        })
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn CodeEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn config(&self) -> &TicketConfig {
        &self.config
    }

    pub fn generated_at(&self) -> NaiveDateTime {
        self.generated_at
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Validate and compose one raw record
    pub async fn compose(
        &self,
        raw: &RawRecord,
    ) -> std::result::Result<ComposedTicket, ValidationError> {
        let record = StudentRecord::prepare_with(raw, &self.config.currency_prefix)?;
        Ok(self.compose_record(&record).await)
    }

    /// Compose a validated record
    pub async fn compose_record(&self, record: &StudentRecord) -> ComposedTicket {
        let payload =
            VerificationPayload::from_record(record, self.config.payload_exam_chars).encode();
        let mut composition = Composition::new(&self.config, record);
        let mut stage = ComposeStage::Header;

        while stage != ComposeStage::Done {
            match stage {
                ComposeStage::Header => composition.header(),
                ComposeStage::CandidateAndPhoto => {
                    let code = encode_with_timeout(
                        self.encoder.as_ref(),
                        &payload,
                        self.config.code_timeout(),
                    )
                    .await;
                    composition.candidate(code);
                }
                ComposeStage::TestDetails => composition.test_details(),
                ComposeStage::Venue => composition.venue(),
                ComposeStage::Instructions => composition.instructions(),
                ComposeStage::SignatureBlock => composition.signatures(),
                ComposeStage::Footer => composition.footer(self.generated_at),
                ComposeStage::Done => {}
            }
            stage = stage.next();
        }

        composition.finish(payload)
    }
}

/// State of one record's composition
struct Composition<'a> {
    config: &'a TicketConfig,
    record: &'a StudentRecord,
    cursor: LayoutCursor,
    canvas: Canvas,
    renderer: SectionRenderer,
    section_heights: Vec<(ComposeStage, f64)>,
    warnings: Vec<TicketWarning>,
    code: Option<CodeStatus>,
}

impl<'a> Composition<'a> {
    fn new(config: &'a TicketConfig, record: &'a StudentRecord) -> Self {
        let geometry = config.geometry();
        Self {
            config,
            record,
            cursor: LayoutCursor::new(geometry).with_continuation_header(CONTINUATION_HEADER),
            canvas: Canvas::new(geometry.width, geometry.height, config.page.border_inset),
            renderer: SectionRenderer::new(config.typography, geometry.content_band()),
            section_heights: Vec::new(),
            warnings: Vec::new(),
            code: None,
        }
    }

    fn warn(&mut self, kind: WarningKind, stage: ComposeStage, detail: String) {
        log::warn!("record {}: {}", self.record.identity.id, detail);
        self.warnings.push(TicketWarning {
            kind,
            stage,
            detail,
        });
    }

    fn reserve(&mut self, stage: ComposeStage, height: f64) -> Placement {
        let placement = self.cursor.reserve(height);
        if placement.overflow {
            let detail = format!(
                "{} block is {:.1} pt tall but a page holds {:.1} pt",
                stage,
                height,
                self.cursor.usable_height()
            );
            self.warn(WarningKind::LayoutOverflow, stage, detail);
        }
        placement
    }

    fn finish_block(&mut self, stage: ComposeStage, consumed: f64) {
        self.cursor.advance(consumed + SECTION_GAP);
        self.section_heights.push((stage, consumed));
    }

    /// Place a bordered section; returns its page and aside panel
    fn place_section(&mut self, stage: ComposeStage, section: &Section) -> (usize, Option<Rect>) {
        let layout = self.renderer.layout(section);
        let placement = self.reserve(stage, layout.height);
        let page = self.canvas.page_mut(placement.page);
        let consumed = self.renderer.draw(page, placement.y, &layout);
        self.finish_block(stage, consumed);
        (placement.page, layout.aside_rect(placement.y))
    }

    fn place_banner(&mut self, stage: ComposeStage, banner: &Banner) {
        let layout = self.renderer.layout_banner(banner);
        let placement = self.reserve(stage, layout.height);
        let page = self.canvas.page_mut(placement.page);
        let consumed = self.renderer.draw_banner(page, placement.y, &layout);
        self.finish_block(stage, consumed);
    }

    fn header(&mut self) {
        let typo = &self.config.typography;
        let banner = Banner {
            lines: vec![
                BannerLine::bold(&self.config.organization, typo.title),
                BannerLine::bold(&self.config.document_title, typo.heading),
                BannerLine::regular(&self.record.exam.exam_name, typo.body),
            ],
            rule_above: false,
            rule_below: true,
        };
        self.place_banner(ComposeStage::Header, &banner);
    }

    fn candidate(&mut self, code: std::result::Result<CodeImage, EncodingFailure>) {
        let stage = ComposeStage::CandidateAndPhoto;
        let record = self.record;
        let display = &record.display;
        let personal = &record.personal;
        let photo = self.config.photo;
        let code_size = self.config.code_size;

        let section = Section::new("Candidate Details")
            .field(Field::span("Name", Some(record.identity.name.as_str())))
            .field(Field::left(
                "Application No.",
                record.identity.application_number.as_deref(),
            ))
            .field(Field::right("Roll No.", record.identity.roll_number.as_deref()))
            .field(Field::left("Date of Birth", display.dob.as_deref()))
            .field(Field::right("Gender", personal.gender.as_deref()))
            .field(Field::left("Category", personal.category.as_deref()))
            .field(Field::right(
                "PwD",
                display.person_with_disability.as_deref(),
            ))
            .field(Field::left("Father's Name", personal.father_name.as_deref()))
            .field(Field::right("Mother's Name", personal.mother_name.as_deref()))
            .field(Field::left(
                "Scribe Required",
                display.scribe_required.as_deref(),
            ))
            .with_aside(Aside {
                width: self.config.aside_width(),
                min_height: photo.height + ASIDE_GAP + code_size,
            });

        let (page_index, aside) = self.place_section(stage, &section);
        let Some(aside) = aside else {
            return;
        };

        let photo_rect = Rect::new(
            aside.x + (aside.width - photo.width) / 2.0,
            aside.y,
            photo.width,
            photo.height,
        );
        let code_rect = Rect::new(
            aside.x + (aside.width - code_size) / 2.0,
            photo_rect.bottom() + ASIDE_GAP,
            code_size,
            code_size,
        );
        let small = self.config.typography.small;

        let page = self.canvas.page_mut(page_index);
        page.push_rect(photo_rect, Some(Stroke::solid(0.75)), None);
        page.push_text(
            TextOp::new(
                PHOTO_LABEL,
                photo_rect.x + photo_rect.width / 2.0,
                photo_rect.y + photo_rect.height / 2.0,
                StandardFont::Helvetica,
                small,
            )
            .align(Align::Center),
        );

        let status = match code {
            Ok(code) => {
                page.push_image(code_rect, Arc::clone(&code.image));
                CodeStatus::Rendered {
                    modules: code.modules,
                }
            }
            Err(failure) => {
                page.push_rect(code_rect, Some(Stroke::dashed(0.75, 3.0, 2.0)), None);
                page.push_text(
                    TextOp::new(
                        CODE_PLACEHOLDER,
                        code_rect.x + code_rect.width / 2.0,
                        code_rect.y + code_rect.height / 2.0,
                        StandardFont::Helvetica,
                        small,
                    )
                    .align(Align::Center),
                );
                CodeStatus::Unavailable(failure)
            }
        };

        if let CodeStatus::Unavailable(failure) = &status {
            let detail = format!("verification code unavailable, placeholder drawn: {failure}");
            self.warn(WarningKind::CodeUnavailable, stage, detail);
        }
        self.code = Some(status);
    }

    fn test_details(&mut self) {
        let record = self.record;
        let section = Section::new("Examination Details")
            .field(Field::span("Examination", Some(record.exam.exam_name.as_str())))
            .field(Field::left("Date", record.display.exam_date.as_deref()))
            .field(Field::right("Time", record.display.exam_time.as_deref()))
            .field(Field::left(
                "Reporting Time",
                record.display.reporting_time.as_deref(),
            ))
            .field(Field::right("Duration", record.exam.duration.as_deref()))
            .field(Field::left("Fee Paid", record.display.fee.as_deref()));
        self.place_section(ComposeStage::TestDetails, &section);
    }

    fn venue(&mut self) {
        let venue = &self.record.venue;
        let section = Section::new("Examination Venue")
            .field(Field::span("Centre", venue.center_name.as_deref()))
            .field(Field::span("Address", venue.address.as_deref()))
            .field(Field::left("City", venue.city.as_deref()))
            .field(Field::right("State", venue.state.as_deref()));
        self.place_section(ComposeStage::Venue, &section);
    }

    fn instructions(&mut self) {
        let declaration = self.config.declaration_for(&self.record.identity.name);
        let numbered: Vec<Field> = self
            .config
            .instructions
            .iter()
            .enumerate()
            .map(|(i, text)| Field::span(&format!("{}.", i + 1), Some(text.as_str())))
            .collect();

        let section = Section::new("Instructions to Candidates")
            .fields(numbered)
            .field(Field::span("Declaration", Some(declaration.as_str())))
            .with_label_ratio(INSTRUCTION_LABEL_RATIO);
        self.place_section(ComposeStage::Instructions, &section);
    }

    fn signatures(&mut self) {
        let stage = ComposeStage::SignatureBlock;
        let layout = SignatureLayout::for_record(self.record);
        let signature = self.config.signature;
        let geometry = self.config.geometry();

        let placement = self.reserve(stage, signature.height);
        let page = self.canvas.page_mut(placement.page);
        let consumed = layout.draw(
            page,
            geometry.margin,
            geometry.content_width(),
            placement.y,
            &signature,
            self.config.typography.small,
        );
        self.finish_block(stage, consumed);
    }

    fn footer(&mut self, generated_at: NaiveDateTime) {
        let small = self.config.typography.small;
        let stamp_format = format!("{DATE_DISPLAY_FORMAT} {TIME_DISPLAY_FORMAT}");
        let stamp = generated_at.format(&stamp_format);
        let banner = Banner {
            lines: vec![
                BannerLine::regular(&format!("Generated on {stamp}"), small),
                BannerLine::regular(FOOTER_NOTE, small),
            ],
            rule_above: true,
            rule_below: false,
        };
        self.place_banner(ComposeStage::Footer, &banner);
    }

    /// Stamp continuation lines and page numbers, then hand over the pages
    fn finish(mut self, payload: String) -> ComposedTicket {
        self.canvas.page_mut(self.cursor.page_index());
        let page_count = self.canvas.page_count();
        let geometry = self.config.geometry();
        let small = self.config.typography.small;
        let record = self.record;

        let roll = record.roll_or_application();
        let continued = if roll.is_empty() {
            format!("Continued: {}", record.identity.name)
        } else {
            format!("Continued: {} (Roll No. {})", record.identity.name, roll)
        };
        let number_y =
            geometry.bottom() + (geometry.margin - self.config.page.border_inset + small) / 2.0;

        for index in 0..page_count {
            let page = self.canvas.page_mut(index);
            if index > 0 {
                page.push_text(TextOp::new(
                    continued.clone(),
                    geometry.margin,
                    geometry.margin + CONTINUATION_HEADER / 2.0,
                    StandardFont::HelveticaBold,
                    small,
                ));
            }
            page.push_text(
                TextOp::new(
                    format!("Page {} of {}", index + 1, page_count),
                    geometry.width - geometry.margin,
                    number_y,
                    StandardFont::Helvetica,
                    small,
                )
                .align(Align::Right),
            );
        }

        log::debug!(
            "record {}: composed {} page(s)",
            record.identity.id,
            page_count
        );

        ComposedTicket {
            record_id: record.identity.id.clone(),
            pages: self.canvas.into_pages(),
            payload,
            section_heights: self.section_heights,
            code: self.code.unwrap_or(CodeStatus::Unavailable(EncodingFailure::Task(
                "candidate block was not drawn".to_string(),
            ))),
            warnings: self.warnings,
        }
    }
}
