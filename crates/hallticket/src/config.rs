//! Ticket configuration

use crate::cursor::PageGeometry;
use crate::{Result, TicketError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use ticket_pdf::PageSize;

/// Page dimensions and spacing, in points
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PageConfig {
    pub width: f64,
    pub height: f64,
    /// Distance from every page edge to the content area
    pub margin: f64,
    /// Horizontal space between columns
    pub gutter: f64,
    /// Distance from the page edge to the outer border
    pub border_inset: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width: PageSize::A4.width,
            height: PageSize::A4.height,
            margin: 36.0,
            gutter: 18.0,
            border_inset: 18.0,
        }
    }
}

/// Font sizes in points
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Typography {
    pub title: f64,
    pub heading: f64,
    pub body: f64,
    pub small: f64,
    /// Height of one wrapped line of body text
    pub line_height: f64,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            title: 16.0,
            heading: 11.0,
            body: 9.0,
            small: 7.5,
            line_height: 12.0,
        }
    }
}

/// Width and height of a fixed box
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BoxSize {
    pub width: f64,
    pub height: f64,
}

impl Default for BoxSize {
    fn default() -> Self {
        Self {
            width: 90.0,
            height: 110.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SignatureConfig {
    pub slot_width: f64,
    /// Space left above the signature line
    pub height: f64,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            slot_width: 110.0,
            height: 48.0,
        }
    }
}

/// Everything that shapes a ticket besides the record itself
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TicketConfig {
    pub organization: String,
    pub document_title: String,
    pub page: PageConfig,
    pub typography: Typography,
    pub photo: BoxSize,
    /// Edge length of the square verification code
    pub code_size: f64,
    pub code_timeout_ms: u64,
    /// Characters of the exam name carried in the verification payload
    pub payload_exam_chars: usize,
    pub signature: SignatureConfig,
    pub instructions: Vec<String>,
    /// Declaration text; `{name}` is replaced with the candidate name
    pub declaration: String,
    pub currency_prefix: String,
    /// Records composed concurrently by a batch
    pub max_parallel: usize,
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            organization: "Examination Board".to_string(),
            document_title: "HALL TICKET".to_string(),
            page: PageConfig::default(),
            typography: Typography::default(),
            photo: BoxSize::default(),
            code_size: 90.0,
            code_timeout_ms: 5_000,
            payload_exam_chars: crate::payload::DEFAULT_EXAM_CHARS,
            signature: SignatureConfig::default(),
            instructions: default_instructions(),
            declaration: "I, {name}, declare that the particulars given above are correct \
                          and that I will abide by the rules of the examination."
                .to_string(),
            currency_prefix: "Rs. ".to_string(),
            max_parallel: 4,
        }
    }
}

fn default_instructions() -> Vec<String> {
    [
        "Bring this hall ticket and a valid photo identity card to the examination centre.",
        "Report at the centre before the reporting time. Late entry will not be permitted.",
        "Electronic devices, including mobile phones and smart watches, are not allowed inside the hall.",
        "Candidates must sign in the presence of the invigilator.",
        "Retain this hall ticket until the results are declared.",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl TicketConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TicketConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject geometry and settings that leave nothing to lay out
    pub fn validate(&self) -> Result<()> {
        let page = &self.page;
        let invalid = |msg: String| Err(TicketError::Config(msg));

        PageSize::new(page.width, page.height)?;

        if page.margin < 0.0 || page.gutter < 0.0 || page.border_inset < 0.0 {
            return invalid("margin, gutter and border inset must not be negative".to_string());
        }
        if page.border_inset > page.margin {
            return invalid(format!(
                "border inset {} must not exceed the margin {}",
                page.border_inset, page.margin
            ));
        }

        let geometry = self.geometry();
        if geometry.content_width() <= 0.0 || geometry.usable_height() <= 0.0 {
            return invalid(format!(
                "margin {} leaves no usable area on a {} x {} page",
                page.margin, page.width, page.height
            ));
        }

        let typo = &self.typography;
        let sizes = [typo.title, typo.heading, typo.body, typo.small];
        if sizes.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return invalid("font sizes must be positive".to_string());
        }
        if typo.line_height < typo.body {
            return invalid(format!(
                "line height {} is smaller than the body size {}",
                typo.line_height, typo.body
            ));
        }

        if self.photo.width <= 0.0 || self.photo.height <= 0.0 || self.code_size <= 0.0 {
            return invalid("photo and code sizes must be positive".to_string());
        }
        if self.aside_width() * 2.0 > geometry.content_width() {
            return invalid(format!(
                "photo/code panel of {} pt leaves too little room for fields",
                self.aside_width()
            ));
        }
        if self.signature.slot_width <= 0.0 || self.signature.height < 0.0 {
            return invalid("signature slots need a positive width".to_string());
        }

        if self.code_timeout_ms == 0 {
            return invalid("code timeout must be positive".to_string());
        }
        if self.max_parallel == 0 {
            return invalid("max parallel must be at least 1".to_string());
        }

        Ok(())
    }

    pub fn geometry(&self) -> PageGeometry {
        PageGeometry {
            width: self.page.width,
            height: self.page.height,
            margin: self.page.margin,
            gutter: self.page.gutter,
        }
    }

    pub fn page_size(&self) -> Result<PageSize> {
        Ok(PageSize::new(self.page.width, self.page.height)?)
    }

    pub fn code_timeout(&self) -> Duration {
        Duration::from_millis(self.code_timeout_ms)
    }

    /// Width of the photo/code panel in the candidate section
    pub fn aside_width(&self) -> f64 {
        self.photo.width.max(self.code_size)
    }

    /// Declaration with the candidate name filled in
    pub fn declaration_for(&self, name: &str) -> String {
        self.declaration.replace("{name}", name)
    }
}
