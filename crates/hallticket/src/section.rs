//! Bordered sections of labeled fields, and centered banners
//!
//! Measuring and drawing share one [`SectionLayout`], so the height a
//! composer reserves is exactly the height that gets drawn.

use crate::config::Typography;
use crate::cursor::ColumnBand;
use ticket_pdf::{Align, Color, Page, Point, Rect, StandardFont, Stroke, TextOp};
use ticket_text::wrap_to_width;

/// Text shown for an absent value
pub const NOT_AVAILABLE: &str = "N/A";

/// Inner padding of a section box
const PADDING: f64 = 6.0;
/// Extra space below each row
const ROW_GAP: f64 = 3.0;
/// Space between a label and its value
const LABEL_GAP: f64 = 4.0;
/// Label share of a cell when a section sets none
const DEFAULT_LABEL_RATIO: f64 = 0.4;
const BORDER_WIDTH: f64 = 0.75;
const TITLE_SHADE: f32 = 0.9;
/// Banner line height as a multiple of the font size
const BANNER_LEADING: f64 = 1.35;
const RULE_GAP: f64 = 4.0;

/// Where a field goes within its section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Left,
    Right,
    /// Full width
    Span,
}

/// One `(label, value, column)` entry
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub label: String,
    pub value: Option<String>,
    pub column: Column,
}

impl Field {
    pub fn new(label: &str, value: Option<&str>, column: Column) -> Self {
        Self {
            label: label.to_string(),
            value: value.map(str::to_string),
            column,
        }
    }

    pub fn left(label: &str, value: Option<&str>) -> Self {
        Self::new(label, value, Column::Left)
    }

    pub fn right(label: &str, value: Option<&str>) -> Self {
        Self::new(label, value, Column::Right)
    }

    pub fn span(label: &str, value: Option<&str>) -> Self {
        Self::new(label, value, Column::Span)
    }

    /// Value to print; blank or absent values become [`NOT_AVAILABLE`]
    pub fn display_value(&self) -> &str {
        match self.value.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => value,
            _ => NOT_AVAILABLE,
        }
    }
}

/// Fixed-width panel on the right of a section body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aside {
    pub width: f64,
    pub min_height: f64,
}

/// A titled, bordered block of fields
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub fields: Vec<Field>,
    /// Share of a cell's width given to the label
    pub label_ratio: f64,
    pub aside: Option<Aside>,
}

impl Section {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            fields: Vec::new(),
            label_ratio: DEFAULT_LABEL_RATIO,
            aside: None,
        }
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn with_aside(mut self, aside: Aside) -> Self {
        self.aside = Some(aside);
        self
    }

    pub fn with_label_ratio(mut self, ratio: f64) -> Self {
        self.label_ratio = ratio.clamp(0.05, 0.9);
        self
    }
}

/// A laid-out field
#[derive(Debug, Clone, PartialEq)]
pub struct CellLayout {
    pub x: f64,
    pub label_width: f64,
    pub label_lines: Vec<String>,
    pub value_lines: Vec<String>,
}

impl CellLayout {
    fn line_count(&self) -> usize {
        self.label_lines.len().max(self.value_lines.len()).max(1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    pub cells: Vec<CellLayout>,
    pub height: f64,
}

/// Measured section, ready to draw at any vertical position
#[derive(Debug, Clone, PartialEq)]
pub struct SectionLayout {
    pub title: String,
    pub x: f64,
    pub width: f64,
    pub title_height: f64,
    pub rows: Vec<RowLayout>,
    pub aside: Option<Aside>,
    pub body_height: f64,
    pub height: f64,
}

impl SectionLayout {
    pub fn field_count(&self) -> usize {
        self.rows.iter().map(|row| row.cells.len()).sum()
    }

    /// Aside panel when the section is drawn with its top at `top`
    pub fn aside_rect(&self, top: f64) -> Option<Rect> {
        self.aside.map(|aside| {
            Rect::new(
                self.x + self.width - PADDING - aside.width,
                top + self.title_height + PADDING,
                aside.width,
                self.body_height - 2.0 * PADDING,
            )
        })
    }
}

/// One centered banner line
#[derive(Debug, Clone, PartialEq)]
pub struct BannerLine {
    pub text: String,
    pub font: StandardFont,
    pub size: f64,
}

impl BannerLine {
    pub fn regular(text: &str, size: f64) -> Self {
        Self {
            text: text.to_string(),
            font: StandardFont::Helvetica,
            size,
        }
    }

    pub fn bold(text: &str, size: f64) -> Self {
        Self {
            text: text.to_string(),
            font: StandardFont::HelveticaBold,
            size,
        }
    }
}

/// Unbordered block of centered lines, used for headers and footers
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Banner {
    pub lines: Vec<BannerLine>,
    pub rule_above: bool,
    pub rule_below: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BannerLayout {
    lines: Vec<BannerLine>,
    rule_above: bool,
    rule_below: bool,
    pub height: f64,
}

/// Lays out and draws sections across a fixed horizontal band
#[derive(Debug, Clone)]
pub struct SectionRenderer {
    typography: Typography,
    band: ColumnBand,
}

/// Baseline that vertically centers text of `size` in a line box
fn baseline(line_top: f64, line_height: f64, font: StandardFont, size: f64) -> f64 {
    line_top + (line_height + font.cap_height() * size) / 2.0
}

fn wrap(text: &str, width: f64, font: StandardFont, size: f64) -> Vec<String> {
    wrap_to_width(text, width, |s| font.text_width_points(s, size))
}

impl SectionRenderer {
    /// Renderer for sections spanning `band`; two-column rows split it
    /// by the band's gutter
    pub fn new(typography: Typography, band: ColumnBand) -> Self {
        Self { typography, band }
    }

    fn title_height(&self) -> f64 {
        self.typography.heading + 8.0
    }

    /// Measure a section
    pub fn layout(&self, section: &Section) -> SectionLayout {
        let typo = &self.typography;
        let aside_space = section.aside.map_or(0.0, |a| a.width + PADDING);
        let fields = self.band.inset(PADDING, PADDING + aside_space);

        let mut rows = Vec::new();
        for group in group_rows(&section.fields) {
            let cells: Vec<CellLayout> = group
                .iter()
                .map(|field| {
                    let (x, width) = match field.column {
                        Column::Left => (fields.column_x(0, 2), fields.column_width(2)),
                        Column::Right => (fields.column_x(1, 2), fields.column_width(2)),
                        Column::Span => (fields.x, fields.width),
                    };
                    let label_width = width * section.label_ratio;
                    let value_width = (width - label_width - LABEL_GAP).max(1.0);
                    CellLayout {
                        x,
                        label_width,
                        label_lines: wrap(
                            &field.label,
                            label_width,
                            StandardFont::HelveticaBold,
                            typo.body,
                        ),
                        value_lines: wrap(
                            field.display_value(),
                            value_width,
                            StandardFont::Helvetica,
                            typo.body,
                        ),
                    }
                })
                .collect();

            let lines = cells.iter().map(CellLayout::line_count).max().unwrap_or(1);
            rows.push(RowLayout {
                cells,
                height: lines as f64 * typo.line_height + ROW_GAP,
            });
        }

        let rows_height: f64 = rows.iter().map(|row| row.height).sum();
        let aside_height = section.aside.map_or(0.0, |a| a.min_height);
        let body_height = rows_height.max(aside_height) + 2.0 * PADDING;
        let title_height = self.title_height();

        SectionLayout {
            title: section.title.clone(),
            x: self.band.x,
            width: self.band.width,
            title_height,
            rows,
            aside: section.aside,
            body_height,
            height: title_height + body_height,
        }
    }

    /// Draw a measured section with its top edge at `top`
    ///
    /// Returns the consumed height, always `layout.height`.
    pub fn draw(&self, page: &mut Page, top: f64, layout: &SectionLayout) -> f64 {
        let typo = &self.typography;
        let stroke = Stroke::solid(BORDER_WIDTH);

        page.push_rect(
            Rect::new(layout.x, top, layout.width, layout.title_height),
            Some(stroke),
            Some(Color::gray(TITLE_SHADE)),
        );
        page.push_text(TextOp::new(
            layout.title.clone(),
            layout.x + PADDING,
            baseline(top, layout.title_height, StandardFont::HelveticaBold, typo.heading),
            StandardFont::HelveticaBold,
            typo.heading,
        ));
        page.push_rect(
            Rect::new(layout.x, top, layout.width, layout.height),
            Some(stroke),
            None,
        );

        let mut row_top = top + layout.title_height + PADDING;
        for row in &layout.rows {
            for cell in &row.cells {
                let value_x = cell.x + cell.label_width + LABEL_GAP;
                for (i, line) in cell.label_lines.iter().enumerate() {
                    let line_top = row_top + i as f64 * typo.line_height;
                    page.push_text(TextOp::new(
                        line.clone(),
                        cell.x,
                        baseline(line_top, typo.line_height, StandardFont::HelveticaBold, typo.body),
                        StandardFont::HelveticaBold,
                        typo.body,
                    ));
                }
                for (i, line) in cell.value_lines.iter().enumerate() {
                    let line_top = row_top + i as f64 * typo.line_height;
                    page.push_text(TextOp::new(
                        line.clone(),
                        value_x,
                        baseline(line_top, typo.line_height, StandardFont::Helvetica, typo.body),
                        StandardFont::Helvetica,
                        typo.body,
                    ));
                }
            }
            row_top += row.height;
        }

        layout.height
    }

    /// Measure a banner
    pub fn layout_banner(&self, banner: &Banner) -> BannerLayout {
        let lines: Vec<BannerLine> = banner
            .lines
            .iter()
            .flat_map(|line| {
                wrap(&line.text, self.band.width, line.font, line.size)
                    .into_iter()
                    .map(|text| BannerLine {
                        text,
                        font: line.font,
                        size: line.size,
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        let text_height: f64 = lines.iter().map(|l| l.size * BANNER_LEADING).sum();
        let rules = [banner.rule_above, banner.rule_below]
            .iter()
            .filter(|r| **r)
            .count();

        BannerLayout {
            lines,
            rule_above: banner.rule_above,
            rule_below: banner.rule_below,
            height: text_height + rules as f64 * RULE_GAP,
        }
    }

    /// Draw a measured banner with its top edge at `top`; returns its height
    pub fn draw_banner(&self, page: &mut Page, top: f64, layout: &BannerLayout) -> f64 {
        let stroke = Stroke::solid(BORDER_WIDTH);
        let center = self.band.x + self.band.width / 2.0;
        let mut y = top;

        if layout.rule_above {
            page.push_line(
                Point::new(self.band.x, y),
                Point::new(self.band.x + self.band.width, y),
                stroke,
            );
            y += RULE_GAP;
        }
        for line in &layout.lines {
            let line_height = line.size * BANNER_LEADING;
            page.push_text(
                TextOp::new(
                    line.text.clone(),
                    center,
                    baseline(y, line_height, line.font, line.size),
                    line.font,
                    line.size,
                )
                .align(Align::Center),
            );
            y += line_height;
        }
        if layout.rule_below {
            y += RULE_GAP;
            page.push_line(
                Point::new(self.band.x, y),
                Point::new(self.band.x + self.band.width, y),
                stroke,
            );
        }

        layout.height
    }
}

/// Pair consecutive left/right fields into rows
fn group_rows(fields: &[Field]) -> Vec<Vec<&Field>> {
    let mut rows = Vec::new();
    let mut pending_left: Option<&Field> = None;

    for field in fields {
        match field.column {
            Column::Left => {
                if let Some(left) = pending_left.replace(field) {
                    rows.push(vec![left]);
                }
            }
            Column::Right => {
                let mut row: Vec<&Field> = pending_left.take().into_iter().collect();
                row.push(field);
                rows.push(row);
            }
            Column::Span => {
                if let Some(left) = pending_left.take() {
                    rows.push(vec![left]);
                }
                rows.push(vec![field]);
            }
        }
    }
    if let Some(left) = pending_left {
        rows.push(vec![left]);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn renderer() -> SectionRenderer {
        SectionRenderer::new(Typography::default(), band(18.0))
    }

    fn band(gutter: f64) -> ColumnBand {
        ColumnBand {
            x: 36.0,
            width: 523.0,
            gutter,
        }
    }

    fn venue(address: &str) -> Section {
        Section::new("Examination Venue")
            .field(Field::span("Centre Name", Some("Govt. Polytechnic")))
            .field(Field::span("Address", Some(address)))
            .field(Field::left("City", Some("Pune")))
            .field(Field::right("State", None))
    }

    #[test]
    fn test_display_value_fallback() {
        assert_eq!(Field::left("Gender", None).display_value(), NOT_AVAILABLE);
        assert_eq!(Field::left("Gender", Some("  ")).display_value(), NOT_AVAILABLE);
        assert_eq!(Field::left("Gender", Some(" F ")).display_value(), "F");
    }

    #[test]
    fn test_group_rows() {
        let fields = vec![
            Field::span("A", None),
            Field::left("B", None),
            Field::right("C", None),
            Field::left("D", None),
            Field::left("E", None),
            Field::right("F", None),
            Field::left("G", None),
        ];
        let rows: Vec<Vec<&str>> = group_rows(&fields)
            .iter()
            .map(|row| row.iter().map(|f| f.label.as_str()).collect())
            .collect();

        assert_eq!(
            rows,
            vec![vec!["A"], vec!["B", "C"], vec!["D"], vec!["E", "F"], vec!["G"]]
        );
    }

    #[test]
    fn test_layout_height_from_rows() {
        let layout = renderer().layout(&venue("Plot 4"));
        let typo = Typography::default();

        // Three single-line rows
        let expected_rows = 3.0 * (typo.line_height + ROW_GAP);
        assert_eq!(layout.rows.len(), 3);
        assert_eq!(layout.field_count(), 4);
        assert_eq!(layout.title_height, typo.heading + 8.0);
        assert_eq!(layout.height, layout.title_height + expected_rows + 2.0 * PADDING);
    }

    #[test]
    fn test_gutter_separates_columns() {
        let layout = |gutter| {
            SectionRenderer::new(Typography::default(), band(gutter)).layout(&venue("Plot 4"))
        };
        let narrow = layout(0.0);
        let wide = layout(100.0);

        let (city, state) = (&narrow.rows[2].cells[0], &narrow.rows[2].cells[1]);
        let inner = 523.0 - 2.0 * PADDING;
        assert_eq!(city.x, 36.0 + PADDING);
        assert_eq!(state.x, 36.0 + PADDING + inner / 2.0);

        let (city, state) = (&wide.rows[2].cells[0], &wide.rows[2].cells[1]);
        let column = (inner - 100.0) / 2.0;
        assert_eq!(city.x, 36.0 + PADDING);
        assert_eq!(state.x, 36.0 + PADDING + column + 100.0);
        assert_eq!(state.label_width, column * DEFAULT_LABEL_RATIO);

        // Spanning cells ignore the gutter
        assert_eq!(wide.rows[1].cells[0].label_width, inner * DEFAULT_LABEL_RATIO);
    }

    #[test]
    fn test_long_value_wraps_and_grows() {
        let short = renderer().layout(&venue("Plot 4"));
        let long_address = "Government Higher Secondary School, Near Old Bus Stand, ".repeat(6);
        let long = renderer().layout(&venue(&long_address));

        let address_cell = &long.rows[1].cells[0];
        assert!(address_cell.value_lines.len() > 1);
        let extra_lines = address_cell.value_lines.len() - 1;
        let typo = Typography::default();
        assert_eq!(
            long.height - short.height,
            extra_lines as f64 * typo.line_height
        );

        let max_width = 523.0 - 2.0 * PADDING - address_cell.label_width - LABEL_GAP;
        for line in &address_cell.value_lines {
            assert!(StandardFont::Helvetica.text_width_points(line, typo.body) <= max_width);
        }
    }

    #[test]
    fn test_aside_sets_minimum_height() {
        let section = Section::new("Candidate")
            .field(Field::span("Name", Some("Asha Rao")))
            .with_aside(Aside {
                width: 90.0,
                min_height: 206.0,
            });
        let layout = renderer().layout(&section);

        assert_eq!(layout.body_height, 206.0 + 2.0 * PADDING);
        let aside = layout.aside_rect(100.0).unwrap();
        assert_eq!(aside.x, 36.0 + 523.0 - PADDING - 90.0);
        assert_eq!(aside.y, 100.0 + layout.title_height + PADDING);
        assert_eq!(aside.height, 206.0);

        // Fields stay clear of the aside
        for row in &layout.rows {
            for cell in &row.cells {
                assert!(cell.x < aside.x);
            }
        }
    }

    #[test]
    fn test_draw_reports_layout_height() {
        let renderer = renderer();
        let layout = renderer.layout(&venue("Plot 4"));
        let mut page = Page::new();

        let consumed = renderer.draw(&mut page, 200.0, &layout);
        assert_eq!(consumed, layout.height);

        // Every label is drawn, absent values print N/A
        for label in ["Centre Name", "Address", "City", "State"] {
            assert!(page.find_text(label).is_some(), "missing label {label}");
        }
        assert!(page.find_text(NOT_AVAILABLE).is_some());
        assert!(page.find_text("Examination Venue").is_some());

        // All text stays inside the box
        for text in page.texts() {
            assert!(text.y > 200.0 && text.y < 200.0 + layout.height);
        }
    }

    #[test]
    fn test_banner() {
        let renderer = renderer();
        let banner = Banner {
            lines: vec![
                BannerLine::bold("STATE BOARD", 16.0),
                BannerLine::regular("Hall Ticket", 11.0),
            ],
            rule_above: false,
            rule_below: true,
        };
        let layout = renderer.layout_banner(&banner);
        let expected = (16.0 + 11.0) * BANNER_LEADING + RULE_GAP;
        assert!((layout.height - expected).abs() < 1e-9);

        let mut page = Page::new();
        let height = renderer.draw_banner(&mut page, 40.0, &layout);
        assert_eq!(height, layout.height);

        let title = page.find_text("STATE BOARD").unwrap();
        assert_eq!(title.align, Align::Center);
        assert_eq!(title.x, 36.0 + 523.0 / 2.0);
    }
}
