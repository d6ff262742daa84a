//! Signature block variants

use crate::config::SignatureConfig;
use crate::record::StudentRecord;
use ticket_pdf::{Align, Page, Point, StandardFont, Stroke, TextOp};

const LINE_WIDTH: f64 = 0.6;

/// Number of signature slots, chosen once per record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureLayout {
    ThreeSlot,
    /// Adds a parent/guardian slot
    FourSlot,
}

impl SignatureLayout {
    /// Four slots when the record names a parent
    pub fn for_record(record: &StudentRecord) -> Self {
        if record.has_guardian() {
            SignatureLayout::FourSlot
        } else {
            SignatureLayout::ThreeSlot
        }
    }

    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            SignatureLayout::ThreeSlot => &[
                "Candidate's Signature",
                "Invigilator's Signature",
                "Centre Superintendent",
            ],
            SignatureLayout::FourSlot => &[
                "Candidate's Signature",
                "Parent/Guardian's Signature",
                "Invigilator's Signature",
                "Centre Superintendent",
            ],
        }
    }

    pub fn slot_count(&self) -> usize {
        self.labels().len()
    }

    /// Left edge and width of each slot across `[x, x + width]`
    ///
    /// Slots keep `slot_width` and the leftover width is split evenly into
    /// `n + 1` gaps. When the slots do not fit they shrink and the gaps
    /// collapse to zero.
    pub fn slot_positions(&self, x: f64, width: f64, slot_width: f64) -> Vec<(f64, f64)> {
        let n = self.slot_count() as f64;
        let slot = slot_width.min(width / n);
        let spacing = ((width - n * slot) / (n + 1.0)).max(0.0);

        (0..self.slot_count())
            .map(|i| (x + spacing + i as f64 * (slot + spacing), slot))
            .collect()
    }

    /// Draw the block with its top at `top`; returns the height used
    pub fn draw(
        &self,
        page: &mut Page,
        x: f64,
        width: f64,
        top: f64,
        config: &SignatureConfig,
        label_size: f64,
    ) -> f64 {
        let height = config.height;
        let line_y = top + height - 2.0 * label_size;
        let label_y = top + height - 0.5 * label_size;
        let stroke = Stroke::solid(LINE_WIDTH);

        for ((left, slot), label) in self
            .slot_positions(x, width, config.slot_width)
            .into_iter()
            .zip(self.labels())
        {
            page.push_line(Point::new(left, line_y), Point::new(left + slot, line_y), stroke);
            page.push_text(
                TextOp::new(
                    *label,
                    left + slot / 2.0,
                    label_y,
                    StandardFont::Helvetica,
                    label_size,
                )
                .align(Align::Center),
            );
        }

        height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawRecord;
    use serde_json::json;

    fn record(value: serde_json::Value) -> StudentRecord {
        StudentRecord::prepare(&RawRecord(value)).unwrap()
    }

    #[test]
    fn test_variant_follows_guardian_fields() {
        let without = record(json!({"id": "1", "name": "A", "examName": "E"}));
        assert_eq!(SignatureLayout::for_record(&without), SignatureLayout::ThreeSlot);

        let with = record(json!({
            "id": "1", "name": "A", "examName": "E", "motherName": "B"
        }));
        assert_eq!(SignatureLayout::for_record(&with), SignatureLayout::FourSlot);
        assert_eq!(SignatureLayout::FourSlot.slot_count(), 4);
    }

    #[test]
    fn test_even_spacing() {
        // 500 wide, 3 slots of 110: 170 left over, 4 gaps of 42.5
        let slots = SignatureLayout::ThreeSlot.slot_positions(50.0, 500.0, 110.0);
        assert_eq!(slots, vec![(92.5, 110.0), (245.0, 110.0), (397.5, 110.0)]);

        let last = slots[2];
        assert_eq!(550.0 - (last.0 + last.1), 42.5);
    }

    #[test]
    fn test_slots_shrink_when_too_wide() {
        let slots = SignatureLayout::FourSlot.slot_positions(0.0, 200.0, 110.0);
        assert_eq!(slots.len(), 4);
        for (i, (x, w)) in slots.iter().enumerate() {
            assert_eq!(*w, 50.0);
            assert_eq!(*x, i as f64 * 50.0);
        }
    }

    #[test]
    fn test_draw() {
        let mut page = Page::new();
        let config = SignatureConfig {
            slot_width: 110.0,
            height: 48.0,
        };
        let used = SignatureLayout::FourSlot.draw(&mut page, 36.0, 523.0, 600.0, &config, 7.5);

        assert_eq!(used, 48.0);
        assert_eq!(page.texts().count(), 4);
        assert!(page.contains_text("Parent/Guardian's Signature"));
        for text in page.texts() {
            assert!(text.y > 600.0 && text.y <= 648.0);
        }
    }
}
