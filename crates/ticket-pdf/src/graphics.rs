//! Path drawing operators

use crate::content::{Color, Stroke};
use crate::text::fmt_num;

fn stroke_state(ops: &mut String, stroke: &Stroke) {
    ops.push_str(&format!("{} w\n", fmt_num(stroke.width)));
    ops.push_str(&format!(
        "{} {} {} RG\n",
        stroke.color.r, stroke.color.g, stroke.color.b
    ));
    match stroke.dash {
        Some((on, off)) => ops.push_str(&format!("[{} {}] 0 d\n", fmt_num(on), fmt_num(off))),
        None => ops.push_str("[] 0 d\n"),
    }
}

/// Generate operators for a rectangle
///
/// # Arguments
/// * `x`, `y` - Lower-left corner in PDF coordinates
/// * `width`, `height` - Size in points
/// * `stroke` - Outline style, if outlined
/// * `fill` - Fill color, if filled
///
/// Returns no operators when neither stroke nor fill is given.
pub fn rect_operators(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    stroke: Option<&Stroke>,
    fill: Option<Color>,
) -> Vec<u8> {
    let paint = match (stroke.is_some(), fill.is_some()) {
        (true, true) => "B",
        (true, false) => "S",
        (false, true) => "f",
        (false, false) => return Vec::new(),
    };

    let mut ops = String::from("q\n");
    if let Some(stroke) = stroke {
        stroke_state(&mut ops, stroke);
    }
    if let Some(fill) = fill {
        ops.push_str(&format!("{} {} {} rg\n", fill.r, fill.g, fill.b));
    }
    ops.push_str(&format!(
        "{} {} {} {} re\n{paint}\nQ\n",
        fmt_num(x),
        fmt_num(y),
        fmt_num(width),
        fmt_num(height)
    ));
    ops.into_bytes()
}

/// Generate operators for a straight line between two PDF-space points
pub fn line_operators(x1: f64, y1: f64, x2: f64, y2: f64, stroke: &Stroke) -> Vec<u8> {
    let mut ops = String::from("q\n");
    stroke_state(&mut ops, stroke);
    ops.push_str(&format!(
        "{} {} m\n{} {} l\nS\nQ\n",
        fmt_num(x1),
        fmt_num(y1),
        fmt_num(x2),
        fmt_num(y2)
    ));
    ops.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_stroke_only() {
        let ops = rect_operators(10.0, 20.0, 100.0, 50.0, Some(&Stroke::solid(0.5)), None);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("0.5 w"));
        assert!(ops_str.contains("10 20 100 50 re\nS\n"));
        assert!(ops_str.starts_with("q\n"));
        assert!(ops_str.ends_with("Q\n"));
    }

    #[test]
    fn test_rect_fill_and_stroke() {
        let ops = rect_operators(
            0.0,
            0.0,
            5.0,
            5.0,
            Some(&Stroke::solid(1.0)),
            Some(Color::gray(0.9)),
        );
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("0.9 0.9 0.9 rg"));
        assert!(ops_str.contains("re\nB\n"));
    }

    #[test]
    fn test_rect_nothing_to_paint() {
        assert!(rect_operators(0.0, 0.0, 5.0, 5.0, None, None).is_empty());
    }

    #[test]
    fn test_dashed_line() {
        let ops = line_operators(0.0, 0.0, 100.0, 0.0, &Stroke::dashed(0.75, 3.0, 2.0));
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("[3 2] 0 d"));
        assert!(ops_str.contains("0 0 m\n100 0 l\nS"));
    }
}
