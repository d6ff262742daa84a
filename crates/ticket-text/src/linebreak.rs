//! Width-driven line breaking
//!
//! The caller supplies the measuring function, so the same wrapping rules
//! apply to any font the renderer uses.

/// Wrap text so that no line is wider than `max_width`
///
/// Breaks on whitespace; explicit newlines always start a new line and a
/// blank line in the input stays blank. A word
/// that is wider than the whole line on its own is split between
/// characters. Always returns at least one (possibly empty) line.
///
/// # Arguments
/// * `text` - Text to wrap
/// * `max_width` - Available width, in the unit returned by `measure`
/// * `measure` - Width of a string
pub fn wrap_to_width<F>(text: &str, max_width: f64, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };

            if measure(&candidate) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            if measure(word) <= max_width {
                current = word.to_string();
            } else {
                let mut pieces = break_word(word, max_width, &measure);
                // The last piece stays open so the next word can join it
                current = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Split a single word into pieces no wider than `max_width`
///
/// Each piece holds at least one character, so a width smaller than a
/// single glyph still terminates.
pub fn break_word<F>(word: &str, max_width: f64, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let mut pieces = Vec::new();
    let mut current = String::new();

    for ch in word.chars() {
        current.push(ch);
        if measure(&current) > max_width && current.chars().count() > 1 {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(ch);
        }
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}
