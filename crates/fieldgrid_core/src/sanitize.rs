//! Free-text sanitization applied before values reach storage.

use crate::models::value::FieldValue;

/// Drop `<script>` and `<style>` elements together with their contents.
///
/// An element that never closes is left for [`strip_tags`] to handle.
fn drop_raw_text_elements(input: &str) -> String {
    let lower = input.to_ascii_lowercase();
    let mut out = String::with_capacity(input.len());
    let mut pos = 0;
    while pos < input.len() {
        let next = ["script", "style"]
            .iter()
            .filter_map(|tag| {
                lower[pos..]
                    .find(&format!("<{}", tag))
                    .map(|offset| (pos + offset, *tag))
            })
            .min_by_key(|(start, _)| *start);
        let Some((start, tag)) = next else {
            break;
        };
        let close = format!("</{}", tag);
        let Some(close_start) = lower[start..].find(&close).map(|offset| start + offset) else {
            break;
        };
        let end = lower[close_start..]
            .find('>')
            .map_or(input.len(), |offset| close_start + offset + 1);
        out.push_str(&input[pos..start]);
        pos = end;
    }
    out.push_str(&input[pos..]);
    out
}

/// Drop markup tags (`<tag ...>`, `</tag>`, `<!-- -->`, `<?...?>`).
///
/// A `<` that does not open a tag, or a tag that never closes, is kept as
/// literal text.
fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let opens_tag = after
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'));
        match after.find('>') {
            Some(end) if opens_tag => rest = &after[end + 1..],
            _ => {
                out.push('<');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Sanitize multi-line free text: script/style elements removed, tags stripped, control characters other
/// than newline and tab removed, surrounding whitespace trimmed.
pub fn sanitize_multiline(input: &str) -> String {
    let stripped = strip_tags(&drop_raw_text_elements(input));
    let cleaned: String = stripped
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect();
    cleaned.trim().to_string()
}

/// Sanitize single-line text: tags stripped and every whitespace run
/// (including line breaks and tabs) collapsed to one space.
pub fn sanitize_single_line(input: &str) -> String {
    let stripped = strip_tags(&drop_raw_text_elements(input));
    stripped
        .split(|c: char| c.is_whitespace() || c.is_control())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sanitize a field value for storage: scalars as multi-line text, list
/// elements as single-line text.
pub fn sanitize_value(value: &FieldValue) -> FieldValue {
    match value {
        FieldValue::Scalar(text) => FieldValue::Scalar(sanitize_multiline(text)),
        FieldValue::List(items) => {
            FieldValue::List(items.iter().map(|item| sanitize_single_line(item)).collect())
        }
    }
}
