/// XML 1.0 valid char ranges:
/// - 0x09, 0x0A, 0x0D
/// - 0x20..=0xD7FF
/// - 0xE000..=0xFFFD
/// - 0x10000..=0x10FFFF
fn is_valid_xml_char(c: char) -> bool {
    matches!(
        c as u32,
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF
    )
}

pub fn sanitize_xml_text(text: &str) -> String {
    text.chars().filter(|&c| is_valid_xml_char(c)).collect()
}

pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if !is_valid_xml_char(c) {
            continue;
        }
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Turns arbitrary names into graph-element keys and labels.
///
/// Implementations must be pure: the same input always yields the same
/// output, within a run and across runs.
pub trait Sanitize {
    fn sanitize(&self, raw: &str) -> String;
}

impl<F> Sanitize for F
where
    F: Fn(&str) -> String,
{
    fn sanitize(&self, raw: &str) -> String {
        self(raw)
    }
}

/// Default sanitizer.
///
/// Keeps letters and digits from any script (localized display names stay
/// readable), plus space and `-_.()|*`. Everything else, including quotes,
/// backslashes, markup characters and control characters, becomes `_`.
/// Characters outside XML 1.0 are dropped, then leading and trailing
/// whitespace is trimmed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafeName;

impl Sanitize for SafeName {
    fn sanitize(&self, raw: &str) -> String {
        sanitize_xml_text(raw)
            .trim()
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.' | '(' | ')' | '|' | '*') {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}
