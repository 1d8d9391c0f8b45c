//! Text encoding for fixed code-page writers
//!
//! The PDF writer uses a built-in Courier font whose code page is printable
//! ASCII. Anything else is replaced character by character, so one
//! unsupported character never truncates the rest of a document.

/// Character written in place of an unsupported one
pub const REPLACEMENT: char = '?';

/// Text converted to the writer's code page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub text: String,

    /// Number of characters that were replaced
    pub replaced: usize,
}

impl Encoded {
    pub fn is_lossless(&self) -> bool {
        self.replaced == 0
    }
}

/// Maps text onto printable ASCII plus newlines
///
/// Tabs become a space, carriage returns are dropped and every other
/// unsupported character becomes [`REPLACEMENT`].
///
/// # Example
///
/// ```
/// use sumi_scribe::output::encoding::to_code_page;
///
/// let encoded = to_code_page("Café 다음");
/// assert_eq!(encoded.text, "Caf? ??");
/// assert_eq!(encoded.replaced, 3);
/// ```
pub fn to_code_page(text: &str) -> Encoded {
    let mut replaced = 0;
    let mut out = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            ' '..='~' | '\n' => out.push(c),
            '\t' => out.push(' '),
            '\r' => {}
            _ => {
                replaced += 1;
                out.push(REPLACEMENT);
            }
        }
    }

    Encoded {
        text: out,
        replaced,
    }
}

/// Reduces a URL path segment to a safe file stem
///
/// Keeps ASCII alphanumerics, `-` and `_`; everything else becomes `_`.
/// Returns None when nothing usable remains.
pub fn sanitize_file_stem(segment: &str) -> Option<String> {
    let stem = segment.rsplit_once('.').map_or(segment, |(stem, _)| stem);
    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(120)
        .collect();

    if cleaned.chars().all(|c| c == '_') {
        None
    } else {
        Some(cleaned)
    }
}
