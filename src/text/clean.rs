use once_cell::sync::Lazy;
use regex::Regex;

static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));
static P_CLOSE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</p\s*>").expect("valid regex"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static HSPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").expect("valid regex"));
static NEWLINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\n\s*").expect("valid regex"));

/// Leftover sequences of UTF-8 punctuation read as Windows-1252
const MOJIBAKE_REPLACEMENTS: &[(&str, &str)] = &[
    ("\u{e2}\u{20ac}\u{2122}", "'"),
    ("\u{e2}\u{20ac}\u{201c}", "–"),
    ("\u{e2}\u{20ac}\u{201d}", "—"),
    ("\u{e2}\u{20ac}\u{a6}", "…"),
    ("\u{e2}\u{20ac}\u{153}", "“"),
    ("\u{e2}\u{20ac}\u{9d}", "”"),
];

/// Strips markup, repairs double-encoded UTF-8 and normalizes whitespace
///
/// `<br>` and `</p>` become line breaks, other tags are dropped, HTML
/// entities are decoded, runs of spaces/tabs collapse to one space and blank
/// space around line breaks is removed.
///
/// # Example
///
/// ```
/// use remotebridge::text::clean_text;
///
/// assert_eq!(clean_text("<p>Rust &amp; Go</p><br/>  remote"), "Rust & Go\nremote");
/// ```
pub fn clean_text(s: &str) -> String {
    let s = repair_mojibake(s);
    let s = html_escape::decode_html_entities(&s);
    let s = BR_RE.replace_all(&s, "\n");
    let s = P_CLOSE_RE.replace_all(&s, "\n");
    let s = TAG_RE.replace_all(&s, "");
    let s = HSPACE_RE.replace_all(&s, " ");
    let s = NEWLINE_RE.replace_all(&s, "\n");
    s.trim().to_string()
}

/// Clips to `max` characters, marking the cut with an ellipsis
pub fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Re-decodes text that was UTF-8 but got read as Latin-1
///
/// Only attempted when a telltale lead character is present and every char
/// fits in one byte; a result that is not valid UTF-8 is discarded.
fn repair_mojibake(s: &str) -> String {
    let mut out = s.to_string();
    if s.contains(['Ã', 'â', 'ð']) && s.chars().all(|c| (c as u32) <= 0xFF) {
        let bytes: Vec<u8> = s.chars().map(|c| c as u32 as u8).collect();
        if let Ok(fixed) = String::from_utf8(bytes) {
            if !fixed.is_empty() {
                out = fixed;
            }
        }
    }
    for (bad, good) in MOJIBAKE_REPLACEMENTS {
        if out.contains(bad) {
            out = out.replace(bad, good);
        }
    }
    out
}
