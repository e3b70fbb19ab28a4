use once_cell::sync::Lazy;
use regex::Regex;

static REMOTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?iu)(?:\b(?:remote|anywhere|work[\s-]?from[\s-]?home|wfh|online|virtual)\b|ریموت|دورکاری|کار\s*از\s*راه\s*دور)",
    )
    .expect("valid regex")
});

/// True when the text carries an English or Persian remote-work signal
pub fn is_remote(text: &str) -> bool {
    REMOTE_RE.is_match(text)
}
