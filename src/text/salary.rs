use crate::model::PayPeriod;
use once_cell::sync::Lazy;
use regex::Regex;

const AMOUNT: &str = r"\d+(?:[.,]\d{3})*(?:[.,]\d+)?(?:\s*[kKmM]\b)?";
const CURRENCY: &str = r"(?:USD|EUR|GBP|CAD|AUD|CHF|JPY|SEK|NOK|DKK|INR|₮|₽|\$|€|£)";
const PERIOD: &str =
    r"(?:per\s+(?:year|month|hour|day)|/year|/month|/hour|yr|year|annum|mo|month|hr|hour|day)";

static SALARY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)(?P<cur1>{CURRENCY})?\s*(?P<min>{AMOUNT})(?:\s*[-–]\s*(?P<cur2>{CURRENCY})?\s*(?P<max>{AMOUNT}))?\s*(?P<per>{PERIOD})?"
    ))
    .expect("valid regex")
});

/// A salary range read from free text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Salary {
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// ISO code when known, the raw symbol otherwise, blank when absent
    pub currency: String,
    pub period: Option<PayPeriod>,
}

impl Salary {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none() && self.currency.is_empty() && self.period.is_none()
    }
}

/// Scans text for the first `[currency] amount [- [currency] amount] [period]`
///
/// Amounts accept thousands grouping and `k`/`m` suffixes. A `,` or `.`
/// followed by exactly three digits is a grouping separator, otherwise it
/// is the decimal point. Returns an empty `Salary` when nothing matches.
///
/// # Example
///
/// ```
/// use remotebridge::model::PayPeriod;
/// use remotebridge::text::parse_salary;
///
/// let s = parse_salary("$80k-$120k/year");
/// assert_eq!(s.min, Some(80_000.0));
/// assert_eq!(s.max, Some(120_000.0));
/// assert_eq!(s.currency, "USD");
/// assert_eq!(s.period, Some(PayPeriod::Yearly));
/// ```
pub fn parse_salary(text: &str) -> Salary {
    if text.is_empty() {
        return Salary::default();
    }
    let Some(caps) = SALARY_RE.captures(text) else {
        return Salary::default();
    };

    let currency = caps
        .name("cur1")
        .or_else(|| caps.name("cur2"))
        .map(|m| currency_code(m.as_str()))
        .unwrap_or_default();

    Salary {
        min: caps.name("min").and_then(|m| amount_to_number(m.as_str())),
        max: caps.name("max").and_then(|m| amount_to_number(m.as_str())),
        currency,
        period: caps.name("per").and_then(|m| period_from_keyword(m.as_str())),
    }
}

fn currency_code(token: &str) -> String {
    match token {
        "$" => "USD".to_string(),
        "€" => "EUR".to_string(),
        "£" => "GBP".to_string(),
        other => other.to_uppercase(),
    }
}

/// Converts an amount token such as `1,500.50`, `2.500` or `80k` to a number
fn amount_to_number(token: &str) -> Option<f64> {
    let t = token.trim().to_ascii_lowercase();
    let (digits, multiplier) = if let Some(rest) = t.strip_suffix('k') {
        (rest.trim_end(), 1_000.0)
    } else if let Some(rest) = t.strip_suffix('m') {
        (rest.trim_end(), 1_000_000.0)
    } else {
        (t.as_str(), 1.0)
    };

    let mut parts = digits.split(['.', ',']);
    let mut number = parts.next()?.to_string();
    for part in parts {
        if part.len() == 3 {
            number.push_str(part);
        } else {
            number.push('.');
            number.push_str(part);
        }
    }

    number.parse::<f64>().ok().map(|n| n * multiplier)
}

/// Maps a period keyword; the checks run yearly, monthly, hourly, daily
fn period_from_keyword(keyword: &str) -> Option<PayPeriod> {
    let s = keyword.to_lowercase();
    if ["yr", "year", "annum"].iter().any(|k| s.contains(k)) {
        Some(PayPeriod::Yearly)
    } else if ["mo", "month"].iter().any(|k| s.contains(k)) {
        Some(PayPeriod::Monthly)
    } else if ["hr", "hour"].iter().any(|k| s.contains(k)) {
        Some(PayPeriod::Hourly)
    } else if s.contains("day") {
        Some(PayPeriod::Daily)
    } else {
        None
    }
}
