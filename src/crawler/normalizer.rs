//! Raw item to listing normalization
//!
//! The dedup-agnostic half of ingestion: required-field checks, salary
//! backfill from free text, and defaults for optional fields. Nothing here
//! touches storage.

use crate::model::{Category, Extras, Listing, RawItem};
use crate::text::parse_salary;

/// Normalizes a batch, silently dropping items without a title or link
///
/// # Arguments
///
/// * `items` - Adapter output
/// * `default_category` - The owning source's category, used when an item
///   carries none
pub fn normalize(items: Vec<RawItem>, default_category: Category) -> Vec<Listing> {
    let total = items.len();
    let listings: Vec<Listing> = items
        .into_iter()
        .filter_map(|item| normalize_item(item, default_category))
        .collect();

    if listings.len() < total {
        tracing::debug!(
            dropped = total - listings.len(),
            kept = listings.len(),
            "Dropped items without title or link"
        );
    }
    listings
}

/// Normalizes one item; `None` when title or link is blank
pub fn normalize_item(mut item: RawItem, default_category: Category) -> Option<Listing> {
    item.salary_min = item.salary_min.filter(|v| is_salary_amount(*v));
    item.salary_max = item.salary_max.filter(|v| is_salary_amount(*v));

    let title = item.title.trim().to_string();
    let link = item.link.trim().to_string();
    if title.is_empty() || link.is_empty() {
        return None;
    }

    let description = item
        .description
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    let mut salary_min = item.salary_min;
    let mut salary_max = item.salary_max;
    let mut currency = item
        .currency
        .as_deref()
        .map(|c| c.trim().to_uppercase())
        .unwrap_or_default();
    let mut period = item.period;

    if item.lacks_salary() {
        let empty = Extras::new();
        let extras = item.extras.as_ref().unwrap_or(&empty);
        let parsed = parse_salary(&salary_text(&title, &description, extras));

        salary_min = parsed.min;
        salary_max = parsed.max;
        if currency.is_empty() {
            currency = parsed.currency;
        }
        if period.is_none() {
            period = parsed.period;
        }
    }

    Some(Listing {
        title,
        description,
        link,
        category: item.category.unwrap_or(default_category),
        company: trimmed(item.company),
        location: trimmed(item.location),
        salary_min,
        salary_max,
        currency,
        period,
        tags: item.tags.unwrap_or_default(),
        extras: item.extras.unwrap_or_default(),
        raw_text: item.raw_text.unwrap_or_default(),
    })
}

/// Extras keys holding ids, timestamps and counters rather than listing text
const BOOKKEEPING_KEYS: &[&str] = &["id", "date", "epoch", "published", "views"];

/// Text scanned for a salary: title, description and stringified extras
///
/// Bookkeeping extras are left out; a message id or an ISO date would
/// otherwise read as a salary range.
pub fn salary_text(title: &str, description: &str, extras: &Extras) -> String {
    let filtered: Extras = extras
        .iter()
        .filter(|(key, _)| {
            let key = key.to_ascii_lowercase();
            !BOOKKEEPING_KEYS.contains(&key.as_str())
                && !["_id", "_date", "_at"].iter().any(|suffix| key.ends_with(suffix))
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    format!("{} {} {}", title, description, serde_json::Value::Object(filtered))
}

/// Salary bounds are finite and non-negative
fn is_salary_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}
