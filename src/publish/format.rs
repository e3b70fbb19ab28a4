use crate::model::{Category, PayPeriod};
use crate::storage::ListingRecord;
use crate::text::{clean_text, clip, derive_hashtags};

/// Published descriptions are clipped to this many characters
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

const SEPARATOR: &str = "─────────────────";

fn header(category: Category) -> &'static str {
    match category {
        Category::Job => "💼 New Remote Job",
        Category::Project => "🚀 New Project",
        Category::Competition => "🏆 New Competition",
    }
}

/// Whether a value is believable for the given pay period
pub fn plausible_salary(period: PayPeriod, value: f64) -> bool {
    let (low, high) = match period {
        PayPeriod::Hourly => (5.0, 500.0),
        PayPeriod::Daily => (50.0, 5_000.0),
        PayPeriod::Monthly => (500.0, 100_000.0),
        PayPeriod::Yearly => (8_000.0, 1_500_000.0),
    };
    (low..=high).contains(&value)
}

/// Salary line, or `None` when the figures are missing or implausible
///
/// The upper end of the range is checked. Without a period, values up to
/// 300 are read as hourly and values from 5000 as yearly; anything in
/// between is suppressed.
pub fn format_salary_line(
    salary_min: Option<f64>,
    salary_max: Option<f64>,
    currency: &str,
    period: Option<PayPeriod>,
) -> Option<String> {
    let high = salary_max.or(salary_min)?;
    let low = salary_min.or(salary_max)?;

    let period = match period {
        Some(period) => period,
        None if high <= 300.0 => PayPeriod::Hourly,
        None if high >= 5_000.0 => PayPeriod::Yearly,
        None => return None,
    };
    if !plausible_salary(period, high) {
        return None;
    }

    let range = if low != high {
        format!("{low:.0}–{high:.0}")
    } else {
        format!("{low:.0}")
    };
    let currency = currency.trim().to_uppercase();
    let prefix = if currency.is_empty() {
        String::new()
    } else {
        format!("{currency} ")
    };

    Some(format!(
        "💰 Salary: {prefix}{range}/{}",
        period.display_unit()
    ))
}

/// Renders a stored listing as the message posted to the destination channel
///
/// Lines appear in a fixed order: header, separator, source, company,
/// location, title, description, salary, link, a blank line and hashtags.
/// Optional lines are omitted when empty; a location of "remote" is omitted
/// too.
pub fn format_message(record: &ListingRecord) -> String {
    let listing = &record.listing;
    let title = clean_text(&listing.title);
    let description = clean_text(&listing.description);
    let source = clean_text(&record.source_name);
    let company = clean_text(&listing.company);
    let location = clean_text(&listing.location);
    let link = listing.link.trim();

    let hashtags = derive_hashtags(&format!("{title} {description}"), &listing.tags).join(" ");

    let mut lines = vec![header(listing.category).to_string(), SEPARATOR.to_string()];
    if !source.is_empty() {
        lines.push(format!("🌐 Source: {source}"));
    }
    if company.chars().count() > 1 {
        lines.push(format!("🏢 Company: {company}"));
    }
    if location.chars().count() > 1 && !location.eq_ignore_ascii_case("remote") {
        lines.push(format!("📍 Location: {location}"));
    }
    if !title.is_empty() {
        lines.push(format!("📌 Title: {title}"));
    }
    if !description.is_empty() {
        lines.push(format!(
            "📝 Description: {}",
            clip(&description, MAX_DESCRIPTION_CHARS)
        ));
    }
    if let Some(salary) = format_salary_line(
        listing.salary_min,
        listing.salary_max,
        &listing.currency,
        listing.period,
    ) {
        lines.push(salary);
    }
    if !link.is_empty() {
        lines.push(format!("🔗 Link: {link}"));
    }
    lines.push(String::new());
    lines.push(hashtags);

    lines.join("\n")
}
