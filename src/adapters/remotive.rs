use crate::adapters::{has_remote_signal, Adapter, SiteClient};
use crate::crawler::Fetcher;
use crate::model::{Category, PayPeriod, RawItem};
use crate::text::{clean_text, parse_salary};
use crate::AdapterError;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Remotive public JSON API
pub struct Remotive {
    site: SiteClient,
}

impl Remotive {
    pub const ID: &'static str = "remotive";
    pub const BASE: &'static str = "https://remotive.com";

    pub fn new(fetcher: Fetcher) -> Self {
        Self::with_base(fetcher, Self::BASE)
    }

    pub fn with_base(fetcher: Fetcher, base: &str) -> Self {
        Self {
            site: SiteClient::new(fetcher, base),
        }
    }
}

#[async_trait]
impl Adapter for Remotive {
    fn id(&self) -> &str {
        Self::ID
    }

    async fn fetch_raw_items(&self) -> Result<Vec<RawItem>, AdapterError> {
        let payload = self.site.get_json("/api/remote-jobs").await?;
        parse_remotive(&payload)
    }
}

fn str_field<'a>(job: &'a Map<String, Value>, key: &str) -> &'a str {
    job.get(key).and_then(Value::as_str).unwrap_or_default()
}

/// Numbers sometimes arrive as strings
fn number_field(job: &Map<String, Value>, key: &str) -> Option<f64> {
    let value: f64 = match job.get(key)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().replace(',', "").parse().ok()?,
        _ => return None,
    };
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Converts the `{"jobs": [...]}` payload into raw items
pub fn parse_remotive(payload: &Value) -> Result<Vec<RawItem>, AdapterError> {
    let jobs = payload
        .get("jobs")
        .and_then(Value::as_array)
        .ok_or_else(|| AdapterError::Payload {
            adapter: Remotive::ID.to_string(),
            message: "missing jobs array".to_string(),
        })?;

    let mut items = Vec::new();
    for job in jobs.iter().filter_map(Value::as_object) {
        let title = str_field(job, "title");
        let company = str_field(job, "company_name");
        let location = str_field(job, "candidate_required_location");
        if !has_remote_signal(&[title, company, location], "remote") {
            continue;
        }

        let raw_description = str_field(job, "description");
        let description = if raw_description.is_empty() {
            str_field(job, "category").to_string()
        } else {
            clean_text(raw_description)
        };

        let mut tags: Vec<String> = [str_field(job, "job_type"), str_field(job, "category")]
            .into_iter()
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        if let Some(extra) = job.get("tags").and_then(Value::as_array) {
            tags.extend(extra.iter().filter_map(Value::as_str).map(str::to_string));
        }

        let mut item = RawItem::new(title, str_field(job, "url"))
            .description(description)
            .category(Category::Job)
            .company(company)
            .location(location)
            .tags(tags)
            .extras(job.clone());

        item.salary_min = number_field(job, "salary_min");
        item.salary_max = number_field(job, "salary_max");
        let mut currency = str_field(job, "salary_currency").to_uppercase();
        let mut period = PayPeriod::from_db_string(str_field(job, "salary_type"));

        if item.lacks_salary() {
            let salary = parse_salary(&format!(
                "{} {} {} {}",
                str_field(job, "salary"),
                item.description.as_deref().unwrap_or_default(),
                title,
                company
            ));
            item.salary_min = salary.min;
            item.salary_max = salary.max;
            if currency.is_empty() {
                currency = salary.currency;
            }
            if period.is_none() {
                period = salary.period;
            }
        }
        item.currency = Some(currency);
        item.period = period;

        items.push(item);
    }

    Ok(items)
}
