use crate::adapters::{has_remote_signal, Adapter, SiteClient};
use crate::crawler::Fetcher;
use crate::model::{Category, PayPeriod, RawItem};
use crate::text::{clean_text, parse_salary};
use crate::AdapterError;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// RemoteOK public JSON API; the first array element is a legal notice
pub struct RemoteOk {
    site: SiteClient,
}

impl RemoteOk {
    pub const ID: &'static str = "remoteok";
    pub const BASE: &'static str = "https://remoteok.com";

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
impl Adapter for RemoteOk {
    fn id(&self) -> &str {
        Self::ID
    }

    async fn fetch_raw_items(&self) -> Result<Vec<RawItem>, AdapterError> {
        let payload = self.site.get_json("/api").await?;
        parse_remoteok(&payload)
    }
}

fn str_field<'a>(job: &'a Map<String, Value>, key: &str) -> &'a str {
    job.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn positive_number(job: &Map<String, Value>, key: &str) -> Option<f64> {
    job.get(key).and_then(Value::as_f64).filter(|n| *n > 0.0)
}

/// Converts the API array into raw items
pub fn parse_remoteok(payload: &Value) -> Result<Vec<RawItem>, AdapterError> {
    let jobs = payload.as_array().ok_or_else(|| AdapterError::Payload {
        adapter: RemoteOk::ID.to_string(),
        message: "expected a JSON array".to_string(),
    })?;

    let mut items = Vec::new();
    for job in jobs.iter().skip(1).filter_map(Value::as_object) {
        let url = str_field(job, "url");
        let title = str_field(job, "position");
        let company = str_field(job, "company");
        if url.is_empty() || title.is_empty() {
            continue;
        }
        if !has_remote_signal(&[title, company], "remote") {
            continue;
        }

        let tags: Vec<String> = job
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let raw_description = str_field(job, "description");
        let description = if raw_description.is_empty() {
            tags.join(", ")
        } else {
            clean_text(raw_description)
        };

        let mut item = RawItem::new(title, url)
            .description(description)
            .category(Category::Job)
            .company(company)
            .location(str_field(job, "location"))
            .tags(tags)
            .extras(job.clone());

        // the API reports annual USD figures when it has them
        let (api_min, api_max) = (
            positive_number(job, "salary_min"),
            positive_number(job, "salary_max"),
        );
        if api_min.is_some() || api_max.is_some() {
            item.salary_min = api_min;
            item.salary_max = api_max;
            item.currency = Some("USD".to_string());
            item.period = Some(PayPeriod::Yearly);
        } else {
            let salary_text = [
                str_field(job, "salary"),
                str_field(job, "compensation"),
            ]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or_default();
            let salary = parse_salary(&format!(
                "{} {} {} {}",
                salary_text, item.description.as_deref().unwrap_or_default(), title, company
            ));
            item.salary_min = salary.min;
            item.salary_max = salary.max;
            item.currency = Some(salary.currency);
            item.period = salary.period;
        }

        items.push(item);
    }

    Ok(items)
}
