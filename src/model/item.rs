use crate::model::{Category, PayPeriod};
use serde_json::{Map, Value};

/// Adapter-specific raw fields kept alongside a listing for audit
pub type Extras = Map<String, Value>;

/// A scraped item as an adapter produced it
///
/// Only `title` and `link` are required, and even those are checked by the
/// item normalizer rather than here: adapters are allowed to emit blanks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawItem {
    pub title: String,
    pub link: String,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub currency: Option<String>,
    pub period: Option<PayPeriod>,
    pub tags: Option<Vec<String>>,
    pub extras: Option<Extras>,
    pub raw_text: Option<String>,
}

impl RawItem {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn extras(mut self, extras: Extras) -> Self {
        self.extras = Some(extras);
        self
    }

    pub fn raw_text(mut self, raw_text: impl Into<String>) -> Self {
        self.raw_text = Some(raw_text.into());
        self
    }

    /// True when the adapter supplied neither end of a salary range
    pub fn lacks_salary(&self) -> bool {
        self.salary_min.is_none() && self.salary_max.is_none()
    }
}

/// A validated listing ready for the store
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub title: String,
    pub description: String,
    pub link: String,
    pub category: Category,
    pub company: String,
    pub location: String,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    /// Upper-case currency code; may be blank
    pub currency: String,
    pub period: Option<PayPeriod>,
    pub tags: Vec<String>,
    pub extras: Extras,
    pub raw_text: String,
}
