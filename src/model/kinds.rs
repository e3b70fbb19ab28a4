use serde::Deserialize;
use std::fmt;

/// Where a source's items come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Polled over HTTP through an adapter
    Website,
    /// A public messaging channel read newest-first
    Channel,
}

impl SourceKind {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Website => "WEBSITE",
            Self::Channel => "CHANNEL",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "WEBSITE" => Some(Self::Website),
            "CHANNEL" => Some(Self::Channel),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}

/// What kind of opportunity a listing describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Job,
    Project,
    Competition,
}

impl Category {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Job => "JOB",
            Self::Project => "PROJECT",
            Self::Competition => "COMPETITION",
        }
    }

    /// Parses a stored or adapter-supplied category, ignoring case
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "JOB" => Some(Self::Job),
            "PROJECT" => Some(Self::Project),
            "COMPETITION" => Some(Self::Competition),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}

/// Pay period of a salary range; a blank period is `None` at the call sites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayPeriod {
    Hourly,
    Daily,
    Monthly,
    Yearly,
}

impl PayPeriod {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Hourly => "HOURLY",
            Self::Daily => "DAILY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }

    /// Parses a period name; anything unrecognized (including blank) is `None`
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HOURLY" => Some(Self::Hourly),
            "DAILY" => Some(Self::Daily),
            "MONTHLY" => Some(Self::Monthly),
            "YEARLY" => Some(Self::Yearly),
            _ => None,
        }
    }

    /// Lowercase unit used in the published salary line (`/yearly`)
    pub fn display_unit(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

/// Database form of an optional period: blank when absent
pub fn period_to_db(period: Option<PayPeriod>) -> &'static str {
    period.map(|p| p.to_db_string()).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_roundtrip() {
        for c in [Category::Job, Category::Project, Category::Competition] {
            assert_eq!(Category::from_db_string(c.to_db_string()), Some(c));
        }
        assert_eq!(Category::from_db_string("project"), Some(Category::Project));
        assert_eq!(Category::from_db_string("gig"), None);
    }

    #[test]
    fn test_period_blank_is_none() {
        assert_eq!(PayPeriod::from_db_string(""), None);
        assert_eq!(PayPeriod::from_db_string("PROJECT"), None);
        assert_eq!(PayPeriod::from_db_string("yearly"), Some(PayPeriod::Yearly));
        assert_eq!(period_to_db(None), "");
    }

    #[test]
    fn test_source_kind_from_db() {
        assert_eq!(SourceKind::from_db_string("CHANNEL"), Some(SourceKind::Channel));
        assert_eq!(SourceKind::from_db_string("TELEGRAM"), None);
    }
}
