/// Stage definitions for the crawl and publish loops
///
/// The loops log every transition with the stage name so a stuck source can
/// be located from the logs alone.
use std::fmt;

/// One pass of a crawl loop over a single source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlStage {
    Idle,
    Fetching,
    Parsing,
    Normalizing,
    Persisting,
}

impl CrawlStage {
    /// The stage that follows this one within a tick
    pub fn next(&self) -> Self {
        match self {
            Self::Idle => Self::Fetching,
            Self::Fetching => Self::Parsing,
            Self::Parsing => Self::Normalizing,
            Self::Normalizing => Self::Persisting,
            Self::Persisting => Self::Idle,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Parsing => "parsing",
            Self::Normalizing => "normalizing",
            Self::Persisting => "persisting",
        }
    }
}

impl fmt::Display for CrawlStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One publisher tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublishStage {
    Idle,
    Select,
    Format,
    Send,
    Mark,
}

impl PublishStage {
    pub fn next(&self) -> Self {
        match self {
            Self::Idle => Self::Select,
            Self::Select => Self::Format,
            Self::Format => Self::Send,
            Self::Send => Self::Mark,
            Self::Mark => Self::Idle,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Select => "select",
            Self::Format => "format",
            Self::Send => "send",
            Self::Mark => "mark",
        }
    }
}

impl fmt::Display for PublishStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
