//! Built-in source catalogue used when the config file lists no sources

use crate::config::types::SourceEntry;
use crate::model::Category;

/// Returns the default set of sources
///
/// Websites without an adapter are seeded too so they show up in `--stats`
/// and can get a parser later; the crawl loop skips them.
pub fn default_sources() -> Vec<SourceEntry> {
    use Category::{Competition, Job, Project};

    let websites = [
        ("RemoteOK", "https://remoteok.com", Job, "remoteok"),
        ("Remotive", "https://remotive.com", Job, "remotive"),
        ("We Work Remotely", "https://weworkremotely.com", Job, "weworkremotely"),
        ("We Work Remotely RSS", "https://weworkremotely.com/remote-jobs.rss", Job, "weworkremotely-rss"),
        ("Remote.co", "https://remote.co", Job, "remoteco"),
        ("JustRemote", "https://justremote.co", Job, "justremote"),
        ("Wellfound (AngelList)", "https://wellfound.com", Job, "wellfound"),
        ("Devpost", "https://devpost.com", Project, "devpost"),
        ("Kaggle", "https://www.kaggle.com/competitions", Competition, "kaggle"),
        ("Gitcoin", "https://gitcoin.co/grants/explorer", Project, "gitcoin"),
        ("Upwork", "https://www.upwork.com/", Project, ""),
        ("Freelancer.com", "https://www.freelancer.com/jobs/", Project, ""),
        ("Topcoder", "https://www.topcoder.com/challenges", Project, ""),
        ("Jobinja", "https://jobinja.ir/jobs", Job, ""),
        ("Ponisha", "https://ponisha.ir/", Project, ""),
    ];

    let channels = [
        "remotejobs",
        "weworkremotely",
        "remoteworkers",
        "freelancer_job",
        "DorkariLand",
        "doorkaari",
        "remotejobshq",
        "remote_devs_jobs",
        "python_jobs_feed",
        "golangjob",
        "js_jobs_feed",
        "ai_ml_jobs",
    ];

    websites
        .into_iter()
        .map(|(name, url, category, adapter)| SourceEntry::website(name, url, category, adapter))
        .chain(channels.into_iter().map(|username| {
            SourceEntry::channel(
                &format!("@{username}"),
                &format!("https://t.me/{username}"),
                Category::Job,
            )
        }))
        .collect()
}
