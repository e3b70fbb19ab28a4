use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Upper bound on the number of hashtags attached to a message
pub const MAX_HASHTAGS: usize = 18;

/// Keyword tags kept from the text itself before extras and defaults
const MAX_KEYWORD_TAGS: usize = 12;

/// Tags appended to every message
pub const DEFAULT_TAGS: [&str; 3] = ["#remote", "#job", "#wfh"];

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[a-zA-Z][a-zA-Z0-9+\-_.]{2,20}\b").expect("valid regex"));

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "and", "are", "as", "at", "be", "been", "being", "but", "by", "can", "for",
        "from", "has", "have", "having", "he", "her", "him", "his", "how", "i", "if", "in",
        "into", "is", "it", "its", "of", "on", "or", "our", "out", "over", "per", "so", "such",
        "than", "that", "the", "their", "them", "then", "there", "these", "they", "this",
        "those", "to", "up", "we", "what", "when", "where", "which", "who", "will", "with",
        "you", "your", "yours", "about", "across", "all", "also", "any", "apply", "ability",
        "able", "including", "include", "includes", "role", "position", "job", "company",
        "team", "work", "working", "remote", "fully", "hybrid", "experience", "experienced",
        "responsible", "responsibilities", "requirements", "preferred",
    ]
    .into_iter()
    .collect()
});

static SKILL_HINTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "python", "django", "fastapi", "flask", "sql", "postgres", "mysql", "sqlite", "mongodb",
        "redis", "kafka", "airflow", "spark", "hadoop", "aws", "gcp", "azure", "kubernetes",
        "docker", "terraform", "ansible", "linux", "golang", "go", "rust", "java", "kotlin",
        "scala", "swift", "javascript", "typescript", "react", "vue", "angular", "node",
        "nextjs", "nuxt", "svelte", "devops", "ml", "ai", "nlp", "cv", "pytorch", "tensorflow",
        "sklearn", "pandas", "numpy", "etl", "bi", "analytics", "product", "design", "figma",
        "ui", "ux", "qa", "selenium", "cybersecurity", "blockchain", "solidity", "web3", "defi",
        "data", "backend", "frontend", "fullstack",
    ]
    .into_iter()
    .collect()
});

/// Builds the hashtag line for a listing
///
/// Words are lowercased, filtered against a stop-word list and deduplicated;
/// known skill words come first. Caller tags follow (prefixed with `#`,
/// inner spaces removed), then the default tags. The result is
/// deduplicated again and capped at [`MAX_HASHTAGS`].
///
/// # Example
///
/// ```
/// use remotebridge::text::derive_hashtags;
///
/// let tags = derive_hashtags("Backend developer for python services", &[]);
/// assert_eq!(tags[0], "#backend");
/// assert_eq!(tags[1], "#python");
/// assert!(tags.ends_with(&["#remote".to_string(), "#job".to_string(), "#wfh".to_string()]));
/// ```
pub fn derive_hashtags(text: &str, extra_tags: &[String]) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut seen = HashSet::new();
    let mut words = Vec::new();
    for m in WORD_RE.find_iter(&lowered) {
        let w = m.as_str();
        if STOPWORDS.contains(w) || !seen.insert(w) {
            continue;
        }
        words.push(w);
    }

    let (skills, rest): (Vec<&str>, Vec<&str>) =
        words.into_iter().partition(|w| SKILL_HINTS.contains(w));

    let mut tags: Vec<String> = skills
        .into_iter()
        .chain(rest)
        .take(MAX_KEYWORD_TAGS)
        .map(|w| format!("#{w}"))
        .collect();

    tags.extend(
        extra_tags
            .iter()
            .filter(|t| !t.is_empty())
            .map(|t| format!("#{}", t.trim().trim_start_matches('#').replace(' ', ""))),
    );
    tags.extend(DEFAULT_TAGS.iter().map(|t| t.to_string()));

    let mut seen = HashSet::new();
    tags.into_iter()
        .filter(|t| t.len() > 1 && seen.insert(t.clone()))
        .take(MAX_HASHTAGS)
        .collect()
}
