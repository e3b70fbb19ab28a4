use url::Url;

/// Extracts a channel username from `@name`, a `t.me` URL, or a bare name
///
/// # Examples
///
/// ```
/// use remotebridge::url::channel_username;
///
/// assert_eq!(channel_username("https://t.me/remotejobs").as_deref(), Some("remotejobs"));
/// assert_eq!(channel_username("@DorkariLand").as_deref(), Some("DorkariLand"));
/// assert_eq!(channel_username("golangjob").as_deref(), Some("golangjob"));
/// assert_eq!(channel_username("  "), None);
/// ```
pub fn channel_username(url: &str) -> Option<String> {
    let u = url.trim();
    if u.is_empty() {
        return None;
    }
    if let Some(name) = u.strip_prefix('@') {
        return non_empty(name);
    }
    if u.contains("t.me") {
        let with_scheme = if u.contains("://") {
            u.to_string()
        } else {
            format!("https://{u}")
        };
        let parsed = Url::parse(&with_scheme).ok()?;
        let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());
        let first = segments.next()?;
        // web preview URLs look like t.me/s/<name>
        let name = if first == "s" { segments.next()? } else { first };
        return non_empty(name);
    }
    non_empty(u.trim_matches('/'))
}

/// Permanent public link of a channel message
pub fn message_link(username: &str, message_id: i64) -> String {
    format!("https://t.me/{username}/{message_id}")
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
