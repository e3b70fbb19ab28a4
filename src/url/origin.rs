use url::Url;

/// Builds `scheme://host[:port]/` for a URL, used as the `Referer` header
///
/// Returns `None` for URLs without a host.
///
/// # Examples
///
/// ```
/// use remotebridge::url::origin_referer;
///
/// assert_eq!(
///     origin_referer("https://remoteok.com/api?tag=rust").as_deref(),
///     Some("https://remoteok.com/")
/// );
/// assert_eq!(origin_referer("not a url"), None);
/// ```
pub fn origin_referer(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    match parsed.port() {
        Some(port) => Some(format!("{}://{}:{}/", parsed.scheme(), host, port)),
        None => Some(format!("{}://{}/", parsed.scheme(), host)),
    }
}
