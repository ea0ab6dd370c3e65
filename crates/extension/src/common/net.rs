use url::Url;

/// Resolves `relative_url` against `base_url`.
///
/// Absolute URLs are returned as they are and protocol relative ones get
/// `https:`. When `base_url` does not parse, the two are joined with a slash.
///
/// # Examples
///
/// ```
/// use mado_extension::common::net::make_absolute_url;
///
/// let abs = make_absolute_url("/foo/bar", "https://example.com/base");
/// assert_eq!(abs, "https://example.com/foo/bar");
/// ```
pub fn make_absolute_url(relative_url: &str, base_url: &str) -> String {
    if relative_url.starts_with("http://") || relative_url.starts_with("https://") {
        return relative_url.to_string();
    }
    if let Some(rest) = relative_url.strip_prefix("//") {
        return format!("https://{rest}");
    }

    match Url::parse(base_url).and_then(|base| base.join(relative_url)) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{}/{}", base_url.trim_end_matches('/'), relative_url),
    }
}

/// File extension of the last path segment of `url`, without the dot.
///
/// ```
/// use mado_extension::common::net::url_extension;
///
/// assert_eq!(url_extension("https://cdn.example.com/a/001.jpg?x=1"), Some("jpg".to_string()));
/// assert_eq!(url_extension("https://cdn.example.com/a/page"), None);
/// ```
pub fn url_extension(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let file = url.path_segments()?.next_back()?;
    let (stem, extension) = file.rsplit_once('.')?;

    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}
