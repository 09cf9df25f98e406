//! URL origin helpers.
//!
//! The builder and serializer only need three operations over URLs: detect
//! whether one carries a host, join a relative path onto a base, and carry a
//! path/query/fragment onto the base origin's scheme and host. These are
//! plain string operations; full URL normalization is out of scope.

/// Extract the host component of a URL, if present.
///
/// Recognizes `scheme://host/...` and protocol-relative `//host/...` forms.
/// Returns `None` for relative references, including ones whose query
/// happens to embed an absolute URL.
#[must_use]
pub fn host(url: &str) -> Option<&str> {
    let (start, end) = host_span(url)?;
    let h = &url[start..end];
    if h.is_empty() { None } else { Some(h) }
}

/// Byte range of the host within `url`, when the URL is absolute.
fn host_span(url: &str) -> Option<(usize, usize)> {
    let start = if url.starts_with("//") {
        // Protocol-relative reference
        2
    } else {
        let idx = url.find("://")?;
        let scheme = &url[..idx];
        let valid = !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if !valid {
            return None;
        }
        idx + 3
    };

    let rest = &url[start..];
    let len = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    Some((start, start + len))
}

/// The `scheme://host` prefix of an absolute URL, or the URL itself when it
/// has no host.
#[must_use]
pub fn origin(url: &str) -> &str {
    match host_span(url) {
        Some((_, end)) => &url[..end],
        None => url,
    }
}

/// Resolve a possibly relative URL against a base URL.
///
/// URLs that already carry a host are returned unchanged; everything else is
/// joined onto the base.
#[must_use]
pub fn resolve(url: &str, base: &str) -> String {
    if host(url).is_some() {
        url.to_owned()
    } else {
        join(base, url)
    }
}

/// Rewrite a URL onto the base URL's origin.
///
/// The path, query and fragment of `url` are kept; scheme and host come from
/// `base`. Relative URLs are joined directly.
#[must_use]
pub fn absolutize(base: &str, url: &str) -> String {
    let tail = match host_span(url) {
        Some((_, end)) => &url[end..],
        None => url,
    };
    join(origin(base), tail)
}

/// Join a path onto a base, normalizing the single slash between them.
fn join(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
