use url::Url;

/// True when `current` already shows the page at `target`.
///
/// Compares scheme, host and path; the query, fragment and a trailing slash are ignored.
/// Unparseable input falls back to a trimmed string comparison.
pub fn same_surface(current: &str, target: &str) -> bool {
    match (Url::parse(current), Url::parse(target)) {
        (Ok(current), Ok(target)) => {
            current.scheme() == target.scheme()
                && current.host_str() == target.host_str()
                && current.port_or_known_default() == target.port_or_known_default()
                && trim_path(current.path()) == trim_path(target.path())
        }
        _ => current.trim_end_matches('/') == target.trim_end_matches('/'),
    }
}

fn trim_path(path: &str) -> &str {
    path.trim_end_matches('/')
}

/// Location without query or fragment, for logs.
pub fn redact_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(parsed) => format!(
            "{}://{}{}",
            parsed.scheme(),
            parsed.host_str().unwrap_or(""),
            parsed.path()
        ),
        Err(_) => raw.to_string(),
    }
}
