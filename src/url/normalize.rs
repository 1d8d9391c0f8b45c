use crate::UrlError;
use url::Url;

/// Parses an absolute HTTP(S) URL
///
/// # Examples
///
/// ```
/// use sumi_scribe::url::parse_http_url;
///
/// assert!(parse_http_url("https://example.com/page").is_ok());
/// assert!(parse_http_url("mailto:someone@example.com").is_err());
/// ```
pub fn parse_http_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Key used by the pagination cycle guard
///
/// Two URLs that differ only in their fragment load the same document, so
/// the fragment is dropped. Host case is already folded by the `url` crate.
///
/// ```
/// use url::Url;
/// use sumi_scribe::url::visit_key;
///
/// let a = Url::parse("https://EXAMPLE.com/list?page=2#top").unwrap();
/// let b = Url::parse("https://example.com/list?page=2").unwrap();
/// assert_eq!(visit_key(&a), visit_key(&b));
/// ```
pub fn visit_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_fragment(None);
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_http_url_trims() {
        let url = parse_http_url("  https://example.com/a  ").unwrap();
        assert_eq!(url.as_str(), "https://example.com/a");
    }

    #[test]
    fn test_parse_rejects_other_schemes() {
        assert!(matches!(
            parse_http_url("ftp://example.com/"),
            Err(UrlError::InvalidScheme(_))
        ));
        assert!(matches!(parse_http_url("nope"), Err(UrlError::Parse(_))));
    }

    #[test]
    fn test_visit_key_keeps_query() {
        let a = Url::parse("https://example.com/list?page=2").unwrap();
        let b = Url::parse("https://example.com/list?page=3").unwrap();
        assert_ne!(visit_key(&a), visit_key(&b));
    }
}
