//! URL handling module for Sumi-Scribe
//!
//! This module provides origin comparison, keyword exclusion, visit-key
//! normalization, and the ordered, de-duplicated `LinkSet`.

mod keywords;
mod linkset;
mod normalize;

pub use keywords::KeywordFilter;
pub use linkset::LinkSet;
pub use normalize::{parse_http_url, visit_key};

use url::Url;

/// Returns true when both URLs share scheme, host and port
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_scribe::url::same_origin;
///
/// let base = Url::parse("https://example.com/list").unwrap();
/// assert!(same_origin(&Url::parse("https://example.com/a").unwrap(), &base));
/// assert!(!same_origin(&Url::parse("https://other.com/a").unwrap(), &base));
/// assert!(!same_origin(&Url::parse("http://example.com/a").unwrap(), &base));
/// ```
pub fn same_origin(candidate: &Url, base: &Url) -> bool {
    candidate.origin() == base.origin()
}

/// Returns `scheme://host[:port]` for a URL, or None for opaque origins
pub fn origin_of(url: &Url) -> Option<Url> {
    let mut origin = url.clone();
    origin.host_str()?;
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);
    Some(origin)
}
