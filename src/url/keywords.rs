use crate::config::FilterConfig;

/// Substring-based exclusion filter for URLs
///
/// A URL is excluded when any keyword occurs anywhere inside it. This is a
/// plain substring test, not a word match: `ads` also excludes
/// `/uploads/photo.jpg` and `/roads-to-glory`. The behavior is kept as-is
/// because the keyword lists were written against it.
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    keywords: Vec<String>,
    case_sensitive: bool,
}

impl KeywordFilter {
    /// Creates a filter from keywords
    ///
    /// Empty keywords are dropped, since they would match every URL.
    pub fn new<I, S>(keywords: I, case_sensitive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| -> String { k.into() })
            .filter(|k| !k.is_empty())
            .map(|k| if case_sensitive { k } else { k.to_lowercase() })
            .collect();

        Self {
            keywords,
            case_sensitive,
        }
    }

    /// Builds a filter from the `[filter]` configuration section
    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(config.exclude_keywords.iter().cloned(), config.case_sensitive)
    }

    /// A filter that excludes nothing
    pub fn none() -> Self {
        Self::new(Vec::<String>::new(), true)
    }

    /// Returns the first keyword contained in `candidate`, if any
    pub fn matched_keyword(&self, candidate: &str) -> Option<&str> {
        if self.case_sensitive {
            self.keywords
                .iter()
                .find(|k| candidate.contains(k.as_str()))
                .map(String::as_str)
        } else {
            let lowered = candidate.to_lowercase();
            self.keywords
                .iter()
                .find(|k| lowered.contains(k.as_str()))
                .map(String::as_str)
        }
    }

    /// Returns true if `candidate` contains any keyword
    pub fn is_excluded(&self, candidate: &str) -> bool {
        self.matched_keyword(candidate).is_some()
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for KeywordFilter {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keywords() {
        let filter = KeywordFilter::default();
        assert!(filter.is_excluded("https://example.com/subscribe"));
        assert!(filter.is_excluded("https://example.com/user/login?next=/"));
        assert!(filter.is_excluded("https://example.com/academy/course"));
        assert!(!filter.is_excluded("https://example.com/analysis/pressing"));
    }

    #[test]
    fn test_case_sensitive_matching() {
        let filter = KeywordFilter::new(["subscribe"], true);
        assert!(filter.is_excluded("https://example.com/subscribe"));
        assert!(!filter.is_excluded("https://example.com/SUBSCRIBE"));
    }

    #[test]
    fn test_case_insensitive_matching() {
        let filter = KeywordFilter::new(["Subscribe"], false);
        assert!(filter.is_excluded("https://example.com/subscribe"));
        assert!(filter.is_excluded("https://example.com/SUBSCRIBE"));
    }

    #[test]
    fn test_substring_false_positive_is_preserved() {
        // "ads" inside "uploads" still excludes the URL
        let filter = KeywordFilter::new(["ads"], true);
        assert!(filter.is_excluded("https://example.com/wp-content/uploads/a.png"));
    }

    #[test]
    fn test_matched_keyword() {
        let filter = KeywordFilter::new(["login", "register"], true);
        assert_eq!(
            filter.matched_keyword("https://example.com/register"),
            Some("register")
        );
        assert_eq!(filter.matched_keyword("https://example.com/"), None);
    }

    #[test]
    fn test_empty_keywords_dropped() {
        let filter = KeywordFilter::new(["", "ads"], true);
        assert_eq!(filter.keywords(), &["ads".to_string()]);
        assert!(!KeywordFilter::none().is_excluded("https://example.com/ads"));
    }
}
