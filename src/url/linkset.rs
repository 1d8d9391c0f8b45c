use std::collections::HashSet;

/// Ordered collection of unique absolute URLs
///
/// Insertion order is kept so that crawl output is stable between runs,
/// though callers must not rely on any particular order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSet {
    links: Vec<String>,
    seen: HashSet<String>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a URL, returning false if it was already present
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.links.push(url);
        true
    }

    /// Unions another set into this one, returning how many URLs were new
    pub fn extend_from(&mut self, other: LinkSet) -> usize {
        other
            .links
            .into_iter()
            .filter(|url| self.insert(url.clone()))
            .count()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.links.iter()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.links
    }
}

impl FromIterator<String> for LinkSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        let mut set = LinkSet::new();
        for url in iter {
            set.insert(url);
        }
        set
    }
}

impl IntoIterator for LinkSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.into_iter()
    }
}

impl<'a> IntoIterator for &'a LinkSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_deduplicates() {
        let mut set = LinkSet::new();
        assert!(set.insert("https://example.com/a"));
        assert!(!set.insert("https://example.com/a"));
        assert!(set.insert("https://example.com/b"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_extend_from_counts_new_links() {
        let mut first: LinkSet = ["a", "b"].iter().map(|s| s.to_string()).collect();
        let second: LinkSet = ["b", "c"].iter().map(|s| s.to_string()).collect();

        assert_eq!(first.extend_from(second), 1);
        assert_eq!(first.into_vec(), vec!["a", "b", "c"]);
    }
}
