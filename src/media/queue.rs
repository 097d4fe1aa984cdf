/// Pending URLs in insertion order. Nothing here validates or deduplicates;
/// bad URLs surface later as engine failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlQueue {
    urls: Vec<String>,
}

impl UrlQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace<I, S>(&mut self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.urls = urls.into_iter().map(Into::into).collect();
    }

    pub fn append(&mut self, url: impl Into<String>) {
        self.urls.push(url.into());
    }

    /// Removes the entry at `index`, returning it if it existed.
    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.urls.len()).then(|| self.urls.remove(index))
    }

    pub fn clear(&mut self) {
        self.urls.clear();
    }

    pub fn all(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_then_append_keeps_order() {
        let mut queue = UrlQueue::new();
        queue.replace(["a", "b"]);
        assert_eq!(queue.all(), ["a", "b"]);

        queue.append("c");
        assert_eq!(queue.all(), ["a", "b", "c"]);
    }

    #[test]
    fn test_duplicates_allowed() {
        let mut queue = UrlQueue::new();
        queue.append("https://x/1");
        queue.append("https://x/1");
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_replace_discards_previous() {
        let mut queue = UrlQueue::new();
        queue.replace(vec!["old".to_string()]);
        queue.replace(vec!["new".to_string()]);
        assert_eq!(queue.all(), ["new"]);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut queue = UrlQueue::new();
        queue.replace(["a", "b", "c"]);

        assert_eq!(queue.remove(1), Some("b".to_string()));
        assert_eq!(queue.remove(5), None);
        assert_eq!(queue.all(), ["a", "c"]);

        queue.clear();
        assert!(queue.is_empty());
    }
}
