//! Category and search filtering over a parsed playlist

use crate::m3u_parser::categories;
use crate::models::{Channel, ALL_CATEGORY};

/// Parsed channels plus the browsing state of the channel grid
#[derive(Debug, Clone)]
pub struct Catalog {
    channels: Vec<Channel>,
    categories: Vec<String>,
    current_category: String,
}

impl Catalog {
    pub fn new(channels: Vec<Channel>) -> Self {
        // A playlist group literally named "All" is folded into the pseudo category
        let mut all = vec![ALL_CATEGORY.to_string()];
        all.extend(categories(&channels).into_iter().filter(|c| *c != ALL_CATEGORY));
        Self {
            channels,
            categories: all,
            current_category: ALL_CATEGORY.to_string(),
        }
    }

    /// `All` followed by each distinct group in playlist order
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn current_category(&self) -> &str {
        &self.current_category
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// Select `category`, or fall back to `All` when the playlist has no
    /// such group. Returns whether the requested category was selected.
    pub fn select_category(&mut self, category: &str) -> bool {
        if self.has_category(category) {
            self.current_category = category.to_string();
            true
        } else {
            self.current_category = ALL_CATEGORY.to_string();
            false
        }
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Channels in the current category whose name contains `query`,
    /// ignoring case. An empty query matches every channel.
    pub fn filter(&self, query: &str) -> Vec<&Channel> {
        let query = query.to_lowercase();
        self.channels
            .iter()
            .filter(|c| self.in_current_category(c))
            .filter(|c| c.name.to_lowercase().contains(&query))
            .collect()
    }

    fn in_current_category(&self, channel: &Channel) -> bool {
        self.current_category == ALL_CATEGORY || channel.group == self.current_category
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::m3u_parser::parse_m3u;

    const PLAYLIST: &str = r#"#EXTM3U
#EXTINF:-1 group-title="News",BBC News
http://stream/bbc.m3u8
#EXTINF:-1 group-title="Sports",Sky Sports
http://stream/sky.m3u8
#EXTINF:-1,Somoy TV
http://stream/somoy.m3u8
#EXTINF:-1 group-title="News",CNN
http://stream/cnn.m3u8
"#;

    #[test]
    fn test_categories_start_with_all() {
        let catalog = Catalog::new(parse_m3u(PLAYLIST));
        assert_eq!(catalog.categories(), ["All", "News", "Sports", "General"]);
        assert_eq!(catalog.current_category(), "All");
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn test_filter_all_with_empty_query() {
        let catalog = Catalog::new(parse_m3u(PLAYLIST));
        assert_eq!(catalog.filter("").len(), 4);
    }

    #[test]
    fn test_filter_by_category() {
        let mut catalog = Catalog::new(parse_m3u(PLAYLIST));
        assert!(catalog.select_category("News"));
        let names: Vec<&str> = catalog.filter("").iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["BBC News", "CNN"]);
    }

    #[test]
    fn test_search_ignores_case_within_category() {
        let mut catalog = Catalog::new(parse_m3u(PLAYLIST));
        assert_eq!(catalog.filter("SPORTS").len(), 1);

        catalog.select_category("News");
        assert!(catalog.filter("sky").is_empty());
        assert_eq!(catalog.filter("cnn")[0].url, "http://stream/cnn.m3u8");
    }

    #[test]
    fn test_unknown_category_falls_back_to_all() {
        let mut catalog = Catalog::new(parse_m3u(PLAYLIST));
        catalog.select_category("News");
        assert!(!catalog.has_category("Movies"));
        assert!(!catalog.select_category("Movies"));
        assert_eq!(catalog.current_category(), "All");
        assert_eq!(catalog.filter("").len(), 4);
    }

    #[test]
    fn test_group_named_all_is_listed_once() {
        let content = r#"#EXTINF:-1 group-title="All",Everything TV
http://stream/all.m3u8
#EXTINF:-1 group-title="News",CNN
http://stream/cnn.m3u8
"#;
        let mut catalog = Catalog::new(parse_m3u(content));
        assert_eq!(catalog.categories(), ["All", "News"]);
        assert!(catalog.select_category("All"));
        assert_eq!(catalog.filter("").len(), 2);
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::new(Vec::new());
        assert!(catalog.is_empty());
        assert_eq!(catalog.categories(), ["All"]);
    }
}
