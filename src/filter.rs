//! Source and date-range filtering over a run's collection.

use chrono::NaiveDate;

use crate::models::{NewsItem, Source};

/// Keeps items whose source is selected and whose date lies in
/// `[start, end]`, both ends inclusive.
#[derive(Debug, Clone)]
pub struct NewsFilter {
    pub sources: Vec<Source>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl NewsFilter {
    /// All sources, limited to a single day.
    pub fn for_day(day: NaiveDate) -> Self {
        Self {
            sources: Source::ALL.to_vec(),
            start: day,
            end: day,
        }
    }

    pub fn matches(&self, item: &NewsItem) -> bool {
        self.sources.contains(&item.source) && item.date >= self.start && item.date <= self.end
    }

    pub fn apply<'a>(&self, items: &'a [NewsItem]) -> Vec<&'a NewsItem> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}
