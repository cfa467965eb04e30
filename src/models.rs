//! Data models for scraped articles and their enriched representations.
//!
//! - [`Source`]: the three publications the pipeline reads from
//! - [`NewsType`]: the fixed category set the model classifies into
//! - [`EnrichmentResult`]: transient output of the three model calls
//! - [`NewsItem`]: one assembled, display-ready record

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A news publication the pipeline scrapes.
///
/// Serialized with the human-readable names used in exports and the
/// rendered output (e.g. `"Construction World"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Source {
    #[serde(rename = "Construction World")]
    ConstructionWorld,
    #[serde(rename = "Economic Times Realty")]
    EconomicTimesRealty,
    #[serde(rename = "Realty Plus")]
    RealtyPlus,
}

impl Source {
    /// Processing order for a run.
    pub const ALL: [Source; 3] = [
        Source::ConstructionWorld,
        Source::EconomicTimesRealty,
        Source::RealtyPlus,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Source::ConstructionWorld => "Construction World",
            Source::EconomicTimesRealty => "Economic Times Realty",
            Source::RealtyPlus => "Realty Plus",
        }
    }

    /// File name of the raw URL export for this source.
    pub fn url_export_file(&self) -> &'static str {
        match self {
            Source::ConstructionWorld => "constructionworld_urls.csv",
            Source::EconomicTimesRealty => "economic_times_urls.csv",
            Source::RealtyPlus => "realtyplus_urls.csv",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Category assigned to an article by the classification call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NewsType {
    Civic,
    Infrastructure,
    #[serde(rename = "Real Estate")]
    RealEstate,
    Development,
    #[default]
    Other,
}

impl NewsType {
    pub fn label(&self) -> &'static str {
        match self {
            NewsType::Civic => "Civic",
            NewsType::Infrastructure => "Infrastructure",
            NewsType::RealEstate => "Real Estate",
            NewsType::Development => "Development",
            NewsType::Other => "Other",
        }
    }

    /// Map a raw model response onto a category.
    ///
    /// Whitespace, case, a trailing period and the space in "Real Estate" are
    /// ignored. Anything unrecognised is [`NewsType::Other`].
    pub fn from_label(raw: &str) -> Self {
        let normalized: String = raw
            .trim()
            .trim_end_matches('.')
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "civic" => NewsType::Civic,
            "infrastructure" => NewsType::Infrastructure,
            "realestate" => NewsType::RealEstate,
            "development" => NewsType::Development,
            _ => NewsType::Other,
        }
    }
}

impl fmt::Display for NewsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub const UNKNOWN: &str = "Unknown";
pub const MISSING_CONTENT_SUMMARY: &str = "Unable to generate summary due to missing content";

/// Location, category and summary derived from one article's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentResult {
    pub city: String,
    pub locality: String,
    pub news_type: NewsType,
    pub summary: String,
}

impl EnrichmentResult {
    /// The result used when there is no text to enrich.
    pub fn missing_content() -> Self {
        Self {
            city: UNKNOWN.to_string(),
            locality: UNKNOWN.to_string(),
            news_type: NewsType::Other,
            summary: MISSING_CONTENT_SUMMARY.to_string(),
        }
    }
}

/// A fully assembled news record.
///
/// Field order matches the CSV export header
/// `news_url,summary,city,locality,date,source,news_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub news_url: String,
    pub summary: String,
    pub city: String,
    pub locality: String,
    /// Date of the run that produced this item, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub source: Source,
    pub news_type: NewsType,
}

impl NewsItem {
    pub fn assemble(
        news_url: String,
        source: Source,
        date: NaiveDate,
        enrichment: EnrichmentResult,
    ) -> Self {
        Self {
            news_url,
            summary: enrichment.summary,
            city: enrichment.city,
            locality: enrichment.locality,
            date,
            source,
            news_type: enrichment.news_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(source: Source) -> NewsItem {
        NewsItem::assemble(
            "https://example.com/a".to_string(),
            source,
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            EnrichmentResult {
                city: "Pune".to_string(),
                locality: "Hinjewadi".to_string(),
                news_type: NewsType::RealEstate,
                summary: "Summary".to_string(),
            },
        )
    }

    #[test]
    fn test_news_type_from_label() {
        assert_eq!(NewsType::from_label("Infrastructure"), NewsType::Infrastructure);
        assert_eq!(NewsType::from_label("  real estate\n"), NewsType::RealEstate);
        assert_eq!(NewsType::from_label("RealEstate"), NewsType::RealEstate);
        assert_eq!(NewsType::from_label("Civic."), NewsType::Civic);
        assert_eq!(NewsType::from_label("Sports"), NewsType::Other);
        assert_eq!(NewsType::from_label(""), NewsType::Other);
    }

    #[test]
    fn test_news_item_serialization() {
        let json = serde_json::to_value(item(Source::RealtyPlus)).unwrap();
        assert_eq!(json["date"], "2024-01-03");
        assert_eq!(json["source"], "Realty Plus");
        assert_eq!(json["news_type"], "Real Estate");
    }

    #[test]
    fn test_news_item_deserialization() {
        let json = r#"{
            "news_url": "https://example.com/b",
            "summary": "s",
            "city": "Noida",
            "locality": "Unknown",
            "date": "2024-01-01",
            "source": "Construction World",
            "news_type": "Infrastructure"
        }"#;
        let parsed: NewsItem = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.source, Source::ConstructionWorld);
        assert_eq!(parsed.news_type, NewsType::Infrastructure);
    }

    #[test]
    fn test_missing_content_defaults() {
        let result = EnrichmentResult::missing_content();
        assert_eq!(result.city, "Unknown");
        assert_eq!(result.locality, "Unknown");
        assert_eq!(result.news_type, NewsType::Other);
        assert_eq!(
            result.summary,
            "Unable to generate summary due to missing content"
        );
    }

    #[test]
    fn test_source_display_names() {
        assert_eq!(Source::EconomicTimesRealty.to_string(), "Economic Times Realty");
        assert_eq!(Source::ALL.len(), 3);
    }
}
