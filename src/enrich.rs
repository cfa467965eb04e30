//! Article enrichment: location, category and summary.
//!
//! Each of the three derivations is its own model call. They run in order
//! (location, category, summary) and a failure in one never prevents the
//! next; each failure collapses to that field's default.

use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use crate::api::{GenerateText, GenerationRequest};
use crate::config::AppConfig;
use crate::models::{EnrichmentResult, NewsType, UNKNOWN};
use crate::utils::truncate_for_log;

const LOCATION_INSTRUCTION: &str =
    "Extract city and locality from the provided news text accurately.";
const CATEGORY_INSTRUCTION: &str = "Classify the news text into a single category.";
const SUMMARY_INSTRUCTION: &str = "Generate a clear, concise news summary in 20–25 words using the provided text. Focus on key facts only.";

/// City and locality named in an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub city: String,
    pub locality: String,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            city: UNKNOWN.to_string(),
            locality: UNKNOWN.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LocationPayload {
    city: Option<String>,
    locality: Option<String>,
}

/// Parse the location call's answer as a JSON object.
///
/// Tolerates a Markdown code fence or prose around the object. Missing or
/// blank fields become `"Unknown"`. Returns `None` when no JSON object can
/// be parsed.
pub fn parse_location(raw: &str) -> Option<Location> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    let payload: LocationPayload = serde_json::from_str(&raw[start..=end]).ok()?;

    let or_unknown = |value: Option<String>| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string())
    };
    Some(Location {
        city: or_unknown(payload.city),
        locality: or_unknown(payload.locality),
    })
}

/// Enrichment client over any [`GenerateText`] backend.
pub struct Enricher<'a, G> {
    model: &'a G,
    config: &'a AppConfig,
}

impl<'a, G: GenerateText> Enricher<'a, G> {
    pub fn new(model: &'a G, config: &'a AppConfig) -> Self {
        Self { model, config }
    }

    fn request(&self, prompt: String, instruction: &str, max_output_tokens: u32) -> GenerationRequest {
        GenerationRequest {
            model: self.config.model.clone(),
            prompt,
            system_instruction: instruction.to_string(),
            max_output_tokens,
            temperature: self.config.temperature,
            use_search: self.config.enable_search,
        }
    }

    /// Run all three derivations for one article.
    ///
    /// Blank text skips the service entirely and yields
    /// [`EnrichmentResult::missing_content`].
    ///
    /// # Arguments
    ///
    /// * `text` - Cleaned article text
    /// * `url` - The article URL, recorded on the tracing span only
    ///
    /// # Returns
    ///
    /// The location, category and summary. Each field falls back on its own
    /// when its call fails: `"Unknown"` for location, [`NewsType::Other`] for
    /// the category, and an `Error generating summary: ...` message for the
    /// summary.
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn enrich(&self, text: &str, url: &str) -> EnrichmentResult {
        if text.trim().is_empty() {
            warn!("No text to enrich; using defaults");
            return EnrichmentResult::missing_content();
        }

        let location = self.extract_location(text).await;
        let news_type = self.classify(text).await;
        let summary = self.summarize(text).await;

        info!(city = %location.city, locality = %location.locality, %news_type, "Enriched article");
        EnrichmentResult {
            city: location.city,
            locality: location.locality,
            news_type,
            summary,
        }
    }

    pub async fn extract_location(&self, text: &str) -> Location {
        let prompt = format!(
            r#"Analyze the following news text and extract the city and locality mentioned. If none are found, return 'Unknown' for both.
Return in JSON format: {{"city": "city_name", "locality": "locality_name"}}.
Examples:
- Text mentions "Gurgaon, Sector 45": {{"city": "Gurgaon", "locality": "Sector 45"}}
- Text mentions "Noida" but no locality: {{"city": "Noida", "locality": "Unknown"}}
- No locations mentioned: {{"city": "Unknown", "locality": "Unknown"}}

Text: {text}"#
        );
        let request = self.request(prompt, LOCATION_INSTRUCTION, 100);

        match self.model.generate(&request).await {
            Ok(raw) => parse_location(&raw).unwrap_or_else(|| {
                error!(
                    response_preview = %truncate_for_log(&raw, 200),
                    "Error extracting city/locality: response is not a JSON object"
                );
                Location::default()
            }),
            Err(e) => {
                error!(error = %e, "Error extracting city/locality");
                Location::default()
            }
        }
    }

    pub async fn classify(&self, text: &str) -> NewsType {
        let prompt = format!(
            r#"Analyze the following news text and classify it into one of these categories: Civic, Infrastructure, Real Estate, Development, or Other.
Return only the category name.
Examples:
- News about road construction: Infrastructure
- News about housing projects: Real Estate
- News about city governance: Civic
- News about urban planning: Development

Text: {text}"#
        );
        let request = self.request(prompt, CATEGORY_INSTRUCTION, 50);

        match self.model.generate(&request).await {
            Ok(raw) => NewsType::from_label(&raw),
            Err(e) => {
                error!(error = %e, "Error classifying news type");
                NewsType::Other
            }
        }
    }

    pub async fn summarize(&self, text: &str) -> String {
        let prompt = format!(
            "You are a news summarization agent. Generate a clear, concise news summary in 20–25 words using the provided text. Focus on key facts only.\nText: {text}"
        );
        let request = self.request(prompt, SUMMARY_INSTRUCTION, 300);

        match self.model.generate(&request).await {
            Ok(raw) => raw.trim().to_string(),
            Err(e) => {
                error!(error = %e, "Error generating summary");
                format!("Error generating summary: {e}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedModel;

    const ARTICLE: &str = "The Noida Authority approved a new metro link to Sector 62.";

    #[test]
    fn test_parse_location_plain_json() {
        let loc = parse_location(r#"{"city": "Gurgaon", "locality": "Sector 45"}"#).unwrap();
        assert_eq!(loc.city, "Gurgaon");
        assert_eq!(loc.locality, "Sector 45");
    }

    #[test]
    fn test_parse_location_fenced_json() {
        let raw = "```json\n{\"city\": \"Noida\", \"locality\": \"\"}\n```";
        let loc = parse_location(raw).unwrap();
        assert_eq!(loc.city, "Noida");
        assert_eq!(loc.locality, "Unknown");
    }

    #[test]
    fn test_parse_location_rejects_non_json() {
        assert_eq!(parse_location("The city is Pune."), None);
        assert_eq!(parse_location("} nothing {"), None);
        assert_eq!(parse_location("{'city': 'Pune'}"), None);
        assert_eq!(parse_location("__import__('os').system('true')"), None);
    }

    #[tokio::test]
    async fn test_empty_text_skips_service() {
        let model = ScriptedModel::new(|_| Ok("unused".to_string()));
        let config = AppConfig::default();
        let result = Enricher::new(&model, &config).enrich("   ", "https://x.test/a").await;
        assert_eq!(result, EnrichmentResult::missing_content());
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_all_three_calls_succeed() {
        let model = ScriptedModel::new(|req| {
            Ok(match req.max_output_tokens {
                100 => r#"{"city": "Noida", "locality": "Sector 62"}"#.to_string(),
                50 => " Infrastructure\n".to_string(),
                _ => "  Noida approves metro link to Sector 62.  ".to_string(),
            })
        });
        let config = AppConfig::default();
        let result = Enricher::new(&model, &config).enrich(ARTICLE, "https://x.test/a").await;
        assert_eq!(result.city, "Noida");
        assert_eq!(result.locality, "Sector 62");
        assert_eq!(result.news_type, NewsType::Infrastructure);
        assert_eq!(result.summary, "Noida approves metro link to Sector 62.");
        assert_eq!(model.call_count(), 3);
    }

    #[tokio::test]
    async fn test_summary_failure_keeps_category() {
        let model = ScriptedModel::new(|req| {
            if req.system_instruction == SUMMARY_INSTRUCTION {
                Err(crate::api::GenerationError::Transport("quota exceeded".to_string()))
            } else if req.system_instruction == CATEGORY_INSTRUCTION {
                Ok("Real Estate".to_string())
            } else {
                Ok("not json".to_string())
            }
        });
        let config = AppConfig::default();
        let result = Enricher::new(&model, &config).enrich(ARTICLE, "https://x.test/a").await;
        assert_eq!(result.news_type, NewsType::RealEstate);
        assert!(result.summary.contains("Error generating summary"));
        assert!(result.summary.contains("quota exceeded"));
        assert_eq!(result.city, "Unknown");
        assert_eq!(result.locality, "Unknown");
        assert_eq!(model.call_count(), 3);
    }

    #[tokio::test]
    async fn test_requests_carry_service_parameters() {
        let model = ScriptedModel::new(|_| Ok("Other".to_string()));
        let config = AppConfig::default();
        Enricher::new(&model, &config).enrich(ARTICLE, "https://x.test/a").await;

        let requests = model.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].system_instruction, LOCATION_INSTRUCTION);
        assert_eq!(requests[1].system_instruction, CATEGORY_INSTRUCTION);
        assert_eq!(requests[2].system_instruction, SUMMARY_INSTRUCTION);
        for req in &requests {
            assert_eq!(req.temperature, 0.7);
            assert_eq!(req.model, config.model);
            assert!(req.use_search);
            assert!(req.prompt.ends_with(ARTICLE));
        }
    }
}
