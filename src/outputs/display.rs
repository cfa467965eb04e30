//! Plain-text rendering for the terminal.

use crate::filter::NewsFilter;
use crate::models::NewsItem;
use crate::pipeline::RunReport;

/// One item as a card: City, Summary, Locality, News Type, Source URL, Date.
pub fn render_item(item: &NewsItem) -> String {
    format!(
        "City: {}\nSummary: {}\nLocality: {}\nNews Type: {}\nSource URL: {}\nDate: {}\n",
        item.city, item.summary, item.locality, item.news_type, item.news_url, item.date
    )
}

/// Failures, then either the filtered items or a message explaining why
/// there is nothing to show.
pub fn render_report(report: &RunReport, filter: &NewsFilter, log_file: &str) -> String {
    let mut out = String::new();

    for failure in &report.failures {
        out.push_str(&format!("Error: {}\n", failure.message));
    }
    if !report.failures.is_empty() {
        out.push_str(&format!("See the log file ({log_file}) for details.\n\n"));
    }

    if report.items.is_empty() {
        out.push_str(&format!(
            "No news items fetched. Please check the log file ({log_file}) for details.\n"
        ));
        return out;
    }

    let visible = filter.apply(&report.items);
    if visible.is_empty() {
        out.push_str("No news items match the selected filters.\n");
        return out;
    }

    out.push_str("News Summaries\n==============\n\n");
    let cards: Vec<String> = visible.into_iter().map(render_item).collect();
    out.push_str(&cards.join("\n"));
    out
}
