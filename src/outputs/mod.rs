//! Output generation for a run's results.
//!
//! # Submodules
//!
//! - [`csv_export`]: raw per-source URL lists and the full news table
//! - [`json`]: the `{"news": [...]}` document
//! - [`display`]: plain-text rendering of filtered items for the terminal
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── constructionworld_urls.csv
//! ├── economic_times_urls.csv
//! └── realtyplus_urls.csv
//!
//! --csv <path>      # news_url,summary,city,locality,date,source,news_type
//! ```

pub mod csv_export;
pub mod display;
pub mod json;
