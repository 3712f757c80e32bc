//! # Health FAQ Scraper
//!
//! Extracts question/answer pairs from public health FAQ pages and writes
//! them to CSV files with the columns `date,url,category,question,answer`.
//!
//! ## Sites
//!
//! - WHO question-and-answers hub (one page per category)
//! - CDC coronavirus FAQ page
//! - faq.coronavirus.gov topic pages
//! - CNN coronavirus questions-and-answers page
//!
//! ## Architecture
//!
//! 1. **Fetching**: [`fetch`] GETs a page, retrying 5xx and timeouts a bounded number of times
//! 2. **Parsing**: [`document`] wraps the HTML for class and tag lookups
//! 3. **Extraction**: [`scrapers`] walk each site's layout into [`models::QaRecord`]s
//! 4. **Output**: [`outputs::csv`] writes the records; [`runner`] ties it together

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod fetch;
pub mod models;
pub mod normalize;
pub mod outputs;
pub mod runner;
pub mod scrapers;
pub mod utils;
