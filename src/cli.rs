//! Command-line interface definitions.
//!
//! Every option has a default, so running the binary without arguments
//! scrapes all sites into the current directory.

use crate::config::{DEFAULT_USER_AGENT, FetchConfig};
use crate::runner::Selection;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Everything, into ./out
/// health_faq_scraper -o ./out
///
/// # Only the WHO hub, more patient with a slow server
/// health_faq_scraper --site who --max-retries 4 --timeout-secs 60
///
/// # Point the scrapers at other URLs
/// health_faq_scraper -c sites.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Which site to scrape
    #[arg(short, long, value_enum, default_value_t = Selection::All)]
    pub site: Selection,

    /// Directory the CSV files are written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// User-Agent header sent with every request
    #[arg(long, env = "FAQ_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Extra attempts for a page that answers with a 5xx or times out
    #[arg(long, default_value_t = 2)]
    pub max_retries: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Base delay between retries in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub retry_delay_ms: u64,

    /// Optional YAML file overriding site URLs and topic pages
    #[arg(short, long, env = "FAQ_SITES_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            user_agent: self.user_agent.clone(),
            max_retries: self.max_retries,
            timeout: Duration::from_secs(self.timeout_secs),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}
