//! # Health FAQ Scraper
//!
//! Scrapes the WHO, CDC and CNN coronavirus FAQ pages into CSV files.
//!
//! ## Usage
//!
//! ```sh
//! health_faq_scraper --site all -o ./out
//! ```
//!
//! The exit status summarizes the run: `0` when every site succeeded, `2`
//! when some pages or blocks failed, `1` when nothing could be scraped.

use chrono::Local;
use clap::Parser;
use health_faq_scraper::cli::Cli;
use health_faq_scraper::config::SitesConfig;
use health_faq_scraper::fetch::build_fetcher;
use health_faq_scraper::runner::{Outcome, Runner};
use health_faq_scraper::utils::ensure_writable_dir;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("health_faq_scraper starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Outcome::Failure.exit_code();
    }

    let sites = match &args.config {
        Some(path) => match SitesConfig::load(path).await {
            Ok(sites) => sites,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to load sites configuration");
                return Outcome::Failure.exit_code();
            }
        },
        None => SitesConfig::builtin(),
    };

    let fetch_config = args.fetch_config();
    let fetcher = match build_fetcher(&fetch_config) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client");
            return Outcome::Failure.exit_code();
        }
    };
    info!(
        user_agent = %fetch_config.user_agent,
        max_retries = fetch_config.max_retries,
        timeout = ?fetch_config.timeout,
        "Fetcher ready"
    );

    let today = Local::now().date_naive();
    let runner = Runner::new(fetcher, sites, args.output_dir.clone(), today);

    // Ctrl-C stops the run after the current page.
    let cancel = runner.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; finishing current page");
            cancel.store(true, Ordering::Relaxed);
        }
    });

    let summary = runner.run(args.site).await;
    let outcome = summary.outcome();

    let elapsed = start_time.elapsed();
    info!(
        site = %args.site,
        output_dir = %runner.output_dir().display(),
        records = summary.total_records(),
        ?outcome,
        ?elapsed,
        "Execution complete"
    );

    outcome.exit_code()
}
