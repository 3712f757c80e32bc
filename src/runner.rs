//! Drives the scrapers and hands their records to the CSV sink.
//!
//! Sites run one after another and pages within a site are fetched in
//! order. A failed page is logged and counted; the remaining pages of the
//! site are still attempted. Cancellation is checked between pages, and
//! whatever was collected up to that point is still written.

use crate::config::SitesConfig;
use crate::fetch::FetchPage;
use crate::models::{QA_FIELDS, QaRecord};
use crate::outputs::csv;
use crate::scrapers::{Extraction, cdc, cnn, who};
use chrono::NaiveDate;
use clap::ValueEnum;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, instrument, warn};

pub const WHO_QA_FILE: &str = "who_qapairs.csv";
pub const WHO_CATEGORIES_FILE: &str = "who_categogies.csv";
pub const CDC_FAQ_FILE: &str = "cdc_qapairs.csv";
pub const CDC_TOPICS_FILE: &str = "cdc_qapairs19dic.csv";
pub const CNN_FILE: &str = "cnn_qapairs.csv";

/// One scraper and the file it writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    Who,
    CdcFaq,
    CdcTopics,
    Cnn,
}

impl Site {
    /// Every site, in run order.
    pub const EACH: [Site; 4] = [Site::Who, Site::CdcFaq, Site::CdcTopics, Site::Cnn];

    pub fn as_str(&self) -> &'static str {
        match self {
            Site::Who => "who",
            Site::CdcFaq => "cdc-faq",
            Site::CdcTopics => "cdc-topics",
            Site::Cnn => "cnn",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which scraper(s) to run, as chosen on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Selection {
    /// WHO Q&A hub, one page per category.
    Who,
    /// CDC single FAQ page.
    CdcFaq,
    /// faq.coronavirus.gov topic pages.
    CdcTopics,
    /// CNN interactive Q&A page.
    Cnn,
    /// Every site above, in that order.
    All,
}

impl Selection {
    /// The sites this selection covers, in run order.
    pub fn sites(self) -> &'static [Site] {
        match self {
            Selection::Who => &[Site::Who],
            Selection::CdcFaq => &[Site::CdcFaq],
            Selection::CdcTopics => &[Site::CdcTopics],
            Selection::Cnn => &[Site::Cnn],
            Selection::All => &Site::EACH,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sites() {
            [site] => f.write_str(site.as_str()),
            _ => f.write_str("all"),
        }
    }
}

/// How a run (or one site of it) went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Partial,
    Failure,
}

impl Outcome {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Failure => ExitCode::from(1),
            Outcome::Partial => ExitCode::from(2),
        }
    }
}

/// Counters for one site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteReport {
    pub site: Site,
    pub records: usize,
    pub pages_ok: usize,
    pub pages_failed: usize,
    /// Pairs or blocks dropped for structural reasons.
    pub skipped: usize,
    pub write_failed: bool,
    pub cancelled: bool,
}

impl SiteReport {
    fn new(site: Site) -> Self {
        Self {
            site,
            records: 0,
            pages_ok: 0,
            pages_failed: 0,
            skipped: 0,
            write_failed: false,
            cancelled: false,
        }
    }

    pub fn outcome(&self) -> Outcome {
        if self.write_failed {
            Outcome::Failure
        } else if self.pages_failed == 0 && self.skipped == 0 && !self.cancelled {
            Outcome::Success
        } else if self.pages_ok > 0 {
            Outcome::Partial
        } else {
            Outcome::Failure
        }
    }

    fn absorb(&mut self, extraction: Extraction, batch: &mut Vec<QaRecord>) {
        self.pages_ok += 1;
        self.skipped += extraction.skipped;
        batch.extend(extraction.records);
    }
}

/// Reports of every site a run visited.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub reports: Vec<SiteReport>,
}

impl RunSummary {
    pub fn outcome(&self) -> Outcome {
        if self.reports.is_empty() {
            return Outcome::Failure;
        }
        let outcomes: Vec<Outcome> = self.reports.iter().map(SiteReport::outcome).collect();
        if outcomes.iter().all(|o| *o == Outcome::Success) {
            Outcome::Success
        } else if outcomes.iter().all(|o| *o == Outcome::Failure) {
            Outcome::Failure
        } else {
            Outcome::Partial
        }
    }

    pub fn total_records(&self) -> usize {
        self.reports.iter().map(|r| r.records).sum()
    }
}

/// Runs scrapers against a fetcher and writes into `output_dir`.
pub struct Runner<F> {
    fetcher: F,
    sites: SitesConfig,
    output_dir: PathBuf,
    today: NaiveDate,
    cancel: Arc<AtomicBool>,
}

impl<F: FetchPage> Runner<F> {
    pub fn new(
        fetcher: F,
        sites: SitesConfig,
        output_dir: impl Into<PathBuf>,
        today: NaiveDate,
    ) -> Self {
        Self {
            fetcher,
            sites,
            output_dir: output_dir.into(),
            today,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that stops the run before the next page when set.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn path(&self, file: &str) -> PathBuf {
        self.output_dir.join(file)
    }

    /// Run every site `selection` covers, one after another.
    pub async fn run(&self, selection: Selection) -> RunSummary {
        let mut summary = RunSummary::default();
        for &site in selection.sites() {
            if self.is_cancelled() {
                warn!(%site, "Run cancelled; not starting site");
                break;
            }
            let report = self.run_site(site).await;
            info!(
                %site,
                records = report.records,
                pages_ok = report.pages_ok,
                pages_failed = report.pages_failed,
                skipped = report.skipped,
                outcome = ?report.outcome(),
                "Site finished"
            );
            summary.reports.push(report);
        }
        summary
    }

    async fn run_site(&self, site: Site) -> SiteReport {
        match site {
            Site::Who => self.run_who().await,
            Site::CdcFaq => self.run_cdc_faq().await,
            Site::CdcTopics => self.run_cdc_topics().await,
            Site::Cnn => self.run_cnn().await,
        }
    }

    /// Lists categories, then appends each category's records as it completes.
    #[instrument(level = "info", skip_all)]
    async fn run_who(&self) -> SiteReport {
        let mut report = SiteReport::new(Site::Who);
        let who_site = &self.sites.who;

        let categories = match who::list_categories(&self.fetcher, &who_site.hub_url).await {
            Ok(categories) => {
                report.pages_ok += 1;
                categories
            }
            Err(e) => {
                error!(error = %e, "WHO hub page failed");
                report.pages_failed += 1;
                return report;
            }
        };

        if let Err(e) = csv::write_categories(self.path(WHO_CATEGORIES_FILE), &categories).await {
            error!(error = %e, "Failed writing WHO categories");
            report.write_failed = true;
        }

        let qa_path = self.path(WHO_QA_FILE);
        if let Err(e) = csv::write_header(&qa_path, &QA_FIELDS).await {
            error!(path = %qa_path.display(), error = %e, "Failed creating WHO QA file");
            report.write_failed = true;
            return report;
        }

        for category in &categories {
            if self.is_cancelled() {
                warn!("Run cancelled; stopping WHO categories");
                report.cancelled = true;
                break;
            }
            let extracted =
                who::extract_category(&self.fetcher, &who_site.root_url, category, self.today)
                    .await;
            match extracted {
                Ok(extraction) => {
                    report.pages_ok += 1;
                    report.skipped += extraction.skipped;
                    if let Err(e) = csv::append_records(&qa_path, &extraction.records).await {
                        error!(
                            path = %qa_path.display(),
                            error = %e,
                            "Failed appending WHO records"
                        );
                        report.write_failed = true;
                        break;
                    }
                    report.records += extraction.records.len();
                }
                Err(e) => {
                    error!(
                        category = %category.name,
                        error = %e,
                        "WHO category failed; continuing"
                    );
                    report.pages_failed += 1;
                }
            }
        }
        report
    }

    #[instrument(level = "info", skip_all)]
    async fn run_cdc_faq(&self) -> SiteReport {
        let mut report = SiteReport::new(Site::CdcFaq);
        let mut batch = Vec::new();
        let page_url = &self.sites.cdc_faq.page_url;
        match cdc::extract_faq_page(&self.fetcher, page_url, self.today).await {
            Ok(extraction) => report.absorb(extraction, &mut batch),
            Err(e) => {
                error!(error = %e, "CDC FAQ page failed");
                report.pages_failed += 1;
                return report;
            }
        }
        self.persist(&mut report, CDC_FAQ_FILE, &batch).await;
        report
    }

    #[instrument(level = "info", skip_all)]
    async fn run_cdc_topics(&self) -> SiteReport {
        let mut report = SiteReport::new(Site::CdcTopics);
        let topics = &self.sites.cdc_topics;
        let mut batch = Vec::new();

        for page in &topics.pages {
            if self.is_cancelled() {
                warn!("Run cancelled; stopping CDC topic pages");
                report.cancelled = true;
                break;
            }
            match cdc::extract_topic_page(&self.fetcher, &topics.root_url, page, self.today).await {
                Ok(extraction) => report.absorb(extraction, &mut batch),
                Err(e) => {
                    error!(slug = %page.slug, error = %e, "CDC topic page failed; continuing");
                    report.pages_failed += 1;
                }
            }
        }

        if report.pages_ok > 0 {
            self.persist(&mut report, CDC_TOPICS_FILE, &batch).await;
        }
        report
    }

    #[instrument(level = "info", skip_all)]
    async fn run_cnn(&self) -> SiteReport {
        let mut report = SiteReport::new(Site::Cnn);
        let page_url = &self.sites.cnn.page_url;
        let records = match cnn::extract_page(&self.fetcher, page_url, self.today).await {
            Ok(records) => {
                report.pages_ok += 1;
                records
            }
            Err(e) => {
                error!(error = %e, "CNN page failed");
                report.pages_failed += 1;
                return report;
            }
        };
        self.persist(&mut report, CNN_FILE, &records).await;
        report
    }

    async fn persist(&self, report: &mut SiteReport, file: &str, records: &[QaRecord]) {
        let path = self.path(file);
        match csv::write_records(&path, records).await {
            Ok(()) => report.records += records.len(),
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed writing records");
                report.write_failed = true;
            }
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
