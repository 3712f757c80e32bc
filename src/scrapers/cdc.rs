//! CDC coronavirus FAQ scrapers.
//!
//! Two layouts are supported:
//!
//! - **FAQ page** ([`extract_faq_page`]): a single page of accordion blocks,
//!   each block preceded by an `h2` that names its topic. Block `i` takes the
//!   text of the page's `i`-th `h2` as category.
//! - **Topic pages** ([`extract_topic_page`]): one page per topic slug under
//!   `faq.coronavirus.gov`; the category is the page label and every record
//!   carries the page URL.
//!
//! Both replace line breaks and tabs with spaces.

use super::{Extraction, pair_positionally, resolve_url};
use crate::config::TopicPage;
use crate::document::{Document, Node};
use crate::error::ScrapeError;
use crate::fetch::FetchPage;
use crate::models::QaRecord;
use crate::normalize::{Whitespace, normalize};
use chrono::NaiveDate;
use tracing::{info, instrument, warn};

const FAQ_BLOCK_CLASS: &str = "accordion indicator-plus accordion-white mb-3";
const FAQ_QUESTION_CLASS: &str = "card-title";
const FAQ_ANSWER_CLASS: &str = "card-body";
const FAQ_HEADING_TAG: &str = "h2";

const TOPIC_BLOCK_CLASS: &str = "usa-accordion usa-accordion--bordered";
const TOPIC_QUESTION_TAG: &str = "button";
const TOPIC_ANSWER_CLASS: &str = "usa-accordion__content usa-prose";

/// Fetch the CDC FAQ page and extract every block.
///
/// # Arguments
///
/// * `fetcher` - Page source
/// * `page_url` - Absolute URL of the FAQ page; also the `source_url` of
///   every record
/// * `today` - Capture date stamped on the records
///
/// # Errors
///
/// Fetch errors are passed through; a page without accordion blocks is a
/// [`ScrapeError::StructuralMismatch`]. Unbalanced blocks are only counted
/// in [`Extraction::skipped`].
#[instrument(level = "info", skip_all, fields(%page_url))]
pub async fn extract_faq_page<F: FetchPage>(
    fetcher: &F,
    page_url: &str,
    today: NaiveDate,
) -> Result<Extraction, ScrapeError> {
    let html = fetcher.fetch(page_url).await?;
    let extraction = parse_faq_page(&html, page_url, today)?;
    info!(
        count = extraction.records.len(),
        skipped = extraction.skipped,
        "Extracted CDC FAQ page"
    );
    Ok(extraction)
}

/// Extract QA pairs from the FAQ page.
///
/// Blocks whose question and answer counts differ are skipped. Blocks past
/// the last `h2` get an empty category; surplus headings are ignored.
/// Headings go through the space policy, so a heading broken over two lines
/// reads as one.
pub fn parse_faq_page(
    html: &str,
    page_url: &str,
    today: NaiveDate,
) -> Result<Extraction, ScrapeError> {
    let document = Document::parse(html);
    let blocks = document.find_all_by_class(FAQ_BLOCK_CLASS);
    if blocks.is_empty() {
        return Err(ScrapeError::mismatch(page_url, "no accordion blocks on FAQ page"));
    }
    let headings: Vec<String> = document
        .find_all_by_tag(FAQ_HEADING_TAG)
        .iter()
        .map(|h| normalize(&h.text(), Whitespace::Space))
        .collect();

    if headings.len() < blocks.len() {
        warn!(
            url = %page_url,
            blocks = blocks.len(),
            headings = headings.len(),
            "Fewer headings than blocks; trailing blocks get no category"
        );
    }

    let mut extraction = Extraction::default();
    for (index, block) in blocks.iter().enumerate() {
        let category = headings.get(index).cloned().unwrap_or_default();
        extract_block(
            &mut extraction,
            block,
            block.find_all_by_class(FAQ_QUESTION_CLASS),
            block.find_all_by_class(FAQ_ANSWER_CLASS),
            page_url,
            &category,
            today,
        );
    }
    Ok(extraction)
}

/// Fetch one `faq.coronavirus.gov` topic page and extract it.
///
/// The page URL is `page.slug` resolved against `root_url`, and the category
/// is [`TopicPage::label`].
#[instrument(level = "info", skip_all, fields(slug = %page.slug))]
pub async fn extract_topic_page<F: FetchPage>(
    fetcher: &F,
    root_url: &str,
    page: &TopicPage,
    today: NaiveDate,
) -> Result<Extraction, ScrapeError> {
    let page_url = resolve_url(root_url, &page.slug)?;
    let html = fetcher.fetch(&page_url).await?;
    let extraction = parse_topic_page(&html, &page_url, &page.label(), today)?;
    info!(
        count = extraction.records.len(),
        skipped = extraction.skipped,
        url = %page_url,
        "Extracted CDC topic page"
    );
    Ok(extraction)
}

/// Extract QA pairs from a topic page; every record gets `label` as category.
pub fn parse_topic_page(
    html: &str,
    page_url: &str,
    label: &str,
    today: NaiveDate,
) -> Result<Extraction, ScrapeError> {
    let document = Document::parse(html);
    let blocks = document.find_all_by_class(TOPIC_BLOCK_CLASS);
    if blocks.is_empty() {
        return Err(ScrapeError::mismatch(page_url, "no accordion blocks on topic page"));
    }

    let mut extraction = Extraction::default();
    for block in blocks {
        extract_block(
            &mut extraction,
            &block,
            block.find_all_by_tag(TOPIC_QUESTION_TAG),
            block.find_all_by_class(TOPIC_ANSWER_CLASS),
            page_url,
            label,
            today,
        );
    }
    Ok(extraction)
}

fn extract_block<'a>(
    extraction: &mut Extraction,
    block: &Node<'a>,
    questions: Vec<Node<'a>>,
    answers: Vec<Node<'a>>,
    page_url: &str,
    category: &str,
    today: NaiveDate,
) {
    let pairs = match pair_positionally(page_url, questions, answers) {
        Ok(pairs) => pairs,
        Err(e) => {
            warn!(error = %e, id = ?block.attribute("id"), "Skipping accordion block");
            extraction.skipped += 1;
            return;
        }
    };

    extraction
        .records
        .extend(pairs.into_iter().map(|(question, answer)| QaRecord {
            captured_date: today,
            source_url: page_url.to_string(),
            category: category.to_string(),
            question: normalize(&question.text(), Whitespace::Space),
            answer: normalize(&answer.text(), Whitespace::Space),
        }));
}
