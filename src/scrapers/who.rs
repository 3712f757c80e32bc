//! WHO coronavirus question-and-answers hub scraper.
//!
//! Scraping happens in two phases:
//!
//! 1. **Listing**: the hub page links to one page per category through
//!    `.sf-list-vertical__item` anchors; the display name sits in a nested
//!    `.full-title` element.
//! 2. **Extraction**: every category page is an accordion of
//!    `.sf-accordion__link` questions and `.sf-accordion__content` answers.
//!    The answer is the first paragraph of the content element.
//!
//! Line breaks and tabs are deleted (not replaced) in WHO text.

use super::{Extraction, pair_by_anchor, resolve_url};
use crate::document::Document;
use crate::error::ScrapeError;
use crate::fetch::FetchPage;
use crate::models::{Category, QaRecord};
use crate::normalize::{Whitespace, normalize};
use crate::utils::truncate_for_log;
use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

const CATEGORY_ITEM_CLASS: &str = "sf-list-vertical__item";
const CATEGORY_TITLE_CLASS: &str = "full-title";
const QUESTION_CLASS: &str = "sf-accordion__link";
const ANSWER_CLASS: &str = "sf-accordion__content";

/// Fetch the hub page and list its categories in document order.
///
/// # Arguments
///
/// * `fetcher` - Page source, normally the retrying HTTP fetcher
/// * `hub_url` - Absolute URL of the question-and-answers hub
///
/// # Returns
///
/// One [`Category`] per linked item, with the `href` as given on the page.
///
/// # Errors
///
/// Fetch errors are passed through. A hub without any category item is a
/// [`ScrapeError::StructuralMismatch`].
#[instrument(level = "info", skip_all, fields(%hub_url))]
pub async fn list_categories<F: FetchPage>(
    fetcher: &F,
    hub_url: &str,
) -> Result<Vec<Category>, ScrapeError> {
    let html = fetcher.fetch(hub_url).await?;
    let categories = parse_categories(&html, hub_url)?;
    info!(count = categories.len(), source = hub_url, "Listed WHO categories");
    Ok(categories)
}

/// Read category links from hub page HTML.
///
/// Items without an `href` or without a title are skipped. The title is
/// trimmed; a line break inside it is kept.
pub fn parse_categories(html: &str, hub_url: &str) -> Result<Vec<Category>, ScrapeError> {
    let document = Document::parse(html);
    let items = document.find_all_by_class(CATEGORY_ITEM_CLASS);
    if items.is_empty() {
        return Err(ScrapeError::mismatch(
            hub_url,
            format!("no .{CATEGORY_ITEM_CLASS} items on hub page"),
        ));
    }

    let mut categories = Vec::new();
    for item in items {
        let path = item.attribute("href").map(str::trim).unwrap_or_default();
        let name = item
            .first_by_class(CATEGORY_TITLE_CLASS)
            .map(|title| title.text().trim().to_string())
            .unwrap_or_default();

        if path.is_empty() || name.is_empty() {
            warn!(path, name = %name, "Skipping WHO category item without link or title");
            continue;
        }
        categories.push(Category {
            path: path.to_string(),
            name,
        });
    }
    Ok(categories)
}

/// Fetch one category page and extract its QA pairs.
///
/// `category.path` is resolved against `root_url`; the resolved URL is the
/// `source_url` of every record.
#[instrument(level = "info", skip_all, fields(category = %category.name))]
pub async fn extract_category<F: FetchPage>(
    fetcher: &F,
    root_url: &str,
    category: &Category,
    today: NaiveDate,
) -> Result<Extraction, ScrapeError> {
    let page_url = resolve_url(root_url, &category.path)?;
    let html = fetcher.fetch(&page_url).await?;
    let extraction = parse_category_page(&html, &page_url, &category.name, today)?;
    info!(
        count = extraction.records.len(),
        skipped = extraction.skipped,
        url = %page_url,
        "Extracted WHO category"
    );
    Ok(extraction)
}

/// Extract QA pairs from a category page.
///
/// A content element without a paragraph is skipped.
///
/// # Errors
///
/// [`ScrapeError::StructuralMismatch`] when the page has no accordion
/// questions, or when question/answer counts cannot be reconciled.
pub fn parse_category_page(
    html: &str,
    page_url: &str,
    category: &str,
    today: NaiveDate,
) -> Result<Extraction, ScrapeError> {
    let document = Document::parse(html);
    let questions = document.find_all_by_class(QUESTION_CLASS);
    if questions.is_empty() {
        return Err(ScrapeError::mismatch(
            page_url,
            format!("no .{QUESTION_CLASS} questions on category page"),
        ));
    }
    let pairs = pair_by_anchor(page_url, questions, document.find_all_by_class(ANSWER_CLASS))?;

    let mut extraction = Extraction::default();
    for (question, content) in pairs {
        let question = normalize(&question.text(), Whitespace::Delete);
        let Some(paragraph) = content.first_child_by_tag("p") else {
            warn!(
                url = %page_url,
                question = %truncate_for_log(&question, 80),
                "WHO answer has no paragraph; skipping"
            );
            extraction.skipped += 1;
            continue;
        };
        let answer = normalize(&paragraph.text(), Whitespace::Delete);
        debug!(question = %truncate_for_log(&question, 80), "WHO pair");

        extraction.records.push(QaRecord {
            captured_date: today,
            source_url: page_url.to_string(),
            category: category.to_string(),
            question,
            answer,
        });
    }
    Ok(extraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchConfig;
    use crate::fetch::build_fetcher;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const HUB: &str = r#"
        <ul>
          <a class="sf-list-vertical__item" href="/faq/general">
            <span class="full-title"> General </span>
          </a>
          <a class="sf-list-vertical__item" href="/faq/vaccines">
            <span class="full-title">Vaccines</span>
          </a>
          <a class="sf-list-vertical__item"><span class="full-title">No link</span></a>
          <a class="sf-list-vertical__item" href="/faq/masks">
            <span class="full-title">Masks</span>
          </a>
        </ul>
    "#;

    const GENERAL: &str = r#"
        <div class="sf-accordion">
          <a class="sf-accordion__link">Is it safe?
</a>
          <div class="sf-accordion__content"><p>Yes.</p><p>More detail.</p></div>
        </div>
    "#;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn test_parse_categories_in_document_order() {
        let categories = parse_categories(HUB, "https://www.who.int/hub").unwrap();
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["General", "Vaccines", "Masks"]);
        assert_eq!(categories[0].path, "/faq/general");
        assert!(categories.iter().all(|c| !c.path.is_empty() && !c.name.is_empty()));
    }

    #[test]
    fn test_title_with_line_break_is_trimmed_only() {
        let html = r#"
            <a class="sf-list-vertical__item" href="/faq/travel">
              <span class="full-title">
                Travel
advice
              </span>
            </a>
        "#;
        let categories = parse_categories(html, "https://www.who.int/hub").unwrap();
        assert_eq!(categories[0].name, "Travel\nadvice");
    }

    #[test]
    fn test_hub_without_items_is_mismatch() {
        let err = parse_categories("<div class='redesigned'>FAQ</div>", "https://www.who.int/hub")
            .unwrap_err();
        assert!(matches!(err, ScrapeError::StructuralMismatch { .. }));
    }

    #[test]
    fn test_category_page_without_questions_is_mismatch() {
        let err = parse_category_page("<p>Moved</p>", "https://www.who.int/x", "X", today())
            .unwrap_err();
        assert!(matches!(err, ScrapeError::StructuralMismatch { .. }));
    }

    #[test]
    fn test_parse_category_page_single_pair() {
        let extraction =
            parse_category_page(GENERAL, "https://www.who.int/faq/general", "General", today())
                .unwrap();
        assert_eq!(extraction.skipped, 0);
        assert_eq!(
            extraction.records,
            vec![QaRecord {
                captured_date: today(),
                source_url: "https://www.who.int/faq/general".to_string(),
                category: "General".to_string(),
                question: "Is it safe?".to_string(),
                answer: "Yes.".to_string(),
            }]
        );
    }

    #[test]
    fn test_delete_policy_joins_broken_lines() {
        let html = r#"
            <a class="sf-accordion__link">How does it
spread?</a>
            <div class="sf-accordion__content"><p>Through	droplets.</p></div>
        "#;
        let extraction = parse_category_page(html, "https://www.who.int/x", "X", today()).unwrap();
        assert_eq!(extraction.records[0].question, "How does itspread?");
        assert_eq!(extraction.records[0].answer, "Throughdroplets.");
    }

    #[test]
    fn test_missing_paragraph_skips_pair() {
        let html = r#"
            <a class="sf-accordion__link">Q1</a>
            <div class="sf-accordion__content"><ul><li>no paragraph</li></ul></div>
            <a class="sf-accordion__link">Q2</a>
            <div class="sf-accordion__content"><p>A2</p></div>
        "#;
        let extraction = parse_category_page(html, "https://www.who.int/x", "X", today()).unwrap();
        assert_eq!(extraction.skipped, 1);
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.records[0].question, "Q2");
    }

    #[test]
    fn test_count_mismatch_fails_page() {
        let html = r#"
            <a class="sf-accordion__link">Q1</a>
            <a class="sf-accordion__link">Q2</a>
            <div class="sf-accordion__content"><p>A1</p></div>
        "#;
        let err = parse_category_page(html, "https://www.who.int/x", "X", today()).unwrap_err();
        assert!(matches!(err, ScrapeError::StructuralMismatch { .. }));
    }

    #[tokio::test]
    async fn test_list_then_extract_against_mock_site() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hub"))
            .respond_with(ResponseTemplate::new(200).set_body_string(HUB))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/faq/general"))
            .respond_with(ResponseTemplate::new(200).set_body_string(GENERAL))
            .mount(&server)
            .await;

        let fetcher = build_fetcher(&FetchConfig {
            retry_delay: Duration::ZERO,
            ..FetchConfig::default()
        })
        .unwrap();
        let categories = list_categories(&fetcher, &format!("{}/hub", server.uri()))
            .await
            .unwrap();
        assert_eq!(categories.len(), 3);

        let root = format!("{}/", server.uri());
        let extraction = extract_category(&fetcher, &root, &categories[0], today())
            .await
            .unwrap();
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(
            extraction.records[0].source_url,
            format!("{}/faq/general", server.uri())
        );
        assert_eq!(extraction.records[0].category, "General");
    }
}
