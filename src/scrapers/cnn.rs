//! CNN coronavirus questions-and-answers scraper.
//!
//! The interactive page lists every question as three sibling sequences:
//! `.question-q` (question), `.question-a` (answer) and `.question-t` (tag
//! container holding one `span` per tag). The sequences are aligned by index
//! and the tags are joined with `;` into the category.
//!
//! Question and answer text is kept exactly as it appears in the page.

use crate::document::Document;
use crate::error::ScrapeError;
use crate::fetch::FetchPage;
use crate::models::QaRecord;
use crate::normalize::{Whitespace, normalize};
use chrono::NaiveDate;
use itertools::Itertools;
use tracing::{info, instrument};

const QUESTION_CLASS: &str = "question-q";
const ANSWER_CLASS: &str = "question-a";
const TAGS_CLASS: &str = "question-t";
const TAG_TAG: &str = "span";
const TAG_SEPARATOR: &str = ";";

/// Fetch the CNN page and extract every question.
///
/// # Returns
///
/// One record per `.question-q`, in page order, all stamped with `page_url`
/// and `today`.
///
/// # Errors
///
/// Fetch errors are passed through. See [`parse_page`] for the structural
/// checks.
#[instrument(level = "info", skip_all, fields(%page_url))]
pub async fn extract_page<F: FetchPage>(
    fetcher: &F,
    page_url: &str,
    today: NaiveDate,
) -> Result<Vec<QaRecord>, ScrapeError> {
    let html = fetcher.fetch(page_url).await?;
    let records = parse_page(&html, page_url, today)?;
    info!(count = records.len(), source = page_url, "Extracted CNN questions");
    Ok(records)
}

/// Extract QA pairs from the CNN page.
///
/// The three sequences must have the same length; otherwise tags and
/// answers cannot be attributed and the page is rejected. A page with no
/// questions at all is rejected too.
pub fn parse_page(
    html: &str,
    page_url: &str,
    today: NaiveDate,
) -> Result<Vec<QaRecord>, ScrapeError> {
    let document = Document::parse(html);
    let questions = document.find_all_by_class(QUESTION_CLASS);
    if questions.is_empty() {
        return Err(ScrapeError::mismatch(
            page_url,
            format!("no .{QUESTION_CLASS} questions on page"),
        ));
    }
    let answers = document.find_all_by_class(ANSWER_CLASS);
    let tags = document.find_all_by_class(TAGS_CLASS);

    if questions.len() != answers.len() || questions.len() != tags.len() {
        return Err(ScrapeError::mismatch(
            page_url,
            format!(
                "{} questions, {} answers, {} tag containers",
                questions.len(),
                answers.len(),
                tags.len()
            ),
        ));
    }

    let records = questions
        .iter()
        .zip(&answers)
        .zip(&tags)
        .map(|((question, answer), tag_box)| QaRecord {
            captured_date: today,
            source_url: page_url.to_string(),
            category: tag_box
                .find_all_by_tag(TAG_TAG)
                .iter()
                .map(|span| span.text())
                .join(TAG_SEPARATOR),
            question: normalize(&question.text(), Whitespace::Raw),
            answer: normalize(&answer.text(), Whitespace::Raw),
        })
        .collect();
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str =
        "https://edition.cnn.com/interactive/2020/health/coronavirus-questions-answers/";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn test_joins_tags_and_keeps_raw_text() {
        let html = r#"
            <div class="question">
              <div class="question-q">Can I get it twice?
</div>
              <div class="question-a"><p>Yes, reinfection happens.</p></div>
              <div class="question-t"><span>Immunity</span><span>Reinfection</span></div>
            </div>
            <div class="question">
              <div class="question-q">Do masks work?</div>
              <div class="question-a">They help.</div>
              <div class="question-t"></div>
            </div>
        "#;
        let records = parse_page(html, URL, today()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].category, "Immunity;Reinfection");
        assert_eq!(records[0].question, "Can I get it twice?\n");
        assert_eq!(records[0].answer, "Yes, reinfection happens.");
        assert_eq!(records[1].category, "");
        assert!(records.iter().all(|r| r.source_url == URL && r.captured_date == today()));
    }

    #[test]
    fn test_misaligned_sequences_rejected() {
        let html = r#"
            <div class="question-q">Q1</div><div class="question-q">Q2</div>
            <div class="question-a">A1</div><div class="question-a">A2</div>
            <div class="question-t"><span>x</span></div>
        "#;
        let err = parse_page(html, URL, today()).unwrap_err();
        assert!(err.to_string().contains("2 questions, 2 answers, 1 tag containers"));
    }

    #[test]
    fn test_page_without_questions_is_mismatch() {
        let err = parse_page("<div class='redesigned'>FAQ</div>", URL, today()).unwrap_err();
        assert!(matches!(err, ScrapeError::StructuralMismatch { .. }));
    }
}
