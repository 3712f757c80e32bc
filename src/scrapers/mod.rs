//! FAQ scrapers, one submodule per site.
//!
//! | Site | Module | Pages | Category source | Text policy |
//! |------|--------|-------|-----------------|-------------|
//! | WHO Q&A hub | [`who`] | hub + one page per category | category link title | delete control whitespace |
//! | CDC FAQ | [`cdc::extract_faq_page`] | one page | `h2` heading by block index | space |
//! | coronavirus.gov | [`cdc::extract_topic_page`] | fixed topic list | page label | space |
//! | CNN interactive | [`cnn`] | one page | `;`-joined tag spans | raw |
//!
//! Each scraper follows the same pattern: an async `extract_*` that fetches a
//! page through a [`FetchPage`](crate::fetch::FetchPage) and a pure
//! `parse_*` that turns the HTML into records. Parsing is where structure
//! drift is handled: a block whose question and answer counts differ is
//! skipped and counted in [`Extraction::skipped`]; a page whose FAQ markup
//! is missing, or that cannot be paired at all, yields
//! [`ScrapeError::StructuralMismatch`].

pub mod cdc;
pub mod cnn;
pub mod who;

use crate::document::Node;
use crate::error::ScrapeError;
use crate::models::QaRecord;
use tracing::warn;
use url::Url;

/// Records extracted from one page.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Extraction {
    pub records: Vec<QaRecord>,
    /// Pairs or blocks dropped because of structural problems.
    pub skipped: usize,
}

/// Resolve `relative` against `root`.
pub fn resolve_url(root: &str, relative: &str) -> Result<String, ScrapeError> {
    let base = Url::parse(root).map_err(|source| ScrapeError::InvalidUrl {
        input: root.to_string(),
        source,
    })?;
    let joined = base.join(relative).map_err(|source| ScrapeError::InvalidUrl {
        input: relative.to_string(),
        source,
    })?;
    Ok(joined.to_string())
}

/// Pair questions with answers by shared index.
///
/// Different lengths mean the page changed shape; pairing anyway would
/// attach answers to the wrong questions.
pub(crate) fn pair_positionally<'a>(
    url: &str,
    questions: Vec<Node<'a>>,
    answers: Vec<Node<'a>>,
) -> Result<Vec<(Node<'a>, Node<'a>)>, ScrapeError> {
    if questions.len() != answers.len() {
        return Err(ScrapeError::mismatch(
            url,
            format!("{} questions but {} answers", questions.len(), answers.len()),
        ));
    }
    Ok(questions.into_iter().zip(answers).collect())
}

/// Id of the element a question toggles: `href="#id"`, `aria-controls` or `data-target`.
fn anchor_target<'a>(question: &Node<'a>) -> Option<&'a str> {
    if let Some(href) = question.attribute("href") {
        if let Some(id) = href.strip_prefix('#') {
            if !id.is_empty() {
                return Some(id);
            }
        }
    }
    question
        .attribute("aria-controls")
        .or_else(|| question.attribute("data-target").map(|t| t.trim_start_matches('#')))
        .filter(|id| !id.is_empty())
}

/// Pair each question with the answer whose `id` it points at.
///
/// Falls back to [`pair_positionally`] unless every question resolves to a
/// distinct answer.
pub(crate) fn pair_by_anchor<'a>(
    url: &str,
    questions: Vec<Node<'a>>,
    answers: Vec<Node<'a>>,
) -> Result<Vec<(Node<'a>, Node<'a>)>, ScrapeError> {
    let mut pairs = Vec::with_capacity(questions.len());
    let mut used = vec![false; answers.len()];

    for i in 0..questions.len() {
        let question = questions[i];
        let target = anchor_target(&question).and_then(|id| {
            answers
                .iter()
                .position(|a| a.attribute("id") == Some(id))
        });
        match target {
            Some(idx) if !used[idx] => {
                used[idx] = true;
                pairs.push((question, answers[idx]));
            }
            _ => return pair_positionally(url, questions, answers),
        }
    }

    if pairs.len() < answers.len() {
        warn!(
            %url,
            unmatched = answers.len() - pairs.len(),
            "Answers without a matching question"
        );
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn test_resolve_url() {
        assert_eq!(
            resolve_url("https://www.who.int/", "/faq/general").unwrap(),
            "https://www.who.int/faq/general"
        );
        assert_eq!(
            resolve_url("https://faq.coronavirus.gov/", "pets-animals").unwrap(),
            "https://faq.coronavirus.gov/pets-animals"
        );
        assert!(matches!(
            resolve_url("not a url", "x"),
            Err(ScrapeError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_pair_positionally_length_mismatch() {
        let doc = Document::parse("<p class='q'>1</p><p class='q'>2</p><p class='a'>x</p>");
        let err = pair_positionally(
            "https://example.com",
            doc.find_all_by_class("q"),
            doc.find_all_by_class("a"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("2 questions but 1 answers"));
    }

    #[test]
    fn test_pair_by_anchor_follows_ids() {
        let doc = Document::parse(
            r##"
            <a class="q" href="#a2">second</a>
            <a class="q" aria-controls="a1">first</a>
            <div class="a" id="a1">one</div>
            <div class="a" id="a2">two</div>
            "##,
        );
        let pairs = pair_by_anchor(
            "https://example.com",
            doc.find_all_by_class("q"),
            doc.find_all_by_class("a"),
        )
        .unwrap();
        let texts: Vec<(String, String)> =
            pairs.iter().map(|(q, a)| (q.text(), a.text())).collect();
        assert_eq!(
            texts,
            vec![
                ("second".to_string(), "two".to_string()),
                ("first".to_string(), "one".to_string()),
            ]
        );
    }

    #[test]
    fn test_pair_by_anchor_falls_back_to_index() {
        let doc = Document::parse(
            r#"
            <a class="q">first</a><a class="q">second</a>
            <div class="a">one</div><div class="a">two</div>
            "#,
        );
        let pairs = pair_by_anchor(
            "https://example.com",
            doc.find_all_by_class("q"),
            doc.find_all_by_class("a"),
        )
        .unwrap();
        assert_eq!(pairs[0].1.text(), "one");
        assert_eq!(pairs[1].1.text(), "two");
    }

    fn anchor_pairs(html: &str) -> Vec<(String, String)> {
        let doc = Document::parse(html);
        pair_by_anchor(
            "https://example.com",
            doc.find_all_by_class("q"),
            doc.find_all_by_class("a"),
        )
        .unwrap()
        .iter()
        .map(|(q, a)| (q.text(), a.text()))
        .collect()
    }

    #[test]
    fn test_pair_by_anchor_shared_target_falls_back_to_index() {
        let pairs = anchor_pairs(
            r##"
            <a class="q" href="#a1">first</a><a class="q" href="#a1">second</a>
            <div class="a" id="a1">one</div><div class="a" id="a2">two</div>
            "##,
        );
        assert_eq!(
            pairs,
            vec![
                ("first".to_string(), "one".to_string()),
                ("second".to_string(), "two".to_string()),
            ]
        );
    }

    #[test]
    fn test_pair_by_anchor_partly_resolved_falls_back_to_index() {
        let pairs = anchor_pairs(
            r##"
            <a class="q" href="#a2">first</a><a class="q">second</a>
            <div class="a" id="a1">one</div><div class="a" id="a2">two</div>
            "##,
        );
        assert_eq!(
            pairs,
            vec![
                ("first".to_string(), "one".to_string()),
                ("second".to_string(), "two".to_string()),
            ]
        );
    }
}
