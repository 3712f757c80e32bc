//! Data models for extracted FAQ content.
//!
//! - [`QaRecord`]: one question/answer pair, the unit written to the CSV files
//! - [`Category`]: a WHO topic page discovered on the hub page

use chrono::NaiveDate;

/// Column order of every QA pairs file.
pub const QA_FIELDS: [&str; 5] = ["date", "url", "category", "question", "answer"];

/// Column order of the WHO category listing.
pub const CATEGORY_FIELDS: [&str; 2] = ["url", "category"];

/// Date format written to the `date` column.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// A question/answer pair extracted from an FAQ page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaRecord {
    /// Day the extraction ran (not the page's publish date).
    pub captured_date: NaiveDate,
    /// Page the pair was read from.
    pub source_url: String,
    pub category: String,
    pub question: String,
    pub answer: String,
}

impl QaRecord {
    /// Fields in [`QA_FIELDS`] order, date rendered as `DD/MM/YYYY`.
    pub fn to_row(&self) -> [String; 5] {
        [
            self.captured_date.format(DATE_FORMAT).to_string(),
            self.source_url.clone(),
            self.category.clone(),
            self.question.clone(),
            self.answer.clone(),
        ]
    }
}

/// A WHO category: relative path on the WHO site plus its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub path: String,
    pub name: String,
}

impl Category {
    pub fn to_row(&self) -> [String; 2] {
        [self.path.clone(), self.name.clone()]
    }
}
