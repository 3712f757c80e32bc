//! Site and fetch configuration.
//!
//! Every URL and page list the extractors visit lives in [`SitesConfig`].
//! The built-in defaults point at the live FAQ pages; a YAML file with the
//! same shape can override any part of it:
//!
//! ```yaml
//! who:
//!   root_url: https://www.who.int/
//!   hub_url: https://www.who.int/emergencies/diseases/novel-coronavirus-2019/question-and-answers-hub/
//! cdc_topics:
//!   root_url: https://faq.coronavirus.gov/
//!   pages:
//!     - slug: pets-animals
//!     - slug: travel
//!       label: Travel Advice
//! ```

use crate::error::ScrapeError;
use crate::utils::title_case_slug;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

const CDC_TOPIC_SLUGS: [&str; 18] = [
    "spread-transmission",
    "covid-19-facts",
    "food-drug-safety",
    "symptoms-and-testing",
    "treatments-vaccines-immunity",
    "protect-yourself",
    "cleaning-disinfecting-sanitizing",
    "pets-animals",
    "caring-for-children",
    "pregnancy",
    "underlying-conditions",
    "activities-events-gatherings",
    "workplace-safety",
    "travel",
    "financial-help",
    "food-housing-education-assistance",
    "school-meals",
    "support-for-business",
];

/// HTTP settings shared by every request of a run.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    /// Extra attempts after the first one, for transient failures only.
    pub max_retries: usize,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Base wait between retries.
    pub retry_delay: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_retries: 2,
            timeout: Duration::from_secs(30),
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// URLs and page lists for every supported site.
#[derive(Debug, Clone, PartialEq)]
pub struct SitesConfig {
    pub who: WhoSite,
    pub cdc_faq: SinglePage,
    pub cdc_topics: TopicSite,
    pub cnn: SinglePage,
}

/// WHO question-and-answers hub.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WhoSite {
    /// Base that category paths are resolved against.
    pub root_url: String,
    /// Page listing the categories.
    pub hub_url: String,
}

impl Default for WhoSite {
    fn default() -> Self {
        Self {
            root_url: "https://www.who.int/".to_string(),
            hub_url: "https://www.who.int/emergencies/diseases/novel-coronavirus-2019/question-and-answers-hub/"
                .to_string(),
        }
    }
}

/// A site scraped from one fixed page.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SinglePage {
    pub page_url: String,
}

/// A site scraped from a fixed list of topic pages under one root.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TopicSite {
    pub root_url: String,
    pub pages: Vec<TopicPage>,
}

impl Default for TopicSite {
    fn default() -> Self {
        Self {
            root_url: "https://faq.coronavirus.gov/".to_string(),
            pages: CDC_TOPIC_SLUGS
                .iter()
                .map(|slug| TopicPage {
                    slug: slug.to_string(),
                    label: None,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TopicPage {
    pub slug: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl TopicPage {
    /// Configured label, or the slug title-cased (`pets-animals` -> `Pets Animals`).
    pub fn label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => title_case_slug(&self.slug),
        }
    }
}

impl SitesConfig {
    /// Built-in defaults pointing at the live pages.
    pub fn builtin() -> Self {
        Self {
            who: WhoSite::default(),
            cdc_faq: SinglePage {
                page_url: "https://www.cdc.gov/coronavirus/2019-ncov/faq.html".to_string(),
            },
            cdc_topics: TopicSite::default(),
            cnn: SinglePage {
                page_url: "https://edition.cnn.com/interactive/2020/health/coronavirus-questions-answers/"
                    .to_string(),
            },
        }
    }

    /// Parse a YAML document. Sections absent from the document keep their built-in values.
    pub fn from_yaml(yaml: &str) -> Result<Self, ScrapeError> {
        let overrides: SitesOverrides =
            serde_yaml::from_str(yaml).map_err(|e| ScrapeError::Config(e.to_string()))?;
        let mut config = Self::builtin();
        if let Some(who) = overrides.who {
            config.who = who;
        }
        if let Some(cdc_faq) = overrides.cdc_faq {
            config.cdc_faq = cdc_faq;
        }
        if let Some(cdc_topics) = overrides.cdc_topics {
            config.cdc_topics = cdc_topics;
        }
        if let Some(cnn) = overrides.cnn {
            config.cnn = cnn;
        }
        Ok(config)
    }

    /// Load overrides from a YAML file.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ScrapeError> {
        let yaml = tokio::fs::read_to_string(path.as_ref()).await?;
        let config = Self::from_yaml(&yaml)?;
        info!(
            topic_pages = config.cdc_topics.pages.len(),
            "Loaded sites configuration"
        );
        Ok(config)
    }
}

impl Default for SitesConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Debug, Deserialize)]
struct SitesOverrides {
    who: Option<WhoSite>,
    cdc_faq: Option<SinglePage>,
    cdc_topics: Option<TopicSite>,
    cnn: Option<SinglePage>,
}
