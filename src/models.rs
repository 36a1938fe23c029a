// Core data structures for the sitewatch crawler

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::parser::{selectors, Page};
use crate::utils::error::ParseError;

/// Normalized absolute URL used as the identity key for dedup and storage
///
/// Only [`LinkClassifier::canonicalize`](crate::crawler::url::LinkClassifier::canonicalize)
/// produces one, so holding a `CanonicalUrl` means the string is already in
/// canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    pub(crate) fn from_canonical(url: String) -> Self {
        Self(url)
    }

    /// Borrow the URL as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the inner string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Content category of a page, decided from the shape of its canonical URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Careers detail page
    Job,
    /// Dated news article
    News,
    /// Dated press release
    Press,
    /// Media gallery item
    Image,
    /// Anything else; crawled for links but never recorded
    None,
}

impl Category {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Job => "job",
            Self::News => "news",
            Self::Press => "press",
            Self::Image => "image",
            Self::None => "none",
        }
    }

    /// Noun used in outbound notifications
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Job => "job",
            Self::News => "article",
            Self::Press => "press release",
            Self::Image => "image",
            Self::None => "link",
        }
    }

    /// Whether pages of this category are recorded and announced
    pub fn is_reportable(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Extract the page title using this category's markup
    ///
    /// # Errors
    ///
    /// Returns `ParseError::FieldNotFound` when the element is missing or
    /// empty; callers treat that as an absent title.
    pub fn extract_title(&self, page: &Page) -> Result<String, ParseError> {
        let selector = match self {
            Self::Job => &*selectors::JOB_TITLE,
            Self::News | Self::Press => &*selectors::ARTICLE_TITLE,
            Self::Image => &*selectors::ASSET_TITLE,
            Self::None => return Err(ParseError::FieldNotFound("title")),
        };

        page.find_field(selector)
            .ok_or(ParseError::FieldNotFound("title"))
    }

    /// Get all categories
    pub fn all() -> [Self; 5] {
        [Self::Job, Self::News, Self::Press, Self::Image, Self::None]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fetched page that matched a category
#[derive(Debug, Clone, Serialize)]
pub struct LinkRecord {
    pub url: CanonicalUrl,
    pub category: Category,
    pub title: Option<String>,
    pub snapshot: Option<String>,
}

/// A row of the persistent link store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRecord {
    pub id: i64,
    pub canonical_url: String,
    pub snapshot: Option<String>,
}
