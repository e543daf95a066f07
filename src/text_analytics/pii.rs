//! Personally identifiable information recognized in a document.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Errors raised when a PII entity violates its invariants.
#[derive(Debug, Error, PartialEq)]
pub enum PiiEntityError {
    /// The confidence score is not a finite value in `[0, 1]`.
    #[error("confidence score {0} is outside [0, 1]")]
    ScoreOutOfRange(f64),

    /// The span does not fit in the source document.
    #[error("span {offset}..{end} exceeds document length {document_length}")]
    SpanOutOfBounds {
        offset: usize,
        end: usize,
        document_length: usize,
    },
}

/// The category of a recognized entity.
///
/// The service may return categories newer than this crate, so any string is
/// accepted; the constants cover the common ones.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EntityCategory(Cow<'static, str>);

impl EntityCategory {
    pub const PERSON: EntityCategory = EntityCategory(Cow::Borrowed("Person"));
    pub const PERSON_TYPE: EntityCategory = EntityCategory(Cow::Borrowed("PersonType"));
    pub const PHONE_NUMBER: EntityCategory = EntityCategory(Cow::Borrowed("PhoneNumber"));
    pub const ORGANIZATION: EntityCategory = EntityCategory(Cow::Borrowed("Organization"));
    pub const ADDRESS: EntityCategory = EntityCategory(Cow::Borrowed("Address"));
    pub const EMAIL: EntityCategory = EntityCategory(Cow::Borrowed("Email"));
    pub const URL: EntityCategory = EntityCategory(Cow::Borrowed("URL"));
    pub const IP_ADDRESS: EntityCategory = EntityCategory(Cow::Borrowed("IPAddress"));
    pub const DATE_TIME: EntityCategory = EntityCategory(Cow::Borrowed("DateTime"));
    pub const QUANTITY: EntityCategory = EntityCategory(Cow::Borrowed("Quantity"));

    pub fn new(name: impl Into<String>) -> Self {
        EntityCategory(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityCategory {
    fn from(name: &str) -> Self {
        EntityCategory::new(name)
    }
}

/// The sub category of a recognized entity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EntitySubCategory(Cow<'static, str>);

impl EntitySubCategory {
    pub const AGE: EntitySubCategory = EntitySubCategory(Cow::Borrowed("Age"));
    pub const DATE: EntitySubCategory = EntitySubCategory(Cow::Borrowed("Date"));
    pub const NUMBER: EntitySubCategory = EntitySubCategory(Cow::Borrowed("Number"));
    pub const CURRENCY: EntitySubCategory = EntitySubCategory(Cow::Borrowed("Currency"));

    pub fn new(name: impl Into<String>) -> Self {
        EntitySubCategory(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntitySubCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntitySubCategory {
    fn from(name: &str) -> Self {
        EntitySubCategory::new(name)
    }
}

/// A word or phrase identified as personally identifiable information.
///
/// Offsets and lengths count Unicode scalar values in the analyzed document,
/// not bytes. Built once by the response parser and never modified.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PiiEntity {
    text: String,
    category: EntityCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub_category: Option<EntitySubCategory>,
    offset: usize,
    length: usize,
    score: f64,
}

impl PiiEntity {
    /// Creates an entity.
    ///
    /// # Errors
    ///
    /// Returns [`PiiEntityError::ScoreOutOfRange`] if `score` is not a finite
    /// value between 0 and 1 inclusive.
    pub fn new(
        text: impl Into<String>,
        category: EntityCategory,
        sub_category: Option<EntitySubCategory>,
        offset: usize,
        length: usize,
        score: f64,
    ) -> Result<Self, PiiEntityError> {
        if !(0.0..=1.0).contains(&score) {
            return Err(PiiEntityError::ScoreOutOfRange(score));
        }
        Ok(Self {
            text: text.into(),
            category,
            sub_category,
            offset,
            length,
            score,
        })
    }

    /// The entity text as it appears in the document.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn category(&self) -> &EntityCategory {
        &self.category
    }

    /// Absent when the service has no sub category for this entity.
    pub fn sub_category(&self) -> Option<&EntitySubCategory> {
        self.sub_category.as_ref()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Confidence between 0 and 1 that the text matches this entity.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Offset one past the last character of the span.
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.length)
    }

    /// Checks that the span fits inside `document`.
    pub fn validate_against(&self, document: &str) -> Result<(), PiiEntityError> {
        let document_length = document.chars().count();
        if self.end() > document_length {
            return Err(PiiEntityError::SpanOutOfBounds {
                offset: self.offset,
                end: self.end(),
                document_length,
            });
        }
        Ok(())
    }

    /// Returns the slice of `document` this entity covers, or `None` if the
    /// span does not fit.
    pub fn matched_text<'a>(&self, document: &'a str) -> Option<&'a str> {
        let mut boundaries = document
            .char_indices()
            .map(|(index, _)| index)
            .chain(std::iter::once(document.len()));

        let start = boundaries.nth(self.offset)?;
        let end = if self.length == 0 {
            start
        } else {
            boundaries.nth(self.length - 1)?
        };
        Some(&document[start..end])
    }
}
