//! Failure taxonomy and service error translation.
//!
//! Operations raise [`ClientError`] values. The translator turns the ones it
//! recognizes into an [`EventHubsError`] carrying a [`FailureReason`] and the
//! resource name, and passes everything else through unchanged.

pub mod classification;
pub mod client;
pub mod translator;

// Re-export main types for convenient access
pub use classification::{EventHubsError, FailureReason};
pub use client::ClientError;
pub use translator::{
    translate_service_error, try_translate_service_error, ConditionTable,
    ServiceErrorTranslator, TranslationError,
};
