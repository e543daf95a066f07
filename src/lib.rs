//! hubwire - service error translation for AMQP event-streaming clients
//!
//! Transport code raises [`error::ClientError`] values; [`error::translate_service_error`]
//! turns the ones it recognizes into classified [`error::EventHubsError`]s that callers
//! can branch on. The [`text_analytics`] module holds result types returned by the
//! text analytics client.

pub mod amqp;
pub mod config;
pub mod error;
pub mod logging;
pub mod text_analytics;

pub use error::{
    translate_service_error, try_translate_service_error, ClientError, EventHubsError,
    FailureReason,
};
