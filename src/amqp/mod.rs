//! AMQP transport failures.
//!
//! The connection layer raises an [`AmqpError`] whenever the service answers
//! with an AMQP `error` frame. The condition it carries is what the
//! translator in [`crate::error`] uses to classify the failure.

pub mod condition;

pub use condition::AmqpCondition;

use thiserror::Error;

/// A protocol-level failure reported by the AMQP transport.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("amqp error {condition}: {description}")]
pub struct AmqpError {
    condition: AmqpCondition,
    description: String,
    resource_name: Option<String>,
}

impl AmqpError {
    /// Creates a transport error for the given condition.
    pub fn new(condition: impl Into<AmqpCondition>, description: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            description: description.into(),
            resource_name: None,
        }
    }

    /// Attaches the name of the entity the failing link was addressing.
    pub fn with_resource_name(mut self, resource_name: impl Into<String>) -> Self {
        self.resource_name = Some(resource_name.into());
        self
    }

    pub fn condition(&self) -> &AmqpCondition {
        &self.condition
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn resource_name(&self) -> Option<&str> {
        self.resource_name.as_deref()
    }
}

impl From<AmqpCondition> for AmqpError {
    fn from(condition: AmqpCondition) -> Self {
        AmqpError::new(condition, String::new())
    }
}
