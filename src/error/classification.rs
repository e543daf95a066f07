//! Classified failure types surfaced to callers.
//!
//! Every failure the translator recognizes becomes an [`EventHubsError`]
//! tagged with a [`FailureReason`]. Callers branch on the reason to decide
//! whether to retry an operation or report it.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ClientError;

/// Why an Event Hubs operation failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// A failure with no more specific classification.
    GeneralError,
    /// The client was closed while the operation was in flight.
    ClientClosed,
    /// A receiver with a higher owner level took over the partition.
    ConsumerDisconnected,
    /// The Event Hub, consumer group or partition does not exist.
    ResourceNotFound,
    /// The event or batch exceeds the maximum size allowed.
    MessageSizeExceeded,
    /// A namespace or entity quota has been reached.
    QuotaExceeded,
    /// The service is throttling requests.
    ServiceBusy,
    /// The service did not respond in time.
    ServiceTimeout,
    /// The connection or link to the service failed.
    ServiceCommunicationProblem,
    /// A producer with a higher epoch took over the partition.
    ProducerDisconnected,
    /// The client was used in a state that does not allow the operation.
    InvalidClientState,
}

impl FailureReason {
    /// Returns true if failures with this reason may resolve on retry.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            FailureReason::ServiceBusy
                | FailureReason::ServiceTimeout
                | FailureReason::ServiceCommunicationProblem
        )
    }

    /// Returns the stable snake_case name of this reason.
    pub fn as_str(self) -> &'static str {
        match self {
            FailureReason::GeneralError => "general_error",
            FailureReason::ClientClosed => "client_closed",
            FailureReason::ConsumerDisconnected => "consumer_disconnected",
            FailureReason::ResourceNotFound => "resource_not_found",
            FailureReason::MessageSizeExceeded => "message_size_exceeded",
            FailureReason::QuotaExceeded => "quota_exceeded",
            FailureReason::ServiceBusy => "service_busy",
            FailureReason::ServiceTimeout => "service_timeout",
            FailureReason::ServiceCommunicationProblem => "service_communication_problem",
            FailureReason::ProducerDisconnected => "producer_disconnected",
            FailureReason::InvalidClientState => "invalid_client_state",
        }
    }

    /// Message used when the underlying failure did not describe itself.
    pub fn default_message(self) -> &'static str {
        match self {
            FailureReason::GeneralError => "An error occurred while communicating with the service.",
            FailureReason::ClientClosed => "The client has been closed.",
            FailureReason::ConsumerDisconnected => {
                "The consumer was disconnected by another consumer with a higher owner level."
            }
            FailureReason::ResourceNotFound => "The requested resource could not be found.",
            FailureReason::MessageSizeExceeded => "The message exceeds the maximum size allowed.",
            FailureReason::QuotaExceeded => "A quota for the namespace or entity was exceeded.",
            FailureReason::ServiceBusy => {
                "The service is busy and unable to process the request; please retry the operation."
            }
            FailureReason::ServiceTimeout => {
                "The operation did not complete within the allotted time."
            }
            FailureReason::ServiceCommunicationProblem => {
                "The connection to the service was interrupted."
            }
            FailureReason::ProducerDisconnected => {
                "The producer was disconnected by another producer with a higher epoch."
            }
            FailureReason::InvalidClientState => {
                "The client is not in a state that allows the requested operation."
            }
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure classified by reason and tied to the resource it occurred on.
#[derive(Clone, Debug, Error)]
#[error("{}", display_message(.message, .resource_name))]
pub struct EventHubsError {
    reason: FailureReason,
    is_transient: bool,
    resource_name: Option<String>,
    message: String,
    #[source]
    source: Option<Arc<ClientError>>,
}

fn display_message(message: &str, resource_name: &Option<String>) -> String {
    match resource_name {
        Some(name) => format!("{message} ({name})"),
        None => message.to_string(),
    }
}

impl EventHubsError {
    /// Creates a classified error. Transience follows from the reason.
    pub fn new(
        reason: FailureReason,
        resource_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            reason,
            is_transient: reason.is_transient(),
            resource_name: Some(resource_name.into()),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a [`FailureReason::GeneralError`] with explicit transience.
    pub fn general(is_transient: bool, message: impl Into<String>) -> Self {
        Self {
            reason: FailureReason::GeneralError,
            is_transient,
            resource_name: None,
            message: message.into(),
            source: None,
        }
    }

    /// Sets the resource the failure occurred on.
    pub fn with_resource_name(mut self, resource_name: impl Into<String>) -> Self {
        self.resource_name = Some(resource_name.into());
        self
    }

    /// Wraps the failure this error was classified from.
    pub fn with_source(mut self, source: Arc<ClientError>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn reason(&self) -> FailureReason {
        self.reason
    }

    pub fn is_transient(&self) -> bool {
        self.is_transient
    }

    pub fn resource_name(&self) -> Option<&str> {
        self.resource_name.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The original failure, when this error was produced by translation.
    pub fn inner(&self) -> Option<&Arc<ClientError>> {
        self.source.as_ref()
    }
}
