//! The set of failures a client operation can raise.

use std::sync::Arc;

use thiserror::Error;

use super::EventHubsError;
use crate::amqp::AmqpError;

/// Any failure raised while performing a service operation.
///
/// Failures travel as `Arc<ClientError>` so that the translator can hand back
/// the very value it was given when it has nothing to add.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A protocol-level failure reported by the AMQP transport.
    #[error(transparent)]
    Amqp(#[from] AmqpError),

    /// The operation was cancelled, possibly because of another failure.
    #[error("{message}")]
    OperationCanceled {
        message: String,
        #[source]
        cause: Option<Arc<ClientError>>,
    },

    /// A task backing the operation was cancelled.
    #[error("{message}")]
    TaskCanceled { message: String },

    /// An already classified failure.
    #[error(transparent)]
    EventHubs(#[from] EventHubsError),

    /// The caller supplied an invalid argument.
    #[error("invalid argument `{parameter}`: {message}")]
    InvalidArgument { parameter: String, message: String },

    /// A client-side timeout elapsed.
    #[error("{message}")]
    Timeout { message: String },

    /// Anything else.
    #[error("{message}")]
    Other { message: String },
}

impl ClientError {
    /// A cancellation that carries no explanation.
    pub fn canceled() -> Self {
        ClientError::OperationCanceled {
            message: "The operation was canceled.".to_string(),
            cause: None,
        }
    }

    /// A cancellation caused by another failure.
    pub fn canceled_by(message: impl Into<String>, cause: Arc<ClientError>) -> Self {
        ClientError::OperationCanceled {
            message: message.into(),
            cause: Some(cause),
        }
    }

    pub fn task_canceled() -> Self {
        ClientError::TaskCanceled {
            message: "A task was canceled.".to_string(),
        }
    }

    pub fn invalid_argument(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        ClientError::InvalidArgument {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    pub fn timeout() -> Self {
        ClientError::Timeout {
            message: "The operation has timed out.".to_string(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        ClientError::Other {
            message: message.into(),
        }
    }

    /// Returns the classified form of this failure, if it has one.
    pub fn as_event_hubs(&self) -> Option<&EventHubsError> {
        match self {
            ClientError::EventHubs(error) => Some(error),
            _ => None,
        }
    }

    /// Returns the transport failure, if this is one.
    pub fn as_amqp(&self) -> Option<&AmqpError> {
        match self {
            ClientError::Amqp(error) => Some(error),
            _ => None,
        }
    }

    /// Short tag naming the variant, used in logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::Amqp(_) => "amqp",
            ClientError::OperationCanceled { .. } => "operation_canceled",
            ClientError::TaskCanceled { .. } => "task_canceled",
            ClientError::EventHubs(_) => "event_hubs",
            ClientError::InvalidArgument { .. } => "invalid_argument",
            ClientError::Timeout { .. } => "timeout",
            ClientError::Other { .. } => "other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amqp::AmqpCondition;
    use crate::error::FailureReason;
    use std::error::Error as _;

    #[test]
    fn test_client_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClientError>();
        assert_send_sync::<Arc<ClientError>>();
    }

    #[test]
    fn test_canceled_by_exposes_cause() {
        let cause = Arc::new(ClientError::timeout());
        let error = ClientError::canceled_by("oops", Arc::clone(&cause));

        assert_eq!(error.to_string(), "oops");
        let source = error.source().expect("cause should be the source");
        assert_eq!(source.to_string(), "The operation has timed out.");
    }

    #[test]
    fn test_bare_cancellation_has_no_source() {
        assert!(ClientError::canceled().source().is_none());
    }

    #[test]
    fn test_accessors_match_variants() {
        let amqp = ClientError::from(AmqpError::new(AmqpCondition::ServerBusy, "busy"));
        assert!(amqp.as_amqp().is_some());
        assert!(amqp.as_event_hubs().is_none());
        assert_eq!(amqp.kind(), "amqp");

        let classified = ClientError::from(EventHubsError::new(
            FailureReason::QuotaExceeded,
            "hub1",
            "quota",
        ));
        assert_eq!(
            classified.as_event_hubs().map(|e| e.reason()),
            Some(FailureReason::QuotaExceeded)
        );
        assert_eq!(classified.kind(), "event_hubs");
    }

    #[test]
    fn test_invalid_argument_display() {
        let error = ClientError::invalid_argument("blah", "value cannot be null");
        assert_eq!(
            error.to_string(),
            "invalid argument `blah`: value cannot be null"
        );
    }
}
