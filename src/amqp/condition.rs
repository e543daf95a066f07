//! AMQP condition codes raised by the Event Hubs service.
//!
//! The transport layer reports failures as an AMQP `error` frame carrying a
//! symbolic condition. This module names the conditions the client knows
//! about and maps each one onto a [`FailureReason`].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FailureReason;

/// A symbolic AMQP error condition.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AmqpCondition {
    /// The service is throttling requests.
    ServerBusy,
    /// The service did not complete the operation in time.
    Timeout,
    /// The addressed entity does not exist.
    NotFound,
    /// The addressed entity exists but is disabled.
    EntityDisabled,
    /// A namespace or entity quota has been reached.
    ResourceLimitExceeded,
    /// The message exceeds the maximum size allowed by the link.
    MessageSizeExceeded,
    /// Another receiver with a higher owner level took over the link.
    LinkStolen,
    /// Another producer with a higher epoch took over the partition.
    ProducerEpochStolen,
    /// Internal service error.
    InternalError,
    /// The service closed the connection.
    ConnectionForced,
    /// The service detached the link.
    DetachForced,
    /// The credentials were rejected.
    UnauthorizedAccess,
    /// The service rejected an argument of the request.
    ArgumentError,
    /// An argument of the request was outside the accepted range.
    ArgumentOutOfRange,
    /// A condition the client does not recognize, kept verbatim.
    Other(String),
}

impl AmqpCondition {
    /// Every well-known condition, in table order.
    pub const KNOWN: [AmqpCondition; 14] = [
        AmqpCondition::ServerBusy,
        AmqpCondition::Timeout,
        AmqpCondition::NotFound,
        AmqpCondition::EntityDisabled,
        AmqpCondition::ResourceLimitExceeded,
        AmqpCondition::MessageSizeExceeded,
        AmqpCondition::LinkStolen,
        AmqpCondition::ProducerEpochStolen,
        AmqpCondition::InternalError,
        AmqpCondition::ConnectionForced,
        AmqpCondition::DetachForced,
        AmqpCondition::UnauthorizedAccess,
        AmqpCondition::ArgumentError,
        AmqpCondition::ArgumentOutOfRange,
    ];

    /// Parses a condition from its wire symbol. Unknown symbols are kept
    /// as [`AmqpCondition::Other`].
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol {
            "com.microsoft:server-busy" => AmqpCondition::ServerBusy,
            "com.microsoft:timeout" => AmqpCondition::Timeout,
            "amqp:not-found" => AmqpCondition::NotFound,
            "com.microsoft:entity-disabled" => AmqpCondition::EntityDisabled,
            "amqp:resource-limit-exceeded" => AmqpCondition::ResourceLimitExceeded,
            "amqp:link:message-size-exceeded" => AmqpCondition::MessageSizeExceeded,
            "amqp:link:stolen" => AmqpCondition::LinkStolen,
            "com.microsoft:producer-epoch-stolen" => AmqpCondition::ProducerEpochStolen,
            "amqp:internal-error" => AmqpCondition::InternalError,
            "amqp:connection:forced" => AmqpCondition::ConnectionForced,
            "amqp:link:detach-forced" => AmqpCondition::DetachForced,
            "amqp:unauthorized-access" => AmqpCondition::UnauthorizedAccess,
            "com.microsoft:argument-error" => AmqpCondition::ArgumentError,
            "com.microsoft:argument-out-of-range" => AmqpCondition::ArgumentOutOfRange,
            other => AmqpCondition::Other(other.to_string()),
        }
    }

    /// Returns the wire symbol for this condition.
    pub fn symbol(&self) -> &str {
        match self {
            AmqpCondition::ServerBusy => "com.microsoft:server-busy",
            AmqpCondition::Timeout => "com.microsoft:timeout",
            AmqpCondition::NotFound => "amqp:not-found",
            AmqpCondition::EntityDisabled => "com.microsoft:entity-disabled",
            AmqpCondition::ResourceLimitExceeded => "amqp:resource-limit-exceeded",
            AmqpCondition::MessageSizeExceeded => "amqp:link:message-size-exceeded",
            AmqpCondition::LinkStolen => "amqp:link:stolen",
            AmqpCondition::ProducerEpochStolen => "com.microsoft:producer-epoch-stolen",
            AmqpCondition::InternalError => "amqp:internal-error",
            AmqpCondition::ConnectionForced => "amqp:connection:forced",
            AmqpCondition::DetachForced => "amqp:link:detach-forced",
            AmqpCondition::UnauthorizedAccess => "amqp:unauthorized-access",
            AmqpCondition::ArgumentError => "com.microsoft:argument-error",
            AmqpCondition::ArgumentOutOfRange => "com.microsoft:argument-out-of-range",
            AmqpCondition::Other(symbol) => symbol,
        }
    }

    /// Returns the failure reason this condition classifies as, if any.
    ///
    /// Authorization and argument conditions have no reason; they describe
    /// caller mistakes rather than service state and are surfaced untouched.
    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            AmqpCondition::ServerBusy => Some(FailureReason::ServiceBusy),
            AmqpCondition::Timeout => Some(FailureReason::ServiceTimeout),
            AmqpCondition::NotFound | AmqpCondition::EntityDisabled => {
                Some(FailureReason::ResourceNotFound)
            }
            AmqpCondition::ResourceLimitExceeded => Some(FailureReason::QuotaExceeded),
            AmqpCondition::MessageSizeExceeded => Some(FailureReason::MessageSizeExceeded),
            AmqpCondition::LinkStolen => Some(FailureReason::ConsumerDisconnected),
            AmqpCondition::ProducerEpochStolen => Some(FailureReason::ProducerDisconnected),
            AmqpCondition::InternalError
            | AmqpCondition::ConnectionForced
            | AmqpCondition::DetachForced => Some(FailureReason::ServiceCommunicationProblem),
            AmqpCondition::UnauthorizedAccess
            | AmqpCondition::ArgumentError
            | AmqpCondition::ArgumentOutOfRange
            | AmqpCondition::Other(_) => None,
        }
    }

    /// Returns true if this condition is one the client recognizes.
    pub fn is_known(&self) -> bool {
        !matches!(self, AmqpCondition::Other(_))
    }
}

impl fmt::Display for AmqpCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl From<&str> for AmqpCondition {
    fn from(symbol: &str) -> Self {
        AmqpCondition::from_symbol(symbol)
    }
}

impl Serialize for AmqpCondition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol())
    }
}

impl<'de> Deserialize<'de> for AmqpCondition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let symbol = String::deserialize(deserializer)?;
        Ok(AmqpCondition::from_symbol(&symbol))
    }
}
