//! Translation of raw client failures into classified service errors.
//!
//! Transport code catches heterogeneous failures; callers need a small,
//! stable vocabulary to drive retry decisions. The translator recognizes the
//! failures it can classify and hands everything else back untouched so no
//! diagnostic detail is lost.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use super::{ClientError, EventHubsError, FailureReason};
use crate::amqp::{AmqpCondition, AmqpError};

/// Errors raised by the translator itself.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranslationError {
    /// A required argument was absent.
    #[error("argument `{0}` must not be absent")]
    InvalidArgument(&'static str),
}

/// Maps AMQP conditions onto failure reasons.
///
/// Overrides are consulted first, then the built-in table on
/// [`AmqpCondition::failure_reason`].
#[derive(Clone, Debug, Default)]
pub struct ConditionTable {
    overrides: HashMap<AmqpCondition, FailureReason>,
}

impl ConditionTable {
    /// Creates a table with only the built-in mappings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table with additional condition mappings.
    pub fn with_overrides<I, C>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (C, FailureReason)>,
        C: Into<AmqpCondition>,
    {
        Self {
            overrides: overrides
                .into_iter()
                .map(|(condition, reason)| (condition.into(), reason))
                .collect(),
        }
    }

    /// Adds or replaces the mapping for one condition.
    pub fn add_override(&mut self, condition: impl Into<AmqpCondition>, reason: FailureReason) {
        self.overrides.insert(condition.into(), reason);
    }

    /// Returns the number of overrides configured.
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }

    /// Looks up the reason for a condition.
    pub fn reason_for(&self, condition: &AmqpCondition) -> Option<FailureReason> {
        self.overrides
            .get(condition)
            .copied()
            .or_else(|| condition.failure_reason())
    }

    /// Lists every condition the table knows about with its reason, built-in
    /// conditions first, then overrides for unknown symbols sorted by symbol.
    pub fn entries(&self) -> Vec<(AmqpCondition, Option<FailureReason>)> {
        let mut entries: Vec<_> = AmqpCondition::KNOWN
            .iter()
            .map(|condition| (condition.clone(), self.reason_for(condition)))
            .collect();

        let mut extra: Vec<_> = self
            .overrides
            .iter()
            .filter(|(condition, _)| !condition.is_known())
            .map(|(condition, reason)| (condition.clone(), Some(*reason)))
            .collect();
        extra.sort_by(|a, b| a.0.symbol().cmp(b.0.symbol()));

        entries.extend(extra);
        entries
    }
}

/// Classifies client failures using a [`ConditionTable`].
///
/// The translator holds no mutable state and can be shared freely across
/// threads.
#[derive(Clone, Debug, Default)]
pub struct ServiceErrorTranslator {
    conditions: ConditionTable,
}

impl ServiceErrorTranslator {
    /// Creates a translator with the built-in condition table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a translator with a custom condition table.
    pub fn with_conditions(conditions: ConditionTable) -> Self {
        Self { conditions }
    }

    /// Returns the condition table in use.
    pub fn conditions(&self) -> &ConditionTable {
        &self.conditions
    }

    /// Translates a failure raised while operating on `resource_name`.
    ///
    /// Rules, first match wins:
    /// 1. A transport error whose condition maps to a reason becomes an
    ///    [`EventHubsError`] with that reason, wrapping the original.
    /// 2. A cancellation without a cause becomes a
    ///    [`FailureReason::ServiceTimeout`].
    /// 3. A cancellation with a cause yields the translation of that cause.
    ///    Only one level is unwrapped.
    /// 4. Anything else is returned as-is, as the same `Arc`.
    pub fn translate(&self, error: &Arc<ClientError>, resource_name: &str) -> Arc<ClientError> {
        self.translate_inner(error, resource_name, true)
    }

    /// Like [`translate`](Self::translate), but fails when no error is given.
    ///
    /// # Errors
    ///
    /// Returns [`TranslationError::InvalidArgument`] if `error` is `None`.
    pub fn try_translate(
        &self,
        error: Option<&Arc<ClientError>>,
        resource_name: &str,
    ) -> Result<Arc<ClientError>, TranslationError> {
        let error = error.ok_or(TranslationError::InvalidArgument("error"))?;
        Ok(self.translate(error, resource_name))
    }

    fn translate_inner(
        &self,
        error: &Arc<ClientError>,
        resource_name: &str,
        unwrap_cancellation: bool,
    ) -> Arc<ClientError> {
        match &**error {
            ClientError::Amqp(amqp) => match self.conditions.reason_for(amqp.condition()) {
                Some(reason) => {
                    tracing::debug!(
                        resource = resource_name,
                        condition = %amqp.condition(),
                        %reason,
                        "translated transport failure"
                    );
                    classified(reason, resource_name, amqp_message(amqp, reason), error)
                }
                None => {
                    tracing::trace!(
                        resource = resource_name,
                        condition = %amqp.condition(),
                        "transport condition has no reason, passing through"
                    );
                    Arc::clone(error)
                }
            },
            ClientError::OperationCanceled { cause: None, message } if unwrap_cancellation => {
                tracing::debug!(
                    resource = resource_name,
                    "treating unexplained cancellation as a service timeout"
                );
                classified(
                    FailureReason::ServiceTimeout,
                    resource_name,
                    message.clone(),
                    error,
                )
            }
            ClientError::OperationCanceled {
                cause: Some(cause), ..
            } if unwrap_cancellation => {
                tracing::trace!(
                    resource = resource_name,
                    cause = cause.kind(),
                    "unwrapping cancellation cause"
                );
                self.translate_inner(cause, resource_name, false)
            }
            _ => {
                tracing::trace!(
                    resource = resource_name,
                    kind = error.kind(),
                    "failure not translated"
                );
                Arc::clone(error)
            }
        }
    }
}

fn amqp_message(amqp: &AmqpError, reason: FailureReason) -> String {
    if amqp.description().is_empty() {
        reason.default_message().to_string()
    } else {
        amqp.description().to_string()
    }
}

fn classified(
    reason: FailureReason,
    resource_name: &str,
    message: String,
    source: &Arc<ClientError>,
) -> Arc<ClientError> {
    Arc::new(ClientError::EventHubs(
        EventHubsError::new(reason, resource_name, message).with_source(Arc::clone(source)),
    ))
}

/// Translates a failure using the built-in condition table.
///
/// See [`ServiceErrorTranslator::translate`] for the rules applied.
pub fn translate_service_error(error: &Arc<ClientError>, resource_name: &str) -> Arc<ClientError> {
    ServiceErrorTranslator::new().translate(error, resource_name)
}

/// Translates a possibly absent failure using the built-in condition table.
///
/// # Errors
///
/// Returns [`TranslationError::InvalidArgument`] if `error` is `None`.
pub fn try_translate_service_error(
    error: Option<&Arc<ClientError>>,
    resource_name: &str,
) -> Result<Arc<ClientError>, TranslationError> {
    ServiceErrorTranslator::new().try_translate(error, resource_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn busy() -> Arc<ClientError> {
        Arc::new(ClientError::from(AmqpError::new(
            AmqpCondition::ServerBusy,
            "",
        )))
    }

    fn reason_of(error: &ClientError) -> Option<FailureReason> {
        error.as_event_hubs().map(|e| e.reason())
    }

    // ==================== ConditionTable Tests ====================

    #[test]
    fn test_table_uses_builtin_mapping() {
        let table = ConditionTable::new();
        assert_eq!(
            table.reason_for(&AmqpCondition::ServerBusy),
            Some(FailureReason::ServiceBusy)
        );
        assert_eq!(table.reason_for(&AmqpCondition::UnauthorizedAccess), None);
        assert_eq!(table.override_count(), 0);
    }

    #[test]
    fn test_override_takes_priority() {
        let mut table = ConditionTable::new();
        table.add_override(AmqpCondition::InternalError, FailureReason::GeneralError);
        table.add_override("vendor:throttled", FailureReason::ServiceBusy);

        assert_eq!(
            table.reason_for(&AmqpCondition::InternalError),
            Some(FailureReason::GeneralError)
        );
        assert_eq!(
            table.reason_for(&AmqpCondition::from_symbol("vendor:throttled")),
            Some(FailureReason::ServiceBusy)
        );
        assert_eq!(table.override_count(), 2);
    }

    #[test]
    fn test_entries_list_builtins_then_unknown_overrides() {
        let table = ConditionTable::with_overrides([
            ("z:custom", FailureReason::QuotaExceeded),
            ("a:custom", FailureReason::ServiceBusy),
            ("amqp:not-found", FailureReason::GeneralError),
        ]);
        let entries = table.entries();

        assert_eq!(entries.len(), AmqpCondition::KNOWN.len() + 2);
        assert_eq!(entries[0].0, AmqpCondition::ServerBusy);

        let not_found = entries
            .iter()
            .find(|(c, _)| *c == AmqpCondition::NotFound)
            .unwrap();
        assert_eq!(not_found.1, Some(FailureReason::GeneralError));

        let tail: Vec<&str> = entries[AmqpCondition::KNOWN.len()..]
            .iter()
            .map(|(c, _)| c.symbol())
            .collect();
        assert_eq!(tail, vec!["a:custom", "z:custom"]);
    }

    // ==================== Translation Tests ====================

    #[test]
    fn test_busy_transport_error_is_service_busy() {
        let error = busy();
        let translated = translate_service_error(&error, "hub1");

        let classified = translated.as_event_hubs().expect("should be classified");
        assert_eq!(classified.reason(), FailureReason::ServiceBusy);
        assert_eq!(classified.resource_name(), Some("hub1"));
        assert!(classified.is_transient());
        assert!(Arc::ptr_eq(classified.inner().unwrap(), &error));
    }

    #[test]
    fn test_empty_description_uses_default_message() {
        let translated = translate_service_error(&busy(), "hub1");
        assert_eq!(
            translated.as_event_hubs().unwrap().message(),
            FailureReason::ServiceBusy.default_message()
        );
    }

    #[test]
    fn test_description_is_kept_as_message() {
        let error = Arc::new(ClientError::from(AmqpError::new(
            AmqpCondition::NotFound,
            "entity 'x' not found",
        )));
        let translated = translate_service_error(&error, "x");
        let classified = translated.as_event_hubs().unwrap();
        assert_eq!(classified.reason(), FailureReason::ResourceNotFound);
        assert_eq!(classified.message(), "entity 'x' not found");
        assert!(!classified.is_transient());
    }

    #[test]
    fn test_unmapped_condition_passes_through() {
        let error = Arc::new(ClientError::from(AmqpError::new(
            AmqpCondition::UnauthorizedAccess,
            "denied",
        )));
        let translated = translate_service_error(&error, "hub1");
        assert!(Arc::ptr_eq(&translated, &error));
    }

    #[test]
    fn test_bare_cancellation_is_service_timeout() {
        let error = Arc::new(ClientError::canceled());
        let translated = translate_service_error(&error, "hub1");

        let classified = translated.as_event_hubs().unwrap();
        assert_eq!(classified.reason(), FailureReason::ServiceTimeout);
        assert_eq!(classified.resource_name(), Some("hub1"));
        assert_eq!(classified.message(), "The operation was canceled.");
    }

    #[test]
    fn test_cancellation_of_busy_is_service_busy() {
        let error = Arc::new(ClientError::canceled_by("oops", busy()));
        let translated = translate_service_error(&error, "hub1");
        assert_eq!(reason_of(&translated), Some(FailureReason::ServiceBusy));
    }

    #[test]
    fn test_cancellation_of_general_returns_cause() {
        let cause = Arc::new(ClientError::invalid_argument("x", "bad"));
        let error = Arc::new(ClientError::canceled_by("oops", Arc::clone(&cause)));
        let translated = translate_service_error(&error, "hub1");
        assert!(Arc::ptr_eq(&translated, &cause));
    }

    #[test]
    fn test_only_one_cancellation_level_is_unwrapped() {
        let nested = Arc::new(ClientError::canceled_by("inner", busy()));
        let error = Arc::new(ClientError::canceled_by("outer", Arc::clone(&nested)));
        let translated = translate_service_error(&error, "hub1");
        assert!(Arc::ptr_eq(&translated, &nested));

        let bare = Arc::new(ClientError::canceled());
        let error = Arc::new(ClientError::canceled_by("outer", Arc::clone(&bare)));
        let translated = translate_service_error(&error, "hub1");
        assert!(Arc::ptr_eq(&translated, &bare));
    }

    #[test]
    fn test_overridden_condition_is_translated() {
        let translator = ServiceErrorTranslator::with_conditions(ConditionTable::with_overrides([(
            "vendor:throttled",
            FailureReason::ServiceBusy,
        )]));
        let error = Arc::new(ClientError::from(AmqpError::new("vendor:throttled", "")));

        let translated = translator.translate(&error, "hub1");
        assert_eq!(reason_of(&translated), Some(FailureReason::ServiceBusy));

        // The default translator has no mapping for it.
        let untouched = translate_service_error(&error, "hub1");
        assert!(Arc::ptr_eq(&untouched, &error));
    }

    #[test]
    fn test_try_translate_rejects_missing_error() {
        assert_eq!(
            try_translate_service_error(None, "dummy").unwrap_err(),
            TranslationError::InvalidArgument("error")
        );
    }

    #[test]
    fn test_try_translate_delegates() {
        let error = Arc::new(ClientError::timeout());
        let translated = try_translate_service_error(Some(&error), "hub1").unwrap();
        assert!(Arc::ptr_eq(&translated, &error));
    }
}
