//! Validation failures to localized field messages.
//!
//! Each failure is looked up through a fixed cascade of message keys, most
//! specific first; the first key with a translation wins. The cascade order
//! is user-visible and must not change.

use serde::Serialize;
use tracing::debug;
use validator::Validate;

use super::failure::ValidationFailure;
use crate::error::{CmsError, CmsResult, FieldErrors};
use crate::i18n::{LocalizeParams, Localizer, localize_first};

/// Prefix used when the caller supplies none.
pub const DEFAULT_PREFIX: &str = "errors";

/// Message used when neither a translation nor a validator message exists.
pub const FALLBACK_MESSAGE: &str = "Invalid value";

/// A localized message for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetail {
    pub key: String,
    pub message: String,
}

impl ErrorDetail {
    /// Group details by key, keeping message order.
    pub fn into_field_errors(details: impl IntoIterator<Item = ErrorDetail>) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for detail in details {
            errors.entry(detail.key).or_default().push(detail.message);
        }
        errors
    }
}

impl CmsError {
    /// Bad request carrying `details` as field errors.
    pub fn from_details(details: impl IntoIterator<Item = ErrorDetail>) -> Self {
        CmsError::bad_request(ErrorDetail::into_field_errors(details))
    }
}

/// Candidate message keys for a failure at `path`, in lookup order.
pub fn message_keys(path: &str, value_is_empty: bool, prefix: &str) -> Vec<String> {
    let mut keys = vec![
        format!("{prefix}.bad-request-error.{path}"),
        format!("{prefix}.400.{path}"),
        format!("{prefix}.{path}"),
    ];

    if value_is_empty {
        keys.push("errors.bad-request-error.defaultEmpty".to_string());
        keys.push("errors.400.defaultEmpty".to_string());
    }

    keys.extend([
        format!("{prefix}.bad-request-error"),
        format!("{prefix}.400"),
        "errors.bad-request-error.default".to_string(),
        "errors.400.default".to_string(),
    ]);

    keys
}

/// Options for an [`ErrorDetailReporter`].
#[derive(Debug, Clone, Default)]
pub struct ReporterParams {
    /// Message key prefix; defaults to [`DEFAULT_PREFIX`].
    pub i18n_prefix: Option<String>,
    /// Forwarded to every lookup.
    pub localize: LocalizeParams,
}

/// Turns validation failures into [`ErrorDetail`]s.
pub struct ErrorDetailReporter<'a> {
    localizer: &'a dyn Localizer,
    params: ReporterParams,
}

impl<'a> ErrorDetailReporter<'a> {
    pub fn new(localizer: &'a dyn Localizer) -> Self {
        Self::with_params(localizer, ReporterParams::default())
    }

    pub fn with_params(localizer: &'a dyn Localizer, params: ReporterParams) -> Self {
        Self { localizer, params }
    }

    fn prefix(&self) -> &str {
        self.params.i18n_prefix.as_deref().unwrap_or(DEFAULT_PREFIX)
    }

    /// Details for a validation result; empty when validation passed.
    pub fn report<T>(&self, result: Result<T, Vec<ValidationFailure>>) -> Vec<ErrorDetail> {
        match result {
            Ok(_) => Vec::new(),
            Err(failures) => failures.iter().map(|f| self.detail(f)).collect(),
        }
    }

    /// Detail for a single failure.
    pub fn detail(&self, failure: &ValidationFailure) -> ErrorDetail {
        let key = failure.path();
        let candidates = message_keys(&key, failure.is_value_empty(), self.prefix());

        let message = localize_first(self.localizer, &candidates, &self.params.localize)
            .or_else(|| failure.message.clone())
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());

        debug!(key = %key, "validation failure reported");
        ErrorDetail { key, message }
    }

    /// Validate `value`, turning any failures into a localized bad request.
    pub fn validate<T: Validate>(&self, value: &T) -> CmsResult<()> {
        let result = value
            .validate()
            .map_err(|errors| ValidationFailure::from_validator(&errors));
        let details = self.report(result);
        if details.is_empty() {
            Ok(())
        } else {
            Err(CmsError::from_details(details))
        }
    }
}

impl std::fmt::Debug for ErrorDetailReporter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorDetailReporter")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
