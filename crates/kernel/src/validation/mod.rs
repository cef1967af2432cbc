//! Validation failure reporting with localized messages.

pub mod failure;
pub mod reporter;

pub use failure::{ContextEntry, ValidationFailure};
pub use reporter::{
    DEFAULT_PREFIX, ErrorDetail, ErrorDetailReporter, FALLBACK_MESSAGE, ReporterParams,
    message_keys,
};
