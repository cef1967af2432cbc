//! Stagehand: helpers over a content platform's scripting surface.
//!
//! - [`content`]: draft-then-publish create/modify/delete, media uploads.
//! - [`response`]: response envelopes keyed to the [`error`] taxonomy.
//! - [`validation`]: validation failures to localized field messages.

pub mod config;
pub mod content;
pub mod error;
pub mod form;
pub mod i18n;
pub mod response;
pub mod theme;
pub mod validation;

pub use config::Config;
pub use error::{CmsError, CmsResult, ErrorKind, FieldErrors};
