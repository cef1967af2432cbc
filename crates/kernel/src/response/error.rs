//! Error envelopes: localized JSON bodies and rendered error pages.

use std::sync::Arc;

use serde::Serialize;
use tracing::error;

use super::{Body, Response, status};
use crate::config::Config;
use crate::error::{CmsError, FieldErrors};
use crate::i18n::{LocalizeParams, Localizer};
use crate::theme::{TemplateRenderer, render_model};

/// JSON body of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ErrorBody {
    /// Build the body for `err`.
    ///
    /// `message` is the translation of `{i18n_prefix}.{ErrorKey}`, or that
    /// key itself. `cause` is only exposed with `debug` and never for bad
    /// requests. `errors` is only present for bad requests.
    pub fn new(
        err: &CmsError,
        localizer: &(impl Localizer + ?Sized),
        i18n_prefix: &str,
        debug: bool,
        params: &LocalizeParams,
    ) -> Self {
        let key = format!("{}.{}", i18n_prefix, err.kind().key());
        let message = localizer.localize(&key, params).unwrap_or(key);

        let cause = if debug && !err.is_bad_request() {
            err.cause().map(str::to_string)
        } else {
            None
        };

        Self {
            message,
            cause,
            errors: err.field_errors().cloned(),
        }
    }
}

/// JSON error envelope for `err`, with the status from the error table.
pub fn error_response(
    err: &CmsError,
    localizer: &(impl Localizer + ?Sized),
    i18n_prefix: &str,
    debug: bool,
) -> Response {
    let body = ErrorBody::new(err, localizer, i18n_prefix, debug, &LocalizeParams::default());
    json_error(err, &body)
}

fn json_error(err: &CmsError, body: &ErrorBody) -> Response {
    match Body::json(body) {
        Ok(body) => status(err, body),
        Err(e) => {
            error!(error = %e, "failed to encode error body");
            status(err, Body::None)
        }
    }
}

/// HTML error envelope: `view` rendered with the error as its model.
///
/// A render failure is logged and replaced by a minimal page; the status
/// still comes from the error.
pub fn render_error_page(
    err: &CmsError,
    renderer: &(impl TemplateRenderer + ?Sized),
    view: &str,
) -> Response {
    match render_model(renderer, view, &err.to_model()) {
        Ok(html) => status(err, html),
        Err(e) => {
            error!(error = %e, view = %view, "failed to render error page");
            let code = err.status();
            status(
                err,
                format!(
                    r#"<!DOCTYPE html>
<html><head><title>Error</title></head>
<body><h1>{}</h1><p>{}</p></body></html>"#,
                    code.as_u16(),
                    html_escape(code.canonical_reason().unwrap_or("Error"))
                ),
            )
        }
    }
}

/// Error responses with a fixed localizer, key prefix and debug setting.
#[derive(Clone)]
pub struct ErrorResponder {
    localizer: Arc<dyn Localizer>,
    i18n_prefix: String,
    debug: bool,
}

impl ErrorResponder {
    pub fn new(localizer: Arc<dyn Localizer>, i18n_prefix: impl Into<String>, debug: bool) -> Self {
        Self {
            localizer,
            i18n_prefix: i18n_prefix.into(),
            debug,
        }
    }

    pub fn from_config(localizer: Arc<dyn Localizer>, config: &Config) -> Self {
        Self::new(localizer, config.i18n_prefix.clone(), config.debug_errors)
    }

    pub fn respond(&self, err: &CmsError) -> Response {
        self.respond_with(err, &LocalizeParams::default())
    }

    /// Like [`respond`](Self::respond), localizing with `params`.
    pub fn respond_with(&self, err: &CmsError, params: &LocalizeParams) -> Response {
        let body = ErrorBody::new(
            err,
            self.localizer.as_ref(),
            &self.i18n_prefix,
            self.debug,
            params,
        );
        json_error(err, &body)
    }
}

impl std::fmt::Debug for ErrorResponder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorResponder")
            .field("i18n_prefix", &self.i18n_prefix)
            .field("debug", &self.debug)
            .finish()
    }
}

/// HTML-escape a string for safe output.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
