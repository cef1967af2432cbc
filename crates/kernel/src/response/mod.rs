//! Response envelopes.
//!
//! A [`Response`] is what the host's dispatch layer writes to the wire. The
//! builders here are pure: same input, same envelope. Error envelopes live in
//! [`error`].

pub mod error;

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::response::IntoResponse;
use serde::{Serialize, Serializer};

pub use error::{ErrorBody, ErrorResponder, error_response, html_escape, render_error_page};

/// Content type of text bodies.
pub const HTML_CONTENT_TYPE: &str = "text/html";

/// Content type of structured bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Header carrying the total size of a paged collection.
pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

/// Response body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Body {
    #[default]
    None,
    Text(String),
    Json(serde_json::Value),
}

impl Body {
    /// Serialize any value into a structured body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Self> {
        serde_json::to_value(value).map(Body::Json)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Body::None)
    }

    /// `text/html` for text, `application/json` for anything else.
    pub fn content_type(&self) -> &'static str {
        match self {
            Body::Text(_) => HTML_CONTENT_TYPE,
            Body::None | Body::Json(_) => JSON_CONTENT_TYPE,
        }
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Text(s)
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Body::Text(s.to_string())
    }
}

impl From<serde_json::Value> for Body {
    fn from(v: serde_json::Value) -> Self {
        Body::Json(v)
    }
}

impl From<()> for Body {
    fn from(_: ()) -> Self {
        Body::None
    }
}

impl<T: Into<Body>> From<Option<T>> for Body {
    fn from(v: Option<T>) -> Self {
        v.map_or(Body::None, Into::into)
    }
}

/// Response envelope handed back to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    #[serde(serialize_with = "serialize_status")]
    pub status: StatusCode,
    #[serde(skip_serializing_if = "Body::is_none")]
    pub body: Body,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply_filters: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_process: Option<bool>,
}

fn serialize_status<S: Serializer>(status: &StatusCode, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u16(status.as_u16())
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            body: Body::None,
            content_type: None,
            headers: BTreeMap::new(),
            redirect: None,
            apply_filters: None,
            post_process: None,
        }
    }
}

impl Response {
    /// Copy of this envelope with `name` set to `value`; other headers kept.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Envelope with `status` (a code or a `&CmsError`) and `body`.
pub fn status(status: impl Into<StatusCode>, body: impl Into<Body>) -> Response {
    let body = body.into();
    Response {
        status: status.into(),
        content_type: Some(body.content_type().to_string()),
        body,
        ..Response::default()
    }
}

pub fn ok(body: impl Into<Body>) -> Response {
    status(StatusCode::OK, body)
}

pub fn created(body: impl Into<Body>) -> Response {
    status(StatusCode::CREATED, body)
}

/// 204 with an empty body and no content type.
pub fn no_content() -> Response {
    Response {
        status: StatusCode::NO_CONTENT,
        body: Body::Text(String::new()),
        ..Response::default()
    }
}

/// 303 to `target`, bypassing response filters and post-processing.
pub fn redirect(target: impl Into<String>) -> Response {
    Response {
        status: StatusCode::SEE_OTHER,
        body: Body::Text(String::new()),
        redirect: Some(target.into()),
        apply_filters: Some(false),
        post_process: Some(false),
        ..Response::default()
    }
}

pub fn bad_request(body: impl Into<Body>) -> Response {
    status(StatusCode::BAD_REQUEST, body)
}

pub fn unauthorized(body: impl Into<Body>) -> Response {
    status(StatusCode::UNAUTHORIZED, body)
}

pub fn forbidden(body: impl Into<Body>) -> Response {
    status(StatusCode::FORBIDDEN, body)
}

pub fn not_found(body: impl Into<Body>) -> Response {
    status(StatusCode::NOT_FOUND, body)
}

pub fn method_not_allowed(body: impl Into<Body>) -> Response {
    status(StatusCode::METHOD_NOT_ALLOWED, body)
}

pub fn internal_server_error(body: impl Into<Body>) -> Response {
    status(StatusCode::INTERNAL_SERVER_ERROR, body)
}

pub fn bad_gateway(body: impl Into<Body>) -> Response {
    status(StatusCode::BAD_GATEWAY, body)
}

/// Add `X-Total-Count: {total}` to `response`.
pub fn set_total(total: u64, response: Response) -> Response {
    response.with_header(TOTAL_COUNT_HEADER, total.to_string())
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        let mut builder = axum::http::Response::builder().status(self.status);

        if let Some(content_type) = &self.content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }
        if let Some(target) = &self.redirect {
            builder = builder.header(LOCATION, target);
        }

        let body = match self.body {
            Body::None => axum::body::Body::empty(),
            Body::Text(text) => axum::body::Body::from(text),
            Body::Json(value) => match serde_json::to_vec(&value) {
                Ok(bytes) => axum::body::Body::from(bytes),
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode response body");
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            },
        };

        match builder.body(body) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "invalid response envelope");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::{CmsError, ErrorKind};
    use serde_json::json;

    #[test]
    fn status_from_error_uses_table() {
        for kind in ErrorKind::ALL {
            let err = CmsError::new(kind, None);
            assert_eq!(status(&err, ()).status, kind.status());
        }
    }

    #[test]
    fn content_type_follows_body_shape() {
        assert_eq!(ok("<p>hi</p>").content_type.as_deref(), Some("text/html"));
        assert_eq!(
            ok(json!({"a": 1})).content_type.as_deref(),
            Some("application/json")
        );
        assert_eq!(ok(()).content_type.as_deref(), Some("application/json"));
    }

    #[test]
    fn fixed_status_builders() {
        assert_eq!(created(()).status, StatusCode::CREATED);
        assert_eq!(bad_request(()).status, StatusCode::BAD_REQUEST);
        assert_eq!(unauthorized(()).status, StatusCode::UNAUTHORIZED);
        assert_eq!(forbidden(()).status, StatusCode::FORBIDDEN);
        assert_eq!(not_found(()).status, StatusCode::NOT_FOUND);
        assert_eq!(method_not_allowed(()).status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            internal_server_error(()).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(bad_gateway(()).status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn no_content_has_empty_body_and_no_type() {
        let res = no_content();
        assert_eq!(res.status, StatusCode::NO_CONTENT);
        assert_eq!(res.body, Body::Text(String::new()));
        assert!(res.content_type.is_none());
    }

    #[test]
    fn redirect_disables_filters() {
        let res = redirect("/thanks");
        assert_eq!(res.status, StatusCode::SEE_OTHER);
        assert_eq!(res.redirect.as_deref(), Some("/thanks"));
        assert_eq!(res.apply_filters, Some(false));
        assert_eq!(res.post_process, Some(false));
    }

    #[test]
    fn set_total_keeps_existing_headers() {
        let res = ok(json!([])).with_header("Cache-Control", "no-store");
        let res = set_total(5, res);
        assert_eq!(res.headers.get("X-Total-Count").map(String::as_str), Some("5"));
        assert_eq!(
            res.headers.get("Cache-Control").map(String::as_str),
            Some("no-store")
        );
        assert_eq!(res.headers.len(), 2);
    }

    #[test]
    fn serializes_like_host_envelope() {
        let json = serde_json::to_value(redirect("/x")).unwrap();
        assert_eq!(
            json,
            json!({
                "status": 303,
                "body": "",
                "redirect": "/x",
                "applyFilters": false,
                "postProcess": false
            })
        );
    }
}
