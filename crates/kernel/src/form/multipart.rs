//! Multipart form access.

use axum::body::Bytes;
use axum::extract::Multipart;
use tracing::{debug, warn};

use crate::error::{CmsError, CmsResult};

/// Metadata of one multipart field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartItem {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
}

/// Read access to a submitted multipart form.
///
/// Several fields may share a name; `index` picks among them in submission
/// order and defaults to the first.
pub trait MultipartForm: Send + Sync {
    /// Metadata of the named field.
    fn item(&self, name: &str, index: Option<usize>) -> Option<MultipartItem>;

    /// Raw bytes of the named field.
    fn bytes(&self, name: &str, index: Option<usize>) -> Option<Bytes>;
}

/// One buffered field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub item: MultipartItem,
    pub data: Bytes,
}

/// A fully buffered multipart form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormParts {
    parts: Vec<FormPart>,
}

impl FormParts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain an axum multipart extractor into memory.
    ///
    /// A malformed body is reported as a bad request.
    pub async fn from_multipart(mut multipart: Multipart) -> CmsResult<Self> {
        let mut form = Self::new();

        loop {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "failed to read multipart field");
                    return Err(CmsError::BadRequest {
                        cause: Some(e.body_text()),
                        errors: Default::default(),
                    });
                }
            };

            let name = field.name().unwrap_or("").to_string();
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);

            let data = field.bytes().await.map_err(|e| {
                warn!(error = %e, field = %name, "failed to read multipart data");
                CmsError::BadRequest {
                    cause: Some(e.body_text()),
                    errors: Default::default(),
                }
            })?;

            form = form.push(name, file_name, content_type, data);
        }

        debug!(fields = form.parts.len(), "multipart form buffered");
        Ok(form)
    }

    /// Append a field.
    pub fn push(
        mut self,
        name: impl Into<String>,
        file_name: Option<String>,
        content_type: Option<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        self.parts.push(FormPart {
            item: MultipartItem {
                name: name.into(),
                file_name,
                content_type,
                size: data.len(),
            },
            data,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    fn find(&self, name: &str, index: Option<usize>) -> Option<&FormPart> {
        self.parts
            .iter()
            .filter(|p| p.item.name == name)
            .nth(index.unwrap_or(0))
    }
}

impl MultipartForm for FormParts {
    fn item(&self, name: &str, index: Option<usize>) -> Option<MultipartItem> {
        self.find(name, index).map(|p| p.item.clone())
    }

    fn bytes(&self, name: &str, index: Option<usize>) -> Option<Bytes> {
        self.find(name, index).map(|p| p.data.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn form() -> FormParts {
        FormParts::new()
            .push("title", None, None, "Holiday")
            .push(
                "photo",
                Some("beach.jpg".into()),
                Some("image/jpeg".into()),
                vec![1u8, 2, 3],
            )
            .push(
                "photo",
                Some("sunset.png".into()),
                Some("image/png".into()),
                vec![4u8, 5],
            )
    }

    #[test]
    fn defaults_to_first_field() {
        let item = form().item("photo", None).unwrap();
        assert_eq!(item.file_name.as_deref(), Some("beach.jpg"));
        assert_eq!(item.size, 3);
    }

    #[test]
    fn index_selects_among_same_name() {
        let form = form();
        let item = form.item("photo", Some(1)).unwrap();
        assert_eq!(item.content_type.as_deref(), Some("image/png"));
        assert_eq!(form.bytes("photo", Some(1)).unwrap().as_ref(), &[4u8, 5]);
        assert!(form.item("photo", Some(2)).is_none());
    }

    #[test]
    fn missing_field_is_none() {
        assert!(form().bytes("avatar", None).is_none());
    }
}
