//! Content records and repository parameter types.

use std::fmt;
use std::str::FromStr;

use axum::body::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{CmsError, CmsResult};

/// Content data payload: field name to value.
pub type Data = serde_json::Map<String, serde_json::Value>;

/// Repository branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    /// Working copy, not visible to end consumers.
    Draft,
    /// Published copy.
    Master,
}

impl Branch {
    pub fn as_str(self) -> &'static str {
        match self {
            Branch::Draft => "draft",
            Branch::Master => "master",
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Branch {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(Branch::Draft),
            "master" => Ok(Branch::Master),
            other => anyhow::bail!("unknown branch: {other}"),
        }
    }
}

/// A content item as returned by the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_name")]
    pub name: String,
    #[serde(rename = "_path")]
    pub path: String,
    #[serde(rename = "displayName", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub data: Data,
}

impl Content {
    /// Decode the data payload into `T`.
    pub fn data_as<T: DeserializeOwned>(&self) -> CmsResult<T> {
        serde_json::from_value(serde_json::Value::Object(self.data.clone())).map_err(|e| {
            CmsError::internal(format!("content {} has unexpected data: {e}", self.id))
        })
    }

    /// Decode the data payload and pair it with the content id.
    pub fn with_id<T: DeserializeOwned>(&self) -> CmsResult<WithId<T>> {
        Ok(WithId {
            id: self.id.clone(),
            data: self.data_as()?,
        })
    }
}

/// Decoded content data flattened together with its `_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithId<T> {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub data: T,
}

/// Decode a content item's data together with its id.
pub fn content_data_with_id<T: DeserializeOwned>(content: &Content) -> CmsResult<WithId<T>> {
    content.with_id()
}

/// Parameters for creating a content item.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateContentParams {
    pub name: Option<String>,
    pub parent_path: String,
    pub display_name: Option<String>,
    pub content_type: String,
    pub data: Data,
    pub require_valid: bool,
}

impl CreateContentParams {
    pub fn new(parent_path: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            name: None,
            parent_path: parent_path.into(),
            display_name: None,
            content_type: content_type.into(),
            data: Data::new(),
            require_valid: true,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn data(mut self, data: Data) -> Self {
        self.data = data;
        self
    }
}

/// Editor applied to the stored content during a modify.
pub type ContentEditor = Box<dyn FnOnce(Content) -> Content + Send>;

/// Parameters for modifying a content item.
pub struct ModifyContentParams {
    /// Content id or path.
    pub key: String,
    pub editor: ContentEditor,
    pub require_valid: bool,
}

impl fmt::Debug for ModifyContentParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModifyContentParams")
            .field("key", &self.key)
            .field("require_valid", &self.require_valid)
            .finish_non_exhaustive()
    }
}

/// Parameters for deleting a content item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteContentParams {
    /// Content id or path.
    pub key: String,
}

impl DeleteContentParams {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Parameters for publishing content between branches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishContentParams {
    pub keys: Vec<String>,
    pub source_branch: Branch,
    pub target_branch: Branch,
}

/// Outcome reported by the repository for a publish.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResult {
    pub pushed_contents: Vec<String>,
    pub deleted_contents: Vec<String>,
    pub failed_contents: Vec<String>,
}

/// Parameters for storing a binary as media content.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateMediaParams {
    pub parent_path: String,
    pub name: String,
    pub mime_type: Option<String>,
    pub data: Bytes,
}
