//! Draft-then-publish content workflow.
//!
//! Each operation mutates draft and then publishes the touched key to
//! master. Steps run strictly in order and
//! the first failure is returned as-is. A publish failure does not undo the
//! draft mutation that preceded it.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::context::BranchContext;
use super::repository::ContentRepository;
use super::types::{
    Branch, Content, CreateContentParams, CreateMediaParams, Data, DeleteContentParams,
    ModifyContentParams, PublishContentParams, PublishResult,
};
use crate::error::{CmsError, CmsResult};
use crate::form::MultipartForm;

/// Message used when an attachment is rejected and the caller gave none.
pub const DEFAULT_ATTACHMENT_ERROR: &str = "A file is required";

/// Branch every workflow mutation runs against.
pub const PUBLISH_SOURCE: Branch = Branch::Draft;

/// Branch every workflow publishes into.
pub const PUBLISH_TARGET: Branch = Branch::Master;

/// Parameters for [`ContentWorkflow::create_media_from_attachment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMediaFromAttachmentParams {
    /// Name of the form field.
    pub name: String,
    /// Where the media is stored.
    pub parent_path: String,
    /// Which field to use when several share `name`.
    pub index: Option<usize>,
    /// Message reported against `name` when no usable file was submitted.
    pub error_message: Option<String>,
}

impl CreateMediaFromAttachmentParams {
    pub fn new(name: impl Into<String>, parent_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_path: parent_path.into(),
            index: None,
            error_message: None,
        }
    }

    pub fn index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    fn rejected(&self) -> CmsError {
        let message = self
            .error_message
            .clone()
            .unwrap_or_else(|| DEFAULT_ATTACHMENT_ERROR.to_string());
        CmsError::field(self.name.clone(), message)
    }
}

/// Build modify params that shallowly merge `changes` into the stored data.
///
/// Fields absent from `changes` are kept. A field present in `changes`
/// replaces the stored value outright, nested objects included.
pub fn apply_changes_to_data(key: impl Into<String>, changes: Data) -> ModifyContentParams {
    ModifyContentParams {
        key: key.into(),
        editor: Box::new(move |mut content: Content| {
            content.data.extend(changes);
            content
        }),
        require_valid: true,
    }
}

/// Content mutations that publish as they go.
#[derive(Clone)]
pub struct ContentWorkflow {
    inner: Arc<ContentWorkflowInner>,
}

struct ContentWorkflowInner {
    repository: Arc<dyn ContentRepository>,
}

impl ContentWorkflow {
    pub fn new(repository: Arc<dyn ContentRepository>) -> Self {
        Self {
            inner: Arc::new(ContentWorkflowInner { repository }),
        }
    }

    /// Publish `keys` from draft to master.
    ///
    /// Any entry in `failed_contents` turns the whole call into a publish
    /// error. Repositories may report failures by resolved id rather than
    /// by the key that was requested, so entries are not matched against
    /// `keys`.
    pub async fn publish_keys(&self, keys: Vec<String>) -> CmsResult<PublishResult> {
        let result = self
            .inner
            .repository
            .publish(PublishContentParams {
                keys,
                source_branch: PUBLISH_SOURCE,
                target_branch: PUBLISH_TARGET,
            })
            .await?;

        if !result.failed_contents.is_empty() {
            warn!(
                keys = ?result.failed_contents,
                from = %PUBLISH_SOURCE,
                to = %PUBLISH_TARGET,
                "publish rejected"
            );
            return Err(CmsError::publish(format!(
                "failed to publish {} from {PUBLISH_SOURCE} to {PUBLISH_TARGET}",
                result.failed_contents.join(", ")
            )));
        }

        info!(
            pushed = result.pushed_contents.len(),
            deleted = result.deleted_contents.len(),
            from = %PUBLISH_SOURCE,
            to = %PUBLISH_TARGET,
            "content published"
        );
        Ok(result)
    }

    /// Publish a content item and hand it back.
    pub async fn publish_from_draft_to_master(&self, content: Content) -> CmsResult<Content> {
        self.publish_keys(vec![content.id.clone()]).await?;
        Ok(content)
    }

    /// Publish `key` and hand back `value` untouched.
    pub async fn publish_content_by_key<A>(&self, key: &str, value: A) -> CmsResult<A> {
        self.publish_keys(vec![key.to_string()]).await?;
        Ok(value)
    }

    /// Create an item in draft and publish it.
    pub async fn create_and_publish(
        &self,
        ctx: &BranchContext,
        params: CreateContentParams,
    ) -> CmsResult<Content> {
        let draft = ctx.pinned(PUBLISH_SOURCE);
        let content = self.inner.repository.create(&draft, params).await?;
        debug!(id = %content.id, path = %content.path, "content created");

        self.publish_from_draft_to_master(content).await
    }

    /// Merge `changes` into the stored data of `key`, then publish.
    pub async fn modify_and_publish(
        &self,
        ctx: &BranchContext,
        key: &str,
        changes: Data,
    ) -> CmsResult<Content> {
        let draft = ctx.pinned(PUBLISH_SOURCE);
        let params = apply_changes_to_data(key, changes);
        let content = self.inner.repository.modify(&draft, params).await?;
        debug!(id = %content.id, "content modified");

        self.publish_from_draft_to_master(content).await
    }

    /// Delete `params.key` from draft and publish the deletion.
    pub async fn delete_and_publish(
        &self,
        ctx: &BranchContext,
        params: DeleteContentParams,
    ) -> CmsResult<()> {
        let draft = ctx.pinned(PUBLISH_SOURCE);
        let key = params.key.clone();
        self.inner.repository.remove(&draft, params).await?;
        debug!(key = %key, "content deleted");

        self.publish_content_by_key(&key, ()).await
    }

    /// Store an uploaded file as media content.
    ///
    /// The field must exist and carry a non-empty file name; otherwise the
    /// result is a bad request keyed by the field name.
    pub async fn create_media_from_attachment(
        &self,
        ctx: &BranchContext,
        form: &dyn MultipartForm,
        params: CreateMediaFromAttachmentParams,
    ) -> CmsResult<Content> {
        let item = form.item(&params.name, params.index);
        let data = form.bytes(&params.name, params.index);

        let (Some(item), Some(data)) = (item, data) else {
            warn!(field = %params.name, "attachment field missing");
            return Err(params.rejected());
        };

        let Some(file_name) = item.file_name.filter(|n| !n.is_empty()) else {
            warn!(field = %params.name, "attachment has no file name");
            return Err(params.rejected());
        };

        let media = CreateMediaParams {
            parent_path: params.parent_path,
            name: file_name,
            mime_type: item.content_type,
            data,
        };

        let draft = ctx.pinned(PUBLISH_SOURCE);
        let content = self.inner.repository.create_media(&draft, media).await?;
        info!(id = %content.id, path = %content.path, "media stored");
        Ok(content)
    }
}

impl std::fmt::Debug for ContentWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentWorkflow").finish_non_exhaustive()
    }
}
