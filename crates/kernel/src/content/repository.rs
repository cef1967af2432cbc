//! Content repository trait.

use async_trait::async_trait;

use super::context::BranchContext;
use super::types::{
    Content, CreateContentParams, CreateMediaParams, DeleteContentParams, ModifyContentParams,
    PublishContentParams, PublishResult,
};
use crate::error::CmsResult;

/// Content platform operations.
///
/// Everything except [`publish`](ContentRepository::publish) acts on the
/// branch `ctx` currently points at. Publish names its branches explicitly.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Load a content item by id or path.
    async fn get(&self, ctx: &BranchContext, key: &str) -> CmsResult<Option<Content>>;

    /// Create a content item.
    async fn create(&self, ctx: &BranchContext, params: CreateContentParams) -> CmsResult<Content>;

    /// Apply `params.editor` to a stored item and save the result.
    async fn modify(&self, ctx: &BranchContext, params: ModifyContentParams) -> CmsResult<Content>;

    /// Delete a content item.
    async fn remove(&self, ctx: &BranchContext, params: DeleteContentParams) -> CmsResult<()>;

    /// Copy the current state of `params.keys` from source to target.
    async fn publish(&self, params: PublishContentParams) -> CmsResult<PublishResult>;

    /// Store a binary as a media content item.
    async fn create_media(
        &self,
        ctx: &BranchContext,
        params: CreateMediaParams,
    ) -> CmsResult<Content>;
}
