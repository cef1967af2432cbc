//! Content workflow: repository seam, branch context and publish helpers.

pub mod context;
pub mod repository;
pub mod types;
pub mod workflow;

pub use context::{BranchContext, BranchScope};
pub use repository::ContentRepository;
pub use types::{
    Branch, Content, ContentEditor, CreateContentParams, CreateMediaParams, Data,
    DeleteContentParams, ModifyContentParams, PublishContentParams, PublishResult, WithId,
    content_data_with_id,
};
pub use workflow::{
    ContentWorkflow, CreateMediaFromAttachmentParams, DEFAULT_ATTACHMENT_ERROR, PUBLISH_SOURCE,
    PUBLISH_TARGET, apply_changes_to_data,
};
