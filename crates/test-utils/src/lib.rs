//! Stagehand test utilities.
//!
//! Helpers for integration testing: an in-memory two-branch content
//! repository, fixture builders, and assertion utilities.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use stagehand_kernel::content::{
    Branch, BranchContext, Content, ContentRepository, CreateContentParams, CreateMediaParams,
    Data, DeleteContentParams, ModifyContentParams, PublishContentParams, PublishResult,
};
use stagehand_kernel::form::FormParts;
use stagehand_kernel::i18n::{DEFAULT_BUNDLE, MessageBundles};
use stagehand_kernel::{CmsError, CmsResult};

/// Create a test content item with default values.
pub fn test_content(content_type: &str, name: &str) -> TestContent {
    TestContent {
        id: Uuid::now_v7().to_string(),
        name: name.to_string(),
        parent_path: String::new(),
        display_name: None,
        content_type: content_type.to_string(),
        data: Data::new(),
    }
}

/// A content builder for creating test fixtures.
#[derive(Debug, Clone)]
pub struct TestContent {
    pub id: String,
    pub name: String,
    pub parent_path: String,
    pub display_name: Option<String>,
    pub content_type: String,
    pub data: Data,
}

impl TestContent {
    /// Set a custom ID.
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    /// Place under a parent path.
    pub fn under(mut self, parent_path: &str) -> Self {
        self.parent_path = parent_path.trim_end_matches('/').to_string();
        self
    }

    /// Set the display name.
    pub fn with_display_name(mut self, display_name: &str) -> Self {
        self.display_name = Some(display_name.to_string());
        self
    }

    /// Replace the data payload. Non-object values are ignored.
    pub fn with_data(mut self, data: JsonValue) -> Self {
        if let JsonValue::Object(map) = data {
            self.data = map;
        }
        self
    }

    /// Add a single field.
    pub fn with_field(mut self, name: &str, value: JsonValue) -> Self {
        self.data.insert(name.to_string(), value);
        self
    }

    pub fn build(self) -> Content {
        Content {
            path: format!("{}/{}", self.parent_path, self.name),
            id: self.id,
            name: self.name,
            display_name: self.display_name,
            content_type: self.content_type,
            data: self.data,
        }
    }
}

/// Build a JSON object payload, panicking on non-objects.
pub fn data(value: JsonValue) -> Data {
    match value {
        JsonValue::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Message bundles holding `pairs` in the default bundle and locale.
pub fn messages(pairs: &[(&str, &str)]) -> MessageBundles {
    let bundles = MessageBundles::new();
    for (key, message) in pairs {
        bundles.insert(DEFAULT_BUNDLE, None, key, *message);
    }
    bundles
}

/// A form with a single file field.
pub fn upload_form(
    field: &str,
    file_name: Option<&str>,
    content_type: Option<&str>,
    bytes: &[u8],
) -> FormParts {
    FormParts::new().push(
        field,
        file_name.map(str::to_string),
        content_type.map(str::to_string),
        bytes.to_vec(),
    )
}

/// Repository operation, for failure injection and call recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Get,
    Create,
    Modify,
    Remove,
    Publish,
    CreateMedia,
}

/// A recorded repository call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: Operation,
    /// Branch the context pointed at; `None` for publish.
    pub branch: Option<Branch>,
    pub keys: Vec<String>,
}

#[derive(Default)]
struct RepoState {
    branches: HashMap<Branch, BTreeMap<String, Content>>,
    media: HashMap<String, Vec<u8>>,
    failures: HashMap<Operation, CmsError>,
    unpublishable: Vec<String>,
    calls: Vec<Call>,
}

impl RepoState {
    fn branch(&mut self, branch: Branch) -> &mut BTreeMap<String, Content> {
        self.branches.entry(branch).or_default()
    }

    fn resolve(&self, branch: Branch, key: &str) -> Option<String> {
        let items = self.branches.get(&branch)?;
        if items.contains_key(key) {
            return Some(key.to_string());
        }
        items
            .values()
            .find(|c| c.path == key)
            .map(|c| c.id.clone())
    }

    fn record(&mut self, op: Operation, branch: Option<Branch>, keys: Vec<String>) {
        self.calls.push(Call { op, branch, keys });
    }

    fn take_failure(&mut self, op: Operation) -> CmsResult<()> {
        match self.failures.remove(&op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn insert_new(&mut self, branch: Branch, content: Content) -> CmsResult<Content> {
        if self.resolve(branch, &content.path).is_some() {
            return Err(CmsError::BadRequest {
                cause: Some(format!("content already exists at {}", content.path)),
                errors: Default::default(),
            });
        }
        self.branch(branch)
            .insert(content.id.clone(), content.clone());
        Ok(content)
    }
}

/// In-memory content repository with draft and master branches.
///
/// Operations act on the branch the request context points at; publish
/// copies (or deletes) by id between branches. Failures can be injected per
/// operation and fire once.
#[derive(Default)]
pub struct InMemoryRepository {
    state: Mutex<RepoState>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `content` directly in `branch`.
    pub fn seed(&self, branch: Branch, content: Content) {
        self.state
            .lock()
            .branch(branch)
            .insert(content.id.clone(), content);
    }

    /// Look up an item by id or path, bypassing any injected failure.
    pub fn get_in(&self, branch: Branch, key: &str) -> Option<Content> {
        let state = self.state.lock();
        let id = state.resolve(branch, key)?;
        state.branches.get(&branch)?.get(&id).cloned()
    }

    /// Number of items in `branch`.
    pub fn count(&self, branch: Branch) -> usize {
        self.state
            .lock()
            .branches
            .get(&branch)
            .map_or(0, BTreeMap::len)
    }

    /// Bytes stored for a media item.
    pub fn media_bytes(&self, id: &str) -> Option<Vec<u8>> {
        self.state.lock().media.get(id).cloned()
    }

    /// Fail the next call of `op` with `err`.
    pub fn fail_next(&self, op: Operation, err: CmsError) {
        self.state.lock().failures.insert(op, err);
    }

    /// Refuse to publish `key` (an id or a path).
    ///
    /// The refusal lands in `failed_contents` under the item's id when it
    /// resolves in either branch, otherwise under the requested key.
    pub fn refuse_publish_of(&self, key: &str) {
        self.state.lock().unpublishable.push(key.to_string());
    }

    /// All calls so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    /// Operations called so far, in order.
    pub fn operations(&self) -> Vec<Operation> {
        self.state.lock().calls.iter().map(|c| c.op).collect()
    }
}

#[async_trait]
impl ContentRepository for InMemoryRepository {
    async fn get(&self, ctx: &BranchContext, key: &str) -> CmsResult<Option<Content>> {
        let branch = ctx.branch();
        let mut state = self.state.lock();
        state.record(Operation::Get, Some(branch), vec![key.to_string()]);
        state.take_failure(Operation::Get)?;

        let Some(id) = state.resolve(branch, key) else {
            return Ok(None);
        };
        Ok(state.branch(branch).get(&id).cloned())
    }

    async fn create(&self, ctx: &BranchContext, params: CreateContentParams) -> CmsResult<Content> {
        let branch = ctx.branch();
        let mut state = self.state.lock();
        state.record(Operation::Create, Some(branch), Vec::new());
        state.take_failure(Operation::Create)?;

        let id = Uuid::now_v7().to_string();
        let name = params.name.unwrap_or_else(|| id.clone());
        let content = Content {
            path: format!("{}/{}", params.parent_path.trim_end_matches('/'), name),
            id,
            name,
            display_name: params.display_name,
            content_type: params.content_type,
            data: params.data,
        };
        state.insert_new(branch, content)
    }

    async fn modify(&self, ctx: &BranchContext, params: ModifyContentParams) -> CmsResult<Content> {
        let branch = ctx.branch();
        let mut state = self.state.lock();
        state.record(Operation::Modify, Some(branch), vec![params.key.clone()]);
        state.take_failure(Operation::Modify)?;

        let Some(id) = state.resolve(branch, &params.key) else {
            return Err(CmsError::not_found(format!(
                "no content {} in {branch}",
                params.key
            )));
        };
        let items = state.branch(branch);
        let Some(existing) = items.get(&id).cloned() else {
            return Err(CmsError::not_found(id));
        };

        let mut edited = (params.editor)(existing);
        edited.id = id.clone();
        items.insert(id, edited.clone());
        Ok(edited)
    }

    async fn remove(&self, ctx: &BranchContext, params: DeleteContentParams) -> CmsResult<()> {
        let branch = ctx.branch();
        let mut state = self.state.lock();
        state.record(Operation::Remove, Some(branch), vec![params.key.clone()]);
        state.take_failure(Operation::Remove)?;

        let Some(id) = state.resolve(branch, &params.key) else {
            return Err(CmsError::not_found(format!(
                "no content {} in {branch}",
                params.key
            )));
        };
        state.branch(branch).remove(&id);
        Ok(())
    }

    async fn publish(&self, params: PublishContentParams) -> CmsResult<PublishResult> {
        let mut state = self.state.lock();
        state.record(Operation::Publish, None, params.keys.clone());
        state.take_failure(Operation::Publish)?;

        let mut result = PublishResult::default();
        for key in &params.keys {
            let in_source = state.resolve(params.source_branch, key);
            let in_target = state.resolve(params.target_branch, key);
            let id = in_source.clone().or_else(|| in_target.clone());

            // Refusals are reported under the resolved id when there is one
            if let Some(refused) = [Some(key), id.as_ref()]
                .into_iter()
                .flatten()
                .find(|k| state.unpublishable.contains(*k))
            {
                result.failed_contents.push(id.clone().unwrap_or_else(|| refused.clone()));
                continue;
            }

            if let Some(id) = in_source {
                let source = state.branch(params.source_branch).get(&id).cloned();
                if let Some(content) = source {
                    state.branch(params.target_branch).insert(id.clone(), content);
                    result.pushed_contents.push(id);
                }
            } else if let Some(id) = in_target {
                state.branch(params.target_branch).remove(&id);
                result.deleted_contents.push(id);
            } else {
                result.failed_contents.push(key.clone());
            }
        }
        Ok(result)
    }

    async fn create_media(
        &self,
        ctx: &BranchContext,
        params: CreateMediaParams,
    ) -> CmsResult<Content> {
        let branch = ctx.branch();
        let mut state = self.state.lock();
        state.record(Operation::CreateMedia, Some(branch), vec![params.name.clone()]);
        state.take_failure(Operation::CreateMedia)?;

        let content_type = match params.mime_type.as_deref() {
            Some(mime) if mime.starts_with("image/") => "media:image",
            _ => "media:unknown",
        };

        let mut data = Data::new();
        data.insert("mimeType".into(), params.mime_type.clone().into());
        data.insert("size".into(), params.data.len().into());

        let id = Uuid::now_v7().to_string();
        let content = Content {
            path: format!("{}/{}", params.parent_path.trim_end_matches('/'), params.name),
            id: id.clone(),
            name: params.name,
            display_name: None,
            content_type: content_type.to_string(),
            data,
        };
        let content = state.insert_new(branch, content)?;
        state.media.insert(id, params.data.to_vec());
        Ok(content)
    }
}

/// Assertion helpers for JSON content.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a JSON value lacks a specific key.
    pub fn lacks_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_none(),
            "Expected JSON to lack key '{key}', got: {value}"
        );
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }
}
