pub mod azdo;
pub mod gitlab;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;
use types::*;

/// The platform projects are migrated away from.
#[async_trait]
pub trait SourcePlatform: Send + Sync {
    /// Fetch a project by its numeric id.
    async fn get_project(&self, project_id: u64) -> Result<Project>;

    /// List one page of open merge requests, oldest first.
    async fn list_merge_requests(&self, project_id: u64, page: u32) -> Result<Page<MergeRequest>>;

    /// List one page of discussions on a merge request.
    async fn list_discussions(
        &self,
        project_id: u64,
        merge_request_iid: u64,
        page: u32,
    ) -> Result<Page<Discussion>>;

    /// Mark a project read-only.
    async fn archive_project(&self, project_id: u64) -> Result<()>;
}

/// The platform projects are migrated into.
#[async_trait]
pub trait DestinationPlatform: Send + Sync {
    /// Look up a repository by name. `None` when it does not exist.
    async fn get_repository(&self, project: &str, name: &str) -> Result<Option<Repository>>;

    /// Create an empty repository.
    async fn create_repository(&self, project: &str, name: &str) -> Result<Repository>;

    /// Delete a repository. Irreversible.
    async fn delete_repository(&self, project: &str, repository_id: &str) -> Result<()>;

    /// Start importing a remote git repository into an empty repository.
    async fn create_import_request(
        &self,
        project: &str,
        repository_id: &str,
        request: &ImportRequestToCreate,
    ) -> Result<ImportRequest>;

    /// Current state of an import request. `None` when the service answered without a body.
    async fn get_import_request(
        &self,
        project: &str,
        repository_id: &str,
        import_request_id: u64,
    ) -> Result<Option<ImportRequest>>;

    /// Open a pull request.
    async fn create_pull_request(
        &self,
        project: &str,
        repository_id: &str,
        pull_request: &PullRequestToCreate,
    ) -> Result<PullRequest>;

    /// Start a comment thread on a pull request.
    async fn create_thread(
        &self,
        project: &str,
        repository_id: &str,
        pull_request_id: u64,
        thread: &CommentThread,
    ) -> Result<CreatedThread>;

    /// Append to an existing comment thread.
    async fn update_thread(
        &self,
        project: &str,
        repository_id: &str,
        pull_request_id: u64,
        thread_id: u64,
        thread: &CommentThread,
    ) -> Result<()>;
}
