use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- GitLab (source) ---

/// A GitLab project as seen by the migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: u64,
    pub path: String,
    pub web_url: String,
    pub ssh_url_to_repo: String,
    pub http_url_to_repo: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub name: String,
    pub avatar_url: String,
    pub web_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeRequestState {
    Opened,
    Closed,
    Locked,
    Merged,
    Other(String),
}

impl MergeRequestState {
    /// Closed and merged requests have nothing left to review.
    pub fn is_finished(&self) -> bool {
        matches!(self, MergeRequestState::Closed | MergeRequestState::Merged)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    pub iid: u64,
    pub project_id: u64,
    pub title: String,
    pub description: String,
    pub state: MergeRequestState,
    pub work_in_progress: bool,
    pub source_branch: String,
    pub target_branch: String,
    pub author: User,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub merge_commit_sha: Option<String>,
    pub web_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discussion {
    pub id: String,
    pub notes: Vec<Note>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: u64,
    pub body: String,
    pub author: User,
    pub system: bool,
    pub resolved: bool,
    pub position: Option<NotePosition>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Where a diff note is anchored on the new side of the change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePosition {
    pub new_path: Option<String>,
    pub new_line: Option<u64>,
    pub line_range: Option<LineRange>,
}

impl NotePosition {
    /// Path of the file the note is attached to, if it is attached to one.
    pub fn file_path(&self) -> Option<&str> {
        self.new_path.as_deref().filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineRange {
    pub start_line: Option<u64>,
    pub end_line: Option<u64>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub next_page: Option<u32>,
}

impl<T> Page<T> {
    /// The page to request next, if the listing continues.
    pub fn following(&self) -> Option<u32> {
        self.next_page.filter(|next| *next > self.current_page)
    }
}

// --- Azure DevOps (destination) ---

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub web_url: String,
    #[serde(default)]
    pub ssh_url: String,
    #[serde(default)]
    pub remote_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStatus {
    NotSet,
    Queued,
    InProgress,
    Completed,
    Failed,
    Abandoned,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    pub import_request_id: u64,
    pub status: ImportStatus,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequestToCreate {
    pub parameters: ImportRequestParameters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequestParameters {
    pub git_source: GitImportSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_endpoint_id: Option<uuid::Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GitImportSource {
    pub url: String,
    pub overwrite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestToCreate {
    pub title: String,
    pub description: String,
    pub source_ref_name: String,
    pub target_ref_name: String,
    pub is_draft: bool,
    pub status: PullRequestStatus,
    pub created_by: IdentityRef,
    pub creation_date: DateTime<Utc>,
    pub repository: RepositoryRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_merge_commit: Option<CommitRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PullRequestStatus {
    Active,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRef {
    pub display_name: String,
    pub descriptor: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRef {
    pub commit_id: String,
}

/// A created pull request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub pull_request_id: u64,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CommentThreadStatus {
    Active,
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CommentType {
    Text,
    CodeChange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThread {
    /// Only set when updating an existing thread.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub status: CommentThreadStatus,
    pub published_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_context: Option<ThreadContext>,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadContext {
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_file_start: Option<CommentPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_file_end: Option<CommentPosition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommentPosition {
    pub line: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u64,
    pub parent_comment_id: u64,
    pub content: String,
    pub comment_type: CommentType,
    pub published_date: DateTime<Utc>,
    pub last_updated_date: DateTime<Utc>,
}

/// A created comment thread.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedThread {
    pub id: u64,
}
