//! GitLab REST v4 wire types and their mapping onto platform types.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::platform::types;

#[derive(Debug, Deserialize)]
pub(super) struct GitLabProject {
    id: u64,
    path: String,
    web_url: String,
    ssh_url_to_repo: String,
    http_url_to_repo: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct GitLabUser {
    #[serde(default)]
    pub(super) username: String,
    #[serde(default)]
    name: String,
    avatar_url: Option<String>,
    #[serde(default)]
    web_url: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct GitLabMergeRequest {
    iid: u64,
    project_id: u64,
    title: String,
    description: Option<String>,
    state: String,
    // Newer instances send `draft`, older ones only `work_in_progress`; most send both.
    draft: Option<bool>,
    work_in_progress: Option<bool>,
    source_branch: String,
    target_branch: String,
    author: GitLabUser,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    merge_commit_sha: Option<String>,
    web_url: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct GitLabDiscussion {
    id: String,
    #[serde(default)]
    notes: Vec<GitLabNote>,
}

#[derive(Debug, Deserialize)]
struct GitLabNote {
    id: u64,
    #[serde(default)]
    body: String,
    author: GitLabUser,
    #[serde(default)]
    system: bool,
    resolved: Option<bool>,
    position: Option<GitLabPosition>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct GitLabPosition {
    new_path: Option<String>,
    new_line: Option<u64>,
    line_range: Option<GitLabLineRange>,
}

#[derive(Debug, Deserialize)]
struct GitLabLineRange {
    start: Option<GitLabLinePosition>,
    end: Option<GitLabLinePosition>,
}

#[derive(Debug, Deserialize)]
struct GitLabLinePosition {
    new_line: Option<u64>,
}

pub(super) fn map_project(project: GitLabProject) -> types::Project {
    types::Project {
        id: project.id,
        path: project.path,
        web_url: project.web_url,
        ssh_url_to_repo: project.ssh_url_to_repo,
        http_url_to_repo: project.http_url_to_repo,
    }
}

fn map_user(user: GitLabUser) -> types::User {
    types::User {
        username: user.username,
        name: user.name,
        avatar_url: user.avatar_url.unwrap_or_default(),
        web_url: user.web_url,
    }
}

fn map_state(state: &str) -> types::MergeRequestState {
    match state {
        "opened" => types::MergeRequestState::Opened,
        "closed" => types::MergeRequestState::Closed,
        "locked" => types::MergeRequestState::Locked,
        "merged" => types::MergeRequestState::Merged,
        other => types::MergeRequestState::Other(other.to_string()),
    }
}

pub(super) fn map_merge_request(mr: GitLabMergeRequest) -> types::MergeRequest {
    types::MergeRequest {
        iid: mr.iid,
        project_id: mr.project_id,
        title: mr.title,
        description: mr.description.unwrap_or_default(),
        state: map_state(&mr.state),
        work_in_progress: mr.draft.or(mr.work_in_progress).unwrap_or(false),
        source_branch: mr.source_branch,
        target_branch: mr.target_branch,
        author: map_user(mr.author),
        created_at: mr.created_at,
        updated_at: mr.updated_at,
        merge_commit_sha: mr.merge_commit_sha.filter(|sha| !sha.is_empty()),
        web_url: mr.web_url,
    }
}

pub(super) fn map_discussion(discussion: GitLabDiscussion) -> types::Discussion {
    types::Discussion {
        id: discussion.id,
        notes: discussion.notes.into_iter().map(map_note).collect(),
    }
}

fn map_note(note: GitLabNote) -> types::Note {
    types::Note {
        id: note.id,
        body: note.body,
        author: map_user(note.author),
        system: note.system,
        resolved: note.resolved.unwrap_or(false),
        position: note.position.map(map_position),
        created_at: note.created_at,
        updated_at: note.updated_at.unwrap_or(note.created_at),
    }
}

fn map_position(position: GitLabPosition) -> types::NotePosition {
    types::NotePosition {
        new_path: position.new_path,
        new_line: position.new_line,
        line_range: position.line_range.map(|range| types::LineRange {
            start_line: range.start.and_then(|p| p.new_line),
            end_line: range.end.and_then(|p| p.new_line),
        }),
    }
}
