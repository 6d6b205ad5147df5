use crate::platform::types::{
    CommitRef, IdentityRef, MergeRequest, PullRequestStatus, PullRequestToCreate, Repository,
    RepositoryRef,
};

use super::markdown;

/// Map an open merge request onto a pull request in `repository`.
///
/// Closed and merged requests yield `None`.
pub fn translate_pull_request(
    mr: &MergeRequest,
    repository: &Repository,
) -> Option<PullRequestToCreate> {
    if mr.state.is_finished() {
        return None;
    }

    Some(PullRequestToCreate {
        title: mr.title.clone(),
        description: markdown::render_description(mr),
        source_ref_name: format!("refs/heads/{}", mr.source_branch),
        target_ref_name: format!("refs/heads/{}", mr.target_branch),
        is_draft: mr.work_in_progress,
        status: PullRequestStatus::Active,
        created_by: IdentityRef {
            display_name: mr.author.username.clone(),
            descriptor: mr.author.name.clone(),
        },
        creation_date: mr.created_at,
        repository: RepositoryRef {
            id: repository.id.clone(),
            name: repository.name.clone(),
        },
        last_merge_commit: mr.merge_commit_sha.as_ref().map(|sha| CommitRef {
            commit_id: sha.clone(),
        }),
    })
}
