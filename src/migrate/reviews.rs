use crate::platform::types::{CommentThread, MergeRequest, PullRequest, Repository};
use crate::platform::{DestinationPlatform, SourcePlatform};
use crate::translate::{translate_discussion, translate_pull_request};

use super::types::ReviewStats;

/// Recreate the open merge requests of `project_id` as pull requests on `repository`.
///
/// Errors on a single page, pull request or thread are logged and skipped.
pub async fn migrate_reviews<S, D>(
    source: &S,
    destination: &D,
    project_id: u64,
    azdo_project: &str,
    repository: &Repository,
) -> ReviewStats
where
    S: SourcePlatform + ?Sized,
    D: DestinationPlatform + ?Sized,
{
    tracing::debug!(repository = %repository.name, "Migrating merge requests");

    let mut stats = ReviewStats::default();
    let mut page_number = 1;

    loop {
        let page = match source.list_merge_requests(project_id, page_number).await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(project_id, page = page_number, error = %e, "Could not fetch merge requests page");
                break;
            }
        };

        for mr in &page.items {
            migrate_merge_request(source, destination, azdo_project, repository, mr, &mut stats)
                .await;
        }

        match page.following() {
            Some(next) => page_number = next,
            None => break,
        }
    }

    stats
}

async fn migrate_merge_request<S, D>(
    source: &S,
    destination: &D,
    azdo_project: &str,
    repository: &Repository,
    mr: &MergeRequest,
    stats: &mut ReviewStats,
) where
    S: SourcePlatform + ?Sized,
    D: DestinationPlatform + ?Sized,
{
    let Some(payload) = translate_pull_request(mr, repository) else {
        tracing::debug!(iid = mr.iid, state = ?mr.state, "Skipping finished merge request");
        return;
    };

    let pull_request = match destination
        .create_pull_request(azdo_project, &repository.id, &payload)
        .await
    {
        Ok(pr) => pr,
        Err(e) => {
            tracing::error!(iid = mr.iid, error = %e, "Cannot migrate merge request");
            stats.pull_requests_failed += 1;
            return;
        }
    };
    stats.pull_requests_created += 1;

    tracing::info!(
        iid = mr.iid,
        pull_request_id = pull_request.pull_request_id,
        "Pull request created"
    );

    migrate_discussions(source, destination, azdo_project, repository, mr, &pull_request, stats)
        .await;
}

async fn migrate_discussions<S, D>(
    source: &S,
    destination: &D,
    azdo_project: &str,
    repository: &Repository,
    mr: &MergeRequest,
    pull_request: &PullRequest,
    stats: &mut ReviewStats,
) where
    S: SourcePlatform + ?Sized,
    D: DestinationPlatform + ?Sized,
{
    tracing::debug!(iid = mr.iid, "Migrating discussions");

    let mut page_number = 1;
    loop {
        let page = match source
            .list_discussions(mr.project_id, mr.iid, page_number)
            .await
        {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(iid = mr.iid, page = page_number, error = %e, "Could not fetch discussions page");
                break;
            }
        };

        for discussion in &page.items {
            let Some(plan) = translate_discussion(mr, discussion) else {
                stats.discussions_skipped += 1;
                continue;
            };

            let created = match destination
                .create_thread(
                    azdo_project,
                    &repository.id,
                    pull_request.pull_request_id,
                    plan.initial(),
                )
                .await
            {
                Ok(created) => created,
                Err(e) => {
                    tracing::error!(discussion = %discussion.id, error = %e, "Cannot create comment thread");
                    stats.threads_failed += 1;
                    continue;
                }
            };

            if let Some(replies) = plan.replies() {
                let update = CommentThread {
                    id: Some(created.id),
                    ..replies.clone()
                };
                if let Err(e) = destination
                    .update_thread(
                        azdo_project,
                        &repository.id,
                        pull_request.pull_request_id,
                        created.id,
                        &update,
                    )
                    .await
                {
                    tracing::error!(
                        discussion = %discussion.id,
                        thread_id = created.id,
                        error = %e,
                        "Cannot add replies to comment thread"
                    );
                    stats.threads_failed += 1;
                    continue;
                }
            }

            stats.threads_created += 1;
        }

        match page.following() {
            Some(next) => page_number = next,
            None => break,
        }
    }
}
