//! Per-project migration: import the repository, optionally recreate its
//! merge requests and discussions, then archive the source project.

mod repository;
mod reviews;
pub mod types;

#[cfg(test)]
mod fakes;

use crate::config::{ProjectSpec, Settings};
use crate::error::Result;
use crate::platform::{DestinationPlatform, SourcePlatform};

pub use repository::import_repository;
pub use reviews::migrate_reviews;
use types::{MigrationSummary, ProjectOutcome, ProjectReport};

/// Moves projects from a source to a destination platform, one at a time.
pub struct Migrator<S, D> {
    source: S,
    destination: D,
    settings: Settings,
}

impl<S: SourcePlatform, D: DestinationPlatform> Migrator<S, D> {
    pub fn new(source: S, destination: D, settings: Settings) -> Self {
        Self {
            source,
            destination,
            settings,
        }
    }

    /// Migrate every listed project in order.
    ///
    /// A failing project is logged and recorded; the run always continues
    /// with the next one.
    pub async fn run(&self, projects: &[ProjectSpec]) -> MigrationSummary {
        let mut summary = MigrationSummary::default();
        let total = projects.len();

        for (index, spec) in projects.iter().enumerate() {
            tracing::info!(
                "processing project {} ({}/{})",
                spec.gitlab_id,
                index + 1,
                total
            );

            let outcome = match self.migrate_project(spec).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(
                        gitlab_id = spec.gitlab_id,
                        azdo_project = %spec.azdo_project,
                        error = %e,
                        "Project migration failed"
                    );
                    ProjectOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };

            summary.reports.push(ProjectReport {
                gitlab_id: spec.gitlab_id,
                azdo_project: spec.azdo_project.clone(),
                outcome,
            });
        }

        summary
    }

    pub async fn migrate_project(&self, spec: &ProjectSpec) -> Result<ProjectOutcome> {
        let project = self.source.get_project(spec.gitlab_id).await?;

        tracing::debug!(
            url = %project.http_url_to_repo,
            azdo_project = %spec.azdo_project,
            "Creating import request"
        );
        let repository =
            import_repository(&self.destination, &self.settings, &project, &spec.azdo_project)
                .await?;
        tracing::info!(repository = %repository.name, "Repository imported");

        let reviews = if spec.migrate_mrs {
            let stats = migrate_reviews(
                &self.source,
                &self.destination,
                project.id,
                &spec.azdo_project,
                &repository,
            )
            .await;
            tracing::info!(
                repository = %repository.name,
                pull_requests = stats.pull_requests_created,
                threads = stats.threads_created,
                failures = stats.pull_requests_failed + stats.threads_failed,
                "Merge requests migrated"
            );
            Some(stats)
        } else {
            None
        };

        let archived = self.settings.archive_projects && self.archive(spec.gitlab_id).await;

        Ok(ProjectOutcome::Migrated {
            repository: repository.name,
            reviews,
            archived,
        })
    }

    async fn archive(&self, project_id: u64) -> bool {
        tracing::debug!(project_id, "Archiving GitLab project");
        match self.source.archive_project(project_id).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(project_id, error = %e, "Couldn't archive GitLab project");
                false
            }
        }
    }
}
