use tokio::time::{sleep, Instant};

use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::platform::types::{
    GitImportSource, ImportRequestParameters, ImportRequestToCreate, ImportStatus, Project,
    Repository,
};
use crate::platform::DestinationPlatform;

/// Copy the git history of `project` into a new repository of `azdo_project`.
///
/// Returns once the import job completed. With `recreate_repo` set an
/// existing repository of the same name is deleted first.
pub async fn import_repository<D: DestinationPlatform + ?Sized>(
    destination: &D,
    settings: &Settings,
    project: &Project,
    azdo_project: &str,
) -> Result<Repository> {
    if settings.recreate_repo {
        if let Some(existing) = destination.get_repository(azdo_project, &project.path).await? {
            tracing::info!(
                repository = %existing.name,
                azdo_project,
                "Deleting existing repository before recreating it"
            );
            destination
                .delete_repository(azdo_project, &existing.id)
                .await?;
        }
    }

    let repository = destination
        .create_repository(azdo_project, &project.path)
        .await?;

    tracing::info!(
        target: "audit",
        "GIT:{};{};{};{};{}",
        project.id,
        project.web_url,
        project.ssh_url_to_repo,
        project.http_url_to_repo,
        repository.ssh_url
    );

    let request = ImportRequestToCreate {
        parameters: ImportRequestParameters {
            git_source: GitImportSource {
                url: project.http_url_to_repo.clone(),
                overwrite: false,
            },
            service_endpoint_id: settings.azdo_endpoint,
        },
    };
    let import = destination
        .create_import_request(azdo_project, &repository.id, &request)
        .await?;

    tracing::debug!(
        import_request_id = import.import_request_id,
        repository = %repository.name,
        "Import request created"
    );

    wait_for_import(
        destination,
        settings,
        azdo_project,
        &repository.id,
        import.import_request_id,
    )
    .await?;

    Ok(repository)
}

async fn wait_for_import<D: DestinationPlatform + ?Sized>(
    destination: &D,
    settings: &Settings,
    azdo_project: &str,
    repository_id: &str,
    import_request_id: u64,
) -> Result<()> {
    let deadline = settings.import_timeout().map(|limit| Instant::now() + limit);

    loop {
        let current = destination
            .get_import_request(azdo_project, repository_id, import_request_id)
            .await?;

        let Some(current) = current else {
            tracing::warn!(
                import_request_id,
                "Import status came back empty, assuming the import completed"
            );
            return Ok(());
        };

        match current.status {
            ImportStatus::Completed => return Ok(()),
            ImportStatus::Abandoned => return Err(AppError::ImportAbandoned),
            ImportStatus::Failed => {
                return Err(AppError::ImportFailed(
                    current
                        .error_message
                        .unwrap_or_else(|| "no error details reported".to_string()),
                ))
            }
            status => tracing::debug!(import_request_id, ?status, "Import still running"),
        }

        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(AppError::ImportTimedOut(settings.import_timeout_secs));
        }

        sleep(settings.poll_interval()).await;
    }
}
