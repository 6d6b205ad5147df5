//! Azure DevOps Git REST API (api-version 7.1).
//!
//! Authentication is HTTP Basic with an empty user name and the personal
//! access token as password.

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::platform::types::*;
use crate::platform::DestinationPlatform;

use super::mapper::{self, AzdoImportRequest, AzdoProjectList};

const API_VERSION: &str = "7.1";

pub struct AzureDevOpsClient {
    http: Client,
    organization_url: String, // e.g. "https://dev.azure.com/contoso"
    token: String,
}

impl AzureDevOpsClient {
    pub fn new(organization_url: &str, token: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("gitlab-to-azdo/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| {
                AppError::AzureDevOpsApi(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            organization_url: organization_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Check the organization URL and token by listing one project.
    pub async fn verify_connection(&self) -> Result<usize> {
        let url = self.url(None, "_apis/projects?$top=1");
        let list: AzdoProjectList = self.json(Method::GET, &url, None::<&()>).await?;
        Ok(list.count)
    }

    fn url(&self, project: Option<&str>, path: &str) -> String {
        let separator = if path.contains('?') { '&' } else { '?' };
        match project {
            Some(project) => format!(
                "{}/{}/{path}{separator}api-version={API_VERSION}",
                self.organization_url,
                urlencoding::encode(project)
            ),
            None => format!(
                "{}/{path}{separator}api-version={API_VERSION}",
                self.organization_url
            ),
        }
    }

    fn git_url(&self, project: &str, path: &str) -> String {
        self.url(Some(project), &format!("_apis/git/{path}"))
    }

    async fn send<B: Serialize>(&self, method: Method, url: &str, body: Option<&B>) -> Result<Response> {
        let mut request = self
            .http
            .request(method, url)
            .basic_auth("", Some(&self.token));
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    async fn json<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let response = self.send(method.clone(), url, body).await?;
        let response = ensure_success(&method, url, response).await?;
        Ok(response.json::<T>().await?)
    }
}

async fn ensure_success(method: &Method, url: &str, response: Response) -> Result<Response> {
    let status = response.status();
    // A rejected token is answered with a sign-in page instead of a 401.
    if status == StatusCode::NON_AUTHORITATIVE_INFORMATION {
        return Err(AppError::AzureDevOpsApi(format!(
            "{method} {url} was redirected to sign-in, check the personal access token"
        )));
    }
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::AzureDevOpsApi(format!(
        "{method} {url} returned {status}: {body}"
    )))
}

#[async_trait]
impl DestinationPlatform for AzureDevOpsClient {
    async fn get_repository(&self, project: &str, name: &str) -> Result<Option<Repository>> {
        let url = self.git_url(
            project,
            &format!("repositories/{}", urlencoding::encode(name)),
        );
        let response = self.send(Method::GET, &url, None::<&()>).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_success(&Method::GET, &url, response).await?;
        Ok(Some(response.json::<Repository>().await?))
    }

    async fn create_repository(&self, project: &str, name: &str) -> Result<Repository> {
        #[derive(Serialize)]
        struct CreateRepository<'a> {
            name: &'a str,
        }

        let url = self.git_url(project, "repositories");
        self.json(Method::POST, &url, Some(&CreateRepository { name }))
            .await
    }

    async fn delete_repository(&self, project: &str, repository_id: &str) -> Result<()> {
        let url = self.git_url(project, &format!("repositories/{repository_id}"));
        let response = self.send(Method::DELETE, &url, None::<&()>).await?;
        ensure_success(&Method::DELETE, &url, response).await?;
        Ok(())
    }

    async fn create_import_request(
        &self,
        project: &str,
        repository_id: &str,
        request: &ImportRequestToCreate,
    ) -> Result<ImportRequest> {
        let url = self.git_url(
            project,
            &format!("repositories/{repository_id}/importRequests"),
        );
        let created: AzdoImportRequest = self.json(Method::POST, &url, Some(request)).await?;
        Ok(mapper::map_import_request(created))
    }

    async fn get_import_request(
        &self,
        project: &str,
        repository_id: &str,
        import_request_id: u64,
    ) -> Result<Option<ImportRequest>> {
        let url = self.git_url(
            project,
            &format!("repositories/{repository_id}/importRequests/{import_request_id}"),
        );
        let response = self.send(Method::GET, &url, None::<&()>).await?;
        let body = ensure_success(&Method::GET, &url, response)
            .await?
            .text()
            .await?;

        if body.trim().is_empty() {
            return Ok(None);
        }
        let request: AzdoImportRequest = serde_json::from_str(&body)?;
        Ok(Some(mapper::map_import_request(request)))
    }

    async fn create_pull_request(
        &self,
        project: &str,
        repository_id: &str,
        pull_request: &PullRequestToCreate,
    ) -> Result<PullRequest> {
        let url = self.git_url(
            project,
            &format!("repositories/{repository_id}/pullrequests?supportsIterations=false"),
        );
        self.json(Method::POST, &url, Some(pull_request)).await
    }

    async fn create_thread(
        &self,
        project: &str,
        repository_id: &str,
        pull_request_id: u64,
        thread: &CommentThread,
    ) -> Result<CreatedThread> {
        let url = self.git_url(
            project,
            &format!("repositories/{repository_id}/pullRequests/{pull_request_id}/threads"),
        );
        self.json(Method::POST, &url, Some(thread)).await
    }

    async fn update_thread(
        &self,
        project: &str,
        repository_id: &str,
        pull_request_id: u64,
        thread_id: u64,
        thread: &CommentThread,
    ) -> Result<()> {
        let url = self.git_url(
            project,
            &format!(
                "repositories/{repository_id}/pullRequests/{pull_request_id}/threads/{thread_id}"
            ),
        );
        let response = self.send(Method::PATCH, &url, Some(thread)).await?;
        ensure_success(&Method::PATCH, &url, response).await?;
        Ok(())
    }
}
