//! GitLab provider (REST v4).
//!
//! Endpoints used:
//! - GET  /user
//! - GET  /projects/:id
//! - GET  /projects/:id/merge_requests
//! - GET  /projects/:id/merge_requests/:iid/discussions
//! - POST /projects/:id/archive
//!
//! Listings are paginated through the `x-page` / `x-next-page` headers.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};
use crate::platform::types::*;
use crate::platform::SourcePlatform;

use super::mapper::{self, GitLabDiscussion, GitLabMergeRequest, GitLabProject, GitLabUser};

const PER_PAGE: u32 = 100;

pub struct GitLabClient {
    http: Client,
    base_api: String, // e.g. "https://gitlab.com/api/v4"
    token: String,
}

impl GitLabClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("gitlab-to-azdo/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| AppError::GitLabApi(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_api: format!("{}/api/v4", base_url.trim_end_matches('/')),
            token: token.to_string(),
        })
    }

    /// Check the token by fetching the user it belongs to.
    pub async fn verify_token(&self) -> Result<String> {
        let (user, _) = self.get::<GitLabUser>("/user").await?;
        Ok(user.username)
    }

    async fn send(&self, method: Method, path: &str) -> Result<Response> {
        let url = format!("{}{path}", self.base_api);
        Ok(self
            .http
            .request(method, &url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<(T, HeaderMap)> {
        let response = self.send(Method::GET, path).await?;
        let response = ensure_success("GET", path, response).await?;

        let headers = response.headers().clone();
        let body = response.json::<T>().await?;
        Ok((body, headers))
    }

    async fn get_page<T: DeserializeOwned>(&self, path: &str, page: u32) -> Result<Page<T>> {
        let separator = if path.contains('?') { '&' } else { '?' };
        let paged = format!("{path}{separator}page={page}&per_page={PER_PAGE}");
        let (items, headers) = self.get::<Vec<T>>(&paged).await?;

        Ok(Page {
            items,
            current_page: header_number(&headers, "x-page").unwrap_or(page),
            next_page: header_number(&headers, "x-next-page"),
        })
    }
}

async fn ensure_success(method: &str, path: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::GitLabApi(format!(
        "{method} {path} returned {status}: {body}"
    )))
}

/// GitLab sends an empty `x-next-page` on the last page.
fn header_number(headers: &HeaderMap, name: &str) -> Option<u32> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

#[async_trait]
impl SourcePlatform for GitLabClient {
    async fn get_project(&self, project_id: u64) -> Result<Project> {
        let path = format!("/projects/{project_id}");
        let response = self.send(Method::GET, &path).await?;

        if matches!(
            response.status(),
            StatusCode::NOT_FOUND | StatusCode::FORBIDDEN
        ) {
            tracing::debug!(project_id, status = %response.status(), "Project lookup refused");
            return Err(AppError::ProjectNotFound(project_id));
        }

        let project = ensure_success("GET", &path, response)
            .await?
            .json::<GitLabProject>()
            .await?;
        Ok(mapper::map_project(project))
    }

    async fn list_merge_requests(&self, project_id: u64, page: u32) -> Result<Page<MergeRequest>> {
        let path = format!(
            "/projects/{project_id}/merge_requests?state=opened&order_by=created_at&sort=asc"
        );
        let page = self.get_page::<GitLabMergeRequest>(&path, page).await?;

        Ok(Page {
            items: page.items.into_iter().map(mapper::map_merge_request).collect(),
            current_page: page.current_page,
            next_page: page.next_page,
        })
    }

    async fn list_discussions(
        &self,
        project_id: u64,
        merge_request_iid: u64,
        page: u32,
    ) -> Result<Page<Discussion>> {
        let path = format!("/projects/{project_id}/merge_requests/{merge_request_iid}/discussions");
        let page = self.get_page::<GitLabDiscussion>(&path, page).await?;

        Ok(Page {
            items: page.items.into_iter().map(mapper::map_discussion).collect(),
            current_page: page.current_page,
            next_page: page.next_page,
        })
    }

    async fn archive_project(&self, project_id: u64) -> Result<()> {
        let path = format!("/projects/{project_id}/archive");
        let response = self.send(Method::POST, &path).await?;
        ensure_success("POST", &path, response).await?;
        Ok(())
    }
}
