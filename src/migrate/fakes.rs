//! In-memory platforms recording every call made by the migrator.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::platform::types::*;
use crate::platform::{DestinationPlatform, SourcePlatform};

pub fn settings() -> Settings {
    Settings {
        gitlab_url: "https://gitlab.com".to_string(),
        gitlab_token: "glpat".to_string(),
        azdo_org: "https://dev.azure.com/org".to_string(),
        azdo_token: "pat".to_string(),
        azdo_endpoint: None,
        projects_file: "projects.json".into(),
        recreate_repo: false,
        archive_projects: false,
        poll_interval_secs: 3,
        import_timeout_secs: 3600,
    }
}

pub fn project(id: u64, path: &str) -> Project {
    Project {
        id,
        path: path.to_string(),
        web_url: format!("https://gitlab.com/group/{path}"),
        ssh_url_to_repo: format!("git@gitlab.com:group/{path}.git"),
        http_url_to_repo: format!("https://gitlab.com/group/{path}.git"),
    }
}

pub fn merge_request(project_id: u64, iid: u64, state: MergeRequestState) -> MergeRequest {
    let at = Utc.with_ymd_and_hms(2019, 11, 4, 15, 38, 53).unwrap();
    MergeRequest {
        iid,
        project_id,
        title: format!("MR {iid}"),
        description: String::new(),
        state,
        work_in_progress: false,
        source_branch: "develop".to_string(),
        target_branch: "master".to_string(),
        author: User::default(),
        created_at: at,
        updated_at: at,
        merge_commit_sha: None,
        web_url: format!("https://gitlab.com/group/p/-/merge_requests/{iid}"),
    }
}

pub fn note(id: u64, system: bool) -> Note {
    let at = Utc.with_ymd_and_hms(2019, 11, 4, 15, 38, 53).unwrap();
    Note {
        id,
        body: format!("note {id}"),
        author: User::default(),
        system,
        resolved: false,
        position: None,
        created_at: at,
        updated_at: at,
    }
}

pub fn discussion(id: &str, notes: Vec<Note>) -> Discussion {
    Discussion {
        id: id.to_string(),
        notes,
    }
}

pub fn page<T>(items: Vec<T>, current_page: u32, next_page: Option<u32>) -> Page<T> {
    Page {
        items,
        current_page,
        next_page,
    }
}

pub fn import_status(status: ImportStatus) -> Option<ImportRequest> {
    Some(ImportRequest {
        import_request_id: 7,
        status,
        error_message: None,
    })
}

#[derive(Default)]
pub struct FakeSource {
    pub projects: HashMap<u64, Project>,
    /// Merge request pages by page number. A missing page is a fetch error.
    pub merge_request_pages: HashMap<u32, Page<MergeRequest>>,
    /// Discussion pages by merge request iid and page number.
    pub discussion_pages: HashMap<(u64, u32), Page<Discussion>>,
    pub fail_archive: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn with_project(mut self, project: Project) -> Self {
        self.projects.insert(project.id, project);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl SourcePlatform for FakeSource {
    async fn get_project(&self, project_id: u64) -> Result<Project> {
        self.record(format!("get_project {project_id}"));
        self.projects
            .get(&project_id)
            .cloned()
            .ok_or(AppError::ProjectNotFound(project_id))
    }

    async fn list_merge_requests(&self, project_id: u64, page: u32) -> Result<Page<MergeRequest>> {
        self.record(format!("list_merge_requests {project_id} page {page}"));
        self.merge_request_pages
            .get(&page)
            .cloned()
            .ok_or_else(|| AppError::GitLabApi(format!("no page {page}")))
    }

    async fn list_discussions(
        &self,
        project_id: u64,
        merge_request_iid: u64,
        page: u32,
    ) -> Result<Page<Discussion>> {
        self.record(format!(
            "list_discussions {project_id}!{merge_request_iid} page {page}"
        ));
        Ok(self
            .discussion_pages
            .get(&(merge_request_iid, page))
            .cloned()
            .unwrap_or_else(|| Page {
                items: vec![],
                current_page: page,
                next_page: None,
            }))
    }

    async fn archive_project(&self, project_id: u64) -> Result<()> {
        self.record(format!("archive_project {project_id}"));
        if self.fail_archive {
            return Err(AppError::GitLabApi("403 Forbidden".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeDestination {
    pub existing: Mutex<Vec<Repository>>,
    /// Answers to successive import status polls. Once drained every poll reports `inProgress`.
    pub import_statuses: Mutex<VecDeque<Option<ImportRequest>>>,
    /// Pull requests with these titles are rejected.
    pub rejected_titles: Vec<String>,
    pub fail_thread_updates: bool,
    pub created_threads: Mutex<Vec<CommentThread>>,
    pub updated_threads: Mutex<Vec<(u64, CommentThread)>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeDestination {
    pub fn with_import_statuses(self, statuses: Vec<Option<ImportRequest>>) -> Self {
        *self.import_statuses.lock().unwrap() = statuses.into();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn polls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.starts_with("get_import_request"))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn repository(name: &str) -> Repository {
    Repository {
        id: format!("{name}-id"),
        name: name.to_string(),
        web_url: String::new(),
        ssh_url: format!("git@ssh.dev.azure.com:v3/org/proj/{name}"),
        remote_url: String::new(),
    }
}

#[async_trait]
impl DestinationPlatform for FakeDestination {
    async fn get_repository(&self, project: &str, name: &str) -> Result<Option<Repository>> {
        self.record(format!("get_repository {project}/{name}"));
        Ok(self
            .existing
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.name == name)
            .cloned())
    }

    async fn create_repository(&self, project: &str, name: &str) -> Result<Repository> {
        self.record(format!("create_repository {project}/{name}"));
        Ok(repository(name))
    }

    async fn delete_repository(&self, project: &str, repository_id: &str) -> Result<()> {
        self.record(format!("delete_repository {project}/{repository_id}"));
        self.existing
            .lock()
            .unwrap()
            .retain(|r| r.id != repository_id);
        Ok(())
    }

    async fn create_import_request(
        &self,
        _project: &str,
        repository_id: &str,
        request: &ImportRequestToCreate,
    ) -> Result<ImportRequest> {
        let source = &request.parameters;
        let via = source
            .service_endpoint_id
            .map(|id| format!(" via {id}"))
            .unwrap_or_default();
        self.record(format!(
            "create_import_request {repository_id} {}{via}",
            source.git_source.url
        ));
        Ok(ImportRequest {
            import_request_id: 7,
            status: ImportStatus::Queued,
            error_message: None,
        })
    }

    async fn get_import_request(
        &self,
        _project: &str,
        repository_id: &str,
        import_request_id: u64,
    ) -> Result<Option<ImportRequest>> {
        self.record(format!("get_import_request {repository_id} {import_request_id}"));
        Ok(self
            .import_statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| import_status(ImportStatus::InProgress)))
    }

    async fn create_pull_request(
        &self,
        _project: &str,
        repository_id: &str,
        pull_request: &PullRequestToCreate,
    ) -> Result<PullRequest> {
        self.record(format!(
            "create_pull_request {repository_id} {}",
            pull_request.title
        ));
        if self.rejected_titles.contains(&pull_request.title) {
            return Err(AppError::AzureDevOpsApi("409 Conflict".to_string()));
        }
        Ok(PullRequest {
            pull_request_id: 100 + self.calls().len() as u64,
            title: pull_request.title.clone(),
        })
    }

    async fn create_thread(
        &self,
        _project: &str,
        _repository_id: &str,
        pull_request_id: u64,
        thread: &CommentThread,
    ) -> Result<CreatedThread> {
        self.record(format!("create_thread {pull_request_id}"));
        let mut created = self.created_threads.lock().unwrap();
        created.push(thread.clone());
        Ok(CreatedThread {
            id: 500 + created.len() as u64,
        })
    }

    async fn update_thread(
        &self,
        _project: &str,
        _repository_id: &str,
        pull_request_id: u64,
        thread_id: u64,
        thread: &CommentThread,
    ) -> Result<()> {
        self.record(format!("update_thread {pull_request_id} {thread_id}"));
        if self.fail_thread_updates {
            return Err(AppError::AzureDevOpsApi("500 Internal Server Error".to_string()));
        }
        self.updated_threads
            .lock()
            .unwrap()
            .push((thread_id, thread.clone()));
        Ok(())
    }
}
