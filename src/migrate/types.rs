/// Counts collected while migrating the merge requests of one project.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReviewStats {
    pub pull_requests_created: usize,
    pub pull_requests_failed: usize,
    pub threads_created: usize,
    pub threads_failed: usize,
    /// Discussions with nothing to migrate (system notes).
    pub discussions_skipped: usize,
}

/// Outcome of migrating a single project.
#[derive(Debug)]
pub enum ProjectOutcome {
    /// Repository imported, reviews migrated when requested.
    Migrated {
        repository: String,
        reviews: Option<ReviewStats>,
        archived: bool,
    },
    /// Migration stopped with an error; later projects still run.
    Failed { error: String },
}

#[derive(Debug)]
pub struct ProjectReport {
    pub gitlab_id: u64,
    pub azdo_project: String,
    pub outcome: ProjectOutcome,
}

impl ProjectReport {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, ProjectOutcome::Migrated { .. })
    }
}

/// Result of a whole run, one report per listed project, in order.
#[derive(Debug, Default)]
pub struct MigrationSummary {
    pub reports: Vec<ProjectReport>,
}

impl MigrationSummary {
    pub fn succeeded(&self) -> usize {
        self.reports.iter().filter(|r| r.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.reports.len() - self.succeeded()
    }
}
