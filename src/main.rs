use clap::{ArgAction, Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gitlab_to_azdo::config::{ProjectsFile, Settings, SettingsOverrides};
use gitlab_to_azdo::migrate::Migrator;
use gitlab_to_azdo::platform::azdo::AzureDevOpsClient;
use gitlab_to_azdo::platform::gitlab::GitLabClient;

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "gitlab-to-azdo",
    version,
    about = "Migrate GitLab projects, merge requests and discussions to Azure DevOps"
)]
struct Cli {
    /// GitLab API token
    #[arg(long)]
    gitlab_token: Option<String>,

    /// GitLab base URL, for self-hosted instances
    #[arg(long)]
    gitlab_url: Option<String>,

    /// Azure DevOps organization URL, e.g. https://dev.azure.com/my-org
    #[arg(long)]
    azdo_org: Option<String>,

    /// Azure DevOps personal access token
    #[arg(long)]
    azdo_token: Option<String>,

    /// Service endpoint id used to import private repositories
    #[arg(long)]
    azdo_endpoint: Option<String>,

    /// JSON file listing the projects to migrate
    #[arg(long)]
    config: Option<String>,

    /// Delete existing Azure DevOps repositories and create them again. Use with caution
    #[arg(long)]
    recreate_repo: bool,

    /// Archive GitLab projects once migrated
    #[arg(long, action = ArgAction::Set, value_name = "BOOL")]
    archive_projects: Option<bool>,

    /// Optional settings file (TOML, YAML or JSON)
    #[arg(long)]
    settings: Option<String>,

    /// Seconds between import status checks
    #[arg(long, value_name = "SECONDS")]
    poll_interval: Option<u64>,

    /// Give up waiting for an import after this many seconds, 0 waits forever
    #[arg(long, value_name = "SECONDS")]
    import_timeout: Option<u64>,

    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,
}

impl Cli {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            gitlab_url: self.gitlab_url.clone(),
            gitlab_token: self.gitlab_token.clone(),
            azdo_org: self.azdo_org.clone(),
            azdo_token: self.azdo_token.clone(),
            azdo_endpoint: self.azdo_endpoint.clone(),
            projects_file: self.config.clone(),
            // An absent switch must not mask a settings file or environment value.
            recreate_repo: self.recreate_repo.then_some(true),
            archive_projects: self.archive_projects,
            poll_interval_secs: self.poll_interval,
            import_timeout_secs: self.import_timeout,
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let settings = Settings::load(cli.settings.as_deref(), &cli.overrides())?;
    tracing::debug!(?settings, "Settings loaded");

    let projects = ProjectsFile::load(&settings.projects_file)?.projects;
    tracing::info!(
        count = projects.len(),
        file = %settings.projects_file.display(),
        "Loaded project list"
    );

    let gitlab = GitLabClient::new(&settings.gitlab_url, &settings.gitlab_token)?;
    let username = gitlab.verify_token().await?;
    tracing::info!(%username, url = %settings.gitlab_url, "Connected to GitLab");

    let azdo = AzureDevOpsClient::new(&settings.azdo_org, &settings.azdo_token)?;
    azdo.verify_connection().await?;
    tracing::info!(organization = %settings.azdo_org, "Connected to Azure DevOps");

    let migrator = Migrator::new(gitlab, azdo, settings);
    let summary = migrator.run(&projects).await;

    tracing::info!(
        succeeded = summary.succeeded(),
        failed = summary.failed(),
        "Migration finished"
    );

    Ok(())
}
