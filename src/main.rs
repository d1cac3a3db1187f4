//! Pipely CLI - local production tracking from the command line

mod commands;

use clap::{Args, Parser, Subcommand};
use pipely::DbLocation;
use pipely::output::{OutputMode, emit_error};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "pipely")]
#[command(version)]
#[command(about = "Track projects, shots, assets, tasks, approvals and schedules in one local database")]
#[command(long_about = r#"
Pipely keeps a small production database on disk:
  • Projects and their shots
  • Assets, optionally placed in a project and shot
  • Tasks, approvals and schedule items per asset

Example usage:
  pipely project add --name Film --code FILM
  pipely shot add --project-id 1 --code S010 --name Opening
  pipely asset add --name Hero --type character --project-id 1 --shot-id 1
  pipely report summary
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Database path (defaults to ~/.pipely/pipely.db)
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Config file (defaults to ~/.pipely/pipely.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Local database setup and status
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Manage projects
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Manage shots within projects
    Shot {
        #[command(subcommand)]
        action: ShotAction,
    },

    /// Track assets
    Asset {
        #[command(subcommand)]
        action: AssetAction,
    },

    /// Track tasks per asset
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Record approvals for assets
    Approve {
        #[command(subcommand)]
        action: ApproveAction,
    },

    /// Track schedule items per asset
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },

    /// Production reports
    Report {
        #[command(subcommand)]
        action: ReportAction,
    },
}

#[derive(Subcommand)]
pub enum DbAction {
    /// Create the database and apply pending migrations
    Init,
    /// Print the resolved database path
    Path,
    /// Print the schema version
    Version,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Add a project
    Add {
        /// Project name
        #[arg(short, long)]
        name: String,
        /// Short project code
        #[arg(short, long)]
        code: String,
    },
    /// List projects
    List,
    /// Show one project
    Show {
        #[arg(short, long)]
        project_id: i64,
    },
    /// Update project fields
    Update {
        #[arg(short, long)]
        project_id: i64,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        code: Option<String>,
    },
    /// Delete a project row (shots and assets are kept)
    Delete {
        #[arg(short, long)]
        project_id: i64,
    },
    /// Delete projects with every shot, asset, task, approval and schedule under them
    Purge(PurgeArgs),
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct PurgeArgs {
    /// Project to purge
    #[arg(short, long)]
    pub project_id: Option<i64>,
    /// Purge every project
    #[arg(long)]
    pub all: bool,
}

#[derive(Subcommand)]
pub enum ShotAction {
    /// Add a shot to a project
    Add {
        #[arg(short, long)]
        project_id: i64,
        /// Shot code (e.g. S010)
        #[arg(short, long)]
        code: String,
        #[arg(short, long)]
        name: String,
    },
    /// List shots
    List {
        /// Filter by project ID
        #[arg(short, long)]
        project_id: Option<i64>,
    },
    /// Update shot fields
    Update {
        #[arg(short, long)]
        shot_id: i64,
        #[arg(short, long)]
        project_id: Option<i64>,
        #[arg(short, long)]
        code: Option<String>,
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Delete a shot
    Delete {
        #[arg(short, long)]
        shot_id: i64,
    },
}

#[derive(Subcommand)]
pub enum AssetAction {
    /// Add an asset
    Add {
        #[arg(short, long)]
        name: String,
        /// Asset type (character/prop/env/etc)
        #[arg(short = 't', long = "type")]
        asset_type: String,
        #[arg(short, long)]
        status: Option<String>,
        #[arg(short, long)]
        project_id: Option<i64>,
        #[arg(long)]
        shot_id: Option<i64>,
    },
    /// List assets
    List {
        #[arg(short, long)]
        project_id: Option<i64>,
        #[arg(long)]
        shot_id: Option<i64>,
    },
    /// Update asset fields
    Update {
        #[arg(short, long)]
        asset_id: i64,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short = 't', long = "type")]
        asset_type: Option<String>,
        #[arg(short, long)]
        status: Option<String>,
        #[arg(short, long)]
        project_id: Option<i64>,
        #[arg(long)]
        shot_id: Option<i64>,
    },
    /// Delete an asset (its tasks, approvals and schedules are kept)
    Delete {
        #[arg(short, long)]
        asset_id: i64,
    },
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task to an asset
    Add {
        #[arg(short, long)]
        asset_id: i64,
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        status: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },
    /// List tasks
    List {
        #[arg(short, long)]
        asset_id: Option<i64>,
    },
    /// Update task fields
    Update {
        #[arg(short, long)]
        task_id: i64,
        #[arg(short, long)]
        asset_id: Option<i64>,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        status: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long)]
        due: Option<String>,
    },
    /// Delete a task
    Delete {
        #[arg(short, long)]
        task_id: i64,
    },
}

#[derive(Subcommand)]
pub enum ApproveAction {
    /// Record an approval decision for an asset
    Set {
        #[arg(short, long)]
        asset_id: i64,
        /// approved, rejected or needs_changes
        #[arg(short, long)]
        status: String,
        #[arg(long)]
        note: Option<String>,
    },
    /// List approvals
    List {
        #[arg(short, long)]
        asset_id: Option<i64>,
    },
    /// Update an approval
    Update {
        #[arg(long)]
        approval_id: i64,
        #[arg(short, long)]
        asset_id: Option<i64>,
        #[arg(short, long)]
        status: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Delete an approval
    Delete {
        #[arg(long)]
        approval_id: i64,
    },
}

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Add a schedule item for an asset
    Add {
        #[arg(short, long)]
        asset_id: i64,
        /// Task label
        #[arg(short, long)]
        task: String,
        /// Due date (YYYY-MM-DD)
        #[arg(short, long)]
        due: String,
        #[arg(short, long)]
        status: Option<String>,
    },
    /// List schedule items, soonest first
    List {
        #[arg(short, long)]
        asset_id: Option<i64>,
    },
    /// Update a schedule item
    Update {
        #[arg(long)]
        schedule_id: i64,
        #[arg(short, long)]
        asset_id: Option<i64>,
        #[arg(short, long)]
        task: Option<String>,
        #[arg(short, long)]
        due: Option<String>,
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Delete a schedule item
    Delete {
        #[arg(long)]
        schedule_id: i64,
    },
}

#[derive(Subcommand)]
pub enum ReportAction {
    /// Entity totals and status breakdowns
    Summary,
}

impl Commands {
    /// Dotted command name used in the JSON envelope
    fn name(&self) -> &'static str {
        match self {
            Commands::Db { action } => match action {
                DbAction::Init => "db.init",
                DbAction::Path => "db.path",
                DbAction::Version => "db.version",
            },
            Commands::Config { .. } => "config.init",
            Commands::Project { action } => match action {
                ProjectAction::Add { .. } => "project.add",
                ProjectAction::List => "project.list",
                ProjectAction::Show { .. } => "project.show",
                ProjectAction::Update { .. } => "project.update",
                ProjectAction::Delete { .. } => "project.delete",
                ProjectAction::Purge(_) => "project.purge",
            },
            Commands::Shot { action } => match action {
                ShotAction::Add { .. } => "shot.add",
                ShotAction::List { .. } => "shot.list",
                ShotAction::Update { .. } => "shot.update",
                ShotAction::Delete { .. } => "shot.delete",
            },
            Commands::Asset { action } => match action {
                AssetAction::Add { .. } => "asset.add",
                AssetAction::List { .. } => "asset.list",
                AssetAction::Update { .. } => "asset.update",
                AssetAction::Delete { .. } => "asset.delete",
            },
            Commands::Task { action } => match action {
                TaskAction::Add { .. } => "task.add",
                TaskAction::List { .. } => "task.list",
                TaskAction::Update { .. } => "task.update",
                TaskAction::Delete { .. } => "task.delete",
            },
            Commands::Approve { action } => match action {
                ApproveAction::Set { .. } => "approve.set",
                ApproveAction::List { .. } => "approve.list",
                ApproveAction::Update { .. } => "approve.update",
                ApproveAction::Delete { .. } => "approve.delete",
            },
            Commands::Schedule { action } => match action {
                ScheduleAction::Add { .. } => "schedule.add",
                ScheduleAction::List { .. } => "schedule.list",
                ScheduleAction::Update { .. } => "schedule.update",
                ScheduleAction::Delete { .. } => "schedule.delete",
            },
            Commands::Report { .. } => "report.summary",
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stay quiet by default so command output is clean
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mode = OutputMode::from_json_flag(cli.json);
    let command_name = cli.command.name();

    if let Err(err) = run(cli, mode) {
        tracing::debug!(command = command_name, "Command failed: {:?}", err);
        let message = format!("{err:#}");
        if mode.is_human() {
            pipely::ui::error(&message);
        } else {
            emit_error(command_name, &message)?;
        }
        std::process::exit(1);
    }
    Ok(())
}

fn run(cli: Cli, mode: OutputMode) -> anyhow::Result<()> {
    let Cli {
        command, db, config, ..
    } = cli;
    let config_path = config.as_deref();
    let explicit = db.as_deref();

    let location = || -> anyhow::Result<DbLocation> {
        let config = pipely::config::load_config(config_path)?;
        Ok(DbLocation::from_env(config.as_ref())?)
    };
    let open = || commands::Context::open(&location()?, explicit, mode);

    match command {
        Commands::Config { action } => match action {
            ConfigAction::Init { force } => commands::run_config_init(mode, config_path, force),
        },
        Commands::Db { action } => match action {
            DbAction::Init => commands::run_db_init(mode, &location()?, explicit),
            DbAction::Path => commands::run_db_path(mode, &location()?, explicit),
            DbAction::Version => commands::run_db_version(&open()?),
        },
        Commands::Project { action } => commands::run_project(&open()?, action),
        Commands::Shot { action } => commands::run_shot(&open()?, action),
        Commands::Asset { action } => commands::run_asset(&open()?, action),
        Commands::Task { action } => commands::run_task(&open()?, action),
        Commands::Approve { action } => commands::run_approve(&open()?, action),
        Commands::Schedule { action } => commands::run_schedule(&open()?, action),
        Commands::Report { action } => match action {
            ReportAction::Summary => commands::run_report_summary(&open()?),
        },
    }
}
