//! Command handlers. Every mutating handler runs the existence gates before
//! touching the store.

use std::path::Path;

use anyhow::Context as _;
use pipely::config::{PipelyConfig, default_config_path, write_config};
use pipely::model::{
    ApprovalUpdate, AssetUpdate, NewApproval, NewAsset, NewProject, NewSchedule, NewShot, NewTask,
    ProjectUpdate, ScheduleUpdate, ShotUpdate, TaskUpdate,
};
use pipely::output::{OutputMode, emit_success};
use pipely::status::{self, StatusSet};
use pipely::storage::{AssetFilter, PurgeScope};
use pipely::ui::{self, TableBuilder, opt_cell, stats_table};
use pipely::{DbLocation, EntityKind, Error, SqliteStore};
use serde_json::json;

use crate::{ApproveAction, AssetAction, ProjectAction, ScheduleAction, ShotAction, TaskAction};

/// An initialized store plus how results are printed
pub struct Context {
    pub store: SqliteStore,
    pub mode: OutputMode,
}

impl Context {
    /// Resolve, create and migrate the database before any command runs.
    pub fn open(location: &DbLocation, explicit: Option<&Path>, mode: OutputMode) -> anyhow::Result<Self> {
        let (store, _) = pipely::storage::init(location, explicit)?;
        Ok(Self { store, mode })
    }

    fn human(&self) -> bool {
        self.mode.is_human()
    }
}

fn check_status(set: &StatusSet, value: Option<&str>) -> pipely::Result<()> {
    match value {
        Some(v) => set.validate(v),
        None => Ok(()),
    }
}

fn require_changed(changed: bool) -> pipely::Result<()> {
    if changed { Ok(()) } else { Err(Error::NoUpdates) }
}

fn deleted_payload(kind: EntityKind, id: i64) -> serde_json::Value {
    json!({ "kind": kind, "id": id, "deleted": true })
}

// ========== db / config ==========

pub fn run_config_init(mode: OutputMode, path: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    let config = PipelyConfig {
        database: Some("~/.pipely/pipely.db".to_string()),
    };
    write_config(&path, &config, force)?;

    if mode.is_human() {
        ui::success(&format!("Wrote config to {}.", path.display()));
    } else {
        emit_success(mode, "config.init", json!({ "path": path, "config": config }))?;
    }
    Ok(())
}

pub fn run_db_init(mode: OutputMode, location: &DbLocation, explicit: Option<&Path>) -> anyhow::Result<()> {
    let (store, applied) = pipely::storage::init(location, explicit)?;
    let path = store.path().display().to_string();

    if mode.is_human() {
        if applied > 0 {
            ui::success(&format!("Initialized database at {path} (applied {applied} migration(s))."));
        } else {
            ui::success(&format!("Database ready at {path}."));
        }
    } else {
        let data = json!({
            "path": path,
            "applied": applied,
            "version": store.schema_version()?,
        });
        emit_success(mode, "db.init", data)?;
    }
    Ok(())
}

pub fn run_db_path(mode: OutputMode, location: &DbLocation, explicit: Option<&Path>) -> anyhow::Result<()> {
    let path = location.resolve(explicit);
    if mode.is_human() {
        println!("{}", path.display());
    } else {
        emit_success(mode, "db.path", json!({ "path": path }))?;
    }
    Ok(())
}

pub fn run_db_version(ctx: &Context) -> anyhow::Result<()> {
    let version = ctx.store.schema_version()?;
    if ctx.human() {
        ui::info("Schema version", &version.to_string());
    } else {
        emit_success(ctx.mode, "db.version", json!({ "version": version }))?;
    }
    Ok(())
}

// ========== project ==========

pub fn run_project(ctx: &Context, action: ProjectAction) -> anyhow::Result<()> {
    let store = &ctx.store;
    match action {
        ProjectAction::Add { name, code } => {
            let input = NewProject { name, code };
            let id = store.create_project(&input)?;
            if ctx.human() {
                ui::added(&format!("Added project #{id}: {} ({})", input.name, input.code));
            } else {
                emit_success(ctx.mode, "project.add", store.get_project(id)?)?;
            }
        }
        ProjectAction::List => {
            let projects = store.list_projects()?;
            if !ctx.human() {
                emit_success(ctx.mode, "project.list", &projects)?;
            } else if projects.is_empty() {
                ui::empty("No projects yet.");
            } else {
                let mut table = TableBuilder::new(["ID", "NAME", "CODE"]);
                for p in &projects {
                    table.add_row([p.id.to_string(), p.name.clone(), p.code.clone()]);
                }
                println!("{}", table.build());
            }
        }
        ProjectAction::Show { project_id } => {
            let project = store
                .get_project(project_id)?
                .ok_or(Error::NotFound {
                    kind: EntityKind::Project,
                    id: project_id,
                })?;
            if ctx.human() {
                let shots = store.list_shots(Some(project_id))?.len();
                let assets = store.list_assets(AssetFilter::project(project_id))?.len();
                println!(
                    "{}",
                    stats_table(&[
                        ("ID", project.id.to_string()),
                        ("Name", project.name.clone()),
                        ("Code", project.code.clone()),
                        ("Created", project.created_at.clone()),
                        ("Shots", shots.to_string()),
                        ("Assets", assets.to_string()),
                    ])
                );
            } else {
                emit_success(ctx.mode, "project.show", project)?;
            }
        }
        ProjectAction::Update {
            project_id,
            name,
            code,
        } => {
            store.require_project(project_id)?;
            let update = ProjectUpdate { name, code };
            require_changed(store.update_project(project_id, update)?)?;
            if ctx.human() {
                ui::updated(&format!("Updated project #{project_id}."));
            } else {
                emit_success(ctx.mode, "project.update", store.get_project(project_id)?)?;
            }
        }
        ProjectAction::Delete { project_id } => {
            store.require_project(project_id)?;
            store.delete_project(project_id)?;
            if ctx.human() {
                ui::deleted(&format!("Deleted project #{project_id}."));
            } else {
                emit_success(ctx.mode, "project.delete", deleted_payload(EntityKind::Project, project_id))?;
            }
        }
        ProjectAction::Purge(args) => {
            let scope = match args.project_id {
                Some(id) if !args.all => {
                    store.require_project(id)?;
                    PurgeScope::Project(id)
                }
                _ => PurgeScope::All,
            };
            let report = store.purge(scope)?;
            if ctx.human() {
                ui::deleted(&format!("{report}."));
            } else {
                emit_success(ctx.mode, "project.purge", report)?;
            }
        }
    }
    Ok(())
}

// ========== shot ==========

pub fn run_shot(ctx: &Context, action: ShotAction) -> anyhow::Result<()> {
    let store = &ctx.store;
    match action {
        ShotAction::Add {
            project_id,
            code,
            name,
        } => {
            let project = store.require_project(project_id)?;
            let id = store.create_shot(&NewShot::new(project, code.as_str(), name.as_str()))?;
            if ctx.human() {
                ui::added(&format!("Added shot #{id} to project #{project_id}: {name} ({code})"));
            } else {
                emit_success(ctx.mode, "shot.add", store.get_shot(id)?)?;
            }
        }
        ShotAction::List { project_id } => {
            let shots = store.list_shots(project_id)?;
            if !ctx.human() {
                emit_success(ctx.mode, "shot.list", &shots)?;
            } else if shots.is_empty() {
                ui::empty("No shots yet.");
            } else {
                let mut table = TableBuilder::new(["ID", "PROJECT", "CODE", "NAME"]);
                for s in &shots {
                    table.add_row([
                        s.id.to_string(),
                        s.project_id.to_string(),
                        s.code.clone(),
                        s.name.clone(),
                    ]);
                }
                println!("{}", table.build());
            }
        }
        ShotAction::Update {
            shot_id,
            project_id,
            code,
            name,
        } => {
            store.require_shot(shot_id)?;
            let project = project_id.map(|id| store.require_project(id)).transpose()?;
            let update = ShotUpdate { project, code, name };
            require_changed(store.update_shot(shot_id, update)?)?;
            if ctx.human() {
                ui::updated(&format!("Updated shot #{shot_id}."));
            } else {
                emit_success(ctx.mode, "shot.update", store.get_shot(shot_id)?)?;
            }
        }
        ShotAction::Delete { shot_id } => {
            store.require_shot(shot_id)?;
            store.delete_shot(shot_id)?;
            if ctx.human() {
                ui::deleted(&format!("Deleted shot #{shot_id}."));
            } else {
                emit_success(ctx.mode, "shot.delete", deleted_payload(EntityKind::Shot, shot_id))?;
            }
        }
    }
    Ok(())
}

// ========== asset ==========

pub fn run_asset(ctx: &Context, action: AssetAction) -> anyhow::Result<()> {
    let store = &ctx.store;
    match action {
        AssetAction::Add {
            name,
            asset_type,
            status,
            project_id,
            shot_id,
        } => {
            let project = project_id.map(|id| store.require_project(id)).transpose()?;
            let shot = shot_id.map(|id| store.require_shot(id)).transpose()?;
            let status = status.unwrap_or_else(|| status::ASSET.default_value().to_string());
            status::ASSET.validate(&status)?;

            let mut input = NewAsset::new(name.as_str(), asset_type.as_str()).with_status(status.as_str());
            input.project = project;
            input.shot = shot;
            let id = store.create_asset(&input)?;

            if ctx.human() {
                let location = if project_id.is_some() || shot_id.is_some() {
                    format!(" [project {}, shot {}]", opt_cell(project_id), opt_cell(shot_id))
                } else {
                    String::new()
                };
                ui::added(&format!("Added asset #{id}: {name} ({asset_type}, {status}){location}"));
            } else {
                emit_success(ctx.mode, "asset.add", store.get_asset(id)?)?;
            }
        }
        AssetAction::List { project_id, shot_id } => {
            let assets = store.list_assets(AssetFilter { project_id, shot_id })?;
            if !ctx.human() {
                emit_success(ctx.mode, "asset.list", &assets)?;
            } else if assets.is_empty() {
                ui::empty("No assets yet.");
            } else {
                let mut table = TableBuilder::new(["ID", "PROJECT", "SHOT", "NAME", "TYPE", "STATUS"]);
                for a in &assets {
                    table.add_row([
                        a.id.to_string(),
                        opt_cell(a.project_id),
                        opt_cell(a.shot_id),
                        a.name.clone(),
                        a.asset_type.clone(),
                        a.status.clone(),
                    ]);
                }
                println!("{}", table.build());
            }
        }
        AssetAction::Update {
            asset_id,
            name,
            asset_type,
            status,
            project_id,
            shot_id,
        } => {
            store.require_asset(asset_id)?;
            let project = project_id.map(|id| store.require_project(id)).transpose()?;
            let shot = shot_id.map(|id| store.require_shot(id)).transpose()?;
            check_status(&status::ASSET, status.as_deref())?;

            let update = AssetUpdate {
                name,
                asset_type,
                status,
                project,
                shot,
            };
            require_changed(store.update_asset(asset_id, update)?)?;
            if ctx.human() {
                ui::updated(&format!("Updated asset #{asset_id}."));
            } else {
                emit_success(ctx.mode, "asset.update", store.get_asset(asset_id)?)?;
            }
        }
        AssetAction::Delete { asset_id } => {
            store.require_asset(asset_id)?;
            store.delete_asset(asset_id)?;
            if ctx.human() {
                ui::deleted(&format!("Deleted asset #{asset_id}."));
            } else {
                emit_success(ctx.mode, "asset.delete", deleted_payload(EntityKind::Asset, asset_id))?;
            }
        }
    }
    Ok(())
}

// ========== task ==========

pub fn run_task(ctx: &Context, action: TaskAction) -> anyhow::Result<()> {
    let store = &ctx.store;
    match action {
        TaskAction::Add {
            asset_id,
            name,
            status,
            assignee,
            due,
        } => {
            let asset = store.require_asset(asset_id)?;
            let status = status.unwrap_or_else(|| status::TASK.default_value().to_string());
            status::TASK.validate(&status)?;

            let mut input = NewTask::new(asset, name.as_str());
            input.status = status.clone();
            input.assignee = assignee.clone();
            input.due_date = due.clone();
            let id = store.create_task(&input)?;

            if ctx.human() {
                let assignee_label = assignee.map(|a| format!(", {a}")).unwrap_or_default();
                let due_label = due.map(|d| format!(", due {d}")).unwrap_or_default();
                ui::added(&format!(
                    "Added task #{id} for asset #{asset_id}: {name} ({status}{assignee_label}{due_label})"
                ));
            } else {
                emit_success(ctx.mode, "task.add", store.get_task(id)?)?;
            }
        }
        TaskAction::List { asset_id } => {
            let tasks = store.list_tasks(asset_id)?;
            if !ctx.human() {
                emit_success(ctx.mode, "task.list", &tasks)?;
            } else if tasks.is_empty() {
                ui::empty("No tasks yet.");
            } else {
                let mut table = TableBuilder::new(["ID", "ASSET", "NAME", "STATUS", "ASSIGNEE", "DUE"]);
                for t in &tasks {
                    table.add_row([
                        t.id.to_string(),
                        t.asset_id.to_string(),
                        t.name.clone(),
                        t.status.clone(),
                        opt_cell(t.assignee.as_deref()),
                        opt_cell(t.due_date.as_deref()),
                    ]);
                }
                println!("{}", table.build());
            }
        }
        TaskAction::Update {
            task_id,
            asset_id,
            name,
            status,
            assignee,
            due,
        } => {
            store.require(EntityKind::Task, task_id)?;
            let asset = asset_id.map(|id| store.require_asset(id)).transpose()?;
            check_status(&status::TASK, status.as_deref())?;

            let update = TaskUpdate {
                asset,
                name,
                status,
                assignee,
                due_date: due,
            };
            require_changed(store.update_task(task_id, update)?)?;
            if ctx.human() {
                ui::updated(&format!("Updated task #{task_id}."));
            } else {
                emit_success(ctx.mode, "task.update", store.get_task(task_id)?)?;
            }
        }
        TaskAction::Delete { task_id } => {
            store.require(EntityKind::Task, task_id)?;
            store.delete_task(task_id)?;
            if ctx.human() {
                ui::deleted(&format!("Deleted task #{task_id}."));
            } else {
                emit_success(ctx.mode, "task.delete", deleted_payload(EntityKind::Task, task_id))?;
            }
        }
    }
    Ok(())
}

// ========== approve ==========

pub fn run_approve(ctx: &Context, action: ApproveAction) -> anyhow::Result<()> {
    let store = &ctx.store;
    match action {
        ApproveAction::Set {
            asset_id,
            status,
            note,
        } => {
            let asset = store.require_asset(asset_id)?;
            status::APPROVAL.validate(&status)?;

            let mut input = NewApproval::new(asset, status.as_str());
            input.note = note;
            let id = store.create_approval(&input)?;
            if ctx.human() {
                ui::added(&format!("Recorded approval #{id} for asset #{asset_id} ({status})"));
            } else {
                emit_success(ctx.mode, "approve.set", store.get_approval(id)?)?;
            }
        }
        ApproveAction::List { asset_id } => {
            let approvals = store.list_approvals(asset_id)?;
            if !ctx.human() {
                emit_success(ctx.mode, "approve.list", &approvals)?;
            } else if approvals.is_empty() {
                ui::empty("No approvals yet.");
            } else {
                let mut table = TableBuilder::new(["ID", "ASSET", "STATUS", "NOTE"]);
                for a in &approvals {
                    table.add_row([
                        a.id.to_string(),
                        a.asset_id.to_string(),
                        a.status.clone(),
                        a.note.clone().unwrap_or_default(),
                    ]);
                }
                println!("{}", table.build());
            }
        }
        ApproveAction::Update {
            approval_id,
            asset_id,
            status,
            note,
        } => {
            store.require(EntityKind::Approval, approval_id)?;
            let asset = asset_id.map(|id| store.require_asset(id)).transpose()?;
            check_status(&status::APPROVAL, status.as_deref())?;

            let update = ApprovalUpdate { asset, status, note };
            require_changed(store.update_approval(approval_id, update)?)?;
            if ctx.human() {
                ui::updated(&format!("Updated approval #{approval_id}."));
            } else {
                emit_success(ctx.mode, "approve.update", store.get_approval(approval_id)?)?;
            }
        }
        ApproveAction::Delete { approval_id } => {
            store.require(EntityKind::Approval, approval_id)?;
            store.delete_approval(approval_id)?;
            if ctx.human() {
                ui::deleted(&format!("Deleted approval #{approval_id}."));
            } else {
                emit_success(
                    ctx.mode,
                    "approve.delete",
                    deleted_payload(EntityKind::Approval, approval_id),
                )?;
            }
        }
    }
    Ok(())
}

// ========== schedule ==========

pub fn run_schedule(ctx: &Context, action: ScheduleAction) -> anyhow::Result<()> {
    let store = &ctx.store;
    match action {
        ScheduleAction::Add {
            asset_id,
            task,
            due,
            status,
        } => {
            let asset = store.require_asset(asset_id)?;
            let status = status.unwrap_or_else(|| status::SCHEDULE.default_value().to_string());
            status::SCHEDULE.validate(&status)?;

            let mut input = NewSchedule::new(asset, task.as_str(), due.as_str());
            input.status = status.clone();
            let id = store.create_schedule(&input)?;
            if ctx.human() {
                ui::added(&format!(
                    "Added schedule #{id} for asset #{asset_id}: {task} due {due} ({status})"
                ));
            } else {
                emit_success(ctx.mode, "schedule.add", store.get_schedule(id)?)?;
            }
        }
        ScheduleAction::List { asset_id } => {
            let schedules = store.list_schedules(asset_id)?;
            if !ctx.human() {
                emit_success(ctx.mode, "schedule.list", &schedules)?;
            } else if schedules.is_empty() {
                ui::empty("No schedule items yet.");
            } else {
                let mut table = TableBuilder::new(["ID", "ASSET", "TASK", "DUE", "STATUS"]);
                for s in &schedules {
                    table.add_row([
                        s.id.to_string(),
                        s.asset_id.to_string(),
                        s.task.clone(),
                        s.due_date.clone(),
                        s.status.clone(),
                    ]);
                }
                println!("{}", table.build());
            }
        }
        ScheduleAction::Update {
            schedule_id,
            asset_id,
            task,
            due,
            status,
        } => {
            store.require(EntityKind::Schedule, schedule_id)?;
            let asset = asset_id.map(|id| store.require_asset(id)).transpose()?;
            check_status(&status::SCHEDULE, status.as_deref())?;

            let update = ScheduleUpdate {
                asset,
                task,
                due_date: due,
                status,
            };
            require_changed(store.update_schedule(schedule_id, update)?)?;
            if ctx.human() {
                ui::updated(&format!("Updated schedule #{schedule_id}."));
            } else {
                emit_success(ctx.mode, "schedule.update", store.get_schedule(schedule_id)?)?;
            }
        }
        ScheduleAction::Delete { schedule_id } => {
            store.require(EntityKind::Schedule, schedule_id)?;
            store.delete_schedule(schedule_id)?;
            if ctx.human() {
                ui::deleted(&format!("Deleted schedule #{schedule_id}."));
            } else {
                emit_success(
                    ctx.mode,
                    "schedule.delete",
                    deleted_payload(EntityKind::Schedule, schedule_id),
                )?;
            }
        }
    }
    Ok(())
}

// ========== report ==========

pub fn run_report_summary(ctx: &Context) -> anyhow::Result<()> {
    let summary = ctx
        .store
        .summary()
        .with_context(|| format!("reading {}", ctx.store.path().display()))?;

    if !ctx.human() {
        emit_success(ctx.mode, "report.summary", &summary)?;
        return Ok(());
    }

    println!("{} {}", ui::Icons::STATS, summary);
    if !summary.asset_status.is_empty() {
        ui::section("Assets by status");
        for (status, count) in &summary.asset_status {
            ui::summary_row(&format!("{status}:"), &count.to_string());
        }
    }
    if !summary.task_status.is_empty() {
        ui::section("Tasks by status");
        for (status, count) in &summary.task_status {
            ui::summary_row(&format!("{status}:"), &count.to_string());
        }
    }
    Ok(())
}
