//! Entity types stored in the production database.
//!
//! Rows come back from the repositories as plain structs. Inputs to
//! `create_*` are the `New*` structs and inputs to `update_*` are the
//! `*Update` structs, where every `None` field is left untouched.
//!
//! Parent references in inputs are typed handles (`ProjectRef`, `ShotRef`,
//! `AssetRef`). Only the existence gates on `SqliteStore` hand them out, so
//! a caller cannot attach a child to an id it never checked.

use serde::{Deserialize, Serialize};

/// The six kinds of rows Pipely tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Project,
    Shot,
    Asset,
    Task,
    Approval,
    Schedule,
}

impl EntityKind {
    /// Get the string representation of the entity kind
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Project => "project",
            EntityKind::Shot => "shot",
            EntityKind::Asset => "asset",
            EntityKind::Task => "task",
            EntityKind::Approval => "approval",
            EntityKind::Schedule => "schedule",
        }
    }

    /// Capitalized name used in user-facing messages
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Project => "Project",
            EntityKind::Shot => "Shot",
            EntityKind::Asset => "Asset",
            EntityKind::Task => "Task",
            EntityKind::Approval => "Approval",
            EntityKind::Schedule => "Schedule",
        }
    }

    /// Backing table name
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Project => "projects",
            EntityKind::Shot => "shots",
            EntityKind::Asset => "assets",
            EntityKind::Task => "tasks",
            EntityKind::Approval => "approvals",
            EntityKind::Schedule => "schedules",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ========== Parent handles ==========

/// A project id that passed the existence gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectRef(i64);

/// A shot id that passed the existence gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShotRef(i64);

/// An asset id that passed the existence gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetRef(i64);

impl ProjectRef {
    pub(crate) fn verified(id: i64) -> Self {
        Self(id)
    }

    pub fn id(self) -> i64 {
        self.0
    }
}

impl ShotRef {
    pub(crate) fn verified(id: i64) -> Self {
        Self(id)
    }

    pub fn id(self) -> i64 {
        self.0
    }
}

impl AssetRef {
    pub(crate) fn verified(id: i64) -> Self {
        Self(id)
    }

    pub fn id(self) -> i64 {
        self.0
    }
}

// ========== Rows ==========

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub id: i64,
    pub project_id: i64,
    pub code: String,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: i64,
    pub name: String,
    pub asset_type: String,
    pub status: String,
    pub created_at: String,
    pub project_id: Option<i64>,
    pub shot_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub asset_id: i64,
    pub name: String,
    pub status: String,
    pub assignee: Option<String>,
    pub due_date: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Approval {
    pub id: i64,
    pub asset_id: i64,
    pub status: String,
    pub note: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: i64,
    pub asset_id: i64,
    pub task: String,
    pub due_date: String,
    pub status: String,
    pub created_at: String,
}

// ========== Create inputs ==========

#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub code: String,
}

impl NewProject {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewShot {
    pub project: ProjectRef,
    pub code: String,
    pub name: String,
}

impl NewShot {
    pub fn new(project: ProjectRef, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            project,
            code: code.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewAsset {
    pub name: String,
    pub asset_type: String,
    pub status: String,
    pub project: Option<ProjectRef>,
    pub shot: Option<ShotRef>,
}

impl NewAsset {
    /// Asset with no project or shot, using the default asset status
    pub fn new(name: impl Into<String>, asset_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            asset_type: asset_type.into(),
            status: crate::status::ASSET.default_value().to_string(),
            project: None,
            shot: None,
        }
    }

    pub fn in_project(mut self, project: ProjectRef) -> Self {
        self.project = Some(project);
        self
    }

    pub fn in_shot(mut self, shot: ShotRef) -> Self {
        self.shot = Some(shot);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub asset: AssetRef,
    pub name: String,
    pub status: String,
    pub assignee: Option<String>,
    pub due_date: Option<String>,
}

impl NewTask {
    pub fn new(asset: AssetRef, name: impl Into<String>) -> Self {
        Self {
            asset,
            name: name.into(),
            status: crate::status::TASK.default_value().to_string(),
            assignee: None,
            due_date: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewApproval {
    pub asset: AssetRef,
    pub status: String,
    pub note: Option<String>,
}

impl NewApproval {
    pub fn new(asset: AssetRef, status: impl Into<String>) -> Self {
        Self {
            asset,
            status: status.into(),
            note: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewSchedule {
    pub asset: AssetRef,
    pub task: String,
    pub due_date: String,
    pub status: String,
}

impl NewSchedule {
    pub fn new(asset: AssetRef, task: impl Into<String>, due_date: impl Into<String>) -> Self {
        Self {
            asset,
            task: task.into(),
            due_date: due_date.into(),
            status: crate::status::SCHEDULE.default_value().to_string(),
        }
    }
}

// ========== Partial updates ==========

#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ShotUpdate {
    pub project: Option<ProjectRef>,
    pub code: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AssetUpdate {
    pub name: Option<String>,
    pub asset_type: Option<String>,
    pub status: Option<String>,
    pub project: Option<ProjectRef>,
    pub shot: Option<ShotRef>,
}

#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub asset: Option<AssetRef>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ApprovalUpdate {
    pub asset: Option<AssetRef>,
    pub status: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleUpdate {
    pub asset: Option<AssetRef>,
    pub task: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<String>,
}
