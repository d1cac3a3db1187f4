//! Database schema definitions
//!
//! The migration registry is append-only: never edit or reorder a shipped
//! entry, add a new version at the end instead.

/// One versioned schema change.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    /// Statements run in order inside the migration's transaction
    pub steps: &'static [&'static str],
}

impl Migration {
    /// `ADD COLUMN` steps may hit an existing column on older files.
    pub fn is_add_column(step: &str) -> bool {
        let upper = step.to_ascii_uppercase();
        upper.contains("ALTER TABLE") && upper.contains("ADD COLUMN")
    }
}

/// SQL to create the schema_migrations table
pub const CREATE_SCHEMA_MIGRATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY
)
"#;

/// SQL to create the assets table (project/shot columns arrive in v7)
pub const CREATE_ASSETS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS assets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    asset_type TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL
)
"#;

/// SQL to create the approvals table
pub const CREATE_APPROVALS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS approvals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    asset_id INTEGER NOT NULL,
    status TEXT NOT NULL,
    note TEXT,
    created_at TEXT NOT NULL,
    FOREIGN KEY(asset_id) REFERENCES assets(id)
)
"#;

/// SQL to create the schedules table
pub const CREATE_SCHEDULES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schedules (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    asset_id INTEGER NOT NULL,
    task TEXT NOT NULL,
    due_date TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY(asset_id) REFERENCES assets(id)
)
"#;

/// SQL to create the projects table
pub const CREATE_PROJECTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    code TEXT NOT NULL,
    created_at TEXT NOT NULL
)
"#;

/// SQL to create the shots table
pub const CREATE_SHOTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS shots (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL,
    code TEXT NOT NULL,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY(project_id) REFERENCES projects(id)
)
"#;

/// SQL to create the tasks table
pub const CREATE_TASKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    asset_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    status TEXT NOT NULL,
    assignee TEXT,
    due_date TEXT,
    created_at TEXT NOT NULL,
    FOREIGN KEY(asset_id) REFERENCES assets(id)
)
"#;

/// Every migration, oldest first
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "schema_migrations",
        steps: &[CREATE_SCHEMA_MIGRATIONS_TABLE],
    },
    Migration {
        version: 2,
        name: "assets",
        steps: &[CREATE_ASSETS_TABLE],
    },
    Migration {
        version: 3,
        name: "approvals",
        steps: &[CREATE_APPROVALS_TABLE],
    },
    Migration {
        version: 4,
        name: "schedules",
        steps: &[CREATE_SCHEDULES_TABLE],
    },
    Migration {
        version: 5,
        name: "projects",
        steps: &[CREATE_PROJECTS_TABLE],
    },
    Migration {
        version: 6,
        name: "shots",
        steps: &[CREATE_SHOTS_TABLE],
    },
    Migration {
        version: 7,
        name: "asset_project_shot",
        steps: &[
            "ALTER TABLE assets ADD COLUMN project_id INTEGER REFERENCES projects(id)",
            "ALTER TABLE assets ADD COLUMN shot_id INTEGER REFERENCES shots(id)",
        ],
    },
    Migration {
        version: 8,
        name: "tasks",
        steps: &[CREATE_TASKS_TABLE],
    },
    // Older runners skipped all of v7 when its first column already existed,
    // then recorded v8 on top. Re-adding both columns heals those files and
    // is a no-op everywhere else.
    Migration {
        version: 9,
        name: "asset_columns_repair",
        steps: &[
            "ALTER TABLE assets ADD COLUMN project_id INTEGER REFERENCES projects(id)",
            "ALTER TABLE assets ADD COLUMN shot_id INTEGER REFERENCES shots(id)",
        ],
    },
];

/// Version a fully migrated database reports
pub fn latest_version() -> i64 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}
