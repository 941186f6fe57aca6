// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Billfold", "billfold"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("billfold.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    Ok(conn)
}

/// In-memory database with the full schema. Used by the test suites.
pub fn open_in_memory() -> Result<Connection> {
    let mut conn = Connection::open_in_memory().context("Open in-memory DB")?;
    init_schema(&mut conn)?;
    Ok(conn)
}

fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS spendings(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        description TEXT NOT NULL,
        value REAL NOT NULL CHECK(value >= 0),
        type TEXT NOT NULL CHECK(type IN ('SPENDING','REVENUE')),
        category TEXT NOT NULL,
        date TEXT NOT NULL,
        project_id TEXT,
        installments INTEGER,
        installment_info TEXT,
        is_parent INTEGER NOT NULL DEFAULT 0,
        parent_id INTEGER,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(parent_id) REFERENCES spendings(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_spendings_user_date ON spendings(user_id, date);
    CREATE INDEX IF NOT EXISTS idx_spendings_parent ON spendings(parent_id);

    CREATE TABLE IF NOT EXISTS profile_config(
        user_id TEXT PRIMARY KEY,
        budget_strategy TEXT NOT NULL DEFAULT '50-30-20',
        needs_pct REAL NOT NULL DEFAULT 50,
        wants_pct REAL NOT NULL DEFAULT 30,
        investments_pct REAL NOT NULL DEFAULT 20,
        monthly_income REAL,
        month_limit REAL,
        goals TEXT NOT NULL DEFAULT '[]',
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS projects(
        project_id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        project_name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        target_value REAL,
        total_value_registered REAL NOT NULL DEFAULT 0,
        status TEXT NOT NULL DEFAULT 'ACTIVE' CHECK(status IN ('ACTIVE','COMPLETED','PAUSED')),
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        completed_at TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_projects_user ON projects(user_id);

    CREATE TABLE IF NOT EXISTS project_expenses(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        project_id TEXT NOT NULL,
        spending_id INTEGER NOT NULL,
        value REAL NOT NULL,
        description TEXT NOT NULL,
        category TEXT NOT NULL,
        date TEXT NOT NULL,
        installments INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(project_id) REFERENCES projects(project_id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_project_expenses_project ON project_expenses(project_id);

    CREATE TABLE IF NOT EXISTS fixed_bills(
        bill_id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        amount REAL NOT NULL,
        due_day INTEGER NOT NULL CHECK(due_day BETWEEN 1 AND 31),
        category TEXT NOT NULL DEFAULT 'OTHER',
        status TEXT NOT NULL DEFAULT 'ACTIVE' CHECK(status IN ('ACTIVE','PAUSED','CANCELLED')),
        autopay INTEGER NOT NULL DEFAULT 0,
        reminder INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_fixed_bills_user ON fixed_bills(user_id);

    CREATE TABLE IF NOT EXISTS bill_payments(
        payment_id TEXT PRIMARY KEY,
        bill_id TEXT NOT NULL,
        month TEXT NOT NULL,
        amount REAL NOT NULL,
        paid INTEGER NOT NULL DEFAULT 1,
        paid_date TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE(bill_id, month),
        FOREIGN KEY(bill_id) REFERENCES fixed_bills(bill_id) ON DELETE CASCADE
    );
    "#,
    )?;
    Ok(())
}
