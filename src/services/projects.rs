// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    CustomPercentages, ProfileConfig, Project, ProjectExpense, ProjectStatus,
};
use crate::utils::now_iso;

/// Fetches the per-user aggregate root, creating it with the default
/// 50/30/20 strategy on first access.
pub fn ensure_profile_config(conn: &Connection, user: &str) -> LedgerResult<ProfileConfig> {
    conn.execute(
        "INSERT OR IGNORE INTO profile_config(user_id) VALUES (?1)",
        params![user],
    )?;
    get_profile_config(conn, user)
}

fn get_profile_config(conn: &Connection, user: &str) -> LedgerResult<ProfileConfig> {
    conn.query_row(
        "SELECT user_id, budget_strategy, needs_pct, wants_pct, investments_pct,
                monthly_income, month_limit, goals, created_at, updated_at
         FROM profile_config WHERE user_id=?1",
        params![user],
        |r| {
            let goals_json: String = r.get(7)?;
            Ok(ProfileConfig {
                user_id: r.get(0)?,
                budget_strategy: r.get(1)?,
                custom_percentages: CustomPercentages {
                    needs: r.get(2)?,
                    wants: r.get(3)?,
                    investments: r.get(4)?,
                },
                monthly_income: r.get(5)?,
                month_limit: r.get(6)?,
                goals: serde_json::from_str(&goals_json).unwrap_or_default(),
                created_at: r.get(8)?,
                updated_at: r.get(9)?,
            })
        },
    )
    .map_err(LedgerError::Store)
}

/// Sets the monthly income and/or spending limit on the config root.
pub fn update_profile_config(
    conn: &Connection,
    user: &str,
    monthly_income: Option<f64>,
    month_limit: Option<f64>,
) -> LedgerResult<ProfileConfig> {
    ensure_profile_config(conn, user)?;
    if let Some(income) = monthly_income {
        conn.execute(
            "UPDATE profile_config SET monthly_income=?1, updated_at=?2 WHERE user_id=?3",
            params![income, now_iso(), user],
        )?;
    }
    if let Some(limit) = month_limit {
        conn.execute(
            "UPDATE profile_config SET month_limit=?1, updated_at=?2 WHERE user_id=?3",
            params![limit, now_iso(), user],
        )?;
    }
    get_profile_config(conn, user)
}

/// Creates a project. Names are unique case-insensitively within the
/// user's project list; the config root is created first if absent.
pub fn create_project(
    conn: &mut Connection,
    user: &str,
    name: &str,
    description: &str,
    target_value: Option<f64>,
) -> LedgerResult<Project> {
    if name.trim().is_empty() {
        return Err(LedgerError::validation(["projectName"]));
    }

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT OR IGNORE INTO profile_config(user_id) VALUES (?1)",
        params![user],
    )?;

    let clash: Option<String> = tx
        .query_row(
            "SELECT project_id FROM projects WHERE user_id=?1 AND LOWER(project_name)=LOWER(?2)",
            params![user, name],
            |r| r.get(0),
        )
        .optional()?;
    if clash.is_some() {
        return Err(LedgerError::validation(["projectName"]));
    }

    let project_id = Uuid::new_v4().to_string();
    let now = now_iso();
    tx.execute(
        "INSERT INTO projects(project_id, user_id, project_name, description, target_value,
                              total_value_registered, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, 'ACTIVE', ?6, ?6)",
        params![project_id, user, name, description, target_value, now],
    )?;
    tx.commit()?;
    info!(user, project = name, "created project");

    get_project_by_id(conn, user, &project_id)?
        .ok_or_else(|| LedgerError::not_found("project", &project_id))
}

/// Case-insensitive name lookup. A miss is `Ok(None)`, never an error and
/// never an implicit create.
pub fn get_project_by_name(
    conn: &Connection,
    user: &str,
    name: &str,
) -> LedgerResult<Option<Project>> {
    let sql = format!(
        "{PROJECT_COLS} WHERE user_id=?1 AND LOWER(project_name)=LOWER(?2)"
    );
    Ok(conn
        .query_row(&sql, params![user, name], map_project)
        .optional()?)
}

pub fn get_project_by_id(
    conn: &Connection,
    user: &str,
    project_id: &str,
) -> LedgerResult<Option<Project>> {
    let sql = format!("{PROJECT_COLS} WHERE user_id=?1 AND project_id=?2");
    Ok(conn
        .query_row(&sql, params![user, project_id], map_project)
        .optional()?)
}

/// Explicit opt-in resolution: returns the named project, creating an
/// empty one on a miss. Plain lookups never do this.
pub fn get_or_create_project(
    conn: &mut Connection,
    user: &str,
    name: &str,
) -> LedgerResult<Project> {
    if let Some(existing) = get_project_by_name(conn, user, name)? {
        return Ok(existing);
    }
    create_project(conn, user, name, "", None)
}

/// Applies `delta` to the running total and, when metadata is supplied,
/// appends one expense-history entry. Callers that already hold a
/// transaction use this directly; both writes land in that transaction.
pub(crate) fn apply_project_delta(
    conn: &Connection,
    user: &str,
    project_id: &str,
    delta: f64,
    metadata: Option<ProjectExpense>,
) -> LedgerResult<()> {
    let changed = conn.execute(
        "UPDATE projects SET total_value_registered = total_value_registered + ?1, updated_at=?2
         WHERE project_id=?3 AND user_id=?4",
        params![delta, now_iso(), project_id, user],
    )?;
    if changed == 0 {
        return Err(LedgerError::not_found("project", project_id));
    }
    if let Some(entry) = metadata {
        conn.execute(
            "INSERT INTO project_expenses(project_id, spending_id, value, description,
                                          category, date, installments)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                project_id,
                entry.spending_id,
                entry.value,
                entry.description,
                entry.category,
                entry.date.to_string(),
                entry.installments
            ],
        )?;
    }
    Ok(())
}

/// Running-total update as a single atomic transaction against the store.
pub fn update_project_spending(
    conn: &mut Connection,
    user: &str,
    project_id: &str,
    delta: f64,
    metadata: Option<ProjectExpense>,
) -> LedgerResult<Project> {
    let tx = conn.transaction()?;
    apply_project_delta(&tx, user, project_id, delta, metadata)?;
    tx.commit()?;
    get_project_by_id(conn, user, project_id)?
        .ok_or_else(|| LedgerError::not_found("project", project_id))
}

pub fn list_projects(
    conn: &Connection,
    user: &str,
    status: Option<ProjectStatus>,
) -> LedgerResult<Vec<Project>> {
    let mut sql = format!("{PROJECT_COLS} WHERE user_id=?");
    let mut p = vec![user.to_string()];
    if let Some(status) = status {
        sql.push_str(" AND status=?");
        p.push(status.as_str().to_string());
    }
    sql.push_str(" ORDER BY created_at ASC, project_name ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(p.iter()), map_project)?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

/// Append-only expense history for one project, newest first.
pub fn project_expenses(conn: &Connection, project_id: &str) -> LedgerResult<Vec<ProjectExpense>> {
    let mut stmt = conn.prepare(
        "SELECT spending_id, value, description, category, date, installments
         FROM project_expenses WHERE project_id=?1 ORDER BY id DESC",
    )?;
    let rows = stmt.query_map(params![project_id], |r| {
        let date_s: String = r.get(4)?;
        let date = NaiveDate::parse_from_str(&date_s, "%Y-%m-%d").map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(ProjectExpense {
            spending_id: r.get(0)?,
            value: r.get(1)?,
            description: r.get(2)?,
            category: r.get(3)?,
            date,
            installments: r.get(5)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    pub project_name: Option<String>,
    pub description: Option<String>,
    pub target_value: Option<f64>,
    pub status: Option<ProjectStatus>,
}

/// Renames or retargets a project. A rename re-checks name uniqueness;
/// moving to COMPLETED stamps `completed_at`.
pub fn update_project(
    conn: &mut Connection,
    user: &str,
    project_id: &str,
    changes: ProjectUpdate,
) -> LedgerResult<Project> {
    let tx = conn.transaction()?;
    let now = now_iso();

    if let Some(name) = changes.project_name.as_deref() {
        let clash: Option<String> = tx
            .query_row(
                "SELECT project_id FROM projects
                 WHERE user_id=?1 AND LOWER(project_name)=LOWER(?2) AND project_id<>?3",
                params![user, name, project_id],
                |r| r.get(0),
            )
            .optional()?;
        if clash.is_some() {
            return Err(LedgerError::validation(["projectName"]));
        }
        touch(&tx, user, project_id, "project_name", name, &now)?;
    }
    if let Some(description) = changes.description.as_deref() {
        touch(&tx, user, project_id, "description", description, &now)?;
    }
    if let Some(target) = changes.target_value {
        let changed = tx.execute(
            "UPDATE projects SET target_value=?1, updated_at=?2 WHERE project_id=?3 AND user_id=?4",
            params![target, now, project_id, user],
        )?;
        if changed == 0 {
            return Err(LedgerError::not_found("project", project_id));
        }
    }
    if let Some(status) = changes.status {
        let completed_at = (status == ProjectStatus::Completed).then(|| now.clone());
        let changed = tx.execute(
            "UPDATE projects SET status=?1, completed_at=?2, updated_at=?3
             WHERE project_id=?4 AND user_id=?5",
            params![status.as_str(), completed_at, now, project_id, user],
        )?;
        if changed == 0 {
            return Err(LedgerError::not_found("project", project_id));
        }
    }

    tx.commit()?;
    get_project_by_id(conn, user, project_id)?
        .ok_or_else(|| LedgerError::not_found("project", project_id))
}

/// Removes the project from the user's list. Linked spendings are never
/// touched; they keep a dangling project id.
pub fn delete_project(conn: &Connection, user: &str, project_id: &str) -> LedgerResult<()> {
    let removed = conn.execute(
        "DELETE FROM projects WHERE project_id=?1 AND user_id=?2",
        params![project_id, user],
    )?;
    if removed == 0 {
        return Err(LedgerError::not_found("project", project_id));
    }
    info!(user, project_id, "deleted project");
    Ok(())
}

const PROJECT_COLS: &str = "SELECT project_id, project_name, description, target_value, \
                            total_value_registered, status, created_at, updated_at, completed_at \
                            FROM projects";

fn touch(
    conn: &Connection,
    user: &str,
    project_id: &str,
    column: &str,
    value: &str,
    now: &str,
) -> LedgerResult<()> {
    let sql =
        format!("UPDATE projects SET {column}=?1, updated_at=?2 WHERE project_id=?3 AND user_id=?4");
    let changed = conn.execute(&sql, params![value, now, project_id, user])?;
    if changed == 0 {
        return Err(LedgerError::not_found("project", project_id));
    }
    Ok(())
}

fn map_project(r: &rusqlite::Row<'_>) -> rusqlite::Result<Project> {
    let status_s: String = r.get(5)?;
    let status = ProjectStatus::parse(&status_s).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            rusqlite::types::Type::Text,
            format!("unknown project status '{status_s}'").into(),
        )
    })?;
    Ok(Project {
        project_id: r.get(0)?,
        project_name: r.get(1)?,
        description: r.get(2)?,
        target_value: r.get(3)?,
        total_value_registered: r.get(4)?,
        status,
        created_at: r.get(6)?,
        updated_at: r.get(7)?,
        completed_at: r.get(8)?,
    })
}
