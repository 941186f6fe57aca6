// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dates::{add_months, date_range, parse_date};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{CategoryTotal, MonthTotal, Spending, SpendingKind};
use crate::services::projects;
use crate::utils::round_cents;

/// Loosely-typed insert payload as received from callers (CLI flags,
/// NLP intents). Validation happens at the boundary and reports every
/// offending field at once.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpendingDraft {
    pub description: Option<String>,
    pub value: Option<f64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
    pub date: Option<String>,
    pub installments: Option<u32>,
    pub project_id: Option<String>,
}

struct NewSpending {
    description: String,
    value: f64,
    kind: SpendingKind,
    category: String,
    date: NaiveDate,
    installments: u32,
    project_id: Option<String>,
}

impl SpendingDraft {
    fn validate(self) -> LedgerResult<NewSpending> {
        let mut bad: Vec<String> = Vec::new();

        let description = match self.description.filter(|s| !s.trim().is_empty()) {
            Some(d) => d,
            None => {
                bad.push("description".into());
                String::new()
            }
        };
        let value = match self.value {
            Some(v) if v.is_finite() && v >= 0.0 => v,
            _ => {
                bad.push("value".into());
                0.0
            }
        };
        let kind = match self.kind.as_deref().and_then(SpendingKind::parse) {
            Some(k) => k,
            None => {
                bad.push("type".into());
                SpendingKind::Spending
            }
        };
        let category = match self.category.filter(|s| !s.trim().is_empty()) {
            Some(c) => c,
            None => {
                bad.push("category".into());
                String::new()
            }
        };
        let date = match self.date.as_deref().map(parse_date) {
            Some(Ok(d)) => d,
            _ => {
                bad.push("date".into());
                NaiveDate::MIN
            }
        };

        if !bad.is_empty() {
            return Err(LedgerError::Validation { fields: bad });
        }
        Ok(NewSpending {
            description,
            value,
            kind,
            category,
            date,
            installments: self.installments.unwrap_or(1).max(1),
            project_id: self.project_id,
        })
    }
}

/// Records a spending, expanding installment plans into one parent plus
/// n-1 monthly children. The whole plan, the project running-total
/// increment, and the single expense-history entry commit as one
/// transaction. Returns the inserted records, parent first.
pub fn insert_spending(
    conn: &mut Connection,
    user: &str,
    draft: SpendingDraft,
) -> LedgerResult<Vec<Spending>> {
    let new = draft.validate()?;

    if let Some(pid) = new.project_id.as_deref() {
        projects::get_project_by_id(conn, user, pid)?
            .ok_or_else(|| LedgerError::not_found("project", pid))?;
    }

    let tx = conn.transaction()?;
    let mut inserted: Vec<Spending> = Vec::new();

    if new.installments <= 1 {
        let id = insert_row(
            &tx,
            user,
            &new,
            new.value,
            new.date,
            None,
            false,
            None,
        )?;
        inserted.push(fetch_one(&tx, user, id)?);
    } else {
        let n = new.installments;
        let per = round_cents(new.value / n as f64);
        // The final installment absorbs the rounding remainder so the
        // plan sums exactly to the original value.
        let last = round_cents(new.value - per * (n - 1) as f64);

        let parent_id = insert_row(
            &tx,
            user,
            &new,
            per,
            new.date,
            Some(format!("1/{n}")),
            true,
            None,
        )?;
        inserted.push(fetch_one(&tx, user, parent_id)?);

        for i in 1..n {
            let value = if i == n - 1 { last } else { per };
            let date = add_months(new.date, i)?;
            let id = insert_row(
                &tx,
                user,
                &new,
                value,
                date,
                Some(format!("{}/{n}", i + 1)),
                false,
                Some(parent_id),
            )?;
            inserted.push(fetch_one(&tx, user, id)?);
        }
    }

    if let Some(pid) = new.project_id.as_deref() {
        // The original total is applied once, with one history entry for
        // the whole purchase, never per installment.
        projects::apply_project_delta(
            &tx,
            user,
            pid,
            new.value,
            Some(crate::models::ProjectExpense {
                spending_id: inserted[0].id,
                value: new.value,
                description: new.description.clone(),
                category: new.category.clone(),
                date: new.date,
                installments: new.installments,
            }),
        )?;
    }

    tx.commit()?;
    info!(
        user,
        id = inserted[0].id,
        installments = new.installments,
        "recorded spending"
    );
    Ok(inserted)
}

#[allow(clippy::too_many_arguments)]
fn insert_row(
    conn: &Connection,
    user: &str,
    new: &NewSpending,
    value: f64,
    date: NaiveDate,
    info: Option<String>,
    is_parent: bool,
    parent_id: Option<i64>,
) -> LedgerResult<i64> {
    let installments = if new.installments > 1 {
        Some(new.installments)
    } else {
        None
    };
    conn.execute(
        "INSERT INTO spendings(user_id, description, value, type, category, date,
                               project_id, installments, installment_info, is_parent, parent_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            user,
            new.description,
            value,
            new.kind.as_str(),
            new.category,
            date.to_string(),
            new.project_id,
            installments,
            info,
            is_parent,
            parent_id
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Removes one record, or a whole installment plan when `id` is a parent.
/// A linked project receives a compensating deduction equal to the full
/// purchase value; no expense-history entry is written for removals.
pub fn remove_spending(conn: &mut Connection, user: &str, id: i64) -> LedgerResult<usize> {
    let tx = conn.transaction()?;

    let (value, is_parent, project_id): (f64, bool, Option<String>) = tx
        .query_row(
            "SELECT value, is_parent, project_id FROM spendings WHERE id=?1 AND user_id=?2",
            params![id, user],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => LedgerError::not_found("spending", id),
            other => LedgerError::Store(other),
        })?;

    let (refund, removed) = if is_parent {
        let total: f64 = tx.query_row(
            "SELECT COALESCE(SUM(value), 0) FROM spendings WHERE id=?1 OR parent_id=?1",
            params![id],
            |r| r.get(0),
        )?;
        let removed = tx.execute(
            "DELETE FROM spendings WHERE id=?1 OR parent_id=?1",
            params![id],
        )?;
        (total, removed)
    } else {
        let removed = tx.execute("DELETE FROM spendings WHERE id=?1", params![id])?;
        (value, removed)
    };

    if let Some(pid) = project_id.as_deref() {
        projects::apply_project_delta(&tx, user, pid, -refund, None)?;
    }

    tx.commit()?;
    info!(user, id, removed, "removed spending");
    Ok(removed)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallmentView {
    /// Non-installment records plus only the parent of each plan.
    #[default]
    Parents,
    /// Every record carrying an installments count, parent or child.
    Detail,
}

/// Exact-match and date filters shared by the consult operations. With no
/// `project_id`, records tagged to a project are excluded so project
/// spending stays out of the general view.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpendingFilter {
    #[serde(rename = "type")]
    pub kind: Option<SpendingKind>,
    pub category: Option<String>,
    pub project_id: Option<String>,
    /// "YYYY", "YYYY-MM", or "YYYY-MM-DD"; day tokens filter by point
    /// equality, the rest by normalized range.
    pub date: Option<String>,
    pub installment_view: InstallmentView,
}

/// One consult operation, tagged by `op` on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsultRequest {
    Sum {
        #[serde(flatten)]
        filter: SpendingFilter,
    },
    Max {
        #[serde(flatten)]
        filter: SpendingFilter,
    },
    Min {
        #[serde(flatten)]
        filter: SpendingFilter,
    },
    Category {
        #[serde(flatten)]
        filter: SpendingFilter,
    },
    Comparative {
        from: String,
        to: String,
        #[serde(flatten)]
        filter: SpendingFilter,
    },
    #[serde(rename_all = "camelCase")]
    ConsultProject {
        project_name: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ConsultOutcome {
    Records(Vec<Spending>),
    Categories(Vec<CategoryTotal>),
    Monthly(Vec<MonthTotal>),
}

impl ConsultOutcome {
    pub fn as_records(&self) -> Option<&[Spending]> {
        match self {
            ConsultOutcome::Records(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_categories(&self) -> Option<&[CategoryTotal]> {
        match self {
            ConsultOutcome::Categories(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_monthly(&self) -> Option<&[MonthTotal]> {
        match self {
            ConsultOutcome::Monthly(m) => Some(m),
            _ => None,
        }
    }
}

const SELECT_COLS: &str = "SELECT id, user_id, description, value, type, category, date, \
                           project_id, installments, installment_info, is_parent, parent_id \
                           FROM spendings";

pub fn consult_spending(
    conn: &Connection,
    user: &str,
    req: &ConsultRequest,
) -> LedgerResult<ConsultOutcome> {
    match req {
        ConsultRequest::Sum { filter } => {
            let (cond, p) = build_where(user, filter)?;
            let sql = format!("{SELECT_COLS} WHERE {cond} ORDER BY date DESC, id DESC");
            Ok(ConsultOutcome::Records(query_spendings(conn, &sql, &p)?))
        }
        ConsultRequest::Max { filter } => {
            let (cond, p) = build_where(user, filter)?;
            let sql = format!("{SELECT_COLS} WHERE {cond} ORDER BY value DESC LIMIT 1");
            Ok(ConsultOutcome::Records(query_spendings(conn, &sql, &p)?))
        }
        ConsultRequest::Min { filter } => {
            let (cond, p) = build_where(user, filter)?;
            let sql = format!("{SELECT_COLS} WHERE {cond} ORDER BY value ASC LIMIT 1");
            Ok(ConsultOutcome::Records(query_spendings(conn, &sql, &p)?))
        }
        ConsultRequest::Category { filter } => {
            let (cond, p) = build_where(user, filter)?;
            let sql = format!(
                "SELECT category, SUM(value) FROM spendings WHERE {cond} \
                 GROUP BY category ORDER BY SUM(value) DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(rusqlite::params_from_iter(p.iter()), |r| {
                Ok(CategoryTotal {
                    label: r.get(0)?,
                    value: r.get(1)?,
                })
            })?;
            Ok(ConsultOutcome::Categories(
                rows.collect::<rusqlite::Result<_>>()?,
            ))
        }
        ConsultRequest::Comparative { from, to, filter } => {
            let mut bad = Vec::new();
            if parse_date(from).is_err() {
                bad.push("from");
            }
            if parse_date(to).is_err() {
                bad.push("to");
            }
            if !bad.is_empty() {
                return Err(LedgerError::validation(bad));
            }
            let (cond, mut p) = build_where_undated(user, filter)?;
            p.push(from.clone());
            p.push(to.clone());
            let sql = format!(
                "SELECT substr(date, 1, 7) AS ym, SUM(value) FROM spendings \
                 WHERE {cond} AND date >= ? AND date <= ? \
                 GROUP BY ym ORDER BY ym ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(rusqlite::params_from_iter(p.iter()), |r| {
                let ym: String = r.get(0)?;
                let total: f64 = r.get(1)?;
                Ok((ym, total))
            })?;
            let mut out = Vec::new();
            for row in rows {
                let (ym, total) = row?;
                // "YYYY-MM" -> "MM/YYYY"
                out.push(MonthTotal {
                    month: format!("{}/{}", &ym[5..7], &ym[0..4]),
                    total,
                });
            }
            Ok(ConsultOutcome::Monthly(out))
        }
        ConsultRequest::ConsultProject { project_name } => {
            let Some(project) = projects::get_project_by_name(conn, user, project_name)? else {
                // An unknown project is an empty result, not an error.
                return Ok(ConsultOutcome::Records(Vec::new()));
            };
            let sql =
                format!("{SELECT_COLS} WHERE user_id=? AND project_id=? ORDER BY date DESC, id DESC");
            let p = vec![user.to_string(), project.project_id];
            Ok(ConsultOutcome::Records(query_spendings(conn, &sql, &p)?))
        }
    }
}

fn build_where(user: &str, filter: &SpendingFilter) -> LedgerResult<(String, Vec<String>)> {
    let (mut cond, mut p) = build_where_undated(user, filter)?;
    if let Some(token) = filter.date.as_deref() {
        if token.split('-').count() == 3 {
            parse_date(token)?;
            cond.push_str(" AND date=?");
            p.push(token.to_string());
        } else {
            let (start, end) = date_range(token)?;
            cond.push_str(" AND date>=? AND date<?");
            p.push(start);
            p.push(end);
        }
    }
    Ok((cond, p))
}

fn build_where_undated(user: &str, filter: &SpendingFilter) -> LedgerResult<(String, Vec<String>)> {
    let mut cond = String::from("user_id=?");
    let mut p = vec![user.to_string()];

    if let Some(kind) = filter.kind {
        cond.push_str(" AND type=?");
        p.push(kind.as_str().to_string());
    }
    if let Some(cat) = filter.category.as_deref() {
        cond.push_str(" AND category=?");
        p.push(cat.to_string());
    }
    match filter.project_id.as_deref() {
        Some(pid) => {
            cond.push_str(" AND project_id=?");
            p.push(pid.to_string());
        }
        None => cond.push_str(" AND project_id IS NULL"),
    }
    match filter.installment_view {
        InstallmentView::Parents => cond.push_str(" AND (installments IS NULL OR is_parent=1)"),
        InstallmentView::Detail => cond.push_str(" AND installments IS NOT NULL"),
    }
    Ok((cond, p))
}

fn query_spendings(conn: &Connection, sql: &str, params: &[String]) -> LedgerResult<Vec<Spending>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), map_spending)?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

fn fetch_one(conn: &Connection, user: &str, id: i64) -> LedgerResult<Spending> {
    let sql = format!("{SELECT_COLS} WHERE id=?1 AND user_id=?2");
    Ok(conn.query_row(&sql, params![id, user], map_spending)?)
}

fn map_spending(r: &rusqlite::Row<'_>) -> rusqlite::Result<Spending> {
    let kind_s: String = r.get(4)?;
    let kind = SpendingKind::parse(&kind_s).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("unknown spending type '{kind_s}'").into(),
        )
    })?;
    let date_s: String = r.get(6)?;
    let date = NaiveDate::parse_from_str(&date_s, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Spending {
        id: r.get(0)?,
        user_id: r.get(1)?,
        description: r.get(2)?,
        value: r.get(3)?,
        kind,
        category: r.get(5)?,
        date,
        project_id: r.get(7)?,
        installments: r.get(8)?,
        installment_info: r.get(9)?,
        is_parent: r.get(10)?,
        parent_id: r.get(11)?,
    })
}
