// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::dates::parse_month;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    BillMonthStatus, BillStatus, BillStatusLine, FixedBill, FixedBillsSummary, PaymentRecord,
};
use crate::utils::{now_iso, round_cents};

/// Loosely-typed bill payload; validation reports every offending field
/// at once.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BillDraft {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub due_day: Option<u32>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub autopay: Option<bool>,
    pub reminder: Option<bool>,
}

/// Creates a recurring bill with status ACTIVE. `due_day` outside [1,31]
/// is a validation failure.
pub fn create_fixed_bill(
    conn: &Connection,
    user: &str,
    draft: BillDraft,
) -> LedgerResult<FixedBill> {
    let mut bad: Vec<String> = Vec::new();

    let name = match draft.name.filter(|s| !s.trim().is_empty()) {
        Some(n) => n,
        None => {
            bad.push("name".into());
            String::new()
        }
    };
    let amount = match draft.amount {
        Some(a) if a.is_finite() && a >= 0.0 => a,
        _ => {
            bad.push("amount".into());
            0.0
        }
    };
    let due_day = match draft.due_day {
        Some(d) if (1..=31).contains(&d) => d,
        _ => {
            bad.push("dueDay".into());
            0
        }
    };
    if !bad.is_empty() {
        return Err(LedgerError::Validation { fields: bad });
    }

    conn.execute(
        "INSERT OR IGNORE INTO profile_config(user_id) VALUES (?1)",
        params![user],
    )?;

    let bill_id = Uuid::new_v4().to_string();
    let now = now_iso();
    conn.execute(
        "INSERT INTO fixed_bills(bill_id, user_id, name, description, amount, due_day,
                                 category, status, autopay, reminder, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'ACTIVE', ?8, ?9, ?10, ?10)",
        params![
            bill_id,
            user,
            name,
            draft.description.unwrap_or_default(),
            amount,
            due_day,
            draft.category.unwrap_or_else(|| "OTHER".to_string()),
            draft.autopay.unwrap_or(false),
            draft.reminder.unwrap_or(true),
            now
        ],
    )?;
    info!(user, bill = name.as_str(), "created fixed bill");

    get_fixed_bill(conn, user, &bill_id)
}

pub fn get_fixed_bill(conn: &Connection, user: &str, bill_id: &str) -> LedgerResult<FixedBill> {
    let sql = format!("{BILL_COLS} WHERE user_id=?1 AND bill_id=?2");
    conn.query_row(&sql, params![user, bill_id], map_bill)
        .optional()?
        .ok_or_else(|| LedgerError::not_found("bill", bill_id))
}

pub fn list_fixed_bills(
    conn: &Connection,
    user: &str,
    status: Option<BillStatus>,
) -> LedgerResult<Vec<FixedBill>> {
    let mut sql = format!("{BILL_COLS} WHERE user_id=?");
    let mut p = vec![user.to_string()];
    if let Some(status) = status {
        sql.push_str(" AND status=?");
        p.push(status.as_str().to_string());
    }
    sql.push_str(" ORDER BY due_day ASC, name ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(p.iter()), map_bill)?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

/// Marks a bill paid for one month. Replace semantics: any existing
/// record for (bill, month) is removed before the new one is inserted, so
/// at most one record per month ever exists. `amount` defaults to the
/// bill's standard amount.
pub fn mark_bill_as_paid(
    conn: &mut Connection,
    user: &str,
    bill_id: &str,
    year_month: &str,
    amount: Option<f64>,
) -> LedgerResult<PaymentRecord> {
    let month = parse_month(year_month)?;
    let bill = get_fixed_bill(conn, user, bill_id)?;
    let amount = round_cents(amount.unwrap_or(bill.amount));

    let tx = conn.transaction()?;
    tx.execute(
        "DELETE FROM bill_payments WHERE bill_id=?1 AND month=?2",
        params![bill_id, month],
    )?;
    let payment_id = Uuid::new_v4().to_string();
    let paid_date = now_iso();
    tx.execute(
        "INSERT INTO bill_payments(payment_id, bill_id, month, amount, paid, paid_date)
         VALUES (?1, ?2, ?3, ?4, 1, ?5)",
        params![payment_id, bill_id, month, amount, paid_date],
    )?;
    tx.commit()?;
    info!(user, bill_id, month = month.as_str(), "marked bill paid");

    Ok(PaymentRecord {
        payment_id,
        bill_id: bill_id.to_string(),
        month,
        amount,
        paid: true,
        paid_date: Some(paid_date),
    })
}

/// Removes the payment record for that month if present; a no-op, not an
/// error, when absent.
pub fn mark_bill_as_unpaid(
    conn: &Connection,
    user: &str,
    bill_id: &str,
    year_month: &str,
) -> LedgerResult<()> {
    let month = parse_month(year_month)?;
    get_fixed_bill(conn, user, bill_id)?;
    let removed = conn.execute(
        "DELETE FROM bill_payments WHERE bill_id=?1 AND month=?2",
        params![bill_id, month],
    )?;
    if removed > 0 {
        info!(user, bill_id, month = month.as_str(), "payment removed");
    }
    Ok(())
}

/// Payment status of one bill for one month. With no stored record the
/// canonical absent value {paid: false, paidDate: null, amount:
/// bill.amount} is returned.
pub fn get_bill_status_for_month(
    conn: &Connection,
    bill: &FixedBill,
    year_month: &str,
) -> LedgerResult<BillMonthStatus> {
    let found: Option<(bool, Option<String>, f64)> = conn
        .query_row(
            "SELECT paid, paid_date, amount FROM bill_payments WHERE bill_id=?1 AND month=?2",
            params![bill.bill_id, year_month],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .optional()?;
    Ok(match found {
        Some((paid, paid_date, amount)) => BillMonthStatus {
            paid,
            paid_date,
            amount,
        },
        None => BillMonthStatus {
            paid: false,
            paid_date: None,
            amount: bill.amount,
        },
    })
}

/// Stored payment history for one bill, newest month first.
pub fn payment_history(
    conn: &Connection,
    user: &str,
    bill_id: &str,
) -> LedgerResult<Vec<PaymentRecord>> {
    get_fixed_bill(conn, user, bill_id)?;
    let mut stmt = conn.prepare(
        "SELECT payment_id, bill_id, month, amount, paid, paid_date
         FROM bill_payments WHERE bill_id=?1 ORDER BY month DESC",
    )?;
    let rows = stmt.query_map(params![bill_id], |r| {
        Ok(PaymentRecord {
            payment_id: r.get(0)?,
            bill_id: r.get(1)?,
            month: r.get(2)?,
            amount: r.get(3)?,
            paid: r.get(4)?,
            paid_date: r.get(5)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

/// Month overview restricted to ACTIVE bills: totals, paid percentage,
/// and a per-bill status list sorted unpaid-first then by due day.
pub fn get_fixed_bills_summary(
    conn: &Connection,
    user: &str,
    year_month: &str,
) -> LedgerResult<FixedBillsSummary> {
    let month = parse_month(year_month)?;
    let bills = list_fixed_bills(conn, user, Some(BillStatus::Active))?;

    let mut lines: Vec<BillStatusLine> = Vec::with_capacity(bills.len());
    let mut total_amount = 0.0;
    let mut paid_amount = 0.0;
    let mut pending_amount = 0.0;
    let mut paid_count = 0;

    for bill in &bills {
        let status = get_bill_status_for_month(conn, bill, &month)?;
        total_amount += bill.amount;
        if status.paid {
            paid_amount += status.amount;
            paid_count += 1;
        } else {
            pending_amount += bill.amount;
        }
        lines.push(BillStatusLine {
            bill_id: bill.bill_id.clone(),
            name: bill.name.clone(),
            due_day: bill.due_day,
            category: bill.category.clone(),
            amount: status.amount,
            paid: status.paid,
            paid_date: status.paid_date,
            autopay: bill.autopay,
        });
    }

    lines.sort_by_key(|l| (l.paid, l.due_day));

    let paid_percentage = if total_amount > 0.0 {
        paid_amount / total_amount * 100.0
    } else {
        0.0
    };

    Ok(FixedBillsSummary {
        month,
        total_amount,
        paid_amount,
        pending_amount,
        paid_percentage,
        bills_count: bills.len(),
        paid_count,
        bills: lines,
    })
}

#[derive(Debug, Clone, Default)]
pub struct BillUpdate {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub due_day: Option<u32>,
    pub category: Option<String>,
    pub autopay: Option<bool>,
    pub reminder: Option<bool>,
    pub status: Option<BillStatus>,
}

pub fn update_fixed_bill(
    conn: &Connection,
    user: &str,
    bill_id: &str,
    changes: BillUpdate,
) -> LedgerResult<FixedBill> {
    get_fixed_bill(conn, user, bill_id)?;
    if let Some(d) = changes.due_day {
        if !(1..=31).contains(&d) {
            return Err(LedgerError::validation(["dueDay"]));
        }
    }
    let now = now_iso();
    if let Some(name) = changes.name.as_deref() {
        conn.execute(
            "UPDATE fixed_bills SET name=?1, updated_at=?2 WHERE bill_id=?3 AND user_id=?4",
            params![name, now, bill_id, user],
        )?;
    }
    if let Some(amount) = changes.amount {
        conn.execute(
            "UPDATE fixed_bills SET amount=?1, updated_at=?2 WHERE bill_id=?3 AND user_id=?4",
            params![amount, now, bill_id, user],
        )?;
    }
    if let Some(due_day) = changes.due_day {
        conn.execute(
            "UPDATE fixed_bills SET due_day=?1, updated_at=?2 WHERE bill_id=?3 AND user_id=?4",
            params![due_day, now, bill_id, user],
        )?;
    }
    if let Some(category) = changes.category.as_deref() {
        conn.execute(
            "UPDATE fixed_bills SET category=?1, updated_at=?2 WHERE bill_id=?3 AND user_id=?4",
            params![category, now, bill_id, user],
        )?;
    }
    if let Some(autopay) = changes.autopay {
        conn.execute(
            "UPDATE fixed_bills SET autopay=?1, updated_at=?2 WHERE bill_id=?3 AND user_id=?4",
            params![autopay, now, bill_id, user],
        )?;
    }
    if let Some(reminder) = changes.reminder {
        conn.execute(
            "UPDATE fixed_bills SET reminder=?1, updated_at=?2 WHERE bill_id=?3 AND user_id=?4",
            params![reminder, now, bill_id, user],
        )?;
    }
    if let Some(status) = changes.status {
        conn.execute(
            "UPDATE fixed_bills SET status=?1, updated_at=?2 WHERE bill_id=?3 AND user_id=?4",
            params![status.as_str(), now, bill_id, user],
        )?;
    }
    get_fixed_bill(conn, user, bill_id)
}

/// Soft delete: the bill is kept with status CANCELLED so its payment
/// history survives, and it drops out of ACTIVE summaries.
pub fn cancel_fixed_bill(conn: &Connection, user: &str, bill_id: &str) -> LedgerResult<FixedBill> {
    let bill = update_fixed_bill(
        conn,
        user,
        bill_id,
        BillUpdate {
            status: Some(BillStatus::Cancelled),
            ..BillUpdate::default()
        },
    )?;
    info!(user, bill_id, "cancelled fixed bill");
    Ok(bill)
}

const BILL_COLS: &str = "SELECT bill_id, name, description, amount, due_day, category, status, \
                         autopay, reminder, created_at, updated_at FROM fixed_bills";

fn map_bill(r: &rusqlite::Row<'_>) -> rusqlite::Result<FixedBill> {
    let status_s: String = r.get(6)?;
    let status = BillStatus::parse(&status_s).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            6,
            rusqlite::types::Type::Text,
            format!("unknown bill status '{status_s}'").into(),
        )
    })?;
    Ok(FixedBill {
        bill_id: r.get(0)?,
        name: r.get(1)?,
        description: r.get(2)?,
        amount: r.get(3)?,
        due_day: r.get(4)?,
        category: r.get(5)?,
        status,
        autopay: r.get(7)?,
        reminder: r.get(8)?,
        created_at: r.get(9)?,
        updated_at: r.get(10)?,
    })
}
