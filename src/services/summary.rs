// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use std::collections::BTreeMap;

use crate::dates::parse_month;
use crate::error::LedgerResult;
use crate::models::{
    Alert, AlertKind, CategoryBreakdownEntry, FixedBillsBreakdown, FixedBillsSummary,
    MonthlySummary, Severity, SpendingKind, SummaryBreakdown, VariableSpendingBreakdown,
};
use crate::services::fixed_bills::get_fixed_bills_summary;
use crate::services::projects::ensure_profile_config;
use crate::services::spending::{consult_spending, ConsultRequest, SpendingFilter};

/// Merges the month's variable spending, fixed bills, and configured
/// limit into one dashboard payload with alerts.
pub fn get_monthly_summary(
    conn: &Connection,
    user: &str,
    year_month: &str,
) -> LedgerResult<MonthlySummary> {
    let month = parse_month(year_month)?;

    let consult = ConsultRequest::Sum {
        filter: SpendingFilter {
            kind: Some(SpendingKind::Spending),
            date: Some(month.clone()),
            ..SpendingFilter::default()
        },
    };
    let outcome = consult_spending(conn, user, &consult)?;
    let spendings = outcome.as_records().unwrap_or_default();
    let variable_total: f64 = spendings.iter().map(|s| s.value).sum();

    let bills = get_fixed_bills_summary(conn, user, &month)?;
    let config = ensure_profile_config(conn, user)?;
    let limit = config.month_limit.filter(|l| *l > 0.0);

    let total_spent = variable_total + bills.paid_amount;
    let total_planned = variable_total + bills.total_amount;

    let percentage_of_limit = limit.map_or(0.0, |l| total_spent / l * 100.0);
    let percentage_planned_of_limit = limit.map_or(0.0, |l| total_planned / l * 100.0);

    let mut categories: BTreeMap<String, CategoryBreakdownEntry> = BTreeMap::new();
    for s in spendings {
        let entry = categories.entry(s.category.clone()).or_insert(
            CategoryBreakdownEntry {
                variable: 0.0,
                fixed: 0.0,
                total: 0.0,
            },
        );
        entry.variable += s.value;
    }
    for line in &bills.bills {
        let entry = categories.entry(line.category.clone()).or_insert(
            CategoryBreakdownEntry {
                variable: 0.0,
                fixed: 0.0,
                total: 0.0,
            },
        );
        entry.fixed += line.amount;
    }
    for entry in categories.values_mut() {
        entry.total = entry.variable + entry.fixed;
    }

    let breakdown = SummaryBreakdown {
        variable_spending: VariableSpendingBreakdown {
            total: variable_total,
            count: spendings.len(),
            percentage: pct_of(variable_total, total_spent),
        },
        fixed_bills: FixedBillsBreakdown {
            total: bills.total_amount,
            paid: bills.paid_amount,
            pending: bills.pending_amount,
            count: bills.bills_count,
            paid_count: bills.paid_count,
            percentage: pct_of(bills.paid_amount, total_spent),
        },
    };

    let alerts = generate_alerts(total_planned, limit, percentage_of_limit, &bills);

    Ok(MonthlySummary {
        month,
        monthly_limit: limit,
        total_spent,
        total_planned,
        remaining_limit: limit.map(|l| l - total_spent),
        percentage_of_limit,
        percentage_planned_of_limit,
        breakdown,
        categories_breakdown: categories,
        alerts,
    })
}

fn pct_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole * 100.0 } else { 0.0 }
}

/// Alert rules are evaluated independently; only the two limit alerts
/// are mutually exclusive with each other.
fn generate_alerts(
    total_planned: f64,
    limit: Option<f64>,
    percentage_of_limit: f64,
    bills: &FixedBillsSummary,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if limit.is_some() {
        if percentage_of_limit >= 90.0 {
            alerts.push(Alert {
                kind: AlertKind::LimitCritical,
                message: format!(
                    "Spending has reached {percentage_of_limit:.1}% of the monthly limit"
                ),
                severity: Severity::High,
            });
        } else if percentage_of_limit >= 75.0 {
            alerts.push(Alert {
                kind: AlertKind::LimitWarning,
                message: format!(
                    "Spending has reached {percentage_of_limit:.1}% of the monthly limit"
                ),
                severity: Severity::Medium,
            });
        }
    }

    let pending_bills = bills.bills_count - bills.paid_count;
    if pending_bills > 0 {
        alerts.push(Alert {
            kind: AlertKind::PendingBills,
            message: format!(
                "{pending_bills} fixed bill(s) pending, totaling {:.2}",
                bills.pending_amount
            ),
            severity: Severity::Medium,
        });
    }

    if let Some(l) = limit {
        if total_planned > l {
            alerts.push(Alert {
                kind: AlertKind::BudgetExceeded,
                message: format!(
                    "Planned spending exceeds the monthly limit by {:.2}",
                    total_planned - l
                ),
                severity: Severity::High,
            });
        }
    }

    alerts
}
