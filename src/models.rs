// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpendingKind {
    Spending,
    Revenue,
}

impl SpendingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpendingKind::Spending => "SPENDING",
            SpendingKind::Revenue => "REVENUE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SPENDING" => Some(SpendingKind::Spending),
            "REVENUE" => Some(SpendingKind::Revenue),
            _ => None,
        }
    }
}

impl fmt::Display for SpendingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ledger transaction. Installment plans are one parent row
/// ("1/n", `is_parent`) plus n-1 child rows pointing back at it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Spending {
    pub id: i64,
    pub user_id: String,
    pub description: String,
    pub value: f64,
    #[serde(rename = "type")]
    pub kind: SpendingKind,
    pub category: String,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installments: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installment_info: Option<String>,
    pub is_parent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Active,
    Completed,
    Paused,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "ACTIVE",
            ProjectStatus::Completed => "COMPLETED",
            ProjectStatus::Paused => "PAUSED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(ProjectStatus::Active),
            "COMPLETED" => Some(ProjectStatus::Completed),
            "PAUSED" => Some(ProjectStatus::Paused),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A savings/spending goal. `total_value_registered` is maintained by the
/// project linker as a signed running total, never recomputed from the
/// ledger.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_id: String,
    pub project_name: String,
    pub description: String,
    pub target_value: Option<f64>,
    pub total_value_registered: f64,
    pub status: ProjectStatus,
    pub created_at: String,
    pub updated_at: String,
    pub completed_at: Option<String>,
}

/// One append-only expense-history entry on a project. An installment
/// purchase contributes a single entry for the whole plan.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectExpense {
    pub spending_id: i64,
    pub value: f64,
    pub description: String,
    pub category: String,
    pub date: NaiveDate,
    pub installments: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillStatus {
    Active,
    Paused,
    Cancelled,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Active => "ACTIVE",
            BillStatus::Paused => "PAUSED",
            BillStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(BillStatus::Active),
            "PAUSED" => Some(BillStatus::Paused),
            "CANCELLED" => Some(BillStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recurring monthly obligation tracked independently of ad-hoc ledger
/// transactions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedBill {
    pub bill_id: String,
    pub name: String,
    pub description: String,
    pub amount: f64,
    pub due_day: u32,
    pub category: String,
    pub status: BillStatus,
    pub autopay: bool,
    pub reminder: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Stored payment for one (bill, month). At most one exists per month.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub payment_id: String,
    pub bill_id: String,
    pub month: String,
    pub amount: f64,
    pub paid: bool,
    pub paid_date: Option<String>,
}

/// Payment status of one bill for one month. When no record exists the
/// canonical absent value is {paid: false, paid_date: None, amount:
/// bill.amount}.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillMonthStatus {
    pub paid: bool,
    pub paid_date: Option<String>,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomPercentages {
    pub needs: f64,
    pub wants: f64,
    pub investments: f64,
}

/// Per-user aggregate root. Created lazily with the default 50/30/20
/// strategy on first access.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileConfig {
    pub user_id: String,
    pub budget_strategy: String,
    pub custom_percentages: CustomPercentages,
    pub monthly_income: Option<f64>,
    pub month_limit: Option<f64>,
    pub goals: Vec<serde_json::Value>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryTotal {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthTotal {
    /// "MM/YYYY"
    pub month: String,
    pub total: f64,
}

/// Per-bill line in the monthly fixed-bill summary, sorted unpaid-first
/// then by due day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillStatusLine {
    pub bill_id: String,
    pub name: String,
    pub due_day: u32,
    pub category: String,
    pub amount: f64,
    pub paid: bool,
    pub paid_date: Option<String>,
    pub autopay: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedBillsSummary {
    pub month: String,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub pending_amount: f64,
    pub paid_percentage: f64,
    pub bills_count: usize,
    pub paid_count: usize,
    pub bills: Vec<BillStatusLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    LimitCritical,
    LimitWarning,
    PendingBills,
    BudgetExceeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableSpendingBreakdown {
    pub total: f64,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedBillsBreakdown {
    pub total: f64,
    pub paid: f64,
    pub pending: f64,
    pub count: usize,
    pub paid_count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryBreakdown {
    pub variable_spending: VariableSpendingBreakdown,
    pub fixed_bills: FixedBillsBreakdown,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdownEntry {
    pub variable: f64,
    pub fixed: f64,
    pub total: f64,
}

/// The monthly dashboard payload: variable spending, fixed bills, limit
/// comparison, per-category merge, and alerts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub month: String,
    pub monthly_limit: Option<f64>,
    pub total_spent: f64,
    pub total_planned: f64,
    pub remaining_limit: Option<f64>,
    pub percentage_of_limit: f64,
    pub percentage_planned_of_limit: f64,
    pub breakdown: SummaryBreakdown,
    pub categories_breakdown: BTreeMap<String, CategoryBreakdownEntry>,
    pub alerts: Vec<Alert>,
}
