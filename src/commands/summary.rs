// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::services::summary::get_monthly_summary;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(conn: &mut Connection, user: &str, m: &clap::ArgMatches) -> Result<()> {
    let json_flag = m.get_flag("json");
    let jsonl_flag = m.get_flag("jsonl");
    let month = m.get_one::<String>("month").unwrap();

    let summary = get_monthly_summary(conn, user, month)?;
    if maybe_print_json(json_flag, jsonl_flag, &summary)? {
        return Ok(());
    }

    println!("Summary for {}", summary.month);
    println!(
        "  spent {:.2}, planned {:.2}{}",
        summary.total_spent,
        summary.total_planned,
        match summary.monthly_limit {
            Some(limit) => format!(
                ", limit {:.2} ({:.1}% used, {:.2} remaining)",
                limit,
                summary.percentage_of_limit,
                summary.remaining_limit.unwrap_or(limit)
            ),
            None => String::new(),
        }
    );
    println!(
        "  variable {:.2} across {} record(s); bills {:.2} paid of {:.2}",
        summary.breakdown.variable_spending.total,
        summary.breakdown.variable_spending.count,
        summary.breakdown.fixed_bills.paid,
        summary.breakdown.fixed_bills.total
    );

    let rows = summary
        .categories_breakdown
        .iter()
        .map(|(category, entry)| {
            vec![
                category.clone(),
                format!("{:.2}", entry.variable),
                format!("{:.2}", entry.fixed),
                format!("{:.2}", entry.total),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Category", "Variable", "Fixed", "Total"], rows)
    );

    for alert in &summary.alerts {
        println!("  [{:?}] {}", alert.kind, alert.message);
    }
    Ok(())
}
