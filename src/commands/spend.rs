// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{bail, Context, Result};
use rusqlite::Connection;

use crate::models::{Spending, SpendingKind};
use crate::services::projects;
use crate::services::spending::{
    consult_spending, insert_spending, remove_spending, ConsultOutcome, ConsultRequest,
    InstallmentView, SpendingDraft, SpendingFilter,
};
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(conn: &mut Connection, user: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, user, sub)?,
        Some(("rm", sub)) => rm(conn, user, sub)?,
        Some(("list", sub)) => consult(conn, user, sub, Op::Sum)?,
        Some(("max", sub)) => consult(conn, user, sub, Op::Max)?,
        Some(("min", sub)) => consult(conn, user, sub, Op::Min)?,
        Some(("by-category", sub)) => consult(conn, user, sub, Op::Category)?,
        Some(("compare", sub)) => compare(conn, user, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let value_s = sub.get_one::<String>("value").unwrap();
    let value: f64 = value_s
        .parse()
        .with_context(|| format!("Invalid value '{}'", value_s))?;
    let installments = *sub.get_one::<u32>("installments").unwrap();

    let project_id = match sub.get_one::<String>("project") {
        Some(name) => {
            let project = if sub.get_flag("create-project") {
                projects::get_or_create_project(conn, user, name)?
            } else {
                match projects::get_project_by_name(conn, user, name)? {
                    Some(p) => p,
                    None => bail!(
                        "Project '{}' not found (pass --create-project to create it)",
                        name
                    ),
                }
            };
            Some(project.project_id)
        }
        None => None,
    };

    let draft = SpendingDraft {
        description: sub.get_one::<String>("description").cloned(),
        value: Some(value),
        kind: sub.get_one::<String>("type").cloned(),
        category: sub.get_one::<String>("category").cloned(),
        date: sub.get_one::<String>("date").cloned(),
        installments: Some(installments),
        project_id,
    };

    let records = insert_spending(conn, user, draft)?;
    let first = &records[0];
    if records.len() > 1 {
        println!(
            "Recorded {:.2} as {} installments of {:.2} starting {} ({})",
            records.iter().map(|r| r.value).sum::<f64>(),
            records.len(),
            first.value,
            first.date,
            first.category
        );
    } else {
        println!(
            "Recorded {:.2} on {} ({})",
            first.value, first.date, first.category
        );
    }
    Ok(())
}

fn rm(conn: &mut Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let removed = remove_spending(conn, user, id)?;
    println!("Removed {} record(s)", removed);
    Ok(())
}

enum Op {
    Sum,
    Max,
    Min,
    Category,
}

fn consult(conn: &mut Connection, user: &str, sub: &clap::ArgMatches, op: Op) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let mut filter = SpendingFilter {
        kind: sub
            .get_one::<String>("type")
            .and_then(|s| SpendingKind::parse(s)),
        category: sub.get_one::<String>("category").cloned(),
        date: sub.get_one::<String>("date").cloned(),
        installment_view: if sub.get_flag("detail") {
            InstallmentView::Detail
        } else {
            InstallmentView::Parents
        },
        ..SpendingFilter::default()
    };

    if let Some(name) = sub.get_one::<String>("project") {
        match projects::get_project_by_name(conn, user, name)? {
            Some(p) => filter.project_id = Some(p.project_id),
            None => {
                // An unknown project is an empty view, not an error.
                println!("{}", pretty_table(&spending_headers(), Vec::new()));
                return Ok(());
            }
        }
    }

    let req = match op {
        Op::Sum => ConsultRequest::Sum { filter },
        Op::Max => ConsultRequest::Max { filter },
        Op::Min => ConsultRequest::Min { filter },
        Op::Category => ConsultRequest::Category { filter },
    };
    let outcome = consult_spending(conn, user, &req)?;
    if maybe_print_json(json_flag, jsonl_flag, &outcome)? {
        return Ok(());
    }

    match outcome {
        ConsultOutcome::Records(records) => {
            println!(
                "{}",
                pretty_table(&spending_headers(), records.iter().map(spending_row).collect())
            );
        }
        ConsultOutcome::Categories(cats) => {
            let rows = cats
                .iter()
                .map(|c| vec![c.label.clone(), format!("{:.2}", c.value)])
                .collect();
            println!("{}", pretty_table(&["Category", "Total"], rows));
        }
        ConsultOutcome::Monthly(_) => {}
    }
    Ok(())
}

fn compare(conn: &mut Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let req = ConsultRequest::Comparative {
        from: sub.get_one::<String>("from").unwrap().clone(),
        to: sub.get_one::<String>("to").unwrap().clone(),
        filter: SpendingFilter::default(),
    };
    let outcome = consult_spending(conn, user, &req)?;
    if maybe_print_json(json_flag, jsonl_flag, &outcome)? {
        return Ok(());
    }
    if let ConsultOutcome::Monthly(months) = outcome {
        let rows = months
            .iter()
            .map(|m| vec![m.month.clone(), format!("{:.2}", m.total)])
            .collect();
        println!("{}", pretty_table(&["Month", "Total"], rows));
    }
    Ok(())
}

fn spending_headers() -> Vec<&'static str> {
    vec![
        "Id",
        "Date",
        "Description",
        "Value",
        "Type",
        "Category",
        "Installment",
    ]
}

fn spending_row(s: &Spending) -> Vec<String> {
    vec![
        s.id.to_string(),
        s.date.to_string(),
        s.description.clone(),
        format!("{:.2}", s.value),
        s.kind.to_string(),
        s.category.clone(),
        s.installment_info.clone().unwrap_or_default(),
    ]
}
