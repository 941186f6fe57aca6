// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{bail, Context, Result};
use rusqlite::Connection;

use crate::models::{BillStatus, FixedBill};
use crate::services::fixed_bills::{
    cancel_fixed_bill, create_fixed_bill, get_fixed_bills_summary, list_fixed_bills,
    mark_bill_as_paid, mark_bill_as_unpaid, payment_history, BillDraft,
};
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(conn: &mut Connection, user: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, user, sub)?,
        Some(("list", sub)) => list(conn, user, sub)?,
        Some(("pay", sub)) => pay(conn, user, sub)?,
        Some(("unpay", sub)) => unpay(conn, user, sub)?,
        Some(("history", sub)) => history(conn, user, sub)?,
        Some(("summary", sub)) => summary(conn, user, sub)?,
        Some(("cancel", sub)) => cancel(conn, user, sub)?,
        _ => {}
    }
    Ok(())
}

/// Bills are addressed by name on the command line.
fn bill_by_name(conn: &Connection, user: &str, name: &str) -> Result<FixedBill> {
    let bills = list_fixed_bills(conn, user, None)?;
    match bills
        .into_iter()
        .find(|b| b.name.eq_ignore_ascii_case(name))
    {
        Some(b) => Ok(b),
        None => bail!("Bill '{}' not found", name),
    }
}

fn add(conn: &mut Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let amount_s = sub.get_one::<String>("amount").unwrap();
    let amount: f64 = amount_s
        .parse()
        .with_context(|| format!("Invalid amount '{}'", amount_s))?;
    let draft = BillDraft {
        name: sub.get_one::<String>("name").cloned(),
        amount: Some(amount),
        due_day: sub.get_one::<u32>("due-day").copied(),
        description: sub.get_one::<String>("description").cloned(),
        category: sub.get_one::<String>("category").cloned(),
        autopay: Some(sub.get_flag("autopay")),
        reminder: Some(!sub.get_flag("no-reminder")),
    };
    let bill = create_fixed_bill(conn, user, draft)?;
    println!(
        "Created bill '{}': {:.2} due day {} ({})",
        bill.name, bill.amount, bill.due_day, bill.category
    );
    Ok(())
}

fn list(conn: &mut Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let status = sub
        .get_one::<String>("status")
        .and_then(|s| BillStatus::parse(s));
    let data = list_fixed_bills(conn, user, status)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .iter()
            .map(|b| {
                vec![
                    b.name.clone(),
                    format!("{:.2}", b.amount),
                    b.due_day.to_string(),
                    b.category.clone(),
                    b.status.to_string(),
                    if b.autopay { "yes" } else { "no" }.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Name", "Amount", "Due day", "Category", "Status", "Autopay"],
                rows
            )
        );
    }
    Ok(())
}

fn pay(conn: &mut Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap();
    let month = sub.get_one::<String>("month").unwrap();
    let amount = sub
        .get_one::<String>("amount")
        .map(|s| {
            s.parse::<f64>()
                .with_context(|| format!("Invalid amount '{}'", s))
        })
        .transpose()?;
    let bill = bill_by_name(conn, user, name)?;
    let payment = mark_bill_as_paid(conn, user, &bill.bill_id, month, amount)?;
    println!(
        "Marked '{}' paid for {} ({:.2})",
        bill.name, payment.month, payment.amount
    );
    Ok(())
}

fn unpay(conn: &mut Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap();
    let month = sub.get_one::<String>("month").unwrap();
    let bill = bill_by_name(conn, user, name)?;
    mark_bill_as_unpaid(conn, user, &bill.bill_id, month)?;
    println!("Cleared payment of '{}' for {}", bill.name, month);
    Ok(())
}

fn history(conn: &mut Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let name = sub.get_one::<String>("name").unwrap();
    let bill = bill_by_name(conn, user, name)?;
    let data = payment_history(conn, user, &bill.bill_id)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .iter()
            .map(|p| {
                vec![
                    p.month.clone(),
                    format!("{:.2}", p.amount),
                    if p.paid { "paid" } else { "unpaid" }.to_string(),
                    p.paid_date.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Month", "Amount", "Status", "Paid at"], rows)
        );
    }
    Ok(())
}

fn summary(conn: &mut Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = sub.get_one::<String>("month").unwrap();
    let data = get_fixed_bills_summary(conn, user, month)?;
    if maybe_print_json(json_flag, jsonl_flag, &data)? {
        return Ok(());
    }
    println!(
        "{}: total {:.2}, paid {:.2} ({:.1}%), pending {:.2}",
        data.month, data.total_amount, data.paid_amount, data.paid_percentage, data.pending_amount
    );
    let rows = data
        .bills
        .iter()
        .map(|b| {
            vec![
                b.name.clone(),
                b.due_day.to_string(),
                format!("{:.2}", b.amount),
                if b.paid { "paid" } else { "pending" }.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Bill", "Due day", "Amount", "Status"], rows)
    );
    Ok(())
}

fn cancel(conn: &mut Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap();
    let bill = bill_by_name(conn, user, name)?;
    cancel_fixed_bill(conn, user, &bill.bill_id)?;
    println!("Cancelled bill '{}' (history was kept)", bill.name);
    Ok(())
}
