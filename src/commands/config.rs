// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::services::projects::{ensure_profile_config, update_profile_config};
use crate::utils::maybe_print_json;

pub fn handle(conn: &mut Connection, user: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, user, sub)?,
        Some(("show", sub)) => show(conn, user, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(conn: &mut Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let parse = |key: &str| -> Result<Option<f64>> {
        sub.get_one::<String>(key)
            .map(|s| {
                s.parse::<f64>()
                    .with_context(|| format!("Invalid {} '{}'", key, s))
            })
            .transpose()
    };
    let income = parse("income")?;
    let limit = parse("limit")?;
    let config = update_profile_config(conn, user, income, limit)?;
    println!(
        "Config for {}: income {}, limit {}",
        config.user_id,
        config
            .monthly_income
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "unset".into()),
        config
            .month_limit
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "unset".into())
    );
    Ok(())
}

fn show(conn: &mut Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let config = ensure_profile_config(conn, user)?;
    if !maybe_print_json(json_flag, jsonl_flag, &config)? {
        println!(
            "{} strategy {} (needs {:.0} / wants {:.0} / investments {:.0}), income {}, limit {}",
            config.user_id,
            config.budget_strategy,
            config.custom_percentages.needs,
            config.custom_percentages.wants,
            config.custom_percentages.investments,
            config
                .monthly_income
                .map(|v| format!("{:.2}", v))
                .unwrap_or_else(|| "unset".into()),
            config
                .month_limit
                .map(|v| format!("{:.2}", v))
                .unwrap_or_else(|| "unset".into())
        );
    }
    Ok(())
}
