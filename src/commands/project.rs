// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use serde_json::json;

use crate::models::{Project, ProjectStatus};
use crate::services::projects::{
    create_project, delete_project, get_project_by_name, list_projects, project_expenses,
    update_project, ProjectUpdate,
};
use crate::services::spending::{consult_spending, ConsultRequest};
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(conn: &mut Connection, user: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, user, sub)?,
        Some(("list", sub)) => list(conn, user, sub)?,
        Some(("show", sub)) => show(conn, user, sub)?,
        Some(("update", sub)) => update(conn, user, sub)?,
        Some(("rm", sub)) => rm(conn, user, sub)?,
        _ => {}
    }
    Ok(())
}

fn require_project(conn: &Connection, user: &str, name: &str) -> Result<Project> {
    match get_project_by_name(conn, user, name)? {
        Some(p) => Ok(p),
        None => bail!("Project '{}' not found", name),
    }
}

fn add(conn: &mut Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap();
    let description = sub.get_one::<String>("description").unwrap();
    let target = sub
        .get_one::<String>("target")
        .map(|s| {
            s.parse::<f64>()
                .with_context(|| format!("Invalid target '{}'", s))
        })
        .transpose()?;
    let project = create_project(conn, user, name, description, target)?;
    match project.target_value {
        Some(t) => println!("Created project '{}' (target {:.2})", project.project_name, t),
        None => println!("Created project '{}'", project.project_name),
    }
    Ok(())
}

fn list(conn: &mut Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let status = sub
        .get_one::<String>("status")
        .and_then(|s| ProjectStatus::parse(s));
    let data = list_projects(conn, user, status)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .iter()
            .map(|p| {
                vec![
                    p.project_name.clone(),
                    p.status.to_string(),
                    format!("{:.2}", p.total_value_registered),
                    p.target_value
                        .map(|t| format!("{:.2}", t))
                        .unwrap_or_default(),
                    p.description.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Name", "Status", "Registered", "Target", "Description"], rows)
        );
    }
    Ok(())
}

fn show(conn: &mut Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let name = sub.get_one::<String>("name").unwrap();
    let project = require_project(conn, user, name)?;

    let history = project_expenses(conn, &project.project_id)?;
    let outcome = consult_spending(
        conn,
        user,
        &ConsultRequest::ConsultProject {
            project_name: name.clone(),
        },
    )?;
    let spendings = outcome.as_records().unwrap_or_default();

    if maybe_print_json(
        json_flag,
        jsonl_flag,
        &json!({
            "project": project,
            "expenseHistory": history,
            "spendings": spendings,
        }),
    )? {
        return Ok(());
    }

    println!(
        "{} [{}] registered {:.2}{}",
        project.project_name,
        project.status,
        project.total_value_registered,
        project
            .target_value
            .map(|t| format!(" of {:.2} target", t))
            .unwrap_or_default()
    );
    let rows = history
        .iter()
        .map(|e| {
            vec![
                e.date.to_string(),
                e.description.clone(),
                format!("{:.2}", e.value),
                e.category.clone(),
                e.installments.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Date", "Description", "Value", "Category", "Installments"],
            rows
        )
    );
    Ok(())
}

fn update(conn: &mut Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap();
    let project = require_project(conn, user, name)?;
    let target = sub
        .get_one::<String>("target")
        .map(|s| {
            s.parse::<f64>()
                .with_context(|| format!("Invalid target '{}'", s))
        })
        .transpose()?;
    let changes = ProjectUpdate {
        project_name: sub.get_one::<String>("rename").cloned(),
        description: sub.get_one::<String>("description").cloned(),
        target_value: target,
        status: sub
            .get_one::<String>("status")
            .and_then(|s| ProjectStatus::parse(s)),
    };
    let updated = update_project(conn, user, &project.project_id, changes)?;
    println!("Updated project '{}'", updated.project_name);
    Ok(())
}

fn rm(conn: &mut Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap();
    let project = require_project(conn, user, name)?;
    delete_project(conn, user, &project.project_id)?;
    println!(
        "Removed project '{}' (linked spendings were kept)",
        project.project_name
    );
    Ok(())
}
