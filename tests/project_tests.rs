// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use billfold::db;
use billfold::error::LedgerError;
use billfold::models::ProjectStatus;
use billfold::services::projects::{
    create_project, delete_project, ensure_profile_config, get_or_create_project,
    get_project_by_name, list_projects, project_expenses, update_project, update_profile_config,
    ProjectUpdate,
};
use billfold::services::spending::{insert_spending, remove_spending, SpendingDraft};
use rusqlite::Connection;

const USER: &str = "u1";

fn setup() -> Connection {
    db::open_in_memory().unwrap()
}

fn spending_draft(value: f64, project_id: &str, installments: u32) -> SpendingDraft {
    SpendingDraft {
        description: Some("materials".to_string()),
        value: Some(value),
        kind: Some("SPENDING".to_string()),
        category: Some("HOME".to_string()),
        date: Some("2024-01-15".to_string()),
        installments: Some(installments),
        project_id: Some(project_id.to_string()),
    }
}

#[test]
fn profile_config_is_created_lazily_with_default_strategy() {
    let conn = setup();
    let config = ensure_profile_config(&conn, USER).unwrap();
    assert_eq!(config.budget_strategy, "50-30-20");
    assert_eq!(config.custom_percentages.needs, 50.0);
    assert_eq!(config.custom_percentages.wants, 30.0);
    assert_eq!(config.custom_percentages.investments, 20.0);
    assert_eq!(config.month_limit, None);

    // Second access returns the same root, not a fresh one.
    update_profile_config(&conn, USER, None, Some(1000.0)).unwrap();
    let again = ensure_profile_config(&conn, USER).unwrap();
    assert_eq!(again.month_limit, Some(1000.0));
}

#[test]
fn create_and_lookup_is_case_insensitive() {
    let mut conn = setup();
    let project = create_project(&mut conn, USER, "Renovation", "redo the kitchen", Some(5000.0))
        .unwrap();
    assert_eq!(project.status, ProjectStatus::Active);
    assert_eq!(project.total_value_registered, 0.0);

    let found = get_project_by_name(&conn, USER, "rEnOvAtIoN").unwrap();
    assert_eq!(found.unwrap().project_id, project.project_id);
    assert!(get_project_by_name(&conn, USER, "unknown").unwrap().is_none());
}

#[test]
fn duplicate_names_differing_in_case_are_rejected() {
    let mut conn = setup();
    create_project(&mut conn, USER, "Trip", "", None).unwrap();
    let err = create_project(&mut conn, USER, "TRIP", "", None).unwrap_err();
    assert!(matches!(err, LedgerError::Validation { ref fields } if fields == &["projectName"]));
}

#[test]
fn same_name_is_allowed_for_different_users() {
    let mut conn = setup();
    create_project(&mut conn, "a", "Trip", "", None).unwrap();
    create_project(&mut conn, "b", "Trip", "", None).unwrap();
    assert_eq!(list_projects(&conn, "a", None).unwrap().len(), 1);
    assert_eq!(list_projects(&conn, "b", None).unwrap().len(), 1);
}

#[test]
fn linked_insert_applies_full_value_once_with_one_history_entry() {
    let mut conn = setup();
    let project = create_project(&mut conn, USER, "Renovation", "", None).unwrap();

    // Three installments of a 300 purchase: the project sees 300 once.
    insert_spending(&mut conn, USER, spending_draft(300.0, &project.project_id, 3)).unwrap();

    let project = get_project_by_name(&conn, USER, "Renovation").unwrap().unwrap();
    assert_eq!(project.total_value_registered, 300.0);

    let history = project_expenses(&conn, &project.project_id).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].value, 300.0);
    assert_eq!(history[0].installments, 3);
}

#[test]
fn removing_a_parent_compensates_the_full_value_without_history() {
    let mut conn = setup();
    let project = create_project(&mut conn, USER, "Renovation", "", None).unwrap();
    let plan =
        insert_spending(&mut conn, USER, spending_draft(300.0, &project.project_id, 3)).unwrap();

    remove_spending(&mut conn, USER, plan[0].id).unwrap();

    let project = get_project_by_name(&conn, USER, "Renovation").unwrap().unwrap();
    assert!(project.total_value_registered.abs() < 1e-9);
    // Removal never rewrites history.
    assert_eq!(project_expenses(&conn, &project.project_id).unwrap().len(), 1);
}

#[test]
fn removing_a_single_child_compensates_only_its_value() {
    let mut conn = setup();
    let project = create_project(&mut conn, USER, "Renovation", "", None).unwrap();
    let plan =
        insert_spending(&mut conn, USER, spending_draft(300.0, &project.project_id, 3)).unwrap();

    remove_spending(&mut conn, USER, plan[2].id).unwrap();

    let project = get_project_by_name(&conn, USER, "Renovation").unwrap().unwrap();
    assert!((project.total_value_registered - 200.0).abs() < 1e-9);
}

#[test]
fn insert_against_unknown_project_is_not_found() {
    let mut conn = setup();
    let err = insert_spending(&mut conn, USER, spending_draft(10.0, "no-such-id", 1)).unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { .. }));
    // Nothing was recorded.
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM spendings", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn get_or_create_is_an_explicit_opt_in() {
    let mut conn = setup();
    assert!(get_project_by_name(&conn, USER, "Garden").unwrap().is_none());
    let created = get_or_create_project(&mut conn, USER, "Garden").unwrap();
    let again = get_or_create_project(&mut conn, USER, "garden").unwrap();
    assert_eq!(created.project_id, again.project_id);
    // Plain lookup still never creates.
    assert!(get_project_by_name(&conn, USER, "Orchard").unwrap().is_none());
    assert_eq!(list_projects(&conn, USER, None).unwrap().len(), 1);
}

#[test]
fn list_filters_by_status_and_update_stamps_completion() {
    let mut conn = setup();
    let trip = create_project(&mut conn, USER, "Trip", "", None).unwrap();
    create_project(&mut conn, USER, "Garden", "", None).unwrap();

    let updated = update_project(
        &mut conn,
        USER,
        &trip.project_id,
        ProjectUpdate {
            status: Some(ProjectStatus::Completed),
            ..ProjectUpdate::default()
        },
    )
    .unwrap();
    assert_eq!(updated.status, ProjectStatus::Completed);
    assert!(updated.completed_at.is_some());

    let active = list_projects(&conn, USER, Some(ProjectStatus::Active)).unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].project_name, "Garden");
    assert_eq!(list_projects(&conn, USER, None).unwrap().len(), 2);
}

#[test]
fn rename_respects_uniqueness() {
    let mut conn = setup();
    create_project(&mut conn, USER, "Trip", "", None).unwrap();
    let garden = create_project(&mut conn, USER, "Garden", "", None).unwrap();
    let err = update_project(
        &mut conn,
        USER,
        &garden.project_id,
        ProjectUpdate {
            project_name: Some("trip".to_string()),
            ..ProjectUpdate::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::Validation { .. }));
}

#[test]
fn deleting_a_project_keeps_linked_spendings_dangling() {
    let mut conn = setup();
    let project = create_project(&mut conn, USER, "Renovation", "", None).unwrap();
    insert_spending(&mut conn, USER, spending_draft(80.0, &project.project_id, 1)).unwrap();

    delete_project(&conn, USER, &project.project_id).unwrap();
    assert!(get_project_by_name(&conn, USER, "Renovation").unwrap().is_none());

    let dangling: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM spendings WHERE project_id IS NOT NULL",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(dangling, 1);
}
