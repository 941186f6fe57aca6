// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use billfold::db;
use billfold::error::LedgerError;
use billfold::models::SpendingKind;
use billfold::services::projects::create_project;
use billfold::services::spending::{
    consult_spending, insert_spending, remove_spending, ConsultRequest, InstallmentView,
    SpendingDraft, SpendingFilter,
};
use rusqlite::Connection;

const USER: &str = "u1";

fn setup() -> Connection {
    db::open_in_memory().unwrap()
}

fn draft(description: &str, value: f64, category: &str, date: &str) -> SpendingDraft {
    SpendingDraft {
        description: Some(description.to_string()),
        value: Some(value),
        kind: Some("SPENDING".to_string()),
        category: Some(category.to_string()),
        date: Some(date.to_string()),
        ..SpendingDraft::default()
    }
}

#[test]
fn plain_insert_stores_value_unchanged() {
    let mut conn = setup();
    let records = insert_spending(&mut conn, USER, draft("coffee", 123.456, "FOOD", "2024-01-15"))
        .unwrap();
    assert_eq!(records.len(), 1);
    let r = &records[0];
    assert_eq!(r.value, 123.456);
    assert_eq!(r.installments, None);
    assert_eq!(r.installment_info, None);
    assert!(!r.is_parent);
    assert_eq!(r.parent_id, None);
}

#[test]
fn installment_plan_expands_into_parent_and_children() {
    let mut conn = setup();
    let mut d = draft("tires", 300.0, "FUEL", "2024-01-15");
    d.installments = Some(3);
    let records = insert_spending(&mut conn, USER, d).unwrap();
    assert_eq!(records.len(), 3);

    let parent = &records[0];
    assert!(parent.is_parent);
    assert_eq!(parent.installment_info.as_deref(), Some("1/3"));
    assert_eq!(parent.value, 100.0);
    assert_eq!(parent.date.to_string(), "2024-01-15");
    assert_eq!(parent.installments, Some(3));

    for (i, child) in records[1..].iter().enumerate() {
        assert!(!child.is_parent);
        assert_eq!(child.parent_id, Some(parent.id));
        assert_eq!(child.value, 100.0);
        assert_eq!(
            child.installment_info.as_deref().unwrap(),
            format!("{}/3", i + 2)
        );
    }
    assert_eq!(records[1].date.to_string(), "2024-02-15");
    assert_eq!(records[2].date.to_string(), "2024-03-15");
}

#[test]
fn final_installment_absorbs_rounding_remainder() {
    let mut conn = setup();
    let mut d = draft("sofa", 100.0, "HOME", "2024-01-10");
    d.installments = Some(3);
    let records = insert_spending(&mut conn, USER, d).unwrap();
    assert_eq!(records[0].value, 33.33);
    assert_eq!(records[1].value, 33.33);
    assert_eq!(records[2].value, 33.34);
    let total: f64 = records.iter().map(|r| r.value).sum();
    assert!((total - 100.0).abs() < 1e-9);
}

#[test]
fn installment_dates_clamp_at_month_end() {
    let mut conn = setup();
    let mut d = draft("subscription", 60.0, "MEDIA", "2024-01-31");
    d.installments = Some(2);
    let records = insert_spending(&mut conn, USER, d).unwrap();
    assert_eq!(records[1].date.to_string(), "2024-02-29");
}

#[test]
fn validation_reports_all_missing_fields_at_once() {
    let mut conn = setup();
    let err = insert_spending(&mut conn, USER, SpendingDraft::default()).unwrap_err();
    match err {
        LedgerError::Validation { fields } => {
            assert_eq!(fields, ["description", "value", "type", "category", "date"]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn unparsable_date_flags_date_field() {
    let mut conn = setup();
    let d = draft("coffee", 5.0, "FOOD", "15/01/2024");
    let err = insert_spending(&mut conn, USER, d).unwrap_err();
    assert!(matches!(err, LedgerError::Validation { ref fields } if fields == &["date"]));
}

#[test]
fn negative_value_flags_value_field() {
    let mut conn = setup();
    let mut d = draft("coffee", 5.0, "FOOD", "2024-01-15");
    d.value = Some(-1.0);
    let err = insert_spending(&mut conn, USER, d).unwrap_err();
    assert!(matches!(err, LedgerError::Validation { ref fields } if fields == &["value"]));
}

#[test]
fn removing_parent_removes_whole_plan() {
    let mut conn = setup();
    let mut d = draft("tires", 300.0, "FUEL", "2024-01-15");
    d.installments = Some(3);
    let plan = insert_spending(&mut conn, USER, d).unwrap();
    insert_spending(&mut conn, USER, draft("coffee", 5.0, "FOOD", "2024-01-16")).unwrap();

    let removed = remove_spending(&mut conn, USER, plan[0].id).unwrap();
    assert_eq!(removed, 3);

    let left: i64 = conn
        .query_row("SELECT COUNT(*) FROM spendings", [], |r| r.get(0))
        .unwrap();
    assert_eq!(left, 1);
}

#[test]
fn removing_child_removes_only_that_record() {
    let mut conn = setup();
    let mut d = draft("tires", 300.0, "FUEL", "2024-01-15");
    d.installments = Some(3);
    let plan = insert_spending(&mut conn, USER, d).unwrap();

    let removed = remove_spending(&mut conn, USER, plan[1].id).unwrap();
    assert_eq!(removed, 1);
    let left: i64 = conn
        .query_row("SELECT COUNT(*) FROM spendings", [], |r| r.get(0))
        .unwrap();
    assert_eq!(left, 2);
}

#[test]
fn remove_is_scoped_to_the_owning_user() {
    let mut conn = setup();
    let records = insert_spending(&mut conn, USER, draft("coffee", 5.0, "FOOD", "2024-01-15"))
        .unwrap();
    let err = remove_spending(&mut conn, "someone-else", records[0].id).unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { .. }));
    let err = remove_spending(&mut conn, USER, 9999).unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { .. }));
}

#[test]
fn default_view_shows_parents_only_detail_shows_all() {
    let mut conn = setup();
    let mut d = draft("tires", 300.0, "FUEL", "2024-01-15");
    d.installments = Some(3);
    insert_spending(&mut conn, USER, d).unwrap();
    insert_spending(&mut conn, USER, draft("coffee", 5.0, "FOOD", "2024-01-16")).unwrap();

    let outcome = consult_spending(
        &conn,
        USER,
        &ConsultRequest::Sum {
            filter: SpendingFilter::default(),
        },
    )
    .unwrap();
    let records = outcome.as_records().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.parent_id.is_none()));

    let outcome = consult_spending(
        &conn,
        USER,
        &ConsultRequest::Sum {
            filter: SpendingFilter {
                installment_view: InstallmentView::Detail,
                ..SpendingFilter::default()
            },
        },
    )
    .unwrap();
    let records = outcome.as_records().unwrap();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.installments == Some(3)));
}

#[test]
fn consults_are_scoped_by_user_and_filters() {
    let mut conn = setup();
    insert_spending(&mut conn, USER, draft("coffee", 5.0, "FOOD", "2024-01-15")).unwrap();
    insert_spending(&mut conn, USER, draft("fuel", 50.0, "FUEL", "2024-02-01")).unwrap();
    insert_spending(&mut conn, "other", draft("rent", 900.0, "HOME", "2024-01-15")).unwrap();

    let outcome = consult_spending(
        &conn,
        USER,
        &ConsultRequest::Sum {
            filter: SpendingFilter {
                date: Some("2024-01".to_string()),
                ..SpendingFilter::default()
            },
        },
    )
    .unwrap();
    assert_eq!(outcome.as_records().unwrap().len(), 1);

    let outcome = consult_spending(
        &conn,
        USER,
        &ConsultRequest::Sum {
            filter: SpendingFilter {
                category: Some("FUEL".to_string()),
                ..SpendingFilter::default()
            },
        },
    )
    .unwrap();
    assert_eq!(outcome.as_records().unwrap().len(), 1);

    // Day tokens match by point equality.
    let outcome = consult_spending(
        &conn,
        USER,
        &ConsultRequest::Sum {
            filter: SpendingFilter {
                date: Some("2024-01-15".to_string()),
                ..SpendingFilter::default()
            },
        },
    )
    .unwrap();
    assert_eq!(outcome.as_records().unwrap().len(), 1);
}

#[test]
fn project_spending_is_excluded_from_the_general_view() {
    let mut conn = setup();
    let project = create_project(&mut conn, USER, "Renovation", "", None).unwrap();
    let mut d = draft("paint", 80.0, "HOME", "2024-01-20");
    d.project_id = Some(project.project_id.clone());
    insert_spending(&mut conn, USER, d).unwrap();
    insert_spending(&mut conn, USER, draft("coffee", 5.0, "FOOD", "2024-01-21")).unwrap();

    let general = consult_spending(
        &conn,
        USER,
        &ConsultRequest::Sum {
            filter: SpendingFilter::default(),
        },
    )
    .unwrap();
    assert_eq!(general.as_records().unwrap().len(), 1);
    assert_eq!(general.as_records().unwrap()[0].category, "FOOD");

    let scoped = consult_spending(
        &conn,
        USER,
        &ConsultRequest::Sum {
            filter: SpendingFilter {
                project_id: Some(project.project_id.clone()),
                ..SpendingFilter::default()
            },
        },
    )
    .unwrap();
    assert_eq!(scoped.as_records().unwrap().len(), 1);
    assert_eq!(scoped.as_records().unwrap()[0].category, "HOME");
}

#[test]
fn max_and_min_return_single_extremes() {
    let mut conn = setup();
    insert_spending(&mut conn, USER, draft("a", 10.0, "FOOD", "2024-01-01")).unwrap();
    insert_spending(&mut conn, USER, draft("b", 50.0, "FUEL", "2024-01-02")).unwrap();
    insert_spending(&mut conn, USER, draft("c", 30.0, "HOME", "2024-01-03")).unwrap();

    let max = consult_spending(
        &conn,
        USER,
        &ConsultRequest::Max {
            filter: SpendingFilter::default(),
        },
    )
    .unwrap();
    let records = max.as_records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].value, 50.0);

    let min = consult_spending(
        &conn,
        USER,
        &ConsultRequest::Min {
            filter: SpendingFilter::default(),
        },
    )
    .unwrap();
    assert_eq!(min.as_records().unwrap()[0].value, 10.0);
}

#[test]
fn category_grouping_sums_and_sorts_descending() {
    let mut conn = setup();
    insert_spending(&mut conn, USER, draft("lunch", 20.0, "FOOD", "2024-01-01")).unwrap();
    insert_spending(&mut conn, USER, draft("dinner", 30.0, "FOOD", "2024-01-02")).unwrap();
    insert_spending(&mut conn, USER, draft("gas", 50.0, "FUEL", "2024-01-03")).unwrap();
    insert_spending(&mut conn, USER, draft("movie", 12.0, "LEISURE", "2024-01-04")).unwrap();

    let outcome = consult_spending(
        &conn,
        USER,
        &ConsultRequest::Category {
            filter: SpendingFilter::default(),
        },
    )
    .unwrap();
    let cats = outcome.as_categories().unwrap();
    assert_eq!(cats.len(), 3);
    // FOOD and FUEL tie at 50; their mutual order is store-defined.
    assert_eq!(cats[0].value, 50.0);
    assert_eq!(cats[1].value, 50.0);
    assert_eq!(cats[2].label, "LEISURE");
    assert_eq!(cats[2].value, 12.0);
    let labels: Vec<&str> = cats.iter().map(|c| c.label.as_str()).collect();
    assert!(labels.contains(&"FOOD") && labels.contains(&"FUEL"));
}

#[test]
fn comparative_groups_by_month_chronologically() {
    let mut conn = setup();
    insert_spending(&mut conn, USER, draft("a", 100.0, "FOOD", "2024-01-05")).unwrap();
    insert_spending(&mut conn, USER, draft("b", 50.0, "FOOD", "2024-01-25")).unwrap();
    insert_spending(&mut conn, USER, draft("c", 70.0, "FOOD", "2024-02-10")).unwrap();
    insert_spending(&mut conn, USER, draft("d", 9.0, "FOOD", "2025-01-01")).unwrap();

    let outcome = consult_spending(
        &conn,
        USER,
        &ConsultRequest::Comparative {
            from: "2024-01-01".to_string(),
            to: "2024-12-31".to_string(),
            filter: SpendingFilter::default(),
        },
    )
    .unwrap();
    let months = outcome.as_monthly().unwrap();
    assert_eq!(months.len(), 2);
    assert_eq!(months[0].month, "01/2024");
    assert_eq!(months[0].total, 150.0);
    assert_eq!(months[1].month, "02/2024");
    assert_eq!(months[1].total, 70.0);
}

#[test]
fn comparative_range_is_inclusive_on_both_ends() {
    let mut conn = setup();
    insert_spending(&mut conn, USER, draft("a", 10.0, "FOOD", "2024-01-01")).unwrap();
    insert_spending(&mut conn, USER, draft("b", 20.0, "FOOD", "2024-01-31")).unwrap();

    let outcome = consult_spending(
        &conn,
        USER,
        &ConsultRequest::Comparative {
            from: "2024-01-01".to_string(),
            to: "2024-01-31".to_string(),
            filter: SpendingFilter::default(),
        },
    )
    .unwrap();
    let months = outcome.as_monthly().unwrap();
    assert_eq!(months.len(), 1);
    assert_eq!(months[0].total, 30.0);
}

#[test]
fn consult_project_by_name_sorted_newest_first() {
    let mut conn = setup();
    let project = create_project(&mut conn, USER, "Trip", "", None).unwrap();
    for (desc, value, date) in [("hotel", 200.0, "2024-03-10"), ("flight", 450.0, "2024-02-01")] {
        let mut d = draft(desc, value, "TRAVEL", date);
        d.project_id = Some(project.project_id.clone());
        insert_spending(&mut conn, USER, d).unwrap();
    }

    let outcome = consult_spending(
        &conn,
        USER,
        &ConsultRequest::ConsultProject {
            project_name: "trip".to_string(),
        },
    )
    .unwrap();
    let records = outcome.as_records().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].description, "hotel");
    assert_eq!(records[1].description, "flight");
}

#[test]
fn consult_unknown_project_is_silently_empty() {
    let conn = setup();
    let outcome = consult_spending(
        &conn,
        USER,
        &ConsultRequest::ConsultProject {
            project_name: "nope".to_string(),
        },
    )
    .unwrap();
    assert!(outcome.as_records().unwrap().is_empty());
}

#[test]
fn revenue_and_spending_filter_by_type() {
    let mut conn = setup();
    insert_spending(&mut conn, USER, draft("salary-ish", 30.0, "FOOD", "2024-01-01")).unwrap();
    let mut d = draft("salary", 3000.0, "INCOME", "2024-01-01");
    d.kind = Some("REVENUE".to_string());
    insert_spending(&mut conn, USER, d).unwrap();

    let outcome = consult_spending(
        &conn,
        USER,
        &ConsultRequest::Sum {
            filter: SpendingFilter {
                kind: Some(SpendingKind::Revenue),
                ..SpendingFilter::default()
            },
        },
    )
    .unwrap();
    let records = outcome.as_records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].value, 3000.0);
}
