#![forbid(unsafe_code)]
mod common;

use common::{context, date, scenario_a_context, scenario_a_record, snapshot, weekday_hours};
use roulement::engine::{Comparison, ModelBuilder, VarKind};
use roulement::model::{
    Metric, PayGradeId, PayGradeRule, RuleId, RuleOperator, ShiftType, TeamMember, TimeWindow,
    Unavailability,
};
use roulement::{ClosedDayPolicy, SchedError};
use std::collections::HashSet;

fn rule(id: &str, pay_grade: Option<&str>, metric: Metric, window: TimeWindow, op: RuleOperator, threshold: f64) -> PayGradeRule {
    PayGradeRule {
        id: RuleId::new(id),
        pay_grade_id: pay_grade.map(PayGradeId::new),
        metric,
        time_window: window,
        operator: op,
        threshold,
        hard_constraint: true,
    }
}

#[test]
fn scenario_a_excludes_ineligible_member() {
    let ctx = scenario_a_context();
    let model = ModelBuilder::new(&ctx).build().unwrap();

    assert_eq!(model.variables.assignment_count(), 2 * 5);

    let eligibility: Vec<_> = model.constraints_with_prefix("eligibility__").collect();
    assert_eq!(eligibility.len(), 5);
    for c in &eligibility {
        assert!(c.name.starts_with("eligibility__bob__"));
        assert_eq!(c.op, Comparison::Eq);
        assert_eq!(c.rhs, 0.0);
    }
    // toutes les variables de bob sont forcées à 0
    for day in 0..5 {
        let var = model.variables.slot(1, day, 0);
        assert!(eligibility.iter().any(|c| c.coefficients.get(var) == Some(1.0)));
    }

    let min_members: Vec<_> = model.constraints_with_prefix("minMembersPerDay__").collect();
    assert_eq!(min_members.len(), 5);
    assert!(min_members.iter().all(|c| c.rhs == 1.0 && c.op == Comparison::Ge));

    assert_eq!(model.constraints_with_prefix("operationalCoverage__").count(), 5);
}

#[test]
fn variable_names_are_unique() {
    let mut record = scenario_a_record();
    record.shift_types.push(ShiftType::new("late", "13:00", "21:00"));
    record.pay_grade_shift_types.push(common::eligible("pg-day", "late"));
    record.pay_grade_rules = vec![
        rule("r-u", None, Metric::UniqueMembersAssigned, TimeWindow::Day, RuleOperator::Max, 1.0),
        rule("r-h", None, Metric::HoursWorked, TimeWindow::Week, RuleOperator::Max, 40.0),
    ];
    let ctx = context(snapshot(&record, date(2025, 6, 2), date(2025, 6, 8)), 1);
    let model = ModelBuilder::new(&ctx).build().unwrap();

    let names: HashSet<_> = model.variables.iter().map(|(_, d)| d.name.as_str()).collect();
    assert_eq!(names.len(), model.variables.len());
    let constraint_names: HashSet<_> = model.constraints.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(constraint_names.len(), model.constraints.len());
}

#[test]
fn max_one_shift_per_day_rows_are_binary() {
    let mut record = scenario_a_record();
    record.shift_types.push(ShiftType::new("late", "13:00", "21:00"));
    let ctx = context(snapshot(&record, date(2025, 6, 2), date(2025, 6, 6)), 1);
    let model = ModelBuilder::new(&ctx).build().unwrap();

    let rows: Vec<_> = model.constraints_with_prefix("maxOneShiftPerDay__").collect();
    assert_eq!(rows.len(), 2 * 5);
    for row in rows {
        assert_eq!(row.rhs, 1.0);
        assert_eq!(row.op, Comparison::Le);
        assert_eq!(row.coefficients.len(), 2);
        assert!(row.coefficients.iter().all(|(_, c)| c == 0.0 || c == 1.0));
    }
}

#[test]
fn member_without_pay_grade_is_eligible_for_nothing() {
    let mut record = scenario_a_record();
    record.team_members.push(TeamMember::new("carol", None));
    let ctx = context(snapshot(&record, date(2025, 6, 2), date(2025, 6, 6)), 1);
    let model = ModelBuilder::new(&ctx).build().unwrap();
    assert_eq!(model.constraints_with_prefix("eligibility__carol__").count(), 5);
}

#[test]
fn inactive_members_are_not_scheduled() {
    let mut record = scenario_a_record();
    let mut gone = TeamMember::new("dave", Some("pg-day"));
    gone.active = false;
    record.team_members.push(gone);
    let ctx = context(snapshot(&record, date(2025, 6, 2), date(2025, 6, 6)), 1);
    assert_eq!(ctx.members.len(), 2);
    let model = ModelBuilder::new(&ctx).build().unwrap();
    assert!(model.variables.lookup("assign__dave__0__day").is_none());
}

#[test]
fn unavailable_member_is_blocked_on_that_date() {
    let mut record = scenario_a_record();
    // 2025-06-04 00:30 à Paris = 2025-06-03 22:30 UTC
    record.unavailabilities.push(Unavailability {
        team_member_id: roulement::model::TeamMemberId::new("alice"),
        date: "2025-06-03T22:30:00Z".parse().unwrap(),
    });
    let ctx = context(snapshot(&record, date(2025, 6, 2), date(2025, 6, 6)), 1);
    let model = ModelBuilder::new(&ctx).build().unwrap();

    let rows: Vec<_> = model.constraints_with_prefix("availability__").collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "availability__alice__2__day");
    let var = model.variables.lookup("assign__alice__2__day").unwrap();
    assert_eq!(rows[0].coefficients.get(var), Some(1.0));
    assert_eq!(rows[0].op, Comparison::Eq);
}

#[test]
fn consecutive_days_use_full_windows() {
    let mut record = scenario_a_record();
    record.pay_grade_rules = vec![rule(
        "r-consec",
        Some("pg-day"),
        Metric::ConsecutiveDaysWorked,
        TimeWindow::RollingWeek,
        RuleOperator::Max,
        2.0,
    )];
    let ctx = context(snapshot(&record, date(2025, 6, 2), date(2025, 6, 6)), 1);
    let model = ModelBuilder::new(&ctx).build().unwrap();

    let rows: Vec<_> = model.constraints_with_prefix("payGradeRule__r-consec__").collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].name, "payGradeRule__r-consec__consec__alice__0");
    assert!(rows.iter().all(|r| r.coefficients.len() == 3 && r.rhs == 2.0 && r.op == Comparison::Le));
}

#[test]
fn days_off_flips_into_days_worked() {
    let mut record = scenario_a_record();
    record.pay_grade_rules = vec![rule(
        "r-off",
        Some("pg-day"),
        Metric::DaysOff,
        TimeWindow::Week,
        RuleOperator::Min,
        2.0,
    )];
    let ctx = context(snapshot(&record, date(2025, 6, 2), date(2025, 6, 8)), 1);
    let model = ModelBuilder::new(&ctx).build().unwrap();

    let row = model.constraint("payGradeRule__r-off__alice__0").unwrap();
    assert_eq!(row.op, Comparison::Le);
    assert_eq!(row.rhs, 5.0);
    assert_eq!(row.coefficients.len(), 7);
}

#[test]
fn hours_worked_weights_by_shift_duration() {
    let mut record = scenario_a_record();
    record.pay_grade_rules = vec![rule(
        "r-h",
        None,
        Metric::HoursWorked,
        TimeWindow::Month,
        RuleOperator::Max,
        24.0,
    )];
    let ctx = context(snapshot(&record, date(2025, 6, 2), date(2025, 6, 6)), 1);
    let model = ModelBuilder::new(&ctx).build().unwrap();

    // mois plus long que la période : une seule fenêtre
    let row = model.constraint("payGradeRule__r-h__alice__0").unwrap();
    assert!(model.constraint("payGradeRule__r-h__alice__1").is_none());
    assert_eq!(row.coefficients.len(), 5);
    assert!(row.coefficients.iter().all(|(_, c)| c == 8.0));
    assert_eq!(row.rhs, 24.0);
}

#[test]
fn unique_members_link_both_ways() {
    let mut record = scenario_a_record();
    record.pay_grade_rules = vec![rule(
        "r-u",
        None,
        Metric::UniqueMembersAssigned,
        TimeWindow::Day,
        RuleOperator::Max,
        1.0,
    )];
    let ctx = context(snapshot(&record, date(2025, 6, 2), date(2025, 6, 6)), 1);
    let model = ModelBuilder::new(&ctx).build().unwrap();

    let aux = model.variables.lookup("uniqueMember__r-u__alice__0").unwrap();
    assert_eq!(model.variables.get(aux).unwrap().kind, VarKind::Binary);

    assert_eq!(model.constraints_with_prefix("link_").count(), 2 * 5);
    assert_eq!(model.constraints_with_prefix("reverse_link_").count(), 2 * 5);
    let link = model
        .constraint("link_uniqueMember__r-u__alice__0__assign__alice__0__day")
        .unwrap();
    assert_eq!(link.op, Comparison::Ge);

    let window = model.constraint("payGradeRule__r-u__uniqueMembers_window_0").unwrap();
    assert_eq!(window.coefficients.len(), 2);
    assert_eq!(window.op, Comparison::Le);
    assert_eq!(window.rhs, 1.0);
}

#[test]
fn soft_rules_are_not_modeled() {
    let mut record = scenario_a_record();
    let mut soft = rule("r-soft", None, Metric::DaysWorked, TimeWindow::Day, RuleOperator::Max, 1.0);
    soft.hard_constraint = false;
    record.pay_grade_rules = vec![soft];
    let ctx = context(snapshot(&record, date(2025, 6, 2), date(2025, 6, 6)), 1);
    let model = ModelBuilder::new(&ctx).build().unwrap();
    assert_eq!(model.constraints_with_prefix("payGradeRule__").count(), 0);
}

#[test]
fn invalid_rule_threshold_is_rejected() {
    let mut record = scenario_a_record();
    record.pay_grade_rules = vec![rule(
        "r-bad",
        None,
        Metric::ConsecutiveDaysWorked,
        TimeWindow::Week,
        RuleOperator::Max,
        2.5,
    )];
    let snap = snapshot(&record, date(2025, 6, 2), date(2025, 6, 6));
    let err = roulement::SchedulerContext::from_snapshot(
        snap,
        roulement::model::StaffingRequirement { min_members_per_day: 1 },
    )
    .unwrap_err();
    assert!(matches!(err, SchedError::InvalidRule { .. }));
}

#[test]
fn weekend_without_hours_is_skipped_by_default() {
    let ctx = context(
        snapshot(&scenario_a_record(), date(2025, 6, 2), date(2025, 6, 8)),
        1,
    );
    let model = ModelBuilder::new(&ctx).build().unwrap();

    assert_eq!(model.constraints_with_prefix("minMembersPerDay__").count(), 7);
    let coverage: Vec<_> = model
        .constraints_with_prefix("operationalCoverage__")
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(coverage.len(), 5);
    assert!(!coverage.contains(&"operationalCoverage__5"));
    assert!(!coverage.contains(&"operationalCoverage__6"));
}

#[test]
fn weekend_without_hours_can_be_rejected() {
    let ctx = context(
        snapshot(&scenario_a_record(), date(2025, 6, 2), date(2025, 6, 8)),
        1,
    );
    let err = ModelBuilder::new(&ctx)
        .with_closed_day_policy(ClosedDayPolicy::Reject)
        .build()
        .unwrap_err();
    match err {
        SchedError::MissingOperationalHours { date: d, weekday } => {
            assert_eq!(d, date(2025, 6, 7));
            assert_eq!(weekday, 6);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn operational_coverage_counts_overlap_minutes() {
    let mut record = scenario_a_record();
    record.shift_types = vec![ShiftType::new("day", "09:00", "13:00")];
    let ctx = context(snapshot(&record, date(2025, 6, 2), date(2025, 6, 2)), 1);
    let model = ModelBuilder::new(&ctx).build().unwrap();

    // 4 h couvertes sur 8 h d'ouverture
    let row = model.constraint("operationalCoverage__0").unwrap();
    assert_eq!(row.op, Comparison::Ge);
    assert_eq!(row.rhs, 480.0);
    assert_eq!(row.coefficients.len(), 2);
    assert!(row.coefficients.iter().all(|(_, c)| c == 240.0));
}

#[test]
fn hours_outside_every_shift_emit_no_coverage_row() {
    let mut record = scenario_a_record();
    record.operational_hours = weekday_hours(1..=1, "18:00", "20:00");
    let ctx = context(snapshot(&record, date(2025, 6, 2), date(2025, 6, 2)), 1);
    let model = ModelBuilder::new(&ctx).build().unwrap();

    assert!(model.constraint("operationalCoverage__0").is_none());
    assert_eq!(model.constraints_with_prefix("operationalCoverage__").count(), 0);
    // le reste du modèle est construit
    assert!(model.constraint("minMembersPerDay__0").is_some());
}

#[test]
fn empty_hours_window_is_a_closed_day() {
    let mut record = scenario_a_record();
    record.operational_hours = weekday_hours(1..=1, "00:00", "00:00");
    let ctx = context(snapshot(&record, date(2025, 6, 2), date(2025, 6, 2)), 1);

    assert!(ctx.operational_span_on(0).is_none());
    let model = ModelBuilder::new(&ctx).build().unwrap();
    assert!(model.constraint("operationalCoverage__0").is_none());
}

#[test]
fn week_windows_slide_over_a_longer_period() {
    let mut record = scenario_a_record();
    record.pay_grade_rules = vec![rule(
        "r-w",
        Some("pg-day"),
        Metric::DaysWorked,
        TimeWindow::Week,
        RuleOperator::Max,
        5.0,
    )];
    // 10 jours : fenêtres de 7 jours commençant aux jours 0 à 3
    let ctx = context(snapshot(&record, date(2025, 6, 2), date(2025, 6, 11)), 1);
    let model = ModelBuilder::new(&ctx).build().unwrap();

    let rows: Vec<_> = model.constraints_with_prefix("payGradeRule__r-w__").collect();
    assert_eq!(rows.len(), 4);
    for w in 0..4 {
        let row = model
            .constraint(&format!("payGradeRule__r-w__alice__{w}"))
            .unwrap();
        assert_eq!(row.coefficients.len(), 7);
        assert_eq!(row.op, Comparison::Le);
        assert_eq!(row.rhs, 5.0);
    }
    assert!(model.constraint("payGradeRule__r-w__alice__4").is_none());

    let first = model.constraint("payGradeRule__r-w__alice__0").unwrap();
    let last = model.constraint("payGradeRule__r-w__alice__3").unwrap();
    let day0 = model.variables.lookup("assign__alice__0__day").unwrap();
    let day9 = model.variables.lookup("assign__alice__9__day").unwrap();
    assert!(first.coefficients.iter().any(|(v, _)| v == day0));
    assert!(!first.coefficients.iter().any(|(v, _)| v == day9));
    assert!(last.coefficients.iter().any(|(v, _)| v == day9));
    assert!(!last.coefficients.iter().any(|(v, _)| v == day0));
}

#[test]
fn unique_members_per_week_window() {
    let mut record = scenario_a_record();
    record.pay_grade_rules = vec![rule(
        "r-uw",
        None,
        Metric::UniqueMembersAssigned,
        TimeWindow::Week,
        RuleOperator::Max,
        1.0,
    )];
    let ctx = context(snapshot(&record, date(2025, 6, 2), date(2025, 6, 11)), 1);
    let model = ModelBuilder::new(&ctx).build().unwrap();

    let windows: Vec<_> = model
        .constraints_with_prefix("payGradeRule__r-uw__uniqueMembers_window_")
        .collect();
    assert_eq!(windows.len(), 4);
    assert!(windows.iter().all(|w| w.coefficients.len() == 2 && w.rhs == 1.0));
    assert!(model.variables.lookup("uniqueMember__r-uw__bob__3").is_some());
    assert!(model.variables.lookup("uniqueMember__r-uw__alice__4").is_none());

    // 2 membres × 4 fenêtres × 7 jours × 1 créneau
    assert_eq!(model.constraints_with_prefix("link_uniqueMember__r-uw__").count(), 2 * 4 * 7);
    assert_eq!(model.constraints_with_prefix("reverse_link_uniqueMember__r-uw__").count(), 2 * 4);
}

#[test]
fn dst_night_has_real_duration() {
    let mut record = scenario_a_record();
    record.shift_types = vec![
        ShiftType::new("night", "00:00", "08:00"),
        ShiftType::new("late", "22:00", "06:00"),
    ];
    record.operational_hours = weekday_hours(1..=7, "00:00", "08:00");
    // passage à l'heure d'été le dimanche 30 mars
    let ctx = context(snapshot(&record, date(2025, 3, 30), date(2025, 3, 31)), 1);

    assert_eq!(ctx.shift_hours_on(0, &ctx.shift_types[0]), 7.0);
    assert_eq!(ctx.shift_hours_on(1, &ctx.shift_types[0]), 8.0);
    // passe minuit
    assert_eq!(ctx.shift_hours_on(1, &ctx.shift_types[1]), 8.0);
}

#[test]
fn balance_and_shift_change_objectives() {
    let mut record = scenario_a_record();
    record.shift_types.push(ShiftType::new("late", "13:00", "21:00"));
    let ctx = context(snapshot(&record, date(2025, 6, 2), date(2025, 6, 6)), 1);
    let model = ModelBuilder::new(&ctx).build().unwrap();

    let avg = model.variables.lookup("balance_avgHours").unwrap();
    assert_eq!(model.variables.get(avg).unwrap().kind, VarKind::Continuous);
    assert!(model.constraint("balance_dev_upper__alice").is_some());
    assert!(model.constraint("balance_dev_lower__bob").is_some());

    // 4 transitions par membre, 2 paires ordonnées de types distincts
    assert_eq!(model.constraints_with_prefix("shiftChange__").count(), 2 * 4 * 2);
    assert!(model.variables.lookup("shiftChange__alice__3").is_some());
    assert!(model.variables.lookup("shiftChange__alice__4").is_none());

    let objective = model.objective.as_ref().unwrap();
    assert_eq!(objective.terms.len(), 2 + 2 * 4);
}

#[test]
fn single_shift_type_has_no_shift_change_terms() {
    let ctx = scenario_a_context();
    let model = ModelBuilder::new(&ctx).build().unwrap();
    assert_eq!(model.constraints_with_prefix("shiftChange__").count(), 0);
    assert_eq!(model.objective.as_ref().unwrap().terms.len(), 2);
}
