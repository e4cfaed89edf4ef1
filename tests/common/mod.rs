#![allow(dead_code)]
use chrono::NaiveDate;
use chrono_tz::Tz;
use roulement::model::{
    OperationalHour, PayGrade, PayGradeId, PayGradeShiftType, ShiftType, ShiftTypeId,
    StaffingRequirement, Team, TeamId, TeamMember, TeamSnapshot,
};
use roulement::repository::TeamRecord;
use roulement::time::Period;
use roulement::SchedulerContext;

pub const PARIS: Tz = chrono_tz::Europe::Paris;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn weekday_hours(days: std::ops::RangeInclusive<u8>, start: &str, end: &str) -> Vec<OperationalHour> {
    days.map(|day_of_week| OperationalHour {
        day_of_week,
        start_time: start.to_string(),
        end_time: end.to_string(),
    })
    .collect()
}

pub fn eligible(pay_grade: &str, shift: &str) -> PayGradeShiftType {
    PayGradeShiftType {
        pay_grade_id: PayGradeId::new(pay_grade),
        shift_type_id: ShiftTypeId::new(shift),
    }
}

/// Deux membres (un seul éligible), un créneau 09:00–17:00, ouvert du lundi au vendredi.
pub fn scenario_a_record() -> TeamRecord {
    TeamRecord {
        team: Team {
            id: TeamId::new("t1"),
            name: Some("Support".to_string()),
        },
        team_members: vec![
            TeamMember::new("alice", Some("pg-day")),
            TeamMember::new("bob", Some("pg-none")),
        ],
        pay_grades: vec![
            PayGrade {
                id: PayGradeId::new("pg-day"),
                base_rate: 20.0,
            },
            PayGrade {
                id: PayGradeId::new("pg-none"),
                base_rate: 15.0,
            },
        ],
        shift_types: vec![ShiftType::new("day", "09:00", "17:00")],
        pay_grade_shift_types: vec![eligible("pg-day", "day")],
        pay_grade_rules: vec![],
        operational_hours: weekday_hours(1..=5, "09:00", "17:00"),
        unavailabilities: vec![],
        assignments: vec![],
    }
}

pub fn snapshot(record: &TeamRecord, first: NaiveDate, last: NaiveDate) -> TeamSnapshot {
    let period = Period::from_dates(first, last, PARIS).unwrap();
    record.snapshot(&period)
}

pub fn context(snapshot: TeamSnapshot, min_members_per_day: u32) -> SchedulerContext {
    SchedulerContext::from_snapshot(snapshot, StaffingRequirement { min_members_per_day }).unwrap()
}

/// Scénario A sur la semaine ouvrée du 2 au 6 juin 2025.
pub fn scenario_a_context() -> SchedulerContext {
    context(
        snapshot(&scenario_a_record(), date(2025, 6, 2), date(2025, 6, 6)),
        1,
    )
}
