//! Contexte zoné : la photo d'équipe convertie dans le fuseau de l'équipe,
//! prête à être modélisée.

use crate::error::SchedError;
use crate::interval::MinuteSpan;
use crate::model::{
    Metric, PayGrade, PayGradeId, PayGradeRule, ShiftTypeId, StaffingRequirement, Team,
    TeamMember, TeamMemberId, TeamSnapshot,
};
use crate::time::{self, ZonedPeriod};
use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Fenêtre murale d'un jour de la semaine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl DailyWindow {
    /// Fenêtre vide (`start == end`) : le jour est fermé.
    pub fn is_closed(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZonedShiftType {
    pub id: ShiftTypeId,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl ZonedShiftType {
    /// Intervalle mural, indépendant de la date (sans effet DST).
    pub fn nominal_span(&self) -> MinuteSpan {
        MinuteSpan::from_times(self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZonedUnavailability {
    pub team_member_id: TeamMemberId,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZonedAssignment {
    pub team_member_id: TeamMemberId,
    pub date: NaiveDate,
    pub shift_type_id: Option<ShiftTypeId>,
}

/// Vue immuable consommée par le constructeur de modèle et le calcul de couverture.
#[derive(Debug, Clone)]
pub struct SchedulerContext {
    pub team: Team,
    pub period: ZonedPeriod,
    /// Membres actifs uniquement.
    pub members: Vec<TeamMember>,
    pub pay_grades: Vec<PayGrade>,
    pub shift_types: Vec<ZonedShiftType>,
    pub rules: Vec<PayGradeRule>,
    /// Clé : jour ISO 1..=7.
    pub operational_hours: BTreeMap<u8, DailyWindow>,
    pub unavailabilities: Vec<ZonedUnavailability>,
    pub assignments: Vec<ZonedAssignment>,
    pub staffing: StaffingRequirement,
    eligibility: HashMap<PayGradeId, HashSet<ShiftTypeId>>,
    unavailable: HashSet<(TeamMemberId, NaiveDate)>,
}

impl SchedulerContext {
    pub fn from_snapshot(
        snapshot: TeamSnapshot,
        staffing: StaffingRequirement,
    ) -> Result<Self, SchedError> {
        let period = snapshot.period.zoned();
        let tz = snapshot.period.time_zone;

        let shift_types = snapshot
            .shift_types
            .iter()
            .map(|st| {
                Ok(ZonedShiftType {
                    id: st.id.clone(),
                    start: time::parse_time_of_day(&st.start_time)?,
                    end: time::parse_time_of_day(&st.end_time)?,
                })
            })
            .collect::<Result<Vec<_>, SchedError>>()?;

        let mut operational_hours = BTreeMap::new();
        for oh in &snapshot.operational_hours {
            if !(1..=7).contains(&oh.day_of_week) {
                return Err(SchedError::InvalidWeekday(oh.day_of_week));
            }
            let window = DailyWindow {
                start: time::parse_time_of_day(&oh.start_time)?,
                end: time::parse_time_of_day(&oh.end_time)?,
            };
            operational_hours.insert(oh.day_of_week, window);
        }

        for rule in &snapshot.pay_grade_rules {
            validate_rule(rule)?;
        }

        let mut eligibility: HashMap<PayGradeId, HashSet<ShiftTypeId>> = HashMap::new();
        for link in &snapshot.pay_grade_shift_types {
            eligibility
                .entry(link.pay_grade_id.clone())
                .or_default()
                .insert(link.shift_type_id.clone());
        }

        let unavailabilities: Vec<ZonedUnavailability> = snapshot
            .unavailabilities
            .iter()
            .map(|u| ZonedUnavailability {
                team_member_id: u.team_member_id.clone(),
                date: time::to_local_date(u.date, tz),
            })
            .collect();
        let unavailable = unavailabilities
            .iter()
            .map(|u| (u.team_member_id.clone(), u.date))
            .collect();

        let assignments = snapshot
            .assignments
            .iter()
            .map(|a| ZonedAssignment {
                team_member_id: a.team_member_id.clone(),
                date: time::to_local_date(a.date, tz),
                shift_type_id: a.shift_type_id.clone(),
            })
            .collect();

        let members = snapshot
            .team_members
            .into_iter()
            .filter(|m| m.active)
            .collect();

        Ok(Self {
            team: snapshot.team,
            period,
            members,
            pay_grades: snapshot.pay_grades,
            shift_types,
            rules: snapshot.pay_grade_rules,
            operational_hours,
            unavailabilities,
            assignments,
            staffing,
            eligibility,
            unavailable,
        })
    }

    pub fn time_zone(&self) -> Tz {
        self.period.time_zone()
    }

    pub fn num_days(&self) -> u32 {
        self.period.num_days()
    }

    pub fn date_at(&self, day: u32) -> NaiveDate {
        self.period.date_at(day)
    }

    pub fn weekday_at(&self, day: u32) -> u8 {
        time::weekday_number(self.date_at(day))
    }

    /// Un membre sans grade n'est éligible à rien.
    pub fn is_eligible(&self, member: &TeamMember, shift: &ZonedShiftType) -> bool {
        member
            .pay_grade_id
            .as_ref()
            .and_then(|pg| self.eligibility.get(pg))
            .is_some_and(|set| set.contains(&shift.id))
    }

    pub fn is_unavailable(&self, member: &TeamMemberId, date: NaiveDate) -> bool {
        self.unavailable.contains(&(member.clone(), date))
    }

    pub fn operational_window(&self, weekday: u8) -> Option<&DailyWindow> {
        self.operational_hours.get(&weekday)
    }

    /// Intervalle réel du créneau le jour `day`, en minutes écoulées depuis
    /// minuit local (tient compte d'un changement d'heure).
    pub fn shift_span_on(&self, day: u32, shift: &ZonedShiftType) -> MinuteSpan {
        self.span_on(self.date_at(day), shift.start, shift.end)
    }

    pub fn shift_hours_on(&self, day: u32, shift: &ZonedShiftType) -> f64 {
        self.shift_span_on(day, shift).hours()
    }

    /// `None` si aucune heure d'ouverture n'est configurée pour ce jour ou si
    /// la fenêtre est vide.
    pub fn operational_span_on(&self, day: u32) -> Option<MinuteSpan> {
        let window = self.operational_window(self.weekday_at(day))?;
        if window.is_closed() {
            return None;
        }
        Some(self.span_on(self.date_at(day), window.start, window.end))
    }

    fn span_on(&self, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> MinuteSpan {
        let tz = self.time_zone();
        let midnight = time::local_midnight(date, tz);
        let end_date = if end <= start {
            date.succ_opt().unwrap_or(date)
        } else {
            date
        };
        let s = time::at_local(date, start, tz);
        let e = time::at_local(end_date, end, tz);
        MinuteSpan::new(
            (s - midnight).num_minutes(),
            (e - midnight).num_minutes(),
        )
    }
}

fn validate_rule(rule: &PayGradeRule) -> Result<(), SchedError> {
    let invalid = |reason| SchedError::InvalidRule {
        rule: rule.id.to_string(),
        reason,
    };
    if !rule.threshold.is_finite() || rule.threshold < 0.0 {
        return Err(invalid("threshold must be a non-negative number"));
    }
    if matches!(
        rule.metric,
        Metric::ConsecutiveDaysWorked | Metric::UniqueMembersAssigned | Metric::DaysWorked | Metric::DaysOff
    ) && rule.threshold.fract() != 0.0
    {
        return Err(invalid("threshold must be a whole number for this metric"));
    }
    Ok(())
}
