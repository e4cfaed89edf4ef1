use crate::time::Period;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new<S: AsRef<str>>(s: S) -> Self {
                Self(s.as_ref().to_owned())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifiant fort pour Team
    TeamId
);
string_id!(
    /// Identifiant fort pour TeamMember
    TeamMemberId
);
string_id!(
    /// Identifiant fort pour PayGrade
    PayGradeId
);
string_id!(
    /// Identifiant fort pour ShiftType
    ShiftTypeId
);
string_id!(
    /// Identifiant fort pour une règle de grade
    RuleId
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Membre d'équipe. Les membres supprimés (soft-delete) ont `active = false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: TeamMemberId,
    #[serde(default)]
    pub pay_grade_id: Option<PayGradeId>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl TeamMember {
    pub fn new<S: AsRef<str>>(id: S, pay_grade: Option<&str>) -> Self {
        Self {
            id: TeamMemberId::new(id),
            pay_grade_id: pay_grade.map(PayGradeId::new),
            active: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayGrade {
    pub id: PayGradeId,
    #[serde(default)]
    pub base_rate: f64,
}

/// Type de créneau, heures murales `HH:mm`. `end_time <= start_time` : passe minuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftType {
    pub id: ShiftTypeId,
    pub start_time: String,
    pub end_time: String,
}

impl ShiftType {
    pub fn new<S: AsRef<str>>(id: S, start_time: &str, end_time: &str) -> Self {
        Self {
            id: ShiftTypeId::new(id),
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
        }
    }
}

/// Lien d'éligibilité grade → type de créneau.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayGradeShiftType {
    pub pay_grade_id: PayGradeId,
    pub shift_type_id: ShiftTypeId,
}

/// Heures d'ouverture pour un jour ISO (1 = lundi … 7 = dimanche).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationalHour {
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unavailability {
    pub team_member_id: TeamMemberId,
    pub date: DateTime<Utc>,
}

/// Affectation déjà enregistrée sur la période.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingAssignment {
    pub team_member_id: TeamMemberId,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub shift_type_id: Option<ShiftTypeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Metric {
    DaysWorked,
    HoursWorked,
    DaysOff,
    ConsecutiveDaysWorked,
    UniqueMembersAssigned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeWindow {
    Day,
    Week,
    Month,
    RollingWeek,
    RollingMonth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleOperator {
    Min,
    Max,
}

/// Règle de charge attachée à un grade (`pay_grade_id = None` : toute l'équipe).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayGradeRule {
    pub id: RuleId,
    #[serde(default)]
    pub pay_grade_id: Option<PayGradeId>,
    pub metric: Metric,
    pub time_window: TimeWindow,
    pub operator: RuleOperator,
    pub threshold: f64,
    #[serde(default)]
    pub hard_constraint: bool,
}

impl PayGradeRule {
    pub fn applies_to(&self, member: &TeamMember) -> bool {
        match &self.pay_grade_id {
            Some(pg) => member.pay_grade_id.as_ref() == Some(pg),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffingRequirement {
    pub min_members_per_day: u32,
}

/// Lecture brute (non zonée) de l'état d'une équipe pour une période.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSnapshot {
    pub team: Team,
    pub team_members: Vec<TeamMember>,
    pub pay_grades: Vec<PayGrade>,
    pub shift_types: Vec<ShiftType>,
    pub pay_grade_shift_types: Vec<PayGradeShiftType>,
    pub pay_grade_rules: Vec<PayGradeRule>,
    pub operational_hours: Vec<OperationalHour>,
    pub unavailabilities: Vec<Unavailability>,
    pub assignments: Vec<ExistingAssignment>,
    pub period: Period,
}

/// Affectation proposée (date calendaire dans le fuseau de l'équipe).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ProposedAssignment {
    pub date: NaiveDate,
    pub team_member_id: TeamMemberId,
    pub shift_type_id: ShiftTypeId,
}

/// Affectation renvoyée à l'appelant (instant UTC du minuit local).
// NOTE: le type de créneau n'est pas transmis ; contrat de sortie à confirmer
// avant de l'ajouter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub team_member_id: TeamMemberId,
    pub date: DateTime<Utc>,
}

/// Mode de génération. Purement indicatif : rien n'est persisté ici.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationMode {
    #[default]
    DryRun,
    Replace,
}

impl FromStr for GenerationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dry-run" | "dryrun" => Ok(Self::DryRun),
            "replace" => Ok(Self::Replace),
            other => Err(format!("unknown mode: {other} (expected dry-run|replace)")),
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DryRun => f.write_str("dry-run"),
            Self::Replace => f.write_str("replace"),
        }
    }
}
