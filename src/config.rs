use crate::engine::SolverOptions;
use crate::model::StaffingRequirement;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Traitement d'un jour sans heures d'ouverture configurées.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClosedDayPolicy {
    /// Jour fermé : aucune contrainte de couverture.
    #[default]
    Skip,
    /// Erreur `MissingOperationalHours`.
    Reject,
}

impl FromStr for ClosedDayPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown closed-day policy: {other} (expected skip|reject)")),
        }
    }
}

impl fmt::Display for ClosedDayPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => f.write_str("skip"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

/// Options du service de planification
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub solver_url: String,
    /// Limite de résolution transmise au solveur (côté serveur).
    pub time_limit_seconds: Option<u32>,
    pub request_timeout: Duration,
    pub min_members_per_day: u32,
    pub closed_day_policy: ClosedDayPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            solver_url: "http://localhost:8000/solve".to_string(),
            time_limit_seconds: Some(100),
            request_timeout: Duration::from_secs(120),
            min_members_per_day: 3,
            closed_day_policy: ClosedDayPolicy::Skip,
        }
    }
}

impl SchedulerConfig {
    pub fn staffing(&self) -> StaffingRequirement {
        StaffingRequirement {
            min_members_per_day: self.min_members_per_day,
        }
    }

    pub fn solver_options(&self) -> SolverOptions {
        SolverOptions {
            time_limit_seconds: self.time_limit_seconds,
        }
    }
}
