use chrono::{NaiveTime, Timelike};

const DAY_MINUTES: i64 = 24 * 60;

/// Intervalle semi-ouvert `[start, end)` en minutes depuis minuit local.
///
/// Seule implémentation du chevauchement : la découpe en segments et la
/// contrainte de couverture passent toutes deux par ici.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MinuteSpan {
    pub start: i64,
    pub end: i64,
}

impl MinuteSpan {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Heures murales ; `end <= start` passe minuit (+24 h).
    pub fn from_times(start: NaiveTime, end: NaiveTime) -> Self {
        let start_min = i64::from(start.num_seconds_from_midnight()) / 60;
        let mut end_min = i64::from(end.num_seconds_from_midnight()) / 60;
        if end <= start {
            end_min += DAY_MINUTES;
        }
        Self::new(start_min, end_min)
    }

    pub fn len(&self) -> i64 {
        (self.end - self.start).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hours(&self) -> f64 {
        self.len() as f64 / 60.0
    }

    pub fn overlaps(&self, other: &MinuteSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Durée commune en minutes (0 si disjoints).
    pub fn overlap(&self, other: &MinuteSpan) -> i64 {
        (self.end.min(other.end) - self.start.max(other.start)).max(0)
    }
}

/// `HH:MM` (les heures peuvent dépasser 24 pour un créneau de nuit).
pub fn format_minutes(minutes: i64) -> String {
    format!("{:02}:{:02}", minutes.div_euclid(60), minutes.rem_euclid(60))
}
