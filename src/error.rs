use chrono::NaiveDate;
use thiserror::Error;

/// Erreurs du moteur de planification.
///
/// Les erreurs de validation sont levées avant toute résolution. Un modèle
/// infaisable n'est PAS une erreur : il est représenté par un
/// [`SolverResult`](crate::engine::SolverResult) sans `values`.
#[derive(Error, Debug)]
pub enum SchedError {
    #[error("unknown time zone: {0}")]
    UnknownTimeZone(String),
    #[error("invalid period: {year}-{month:02}")]
    InvalidPeriod { year: i32, month: u32 },
    #[error("invalid date range: {first} is after {last}")]
    InvalidDateRange { first: NaiveDate, last: NaiveDate },
    #[error("invalid time of day: {0:?} (expected HH:mm)")]
    InvalidTime(String),
    #[error("invalid weekday: {0} (expected 1..=7)")]
    InvalidWeekday(u8),
    #[error("unknown team: {0}")]
    UnknownTeam(String),
    #[error("invalid rule {rule}: {reason}")]
    InvalidRule { rule: String, reason: &'static str },
    #[error("variable already exists: {0}")]
    DuplicateVariable(String),
    #[error("too many segments in a day: {count} (max {max})")]
    TooManySegments { count: usize, max: usize },
    #[error("no operational hours configured for {date} (weekday {weekday})")]
    MissingOperationalHours { date: NaiveDate, weekday: u8 },
    #[error("solver transport failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("solver request failed: {status} {body}")]
    SolverHttp { status: u16, body: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
