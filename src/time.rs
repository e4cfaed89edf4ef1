//! Périodes mensuelles et arithmétique de dates ancrée dans le fuseau de l'équipe.
//!
//! Les bornes sont calculées en heure locale (jamais par pas fixes de 24 h),
//! puis stockées en instants UTC. Le nombre de jours d'une période est une
//! différence de jours calendaires, pas une durée écoulée.

use crate::error::SchedError;
use chrono::{
    DateTime, Datelike, Days, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Période en instants absolus (UTC), avec le fuseau de l'équipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub time_zone: Tz,
}

/// Même période, réhydratée dans le fuseau de l'équipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZonedPeriod {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl Period {
    /// Période couvrant les jours calendaires `first..=last` dans `tz`.
    ///
    /// `start` est minuit local du premier jour, `end` le dernier instant
    /// (à la milliseconde) du dernier jour.
    pub fn from_dates(first: NaiveDate, last: NaiveDate, tz: Tz) -> Result<Self, SchedError> {
        if last < first {
            return Err(SchedError::InvalidDateRange { first, last });
        }
        let after = last
            .succ_opt()
            .ok_or(SchedError::InvalidDateRange { first, last })?;
        let start = local_midnight(first, tz);
        let end = local_midnight(after, tz) - Duration::milliseconds(1);
        Ok(Self {
            start: start.with_timezone(&Utc),
            end: end.with_timezone(&Utc),
            time_zone: tz,
        })
    }

    pub fn zoned(&self) -> ZonedPeriod {
        ZonedPeriod {
            start: self.start.with_timezone(&self.time_zone),
            end: self.end.with_timezone(&self.time_zone),
        }
    }

    /// Inclusion bornes comprises.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

impl ZonedPeriod {
    pub fn time_zone(&self) -> Tz {
        self.start.timezone()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    pub fn last_date(&self) -> NaiveDate {
        self.end.date_naive()
    }

    /// Nombre de jours calendaires (différence + 1).
    pub fn num_days(&self) -> u32 {
        let diff = self
            .last_date()
            .signed_duration_since(self.first_date())
            .num_days();
        (diff + 1).max(0) as u32
    }

    /// Date calendaire du jour `day` (0 = premier jour de la période).
    pub fn date_at(&self, day: u32) -> NaiveDate {
        self.first_date() + Days::new(u64::from(day))
    }

    pub fn day_index_of(&self, date: NaiveDate) -> Option<u32> {
        let diff = date.signed_duration_since(self.first_date()).num_days();
        u32::try_from(diff).ok().filter(|d| *d < self.num_days())
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.num_days()).map(|d| self.date_at(d))
    }
}

pub fn parse_time_zone(name: &str) -> Result<Tz, SchedError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| SchedError::UnknownTimeZone(name.to_string()))
}

/// Bornes du mois `year-month` construites directement dans le fuseau `time_zone`.
pub fn get_period(year: i32, month: u32, time_zone: &str) -> Result<Period, SchedError> {
    let tz = parse_time_zone(time_zone)?;
    let first =
        NaiveDate::from_ymd_opt(year, month, 1).ok_or(SchedError::InvalidPeriod { year, month })?;
    let last = first
        .checked_add_days(Days::new(u64::from(days_in_month(first)) - 1))
        .ok_or(SchedError::InvalidPeriod { year, month })?;
    Period::from_dates(first, last, tz)
}

/// Nombre de jours du mois contenant `date`.
pub fn days_in_month(date: NaiveDate) -> u32 {
    let (y, m) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    match (
        NaiveDate::from_ymd_opt(date.year(), date.month(), 1),
        NaiveDate::from_ymd_opt(y, m, 1),
    ) {
        (Some(first), Some(next)) => next.signed_duration_since(first).num_days() as u32,
        _ => 31,
    }
}

/// Parse une heure murale `HH:mm` (ou `HH:mm:ss`).
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, SchedError> {
    let s = raw.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| SchedError::InvalidTime(raw.to_string()))
}

/// Jour ISO (1 = lundi, 7 = dimanche).
pub fn weekday_number(date: NaiveDate) -> u8 {
    date.weekday().number_from_monday() as u8
}

pub fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Tz> {
    at_local(date, NaiveTime::MIN, tz)
}

/// Lie une heure murale à une date dans `tz`.
///
/// Heure ambiguë (repli d'automne) : premier instant. Heure inexistante
/// (saut de printemps) : premier instant valide après le trou.
pub fn at_local(date: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Tz> {
    resolve_local(date.and_time(time), tz)
}

fn resolve_local(naive: NaiveDateTime, tz: Tz) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            let mut candidate = naive;
            // les trous connus font 30, 60 ou 120 minutes
            for _ in 0..96 {
                candidate += Duration::minutes(15);
                if let Some(dt) = tz.from_local_datetime(&candidate).earliest() {
                    return dt;
                }
            }
            tz.from_utc_datetime(&naive)
        }
    }
}

/// Date calendaire d'un instant UTC dans le fuseau `tz`.
pub fn to_local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}
