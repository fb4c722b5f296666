use std::ops::RangeInclusive;

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use tracing::debug;

use crate::models::{EventSnapshot, Phase};

/// Layouts accepted for feed start times that are not RFC 3339
const START_TIME_LAYOUTS: &[&str] = &[
    "%d-%m-%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Feed status codes and what they mean for classification.
///
/// The finished codes and range are feed-specific and undocumented.
#[derive(Debug, Clone)]
pub struct StatusCodeTable {
    /// Codes meaning "finished" or "just ended"
    pub finished_codes: Vec<i64>,
    /// Range treated as finished by some feed variants
    pub finished_range: RangeInclusive<i64>,
    /// Code for an event in progress (analyzed as concluded)
    pub active_code: i64,
    /// Codes at or below this value are upcoming
    pub upcoming_max: i64,
}

impl Default for StatusCodeTable {
    fn default() -> Self {
        Self {
            finished_codes: vec![1, 163, 99],
            finished_range: 90..=199,
            active_code: 2,
            upcoming_max: 0,
        }
    }
}

impl StatusCodeTable {
    pub fn is_finished(&self, code: i64) -> bool {
        self.finished_codes.contains(&code) || self.finished_range.contains(&code)
    }

    pub fn is_upcoming(&self, code: i64) -> bool {
        code <= self.upcoming_max
    }

    pub fn is_active(&self, code: i64) -> bool {
        code == self.active_code
    }
}

/// Which signal decided the phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseBasis {
    Score,
    Winner,
    FinishedStatus,
    UpcomingStatus,
    ActiveStatus,
    StartTimeElapsed,
    StartTimePassedWithResult,
    Default,
}

/// Classify an event against the current wall clock
pub fn classify(snapshot: &EventSnapshot, table: &StatusCodeTable) -> Phase {
    classify_at(snapshot, table, Utc::now()).0
}

/// Classify an event as of `now`.
///
/// Tiers short-circuit in order: result signals, status code, start time,
/// then the pre-event default.
pub fn classify_at(
    snapshot: &EventSnapshot,
    table: &StatusCodeTable,
    now: DateTime<Utc>,
) -> (Phase, PhaseBasis) {
    // 1. Result signals
    if snapshot.has_positive_score() {
        return (Phase::PostEvent, PhaseBasis::Score);
    }
    if snapshot.has_winner() {
        return (Phase::PostEvent, PhaseBasis::Winner);
    }

    // 2. Status code
    let code = snapshot.status_code;
    if table.is_finished(code) {
        return (Phase::PostEvent, PhaseBasis::FinishedStatus);
    }
    if table.is_upcoming(code) {
        return (Phase::PreEvent, PhaseBasis::UpcomingStatus);
    }
    if table.is_active(code) {
        return (Phase::PostEvent, PhaseBasis::ActiveStatus);
    }

    // 3. Scheduled start time
    if let Some(raw) = snapshot.start_time.as_deref() {
        match parse_start_time(raw) {
            Some(start) if start < now => {
                if now - start > Duration::hours(2) {
                    return (Phase::PostEvent, PhaseBasis::StartTimeElapsed);
                }
                if !snapshot.scores.is_empty() || snapshot.has_winner() {
                    return (Phase::PostEvent, PhaseBasis::StartTimePassedWithResult);
                }
            }
            Some(_) => {}
            None => debug!("Could not parse start time '{}'", raw),
        }
    }

    (Phase::PreEvent, PhaseBasis::Default)
}

/// Parse a feed start time. Times without an offset are taken as UTC.
pub fn parse_start_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    START_TIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}
