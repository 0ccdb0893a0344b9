//! Time utilities: due-date normalization and calendar-day arithmetic.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{DueError, DueResult};

/// Length of a bare `YYYY-MM-DD` value. Notion omits time and zone for date-only
/// properties and includes both once a time is set, so the length alone decides.
pub const DATE_ONLY_LEN: usize = 10;

/// Date-only values are pinned to the UTC-4 business day.
pub const BUSINESS_OFFSET_HOURS: i64 = 4;

/// One day minus one second: a date-only task is due at the end of its day.
pub const END_OF_DAY_SECS: i64 = 86_399;

/// A due value resolved to a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedDue {
    pub at: DateTime<Utc>,
    /// Whether the source value carried a time of day.
    pub has_explicit_time: bool,
}

impl NormalizedDue {
    pub fn epoch_seconds(&self) -> i64 {
        self.at.timestamp()
    }
}

/// Resolve a task-database due value into an instant.
///
/// - exactly 10 bytes: `YYYY-MM-DD`, read as UTC midnight, then +4h and +86399s
/// - anything else: an RFC 3339 timestamp, taken as given
///
/// This is a length check only. A 10-byte value that is not a calendar date is
/// rejected rather than reinterpreted.
pub fn normalize(due: &str) -> DueResult<NormalizedDue> {
    if due.len() == DATE_ONLY_LEN {
        let date = NaiveDate::parse_from_str(due, "%Y-%m-%d").map_err(|e| DueError::InvalidDate {
            value: due.to_string(),
            reason: e.to_string(),
        })?;
        let midnight = date.and_time(NaiveTime::MIN).and_utc();
        let at = midnight
            + Duration::hours(BUSINESS_OFFSET_HOURS)
            + Duration::seconds(END_OF_DAY_SECS);
        return Ok(NormalizedDue {
            at,
            has_explicit_time: false,
        });
    }

    let at = DateTime::parse_from_rfc3339(due)
        .map_err(|e| DueError::InvalidDate {
            value: due.to_string(),
            reason: e.to_string(),
        })?
        .with_timezone(&Utc);

    Ok(NormalizedDue {
        at,
        has_explicit_time: true,
    })
}

/// Move `instant` by `days` calendar days on the wall clock of `tz`.
///
/// Local time of day is kept, so across a DST change the result is 23 or 25
/// hours per day away. A wall time that falls into a spring-forward gap is read
/// with the offset in force before the move, which lands it after the gap.
/// Ambiguous wall times resolve to the earlier instant.
pub fn add_days(instant: DateTime<Utc>, days: i64, tz: Tz) -> DateTime<Utc> {
    let local = instant.with_timezone(&tz);
    let shifted = local.naive_local() + Duration::days(days);

    match tz.from_local_datetime(&shifted).earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        None => {
            let offset = local.offset().fix().local_minus_utc();
            (shifted - Duration::seconds(offset.into())).and_utc()
        }
    }
}
