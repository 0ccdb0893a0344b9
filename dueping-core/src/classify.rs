//! Bucket policy + classification of tasks by due-date proximity.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::Task;
use crate::error::DueResult;
use crate::time::{NormalizedDue, add_days};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bucket {
    /// Due between now and three calendar days out.
    Upcoming,
    /// Due between three and seven calendar days out.
    NearTerm,
    Excluded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketPolicy {
    pub upcoming_days: i64,
    /// Added to the upcoming boundary, not to now.
    pub near_term_extra_days: i64,
    pub urgent_within: Duration,
    /// Zone whose wall clock day arithmetic follows.
    pub calendar_tz: Tz,
}

impl Default for BucketPolicy {
    fn default() -> Self {
        Self {
            upcoming_days: 3,
            near_term_extra_days: 4,
            urgent_within: Duration::hours(24),
            calendar_tz: Tz::UTC,
        }
    }
}

/// The three reference instants every task is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub today: DateTime<Utc>,
    pub plus3: DateTime<Utc>,
    pub plus7: DateTime<Utc>,
}

impl Window {
    /// `plus7` is derived from `plus3`, not from `now`.
    pub fn new(now: DateTime<Utc>, policy: &BucketPolicy) -> Self {
        let plus3 = add_days(now, policy.upcoming_days, policy.calendar_tz);
        let plus7 = add_days(plus3, policy.near_term_extra_days, policy.calendar_tz);
        Self {
            today: now,
            plus3,
            plus7,
        }
    }

    /// First match wins, so a task due exactly at `plus3` is upcoming.
    pub fn bucket_for(&self, due: DateTime<Utc>) -> Bucket {
        if self.today <= due && due <= self.plus3 {
            Bucket::Upcoming
        } else if self.plus3 <= due && due <= self.plus7 {
            Bucket::NearTerm
        } else {
            Bucket::Excluded
        }
    }
}

/// A task together with the instant it was bucketed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedTask {
    pub task: Task,
    pub due: NormalizedDue,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub upcoming: Vec<ClassifiedTask>,
    pub near_term: Vec<ClassifiedTask>,
    /// Some upcoming task is due within `urgent_within` of now.
    pub urgent: bool,
    pub excluded: usize,
}

/// Partition `tasks` into upcoming / near-term / excluded, keeping input order.
///
/// Any due value that fails to normalize fails the whole pass.
pub fn classify(
    tasks: &[Task],
    now: DateTime<Utc>,
    policy: &BucketPolicy,
) -> DueResult<Classification> {
    let window = Window::new(now, policy);
    let mut out = Classification::default();

    for task in tasks {
        let due = task.normalized_due()?;
        let entry = ClassifiedTask {
            task: task.clone(),
            due,
        };

        match window.bucket_for(due.at) {
            Bucket::Upcoming => {
                if due.at - window.today <= policy.urgent_within {
                    out.urgent = true;
                }
                out.upcoming.push(entry);
            }
            Bucket::NearTerm => out.near_term.push(entry),
            Bucket::Excluded => out.excluded += 1,
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DueError;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn names(bucket: &[ClassifiedTask]) -> Vec<&str> {
        bucket.iter().map(|c| c.task.name.as_str()).collect()
    }

    #[test]
    fn end_to_end_buckets() {
        let tasks = vec![
            Task::new("A", "2024-08-02"),
            Task::new("B", "2024-08-06"),
            Task::new("C", "2024-08-20"),
        ];
        let out = classify(&tasks, utc("2024-08-01T00:00:00Z"), &BucketPolicy::default()).unwrap();
        assert_eq!(names(&out.upcoming), vec!["A"]);
        assert_eq!(names(&out.near_term), vec!["B"]);
        assert_eq!(out.excluded, 1);
        assert!(!out.urgent);
    }

    #[test]
    fn date_only_due_today_is_urgent_in_the_afternoon() {
        // 2024-08-01 normalizes to 2024-08-02T03:59:59Z, 15h59m59s after noon.
        let tasks = vec![Task::new("Essay", "2024-08-01")];
        let out = classify(&tasks, utc("2024-08-01T12:00:00Z"), &BucketPolicy::default()).unwrap();
        assert_eq!(names(&out.upcoming), vec!["Essay"]);
        assert!(out.urgent);
    }

    #[test]
    fn date_only_due_today_at_midnight_is_not_yet_urgent() {
        // 100799s away, beyond the 86400s urgency limit.
        let tasks = vec![Task::new("Essay", "2024-08-01")];
        let out = classify(&tasks, utc("2024-08-01T00:00:00Z"), &BucketPolicy::default()).unwrap();
        assert_eq!(out.upcoming.len(), 1);
        assert!(!out.urgent);
    }

    #[test]
    fn due_exactly_now_is_upcoming() {
        let now = utc("2024-08-01T20:00:00Z");
        let tasks = vec![Task::new("Now", "2024-08-01T20:00:00Z")];
        let out = classify(&tasks, now, &BucketPolicy::default()).unwrap();
        assert_eq!(names(&out.upcoming), vec!["Now"]);
        assert!(out.urgent);
    }

    #[test]
    fn due_exactly_at_plus3_is_upcoming_only() {
        let now = utc("2024-08-01T20:00:00Z");
        let tasks = vec![Task::new("Edge", "2024-08-04T20:00:00Z")];
        let out = classify(&tasks, now, &BucketPolicy::default()).unwrap();
        assert_eq!(names(&out.upcoming), vec!["Edge"]);
        assert!(out.near_term.is_empty());
        assert!(!out.urgent);
    }

    #[test]
    fn urgency_limit_is_inclusive() {
        let now = utc("2024-08-01T20:00:00Z");
        let at_limit = vec![Task::new("Tomorrow", "2024-08-02T20:00:00Z")];
        assert!(classify(&at_limit, now, &BucketPolicy::default()).unwrap().urgent);

        let past_limit = vec![Task::new("Later", "2024-08-02T20:00:01Z")];
        assert!(!classify(&past_limit, now, &BucketPolicy::default()).unwrap().urgent);
    }

    #[test]
    fn past_and_far_tasks_are_dropped() {
        let now = utc("2024-08-01T20:00:00Z");
        let tasks = vec![
            Task::new("Yesterday", "2024-07-31T20:00:00Z"),
            Task::new("End of window", "2024-08-08T20:00:00Z"),
            Task::new("Past window", "2024-08-08T20:00:01Z"),
        ];
        let out = classify(&tasks, now, &BucketPolicy::default()).unwrap();
        assert!(out.upcoming.is_empty());
        assert_eq!(names(&out.near_term), vec!["End of window"]);
        assert_eq!(out.excluded, 2);
    }

    #[test]
    fn input_order_is_preserved() {
        let now = utc("2024-08-01T00:00:00Z");
        let tasks = vec![
            Task::new("second due", "2024-08-02"),
            Task::new("first due", "2024-08-01"),
        ];
        let out = classify(&tasks, now, &BucketPolicy::default()).unwrap();
        assert_eq!(names(&out.upcoming), vec!["second due", "first due"]);
    }

    #[test]
    fn classification_is_repeatable() {
        let now = utc("2024-08-01T00:00:00Z");
        let tasks = vec![Task::new("A", "2024-08-02"), Task::new("B", "2024-08-06")];
        let before = tasks.clone();
        let first = classify(&tasks, now, &BucketPolicy::default()).unwrap();
        let second = classify(&tasks, now, &BucketPolicy::default()).unwrap();
        assert_eq!(first, second);
        assert_eq!(tasks, before);
    }

    #[test]
    fn empty_input_gives_empty_buckets() {
        let out = classify(&[], utc("2024-08-01T00:00:00Z"), &BucketPolicy::default()).unwrap();
        assert!(out.upcoming.is_empty());
        assert!(out.near_term.is_empty());
        assert!(!out.urgent);
    }

    #[test]
    fn bad_due_value_fails_the_pass() {
        let tasks = vec![Task::new("ok", "2024-08-02"), Task::new("bad", "tomorrow")];
        let err =
            classify(&tasks, utc("2024-08-01T00:00:00Z"), &BucketPolicy::default()).unwrap_err();
        assert!(matches!(err, DueError::InvalidDate { .. }));
    }

    #[test]
    fn window_follows_calendar_zone_across_dst() {
        let policy = BucketPolicy {
            calendar_tz: chrono_tz::America::New_York,
            ..BucketPolicy::default()
        };
        // Friday 2024-03-08 20:00 UTC, 15:00 EST.
        let w = Window::new(utc("2024-03-08T20:00:00Z"), &policy);
        assert_eq!(w.plus3, utc("2024-03-11T19:00:00Z"));
        assert_eq!(w.plus7, utc("2024-03-15T19:00:00Z"));
    }
}
