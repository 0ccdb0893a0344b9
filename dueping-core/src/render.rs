//! Digest rendering: classified buckets into titled embed sections.
//!
//! Due instants are rendered as Discord timestamp tokens (`<t:EPOCH:STYLE>`),
//! which every client translates into the viewer's own zone.

use serde::{Deserialize, Serialize};

use crate::Task;
use crate::classify::{Classification, ClassifiedTask};
use crate::error::DueResult;
use crate::time::NormalizedDue;

pub const UPCOMING_TITLE: &str = "Upcoming Due Dates!";
pub const UPCOMING_COLOR: u32 = 0xcf2b2b;
pub const NEAR_TERM_TITLE: &str = "Next 7 Days";
pub const NEAR_TERM_COLOR: u32 = 0xe0d019;

/// Display selector of a timestamp token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampStyle {
    /// `August 3, 2024`
    LongDate,
    /// `August 3, 2024 4:00 PM`
    ShortDateTime,
}

impl TimestampStyle {
    pub fn code(self) -> char {
        match self {
            Self::LongDate => 'D',
            Self::ShortDateTime => 'f',
        }
    }

    /// Date-only values show just the date; anything with a time shows both.
    pub fn for_due(due: &NormalizedDue) -> Self {
        if due.has_explicit_time {
            Self::ShortDateTime
        } else {
            Self::LongDate
        }
    }
}

pub fn timestamp_token(epoch_seconds: i64, style: TimestampStyle) -> String {
    format!("<t:{}:{}>", epoch_seconds, style.code())
}

/// One name/value row of an embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayEntry {
    pub label: String,
    pub value: String,
}

impl DisplayEntry {
    pub fn from_due(task: &Task, due: &NormalizedDue) -> Self {
        Self {
            label: task.name.clone(),
            value: timestamp_token(due.epoch_seconds(), TimestampStyle::for_due(due)),
        }
    }
}

impl From<&ClassifiedTask> for DisplayEntry {
    fn from(c: &ClassifiedTask) -> Self {
        Self::from_due(&c.task, &c.due)
    }
}

/// Render a single task, normalizing its due value on the way.
pub fn render_task(task: &Task) -> DueResult<DisplayEntry> {
    let due = task.normalized_due()?;
    Ok(DisplayEntry::from_due(task, &due))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedSection {
    pub title: String,
    pub color: u32,
    pub entries: Vec<DisplayEntry>,
}

impl EmbedSection {
    fn from_bucket(title: &str, color: u32, bucket: &[ClassifiedTask]) -> Self {
        Self {
            title: title.to_string(),
            color,
            entries: bucket.iter().map(DisplayEntry::from).collect(),
        }
    }
}

/// Everything one run posts: an optional role ping, then both sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
    pub mention: Option<String>,
    pub sections: Vec<EmbedSection>,
}

impl Digest {
    pub fn entry_count(&self) -> usize {
        self.sections.iter().map(|s| s.entries.len()).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Role pinged when something is due within the urgency window.
    pub role_id: Option<String>,
}

pub fn role_mention(role_id: &str) -> String {
    format!("<@&{role_id}>")
}

pub fn render_digest(classification: &Classification, opts: &RenderOptions) -> Digest {
    let mention = match (&opts.role_id, classification.urgent) {
        (Some(role), true) => Some(role_mention(role)),
        _ => None,
    };

    Digest {
        mention,
        sections: vec![
            EmbedSection::from_bucket(UPCOMING_TITLE, UPCOMING_COLOR, &classification.upcoming),
            EmbedSection::from_bucket(NEAR_TERM_TITLE, NEAR_TERM_COLOR, &classification.near_term),
        ],
    }
}
