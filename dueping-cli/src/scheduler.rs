use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use std::str::FromStr;

use crate::app::App;

/// The `cron` crate wants a seconds field; classic five-field lines get `0`.
pub fn normalize_cron_expr(expr: &str) -> Result<String> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    match fields.len() {
        5 => Ok(format!("0 {}", fields.join(" "))),
        6 | 7 => Ok(fields.join(" ")),
        n => bail!("cron expression '{expr}' has {n} fields (expected 5, 6 or 7)"),
    }
}

#[derive(Debug, Clone)]
pub struct DailySchedule {
    schedule: Schedule,
    tz: Tz,
}

impl DailySchedule {
    pub fn parse(expr: &str, tz: Tz) -> Result<Self> {
        let normalized = normalize_cron_expr(expr)?;
        let schedule = Schedule::from_str(&normalized)
            .with_context(|| format!("parse cron expression '{expr}'"))?;
        Ok(Self { schedule, tz })
    }

    /// First fire strictly after `after`.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule
            .after(&after.with_timezone(&self.tz))
            .next()
            .map(|t| t.with_timezone(&Utc))
    }

    pub fn upcoming(&self, after: DateTime<Utc>, count: usize) -> Vec<DateTime<Tz>> {
        self.schedule
            .after(&after.with_timezone(&self.tz))
            .take(count)
            .collect()
    }
}

/// Fire `app` on every tick of `schedule` until Ctrl-C.
///
/// A failed run is logged and the next tick is still armed.
pub async fn run_forever(schedule: &DailySchedule, app: &App) -> Result<()> {
    loop {
        let now = Utc::now();
        let next = schedule
            .next_after(now)
            .context("schedule has no upcoming fire time")?;
        let wait = (next - now).to_std().unwrap_or_default();
        tracing::info!(next = %next.with_timezone(&schedule.tz), "next digest scheduled");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("scheduler shutting down");
                return Ok(());
            }
            _ = tokio::time::sleep(wait) => {}
        }

        tracing::info!("sending upcoming tasks");
        if let Err(e) = app.run_once(Utc::now()).await {
            tracing::error!(error = %e, "scheduled digest failed");
        }
    }
}
