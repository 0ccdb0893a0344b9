use anyhow::{Context, Result};
use chrono_tz::Tz;
use dueping_core::{BucketPolicy, DueError, RenderOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{default_config_path, ensure_dueping_home};

pub const DISCORD_TOKEN_VAR: &str = "DISCORD_TOKEN";
pub const NOTION_SECRET_VAR: &str = "NOTION_SECRET";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Post to the production channel instead of the test one.
    pub production: bool,
    pub notion: NotionSection,
    pub discord: DiscordSection,
    pub schedule: ScheduleSection,
    pub buckets: BucketsSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotionSection {
    pub database_id: String,
    pub version: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiscordSection {
    pub production_channel_id: String,
    pub test_channel_id: String,
    /// Pinged when a task is due within a day. Unset disables the ping.
    pub role_id: Option<String>,
    pub api_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScheduleSection {
    /// Five-field (minute first) or six/seven-field (second first) cron.
    pub cron: String,
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BucketsSection {
    /// Zone whose calendar the 3 and 7 day boundaries are counted in.
    pub calendar_timezone: String,
    pub skip_malformed: bool,
}

impl Default for NotionSection {
    fn default() -> Self {
        Self {
            database_id: "45fe8b30df134e5db7080b8f29aa5e9e".to_string(),
            version: dueping_notion::client::DEFAULT_VERSION.to_string(),
            base_url: dueping_notion::client::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Default for DiscordSection {
    fn default() -> Self {
        Self {
            production_channel_id: "1088326374764326964".to_string(),
            test_channel_id: "869951873749254228".to_string(),
            role_id: Some("1088328245390348338".to_string()),
            api_base: dueping_discord::client::DEFAULT_API_BASE.to_string(),
        }
    }
}

impl Default for ScheduleSection {
    fn default() -> Self {
        Self {
            // 20:00 UTC is 4 PM Eastern during daylight time.
            cron: "0 20 * * *".to_string(),
            timezone: "UTC".to_string(),
        }
    }
}

impl Default for BucketsSection {
    fn default() -> Self {
        Self {
            calendar_timezone: "UTC".to_string(),
            skip_malformed: false,
        }
    }
}

impl Config {
    pub fn channel_id(&self, production: bool) -> &str {
        if production {
            &self.discord.production_channel_id
        } else {
            &self.discord.test_channel_id
        }
    }

    pub fn schedule_tz(&self) -> Result<Tz> {
        parse_tz(&self.schedule.timezone)
    }

    pub fn bucket_policy(&self) -> Result<BucketPolicy> {
        Ok(BucketPolicy {
            calendar_tz: parse_tz(&self.buckets.calendar_timezone)?,
            ..BucketPolicy::default()
        })
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            role_id: self.discord.role_id.clone().filter(|r| !r.trim().is_empty()),
        }
    }
}

fn parse_tz(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))
}

pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(p) => Ok(p.to_path_buf()),
        None => default_config_path(),
    }
}

/// Missing file means defaults; a file that exists must parse.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn save_config(path: &Path, cfg: &Config) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(explicit: Option<&Path>) -> Result<()> {
    let p = match explicit {
        Some(p) => p.to_path_buf(),
        None => ensure_dueping_home()?.join("config.toml"),
    };
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&p, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

/// Secrets only ever come from the environment (a `.env` file is loaded first).
#[derive(Clone)]
pub struct Credentials {
    pub discord_token: String,
    pub notion_secret: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self, DueError> {
        Self::from_lookup(env_lookup)
    }

    /// The bot token is checked first, so it is the one reported when both are unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DueError> {
        Ok(Self {
            discord_token: require_env_with(DISCORD_TOKEN_VAR, DISCORD_TOKEN_HINT, &lookup)?,
            notion_secret: require_env_with(NOTION_SECRET_VAR, NOTION_SECRET_HINT, &lookup)?,
        })
    }
}

const DISCORD_TOKEN_HINT: &str = "This is the discord bot token. Keep it private.";
const NOTION_SECRET_HINT: &str = "This is the Notion API secret. Keep it private.";

fn env_lookup(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

pub fn discord_token() -> Result<String, DueError> {
    require_env_with(DISCORD_TOKEN_VAR, DISCORD_TOKEN_HINT, env_lookup)
}

pub fn notion_secret() -> Result<String, DueError> {
    require_env_with(NOTION_SECRET_VAR, NOTION_SECRET_HINT, env_lookup)
}

/// Blank values count as unset.
fn require_env_with(
    var: &'static str,
    hint: &'static str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, DueError> {
    lookup(var)
        .filter(|v| !v.trim().is_empty())
        .ok_or(DueError::MissingCredential { var, hint })
}
