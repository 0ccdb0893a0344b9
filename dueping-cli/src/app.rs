use anyhow::Result;
use chrono::{DateTime, Utc};
use dueping_core::{
    BucketPolicy, Digest, DueResult, NotificationSink, RenderOptions, RunReport, TaskSource,
    prepare, run_once,
};
use dueping_discord::{DiscordClient, DiscordConfig};
use dueping_notion::{NotionClient, NotionConfig};

use crate::config::{Config, Credentials};

/// A task source and a sink wired up with the bucket and render settings.
pub struct App {
    source: Box<dyn TaskSource>,
    sink: Box<dyn NotificationSink>,
    policy: BucketPolicy,
    render: RenderOptions,
}

impl App {
    pub fn new(
        source: Box<dyn TaskSource>,
        sink: Box<dyn NotificationSink>,
        policy: BucketPolicy,
        render: RenderOptions,
    ) -> Self {
        Self {
            source,
            sink,
            policy,
            render,
        }
    }

    pub fn from_config(cfg: &Config, creds: &Credentials, production: bool) -> Result<Self> {
        let channel_id = cfg.channel_id(production);
        tracing::info!(production, channel_id, "delivery target selected");

        Ok(Self::new(
            Box::new(notion_client(cfg, &creds.notion_secret)),
            Box::new(DiscordClient::new(
                DiscordConfig::new(&creds.discord_token, channel_id)
                    .with_api_base(&cfg.discord.api_base),
            )),
            cfg.bucket_policy()?,
            cfg.render_options(),
        ))
    }

    pub async fn run_once(&self, now: DateTime<Utc>) -> DueResult<RunReport> {
        run_once(
            self.source.as_ref(),
            self.sink.as_ref(),
            now,
            &self.policy,
            &self.render,
        )
        .await
    }
}

pub fn notion_client(cfg: &Config, secret: &str) -> NotionClient {
    NotionClient::new(
        NotionConfig::new(secret, &cfg.notion.database_id)
            .with_base_url(&cfg.notion.base_url)
            .with_version(&cfg.notion.version)
            .with_skip_malformed(cfg.buckets.skip_malformed),
    )
}

/// Fetch and render without a sink, for `dueping preview`.
pub async fn preview(cfg: &Config, secret: &str, now: DateTime<Utc>) -> Result<Digest> {
    let source = notion_client(cfg, secret);
    let policy = cfg.bucket_policy()?;
    let (digest, report) = prepare(&source, now, &policy, &cfg.render_options()).await?;
    tracing::info!(
        fetched = report.fetched,
        upcoming = report.upcoming,
        near_term = report.near_term,
        urgent = report.urgent,
        "preview ready"
    );
    Ok(digest)
}
