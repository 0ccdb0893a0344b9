use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod app;
mod config;
mod scheduler;
mod state;

use crate::app::App;
use crate::config::{Config, Credentials};
use crate::scheduler::DailySchedule;

#[derive(Parser, Debug)]
#[command(name = "dueping", version, about = "Daily Notion due-date digest for Discord")]
struct Cli {
    /// Config file (default: $DUEPING_HOME/config.toml, else ~/.dueping/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Post the digest on the configured schedule until interrupted
    Run {
        /// Post to the production channel
        #[arg(long, default_value_t = false)]
        prod: bool,

        /// Also post one digest immediately at startup
        #[arg(long, default_value_t = false)]
        send_on_start: bool,
    },

    /// Post one digest now
    Send {
        #[arg(long, default_value_t = false)]
        prod: bool,
    },

    /// Fetch and render the digest, print it as JSON, send nothing
    Preview {
        /// Classify as of this RFC 3339 instant instead of now
        #[arg(long)]
        now: Option<String>,
    },

    /// Show the next scheduled fire times
    Next {
        #[arg(long, default_value_t = 5)]
        count: usize,
    },

    /// Config file helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config file if none exists
    Init,
    /// Print the resolved config and which secrets are set
    Show,
}

fn init_tracing() {
    // stderr keeps `preview` JSON on stdout clean.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    tracing::debug!(build = env!("DUEPING_BUILD_SHA"), "dueping starting");

    let config_path = config::resolve_path(cli.config.as_deref())?;

    match cli.command {
        Command::Run {
            prod,
            send_on_start,
        } => {
            let cfg = config::load_config(&config_path)?;
            run(&cfg, cfg.production || prod, send_on_start).await?;
        }

        Command::Send { prod } => {
            let cfg = config::load_config(&config_path)?;
            let creds = Credentials::from_env()?;
            let app = App::from_config(&cfg, &creds, cfg.production || prod)?;
            let report = app.run_once(Utc::now()).await.context("sending digest")?;
            println!(
                "Sent digest: {} upcoming, {} in the next 7 days{}",
                report.upcoming,
                report.near_term,
                if report.urgent { " (role pinged)" } else { "" }
            );
        }

        Command::Preview { now } => {
            let cfg = config::load_config(&config_path)?;
            let secret = config::notion_secret()?;
            let now = parse_now(now.as_deref())?;
            let digest = app::preview(&cfg, &secret, now).await.context("building preview")?;
            println!("{}", serde_json::to_string_pretty(&digest)?);
        }

        Command::Next { count } => {
            let cfg = config::load_config(&config_path)?;
            let schedule = DailySchedule::parse(&cfg.schedule.cron, cfg.schedule_tz()?)?;
            for t in schedule.upcoming(Utc::now(), count) {
                println!("{}", t.to_rfc3339());
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(cli.config.as_deref())?,
            ConfigCommand::Show => show_config(&config_path)?,
        },
    }

    Ok(())
}

async fn run(cfg: &Config, production: bool, send_on_start: bool) -> Result<()> {
    // Credentials and schedule are checked before anything is armed.
    let creds = Credentials::from_env()?;
    let schedule = DailySchedule::parse(&cfg.schedule.cron, cfg.schedule_tz()?)?;
    let app = App::from_config(cfg, &creds, production)?;

    tracing::info!(
        cron = %cfg.schedule.cron,
        timezone = %cfg.schedule.timezone,
        build = env!("DUEPING_BUILD_SHA"),
        "dueping scheduler started"
    );

    if send_on_start {
        tracing::info!("sending upcoming tasks (startup)");
        if let Err(e) = app.run_once(Utc::now()).await {
            tracing::error!(error = %e, "startup digest failed");
        }
    }

    scheduler::run_forever(&schedule, &app).await
}

fn parse_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        None => Ok(Utc::now()),
        Some(s) => Ok(DateTime::parse_from_rfc3339(s)
            .with_context(|| format!("invalid --now '{s}' (expected RFC 3339)"))?
            .with_timezone(&Utc)),
    }
}

fn show_config(path: &std::path::Path) -> Result<()> {
    let cfg = config::load_config(path)?;
    let source = if path.exists() { "" } else { " (not found, defaults)" };
    println!("# {}{}\n", path.display(), source);
    println!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);

    println!("# delivery channel: {}", cfg.channel_id(cfg.production));
    for (var, set) in [
        (config::DISCORD_TOKEN_VAR, config::discord_token().is_ok()),
        (config::NOTION_SECRET_VAR, config::notion_secret().is_ok()),
    ] {
        println!("# {var}: {}", if set { "set" } else { "<not set>" });
    }
    Ok(())
}
