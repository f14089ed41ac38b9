//! CLI administration tool for link-shortener.
//!
//! Runs the same lifecycle operations as the HTTP API directly against the
//! database, plus maintenance commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a short link
//! cargo run --bin admin -- shorten https://example.com --alias docs --ttl 30
//!
//! # Show statistics for a code
//! cargo run --bin admin -- stats docs
//!
//! # Soft-delete a code
//! cargo run --bin admin -- delete docs
//!
//! # Remove rows soft-deleted more than 24 hours ago
//! cargo run --bin admin -- purge --older-than-hours 24
//!
//! # Database tools
//! cargo run --bin admin -- db check
//! cargo run --bin admin -- db migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (or `DB_*` components): PostgreSQL connection string
//! - `BASE_URL` (optional): used to print full short URLs

use link_shortener::application::services::LinkService;
use link_shortener::config::Config;
use link_shortener::domain::clock::SystemClock;
use link_shortener::domain::hit_event::HitEvent;
use link_shortener::error::LinkError;
use link_shortener::infrastructure::persistence::PgLinkRepository;
use link_shortener::server;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::mpsc;

type AdminLinkService = LinkService<PgLinkRepository>;

/// CLI tool for managing link-shortener.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Create a short link
    Shorten {
        /// Target URL
        url: String,

        /// Custom short code
        #[arg(short, long)]
        alias: Option<String>,

        /// Lifetime in days (0 = never expires)
        #[arg(short, long, default_value_t = 0)]
        ttl: u32,
    },

    /// Show statistics for a short code
    Stats {
        code: String,
    },

    /// Soft-delete a short code
    Delete {
        code: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Physically remove soft-deleted links
    Purge {
        /// Only remove rows deleted longer ago than this
        #[arg(long, default_value_t = 24)]
        older_than_hours: i64,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let pool = server::connect_pool(&config).await?;

    match cli.command {
        Commands::Db { action } => handle_db_action(action, &pool).await?,
        command => {
            // Hits are never recorded from the CLI.
            let (hit_tx, _) = mpsc::channel::<HitEvent>(1);
            let repository = Arc::new(PgLinkRepository::new(Arc::new(pool)));
            let service = LinkService::new(repository, Arc::new(SystemClock), hit_tx);
            handle_link_command(command, &service, &config.base_url).await?;
        }
    }

    Ok(())
}

/// Dispatches link lifecycle commands.
async fn handle_link_command(
    command: Commands,
    service: &AdminLinkService,
    base_url: &str,
) -> Result<()> {
    match command {
        Commands::Shorten { url, alias, ttl } => {
            shorten(service, base_url, &url, alias.as_deref(), ttl).await
        }
        Commands::Stats { code } => show_stats(service, &code).await,
        Commands::Delete { code, yes } => delete(service, &code, yes).await,
        Commands::Purge {
            older_than_hours,
            yes,
        } => purge(service, older_than_hours, yes).await,
        Commands::Db { .. } => Ok(()),
    }
}

async fn shorten(
    service: &AdminLinkService,
    base_url: &str,
    url: &str,
    alias: Option<&str>,
    ttl: u32,
) -> Result<()> {
    if url::Url::parse(url).is_err() {
        anyhow::bail!("'{}' is not a valid URL", url);
    }

    let shortened = service
        .shorten(url, alias, ttl)
        .await
        .map_err(describe)?;

    println!("{}", "✅ Link ready".green().bold());
    println!("  Code:      {}", shortened.code.cyan());
    println!(
        "  Short URL: {}",
        format!("{}/r/{}", base_url.trim_end_matches('/'), shortened.code).bright_yellow()
    );
    match shortened.expires_at {
        Some(at) => println!("  Expires:   {}", at.format("%Y-%m-%d %H:%M UTC")),
        None => println!("  Expires:   {}", "never".bright_black()),
    }
    println!();

    Ok(())
}

/// Displays statistics for a single code.
///
/// # Output Format
///
/// ```text
/// 📊 Statistics for docs
///
///   URL:      https://example.com
///   Created:  2026-01-15 10:30
///   Expires:  never
///   Hits:     42
/// ```
async fn show_stats(service: &AdminLinkService, code: &str) -> Result<()> {
    let link = service.stats(code).await.map_err(describe)?;

    println!("{} {}", "📊 Statistics for".bright_blue().bold(), code.cyan());
    println!();
    println!("  URL:      {}", link.url.bright_white());
    println!(
        "  Created:  {}",
        link.created_at.format("%Y-%m-%d %H:%M").to_string().bright_black()
    );
    match link.expires_at {
        Some(at) => println!("  Expires:  {}", at.format("%Y-%m-%d %H:%M")),
        None => println!("  Expires:  {}", "never".bright_black()),
    }
    println!(
        "  Hits:     {}",
        link.hit_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Soft-deletes a code after confirmation (default: No).
async fn delete(service: &AdminLinkService, code: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑️  Delete Link".bright_blue().bold());
    println!();

    let link = service.stats(code).await.map_err(describe)?;
    println!("  Code: {}", code.cyan());
    println!("  URL:  {}", link.url.bright_white());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    service.delete(code).await.map_err(describe)?;

    println!("{}", "✅ Link deleted".green().bold());
    println!();

    Ok(())
}

async fn purge(service: &AdminLinkService, older_than_hours: i64, skip_confirm: bool) -> Result<()> {
    if older_than_hours < 0 {
        anyhow::bail!("--older-than-hours must not be negative");
    }

    println!("{}", "🧹 Purge Deleted Links".bright_blue().bold());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Permanently remove links deleted more than {older_than_hours}h ago?"
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let removed = service
        .purge_deleted(chrono::Duration::hours(older_than_hours))
        .await
        .map_err(describe)?;

    println!(
        "{} {}",
        "✅ Removed".green().bold(),
        removed.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1")
                .fetch_one(pool)
                .await
                .context("Database is not reachable")?;

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("{}", "✅ Database connection OK".green().bold());
            println!("  PostgreSQL: {}", version.bright_white());
        }
        DbAction::Migrate => {
            println!("{}", "📦 Applying migrations...".bright_blue());

            server::migrate(pool).await?;

            println!("{}", "✅ Migrations applied".green().bold());
        }
    }

    Ok(())
}

/// Maps lifecycle errors to operator-facing messages.
fn describe(err: LinkError) -> anyhow::Error {
    match err {
        LinkError::NotFound | LinkError::Expired => anyhow::anyhow!("Short link not found"),
        other => anyhow::anyhow!(other),
    }
}
