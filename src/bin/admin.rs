//! CLI administration tool for codelink.
//!
//! Provides commands for managing users, viewing statistics, and performing
//! database operations without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create a user (prompts for missing values)
//! cargo run --bin admin -- user create --email ops@example.com
//!
//! # Show the codes a user created
//! cargo run --bin admin -- user history ops@example.com
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_*` (required): PostgreSQL connection
//! - `BASE_URL` (optional): prefix for printed short URLs

use codelink::application::services::HistoryService;
use codelink::application::services::session_service::{hash_password, normalize_email};
use codelink::config::Config;
use codelink::domain::entities::NewUser;
use codelink::domain::repositories::{RecordRepository, UserRepository};
use codelink::error::AppError;
use codelink::infrastructure::persistence::{PgRecordRepository, PgUserRepository};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input, Password};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

const STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// CLI tool for managing codelink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Show record and user counts
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Register a new user
    Create {
        /// Email address (prompted if omitted)
        #[arg(short, long)]
        email: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List the codes a user created, oldest first
    History {
        /// Email address of the user
        email: String,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = Config::load_database_url()?;
    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::User { action } => handle_user_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_user_action(action: UserAction, pool: &PgPool) -> Result<()> {
    let pool = Arc::new(pool.clone());
    let users = Arc::new(PgUserRepository::new(pool.clone()));

    match action {
        UserAction::Create { email, yes } => create_user(users, email, yes).await?,
        UserAction::History { email } => {
            let records = Arc::new(PgRecordRepository::new(pool));
            show_history(users, records, email).await?;
        }
    }

    Ok(())
}

/// Registers a user with interactive prompts.
///
/// The password is read without echo and confirmed; only its Argon2id hash
/// is stored.
async fn create_user(repo: Arc<PgUserRepository>, email: Option<String>, skip_confirm: bool) -> Result<()> {
    println!("{}", "👤 Create User".bright_blue().bold());
    println!();

    let email = match email {
        Some(e) => e,
        None => Input::new().with_prompt("Email").interact_text()?,
    };
    let email = normalize_email(&email);

    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()?;

    if password.is_empty() {
        anyhow::bail!("Password must not be empty");
    }

    println!();
    println!("  Email: {}", email.cyan());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this user?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let password_hash = hash_password(password)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

    match repo.create(NewUser { email, password_hash }).await {
        Ok(user) => {
            println!();
            println!("{}", "✅ User created successfully!".green().bold());
            println!("  ID: {}", user.id.to_string().bright_black());
            println!();
            Ok(())
        }
        Err(AppError::EmailAlreadyRegistered) => {
            println!("{}", "⚠️  This email is already registered".yellow());
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("Failed to create user: {}", e)),
    }
}

/// Prints a user's history.
///
/// # Output Format
///
/// ```text
/// 📜 History of ops@example.com
///
///   Code       Created              Destination
///   ──────────────────────────────────────────────────────────────
///   aB3x       2025-01-15 10:30     http://example.com
/// ```
async fn show_history(
    users: Arc<PgUserRepository>,
    records: Arc<PgRecordRepository>,
    email: String,
) -> Result<()> {
    let email = normalize_email(&email);
    println!("{} {}", "📜 History of".bright_blue().bold(), email.cyan());
    println!();

    let service = HistoryService::new(users, records, STORE_TIMEOUT);
    let history = match service.list(&email).await {
        Ok(history) => history,
        Err(AppError::UserNotFound) => {
            println!("{}", "  User not found".yellow());
            return Ok(());
        }
        Err(e) => return Err(anyhow::anyhow!("Failed to load history: {}", e)),
    };

    if history.is_empty() {
        println!("{}", "  No codes yet".yellow());
        return Ok(());
    }

    let base_url = std::env::var("BASE_URL").unwrap_or_default();
    let base_url = base_url.trim_end_matches('/');

    println!(
        "  {:<10} {:<20} {}",
        "Code".bright_white().bold(),
        "Created".bright_white().bold(),
        "Destination".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for record in &history {
        let code = if base_url.is_empty() {
            record.code.clone()
        } else {
            format!("{}/{}", base_url, record.code)
        };

        println!(
            "  {:<10} {:<20} {}",
            code.cyan(),
            record
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            record.destination
        );
    }

    println!();
    println!(
        "  Total: {}",
        history.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Displays record and user counts.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let pool = Arc::new(pool.clone());
    let records = PgRecordRepository::new(pool.clone());
    let users = PgUserRepository::new(pool);

    let records_count = records
        .count()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count records: {}", e))?;
    let users_count = users
        .count()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count users: {}", e))?;

    println!(
        "  Short codes: {}",
        records_count.to_string().bright_green().bold()
    );
    println!(
        "  Users:       {}",
        users_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;
            let migrations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await
                .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
