//! CLI administration tool for linkgate.
//!
//! Manages user accounts and shows statistics without going through the
//! HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create a user (prompts for missing fields)
//! cargo run --bin admin -- user create --username alice --email alice@example.com
//!
//! # Create a user with a generated password
//! cargo run --bin admin -- user create -u bob -e bob@example.com --generate-password -y
//!
//! # List users
//! cargo run --bin admin -- user list
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
//! - `DATABASE_URL` (or `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`)

use linkgate::config::Config;
use linkgate::domain::entities::NewUser;
use linkgate::domain::repositories::UserRepository;
use linkgate::infrastructure::persistence::PgUserRepository;
use linkgate::utils::password::hash_password;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input, Password};
use rand::Rng;
use rand::distr::Alphanumeric;
use sqlx::PgPool;
use std::sync::Arc;

/// Length of passwords produced by `--generate-password`.
const GENERATED_PASSWORD_LEN: usize = 20;

/// CLI tool for managing linkgate.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a user account
    Create {
        #[arg(short, long)]
        username: Option<String>,

        #[arg(short, long)]
        email: Option<String>,

        /// Generate a random password instead of prompting for one
        #[arg(short, long)]
        generate_password: bool,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all users
    List,
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
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
    let repo = PgUserRepository::new(Arc::new(pool.clone()));

    match action {
        UserAction::Create {
            username,
            email,
            generate_password,
            yes,
        } => create_user(&repo, username, email, generate_password, yes).await,
        UserAction::List => list_users(&repo).await,
    }
}

/// Creates a user with interactive prompts for anything not given as a flag.
///
/// A generated password is printed once; only its Argon2id hash is stored.
async fn create_user(
    repo: &PgUserRepository,
    username: Option<String>,
    email: Option<String>,
    generate_password: bool,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "👤 Create User".bright_blue().bold());
    println!();

    let username = match username {
        Some(u) => u,
        None => Input::new().with_prompt("Username").interact_text()?,
    };

    let email = match email {
        Some(e) => e,
        None => Input::new().with_prompt("Email").interact_text()?,
    };

    let (password, generated) = if generate_password {
        (random_password(), true)
    } else {
        let password = Password::new()
            .with_prompt("Password")
            .with_confirmation("Repeat password", "Passwords do not match")
            .interact()?;
        (password, false)
    };

    if password.len() < 8 {
        anyhow::bail!("Password must be at least 8 characters");
    }

    println!();
    println!("  Username: {}", username.cyan());
    println!("  Email:    {}", email.cyan());
    if generated {
        println!("  Password: {}", password.bright_yellow().bold());
        println!();
        println!(
            "{}",
            "⚠️  Save this password now! It cannot be shown again."
                .red()
                .bold()
        );
    }
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

    let password_hash = hash_password(&password)?;

    let user = repo
        .create(NewUser {
            username,
            email,
            password_hash,
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create user: {}", e))?;

    println!(
        "{} (id {})",
        "✅ User created successfully!".green().bold(),
        user.id.to_string().bright_white()
    );
    println!();

    Ok(())
}

/// Lists all users.
///
/// # Output Format
///
/// ```text
/// 📋 Users
///
///   ID    Username             Email                          Created
///   ───────────────────────────────────────────────────────────────────────
///   1     alice                alice@example.com              2025-01-15 10:30
/// ```
async fn list_users(repo: &PgUserRepository) -> Result<()> {
    println!("{}", "📋 Users".bright_blue().bold());
    println!();

    let users = repo
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list users: {}", e))?;

    if users.is_empty() {
        println!("{}", "  No users found".yellow());
        return Ok(());
    }

    println!(
        "  {:<5} {:<20} {:<30} {:<16}",
        "ID".bright_white().bold(),
        "Username".bright_white().bold(),
        "Email".bright_white().bold(),
        "Created".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for user in &users {
        println!(
            "  {:<5} {:<20} {:<30} {}",
            user.id.to_string().bright_black(),
            user.username.cyan(),
            user.email,
            user.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black()
        );
    }

    println!();
    println!("  Total: {}", users.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Displays link, click and user totals.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
        .fetch_one(pool)
        .await?;

    let clicks_count: i64 =
        sqlx::query_scalar("SELECT COALESCE(SUM(click_count), 0)::BIGINT FROM links")
            .fetch_one(pool)
            .await?;

    let users_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    println!("  Links:  {}", links_count.to_string().bright_green().bold());
    println!("  Clicks: {}", clicks_count.to_string().bright_green().bold());
    println!("  Users:  {}", users_count.to_string().bright_green().bold());
    println!();

    Ok(())
}

async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("{}", "✅ Database connection OK".green().bold());
            println!("  PostgreSQL: {}", version.bright_white());
        }
    }

    Ok(())
}

fn random_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LEN)
        .map(char::from)
        .collect()
}
