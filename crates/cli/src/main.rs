//! CleanPro CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! cleanpro-cli migrate
//!
//! # Insert the sample orders into an empty database
//! cleanpro-cli seed
//!
//! # Create a user
//! cleanpro-cli user create -n "Jean Marie" -e jean@cleanpro.rw -p secret123
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Insert sample orders when the orders table is empty
//! - `user create` - Register a user

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cleanpro-cli")]
#[command(author, version, about = "CleanPro CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert sample orders if there are none yet
    Seed,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Register a new user
    Create {
        /// Full name
        #[arg(short, long)]
        name: String,

        /// Login email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 6 characters)
        #[arg(short, long)]
        password: String,

        /// Contact phone number
        #[arg(long)]
        phone: Option<String>,

        /// Business name shown on the profile
        #[arg(long)]
        business: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::sample_orders().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                name,
                email,
                password,
                phone,
                business,
            } => {
                commands::user::create(name, email, password, phone, business).await?;
            }
        },
    }
    Ok(())
}
