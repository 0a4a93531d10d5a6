use anyhow::Context;
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use warehouse_auth::Decision;
use warehouse_cli::{NewAdmin, check_access, create_admin, generate_month};

#[derive(Parser)]
#[command(name = "warehouse-cli")]
#[command(about = "Warehouse CLI - Administrative tools for the warehouse API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a user holding the ADMIN role
    CreateAdmin {
        /// Login name
        #[arg(short = 'u', long)]
        username: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Full name
        #[arg(short = 'n', long)]
        full_name: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Generate (or regenerate) the inventory snapshots of a month
    Snapshot {
        /// Month formatted as YYYY-MM
        #[arg(short = 'm', long)]
        month: String,
    },
    /// Show whether a role may call an endpoint
    CheckAccess {
        /// HTTP method, e.g. GET
        method: String,

        /// Request path, e.g. /api/products/SKU-1
        path: String,

        /// Role name or id; omit to check a user without a role
        #[arg(short = 'r', long)]
        role: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = Cli::parse();

    let database_url = warehouse_db::database_url_from_env().context("DATABASE_URL must be set")?;
    let pool = warehouse_db::init_db_pool(&database_url, 5)
        .await
        .context("failed to connect to database")?;

    match cli.command {
        Commands::CreateAdmin {
            username,
            email,
            full_name,
            password,
        } => handle_create_admin(&pool, username, email, full_name, password).await,
        Commands::Snapshot { month } => {
            let written = generate_month(&pool, &month).await?;
            println!("✅ Generated {written} snapshot row(s) for {month}");
            Ok(())
        }
        Commands::CheckAccess { method, path, role } => {
            match check_access(&pool, &method, &path, role.as_deref()).await? {
                Decision::Allow(permission) => println!(
                    "✅ allowed by permission #{} '{}' ({} {})",
                    permission.id, permission.name, permission.http_method, permission.api_path
                ),
                Decision::Deny(reason) => println!("⛔ denied ({}): {}", reason.as_str(), reason),
            }
            Ok(())
        }
    }
}

async fn handle_create_admin(
    pool: &sqlx::PgPool,
    username: Option<String>,
    email: Option<String>,
    full_name: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let username = match username {
        Some(u) => u,
        None => Input::new().with_prompt("Username").interact_text()?,
    };

    let email = match email {
        Some(e) => e,
        None => Input::new().with_prompt("Email address").interact_text()?,
    };

    let full_name = match full_name {
        Some(n) => Some(n),
        None => {
            let entered: String = Input::new()
                .with_prompt("Full name (optional)")
                .allow_empty(true)
                .interact_text()?;
            Some(entered).filter(|n| !n.trim().is_empty())
        }
    };

    let password = match password {
        Some(p) => p,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?,
    };

    let id = create_admin(
        pool,
        NewAdmin {
            username: username.clone(),
            email: email.clone(),
            full_name,
            password,
        },
    )
    .await?;

    println!("\n✅ Admin created successfully!");
    println!("   ID: {id}");
    println!("   Username: {username}");
    println!("   Email: {email}");
    Ok(())
}
