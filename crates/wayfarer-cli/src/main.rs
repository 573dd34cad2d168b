mod config;
mod export_cmd;
mod plan_cmd;
mod reschedule_cmd;
mod resolve;
mod show_cmd;
mod travel_cmd;

use clap::{Parser, Subcommand};

use wayfarer_db::pool;

use config::WayfarerConfig;

#[derive(Parser)]
#[command(name = "wayfarer", about = "Travel itinerary editing and reconciliation engine")]
struct Cli {
    /// Database URL (overrides WAYFARER_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a wayfarer config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/wayfarer")]
        db_url: String,
        /// Planning backend base URL
        #[arg(long, default_value = WayfarerConfig::DEFAULT_PLANNER_URL)]
        planner_url: String,
        /// Routing provider base URL
        #[arg(long, default_value = WayfarerConfig::DEFAULT_ROUTING_URL)]
        routing_url: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the wayfarer database (requires config file or env vars)
    DbInit,
    /// Request an itinerary from the planning backend and store it
    Plan {
        /// Natural-language trip request
        prompt: String,
        /// Attribute the itinerary to a user
        #[arg(long)]
        user: Option<String>,
    },
    /// List stored itineraries
    List,
    /// Show one itinerary day by day
    Show {
        /// Itinerary ID (or unique prefix)
        id: String,
    },
    /// Move or resize an activity on the calendar
    Reschedule {
        /// Itinerary ID (or unique prefix)
        id: String,
        /// Activity ID
        activity_id: String,
        /// New start time (RFC 3339, e.g. 2025-06-03T14:00:00Z)
        new_start: String,
        /// New end time (RFC 3339)
        new_end: String,
    },
    /// Export an itinerary summary as CSV
    Export {
        /// Itinerary ID (or unique prefix)
        id: String,
        /// Output file (stdout when omitted)
        #[arg(long)]
        output: Option<String>,
    },
    /// Show travel times between activities via the routing provider
    Travel {
        /// Itinerary ID (or unique prefix)
        id: String,
        /// Comma-separated travel modes (drive, walk, bicycle, transit)
        #[arg(long, default_value = "drive")]
        modes: String,
        /// Restrict to one day's legs (YYYY-MM-DD); whole trip when omitted
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete a stored itinerary
    Delete {
        /// Itinerary ID (or unique prefix)
        id: String,
    },
}

/// Execute the `wayfarer init` command: write the config file.
fn cmd_init(db_url: &str, planner_url: &str, routing_url: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();
    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_owned(),
        },
        services: config::ServicesSection {
            planner_url: planner_url.to_owned(),
            routing_url: routing_url.to_owned(),
        },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  services.planner_url = {planner_url}");
    println!("  services.routing_url = {routing_url}");
    println!();
    println!("Next: run `wayfarer db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `wayfarer db-init` command: create database and run
/// migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = WayfarerConfig::resolve(cli_db_url)?;

    println!("Initializing wayfarer database...");

    // 1. Create the database if it does not exist.
    pool::ensure_database_exists(&resolved.db_config).await?;

    // 2. Connect to the target database.
    let db_pool = pool::create_pool(&resolved.db_config).await?;

    // 3. Run migrations.
    pool::run_migrations(&db_pool).await?;

    // 4. Print success with table counts.
    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    // 5. Clean shutdown.
    db_pool.close().await;

    println!("wayfarer db-init complete.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("WAYFARER_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("wayfarer=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            db_url,
            planner_url,
            routing_url,
            force,
        } => {
            cmd_init(&db_url, &planner_url, &routing_url, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        Commands::Plan { prompt, user } => {
            let resolved = WayfarerConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result =
                plan_cmd::run_plan(&db_pool, &resolved.planner_url, &prompt, user.as_deref())
                    .await;
            db_pool.close().await;
            result?;
        }
        Commands::List => {
            let resolved = WayfarerConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = show_cmd::run_list(&db_pool).await;
            db_pool.close().await;
            result?;
        }
        Commands::Show { id } => {
            let resolved = WayfarerConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = async {
                let id = resolve::resolve_itinerary_id(&db_pool, &id).await?;
                show_cmd::run_show(&db_pool, id).await
            }
            .await;
            db_pool.close().await;
            result?;
        }
        Commands::Reschedule {
            id,
            activity_id,
            new_start,
            new_end,
        } => {
            let resolved = WayfarerConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = async {
                let id = resolve::resolve_itinerary_id(&db_pool, &id).await?;
                reschedule_cmd::run_reschedule(&db_pool, id, &activity_id, &new_start, &new_end)
                    .await
            }
            .await;
            db_pool.close().await;
            result?;
        }
        Commands::Export { id, output } => {
            let resolved = WayfarerConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = async {
                let id = resolve::resolve_itinerary_id(&db_pool, &id).await?;
                export_cmd::run_export(&db_pool, id, output.as_deref()).await
            }
            .await;
            db_pool.close().await;
            result?;
        }
        Commands::Travel { id, modes, date } => {
            let resolved = WayfarerConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = async {
                let id = resolve::resolve_itinerary_id(&db_pool, &id).await?;
                travel_cmd::run_travel(&db_pool, &resolved.routing_url, id, &modes, date.as_deref())
                    .await
            }
            .await;
            db_pool.close().await;
            result?;
        }
        Commands::Delete { id } => {
            let resolved = WayfarerConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = async {
                let id = resolve::resolve_itinerary_id(&db_pool, &id).await?;
                wayfarer_db::queries::itineraries::delete_itinerary(&db_pool, id).await?;
                println!("Deleted itinerary {id}.");
                Ok::<_, anyhow::Error>(())
            }
            .await;
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}
