use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lawdesk::auth::PasswordHasher;
use lawdesk::config::{ServerConfig, resolve_database_path};
use lawdesk::server::{AppState, create_router};
use lawdesk::store::{SqliteStore, Store, seed_defaults};

#[derive(Parser)]
#[command(name = "lawdesk")]
#[command(about = "Case and client portal backend for a law practice", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides PORT)
        #[arg(long, short)]
        port: Option<u16>,

        /// SQLite database file (overrides DATABASE_PATH)
        #[arg(long)]
        database_path: Option<String>,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Create the database, default stats and the admin account
    Init {
        /// SQLite database file (overrides DATABASE_PATH)
        #[arg(long)]
        database_path: Option<String>,
    },

    /// Delete expired sessions
    PruneSessions {
        /// SQLite database file (overrides DATABASE_PATH)
        #[arg(long)]
        database_path: Option<String>,
    },
}

fn load_config(database_path: Option<String>) -> ServerConfig {
    let mut config = ServerConfig::from_env();
    match database_path {
        Some(path) => config.database_path = resolve_database_path(&path),
        None if std::env::var_os("DATABASE_PATH").is_none() => warn!(
            "DATABASE_PATH not set, using {}",
            config.database_path.display()
        ),
        None => {}
    }
    config
}

fn open_store(path: &Path) -> anyhow::Result<SqliteStore> {
    let store = SqliteStore::open(path)?;
    store.initialize()?;
    Ok(store)
}

fn run_init(config: &ServerConfig) -> anyhow::Result<()> {
    let store = open_store(&config.database_path)?;
    seed_defaults(&store, config, &PasswordHasher::new())?;

    println!("Database ready at {}", config.database_path.display());
    println!("Admin account: {}", config.admin_email);

    Ok(())
}

fn run_prune(config: &ServerConfig) -> anyhow::Result<()> {
    let store = open_store(&config.database_path)?;
    let removed = store.prune_expired_sessions()?;

    println!("Removed {removed} expired session(s)");

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("lawdesk=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init { database_path } => {
                run_init(&load_config(database_path))?;
            }
            AdminCommands::PruneSessions { database_path } => {
                run_prune(&load_config(database_path))?;
            }
        },
        Commands::Serve {
            host,
            port,
            database_path,
        } => {
            let mut config = load_config(database_path);
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }

            let store = open_store(&config.database_path)?;
            let passwords = PasswordHasher::new();
            seed_defaults(&store, &config, &passwords)?;

            info!("Using database at {}", config.database_path.display());

            let state = Arc::new(AppState::new(Arc::new(store), passwords, &config));

            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
