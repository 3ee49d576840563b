mod config;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::http::{HeaderValue, Method, header};
use clap::Parser;
use tollgate::{SqliteRepositoryProvider, Tollgate, TollgateBuilder};
use tollgate_auth_oauth::{Google, OAuthConfig};
use tollgate_axum::CookieConfig;
use tollgate_core::RepositoryProvider;
use tollgate_gateway::GatewayConfig;
use tollgate_mailer::CodeMailer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AuthServerConfig;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Command line interface for Tollgate
#[derive(Parser)]
#[command(name = "tollgate", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Serve the auth service
    Auth {
        /// Listen port; overrides PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Serve the public gateway
    Gateway {
        /// Listen port; overrides PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Apply pending database migrations and exit
    Migrate {
        /// Database connection string; overrides DATABASE_URL
        #[arg(long)]
        db_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tollgate=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Auth { port } => run_auth(port).await,
        Commands::Gateway { port } => run_gateway(port).await,
        Commands::Migrate { db_url } => run_migrate(db_url).await,
    }
}

async fn run_auth(port: Option<u16>) -> anyhow::Result<()> {
    let mut config = AuthServerConfig::from_env()?;
    if let Some(port) = port {
        config.port = port;
    }

    let mailer = CodeMailer::from_env().context("failed to configure the mailer")?;

    let mut builder = TollgateBuilder::new()
        .with_sqlite(&config.database_url)
        .await?
        .with_mailer(Arc::new(mailer))
        .with_session_expiry(config.session_ttl)
        .apply_migrations(true);

    match OAuthConfig::google_from_env(&config.gateway_url)? {
        Some(oauth) => {
            builder = builder.with_provider(Arc::new(Google::new(oauth)?));
            tracing::info!("Google sign-in enabled");
        }
        None => tracing::info!("GOOGLE_CLIENT_ID not set; Google sign-in disabled"),
    }

    let tollgate = Arc::new(builder.build().await?);
    spawn_cleanup(tollgate.clone());

    let cors = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(&config.frontend_origin)
                .context("FRONTEND_ORIGIN is not a valid origin")?,
        )
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    let app = tollgate_axum::routes(tollgate)
        .with_cookie_config(CookieConfig::development())
        .with_gateway_url(config.gateway_url.clone())
        .build()
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "Auth service listening");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_gateway(port: Option<u16>) -> anyhow::Result<()> {
    let mut config = GatewayConfig::from_env()?;
    if let Some(port) = port {
        config.port = port;
    }

    tracing::info!(
        auth = %config.auth_service_url,
        backend = %config.backend_service_url,
        frontend = %config.frontend_url,
        "Gateway upstreams"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = tollgate_gateway::router(config)?.layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "Gateway listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

async fn run_migrate(db_url: Option<String>) -> anyhow::Result<()> {
    let database_url = match db_url {
        Some(url) => url,
        None => AuthServerConfig::from_env()?.database_url,
    };

    tracing::info!("Running migrations...");
    let repositories = SqliteRepositoryProvider::connect(&database_url).await?;
    repositories.migrate().await?;
    tracing::info!("Migrations complete");
    Ok(())
}

/// Purge expired sessions, codes, and login states once an hour
fn spawn_cleanup(tollgate: Arc<Tollgate<SqliteRepositoryProvider>>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = tollgate.cleanup().await {
                tracing::warn!(error = %e, "Credential cleanup failed");
            }
        }
    });
}
