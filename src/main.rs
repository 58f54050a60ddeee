use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use snafu::ResultExt as _;

use metroquest::api;
use metroquest::config::Config;
use metroquest::database::Database;
use metroquest::error::{
    ApplicationError, BackfillSnafu, BindAddressSnafu, SeedSnafu, WebServerSnafu,
};
use metroquest::logger;
use metroquest::service::{backfill, catalog};

#[derive(Parser)]
#[command(name = "metroquest", about = "Metro station tracker with badges")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Default)]
enum Command {
    /// Serve the JSON API.
    #[default]
    Serve,
    /// Store the badge catalog and, if configured, the network in the database.
    Seed,
    /// Give a first visit date to stations marked before those dates were recorded.
    BackfillDates,
}

#[tokio::main]
async fn main() -> Result<(), ApplicationError> {
    dotenv().ok();
    let cli = Cli::parse();

    let config = Config::from_env()?;
    let _guard = logger::init(&config.server)?;

    let database = config.database.connect().await?;

    match cli.command.unwrap_or_default() {
        Command::Serve => serve(&config, database).await,
        Command::Seed => seed(&config, &database).await,
        Command::BackfillDates => {
            let updated = backfill::backfill_first_dates(&database)
                .await
                .context(BackfillSnafu)?;
            println!("{updated} station(s) updated");
            Ok(())
        }
    }
}

async fn serve(config: &Config, database: Database) -> Result<(), ApplicationError> {
    let app = api::create_app(database, config.clock()?);
    let router = api::create_router(app);

    let address = config.server.host;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .context(BindAddressSnafu { address })?;

    tracing::info!(%address, "listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown())
        .await
        .context(WebServerSnafu)
}

async fn seed(config: &Config, database: &Database) -> Result<(), ApplicationError> {
    let badges = match &config.server.badge_catalog {
        Some(path) => catalog::read(path).await.context(SeedSnafu)?,
        None => catalog::DEFAULT_BADGES.to_string(),
    };
    let badges = catalog::parse_badges(&badges).context(SeedSnafu)?;

    let network = match &config.server.network_catalog {
        Some(path) => {
            let json = catalog::read(path).await.context(SeedSnafu)?;
            Some(catalog::parse_network(&json).context(SeedSnafu)?)
        }
        None => None,
    };

    catalog::seed(&badges, network.as_ref(), database)
        .await
        .context(SeedSnafu)
}

async fn shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "cannot listen for the shutdown signal");
        std::future::pending::<()>().await;
    }

    tracing::info!("shutting down");
}
