mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tvwatch_core::orchestrator::OrchestratorConfig;
use tvwatch_core::watchlist::{names_from_folder, names_from_list};
use tvwatch_core::{
    load_or_create_settings, update_settings, validate_settings, ActionDispatcher,
    CandidateSource, DispatchOutcome, FileMissLog, HtmlSearcher, HttpTorrentFetcher,
    JsonWatchlistStore, MissLog, QBittorrentClient, RetrievalOrchestrator, SanitizedSettings,
    Settings, TorrentClient, WatchlistStore,
};

use cli::{Cli, Command};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if std::env::args_os().len() <= 1 {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    }
    let cli = Cli::parse();

    // Load configuration
    info!("Loading settings from {:?}", cli.settings);
    let mut settings = load_or_create_settings(&cli.settings)
        .with_context(|| format!("Failed to load settings from {:?}", cli.settings))?;

    if cli.updates_settings() {
        settings = update_settings(&cli.settings, |s| {
            if let Some(folder) = &cli.download_folder {
                s.download_folder = Some(folder.clone());
            }
            if let Some(action) = cli.action {
                s.action = action;
            }
        })
        .context("Failed to update settings")?;
        info!("Settings updated");
    }

    validate_settings(&settings).context("Settings validation failed")?;
    info!("Settings: {:?}", SanitizedSettings::from(&settings));

    // Open the watchlist, adding any seeded series
    let mut seeds = Vec::new();
    if let Some(list) = &cli.series_list {
        seeds.extend(names_from_list(list));
    }
    if let Some(folder) = &cli.series_folder {
        seeds.extend(
            names_from_folder(folder)
                .with_context(|| format!("Failed to list series folder {:?}", folder))?,
        );
    }
    let store: Arc<dyn WatchlistStore> = Arc::new(
        JsonWatchlistStore::open(&cli.watchlist, &seeds)
            .with_context(|| format!("Failed to open watchlist {:?}", cli.watchlist))?,
    );
    info!("Watchlist: {:?} ({} seeded)", cli.watchlist, seeds.len());

    match cli.command {
        Some(Command::Run) => run_pipeline(&settings, store).await,
        None => Ok(()),
    }
}

async fn run_pipeline(settings: &Settings, store: Arc<dyn WatchlistStore>) -> Result<()> {
    let source: Arc<dyn CandidateSource> = Arc::new(HtmlSearcher::new(
        settings.search_engine.clone(),
        settings.search_timeout_secs,
        settings.result_limit,
    ));
    let miss_log: Arc<dyn MissLog> = Arc::new(FileMissLog::new(&settings.miss_log_path));

    let orchestrator = RetrievalOrchestrator::new(
        OrchestratorConfig::from(settings),
        Arc::clone(&store),
        source,
        miss_log,
    );
    let report = orchestrator.run().await.context("Retrieval run failed")?;

    if report.is_empty() {
        info!("Nothing tracked for download");
        return Ok(());
    }
    if report.resolved.is_empty() {
        info!("No new releases ({} series pending)", report.not_found.len());
        return Ok(());
    }

    let torrent_client: Arc<dyn TorrentClient> = Arc::new(
        QBittorrentClient::new(settings.remote_settings.clone(), settings.search_timeout_secs)
            .context("Failed to create remote client")?,
    );
    let dispatcher = ActionDispatcher::new(
        settings.action,
        torrent_client,
        Arc::new(HttpTorrentFetcher::new(settings.search_timeout_secs)),
        settings.download_folder.clone(),
    );

    info!(
        "Running {} on {} download(s)",
        dispatcher.action().as_str(),
        report.resolved.len()
    );
    match dispatcher
        .dispatch(&report.resolved)
        .await
        .context("Download action failed")?
    {
        DispatchOutcome::Magnets(text) => {
            if !text.is_empty() {
                println!("{}", text);
            }
        }
        DispatchOutcome::Pushed(count) => info!("Pushed {} magnet link(s)", count),
        DispatchOutcome::Saved(paths) => info!("Saved {} torrent file(s)", paths.len()),
    }

    Ok(())
}
