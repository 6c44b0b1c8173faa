//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tvwatch_core::Action;

#[derive(Debug, Parser)]
#[command(name = "tvwatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (created with defaults when missing)
    #[arg(long, default_value = "settings.json", env = "TVWATCH_SETTINGS")]
    pub settings: PathBuf,

    /// Watchlist file (created when missing)
    #[arg(long, default_value = "watchlist.json", env = "TVWATCH_WATCHLIST")]
    pub watchlist: PathBuf,

    /// Comma-separated series names to start tracking
    #[arg(long, value_name = "A,B,C")]
    pub series_list: Option<String>,

    /// Folder whose entries are series names to start tracking
    #[arg(long, value_name = "DIR")]
    pub series_folder: Option<PathBuf>,

    /// Store this folder as the .torrent destination
    #[arg(long, value_name = "DIR")]
    pub download_folder: Option<PathBuf>,

    /// Store this action (show_magnets, download_from_magnets, download_torrent_files)
    #[arg(long)]
    pub action: Option<Action>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search every tracked series and run the configured action
    #[command(alias = "r")]
    Run,
}

impl Cli {
    /// True when a settings update was requested.
    pub fn updates_settings(&self) -> bool {
        self.download_folder.is_some() || self.action.is_some()
    }
}
