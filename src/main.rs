//! Topic Editor command line

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use topic_editor_lib::commands::{
    apply_edits, configure_cloud_sync, disconnect_cloud_sync, get_cloud_sync_url, list_catalog,
    parse_script, preview_save, save_changes,
};
use topic_editor_lib::config::APP_NAME;
use topic_editor_lib::sync::SAVING_MESSAGE;
use topic_editor_lib::{AppConfig, Session};

#[derive(Parser, Debug)]
#[command(name = "topic-editor")]
#[command(about = "Edit a theme/question catalog and save it to a remote store")]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the catalog with the indices edit scripts refer to
    List,
    /// Apply a JSON edit script and save
    Apply {
        script: PathBuf,
        /// Show what would be saved without saving
        #[arg(long)]
        dry_run: bool,
    },
    /// Store the cloud endpoint next to the database
    Configure {
        #[arg(long)]
        url: String,
        #[arg(long)]
        token: String,
        /// Save without checking the endpoint first
        #[arg(long)]
        skip_check: bool,
    },
    /// Forget the cloud endpoint and use the local database
    Disconnect,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) =
        rolling_logger::init_logger_with_level(config.log_dir(), APP_NAME, config.log_level())
    {
        eprintln!("Logging disabled: {}", e);
    }
    let _ = rolling_logger::info(&format!("{} {} started", APP_NAME, env!("CARGO_PKG_VERSION")));

    match run(cli.command, &config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            print_log_details();
            ExitCode::FAILURE
        }
        Err(e) => {
            let _ = rolling_logger::error(&e);
            eprintln!("{}", e);
            print_log_details();
            ExitCode::FAILURE
        }
    }
}

/// Error lines of this run and where the full log lives
fn print_log_details() {
    for line in rolling_logger::recent_lines().iter().filter(|l| l.contains("ERROR")) {
        eprintln!("{}", line);
    }
    if let Some(path) = rolling_logger::log_file_path() {
        eprintln!("Full log: {}", path.display());
    }
}

/// Returns false when the command ran but did not fully succeed
async fn run(command: Command, config: &AppConfig) -> Result<bool, String> {
    match command {
        Command::List => {
            let session = open_session(config).await?;
            print_json(&list_catalog(&session).await?)?;
            Ok(true)
        }
        Command::Apply { script, dry_run } => apply(config, &script, dry_run).await,
        Command::Configure { url, token, skip_check } => {
            configure_cloud_sync(&config.database, url, token, skip_check).await?;
            println!("Cloud sync configured");
            Ok(true)
        }
        Command::Disconnect => {
            disconnect_cloud_sync(&config.database)?;
            println!("Using local database {}", config.database.display());
            Ok(true)
        }
    }
}

async fn apply(config: &AppConfig, script: &Path, dry_run: bool) -> Result<bool, String> {
    let source = std::fs::read_to_string(script)
        .map_err(|e| format!("Cannot read {}: {}", script.display(), e))?;
    let edits = parse_script(&source).map_err(|e| e.to_string())?;

    let session = open_session(config).await?;
    let applied = apply_edits(&session, edits).await?;
    log::info!("Applied {} edits from {}", applied, script.display());

    if dry_run {
        print_json(&preview_save(&session).await?)?;
        return Ok(true);
    }

    eprintln!("{}", SAVING_MESSAGE);
    let report = save_changes(&session).await?;
    for message in report.messages() {
        eprintln!("{}", message);
    }
    print_json(&report)?;
    Ok(report.is_success())
}

async fn open_session(config: &AppConfig) -> Result<Session, String> {
    if let Some(url) = get_cloud_sync_url(&config.database) {
        log::debug!("Cloud sync configured for {}", url);
    }
    let store = config.open_store().await.map_err(|e| e.to_string())?;
    Session::open(store).await.map_err(|e| e.to_string())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}
