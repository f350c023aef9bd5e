use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use colview::controller::Controller;
use colview::data::DataSet;
use colview::domain::{AppConfig, ColumnsError};
use colview::model::{Model, Status};
use colview::store::ANONYMOUS_USER;
use colview::ui::TableUI;
use colview::{ColumnCatalog, ColumnVisibilityController, FileStore, PreferenceAdapter};

/// Browse a data file with per-user column visibility and ordering.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// CSV, Parquet or Arrow IPC file to show
    data_file: PathBuf,

    /// JSON column catalog; derived from the file header when omitted
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Table id the preferences are stored under (default: file stem)
    #[arg(long)]
    table_id: Option<String>,

    /// User the preferences belong to
    #[arg(long)]
    user: Option<String>,

    /// Directory for stored column preferences
    #[arg(long, default_value = "~/.local/share/colview")]
    storage_dir: String,

    /// Keep column preferences in memory only
    #[arg(long)]
    no_persist: bool,

    /// Write logs to this file (filter with RUST_LOG)
    #[arg(long)]
    log_file: Option<String>,

    /// Event poll interval in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,
}

fn expand(path: &str) -> Result<PathBuf, ColumnsError> {
    shellexpand::full(path)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| ColumnsError::LoadingFailed(format!("cannot expand {path}: {e}")))
}

fn init_logging(log_file: Option<&Path>) -> Result<(), ColumnsError> {
    // The terminal belongs to the ui, so logs only go to a file.
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)?;
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env)
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn config_from_args(args: &Args) -> Result<AppConfig, ColumnsError> {
    let table_id = match &args.table_id {
        Some(id) => id.clone(),
        None => args
            .data_file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("table")
            .to_string(),
    };
    let storage_dir = if args.no_persist {
        None
    } else {
        Some(expand(&args.storage_dir)?)
    };
    Ok(AppConfig {
        event_poll_time: args.poll_ms,
        data_file: args.data_file.clone(),
        catalog_file: args.catalog.clone(),
        table_id,
        user_id: args.user.clone(),
        storage_dir,
    })
}

fn main() -> ExitCode {
    let args = Args::parse();
    let result = args
        .log_file
        .as_deref()
        .map(expand)
        .transpose()
        .and_then(|log_file| init_logging(log_file.as_deref()))
        .and_then(|_| config_from_args(&args))
        .and_then(|config| run(&config));
    match result {
        Err(e) => {
            ratatui::restore();
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => {
            ratatui::restore();
            ExitCode::SUCCESS
        }
    }
}

fn load_catalog(config: &AppConfig, data: &DataSet) -> Result<ColumnCatalog, ColumnsError> {
    match &config.catalog_file {
        Some(path) => ColumnCatalog::from_json(&fs::read_to_string(path)?),
        None => ColumnCatalog::from_header(&data.header()),
    }
}

fn run(config: &AppConfig) -> Result<(), ColumnsError> {
    info!("Starting colview with {:?}", config);

    let data = DataSet::load(&config.data_file)?;
    let catalog = load_catalog(config, &data)?;
    let adapter = match &config.storage_dir {
        Some(dir) => PreferenceAdapter::new(Arc::new(FileStore::new(dir))),
        None => PreferenceAdapter::in_memory(),
    };
    let columns = ColumnVisibilityController::new(
        config.table_id.as_str(),
        config.user_id.as_deref(),
        catalog,
        adapter,
    );
    info!(
        "Column preferences for table {} and user {}",
        columns.table_id(),
        columns.user_id().unwrap_or(ANONYMOUS_USER)
    );

    let mut terminal = ratatui::init();
    let size = terminal.size()?;
    let mut model = Model::init(data, columns, size.width as usize, size.height as usize);
    let mut ui = TableUI::new();
    let controller = Controller::new(config.event_poll_time);

    while model.status != Status::QUITTING {
        terminal.draw(|f| ui.draw(&model, f))?;
        model.update(controller.handle_event()?);
    }

    Ok(())
}
