use clap::Parser;
use gridbase::cli::CliArgs;
use gridbase::config::{AppConfig, GridSettings};
use gridbase::error::{GridError, GridResult};
use gridbase::io::window::SnapshotWindow;
use gridbase::io::{GridService, Store};
use gridbase::logging;
use gridbase::state::data_model::{OwnerId, TableId};
use gridbase::ui::app::{App, AppContext};

const DEFAULT_BASE_NAME: &str = "My base";
const DEFAULT_TABLE_NAME: &str = "Table 1";

fn main() {
    let cli = CliArgs::parse();
    let config = match AppConfig::load(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("gridbase: {err}");
            std::process::exit(2);
        }
    };
    logging::init(&config.log_filter);

    let context = match open_workspace(&config) {
        Ok(context) => context,
        Err(err) => {
            tracing::error!("Startup failed: {}", err);
            eprintln!("gridbase: {err}");
            std::process::exit(1);
        }
    };

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new().with_window(
                dioxus::desktop::WindowBuilder::new()
                    .with_title("Gridbase")
                    .with_inner_size(dioxus::desktop::LogicalSize::new(1200.0, 800.0)),
            ),
        )
        .with_context(context)
        .launch(App);
}

fn open_workspace(config: &AppConfig) -> GridResult<AppContext> {
    let store = Store::open_path(config.resolved_database_path())?;
    let owner = OwnerId::new(config.owner.trim());

    let table_id = match config.table.as_deref() {
        Some(raw) => TableId::parse(raw)
            .ok_or_else(|| GridError::Validation(format!("not a table id: {raw}")))?,
        None => {
            let (_, table) = store.ensure_workspace(
                &owner,
                DEFAULT_BASE_NAME,
                DEFAULT_TABLE_NAME,
                &config.table_template(),
            )?;
            table.id
        }
    };
    tracing::info!("Opening table {} as {}", table_id, owner);

    Ok(AppContext {
        service: GridService::new(store, owner),
        table_id,
        window: SnapshotWindow::new(config.row_limit),
        settings: GridSettings::from(config),
    })
}
