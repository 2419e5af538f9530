use clap::Parser;
use color_eyre::Result;
use ipgeo_tui::app::{App, AppActions, RecordSource};
use ipgeo_tui::cli::CliArgs;
use ipgeo_tui::config::init_app_config;
use ipgeo_tui::{event, terminal};

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();
    init_logging();

    let config = init_app_config();
    log::debug!("Using lookup server {}", config.api_base);

    let source = RecordSource::from_arg(config.record.as_deref())?;
    let record = source.initial_record().await;
    let mut app = App::new(record, config.refresh, source, config.api_base.clone());

    // Anything but an interactive terminal gets the one-shot report
    if args.headless || args.json || !is_terminal() {
        return event::run_headless(&app, args.json);
    }

    let actions = AppActions::new(config.api_base, config.http_timeout);

    let mut terminal = terminal::setup()?;
    let result = event::run(&mut terminal, &mut app, actions).await;
    terminal::cleanup(true, true);

    result
}

/// Logs go to stderr; redirect it (`2>ipgeo.log`) to keep them off the dashboard.
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();
}

// Check if we're running in a terminal
fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}
