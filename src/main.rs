// Entry point: config, logging, terminal lifecycle.

mod api;
mod app;
mod config;
mod error;
mod state;
mod ui;

use std::fs::File;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::ApiClient;
use crate::app::App;
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = Config::load()?;
    let client = ApiClient::new(&config.server)?;
    let mut app = App::new(client, config.password);

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal).await;
    ratatui::restore();
    result?;
    Ok(())
}

/// Log to a file under the data dir; stdout belongs to the TUI.
fn init_tracing() {
    let Some(path) = config::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(file) = File::options().create(true).append(true).open(&path) else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
}
