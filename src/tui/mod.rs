mod app;
mod event;
mod form;
mod keymap;
pub mod theme;
mod ui;
mod worker;

use std::time::Duration;

use anyhow::Result;

use crate::api::HttpTaskApi;
use crate::config::Config;

/// Run the interactive board until the user quits.
pub fn run(api: HttpTaskApi, config: &Config) -> Result<()> {
    let api_base = api.base_url().to_string();
    let worker = worker::Worker::spawn(api)?;
    let mut app = app::App::new(
        api_base,
        config.theme.build(),
        Duration::from_millis(config.tick_ms.max(16)),
    );

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal, &worker);
    ratatui::restore();
    result
}
