pub mod backend;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod errors;
pub mod escalation;
pub mod models;
pub mod render;
pub mod terminal;
pub mod widget;

use backend::{new_backend, check_health, HEALTH_TIMEOUT};
use cli::Args;
use config::WidgetConfig;
use log::info;
use std::error::Error;
use widget::ChatWidget;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = WidgetConfig::from_args(&args)?;
    config.log_summary();

    let backend = new_backend(&config)?;
    if config.health_check {
        info!("Checking backend health at {}", config.base_url);
        check_health(backend.as_ref(), HEALTH_TIMEOUT).await;
    }

    let (widget, events) = ChatWidget::new(backend, &config);
    terminal::run(widget, events).await?;

    Ok(())
}
