pub mod api_client;
pub mod config;
pub mod data;
pub mod services;
pub mod state;
pub mod ui;
pub mod utils;

use std::sync::Arc;

use crate::api_client::{CatalogError, HttpCatalogSource};
use crate::config::Config;
use crate::services::CatalogClient;
use crate::ui::list_presenter::ListPresenter;

/// Wire the HTTP source, catalog client and presenter from a config
pub fn build_presenter(config: &Config) -> Result<ListPresenter, CatalogError> {
    let source = HttpCatalogSource::new(&config.api)?;
    let client = CatalogClient::new(Arc::new(source));
    Ok(ListPresenter::new(client, config.messages.clone()))
}
