//! main file for the server

mod controller;
mod database;
pub(crate) mod model;
mod routes;
mod scheduler;
mod service;
mod state;
mod util;

use std::io;

use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::server::database::memory::MemoryStore;
use crate::server::database::postgres::PgStore;
use crate::server::database::seed::seed;
use crate::server::database::Store;
use crate::server::model::config::{BackendConfig, ServerConfig};
use crate::server::routes::configure;
use crate::server::scheduler::job::maintenance;
use crate::server::service::{auth, theme};
use crate::server::state::AppState;
use crate::server::util::time::helper;

async fn open_store(config: &ServerConfig) -> io::Result<Store> {
    match &config.backend {
        BackendConfig::Postgres { read, write } => {
            let store = PgStore::connect(read, write, config.db_timeout)
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
            Ok(Store::Postgres(store))
        }
        BackendConfig::Memory { latency } => {
            warn!("no database configured, serving seeded in-memory data");
            let store = Store::Memory(MemoryStore::with_latency(*latency));
            seed(&store, helper::get_utc_now())
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
            Ok(store)
        }
    }
}

/// Run the server
pub(crate) async fn run(config: ServerConfig) -> io::Result<()> {
    let store = open_store(&config).await?;
    let state = AppState::new(&store, &config)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    if let Some(admin) = &config.mock_admin {
        state
            .auth
            .ensure_admin(admin)
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    }

    tokio::spawn(auth::log_events(state.auth.subscribe()));
    tokio::spawn(theme::log_changes(state.theme.subscribe()));
    let cancel_token = CancellationToken::new();
    let jobs = tokio::spawn(maintenance(
        state.billing.clone(),
        state.auth.clone(),
        cancel_token.clone(),
    ));

    info!("listening on {}", config.addr);
    let data = web::Data::new(state);
    let res = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(data.clone())
            .configure(configure)
    })
    .bind(config.addr)?
    .run()
    .await;

    cancel_token.cancel();
    if let Err(e) = jobs.await {
        warn!("maintenance jobs ended abnormally, {}", e);
    }
    res
}
