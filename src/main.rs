//! LuxeStay server entry point

use std::env;
use std::io;
use std::path::Path;

use log::{info, warn};

use crate::server::model::config::{bind_addr_from_env, ServerConfig};

mod server;

/// Only local runs read a dotenv file, deployed environments inject variables.
const DEV_DOTENV: &str = ".env.dev";

#[actix_web::main()]
async fn main() -> io::Result<()> {
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());
    // before logging so RUST_LOG from the file applies
    let dotenv = (app_env == "dev").then(|| dotenvy::from_path(Path::new(DEV_DOTENV)));
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    if let Some(Err(e)) = dotenv {
        warn!("could not load {}, using the process environment only, {}", DEV_DOTENV, e);
    }

    let addr = bind_addr_from_env()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("invalid HOST, {e}")))?;
    let config = ServerConfig::from_env(addr);
    info!("LuxeStay starting in env={}", app_env);

    server::run(config).await
}
