//! `recipe-server` entry point.

use log::info;
use recipe_api::{AppState, Config};
use recipe_core::db::open_db;
use recipe_core::{init_logging, MediaStore};
use std::error::Error;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("recipe-server: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let env_file = dotenvy::dotenv().ok();
    let config = Config::load()?;
    init_logging(&config.log_level, config.log_dir.as_deref())?;

    info!(
        "event=config_load module=api status=ok env_file={} defaults={}",
        env_file.is_some(),
        config.defaulted.join(",")
    );

    let conn = open_db(&config.db_path)?;
    std::fs::create_dir_all(&config.media_root)?;
    let state = AppState::new(
        conn,
        MediaStore::new(&config.media_root),
        config.media_url.clone(),
    )
    .with_max_upload_bytes(config.max_upload_bytes)
    .with_public_url(config.public_url.clone())
    .with_cors_origins(config.cors_origins.clone());

    recipe_api::serve(config.bind_addr, state).await?;
    Ok(())
}
