use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use job_matcher::{CorpusStore, Settings, SharedIndex, build_index};
use log::info;
use std::path::PathBuf;

mod routes;

use routes::{AppState, configure};

/// Largest accepted resume upload.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(job_matcher::config::DEFAULT_CONFIG_FILE));
    let settings = Settings::load_from(&config_path)
        .with_context(|| format!("failed to load configuration from {}", config_path.display()))?;

    let store = CorpusStore::from_settings(&settings)?;
    let index = build_index(&settings, &store, false).await;
    info!(
        "Serving {} postings ({} terms)",
        index.document_count(),
        index.vocabulary_size()
    );

    let bind = settings.server.bind.clone();
    let app_state = web::Data::new(AppState::new(SharedIndex::new(index), store, settings));

    info!("Starting HTTP server at http://{}", bind);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();
        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
            .configure(configure)
    })
    .bind(&bind)
    .with_context(|| format!("cannot bind {bind}"))?
    .run()
    .await?;

    Ok(())
}
