use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;

mod ai;
mod config;
mod controllers;

use ai::multi_agent::{check_templates, Orchestrator};
use ai::GeminiClient;
use config::Config;

pub struct AppState {
    pub config: Config,
    pub orchestrator: Orchestrator,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // .env first so RUST_LOG can come from it
    let env_file = config::load_env_file();
    env_logger::init();

    match &env_file {
        Ok((path, count)) => {
            log::info!("[CONFIG] Loaded {} variables from {}", count, path.display());
        }
        Err(tried) => {
            let tried: Vec<String> = tried.iter().map(|p| p.display().to_string()).collect();
            log::warn!("[CONFIG] No .env file found (tried: {})", tried.join(", "));
        }
    }

    let config = Config::from_env().map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    config.log_credential_status();

    let client = GeminiClient::new(
        config.google_api_key.as_deref(),
        Some(&config.gemini_endpoint),
        Some(&config.gemini_model),
    )
    .map_err(std::io::Error::other)?;
    log::info!("[CONFIG] Using model {} at {}", config.gemini_model, config.gemini_endpoint);

    check_templates().map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let orchestrator = Orchestrator::new(Arc::new(client));
    let port = config.port;

    log::info!("Starting MediAgent backend on port {}", port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(AppState {
                config: config.clone(),
                orchestrator: orchestrator.clone(),
            }))
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::health::config)
            .configure(controllers::analysis::config)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
