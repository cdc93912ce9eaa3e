//! Diabetes health indicator: web form in front of a pre-trained classifier.

pub mod bmi;
pub mod config;
pub mod form;
pub mod models;
pub mod routes;

use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{http::header, web, App, HttpServer};
use anyhow::Context;
use inferences::{Classifier, OnnxClassifier};
use log::{error, info};

use config::ServerConfig;
use routes::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    info!("Starting diabetes health indicator");

    let config = ServerConfig::from_env().context("invalid server configuration")?;

    // Loaded once; every request shares the same model.
    let classifier: Arc<dyn Classifier> = match OnnxClassifier::load(&config.model_path) {
        Ok(model) => {
            info!("Model loaded from {}", config.model_path.display());
            Arc::new(model)
        }
        Err(e) => {
            error!("{}", e);
            return Err(e).with_context(|| {
                format!(
                    "cannot start without a model (set MODEL_PATH, currently {})",
                    config.model_path.display()
                )
            });
        }
    };

    let state = web::Data::new(AppState::new(classifier));
    let bind_address = config.bind_address();
    let static_dir = config.static_dir.clone();

    info!("Server listening on http://{}", bind_address);
    info!("Workers: {}", config.workers);
    info!("Endpoints:");
    info!("   GET  /                - Form");
    info!("   GET  /api/health      - Health check");
    info!("   GET  /api/model-info  - Model and encodings");
    info!("   POST /api/predict     - Diabetes prediction");
    info!("   POST /api/bmi         - BMI calculator");

    let origin = format!("http://{}", bind_address);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&origin)
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .wrap(cors)
            .app_data(state.clone())
            .configure(routes::configure)
            .service(Files::new("/static", &static_dir).prefer_utf8(true))
            .default_service(web::route().to(routes::not_found))
    })
    .workers(config.workers)
    .bind(&bind_address)
    .with_context(|| format!("cannot bind {}", bind_address))?
    .run()
    .await?;

    Ok(())
}
