use std::sync::Arc;
use std::time::Instant;

use actix_web::error::InternalError;
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use inferences::{Classifier, FEATURE_ORDER};
use log::{error, info, warn};
use serde_json::json;

use crate::bmi;
use crate::form;
use crate::models::{
    age_table, ApiResponse, BmiRequest, BmiResponse, FormInput, GenHlth, PredictionResult, Sex,
    YesNo, AGE_RANGES, BMI_MAX, BMI_MIN,
};

/// Shared, read-only application state. The classifier is loaded once at
/// startup and reused by every request.
pub struct AppState {
    pub classifier: Arc<dyn Classifier>,
}

impl AppState {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        AppState { classifier }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(index)
        .service(health_check)
        .service(model_info)
        .service(predict)
        .service(calculate_bmi);
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err, _req| {
            let message = format!("Invalid request body: {}", err);
            warn!("{}", message);
            let response = HttpResponse::BadRequest().json(ApiResponse::<()>::error(&message));
            InternalError::from_response(err, response).into()
        })
}

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(form::render_page())
}

#[get("/api/health")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success("Diabetes health indicator API"))
}

#[get("/api/model-info")]
async fn model_info(state: web::Data<AppState>) -> impl Responder {
    let info = state.classifier.model_info();
    let gen_hlth: Vec<_> = (1..=GenHlth::ALL.len() as u8)
        .filter_map(GenHlth::from_rank)
        .map(|g| json!({ "label": g.label(), "rank": g.rank() }))
        .collect();

    HttpResponse::Ok().json(ApiResponse::success(json!({
        "model": info,
        "feature_order": FEATURE_ORDER,
        "bmi_range": [BMI_MIN, BMI_MAX],
        "encodings": {
            "yes_no": YesNo::ALL.iter().map(|a| json!({ "label": a.label(), "value": a.encode() })).collect::<Vec<_>>(),
            "sex": Sex::ALL.iter().map(|s| json!({ "label": s.label(), "value": s.encode() })).collect::<Vec<_>>(),
            "gen_hlth": gen_hlth,
            "age": age_table(),
        },
        "age_codes": AGE_RANGES.len(),
    })))
}

#[post("/api/predict")]
async fn predict(
    state: web::Data<AppState>,
    req: web::Json<FormInput>,
) -> impl Responder {
    let start_time = Instant::now();
    info!("New prediction request received");

    let form = match req.validate() {
        Ok(form) => form,
        Err(e) => {
            warn!("Validation failed: {}", e);
            return HttpResponse::BadRequest()
                .json(ApiResponse::<PredictionResult>::error(&e.to_string()).timed(start_time));
        }
    };

    let features = form.to_feature_vector();
    let classifier = state.classifier.clone();

    match web::block(move || classifier.predict(&features)).await {
        Ok(Ok(label)) => {
            info!("Prediction done: {}", label);
            let result = PredictionResult::new(label, &features);
            HttpResponse::Ok().json(ApiResponse::success(result).timed(start_time))
        }
        Ok(Err(e)) => {
            error!("Prediction error: {}", e);
            HttpResponse::InternalServerError().json(
                ApiResponse::<PredictionResult>::error(&format!("Internal error: {}", e))
                    .timed(start_time),
            )
        }
        Err(e) => {
            error!("Blocking execution error: {}", e);
            HttpResponse::InternalServerError().json(
                ApiResponse::<PredictionResult>::error("Execution error").timed(start_time),
            )
        }
    }
}

#[post("/api/bmi")]
async fn calculate_bmi(req: web::Json<BmiRequest>) -> impl Responder {
    match bmi::compute(req.height_cm, req.weight_kg) {
        Ok(value) => HttpResponse::Ok().json(ApiResponse::success(BmiResponse {
            bmi: value,
            display: bmi::format(value),
        })),
        Err(e) => {
            warn!("BMI calculation rejected: {}", e);
            HttpResponse::BadRequest().json(ApiResponse::<BmiResponse>::error(&e.to_string()))
        }
    }
}

pub async fn not_found(req: HttpRequest) -> HttpResponse {
    warn!("No route for {} {}", req.method(), req.path());
    HttpResponse::NotFound().json(ApiResponse::<()>::error("Endpoint not found"))
}
