use actix_web::{HttpResponse, Responder, error, get, web};

use crate::error::AppError;

pub mod assignments;
pub mod calendar;
pub mod events;
pub mod teams;
pub mod users;

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().body("Agenda API v1")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

/// Malformed bodies, queries and paths come back in the same envelope as
/// every other validation failure.
fn extractor_configs(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        error::Error::from(AppError::validation(err.to_string()))
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        error::Error::from(AppError::validation(err.to_string()))
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        error::Error::from(AppError::validation(err.to_string()))
    }));
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(extractor_configs)
        .service(index)
        .service(health)
        .service(
            web::scope("/api/v1")
                .configure(events::configure)
                .configure(assignments::configure)
                .configure(calendar::configure)
                .configure(teams::configure)
                .configure(users::configure),
        );
}
