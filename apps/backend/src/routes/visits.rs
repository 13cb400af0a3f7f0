//! Front-page visit counter and the sidebar aggregate.

use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::error::AppError;
use crate::services::visits as visits_service;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VisitResponse {
    today_count: i64,
}

/// POST /api/visit
async fn record_visit(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let today_count = visits_service::record_visit(db).await?;
    Ok(HttpResponse::Ok().json(VisitResponse { today_count }))
}

/// GET /api/sidebar-data
async fn sidebar_data(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let data = visits_service::sidebar_data(db).await?;
    Ok(HttpResponse::Ok().json(data))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/visit", web::post().to(record_visit));
    cfg.route("/sidebar-data", web::get().to(sidebar_data));
}
