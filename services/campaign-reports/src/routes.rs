use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use tracing::{error, warn};

use crate::report::{CampaignReports, ReportError};

#[derive(Clone)]
pub struct AppState {
    reports: Arc<CampaignReports>,
}

impl AppState {
    pub fn new(reports: CampaignReports) -> Self {
        Self {
            reports: Arc::new(reports),
        }
    }
}

#[derive(Serialize, Debug)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<String>,
}

async fn healthz() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

async fn campaign_report(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let campaign_id = path.into_inner();
    match state.reports.rows(campaign_id).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(ReportError::Remote(e)) => {
            error!(campaign_id, error = %e, "report download failed");
            HttpResponse::BadGateway().json(ErrorResponse {
                error: e.to_string(),
                status: e.status(),
                body: e.body().map(str::to_string),
            })
        }
        Err(ReportError::Malformed(e)) => {
            warn!(campaign_id, error = %e, "malformed report");
            HttpResponse::UnprocessableEntity().json(ErrorResponse {
                error: e.to_string(),
                status: None,
                body: None,
            })
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/healthz", web::get().to(healthz))
        .route("/campaigns/{id}/report", web::get().to(campaign_report));
}
