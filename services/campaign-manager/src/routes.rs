use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use shared::ads_client::AdsApi;
use shared::config::Settings;
use tracing::{error, info};

use crate::error::ProvisionError;
use crate::lifecycle::{CampaignLifecycle, PauseOutcome, RetireOutcome};
use crate::orchestrator::{Orchestrator, RunLedger};
use crate::provisioners::AdRef;

#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<Orchestrator>,
    lifecycle: Arc<CampaignLifecycle>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, lifecycle: CampaignLifecycle) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            lifecycle: Arc::new(lifecycle),
        }
    }

    pub fn from_settings(api: Arc<dyn AdsApi>, settings: &Settings) -> Self {
        Self::new(
            Orchestrator::from_settings(api.clone(), settings),
            CampaignLifecycle::new(api),
        )
    }
}

/// Error body; `status` and `body` carry the remote detail untouched.
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl From<&ProvisionError> for ErrorResponse {
    fn from(e: &ProvisionError) -> Self {
        let remote = e.remote();
        Self {
            error: e.to_string(),
            status: remote.and_then(|r| r.status()),
            body: remote.and_then(|r| r.body()).map(str::to_string),
        }
    }
}

#[derive(Serialize)]
struct Created {
    ad: AdRef,
    ledger: RunLedger,
}

#[derive(Serialize)]
struct Failed {
    error: ErrorResponse,
    ledger: RunLedger,
}

#[derive(Serialize)]
struct Paused {
    campaign_id: i64,
    status: &'static str,
}

#[derive(Serialize)]
struct StepResult {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorResponse>,
}

impl From<&crate::error::Result<()>> for StepResult {
    fn from(r: &crate::error::Result<()>) -> Self {
        Self {
            ok: r.is_ok(),
            error: r.as_ref().err().map(ErrorResponse::from),
        }
    }
}

#[derive(Serialize)]
struct Retired {
    campaign_id: i64,
    status_removal: StepResult,
    budget_removal: StepResult,
}

fn not_found(campaign_id: i64) -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse {
        error: format!("campaign {campaign_id} not found"),
        status: None,
        body: None,
    })
}

fn bad_gateway(e: &ProvisionError) -> HttpResponse {
    error!(error = %e, "ads api call failed");
    HttpResponse::BadGateway().json(ErrorResponse::from(e))
}

async fn healthz() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

async fn list_campaigns(state: web::Data<AppState>) -> impl Responder {
    match state.lifecycle.list().await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => bad_gateway(&e),
    }
}

async fn create_campaign(state: web::Data<AppState>) -> impl Responder {
    info!("provisioning run requested");
    let run = state.orchestrator.run().await;
    match run.result {
        Ok(ad) => HttpResponse::Created().json(Created {
            ad,
            ledger: run.ledger,
        }),
        Err(e) => HttpResponse::BadGateway().json(Failed {
            error: ErrorResponse::from(&e),
            ledger: run.ledger,
        }),
    }
}

async fn pause_campaign(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let campaign_id = path.into_inner();
    match state.lifecycle.pause(campaign_id).await {
        Ok(PauseOutcome::Paused) => HttpResponse::Ok().json(Paused {
            campaign_id,
            status: "PAUSED",
        }),
        Ok(PauseOutcome::NotFound) => not_found(campaign_id),
        Err(e) => bad_gateway(&e),
    }
}

async fn retire_campaign(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let campaign_id = path.into_inner();
    let outcome = match state.lifecycle.retire(campaign_id).await {
        Ok(outcome) => outcome,
        Err(e) => return bad_gateway(&e),
    };
    let complete = outcome.is_complete();
    match outcome {
        RetireOutcome::NotFound => not_found(campaign_id),
        RetireOutcome::Attempted {
            status_removal,
            budget_removal,
        } => {
            let body = Retired {
                campaign_id,
                status_removal: StepResult::from(&status_removal),
                budget_removal: StepResult::from(&budget_removal),
            };
            if complete {
                HttpResponse::Ok().json(body)
            } else {
                HttpResponse::BadGateway().json(body)
            }
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/healthz", web::get().to(healthz))
        .service(
            web::resource("/campaigns")
                .route(web::get().to(list_campaigns))
                .route(web::post().to(create_campaign)),
        )
        .route("/campaigns/{id}/pause", web::post().to(pause_campaign))
        .route("/campaigns/{id}", web::delete().to(retire_campaign));
}
