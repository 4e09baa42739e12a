use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use campaign_reports::report::CampaignReports;
use campaign_reports::routes::{self, AppState};
use shared::ads_client::AdsClient;
use shared::config::Settings;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let settings = Settings::new()?;
    let client = AdsClient::new(&settings)?;
    let version = client.version().to_string();
    let state = AppState::new(CampaignReports::new(Arc::new(client), version));

    info!(
        bind = %settings.http_bind,
        port = settings.reports_http_port,
        "starting campaign-reports"
    );
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .configure(routes::configure)
    })
    .bind((settings.http_bind.as_str(), settings.reports_http_port))?
    .run()
    .await?;
    Ok(())
}
