use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use campaign_manager::routes::{self, AppState};
use shared::ads_client::AdsClient;
use shared::config::Settings;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let settings = Settings::new()?;
    let client = AdsClient::new(&settings)?;
    info!(
        version = client.version(),
        image_dir = %settings.image_dir.display(),
        "ads api client ready"
    );
    let state = AppState::from_settings(Arc::new(client), &settings);

    info!(bind = %settings.http_bind, port = settings.http_port, "starting campaign-manager");
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .configure(routes::configure)
    })
    .bind((settings.http_bind.as_str(), settings.http_port))?
    .run()
    .await?;
    Ok(())
}
