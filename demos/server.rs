//! Demo server: loads a schema file, bootstraps the CMS (PostgreSQL when DATABASE_URL is
//! set, in-memory otherwise), mounts a provider and serves the routers.
//!
//! Run: `cargo run --example server`

use cms_bootstrap::{
    common_routes, ensure_database_exists, entity_routes, load_schema_from_path, navigation_routes, AppState, Cms,
    CmsOptions, ConnectorSpec, Location, PgConnector, Settings,
};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cms_bootstrap=info")),
        )
        .init();

    let settings = Settings::from_env();
    let schema = load_schema_from_path(&settings.schema_path).await?;

    let connector = match &settings.database_url {
        Some(url) => {
            ensure_database_exists(url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(5)
                .connect(url)
                .await?;
            let pg = PgConnector::new(pool);
            pg.ensure_table().await?;
            ConnectorSpec::Single(Arc::new(pg))
        }
        None => ConnectorSpec::None,
    };

    let cms = Arc::new(Cms::bootstrap(CmsOptions {
        schema,
        connector,
        base_url: settings.base_url.clone(),
        image_service: Arc::new(settings.image_service()),
        ..CmsOptions::default()
    })?);
    let provider = Arc::new(
        cms.provider_for(&Location::new(settings.base_url.clone(), ""))
            .on_deploy(Arc::new(|report: &cms_bootstrap::DeployReport| {
                tracing::info!(entity = %report.entity, written = report.written, "deploy finished");
            })),
    );
    let state = AppState::mounted(cms, provider);

    let app = Router::new()
        .merge(common_routes(state.clone()))
        .nest("/api/v1", entity_routes(state.clone(), settings.body_limit))
        .merge(navigation_routes(state));

    let listener = TcpListener::bind(&settings.bind).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
