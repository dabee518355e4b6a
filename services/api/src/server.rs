use crate::cli::ServeArgs;
use crate::infra::{seed_roster, AppState, LogMailer};
use crate::routes::with_portal_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use edu_reminder::config::AppConfig;
use edu_reminder::error::AppError;
use edu_reminder::telemetry;
use edu_reminder::workflows::portal::{BackgroundMailer, MemoryRecordStore, PortalService};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(roster) = args.roster.take() {
        config.roster.seed_csv = Some(roster);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(MemoryRecordStore::new());
    let mailer = Arc::new(BackgroundMailer::spawn(Arc::new(LogMailer::default())));
    let portal_service = Arc::new(PortalService::new(store, mailer));

    if let Some(path) = config.roster.seed_csv.as_deref() {
        seed_roster(&portal_service, path)?;
    }

    let app = with_portal_routes(portal_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "class notification service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
