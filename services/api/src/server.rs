use crate::cli::ServeArgs;
use crate::infra::{in_memory_calculation, AppState};
use crate::routes::with_eligibility_routes;
use art_eligibility::calculations::pvls::ClinicalDataset;
use art_eligibility::config::AppConfig;
use art_eligibility::error::AppError;
use art_eligibility::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let dataset = match (args.art_csv.take(), args.obs_csv.take()) {
        (Some(art_csv), Some(obs_csv)) => {
            let dataset = ClinicalDataset::from_paths(&art_csv, &obs_csv)?;
            info!(
                art_csv = %art_csv.display(),
                obs_csv = %obs_csv.display(),
                patients = dataset.cohort().len(),
                observations = dataset.observations.len(),
                "clinical exports loaded"
            );
            dataset
        }
        _ => {
            warn!("no clinical exports supplied; evaluate endpoint will classify every patient as not eligible");
            ClinicalDataset::default()
        }
    };

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let calculation = Arc::new(in_memory_calculation(
        dataset,
        config.metadata.clone(),
        config.eligibility,
    ));

    let app = with_eligibility_routes(calculation)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        minimum_months_on_art = config.eligibility.minimum_months_on_art,
        lookback_months = config.eligibility.lookback_months,
        "art eligibility service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
