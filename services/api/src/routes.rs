use crate::infra::{deserialize_optional_instant, AppState, InMemoryCalculation};
use art_eligibility::calculations::pvls::{
    on_art_router, Cohort, EligibilityMap, EligibilityRule, EligibilitySummary, OnArtEvaluator,
    PatientEligibilityView, PatientId,
};
use art_eligibility::error::AppError;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct PatientDates {
    pub(crate) patient_id: PatientId,
    #[serde(default, deserialize_with = "deserialize_optional_instant")]
    pub(crate) art_start_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "deserialize_optional_instant")]
    pub(crate) last_viral_load_date: Option<NaiveDateTime>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClassifyRequest {
    #[serde(default)]
    pub(crate) minimum_months_on_art: Option<u32>,
    pub(crate) patients: Vec<PatientDates>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ClassifyResponse {
    pub(crate) minimum_months_on_art: u32,
    pub(crate) evaluated: usize,
    pub(crate) eligible: usize,
    pub(crate) results: Vec<PatientEligibilityView>,
}

pub(crate) fn with_eligibility_routes(calculation: Arc<InMemoryCalculation>) -> axum::Router {
    on_art_router(calculation)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/pvls/on-art/classify",
            axum::routing::post(classify_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Stateless classification of caller-supplied dates; a repeated patient keeps its last entry.
pub(crate) async fn classify_endpoint(
    Json(payload): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, AppError> {
    let ClassifyRequest {
        minimum_months_on_art,
        patients,
    } = payload;

    let rule = minimum_months_on_art
        .map(|minimum_months_on_art| EligibilityRule {
            minimum_months_on_art,
        })
        .unwrap_or_default();
    let evaluator = OnArtEvaluator::new(rule);

    let cohort: Cohort = patients.iter().map(|patient| patient.patient_id).collect();
    let dates: HashMap<PatientId, (Option<NaiveDateTime>, Option<NaiveDateTime>)> = patients
        .into_iter()
        .map(|patient| {
            (
                patient.patient_id,
                (patient.art_start_date, patient.last_viral_load_date),
            )
        })
        .collect();

    let results: EligibilityMap = cohort
        .iter()
        .map(|patient_id| {
            let (art_start, last_viral_load) = dates.get(patient_id).copied().unwrap_or_default();
            (*patient_id, evaluator.is_eligible_on(art_start, last_viral_load))
        })
        .collect();
    let summary = EligibilitySummary::from_results(&results);

    Ok(Json(ClassifyResponse {
        minimum_months_on_art: rule.minimum_months_on_art,
        evaluated: summary.evaluated,
        eligible: summary.eligible,
        results: results
            .into_iter()
            .map(|(patient_id, eligible)| PatientEligibilityView {
                patient_id,
                on_art_for_more_than_threshold: eligible,
            })
            .collect(),
    }))
}
