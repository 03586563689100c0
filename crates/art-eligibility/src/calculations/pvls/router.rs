use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{Cohort, LocationRef, PatientId};
use super::import::parse_datetime;
use super::providers::{
    ArtStartDateProvider, CalculationContext, LastObservationQuery, MetadataResolver,
};
use super::service::{CalculationError, CalculationOutcome, OnArtForMoreThanMonthsCalculation};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub cohort: Cohort,
    #[serde(default)]
    pub now: Option<String>,
    #[serde(default)]
    pub location: Option<LocationRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientEligibilityView {
    pub patient_id: PatientId,
    pub on_art_for_more_than_threshold: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
    pub minimum_months_on_art: u32,
    pub evaluated: usize,
    pub eligible: usize,
    pub results: Vec<PatientEligibilityView>,
}

impl EvaluateResponse {
    pub fn from_outcome(outcome: &CalculationOutcome, minimum_months_on_art: u32) -> Self {
        let summary = outcome.summary();
        Self {
            window_start: outcome.window.start,
            window_end: outcome.window.end,
            minimum_months_on_art,
            evaluated: summary.evaluated,
            eligible: summary.eligible,
            results: outcome
                .results
                .iter()
                .map(|(patient_id, eligible)| PatientEligibilityView {
                    patient_id: *patient_id,
                    on_art_for_more_than_threshold: *eligible,
                })
                .collect(),
        }
    }
}

/// Router exposing the calculation over HTTP.
pub fn on_art_router<S, Q, M>(service: Arc<OnArtForMoreThanMonthsCalculation<S, Q, M>>) -> Router
where
    S: ArtStartDateProvider + 'static,
    Q: LastObservationQuery + 'static,
    M: MetadataResolver + 'static,
{
    Router::new()
        .route("/api/v1/pvls/on-art/evaluate", post(evaluate_handler::<S, Q, M>))
        .with_state(service)
}

pub(crate) async fn evaluate_handler<S, Q, M>(
    State(service): State<Arc<OnArtForMoreThanMonthsCalculation<S, Q, M>>>,
    axum::Json(request): axum::Json<EvaluateRequest>,
) -> Response
where
    S: ArtStartDateProvider + 'static,
    Q: LastObservationQuery + 'static,
    M: MetadataResolver + 'static,
{
    let now = match request.now.as_deref() {
        Some(raw) => match parse_datetime(raw) {
            Some(now) => now,
            None => {
                let payload = json!({
                    "error": format!("'{raw}' is not a recognised date"),
                });
                return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
            }
        },
        None => Local::now().naive_local(),
    };

    let context = CalculationContext {
        now,
        location: request.location,
    };

    match service.evaluate(&request.cohort, &context) {
        Ok(outcome) => {
            let view =
                EvaluateResponse::from_outcome(&outcome, service.config().minimum_months_on_art);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(CalculationError::Provider(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}
