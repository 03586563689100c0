use super::common::*;
use std::sync::Arc;

use crate::calculations::pvls::domain::{EncounterTypeRef, LocationRef};
use crate::calculations::pvls::providers::{CalculationContext, ProviderError};
use crate::calculations::pvls::service::{
    CalculationError, EligibilityConfig, OnArtForMoreThanMonthsCalculation,
};
use crate::calculations::pvls::store::{
    InMemoryArtStartDates, InMemoryObservationStore, StaticMetadataResolver,
};
use crate::calculations::pvls::window::WindowError;

#[test]
fn service_classifies_every_cohort_member() {
    let service = build_service();
    let cohort = cohort(&[1, 2, 3, 4, 5, 6]);

    let outcome = service.evaluate(&cohort, &context()).expect("evaluation succeeds");

    assert_eq!(outcome.results.len(), 6);
    assert_eq!(outcome.results.get(&patient(1)), Some(&true));
    assert_eq!(outcome.results.get(&patient(2)), Some(&false));
    assert_eq!(outcome.results.get(&patient(3)), Some(&false));
    assert_eq!(outcome.results.get(&patient(4)), Some(&false));
    assert_eq!(outcome.results.get(&patient(5)), Some(&false));
    assert_eq!(outcome.results.get(&patient(6)), Some(&false));
    assert_eq!(outcome.summary().eligible, 1);
}

#[test]
fn service_reports_lookback_window() {
    let service = build_service();

    let outcome = service
        .evaluate(&cohort(&[1]), &context())
        .expect("evaluation succeeds");

    assert_eq!(outcome.window.start, at(2020, 6, 30));
    assert_eq!(outcome.window.end, at(2021, 6, 30));
}

#[test]
fn service_scopes_viral_load_query() {
    let observations = Arc::new(RecordingObservations::default());
    let service = OnArtForMoreThanMonthsCalculation::new(
        Arc::new(InMemoryArtStartDates::new()),
        observations.clone(),
        Arc::new(StaticMetadataResolver::new(metadata())),
        EligibilityConfig {
            minimum_months_on_art: 3,
            lookback_months: 6,
        },
    );

    let outcome = service
        .evaluate(&cohort(&[1, 2]), &context())
        .expect("evaluation succeeds");
    assert!(outcome.results.values().all(|eligible| !eligible));

    let requests = observations.requests.lock().expect("request mutex poisoned");
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.concept, metadata().viral_load_concept);
    assert_eq!(
        request.encounter_types,
        vec![
            EncounterTypeRef("13".to_string()),
            EncounterTypeRef("6".to_string()),
            EncounterTypeRef("9".to_string()),
        ]
    );
    assert_eq!(request.location, Some(LocationRef(CLINIC.to_string())));
    assert_eq!(request.from, at(2020, 12, 30));
    assert_eq!(request.to, at(2021, 6, 30));
}

#[test]
fn service_fails_batch_when_query_unavailable() {
    let service = OnArtForMoreThanMonthsCalculation::new(
        Arc::new(InMemoryArtStartDates::new()),
        Arc::new(UnavailableObservations),
        Arc::new(StaticMetadataResolver::new(metadata())),
        EligibilityConfig::default(),
    );

    let err = service
        .evaluate(&cohort(&[1]), &context())
        .expect_err("query failure propagates");

    assert!(matches!(
        err,
        CalculationError::Provider(ProviderError::Unavailable(_))
    ));
}

#[test]
fn service_stops_when_metadata_unresolvable() {
    let service = OnArtForMoreThanMonthsCalculation::new(
        Arc::new(PanickingArtStartDates),
        Arc::new(InMemoryObservationStore::new()),
        Arc::new(UnresolvableMetadata),
        EligibilityConfig::default(),
    );

    let err = service
        .evaluate(&cohort(&[1]), &context())
        .expect_err("metadata failure propagates");

    assert!(matches!(
        err,
        CalculationError::Provider(ProviderError::MissingMetadata(_))
    ));
}

#[test]
fn service_rejects_unrepresentable_window() {
    let service = build_service();
    let context = CalculationContext::new(chrono::NaiveDateTime::MIN);

    let err = service
        .evaluate(&cohort(&[1]), &context)
        .expect_err("window underflows");

    assert!(matches!(
        err,
        CalculationError::Window(WindowError::OutOfRange { months: 12 })
    ));
}

#[test]
fn service_ignores_results_from_other_locations() {
    let service = build_service();
    let context = CalculationContext::new(at(2021, 6, 30))
        .at_location(LocationRef("clinic-beira".to_string()));

    let outcome = service
        .evaluate(&cohort(&[1, 2]), &context)
        .expect("evaluation succeeds");

    assert_eq!(outcome.results.get(&patient(1)), Some(&false));
    assert_eq!(outcome.summary().eligible, 0);
}

#[test]
fn service_without_location_searches_everywhere() {
    let service = build_service();
    let context = CalculationContext::new(at(2021, 6, 30));

    let outcome = service
        .evaluate(&cohort(&[1]), &context)
        .expect("evaluation succeeds");

    assert_eq!(outcome.results.get(&patient(1)), Some(&true));
}
