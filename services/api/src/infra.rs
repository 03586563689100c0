use art_eligibility::calculations::pvls::import::parse_datetime;
use art_eligibility::calculations::pvls::{
    ClinicalDataset, EligibilityConfig, HivMetadata, InMemoryArtStartDates,
    InMemoryObservationStore, OnArtForMoreThanMonthsCalculation, StaticMetadataResolver,
};
use chrono::NaiveDateTime;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type InMemoryCalculation = OnArtForMoreThanMonthsCalculation<
    InMemoryArtStartDates,
    InMemoryObservationStore,
    StaticMetadataResolver,
>;

pub(crate) fn in_memory_calculation(
    dataset: ClinicalDataset,
    metadata: HivMetadata,
    config: EligibilityConfig,
) -> InMemoryCalculation {
    OnArtForMoreThanMonthsCalculation::new(
        Arc::new(dataset.art_start_dates),
        Arc::new(dataset.observations),
        Arc::new(StaticMetadataResolver::new(metadata)),
        config,
    )
}

pub(crate) fn parse_instant(raw: &str) -> Result<NaiveDateTime, String> {
    parse_datetime(raw).ok_or_else(|| {
        format!("failed to parse '{raw}' as YYYY-MM-DD, YYYY-MM-DD HH:MM:SS or RFC 3339")
    })
}

pub(crate) fn deserialize_optional_instant<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| parse_instant(&value).map_err(serde::de::Error::custom))
        .transpose()
}
