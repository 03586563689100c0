use super::super::domain::{
    ConceptRef, EncounterTypeRef, LocationRef, ObsValue, Observation, PatientId,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug)]
pub(crate) enum RowError {
    Csv(csv::Error),
    InvalidDate { row: usize, value: String },
}

impl From<csv::Error> for RowError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub(crate) fn parse_art_start_rows<R: Read>(
    reader: R,
) -> Result<Vec<(PatientId, Option<NaiveDateTime>)>, RowError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in csv_reader.deserialize::<ArtStartRow>().enumerate() {
        let row = record?;
        let art_start = parse_optional(row.art_start_date.as_deref(), index + 1)?;
        rows.push((PatientId(row.patient_id), art_start));
    }

    Ok(rows)
}

pub(crate) fn parse_observation_rows<R: Read>(reader: R) -> Result<Vec<Observation>, RowError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut observations = Vec::new();

    for (index, record) in csv_reader.deserialize::<ObservationRow>().enumerate() {
        let row = record?;
        let line = index + 1;
        let obs_datetime =
            parse_datetime(&row.obs_datetime).ok_or_else(|| RowError::InvalidDate {
                row: line,
                value: row.obs_datetime.clone(),
            })?;
        let value = row.value();

        observations.push(Observation {
            person_id: PatientId(row.patient_id),
            encounter_type: EncounterTypeRef(row.encounter_type),
            concept: ConceptRef(row.concept),
            location: row.location.map(LocationRef),
            obs_datetime,
            value,
        });
    }

    Ok(observations)
}

#[derive(Debug, Deserialize)]
struct ArtStartRow {
    patient_id: u64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    art_start_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObservationRow {
    patient_id: u64,
    encounter_type: String,
    concept: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    location: Option<String>,
    obs_datetime: String,
    #[serde(default)]
    value_numeric: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    value_coded: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    value_text: Option<String>,
}

impl ObservationRow {
    fn value(&self) -> Option<ObsValue> {
        if let Some(numeric) = self.value_numeric {
            return Some(ObsValue::Numeric(numeric));
        }
        if let Some(coded) = &self.value_coded {
            return Some(ObsValue::Coded(ConceptRef(coded.clone())));
        }
        self.value_text.clone().map(ObsValue::Text)
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_optional(value: Option<&str>, row: usize) -> Result<Option<NaiveDateTime>, RowError> {
    match value {
        None => Ok(None),
        Some(raw) => parse_datetime(raw)
            .map(Some)
            .ok_or_else(|| RowError::InvalidDate {
                row,
                value: raw.to_string(),
            }),
    }
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS` and bare dates.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    None
}
