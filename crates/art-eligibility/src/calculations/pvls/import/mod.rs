mod parser;

pub use parser::parse_datetime;

use super::domain::Cohort;
use super::store::{InMemoryArtStartDates, InMemoryObservationStore};
use parser::RowError;
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidDate {
        file: &'static str,
        row: usize,
        value: String,
    },
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read clinical export: {}", err),
            ImportError::Csv(err) => write!(f, "invalid clinical CSV data: {}", err),
            ImportError::InvalidDate { file, row, value } => write!(
                f,
                "{} row {}: '{}' is not a recognised date",
                file, row, value
            ),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::InvalidDate { .. } => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

fn row_error(file: &'static str, err: RowError) -> ImportError {
    match err {
        RowError::Csv(err) => ImportError::Csv(err),
        RowError::InvalidDate { row, value } => ImportError::InvalidDate { file, row, value },
    }
}

/// ART start dates and observations loaded from CSV exports.
#[derive(Debug, Clone, Default)]
pub struct ClinicalDataset {
    pub art_start_dates: InMemoryArtStartDates,
    pub observations: InMemoryObservationStore,
    patients: Cohort,
}

impl ClinicalDataset {
    pub fn from_paths<P, Q>(art_start_csv: P, observations_csv: Q) -> Result<Self, ImportError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let art_start = std::fs::File::open(art_start_csv)?;
        let observations = std::fs::File::open(observations_csv)?;
        Self::from_readers(art_start, observations)
    }

    pub fn from_readers<A: Read, O: Read>(
        art_start_csv: A,
        observations_csv: O,
    ) -> Result<Self, ImportError> {
        let mut dataset = Self::default();

        let art_rows = parser::parse_art_start_rows(art_start_csv)
            .map_err(|err| row_error("art start dates", err))?;
        for (patient_id, art_start) in art_rows {
            dataset.patients.insert(patient_id);
            if let Some(art_start) = art_start {
                dataset.art_start_dates.insert(patient_id, art_start);
            }
        }

        let observations = parser::parse_observation_rows(observations_csv)
            .map_err(|err| row_error("observations", err))?;
        for observation in observations {
            dataset.patients.insert(observation.person_id);
            dataset.observations.record(observation);
        }

        Ok(dataset)
    }

    /// Every patient mentioned by either export.
    pub fn cohort(&self) -> Cohort {
        self.patients.clone()
    }
}
