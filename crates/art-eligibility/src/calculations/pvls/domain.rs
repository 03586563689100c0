use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{btree_set, BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// Caller-supplied patient identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(pub u64);

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PatientId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Set of patients evaluated together in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cohort(BTreeSet<PatientId>);

impl Cohort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, patient_id: PatientId) -> bool {
        self.0.insert(patient_id)
    }

    pub fn contains(&self, patient_id: &PatientId) -> bool {
        self.0.contains(patient_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, PatientId> {
        self.0.iter()
    }

    #[cfg(feature = "parallel")]
    pub(crate) fn members(&self) -> &BTreeSet<PatientId> {
        &self.0
    }
}

impl FromIterator<PatientId> for Cohort {
    fn from_iter<I: IntoIterator<Item = PatientId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Cohort {
    type Item = &'a PatientId;
    type IntoIter = btree_set::Iter<'a, PatientId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptRef(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncounterTypeRef(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationRef(pub String);

macro_rules! display_ref {
    ($($name:ident),*) => {
        $(
            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )*
    };
}

display_ref!(ConceptRef, EncounterTypeRef, LocationRef);

/// Clinical metadata the viral-load lookup is scoped by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HivMetadata {
    pub viral_load_concept: ConceptRef,
    pub lab_encounter_type: EncounterTypeRef,
    pub adult_followup_encounter_type: EncounterTypeRef,
    pub child_followup_encounter_type: EncounterTypeRef,
}

impl HivMetadata {
    /// Encounter types a viral-load result may be recorded under, lab first.
    pub fn viral_load_encounter_types(&self) -> Vec<EncounterTypeRef> {
        vec![
            self.lab_encounter_type.clone(),
            self.adult_followup_encounter_type.clone(),
            self.child_followup_encounter_type.clone(),
        ]
    }
}

/// Recorded value of an observation. Carried through, never inspected by the rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum ObsValue {
    Numeric(f64),
    Coded(ConceptRef),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub person_id: PatientId,
    pub encounter_type: EncounterTypeRef,
    pub concept: ConceptRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationRef>,
    pub obs_datetime: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ObsValue>,
}

/// ART initiation date per patient. A missing key and `None` both mean unknown.
pub type ArtStartDates = HashMap<PatientId, Option<NaiveDateTime>>;

/// Most recent qualifying observation per patient. A missing key and `None` both mean none found.
pub type LastObservations = HashMap<PatientId, Option<Observation>>;

/// One classification per cohort member.
pub type EligibilityMap = BTreeMap<PatientId, bool>;
