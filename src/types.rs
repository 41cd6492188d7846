use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// The ten measured forest-type columns of the reference dataset, in source
/// column order. The first six are the plantation group.
pub const FOREST_TYPES: [&str; 10] = [
    "Teak",
    "Eucalyptus",
    "Other broadleaf",
    "Oak",
    "Pine",
    "Other conifer",
    "Natural regeneration",
    "Mangrove tree",
    "Mangrove shrub",
    "Agroforestry",
];

pub const PLANTATION_TYPE_COUNT: usize = 6;

/// Derived columns computed at dataset build time.
pub const AVERAGE_COLUMNS: [&str; 3] = [
    "Average FLR 20y",
    "Average plantation",
    "Average mangrove",
];

pub const CATEGORY_PLANTATIONS: &str = "Plantations and Woodlots";
pub const CATEGORY_OTHER: &str = "Other Forest Types";

pub fn category_for(forest_type: &str) -> &'static str {
    if FOREST_TYPES[..PLANTATION_TYPE_COUNT].contains(&forest_type) {
        CATEGORY_PLANTATIONS
    } else {
        CATEGORY_OTHER
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn in_bounds(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Raw geocoder output for one resolution request.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressRecord {
    pub country_name: String,
    pub country_iso_alpha2: Option<String>,
    /// (administrative level, full ISO 3166-2 code), as reported by the geocoder.
    pub iso_subdivisions: Vec<(u8, String)>,
    /// (field name, value) for the textual admin fields, in extraction order.
    pub textual: Vec<(&'static str, String)>,
}

/// Textual admin fields consulted on the geocoder address, in priority order.
pub const TEXTUAL_ADMIN_FIELDS: [&str; 5] = ["state", "region", "province", "county", "municipality"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum CandidateSource {
    Iso { level: u8 },
    Textual { field: &'static str },
}

/// One admin-name string to try against the dataset's region list.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub name: String,
    pub source: CandidateSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    ExactNormalized,
    Substring,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchProvenance {
    #[serde(flatten)]
    pub source: CandidateSource,
    pub tier: MatchTier,
}

/// One dataset row: column name -> rate, `None` marking a missing value.
pub type RateRow = BTreeMap<String, Option<f64>>;

/// Rates applicable to a resolved location: a real region's row, or the
/// country-wide fallback tagged "Country Median".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateTable {
    pub origin: String,
    pub rates: RateRow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForestProjection {
    pub first_year_tco2e: Option<f64>,
    /// Exactly 20 entries, all `Some` or all `None`.
    pub cumulative_tco2e: Vec<Option<f64>>,
}

/// category -> forest type -> 20-year projection.
pub type ProjectionResult = BTreeMap<&'static str, BTreeMap<&'static str, ForestProjection>>;

#[derive(Debug, Error, PartialEq)]
pub enum ResolveError {
    #[error("could not determine a country for this location")]
    LocationNotFound,
    #[error("no reference data for country `{0}`")]
    NoReferenceData(String),
}
