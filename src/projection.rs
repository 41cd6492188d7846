use crate::data::ReferenceDataset;
use crate::types::{
    category_for, ForestProjection, ProjectionResult, RateRow, RateTable, ResolveError,
    AVERAGE_COLUMNS, FOREST_TYPES,
};
use std::collections::BTreeMap;

pub const PROJECTION_YEARS: usize = 20;

/// Carbon mass to CO2-equivalent mass, molar-mass ratio.
pub const CO2E_PER_TONNE_CARBON: f64 = 44.0 / 12.0;

/// Tag used when no region matched and the rates are a country-wide fallback.
pub const COUNTRY_MEDIAN: &str = "Country Median";

/// Pick the rate row for a resolved location: the matched region's row, or a
/// per-column mean across the country's regions when nothing matched.
pub fn resolve_rates(
    dataset: &ReferenceDataset,
    country_key: &str,
    matched_region: Option<&str>,
) -> Result<RateTable, ResolveError> {
    let regions = dataset
        .country(country_key)
        .ok_or_else(|| ResolveError::NoReferenceData(country_key.to_string()))?;

    if let Some(region) = matched_region {
        if let Some(row) = regions.get(region) {
            return Ok(RateTable {
                origin: region.to_string(),
                rates: row.clone(),
            });
        }
    }

    Ok(RateTable {
        origin: COUNTRY_MEDIAN.to_string(),
        rates: country_mean(regions),
    })
}

/// Per-column arithmetic mean over regions with a numeric value; columns with
/// no data anywhere stay missing rather than becoming zero.
fn country_mean(regions: &BTreeMap<String, RateRow>) -> RateRow {
    let mut row = RateRow::new();
    for column in FOREST_TYPES.iter().chain(AVERAGE_COLUMNS.iter()) {
        let values: Vec<f64> = regions
            .values()
            .filter_map(|region_row| region_row.get(*column).copied().flatten())
            .collect();
        let mean = if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        };
        row.insert(column.to_string(), mean);
    }
    row
}

/// Project 20 years of cumulative CO2e removal for each measured forest type,
/// grouped into the two fixed reporting categories. The yearly increment is
/// constant; accumulation runs unrounded and only reported values are rounded
/// to one decimal.
pub fn project(area_hectares: f64, rates: &RateTable) -> ProjectionResult {
    let mut result: ProjectionResult = BTreeMap::new();

    for forest_type in FOREST_TYPES {
        let projection = match rates.rates.get(forest_type).copied().flatten() {
            Some(rate) => {
                let yearly = area_hectares * rate * CO2E_PER_TONNE_CARBON;
                let mut cumulative = Vec::with_capacity(PROJECTION_YEARS);
                let mut running = 0.0;
                for _ in 0..PROJECTION_YEARS {
                    running += yearly;
                    cumulative.push(Some(round1(running)));
                }
                ForestProjection {
                    first_year_tco2e: Some(round1(yearly)),
                    cumulative_tco2e: cumulative,
                }
            }
            None => ForestProjection {
                first_year_tco2e: None,
                cumulative_tco2e: vec![None; PROJECTION_YEARS],
            },
        };

        result
            .entry(category_for(forest_type))
            .or_default()
            .insert(forest_type, projection);
    }

    result
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
