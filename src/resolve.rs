//! The full location-to-projection pipeline, pure from `AddressRecord` on:
//! country normalization, candidate extraction, region matching, rate
//! resolution, 20-year projection.

use crate::country;
use crate::data::ReferenceDataset;
use crate::matching;
use crate::projection;
use crate::subdivisions;
use crate::types::{AddressRecord, MatchProvenance, ProjectionResult, RateTable, ResolveError};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub country: String,
    /// Matched region name, or "Country Median" for the fallback.
    pub region: String,
    pub match_info: Option<MatchProvenance>,
    pub rates: RateTable,
    pub projection: ProjectionResult,
}

pub fn resolve_and_project(
    dataset: &ReferenceDataset,
    address: &AddressRecord,
    area_hectares: f64,
) -> Result<Resolution, ResolveError> {
    if address.country_name.trim().is_empty() {
        return Err(ResolveError::LocationNotFound);
    }

    // Prefer the country-level ISO code; failing that, the country prefix of
    // any coded subdivision carries the same information.
    let iso_code = address.country_iso_alpha2.as_deref().or_else(|| {
        address
            .iso_subdivisions
            .first()
            .map(|(_, code)| code.as_str())
    });
    let country_key = country::normalize_country(&address.country_name, iso_code);

    let units = dataset
        .region_names(&country_key)
        .ok_or_else(|| ResolveError::NoReferenceData(country_key.clone()))?;

    let candidates = subdivisions::extract_candidates(address);
    let (matched_region, match_info) = match matching::find_region(&candidates, &units) {
        Some((region, provenance)) => (Some(region), Some(provenance)),
        None => (None, None),
    };

    let rates = projection::resolve_rates(dataset, &country_key, matched_region.as_deref())?;
    let projection = projection::project(area_hectares, &rates);

    Ok(Resolution {
        country: country_key,
        region: rates.origin.clone(),
        match_info,
        rates,
        projection,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::COUNTRY_MEDIAN;
    use crate::types::{MatchTier, RateRow, CATEGORY_PLANTATIONS, FOREST_TYPES};

    fn dataset() -> ReferenceDataset {
        let mut dataset = ReferenceDataset::default();
        for (region, teak) in [("Khorasan", Some(2.0)), ("Gilan", Some(4.0))] {
            let mut row = RateRow::new();
            for forest_type in FOREST_TYPES {
                row.insert(forest_type.to_string(), None);
            }
            row.insert("Teak".to_string(), teak);
            dataset.insert_row("Testlandia".to_string(), region.to_string(), row);
        }
        dataset
    }

    fn address(state: &str) -> AddressRecord {
        AddressRecord {
            country_name: "Testlandia".to_string(),
            country_iso_alpha2: None,
            iso_subdivisions: vec![],
            textual: vec![("state", state.to_string())],
        }
    }

    #[test]
    fn matched_region_flows_into_projection() {
        let resolution = resolve_and_project(&dataset(), &address("Gilan"), 10.0).unwrap();
        assert_eq!(resolution.country, "Testlandia");
        assert_eq!(resolution.region, "Gilan");
        assert_eq!(resolution.match_info.as_ref().unwrap().tier, MatchTier::Exact);
        // 10 ha x 4 tC/ha/yr x 44/12 = 146.666... -> 146.7
        let teak = &resolution.projection[CATEGORY_PLANTATIONS]["Teak"];
        assert_eq!(teak.first_year_tco2e, Some(146.7));
    }

    #[test]
    fn unmatched_address_falls_back_to_country_median() {
        let resolution = resolve_and_project(&dataset(), &address("Nowhere"), 10.0).unwrap();
        assert_eq!(resolution.region, COUNTRY_MEDIAN);
        assert!(resolution.match_info.is_none());
        assert_eq!(resolution.rates.rates["Teak"], Some(3.0));
    }

    #[test]
    fn empty_country_name_is_location_not_found() {
        let mut addr = address("Gilan");
        addr.country_name = "  ".to_string();
        let err = resolve_and_project(&dataset(), &addr, 10.0).unwrap_err();
        assert_eq!(err, ResolveError::LocationNotFound);
    }

    #[test]
    fn unknown_country_is_no_reference_data() {
        let mut addr = address("Gilan");
        addr.country_name = "Atlantis".to_string();
        let err = resolve_and_project(&dataset(), &addr, 10.0).unwrap_err();
        assert_eq!(err, ResolveError::NoReferenceData("Atlantis".to_string()));
    }

    #[test]
    fn resolution_is_deterministic() {
        let first = resolve_and_project(&dataset(), &address("Gilan"), 10.0).unwrap();
        let second = resolve_and_project(&dataset(), &address("Gilan"), 10.0).unwrap();
        assert_eq!(first, second);
        let a = serde_json::to_string(&first).unwrap();
        let b = serde_json::to_string(&second).unwrap();
        assert_eq!(a, b);
    }
}
