use crate::config::SolarConfig;
use serde::Serialize;

/// First-order solar-farm estimate. Deliberately coarse: configured average
/// yield per hectare and grid carbon intensity, no panel or weather model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolarEstimate {
    pub annual_energy_mwh: f64,
    pub annual_offset_tco2e: f64,
}

pub fn estimate(area_hectares: f64, config: &SolarConfig) -> SolarEstimate {
    let annual_energy_mwh = area_hectares * config.mwh_per_hectare_year;
    SolarEstimate {
        annual_energy_mwh,
        annual_offset_tco2e: annual_energy_mwh * config.tco2e_per_mwh,
    }
}
