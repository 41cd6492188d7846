//! Reverse geocoding against a Nominatim-compatible API. The only network
//! call in the pipeline; everything downstream works on the returned
//! `AddressRecord`.

use crate::config::GeocoderConfig;
use crate::types::{AddressRecord, GeoPoint, TEXTUAL_ADMIN_FIELDS};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

const ISO_KEY_PREFIX: &str = "ISO3166-2-lvl";

pub struct Geocoder {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<RawAddress>,
    /// Nominatim reports "Unable to geocode" here instead of failing the request.
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAddress {
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
    #[serde(flatten)]
    rest: BTreeMap<String, serde_json::Value>,
}

impl Geocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build geocoder HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `Ok(None)` when the provider has no usable address for the point; the
    /// caller treats that the same as a failed lookup.
    pub async fn reverse(&self, point: GeoPoint) -> Result<Option<AddressRecord>> {
        let url = format!("{}/reverse", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", point.latitude.to_string()),
                ("lon", point.longitude.to_string()),
                ("format", "jsonv2".to_string()),
                ("addressdetails", "1".to_string()),
                ("accept-language", "en".to_string()),
                // Admin-area granularity; we don't need street-level detail.
                ("zoom", "10".to_string()),
            ])
            .send()
            .await
            .context("Geocoder request failed")?
            .error_for_status()
            .context("Geocoder returned an error status")?;

        let body: ReverseResponse = response
            .json()
            .await
            .context("Failed to decode geocoder response")?;
        if body.error.is_some() {
            return Ok(None);
        }
        Ok(body.address.and_then(address_record))
    }
}

/// An address without a country can never resolve, so it is dropped here.
fn address_record(raw: RawAddress) -> Option<AddressRecord> {
    let country_name = raw.country?;

    let mut iso_subdivisions = Vec::new();
    for (key, value) in &raw.rest {
        if let Some(suffix) = key.strip_prefix(ISO_KEY_PREFIX) {
            // Malformed level suffixes are skipped, not errors.
            if let (Ok(level), Some(code)) = (suffix.parse::<u8>(), value.as_str()) {
                iso_subdivisions.push((level, code.to_string()));
            }
        }
    }

    let mut textual = Vec::new();
    for field in TEXTUAL_ADMIN_FIELDS {
        if let Some(value) = raw.rest.get(field).and_then(|v| v.as_str()) {
            textual.push((field, value.to_string()));
        }
    }

    Some(AddressRecord {
        country_name,
        country_iso_alpha2: raw.country_code.map(|code| code.to_uppercase()),
        iso_subdivisions,
        textual,
    })
}
