//! Reference dataset: built once from the source rate table (`generate`),
//! then loaded read-only at server startup (`serve`).

use crate::types::{RateRow, AVERAGE_COLUMNS, FOREST_TYPES, PLANTATION_TYPE_COUNT};
use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::fs::File;
use std::path::Path;

/// country key -> region name -> rate row. BTreeMaps keep region order
/// stable, which the matcher's first-wins exact tier relies on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceDataset {
    countries: BTreeMap<String, BTreeMap<String, RateRow>>,
}

impl ReferenceDataset {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset file: {:?}", path))?;
        let dataset: ReferenceDataset =
            serde_json::from_str(&content).context("Failed to parse dataset JSON")?;
        Ok(dataset)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write dataset file: {:?}", path))?;
        Ok(())
    }

    pub fn insert_row(&mut self, country: String, region: String, row: RateRow) {
        self.countries.entry(country).or_default().insert(region, row);
    }

    pub fn country(&self, key: &str) -> Option<&BTreeMap<String, RateRow>> {
        self.countries.get(key)
    }

    pub fn region_names(&self, key: &str) -> Option<Vec<String>> {
        self.countries
            .get(key)
            .map(|regions| regions.keys().cloned().collect())
    }

    pub fn country_count(&self) -> usize {
        self.countries.len()
    }

    pub fn region_count(&self) -> usize {
        self.countries.values().map(|regions| regions.len()).sum()
    }
}

pub fn build_from_tsv(path: &Path) -> Result<ReferenceDataset> {
    println!("Building reference dataset from {:?}...", path);
    let file = File::open(path)
        .with_context(|| format!("Failed to open source table: {:?}", path))?;
    let dataset = build_from_reader(file)?;
    println!(
        "Built rates for {} regions across {} countries",
        dataset.region_count(),
        dataset.country_count()
    );
    Ok(dataset)
}

pub fn build_from_reader<R: std::io::Read>(reader: R) -> Result<ReferenceDataset> {
    let mut rdr = ReaderBuilder::new().delimiter(b'\t').from_reader(reader);
    let headers = rdr.headers()?.clone();

    let country_idx = headers
        .iter()
        .position(|h| h == "Country")
        .ok_or_else(|| anyhow!("Column 'Country' not found in source table"))?;
    let unit_idx = headers
        .iter()
        .position(|h| h == "Subnational Unit")
        .ok_or_else(|| anyhow!("Column 'Subnational Unit' not found in source table"))?;

    let mut rate_indices = Vec::with_capacity(FOREST_TYPES.len());
    for forest_type in FOREST_TYPES {
        let idx = headers
            .iter()
            .position(|h| h == forest_type)
            .ok_or_else(|| anyhow!("Column '{}' not found in source table", forest_type))?;
        rate_indices.push((forest_type, idx));
    }

    let mut dataset = ReferenceDataset::default();

    for result in rdr.records() {
        let record = result?;
        let country = record.get(country_idx).unwrap_or("").trim().to_string();
        if country.is_empty() {
            continue;
        }
        let unit = record.get(unit_idx).unwrap_or("").trim().to_string();

        let mut row: RateRow = BTreeMap::new();
        for (forest_type, idx) in &rate_indices {
            row.insert(forest_type.to_string(), parse_rate(record.get(*idx).unwrap_or("")));
        }
        add_derived_columns(&mut row);

        dataset.insert_row(country, unit, row);
    }

    Ok(dataset)
}

/// Non-numeric cells ("N/A", blanks, footnote text) are missing values.
fn parse_rate(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn add_derived_columns(row: &mut RateRow) {
    let all_types = mean_of(row, &FOREST_TYPES);
    let plantation = mean_of(row, &FOREST_TYPES[..PLANTATION_TYPE_COUNT]);
    row.insert(AVERAGE_COLUMNS[0].to_string(), all_types);
    row.insert(AVERAGE_COLUMNS[1].to_string(), plantation);

    // The source workbook's mangrove formula yields 0 (not N/A) unless both
    // mangrove columns are numeric. Preserved as-is; see DESIGN.md.
    let tree = row.get("Mangrove tree").copied().flatten();
    let shrub = row.get("Mangrove shrub").copied().flatten();
    let mangrove = match (tree, shrub) {
        (Some(t), Some(s)) => (t + s) / 2.0,
        _ => 0.0,
    };
    row.insert(AVERAGE_COLUMNS[2].to_string(), Some(mangrove));
}

fn mean_of(row: &RateRow, columns: &[&str]) -> Option<f64> {
    let values: Vec<f64> = columns
        .iter()
        .filter_map(|column| row.get(*column).copied().flatten())
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const HEADER: &str = "Country\tSubnational Unit\tTeak\tEucalyptus\tOther broadleaf\tOak\tPine\tOther conifer\tNatural regeneration\tMangrove tree\tMangrove shrub\tAgroforestry";

    fn dataset_from(rows: &[&str]) -> ReferenceDataset {
        let tsv = format!("{}\n{}\n", HEADER, rows.join("\n"));
        build_from_reader(tsv.as_bytes()).unwrap()
    }

    #[test]
    fn parses_rates_and_missing_markers() {
        let dataset =
            dataset_from(&["India\tKerala\t4.2\tN/A\t3.1\t\t2.0\t1.5\t3.3\t6.0\t4.0\t2.8"]);
        let row = &dataset.country("India").unwrap()["Kerala"];
        assert_eq!(row["Teak"], Some(4.2));
        assert_eq!(row["Eucalyptus"], None);
        assert_eq!(row["Oak"], None);
        assert_eq!(row["Mangrove shrub"], Some(4.0));
    }

    #[test]
    fn derived_averages_ignore_missing() {
        let dataset =
            dataset_from(&["India\tKerala\t4.0\tN/A\t2.0\tN/A\tN/A\tN/A\tN/A\tN/A\tN/A\t6.0"]);
        let row = &dataset.country("India").unwrap()["Kerala"];
        // All-types average over the three numeric cells.
        assert_relative_eq!(row["Average FLR 20y"].unwrap(), 4.0, epsilon = 1e-9);
        // Plantation average over the two numeric plantation cells.
        assert_relative_eq!(row["Average plantation"].unwrap(), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn all_missing_average_stays_missing() {
        let dataset =
            dataset_from(&["India\tKerala\tN/A\tN/A\tN/A\tN/A\tN/A\tN/A\t3.0\tN/A\tN/A\tN/A"]);
        let row = &dataset.country("India").unwrap()["Kerala"];
        assert_eq!(row["Average plantation"], None);
        assert_eq!(row["Average FLR 20y"], Some(3.0));
    }

    #[test]
    fn mangrove_average_requires_both_values_else_zero() {
        let dataset = dataset_from(&[
            "A\tBoth\t1\t1\t1\t1\t1\t1\t1\t6.0\t4.0\t1",
            "A\tOne\t1\t1\t1\t1\t1\t1\t1\t6.0\tN/A\t1",
            "A\tNeither\t1\t1\t1\t1\t1\t1\t1\tN/A\tN/A\t1",
        ]);
        let regions = dataset.country("A").unwrap();
        assert_eq!(regions["Both"]["Average mangrove"], Some(5.0));
        // Quirk: a single numeric mangrove column yields 0, not missing.
        assert_eq!(regions["One"]["Average mangrove"], Some(0.0));
        assert_eq!(regions["Neither"]["Average mangrove"], Some(0.0));
    }

    #[test]
    fn rows_without_country_are_skipped() {
        let dataset = dataset_from(&[
            "\t\t1\t1\t1\t1\t1\t1\t1\t1\t1\t1",
            "B\tSouth\t1\t1\t1\t1\t1\t1\t1\t1\t1\t1",
        ]);
        assert_eq!(dataset.country_count(), 1);
        assert_eq!(dataset.region_count(), 1);
    }

    #[test]
    fn region_names_come_back_in_stable_order() {
        let dataset = dataset_from(&[
            "B\tZulia\t1\t1\t1\t1\t1\t1\t1\t1\t1\t1",
            "B\tAnzoategui\t1\t1\t1\t1\t1\t1\t1\t1\t1\t1",
        ]);
        assert_eq!(
            dataset.region_names("B").unwrap(),
            vec!["Anzoategui".to_string(), "Zulia".to_string()]
        );
    }

    #[test]
    fn json_round_trip() {
        let dataset =
            dataset_from(&["India\tKerala\t4.2\tN/A\t3.1\t\t2.0\t1.5\t3.3\t6.0\t4.0\t2.8"]);
        let json = serde_json::to_string(&dataset).unwrap();
        let back: ReferenceDataset = serde_json::from_str(&json).unwrap();
        assert_eq!(dataset, back);
    }
}
