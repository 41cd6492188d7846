//! Maps geocoder admin-name candidates onto the reference dataset's region
//! names. Precision over recall: a candidate that matches more than one
//! region on a fuzzy tier is thrown away rather than guessed at.

use crate::types::{Candidate, MatchProvenance, MatchTier};
use deunicode::deunicode;

/// Script- and case-insensitive comparable form shared by tiers 2 and 3.
pub fn normalize_for_match(name: &str) -> String {
    deunicode(name).to_lowercase()
}

/// Try one candidate against the region list, tiers in decreasing
/// specificity. Tier 1 takes the first case-insensitive hit even when several
/// tie (region order is stable). Tiers 2 and 3 demand exactly one hit; more
/// than one rejects the candidate outright.
pub fn match_subnational_unit(name: &str, units: &[String]) -> Option<(String, MatchTier)> {
    let lowered = name.to_lowercase();
    if let Some(unit) = units.iter().find(|u| u.to_lowercase() == lowered) {
        return Some((unit.clone(), MatchTier::Exact));
    }

    let normalized = normalize_for_match(name);
    let normalized_hits: Vec<&String> = units
        .iter()
        .filter(|u| normalize_for_match(u) == normalized)
        .collect();
    match normalized_hits.len() {
        1 => return Some((normalized_hits[0].clone(), MatchTier::ExactNormalized)),
        n if n > 1 => return None,
        _ => {}
    }

    let substring_hits: Vec<&String> = units
        .iter()
        .filter(|u| {
            let unit_normalized = normalize_for_match(u);
            unit_normalized.contains(&normalized) || normalized.contains(&unit_normalized)
        })
        .collect();
    if substring_hits.len() == 1 {
        return Some((substring_hits[0].clone(), MatchTier::Substring));
    }

    None
}

/// Walk the candidates in order; the first one that matches uniquely decides
/// the region. Ambiguous evidence from an earlier candidate never blocks an
/// unambiguous later one.
pub fn find_region(
    candidates: &[Candidate],
    units: &[String],
) -> Option<(String, MatchProvenance)> {
    for candidate in candidates {
        if let Some((unit, tier)) = match_subnational_unit(&candidate.name, units) {
            return Some((
                unit,
                MatchProvenance {
                    source: candidate.source.clone(),
                    tier,
                },
            ));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CandidateSource;

    fn units(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn candidate(name: &str) -> Candidate {
        Candidate {
            name: name.to_string(),
            source: CandidateSource::Textual { field: "state" },
        }
    }

    #[test]
    fn exact_is_case_insensitive_and_keeps_dataset_case() {
        let result = match_subnational_unit("gujarat", &units(&["Gujarat", "Kerala"]));
        assert_eq!(result, Some(("Gujarat".to_string(), MatchTier::Exact)));
    }

    #[test]
    fn exact_takes_first_on_duplicates() {
        let result = match_subnational_unit("norte", &units(&["Norte", "NORTE"]));
        assert_eq!(result, Some(("Norte".to_string(), MatchTier::Exact)));
    }

    #[test]
    fn normalized_match_bridges_diacritics() {
        let result = match_subnational_unit("Sao Paulo", &units(&["São Paulo", "Paraná"]));
        assert_eq!(
            result,
            Some(("São Paulo".to_string(), MatchTier::ExactNormalized))
        );
    }

    #[test]
    fn ambiguous_normalized_match_rejects_without_trying_substring() {
        // Both normalize to "para"; a substring pass would also hit both, but
        // the candidate must already be dead after tier 2.
        let result = match_subnational_unit("Para", &units(&["Pará", "Parã"]));
        assert_eq!(result, None);
    }

    #[test]
    fn substring_works_both_directions() {
        let result = match_subnational_unit("West Bazar", &units(&["Bazar", "Springfield"]));
        assert_eq!(result, Some(("Bazar".to_string(), MatchTier::Substring)));

        let result = match_subnational_unit("Bazar", &units(&["West Bazar", "Springfield"]));
        assert_eq!(result, Some(("West Bazar".to_string(), MatchTier::Substring)));
    }

    #[test]
    fn ambiguous_substring_rejected_and_later_candidate_wins() {
        let known = units(&["Bazar North", "Bazar South", "Springfield"]);
        let candidates = vec![candidate("Bazar"), candidate("Springfield")];
        let (unit, provenance) = find_region(&candidates, &known).unwrap();
        assert_eq!(unit, "Springfield");
        assert_eq!(provenance.tier, MatchTier::Exact);
    }

    #[test]
    fn first_unique_candidate_wins_over_later_ones() {
        let known = units(&["Alpha", "Beta"]);
        let candidates = vec![candidate("beta"), candidate("Alpha")];
        let (unit, provenance) = find_region(&candidates, &known).unwrap();
        assert_eq!(unit, "Beta");
        assert_eq!(provenance.tier, MatchTier::Exact);
    }

    #[test]
    fn no_candidate_survives() {
        let known = units(&["Alpha", "Beta"]);
        let candidates = vec![candidate("Gamma"), candidate("Delta")];
        assert_eq!(find_region(&candidates, &known), None);
    }
}
