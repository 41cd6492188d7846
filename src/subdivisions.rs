use crate::types::{AddressRecord, Candidate, CandidateSource};
use deunicode::deunicode;

/// Turn a geocoded address into the ordered list of admin-name candidates the
/// matcher will try. ISO-coded names come first (level 4 is the granularity
/// the dataset usually names, so 4 > 3 > 2 > 1, then any higher levels),
/// followed by the textual fields in their fixed order.
pub fn extract_candidates(address: &AddressRecord) -> Vec<Candidate> {
    let mut iso = address.iso_subdivisions.clone();
    iso.sort_by_key(|(level, _)| (*level != 4, *level != 3, *level != 2, *level != 1, *level));

    let mut candidates = Vec::new();

    for (level, code) in &iso {
        // Codes the registry doesn't know are skipped, not errors.
        if let Some(subdivision) = rust_iso3166::iso3166_2::from_code(code) {
            candidates.push(Candidate {
                name: subdivision.name.to_string(),
                source: CandidateSource::Iso { level: *level },
            });
        }
    }

    for (field, value) in &address.textual {
        let name = if contains_non_latin(value) {
            deunicode(value)
        } else {
            value.clone()
        };
        candidates.push(Candidate {
            name,
            source: CandidateSource::Textual { field: *field },
        });
    }

    candidates
}

/// Latin text (diacritics included) must pass through untouched so the exact
/// match tier can still see it; only other scripts get transliterated.
fn contains_non_latin(value: &str) -> bool {
    value.chars().any(|c| {
        !(c.is_ascii() || matches!(c, '\u{00C0}'..='\u{024F}' | '\u{1E00}'..='\u{1EFF}'))
    })
}
