/// Reduce a geocoder country name + optional ISO code to the key used by the
/// reference dataset. Exact-only: anything unresolvable falls through as-is
/// and fails later at the dataset lookup.
pub fn normalize_country(name: &str, iso_code: Option<&str>) -> String {
    if let Some(code) = iso_code {
        // The code may carry a subdivision suffix ("RU-MOW"); only the
        // country prefix matters here.
        let alpha2 = code.split('-').next().unwrap_or(code).to_uppercase();
        if let Some(country) = rust_iso3166::from_alpha2(&alpha2) {
            // Some registry editions decorate names with a trailing definite
            // article ("Netherlands (the)"); the dataset never does.
            let name = country.name.strip_suffix(" (the)").unwrap_or(country.name);
            let keyed = name.replace(' ', "_");
            return dataset_spelling(&keyed).to_string();
        }
    }

    // No usable code: take the geocoder name verbatim, underscored. The
    // exception table is keyed on ISO registry names, so it does not apply.
    name.replace(' ', "_")
}

/// Countries whose ISO registry name differs from the dataset spelling. Keys
/// are underscored registry names; where registries disagree on decoration
/// (comma-style vs parenthesised), both spellings are listed.
fn dataset_spelling(name: &str) -> &str {
    match name {
        "Bolivia,_Plurinational_State_of" | "Bolivia_(Plurinational_State_of)" => "Bolivia",
        "Bosnia_and_Herzegovina" => "Bosnia_Herzegovina",
        "Brunei_Darussalam" => "Brunei",
        "Congo" | "Congo_(the)" => "Republic_Congo",
        "Congo,_The_Democratic_Republic_of_the"
        | "Congo_(the_Democratic_Republic_of_the)" => "Democratic_Republic_Congo",
        "Côte_d'Ivoire" => "Côte_d_Ivoire",
        "Czechia" => "Czech_Republic",
        "Eswatini" => "Swaziland",
        "Falkland_Islands_(Malvinas)" | "Falkland_Islands_(the)_[Malvinas]" => "Falkland_Islands",
        "Guinea-Bissau" => "Guinea_Bissau",
        "Iran,_Islamic_Republic_of" | "Iran_(Islamic_Republic_of)" => "Iran",
        "Korea,_Democratic_People's_Republic_of"
        | "Korea_(the_Democratic_People's_Republic_of)" => "North_Korea",
        "Korea,_Republic_of" | "Korea_(the_Republic_of)" => "South_Korea",
        "Lao_People's_Democratic_Republic"
        | "Lao_People's_Democratic_Republic_(the)" => "Laos",
        "Moldova,_Republic_of" | "Moldova_(the_Republic_of)" => "Moldova",
        "North_Macedonia" => "Macedonia",
        "Palestine,_State_of" => "Palestina",
        "Russian_Federation" | "Russian_Federation_(the)" => "Russia",
        "Svalbard_and_Jan_Mayen" => "Svalbard_Jan_Mayen",
        "Syrian_Arab_Republic" | "Syrian_Arab_Republic_(the)" => "Syria",
        "Taiwan,_Province_of_China" | "Taiwan_(Province_of_China)" => "Taiwan",
        "Tanzania,_United_Republic_of" | "Tanzania,_the_United_Republic_of" => "Tanzania",
        "Timor-Leste" => "Timor_Leste",
        "Trinidad_and_Tobago" => "Trinidad_Tobago",
        "Türkiye" | "Turkey" => "Turkey",
        "Venezuela,_Bolivarian_Republic_of"
        | "Venezuela_(Bolivarian_Republic_of)" => "Venezuela",
        "Viet_Nam" => "Vietnam",
        other => other,
    }
}
