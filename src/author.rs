//! Author-name normalization for the RMIT Harvard templates.

/// Markers that flag a name as an organisation rather than a person.
///
/// The short legal suffixes keep a leading space so they only match as whole
/// trailing words; the longer words match anywhere ("University of Melbourne"
/// has no leading space before "University").
const ORG_MARKERS: &[&str] = &[
    " inc",
    " ltd",
    " llc",
    " pte",
    "&",
    "company",
    "university",
    "gov",
    "ministry",
    "press",
    "bureau",
    "office",
    "department",
    "organisation",
    "organization",
];

/// Turn "Greta Thunberg" into "Thunberg, G.".
///
/// Names that already carry a comma, look like an organisation, or have fewer
/// than two tokens come back unchanged. Idempotent: the comma inserted by a
/// first pass short-circuits any second pass.
pub fn format_person_name(name: &str) -> String {
    let n = name.trim();
    let lowered = n.to_lowercase();
    if n.contains(',') || ORG_MARKERS.iter().any(|m| lowered.contains(m)) {
        return n.to_string();
    }
    let parts: Vec<&str> = n.split_whitespace().collect();
    if parts.len() < 2 {
        return n.to_string();
    }
    let family = parts[parts.len() - 1];
    let initials: Vec<String> = parts[..parts.len() - 1]
        .iter()
        .filter_map(|p| {
            let first = p.chars().next()?;
            first
                .is_alphabetic()
                .then(|| format!("{}.", first.to_uppercase()))
        })
        .collect();
    if initials.is_empty() {
        return n.to_string();
    }
    format!("{family}, {}", initials.join(" "))
}

/// Join an ordered author list as "A, B & C" (no Oxford comma before the
/// ampersand), each name individually normalized first.
pub fn join_authors(names: &[String]) -> Option<String> {
    let formatted: Vec<String> = names
        .iter()
        .map(|n| format_person_name(n))
        .filter(|n| !n.is_empty())
        .collect();
    match formatted.len() {
        0 => None,
        1 => Some(formatted[0].clone()),
        n => Some(format!(
            "{} & {}",
            formatted[..n - 1].join(", "),
            formatted[n - 1]
        )),
    }
}
