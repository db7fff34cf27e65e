//! Crossref lookup: one identifier, one request, one [`Record`].

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::record::{self, Record};
use crate::{author, error::ResolveError, identifier::Doi};

const USER_AGENT: &str = "harvcite/0.1 (mailto:harvcite@example.org)";
const TIMEOUT: Duration = Duration::from_secs(12);

/// Fetch canonical bibliographic metadata for `doi`.
///
/// Any transport failure, non-success status, or malformed payload aborts
/// this path with a typed error; there is no retry and no partial record.
pub fn lookup(doi: &Doi) -> Result<Record, ResolveError> {
    let config = ureq::Agent::config_builder()
        .timeout_connect(Some(Duration::from_secs(5)))
        .timeout_global(Some(TIMEOUT))
        .build();
    let agent = ureq::Agent::new_with_config(config);

    let url = doi.registry_url();
    debug!(%doi, %url, "registry lookup");
    let mut res = agent
        .get(url.as_str())
        .header("Accept", "application/json")
        .header("User-Agent", USER_AGENT)
        .call()
        .map_err(|e| match e {
            ureq::Error::StatusCode(status) => ResolveError::RegistryNotFound {
                doi: doi.as_str().to_string(),
                status,
            },
            other => ResolveError::RegistryUnavailable(other),
        })?;

    let body = res
        .body_mut()
        .read_to_string()
        .map_err(ResolveError::RegistryUnavailable)?;
    let json: Value = serde_json::from_str(&body)
        .map_err(|e| ResolveError::RegistryMalformed(e.to_string()))?;
    let work = json
        .get("message")
        .filter(|m| m.is_object())
        .ok_or_else(|| ResolveError::RegistryMalformed("missing message object".to_string()))?;

    Ok(record_from_work(doi, work))
}

/// Map one Crossref work object into a [`Record`]. Absence of any field
/// must not fail the mapping.
fn record_from_work(doi: &Doi, work: &Value) -> Record {
    let title = join_str_array(&work["title"]);
    let container = join_str_array(&work["container-title"]);
    let publisher = non_empty_str(&work["publisher"]);

    // First present date field wins; its first date-parts entry carries the year.
    let year = ["published-print", "published-online", "issued"]
        .iter()
        .find_map(|k| work[k]["date-parts"][0][0].as_i64())
        .map(|y| y as i32)
        .filter(|y| record::plausible_year(*y));

    let names: Vec<String> = work["author"]
        .as_array()
        .map(|authors| {
            authors
                .iter()
                .filter_map(|a| {
                    let family = a["family"].as_str().unwrap_or("").trim();
                    let given = a["given"].as_str().unwrap_or("").trim();
                    match (family.is_empty(), given.is_empty()) {
                        (false, false) => Some(format!("{given} {family}")),
                        (false, true) => Some(family.to_string()),
                        (true, false) => Some(given.to_string()),
                        (true, true) => None,
                    }
                })
                .collect()
        })
        .unwrap_or_default();
    let author_display = author::join_authors(&names);

    // Registry "number" may arrive as a string or a bare number.
    let series = non_empty_str(&work["number"])
        .or_else(|| work["number"].as_i64().map(|n| n.to_string()));

    Record {
        title,
        year,
        author_display,
        // Lets a registry record that falls through to the web template print
        // a site name instead of the doi.org host.
        site_name: container.clone().or_else(|| publisher.clone()),
        container,
        publisher,
        volume: non_empty_str(&work["volume"]),
        issue: non_empty_str(&work["issue"]),
        pages: non_empty_str(&work["page"]),
        series,
        locator: doi.resolver_url(),
    }
}

fn non_empty_str(v: &Value) -> Option<String> {
    v.as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Crossref serves title-like fields as segment lists; join with spaces.
fn join_str_array(v: &Value) -> Option<String> {
    let joined = v
        .as_array()?
        .iter()
        .filter_map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let joined = joined.trim().to_string();
    (!joined.is_empty()).then_some(joined)
}
