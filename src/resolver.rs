//! The one logical operation: input string in, (reference, in-text) out.
//!
//! Routing: an identifier anywhere in the input wins and goes straight to
//! the registry; otherwise an http(s) URL goes to the scraper, which may
//! itself surface an embedded identifier and bounce back to the registry.
//! Stateless and reentrant; at most one registry call and one page fetch
//! per request, performed sequentially.

use tracing::debug;
use url::Url;

use crate::{
    error::ResolveError,
    format::{self, Citation},
    identifier::Doi,
    registry, scrape,
};

pub fn resolve(input: &str) -> Result<Citation, ResolveError> {
    let text = input.trim();

    if let Some(doi) = Doi::find(text) {
        debug!(%doi, "identifier path");
        let record = registry::lookup(&doi)?;
        return Ok(format::cite(&record));
    }

    if let Ok(url) = Url::parse(text)
        && matches!(url.scheme(), "http" | "https")
    {
        debug!(%url, "page path");
        return resolve_url(&url);
    }

    Err(ResolveError::Unrecognised(text.to_string()))
}

fn resolve_url(url: &Url) -> Result<Citation, ResolveError> {
    let page = scrape::scrape(url)?;

    // Pages that expose a DOI get the canonical registry treatment instead
    // of whatever was scraped.
    if let Some(doi) = page.embedded_doi {
        debug!(%doi, "re-routing to registry for embedded identifier");
        let record = registry::lookup(&doi)?;
        return Ok(format::cite(&record));
    }

    Ok(cite_scraped(page))
}

/// Turn a scraped page without an embedded identifier into a citation,
/// synthesising the working-paper series and publisher when the URL named a
/// paper number.
fn cite_scraped(page: scrape::ScrapedPage) -> Citation {
    let mut record = page.record;
    if let Some(number) = page.paper_number {
        record.series = Some(format!("NBER Working Paper No. {number}"));
        record.publisher = Some("National Bureau of Economic Research".to_string());
    }
    format::cite(&record)
}
