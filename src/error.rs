use thiserror::Error;

/// Everything that can go wrong while resolving one input.
///
/// Each kind maps to one distinct, actionable user-facing message; nothing is
/// retried internally and failures are handled at the request boundary.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Input has no identifier-shaped substring and is not a URL.
    /// A routing outcome more than a fault.
    #[error("input is neither a DOI nor a URL: {0}")]
    Unrecognised(String),

    #[error("could not reach the metadata registry")]
    RegistryUnavailable(#[source] ureq::Error),

    #[error("registry returned status {status} for {doi}")]
    RegistryNotFound { doi: String, status: u16 },

    #[error("registry payload could not be parsed: {0}")]
    RegistryMalformed(String),

    #[error("could not connect to {url}")]
    PageUnreachable {
        url: String,
        #[source]
        source: ureq::Error,
    },

    #[error("timed out fetching {url}")]
    PageTimeout { url: String },

    #[error("{url} returned HTTP status {status}")]
    PageRejected { url: String, status: u16 },

    #[error("could not extract citation data from {url}")]
    PageUnparseable {
        url: String,
        #[source]
        source: ureq::Error,
    },
}

impl ResolveError {
    /// The message shown to the person who pasted the input. Suggests the
    /// alternate path where one exists (DOI for blocked pages, page URL for
    /// registry trouble).
    pub fn user_message(&self) -> String {
        match self {
            ResolveError::Unrecognised(_) => {
                "Paste a URL or a DOI (like 10.xxxx/xxxxx) and I'll return a reference \
                 plus an in-text citation."
                    .to_string()
            }
            ResolveError::RegistryUnavailable(_) => {
                "Network error reaching the metadata registry. Check the connection, \
                 or paste the article's web link instead."
                    .to_string()
            }
            ResolveError::RegistryNotFound { doi, .. } => format!(
                "The registry has no record for {doi}. Check the identifier, or paste \
                 the article's web link instead."
            ),
            ResolveError::RegistryMalformed(_) => {
                "The registry sent back something unreadable. Try again, or paste the \
                 article's web link instead."
                    .to_string()
            }
            ResolveError::PageUnreachable { .. } => {
                "Network error trying to reach that site. Check your internet or try \
                 again. If it's a journal article, paste the DOI instead."
                    .to_string()
            }
            ResolveError::PageTimeout { .. } => {
                "Timed out fetching that page. If it's an academic article, paste the DOI."
                    .to_string()
            }
            ResolveError::PageRejected { status, .. } => format!(
                "That site refused the request (HTTP {status}). If this is a journal \
                 article (e.g. ScienceDirect/Wiley), paste the DOI (like 10.xxxx/xxxxx) \
                 or a doi.org link."
            ),
            ResolveError::PageUnparseable { .. } => {
                "Sorry, I couldn't build a citation for that page. If it's academic, \
                 paste the DOI instead."
                    .to_string()
            }
        }
    }
}
