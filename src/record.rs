use chrono::Datelike;
use url::Url;

/// Canonical intermediate metadata shape produced by every extractor path
/// and consumed once by the formatter. Never cached or persisted.
#[derive(Debug, Clone, Default)]
pub struct Record {
    pub title: Option<String>,
    pub year: Option<i32>,
    /// Already formatted per the author-name rule, or an organisation name
    /// used verbatim.
    pub author_display: Option<String>,
    pub site_name: Option<String>,
    /// Journal or series title.
    pub container: Option<String>,
    pub publisher: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pages: Option<String>,
    pub series: Option<String>,
    /// The URL or doi.org link printed at the end of the reference.
    /// Non-empty by construction.
    pub locator: String,
}

impl Record {
    pub fn new(locator: impl Into<String>) -> Self {
        Record {
            locator: locator.into(),
            ..Record::default()
        }
    }

    /// Author with the documented fallback chain: author, then site name,
    /// then publisher, then the locator's host. Never empty.
    pub fn author_or_fallback(&self) -> String {
        self.author_display
            .clone()
            .or_else(|| self.site_name.clone())
            .or_else(|| self.publisher.clone())
            .unwrap_or_else(|| host_of(&self.locator))
    }
}

/// Network host of a locator, or the locator itself when it is not a URL
/// (a doi.org link always parses, so this only matters for odd inputs).
pub fn host_of(locator: &str) -> String {
    Url::parse(locator)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| locator.to_string())
}

/// Plausible publication years: movable type through next year.
pub fn plausible_year(year: i32) -> bool {
    let max = chrono::Utc::now().year() + 1;
    (1450..=max).contains(&year)
}
