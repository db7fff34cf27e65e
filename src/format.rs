//! RMIT Harvard reference + in-text rendering.
//!
//! Three fixed templates selected once from the record's populated fields;
//! each template tolerates every optional field being absent and still emits
//! a well-formed sentence. Style note preserved from the source material:
//! journal references use a plain title in quotes with the journal
//! italicised, while web and working-paper references italicise the whole
//! title.

use crate::record::{Record, host_of};

/// The output pair: a formatted reference and its in-text form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    pub reference: String,
    pub in_text: String,
}

/// Closed set of reference layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Web,
    WorkingPaper,
    JournalArticle,
}

impl Template {
    /// Pure classification: journal article needs a container plus a volume
    /// or pages; otherwise a series label means working paper; otherwise the
    /// web layout is the fallback.
    pub fn select(record: &Record) -> Self {
        if record.container.is_some() && (record.volume.is_some() || record.pages.is_some()) {
            Template::JournalArticle
        } else if record.series.is_some() {
            Template::WorkingPaper
        } else {
            Template::Web
        }
    }
}

/// Render `record` under the template its fields select.
pub fn cite(record: &Record) -> Citation {
    let template = Template::select(record);
    let author = record.author_or_fallback();
    let reference = match template {
        Template::Web => web_reference(record, &author),
        Template::WorkingPaper => working_paper_reference(record, &author),
        Template::JournalArticle => journal_reference(record, &author),
    };
    Citation {
        reference,
        in_text: in_text(&author, record.year),
    }
}

/// `Author (Year) <em>Title</em>, SiteName website, accessed D Month YYYY. URL.`
fn web_reference(record: &Record, author: &str) -> String {
    let title = escape(record.title.as_deref().unwrap_or(&record.locator));
    let site = escape(
        record
            .site_name
            .as_deref()
            .unwrap_or(&host_of(&record.locator)),
    );
    format!(
        "{} {} <em>{}</em>, {} website, accessed {}. {}.",
        escape(author),
        year_tag(record.year),
        title,
        site,
        accessed_today(),
        escape(&record.locator),
    )
}

/// `Author (Year) <em>Title</em>, SeriesLabel, Publisher, accessed D Month YYYY. URL.`
fn working_paper_reference(record: &Record, author: &str) -> String {
    let title = escape(record.title.as_deref().unwrap_or(&record.locator));
    let mut out = format!("{} {} <em>{}</em>", escape(author), year_tag(record.year), title);
    if let Some(series) = &record.series {
        out.push_str(&format!(", {}", escape(series)));
    }
    if let Some(publisher) = record.publisher.as_deref().or(record.container.as_deref()) {
        out.push_str(&format!(", {}", escape(publisher)));
    }
    out.push_str(&format!(
        ", accessed {}. {}.",
        accessed_today(),
        escape(&record.locator)
    ));
    out
}

/// `Author (Year) 'Title', <em>Journal</em>, Volume(Issue), Pages, accessed
/// D Month YYYY. URL-or-DOI.` The volume/issue/pages clause disappears
/// entirely when none of the three are present.
fn journal_reference(record: &Record, author: &str) -> String {
    let title = escape(record.title.as_deref().unwrap_or(&record.locator));
    let journal = escape(record.container.as_deref().unwrap_or("Journal"));
    let mut out = format!(
        "{} {} '{}', <em>{}</em>",
        escape(author),
        year_tag(record.year),
        title,
        journal
    );

    let vol_issue = match (record.volume.as_deref(), record.issue.as_deref()) {
        (Some(v), Some(i)) => Some(format!("{v}({i})")),
        (Some(v), None) => Some(v.to_string()),
        _ => None,
    };
    let tail: Vec<String> = vol_issue
        .into_iter()
        .chain(record.pages.clone())
        .map(|p| escape(&p))
        .collect();
    if !tail.is_empty() {
        out.push_str(&format!(", {}", tail.join(", ")));
    }

    out.push_str(&format!(
        ", accessed {}. {}",
        accessed_today(),
        escape(&record.locator)
    ));
    if !out.ends_with('.') {
        out.push('.');
    }
    out
}

/// `(LeadSurname Year)`, or `n.d.` when the year is unknown.
fn in_text(author: &str, year: Option<i32>) -> String {
    let lead = match author.split_once(',') {
        Some((before, _)) => before,
        None => author,
    };
    let lead = lead.split_whitespace().collect::<Vec<_>>().join(" ");
    let year = year.map_or_else(|| "n.d.".to_string(), |y| y.to_string());
    format!("({} {})", escape(&lead), year)
}

fn year_tag(year: Option<i32>) -> String {
    year.map_or_else(|| "(n.d.)".to_string(), |y| format!("({y})"))
}

/// Resolution-moment access date: day without leading zero, full month name,
/// four-digit year.
fn accessed_today() -> String {
    chrono::Local::now().format("%-d %B %Y").to_string()
}

/// Scraped content must not inject markup into the output.
fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(locator: &str) -> Record {
        Record::new(locator)
    }

    #[test]
    fn selection_is_pure_in_three_flags() {
        for has_container in [false, true] {
            for has_volume_or_pages in [false, true] {
                for has_series in [false, true] {
                    let mut r = record("https://doi.org/10.1000/182");
                    r.container = has_container.then(|| "J".to_string());
                    r.volume = has_volume_or_pages.then(|| "1".to_string());
                    r.series = has_series.then(|| "No. 1".to_string());
                    let expected = if has_container && has_volume_or_pages {
                        Template::JournalArticle
                    } else if has_series {
                        Template::WorkingPaper
                    } else {
                        Template::Web
                    };
                    assert_eq!(Template::select(&r), expected);
                }
            }
        }
    }

    #[test]
    fn pages_alone_also_classify_journal() {
        let mut r = record("https://doi.org/10.1000/182");
        r.container = Some("Marine Policy".to_string());
        r.pages = Some("105848".to_string());
        assert_eq!(Template::select(&r), Template::JournalArticle);
    }

    #[test]
    fn bare_record_still_forms_a_sentence() {
        let r = record("https://example.com/page");
        let citation = cite(&r);
        assert!(citation.reference.ends_with('.'));
        assert!(citation.reference.contains("https://example.com/page"));
        assert!(citation.reference.contains("(n.d.)"));
        assert!(!citation.reference.contains(", ,"));
        assert_eq!(citation.in_text, "(example.com n.d.)");
    }

    #[test]
    fn web_reference_layout() {
        let mut r = record("https://example.com/story");
        r.title = Some("A big story".to_string());
        r.site_name = Some("Example News".to_string());
        r.author_display = Some("Smith, J.".to_string());
        r.year = Some(2022);
        let citation = cite(&r);
        assert!(citation.reference.starts_with("Smith, J. (2022) <em>A big story</em>, Example News website, accessed "));
        assert!(citation.reference.ends_with(". https://example.com/story."));
        assert_eq!(citation.in_text, "(Smith 2022)");
    }

    #[test]
    fn working_paper_layout() {
        let mut r = record("https://www.nber.org/papers/w12345");
        r.title = Some("Growth and rain".to_string());
        r.author_display = Some("Keynes, J. M.".to_string());
        r.year = Some(2006);
        r.series = Some("NBER Working Paper No. 12345".to_string());
        r.publisher = Some("National Bureau of Economic Research".to_string());
        let citation = cite(&r);
        assert_eq!(Template::select(&r), Template::WorkingPaper);
        assert!(citation.reference.contains("<em>Growth and rain</em>, NBER Working Paper No. 12345, National Bureau of Economic Research, accessed "));
        assert_eq!(citation.in_text, "(Keynes 2006)");
    }

    #[test]
    fn journal_layout_quotes_title_and_italicises_journal() {
        let mut r = record("https://doi.org/10.1016/j.marpol.2023.105848");
        r.title = Some("Plastic pollution in marine policy".to_string());
        r.author_display = Some("Thunberg, G.".to_string());
        r.year = Some(2023);
        r.container = Some("Marine Policy".to_string());
        r.volume = Some("158".to_string());
        r.issue = Some("4".to_string());
        r.pages = Some("105848".to_string());
        let citation = cite(&r);
        assert!(
            citation
                .reference
                .contains("'Plastic pollution in marine policy', <em>Marine Policy</em>, 158(4), 105848, accessed ")
        );
        assert!(citation.reference.ends_with("https://doi.org/10.1016/j.marpol.2023.105848."));
    }

    #[test]
    fn journal_volume_without_issue_is_bare() {
        let mut r = record("https://doi.org/10.1000/182");
        r.container = Some("Annals".to_string());
        r.volume = Some("7".to_string());
        let citation = cite(&r);
        assert!(citation.reference.contains("<em>Annals</em>, 7, accessed "));
    }

    #[test]
    fn journal_issue_without_volume_is_ignored() {
        let mut r = record("https://doi.org/10.1000/182");
        r.container = Some("Annals".to_string());
        r.pages = Some("12-34".to_string());
        r.volume = None;
        r.issue = Some("3".to_string());
        let citation = cite(&r);
        assert!(citation.reference.contains("<em>Annals</em>, 12-34, accessed "));
    }

    #[test]
    fn journal_clause_fully_omitted_when_empty() {
        let mut r = record("https://doi.org/10.1000/182");
        r.container = Some("Annals".to_string());
        let reference = journal_reference(&r, "Smith, J.");
        assert!(reference.contains("<em>Annals</em>, accessed "));
    }

    #[test]
    fn missing_title_falls_back_to_locator() {
        let mut r = record("https://doi.org/10.1000/182");
        r.container = Some("Annals".to_string());
        r.volume = Some("7".to_string());
        let citation = cite(&r);
        assert!(citation.reference.contains("'https://doi.org/10.1000/182'"));
    }

    #[test]
    fn scraped_markup_is_escaped() {
        let mut r = record("https://example.com/x");
        r.title = Some("<script>alert(1)</script> & friends".to_string());
        let citation = cite(&r);
        assert!(!citation.reference.contains("<script>"));
        assert!(citation.reference.contains("&lt;script&gt;"));
        assert!(citation.reference.contains("&amp; friends"));
    }

    #[test]
    fn in_text_collapses_whitespace_in_lead() {
        let mut r = record("https://example.com/x");
        r.author_display = Some("World  Health\tOrganization".to_string());
        r.year = Some(2020);
        assert_eq!(cite(&r).in_text, "(World Health Organization 2020)");
    }
}
