//! Best-effort metadata extraction from an arbitrary web page.
//!
//! One fetch, then a field-by-field sweep over ordered sources: JSON-LD
//! article blocks, Highwire `citation_*` tags, OpenGraph/Twitter preview
//! tags, the raw `<title>`, and finally the URL host for the author/site
//! fallback. Each field takes the first source that supplies it, so title
//! and author may come from different sources.

use std::time::Duration;

use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use url::Url;

use crate::record::{self, Record};
use crate::{author, error::ResolveError, identifier::Doi};

const TIMEOUT: Duration = Duration::from_secs(12);

/// What one page fetch yields: a best-effort record plus the side outputs
/// the caller may re-route on.
#[derive(Debug)]
pub struct ScrapedPage {
    pub record: Record,
    /// DOI surfaced by academic meta tags; the caller should prefer the
    /// registry path when present.
    pub embedded_doi: Option<Doi>,
    /// NBER working-paper number detected from the URL path.
    pub paper_number: Option<String>,
}

/// Fetch `url` once and extract whatever metadata the page exposes.
pub fn scrape(url: &Url) -> Result<ScrapedPage, ResolveError> {
    let html = fetch(url)?;
    Ok(extract(url, &html))
}

/// One GET with a browser-like header set; some gov/org/university sites
/// reject bare automated requests.
fn fetch(url: &Url) -> Result<String, ResolveError> {
    let config = ureq::Agent::config_builder()
        .timeout_connect(Some(Duration::from_secs(5)))
        .timeout_global(Some(TIMEOUT))
        .build();
    let agent = ureq::Agent::new_with_config(config);

    let mut res = agent
        .get(url.as_str())
        .header(
            "User-Agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; ARM64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/124 Safari/537.36",
        )
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .header("Accept-Language", "en-US,en;q=0.9")
        .header("Cache-Control", "no-cache")
        .header("Pragma", "no-cache")
        .call()
        .map_err(|e| match e {
            ureq::Error::StatusCode(status) => ResolveError::PageRejected {
                url: url.to_string(),
                status,
            },
            ureq::Error::Timeout(_) => ResolveError::PageTimeout {
                url: url.to_string(),
            },
            other => {
                if matches!(&other, ureq::Error::Io(io) if io.kind() == std::io::ErrorKind::TimedOut)
                {
                    ResolveError::PageTimeout {
                        url: url.to_string(),
                    }
                } else {
                    ResolveError::PageUnreachable {
                        url: url.to_string(),
                        source: other,
                    }
                }
            }
        })?;

    res.body_mut()
        .read_to_string()
        .map_err(|e| ResolveError::PageUnparseable {
            url: url.to_string(),
            source: e,
        })
}

/// Pure extraction from (URL, HTML); everything network-free so the
/// precedence rules are testable offline.
pub fn extract(url: &Url, html: &str) -> ScrapedPage {
    let metas = collect_meta(html);
    let json_ld = collect_json_ld(html);
    let ld = linked_data_bits(&json_ld);

    let embedded_doi = meta_named(&metas, "citation_doi").and_then(|s| Doi::find(&s));

    let title = ld
        .title
        .clone()
        .or_else(|| meta_named(&metas, "citation_title"))
        .or_else(|| meta_prop(&metas, "og:title"))
        .or_else(|| meta_named(&metas, "twitter:title"))
        .or_else(|| collect_title(html));

    let site_name = ld
        .site
        .clone()
        .or_else(|| meta_prop(&metas, "og:site_name"));

    let author_name = ld
        .author
        .clone()
        .or_else(|| meta_named(&metas, "citation_author"))
        .or_else(|| meta_named(&metas, "author"))
        .or_else(|| meta_prop(&metas, "article:author"));
    let author_display = author_name
        .map(|a| author::format_person_name(&a))
        .filter(|a| !a.is_empty());

    let year = ld
        .year
        .or_else(|| {
            meta_named(&metas, "citation_publication_date")
                .or_else(|| meta_named(&metas, "citation_date"))
                .and_then(|d| parse_year(&d))
        })
        .or_else(|| {
            meta_prop(&metas, "article:published_time")
                .or_else(|| meta_prop(&metas, "og:updated_time"))
                .or_else(|| meta_itemprop(&metas, "datePublished"))
                .or_else(|| meta_named(&metas, "date"))
                .or_else(|| meta_named(&metas, "pubdate"))
                .and_then(|d| parse_year(&d))
        });

    let paper_number = detect_working_paper(url);
    debug!(
        url = %url,
        title = title.as_deref(),
        has_doi = embedded_doi.is_some(),
        paper_number = paper_number.as_deref(),
        "scraped page"
    );

    let mut record = Record::new(url.to_string());
    record.title = title;
    record.year = year;
    record.author_display = author_display;
    record.site_name = site_name;
    ScrapedPage {
        record,
        embedded_doi,
        paper_number,
    }
}

/// Working-paper number from a known repository's URL path shape.
fn detect_working_paper(url: &Url) -> Option<String> {
    static NBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/papers/w(\d+)").unwrap());
    NBER_RE
        .captures(url.path())
        .map(|c| c[1].to_string())
}

/// Best-effort year from a date-shaped string: structured formats first,
/// then the first 1900–2099 token as a last resort.
pub(crate) fn parse_year(s: &str) -> Option<i32> {
    let t = s.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(t) {
        return Some(dt.year()).filter(|y| record::plausible_year(*y));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(t, fmt) {
            return Some(dt.year()).filter(|y| record::plausible_year(*y));
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%d %B %Y", "%B %d, %Y", "%d/%m/%Y"] {
        if let Ok(d) = chrono::NaiveDate::parse_from_str(t, fmt) {
            return Some(d.year()).filter(|y| record::plausible_year(*y));
        }
    }
    static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(19|20)\d{2}").unwrap());
    YEAR_RE.find(t).and_then(|m| m.as_str().parse().ok())
}

// ----------------------------
// HTML collectors
// ----------------------------

#[derive(Debug, Clone)]
struct MetaTag {
    name: Option<String>,
    property: Option<String>,
    itemprop: Option<String>,
    content: String,
}

static META_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<meta\b[^>]*>").unwrap());
static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    // Attribute pairs: key="value" or key='value' (no backreferences in Rust regex)
    Regex::new(r#"(?i)([a-zA-Z_:\-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
});
static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());
static SCRIPT_LD_JSON_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<script\b[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .unwrap()
});

fn collect_meta(html: &str) -> Vec<MetaTag> {
    META_TAG_RE
        .find_iter(html)
        .filter_map(|m| parse_meta_tag(m.as_str()))
        .collect()
}

fn parse_meta_tag(tag: &str) -> Option<MetaTag> {
    let mut name = None;
    let mut property = None;
    let mut itemprop = None;
    let mut content = None;
    for cap in ATTR_RE.captures_iter(tag) {
        let key = &cap[1];
        let val = cap
            .get(2)
            .or_else(|| cap.get(3))
            .map(|m| m.as_str().to_string());
        if let Some(val) = val {
            match key.to_ascii_lowercase().as_str() {
                "name" => name = Some(val),
                "property" => property = Some(val),
                "itemprop" => itemprop = Some(val),
                "content" => content = Some(val),
                _ => {}
            }
        }
    }
    let content = content?;
    Some(MetaTag {
        name,
        property,
        itemprop,
        content,
    })
}

fn collect_title(html: &str) -> Option<String> {
    TITLE_RE
        .captures(html)
        .map(|c| normalize_ws(&c[1]))
        .filter(|t| !t.is_empty())
}

fn collect_json_ld(html: &str) -> Vec<serde_json::Value> {
    let mut out = Vec::new();
    for c in SCRIPT_LD_JSON_RE.captures_iter(html) {
        if let Some(m) = c.get(1) {
            // Relax common issues: HTML comment wrappers and stray NULs.
            let cleaned = m
                .as_str()
                .trim()
                .replace("<!--", "")
                .replace("-->", "")
                .replace('\u{0000}', "");
            if let Ok(v) = serde_json::from_str::<serde_json::Value>(&cleaned) {
                match v {
                    serde_json::Value::Array(a) => out.extend(a),
                    _ => out.push(v),
                }
            }
        }
    }
    out
}

fn meta_named(metas: &[MetaTag], name: &str) -> Option<String> {
    first_content(metas, |m| {
        m.name
            .as_deref()
            .is_some_and(|n| n.eq_ignore_ascii_case(name))
    })
}

fn meta_prop(metas: &[MetaTag], prop: &str) -> Option<String> {
    first_content(metas, |m| {
        m.property
            .as_deref()
            .is_some_and(|p| p.eq_ignore_ascii_case(prop))
    })
}

fn meta_itemprop(metas: &[MetaTag], item: &str) -> Option<String> {
    first_content(metas, |m| {
        m.itemprop
            .as_deref()
            .is_some_and(|p| p.eq_ignore_ascii_case(item))
    })
}

fn first_content(metas: &[MetaTag], pred: impl Fn(&&MetaTag) -> bool) -> Option<String> {
    metas
        .iter()
        .find(pred)
        .map(|m| normalize_ws(&m.content))
        .filter(|c| !c.is_empty())
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ----------------------------
// JSON-LD
// ----------------------------

#[derive(Debug, Default, Clone)]
struct LinkedData {
    title: Option<String>,
    site: Option<String>,
    author: Option<String>,
    year: Option<i32>,
}

/// First JSON-LD block with an article-like type, or which simply carries a
/// headline/name, supplies title, publisher-as-site, primary author and a
/// publication year.
fn linked_data_bits(blocks: &[serde_json::Value]) -> LinkedData {
    for v in blocks {
        let Some(obj) = v.as_object() else { continue };
        let types: Vec<String> = match obj.get("@type") {
            Some(serde_json::Value::String(s)) => vec![s.to_lowercase()],
            Some(serde_json::Value::Array(a)) => a
                .iter()
                .filter_map(|x| x.as_str())
                .map(str::to_lowercase)
                .collect(),
            _ => Vec::new(),
        };
        let article_like = types
            .iter()
            .any(|t| matches!(t.as_str(), "article" | "newsarticle" | "blogposting" | "webpage"));
        if !article_like && !obj.contains_key("headline") && !obj.contains_key("name") {
            continue;
        }

        let title = obj
            .get("headline")
            .or_else(|| obj.get("name"))
            .and_then(|t| t.as_str())
            .map(normalize_ws);
        let site = match obj.get("publisher") {
            Some(serde_json::Value::Object(p)) => {
                p.get("name").and_then(|n| n.as_str()).map(normalize_ws)
            }
            Some(serde_json::Value::String(s)) => Some(normalize_ws(s)),
            _ => None,
        };
        // Author can be a list, a single object, or a literal string.
        let author = match obj.get("author") {
            Some(serde_json::Value::Array(a)) => a.first().and_then(|a0| match a0 {
                serde_json::Value::Object(o) => o.get("name").and_then(|n| n.as_str()).map(normalize_ws),
                serde_json::Value::String(s) => Some(normalize_ws(s)),
                _ => None,
            }),
            Some(serde_json::Value::Object(o)) => {
                o.get("name").and_then(|n| n.as_str()).map(normalize_ws)
            }
            Some(serde_json::Value::String(s)) => Some(normalize_ws(s)),
            _ => None,
        };
        let year = obj
            .get("datePublished")
            .or_else(|| obj.get("dateModified"))
            .and_then(|d| d.as_str())
            .and_then(parse_year);

        return LinkedData {
            title,
            site,
            author,
            year,
        };
    }
    LinkedData::default()
}
