use once_cell::sync::Lazy;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::Regex;
use url::Url;

const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A DOI-like identifier found inside free text, a URL, or page metadata.
///
/// Both the raw-input path and the `citation_doi` meta path go through
/// [`Doi::find`], so there is a single definition of what counts as valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doi(String);

impl Doi {
    /// Find the first DOI-shaped token anywhere in `text`.
    ///
    /// Returns `None` when no such token exists; that is a routing signal,
    /// not an error. Enclosing angle brackets and quotes never become part of
    /// the token, and trailing sentence punctuation is trimmed so a DOI
    /// quoted in prose round-trips exactly.
    pub fn find(text: &str) -> Option<Self> {
        static DOI_RE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r#"10\.\d{4,9}/[^\s<>"]+"#).unwrap());

        let m = DOI_RE.find(text)?;
        let token = m
            .as_str()
            .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '\''));
        if token.split('/').nth(1).is_none_or(str::is_empty) {
            return None;
        }
        Some(Doi(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The canonical locator printed at the end of a reference.
    pub fn resolver_url(&self) -> String {
        format!("https://doi.org/{}", self.0)
    }

    /// Crossref works endpoint for this identifier.
    pub fn registry_url(&self) -> Url {
        let (prefix, suffix) = self
            .0
            .split_once('/')
            .expect("a parsed DOI always contains a slash");
        let enc_suffix = utf8_percent_encode(suffix, PATH_SEGMENT_ENCODE_SET).to_string();
        Url::parse(&format!("https://api.crossref.org/works/{prefix}/{enc_suffix}"))
            .expect("constructed registry URL is valid")
    }
}

impl std::fmt::Display for Doi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::strategy::Strategy;

    // Suffix characters our regex accepts minus trailing-trim punctuation,
    // so generated DOIs survive the trim untouched.
    fn doi_suffix_char() -> impl Strategy<Value = char> {
        let uppers = proptest::sample::select(('A'..='Z').collect::<Vec<_>>());
        let lowers = proptest::sample::select(('a'..='z').collect::<Vec<_>>());
        let digits = proptest::sample::select(('0'..='9').collect::<Vec<_>>());
        let punct = proptest::sample::select(vec!['-', '.', '_', ';', '(', ')', '/', ':']);
        proptest::prop_oneof![uppers, lowers, digits, punct]
    }

    fn doi_suffix(min: usize, max: usize) -> impl Strategy<Value = String> {
        let last = proptest::prop_oneof![
            proptest::sample::select(('A'..='Z').collect::<Vec<_>>()),
            proptest::sample::select(('a'..='z').collect::<Vec<_>>()),
            proptest::sample::select(('0'..='9').collect::<Vec<_>>()),
        ];
        (min..=max).prop_flat_map(move |len| {
            if len == 1 {
                last.clone().prop_map(|c| c.to_string()).boxed()
            } else {
                (
                    proptest::collection::vec(doi_suffix_char(), len - 1),
                    last.clone(),
                )
                    .prop_map(|(mut v, last)| {
                        v.push(last);
                        v.into_iter().collect::<String>()
                    })
                    .boxed()
            }
        })
    }

    fn doi_core() -> impl Strategy<Value = String> {
        (
            proptest::collection::vec(
                proptest::sample::select(('0'..='9').collect::<Vec<_>>()),
                4..=9,
            )
            .prop_map(|v| v.into_iter().collect::<String>()),
            doi_suffix(1, 64),
        )
            .prop_map(|(digits, suffix)| format!("10.{digits}/{suffix}"))
    }

    #[test]
    fn find_returns_generated_doi_exactly() {
        proptest::proptest!(|(full in doi_core())| {
            let doi = Doi::find(&full).expect("should find");
            proptest::prop_assert_eq!(doi.as_str(), full);
        })
    }

    #[test]
    fn find_excludes_surrounding_punctuation() {
        proptest::proptest!(|(full in doi_core())| {
            for decorated in [
                format!("<{full}>"),
                format!("see {full}."),
                format!("\"{full}\" (2023)"),
                format!("cited as {full}, among others"),
            ] {
                let doi = Doi::find(&decorated).expect("should find despite decoration");
                proptest::prop_assert_eq!(doi.as_str(), full.clone());
            }
        })
    }

    #[test]
    fn find_inside_doi_org_url() {
        let doi = Doi::find("https://doi.org/10.1016/j.marpol.2023.105848").unwrap();
        assert_eq!(doi.as_str(), "10.1016/j.marpol.2023.105848");
    }

    #[test]
    fn find_takes_first_of_multiple() {
        let doi = Doi::find("10.1000/182 and also 10.9999/other").unwrap();
        assert_eq!(doi.as_str(), "10.1000/182");
    }

    #[test]
    fn find_rejects_plain_text() {
        proptest::proptest!(|(s in "[A-Za-z _-]{0,64}")| {
            proptest::prop_assert!(Doi::find(&s).is_none());
        })
    }

    #[test]
    fn find_rejects_short_registrant() {
        // Only three digits after "10."
        assert!(Doi::find("10.123/abc").is_none());
    }

    #[test]
    fn find_rejects_empty_suffix() {
        assert!(Doi::find("10.1234/.").is_none());
    }

    #[test]
    fn registry_url_encodes_suffix() {
        let doi = Doi::find("10.1000/ab{c").unwrap();
        let url = doi.registry_url();
        assert_eq!(url.domain(), Some("api.crossref.org"));
        assert_eq!(url.path(), "/works/10.1000/ab%7Bc");
    }

    #[test]
    fn resolver_url_prefixes_doi_org() {
        let doi = Doi::find("10.1000/182").unwrap();
        assert_eq!(doi.resolver_url(), "https://doi.org/10.1000/182");
    }
}
