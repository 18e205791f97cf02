//! Content extraction from raw model responses.
//!
//! Extraction runs an ordered list of matcher strategies, first match wins.
//! The order is load-bearing for compatibility with differently-behaved
//! model outputs and must not be rearranged:
//!
//! 1. the exact configured tag pair;
//! 2. the legacy `<output json="">` wrapper, with and without the empty
//!    attribute;
//! 3. any generic `<output json ...>` wrapper;
//! 4. a bare `<output>` wrapper.
//!
//! Without a configured tag (free-text mode) the trimmed raw response is
//! accepted as-is. Embedded HTML comments are stripped from the matched
//! content; a candidate that is empty after stripping and trimming does not
//! win, and extraction fails when no strategy yields non-empty content.

use once_cell::sync::Lazy;
use regex::Regex;

static LEGACY_EMPTY_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<output json="">(.*?)</output>"#).unwrap());

static LEGACY_BARE_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<output json>(.*?)</output>").unwrap());

static GENERIC_JSON_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<output json[^>]*>(.*?)</output>").unwrap());

static BARE_OUTPUT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<output>(.*?)</output>").unwrap());

static HTML_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

/// Extract the answer from a raw model response.
///
/// `output_tag` is the wrapper the phase was instructed to use; `None`
/// selects free-text mode. Returns `None` when nothing non-empty can be
/// extracted, a soft failure the engine reports as an unrecoverable phase
/// rather than a crash.
#[must_use]
pub fn extract_content(raw: &str, output_tag: Option<&str>) -> Option<String> {
    let Some(tag) = output_tag else {
        let trimmed = raw.trim();
        return (!trimmed.is_empty()).then(|| trimmed.to_string());
    };

    // The tag comes from the template, escaped so it always compiles.
    let tag_pattern =
        Regex::new(&format!(r"(?s)<{0}>(.*?)</{0}>", regex::escape(tag))).unwrap();

    let strategies: [&Regex; 5] = [
        &tag_pattern,
        &LEGACY_EMPTY_ATTR,
        &LEGACY_BARE_ATTR,
        &GENERIC_JSON_ATTR,
        &BARE_OUTPUT,
    ];

    for strategy in strategies {
        if let Some(captures) = strategy.captures(raw) {
            let candidate = clean(captures.get(1).map_or("", |m| m.as_str()));
            if !candidate.is_empty() {
                return Some(candidate);
            }
        }
    }

    None
}

/// Strip embedded HTML comments and surrounding whitespace.
fn clean(content: &str) -> String {
    HTML_COMMENT.replace_all(content, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn extracts_from_configured_tag() {
        let raw = "<reformulated>What defines creative cognition?</reformulated>";
        assert_eq!(
            extract_content(raw, Some("reformulated")).as_deref(),
            Some("What defines creative cognition?")
        );
    }

    #[test]
    fn extracts_from_legacy_empty_attr_wrapper() {
        let raw = r#"<output json="">{"key": "value"}</output>"#;
        assert_eq!(
            extract_content(raw, Some("reformulated")).as_deref(),
            Some(r#"{"key": "value"}"#)
        );
    }

    #[test]
    fn extracts_from_legacy_bare_attr_wrapper() {
        let raw = r#"<output json>{"key": "value"}</output>"#;
        assert_eq!(
            extract_content(raw, Some("reformulated")).as_deref(),
            Some(r#"{"key": "value"}"#)
        );
    }

    #[test]
    fn extracts_from_generic_json_attr_wrapper() {
        let raw = r#"<output json="schema-v2">{"key": 1}</output>"#;
        assert_eq!(
            extract_content(raw, Some("reformulated")).as_deref(),
            Some(r#"{"key": 1}"#)
        );
    }

    #[test]
    fn extracts_from_bare_output_wrapper() {
        let raw = "<output>plain answer</output>";
        assert_eq!(
            extract_content(raw, Some("reformulated")).as_deref(),
            Some("plain answer")
        );
    }

    #[test]
    fn configured_tag_wins_over_fallbacks() {
        let raw = "<output>fallback</output>\n<critique>primary</critique>";
        assert_eq!(
            extract_content(raw, Some("critique")).as_deref(),
            Some("primary")
        );
    }

    #[test]
    fn fallback_returns_same_content_as_primary_would() {
        let primary = extract_content("<critique>same answer</critique>", Some("critique"));
        let legacy =
            extract_content(r#"<output json="">same answer</output>"#, Some("critique"));
        assert_eq!(primary, legacy);
    }

    #[test]
    fn strips_embedded_html_comments() {
        let raw = "<reformulated><!-- model note -->the answer<!-- end --></reformulated>";
        assert_eq!(
            extract_content(raw, Some("reformulated")).as_deref(),
            Some("the answer")
        );
    }

    #[test]
    fn comment_only_content_fails_extraction() {
        let raw = "<reformulated><!-- nothing here --></reformulated>";
        assert_eq!(extract_content(raw, Some("reformulated")), None);
    }

    #[test]
    fn empty_response_fails_extraction() {
        assert_eq!(extract_content("", Some("reformulated")), None);
        assert_eq!(extract_content("", None), None);
        assert_eq!(extract_content("   \n  ", None), None);
    }

    #[test]
    fn unmatched_response_fails_extraction() {
        assert_eq!(
            extract_content("no wrappers at all", Some("reformulated")),
            None
        );
    }

    #[test]
    fn free_text_mode_accepts_trimmed_raw() {
        assert_eq!(
            extract_content("  free text answer \n", None).as_deref(),
            Some("free text answer")
        );
    }

    #[test]
    fn extraction_is_idempotent_when_rewrapped() {
        let raw = "<critique>It lacks falsifiability.</critique>";
        let first = extract_content(raw, Some("critique")).unwrap();
        let rewrapped = format!("<critique>{first}</critique>");
        let second = extract_content(&rewrapped, Some("critique")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn tag_with_regex_metacharacters_is_escaped() {
        let raw = "<phase_1.5>content</phase_1.5>";
        assert_eq!(
            extract_content(raw, Some("phase_1.5")).as_deref(),
            Some("content")
        );
    }

    proptest! {
        #[test]
        fn rewrapping_extracted_content_is_a_fixed_point(
            content in "[a-zA-Z0-9 .,!?]{1,80}"
        ) {
            prop_assume!(!content.trim().is_empty());

            let wrapped = format!("<answer>{content}</answer>");
            let Some(first) = extract_content(&wrapped, Some("answer")) else {
                // Whitespace-only inputs are filtered by prop_assume above.
                unreachable!()
            };
            let rewrapped = format!("<answer>{first}</answer>");
            let second = extract_content(&rewrapped, Some("answer")).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
