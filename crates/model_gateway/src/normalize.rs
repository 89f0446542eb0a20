//! Turn the model's free-form reply into a result list.
//!
//! The reply is expected to be a JSON array, possibly wrapped in a fenced
//! ```json block or surrounded by prose. Anything else is a parse failure,
//! which never fails the request: the configured [`ParseFailurePolicy`]
//! decides what the caller sees.

use serde_json::Value;

use wordlens_core::{config::ParseFailurePolicy, types::AnalysisResult, Error, Result};

/// Placeholder `word` of the fallback item.
pub const FALLBACK_WORD: &str = "Analysis Result";

/// Placeholder `definition` of the fallback item.
pub const FALLBACK_DEFINITION: &str = "Raw analysis from image";

/// Outcome of normalizing one model reply.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAnalysis {
    /// Results to return to the caller.
    pub results: Vec<AnalysisResult>,
    /// True when the reply could not be parsed and the policy was applied.
    pub degraded: bool,
}

/// Locate the JSON array inside a reply.
///
/// Prefers a ```json fenced block, then the outermost `[` ... `]` span.
pub fn extract_json(response: &str) -> Option<&str> {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + "```json".len();
        if let Some(end_offset) = response[start..].find("```") {
            return Some(response[start..start + end_offset].trim());
        }
    }

    let start = response.find('[')?;
    let end = response.rfind(']')?;
    (end > start).then(|| &response[start..=end])
}

/// Parse a reply into results, preserving order.
///
/// Once the array parses, every element is kept as the model wrote it.
pub fn parse_analysis(response: &str) -> Result<Vec<AnalysisResult>> {
    let json = extract_json(response)
        .ok_or_else(|| Error::ResponseParseFailure("no JSON array found".into()))?;

    let value: Value = serde_json::from_str(json)
        .map_err(|e| Error::ResponseParseFailure(e.to_string()))?;

    let Value::Array(items) = value else {
        return Err(Error::ResponseParseFailure("top-level value is not an array".into()));
    };

    Ok(items.into_iter().map(AnalysisResult::from_model_value).collect())
}

/// Parse a reply, degrading according to `policy` instead of failing.
pub fn normalize(response: &str, policy: ParseFailurePolicy) -> NormalizedAnalysis {
    match parse_analysis(response) {
        Ok(results) => NormalizedAnalysis {
            results,
            degraded: false,
        },
        Err(e) => {
            tracing::warn!(
                error = %e,
                policy = ?policy,
                raw_len = response.len(),
                raw = %response.chars().take(500).collect::<String>(),
                "Failed to parse model response"
            );

            let results = match policy {
                ParseFailurePolicy::Fallback => vec![AnalysisResult::new(
                    FALLBACK_WORD,
                    FALLBACK_DEFINITION,
                    response,
                )],
                ParseFailurePolicy::Empty => Vec::new(),
            };

            NormalizedAnalysis {
                results,
                degraded: true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAT: &str = r#"[{"word":"cat","definition":"a small domesticated carnivorous mammal","sampleSentence":"The cat slept on the windowsill."}]"#;

    #[test]
    fn test_extract_json_with_block() {
        let response = "Here is the analysis:\n```json\n[{\"word\": \"cup\"}]\n```\nDone.";
        assert_eq!(extract_json(response), Some("[{\"word\": \"cup\"}]"));
    }

    #[test]
    fn test_extract_json_with_surrounding_text() {
        let response = r#"Sure! [{"word": "cup"}] Hope that helps."#;
        assert_eq!(extract_json(response), Some(r#"[{"word": "cup"}]"#));
    }

    #[test]
    fn test_extract_json_none() {
        assert_eq!(extract_json("I see a dog and a ball."), None);
        assert_eq!(extract_json("] backwards ["), None);
    }

    #[test]
    fn test_parse_cat_scenario() {
        let results = parse_analysis(CAT).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].word(), "cat");
        assert_eq!(results[0].definition(), "a small domesticated carnivorous mammal");
        assert_eq!(results[0].sample_sentence(), "The cat slept on the windowsill.");
    }

    #[test]
    fn test_parse_preserves_order() {
        let raw = r#"[{"word":"b"},{"word":"a"},{"word":"c"}]"#;
        let words: Vec<String> = parse_analysis(raw).unwrap().into_iter().map(|r| r.word()).collect();
        assert_eq!(words, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_parse_empty_array_is_success() {
        let normalized = normalize("[]", ParseFailurePolicy::Fallback);
        assert!(normalized.results.is_empty());
        assert!(!normalized.degraded);
    }

    #[test]
    fn test_mixed_array_keeps_every_element() {
        let raw = r#"[{"word":"cat","definition":"a pet","sampleSentence":"The cat sat."}, null, "dog"]"#;
        let normalized = normalize(raw, ParseFailurePolicy::Fallback);

        assert!(!normalized.degraded);
        assert_eq!(normalized.results.len(), 3);
        assert_eq!(normalized.results[0].word(), "cat");
        assert_eq!(normalized.results[1].raw(), &serde_json::Value::Null);
        assert_eq!(normalized.results[2].raw(), &serde_json::json!("dog"));
    }

    #[test]
    fn test_top_level_object_is_a_parse_failure() {
        assert!(matches!(
            parse_analysis(r#"```json
{"word": "cat"}
```"#),
            Err(Error::ResponseParseFailure(_))
        ));
    }

    #[test]
    fn test_plain_text_falls_back_to_raw_item() {
        let raw = "I see a dog and a ball.";
        let normalized = normalize(raw, ParseFailurePolicy::Fallback);

        assert!(normalized.degraded);
        assert_eq!(normalized.results.len(), 1);
        assert_eq!(normalized.results[0].word(), FALLBACK_WORD);
        assert_eq!(normalized.results[0].definition(), FALLBACK_DEFINITION);
        assert_eq!(normalized.results[0].sample_sentence(), raw);
    }

    #[test]
    fn test_plain_text_with_empty_policy() {
        let normalized = normalize("I see a dog and a ball.", ParseFailurePolicy::Empty);
        assert!(normalized.degraded);
        assert!(normalized.results.is_empty());
    }

    #[test]
    fn test_truncated_array_degrades() {
        let normalized = normalize(r#"[{"word":"cat","#, ParseFailurePolicy::Fallback);
        assert!(normalized.degraded);
        assert_eq!(normalized.results.len(), 1);
    }
}
