use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("model output is not valid json of the expected shape: {source}")]
pub struct InvalidModelOutput {
    pub raw: String,
    #[source]
    pub source: serde_json::Error,
}

/// Strips code fences, newlines and redundant whitespace from a model reply.
pub fn clean(raw: &str) -> String {
    raw.replace("```json", "")
        .replace("```", "")
        .replace('\n', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn normalize(raw: &str) -> Result<Value, InvalidModelOutput> {
    serde_json::from_str(&clean(raw)).map_err(|source| InvalidModelOutput {
        raw: raw.to_string(),
        source,
    })
}

/// Normalizes a reply and deserializes it, rejecting replies missing required fields.
pub fn parse<T: DeserializeOwned>(raw: &str) -> Result<T, InvalidModelOutput> {
    serde_json::from_value(normalize(raw)?).map_err(|source| InvalidModelOutput {
        raw: raw.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::Feedback;
    use serde_json::json;

    #[test]
    fn fenced_reply_matches_clean_reply() {
        let clean_reply = r#"{"grade": "3/5", "mistakes": []}"#;
        let fenced = "```json\n{\n  \"grade\":   \"3/5\",\n\n  \"mistakes\": []\n}\n```";

        assert_eq!(normalize(clean_reply).unwrap(), normalize(fenced).unwrap());
        assert_eq!(
            normalize(fenced).unwrap(),
            json!({"grade": "3/5", "mistakes": []})
        );
    }

    #[test]
    fn bare_fences_are_removed() {
        let value = normalize("```\n[1, 2]\n```").unwrap();
        assert_eq!(value, json!([1, 2]));
    }

    #[test]
    fn newlines_are_dropped_not_spaced() {
        assert_eq!(clean("\"a\nb\""), "\"ab\"");
        assert_eq!(clean("  {\t\"a\":\r\n  1 }  "), "{ \"a\": 1 }");
    }

    #[test]
    fn prose_is_rejected() {
        let err = normalize("not json at all").unwrap_err();
        assert_eq!(err.raw, "not json at all");
    }

    #[test]
    fn empty_reply_is_rejected() {
        assert!(normalize("```json\n\n```").is_err());
    }

    #[test]
    fn trailing_prose_is_rejected() {
        assert!(normalize("{\"a\": 1} Hope this helps!").is_err());
    }

    #[test]
    fn missing_fields_are_rejected() {
        let err = parse::<Feedback>(r#"{"positive": "clear thesis"}"#).unwrap_err();
        assert!(err.to_string().contains("improvement_suggestions"));
    }

    #[test]
    fn typed_parse_keeps_content() {
        let feedback: Feedback = parse(
            "```json\n{\"positive\": \"clear thesis\", \"improvement_suggestions\": \"cite sources\"}\n```",
        )
        .unwrap();
        assert_eq!(feedback.positive, "clear thesis");
        assert_eq!(feedback.improvement_suggestions, "cite sources");
    }
}
