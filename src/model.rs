//! Data shapes exchanged with the document-QA API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::client::ClientError;

/// An uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub namespace: String,
    pub doc_id: String,
    pub filename: String,
    pub content_type: String,
    pub bytesize: u64,
    pub upload_by: String,
    #[serde(with = "timestamp")]
    pub upload_at: DateTime<Utc>,
    #[serde(default)]
    pub summary: String,
    pub process_status: String,
    pub visibility: String,
}

/// A document returned by a similarity query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentWithSimilarity {
    #[serde(flatten)]
    pub document: Document,
    pub similarity: f64,
}

/// Answer produced by the simple extraction system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    pub question: String,
    pub result: String,
    #[serde(default)]
    pub references: Vec<Reference>,
    pub duration_ms: f64,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// A document passage an answer was drawn from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reference {
    pub namespace: String,
    pub doc_id: String,
    pub filename: String,
    pub metadata: ReferenceMetadata,
    pub similarity: f64,
    pub upload_by: String,
    #[serde(with = "timestamp")]
    pub upload_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReferenceMetadata {
    pub content: String,
    pub page_number: u32,
}

/// Kind of recorded usage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UsageType {
    Extract,
}

/// One recorded use of the API, newest first in listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Usage {
    pub usage_id: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub userdetail: UserDetail,
    pub result: String,
    pub usage_type: UsageType,
    pub usage_data: Value,
}

impl Usage {
    /// Decode `usage_data` as the answer it recorded.
    pub fn answer(&self) -> Result<Answer, ClientError> {
        Ok(serde_json::from_value(self.usage_data.clone())?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserDetail {
    pub name: String,
    #[serde(default)]
    pub picture: String,
}

/// Identity-provider profile of the signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LineProfile {
    pub display_name: String,
    #[serde(default)]
    pub picture_url: String,
    pub user_id: String,
}

/// Partial completion output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmStreamContent {
    pub content: String,
    pub stop: bool,
}

/// Closing completion record with the full text and usage figures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmFinalContent {
    pub final_content: String,
    #[serde(default)]
    pub usage: LlmUsage,
    pub stop: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LlmUsage {
    #[serde(default)]
    pub timings: LlmTimings,
    #[serde(default, deserialize_with = "lenient_number")]
    pub tokens_evaluated: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub tokens_predicted: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LlmTimings {
    #[serde(default, deserialize_with = "lenient_number")]
    pub predicted_ms: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub predicted_n: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub predicted_per_second: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub predicted_per_token_ms: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub prompt_ms: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub prompt_n: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub prompt_per_second: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub prompt_per_token_ms: f64,
}

/// One decoded frame of a completion stream.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionChunk {
    /// More text; append it
    Partial(LlmStreamContent),

    /// Generation finished
    Final(LlmFinalContent),
}

impl CompletionChunk {
    /// Decode a raw frame payload, choosing the variant by its `stop` flag.
    pub fn from_frame(data: &str) -> Result<Self, ClientError> {
        let value: Value = serde_json::from_str(data)?;
        let stop = value.get("stop").and_then(Value::as_bool).unwrap_or(false);
        if stop {
            Ok(CompletionChunk::Final(serde_json::from_value(value)?))
        } else {
            Ok(CompletionChunk::Partial(serde_json::from_value(value)?))
        }
    }
}

/// Accept numbers, numeric strings and null; anything unusable becomes 0.
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        Value::Bool(b) => f64::from(u8::from(b)),
        _ => 0.0,
    })
}

/// Timestamps from the API: RFC 3339, or naive ISO-8601 taken as UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    #[test]
    fn test_partial_chunk() {
        let chunk = CompletionChunk::from_frame(r#"{"content": "fn ", "stop": false}"#).unwrap();
        assert_eq!(
            chunk,
            CompletionChunk::Partial(LlmStreamContent {
                content: "fn ".to_string(),
                stop: false,
            })
        );
    }

    #[test]
    fn test_final_chunk_with_lenient_usage() {
        let frame = json!({
            "final_content": "fn main() {}",
            "stop": true,
            "usage": {
                "timings": {"predicted_ms": "12.5", "predicted_n": 4, "prompt_ms": null},
                "tokens_evaluated": 7
            }
        })
        .to_string();

        let CompletionChunk::Final(fin) = CompletionChunk::from_frame(&frame).unwrap() else {
            panic!("expected final chunk");
        };
        assert_eq!(fin.final_content, "fn main() {}");
        assert_eq!(fin.usage.timings.predicted_ms, 12.5);
        assert_eq!(fin.usage.timings.predicted_n, 4.0);
        assert_eq!(fin.usage.timings.prompt_ms, 0.0);
        assert_eq!(fin.usage.tokens_evaluated, 7.0);
        assert_eq!(fin.usage.tokens_predicted, 0.0);
    }

    #[test]
    fn test_chunk_rejects_malformed_frame() {
        assert!(matches!(
            CompletionChunk::from_frame("not json"),
            Err(ClientError::Parse(_))
        ));
        assert!(CompletionChunk::from_frame(r#"{"stop": false}"#).is_err());
    }

    #[test]
    fn test_timestamp_formats() {
        let aware = timestamp::parse("2024-03-01T10:20:30+09:00").unwrap();
        assert_eq!(aware.hour(), 1);

        let naive = timestamp::parse("2024-03-01T10:20:30.123456").unwrap();
        assert_eq!((naive.day(), naive.hour()), (1, 10));

        assert!(timestamp::parse("yesterday").is_none());
    }

    #[test]
    fn test_document_with_similarity() {
        let doc: DocumentWithSimilarity = serde_json::from_value(json!({
            "namespace": "public",
            "doc_id": "d1",
            "filename": "manual.pdf",
            "content_type": "application/pdf",
            "bytesize": 1024,
            "upload_by": "U123",
            "upload_at": "2024-03-01T10:20:30",
            "summary": "A manual",
            "process_status": "done",
            "visibility": "public",
            "similarity": 0.87
        }))
        .unwrap();
        assert_eq!(doc.document.doc_id, "d1");
        assert_eq!(doc.similarity, 0.87);
    }

    #[test]
    fn test_usage_answer() {
        let usage: Usage = serde_json::from_value(json!({
            "usage_id": "u1",
            "timestamp": "2024-03-01T10:20:30Z",
            "user_id": "U123",
            "userdetail": {"name": "Taro", "picture": ""},
            "result": "42",
            "usage_type": "extract",
            "usage_data": {
                "question": "what?",
                "result": "42",
                "references": [],
                "duration_ms": 120,
                "timestamp": "2024-03-01T10:20:30Z"
            }
        }))
        .unwrap();
        assert_eq!(usage.usage_type, UsageType::Extract);
        assert_eq!(usage.answer().unwrap().result, "42");
    }

    #[test]
    fn test_line_profile_field_names() {
        let profile: LineProfile = serde_json::from_value(json!({
            "displayName": "Taro",
            "pictureUrl": "https://example.com/p.png",
            "userId": "U123"
        }))
        .unwrap();
        assert_eq!(profile.display_name, "Taro");
    }
}
