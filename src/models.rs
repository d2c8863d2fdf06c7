//! Wire types shared by the query handler and the client controller.
//!
//! The [`ResultEnvelope`] is the only shape that crosses the network: the
//! request carries just a query string, the response carries documents, the
//! answer text, and timing metrics.

use serde::{Deserialize, Deserializer, Serialize};

/// A display-only document snippet. Scores are static or placeholder values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub source: String,
    pub score: f64,
}

/// Timing metrics in decimal seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    #[serde(deserialize_with = "seconds")]
    pub retrieval_time: f64,
    #[serde(deserialize_with = "seconds")]
    pub generation_time: f64,
    #[serde(deserialize_with = "seconds")]
    pub total_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub documents: Vec<Document>,
    /// Answer text; may contain literal `\n` line breaks.
    pub response: String,
    pub metrics: Metrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Accepts either a JSON number or a numeric string such as `"0.32"`.
fn seconds<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid seconds value: {:?}", s))),
    }
}
