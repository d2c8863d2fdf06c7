//! Answer synthesis for queries outside the sample table.

use anyhow::Result;
use std::time::Instant;

use crate::completion::{ChatMessage, CompletionProvider, CompletionRequest};
use crate::config::CompletionConfig;
use crate::models::{Document, ResultEnvelope};
use crate::timing;

pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant that provides information about ModernRAG, a Retrieval-Augmented Generation system.";

/// Score attached to every synthesized document.
pub const PLACEHOLDER_SCORE: f64 = 0.75;

/// Source label on the handler's synthesized document.
pub const PLACEHOLDER_SOURCE: &str = "ModernRAG Documentation";

pub fn build_request(query: &str, config: &CompletionConfig) -> CompletionRequest {
    CompletionRequest {
        messages: vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(format!("Please provide information about: {}", query)),
        ],
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    }
}

/// The single stand-in document shown for a non-sample query.
pub fn placeholder_document(query: &str, source: &str) -> Document {
    Document {
        content: format!("This is a simulated document result for the query: {}", query),
        source: source.to_string(),
        score: PLACEHOLDER_SCORE,
    }
}

/// Calls the provider once and wraps its reply in a [`ResultEnvelope`].
///
/// `retrieval_secs` is the caller's placeholder retrieval time; generation
/// time is the measured duration of the provider call.
pub async fn generate_response(
    provider: &dyn CompletionProvider,
    config: &CompletionConfig,
    retrieval_secs: f64,
    query: &str,
) -> Result<ResultEnvelope> {
    let request = build_request(query, config);

    let started = Instant::now();
    let response = provider.complete(&request).await?;
    let elapsed = started.elapsed();

    tracing::debug!(
        model = provider.model_name(),
        elapsed_ms = elapsed.as_millis() as u64,
        "completion finished"
    );

    Ok(ResultEnvelope {
        documents: vec![placeholder_document(query, PLACEHOLDER_SOURCE)],
        response,
        metrics: timing::measured_metrics(retrieval_secs, elapsed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingProvider {
        reply: String,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl CompletionProvider for RecordingProvider {
        fn model_name(&self) -> &str {
            "test-model"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(self.reply.clone())
        }
    }

    #[test]
    fn test_build_request_uses_fixed_prompts() {
        let req = build_request("vector databases", &CompletionConfig::default());
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].role, "system");
        assert_eq!(req.messages[0].content, SYSTEM_PROMPT);
        assert_eq!(req.messages[1].role, "user");
        assert_eq!(
            req.messages[1].content,
            "Please provide information about: vector databases"
        );
        assert!((req.temperature - 0.7).abs() < 1e-6);
        assert_eq!(req.max_tokens, 500);
    }

    #[tokio::test]
    async fn test_generate_wraps_reply() {
        let provider = RecordingProvider {
            reply: "A reply.".to_string(),
            seen: Mutex::new(Vec::new()),
        };
        let env = generate_response(&provider, &CompletionConfig::default(), 0.43, "tokenizers")
            .await
            .unwrap();

        assert_eq!(env.response, "A reply.");
        assert_eq!(env.documents.len(), 1);
        assert_eq!(env.documents[0].score, 0.75);
        assert_eq!(env.documents[0].source, "ModernRAG Documentation");
        assert_eq!(
            env.documents[0].content,
            "This is a simulated document result for the query: tokenizers"
        );
        assert_eq!(env.metrics.retrieval_time, 0.43);
        let sum = env.metrics.retrieval_time + env.metrics.generation_time;
        assert!((env.metrics.total_time - sum).abs() < 0.005);
        assert_eq!(provider.seen.lock().unwrap().len(), 1);
    }
}
