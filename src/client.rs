//! Client page controller.
//!
//! Drives one query from input to rendered result. The page itself is
//! abstracted behind [`View`] (loading indicator, error panel, results panel)
//! and the network hop behind [`QueryTransport`], so the same controller
//! backs the `rag-demo ask` command and the tests.
//!
//! # Flow
//!
//! ```text
//! submit_query(q)
//!   ├─ show loading, hide error + results
//!   ├─ POST {query} ──ok──────────────────────────┐
//!   │        └─fail─► sample table ─hit──────────┤
//!   │                      └─miss─► placeholder ──┤
//!   ├─ render ◄───────────────────────────────────┘
//!   │    └─fail─► error panel
//!   └─ hide loading
//! ```
//!
//! A transport failure is never shown to the user; it only selects the
//! offline answer. There is no retry, timeout, or cancellation.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use rand::Rng;
use std::io::Write;

use crate::generation::placeholder_document;
use crate::models::{QueryRequest, ResultEnvelope};
use crate::samples;
use crate::timing;

/// Shown when a failure carries no description of its own.
pub const GENERIC_ERROR: &str = "An error occurred while processing your query.";

/// Source label on the offline placeholder document.
pub const SIMULATED_SOURCE: &str = "Simulated Source";

// ============ Transport ============

/// Sends a query to the handler and returns its envelope.
#[async_trait]
pub trait QueryTransport: Send + Sync {
    async fn post_query(&self, query: &str) -> Result<ResultEnvelope>;
}

/// JSON-over-HTTP transport to a running `rag-demo serve`.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl QueryTransport for HttpTransport {
    async fn post_query(&self, query: &str) -> Result<ResultEnvelope> {
        let body = QueryRequest {
            query: query.to_string(),
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            bail!("API responded with status: {}", status.as_u16());
        }

        response
            .json::<ResultEnvelope>()
            .await
            .context("API returned an unreadable result")
    }
}

// ============ Rendering ============

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    /// e.g. `Document 1 (Score: 0.92)`
    pub heading: String,
    pub source: String,
    pub content: String,
}

/// Display strings for every container on the results panel.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedResult {
    pub documents: Vec<RenderedDocument>,
    /// Response text split at its line breaks.
    pub response_lines: Vec<String>,
    pub retrieval_time: String,
    pub generation_time: String,
    pub total_time: String,
}

pub fn render(result: &ResultEnvelope) -> RenderedResult {
    let documents = result
        .documents
        .iter()
        .enumerate()
        .map(|(i, doc)| RenderedDocument {
            heading: format!("Document {} (Score: {:.2})", i + 1, doc.score),
            source: doc.source.clone(),
            content: doc.content.clone(),
        })
        .collect();

    RenderedResult {
        documents,
        response_lines: result.response.split('\n').map(str::to_string).collect(),
        retrieval_time: timing::format_seconds(result.metrics.retrieval_time),
        generation_time: timing::format_seconds(result.metrics.generation_time),
        total_time: timing::format_seconds(result.metrics.total_time),
    }
}

/// The offline answer: the sample entry when `query` matches one exactly,
/// otherwise a single simulated document with random timings.
pub fn fallback_result<R: Rng + ?Sized>(query: &str, rng: &mut R) -> ResultEnvelope {
    if let Some(sample) = samples::lookup(query) {
        return sample;
    }

    ResultEnvelope {
        documents: vec![placeholder_document(query, SIMULATED_SOURCE)],
        response: format!(
            "This is a simulated response for the query: {}\n\n\
             In a real implementation, this would be generated by calling your backend API \
             that implements the ModernRAG system. The API would retrieve relevant documents, \
             augment them, and generate a response based on the query.",
            query
        ),
        metrics: timing::simulated_metrics(rng),
    }
}

// ============ View ============

/// The page containers the controller paints into.
pub trait View {
    fn set_loading(&mut self, visible: bool);
    fn hide_error(&mut self);
    fn hide_results(&mut self);
    /// Paints and reveals the results panel.
    fn show_results(&mut self, result: &RenderedResult) -> Result<()>;
    fn show_error(&mut self, message: &str);
}

/// Plain-text view over any writer; results go to the writer, the last error
/// is kept for the caller.
pub struct TerminalView<W: Write> {
    out: W,
    loading: bool,
    results_visible: bool,
    error: Option<String>,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            loading: false,
            results_visible: false,
            error: None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn results_visible(&self) -> bool {
        self.results_visible
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> View for TerminalView<W> {
    fn set_loading(&mut self, visible: bool) {
        self.loading = visible;
    }

    fn hide_error(&mut self) {
        self.error = None;
    }

    fn hide_results(&mut self) {
        self.results_visible = false;
    }

    fn show_results(&mut self, result: &RenderedResult) -> Result<()> {
        let out = &mut self.out;
        writeln!(out, "Retrieved Documents")?;
        writeln!(out)?;
        for doc in &result.documents {
            writeln!(out, "{}", doc.heading)?;
            writeln!(out, "Source: {}", doc.source)?;
            writeln!(out, "{}", doc.content)?;
            writeln!(out)?;
        }

        writeln!(out, "Response")?;
        writeln!(out)?;
        for line in &result.response_lines {
            writeln!(out, "{}", line)?;
        }
        writeln!(out)?;

        writeln!(out, "Retrieval time: {}", result.retrieval_time)?;
        writeln!(out, "Generation time: {}", result.generation_time)?;
        writeln!(out, "Total time: {}", result.total_time)?;
        out.flush()?;

        self.results_visible = true;
        Ok(())
    }

    fn show_error(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }
}

// ============ Controller ============

pub struct PageController<T, V, R> {
    transport: T,
    view: V,
    rng: R,
}

impl<T, V, R> PageController<T, V, R>
where
    T: QueryTransport,
    V: View,
    R: Rng,
{
    pub fn new(transport: T, view: V, rng: R) -> Self {
        Self {
            transport,
            view,
            rng,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    /// Submit button. Returns whether a query was submitted.
    pub async fn on_submit(&mut self, input: &str) -> bool {
        let query = input.trim();
        if query.is_empty() {
            return false;
        }
        self.submit_query(query).await;
        true
    }

    /// Enter without Shift submits; every other key is ignored.
    pub async fn on_key_press(&mut self, key: &str, shift: bool, input: &str) -> bool {
        if key != "Enter" || shift {
            return false;
        }
        self.on_submit(input).await
    }

    /// Sample query button: submits the sample text as-is.
    pub async fn on_sample_click(&mut self, sample: &str) {
        self.submit_query(sample).await;
    }

    pub async fn submit_query(&mut self, query: &str) {
        self.view.set_loading(true);
        self.view.hide_error();
        self.view.hide_results();

        if let Err(e) = self.process(query).await {
            tracing::error!(error = %e, "error processing query");
            let message = e.to_string();
            let message = if message.is_empty() {
                GENERIC_ERROR
            } else {
                message.as_str()
            };
            self.view.show_error(message);
        }

        self.view.set_loading(false);
    }

    async fn process(&mut self, query: &str) -> Result<()> {
        let result = match self.transport.post_query(query).await {
            Ok(result) => result,
            Err(e) => {
                let cause = format!("{:#}", e);
                tracing::warn!(error = %cause, "API call failed, falling back to sample data");
                fallback_result(query, &mut self.rng)
            }
        };

        self.view.show_results(&render(&result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Document, Metrics};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct DownTransport {
        calls: AtomicUsize,
    }

    impl DownTransport {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl QueryTransport for DownTransport {
        async fn post_query(&self, _query: &str) -> Result<ResultEnvelope> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            bail!("API responded with status: 502")
        }
    }

    struct FixedTransport(ResultEnvelope);

    #[async_trait]
    impl QueryTransport for FixedTransport {
        async fn post_query(&self, _query: &str) -> Result<ResultEnvelope> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct RecordingView {
        events: Vec<String>,
        rendered: Option<RenderedResult>,
        error: Option<String>,
        render_error: Option<&'static str>,
    }

    impl View for RecordingView {
        fn set_loading(&mut self, visible: bool) {
            self.events.push(format!("loading:{}", visible));
        }
        fn hide_error(&mut self) {
            self.events.push("hide_error".into());
        }
        fn hide_results(&mut self) {
            self.events.push("hide_results".into());
        }
        fn show_results(&mut self, result: &RenderedResult) -> Result<()> {
            if let Some(message) = self.render_error {
                bail!("{}", message);
            }
            self.events.push("show_results".into());
            self.rendered = Some(result.clone());
            Ok(())
        }
        fn show_error(&mut self, message: &str) {
            self.events.push("show_error".into());
            self.error = Some(message.to_string());
        }
    }

    fn controller<T: QueryTransport>(transport: T) -> PageController<T, RecordingView, StdRng> {
        PageController::new(transport, RecordingView::default(), StdRng::seed_from_u64(3))
    }

    fn cents(s: &str) -> i64 {
        let n: f64 = s.trim_end_matches('s').parse().unwrap();
        (n * 100.0).round() as i64
    }

    #[tokio::test]
    async fn test_fallback_to_sample_table() {
        let mut c = controller(DownTransport::new());
        c.submit_query("What is Retrieval-Augmented Generation?").await;

        let view = c.view();
        let rendered = view.rendered.as_ref().unwrap();
        assert_eq!(rendered.documents.len(), 3);
        assert!(rendered
            .response_lines
            .join("\n")
            .contains("Retrieval-Augmented Generation (RAG) is an AI technique"));
        assert_eq!(rendered.documents[0].heading, "Document 1 (Score: 0.92)");
        assert_eq!(rendered.total_time, "1.77s");
        assert!(view.error.is_none());
    }

    #[tokio::test]
    async fn test_fallback_placeholder_for_unknown_query() {
        let mut c = controller(DownTransport::new());
        c.submit_query("What is HNSW?").await;

        let rendered = c.view().rendered.clone().unwrap();
        assert_eq!(rendered.documents.len(), 1);
        assert_eq!(rendered.documents[0].source, SIMULATED_SOURCE);
        assert_eq!(rendered.documents[0].heading, "Document 1 (Score: 0.75)");
        assert_eq!(
            rendered.response_lines[0],
            "This is a simulated response for the query: What is HNSW?"
        );
        assert_eq!(
            cents(&rendered.total_time),
            cents(&rendered.retrieval_time) + cents(&rendered.generation_time)
        );
    }

    #[tokio::test]
    async fn test_event_order() {
        let mut c = controller(DownTransport::new());
        c.submit_query("anything").await;
        assert_eq!(
            c.view().events,
            vec![
                "loading:true",
                "hide_error",
                "hide_results",
                "show_results",
                "loading:false"
            ]
        );
    }

    #[tokio::test]
    async fn test_server_result_is_rendered_verbatim() {
        let envelope = ResultEnvelope {
            documents: vec![Document {
                content: "c".into(),
                source: "s".into(),
                score: 0.5,
            }],
            response: "line one\nline two".into(),
            metrics: Metrics {
                retrieval_time: 0.3,
                generation_time: 1.2,
                total_time: 1.5,
            },
        };
        let mut c = controller(FixedTransport(envelope));
        c.submit_query("What is Retrieval-Augmented Generation?").await;

        let rendered = c.view().rendered.clone().unwrap();
        assert_eq!(rendered.documents.len(), 1);
        assert_eq!(rendered.response_lines, vec!["line one", "line two"]);
        assert_eq!(rendered.retrieval_time, "0.30s");
        assert_eq!(rendered.generation_time, "1.20s");
        assert_eq!(rendered.total_time, "1.50s");
    }

    #[tokio::test]
    async fn test_render_failure_shows_error() {
        let mut c = PageController::new(
            DownTransport::new(),
            RecordingView {
                render_error: Some("results container missing"),
                ..RecordingView::default()
            },
            StdRng::seed_from_u64(1),
        );
        c.submit_query("anything").await;

        let view = c.into_view();
        assert_eq!(view.error.as_deref(), Some("results container missing"));
        assert_eq!(view.events.last().map(String::as_str), Some("loading:false"));
    }

    #[tokio::test]
    async fn test_render_failure_without_message_shows_generic_error() {
        let mut c = PageController::new(
            DownTransport::new(),
            RecordingView {
                render_error: Some(""),
                ..RecordingView::default()
            },
            StdRng::seed_from_u64(1),
        );
        c.submit_query("What is Retrieval-Augmented Generation?").await;

        let view = c.into_view();
        assert_eq!(view.error.as_deref(), Some(GENERIC_ERROR));
        assert!(view.rendered.is_none());
        assert_eq!(view.events.last().map(String::as_str), Some("loading:false"));
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let mut c = controller(DownTransport::new());
        assert!(!c.on_submit("   ").await);
        assert!(c.view().events.is_empty());
        assert_eq!(c.transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_submit_trims_input() {
        let mut c = controller(DownTransport::new());
        assert!(c.on_submit("  What is Retrieval-Augmented Generation?  ").await);
        assert_eq!(c.view().rendered.as_ref().unwrap().documents.len(), 3);
    }

    #[tokio::test]
    async fn test_key_press_rules() {
        let mut c = controller(DownTransport::new());
        assert!(!c.on_key_press("Enter", true, "query").await);
        assert!(!c.on_key_press("a", false, "query").await);
        assert!(!c.on_key_press("Enter", false, "  ").await);
        assert_eq!(c.transport.calls.load(Ordering::SeqCst), 0);

        assert!(c.on_key_press("Enter", false, "query").await);
        assert_eq!(c.transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sample_click_submits() {
        let mut c = controller(DownTransport::new());
        c.on_sample_click("Explain the caching system in ModernRAG").await;
        let rendered = c.view().rendered.clone().unwrap();
        assert_eq!(rendered.documents[0].source, "caching.py");
        assert_eq!(rendered.total_time, "1.63s");
    }

    #[test]
    fn test_terminal_view_output() {
        let mut view = TerminalView::new(Vec::new());
        let sample = samples::lookup("How does the vector store work in ModernRAG?").unwrap();
        view.set_loading(true);
        view.show_results(&render(&sample)).unwrap();
        view.set_loading(false);

        assert!(view.results_visible());
        assert!(!view.is_loading());
        let text = String::from_utf8(view.into_inner()).unwrap();
        assert!(text.contains("Document 3 (Score: 0.84)"));
        assert!(text.contains("Source: vector_store.py"));
        assert!(text.contains("Total time: 1.90s"));
    }
}
