//! # ModernRAG Demo
//!
//! A showcase endpoint for Retrieval-Augmented Generation. Three sample
//! queries return canned answer bundles; any other query is forwarded once to
//! a chat-completion API and wrapped in the same result envelope. There is no
//! retrieval, index, or cache behind it: the sample answers only describe one.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  POST /api/rag-query  ┌──────────────┐
//! │    Client    │──────────────────────▶│   Handler    │
//! │  controller  │                       │  (axum)      │
//! └──────┬───────┘                       └──────┬───────┘
//!        │ on failure                           │ miss
//!        ▼                                      ▼
//! ┌──────────────┐                       ┌──────────────┐
//! │ sample table │                       │  completion  │
//! │ / placeholder│                       │   provider   │
//! └──────────────┘                       └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! rag-demo serve
//! rag-demo samples
//! rag-demo ask "What is Retrieval-Augmented Generation?"
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Wire types (result envelope, documents, metrics) |
//! | [`samples`] | The literal-match table |
//! | [`timing`] | Placeholder and measured timing metrics |
//! | [`completion`] | Chat-completion provider abstraction |
//! | [`generation`] | Answer synthesis for non-sample queries |
//! | [`server`] | HTTP query handler |
//! | [`client`] | Client controller with offline fallback |
//! | [`logging`] | Tracing subscriber setup |

pub mod client;
pub mod completion;
pub mod config;
pub mod generation;
pub mod logging;
pub mod models;
pub mod samples;
pub mod server;
pub mod timing;
