//! # Tanya FAQ
//!
//! The retrieval-and-answer pipeline behind the assistant. No vector DB,
//! no embeddings: a keyword index over a parsed FAQ document, an
//! idf-weighted ranker, and a tiered answer policy that always returns
//! something.
//!
//! ## How a query flows
//! ```text
//! "Berapa bayaran IC rosak?"
//!   ↓ tier 1: curated table (exact high-stakes answers)
//!   ↓ tier 2: regex routes (known paraphrases)
//!   ↓ tier 3: rank → top-K evidence → synthesize with citations
//!   ↓ tier 4: fixed not-found answer with contact directory
//! ```
//!
//! The document is parsed and indexed once at startup; the index is
//! read-only shared state, swapped atomically on reload.

pub mod evidence;
pub mod hardcoded;
pub mod index;
pub mod parser;
pub mod patterns;
pub mod pipeline;
pub mod query;
pub mod ranker;
pub mod synthesis;

pub use index::FaqIndex;
pub use pipeline::FaqPipeline;
pub use query::Query;
pub use synthesis::SynthesisAdapter;
