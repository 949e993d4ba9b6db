//! The answer pipeline: safety gate, query understanding, retrieval,
//! and grounded generation, sequenced behind a single error boundary.
//!
//! A response is always produced. Whatever fails inside steps 1-4 is
//! converted here into a user-facing degraded answer; no internal
//! error ever reaches the caller. The pipeline is constructed
//! explicitly by the composition root and holds no global state.

use crate::query::QueryStrategy;
use crate::retriever;
use crate::safety::{check_safety, CAUTION_MESSAGE};
use crate::store::DocumentStore;
use crate::types::{AnswerResult, IndexedDocument, SourceRef};
use sattva_core::AppResult;
use sattva_llm::FallbackChain;

/// Returned while the document store is still indexing.
pub const INITIALIZING_MESSAGE: &str =
    "The system is still initializing. Please try again in a moment.";

/// Returned when nothing useful could be produced at all.
pub const APOLOGY_MESSAGE: &str = "I'm sorry, I'm having trouble answering right now. \
     Please try again in a few seconds.";

/// Prefix labeling the emergency direct-quote fallback as unprocessed
/// source material.
const EMERGENCY_PREAMBLE: &str = "I could not reach a language model right now, so here is \
     the most relevant passage from our library, quoted without processing:";

/// The orchestrator for one deployment.
///
/// Shared read-only across concurrent requests: no step mutates the
/// store, so no synchronization is needed.
pub struct RagPipeline {
    store: DocumentStore,
    strategy: QueryStrategy,
    generator: FallbackChain,
    top_k: usize,
}

impl RagPipeline {
    /// Assemble a pipeline from its parts.
    pub fn new(
        store: DocumentStore,
        strategy: QueryStrategy,
        generator: FallbackChain,
        top_k: usize,
    ) -> Self {
        Self {
            store,
            strategy,
            generator,
            top_k,
        }
    }

    /// Whether the pipeline can serve grounded answers.
    pub fn is_ready(&self) -> bool {
        self.store.is_ready()
    }

    /// The underlying document store.
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Answer a query. Never fails; never blocks on readiness.
    ///
    /// The safety gate runs first: an intercepted query returns the
    /// fixed caution message before any retrieval or generation call
    /// is made.
    pub async fn ask(&self, query: &str) -> AnswerResult {
        let verdict = check_safety(query);
        if verdict.is_unsafe {
            return AnswerResult::intercepted(
                verdict.message.unwrap_or_else(|| CAUTION_MESSAGE.to_string()),
            );
        }

        self.answer(query).await
    }

    /// Run the ready-path steps, degrading on any failure.
    async fn answer(&self, query: &str) -> AnswerResult {
        if !self.store.is_ready() {
            tracing::info!("Query received before readiness, returning initializing message");
            return AnswerResult::message(INITIALIZING_MESSAGE);
        }

        let documents = match self.retrieve_documents(query).await {
            Ok(documents) => documents,
            Err(e) => {
                tracing::error!("Retrieval failed: {}", e);
                return AnswerResult::message(APOLOGY_MESSAGE);
            }
        };

        let sources: Vec<SourceRef> = documents.iter().map(SourceRef::from).collect();
        let prompt = build_prompt(query, &documents);

        match self.generator.generate(&prompt).await {
            Ok(answer) => AnswerResult::answered(answer, sources),
            Err(e) => {
                tracing::error!("Generation failed: {}", e);
                match documents.first() {
                    // Retrieval found something relevant: quote it
                    // rather than apologize
                    Some(top) => emergency_answer(top, sources),
                    None => AnswerResult::message(APOLOGY_MESSAGE),
                }
            }
        }
    }

    /// Derive the query representation and retrieve top-k documents.
    async fn retrieve_documents(&self, query: &str) -> AppResult<Vec<IndexedDocument>> {
        tracing::debug!(
            "Understanding query via '{}' strategy",
            self.strategy.name()
        );
        let representation = self.strategy.represent(query).await?;
        retriever::retrieve(&self.store, &representation, self.top_k)
    }
}

/// Build the context block: `[index] title: content` per document.
fn build_context(documents: &[IndexedDocument]) -> String {
    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| format!("[{}] {}: {}", i + 1, doc.article.title, doc.article.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the grounded generation prompt.
fn build_prompt(query: &str, documents: &[IndexedDocument]) -> String {
    format!(
        "You are a calm, knowledgeable yoga and wellness guide. \
         Answer the question using only the context below. \
         If the context does not contain the answer, say you do not know.\n\n\
         Context:\n{}\n\nQuestion: {}\n\nAnswer:",
        build_context(documents),
        query
    )
}

/// Emergency direct-quote fallback: the top-ranked document's raw
/// content, explicitly labeled, with sources still populated.
fn emergency_answer(top: &IndexedDocument, sources: Vec<SourceRef>) -> AnswerResult {
    AnswerResult::answered(
        format!(
            "{}\n\n{}\n{}",
            EMERGENCY_PREAMBLE, top.article.title, top.article.content
        ),
        sources,
    )
}
