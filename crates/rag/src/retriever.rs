//! Retriever: scores the corpus against a query representation and
//! returns the top-k documents.

use crate::store::DocumentStore;
use crate::types::{IndexedDocument, QueryRepresentation, SearchFeature};
use sattva_core::{AppError, AppResult};
use std::collections::HashSet;

/// A document with its transient relevance score.
struct ScoredDocument<'a> {
    document: &'a IndexedDocument,
    score: f32,
}

/// Retrieve the top-k documents for a query representation.
///
/// Results are ordered by descending score; ties keep original corpus
/// order (the sort is stable). Calling before the store is ready
/// returns an empty result — degraded, not an error. A representation
/// that does not match the store's feature kind is a configuration
/// error: overlap counts and cosine similarities are not comparable,
/// so mixed indexes are not supported.
pub fn retrieve(
    store: &DocumentStore,
    representation: &QueryRepresentation,
    k: usize,
) -> AppResult<Vec<IndexedDocument>> {
    if !store.is_ready() {
        tracing::warn!("Retrieval requested before the document store is ready");
        return Ok(Vec::new());
    }

    let mut scored: Vec<ScoredDocument> = store
        .documents()
        .iter()
        .map(|document| {
            score(representation, &document.feature).map(|score| ScoredDocument { document, score })
        })
        .collect::<AppResult<_>>()?;

    // Stable sort: equal scores preserve corpus order
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    let top: Vec<IndexedDocument> = scored
        .into_iter()
        .take(k)
        .map(|s| s.document.clone())
        .collect();

    tracing::debug!("Retrieved {} of {} documents", top.len(), store.len());

    Ok(top)
}

/// Score one document feature against the query representation.
///
/// Lexical: count of distinct query keywords present in the token set
/// (set membership — a keyword repeated in the query still counts
/// once). Vector: dot product of unit-normalized vectors, i.e. cosine
/// similarity.
fn score(representation: &QueryRepresentation, feature: &SearchFeature) -> AppResult<f32> {
    match (representation, feature) {
        (QueryRepresentation::Keywords(keywords), SearchFeature::Tokens(tokens)) => {
            let distinct: HashSet<&str> = keywords.iter().map(String::as_str).collect();
            let overlap = distinct
                .iter()
                .filter(|keyword| tokens.contains(**keyword))
                .count();
            Ok(overlap as f32)
        }
        (QueryRepresentation::Vector(query), SearchFeature::Vector(document)) => {
            if query.len() != document.len() {
                return Err(AppError::Config(format!(
                    "Embedding dimension mismatch: query {} vs document {}",
                    query.len(),
                    document.len()
                )));
            }
            Ok(query.iter().zip(document).map(|(a, b)| a * b).sum())
        }
        _ => Err(AppError::Config(
            "Query representation does not match the store's index kind; \
             re-index the corpus to switch retrieval strategies"
                .to_string(),
        )),
    }
}
