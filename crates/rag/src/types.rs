//! Data model for the answering pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A knowledge article, loaded once at startup and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Stable corpus identifier
    pub id: String,

    /// Article title
    pub title: String,

    /// Article body text
    pub content: String,
}

/// Derived search feature for one article.
///
/// Exactly one representation is active per deployment; token sets and
/// vectors are never mixed against the same index because their score
/// scales (integer overlap counts vs. cosine similarity) are not
/// comparable.
#[derive(Debug, Clone)]
pub enum SearchFeature {
    /// Lowercase token set extracted from `title + content`
    Tokens(HashSet<String>),

    /// Unit-normalized embedding of `title + content`
    Vector(Vec<f32>),
}

/// An article augmented with its precomputed search feature.
#[derive(Debug, Clone)]
pub struct IndexedDocument {
    /// The source article
    pub article: Article,

    /// Feature derived once at ingestion
    pub feature: SearchFeature,
}

/// Per-request query representation, comparable against the store's
/// search features. Created per request, never persisted.
#[derive(Debug, Clone)]
pub enum QueryRepresentation {
    /// Extracted or AI-expanded keywords
    Keywords(Vec<String>),

    /// Query embedding of the same dimensionality as document vectors
    Vector(Vec<f32>),
}

/// A user-facing reference to a retrieved article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Article title
    pub title: String,

    /// Article identifier
    pub id: String,
}

impl From<&IndexedDocument> for SourceRef {
    fn from(doc: &IndexedDocument) -> Self {
        Self {
            title: doc.article.title.clone(),
            id: doc.article.id.clone(),
        }
    }
}

/// The sole artifact crossing the core boundary on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Natural-language answer (or a degraded/caution message)
    pub answer: String,

    /// Articles the answer was grounded in
    pub sources: Vec<SourceRef>,

    /// Whether the safety gate intercepted the query
    #[serde(rename = "isUnsafe", default)]
    pub is_unsafe: bool,
}

impl AnswerResult {
    /// A grounded answer with its sources.
    pub fn answered(answer: String, sources: Vec<SourceRef>) -> Self {
        Self {
            answer,
            sources,
            is_unsafe: false,
        }
    }

    /// A degraded or informational message with no sources.
    pub fn message(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            sources: Vec::new(),
            is_unsafe: false,
        }
    }

    /// A safety-gate interception.
    pub fn intercepted(message: impl Into<String>) -> Self {
        Self {
            answer: message.into(),
            sources: Vec::new(),
            is_unsafe: true,
        }
    }
}
