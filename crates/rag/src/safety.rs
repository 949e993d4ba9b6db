//! Safety gate: intercepts risky queries before any AI call.
//!
//! The check is a blunt, deterministic substring filter over a curated
//! phrase list. It is intentionally not semantic: paraphrased risk
//! topics slip through (false negatives) and harmless uses of words
//! like "pain" trip it (false positives). That tradeoff is accepted —
//! the gate must be cheap, offline, and predictable, and the caution
//! message errs on the side of professional consultation.

use serde::{Deserialize, Serialize};

/// Topics that require personalized professional guidance.
const UNSAFE_PHRASES: &[&str] = &[
    "pregnant",
    "pregnancy",
    "trimester",
    "hernia",
    "glaucoma",
    "blood pressure",
    "hypertension",
    "surgery",
    "operation",
    "fracture",
    "disk slip",
    "slipped disk",
    "slipped disc",
    "medical",
    "doctor",
    "pain",
    "injury",
];

/// Fixed caution message returned on interception.
pub const CAUTION_MESSAGE: &str = "Your question touches on an area that can be risky \
     without personalized guidance. Please consult a doctor or certified yoga therapist \
     before attempting these poses.";

/// Verdict produced for every incoming query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyVerdict {
    /// Whether the query must not reach the pipeline
    #[serde(rename = "isUnsafe")]
    pub is_unsafe: bool,

    /// Which phrases matched, for logging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// User-facing caution message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SafetyVerdict {
    /// The query is safe to answer.
    pub fn safe() -> Self {
        Self {
            is_unsafe: false,
            reason: None,
            message: None,
        }
    }
}

/// Check a raw query against the unsafe-topic phrase list.
///
/// Case-insensitive substring containment; no AI call occurs on this
/// path. An empty query is safe by default.
pub fn check_safety(query: &str) -> SafetyVerdict {
    let lower = query.to_lowercase();

    let matched: Vec<&str> = UNSAFE_PHRASES
        .iter()
        .copied()
        .filter(|phrase| lower.contains(phrase))
        .collect();

    if matched.is_empty() {
        return SafetyVerdict::safe();
    }

    tracing::info!("Safety gate intercepted query, matched: {:?}", matched);

    SafetyVerdict {
        is_unsafe: true,
        reason: Some(format!(
            "Query contains sensitive keywords: {}",
            matched.join(", ")
        )),
        message: Some(CAUTION_MESSAGE.to_string()),
    }
}
