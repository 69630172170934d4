//! Title-conflict detection engine.
//!
//! Decides whether a proposed publication title collides with a corpus of
//! previously registered titles. A multi-stage similarity model combines
//! normalization, lexical heuristics over an in-memory multi-index, phonetic
//! hashing, trigram candidate retrieval, regulatory guideline rules, and a
//! weighted semantic ensemble over vector-search candidates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub mod engine;
pub mod ensemble;
pub mod guidelines;
pub mod index;
pub mod memo;
pub mod ngram;
pub mod normalize;
pub mod phonetic;
pub mod remote;
pub mod result_cache;

// Re-export for convenience
pub use config::EngineConfig;
pub use engine::VerificationEngine;
pub use guidelines::enforce_guidelines;
pub use index::TitleIndex;
pub use normalize::normalize;
pub use remote::{CorpusStore, Embedder, RemoteError, VectorMatch, VectorSearch};

/// Outcome of verifying one proposed title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub status: VerdictStatus,
    /// Chance the title survives manual verification, as a percentage.
    pub verification_probability: f64,
    /// Highest similarity found across all stages.
    pub similarity_percentage: f64,
    pub is_rejected: bool,
    pub rejection_reasons: Vec<String>,
    /// One-line summary of which stage decided the verdict.
    pub feedback: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictStatus {
    Success,
    Rejected,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Title cannot be empty.")]
    EmptyTitle,
    #[error("Title already exists.")]
    DuplicateTitle,
    #[error("corpus store error: {0}")]
    Store(#[from] RemoteError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&VerdictStatus::Success).unwrap(),
            "\"success\""
        );
        assert_eq!(
            serde_json::to_string(&VerdictStatus::Rejected).unwrap(),
            "\"rejected\""
        );
    }

    #[test]
    fn verdict_round_trips_through_json() {
        let verdict = Verdict {
            status: VerdictStatus::Rejected,
            verification_probability: 0.0,
            similarity_percentage: 100.0,
            is_rejected: true,
            rejection_reasons: vec!["Exact match found with existing title 'X'.".to_string()],
            feedback: "Title is too close to an existing title by lexical/phonetic checks."
                .to_string(),
        };
        let json = serde_json::to_string(&verdict).unwrap();
        let parsed: Verdict = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, verdict);
    }
}
