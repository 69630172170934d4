//! The verification pipeline.
//!
//! One query flows normalize → lexical stage → guideline stage → semantic
//! stage → verdict. The title index is process-wide shared state behind a
//! single `RwLock`; no I/O ever happens while the lock is held, and the
//! verdict cache is cleared only after a write guard has been released.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use tokio_util::sync::CancellationToken;

use crate::config::EngineConfig;
use crate::ensemble::{EnsembleOutcome, score_semantic_matches};
use crate::guidelines::enforce_guidelines;
use crate::index::TitleIndex;
use crate::normalize::normalize;
use crate::remote::{CorpusStore, Embedder, VectorSearch};
use crate::result_cache::ResultCache;
use crate::{EngineError, Verdict, VerdictStatus};

pub struct VerificationEngine {
    config: EngineConfig,
    index: RwLock<TitleIndex>,
    cache: ResultCache,
    client: reqwest::Client,
    store: Arc<dyn CorpusStore>,
    embedder: Option<Arc<dyn Embedder>>,
    vector_search: Option<Arc<dyn VectorSearch>>,
}

impl VerificationEngine {
    pub fn new(
        config: EngineConfig,
        store: Arc<dyn CorpusStore>,
        embedder: Option<Arc<dyn Embedder>>,
        vector_search: Option<Arc<dyn VectorSearch>>,
    ) -> Self {
        let index = TitleIndex::with_periodicity_terms(&config.extra_periodicity_terms);
        let cache = ResultCache::new(config.result_cache_capacity);
        Self {
            config,
            index: RwLock::new(index),
            cache,
            client: reqwest::Client::new(),
            store,
            embedder,
            vector_search,
        }
    }

    /// Number of titles currently indexed (health probes).
    pub fn indexed_titles(&self) -> usize {
        self.index
            .read()
            .map(|index| index.len())
            .unwrap_or(0)
    }

    /// Build the index from the store, one page at a time, until an empty
    /// page comes back. The write lock is taken per batch so readers (and
    /// readiness probes) observe progress instead of waiting out the whole
    /// pull. Returns the number of raw titles loaded.
    pub async fn bootstrap(&self, cancel: &CancellationToken) -> Result<usize, EngineError> {
        let page_size = self.config.bootstrap_page_size.max(1);
        let mut offset = 0usize;
        let mut loaded = 0usize;

        loop {
            if cancel.is_cancelled() {
                break;
            }
            let titles = self
                .store
                .fetch_title_page(&self.client, offset, page_size, self.config.store_timeout)
                .await?;
            if titles.is_empty() {
                break;
            }

            {
                let mut index = self.index.write().expect("title index lock poisoned");
                index.extend(titles.iter().map(String::as_str));
            }

            loaded += titles.len();
            offset += page_size;
            if loaded % 10_000 == 0 {
                tracing::info!(loaded, "indexing corpus");
            }
        }

        self.cache.clear();
        tracing::info!(loaded, "title index ready");
        Ok(loaded)
    }

    /// Verify one proposed title. Never fails: transient backend trouble
    /// degrades to a lexical-only verdict.
    pub async fn verify(&self, title: &str, language: &str) -> Verdict {
        if let Some(hit) = self.cache.get(title, language) {
            return hit;
        }
        let verdict = self.verify_uncached(title).await;
        self.cache.insert(title, language, verdict.clone());
        verdict
    }

    async fn verify_uncached(&self, title: &str) -> Verdict {
        let (lexical_reasons, lexical_score, clean_title) = self.lexical_stage(title);

        if lexical_score >= self.config.lexical_reject_threshold {
            return rejection(
                lexical_score,
                lexical_reasons,
                "Title is too close to an existing title by lexical/phonetic checks.",
            );
        }

        let guideline_reasons = {
            let index = self.index.read().expect("title index lock poisoned");
            enforce_guidelines(&clean_title, Some(&index), true)
        };
        if !guideline_reasons.is_empty() {
            return Verdict {
                status: VerdictStatus::Rejected,
                verification_probability: 0.0,
                similarity_percentage: 100.0,
                is_rejected: true,
                rejection_reasons: guideline_reasons,
                feedback: "Title violates publication naming guidelines.".to_string(),
            };
        }

        if lexical_score >= self.config.ensemble_reject_threshold {
            let reasons = if lexical_reasons.is_empty() {
                vec![format!(
                    "Lexical similarity is already above rejection threshold ({:.1}% >= {:.1}%).",
                    lexical_score, self.config.ensemble_reject_threshold
                )]
            } else {
                lexical_reasons
            };
            return rejection(
                lexical_score,
                reasons,
                "Rejected by lexical scoring without semantic stage.",
            );
        }

        let ensemble = self.semantic_stage(title, &clean_title).await;

        let final_similarity = lexical_score.max(ensemble.highest_score);
        let probability = (100.0 - final_similarity).max(0.0);

        if final_similarity >= self.config.ensemble_reject_threshold {
            let mut reasons =
                dedup_preserving_order(lexical_reasons.into_iter().chain(ensemble.reasons));
            if reasons.is_empty() {
                reasons.push(
                    "High conceptual similarity detected with existing registered titles."
                        .to_string(),
                );
            }
            return Verdict {
                status: VerdictStatus::Rejected,
                verification_probability: round2(probability),
                similarity_percentage: round2(final_similarity),
                is_rejected: true,
                rejection_reasons: reasons,
                feedback: "Rejected by weighted lexical, phonetic, and semantic scoring."
                    .to_string(),
            };
        }

        Verdict {
            status: VerdictStatus::Success,
            verification_probability: round2(probability),
            similarity_percentage: round2(final_similarity),
            is_rejected: false,
            rejection_reasons: vec![],
            feedback: "Title passed automated validation checks.".to_string(),
        }
    }

    /// Normalize and run the lexical conflict rules under the read lock.
    /// When normalization changed more than case or padding, a notice is
    /// prepended so the reasons reference the form that was matched.
    fn lexical_stage(&self, title: &str) -> (Vec<String>, f64, String) {
        let normalized = normalize(title);
        let (mut reasons, score) = {
            let index = self.index.read().expect("title index lock poisoned");
            index.detect_lexical_conflicts(&normalized, true)
        };

        if !reasons.is_empty() && !normalized.is_empty() && normalized != title.trim().to_lowercase()
        {
            reasons.insert(
                0,
                format!("Input was normalized to '{}' before matching.", normalized),
            );
        }
        (reasons, score, normalized)
    }

    /// Embed the raw title and score the vector-search candidates. Any
    /// backend failure (or absent configuration) degrades to an empty
    /// outcome: the verdict then rests on the lexical score alone.
    async fn semantic_stage(&self, raw_title: &str, clean_title: &str) -> EnsembleOutcome {
        let (Some(embedder), Some(vector_search)) = (&self.embedder, &self.vector_search) else {
            tracing::debug!("semantic stage disabled; no embedding backend configured");
            return EnsembleOutcome::empty();
        };

        let timeout = self.config.semantic_rpc_timeout;
        let embedding = match embedder.embed(&self.client, raw_title, timeout).await {
            Ok(vector) => vector,
            Err(err) => {
                tracing::warn!(error = %err, "embedding call failed; continuing without semantic stage");
                return EnsembleOutcome::empty();
            }
        };

        let matches = match vector_search
            .match_titles(
                &self.client,
                &embedding,
                self.config.vector_match_threshold,
                self.config.vector_match_count,
                timeout,
            )
            .await
        {
            Ok(matches) => matches,
            Err(err) => {
                tracing::warn!(error = %err, "vector search failed; continuing without semantic stage");
                return EnsembleOutcome::empty();
            }
        };

        score_semantic_matches(clean_title, &matches, self.config.ensemble_reject_threshold)
    }

    /// Register a new official application: store write first, then the
    /// in-memory index, then the verdict cache. A failed store write leaves
    /// the index untouched.
    pub async fn submit_application(
        &self,
        title: &str,
        language: &str,
    ) -> Result<(), EngineError> {
        let normalized = normalize(title);
        if normalized.is_empty() {
            return Err(EngineError::EmptyTitle);
        }

        {
            let index = self.index.read().expect("title index lock poisoned");
            if index.contains(&normalized) {
                return Err(EngineError::DuplicateTitle);
            }
        }

        self.store
            .insert_application(&self.client, title, language, self.config.store_timeout)
            .await?;

        {
            let mut index = self.index.write().expect("title index lock poisoned");
            index.add_title(title);
        }
        self.cache.clear();

        tracing::info!(title, language, "application indexed");
        Ok(())
    }

    /// Push an official registry decision through to the store. The index is
    /// unaffected; status changes do not alter which titles conflict.
    pub async fn sync_registration(
        &self,
        title: &str,
        status: &str,
        registration_id: &str,
    ) -> Result<(), EngineError> {
        self.store
            .update_registration(
                &self.client,
                title,
                status,
                registration_id,
                self.config.store_timeout,
            )
            .await?;
        Ok(())
    }

    /// Drop the whole in-memory state (shutdown path).
    pub fn clear(&self) {
        {
            let mut index = self.index.write().expect("title index lock poisoned");
            index.clear();
        }
        self.cache.clear();
    }
}

fn rejection(score: f64, reasons: Vec<String>, feedback: &str) -> Verdict {
    let probability = (100.0 - score).max(0.0);
    Verdict {
        status: VerdictStatus::Rejected,
        verification_probability: round2(probability),
        similarity_percentage: round2(score),
        is_rejected: true,
        rejection_reasons: reasons,
        feedback: feedback.to_string(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn dedup_preserving_order(reasons: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    reasons
        .into_iter()
        .filter(|reason| seen.insert(reason.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_two_decimals() {
        assert_eq!(round2(96.296296), 96.3);
        assert_eq!(round2(50.125), 50.13);
        assert_eq!(round2(100.0), 100.0);
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let deduped = dedup_preserving_order(vec![
            "a".to_string(),
            "b".to_string(),
            "a".to_string(),
            "c".to_string(),
        ]);
        assert_eq!(deduped, vec!["a", "b", "c"]);
    }

    #[test]
    fn rejection_probability_is_complement_of_score() {
        let verdict = rejection(96.296296, vec!["reason".into()], "feedback");
        assert!(verdict.is_rejected);
        assert_eq!(verdict.similarity_percentage, 96.3);
        assert_eq!(verdict.verification_probability, 3.7);
    }
}
