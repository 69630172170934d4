//! Clients for the engine's external collaborators: the corpus row store,
//! the embedding service, and the vector nearest-neighbor RPC.
//!
//! Each collaborator is a trait so the engine can be driven against mocks;
//! production implementations live in [`supabase`] and [`huggingface`].

pub mod huggingface;
pub mod supabase;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("unexpected response shape: {0}")]
    Shape(String),
}

/// One candidate returned by the vector search: raw stored title plus
/// cosine similarity in `[-1, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    pub title: String,
    pub similarity: f64,
}

pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RemoteError>> + Send + 'a>>;

/// The row store holding every registered title.
pub trait CorpusStore: Send + Sync {
    /// Read one page of raw titles, ordered by the store; an empty page
    /// terminates the bootstrap loop.
    fn fetch_title_page<'a>(
        &'a self,
        client: &'a reqwest::Client,
        offset: usize,
        limit: usize,
        timeout: Duration,
    ) -> RemoteFuture<'a, Vec<String>>;

    /// Insert a new pending application row.
    fn insert_application<'a>(
        &'a self,
        client: &'a reqwest::Client,
        title: &'a str,
        language: &'a str,
        timeout: Duration,
    ) -> RemoteFuture<'a, ()>;

    /// Record the official registry decision for a previously stored title.
    fn update_registration<'a>(
        &'a self,
        client: &'a reqwest::Client,
        title: &'a str,
        status: &'a str,
        registration_id: &'a str,
        timeout: Duration,
    ) -> RemoteFuture<'a, ()>;
}

/// The embedding model service: one dense vector per input string.
pub trait Embedder: Send + Sync {
    fn embed<'a>(
        &'a self,
        client: &'a reqwest::Client,
        text: &'a str,
        timeout: Duration,
    ) -> RemoteFuture<'a, Vec<f32>>;
}

/// Nearest-neighbor search over the store's vector column.
pub trait VectorSearch: Send + Sync {
    fn match_titles<'a>(
        &'a self,
        client: &'a reqwest::Client,
        embedding: &'a [f32],
        threshold: f64,
        count: usize,
        timeout: Duration,
    ) -> RemoteFuture<'a, Vec<VectorMatch>>;
}
