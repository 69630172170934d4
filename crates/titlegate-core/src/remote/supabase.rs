//! PostgREST-backed corpus store and vector RPC.
//!
//! Talks to a Supabase project: the `existing_titles` table for rows and the
//! `match_titles` database function for cosine nearest-neighbor search. The
//! engine never touches the vector column itself.

use std::time::Duration;

use super::{CorpusStore, RemoteError, RemoteFuture, VectorMatch, VectorSearch};

pub struct SupabaseStore {
    base_url: String,
    api_key: String,
}

impl SupabaseStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            api_key: api_key.into(),
        }
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

/// Pull the raw title out of a PostgREST row, tolerating either column
/// casing.
fn row_title(row: &serde_json::Value) -> Option<String> {
    row.get("Title")
        .or_else(|| row.get("title"))
        .and_then(|value| value.as_str())
        .filter(|title| !title.is_empty())
        .map(String::from)
}

impl CorpusStore for SupabaseStore {
    fn fetch_title_page<'a>(
        &'a self,
        client: &'a reqwest::Client,
        offset: usize,
        limit: usize,
        timeout: Duration,
    ) -> RemoteFuture<'a, Vec<String>> {
        Box::pin(async move {
            let url = format!(
                "{}/rest/v1/existing_titles?select=Title&offset={}&limit={}",
                self.base_url, offset, limit
            );
            let resp = self
                .authed(client.get(&url))
                .timeout(timeout)
                .send()
                .await?;
            if !resp.status().is_success() {
                return Err(RemoteError::Status(resp.status()));
            }

            let rows: serde_json::Value = resp.json().await?;
            let rows = rows
                .as_array()
                .ok_or_else(|| RemoteError::Shape("expected a JSON array of rows".into()))?;
            Ok(rows.iter().filter_map(row_title).collect())
        })
    }

    fn insert_application<'a>(
        &'a self,
        client: &'a reqwest::Client,
        title: &'a str,
        language: &'a str,
        timeout: Duration,
    ) -> RemoteFuture<'a, ()> {
        Box::pin(async move {
            let url = format!("{}/rest/v1/existing_titles", self.base_url);
            let body = serde_json::json!({
                "Title": title,
                "Language": language,
                "Publication State": "pending",
            });
            let resp = self
                .authed(client.post(&url))
                .header("Prefer", "return=minimal")
                .json(&body)
                .timeout(timeout)
                .send()
                .await?;
            if !resp.status().is_success() {
                return Err(RemoteError::Status(resp.status()));
            }
            Ok(())
        })
    }

    fn update_registration<'a>(
        &'a self,
        client: &'a reqwest::Client,
        title: &'a str,
        status: &'a str,
        registration_id: &'a str,
        timeout: Duration,
    ) -> RemoteFuture<'a, ()> {
        Box::pin(async move {
            let url = format!(
                "{}/rest/v1/existing_titles?Title=eq.{}",
                self.base_url,
                urlencoding::encode(title)
            );
            let body = serde_json::json!({
                "Publication State": status,
                "Registration_ID": registration_id,
            });
            let resp = self
                .authed(client.patch(&url))
                .header("Prefer", "return=minimal")
                .json(&body)
                .timeout(timeout)
                .send()
                .await?;
            if !resp.status().is_success() {
                return Err(RemoteError::Status(resp.status()));
            }
            Ok(())
        })
    }
}

impl VectorSearch for SupabaseStore {
    fn match_titles<'a>(
        &'a self,
        client: &'a reqwest::Client,
        embedding: &'a [f32],
        threshold: f64,
        count: usize,
        timeout: Duration,
    ) -> RemoteFuture<'a, Vec<VectorMatch>> {
        Box::pin(async move {
            let url = format!("{}/rest/v1/rpc/match_titles", self.base_url);
            let body = serde_json::json!({
                "query_embedding": embedding,
                "match_threshold": threshold,
                "match_count": count,
            });
            let resp = self
                .authed(client.post(&url))
                .json(&body)
                .timeout(timeout)
                .send()
                .await?;
            if !resp.status().is_success() {
                return Err(RemoteError::Status(resp.status()));
            }

            let rows: serde_json::Value = resp.json().await?;
            let rows = rows
                .as_array()
                .ok_or_else(|| RemoteError::Shape("expected a JSON array of matches".into()))?;
            Ok(rows
                .iter()
                .filter_map(|row| {
                    let title = row_title(row)?;
                    let similarity = row.get("similarity")?.as_f64()?;
                    Some(VectorMatch { title, similarity })
                })
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_trimmed() {
        let store = SupabaseStore::new("https://example.supabase.co//", "key");
        assert_eq!(store.base_url, "https://example.supabase.co");
    }

    #[test]
    fn row_title_accepts_either_casing() {
        let upper = serde_json::json!({"Title": "The Hindu"});
        let lower = serde_json::json!({"title": "The Hindu"});
        let missing = serde_json::json!({"name": "The Hindu"});
        let empty = serde_json::json!({"Title": ""});
        assert_eq!(row_title(&upper).as_deref(), Some("The Hindu"));
        assert_eq!(row_title(&lower).as_deref(), Some("The Hindu"));
        assert_eq!(row_title(&missing), None);
        assert_eq!(row_title(&empty), None);
    }
}
