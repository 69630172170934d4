use serde::Deserialize;

/// Fallback when the caller supplies no language; detection is left to the
/// clients feeding this service.
pub const DEFAULT_LANGUAGE: &str = "English";

/// Body of `POST /verify`.
#[derive(Debug, Deserialize)]
pub struct TitleSubmission {
    pub title: String,
    #[serde(default)]
    pub language: Option<String>,
}

/// Body of `POST /submit_application`.
#[derive(Debug, Deserialize)]
pub struct OfficialApplication {
    pub title: String,
    pub language: String,
    pub owner_email: String,
}

/// Body of `POST /webhook/registry_sync`: the official registry's decision
/// for a previously submitted title.
#[derive(Debug, Deserialize)]
pub struct RegistrySyncPayload {
    pub title: String,
    pub government_registration_id: String,
    pub status: String,
}
