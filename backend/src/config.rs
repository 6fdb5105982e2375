//! Admin console settings loaded via OrthoConfig.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::{LOAN_REQUESTS_COLLECTION, USERS_COLLECTION};

/// Problems with otherwise loadable settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("record store URL is not configured (set LENDING_ADMIN_STORE_URL)")]
    MissingStoreUrl,
    #[error("record store URL `{url}` is invalid: {reason}")]
    InvalidStoreUrl { url: String, reason: String },
}

/// Connection and display settings for the admin console core.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LENDING_ADMIN")]
pub struct AdminSettings {
    /// Base URL of the record store document API.
    pub store_url: Option<String>,
    /// Bearer token sent to the record store.
    pub api_token: Option<String>,
    /// Per-request timeout in seconds.
    #[ortho_config(default = 10)]
    pub request_timeout_secs: u64,
    /// Number of loans shown in the recent activity list.
    #[ortho_config(default = 5)]
    pub recent_loans: usize,
    /// Collection holding user documents.
    pub users_collection: Option<String>,
    /// Collection holding loan request documents.
    pub loans_collection: Option<String>,
}

impl AdminSettings {
    /// Parse the configured store URL.
    ///
    /// # Errors
    ///
    /// [`SettingsError::MissingStoreUrl`] when unset, or
    /// [`SettingsError::InvalidStoreUrl`] when it does not parse.
    pub fn store_url(&self) -> Result<Url, SettingsError> {
        let raw = self
            .store_url
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .ok_or(SettingsError::MissingStoreUrl)?;
        Url::parse(raw).map_err(|err| SettingsError::InvalidStoreUrl {
            url: raw.to_owned(),
            reason: err.to_string(),
        })
    }

    /// Bearer token, if one is configured and non-blank.
    pub fn api_token(&self) -> Option<&str> {
        self.api_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }

    /// Request timeout, never shorter than one second.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn recent_loans(&self) -> usize {
        self.recent_loans
    }

    pub fn users_collection(&self) -> &str {
        self.users_collection.as_deref().unwrap_or(USERS_COLLECTION)
    }

    pub fn loans_collection(&self) -> &str {
        self.loans_collection
            .as_deref()
            .unwrap_or(LOAN_REQUESTS_COLLECTION)
    }
}
