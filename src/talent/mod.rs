use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use crate::models::talent::{CredentialsResponse, Passport, PassportEnvelope, PassportsPage};

#[derive(Debug, thiserror::Error)]
pub enum TalentError {
    #[error("identity source returned status {status} for {resource}")]
    Status {
        status: StatusCode,
        resource: String,
    },
    #[error("identity source request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl TalentError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Status {
                status: StatusCode::NOT_FOUND,
                ..
            }
        )
    }
}

/// Client for the identity/reputation source. Every call is a single
/// best-effort request; there is no retry policy.
#[derive(Clone)]
pub struct TalentClient {
    http: reqwest::Client,
    base_url: String,
}

impl TalentClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        assert!(!base_url.is_empty(), "Identity source URL must be provided");
        assert!(
            timeout >= Duration::from_millis(100),
            "Timeout below 100ms is unsafe"
        );

        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_str(api_key)
                .context("Identity source API key is not a valid header value")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("Failed to build identity source client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Single-record lookup. The identifier is passed through verbatim; the
    /// source resolves both wallet addresses and numeric passport ids.
    pub async fn fetch_passport(&self, id: &str) -> Result<Passport, TalentError> {
        assert!(!id.is_empty(), "Passport identifier must be non-empty");
        let url = format!("{}/passports/{id}", self.base_url);
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(TalentError::Status {
                status: response.status(),
                resource: format!("passports/{id}"),
            });
        }
        let envelope: PassportEnvelope = response.json().await?;
        Ok(envelope.passport)
    }

    /// One page of the listing endpoint, optionally keyword-filtered.
    pub async fn fetch_passports_page(
        &self,
        keyword: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> Result<PassportsPage, TalentError> {
        assert!(page >= 1, "Listing pages are one-based");
        assert!(per_page >= 1, "Page size must be positive");
        assert!(per_page <= 100, "Page size exceeds defensive bound");

        let url = format!("{}/passports", self.base_url);
        let mut request = self.http.get(&url).query(&[
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
        ]);
        if let Some(keyword) = keyword {
            request = request.query(&[("keyword", keyword)]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(TalentError::Status {
                status: response.status(),
                resource: format!("passports?page={page}"),
            });
        }
        let listing: PassportsPage = response.json().await?;
        Ok(listing)
    }

    /// Credential records for one passport (enrichment path only).
    pub async fn fetch_credentials(
        &self,
        passport_id: u64,
    ) -> Result<Vec<crate::models::talent::PassportCredential>, TalentError> {
        let url = format!("{}/passport_credentials", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("passport_id", passport_id.to_string())])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(TalentError::Status {
                status: response.status(),
                resource: format!("passport_credentials?passport_id={passport_id}"),
            });
        }
        let body: CredentialsResponse = response.json().await?;
        Ok(body.passport_credentials)
    }
}

/// Wallet addresses are distinguished from numeric passport ids by their
/// `0x` prefix. Used for logging only; fetch URLs are identical either way.
pub fn is_wallet_address(id: &str) -> bool {
    id.trim()
        .get(..2)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("0x"))
}
