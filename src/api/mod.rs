mod pagination;

use anyhow::{Context, Result};
use reqwest::{Response, StatusCode};
use url::Url;

use crate::models::{Activity, Appointment, Client, Message, Property, ThemeSettings, User};
use pagination::next_link;

// ─── Error types ────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Rate limited – retry after {retry_after:.1}s")]
    RateLimited { retry_after: f64 },
    #[error("Unauthorized – check your API token")]
    Unauthorized,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

// ─── Client ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PlatformClient {
    client: reqwest::Client,
    base_url: Url,
    token: String,
}

impl PlatformClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid platform URL: {base_url}"))?;

        let client = reqwest::Client::builder()
            .user_agent("realty-tui/0.1.0")
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: token.to_string(),
        })
    }

    fn api_url(&self, path: &str) -> Result<Url> {
        let full = format!("/api{path}");
        self.base_url
            .join(&full)
            .with_context(|| format!("Bad API path: {path}"))
    }

    async fn get(&self, path: &str) -> Result<Response, PlatformError> {
        let url = self.api_url(path).map_err(PlatformError::Other)?;
        self.get_url(url).await
    }

    async fn check_status(resp: Response) -> Result<Response, PlatformError> {
        match resp.status() {
            StatusCode::UNAUTHORIZED => Err(PlatformError::Unauthorized),
            StatusCode::FORBIDDEN => Err(PlatformError::Api {
                status: 403,
                message: "Forbidden – insufficient permissions".into(),
            }),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<f64>().ok())
                    .unwrap_or(1.0);
                Err(PlatformError::RateLimited { retry_after: retry })
            }
            s if s.is_client_error() || s.is_server_error() => {
                let status = s.as_u16();
                let message = resp.text().await.unwrap_or_default();
                Err(PlatformError::Api { status, message })
            }
            _ => Ok(resp),
        }
    }

    async fn get_url(&self, url: Url) -> Result<Response, PlatformError> {
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::check_status(resp).await
    }

    async fn get_paginated<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<(Vec<T>, Option<String>), PlatformError> {
        let mut url = self.api_url(path).map_err(PlatformError::Other)?;
        for (k, v) in params {
            url.query_pairs_mut().append_pair(k, v);
        }
        let resp = self.get_url(url).await?;
        let next = next_link(resp.headers());
        let items: Vec<T> = resp.json().await?;
        Ok((items, next))
    }

    async fn get_all_pages<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>, PlatformError> {
        let mut all = Vec::new();
        let (items, mut next) = self.get_paginated(path, params).await?;
        all.extend(items);

        while let Some(next_url) = next.take() {
            let url = Url::parse(&next_url)
                .map_err(|e| PlatformError::Other(anyhow::anyhow!("Bad pagination URL: {e}")))?;
            let resp = self.get_url(url).await?;
            next = next_link(resp.headers());
            let items: Vec<T> = resp.json().await?;
            all.extend(items);
        }

        Ok(all)
    }

    // ── Properties ──────────────────────────────────────────────────────

    pub async fn list_properties(&self) -> Result<Vec<Property>, PlatformError> {
        self.get_all_pages("/properties", &[("per_page", "50")]).await
    }

    // ── Appointments ────────────────────────────────────────────────────

    pub async fn list_appointments(&self) -> Result<Vec<Appointment>, PlatformError> {
        self.get_all_pages("/appointments", &[("per_page", "50")]).await
    }

    // ── Clients ─────────────────────────────────────────────────────────

    pub async fn list_clients(&self) -> Result<Vec<Client>, PlatformError> {
        self.get_all_pages("/clients", &[("per_page", "50")]).await
    }

    // ── Messages ────────────────────────────────────────────────────────

    pub async fn list_messages(&self) -> Result<Vec<Message>, PlatformError> {
        self.get_all_pages("/messages", &[("per_page", "50")]).await
    }

    // ── Activity feed ───────────────────────────────────────────────────

    pub async fn list_activities(&self) -> Result<Vec<Activity>, PlatformError> {
        self.get_all_pages("/activities", &[("per_page", "25")]).await
    }

    // ── Theme settings ──────────────────────────────────────────────────

    pub async fn get_theme_settings(&self, id: u64) -> Result<ThemeSettings, PlatformError> {
        let resp = self.get(&format!("/theme-settings/{id}")).await?;
        Ok(resp.json().await?)
    }

    // ── User / Profile ──────────────────────────────────────────────────

    pub async fn get_self(&self) -> Result<User, PlatformError> {
        let resp = self.get("/users/self").await?;
        Ok(resp.json().await?)
    }
}
