//! HTTP client for the Chamber of Deputies open-data API (`/api/v2`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use tramita_core::{
    AuthorEntry, HistoryEntry, Proposal, ProposalSeed, ProposalStatus, RelatedEntry,
};

use crate::{ProposalSource, SyncError};

/// Public base URL of the Chamber of Deputies open-data API.
pub const DEFAULT_BASE_URL: &str = "https://dadosabertos.camara.leg.br/api/v2";

const USER_AGENT: &str = concat!("tramita/", env!("CARGO_PKG_VERSION"));

/// Every response wraps its payload in a `dados` field.
#[derive(Deserialize)]
struct Envelope<T> {
    dados: T,
}

#[derive(Deserialize)]
struct ProposalDetail {
    #[serde(rename = "statusProposicao", default)]
    status: Option<ProposalStatus>,
}

/// Read-only client for the `/proposicoes` endpoints.
pub struct CamaraClient {
    client: reqwest::Client,
    base_url: String,
}

impl CamaraClient {
    /// Create a client for the given API base URL.
    ///
    /// `base_url` should be like `https://dadosabertos.camara.leg.br/api/v2`
    /// (no trailing slash).
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a client whose requests give up after `timeout`.
    pub fn with_timeout(base_url: String, timeout: Duration) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_dados<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SyncError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET");
        let resp = self
            .client
            .get(&url)
            .query(query)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let envelope: Envelope<T> = serde_json::from_str(&body)?;
        Ok(envelope.dados)
    }
}

#[async_trait]
impl ProposalSource for CamaraClient {
    async fn search(&self, seed: &ProposalSeed) -> Result<Vec<Proposal>, SyncError> {
        let query = [
            ("siglaTipo", seed.kind.to_string()),
            ("numero", seed.number.to_string()),
            ("ano", seed.year.to_string()),
            ("ordenarPor", "ano".to_string()),
            ("ordem", "asc".to_string()),
            ("itens", "1".to_string()),
        ];
        self.get_dados("/proposicoes", &query).await
    }

    async fn status(&self, id: i64) -> Result<ProposalStatus, SyncError> {
        let detail: ProposalDetail = self.get_dados(&format!("/proposicoes/{id}"), &[]).await?;
        Ok(detail.status.unwrap_or_default())
    }

    async fn authors(&self, id: i64) -> Result<Vec<AuthorEntry>, SyncError> {
        self.get_dados(&format!("/proposicoes/{id}/autores"), &[])
            .await
    }

    async fn related(&self, id: i64) -> Result<Vec<RelatedEntry>, SyncError> {
        self.get_dados(&format!("/proposicoes/{id}/relacionadas"), &[])
            .await
    }

    async fn history(&self, id: i64) -> Result<Vec<HistoryEntry>, SyncError> {
        self.get_dados(&format!("/proposicoes/{id}/tramitacoes"), &[])
            .await
    }
}
