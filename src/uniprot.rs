use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::error::SyncError;

pub trait UniprotClient: Send + Sync {
    /// One request returning the entire FASTA result set for `query`; the
    /// remote does its own filtering, there is no pagination.
    fn fetch_all(&self, query: &str) -> Result<String, SyncError>;
}

#[derive(Clone)]
pub struct UniprotHttpClient {
    client: Client,
    base_url: String,
}

impl UniprotHttpClient {
    pub fn new() -> Result<Self, SyncError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("fasta-sync/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| SyncError::UniprotHttp(err.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|err| SyncError::UniprotHttp(err.to_string()))?;

        Ok(Self {
            client,
            base_url: "https://www.uniprot.org/uniprot/".to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl UniprotClient for UniprotHttpClient {
    fn fetch_all(&self, query: &str) -> Result<String, SyncError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("query", query), ("format", "fasta")])
            .send()
            .map_err(|err| SyncError::UniprotHttp(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "uniprot request failed".to_string());
            return Err(SyncError::UniprotStatus { status, message });
        }

        response
            .text()
            .map_err(|err| SyncError::UniprotHttp(err.to_string()))
    }
}
