use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;

use crate::error::SyncError;

/// Largest page the esearch endpoint accepts per request.
pub const MAX_PAGE_LIMIT: usize = 100_000;

pub trait EntrezClient: Send + Sync {
    /// One paginated esearch request returning up to `limit` ids at `offset`.
    fn search_ids(&self, query: &str, offset: usize, limit: usize)
    -> Result<Vec<String>, SyncError>;

    /// One bulk efetch request returning concatenated FASTA text for `ids`.
    fn fetch_fasta(&self, ids: &[String]) -> Result<String, SyncError>;

    /// Pages through esearch with the maximum page size, concatenating
    /// results in request order. The first page shorter than the page size
    /// (possibly empty) ends the scan. Relies on the remote never returning
    /// a short page followed by more data.
    fn search_all(&self, query: &str) -> Result<Vec<String>, SyncError> {
        let mut ids = Vec::new();
        let mut offset = 0usize;

        loop {
            tracing::info!(query, offset, limit = MAX_PAGE_LIMIT, "retrieving id page");
            let page = self.search_ids(query, offset, MAX_PAGE_LIMIT)?;
            let full_page = page.len() == MAX_PAGE_LIMIT;
            ids.extend(page);
            if !full_page {
                break;
            }
            offset += MAX_PAGE_LIMIT;
        }

        Ok(ids)
    }
}

#[derive(Clone)]
pub struct EntrezHttpClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl EntrezHttpClient {
    /// Builds a blocking client for the eutils endpoints. No request timeout
    /// is set: a hung remote call blocks the run until the operator kills it.
    pub fn new(api_key: Option<String>) -> Result<Self, SyncError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("fasta-sync/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| SyncError::EntrezHttp(err.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|err| SyncError::EntrezHttp(err.to_string()))?;

        Ok(Self {
            client,
            base_url: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string(),
            api_key,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, SyncError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "entrez request failed".to_string());
        Err(SyncError::EntrezStatus { status, message })
    }
}

impl EntrezClient for EntrezHttpClient {
    fn search_ids(
        &self,
        query: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<String>, SyncError> {
        if limit > MAX_PAGE_LIMIT {
            return Err(SyncError::InvalidLimit {
                limit,
                max: MAX_PAGE_LIMIT,
            });
        }

        let url = format!("{}/esearch.fcgi", self.base_url);
        let mut params = vec![
            ("db".to_string(), "protein".to_string()),
            ("term".to_string(), search_term(query)),
            ("retmax".to_string(), limit.to_string()),
            ("retstart".to_string(), offset.to_string()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("api_key".to_string(), key.clone()));
        }

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .map_err(|err| SyncError::EntrezHttp(err.to_string()))?;
        let response = Self::handle_status(response)?;
        let body = response
            .text()
            .map_err(|err| SyncError::EntrezHttp(err.to_string()))?;

        parse_id_list(&body)
    }

    fn fetch_fasta(&self, ids: &[String]) -> Result<String, SyncError> {
        let url = format!("{}/efetch.fcgi", self.base_url);
        let mut params = vec![
            ("db".to_string(), "protein".to_string()),
            ("rettype".to_string(), "fasta".to_string()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("api_key".to_string(), key.clone()));
        }

        let response = self
            .client
            .post(&url)
            .query(&params)
            .form(&[("id", ids.join(","))])
            .send()
            .map_err(|err| SyncError::EntrezHttp(err.to_string()))?;
        let response = Self::handle_status(response)?;

        response
            .text()
            .map_err(|err| SyncError::EntrezHttp(err.to_string()))
    }
}

/// Full esearch term for a query: restricted to bacteria and sequence
/// lengths between 90 and 200 residues.
pub fn search_term(query: &str) -> String {
    format!("{query} AND (bacteria[filter]) AND ((\"90\"[SLEN] : \"200\"[SLEN]))")
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
    #[serde(rename = "IdList", default)]
    id_list: IdList,
}

#[derive(Debug, Deserialize, Default)]
struct IdList {
    #[serde(rename = "Id", default)]
    ids: Vec<String>,
}

/// Extracts the `<Id>` elements from an esearch XML envelope, in document
/// order. A missing or empty `<IdList>` yields an empty vector.
pub fn parse_id_list(xml: &str) -> Result<Vec<String>, SyncError> {
    let result: ESearchResult =
        quick_xml::de::from_str(xml).map_err(|err| SyncError::SearchParse(err.to_string()))?;
    Ok(result.id_list.ids)
}
