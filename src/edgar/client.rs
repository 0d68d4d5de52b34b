// src/edgar/client.rs
use crate::edgar::models::{submission_text_url, CompanySubmission, FilingDescriptor};
use crate::report::ContentFetcher;
use crate::utils::error::EdgarError;
use crate::utils::html_text::html_to_text;
use crate::utils::AppConfig;
use async_trait::async_trait;
use reqwest::header;
use std::time::Duration;

const COMPANY_TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";

/// Thin EDGAR client: the filing index and the raw filing text.
/// Every request is preceded by a polite delay; SEC blocks clients without a User-Agent.
#[derive(Debug, Clone)]
pub struct EdgarClient {
    http: reqwest::Client,
    request_delay: Duration,
}

impl EdgarClient {
    pub fn new(config: &AppConfig) -> Result<Self, EdgarError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str()) // Set the required User-Agent
            .timeout(Duration::from_secs(60))
            .build()?;

        tracing::debug!("Using User-Agent: {}", config.user_agent);
        Ok(Self {
            http,
            request_delay: config.request_delay,
        })
    }

    /// Issues a GET after the rate-limit delay and maps non-2xx statuses to errors.
    async fn get(&self, url: &str) -> Result<reqwest::Response, EdgarError> {
        tokio::time::sleep(self.request_delay).await;

        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json,text/html,text/plain,*/*")
            .send()
            .await?; // Propagates reqwest::Error as EdgarError::Network

        let status = response.status();
        if !status.is_success() {
            tracing::error!("HTTP error status: {} for URL: {}", status, url);
            if status == reqwest::StatusCode::FORBIDDEN || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                tracing::warn!("Received {} - check User-Agent and rate limits.", status);
                return Err(EdgarError::RateLimited);
            }
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(EdgarError::FilingDocNotFound(url.to_string()));
            }
            return Err(EdgarError::Http(status));
        }

        Ok(response)
    }

    /// Gets the zero-padded CIK (Central Index Key) for a ticker symbol.
    pub async fn get_cik_from_ticker(&self, ticker: &str) -> Result<String, EdgarError> {
        let ticker = ticker.trim().to_uppercase();
        let json: serde_json::Value = self.get(COMPANY_TICKERS_URL).await?.json().await?;

        let companies = json
            .as_object()
            .ok_or_else(|| EdgarError::Parse("Invalid JSON structure".to_string()))?;

        for company in companies.values() {
            let matches = company
                .get("ticker")
                .and_then(|t| t.as_str())
                .is_some_and(|t| t.eq_ignore_ascii_case(&ticker));
            if matches {
                let cik_num = company
                    .get("cik_str")
                    .and_then(|c| c.as_u64())
                    .ok_or_else(|| EdgarError::Parse("Invalid CIK format".to_string()))?;
                return Ok(format!("{:010}", cik_num));
            }
        }

        Err(EdgarError::TickerNotFound(ticker))
    }

    /// Lists every recent filing in the company's submission index, all forms included.
    pub async fn list_filings(&self, cik: &str) -> Result<Vec<FilingDescriptor>, EdgarError> {
        let padded = format!("{:0>10}", cik.trim());
        let url = format!("https://data.sec.gov/submissions/CIK{}.json", padded);

        let submission: CompanySubmission = self.get(&url).await?.json().await?;
        tracing::info!("Loaded submission index for {} (CIK {})", submission.name, padded);

        Ok(submission.into_descriptors())
    }

    /// Downloads the complete submission text of a filing and flattens any HTML in it.
    pub async fn download_filing_text(
        &self,
        cik: &str,
        accession_number: &str,
    ) -> Result<String, EdgarError> {
        let url = submission_text_url(cik, accession_number);
        tracing::info!("Downloading document from: {}", url);

        let body = self.get(&url).await?.text().await?;
        tracing::debug!("Successfully downloaded {} bytes from {}", body.len(), url);

        Ok(html_to_text(&body))
    }
}

#[async_trait]
impl ContentFetcher for EdgarClient {
    async fn fetch_content(&self, cik: &str, accession_number: &str) -> Result<String, EdgarError> {
        self.download_filing_text(cik, accession_number).await
    }
}
