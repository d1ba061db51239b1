//! Client for the answers REST API.
//!
//! Thin reqwest wrapper around the three endpoints this tool consumes:
//! question metadata, the answer batch for a question, and the health
//! probe. Any non-2xx response is an error; callers decide whether to
//! surface or swallow it.

use crate::models::{Answer, Question};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors produced by the answers API client.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure (connection refused, timeout, DNS).
    #[error("network error: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded as the expected JSON.
    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Client for the answers API.
#[derive(Debug, Clone)]
pub struct AnswersClient {
    base_url: String,
    http: reqwest::Client,
}

impl AnswersClient {
    /// Create a client for the given base URL with a request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the answer batch for a question.
    ///
    /// The returned order is the server's order; aggregation relies on it
    /// for stable keyword output.
    pub async fn fetch_answers(&self, question_id: &str) -> Result<Vec<Answer>, ApiError> {
        let url = format!("{}/questions/{}/answers", self.base_url, question_id);
        debug!("GET {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Vec<Answer>>()
            .await
            .map_err(|e| ApiError::Decode {
                url,
                message: e.to_string(),
            })
    }

    /// Fetch the metadata for a question.
    pub async fn fetch_question(&self, question_id: &str) -> Result<Question, ApiError> {
        let url = format!("{}/questions/{}", self.base_url, question_id);
        debug!("GET {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Question>()
            .await
            .map_err(|e| ApiError::Decode {
                url,
                message: e.to_string(),
            })
    }

    /// Probe the API health endpoint.
    pub async fn health_check(&self) -> Result<(), ApiError> {
        let url = format!("{}/health", self.base_url);
        debug!("GET {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
