//! Talks to the REST API on behalf of the client.

use axum::http::StatusCode;

use crate::{
    endpoints,
    transaction::{ErrorPayload, Transaction, ValidationErrors},
};

/// Why a request to the server did not succeed.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum SubmitError {
    /// The request never got a response, e.g. the server is down or the
    /// client is offline.
    #[error("could not reach the server: {0}")]
    Network(String),

    /// The server refused the record because a required field is missing.
    #[error("the server rejected the transaction: {0}")]
    Rejected(ValidationErrors),

    /// The server responded with an unexpected status code.
    #[error("the server responded with status {0}")]
    Server(u16),

    /// The server responded with a body that could not be parsed.
    #[error("could not read the server's response: {0}")]
    InvalidResponse(String),
}

impl SubmitError {
    /// Whether sending the same request again later could succeed.
    ///
    /// Only a rejected record is final: anything else means the server has
    /// not (knowingly) stored it and it should be kept for a later attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SubmitError::Rejected(_))
    }
}

/// The operations the client needs from the server.
#[allow(async_fn_in_trait)]
pub trait TransactionApi {
    /// Get every transaction stored on the server, newest first.
    async fn fetch_transactions(&self) -> Result<Vec<Transaction>, SubmitError>;

    /// Send a single transaction to the server.
    ///
    /// Returns the record as stored by the server.
    async fn submit(&self, transaction: &Transaction) -> Result<Transaction, SubmitError>;

    /// Send many transactions in one request.
    ///
    /// The server stores either all of them or none of them.
    async fn submit_batch(&self, transactions: &[Transaction]) -> Result<(), SubmitError>;

    /// Whether the server can currently be reached.
    async fn is_reachable(&self) -> bool;
}

/// A [TransactionApi] that sends JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransactionApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransactionApi {
    /// Create a client for the server at `base_url`, e.g. "http://127.0.0.1:3000".
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

impl TransactionApi for HttpTransactionApi {
    async fn fetch_transactions(&self) -> Result<Vec<Transaction>, SubmitError> {
        let response = self
            .client
            .get(self.url(endpoints::TRANSACTIONS_API))
            .send()
            .await
            .map_err(|error| SubmitError::Network(error.to_string()))?;

        let response = check_status(response).await?;

        response
            .json()
            .await
            .map_err(|error| SubmitError::InvalidResponse(error.to_string()))
    }

    async fn submit(&self, transaction: &Transaction) -> Result<Transaction, SubmitError> {
        let response = self
            .client
            .post(self.url(endpoints::TRANSACTIONS_API))
            .json(transaction)
            .send()
            .await
            .map_err(|error| SubmitError::Network(error.to_string()))?;

        let response = check_status(response).await?;

        response
            .json()
            .await
            .map_err(|error| SubmitError::InvalidResponse(error.to_string()))
    }

    async fn submit_batch(&self, transactions: &[Transaction]) -> Result<(), SubmitError> {
        let response = self
            .client
            .post(self.url(endpoints::BULK_TRANSACTIONS_API))
            .json(transactions)
            .send()
            .await
            .map_err(|error| SubmitError::Network(error.to_string()))?;

        check_status(response).await?;

        Ok(())
    }

    async fn is_reachable(&self) -> bool {
        match self.client.get(self.url(endpoints::HEALTH)).send().await {
            Ok(response) => response.status().is_success(),
            Err(error) => {
                tracing::debug!("health check failed: {error}");
                false
            }
        }
    }
}

/// Turn error statuses into a [SubmitError], passing successful responses through.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SubmitError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::BAD_REQUEST {
        let payload: ErrorPayload = response
            .json()
            .await
            .map_err(|error| SubmitError::InvalidResponse(error.to_string()))?;

        return Err(SubmitError::Rejected(payload.errors));
    }

    Err(SubmitError::Server(status.as_u16()))
}

#[cfg(test)]
mod tests {
    use crate::transaction::ValidationErrors;

    use super::{HttpTransactionApi, SubmitError};

    #[test]
    fn only_rejections_are_final() {
        assert!(SubmitError::Network("connection refused".to_owned()).is_retryable());
        assert!(SubmitError::Server(500).is_retryable());
        assert!(SubmitError::InvalidResponse("EOF".to_owned()).is_retryable());
        assert!(!SubmitError::Rejected(ValidationErrors::single("name", "missing")).is_retryable());
    }

    #[test]
    fn base_url_trailing_slash_is_ignored() {
        let api = HttpTransactionApi::new("http://localhost:3000/");

        assert_eq!(api.url("/api/health"), "http://localhost:3000/api/health");
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_error() {
        use super::TransactionApi;

        // Port 9 (discard) is reserved and nothing should be listening on it.
        let api = HttpTransactionApi::new("http://127.0.0.1:9");

        assert!(!api.is_reachable().await);
        assert!(matches!(
            api.submit_batch(&[]).await,
            Err(SubmitError::Network(_))
        ));
    }
}
