use async_trait::async_trait;
use reqwest::{multipart::Form, Client};
use serde_json::Value;
use shared::{error::SubmitError, protocol::FormPayload};
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitResponse {
    pub status: u16,
    pub body: Value,
}

impl SubmitResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one submission and parses the reply as JSON. Any HTTP status is a
/// response; only transport failures and unparsable bodies are errors.
#[async_trait]
pub trait SubmitTransport: Send + Sync {
    async fn submit(&self, payload: &FormPayload) -> Result<SubmitResponse, SubmitError>;
}

pub struct HttpSubmitTransport {
    http: Client,
    endpoint: Url,
}

impl HttpSubmitTransport {
    pub fn new(endpoint: Url) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(http: Client, endpoint: Url) -> Self {
        Self { http, endpoint }
    }
}

pub fn multipart_form(payload: &FormPayload) -> Form {
    payload
        .entries()
        .iter()
        .fold(Form::new(), |form, entry| {
            form.text(entry.name.clone(), entry.value.clone())
        })
}

#[async_trait]
impl SubmitTransport for HttpSubmitTransport {
    async fn submit(&self, payload: &FormPayload) -> Result<SubmitResponse, SubmitError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .multipart(multipart_form(payload))
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;
        let body = serde_json::from_slice(&bytes).map_err(|e| SubmitError::Decode(e.to_string()))?;

        Ok(SubmitResponse { status, body })
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
