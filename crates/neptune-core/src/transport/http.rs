//! HTTP transport - posts form-encoded orders to the game server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::COOKIE;
use serde_json::Value;

use super::{Credentials, Transport};
use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// Default transport backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/trequest/{}", self.base_url, endpoint)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        credentials: &Credentials,
    ) -> Result<Value> {
        let url = self.url(endpoint);

        let mut form: Vec<(&str, String)> =
            vec![("type", endpoint.to_string()), ("version", String::new())];
        form.extend(params.iter().cloned());

        tracing::debug!(endpoint = %endpoint, url = %url, "Sending request");

        let response = self
            .client
            .post(&url)
            .header(COOKIE, credentials.cookie_header())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(endpoint = %endpoint, status = status.as_u16(), "Request failed");
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Value = serde_json::from_str(&body)?;
        decode_envelope(endpoint, envelope)
    }
}

/// Unwrap the `{"event": ..., "report": ...}` envelope the server answers with.
pub fn decode_envelope(endpoint: &str, envelope: Value) -> Result<Value> {
    let Value::Object(mut map) = envelope else {
        return Err(Error::Malformed(format!("{} response is not an object", endpoint)));
    };

    let event = map
        .get("event")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let report = map.remove("report");

    if event.ends_with(":error") {
        let message = match report {
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => "unknown error".to_string(),
        };
        return Err(Error::Api {
            endpoint: endpoint.to_string(),
            message,
        });
    }

    report.ok_or_else(|| Error::Malformed(format!("`{}` response has no report", event)))
}
