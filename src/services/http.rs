// services/http.rs
use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::error;

use crate::config::ClientConfig;
use crate::errors::{Result, SgaError};
use crate::services::transport::{Method, Transport, WebRequest, SESSION_HEADER_NAME};

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SgaError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(HttpTransport { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, request: WebRequest) -> Result<String> {
        let method = request.method.resolve(request.form.as_ref());

        let mut builder = match method {
            Method::Get | Method::Default => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
            Method::Put => self.client.put(&request.url),
            Method::Delete => self.client.delete(&request.url),
        };

        builder = builder.header(header::CONTENT_TYPE, "text/json");
        if let Some(session) = &request.session {
            builder = builder.header(SESSION_HEADER_NAME, session);
        }
        if method != Method::Get {
            builder = builder.body(request.form_json());
        }

        let response = builder.send().await.map_err(|e| {
            error!("{} {} failed: {}", method.as_str(), request.url, e);
            SgaError::transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("{} {} returned {} - {}", method.as_str(), request.url, status, body);
            return Err(SgaError::transport(status.to_string()));
        }

        Ok(response.text().await?)
    }
}
