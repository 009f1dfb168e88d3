use super::{FetchedResponse, Transport, TransportError};
use crate::config::ClientConfig;
use reqwest::blocking::{Client, Request};
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use std::time::Duration;

/// The default [`Transport`]: a blocking reqwest client that never follows
/// HTTP redirects and keeps no cookies.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds a transport from `config`.
    ///
    /// Must not be called from inside an async runtime; reqwest's blocking
    /// client drives its own.
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            // Goto documents are the only redirects the resolver follows
            .redirect(Policy::none())
            .timeout(config.timeout_secs.map(Duration::from_secs))
            .connect_timeout(config.connect_timeout_secs.map(Duration::from_secs))
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
            .build()?;

        tracing::debug!(?config, "Built HTTP transport");
        Ok(Self { client })
    }

    /// Wraps an existing client. The caller is responsible for disabling
    /// redirect following on it.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: Request) -> Result<FetchedResponse, TransportError> {
        Transport::execute(&self.client, request)
    }
}

impl Transport for Client {
    fn execute(&self, request: Request) -> Result<FetchedResponse, TransportError> {
        let response = Client::execute(self, request)?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

        Ok(FetchedResponse {
            status: response.status(),
            content_type,
            body: Box::new(response),
        })
    }
}
