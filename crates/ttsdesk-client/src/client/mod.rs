//! Client for the Coqui TTS server HTTP API.

mod catalog;
mod synthesis;

use reqwest::StatusCode;
use url::Url;

use crate::config::TtsClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::parsing::extract_error_message;
use crate::url::parse_base_url;

/// HTTP client for one TTS server.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct TtsClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base: Url,
    pub(crate) config: TtsClientConfig,
}

impl TtsClient {
    /// Create a client for the server described by `config`.
    pub(crate) fn build(config: &TtsClientConfig) -> ClientResult<Self> {
        let base = parse_base_url(&config.base_url)?;
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.request_timeout)
            .timeout(config.transfer_timeout)
            .build()?;

        Ok(Self {
            http,
            base,
            config: config.clone(),
        })
    }

    /// Server root this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base
    }
}

/// Turn a non-200 response into `ClientError::Status`, reading whatever
/// error text the body carries.
pub(crate) async fn status_error(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let message = response
        .bytes()
        .await
        .ok()
        .and_then(|body| extract_error_message(&body));
    ClientError::Status {
        status: status.as_u16(),
        message,
    }
}

pub(crate) fn is_ok(status: StatusCode) -> bool {
    status == StatusCode::OK
}
