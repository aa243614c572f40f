//! Model, speaker and language listings plus the liveness probe.

use tracing::debug;

use super::{TtsClient, is_ok};
use crate::error::{ClientError, ClientResult};
use crate::parsing::parse_string_list;
use crate::url::endpoint;

impl TtsClient {
    /// `GET <path>` and decode a JSON string array.
    pub(crate) async fn get_string_list(&self, path: &str) -> ClientResult<Vec<String>> {
        let url = endpoint(&self.base, path)?;
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !is_ok(status) {
            return Err(ClientError::InvalidResponse {
                message: format!("{path} returned status {}", status.as_u16()),
            });
        }

        let body = response.bytes().await?;
        parse_string_list(&body)
    }

    /// Like [`get_string_list`](Self::get_string_list) but any failure
    /// yields an empty list.
    pub(crate) async fn get_string_list_or_empty(&self, path: &str) -> Vec<String> {
        match self.get_string_list(path).await {
            Ok(items) => items,
            Err(e) => {
                debug!(path, error = %e, "listing unavailable");
                Vec::new()
            }
        }
    }

    /// `GET /` within the health timeout; true only on 200.
    pub(crate) async fn probe(&self) -> bool {
        let result = self
            .http
            .get(self.base.clone())
            .timeout(self.config.health_timeout)
            .send()
            .await;

        match result {
            Ok(response) => is_ok(response.status()),
            Err(e) => {
                debug!(error = %e, "health probe failed");
                false
            }
        }
    }
}
