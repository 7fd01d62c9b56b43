use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

use super::error::UnitError;
use super::traits::FastUnit;
use super::types::UnitResponse;
use crate::config::WarehouseConfig;
use crate::event::IngestionEvent;

/// Terminal-tier unit that registers an object with the warehouse ingest
/// API.
///
/// The object key's prefix selects the ingest pipe; the longest configured
/// prefix wins. The file itself is not moved, the warehouse pulls it from
/// the application container.
pub struct WarehouseLoadUnit {
    account_url: String,
    auth_token: String,
    pipes: HashMap<String, String>,
    client: reqwest::Client,
}

impl WarehouseLoadUnit {
    pub fn new(config: &WarehouseConfig) -> Result<Self, UnitError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UnitError::Transport(e.to_string()))?;

        Ok(Self {
            account_url: config.account_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
            pipes: config.pipes.clone(),
            client,
        })
    }

    /// Pick the ingest pipe for a key. Longest matching prefix wins.
    pub fn pipe_for_key(&self, object_key: &str) -> Option<&str> {
        self.pipes
            .iter()
            .filter(|(prefix, _)| object_key.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, pipe)| pipe.as_str())
    }
}

#[async_trait]
impl FastUnit for WarehouseLoadUnit {
    fn label(&self) -> &str {
        "model_load"
    }

    async fn invoke(&self, event: &IngestionEvent) -> Result<UnitResponse, UnitError> {
        let pipe = self
            .pipe_for_key(&event.object_key)
            .ok_or_else(|| UnitError::NoPipeForKey {
                object_key: event.object_key.clone(),
            })?;

        let url = format!("{}/v1/data/pipes/{}/insertFiles", self.account_url, pipe);
        let body = json!({
            "files": [{ "path": event.object_key }],
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.auth_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| UnitError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(UnitError::Warehouse {
                status: status.as_u16(),
                detail,
            });
        }

        tracing::info!(pipe = %pipe, object_key = %event.object_key, "registered file with warehouse");

        Ok(UnitResponse::ok(format!(
            "registered {} with pipe {}",
            event.object_key, pipe
        )))
    }
}
