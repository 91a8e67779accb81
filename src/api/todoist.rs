use super::transport_error;
use crate::errors::SyncError;
use crate::models::task::{Command, Mirror, SyncResponse};
use crate::sync::TaskStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

pub struct TodoistClient {
    client: Client,
    base_url: String,
    api_token: String,
    mirror: Mirror,
}

impl TodoistClient {
    pub fn new(api_token: &str) -> Self {
        Self::with_base_url("https://api.todoist.com".to_string(), api_token)
    }

    pub fn with_base_url(base_url: String, api_token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
            mirror: Mirror::default(),
        }
    }

    /// Replaces the mirror with everything in the account.
    pub async fn full_sync(&mut self) -> Result<()> {
        let response = self.sync("*", r#"["all"]"#, None).await?;
        debug!(
            target: "todoist",
            projects = response.projects.len(),
            items = response.items.len(),
            "Full sync received"
        );

        let mut mirror = Mirror::default();
        mirror.merge(SyncResponse {
            full_sync: true,
            ..response
        });
        self.mirror = mirror;

        Ok(())
    }

    /// Sends every queued command. Nothing is sent when the queue is empty.
    pub async fn commit(&mut self) -> Result<()> {
        if self.mirror.pending().is_empty() {
            return Ok(());
        }

        let commands = serde_json::to_string(self.mirror.pending())
            .context("Failed to serialize Todoist commands")?;
        let response = self
            .sync(
                self.mirror.sync_token(),
                r#"["items","projects"]"#,
                Some(&commands),
            )
            .await?;

        check_sync_status(self.mirror.pending(), &response)?;

        self.mirror.clear_pending();
        self.mirror.merge(response);

        Ok(())
    }

    async fn sync(
        &self,
        sync_token: &str,
        resource_types: &str,
        commands: Option<&str>,
    ) -> Result<SyncResponse> {
        let url = format!("{}/sync/v9/sync", self.base_url);

        let mut form = vec![
            ("sync_token", sync_token),
            ("resource_types", resource_types),
        ];
        if let Some(commands) = commands {
            form.push(("commands", commands));
        }

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .form(&form)
            .send()
            .await
            .map_err(|e| transport_error(e, "Failed to send request to Todoist"))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = match status.as_u16() {
                code @ (401 | 403) => SyncError::TodoistAuthFailed(code),
                code => SyncError::TodoistApiError(code, text),
            };
            return Err(err.into());
        }

        let body = response
            .json::<SyncResponse>()
            .await
            .context("Failed to parse Todoist sync response")?;

        Ok(body)
    }
}

#[async_trait]
impl TaskStore for TodoistClient {
    async fn full_sync(&mut self) -> Result<()> {
        TodoistClient::full_sync(self).await
    }

    fn mirror(&self) -> &Mirror {
        &self.mirror
    }

    fn mirror_mut(&mut self) -> &mut Mirror {
        &mut self.mirror
    }

    async fn commit(&mut self) -> Result<()> {
        TodoistClient::commit(self).await
    }
}

fn check_sync_status(commands: &[Command], response: &SyncResponse) -> Result<(), SyncError> {
    for command in commands {
        let uuid = command.uuid();
        match response.sync_status.get(uuid) {
            Some(serde_json::Value::String(s)) if s == "ok" => {}
            Some(status) => {
                let error = status["error"]
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| status.to_string());
                return Err(SyncError::TodoistCommandFailed {
                    uuid: uuid.to_string(),
                    error,
                });
            }
            None => {
                return Err(SyncError::TodoistCommandFailed {
                    uuid: uuid.to_string(),
                    error: "no status returned".to_string(),
                });
            }
        }
    }
    Ok(())
}
