use super::query::Query;
use super::transport_error;
use crate::errors::SyncError;
use crate::models::agent::Agent;
use crate::models::ticket::{SearchResults, Ticket};
use crate::sync::TicketSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::debug;

/// Freshdesk returns search results 30 at a time and stops serving after page 10.
const PAGE_SIZE: usize = 30;
const MAX_PAGES: u32 = 10;

pub struct FreshdeskClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FreshdeskClient {
    pub fn new(domain: &str, api_key: &str) -> Self {
        Self::with_base_url(format!("https://{}.freshdesk.com", domain), api_key)
    }

    pub fn with_base_url(base_url: String, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub async fn me(&self) -> Result<Agent> {
        let url = format!("{}/api/v2/agents/me", self.base_url);

        let agent = self
            .get(&url)
            .await?
            .json::<Agent>()
            .await
            .context("Failed to parse Freshdesk agent response")?;

        Ok(agent)
    }

    pub async fn search_tickets(&self, query: &Query) -> Result<Vec<Ticket>> {
        let encoded = urlencoding::encode(&format!("\"{}\"", query)).into_owned();
        let mut tickets = Vec::new();

        for page in 1..=MAX_PAGES {
            let url = format!(
                "{}/api/v2/search/tickets?query={}&page={}",
                self.base_url, encoded, page
            );
            debug!(target: "freshdesk", %query, page, "Searching tickets");

            let results = self
                .get(&url)
                .await?
                .json::<SearchResults>()
                .await
                .context("Failed to parse Freshdesk search response")?;

            let fetched = results.results.len();
            tickets.extend(results.results);

            if fetched < PAGE_SIZE || tickets.len() >= results.total {
                break;
            }
        }

        Ok(tickets)
    }

    pub async fn view_ticket(&self, id: u64) -> Result<Ticket> {
        let url = format!("{}/api/v2/tickets/{}", self.base_url, id);

        let response = match self.get(&url).await {
            Err(e) if is_not_found(&e) => return Err(SyncError::FreshdeskTicketNotFound(id).into()),
            other => other?,
        };

        let ticket = response
            .json::<Ticket>()
            .await
            .context("Failed to parse Freshdesk ticket response")?;

        Ok(ticket)
    }

    async fn get(&self, url: &str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .basic_auth(&self.api_key, Some("X"))
            .send()
            .await
            .map_err(|e| transport_error(e, "Failed to send request to Freshdesk"))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let err = match status.as_u16() {
            code @ (401 | 403) => SyncError::FreshdeskAuthFailed(code),
            code => SyncError::FreshdeskApiError(code, text),
        };
        Err(err.into())
    }
}

#[async_trait]
impl TicketSource for FreshdeskClient {
    async fn current_agent(&self) -> Result<Agent> {
        self.me().await
    }

    async fn search_tickets(&self, query: &Query) -> Result<Vec<Ticket>> {
        FreshdeskClient::search_tickets(self, query).await
    }

    async fn view_ticket(&self, id: u64) -> Result<Ticket> {
        FreshdeskClient::view_ticket(self, id).await
    }
}

fn is_not_found(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<SyncError>(),
        Some(SyncError::FreshdeskApiError(404, _))
    )
}
