//! One-shot reconciliation of Freshdesk tickets against a Todoist project.
//!
//! Open tickets assigned to the current agent get a task; tasks whose ticket
//! is gone, no longer open or assigned to someone else get checked off.

use crate::api::query::Query;
use crate::config::settings::Settings;
use crate::errors::SyncError;
use crate::models::agent::Agent;
use crate::models::task::Mirror;
use crate::models::ticket::{Ticket, TicketStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{info, warn};

#[async_trait]
pub trait TicketSource: Send + Sync {
    async fn current_agent(&self) -> Result<Agent>;
    async fn search_tickets(&self, query: &Query) -> Result<Vec<Ticket>>;
    async fn view_ticket(&self, id: u64) -> Result<Ticket>;
}

#[async_trait]
pub trait TaskStore: Send {
    async fn full_sync(&mut self) -> Result<()>;
    fn mirror(&self) -> &Mirror;
    fn mirror_mut(&mut self) -> &mut Mirror;
    /// Pushes the mirror's queued commands to the remote service.
    async fn commit(&mut self) -> Result<()>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub closed: usize,
}

/// `assignee == agent AND status == open`
pub fn open_tickets_for(agent_id: u64) -> Query {
    Query::all_of([
        Query::field("agent_id").equals(agent_id),
        Query::field("status").equals(u8::from(TicketStatus::Open)),
    ])
}

pub fn task_content(ticket: &Ticket, link_domain: &str) -> String {
    format!(
        "#{}: [{}](https://{}/a/tickets/{})",
        ticket.id, ticket.subject, link_domain, ticket.id
    )
}

/// Ticket id from a leading `#<digits>`, or `None` for content we don't manage.
pub fn parse_ticket_ref(content: &str) -> Result<Option<u64>, SyncError> {
    static TICKET_REF: OnceLock<Regex> = OnceLock::new();
    let re = TICKET_REF.get_or_init(|| Regex::new(r"^#([0-9]+)").expect("valid ticket ref pattern"));

    let Some(caps) = re.captures(content) else {
        return Ok(None);
    };
    let digits = &caps[1];
    digits
        .parse::<u64>()
        .map(Some)
        .map_err(|_| SyncError::InvalidTicketRef(caps[0].to_string()))
}

/// A failed lookup counts as a deleted ticket.
pub fn needs_closure(lookup: &Result<Ticket>, agent_id: u64) -> bool {
    match lookup {
        Err(_) => true,
        Ok(ticket) => !ticket.is_open_for(agent_id),
    }
}

pub async fn run<T, S>(settings: &Settings, freshdesk: &T, todoist: &mut S) -> Result<SyncReport>
where
    T: TicketSource + ?Sized,
    S: TaskStore + ?Sized,
{
    info!(target: "freshdesk", "Downloading tickets");
    let agent = freshdesk.current_agent().await?;
    info!(target: "freshdesk", "Current agent: {} ({})", agent.name(), agent.id);

    info!(target: "freshdesk", "Finding tickets for current agent");
    let tickets = freshdesk.search_tickets(&open_tickets_for(agent.id)).await?;
    info!(target: "freshdesk", count = tickets.len(), "Found open tickets");

    info!(target: "todoist", "Downloading todoist account data");
    todoist.full_sync().await?;

    let project = todoist
        .mirror()
        .find_project_by_name(&settings.todoist_list)
        .cloned()
        .ok_or_else(|| SyncError::ProjectNotFound(settings.todoist_list.clone()))?;
    info!(target: "todoist", "Found target project {} (id: {})", project.name, project.id);

    let mut report = SyncReport::default();
    let link_domain = settings.link_domain();

    // Exact content match: a ticket whose subject changed gets a second task.
    for ticket in &tickets {
        let content = task_content(ticket, &link_domain);
        if todoist.mirror().find_items_by_content(&content).is_empty() {
            info!(target: "todoist", "Task not found for ticket {}. Creating...", ticket.id);
            todoist.mirror_mut().add_item(&content, &project.id);
            report.created += 1;
        }
    }

    // New items only get real ids once committed.
    if report.created > 0 {
        todoist.commit().await.context("Could not create task!")?;
    }

    let candidates: Vec<(String, String)> = todoist
        .mirror()
        .find_items_by_project(&project.id)
        .into_iter()
        .filter(|item| !item.checked)
        .map(|item| (item.id.clone(), item.content.clone()))
        .collect();

    for (item_id, content) in candidates {
        let Some(ticket_id) = parse_ticket_ref(&content)? else {
            continue;
        };

        info!(target: "freshdesk", "Looking up ticket #{}", ticket_id);
        let lookup = freshdesk.view_ticket(ticket_id).await;
        if let Err(e) = &lookup {
            warn!(
                target: "freshdesk",
                ticket = ticket_id,
                error = %e,
                "Could not find ticket. Marking item closed (ticket may have been deleted)"
            );
        }

        if needs_closure(&lookup, agent.id) {
            info!(target: "todoist", "Marking task for resolved ticket #{} complete", ticket_id);
            todoist
                .mirror_mut()
                .close_item(&item_id)
                .context("Could not mark task completed!")?;
            report.closed += 1;
        }
    }

    info!(target: "todoist", "Syncing updated data to Todoist");
    todoist.commit().await?;

    info!(
        target: "todoist",
        created = report.created,
        closed = report.closed,
        "Done"
    );
    Ok(report)
}
