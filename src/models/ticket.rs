use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Ticket {
    pub id: u64,
    pub subject: String,
    pub status: TicketStatus,
    /// Agent the ticket is assigned to. `None` when unassigned.
    #[serde(default)]
    pub responder_id: Option<u64>,
}

impl Ticket {
    /// Open and assigned to `agent_id`.
    pub fn is_open_for(&self, agent_id: u64) -> bool {
        self.status == TicketStatus::Open && self.responder_id == Some(agent_id)
    }
}

/// Freshdesk ticket status. Custom statuses configured on the helpdesk
/// come through as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "u8")]
pub enum TicketStatus {
    Open,
    Pending,
    Resolved,
    Closed,
    Other(u8),
}

impl From<u8> for TicketStatus {
    fn from(code: u8) -> Self {
        match code {
            2 => TicketStatus::Open,
            3 => TicketStatus::Pending,
            4 => TicketStatus::Resolved,
            5 => TicketStatus::Closed,
            other => TicketStatus::Other(other),
        }
    }
}

impl From<TicketStatus> for u8 {
    fn from(status: TicketStatus) -> Self {
        match status {
            TicketStatus::Open => 2,
            TicketStatus::Pending => 3,
            TicketStatus::Resolved => 4,
            TicketStatus::Closed => 5,
            TicketStatus::Other(code) => code,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchResults {
    pub results: Vec<Ticket>,
    #[serde(default)]
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_deserialization() {
        let json = r#"{
            "id": 7,
            "subject": "Fix printer",
            "status": 4,
            "priority": 1,
            "responder_id": 42,
            "requester_id": 1001
        }"#;

        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.id, 7);
        assert_eq!(ticket.subject, "Fix printer");
        assert_eq!(ticket.status, TicketStatus::Resolved);
        assert_eq!(ticket.responder_id, Some(42));
    }

    #[test]
    fn test_unassigned_ticket() {
        let json = r#"{ "id": 8, "subject": "Nobody's", "status": 2, "responder_id": null }"#;
        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.responder_id, None);
        assert!(!ticket.is_open_for(42));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(TicketStatus::from(2), TicketStatus::Open);
        assert_eq!(TicketStatus::from(3), TicketStatus::Pending);
        assert_eq!(TicketStatus::from(5), TicketStatus::Closed);
        assert_eq!(TicketStatus::from(6), TicketStatus::Other(6));
        assert_eq!(u8::from(TicketStatus::Open), 2);
    }

    #[test]
    fn test_is_open_for() {
        let ticket = Ticket {
            id: 11,
            subject: "Reassigned".to_string(),
            status: TicketStatus::Open,
            responder_id: Some(99),
        };
        assert!(ticket.is_open_for(99));
        assert!(!ticket.is_open_for(42));

        let pending = Ticket {
            status: TicketStatus::Pending,
            ..ticket
        };
        assert!(!pending.is_open_for(99));
    }
}
