use serde::Deserialize;

/// The Freshdesk agent the API key belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct Agent {
    pub id: u64,
    pub contact: Contact,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Agent {
    pub fn name(&self) -> &str {
        &self.contact.name
    }
}
