use colored::*;
use std::fmt;

#[derive(Debug)]
pub enum SyncError {
    // Configuration errors
    ConfigMissing { flag: &'static str, env: &'static str },
    ConfigInvalid(String),
    ProjectNotFound(String),

    // Freshdesk errors
    FreshdeskAuthFailed(u16),
    FreshdeskTicketNotFound(u64),
    FreshdeskApiError(u16, String),

    // Todoist errors
    TodoistAuthFailed(u16),
    TodoistApiError(u16, String),
    TodoistCommandFailed { uuid: String, error: String },
    TaskNotFound(String),

    // Network errors
    NetworkError(String),

    // Internal
    InvalidTicketRef(String),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Configuration errors
            SyncError::ConfigMissing { flag, env } => {
                write!(f, "{}\n", format!("Missing required setting --{}", flag).red().bold())?;
                write!(f, "   {}\n\n", "ttsync needs this value before it can talk to either service".dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Pass it on the command line: {}\n", format!("--{} <value>", flag).green())?;
                write!(f, "   2. Or export it: {}\n", format!("{}=<value>", env).green())?;
                write!(f, "   3. Or add it to ~/.ttsync/config.toml")
            }
            SyncError::ConfigInvalid(msg) => {
                write!(f, "{}\n", "Invalid configuration".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Check your config file: ~/.ttsync/config.toml\n")?;
                write!(f, "   2. Or pass the settings as flags/environment variables")
            }
            SyncError::ProjectNotFound(name) => {
                write!(f, "{}\n", format!("Couldn't find the Freshdesk list '{}' in Todoist", name).red().bold())?;
                write!(f, "   {}\n\n", "Project names are matched exactly, including case".dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Create a project named '{}' in Todoist\n", name)?;
                write!(f, "   2. Or point {} at an existing project", "TODOIST_FRESHDESK_LIST".green())
            }

            // Freshdesk errors
            SyncError::FreshdeskAuthFailed(status) => {
                write!(f, "{}\n", format!("Freshdesk authentication failed ({})", status).red().bold())?;
                write!(f, "   {}\n\n", "Your API key may be wrong or the domain may not match it".dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Copy the key from your Freshdesk 'Profile Settings' page\n")?;
                write!(f, "   2. Check the domain: {}", "<domain>.freshdesk.com".cyan())
            }
            SyncError::FreshdeskTicketNotFound(id) => {
                write!(f, "{}\n", format!("Ticket #{} not found", id).red().bold())?;
                write!(f, "   {}", "The ticket doesn't exist or you don't have access to it".dimmed())
            }
            SyncError::FreshdeskApiError(status, msg) => {
                write!(f, "{}\n", format!("Freshdesk API error ({})", status).red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   Try again or check your network connection")
            }

            // Todoist errors
            SyncError::TodoistAuthFailed(status) => {
                write!(f, "{}\n", format!("Todoist authentication failed ({})", status).red().bold())?;
                write!(f, "   {}\n\n", "Your API token is invalid or has been revoked".dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Copy the token from Todoist: Settings > Integrations > Developer\n")?;
                write!(f, "   2. Update {}", "TODOIST_APIKEY".green())
            }
            SyncError::TodoistApiError(status, msg) => {
                write!(f, "{}\n", format!("Todoist API error ({})", status).red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   Try again or check your network connection")
            }
            SyncError::TodoistCommandFailed { uuid, error } => {
                write!(f, "{}\n", "Todoist rejected a queued change".red().bold())?;
                write!(f, "   {}", format!("command {}: {}", uuid, error).dimmed())
            }
            SyncError::TaskNotFound(id) => {
                write!(f, "{}\n", format!("Task '{}' is not in the local Todoist mirror", id).red().bold())?;
                write!(f, "   {}", "Could not mark task completed".dimmed())
            }

            // Network errors
            SyncError::NetworkError(msg) => {
                write!(f, "{}\n", "Network error".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Check your internet connection\n")?;
                write!(f, "   2. Verify you can reach the API endpoints\n")?;
                write!(f, "   3. Run ttsync again")
            }

            SyncError::InvalidTicketRef(raw) => {
                write!(f, "{}\n", "Could not convert ticket number to int".red().bold())?;
                write!(f, "   {}", format!("task content starts with '{}'", raw).dimmed())
            }
        }
    }
}

impl std::error::Error for SyncError {}

impl SyncError {
    /// Classifies a transport failure that never produced an HTTP status.
    pub fn from_transport(err: &reqwest::Error) -> Option<Self> {
        if err.is_timeout() || err.is_connect() {
            Some(SyncError::NetworkError(err.to_string()))
        } else {
            None
        }
    }
}
