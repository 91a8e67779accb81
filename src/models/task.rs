use crate::errors::SyncError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_deleted: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Item {
    pub id: String,
    pub content: String,
    pub project_id: String,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub is_deleted: bool,
}

/// A queued write for the Todoist sync endpoint.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    ItemAdd {
        uuid: String,
        temp_id: String,
        args: ItemAddArgs,
    },
    ItemClose {
        uuid: String,
        args: ItemCloseArgs,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ItemAddArgs {
    pub content: String,
    pub project_id: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ItemCloseArgs {
    pub id: String,
}

impl Command {
    pub fn uuid(&self) -> &str {
        match self {
            Command::ItemAdd { uuid, .. } | Command::ItemClose { uuid, .. } => uuid,
        }
    }
}

/// Response body of `POST /sync/v9/sync`.
#[derive(Debug, Default, Deserialize)]
pub struct SyncResponse {
    pub sync_token: String,
    #[serde(default)]
    pub full_sync: bool,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub temp_id_mapping: HashMap<String, String>,
    #[serde(default)]
    pub sync_status: HashMap<String, serde_json::Value>,
}

/// Local copy of the Todoist account. Every lookup is a scan over this
/// state; writes are applied locally and queued until the next commit.
#[derive(Debug, Default)]
pub struct Mirror {
    sync_token: Option<String>,
    projects: Vec<Project>,
    items: Vec<Item>,
    queue: Vec<Command>,
}

impl Mirror {
    /// Token to send with the next request, `*` before the first sync.
    pub fn sync_token(&self) -> &str {
        self.sync_token.as_deref().unwrap_or("*")
    }

    /// Folds a sync response into the mirror.
    pub fn merge(&mut self, response: SyncResponse) {
        if response.full_sync {
            self.projects.clear();
            self.items.clear();
        }

        for item in &mut self.items {
            if let Some(real_id) = response.temp_id_mapping.get(&item.id) {
                item.id = real_id.clone();
            }
        }

        for project in response.projects {
            self.projects.retain(|p| p.id != project.id);
            if !project.is_deleted {
                self.projects.push(project);
            }
        }

        for item in response.items {
            let existing = self.items.iter().position(|i| i.id == item.id);
            match (existing, item.is_deleted) {
                (Some(idx), true) => {
                    self.items.remove(idx);
                }
                (Some(idx), false) => self.items[idx] = item,
                (None, false) => self.items.push(item),
                (None, true) => {}
            }
        }

        self.sync_token = Some(response.sync_token);
    }

    pub fn find_project_by_name(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name == name)
    }

    pub fn find_items_by_content(&self, content: &str) -> Vec<&Item> {
        self.items.iter().filter(|i| i.content == content).collect()
    }

    pub fn find_items_by_project(&self, project_id: &str) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|i| i.project_id == project_id)
            .collect()
    }

    /// Adds an item under a temp id and queues its creation. Returns the temp id.
    pub fn add_item(&mut self, content: &str, project_id: &str) -> String {
        let temp_id = uuid::Uuid::new_v4().to_string();

        self.items.push(Item {
            id: temp_id.clone(),
            content: content.to_string(),
            project_id: project_id.to_string(),
            checked: false,
            is_deleted: false,
        });
        self.queue.push(Command::ItemAdd {
            uuid: uuid::Uuid::new_v4().to_string(),
            temp_id: temp_id.clone(),
            args: ItemAddArgs {
                content: content.to_string(),
                project_id: project_id.to_string(),
            },
        });

        temp_id
    }

    pub fn close_item(&mut self, id: &str) -> Result<(), SyncError> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| SyncError::TaskNotFound(id.to_string()))?;

        item.checked = true;
        self.queue.push(Command::ItemClose {
            uuid: uuid::Uuid::new_v4().to_string(),
            args: ItemCloseArgs { id: id.to_string() },
        });

        Ok(())
    }

    pub fn pending(&self) -> &[Command] {
        &self.queue
    }

    pub fn clear_pending(&mut self) {
        self.queue.clear();
    }
}
