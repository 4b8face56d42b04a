use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::visibility::{OwnedRecord, Owner};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub is_done: bool,
    pub date: Option<DateTime<Utc>>,
    pub owner: Owner,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedRecord for Todo {
    fn owner(&self) -> &Owner {
        &self.owner
    }
}
