use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Record, required_text};
use crate::error::DomainError;

/// Direct message between two users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(sender_id: Uuid, recipient_id: Uuid, body: &str) -> Result<Self, DomainError> {
        if sender_id == recipient_id {
            return Err(DomainError::validation("cannot message yourself"));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            sender_id,
            recipient_id,
            body: required_text("body", body, 4000)?,
            read: false,
            created_at: Utc::now(),
        })
    }

    /// Only the recipient can mark a message as read.
    pub fn mark_read(&mut self, reader: Uuid) -> Result<(), DomainError> {
        if reader != self.recipient_id {
            return Err(DomainError::Forbidden(
                "only the recipient can mark a message read".to_string(),
            ));
        }
        self.read = true;
        Ok(())
    }

    pub fn involves(&self, user_id: Uuid) -> bool {
        self.sender_id == user_id || self.recipient_id == user_id
    }
}

impl Record for Message {
    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
