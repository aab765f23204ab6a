use crate::types::ids::ChatId;
use crate::types::wire::WireObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "WireObject")]
pub struct Chat {
    pub id: ChatId,
    pub participants: Vec<Participant>,
    pub last_message: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<WireObject> for Chat {
    type Error = String;

    fn try_from(wire: WireObject) -> Result<Self, Self::Error> {
        let id = wire
            .string(&["id", "_id"])
            .ok_or_else(|| "chat has no id".to_string())?;
        Ok(Self {
            id: ChatId::new(id).map_err(|err| err.to_string())?,
            participants: wire.items(&["participants"]),
            last_message: wire.text(&["lastMessage"]),
            updated_at: wire.timestamp(&["updatedAt"]),
        })
    }
}

impl Chat {
    pub fn has_participant(&self, participant_id: &str) -> bool {
        self.participants
            .iter()
            .any(|participant| participant.id.as_deref() == Some(participant_id))
    }

    /// The first participant that is not `me`, used as the chat title.
    pub fn counterpart(&self, me: Option<&str>) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|participant| me.is_none() || participant.id.as_deref() != me)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "WireObject")]
pub struct Participant {
    pub id: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
}

impl From<WireObject> for Participant {
    fn from(wire: WireObject) -> Self {
        Self {
            id: wire.string(&["id", "_id", "userId"]),
            name: wire.text(&["name"]),
            role: wire.text(&["role"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "WireObject")]
pub struct Message {
    pub id: Option<String>,
    pub chat_id: Option<String>,
    pub sender_id: Option<String>,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl TryFrom<WireObject> for Message {
    type Error = String;

    fn try_from(wire: WireObject) -> Result<Self, Self::Error> {
        Ok(Self {
            id: wire.string(&["id", "_id"]),
            chat_id: wire.string(&["chatId", "chat"]),
            sender_id: wire.string(&["senderId", "sender"]),
            text: wire
                .text(&["text"])
                .ok_or_else(|| "message has no text".to_string())?,
            created_at: wire.timestamp(&["createdAt"]),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendMessageInput {
    pub text: String,
}
