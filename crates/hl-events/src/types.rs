use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub seq: i64,
    pub at: DateTime<Utc>,
    pub source: EventSource,
    pub body: AppEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum EventSource {
    Cli,
    Poller,
    Submitter,
    Responder,
    Session,
    Storage,
}

/// Update channels that stand in for the `*-updated` notifications screens
/// use to ask sibling screens for a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topic {
    LabourHire,
    ContractorHire,
    JobApplication,
    Profile,
}

impl Topic {
    pub fn event_name(self) -> &'static str {
        match self {
            Self::LabourHire => "labour-hire-updated",
            Self::ContractorHire => "contractor-hire-updated",
            Self::JobApplication => "job-application-updated",
            Self::Profile => "profile-updated",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    /// The session regained focus; pollers refresh immediately.
    Focus,
    VisibilityChanged {
        visible: bool,
    },
    RequestsUpdated {
        topic: Topic,
    },
    /// A poll for `topic` was applied to its state map.
    StatesRefreshed {
        topic: Topic,
        poll_seq: u64,
    },
    StorageChanged {
        key: String,
    },
    SessionExpired,
}

impl AppEvent {
    /// Whether a poller listening on `topic` should refresh for this event.
    pub fn triggers_refresh(&self, topic: Topic) -> bool {
        match self {
            Self::Focus => true,
            Self::VisibilityChanged { visible } => *visible,
            Self::RequestsUpdated { topic: updated } => *updated == topic,
            Self::StatesRefreshed { .. } | Self::StorageChanged { .. } | Self::SessionExpired => {
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_triggers_match_topic() {
        let event = AppEvent::RequestsUpdated {
            topic: Topic::LabourHire,
        };
        assert!(event.triggers_refresh(Topic::LabourHire));
        assert!(!event.triggers_refresh(Topic::ContractorHire));
        assert!(AppEvent::Focus.triggers_refresh(Topic::JobApplication));
        assert!(!AppEvent::VisibilityChanged { visible: false }.triggers_refresh(Topic::LabourHire));
        assert!(!AppEvent::SessionExpired.triggers_refresh(Topic::LabourHire));
    }

    #[test]
    fn event_body_is_tagged_json() {
        let json = serde_json::to_value(AppEvent::RequestsUpdated {
            topic: Topic::ContractorHire,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "requests_updated", "topic": "contractor-hire"})
        );
    }
}
