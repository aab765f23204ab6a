use crate::types::enums::UiState;
use crate::types::ids::ChatId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiEntry {
    pub state: UiState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<ChatId>,
}

impl UiEntry {
    pub fn pending() -> Self {
        Self {
            state: UiState::Pending,
            chat_id: None,
        }
    }
}

/// Display state per target id for one screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UiStateMap(BTreeMap<String, UiEntry>);

impl UiStateMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, target_id: &str) -> Option<&UiEntry> {
        self.0.get(target_id)
    }

    pub fn state_of(&self, target_id: &str) -> Option<UiState> {
        self.get(target_id).map(|entry| entry.state)
    }

    pub fn insert(&mut self, target_id: impl Into<String>, entry: UiEntry) {
        self.0.insert(target_id.into(), entry);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UiEntry)> {
        self.0.iter().map(|(target, entry)| (target.as_str(), entry))
    }
}
