use crate::types::{ChatId, RequestRecord, RequestStatus, UiEntry, UiState, UiStateMap};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

pub fn ui_state_for(status: RequestStatus) -> UiState {
    match status {
        RequestStatus::Accepted => UiState::Approved,
        RequestStatus::Declined => UiState::Declined,
        RequestStatus::Pending => UiState::Pending,
    }
}

pub fn entry_for(record: &RequestRecord) -> UiEntry {
    let state = ui_state_for(record.status);
    let chat_id = match state {
        UiState::Approved => record
            .chat_id
            .as_deref()
            .and_then(|raw| ChatId::new(raw.trim()).ok()),
        UiState::Pending | UiState::Declined => None,
    };
    UiEntry { state, chat_id }
}

/// Collapses request records into one display state per target.
///
/// Records without a usable target id are skipped. For a target with several
/// records the most recent one decides: greatest `updated_at` (else
/// `created_at`), untimestamped records rank below timestamped ones, and ties
/// go to the record that appears later in `records`.
pub fn map_requests<'a, I>(records: I) -> UiStateMap
where
    I: IntoIterator<Item = &'a RequestRecord>,
{
    let mut latest: HashMap<&'a str, (Option<DateTime<Utc>>, &'a RequestRecord)> = HashMap::new();
    for record in records {
        let Some(target) = record.target() else {
            continue;
        };
        let changed = record.last_changed();
        let newer = latest
            .get(target)
            .is_none_or(|(seen, _)| *seen <= changed);
        if newer {
            latest.insert(target, (changed, record));
        }
    }

    let mut map = UiStateMap::new();
    for (target, (_, record)) in latest {
        map.insert(target, entry_for(record));
    }
    map
}
