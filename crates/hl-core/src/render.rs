//! Card rendering for listing screens: filtering, sorting and the per-card
//! action button derived from the UI state map.

use crate::types::{ChatId, Listing, ListingKind, UiEntry, UiState, UiStateMap};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    AsFetched,
    Title,
    City,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub city: Option<String>,
    pub category: Option<String>,
    pub sort: SortOrder,
}

fn normalized(value: &str) -> String {
    value.trim().to_lowercase()
}

fn field_matches(wanted: Option<&String>, actual: Option<&str>) -> bool {
    let Some(wanted) = wanted.map(|value| normalized(value)).filter(|v| !v.is_empty()) else {
        return true;
    };
    actual.is_some_and(|actual| normalized(actual) == wanted)
}

impl ListFilter {
    pub fn matches<L: Listing>(&self, item: &L) -> bool {
        field_matches(self.city.as_ref(), item.city())
            && field_matches(self.category.as_ref(), item.category())
    }

    pub fn apply<'a, L: Listing>(&self, items: &'a [L]) -> Vec<&'a L> {
        let mut kept: Vec<&L> = items.iter().filter(|item| self.matches(*item)).collect();
        match self.sort {
            SortOrder::AsFetched => {}
            SortOrder::Title => kept.sort_by_key(|item| normalized(item.title())),
            SortOrder::City => kept.sort_by(|a, b| compare_city(a.city(), b.city())),
        }
        kept
    }
}

/// Missing cities sort last.
fn compare_city(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => normalized(a).cmp(&normalized(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub label: &'static str,
    pub enabled: bool,
    /// Where an enabled `Chat` button navigates.
    pub chat_id: Option<ChatId>,
}

pub fn action_for(kind: ListingKind, entry: Option<&UiEntry>) -> ActionButton {
    let (label, enabled, chat_id) = match entry {
        None => {
            let label = match kind {
                ListingKind::Jobs => "Apply",
                ListingKind::Labours | ListingKind::Contractors => "Hire",
            };
            (label, true, None)
        }
        Some(UiEntry {
            state: UiState::Pending,
            ..
        }) => {
            let label = match kind {
                ListingKind::Jobs => "Applied",
                ListingKind::Labours | ListingKind::Contractors => "Requested",
            };
            (label, false, None)
        }
        Some(UiEntry {
            state: UiState::Approved,
            chat_id: Some(chat_id),
        }) => ("Chat", true, Some(chat_id.clone())),
        Some(UiEntry {
            state: UiState::Approved,
            chat_id: None,
        }) => ("Approved", false, None),
        Some(UiEntry {
            state: UiState::Declined,
            ..
        }) => ("Declined", false, None),
    };
    ActionButton {
        label,
        enabled,
        chat_id,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card<'a, L> {
    pub item: &'a L,
    pub state: Option<UiState>,
    pub action: ActionButton,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderedList<'a, L> {
    Cards(Vec<Card<'a, L>>),
    Empty { message: String },
}

impl<L> RenderedList<'_, L> {
    pub fn cards(&self) -> &[Card<'_, L>] {
        match self {
            Self::Cards(cards) => cards,
            Self::Empty { .. } => &[],
        }
    }
}

pub fn render_list<'a, L: Listing>(
    kind: ListingKind,
    items: &'a [L],
    states: &UiStateMap,
    filter: &ListFilter,
) -> RenderedList<'a, L> {
    let cards: Vec<Card<'a, L>> = filter
        .apply(items)
        .into_iter()
        .map(|item| {
            let entry = states.get(item.listing_id());
            Card {
                item,
                state: entry.map(|entry| entry.state),
                action: action_for(kind, entry),
            }
        })
        .collect();
    if cards.is_empty() {
        return RenderedList::Empty {
            message: format!("No {} available", kind.noun()),
        };
    }
    RenderedList::Cards(cards)
}
