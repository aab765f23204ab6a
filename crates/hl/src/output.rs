use hl_core::render::RenderedList;
use hl_core::types::{Chat, Listing, Message, RequestRecord, UiState, UiStateMap};
use owo_colors::{OwoColorize, Stream};
use std::fmt::Write;

pub fn state_label(state: Option<UiState>) -> String {
    let Some(state) = state else {
        return "-".to_string();
    };
    let text = state.as_str();
    match state {
        UiState::Approved => text
            .if_supports_color(Stream::Stdout, |t| t.green())
            .to_string(),
        UiState::Declined => text
            .if_supports_color(Stream::Stdout, |t| t.red())
            .to_string(),
        UiState::Pending => text
            .if_supports_color(Stream::Stdout, |t| t.yellow())
            .to_string(),
    }
}

pub fn format_states(map: &UiStateMap) -> String {
    if map.is_empty() {
        return "No requests yet\n".to_string();
    }
    let mut out = String::new();
    for (target, entry) in map.iter() {
        let _ = write!(out, "{target:<26} {}", state_label(Some(entry.state)));
        if let Some(chat_id) = &entry.chat_id {
            let _ = write!(out, "  chat {chat_id}");
        }
        out.push('\n');
    }
    out
}

pub fn format_records(records: &[RequestRecord]) -> String {
    if records.is_empty() {
        return "No requests received\n".to_string();
    }
    let mut out = String::new();
    for record in records {
        let _ = writeln!(
            out,
            "{:<26} from {:<26} {}",
            record.id.as_deref().unwrap_or("?"),
            record.requester_id.as_deref().unwrap_or("?"),
            record.status.as_str()
        );
    }
    out
}

pub fn format_cards<L: Listing>(rendered: &RenderedList<'_, L>) -> String {
    let cards = match rendered {
        RenderedList::Empty { message } => return format!("{message}\n"),
        RenderedList::Cards(cards) => cards,
    };
    let mut out = String::new();
    for card in cards {
        let button = if card.action.enabled {
            format!("[{}]", card.action.label)
        } else {
            format!("({})", card.action.label)
                .if_supports_color(Stream::Stdout, |t| t.dimmed())
                .to_string()
        };
        let _ = writeln!(
            out,
            "{:<12} {:<24} {:<14} {:<14} {button}",
            card.item.listing_id(),
            card.item.title(),
            card.item.city().unwrap_or("-"),
            card.item.category().unwrap_or("-"),
        );
    }
    out
}

pub fn format_chats(chats: &[Chat]) -> String {
    if chats.is_empty() {
        return "No conversations yet\n".to_string();
    }
    let mut out = String::new();
    for chat in chats {
        let with = chat
            .counterpart(None)
            .and_then(|participant| participant.name.as_deref())
            .unwrap_or("?");
        let _ = writeln!(
            out,
            "{:<26} {:<20} {}",
            chat.id,
            with,
            chat.last_message.as_deref().unwrap_or("")
        );
    }
    out
}

pub fn format_messages(messages: &[Message]) -> String {
    let mut out = String::new();
    for message in messages {
        let when = message
            .created_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{when:<16} {:<12} {}",
            message.sender_id.as_deref().unwrap_or("?"),
            message.text
        );
    }
    out
}
