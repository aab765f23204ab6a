pub mod api;
pub mod cache;
pub mod chat;
pub mod directory;
pub mod error;
pub mod mapper;
pub mod poller;
pub mod render;
pub mod responder;
pub mod state;
pub mod submitter;

pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::cache::{KvStore, MemoryKvStore, SessionCache};
pub use crate::chat::ChatService;
pub use crate::directory::Directory;
pub use crate::error::{ApiError, CacheError, CoreError};
pub use crate::mapper::map_requests;
pub use crate::poller::StatusPoller;
pub use crate::responder::Responder;
pub use crate::state::UiStateStore;
pub use crate::submitter::RequestSubmitter;
