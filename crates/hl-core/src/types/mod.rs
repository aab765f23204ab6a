pub mod chat;
pub mod enums;
pub mod ids;
pub mod listing;
pub mod request;
pub mod ui;
mod wire;

pub use chat::{Chat, Message, Participant, SendMessageInput};
pub use enums::{Decision, RequestKind, RequestStatus, Role, UiState};
pub use ids::{ChatId, IdError, JobId, RequestId, TargetId};
pub use listing::{ContractorProfile, Job, LabourProfile, Listing, ListingKind};
pub use request::{ApplyInput, CreateHireRequest, RequestRecord, RequesterSnapshot};
pub use ui::{UiEntry, UiStateMap};
