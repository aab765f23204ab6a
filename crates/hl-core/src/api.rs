//! Backend seams. `hl-client` implements these over HTTP; tests use scripted
//! in-memory fakes.

use crate::error::ApiError;
use crate::types::{
    ApplyInput, Chat, ChatId, ContractorProfile, CreateHireRequest, Job, JobId, LabourProfile,
    Message, RequestId, RequestKind, RequestRecord, RequestStatus,
};
use async_trait::async_trait;

#[async_trait]
pub trait RequestApi: Send + Sync {
    /// Creates a hire request for `LabourHire` / `ContractorHire`.
    async fn create_hire_request(
        &self,
        kind: RequestKind,
        input: &CreateHireRequest,
    ) -> Result<RequestRecord, ApiError>;

    async fn apply_to_job(&self, job_id: &JobId, input: &ApplyInput)
    -> Result<RequestRecord, ApiError>;

    /// Requests the current actor has sent (or applications it has made).
    async fn list_sent(&self, kind: RequestKind) -> Result<Vec<RequestRecord>, ApiError>;

    /// Requests addressed to the current actor.
    async fn list_received(&self, kind: RequestKind) -> Result<Vec<RequestRecord>, ApiError>;

    async fn update_status(
        &self,
        kind: RequestKind,
        id: &RequestId,
        status: RequestStatus,
    ) -> Result<RequestRecord, ApiError>;
}

#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn list_chats(&self) -> Result<Vec<Chat>, ApiError>;
    async fn list_messages(&self, chat_id: &ChatId) -> Result<Vec<Message>, ApiError>;
    async fn send_message(&self, chat_id: &ChatId, text: &str) -> Result<Message, ApiError>;
}

#[async_trait]
pub trait DirectoryApi: Send + Sync {
    async fn list_labours(&self) -> Result<Vec<LabourProfile>, ApiError>;
    async fn list_contractors(&self) -> Result<Vec<ContractorProfile>, ApiError>;
    async fn list_jobs(&self) -> Result<Vec<Job>, ApiError>;
}
