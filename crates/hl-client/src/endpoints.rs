//! REST paths of the marketplace backend, relative to the API base URL.

use hl_core::ApiError;
use hl_core::types::{ChatId, JobId, ListingKind, RequestId, RequestKind};

pub const REFRESH: &str = "/auth/refresh";
pub const CHATS: &str = "/chat/chats";

fn unsupported(operation: &str, kind: RequestKind) -> ApiError {
    ApiError::Unsupported {
        operation: format!("{operation} for {kind}"),
    }
}

pub fn create(kind: RequestKind) -> Result<&'static str, ApiError> {
    match kind {
        RequestKind::LabourHire => Ok("/labour/hire-request"),
        RequestKind::ContractorHire => Ok("/contractor/hire-request"),
        RequestKind::JobApplication => Err(unsupported("create without a job id", kind)),
    }
}

pub fn apply(job_id: &JobId) -> String {
    format!("/contractor/jobs/{job_id}/apply")
}

pub fn sent(kind: RequestKind) -> &'static str {
    match kind {
        RequestKind::LabourHire => "/labour/hire-requests/sent",
        RequestKind::ContractorHire => "/contractor/hire-requests/sent",
        RequestKind::JobApplication => "/contractor/my-applications",
    }
}

pub fn received(kind: RequestKind) -> Result<&'static str, ApiError> {
    match kind {
        RequestKind::LabourHire => Ok("/labour/hire-requests"),
        RequestKind::ContractorHire => Ok("/contractor/hire-requests"),
        RequestKind::JobApplication => Err(unsupported("list received", kind)),
    }
}

pub fn status(kind: RequestKind, id: &RequestId) -> Result<String, ApiError> {
    match kind {
        RequestKind::LabourHire => Ok(format!("/labour/hire-request/{id}")),
        RequestKind::ContractorHire => Ok(format!("/contractor/hire-request/{id}")),
        RequestKind::JobApplication => Err(unsupported("update status", kind)),
    }
}

pub fn messages(chat_id: &ChatId) -> String {
    format!("{CHATS}/{chat_id}/messages")
}

pub fn listing(kind: ListingKind) -> &'static str {
    match kind {
        ListingKind::Labours => "/labour/profiles",
        ListingKind::Contractors => "/contractor/profiles",
        ListingKind::Jobs => "/contractor/jobs",
    }
}
