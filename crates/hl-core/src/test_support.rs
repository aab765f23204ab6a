use crate::api::{ChatApi, DirectoryApi, RequestApi};
use crate::error::ApiError;
use crate::types::{
    ApplyInput, Chat, ChatId, ContractorProfile, CreateHireRequest, Job, JobId, LabourProfile,
    Message, RequestId, RequestKind, RequestRecord, RequestStatus,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

pub fn record(target: &str, status: RequestStatus) -> RequestRecord {
    RequestRecord {
        id: Some(format!("req-{target}")),
        target_id: Some(target.to_string()),
        status,
        ..RequestRecord::default()
    }
}

pub fn labour(id: &str, name: &str, city: &str, category: &str) -> LabourProfile {
    LabourProfile {
        id: id.to_string(),
        name: name.to_string(),
        city: Some(city.to_string()),
        category: Some(category.to_string()),
        daily_rate: None,
        experience_years: None,
    }
}

type Scripted = (Duration, Result<Vec<RequestRecord>, ApiError>);

/// Scripted backend. `list_sent` pops queued responses (each with a delay)
/// and falls back to `sent_default` once the queue is empty.
#[derive(Default)]
pub struct FakeApi {
    pub sent_queue: Mutex<VecDeque<Scripted>>,
    pub sent_default: Mutex<Vec<RequestRecord>>,
    pub create_error: Mutex<Option<ApiError>>,
    pub received: Mutex<Vec<RequestRecord>>,
    pub labours: Mutex<Option<Vec<LabourProfile>>>,
    pub chats: Mutex<Vec<Chat>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_sent(&self, delay: Duration, response: Result<Vec<RequestRecord>, ApiError>) {
        self.sent_queue.lock().unwrap().push_back((delay, response));
    }

    pub fn set_sent_default(&self, records: Vec<RequestRecord>) {
        *self.sent_default.lock().unwrap() = records;
    }

    pub fn fail_next_create(&self, err: ApiError) {
        *self.create_error.lock().unwrap() = Some(err);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RequestApi for FakeApi {
    async fn create_hire_request(
        &self,
        kind: RequestKind,
        input: &CreateHireRequest,
    ) -> Result<RequestRecord, ApiError> {
        self.log(format!("create {kind} {}", input.target_id));
        if let Some(err) = self.create_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(record(&input.target_id, RequestStatus::Pending))
    }

    async fn apply_to_job(
        &self,
        job_id: &JobId,
        _input: &ApplyInput,
    ) -> Result<RequestRecord, ApiError> {
        self.log(format!("apply {job_id}"));
        if let Some(err) = self.create_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(record(job_id.as_str(), RequestStatus::Pending))
    }

    async fn list_sent(&self, kind: RequestKind) -> Result<Vec<RequestRecord>, ApiError> {
        self.log(format!("list_sent {kind}"));
        let next = self.sent_queue.lock().unwrap().pop_front();
        match next {
            Some((delay, response)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                response
            }
            None => Ok(self.sent_default.lock().unwrap().clone()),
        }
    }

    async fn list_received(&self, kind: RequestKind) -> Result<Vec<RequestRecord>, ApiError> {
        self.log(format!("list_received {kind}"));
        Ok(self.received.lock().unwrap().clone())
    }

    async fn update_status(
        &self,
        kind: RequestKind,
        id: &RequestId,
        status: RequestStatus,
    ) -> Result<RequestRecord, ApiError> {
        self.log(format!("update {kind} {id} {}", status.as_str()));
        if kind == RequestKind::JobApplication {
            return Err(ApiError::Unsupported {
                operation: "respond to job application".into(),
            });
        }
        let mut received = self.received.lock().unwrap();
        let found = received
            .iter_mut()
            .find(|record| record.id.as_deref() == Some(id.as_str()))
            .ok_or(ApiError::NotFound)?;
        found.status = status;
        Ok(found.clone())
    }
}

#[async_trait]
impl ChatApi for FakeApi {
    async fn list_chats(&self) -> Result<Vec<Chat>, ApiError> {
        Ok(self.chats.lock().unwrap().clone())
    }

    async fn list_messages(&self, chat_id: &ChatId) -> Result<Vec<Message>, ApiError> {
        self.log(format!("messages {chat_id}"));
        Ok(Vec::new())
    }

    async fn send_message(&self, chat_id: &ChatId, text: &str) -> Result<Message, ApiError> {
        self.log(format!("send {chat_id} {text}"));
        Ok(Message {
            id: Some("m1".into()),
            chat_id: Some(chat_id.to_string()),
            sender_id: None,
            text: text.to_string(),
            created_at: None,
        })
    }
}

#[async_trait]
impl DirectoryApi for FakeApi {
    async fn list_labours(&self) -> Result<Vec<LabourProfile>, ApiError> {
        self.log("list_labours".into());
        self.labours.lock().unwrap().clone().ok_or(ApiError::Network {
            message: "offline".into(),
        })
    }

    async fn list_contractors(&self) -> Result<Vec<ContractorProfile>, ApiError> {
        Ok(Vec::new())
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, ApiError> {
        Ok(Vec::new())
    }
}
