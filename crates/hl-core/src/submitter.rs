use crate::api::RequestApi;
use crate::cache::SessionCache;
use crate::error::{ApiError, CoreError};
use crate::state::UiStateStore;
use crate::types::{
    ApplyInput, CreateHireRequest, JobId, RequestKind, RequestRecord, RequesterSnapshot, TargetId,
};
use hl_events::{AppEvent, EventBus, EventSource};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted(RequestRecord),
    /// The backend already holds an active request for this target. The UI
    /// state is left as it was.
    Duplicate { message: String },
}

/// What the requester sends along with the create call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitPayload {
    Hire {
        requester: RequesterSnapshot,
        message: Option<String>,
    },
    Application(ApplyInput),
}

pub struct RequestSubmitter<A: ?Sized> {
    api: Arc<A>,
    kind: RequestKind,
    store: UiStateStore,
    bus: EventBus,
    cache: Option<SessionCache>,
}

impl<A> RequestSubmitter<A>
where
    A: RequestApi + ?Sized,
{
    pub fn new(api: Arc<A>, kind: RequestKind, store: UiStateStore, bus: EventBus) -> Self {
        Self {
            api,
            kind,
            store,
            bus,
            cache: None,
        }
    }

    /// Records applied job ids in `cache`.
    #[must_use]
    pub fn with_cache(mut self, cache: SessionCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub async fn submit(
        &self,
        target: &TargetId,
        payload: SubmitPayload,
    ) -> Result<SubmitOutcome, CoreError> {
        let created = match (self.kind, payload) {
            (RequestKind::JobApplication, SubmitPayload::Application(input)) => {
                let job_id = JobId::new(target.as_str())?;
                self.api.apply_to_job(&job_id, &input).await
            }
            (RequestKind::LabourHire | RequestKind::ContractorHire, SubmitPayload::Hire {
                requester,
                message,
            }) => {
                if requester.name.trim().is_empty() {
                    return Err(CoreError::InvalidInput {
                        message: "requester name is required".to_string(),
                    });
                }
                let input = CreateHireRequest {
                    target_id: target.to_string(),
                    requester,
                    message,
                };
                self.api.create_hire_request(self.kind, &input).await
            }
            (kind, _) => {
                return Err(CoreError::InvalidInput {
                    message: format!("payload does not match request kind {kind}"),
                });
            }
        };

        let record = match created {
            Ok(record) => record,
            Err(ApiError::Duplicate { message }) => {
                info!(kind = %self.kind, %target, "request already exists");
                return Ok(SubmitOutcome::Duplicate { message });
            }
            Err(err) => return Err(err.into()),
        };

        self.store.mark_pending(target.as_str());
        if self.kind == RequestKind::JobApplication {
            if let Some(cache) = &self.cache {
                if let Err(err) = cache.add_applied_job(target.as_str()) {
                    warn!(%target, %err, "failed to record applied job");
                }
            }
        }
        self.bus.emit(
            EventSource::Submitter,
            AppEvent::RequestsUpdated {
                topic: self.kind.topic(),
            },
        );
        info!(kind = %self.kind, %target, "request submitted");
        Ok(SubmitOutcome::Submitted(record))
    }
}
