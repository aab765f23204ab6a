use crate::api::RequestApi;
use crate::error::{ApiError, CoreError};
use crate::types::{Decision, RequestId, RequestKind, RequestRecord};
use hl_events::{AppEvent, EventBus, EventSource};
use std::sync::Arc;
use tracing::info;

/// The labour/contractor side of a hire request.
pub struct Responder<A: ?Sized> {
    api: Arc<A>,
    bus: EventBus,
}

impl<A> Responder<A>
where
    A: RequestApi + ?Sized,
{
    pub fn new(api: Arc<A>, bus: EventBus) -> Self {
        Self { api, bus }
    }

    pub async fn received(&self, kind: RequestKind) -> Result<Vec<RequestRecord>, CoreError> {
        Ok(self.api.list_received(kind).await?)
    }

    pub async fn respond(
        &self,
        kind: RequestKind,
        id: &RequestId,
        decision: Decision,
    ) -> Result<RequestRecord, CoreError> {
        if kind == RequestKind::JobApplication {
            return Err(ApiError::Unsupported {
                operation: "respond to a job application".to_string(),
            }
            .into());
        }
        let updated = self.api.update_status(kind, id, decision.status()).await?;
        info!(%kind, %id, status = decision.status().as_str(), "request answered");
        self.bus.emit(
            EventSource::Responder,
            AppEvent::RequestsUpdated { topic: kind.topic() },
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeApi, record};
    use crate::types::RequestStatus;

    #[tokio::test]
    async fn accept_patches_status_and_notifies() {
        let api = Arc::new(FakeApi::new());
        api.received
            .lock()
            .unwrap()
            .push(record("L1", RequestStatus::Pending));
        let bus = EventBus::new(4);
        let mut rx = bus.subscribe();
        let responder = Responder::new(Arc::clone(&api), bus);

        let id = RequestId::new("req-L1").unwrap();
        let updated = responder
            .respond(RequestKind::LabourHire, &id, Decision::Accept)
            .await
            .unwrap();

        assert_eq!(updated.status, RequestStatus::Accepted);
        assert_eq!(
            responder.received(RequestKind::LabourHire).await.unwrap()[0].status,
            RequestStatus::Accepted
        );
        assert_eq!(
            rx.recv().await.unwrap().body,
            AppEvent::RequestsUpdated {
                topic: RequestKind::LabourHire.topic()
            }
        );
    }

    #[tokio::test]
    async fn unknown_request_surfaces_not_found() {
        let responder = Responder::new(Arc::new(FakeApi::new()), EventBus::new(4));
        let id = RequestId::new("missing").unwrap();
        let err = responder
            .respond(RequestKind::ContractorHire, &id, Decision::Decline)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Api(ApiError::NotFound)));
    }

    #[tokio::test]
    async fn applications_cannot_be_answered() {
        let api = Arc::new(FakeApi::new());
        let responder = Responder::new(Arc::clone(&api), EventBus::new(4));
        let id = RequestId::new("a1").unwrap();
        let err = responder
            .respond(RequestKind::JobApplication, &id, Decision::Accept)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Api(ApiError::Unsupported { .. })));
        assert!(api.calls().is_empty());
    }
}
