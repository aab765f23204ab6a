use crate::types::enums::RequestStatus;
use crate::types::wire::WireObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A hire request or job application as returned by the backend.
///
/// Every field except `status` is optional on the wire; the reconciliation
/// code decides what to do with incomplete records rather than failing the
/// whole listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "WireObject")]
pub struct RequestRecord {
    pub id: Option<String>,
    pub requester_id: Option<String>,
    pub target_id: Option<String>,
    pub status: RequestStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub chat_id: Option<String>,
}

/// Names the target id travels under. A contractor's labour hire carries its
/// own `contractorId` next to the `labourId` it targets, so the more specific
/// target names come first.
const TARGET_KEYS: &[&str] = &["targetId", "jobId", "labourId", "contractorId"];

impl From<WireObject> for RequestRecord {
    fn from(wire: WireObject) -> Self {
        Self {
            id: wire.string(&["id", "_id"]),
            requester_id: wire.string(&["requesterId", "requester"]),
            target_id: wire.string(TARGET_KEYS),
            status: wire
                .text(&["status"])
                .map_or(RequestStatus::Pending, |status| {
                    RequestStatus::parse_lenient(&status)
                }),
            created_at: wire.timestamp(&["createdAt"]),
            updated_at: wire.timestamp(&["updatedAt"]),
            chat_id: wire.string(&["chatId"]),
        }
    }
}

impl RequestRecord {
    /// The trimmed target id, or `None` when it is missing or blank.
    pub fn target(&self) -> Option<&str> {
        self.target_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// The most recent timestamp known for this record.
    pub fn last_changed(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }
}

/// Profile details a requester attaches to a hire request so the responder
/// can see who is asking without a second lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequesterSnapshot {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHireRequest {
    pub target_id: String,
    pub requester: RequesterSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_target_aliases_and_populated_refs() {
        let record: RequestRecord = serde_json::from_value(serde_json::json!({
            "_id": "r1",
            "requester": {"_id": "u1", "name": "Asha"},
            "labourId": "L1",
            "status": "accepted",
            "chatId": "c9",
            "createdAt": "2024-03-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(record.id.as_deref(), Some("r1"));
        assert_eq!(record.requester_id.as_deref(), Some("u1"));
        assert_eq!(record.target(), Some("L1"));
        assert_eq!(record.status, RequestStatus::Accepted);
        assert_eq!(record.chat_id.as_deref(), Some("c9"));
        assert!(record.updated_at.is_none());
        assert_eq!(record.last_changed(), record.created_at);
    }

    #[test]
    fn malformed_fields_degrade_instead_of_failing() {
        let record: RequestRecord = serde_json::from_value(serde_json::json!({
            "jobId": "   ",
            "updatedAt": "yesterday",
            "status": 7
        }))
        .unwrap();
        assert_eq!(record.target(), None);
        assert_eq!(record.status, RequestStatus::Pending);
        assert!(record.updated_at.is_none());

        let record: RequestRecord =
            serde_json::from_value(serde_json::json!({"targetId": 42})).unwrap();
        assert_eq!(record.target(), Some("42"));
        assert_eq!(record.status, RequestStatus::Pending);
    }

    #[test]
    fn repeated_id_and_target_names_do_not_fail_the_record() {
        let record: RequestRecord = serde_json::from_value(serde_json::json!({
            "_id": "r1",
            "id": "r1",
            "contractorId": "C9",
            "labourId": "L1",
            "status": "accepted"
        }))
        .unwrap();
        assert_eq!(record.id.as_deref(), Some("r1"));
        assert_eq!(record.target(), Some("L1"));
        assert_eq!(record.status, RequestStatus::Accepted);

        let record: RequestRecord = serde_json::from_value(serde_json::json!({
            "targetId": "L2",
            "jobId": "J2",
            "requesterId": "u1",
            "requester": {"_id": "u1"}
        }))
        .unwrap();
        assert_eq!(record.target(), Some("L2"));
        assert_eq!(record.requester_id.as_deref(), Some("u1"));
    }

    #[test]
    fn encoded_records_decode_back_to_themselves() {
        let record = RequestRecord {
            id: Some("r1".into()),
            target_id: Some("L1".into()),
            status: RequestStatus::Declined,
            updated_at: Some(Utc::now()),
            chat_id: None,
            ..RequestRecord::default()
        };
        let decoded: RequestRecord =
            serde_json::from_value(serde_json::to_value(&record).unwrap()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn create_payload_omits_empty_optionals() {
        let body = serde_json::to_value(CreateHireRequest {
            target_id: "L1".into(),
            requester: RequesterSnapshot {
                name: "Asha".into(),
                ..RequesterSnapshot::default()
            },
            message: None,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"targetId": "L1", "requester": {"name": "Asha"}})
        );
    }
}
