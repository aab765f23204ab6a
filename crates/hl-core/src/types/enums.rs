use hl_events::Topic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a request as the backend reports it.
///
/// Decoding is lenient: `approved` and `rejected` are accepted as aliases, and
/// any other string is treated as `pending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
}

impl RequestStatus {
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "accepted" | "approved" => Self::Accepted,
            "declined" | "rejected" => Self::Declined,
            _ => Self::Pending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }
}

impl<'de> Deserialize<'de> for RequestStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(value
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .map_or(Self::Pending, Self::parse_lenient))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiState {
    Pending,
    Approved,
    Declined,
}

impl UiState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Declined => "declined",
        }
    }
}

impl fmt::Display for UiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Labour,
    Contractor,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Labour => "labour",
            Self::Contractor => "contractor",
        }
    }
}

/// The three request flows that share status reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestKind {
    /// A user or contractor asks a labour to work for them.
    LabourHire,
    /// A user asks a contractor to take on work.
    ContractorHire,
    /// A labour applies to a contractor's job post.
    JobApplication,
}

impl RequestKind {
    pub fn topic(self) -> Topic {
        match self {
            Self::LabourHire => Topic::LabourHire,
            Self::ContractorHire => Topic::ContractorHire,
            Self::JobApplication => Topic::JobApplication,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LabourHire => "labour-hire",
            Self::ContractorHire => "contractor-hire",
            Self::JobApplication => "job-application",
        }
    }

    /// Key under which the last successful "sent" listing is mirrored.
    pub fn mirror_key(self) -> String {
        format!("{}_sent_mirror", self.as_str().replace('-', "_"))
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "labour-hire" | "labour" => Ok(Self::LabourHire),
            "contractor-hire" | "contractor" => Ok(Self::ContractorHire),
            "job-application" | "job" => Ok(Self::JobApplication),
            other => Err(format!("unknown request kind: {other}")),
        }
    }
}

/// A responder's answer to a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Decline,
}

impl Decision {
    pub fn status(self) -> RequestStatus {
        match self {
            Self::Accept => RequestStatus::Accepted,
            Self::Decline => RequestStatus::Declined,
        }
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(Self::Accept),
            "decline" => Ok(Self::Decline),
            other => Err(format!("unknown decision: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_decoding_is_lenient() {
        let parse = |raw: &str| serde_json::from_str::<RequestStatus>(raw).unwrap();
        assert_eq!(parse("\"accepted\""), RequestStatus::Accepted);
        assert_eq!(parse("\"Approved\""), RequestStatus::Accepted);
        assert_eq!(parse("\"rejected\""), RequestStatus::Declined);
        assert_eq!(parse("\"in_review\""), RequestStatus::Pending);
        assert_eq!(parse("null"), RequestStatus::Pending);
        assert_eq!(parse("3"), RequestStatus::Pending);
    }

    #[test]
    fn mirror_keys_are_distinct_per_kind() {
        assert_eq!(RequestKind::LabourHire.mirror_key(), "labour_hire_sent_mirror");
        assert_eq!(
            RequestKind::JobApplication.mirror_key(),
            "job_application_sent_mirror"
        );
    }

    #[test]
    fn kinds_parse_from_cli_spellings() {
        assert_eq!("labour".parse::<RequestKind>(), Ok(RequestKind::LabourHire));
        assert_eq!("job-application".parse::<RequestKind>(), Ok(RequestKind::JobApplication));
        assert!("user".parse::<RequestKind>().is_err());
    }
}
