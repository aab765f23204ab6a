use crate::types::enums::{RequestKind, Role};
use crate::types::wire::WireObject;
use serde::{Deserialize, Serialize};

/// Common view over the entities a screen lists as cards.
pub trait Listing {
    fn listing_id(&self) -> &str;
    fn title(&self) -> &str;
    fn city(&self) -> Option<&str>;
    fn category(&self) -> Option<&str>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Labours,
    Contractors,
    Jobs,
}

impl ListingKind {
    /// Role whose `<role>_cards` key mirrors this listing.
    pub fn cache_role(self) -> Role {
        match self {
            Self::Labours => Role::Labour,
            Self::Contractors => Role::Contractor,
            Self::Jobs => Role::User,
        }
    }

    /// The request flow a card's action button starts.
    pub fn request_kind(self) -> RequestKind {
        match self {
            Self::Labours => RequestKind::LabourHire,
            Self::Contractors => RequestKind::ContractorHire,
            Self::Jobs => RequestKind::JobApplication,
        }
    }

    pub fn noun(self) -> &'static str {
        match self {
            Self::Labours => "labours",
            Self::Contractors => "contractors",
            Self::Jobs => "jobs",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "WireObject")]
pub struct LabourProfile {
    pub id: String,
    pub name: String,
    pub city: Option<String>,
    pub category: Option<String>,
    pub daily_rate: Option<f64>,
    pub experience_years: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "WireObject")]
pub struct ContractorProfile {
    pub id: String,
    pub name: String,
    pub company_name: Option<String>,
    pub city: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "WireObject")]
pub struct Job {
    pub id: String,
    pub title: String,
    pub city: Option<String>,
    pub category: Option<String>,
    pub wage: Option<f64>,
    pub description: Option<String>,
}

const ID_KEYS: &[&str] = &["id", "_id"];

fn required(value: Option<String>, field: &str) -> Result<String, String> {
    value.ok_or_else(|| format!("listing has no {field}"))
}

impl TryFrom<WireObject> for LabourProfile {
    type Error = String;

    fn try_from(wire: WireObject) -> Result<Self, Self::Error> {
        Ok(Self {
            id: required(wire.string(ID_KEYS), "id")?,
            name: required(wire.text(&["name"]), "name")?,
            city: wire.text(&["city"]),
            category: wire.text(&["category", "skill"]),
            daily_rate: wire.number(&["dailyRate"]),
            experience_years: wire.count(&["experienceYears"]),
        })
    }
}

impl TryFrom<WireObject> for ContractorProfile {
    type Error = String;

    fn try_from(wire: WireObject) -> Result<Self, Self::Error> {
        Ok(Self {
            id: required(wire.string(ID_KEYS), "id")?,
            name: required(wire.text(&["name"]), "name")?,
            company_name: wire.text(&["companyName"]),
            city: wire.text(&["city"]),
            category: wire.text(&["category", "specialization"]),
        })
    }
}

impl TryFrom<WireObject> for Job {
    type Error = String;

    fn try_from(wire: WireObject) -> Result<Self, Self::Error> {
        Ok(Self {
            id: required(wire.string(ID_KEYS), "id")?,
            title: required(wire.text(&["title"]), "title")?,
            city: wire.text(&["city", "location"]),
            category: wire.text(&["category"]),
            wage: wire.number(&["wage"]),
            description: wire.text(&["description"]),
        })
    }
}

impl Listing for LabourProfile {
    fn listing_id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

impl Listing for ContractorProfile {
    fn listing_id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        self.company_name.as_deref().unwrap_or(&self.name)
    }

    fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

impl Listing for Job {
    fn listing_id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}
