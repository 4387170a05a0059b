use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::candidate::CandidateId;
use crate::email_list::EmailListId;
use crate::template::TemplateId;
use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub type CampaignId = TypedId<Campaign>;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Campaign {
    #[serde(rename = "_id")]
    pub id: CampaignId,
    pub name: String,
    pub candidate_id: CandidateId,
    pub template_id: TemplateId,
    pub email_list_id: EmailListId,
    pub job_description: Option<String>,
    pub company: Option<String>,
    pub status: CampaignStatus,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for Campaign {
    fn tag() -> &'static str {
        "CPN"
    }
}

/// Aggregate delivery status, recomputed from the recipient records after
/// every batch rather than patched incrementally. `PartiallySent` covers the
/// mixed outcome that would otherwise be ambiguous between sent and failed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum CampaignStatus {
    Draft,
    Sending,
    Sent,
    PartiallySent,
    Failed,
}
