use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::campaign::CampaignId;
use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub type RecipientId = TypedId<Recipient>;

/// Correlation key tying an inbound reply back to the message it answers.
/// Issued once per recipient record and never reused; it is a lookup key,
/// not a credential.
pub type TrackingToken = TypedId<TrackingTokenMarker>;

pub enum TrackingTokenMarker {}

impl TypedIdMarker for TrackingTokenMarker {
    fn tag() -> &'static str {
        "TRK"
    }
}

/// Per-destination dispatch record within a campaign. `(campaign_id,
/// address)` is unique; the record is destroyed with its campaign.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Recipient {
    #[serde(rename = "_id")]
    pub id: RecipientId,
    pub campaign_id: CampaignId,
    pub address: String,
    pub display_name: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub state: DeliveryState,
    pub token: TrackingToken,
    pub message_id: Option<String>,
    pub last_error: Option<String>,
    #[serde(with = "crate::utils::bson_datetime_option")]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(with = "crate::utils::bson_datetime_option")]
    pub received_at: Option<DateTime<Utc>>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl Recipient {
    pub fn new(campaign_id: CampaignId, address: String, now: DateTime<Utc>) -> Recipient {
        Recipient {
            id: RecipientId::new(),
            campaign_id,
            address,
            display_name: None,
            subject: None,
            body: None,
            state: DeliveryState::Pending,
            token: TrackingToken::new(),
            message_id: None,
            last_error: None,
            sent_at: None,
            received_at: None,
            created_at: now,
            modified_at: now,
        }
    }
}

impl TypedIdMarker for Recipient {
    fn tag() -> &'static str {
        "RCP"
    }
}

/// ```text
/// pending -> sending -> sent -> received
///               |  ^
///               v  |
///              failed
/// ```
/// `sent`, `received`, and `failed` are terminal for batch dispatch, except
/// that an explicit retry re-enters `failed` records.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum DeliveryState {
    Pending,
    Sending,
    Sent,
    Failed,
    Received,
}

impl DeliveryState {
    /// States a batch run must never touch again.
    pub fn is_terminal_success(self) -> bool {
        matches!(self, DeliveryState::Sent | DeliveryState::Received)
    }
}
