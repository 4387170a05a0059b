use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub type CandidateId = TypedId<Candidate>;

/// The person a campaign advocates for. The age placeholder is derived from
/// `birth_date` at render time and is never stored.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: CandidateId,
    pub name: String,
    pub email: String,
    pub birth_date: Option<NaiveDate>,
    pub language_level: Option<String>,
    pub location: Option<String>,
    pub education_level: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for Candidate {
    fn tag() -> &'static str {
        "CND"
    }
}
