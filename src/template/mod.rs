use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;
pub mod render;
pub use endpoints::*;

pub type TemplateId = TypedId<EmailTemplate>;

/// Subject and body patterns with `{{placeholder}}` tokens, resolved by
/// [`render`](render::render) against a [`RenderContext`](render::RenderContext).
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EmailTemplate {
    #[serde(rename = "_id")]
    pub id: TemplateId,
    pub name: String,
    pub subject: String,
    pub content: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for EmailTemplate {
    fn tag() -> &'static str {
        "TPL"
    }
}
